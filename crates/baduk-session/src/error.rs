//! Error types for the session layer.

use baduk_protocol::Stone;
use baduk_rules::RulesError;

/// Why a move was refused by a [`Session`](crate::Session).
///
/// A refused move never changes the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// It is the other color's turn.
    #[error("it is {expected}'s turn, not {got}'s")]
    WrongTurn { expected: Stone, got: Stone },

    /// The linear cell index does not address a point on the board.
    #[error("cell index {index} is outside a {size}x{size} board")]
    IndexOutOfRange { index: usize, size: usize },

    /// The rules engine rejected the move.
    #[error(transparent)]
    Illegal(#[from] RulesError),
}
