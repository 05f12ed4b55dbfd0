//! Error types for move legality.

/// Why a move was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// The target point is not on the board.
    #[error("point ({x}, {y}) is outside the {size}x{size} board")]
    OutOfBounds { x: usize, y: usize, size: usize },

    /// A stone already sits on the target point.
    #[error("point ({x}, {y}) is occupied")]
    Occupied { x: usize, y: usize },

    /// The move would leave its own group without liberties.
    #[error("playing at ({x}, {y}) is suicide")]
    Suicide { x: usize, y: usize },

    /// The move would immediately retake a ko.
    #[error("playing at ({x}, {y}) retakes the ko")]
    Ko { x: usize, y: usize },

    /// Rejection reported by a rules engine other than [`GoRules`](crate::GoRules).
    #[error("illegal move: {0}")]
    Rejected(String),
}
