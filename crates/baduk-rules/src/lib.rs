//! Go rules for the baduk server.
//!
//! The room and session layers never look inside a board. They hand a
//! position, a color and a target cell to a [`Rules`] implementation and get
//! back either the next position or a [`RulesError`]. [`GoRules`] is the
//! implementation the server runs with; tests are free to plug in simpler
//! ones.

mod board;
mod error;

pub use board::Board;
pub use error::RulesError;

use baduk_protocol::Stone;

/// A game-rules engine.
///
/// Positions are immutable values: `play` never modifies its input, so a
/// caller can keep every position it has seen.
pub trait Rules: Send + Sync + 'static {
    /// A board position, opaque to callers.
    type Position: Clone + Send + Sync + 'static;

    /// The empty position for a `size` × `size` board.
    fn initial(size: usize) -> Self::Position;

    /// Plays `stone` at row `x`, column `y`.
    ///
    /// # Errors
    /// Returns a [`RulesError`] describing why the move is illegal.
    fn play(
        position: &Self::Position,
        stone: Stone,
        x: usize,
        y: usize,
    ) -> Result<Self::Position, RulesError>;

    /// The stone at row `x`, column `y`, or `None` for an empty point.
    fn stone_at(position: &Self::Position, x: usize, y: usize) -> Option<Stone>;
}

/// Standard Go rules: captures, no suicide, simple ko.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoRules;

impl Rules for GoRules {
    type Position = Board;

    fn initial(size: usize) -> Board {
        Board::new(size)
    }

    fn play(
        position: &Board,
        stone: Stone,
        x: usize,
        y: usize,
    ) -> Result<Board, RulesError> {
        position.play(stone, x, y)
    }

    fn stone_at(position: &Board, x: usize, y: usize) -> Option<Stone> {
        position.get(x, y)
    }
}
