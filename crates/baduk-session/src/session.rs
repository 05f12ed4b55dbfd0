//! The game session: one board, one turn counter and whose move it is.
//!
//! A session is created together with its room and lives for as long as
//! the room does. Players leaving and rejoining never reset it; the game
//! picks up where it stopped.

use baduk_protocol::{Snapshot, Stone};
use baduk_rules::Rules;

use crate::SessionError;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for new game sessions.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Side length of the board. Default: 9.
    pub board_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { board_size: 9 }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A game in progress.
///
/// The session owns every position reached so far. The last one is the
/// current board; earlier ones are kept so the game record survives the
/// whole match.
///
/// Black always moves first. The turn counter starts at 0 and goes up by
/// one per accepted move, so `turn` is also the number of stones played.
pub struct Session<R: Rules> {
    size: usize,
    turn: u64,
    to_move: Stone,
    history: Vec<R::Position>,
}

impl<R: Rules> Session<R> {
    /// Starts a new game on an empty board.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            size: config.board_size,
            turn: 0,
            to_move: Stone::Black,
            history: vec![R::initial(config.board_size)],
        }
    }

    /// Plays `stone` at `(x, y)` if it is that color's turn and the rules
    /// allow it.
    ///
    /// On success the turn counter goes up and the other color is to move.
    /// On failure nothing changes.
    pub fn try_move(&mut self, stone: Stone, x: usize, y: usize) -> Result<(), SessionError> {
        if stone != self.to_move {
            return Err(SessionError::WrongTurn {
                expected: self.to_move,
                got: stone,
            });
        }

        let next = R::play(self.position(), stone, x, y)?;
        self.history.push(next);
        self.turn += 1;
        self.to_move = stone.opposite();

        tracing::debug!(%stone, x, y, turn = self.turn, "move accepted");
        Ok(())
    }

    /// Converts a linear cell index into `(x, y)`.
    ///
    /// Indices run row by row: `index = x * size + y`.
    pub fn index_to_coords(&self, index: usize) -> Result<(usize, usize), SessionError> {
        if index >= self.size * self.size {
            return Err(SessionError::IndexOutOfRange {
                index,
                size: self.size,
            });
        }
        Ok((index / self.size, index % self.size))
    }

    /// Inverse of [`index_to_coords`](Self::index_to_coords).
    pub fn coords_to_index(&self, x: usize, y: usize) -> usize {
        x * self.size + y
    }

    /// The current board as clients see it.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: render_board::<R>(self.position(), self.size),
            size: self.size,
            turn: self.turn,
            turn_color: self.to_move,
        }
    }

    /// Number of accepted moves.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// The color expected to move next.
    pub fn color_to_move(&self) -> Stone {
        self.to_move
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// The current position.
    pub fn position(&self) -> &R::Position {
        // `new` seeds the history and nothing ever pops it.
        &self.history[self.history.len() - 1]
    }

    /// Number of positions recorded, including the empty starting board.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

/// Renders a position as `size` rows of `b`, `w` and `-`, joined by `\n`.
pub fn render_board<R: Rules>(position: &R::Position, size: usize) -> String {
    let mut out = String::with_capacity(size * (size + 1));
    for x in 0..size {
        if x > 0 {
            out.push('\n');
        }
        for y in 0..size {
            out.push(R::stone_at(position, x, y).map_or('-', Stone::glyph));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use baduk_rules::{GoRules, RulesError};

    use super::*;

    fn new_session(size: usize) -> Session<GoRules> {
        Session::new(&SessionConfig { board_size: size })
    }

    #[test]
    fn test_session_config_default_is_nine() {
        assert_eq!(SessionConfig::default().board_size, 9);
    }

    #[test]
    fn test_new_session_black_moves_first() {
        let session = new_session(9);
        assert_eq!(session.turn(), 0);
        assert_eq!(session.color_to_move(), Stone::Black);
        assert_eq!(session.history_len(), 1);
    }

    #[test]
    fn test_snapshot_of_empty_board() {
        let snap = new_session(3).snapshot();
        assert_eq!(snap.board, "---\n---\n---");
        assert_eq!(snap.size, 3);
        assert_eq!(snap.turn, 0);
        assert_eq!(snap.turn_color, Stone::Black);
    }

    #[test]
    fn test_try_move_center_of_nine_by_nine() {
        let mut session = new_session(9);
        let (x, y) = session.index_to_coords(40).unwrap();
        assert_eq!((x, y), (4, 4));

        session.try_move(Stone::Black, x, y).unwrap();

        let snap = session.snapshot();
        assert_eq!(snap.turn, 1);
        assert_eq!(snap.turn_color, Stone::White);
        let rows: Vec<&str> = snap.board.lines().collect();
        assert_eq!(rows.len(), 9);
        assert_eq!(rows[4], "----b----");
    }

    #[test]
    fn test_try_move_wrong_turn_leaves_session_unchanged() {
        let mut session = new_session(9);
        let err = session.try_move(Stone::White, 0, 0).unwrap_err();
        assert_eq!(
            err,
            SessionError::WrongTurn {
                expected: Stone::Black,
                got: Stone::White
            }
        );
        assert_eq!(session.turn(), 0);
        assert_eq!(session.history_len(), 1);
    }

    #[test]
    fn test_try_move_illegal_leaves_session_unchanged() {
        let mut session = new_session(9);
        session.try_move(Stone::Black, 2, 2).unwrap();
        let before = session.snapshot();

        let err = session.try_move(Stone::White, 2, 2).unwrap_err();
        assert_eq!(
            err,
            SessionError::Illegal(RulesError::Occupied { x: 2, y: 2 })
        );
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_turns_alternate() {
        let mut session = new_session(9);
        session.try_move(Stone::Black, 0, 0).unwrap();
        session.try_move(Stone::White, 8, 8).unwrap();
        assert_eq!(session.turn(), 2);
        assert_eq!(session.color_to_move(), Stone::Black);
        assert_eq!(session.history_len(), 3);

        let snap = session.snapshot();
        assert!(snap.board.starts_with('b'));
        assert!(snap.board.ends_with('w'));
        assert!(!snap.board.ends_with('\n'));
    }

    #[test]
    fn test_index_to_coords_rejects_out_of_range() {
        let session = new_session(9);
        assert_eq!(
            session.index_to_coords(81),
            Err(SessionError::IndexOutOfRange { index: 81, size: 9 })
        );
    }

    #[test]
    fn test_index_coords_bijection() {
        let session = new_session(5);
        for index in 0..25 {
            let (x, y) = session.index_to_coords(index).unwrap();
            assert!(x < 5 && y < 5);
            assert_eq!(session.coords_to_index(x, y), index);
        }
    }
}
