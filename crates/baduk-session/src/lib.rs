//! Game sessions for the baduk server.
//!
//! A [`Session`] is one game in progress: the position history, the turn
//! counter and whose move it is. It enforces turn order and defers every
//! other legality question to a [`Rules`](baduk_rules::Rules) engine.
//!
//! ```text
//! Room Layer (above)  ← decides WHO may move
//!     ↕
//! Session Layer (this crate)  ← decides WHEN a color may move
//!     ↕
//! Rules (below)  ← decides WHERE a stone may go
//! ```

mod error;
mod session;

pub use error::SessionError;
pub use session::{Session, SessionConfig, render_board};
