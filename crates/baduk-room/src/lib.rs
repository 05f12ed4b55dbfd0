//! Rooms for the baduk server.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! roster, its state machine and its game session. Color negotiation runs
//! as a separate countdown task feeding timer events back into the actor.
//!
//! # Key types
//!
//! - [`RoomManager`]: creates/destroys rooms by name, routes connections
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomState`]: lifecycle state machine
//! - [`RoomConfig`]: board size, countdown and channel settings
//! - [`RoomError`] / [`ErrorKind`]: what went wrong and which code to send

mod client;
mod config;
mod error;
mod manager;
mod negotiation;
mod room;

pub use client::Client;
pub use config::{MAX_PLAYERS, RoomConfig, RoomState};
pub use error::{ErrorKind, RoomError};
pub use manager::RoomManager;
pub use negotiation::resolve_colors;
pub use room::{ClientSender, RoomHandle, RoomInfo};
