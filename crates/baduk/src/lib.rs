//! # baduk
//!
//! A networked two-player Go server. Clients connect over WebSocket, join a
//! named room, negotiate colors during a short countdown and then take
//! turns placing stones. Anyone who joins a full room watches as a
//! spectator.
//!
//! The facade ties the layer crates together:
//!
//! ```text
//! baduk-transport → baduk-protocol → baduk (dispatch) → baduk-room → baduk-session → baduk-rules
//!                                                           └→ baduk-countdown
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use baduk::prelude::*;
//!
//! # async fn run() -> Result<(), BadukError> {
//! let server = BadukServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .room_config(RoomConfig {
//!         countdown: CountdownConfig::from_secs(10),
//!         ..RoomConfig::default()
//!     })
//!     .build::<GoRules>()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::BadukError;
pub use server::{BadukServer, BadukServerBuilder};

pub use baduk_countdown as countdown;
pub use baduk_protocol as protocol;
pub use baduk_room as room;
pub use baduk_rules as rules;
pub use baduk_session as session;
pub use baduk_transport as transport;

/// Everything needed to configure and run a server.
pub mod prelude {
    pub use crate::{BadukError, BadukServer, BadukServerBuilder};
    pub use baduk_countdown::CountdownConfig;
    pub use baduk_protocol::{
        ClientEvent, ColorChoice, Role, ServerEvent, Snapshot, Stone,
    };
    pub use baduk_room::{ErrorKind, RoomConfig, RoomError, RoomInfo, RoomState};
    pub use baduk_rules::{GoRules, Rules};
    pub use baduk_session::SessionConfig;
}
