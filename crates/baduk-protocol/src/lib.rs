//! Wire protocol for the baduk server.
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`Stone`], [`Snapshot`],
//!   and friends): the named events clients and server exchange.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how events become text
//!   frames.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (text frames) → Protocol (events) → Room (game state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientEvent, ColorChoice, Ignored, Recipient, Role, ServerEvent, Snapshot, Stone,
};
