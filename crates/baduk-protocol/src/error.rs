//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding events.
///
/// A decode failure always means the client sent something malformed:
/// bad JSON, an unknown event name, or a payload of the wrong shape (for
/// example a color other than `none`/`black`/`white`).
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing an outbound event failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// An inbound frame could not be parsed into an event.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
