//! Codec trait and the JSON implementation.
//!
//! The transport moves text frames; a [`Codec`] turns them into
//! [`ClientEvent`](crate::ClientEvent)s and [`ServerEvent`](crate::ServerEvent)s
//! and back. The dispatch layer is generic over it so tests can swap in
//! something else.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts events to and from text frames.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into one text frame.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Parses one text frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the frame is malformed or does not
    /// match `T`.
    fn decode<T: DeserializeOwned>(&self, frame: &str) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ```rust
/// use baduk_protocol::{ClientEvent, Codec, JsonCodec};
///
/// let event: ClientEvent = JsonCodec
///     .decode(r#"{"event":"stoneRequest","data":40}"#)
///     .unwrap();
/// assert_eq!(event, ClientEvent::StoneRequest(40));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, frame: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(frame).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientEvent, Role, ServerEvent};

    #[test]
    fn test_json_codec_encodes_server_event() {
        let frame = JsonCodec.encode(&ServerEvent::Type(Role::Player)).unwrap();
        assert_eq!(frame, r#"{"event":"type","data":"player"}"#);
    }

    #[test]
    fn test_json_codec_decode_garbage_returns_decode_error() {
        let result: Result<ClientEvent, _> = JsonCodec.decode("not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_decode_wrong_shape_returns_decode_error() {
        let result: Result<ClientEvent, _> =
            JsonCodec.decode(r#"{"event":"join","data":{"name":"alice"}}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
