//! Codec trait and implementations.
//!
//! Nothing on the bus is serialized: messages move through the queues as
//! values. Codecs are for the edges, such as loading a server script from
//! disk or dumping traffic to a log.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to bytes and decodes them back.
///
/// ## Trait bounds
///
/// - `Send + Sync`: a codec may be shared with whatever thread loads
///   scripts or writes traffic dumps while the tick loop keeps running.
/// - `'static`: a codec owns its settings and borrows nothing, so it can be
///   stored inside long-lived values such as a client or a simulator.
///
/// ## Generic methods
///
/// `encode` and `decode` are generic over the value rather than tied to
/// [`Message`](crate::Message). The same codec handles a single message, a
/// whole server script, or a client config:
/// - `encode<T: Serialize>` turns any serializable value into bytes.
/// - `decode<T: DeserializeOwned>` builds a value that owns all of its
///   data, so the input buffer can be dropped as soon as decoding returns.
///   Plain `Deserialize<'de>` would let `T` borrow from the buffer, which
///   doesn't work for files read into a temporary `Vec`.
///
/// Implementations must be lossless for every type in this crate: decoding
/// what `encode` produced gives back an equal value.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// JSON is human-readable, which is what you want for scripts that people
/// write and tweak by hand, and for traffic dumps you read in a terminal.
/// The cost is size and parse time, neither of which matters at the edges
/// where codecs are used: messages on the bus are never serialized.
///
/// Messages use serde's internally tagged form, so every object carries a
/// `"type"` field naming the variant next to the payload fields.
///
/// Only available with the `json` feature, which is on by default. Turning
/// it off drops the `serde_json` dependency for users who bring their own
/// codec.
///
/// ```rust
/// use vidlink_protocol::{Codec, EntityDisappear, EntityId, JsonCodec, Message};
///
/// let codec = JsonCodec;
/// let msg: Message = EntityDisappear { entity_id: EntityId(2) }.into();
///
/// let bytes = codec.encode(&msg).unwrap();
/// let decoded: Message = codec.decode(&bytes).unwrap();
/// assert_eq!(msg, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
