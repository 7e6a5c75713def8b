use crate::error::SerializeError;
use crate::message::Message;

/// Converts messages to the opaque strings kept in the store and back.
///
/// Implementations must round-trip `payload` and `execute_at` losslessly and
/// report every failure; a decode error is never turned into an empty or
/// default message.
pub trait Serializer: Send + Sync {
    fn serialize(&self, message: &Message) -> Result<String, SerializeError>;

    fn deserialize(&self, raw: &str) -> Result<Message, SerializeError>;
}

/// JSON encoding via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(&self, message: &Message) -> Result<String, SerializeError> {
        serde_json::to_string(message).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    fn deserialize(&self, raw: &str) -> Result<Message, SerializeError> {
        serde_json::from_str(raw).map_err(|e| SerializeError::Decode(e.to_string()))
    }
}
