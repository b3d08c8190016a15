//! BSON codec using the `bson` crate.
//!
//! Encoding always produces a complete document in memory; nothing is
//! streamed, so a failed encode never leaves a half-written reply behind.

use crate::error::Result;

/// BSON codec for reply documents.
pub struct BsonCodec;

impl BsonCodec {
    /// Encode a value to BSON bytes (length prefix included).
    ///
    /// # Errors
    ///
    /// Returns error if the value does not serialize to a document.
    #[inline]
    pub fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        Ok(bson::to_vec(value)?)
    }

    /// Decode BSON bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes cannot be deserialized to type T.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(bson::from_slice(bytes)?)
    }
}
