//! OP_REPLY prefix with typed accessors.
//!
//! The 20 bytes between the header and the first returned document:
//! ```text
//! ┌───────────────┬──────────┬──────────────┬────────────────┐
//! │ responseFlags │ cursorID │ startingFrom │ numberReturned │
//! │ 4 bytes       │ 8 bytes  │ 4 bytes      │ 4 bytes        │
//! └───────────────┴──────────┴──────────────┴────────────────┘
//! ```
//!
//! The raw bytes are kept as-is so a rewritten reply carries the exact
//! prefix the server sent.

use tokio::io::{AsyncRead, AsyncReadExt};

use super::wire_format::get_i32;
use crate::error::Result;

/// Reply prefix size in bytes.
pub const REPLY_PREFIX_SIZE: usize = 20;

/// Byte offset of `numberReturned` inside the prefix.
const NUMBER_RETURNED_OFFSET: usize = 16;

/// Raw OP_REPLY prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplyPrefix(pub [u8; REPLY_PREFIX_SIZE]);

impl ReplyPrefix {
    /// Build a prefix from its four fields.
    ///
    /// # Example
    ///
    /// ```
    /// use replset_proxy::protocol::ReplyPrefix;
    ///
    /// let prefix = ReplyPrefix::new(8, 0, 0, 1);
    /// assert_eq!(prefix.response_flags(), 8);
    /// assert_eq!(prefix.number_returned(), 1);
    /// ```
    pub fn new(response_flags: i32, cursor_id: i64, starting_from: i32, number_returned: i32) -> Self {
        let mut buf = [0u8; REPLY_PREFIX_SIZE];
        buf[0..4].copy_from_slice(&response_flags.to_le_bytes());
        buf[4..12].copy_from_slice(&cursor_id.to_le_bytes());
        buf[12..16].copy_from_slice(&starting_from.to_le_bytes());
        buf[16..20].copy_from_slice(&number_returned.to_le_bytes());
        Self(buf)
    }

    /// Read the prefix from a stream.
    pub async fn read<R>(reader: &mut R) -> Result<Self>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut buf = [0u8; REPLY_PREFIX_SIZE];
        reader.read_exact(&mut buf).await?;
        Ok(Self(buf))
    }

    /// Get the raw prefix bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn response_flags(&self) -> i32 {
        get_i32(&self.0, 0)
    }

    #[inline]
    pub fn cursor_id(&self) -> i64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.0[4..12]);
        i64::from_le_bytes(raw)
    }

    #[inline]
    pub fn starting_from(&self) -> i32 {
        get_i32(&self.0, 12)
    }

    /// Number of documents that follow the prefix.
    #[inline]
    pub fn number_returned(&self) -> i32 {
        get_i32(&self.0, NUMBER_RETURNED_OFFSET)
    }
}
