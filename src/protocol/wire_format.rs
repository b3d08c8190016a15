//! Message header encoding and decoding.
//!
//! Every message starts with a 16-byte header:
//! ```text
//! ┌───────────────┬───────────┬────────────┬──────────┐
//! │ MessageLength │ RequestID │ ResponseTo │ OpCode   │
//! │ int32 LE      │ int32 LE  │ int32 LE   │ int32 LE │
//! └───────────────┴───────────┴────────────┴──────────┘
//! ```
//!
//! `MessageLength` counts the header itself plus the body.

use std::fmt;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{ProxyError, Result};

/// Header size in bytes (fixed, exactly 16).
pub const HEADER_SIZE: usize = 16;

/// Wire operation code.
///
/// Kept as an open newtype: decoding never rejects an op code, callers
/// compare against the named constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpCode(pub i32);

impl OpCode {
    /// Reply to a client request.
    pub const REPLY: OpCode = OpCode(1);
    /// Update document.
    pub const UPDATE: OpCode = OpCode(2001);
    /// Insert new document.
    pub const INSERT: OpCode = OpCode(2002);
    /// Query a collection.
    pub const QUERY: OpCode = OpCode(2004);
    /// Get more data from a query.
    pub const GET_MORE: OpCode = OpCode(2005);
    /// Delete documents.
    pub const DELETE: OpCode = OpCode(2006);
    /// Close cursors.
    pub const KILL_CURSORS: OpCode = OpCode(2007);
    /// Cluster internal command.
    pub const COMMAND: OpCode = OpCode(2010);
    /// Reply to a cluster internal command.
    pub const COMMAND_REPLY: OpCode = OpCode(2011);
    /// Compressed wrapper around another op.
    pub const COMPRESSED: OpCode = OpCode(2012);
    /// Extensible message format.
    pub const MSG: OpCode = OpCode(2013);

    fn name(self) -> Option<&'static str> {
        Some(match self {
            OpCode::REPLY => "OP_REPLY",
            OpCode::UPDATE => "OP_UPDATE",
            OpCode::INSERT => "OP_INSERT",
            OpCode::QUERY => "OP_QUERY",
            OpCode::GET_MORE => "OP_GET_MORE",
            OpCode::DELETE => "OP_DELETE",
            OpCode::KILL_CURSORS => "OP_KILL_CURSORS",
            OpCode::COMMAND => "OP_COMMAND",
            OpCode::COMMAND_REPLY => "OP_COMMANDREPLY",
            OpCode::COMPRESSED => "OP_COMPRESSED",
            OpCode::MSG => "OP_MSG",
            _ => return None,
        })
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "UNKNOWN({})", self.0),
        }
    }
}

/// Decoded message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Total message length in bytes, header included.
    pub message_length: i32,
    /// Identifier assigned by the sender.
    pub request_id: i32,
    /// Request identifier this message answers (replies only).
    pub response_to: i32,
    /// Operation code.
    pub op_code: OpCode,
}

impl MessageHeader {
    /// Create a new header.
    pub fn new(message_length: i32, request_id: i32, response_to: i32, op_code: OpCode) -> Self {
        Self {
            message_length,
            request_id,
            response_to,
            op_code,
        }
    }

    /// Encode header to bytes (Little Endian).
    ///
    /// # Example
    ///
    /// ```
    /// use replset_proxy::protocol::{MessageHeader, OpCode};
    ///
    /// let header = MessageHeader::new(41, 7, 3, OpCode::REPLY);
    /// let bytes = header.encode();
    /// assert_eq!(bytes.len(), 16);
    /// assert_eq!(&bytes[..4], &41i32.to_le_bytes());
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.message_length.to_le_bytes());
        buf[4..8].copy_from_slice(&self.request_id.to_le_bytes());
        buf[8..12].copy_from_slice(&self.response_to.to_le_bytes());
        buf[12..16].copy_from_slice(&self.op_code.0.to_le_bytes());
        buf
    }

    /// Decode header from bytes (Little Endian).
    ///
    /// Returns `None` if buffer is too short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            message_length: get_i32(buf, 0),
            request_id: get_i32(buf, 4),
            response_to: get_i32(buf, 8),
            op_code: OpCode(get_i32(buf, 12)),
        })
    }

    /// Number of bytes following the header.
    #[inline]
    pub fn body_len(&self) -> usize {
        (self.message_length as usize).saturating_sub(HEADER_SIZE)
    }

    /// Check the declared length against a configured maximum.
    pub fn validate(&self, max_message_size: u32) -> Result<()> {
        if self.message_length as u32 > max_message_size {
            return Err(ProxyError::Protocol(format!(
                "message length {} exceeds maximum {}",
                self.message_length, max_message_size
            )));
        }
        Ok(())
    }
}

/// Read a little-endian i32 at `offset`.
///
/// # Panics
///
/// Panics if `buf` holds fewer than `offset + 4` bytes.
#[inline]
pub fn get_i32(buf: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

/// Read one message header from a stream.
///
/// Only structural checks are made: the declared length must at least
/// cover the header. Op code checks are left to the caller.
pub async fn read_header<R>(reader: &mut R) -> Result<MessageHeader>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = [0u8; HEADER_SIZE];
    reader.read_exact(&mut buf).await?;

    let header = MessageHeader::decode(&buf)
        .ok_or_else(|| ProxyError::Protocol("short message header".to_string()))?;
    if header.message_length < HEADER_SIZE as i32 {
        return Err(ProxyError::Protocol(format!(
            "message length {} is smaller than the header",
            header.message_length
        )));
    }
    Ok(header)
}
