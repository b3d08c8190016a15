//! Protocol module - message header, reply prefix, and document framing.
//!
//! This module implements the binary framing used by the rewriters:
//! - 16-byte message header encoding/decoding
//! - 20-byte OP_REPLY prefix
//! - Length-prefixed document reads
//!
//! Nothing here knows about document schemas.

mod document;
mod reply;
mod wire_format;

pub use document::{read_document, MIN_DOCUMENT_SIZE};
pub use reply::{ReplyPrefix, REPLY_PREFIX_SIZE};
pub use wire_format::{get_i32, read_header, MessageHeader, OpCode, HEADER_SIZE};
