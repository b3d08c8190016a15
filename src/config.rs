//! Protocol limits shared by every rewriter.
//!
//! Limits are applied to lengths read off the wire before any buffer of
//! that size is allocated. They can be loaded from JSON, with missing
//! fields falling back to the defaults:
//!
//! ```
//! use replset_proxy::config::{ProtocolConfig, DEFAULT_MAX_MESSAGE_SIZE};
//!
//! let config = ProtocolConfig::from_json(r#"{"max_document_size": 1048576}"#).unwrap();
//! assert_eq!(config.max_document_size, 1_048_576);
//! assert_eq!(config.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ProxyError, Result};
use crate::protocol::{HEADER_SIZE, MIN_DOCUMENT_SIZE, REPLY_PREFIX_SIZE};

/// Default maximum message size (header included), as advertised by servers.
pub const DEFAULT_MAX_MESSAGE_SIZE: u32 = 48_000_000;

/// Default maximum document size: 16 MiB plus room for command overhead.
pub const DEFAULT_MAX_DOCUMENT_SIZE: u32 = 16 * 1024 * 1024 + 16 * 1024;

/// Size limits enforced while reading from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Largest `MessageLength` accepted from either peer.
    pub max_message_size: u32,
    /// Largest length-prefixed document accepted in a reply.
    pub max_document_size: u32,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
        }
    }
}

impl ProtocolConfig {
    /// Parse and validate a JSON config object.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ProxyError::Config(format!("invalid protocol config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject limits that could not fit even the smallest valid reply.
    pub fn validate(&self) -> Result<()> {
        let min_message = (HEADER_SIZE + REPLY_PREFIX_SIZE + MIN_DOCUMENT_SIZE) as u32;
        if self.max_message_size < min_message {
            return Err(ProxyError::Config(format!(
                "max_message_size {} is below the minimum reply size {}",
                self.max_message_size, min_message
            )));
        }
        if self.max_document_size < MIN_DOCUMENT_SIZE as u32 {
            return Err(ProxyError::Config(format!(
                "max_document_size {} is below the minimum document size {}",
                self.max_document_size, MIN_DOCUMENT_SIZE
            )));
        }
        if self.max_message_size > i32::MAX as u32 {
            return Err(ProxyError::Config(format!(
                "max_message_size {} does not fit a 32-bit signed length",
                self.max_message_size
            )));
        }
        Ok(())
    }
}
