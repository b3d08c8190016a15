//! Startup-time assembly of the rewriters.
//!
//! Collaborators are handed over once; the resulting [`Rewriters`] is
//! cheap to clone into every connection task.
//!
//! # Example
//!
//! ```ignore
//! use replset_proxy::Rewriters;
//!
//! let rewriters = Rewriters::builder(mapper, tracker)
//!     .max_document_size(4 * 1024 * 1024)
//!     .build()?;
//!
//! // per connection
//! let mut last_error = LastError::new();
//! rewriters
//!     .last_error()
//!     .rewrite(&header, &[&head], &mut client, &mut server, &mut last_error)
//!     .await?;
//! ```

use std::sync::Arc;

use super::{GetLastErrorRewriter, IsMasterResponseRewriter, ReplSetGetStatusResponseRewriter, ReplyRw};
use crate::config::ProtocolConfig;
use crate::error::Result;
use crate::topology::{ProxyMapper, ReplicaStateCompare};

/// Builder for [`Rewriters`].
pub struct RewritersBuilder {
    mapper: Arc<dyn ProxyMapper>,
    compare: Arc<dyn ReplicaStateCompare>,
    config: ProtocolConfig,
}

impl RewritersBuilder {
    /// Create a builder with the default protocol limits.
    pub fn new(mapper: Arc<dyn ProxyMapper>, compare: Arc<dyn ReplicaStateCompare>) -> Self {
        Self {
            mapper,
            compare,
            config: ProtocolConfig::default(),
        }
    }

    /// Replace all protocol limits.
    pub fn config(mut self, config: ProtocolConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the largest message accepted from a server.
    ///
    /// Default: 48,000,000 bytes
    pub fn max_message_size(mut self, size: u32) -> Self {
        self.config.max_message_size = size;
        self
    }

    /// Set the largest reply document accepted.
    ///
    /// Default: 16 MiB + 16 KiB
    pub fn max_document_size(mut self, size: u32) -> Self {
        self.config.max_document_size = size;
        self
    }

    /// Validate the limits and build the rewriters.
    pub fn build(self) -> Result<Rewriters> {
        self.config.validate()?;
        let reply_rw = ReplyRw::new(self.config);

        Ok(Rewriters {
            last_error: GetLastErrorRewriter::new(self.config),
            is_master: IsMasterResponseRewriter::new(
                self.mapper.clone(),
                self.compare.clone(),
                reply_rw.clone(),
            ),
            repl_set_status: ReplSetGetStatusResponseRewriter::new(
                self.mapper,
                self.compare,
                reply_rw,
            ),
        })
    }
}

/// All response rewriters, sharing one mapper, comparator, and config.
#[derive(Clone)]
pub struct Rewriters {
    last_error: GetLastErrorRewriter,
    is_master: IsMasterResponseRewriter,
    repl_set_status: ReplSetGetStatusResponseRewriter,
}

impl Rewriters {
    pub fn builder(
        mapper: Arc<dyn ProxyMapper>,
        compare: Arc<dyn ReplicaStateCompare>,
    ) -> RewritersBuilder {
        RewritersBuilder::new(mapper, compare)
    }

    pub fn last_error(&self) -> &GetLastErrorRewriter {
        &self.last_error
    }

    pub fn is_master(&self) -> &IsMasterResponseRewriter {
        &self.is_master
    }

    pub fn repl_set_status(&self) -> &ReplSetGetStatusResponseRewriter {
        &self.repl_set_status
    }
}
