//! # replset-proxy
//!
//! Response rewriting core for a proxy that sits between clients of a
//! replicated document database and the real replica set members.
//!
//! Clients must only ever learn proxy addresses. The rewriters in this
//! crate intercept the replies that carry member addresses and translate
//! them, and they answer repeated `getLastError` queries from a
//! per-connection cache.
//!
//! ## Architecture
//!
//! - **protocol**: message header, OP_REPLY prefix, length-prefixed documents
//! - **codec**: BSON encode/decode of reply shapes
//! - **topology**: reply shapes, replica states, and the collaborator traits
//!   (address mapper, replica set comparator) implemented by the host proxy
//! - **rewriter**: the rewriters themselves and their startup assembly
//!
//! Accepting connections, maintaining the address table, and tracking
//! replica set membership all live outside this crate.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use replset_proxy::{LastError, ProxyError, Rewriters};
//!
//! let rewriters = Rewriters::builder(Arc::new(mapper), Arc::new(tracker)).build()?;
//!
//! // inside one connection task
//! let mut last_error = LastError::new();
//! match rewriters.is_master().rewrite(&mut client, &mut server).await {
//!     Ok(report) => {
//!         for member in report.unexpected() {
//!             // alert on mapping gaps
//!         }
//!     }
//!     Err(ProxyError::ReplicaSetChanged) => tracker.resync().await?,
//!     Err(e) => return Err(e), // close the connection pair
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod protocol;
pub mod rewriter;
pub mod topology;

#[cfg(test)]
mod testing;

pub use config::ProtocolConfig;
pub use error::{ProxyError, Result};
pub use rewriter::{
    GetLastErrorRewriter, IsMasterResponseRewriter, LastError, ReplSetGetStatusResponseRewriter,
    RewriteReport, Rewriters,
};
pub use topology::{MappingFailure, ProxyMapper, ReplicaState, ReplicaStateCompare};
