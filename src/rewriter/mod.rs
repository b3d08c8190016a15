//! Rewriter module - response rewriting for intercepted queries.
//!
//! Provides:
//! - [`ReplyRw`] - read one reply document, let the caller mutate it, write it back
//! - [`GetLastErrorRewriter`] - per-connection getLastError cache
//! - [`IsMasterResponseRewriter`] - proxy addresses in primary-discovery replies
//! - [`ReplSetGetStatusResponseRewriter`] - proxy addresses in cluster-status replies
//! - [`Rewriters`] - all of the above assembled from shared collaborators
//!
//! Each rewriter performs its own reads and writes on the streams it is
//! given. An `Err` means the connection pair is mid-message and must be
//! rebuilt; the one exception is [`ProxyError::ReplicaSetChanged`], which
//! asks the caller to resync topology first.
//!
//! [`ProxyError::ReplicaSetChanged`]: crate::error::ProxyError::ReplicaSetChanged

mod is_master;
mod last_error;
mod repl_set_status;
mod reply_rw;
mod report;
mod set;

pub use is_master::IsMasterResponseRewriter;
pub use last_error::{CachedReply, GetLastErrorRewriter, LastError};
pub use repl_set_status::ReplSetGetStatusResponseRewriter;
pub use reply_rw::{OneReply, ReplyRw};
pub use report::{DroppedMember, RewriteReport};
pub use set::{Rewriters, RewritersBuilder};
