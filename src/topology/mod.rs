//! Topology module - replica states, reply shapes, and the collaborator
//! interfaces used while rewriting topology replies.

mod documents;
mod mapper;
mod state;

pub use documents::{IsMasterResponse, ReplSetStatusResponse, StatusMember};
pub use mapper::{BoxError, MappingFailure, ProxyMapper, ReplicaStateCompare};
pub use state::ReplicaState;
