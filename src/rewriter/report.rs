//! Outcome of a topology rewrite.

use crate::error::Result;
use crate::topology::{MappingFailure, ProxyMapper, ReplicaState};

/// A member left out of a rewritten reply because it has no proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedMember {
    pub host: String,
    pub state: ReplicaState,
}

impl DroppedMember {
    /// Arbiters are dropped routinely; anything else points at a mapping gap.
    #[inline]
    pub fn is_unexpected(&self) -> bool {
        !self.state.is_arbiter()
    }
}

/// What a successful topology rewrite left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub dropped: Vec<DroppedMember>,
}

impl RewriteReport {
    /// Dropped members that were not arbiters.
    pub fn unexpected(&self) -> impl Iterator<Item = &DroppedMember> {
        self.dropped.iter().filter(|m| m.is_unexpected())
    }

    pub fn has_unexpected(&self) -> bool {
        self.unexpected().next().is_some()
    }
}

/// Map a host-list or member-list address.
///
/// Classified failures drop the entry (`Ok(None)`) and are recorded in
/// the report; unclassified failures abort the rewrite.
pub(crate) fn proxy_or_drop(
    mapper: &dyn ProxyMapper,
    host: &str,
    report: &mut RewriteReport,
) -> Result<Option<String>> {
    match mapper.proxy(host) {
        Ok(mapped) => Ok(Some(mapped)),
        Err(MappingFailure::Member { host, state }) => {
            if !state.is_arbiter() {
                tracing::error!("dropping member {} in state {}", host, state);
            }
            report.dropped.push(DroppedMember { host, state });
            Ok(None)
        }
        Err(err @ MappingFailure::Unclassified { .. }) => Err(err.into()),
    }
}
