//! Collaborators the rewriters consult: address translation and topology
//! comparison. Both are owned outside this crate and shared across
//! connections, hence `Send + Sync`.

use thiserror::Error;

use super::{IsMasterResponse, ReplSetStatusResponse, ReplicaState};

/// Boxed error for failures the mapper cannot classify.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a real address has no proxy address.
#[derive(Debug, Error)]
pub enum MappingFailure {
    /// The host is a known member whose state keeps it unproxied.
    #[error("no proxy for member {host} in state {state}")]
    Member { host: String, state: ReplicaState },

    /// Anything else; never tolerated by the rewriters.
    #[error("failed to map {host}: {source}")]
    Unclassified {
        host: String,
        #[source]
        source: BoxError,
    },
}

impl MappingFailure {
    /// The address that failed to map.
    pub fn host(&self) -> &str {
        match self {
            MappingFailure::Member { host, .. } | MappingFailure::Unclassified { host, .. } => host,
        }
    }
}

/// Maps real server addresses to the addresses of their proxies.
pub trait ProxyMapper: Send + Sync {
    fn proxy(&self, host: &str) -> Result<String, MappingFailure>;
}

impl<F> ProxyMapper for F
where
    F: Fn(&str) -> Result<String, MappingFailure> + Send + Sync,
{
    fn proxy(&self, host: &str) -> Result<String, MappingFailure> {
        self(host)
    }
}

/// Checks a freshly read reply against the last observed replica set.
///
/// Pure queries; the rewriters never update the tracked state.
pub trait ReplicaStateCompare: Send + Sync {
    fn same_is_master(&self, response: &IsMasterResponse) -> bool;
    fn same_repl_set_status(&self, response: &ReplSetStatusResponse) -> bool;
}
