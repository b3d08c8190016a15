//! Error types for replset-proxy.

use thiserror::Error;

use crate::topology::MappingFailure;

/// Main error type for all rewrite operations.
///
/// Every variant except [`ProxyError::ReplicaSetChanged`] means the wire
/// state of the connection is unknown and the caller must tear it down.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// I/O error on the client or server stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// BSON deserialization error.
    #[error("BSON decode error: {0}")]
    BsonDecode(#[from] bson::de::Error),

    /// BSON serialization error.
    #[error("BSON encode error: {0}")]
    BsonEncode(#[from] bson::ser::Error),

    /// Protocol error (unexpected op code, unsupported reply shape, bad length).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The replica set no longer matches the last observed topology.
    ///
    /// Expected during normal operation; the caller should resync and retry.
    #[error("replica set config changed")]
    ReplicaSetChanged,

    /// Address translation failed in a way the rewrite cannot absorb.
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingFailure),

    /// Invalid configuration.
    #[error("Config error: {0}")]
    Config(String),
}

impl ProxyError {
    /// True for the topology drift signal, which is not a real failure.
    #[inline]
    pub fn is_replica_set_changed(&self) -> bool {
        matches!(self, ProxyError::ReplicaSetChanged)
    }
}

/// Result type alias using ProxyError.
pub type Result<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::ReplicaState;

    #[test]
    fn test_replica_set_changed_is_distinguished() {
        assert!(ProxyError::ReplicaSetChanged.is_replica_set_changed());
        assert!(!ProxyError::Protocol("x".into()).is_replica_set_changed());
    }

    #[test]
    fn test_mapping_failure_converts() {
        let err: ProxyError = MappingFailure::Member {
            host: "a:27017".to_string(),
            state: ReplicaState::Arbiter,
        }
        .into();
        assert!(matches!(err, ProxyError::Mapping(_)));
        assert!(err.to_string().contains("a:27017"));
        assert!(err.to_string().contains("ARBITER"));
    }
}
