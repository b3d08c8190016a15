//! Replica member states as reported in `stateStr`.

use std::fmt;

/// Role of a replica set member.
///
/// Classified from the server's upper-case `stateStr`. Anything outside
/// the known set is [`ReplicaState::Unknown`]; the reply itself keeps the
/// server's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplicaState {
    Startup,
    Primary,
    Secondary,
    Recovering,
    Startup2,
    Unknown,
    Arbiter,
    Down,
    Rollback,
    Removed,
}

impl ReplicaState {
    /// Wire spelling of the state.
    pub fn as_str(self) -> &'static str {
        match self {
            ReplicaState::Startup => "STARTUP",
            ReplicaState::Primary => "PRIMARY",
            ReplicaState::Secondary => "SECONDARY",
            ReplicaState::Recovering => "RECOVERING",
            ReplicaState::Startup2 => "STARTUP2",
            ReplicaState::Unknown => "UNKNOWN",
            ReplicaState::Arbiter => "ARBITER",
            ReplicaState::Down => "DOWN",
            ReplicaState::Rollback => "ROLLBACK",
            ReplicaState::Removed => "REMOVED",
        }
    }

    /// Parse a `stateStr` value.
    pub fn from_state_str(s: &str) -> Self {
        match s {
            "STARTUP" => ReplicaState::Startup,
            "PRIMARY" => ReplicaState::Primary,
            "SECONDARY" => ReplicaState::Secondary,
            "RECOVERING" => ReplicaState::Recovering,
            "STARTUP2" => ReplicaState::Startup2,
            "ARBITER" => ReplicaState::Arbiter,
            "DOWN" => ReplicaState::Down,
            "ROLLBACK" => ReplicaState::Rollback,
            "REMOVED" => ReplicaState::Removed,
            _ => ReplicaState::Unknown,
        }
    }

    /// Arbiters hold no data and are never handed to clients.
    #[inline]
    pub fn is_arbiter(self) -> bool {
        self == ReplicaState::Arbiter
    }
}

impl fmt::Display for ReplicaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
