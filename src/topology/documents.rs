//! Reply shapes for the topology queries.
//!
//! Only the address-bearing fields are modelled. Everything else lands in
//! the `extra` document and is written back unchanged.

use bson::Document;
use serde::{Deserialize, Serialize};

use super::ReplicaState;

/// Reply to the primary-discovery (`isMaster`) query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IsMasterResponse {
    /// Data-bearing members, in server order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    /// Address of the answering node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub me: Option<String>,
    #[serde(flatten)]
    pub extra: Document,
}

/// One entry of `members` in a cluster-status reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusMember {
    pub name: String,
    /// Server spelling of the member state, written back verbatim.
    #[serde(rename = "stateStr", default, skip_serializing_if = "Option::is_none")]
    pub state_str: Option<String>,
    #[serde(rename = "self", default, skip_serializing_if = "is_false")]
    pub is_self: bool,
    #[serde(flatten)]
    pub extra: Document,
}

/// Reply to the cluster-status (`replSetGetStatus`) query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplSetStatusResponse {
    #[serde(default)]
    pub members: Vec<StatusMember>,
    #[serde(flatten)]
    pub extra: Document,
}

impl StatusMember {
    /// Classified member state. Spellings outside the known set read as
    /// [`ReplicaState::Unknown`].
    pub fn state(&self) -> Option<ReplicaState> {
        self.state_str.as_deref().map(ReplicaState::from_state_str)
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::BsonCodec;
    use bson::doc;

    #[test]
    fn test_is_master_decode() {
        let raw = BsonCodec::encode(&doc! {
            "ismaster": true,
            "hosts": ["a:27017", "b:27017"],
            "primary": "a:27017",
            "me": "b:27017",
            "setName": "rs0",
            "ok": 1.0,
        })
        .unwrap();

        let q: IsMasterResponse = BsonCodec::decode(&raw).unwrap();
        assert_eq!(q.hosts, vec!["a:27017", "b:27017"]);
        assert_eq!(q.primary.as_deref(), Some("a:27017"));
        assert_eq!(q.me.as_deref(), Some("b:27017"));
        assert_eq!(q.extra.get_bool("ismaster").unwrap(), true);
        assert_eq!(q.extra.get_str("setName").unwrap(), "rs0");
        assert!(!q.extra.contains_key("hosts"));
    }

    #[test]
    fn test_is_master_standalone_has_no_topology_fields() {
        let raw = BsonCodec::encode(&doc! { "ismaster": true, "ok": 1.0 }).unwrap();
        let q: IsMasterResponse = BsonCodec::decode(&raw).unwrap();
        assert!(q.hosts.is_empty());
        assert!(q.primary.is_none());
        assert!(q.me.is_none());

        // Absent fields stay absent on the way back out.
        assert_eq!(BsonCodec::encode(&q).unwrap(), raw);
    }

    #[test]
    fn test_status_member_decode() {
        let raw = BsonCodec::encode(&doc! {
            "set": "rs0",
            "members": [
                { "_id": 0, "name": "a:27017", "health": 1.0, "stateStr": "PRIMARY", "self": true },
                { "_id": 1, "name": "c:27017", "stateStr": "ARBITER" },
            ],
            "ok": 1.0,
        })
        .unwrap();

        let q: ReplSetStatusResponse = BsonCodec::decode(&raw).unwrap();
        assert_eq!(q.members.len(), 2);
        assert_eq!(q.members[0].name, "a:27017");
        assert_eq!(q.members[0].state(), Some(ReplicaState::Primary));
        assert!(q.members[0].is_self);
        assert_eq!(q.members[0].extra.get_f64("health").unwrap(), 1.0);
        assert_eq!(q.members[1].state(), Some(ReplicaState::Arbiter));
        assert!(!q.members[1].is_self);
        assert_eq!(q.extra.get_str("set").unwrap(), "rs0");
    }

    #[test]
    fn test_status_member_omits_false_self() {
        let member = StatusMember {
            name: "a:1".to_string(),
            state_str: Some(ReplicaState::Secondary.to_string()),
            is_self: false,
            extra: Document::new(),
        };
        let doc = bson::to_document(&member).unwrap();
        assert!(!doc.contains_key("self"));
        assert_eq!(doc.get_str("stateStr").unwrap(), "SECONDARY");
    }

    #[test]
    fn test_unrecognized_state_str_kept_verbatim() {
        let raw = BsonCodec::encode(&doc! {
            "members": [
                { "name": "a:1", "stateStr": "(not reachable/healthy)", "health": 0.0 },
                { "name": "b:1", "stateStr": "FATAL" },
            ],
            "ok": 1.0,
        })
        .unwrap();

        let q: ReplSetStatusResponse = BsonCodec::decode(&raw).unwrap();
        assert_eq!(q.members[0].state(), Some(ReplicaState::Unknown));
        assert_eq!(q.members[1].state(), Some(ReplicaState::Unknown));

        let out = bson::to_document(&q).unwrap();
        let members = out.get_array("members").unwrap();
        let states: Vec<&str> = members
            .iter()
            .map(|m| m.as_document().unwrap().get_str("stateStr").unwrap())
            .collect();
        assert_eq!(states, vec!["(not reachable/healthy)", "FATAL"]);
        assert_eq!(BsonCodec::encode(&q).unwrap(), raw);
    }
}
