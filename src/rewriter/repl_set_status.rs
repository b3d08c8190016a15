//! Cluster-status (`replSetGetStatus`) reply rewriting.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};

use super::report::{proxy_or_drop, RewriteReport};
use super::reply_rw::ReplyRw;
use crate::error::{ProxyError, Result};
use crate::topology::{ProxyMapper, ReplSetStatusResponse, ReplicaStateCompare};

/// Rewrites the `replSetGetStatus` reply.
///
/// Every member name goes through the tolerant host-list policy; there is
/// no field here whose mapping failure is fatal on its own.
#[derive(Clone)]
pub struct ReplSetGetStatusResponseRewriter {
    mapper: Arc<dyn ProxyMapper>,
    compare: Arc<dyn ReplicaStateCompare>,
    reply_rw: ReplyRw,
}

impl ReplSetGetStatusResponseRewriter {
    pub fn new(
        mapper: Arc<dyn ProxyMapper>,
        compare: Arc<dyn ReplicaStateCompare>,
        reply_rw: ReplyRw,
    ) -> Self {
        Self {
            mapper,
            compare,
            reply_rw,
        }
    }

    /// Read the server's reply, rewrite member names, and send it on.
    pub async fn rewrite<C, S>(&self, client: &mut C, server: &mut S) -> Result<RewriteReport>
    where
        C: AsyncWrite + Unpin + ?Sized,
        S: AsyncRead + Unpin + ?Sized,
    {
        let mut reply = self
            .reply_rw
            .read_one::<ReplSetStatusResponse, _>(server)
            .await?;
        if !self.compare.same_repl_set_status(&reply.document) {
            tracing::debug!("replSetGetStatus reply differs from last known replica set");
            return Err(ProxyError::ReplicaSetChanged);
        }

        let mut report = RewriteReport::default();
        let members = std::mem::take(&mut reply.document.members);
        let mut kept = Vec::with_capacity(members.len());
        for mut member in members {
            if let Some(mapped) = proxy_or_drop(self.mapper.as_ref(), &member.name, &mut report)? {
                member.name = mapped;
                kept.push(member);
            }
        }
        reply.document.members = kept;

        self.reply_rw.write_one(client, &reply).await?;
        Ok(report)
    }
}
