//! Primary-discovery (`isMaster`) reply rewriting.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};

use super::report::{proxy_or_drop, RewriteReport};
use super::reply_rw::ReplyRw;
use crate::error::{ProxyError, Result};
use crate::topology::{IsMasterResponse, ProxyMapper, ReplicaStateCompare};

/// Rewrites the reply to the `isMaster` query so every address in it is
/// a proxy address.
///
/// Host-list entries that cannot be mapped for a known reason are left
/// out. `primary` and `me` must map or the whole reply is refused: a
/// client routes writes by them.
#[derive(Clone)]
pub struct IsMasterResponseRewriter {
    mapper: Arc<dyn ProxyMapper>,
    compare: Arc<dyn ReplicaStateCompare>,
    reply_rw: ReplyRw,
}

impl IsMasterResponseRewriter {
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

    /// Read the server's reply, rewrite it, and send it to the client.
    ///
    /// Returns [`ProxyError::ReplicaSetChanged`] without translating or
    /// writing anything if the reply no longer matches the tracked
    /// replica set.
    pub async fn rewrite<C, S>(&self, client: &mut C, server: &mut S) -> Result<RewriteReport>
    where
        C: AsyncWrite + Unpin + ?Sized,
        S: AsyncRead + Unpin + ?Sized,
    {
        let mut reply = self.reply_rw.read_one::<IsMasterResponse, _>(server).await?;
        if !self.compare.same_is_master(&reply.document) {
            tracing::debug!("isMaster reply differs from last known replica set");
            return Err(ProxyError::ReplicaSetChanged);
        }

        let mut report = RewriteReport::default();
        let q = &mut reply.document;

        let mut hosts = Vec::with_capacity(q.hosts.len());
        for host in &q.hosts {
            if let Some(mapped) = proxy_or_drop(self.mapper.as_ref(), host, &mut report)? {
                hosts.push(mapped);
            }
        }
        q.hosts = hosts;

        // failure in mapping the primary is fatal
        if let Some(primary) = q.primary.as_mut().filter(|p| !p.is_empty()) {
            *primary = self.mapper.proxy(primary)?;
        }
        // failure in mapping me is fatal
        if let Some(me) = q.me.as_mut().filter(|m| !m.is_empty()) {
            *me = self.mapper.proxy(me)?;
        }

        self.reply_rw.write_one(client, &reply).await?;
        Ok(report)
    }
}
