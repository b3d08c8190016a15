//! getLastError short-circuit.
//!
//! The first write-acknowledgement query on a connection is proxied to
//! the server and its reply is kept in the connection's [`LastError`]
//! slot. Every later one is answered from that slot: the client's request
//! bytes are drained without reaching the server, and the cached reply is
//! replayed with `response_to` pointed at the new request.
//!
//! ```text
//! Empty ──(first query: proxy + cache)──► Populated ──(replay)──┐
//!                                              ▲                 │
//!                                              └─────────────────┘
//! ```
//!
//! The slot is never invalidated; it lives and dies with the connection.

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::ProtocolConfig;
use crate::error::{ProxyError, Result};
use crate::protocol::{read_header, MessageHeader, HEADER_SIZE};

/// A server reply captured for replay.
#[derive(Debug, Clone)]
pub struct CachedReply {
    pub header: MessageHeader,
    /// Everything after the header, verbatim.
    pub rest: Bytes,
}

impl CachedReply {
    fn to_wire(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + self.rest.len());
        buf.put_slice(&self.header.encode());
        buf.put_slice(&self.rest);
        buf.freeze()
    }
}

/// Per-connection getLastError cache. Starts empty.
#[derive(Debug, Default)]
pub struct LastError {
    cached: Option<CachedReply>,
}

impl LastError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a reply has been cached on this connection.
    #[inline]
    pub fn exists(&self) -> bool {
        self.cached.is_some()
    }

    pub fn cached(&self) -> Option<&CachedReply> {
        self.cached.as_ref()
    }
}

/// Proxies, caches, or replays getLastError replies.
#[derive(Debug, Clone, Default)]
pub struct GetLastErrorRewriter {
    config: ProtocolConfig,
}

impl GetLastErrorRewriter {
    pub fn new(config: ProtocolConfig) -> Self {
        Self { config }
    }

    /// Handle one getLastError request.
    ///
    /// `header` is the request's header and `parts` are the bytes of the
    /// request already read off the client (header bytes included).
    ///
    /// Any error leaves both streams mid-message; the connection must be
    /// closed.
    pub async fn rewrite<C, S>(
        &self,
        header: &MessageHeader,
        parts: &[&[u8]],
        client: &mut C,
        server: &mut S,
        last_error: &mut LastError,
    ) -> Result<()>
    where
        C: AsyncRead + AsyncWrite + Unpin + ?Sized,
        S: AsyncRead + AsyncWrite + Unpin + ?Sized,
    {
        let result = self
            .exchange(header, parts, client, server, last_error)
            .await;
        if let Err(e) = &result {
            tracing::error!("getLastError rewrite failed: {}", e);
        }
        result
    }

    async fn exchange<C, S>(
        &self,
        header: &MessageHeader,
        parts: &[&[u8]],
        client: &mut C,
        server: &mut S,
        last_error: &mut LastError,
    ) -> Result<()>
    where
        C: AsyncRead + AsyncWrite + Unpin + ?Sized,
        S: AsyncRead + AsyncWrite + Unpin + ?Sized,
    {
        let consumed: usize = parts.iter().map(|p| p.len()).sum();
        let pending = pending_len(header, consumed)?;

        let wire = match &mut last_error.cached {
            Some(cached) => {
                // Drain the rest of the query; the server never sees it.
                drain(client, pending).await?;
                cached.header.response_to = header.request_id;
                tracing::debug!(
                    "using cached getLastError response: {:?}",
                    cached.rest
                );
                cached.to_wire()
            }
            None => {
                let cached = self.fetch(parts, pending, client, server).await?;
                tracing::debug!("caching new getLastError response: {:?}", cached.rest);
                let wire = cached.to_wire();
                last_error.cached = Some(cached);
                wire
            }
        };

        client.write_all(&wire).await?;
        client.flush().await?;
        Ok(())
    }

    /// Forward the query to the server and read its whole reply.
    async fn fetch<C, S>(
        &self,
        parts: &[&[u8]],
        pending: u64,
        client: &mut C,
        server: &mut S,
    ) -> Result<CachedReply>
    where
        C: AsyncRead + Unpin + ?Sized,
        S: AsyncRead + AsyncWrite + Unpin + ?Sized,
    {
        for part in parts {
            server.write_all(part).await?;
        }
        forward(client, server, pending).await?;
        server.flush().await?;

        let header = read_header(server).await?;
        header.validate(self.config.max_message_size)?;

        let mut rest = BytesMut::zeroed(header.body_len());
        server.read_exact(&mut rest).await?;

        Ok(CachedReply {
            header,
            rest: rest.freeze(),
        })
    }
}

/// Bytes of the request still sitting on the client stream.
fn pending_len(header: &MessageHeader, consumed: usize) -> Result<u64> {
    let total = u64::try_from(header.message_length).map_err(|_| {
        ProxyError::Protocol(format!("negative message length {}", header.message_length))
    })?;
    total.checked_sub(consumed as u64).ok_or_else(|| {
        ProxyError::Protocol(format!(
            "already consumed {} bytes of a {} byte message",
            consumed, total
        ))
    })
}

/// Copy exactly `len` bytes from `from` to `to`.
async fn forward<R, W>(from: &mut R, to: &mut W, len: u64) -> Result<()>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let copied = tokio::io::copy(&mut (&mut *from).take(len), to).await?;
    ensure_complete(copied, len)
}

/// Read and drop exactly `len` bytes.
async fn drain<R>(from: &mut R, len: u64) -> Result<()>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let copied = tokio::io::copy(&mut (&mut *from).take(len), &mut tokio::io::sink()).await?;
    ensure_complete(copied, len)
}

fn ensure_complete(copied: u64, expected: u64) -> Result<()> {
    if copied < expected {
        return Err(ProxyError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("stream ended after {} of {} bytes", copied, expected),
        )));
    }
    Ok(())
}
