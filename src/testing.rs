//! Shared helpers for unit tests.

use std::collections::HashMap;
use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use bson::Document;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::protocol::{MessageHeader, OpCode, ReplyPrefix, HEADER_SIZE, REPLY_PREFIX_SIZE};
use crate::topology::{
    IsMasterResponse, MappingFailure, ProxyMapper, ReplSetStatusResponse, ReplicaState,
    ReplicaStateCompare,
};

/// In-memory duplex stream: reads come from a fixed buffer, writes are
/// collected.
pub(crate) struct MockStream {
    inbound: Cursor<Vec<u8>>,
    outbound: Vec<u8>,
}

impl MockStream {
    pub(crate) fn new(inbound: Vec<u8>) -> Self {
        Self {
            inbound: Cursor::new(inbound),
            outbound: Vec::new(),
        }
    }

    pub(crate) fn written(&self) -> &[u8] {
        &self.outbound
    }

    pub(crate) fn read_position(&self) -> u64 {
        self.inbound.position()
    }

    pub(crate) fn fully_read(&self) -> bool {
        self.inbound.position() as usize == self.inbound.get_ref().len()
    }
}

impl AsyncRead for MockStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inbound).poll_read(cx, buf)
    }
}

impl AsyncWrite for MockStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.outbound.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// OP_REPLY carrying `doc`, with `number_returned` set to `count`.
pub(crate) fn reply_bytes_with_count(
    request_id: i32,
    response_to: i32,
    doc: &Document,
    count: i32,
) -> Vec<u8> {
    let body = bson::to_vec(doc).unwrap();
    let len = HEADER_SIZE + REPLY_PREFIX_SIZE + body.len();
    let header = MessageHeader::new(len as i32, request_id, response_to, OpCode::REPLY);

    let mut wire = header.encode().to_vec();
    wire.extend_from_slice(ReplyPrefix::new(8, 0, 0, count).as_bytes());
    wire.extend_from_slice(&body);
    wire
}

/// Single-document OP_REPLY.
pub(crate) fn reply_bytes(request_id: i32, response_to: i32, doc: &Document) -> Vec<u8> {
    reply_bytes_with_count(request_id, response_to, doc, 1)
}

/// OP_QUERY against `admin.$cmd`.
pub(crate) fn query_bytes(request_id: i32, doc: &Document) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&0i32.to_le_bytes());
    body.extend_from_slice(b"admin.$cmd\0");
    body.extend_from_slice(&0i32.to_le_bytes());
    body.extend_from_slice(&(-1i32).to_le_bytes());
    body.extend_from_slice(&bson::to_vec(doc).unwrap());

    let len = HEADER_SIZE + body.len();
    let mut wire = MessageHeader::new(len as i32, request_id, 0, OpCode::QUERY)
        .encode()
        .to_vec();
    wire.extend_from_slice(&body);
    wire
}

/// How [`TableMapper`] answers for one host.
pub(crate) enum Outcome {
    To(&'static str),
    Member(ReplicaState),
    Unclassified,
}

/// Mapper backed by a fixed table; unknown hosts fail unclassified.
pub(crate) struct TableMapper {
    table: HashMap<&'static str, Outcome>,
    calls: AtomicUsize,
}

impl TableMapper {
    pub(crate) fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Outcome)>,
    {
        Self {
            table: entries.into_iter().collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProxyMapper for TableMapper {
    fn proxy(&self, host: &str) -> Result<String, MappingFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.table.get(host) {
            Some(Outcome::To(mapped)) => Ok(mapped.to_string()),
            Some(Outcome::Member(state)) => Err(MappingFailure::Member {
                host: host.to_string(),
                state: *state,
            }),
            Some(Outcome::Unclassified) | None => Err(MappingFailure::Unclassified {
                host: host.to_string(),
                source: "no mapping".into(),
            }),
        }
    }
}

/// Comparator with a fixed answer.
pub(crate) struct FixedCompare(pub bool);

impl ReplicaStateCompare for FixedCompare {
    fn same_is_master(&self, _: &IsMasterResponse) -> bool {
        self.0
    }

    fn same_repl_set_status(&self, _: &ReplSetStatusResponse) -> bool {
        self.0
    }
}
