//! Single-document reply read/rewrite/write helper.
//!
//! [`ReplyRw::read_one`] pulls one OP_REPLY off the server stream and
//! decodes its only document into a typed shape. The caller mutates the
//! shape and hands it back to [`ReplyRw::write_one`], which re-encodes it
//! and fixes `MessageLength` by the size difference.
//!
//! ```ignore
//! let mut reply = reply_rw.read_one::<IsMasterResponse, _>(&mut server).await?;
//! reply.document.me = Some("proxy:6000".to_string());
//! reply_rw.write_one(&mut client, &reply).await?;
//! ```

use bytes::{BufMut, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::codec::BsonCodec;
use crate::config::ProtocolConfig;
use crate::error::{ProxyError, Result};
use crate::protocol::{
    read_document, read_header, MessageHeader, OpCode, ReplyPrefix, HEADER_SIZE, REPLY_PREFIX_SIZE,
};

/// A decoded single-document reply.
#[derive(Debug, Clone)]
pub struct OneReply<T> {
    /// Header as received; `message_length` still describes the original.
    pub header: MessageHeader,
    pub prefix: ReplyPrefix,
    /// Byte length of the document as received.
    pub original_len: i32,
    pub document: T,
}

/// Reads and writes single-document replies.
#[derive(Debug, Clone, Default)]
pub struct ReplyRw {
    config: ProtocolConfig,
}

impl ReplyRw {
    pub fn new(config: ProtocolConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Read a one-document reply from the server and decode it into `T`.
    ///
    /// # Errors
    ///
    /// - `Protocol` if the op code is not OP_REPLY or the reply does not
    ///   carry exactly one document (checked before the document is read)
    /// - `Protocol` if `MessageLength` does not cover exactly the header,
    ///   prefix, and document
    /// - `Io` / `BsonDecode` for stream and decode failures
    pub async fn read_one<T, R>(&self, server: &mut R) -> Result<OneReply<T>>
    where
        T: DeserializeOwned,
        R: AsyncRead + Unpin + ?Sized,
    {
        let result = self.read_reply(server).await;
        if let Err(e) = &result {
            tracing::error!("read_one failed: {}", e);
        }
        result
    }

    async fn read_reply<T, R>(&self, server: &mut R) -> Result<OneReply<T>>
    where
        T: DeserializeOwned,
        R: AsyncRead + Unpin + ?Sized,
    {
        let header = read_header(server).await?;
        if header.op_code != OpCode::REPLY {
            return Err(ProxyError::Protocol(format!(
                "read_one: expected op {}, got {}",
                OpCode::REPLY,
                header.op_code
            )));
        }
        header.validate(self.config.max_message_size)?;

        let prefix = ReplyPrefix::read(server).await?;
        let num_docs = prefix.number_returned();
        if num_docs != 1 {
            return Err(ProxyError::Protocol(format!(
                "read_one: can only handle 1 result document, got: {}",
                num_docs
            )));
        }

        let raw_doc = read_document(server, self.config.max_document_size).await?;
        let framed = HEADER_SIZE + REPLY_PREFIX_SIZE + raw_doc.len();
        if header.message_length as usize != framed {
            return Err(ProxyError::Protocol(format!(
                "read_one: message length {} does not match reply of {} bytes",
                header.message_length, framed
            )));
        }
        let document = BsonCodec::decode(&raw_doc)?;

        Ok(OneReply {
            header,
            prefix,
            original_len: raw_doc.len() as i32,
            document,
        })
    }

    /// Re-encode `reply.document` and send the reply to the client.
    ///
    /// The document is fully encoded before the first byte is written.
    pub async fn write_one<T, W>(&self, client: &mut W, reply: &OneReply<T>) -> Result<()>
    where
        T: Serialize,
        W: AsyncWrite + Unpin + ?Sized,
    {
        let new_doc = BsonCodec::encode(&reply.document)?;
        let header = resized_header(&reply.header, reply.original_len, new_doc.len())?;

        let mut buf = BytesMut::with_capacity(HEADER_SIZE + REPLY_PREFIX_SIZE + new_doc.len());
        buf.put_slice(&header.encode());
        buf.put_slice(reply.prefix.as_bytes());
        buf.put_slice(&new_doc);

        client.write_all(&buf).await?;
        client.flush().await?;
        Ok(())
    }
}

/// Shift `message_length` by the difference between the old and new document sizes.
fn resized_header(header: &MessageHeader, old_len: i32, new_len: usize) -> Result<MessageHeader> {
    let overflow = || {
        ProxyError::Protocol(format!(
            "rewritten document of {} bytes overflows message length {}",
            new_len, header.message_length
        ))
    };
    let new_len = i32::try_from(new_len).map_err(|_| overflow())?;
    let message_length = header
        .message_length
        .checked_sub(old_len)
        .and_then(|len| len.checked_add(new_len))
        .ok_or_else(overflow)?;

    Ok(MessageHeader {
        message_length,
        ..*header
    })
}
