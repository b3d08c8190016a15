//! Length-prefixed document reads.
//!
//! A document starts with its own total length as an int32 LE, so it can
//! be pulled off a stream without parsing it.

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use super::wire_format::get_i32;
use crate::error::{ProxyError, Result};

/// Smallest valid document: length prefix plus the trailing NUL.
pub const MIN_DOCUMENT_SIZE: usize = 5;

/// Read one document, length prefix included, rejecting anything larger
/// than `max_document_size`.
pub async fn read_document<R>(reader: &mut R, max_document_size: u32) -> Result<Bytes>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;

    let len = get_i32(&len_buf, 0);
    if len < MIN_DOCUMENT_SIZE as i32 {
        return Err(ProxyError::Protocol(format!(
            "document length {} is below the minimum {}",
            len, MIN_DOCUMENT_SIZE
        )));
    }
    if len as u32 > max_document_size {
        return Err(ProxyError::Protocol(format!(
            "document length {} exceeds maximum {}",
            len, max_document_size
        )));
    }

    let len = len as usize;
    let mut doc = BytesMut::with_capacity(len);
    doc.put_slice(&len_buf);
    doc.resize(len, 0);
    reader.read_exact(&mut doc[4..]).await?;
    Ok(doc.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_DOCUMENT_SIZE;

    #[tokio::test]
    async fn test_read_document_includes_prefix() {
        let raw = bson::to_vec(&bson::doc! { "ok": 1.0 }).unwrap();
        let mut stream = raw.clone();
        stream.extend_from_slice(b"trailing");

        let mut reader = &stream[..];
        let doc = read_document(&mut reader, DEFAULT_MAX_DOCUMENT_SIZE).await.unwrap();

        assert_eq!(&doc[..], &raw[..]);
        assert_eq!(reader, b"trailing");
    }

    #[tokio::test]
    async fn test_read_empty_document() {
        let raw = [5u8, 0, 0, 0, 0];
        let doc = read_document(&mut &raw[..], DEFAULT_MAX_DOCUMENT_SIZE).await.unwrap();
        assert_eq!(doc.len(), 5);
    }

    #[tokio::test]
    async fn test_read_document_rejects_short_length() {
        let raw = [4u8, 0, 0, 0];
        let err = read_document(&mut &raw[..], DEFAULT_MAX_DOCUMENT_SIZE).await.unwrap_err();
        assert!(err.to_string().contains("below the minimum"));
    }

    #[tokio::test]
    async fn test_read_document_rejects_oversize() {
        let raw = 1_000i32.to_le_bytes();
        let err = read_document(&mut &raw[..], 100).await.unwrap_err();
        assert!(err.to_string().contains("exceeds maximum"));
    }

    #[tokio::test]
    async fn test_read_document_truncated_body() {
        let mut raw = 32i32.to_le_bytes().to_vec();
        raw.extend_from_slice(&[1, 2, 3]);
        let err = read_document(&mut &raw[..], DEFAULT_MAX_DOCUMENT_SIZE).await.unwrap_err();
        assert!(matches!(err, ProxyError::Io(_)));
    }
}
