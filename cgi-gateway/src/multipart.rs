//! `multipart/form-data` body splitting.
//!
//! Thin adapter over [`multer`]: given the boundary token and the buffered
//! body, returns every part with its raw headers and content. Interpreting
//! `Content-Disposition` is left to the request decoder.
//!
//! `multer` is a stream parser; the whole body is already in memory, so it is
//! fed as a single chunk and driven to completion on the current thread.

use bytes::Bytes;
use futures::stream;
use http::HeaderMap;

/// One part of a multipart body.
#[derive(Clone, Debug)]
pub struct BodyPart {
    /// The part's own headers (`Content-Disposition`, `Content-Type`, ...).
    pub headers: HeaderMap,
    /// Raw part content.
    pub content: Bytes,
}

/// Split `body` into parts delimited by `boundary`.
///
/// Fails if the framing cannot be parsed, including a body that ends before
/// the closing delimiter.
pub fn parse(boundary: &str, body: Bytes) -> Result<Vec<BodyPart>, multer::Error> {
    let chunks = stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(chunks, boundary);

    futures::executor::block_on(async move {
        let mut parts = Vec::new();
        while let Some(field) = multipart.next_field().await? {
            let headers = field.headers().clone();
            let content = field.bytes().await?;
            parts.push(BodyPart { headers, content });
        }
        Ok(parts)
    })
}
