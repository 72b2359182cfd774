//! Core protocol types for cgi-gateway.
//!
//! This crate provides the protocol primitives used by the `cgi-gateway`
//! request decoder and response formatter.
//!
//! ## Contents
//!
//! - [`form`]: `application/x-www-form-urlencoded` encoding and decoding
//! - [`HeaderKey`] and [`Headers`]: case-insensitive keys and the response header table
//! - [`ContentType`] and [`ContentDisposition`]: header value parsing
//! - [`HeaderParseError`]: why a header value was rejected

pub mod form;
mod error;
mod header;
mod media;

pub use error::*;
pub use header::*;
pub use media::*;
