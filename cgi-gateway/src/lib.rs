//! # cgi-gateway
//!
//! Request decoding and response formatting for programs run under the
//! Common Gateway Interface.
//!
//! A CGI program is started by the web server once per request. The request
//! arrives as environment variables plus a body on stdin; the response goes to
//! stdout as header lines, a blank line, then the body. This crate turns that
//! into a handler call:
//!
//! ```rust,no_run
//! use cgi_gateway::prelude::*;
//!
//! fn greet(cgi: &mut Cgi) -> Result<CgiResult, CgiError> {
//!     let name = cgi.get_input("name").unwrap_or_else(|| "world".into());
//!     cgi.set_header("Content-Type", "text/plain; charset=utf-8");
//!     Ok(output(format!("Hello, {name}!\n")))
//! }
//!
//! fn main() -> Result<(), RunError> {
//!     cgi_gateway::run_stdio(handle_errors(greet))
//! }
//! ```
//!
//! ## Features
//!
//! - **Inputs:** query strings, `application/x-www-form-urlencoded` bodies and
//!   `multipart/form-data` uploads decoded into one [`Inputs`] table.
//! - **Context:** handlers read the request and set headers through
//!   [`CgiContext`]; [`CgiContext::protect`] rolls back header changes of a
//!   failed step.
//! - **Errors:** [`CgiError`] maps to an HTTP status; [`handle_errors`] turns
//!   it into an error page.
//! - **Logging:** decoding and the request lifecycle emit `tracing` events.
//!   Install a subscriber that writes to stderr, since stdout carries the
//!   response.

pub mod context;
pub mod cookie;
pub mod error;
pub mod handler;
pub mod multipart;
pub mod pipeline;
pub mod request;
pub mod response;

pub use context::{
    BodyLimits, CGI_VARIABLES, Cgi, CgiConfig, CgiContext, CgiState, Environment,
};
pub use cookie::{Cookie, find_cookie};
pub use error::{CgiError, RunError};
pub use handler::handle_errors;
pub use pipeline::{CgiRunner, run, run_stdio};
pub use request::{DecodeWarning, Input, Inputs, decode_input};
pub use response::{
    CgiResult, format_response, output, output_error, output_internal_server_error,
    output_method_not_allowed, output_not_found, redirect,
};

// Re-export the protocol primitives
pub use cgi_gateway_core::{
    ContentDisposition, ContentType, HeaderKey, HeaderParseError, Headers, form,
};
pub use http::StatusCode;

pub mod prelude {
    //! The types most handlers need.
    pub use crate::context::{Cgi, CgiConfig, CgiContext};
    pub use crate::cookie::Cookie;
    pub use crate::error::{CgiError, RunError};
    pub use crate::handler::handle_errors;
    pub use crate::pipeline::CgiRunner;
    pub use crate::response::{CgiResult, output, redirect};
    pub use http::StatusCode;
}
