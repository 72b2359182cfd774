//! Top-level error handling for handlers.
//!
//! Errors from a plain handler end the invocation without a response. Wrap it
//! with [`handle_errors`] to answer with an error page instead.

use crate::context::CgiContext;
use crate::error::CgiError;
use crate::response::{CgiResult, output_error};

const INTERNAL_ERROR_MESSAGE: &str = "The server encountered an internal error.";

/// Wrap `handler` so that its errors become error pages.
///
/// The failed handler's header changes are discarded. The error is written to
/// the context log and to `tracing`. The page status comes from
/// [`CgiError::status_code`]; internal failures are not described to the
/// client.
///
/// ```rust
/// use cgi_gateway::{Cgi, CgiError, CgiResult, handle_errors};
///
/// fn hello(cgi: &mut Cgi) -> Result<CgiResult, CgiError> {
///     Err(CgiError::not_found("no such greeting"))
/// }
///
/// let handler = handle_errors(hello);
/// # let _ = handler;
/// ```
pub fn handle_errors<C, H>(handler: H) -> impl FnOnce(&mut C) -> Result<CgiResult, CgiError>
where
    C: CgiContext,
    H: FnOnce(&mut C) -> Result<CgiResult, CgiError>,
{
    move |ctx: &mut C| ctx.protect(handler, |ctx, err| Ok(error_page(ctx, err)))
}

fn error_page<C: CgiContext>(ctx: &mut C, err: CgiError) -> CgiResult {
    let status = err.status_code();
    tracing::error!(%status, error = %err, "handler failed");
    ctx.log(&format!("handler failed: {err}"));

    let message = match err {
        CgiError::Status { message, .. } => message,
        CgiError::Io(_) | CgiError::Other(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        other => other.to_string(),
    };
    output_error(ctx, status, &[message])
}
