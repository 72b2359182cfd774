//! Response rendering.
//!
//! A handler ends with a [`CgiResult`]; [`format_response`] turns it and the
//! accumulated headers into the bytes written back to the server:
//!
//! ```text
//! Content-Type: text/html; charset=ISO-8859-1
//! Status: 404 Not Found
//!
//! <body bytes>
//! ```
//!
//! No status line is written. The server derives one from `Status` or
//! `Location`.

use bytes::{Bytes, BytesMut};
use cgi_gateway_core::Headers;
use http::StatusCode;

use crate::context::CgiContext;

/// `Content-Type` used for output when the handler did not set one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=ISO-8859-1";

const ERROR_PAGE_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// What a handler produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CgiResult {
    /// Send these bytes as the response body.
    Output(Bytes),
    /// Send the client elsewhere. The body is empty.
    Redirect(String),
}

pub fn output(content: impl Into<Bytes>) -> CgiResult {
    CgiResult::Output(content.into())
}

pub fn redirect(url: impl Into<String>) -> CgiResult {
    CgiResult::Redirect(url.into())
}

/// Render a result and its headers in CGI response format.
///
/// For output, `Content-Type` defaults to [`DEFAULT_CONTENT_TYPE`] but an
/// explicit value is never replaced. For a redirect, `Location` is always set
/// to the target. Line breaks inside header names and values are dropped, so
/// each header occupies exactly one line.
pub fn format_response(result: CgiResult, mut headers: Headers) -> Bytes {
    let body = match result {
        CgiResult::Output(content) => {
            headers.insert_default("Content-Type", DEFAULT_CONTENT_TYPE);
            content
        }
        CgiResult::Redirect(url) => {
            headers.set("Location", url);
            Bytes::new()
        }
    };

    let header_len: usize = headers
        .iter()
        .map(|(name, value)| name.len() + value.len() + 3)
        .sum();
    let mut buf = BytesMut::with_capacity(header_len + 1 + body.len());
    for (name, value) in headers.iter() {
        put_single_line(&mut buf, name);
        buf.extend_from_slice(b": ");
        put_single_line(&mut buf, value);
        buf.extend_from_slice(b"\n");
    }
    buf.extend_from_slice(b"\n");
    buf.extend_from_slice(&body);
    buf.freeze()
}

fn put_single_line(buf: &mut BytesMut, text: &str) {
    for piece in text.split(['\r', '\n']) {
        buf.extend_from_slice(piece.as_bytes());
    }
}

/// Set `Status` and produce an HTML page describing the error.
///
/// `messages` are HTML-escaped, one paragraph each. The footer names the
/// server from `SERVER_SOFTWARE`, `SERVER_NAME` and `SERVER_PORT`.
pub fn output_error<C, M>(ctx: &mut C, status: StatusCode, messages: &[M]) -> CgiResult
where
    C: CgiContext,
    M: AsRef<str>,
{
    ctx.set_status(status);
    ctx.set_header("Content-Type", ERROR_PAGE_CONTENT_TYPE);

    let title = escape_html(&status.to_string());
    let footer = ctx.gets(|s| {
        format!(
            "{} at {} Port {}",
            s.env.server_software(),
            s.env.server_name(),
            s.env.var("SERVER_PORT").unwrap_or_default()
        )
    });

    let mut page = format!("<html><head><title>{title}</title></head><body><h1>{title}</h1>");
    for message in messages {
        page.push_str("<p>");
        page.push_str(&escape_html(message.as_ref()));
        page.push_str("</p>");
    }
    page.push_str("<hr><address>");
    page.push_str(&escape_html(&footer));
    page.push_str("</address></body></html>\n");
    output(page)
}

pub fn output_not_found<C: CgiContext>(ctx: &mut C, what: &str) -> CgiResult {
    output_error(
        ctx,
        StatusCode::NOT_FOUND,
        &[format!("The requested resource was not found: {what}")],
    )
}

/// 405 page; also sets `Allow` to the permitted methods.
pub fn output_method_not_allowed<C: CgiContext>(ctx: &mut C, allowed: &[&str]) -> CgiResult {
    let allow = allowed.join(", ");
    ctx.set_header("Allow", allow.as_str());
    let method = ctx.gets(|s| s.env.request_method().to_string());
    output_error(
        ctx,
        StatusCode::METHOD_NOT_ALLOWED,
        &[format!("Method {method} is not allowed. Allowed methods: {allow}")],
    )
}

pub fn output_internal_server_error<C, M>(ctx: &mut C, messages: &[M]) -> CgiResult
where
    C: CgiContext,
    M: AsRef<str>,
{
    output_error(ctx, StatusCode::INTERNAL_SERVER_ERROR, messages)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Cgi, Environment};
    use crate::request::Inputs;

    fn render(result: CgiResult, headers: &[(&str, &str)]) -> String {
        let headers = headers.iter().copied().collect();
        String::from_utf8(format_response(result, headers).to_vec()).unwrap()
    }

    #[test]
    fn test_output_gets_default_content_type() {
        assert_eq!(
            render(output("hi"), &[]),
            "Content-Type: text/html; charset=ISO-8859-1\n\nhi"
        );
    }

    #[test]
    fn test_output_keeps_explicit_content_type() {
        assert_eq!(
            render(output("{}"), &[("content-type", "application/json")]),
            "content-type: application/json\n\n{}"
        );
    }

    #[test]
    fn test_headers_rendered_in_case_insensitive_order() {
        assert_eq!(
            render(output(""), &[("X-b", "2"), ("status", "201 Created"), ("x-A", "1")]),
            "Content-Type: text/html; charset=ISO-8859-1\nstatus: 201 Created\nx-A: 1\nX-b: 2\n\n"
        );
    }

    #[test]
    fn test_redirect_overrides_location_and_has_no_body() {
        let rendered = render(
            redirect("http://example/x"),
            &[("location", "http://old"), ("Set-Cookie", "a=1")],
        );
        assert_eq!(rendered, "location: http://example/x\nSet-Cookie: a=1\n\n");
    }

    #[test]
    fn test_line_breaks_cannot_add_headers() {
        assert_eq!(
            render(redirect("/x\nSet-Cookie: evil=1"), &[]),
            "Location: /xSet-Cookie: evil=1\n\n"
        );
        assert_eq!(
            render(
                output("body"),
                &[("X-Note", "a\r\nStatus: 500"), ("content-type", "text/plain")]
            ),
            "content-type: text/plain\nX-Note: aStatus: 500\n\nbody"
        );
    }

    #[test]
    fn test_output_body_is_verbatim() {
        let body = Bytes::from_static(b"\x00\xFFraw\n");
        let rendered = format_response(CgiResult::Output(body.clone()), Headers::new());
        assert!(rendered.ends_with(&body));
    }

    #[test]
    fn test_output_error_page() {
        let env = Environment::from_pairs([
            ("SERVER_SOFTWARE", "httpd/2.4"),
            ("SERVER_NAME", "example.org"),
            ("SERVER_PORT", "8080"),
        ]);
        let mut cgi = Cgi::new(env, Inputs::new());
        let result = output_error(&mut cgi, StatusCode::BAD_REQUEST, &["a < b & \"c\""]);

        assert_eq!(cgi.get_header("Status").as_deref(), Some("400 Bad Request"));
        assert_eq!(
            cgi.get_header("Content-Type").as_deref(),
            Some("text/html; charset=utf-8")
        );
        let CgiResult::Output(page) = result else {
            panic!("expected output");
        };
        let page = String::from_utf8(page.to_vec()).unwrap();
        assert!(page.contains("<title>400 Bad Request</title>"));
        assert!(page.contains("<p>a &lt; b &amp; &quot;c&quot;</p>"));
        assert!(page.contains("<address>httpd/2.4 at example.org Port 8080</address>"));
    }

    #[test]
    fn test_output_method_not_allowed_sets_allow() {
        let env = Environment::from_pairs([("REQUEST_METHOD", "DELETE")]);
        let mut cgi = Cgi::new(env, Inputs::new());
        let result = output_method_not_allowed(&mut cgi, &["GET", "POST"]);

        assert_eq!(cgi.get_header("Allow").as_deref(), Some("GET, POST"));
        assert_eq!(
            cgi.get_header("Status").as_deref(),
            Some("405 Method Not Allowed")
        );
        let CgiResult::Output(page) = result else {
            panic!("expected output");
        };
        assert!(String::from_utf8_lossy(&page).contains("Method DELETE is not allowed"));
    }

    #[test]
    fn test_output_not_found_and_internal_error() {
        let mut cgi = Cgi::new(Environment::default(), Inputs::new());
        output_not_found(&mut cgi, "/missing");
        assert_eq!(cgi.get_header("Status").as_deref(), Some("404 Not Found"));

        output_internal_server_error(&mut cgi, &["boom"]);
        assert_eq!(
            cgi.get_header("Status").as_deref(),
            Some("500 Internal Server Error")
        );
    }
}
