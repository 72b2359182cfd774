//! One CGI invocation from start to finish.
//!
//! [`CgiRunner::run`] performs, in order:
//! 1. collect the environment (unless one was supplied)
//! 2. read the whole request body
//! 3. check the effective body length against [`BodyLimits`](crate::BodyLimits)
//! 4. decode inputs and build the [`Cgi`] context
//! 5. run the handler
//! 6. format the result and write it out

use std::io::{self, Read, Write};

use tracing::{debug, info_span, warn};

use crate::context::{Cgi, CgiConfig, Environment};
use crate::error::{CgiError, RunError};
use crate::request::{bounded_body, decode_input};
use crate::response::{CgiResult, format_response};

/// Runs one request through a handler.
///
/// # Example
///
/// ```rust,no_run
/// use cgi_gateway::prelude::*;
///
/// fn main() -> Result<(), RunError> {
///     CgiRunner::new()
///         .with_config(CgiConfig::new().max_body_bytes(1 << 20))
///         .run_stdio(|cgi: &mut Cgi| {
///             let name = cgi.get_input("name").unwrap_or_else(|| "world".into());
///             Ok(output(format!("Hello, {name}!")))
///         })
/// }
/// ```
#[derive(Default)]
pub struct CgiRunner {
    config: CgiConfig,
    env: Option<Environment>,
    log_sink: Option<Box<dyn Write>>,
}

impl CgiRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: CgiConfig) -> Self {
        self.config = config;
        self
    }

    /// Use `env` instead of reading the process environment.
    pub fn with_environment(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    /// Send the context's log lines to `sink` instead of stderr.
    pub fn with_log_sink<W: Write + 'static>(mut self, sink: W) -> Self {
        self.log_sink = Some(Box::new(sink));
        self
    }

    /// Handle the request read from `input`, writing the response to `output`.
    pub fn run<R, W, H>(self, mut input: R, mut output: W, handler: H) -> Result<(), RunError>
    where
        R: Read,
        W: Write,
        H: FnOnce(&mut Cgi) -> Result<CgiResult, CgiError>,
    {
        let env = self.env.unwrap_or_else(Environment::collect);
        let _span = info_span!(
            "cgi.request",
            cgi.method = %env.request_method(),
            cgi.script = %env.script_name(),
            cgi.path_info = %env.path_info(),
        )
        .entered();

        let mut body = Vec::new();
        input.read_to_end(&mut body).map_err(RunError::ReadBody)?;

        let size = bounded_body(&env, &body).len();
        self.config.get_limits().check_size(size).map_err(|max| {
            warn!(size, max, "request body exceeds limit");
            RunError::BodyTooLarge { size, max }
        })?;

        let inputs = decode_input(&env, &body);
        let mut cgi = Cgi::new(env, inputs);
        if let Some(sink) = self.log_sink {
            cgi = cgi.with_log_sink(sink);
        }

        let result = handler(&mut cgi)?;
        let response = format_response(result, cgi.into_state().headers);

        output
            .write_all(&response)
            .and_then(|()| output.flush())
            .map_err(RunError::WriteResponse)?;
        debug!(bytes = response.len(), "response written");
        Ok(())
    }

    /// [`run`](Self::run) over standard input and output.
    pub fn run_stdio<H>(self, handler: H) -> Result<(), RunError>
    where
        H: FnOnce(&mut Cgi) -> Result<CgiResult, CgiError>,
    {
        self.run(io::stdin().lock(), io::stdout().lock(), handler)
    }
}

/// Run `handler` with the default configuration and the process environment.
pub fn run<R, W, H>(input: R, output: W, handler: H) -> Result<(), RunError>
where
    R: Read,
    W: Write,
    H: FnOnce(&mut Cgi) -> Result<CgiResult, CgiError>,
{
    CgiRunner::new().run(input, output, handler)
}

/// Run `handler` over stdin and stdout with the default configuration.
pub fn run_stdio<H>(handler: H) -> Result<(), RunError>
where
    H: FnOnce(&mut Cgi) -> Result<CgiResult, CgiError>,
{
    CgiRunner::new().run_stdio(handler)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::context::CgiContext;
    use crate::handler::handle_errors;
    use crate::response::{output, redirect};

    fn runner(pairs: &[(&str, &str)]) -> CgiRunner {
        CgiRunner::new()
            .with_environment(Environment::from_pairs(pairs.iter().copied()))
            .with_log_sink(io::sink())
    }

    fn echo(cgi: &mut Cgi) -> Result<CgiResult, CgiError> {
        let mut lines = Vec::new();
        for name in cgi.get_input_names() {
            lines.push(format!("{name}={}", cgi.get_multi_input(&name).join(",")));
        }
        cgi.set_header("Content-Type", "text/plain");
        Ok(output(lines.join("\n")))
    }

    fn run_to_string(
        runner: CgiRunner,
        body: &[u8],
        handler: fn(&mut Cgi) -> Result<CgiResult, CgiError>,
    ) -> String {
        let mut out = Vec::new();
        runner.run(Cursor::new(body.to_vec()), &mut out, handler).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_get_request() {
        let out = run_to_string(
            runner(&[("REQUEST_METHOD", "GET"), ("QUERY_STRING", "a=1&b=2&a=3")]),
            b"ignored=1",
            echo,
        );
        assert_eq!(out, "Content-Type: text/plain\n\na=1,3\nb=2");
    }

    #[test]
    fn test_post_form_request() {
        let out = run_to_string(
            runner(&[
                ("REQUEST_METHOD", "POST"),
                ("QUERY_STRING", "q=1"),
                ("CONTENT_TYPE", "application/x-www-form-urlencoded"),
                ("CONTENT_LENGTH", "4"),
            ]),
            b"a=12extra",
            echo,
        );
        assert_eq!(out, "Content-Type: text/plain\n\nq=1\na=12");
    }

    #[test]
    fn test_redirect() {
        let out = run_to_string(runner(&[]), b"", |cgi| {
            cgi.set_header("Location", "/old");
            Ok(redirect("http://example/x"))
        });
        assert_eq!(out, "Location: http://example/x\n\n");
    }

    #[test]
    fn test_body_limit_uses_effective_length() {
        let env = [("REQUEST_METHOD", "POST"), ("CONTENT_LENGTH", "4")];
        let config = CgiConfig::new().max_body_bytes(4);
        let out = run_to_string(
            runner(&env).with_config(config),
            b"a=12 and lots of trailing bytes",
            echo,
        );
        assert!(out.ends_with("a=12"));

        let mut written = Vec::new();
        let err = runner(&env)
            .with_config(CgiConfig::new().max_body_bytes(3))
            .run(Cursor::new(b"a=12".to_vec()), &mut written, echo)
            .unwrap_err();
        assert!(matches!(err, RunError::BodyTooLarge { size: 4, max: 3 }));
        assert!(written.is_empty());
    }

    #[test]
    fn test_handler_error_propagates_without_output() {
        let mut written = Vec::new();
        let err = runner(&[])
            .run(Cursor::new(Vec::new()), &mut written, |_| {
                Err(CgiError::not_found("nothing here"))
            })
            .unwrap_err();
        assert!(matches!(err, RunError::Handler(CgiError::Status { .. })));
        assert!(written.is_empty());
    }

    #[test]
    fn test_handle_errors_writes_error_page() {
        let mut written = Vec::new();
        runner(&[("SERVER_NAME", "example.org")])
            .run(
                Cursor::new(Vec::new()),
                &mut written,
                handle_errors(|cgi: &mut Cgi| {
                    cgi.set_header("X-Lost", "1");
                    Err(CgiError::not_found("nothing here"))
                }),
            )
            .unwrap();

        let out = String::from_utf8(written).unwrap();
        assert!(out.starts_with(
            "Content-Type: text/html; charset=utf-8\nStatus: 404 Not Found\n\n"
        ));
        assert!(out.contains("<p>nothing here</p>"));
        assert!(!out.contains("X-Lost"));
    }

    #[test]
    fn test_read_failure() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("pipe closed"))
            }
        }

        let err = runner(&[])
            .run(Broken, Vec::new(), |_| Ok(output("")))
            .unwrap_err();
        assert!(matches!(err, RunError::ReadBody(_)));
    }
}
