//! Execution context for one CGI request.
//!
//! A handler receives the request through a [`CgiContext`]: read access to
//! the captured [`Environment`] and decoded [`Inputs`], and write access to
//! the response [`Headers`]. The concrete context is [`Cgi`]; `&mut C`
//! forwards to `C`, so helpers written against `impl CgiContext` accept
//! either.
//!
//! ```rust
//! use cgi_gateway::{Cgi, CgiContext, Environment};
//!
//! let env = Environment::from_pairs([("QUERY_STRING", "name=Ada")]);
//! let inputs = cgi_gateway::decode_input(&env, b"");
//! let mut cgi = Cgi::new(env, inputs);
//!
//! let name = cgi.get_input("name");
//! cgi.set_header("X-Greeted", name.unwrap_or_default());
//! assert_eq!(cgi.get_header("x-greeted").as_deref(), Some("Ada"));
//! ```

pub mod config;
pub mod env;
pub mod limit;

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use cgi_gateway_core::{ContentType, Headers, form};
use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::cookie::{Cookie, find_cookie};
use crate::error::CgiError;
use crate::request::{DecodeWarning, Inputs};

pub use config::CgiConfig;
pub use env::{CGI_VARIABLES, Environment};
pub use limit::BodyLimits;

/// Request and response state of one invocation.
///
/// The environment and inputs never change after decoding; only the header
/// table is written while the handler runs.
#[derive(Clone, Debug)]
pub struct CgiState {
    pub env: Arc<Environment>,
    pub inputs: Arc<Inputs>,
    pub headers: Headers,
}

impl CgiState {
    pub fn new(env: Environment, inputs: Inputs) -> Self {
        Self {
            env: Arc::new(env),
            inputs: Arc::new(inputs),
            headers: Headers::new(),
        }
    }
}

/// Capabilities available to handler code.
///
/// Implementors supply [`state`](Self::state), [`modify`](Self::modify) and
/// [`log`](Self::log); everything else is built on those.
pub trait CgiContext {
    /// Current request and response state.
    fn state(&self) -> &CgiState;

    /// Transform the response header table.
    fn modify<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Headers);

    /// Write one diagnostic line. The line is flushed before this returns.
    fn log(&mut self, line: &str);

    /// Read a projection of the state.
    fn gets<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&CgiState) -> T,
    {
        f(self.state())
    }

    /// Run an I/O action, turning its failure into [`CgiError::Io`].
    fn lift_io<T, F>(&mut self, action: F) -> Result<T, CgiError>
    where
        F: FnOnce() -> io::Result<T>,
    {
        action().map_err(CgiError::Io)
    }

    /// Run `body`, rolling back its header changes if it fails.
    ///
    /// On `Ok` the new headers are kept. On `Err` the header table is restored
    /// to what it was before `body` started and `handler` runs against that
    /// restored state.
    fn protect<T, B, H>(&mut self, body: B, handler: H) -> Result<T, CgiError>
    where
        Self: Sized,
        B: FnOnce(&mut Self) -> Result<T, CgiError>,
        H: FnOnce(&mut Self, CgiError) -> Result<T, CgiError>,
    {
        let snapshot = self.state().headers.clone();
        match body(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::debug!(%err, "protected handler failed, restoring headers");
                self.modify(|headers| *headers = snapshot);
                handler(self, err)
            }
        }
    }

    /// Value of a CGI variable. `None` for names that are not captured.
    fn get_var(&self, name: &str) -> Option<String> {
        self.gets(|s| s.env.var(name).map(str::to_string))
    }

    /// All captured CGI variables.
    fn get_vars(&self) -> Vec<(String, String)> {
        self.gets(|s| {
            s.env
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect()
        })
    }

    /// First value of an input as text. Invalid UTF-8 is replaced.
    fn get_input(&self, name: &str) -> Option<String> {
        self.gets(|s| s.inputs.get(name).map(|input| input.value_lossy().into_owned()))
    }

    /// First value of an input as raw bytes.
    fn get_input_bytes(&self, name: &str) -> Option<Bytes> {
        self.gets(|s| s.inputs.get(name).map(|input| input.value.clone()))
    }

    /// Every value submitted for an input, in order.
    fn get_multi_input(&self, name: &str) -> Vec<String> {
        self.gets(|s| {
            s.inputs
                .get_all(name)
                .map(|input| input.value_lossy().into_owned())
                .collect()
        })
    }

    /// File name of an uploaded input.
    fn get_input_filename(&self, name: &str) -> Option<String> {
        self.gets(|s| s.inputs.get(name).and_then(|input| input.filename.clone()))
    }

    fn get_input_content_type(&self, name: &str) -> Option<ContentType> {
        self.gets(|s| s.inputs.get(name).map(|input| input.content_type.clone()))
    }

    /// Names of all submitted inputs, in order of first appearance.
    fn get_input_names(&self) -> Vec<String> {
        self.gets(|s| s.inputs.names().into_iter().map(str::to_string).collect())
    }

    /// Parse the first value of an input.
    fn read_input<T>(&self, name: &str) -> Result<T, CgiError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let value = self
            .get_input(name)
            .ok_or_else(|| CgiError::MissingInput(name.to_string()))?;
        value.trim().parse::<T>().map_err(|err: T::Err| CgiError::InvalidInput {
            name: name.to_string(),
            message: err.to_string(),
        })
    }

    /// Deserialize the text inputs (query and form fields, not uploads) into
    /// `T` with `serde_qs`.
    fn inputs_as<T>(&self) -> Result<T, CgiError>
    where
        T: DeserializeOwned,
    {
        let encoded = self.gets(|s| {
            form::encode(
                s.inputs
                    .iter()
                    .filter(|(_, input)| input.filename.is_none())
                    .map(|(name, input)| (name.to_string(), input.value_lossy().into_owned())),
            )
        });
        serde_qs::from_str(&encoded)
            .map_err(|err| CgiError::bad_request(format!("could not decode inputs: {err}")))
    }

    /// Deserialize `QUERY_STRING` into `T`.
    fn query_as<T>(&self) -> Result<T, CgiError>
    where
        T: DeserializeOwned,
    {
        let query = self.gets(|s| s.env.query_string().to_string());
        serde_qs::from_str(&query)
            .map_err(|err| CgiError::bad_request(format!("could not decode query string: {err}")))
    }

    /// Set a response header, replacing any previous value.
    fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        self.modify(|headers| headers.set(name, value));
    }

    fn get_header(&self, name: &str) -> Option<String> {
        self.gets(|s| s.headers.get(name).map(str::to_string))
    }

    /// Set the `Status` header, e.g. `Status: 404 Not Found`.
    fn set_status(&mut self, status: StatusCode) {
        self.set_header("Status", status.to_string());
    }

    /// Value of a cookie sent by the client.
    fn get_cookie(&self, name: &str) -> Option<String> {
        self.gets(|s| {
            s.env
                .var("HTTP_COOKIE")
                .and_then(|header| find_cookie(header, name))
                .map(str::to_string)
        })
    }

    fn set_cookie(&mut self, cookie: &Cookie) {
        self.set_header("Set-Cookie", cookie.to_string());
    }

    /// Ask the client to drop `cookie`.
    fn delete_cookie(&mut self, cookie: &Cookie) {
        self.set_cookie(&cookie.expired());
    }

    /// Parts of the request body that were dropped while decoding.
    fn decode_warnings(&self) -> Vec<DecodeWarning> {
        self.gets(|s| s.inputs.warnings().to_vec())
    }
}

impl<C> CgiContext for &mut C
where
    C: CgiContext + ?Sized,
{
    fn state(&self) -> &CgiState {
        (**self).state()
    }

    fn modify<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Headers),
    {
        (**self).modify(f)
    }

    fn log(&mut self, line: &str) {
        (**self).log(line)
    }
}

/// The context [`CgiRunner`](crate::CgiRunner) hands to handlers.
///
/// Log lines go to stderr unless another sink is set with
/// [`with_log_sink`](Self::with_log_sink).
pub struct Cgi {
    state: CgiState,
    log_sink: Box<dyn Write>,
}

impl Cgi {
    pub fn new(env: Environment, inputs: Inputs) -> Self {
        Self::from_state(CgiState::new(env, inputs))
    }

    pub fn from_state(state: CgiState) -> Self {
        Self {
            state,
            log_sink: Box::new(io::stderr()),
        }
    }

    /// Replace the diagnostic log sink.
    pub fn with_log_sink(mut self, sink: Box<dyn Write>) -> Self {
        self.log_sink = sink;
        self
    }

    pub fn headers(&self) -> &Headers {
        &self.state.headers
    }

    /// Consume the context, returning the final state.
    pub fn into_state(self) -> CgiState {
        self.state
    }
}

impl fmt::Debug for Cgi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cgi")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl CgiContext for Cgi {
    fn state(&self) -> &CgiState {
        &self.state
    }

    fn modify<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Headers),
    {
        f(&mut self.state.headers)
    }

    fn log(&mut self, line: &str) {
        let written = writeln!(self.log_sink, "{line}").and_then(|_| self.log_sink.flush());
        if let Err(err) = written {
            tracing::warn!(%err, "failed to write log line");
        }
    }
}
