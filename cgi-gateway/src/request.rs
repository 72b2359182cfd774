//! Request input decoding.
//!
//! Inputs come from two sources, in this order:
//!
//! 1. `QUERY_STRING`, for every method
//! 2. the request body, for `POST` only, bounded by `CONTENT_LENGTH` and
//!    dispatched on `CONTENT_TYPE`:
//!    - `application/x-www-form-urlencoded`, or no usable content type: form decoding
//!    - `multipart/form-data; boundary=...`: one input per part
//!    - anything else: ignored
//!
//! Bodies that cannot be decoded never fail the request. They contribute no
//! inputs and leave a [`DecodeWarning`] on the resulting [`Inputs`].

use std::borrow::Cow;

use bytes::Bytes;
use cgi_gateway_core::{ContentDisposition, ContentType, form};
use http::HeaderMap;
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use tracing::{debug, warn};

use crate::context::Environment;
use crate::multipart;

/// Name given to a multipart part that lacks a `form-data` disposition.
pub const MALFORMED_PART_NAME: &str = "ERROR";

/// One decoded field or uploaded file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Input {
    /// Raw field value or file content.
    pub value: Bytes,
    /// Client-side file name, for file uploads.
    pub filename: Option<String>,
    /// Declared media type; `text/plain` unless a multipart part says otherwise.
    pub content_type: ContentType,
}

impl Input {
    /// A `text/plain` input without a file name.
    pub fn text(value: impl Into<Bytes>) -> Self {
        Self {
            value: value.into(),
            filename: None,
            content_type: ContentType::text_plain(),
        }
    }

    /// The value as text, replacing invalid UTF-8.
    pub fn value_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.value)
    }
}

/// Why part of a request body produced no inputs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeWarning {
    #[error("unsupported content type {0:?}, body ignored")]
    UnsupportedContentType(String),

    #[error("multipart body has no boundary parameter, body ignored")]
    MissingBoundary,

    #[error("multipart body could not be parsed ({0}), body ignored")]
    MalformedMultipart(String),

    #[error("multipart part {index} has no form-data Content-Disposition")]
    MalformedPart { index: usize },
}

/// Decoded inputs, in submission order.
///
/// A name may appear several times (`tag=a&tag=b`). Built once per request
/// and read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inputs {
    entries: Vec<(String, Input)>,
    warnings: Vec<DecodeWarning>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, input: Input) {
        self.entries.push((name.into(), input));
    }

    pub(crate) fn warn(&mut self, warning: DecodeWarning) {
        warn!(%warning, "request body input dropped");
        self.warnings.push(warning);
    }

    /// Append `other` after the entries already present.
    pub(crate) fn append(&mut self, mut other: Inputs) {
        self.entries.append(&mut other.entries);
        self.warnings.append(&mut other.warnings);
    }

    /// First input submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&Input> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, input)| input)
    }

    /// Every input submitted under `name`, in order.
    pub fn get_all<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Input> + use<'a, 'n> {
        self.entries
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, input)| input)
    }

    /// Distinct input names in order of first appearance.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (name, _) in &self.entries {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Input)> {
        self.entries.iter().map(|(n, input)| (n.as_str(), input))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reasons parts of the body were dropped while decoding.
    pub fn warnings(&self) -> &[DecodeWarning] {
        &self.warnings
    }
}

impl<'a> IntoIterator for &'a Inputs {
    type Item = (&'a str, &'a Input);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a Input)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Decode all request inputs: query inputs followed by body inputs.
pub fn decode_input(env: &Environment, body: &[u8]) -> Inputs {
    let mut inputs = query_input(env);
    inputs.append(body_input(env, body));
    debug!(
        inputs = inputs.len(),
        warnings = inputs.warnings().len(),
        "decoded request inputs"
    );
    inputs
}

/// Inputs from `QUERY_STRING`, whatever the request method.
pub fn query_input(env: &Environment) -> Inputs {
    form_inputs(env.query_string().as_bytes())
}

/// Inputs from the request body. Only `POST` bodies are read.
pub fn body_input(env: &Environment, body: &[u8]) -> Inputs {
    if env.request_method() != "POST" {
        return Inputs::new();
    }
    let body = bounded_body(env, body);

    let content_type = match env.content_type().parse::<ContentType>() {
        Ok(content_type) => content_type,
        Err(err) => {
            debug!(%err, "no usable CONTENT_TYPE, decoding body as form data");
            return form_inputs(body);
        }
    };

    if content_type.is("application", "x-www-form-urlencoded") {
        form_inputs(body)
    } else if content_type.is("multipart", "form-data") {
        match content_type.parameter("boundary") {
            Some(boundary) => multipart_inputs(boundary, body),
            None => {
                let mut inputs = Inputs::new();
                inputs.warn(DecodeWarning::MissingBoundary);
                inputs
            }
        }
    } else {
        let mut inputs = Inputs::new();
        inputs.warn(DecodeWarning::UnsupportedContentType(
            content_type.to_string(),
        ));
        inputs
    }
}

/// The leading `CONTENT_LENGTH` bytes of `body`, or nothing when the length
/// is absent or unparseable.
pub fn bounded_body<'a>(env: &Environment, body: &'a [u8]) -> &'a [u8] {
    match env.content_length() {
        Some(len) => &body[..len.min(body.len())],
        None => &[],
    }
}

fn form_inputs(data: &[u8]) -> Inputs {
    let mut inputs = Inputs::new();
    for (name, value) in form::decode_bytes(data) {
        inputs.push(name, Input::text(value));
    }
    inputs
}

fn multipart_inputs(boundary: &str, body: &[u8]) -> Inputs {
    let mut inputs = Inputs::new();

    let parts = match multipart::parse(boundary, Bytes::copy_from_slice(body)) {
        Ok(parts) => parts,
        Err(err) => {
            inputs.warn(DecodeWarning::MalformedMultipart(err.to_string()));
            return inputs;
        }
    };

    for (index, part) in parts.into_iter().enumerate() {
        let disposition = header_str(&part.headers, CONTENT_DISPOSITION)
            .and_then(|value| value.parse::<ContentDisposition>().ok())
            .filter(ContentDisposition::is_form_data);

        let Some(disposition) = disposition else {
            inputs.warn(DecodeWarning::MalformedPart { index });
            inputs.push(MALFORMED_PART_NAME, Input::text(Bytes::new()));
            continue;
        };

        let content_type = header_str(&part.headers, CONTENT_TYPE)
            .and_then(|value| value.parse::<ContentType>().ok())
            .unwrap_or_else(ContentType::text_plain);

        inputs.push(
            disposition.name().unwrap_or_default(),
            Input {
                value: part.content,
                filename: disposition.filename().map(str::to_string),
                content_type,
            },
        );
    }

    inputs
}

/// A part header as text. Browsers send raw UTF-8 file names, so this does
/// not insist on visible ASCII the way `HeaderValue::to_str` does.
fn header_str(headers: &HeaderMap, name: http::HeaderName) -> Option<String> {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}
