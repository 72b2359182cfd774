//! `Content-Type` and `Content-Disposition` header values.
//!
//! Both headers share the same shape: a leading value followed by
//! `;`-separated `name=value` parameters, where a value is either a token or a
//! quoted-string:
//!
//! ```text
//! multipart/form-data; boundary=----abc
//! form-data; name="upload"; filename="notes.txt"
//! ```
//!
//! Type, subtype, disposition and parameter names are lower-cased; parameter
//! values keep their case and order.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::HeaderParseError;

/// A parsed media type: `type/subtype; name=value ...`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContentType {
    /// Top-level type, e.g. `text`.
    pub mime_type: String,
    /// Subtype, e.g. `plain`.
    pub subtype: String,
    /// Parameters in the order they appeared.
    pub parameters: Vec<(String, String)>,
}

impl ContentType {
    pub fn new(mime_type: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into().to_ascii_lowercase(),
            subtype: subtype.into().to_ascii_lowercase(),
            parameters: Vec::new(),
        }
    }

    /// `text/plain`, the type given to query inputs and to multipart parts
    /// that do not declare one.
    pub fn text_plain() -> Self {
        Self::new("text", "plain")
    }

    /// Append a parameter.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters
            .push((name.into().to_ascii_lowercase(), value.into()));
        self
    }

    /// Look up a parameter by (case-insensitive) name.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        find_parameter(&self.parameters, name)
    }

    /// Whether this is `mime_type/subtype`, ignoring case and parameters.
    pub fn is(&self, mime_type: &str, subtype: &str) -> bool {
        self.mime_type.eq_ignore_ascii_case(mime_type) && self.subtype.eq_ignore_ascii_case(subtype)
    }
}

impl Default for ContentType {
    fn default() -> Self {
        Self::text_plain()
    }
}

impl FromStr for ContentType {
    type Err = HeaderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (essence, rest) = split_leading(s)?;
        let (mime_type, subtype) = essence
            .split_once('/')
            .ok_or_else(|| HeaderParseError::MissingSubtype(essence.to_string()))?;
        let mime_type = token(mime_type.trim())?;
        let subtype = token(subtype.trim())?;

        Ok(Self {
            mime_type: mime_type.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            parameters: parse_parameters(rest)?,
        })
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.mime_type, self.subtype)?;
        write_parameters(f, &self.parameters)
    }
}

/// A parsed `Content-Disposition` value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContentDisposition {
    /// Disposition type, e.g. `form-data`.
    pub disposition: String,
    pub parameters: Vec<(String, String)>,
}

impl ContentDisposition {
    /// Whether the disposition type is `form-data`.
    pub fn is_form_data(&self) -> bool {
        self.disposition.eq_ignore_ascii_case("form-data")
    }

    /// The `name` parameter.
    pub fn name(&self) -> Option<&str> {
        self.parameter("name")
    }

    /// The `filename` parameter.
    pub fn filename(&self) -> Option<&str> {
        self.parameter("filename")
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        find_parameter(&self.parameters, name)
    }
}

impl FromStr for ContentDisposition {
    type Err = HeaderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (disposition, rest) = split_leading(s)?;
        Ok(Self {
            disposition: token(disposition.trim())?.to_ascii_lowercase(),
            parameters: parse_parameters(rest)?,
        })
    }
}

impl fmt::Display for ContentDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.disposition)?;
        write_parameters(f, &self.parameters)
    }
}

fn find_parameter<'a>(parameters: &'a [(String, String)], name: &str) -> Option<&'a str> {
    parameters
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Split a header value into its leading part and the parameter tail
/// (starting at the first `;`, or empty).
fn split_leading(s: &str) -> Result<(&str, &str), HeaderParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(HeaderParseError::Empty);
    }
    Ok(match s.find(';') {
        Some(idx) => (&s[..idx], &s[idx..]),
        None => (s, ""),
    })
}

fn is_tspecial(c: char) -> bool {
    matches!(
        c,
        '(' | ')' | '<' | '>' | '@' | ',' | ';' | ':' | '\\' | '"' | '/' | '[' | ']' | '?' | '='
    )
}

fn token(s: &str) -> Result<&str, HeaderParseError> {
    let valid = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii() && !c.is_ascii_control() && c != ' ' && !is_tspecial(c));
    if valid {
        Ok(s)
    } else {
        Err(HeaderParseError::InvalidToken(s.to_string()))
    }
}

/// Parse `; name=value; name="quoted value"` into ordered pairs.
///
/// A trailing `;` is tolerated.
fn parse_parameters(mut rest: &str) -> Result<Vec<(String, String)>, HeaderParseError> {
    let mut parameters = Vec::new();

    loop {
        rest = rest.trim_start();
        rest = match rest.strip_prefix(';') {
            Some(tail) => tail.trim_start(),
            None if rest.is_empty() => break,
            None => return Err(HeaderParseError::MalformedParameter(rest.to_string())),
        };
        if rest.is_empty() {
            break;
        }

        let (name, tail) = rest
            .split_once('=')
            .ok_or_else(|| HeaderParseError::MalformedParameter(rest.to_string()))?;
        let name = token(name.trim())?.to_ascii_lowercase();
        let tail = tail.trim_start();

        let (value, tail) = if let Some(quoted) = tail.strip_prefix('"') {
            unquote(quoted).ok_or_else(|| HeaderParseError::UnterminatedQuote(name.clone()))?
        } else {
            let end = tail.find(';').unwrap_or(tail.len());
            (tail[..end].trim_end().to_string(), &tail[end..])
        };

        parameters.push((name, value));
        rest = tail;
    }

    Ok(parameters)
}

/// Read a quoted-string body (after the opening quote). Returns the unescaped
/// value and the text after the closing quote.
fn unquote(s: &str) -> Option<(String, &str)> {
    let mut value = String::new();
    let mut chars = s.char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '"' => return Some((value, &s[idx + 1..])),
            '\\' => value.push(chars.next()?.1),
            _ => value.push(c),
        }
    }
    None
}

fn write_parameters(f: &mut fmt::Formatter<'_>, parameters: &[(String, String)]) -> fmt::Result {
    for (name, value) in parameters {
        if token(value).is_ok() {
            write!(f, "; {name}={value}")?;
        } else {
            let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
            write!(f, "; {name}=\"{escaped}\"")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_content_type() {
        let ct: ContentType = "Text/HTML".parse().unwrap();
        assert_eq!(ct.mime_type, "text");
        assert_eq!(ct.subtype, "html");
        assert!(ct.parameters.is_empty());
        assert!(ct.is("text", "html"));
    }

    #[test]
    fn test_parse_content_type_parameters() {
        let ct: ContentType = "multipart/form-data; Boundary=----xyz ; charset=\"utf-8\""
            .parse()
            .unwrap();
        assert!(ct.is("multipart", "form-data"));
        assert_eq!(
            ct.parameters,
            vec![
                ("boundary".to_string(), "----xyz".to_string()),
                ("charset".to_string(), "utf-8".to_string()),
            ]
        );
        assert_eq!(ct.parameter("BOUNDARY"), Some("----xyz"));
    }

    #[test]
    fn test_parse_content_type_errors() {
        assert_eq!("".parse::<ContentType>(), Err(HeaderParseError::Empty));
        assert!(matches!(
            "text".parse::<ContentType>(),
            Err(HeaderParseError::MissingSubtype(_))
        ));
        assert!(matches!(
            "text/plain; charset".parse::<ContentType>(),
            Err(HeaderParseError::MalformedParameter(_))
        ));
        assert!(matches!(
            "text/plain; a=\"open".parse::<ContentType>(),
            Err(HeaderParseError::UnterminatedQuote(_))
        ));
        assert!(matches!(
            "te xt/plain".parse::<ContentType>(),
            Err(HeaderParseError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_trailing_semicolon_tolerated() {
        let ct: ContentType = "text/plain;".parse().unwrap();
        assert_eq!(ct, ContentType::text_plain());
    }

    #[test]
    fn test_content_type_display() {
        let ct = ContentType::new("text", "html").with_parameter("charset", "ISO-8859-1");
        assert_eq!(ct.to_string(), "text/html; charset=ISO-8859-1");

        let ct = ContentType::text_plain().with_parameter("note", "a b");
        assert_eq!(ct.to_string(), "text/plain; note=\"a b\"");
    }

    #[test]
    fn test_parse_content_disposition() {
        let cd: ContentDisposition = "form-data; name=\"f\"; filename=\"x.txt\""
            .parse()
            .unwrap();
        assert!(cd.is_form_data());
        assert_eq!(cd.name(), Some("f"));
        assert_eq!(cd.filename(), Some("x.txt"));
    }

    #[test]
    fn test_content_disposition_quoted_escapes() {
        let cd: ContentDisposition = r#"Form-Data; name="a\"b"; filename="c;d.txt""#
            .parse()
            .unwrap();
        assert!(cd.is_form_data());
        assert_eq!(cd.name(), Some("a\"b"));
        assert_eq!(cd.filename(), Some("c;d.txt"));
    }

    #[test]
    fn test_attachment_is_not_form_data() {
        let cd: ContentDisposition = "attachment; filename=a.txt".parse().unwrap();
        assert!(!cd.is_form_data());
        assert_eq!(cd.name(), None);
    }
}
