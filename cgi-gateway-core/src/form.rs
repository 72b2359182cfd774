//! `application/x-www-form-urlencoded` codec.
//!
//! Both the query string and urlencoded request bodies use this format:
//!
//! ```text
//! name=value&name=value
//! ```
//!
//! Components are percent-encoded, with a literal space written as `+`.
//! Decoding is tolerant: a chunk without `=` decodes to `(name, "")`, and
//! malformed escapes are passed through verbatim.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped by [`percent_encode`].
///
/// Everything except ASCII alphanumerics, the URI mark characters and space is
/// escaped. `&`, `=` and `+` stay in the set so field separators remain
/// unambiguous.
const FORM_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b' ');

/// Encode name/value pairs as `name=value` joined with `&`.
///
/// # Example
///
/// ```
/// use cgi_gateway_core::form;
///
/// let encoded = form::encode([("q", "rust cgi"), ("page", "2")]);
/// assert_eq!(encoded, "q=rust+cgi&page=2");
/// ```
pub fn encode<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .into_iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                percent_encode(name.as_ref()),
                percent_encode(value.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-encode a single form component.
///
/// Non-ASCII characters are escaped byte-wise as UTF-8. Space becomes `+`.
pub fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, FORM_COMPONENT)
        .to_string()
        .replace(' ', "+")
}

/// Reverse [`percent_encode`]: `+` becomes space, then escapes are decoded.
///
/// Invalid UTF-8 in the decoded bytes is replaced lossily.
pub fn percent_decode(s: &str) -> String {
    String::from_utf8_lossy(&unescape(s.as_bytes())).into_owned()
}

/// Decode a form-encoded string into name/value pairs.
///
/// ```
/// use cgi_gateway_core::form;
///
/// assert!(form::decode("").is_empty());
/// assert_eq!(form::decode("a"), vec![("a".to_string(), String::new())]);
/// ```
pub fn decode(s: &str) -> Vec<(String, String)> {
    decode_bytes(s.as_bytes())
        .into_iter()
        .map(|(name, value)| (name, String::from_utf8_lossy(&value).into_owned()))
        .collect()
}

/// Decode form-encoded bytes, keeping each value as raw bytes.
///
/// Request bodies go through this path so values that do not decode to UTF-8
/// survive intact. Names are converted lossily.
pub fn decode_bytes(input: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut pairs = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        let (chunk, tail) = match rest.iter().position(|&b| b == b'&') {
            Some(idx) => (&rest[..idx], &rest[idx + 1..]),
            None => (rest, &[][..]),
        };
        rest = tail;

        let (name, value) = match chunk.iter().position(|&b| b == b'=') {
            Some(idx) => (&chunk[..idx], &chunk[idx + 1..]),
            None => (chunk, &[][..]),
        };
        pairs.push((
            String::from_utf8_lossy(&unescape(name)).into_owned(),
            unescape(value),
        ));
    }

    pairs
}

fn unescape(raw: &[u8]) -> Vec<u8> {
    let spaced: Vec<u8> = raw
        .iter()
        .map(|&b| if b == b'+' { b' ' } else { b })
        .collect();
    percent_encoding::percent_decode(&spaced).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode("").is_empty());
    }

    #[test]
    fn test_decode_without_equals() {
        assert_eq!(decode("a"), pairs(&[("a", "")]));
    }

    #[test]
    fn test_decode_pairs_in_order() {
        assert_eq!(decode("a=1&b=2"), pairs(&[("a", "1"), ("b", "2")]));
    }

    #[test]
    fn test_decode_splits_on_first_equals() {
        assert_eq!(decode("expr=1=1"), pairs(&[("expr", "1=1")]));
    }

    #[test]
    fn test_decode_trailing_and_empty_chunks() {
        assert_eq!(decode("a=1&"), pairs(&[("a", "1")]));
        assert_eq!(decode("a&&b"), pairs(&[("a", ""), ("", ""), ("b", "")]));
    }

    #[test]
    fn test_decode_plus_and_escapes() {
        assert_eq!(
            decode("name=J%C3%BCrgen+Smith&op=%2B"),
            pairs(&[("name", "Jürgen Smith"), ("op", "+")])
        );
    }

    #[test]
    fn test_decode_malformed_escape_passes_through() {
        assert_eq!(decode("a=%zz%4"), pairs(&[("a", "%zz%4")]));
    }

    #[test]
    fn test_decode_bytes_keeps_raw_values() {
        let decoded = decode_bytes(b"bin=%FF%00");
        assert_eq!(decoded, vec![("bin".to_string(), vec![0xFF, 0x00])]);
    }

    #[test]
    fn test_percent_encode_reserved() {
        assert_eq!(percent_encode("a&b=c+d"), "a%26b%3Dc%2Bd");
        assert_eq!(percent_encode("hello world"), "hello+world");
        assert_eq!(percent_encode("-_.!~*'()"), "-_.!~*'()");
        assert_eq!(percent_encode("ü"), "%C3%BC");
        assert_eq!(percent_encode("a/b?c"), "a%2Fb%3Fc");
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("a+b%20c"), "a b c");
    }

    const COMPONENTS: &[&str] = &[
        "", "a", " ", "+", "&", "=", "%", "%2", "%41", "a=b&c", "ü", "rust/c", "100%", "!~*'()",
    ];

    #[test]
    fn test_percent_round_trip_every_printable_substring() {
        let printable: String = (0x20u8..0x7f).map(char::from).collect();
        for start in 0..printable.len() {
            for end in start..=printable.len() {
                let s = &printable[start..end];
                assert_eq!(percent_decode(&percent_encode(s)), s, "{s:?}");
            }
        }
        for s in COMPONENTS {
            assert_eq!(percent_decode(&percent_encode(s)), *s, "{s:?}");
        }
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let encoded = encode([("first name", "Ada"), ("lang", "rust/c"), ("empty", "")]);
        assert_eq!(encoded, "first+name=Ada&lang=rust%2Fc&empty=");

        let mut lists: Vec<Vec<(&str, &str)>> = Vec::new();
        for &name in COMPONENTS {
            for &value in COMPONENTS {
                lists.push(vec![(name, value)]);
                for &other in COMPONENTS {
                    lists.push(vec![(name, value), (other, name)]);
                }
            }
        }
        for list in lists {
            let encoded = encode(list.iter().copied());
            assert_eq!(decode(&encoded), pairs(&list), "{encoded:?}");
        }
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode(Vec::<(&str, &str)>::new()), "");
    }
}
