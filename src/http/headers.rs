//! HTTP header collection shared by [`Request`](crate::http::request::Request)
//! and the [`ResponseWriter`](crate::http::response::ResponseWriter).
//!
//! Headers are stored in an ordered map keyed by the lower-cased field name,
//! so every insert is normalized and every lookup is case-insensitive.
//! Each entry also keeps the spelling it should be written with: names read
//! off the wire are written back lower-cased, names given to
//! [`Headers::set`] are written exactly as the caller spelled them.
//!
//! Inserting a name that is already present through [`Headers::parse_line`]
//! appends the new value to the old one, joined by `", "`.

use indexmap::IndexMap;
use thiserror::Error;

use crate::http::CRLF;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("invalid header format: missing ':' in {0:?}")]
    MissingColon(String),
    #[error("invalid header format: trailing whitespace in header name {0:?}")]
    TrailingWhitespace(String),
    #[error("invalid header name {0:?}: contains invalid character")]
    InvalidName(String),
    #[error("invalid header value for {0:?}")]
    InvalidValue(String),
    #[error("header line is not valid UTF-8")]
    NotUtf8,
}

#[derive(Debug)]
struct Field {
    name: String,
    value: String,
}

#[derive(Debug, Default)]
pub struct Headers {
    fields: IndexMap<String, Field>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a single header line from the front of `data`.
    ///
    /// Returns the number of bytes consumed and whether the header section
    /// is complete. `(0, false)` means no full line is buffered yet.
    pub fn parse_line(&mut self, data: &[u8]) -> Result<(usize, bool), HeaderError> {
        let Some(end) = find_crlf(data) else {
            return Ok((0, false));
        };

        // Empty line ends the header section
        if end == 0 {
            return Ok((CRLF.len(), true));
        }

        let line = std::str::from_utf8(&data[..end]).map_err(|_| HeaderError::NotUtf8)?;
        let Some((name, value)) = line.split_once(':') else {
            return Err(HeaderError::MissingColon(line.to_string()));
        };

        // "Host : x" is rejected outright rather than trimmed
        if name.ends_with(|c: char| c.is_ascii_whitespace()) {
            return Err(HeaderError::TrailingWhitespace(name.to_string()));
        }

        let name = name.trim();
        if !is_token(name) {
            return Err(HeaderError::InvalidName(name.to_string()));
        }

        self.append(name.to_ascii_lowercase(), value.trim());
        Ok((end + CRLF.len(), false))
    }

    /// Sets `name` to `value`, replacing any existing value regardless of
    /// the casing it was stored with. The entry keeps its position.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        if !is_token(name) {
            return Err(HeaderError::InvalidName(name.to_string()));
        }
        if value.contains(['\r', '\n']) {
            return Err(HeaderError::InvalidValue(name.to_string()));
        }
        self.insert(name, value.trim());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_ascii_lowercase())
            .map(|field| field.value.as_str())
    }

    /// Removes `name`, returning its value. Remaining entries keep their order.
    pub fn delete(&mut self, name: &str) -> Option<String> {
        self.fields
            .shift_remove(&name.to_ascii_lowercase())
            .map(|field| field.value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates `(name, value)` pairs in insertion order, with names spelled
    /// the way they will be written.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .values()
            .map(|field| (field.name.as_str(), field.value.as_str()))
    }

    /// Serializes every field as `name: value\r\n`, without the blank line
    /// that closes a header section.
    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        for (name, value) in self.iter() {
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(value.as_bytes());
            out.extend_from_slice(CRLF);
        }
    }

    /// Insert for names already known to be valid tokens.
    pub(crate) fn insert(&mut self, name: &str, value: &str) {
        self.fields.insert(
            name.to_ascii_lowercase(),
            Field {
                name: name.to_string(),
                value: value.to_string(),
            },
        );
    }

    fn append(&mut self, key: String, value: &str) {
        match self.fields.get_mut(&key) {
            Some(field) => {
                field.value.push_str(", ");
                field.value.push_str(value);
            }
            None => {
                let field = Field {
                    name: key.clone(),
                    value: value.to_string(),
                };
                self.fields.insert(key, field);
            }
        }
    }
}

pub(crate) fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(CRLF.len()).position(|w| w == CRLF)
}

/// RFC 9110 `token`: one or more tchar.
fn is_token(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_header() {
        let mut headers = Headers::new();
        let (n, done) = headers.parse_line(b"Host: localhost:42069\r\n\r\n").unwrap();
        assert_eq!(n, 23);
        assert!(!done);
        assert_eq!(headers.get("host"), Some("localhost:42069"));
        assert_eq!(headers.get("HOST"), Some("localhost:42069"));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let mut headers = Headers::new();
        let (n, _) = headers.parse_line(b"     Host:   localhost:42069    \r\n").unwrap();
        assert_eq!(n, 34);
        assert_eq!(headers.get("host"), Some("localhost:42069"));
    }

    #[test]
    fn empty_line_ends_section() {
        let mut headers = Headers::new();
        assert_eq!(headers.parse_line(b"\r\nbody").unwrap(), (2, true));
        assert!(headers.is_empty());
    }

    #[test]
    fn needs_more_data_without_crlf() {
        let mut headers = Headers::new();
        assert_eq!(headers.parse_line(b"Host: local").unwrap(), (0, false));
        assert!(headers.is_empty());
    }

    #[test]
    fn duplicate_names_are_joined() {
        let mut headers = Headers::new();
        headers.parse_line(b"Set-Person: lane\r\n").unwrap();
        headers.parse_line(b"set-person: prime\r\n").unwrap();
        headers.parse_line(b"SET-PERSON: tj\r\n").unwrap();
        assert_eq!(headers.get("set-person"), Some("lane, prime, tj"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn whitespace_before_colon_is_rejected() {
        let mut headers = Headers::new();
        headers.parse_line(b"Host: x\r\n").unwrap();
        let err = headers.parse_line(b"X-Foo : bar\r\n").unwrap_err();
        assert_eq!(err, HeaderError::TrailingWhitespace("X-Foo ".into()));
    }

    #[test]
    fn missing_colon_is_rejected() {
        let mut headers = Headers::new();
        assert!(matches!(
            headers.parse_line(b"Host localhost\r\n"),
            Err(HeaderError::MissingColon(_))
        ));
    }

    #[test]
    fn invalid_name_characters_are_rejected() {
        let mut headers = Headers::new();
        assert_eq!(
            headers.parse_line(b"H\xC2\xA9st: localhost\r\n").unwrap_err(),
            HeaderError::InvalidName("H\u{a9}st".into())
        );
        assert!(headers.parse_line(b"Ho(st: x\r\n").is_err());
        assert!(headers.parse_line(b": x\r\n").is_err());
    }

    #[test]
    fn set_replaces_in_place_and_keeps_spelling() {
        let mut headers = Headers::new();
        headers.parse_line(b"content-type: text/plain\r\n").unwrap();
        headers.parse_line(b"host: x\r\n").unwrap();
        headers.set("Content-Type", "text/html").unwrap();

        let fields: Vec<_> = headers.iter().collect();
        assert_eq!(fields, vec![("Content-Type", "text/html"), ("host", "x")]);
    }

    #[test]
    fn set_rejects_bad_input() {
        let mut headers = Headers::new();
        assert!(headers.set("Bad Name", "x").is_err());
        assert!(headers.set("X-Injected", "a\r\nEvil: 1").is_err());
        assert!(headers.is_empty());
    }

    #[test]
    fn delete_is_case_insensitive() {
        let mut headers = Headers::new();
        headers.set("Content-Length", "12").unwrap();
        assert_eq!(headers.delete("content-length").as_deref(), Some("12"));
        assert_eq!(headers.get("Content-Length"), None);
        assert_eq!(headers.delete("content-length"), None);
    }

    #[test]
    fn write_to_emits_stored_spelling() {
        let mut headers = Headers::new();
        headers.set("Content-Length", "2").unwrap();
        headers.parse_line(b"X-Trace: abc\r\n").unwrap();

        let mut out = Vec::new();
        headers.write_to(&mut out);
        assert_eq!(out, b"Content-Length: 2\r\nx-trace: abc\r\n");
    }
}
