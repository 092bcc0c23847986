use std::fmt;

use once_cell::sync::Lazy;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex_lite::Regex;

/// Characters escaped in copy payloads. Matches `encodeURIComponent`, which
/// leaves `A-Z a-z 0-9 - _ . ! ~ * ' ( )` untouched.
const COPY_PAYLOAD_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

static COPY_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"data-copy="([^"]*)""#).expect("static regex"));

/// Percent-encode a copy payload so it can sit inside a double-quoted attribute.
pub fn encode_payload(raw: &str) -> String {
    utf8_percent_encode(raw, COPY_PAYLOAD_SET).to_string()
}

/// Reverse of [`encode_payload`]. Returns `None` when the bytes are not UTF-8.
pub fn decode_payload(encoded: &str) -> Option<String> {
    percent_decode_str(encoded)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

/// Sanitized, render-ready HTML produced by the message formatter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderableMarkup(String);

impl RenderableMarkup {
    pub(crate) fn new(html: String) -> Self {
        Self(html)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Raw `data-copy` values of every copy control, in document order.
    pub fn encoded_payloads(&self) -> Vec<String> {
        COPY_ATTR
            .captures_iter(&self.0)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Decoded payloads of every copy control, in document order.
    pub fn copy_payloads(&self) -> Vec<String> {
        self.encoded_payloads()
            .iter()
            .filter_map(|encoded| decode_payload(encoded))
            .collect()
    }
}

impl fmt::Display for RenderableMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
