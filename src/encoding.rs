// src/encoding.rs

//! Canonical JSON encoding for snapshots and diff documents.
//!
//! Canonical text has no whitespace between tokens and keeps non-ASCII
//! characters literal, so re-encoding an unchanged value reproduces the
//! stored text byte for byte. Object keys keep their insertion order.
//!
//! Comparisons never happen on this text: decode first and compare values.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Encode a value as canonical JSON text.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Decode canonical (or any valid) JSON text into a value.
pub fn decode(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_whitespace() {
        let value = json!({"some": ["more", "json"], "n": 1});
        assert_eq!(encode(&value).unwrap(), r#"{"some":["more","json"],"n":1}"#);
    }

    #[test]
    fn test_non_ascii_literal() {
        let value = json!({"8": ["8А", "8Б"]});
        assert_eq!(encode(&value).unwrap(), r#"{"8":["8А","8Б"]}"#);
    }

    #[test]
    fn test_reencode_is_stable() {
        let text = r#"{"9":["9А","9Б"],"8":null,"wkday":"понедельник"}"#;
        assert_eq!(encode(&decode(text).unwrap()).unwrap(), text);
    }

    #[test]
    fn test_equality_ignores_key_order() {
        let a = decode(r#"{"a":1,"b":[2,3]}"#).unwrap();
        let b = decode(r#"{"b":[2,3],"a":1}"#).unwrap();
        assert_eq!(a, b);
    }
}
