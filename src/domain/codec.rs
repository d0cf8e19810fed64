//! Storage codec for string-array fields.
//!
//! Array fields (`technologies`, `features`, `tags`) are persisted as a single
//! text column holding a compact JSON array, e.g. `["React","Next.js"]`, and
//! are always handed back to callers as a decoded `Vec<String>`.

use derive_more::Display;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// What to do when a stored value is not a JSON array of strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodePolicy {
    /// Corrupt values decode to an empty sequence and are logged.
    #[default]
    Lenient,
    /// Corrupt values are reported as errors.
    Strict,
}

#[derive(Debug, Display, PartialEq)]
pub enum CodecError {
    #[display("expected an array of strings or an encoded string, got {_0}")]
    TypeMismatch(&'static str),

    #[display("array item {_0} is {_1}, expected a string")]
    NonStringItem(usize, &'static str),

    #[display("stored value is not a JSON array of strings: {_0}")]
    Malformed(String),
}

impl std::error::Error for CodecError {}

/// Request-side value of an array field.
///
/// Callers may send either the sequence itself or text that was already
/// serialized; the latter is stored as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayFieldInput {
    Items(Vec<String>),
    Encoded(String),
}

impl Default for ArrayFieldInput {
    fn default() -> Self {
        ArrayFieldInput::Items(Vec::new())
    }
}

impl From<Vec<String>> for ArrayFieldInput {
    fn from(items: Vec<String>) -> Self {
        ArrayFieldInput::Items(items)
    }
}

impl TryFrom<Value> for ArrayFieldInput {
    type Error = CodecError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(text) => Ok(ArrayFieldInput::Encoded(text)),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::String(s) => Ok(s),
                    other => Err(CodecError::NonStringItem(index, json_kind(&other))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ArrayFieldInput::Items),
            other => Err(CodecError::TypeMismatch(json_kind(&other))),
        }
    }
}

impl<'de> Deserialize<'de> for ArrayFieldInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        ArrayFieldInput::try_from(value).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayCodec {
    policy: DecodePolicy,
}

impl ArrayCodec {
    pub fn new(policy: DecodePolicy) -> Self {
        ArrayCodec { policy }
    }

    pub fn policy(&self) -> DecodePolicy {
        self.policy
    }

    /// Serializes a sequence to its storage form.
    pub fn encode_items(items: &[String]) -> String {
        // Serializing a slice of strings cannot fail.
        serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
    }

    /// Produces the storage text for a request value. Pre-serialized text is
    /// passed through unchanged; under the strict policy it must parse.
    pub fn encode(&self, input: &ArrayFieldInput) -> Result<String, CodecError> {
        match input {
            ArrayFieldInput::Items(items) => Ok(Self::encode_items(items)),
            ArrayFieldInput::Encoded(text) => {
                if self.policy == DecodePolicy::Strict {
                    parse_array(text)?;
                }
                Ok(text.clone())
            }
        }
    }

    /// Decodes a stored value. Absent values decode to an empty sequence.
    pub fn decode(&self, stored: Option<&str>) -> Result<Vec<String>, CodecError> {
        let Some(text) = stored else {
            return Ok(Vec::new());
        };

        match parse_array(text) {
            Ok(items) => Ok(items),
            Err(err) => match self.policy {
                DecodePolicy::Lenient => {
                    tracing::warn!(
                        stored_len = text.len(),
                        error = %err,
                        "Corrupt array field decoded as empty"
                    );
                    Ok(Vec::new())
                }
                DecodePolicy::Strict => Err(err),
            },
        }
    }
}

fn parse_array(text: &str) -> Result<Vec<String>, CodecError> {
    serde_json::from_str::<Vec<String>>(text).map_err(|e| CodecError::Malformed(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn encodes_compact_json() {
        let encoded = ArrayCodec::encode_items(&items(&["React", "Next.js"]));
        assert_eq!(encoded, r#"["React","Next.js"]"#);
        assert_eq!(ArrayCodec::encode_items(&[]), "[]");
    }

    #[test]
    fn round_trip_preserves_order_and_duplicates() {
        let codec = ArrayCodec::default();
        for sequence in [
            items(&[]),
            items(&["Rust"]),
            items(&["Vue.js", "Chart.js", "Vue.js", ""]),
            items(&["quote \" and \\ backslash", "ünïcödé", "comma, inside"]),
        ] {
            let encoded = codec.encode(&ArrayFieldInput::Items(sequence.clone())).unwrap();
            assert_eq!(codec.decode(Some(&encoded)).unwrap(), sequence);
        }
    }

    #[test]
    fn absent_value_decodes_to_empty() {
        for policy in [DecodePolicy::Lenient, DecodePolicy::Strict] {
            assert_eq!(ArrayCodec::new(policy).decode(None).unwrap(), Vec::<String>::new());
        }
    }

    #[test]
    fn encoded_text_is_passed_through_unchanged() {
        let codec = ArrayCodec::default();
        let stored = r#"["React", "Node.js"]"#.to_string();
        let encoded = codec.encode(&ArrayFieldInput::Encoded(stored.clone())).unwrap();
        assert_eq!(encoded, stored);

        let twice = codec.encode(&ArrayFieldInput::Encoded(encoded.clone())).unwrap();
        assert_eq!(twice, stored);
    }

    #[test]
    fn lenient_is_the_default_policy() {
        assert_eq!(ArrayCodec::default().policy(), DecodePolicy::Lenient);
        assert_eq!(DecodePolicy::default(), DecodePolicy::Lenient);
    }

    #[test]
    fn lenient_decode_masks_corrupt_values() {
        let codec = ArrayCodec::new(DecodePolicy::Lenient);
        assert_eq!(codec.decode(Some("not json")).unwrap(), Vec::<String>::new());
        assert_eq!(codec.decode(Some(r#"{"a":1}"#)).unwrap(), Vec::<String>::new());
        assert_eq!(codec.decode(Some("[1,2]")).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn strict_decode_reports_corrupt_values() {
        let codec = ArrayCodec::new(DecodePolicy::Strict);
        assert!(matches!(codec.decode(Some("[\"open")), Err(CodecError::Malformed(_))));
        assert!(matches!(
            codec.encode(&ArrayFieldInput::Encoded("React, Next.js".into())),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_non_sequence_input() {
        assert_eq!(
            ArrayFieldInput::try_from(json!(42)),
            Err(CodecError::TypeMismatch("a number"))
        );
        assert_eq!(
            ArrayFieldInput::try_from(json!({"tech": "Rust"})),
            Err(CodecError::TypeMismatch("an object"))
        );
        assert_eq!(
            ArrayFieldInput::try_from(json!(["Rust", 7])),
            Err(CodecError::NonStringItem(1, "a number"))
        );
    }

    #[test]
    fn deserializes_either_shape() {
        let from_array: ArrayFieldInput = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert_eq!(from_array, ArrayFieldInput::Items(items(&["a", "b"])));

        let from_text: ArrayFieldInput = serde_json::from_value(json!(r#"["a"]"#)).unwrap();
        assert_eq!(from_text, ArrayFieldInput::Encoded(r#"["a"]"#.into()));

        assert!(serde_json::from_value::<ArrayFieldInput>(json!(true)).is_err());
    }
}
