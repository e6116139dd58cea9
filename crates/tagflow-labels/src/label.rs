#![forbid(unsafe_code)]

//! Label pairs and ordered label sets.

use std::fmt;
use std::io;
use std::ops::Deref;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single `key: value` label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelPair {
    pub key: String,
    pub value: String,
}

impl LabelPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Display text of a tag, `key: value`.
    pub fn text(&self) -> String {
        format!("{}: {}", self.key, self.value)
    }
}

impl fmt::Display for LabelPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.value)
    }
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for LabelPair {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

/// Ordered sequence of label pairs.
///
/// Order is the order the caller supplied; nothing here sorts or dedups.
/// Duplicate keys are kept as separate entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet {
    pairs: Vec<LabelPair>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: Vec<LabelPair>) -> Self {
        Self { pairs }
    }

    pub fn push(&mut self, pair: LabelPair) {
        self.pairs.push(pair);
    }

    pub fn as_slice(&self) -> &[LabelPair] {
        &self.pairs
    }

    pub fn into_pairs(self) -> Vec<LabelPair> {
        self.pairs
    }

    /// Build from a JSON document.
    ///
    /// Accepts either a flat object of string values, or a resource document
    /// whose labels live under `metadata.labels`. Key order follows the
    /// document.
    pub fn from_json_value(value: &Value) -> Result<Self, LabelLoadError> {
        let object = match value {
            Value::Object(map) => match map.get("metadata").and_then(|m| m.get("labels")) {
                Some(Value::Object(labels)) => labels,
                Some(_) => return Err(LabelLoadError::NotAnObject),
                None => map,
            },
            _ => return Err(LabelLoadError::NotAnObject),
        };

        let mut set = Self::new();
        for (key, value) in object {
            match value {
                Value::String(s) => set.push(LabelPair::new(key.as_str(), s.as_str())),
                _ => {
                    return Err(LabelLoadError::NonStringValue { key: key.clone() });
                }
            }
        }
        Ok(set)
    }

    pub fn from_json_str(text: &str) -> Result<Self, LabelLoadError> {
        let value: Value = serde_json::from_str(text).map_err(LabelLoadError::Parse)?;
        Self::from_json_value(&value)
    }

    pub fn from_json_reader(reader: impl io::Read) -> Result<Self, LabelLoadError> {
        let value: Value = serde_json::from_reader(reader).map_err(LabelLoadError::Parse)?;
        Self::from_json_value(&value)
    }

    /// Read and parse a label file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LabelLoadError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(LabelLoadError::Io)?;
        let set = Self::from_json_reader(io::BufReader::new(file))?;
        #[cfg(feature = "tracing")]
        tracing::debug!(path = %path.display(), count = set.len(), "loaded label file");
        Ok(set)
    }
}

impl Deref for LabelSet {
    type Target = [LabelPair];

    fn deref(&self) -> &[LabelPair] {
        &self.pairs
    }
}

impl<P: Into<LabelPair>> FromIterator<P> for LabelSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Vec<LabelPair>> for LabelSet {
    fn from(pairs: Vec<LabelPair>) -> Self {
        Self { pairs }
    }
}

impl<'a> IntoIterator for &'a LabelSet {
    type Item = &'a LabelPair;
    type IntoIter = std::slice::Iter<'a, LabelPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

/// Errors from loading labels out of JSON.
#[derive(Debug)]
pub enum LabelLoadError {
    Io(io::Error),
    Parse(serde_json::Error),
    /// The document (or its `metadata.labels`) is not a JSON object.
    NotAnObject,
    /// A label value was not a string.
    NonStringValue { key: String },
}

impl fmt::Display for LabelLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read labels: {err}"),
            Self::Parse(err) => write!(f, "invalid label JSON: {err}"),
            Self::NotAnObject => write!(f, "labels must be a JSON object of strings"),
            Self::NonStringValue { key } => write!(f, "label {key:?} has a non-string value"),
        }
    }
}

impl std::error::Error for LabelLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_joins_key_and_value() {
        let pair = LabelPair::new("tekton.dev/pipeline", "hello-pipeline");
        assert_eq!(pair.text(), "tekton.dev/pipeline: hello-pipeline");
        assert_eq!(pair.to_string(), pair.text());
    }

    #[test]
    fn collect_preserves_order_and_duplicates() {
        let set: LabelSet = [("b", "1"), ("a", "2"), ("b", "3")].into_iter().collect();
        let keys: Vec<&str> = set.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, ["b", "a", "b"]);
    }

    #[test]
    fn json_object_keeps_document_order() {
        let set = LabelSet::from_json_str(r#"{"zeta": "1", "alpha": "2", "mid": "3"}"#).unwrap();
        let keys: Vec<&str> = set.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn json_resource_document_reads_metadata_labels() {
        let doc = r#"{
            "kind": "PipelineRun",
            "metadata": { "labels": { "tag1": "value1", "tag2": "value2" } }
        }"#;
        let set = LabelSet::from_json_str(doc).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set[1], LabelPair::new("tag2", "value2"));
    }

    #[test]
    fn json_rejects_non_string_values() {
        let err = LabelSet::from_json_str(r#"{"ok": "x", "count": 3}"#).unwrap_err();
        assert!(matches!(err, LabelLoadError::NonStringValue { ref key } if key == "count"));
        assert!(err.to_string().contains("count"));
    }

    #[test]
    fn json_rejects_arrays_and_bad_syntax() {
        assert!(matches!(
            LabelSet::from_json_str("[1, 2]"),
            Err(LabelLoadError::NotAnObject)
        ));
        assert!(matches!(
            LabelSet::from_json_str(r#"{"metadata": {"labels": []}}"#),
            Err(LabelLoadError::NotAnObject)
        ));
        assert!(matches!(
            LabelSet::from_json_str("{"),
            Err(LabelLoadError::Parse(_))
        ));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = LabelSet::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, LabelLoadError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn serde_round_trip_is_a_plain_array() {
        let set: LabelSet = [("k", "v")].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"[{"key":"k","value":"v"}]"#);
    }
}
