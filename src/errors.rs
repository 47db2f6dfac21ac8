use crate::path::Path;
use thiserror::Error;

/// Failures raised while reading, mutating, extending or hashing a document.
///
/// Every variant is locally recoverable. Read-style callers usually treat
/// [`DocumentError::NotFound`] as "absent" (see [`DocumentError::is_not_found`]),
/// while structural variants indicate the path does not fit the document shape.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// A key, index or traversal did not resolve. `path` is the path walked up
    /// to and including `segment` (the segment is empty when a match
    /// predicate rejected an existing value).
    #[error("not found: {segment}")]
    NotFound { segment: String, path: Path },

    #[error("not a traversable type: {reason}")]
    NotTraversable { reason: String },

    /// Array notation was used on something that is not an array.
    #[error("not an array: {key}")]
    NotAnArray { key: String },

    /// An array was reached but the next segment is neither an index nor `-`.
    #[error("array traversal indicator missing: {key}")]
    MissingArrayTraversal { key: String },

    #[error("incorrect type: expected {expected}, found {actual}")]
    IncorrectType {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("cannot append to array using index notation")]
    IndexNotation,

    #[error("cannot create hash for field {key} of type {kind}")]
    UnsupportedHashType { key: String, kind: &'static str },

    #[error("invalid patch operation: {message}")]
    InvalidPatch { message: String },

    #[error("no data found in raw object")]
    NoData,

    #[error("object does not have a name set")]
    MissingName,

    #[error("invalid label selector: {0}")]
    Selector(#[from] crate::selector::SelectorError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DocumentError {
    pub(crate) fn not_found(segment: impl Into<String>, path: Path) -> Self {
        DocumentError::NotFound {
            segment: segment.into(),
            path,
        }
    }

    pub(crate) fn not_traversable(reason: impl Into<String>) -> Self {
        DocumentError::NotTraversable {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_patch(message: impl Into<String>) -> Self {
        DocumentError::InvalidPatch {
            message: message.into(),
        }
    }

    /// True for [`DocumentError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocumentError::NotFound { .. })
    }
}

/// Human-readable name of a value's kind, used in type and hash errors.
pub fn kind_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub type Result<T, E = DocumentError> = std::result::Result<T, E>;
