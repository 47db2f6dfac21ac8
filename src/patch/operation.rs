use crate::path::Path;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// RFC 6902 operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Add,
    Remove,
    Replace,
    Copy,
    Move,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Op::Add => "add",
            Op::Remove => "remove",
            Op::Replace => "replace",
            Op::Copy => "copy",
            Op::Move => "move",
        };
        f.write_str(name)
    }
}

/// A single JSON patch record. `path` and `from` are JSON Pointers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: Op,
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PatchOperation {
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: Op::Add,
            path: path.into(),
            from: String::new(),
            value: Some(value),
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: Op::Remove,
            path: path.into(),
            from: String::new(),
            value: None,
        }
    }

    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: Op::Replace,
            path: path.into(),
            from: String::new(),
            value: Some(value),
        }
    }

    pub fn copy(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            op: Op::Copy,
            path: path.into(),
            from: from.into(),
            value: None,
        }
    }

    /// `move` is a keyword, hence the name.
    pub fn move_to(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            op: Op::Move,
            path: path.into(),
            from: from.into(),
            value: None,
        }
    }

    /// Target as a [`Path`].
    pub fn target(&self) -> Path {
        Path::parse_json_pointer(&self.path)
    }

    /// Source as a [`Path`], for `copy` and `move`.
    pub fn source(&self) -> Path {
        Path::parse_json_pointer(&self.from)
    }
}

impl fmt::Display for PatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.op, self.from.is_empty()) {
            (Op::Copy | Op::Move, false) => write!(f, "{} {} -> {}", self.op, self.from, self.path),
            _ => write!(f, "{} {}", self.op, self.path),
        }
    }
}

/// An ordered list of operations, serialized as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchSet {
    operations: Vec<PatchOperation>,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, operation: PatchOperation) {
        self.operations.push(operation);
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PatchOperation> {
        self.operations.iter()
    }

    pub fn as_slice(&self) -> &[PatchOperation] {
        &self.operations
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<Vec<PatchOperation>> for PatchSet {
    fn from(operations: Vec<PatchOperation>) -> Self {
        Self { operations }
    }
}

impl FromIterator<PatchOperation> for PatchSet {
    fn from_iter<I: IntoIterator<Item = PatchOperation>>(iter: I) -> Self {
        Self {
            operations: iter.into_iter().collect(),
        }
    }
}

impl Extend<PatchOperation> for PatchSet {
    fn extend<I: IntoIterator<Item = PatchOperation>>(&mut self, iter: I) {
        self.operations.extend(iter);
    }
}

impl IntoIterator for PatchSet {
    type Item = PatchOperation;
    type IntoIter = std::vec::IntoIter<PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

impl<'a> IntoIterator for &'a PatchSet {
    type Item = &'a PatchOperation;
    type IntoIter = std::slice::Iter<'a, PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}
