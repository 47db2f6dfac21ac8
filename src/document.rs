//! An owned document with path-based accessors.

use crate::errors::{kind_name, DocumentError, Result};
use crate::hash;
use crate::patch::{self, PatchOperation};
use crate::path::Path;
use crate::walk::{self, WalkArgs};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::debug;

/// A semi-structured document: any JSON value, usually an object.
///
/// Reads take `&self`, writes `&mut self`; the document is never copied
/// behind the caller's back.
///
/// ```
/// use docwalk::{Document, Path};
/// use serde_json::json;
///
/// let mut doc = Document::new(json!({"metadata": {"name": "web"}}));
/// doc.set(&Path::parse_jq("metadata.labels.app"), json!("web")).unwrap();
/// assert_eq!(doc.get_string(&Path::parse_jq("metadata.labels.app")).unwrap(), "web");
///
/// doc.delete(&Path::parse_jq("metadata.labels")).unwrap();
/// assert!(!doc.has(&Path::parse_jq("metadata.labels")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    root: Value,
}

impl Document {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(serde_json::from_slice(bytes)?))
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Value {
        &mut self.root
    }

    pub fn into_inner(self) -> Value {
        self.root
    }

    /// Value at `path`; a `-` traversal yields the first element that
    /// resolves the rest of the path.
    pub fn get(&self, path: &Path) -> Result<Value> {
        self.get_ref(path).cloned()
    }

    /// Like [`Document::get`] without cloning.
    pub fn get_ref(&self, path: &Path) -> Result<&Value> {
        walk::get(&self.root, path)
    }

    pub fn has(&self, path: &Path) -> bool {
        self.get_ref(path).is_ok()
    }

    pub fn get_string(&self, path: &Path) -> Result<&str> {
        let value = self.get_ref(path)?;
        value.as_str().ok_or_else(|| incorrect_type("string", value))
    }

    pub fn get_section(&self, path: &Path) -> Result<&Map<String, Value>> {
        let value = self.get_ref(path)?;
        value.as_object().ok_or_else(|| incorrect_type("object", value))
    }

    pub fn get_list(&self, path: &Path) -> Result<&[Value]> {
        let value = self.get_ref(path)?;
        value
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| incorrect_type("array", value))
    }

    pub fn get_bool(&self, path: &Path) -> Result<bool> {
        let value = self.get_ref(path)?;
        value.as_bool().ok_or_else(|| incorrect_type("bool", value))
    }

    pub fn get_number(&self, path: &Path) -> Result<&Number> {
        match self.get_ref(path)? {
            Value::Number(n) => Ok(n),
            other => Err(incorrect_type("number", other)),
        }
    }

    /// Write `value` at `path`, creating missing objects and arrays on the
    /// way. A path ending in `-` appends.
    pub fn set(&mut self, path: &Path, value: Value) -> Result<()> {
        let (target, value) = patch::generate_patch(&self.root, path, value)?;
        debug!(path = %path, target = %target, "set");

        let mut pending = Some(value);
        if !target.ends_in_traversal() {
            walk::walk_mut(&mut self.root, &target, WalkArgs::new(), |_| pending.take())?;
            return Ok(());
        }

        let mut mismatch = None;
        walk::walk_mut(&mut self.root, &target.parent(), WalkArgs::new(), |current| {
            match current {
                Some(Value::Array(mut items)) => {
                    items.extend(pending.take());
                    Some(Value::Array(items))
                }
                other => {
                    mismatch = Some(other.as_ref().map_or("null", kind_name));
                    other
                }
            }
        })?;

        match mismatch {
            Some(actual) => Err(DocumentError::IncorrectType {
                expected: "array",
                actual,
            }),
            None => Ok(()),
        }
    }

    /// Remove the key or array element at `path`. Deleting a key that does
    /// not exist (while its parent does) succeeds.
    pub fn delete(&mut self, path: &Path) -> Result<()> {
        debug!(path = %path, "delete");
        walk::walk_mut(&mut self.root, path, WalkArgs::new(), |_| None).map(drop)
    }

    /// Concrete paths of every match of `path`, optionally only those whose
    /// value equals `value`.
    pub fn find_all(&self, path: &Path, value: Option<&Value>) -> Result<Vec<Path>> {
        let mut args = matching(value).match_all(true);
        let resolution = walk::resolve(&self.root, path, &mut args, false)?;
        Ok(resolution
            .targets()
            .into_iter()
            .map(|target| target.path.clone())
            .collect())
    }

    /// Concrete path of the first match of `path`.
    pub fn find_first(&self, path: &Path, value: Option<&Value>) -> Result<Path> {
        let mut args = matching(value);
        let resolution = walk::resolve(&self.root, path, &mut args, false)?;
        resolution
            .first()
            .map(|target| target.path.clone())
            .ok_or_else(|| DocumentError::not_found("", path.clone()))
    }

    pub fn walk(&self, path: &Path, args: WalkArgs<'_>) -> Result<Value> {
        walk::walk(&self.root, path, args)
    }

    pub fn walk_mut<F>(&mut self, path: &Path, args: WalkArgs<'_>, mutate: F) -> Result<Value>
    where
        F: FnMut(Option<Value>) -> Option<Value>,
    {
        walk::walk_mut(&mut self.root, path, args, mutate)
    }

    pub fn generate_patch(&self, path: &Path, value: Value) -> Result<(Path, Value)> {
        patch::generate_patch(&self.root, path, value)
    }

    pub fn hash(&self) -> Result<u64> {
        hash::hash(&self.root)
    }

    pub fn hash_str(&self) -> Result<String> {
        hash::hash_str(&self.root)
    }

    pub fn apply(&mut self, operation: &PatchOperation) -> Result<()> {
        patch::apply(&mut self.root, operation)
    }

    pub fn apply_all<'a, I>(&mut self, operations: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a PatchOperation>,
    {
        patch::apply_all(&mut self.root, operations)
    }

    pub fn create_add_patch(path: &Path, value: Value) -> PatchOperation {
        PatchOperation::add(path.to_json_pointer(), value)
    }

    pub fn create_replace_patch(path: &Path, value: Value) -> PatchOperation {
        PatchOperation::replace(path.to_json_pointer(), value)
    }

    pub fn create_remove_patch(path: &Path) -> PatchOperation {
        PatchOperation::remove(path.to_json_pointer())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.root)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }
}

impl From<Value> for Document {
    fn from(root: Value) -> Self {
        Self::new(root)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        doc.root
    }
}

impl AsRef<Value> for Document {
    fn as_ref(&self) -> &Value {
        &self.root
    }
}

fn matching(value: Option<&Value>) -> WalkArgs<'_> {
    match value {
        Some(expected) => WalkArgs::new().on_match(move |found, _| found == expected),
        None => WalkArgs::new(),
    }
}

fn incorrect_type(expected: &'static str, value: &Value) -> DocumentError {
    DocumentError::IncorrectType {
        expected,
        actual: kind_name(value),
    }
}
