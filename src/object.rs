//! Kubernetes-shaped objects: documents that carry `metadata.name`.

use crate::config::FieldCleaner;
use crate::document::Document;
use crate::errors::{DocumentError, Result};
use crate::path::Path;
use crate::selector::LabelSelector;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::ops::{Deref, DerefMut};

/// Paths every Kubernetes object shares.
pub mod paths {
    use crate::path::Path;

    pub fn metadata() -> Path {
        Path::from(["metadata"])
    }

    pub fn metadata_name() -> Path {
        Path::from(["metadata", "name"])
    }

    /// Name prefix used before a controller assigned the final name.
    pub fn metadata_generate_name() -> Path {
        Path::from(["metadata", "generateName"])
    }

    pub fn metadata_namespace() -> Path {
        Path::from(["metadata", "namespace"])
    }

    pub fn metadata_uid() -> Path {
        Path::from(["metadata", "uid"])
    }

    pub fn labels() -> Path {
        Path::from(["metadata", "labels"])
    }

    pub fn annotations() -> Path {
        Path::from(["metadata", "annotations"])
    }

    pub fn owner_references() -> Path {
        Path::from(["metadata", "ownerReferences"])
    }

    /// Kind of the first owner reference.
    pub fn owner_reference_kind() -> Path {
        Path::from(["metadata", "ownerReferences", "-", "kind"])
    }

    pub fn kind() -> Path {
        Path::from(["kind"])
    }

    pub fn api_version() -> Path {
        Path::from(["apiVersion"])
    }

    pub fn spec() -> Path {
        Path::from(["spec"])
    }
}

/// A document with a name, either `metadata.name` or
/// `metadata.generateName`.
///
/// Dereferences to [`Document`] for generic path access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamedObject {
    doc: Document,
}

impl NamedObject {
    pub fn new(name: &str) -> Self {
        Self {
            doc: Document::new(json!({"metadata": {"name": name}})),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(DocumentError::NoData);
        }
        Self::from_value(serde_json::from_str(text)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Err(DocumentError::NoData);
        }
        Self::from_document(Document::new(value))
    }

    pub fn from_document(doc: Document) -> Result<Self> {
        if !doc.has(&paths::metadata_name()) && !doc.has(&paths::metadata_generate_name()) {
            return Err(DocumentError::MissingName);
        }
        Ok(Self { doc })
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    /// `metadata.name`, falling back to `metadata.generateName`.
    pub fn name(&self) -> Option<&str> {
        self.string_at(&paths::metadata_name())
            .or_else(|| self.string_at(&paths::metadata_generate_name()))
    }

    pub fn namespace(&self) -> Option<&str> {
        self.string_at(&paths::metadata_namespace())
    }

    pub fn kind(&self) -> Option<&str> {
        self.string_at(&paths::kind())
    }

    pub fn api_version(&self) -> Option<&str> {
        self.string_at(&paths::api_version())
    }

    pub fn uid(&self) -> Option<&str> {
        self.string_at(&paths::metadata_uid())
    }

    /// Kind of the resource owning this one, e.g. `ReplicaSet` for a pod.
    pub fn owner_kind(&self) -> Option<&str> {
        self.string_at(&paths::owner_reference_kind())
    }

    pub fn label(&self, key: &str) -> Result<&str> {
        self.doc.get_string(&paths::labels().child(key))
    }

    pub fn has_labels(&self) -> bool {
        self.doc.has(&paths::labels())
    }

    /// Case-insensitive comparison; false if the label is missing.
    pub fn is_label_set_to(&self, key: &str, value: &str) -> bool {
        self.label(key).is_ok_and(|label| equal_fold(label, value))
    }

    /// Case-insensitive comparison; true if the label is missing.
    pub fn is_label_not_set_to(&self, key: &str, value: &str) -> bool {
        !self.is_label_set_to(key, value)
    }

    pub fn annotation(&self, key: &str) -> Result<&str> {
        self.doc.get_string(&paths::annotations().child(key))
    }

    pub fn has_annotations(&self) -> bool {
        self.doc.has(&paths::annotations())
    }

    pub fn is_annotation_set_to(&self, key: &str, value: &str) -> bool {
        self.annotation(key)
            .is_ok_and(|annotation| equal_fold(annotation, value))
    }

    pub fn is_annotation_not_set_to(&self, key: &str, value: &str) -> bool {
        !self.is_annotation_set_to(key, value)
    }

    pub fn set_name(&mut self, name: &str) -> Result<()> {
        self.doc.set(&paths::metadata_name(), json!(name))
    }

    pub fn set_namespace(&mut self, namespace: &str) -> Result<()> {
        self.doc.set(&paths::metadata_namespace(), json!(namespace))
    }

    /// Set a label, creating the labels section if needed.
    pub fn set_label(&mut self, key: &str, value: &str) -> Result<()> {
        self.doc.set(&paths::labels().child(key), json!(value))
    }

    /// Set an annotation, creating the annotations section if needed.
    pub fn set_annotation(&mut self, key: &str, value: &str) -> Result<()> {
        self.doc.set(&paths::annotations().child(key), json!(value))
    }

    /// Match `kind` and `api_version` case-insensitively. An empty string
    /// matches anything.
    pub fn is_of_kind(&self, kind: &str, api_version: &str) -> bool {
        let field_matches = |expected: &str, actual: Option<&str>| {
            expected.is_empty() || actual.is_some_and(|actual| equal_fold(actual, expected))
        };
        field_matches(kind, self.kind()) && field_matches(api_version, self.api_version())
    }

    /// Strip server-managed fields, e.g. with
    /// [`FieldCleaner::kubernetes_managed_fields`].
    pub fn remove_managed_fields(&mut self, cleaner: &FieldCleaner) {
        cleaner.clean(self.doc.root_mut());
    }

    /// Parse the selector section at `path`, e.g. `spec.selector`.
    pub fn label_selector(&self, path: &Path) -> Result<LabelSelector> {
        let section = self.doc.get_section(path)?;
        Ok(LabelSelector::parse(section)?)
    }

    fn string_at(&self, path: &Path) -> Option<&str> {
        self.doc.get_string(path).ok()
    }
}

impl Deref for NamedObject {
    type Target = Document;

    fn deref(&self) -> &Document {
        &self.doc
    }
}

impl DerefMut for NamedObject {
    fn deref_mut(&mut self) -> &mut Document {
        &mut self.doc
    }
}

impl TryFrom<Value> for NamedObject {
    type Error = DocumentError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

fn equal_fold(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}
