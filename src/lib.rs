//! Docwalk: path-addressable access to semi-structured documents
//!
//! Read, search, mutate, extend and fingerprint arbitrarily nested JSON
//! values through simple key / array-index paths.
//!
//! # Architecture
//!
//! Everything is built on one traversal, [`walk`]. A [`Path`] is resolved
//! against a `serde_json::Value` into concrete locations, which are then read
//! or rewritten in place. On top of it sit:
//!
//! - [`patch::generate_patch`], which turns a write to a partially existing
//!   path into an "add" of the missing structure at the longest existing
//!   prefix,
//! - [`hash`], a digest that ignores object key order,
//! - [`Document`] and [`NamedObject`], owned wrappers with typed accessors.
//!
//! # Paths
//!
//! Paths come in two text forms. The JQ-like form
//! (`spec.containers[].ports[0]`, `metadata.'app.kubernetes.io/name'`) and
//! RFC 6901 JSON Pointers (`/spec/containers/-/ports/0`). Array access takes
//! two segments: the key naming the array and either an index or `-`, which
//! means "first matching element" on read and "append" on write.
//!
//! # Example
//!
//! ```
//! use docwalk::{Document, Path};
//! use serde_json::json;
//!
//! let mut doc = Document::new(json!({"spec": {"containers": [{"name": "app"}]}}));
//!
//! doc.set(&Path::parse_jq("spec.containers[0].env[]"), json!({"name": "DEBUG"}))
//!     .unwrap();
//! assert_eq!(
//!     doc.get(&Path::parse_json_pointer("/spec/containers/0/env/0/name")).unwrap(),
//!     json!("DEBUG")
//! );
//!
//! let fingerprint = doc.hash_str().unwrap();
//! assert_eq!(fingerprint.len(), 12);
//! ```

pub mod config;
pub mod document;
pub mod errors;
pub mod hash;
pub mod object;
pub mod patch;
pub mod path;
pub mod selector;
pub mod walk;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, FieldCleaner};
pub use document::Document;
pub use errors::{DocumentError, Result};
pub use hash::{hash, hash_str};
pub use object::{paths, NamedObject};
pub use patch::{generate_patch, PatchOperation, PatchSet};
pub use path::{ArrayNotation, Path, TRAVERSAL};
pub use selector::{LabelSelector, Operator, Requirement, SelectorError};
pub use walk::WalkArgs;
