//! In-memory application of [`PatchOperation`]s.

use super::operation::{Op, PatchOperation};
use crate::errors::{DocumentError, Result};
use crate::path::{Path, TRAVERSAL};
use crate::walk::{lookup, lookup_mut};
use serde_json::Value;
use tracing::trace;

/// Apply a single operation to `root`.
///
/// On error the document is left as it was before the call, except for a
/// `move` whose destination turned out to be invalid after the source was
/// already removed; use [`apply_all`] on a clone when atomicity matters.
pub fn apply(root: &mut Value, operation: &PatchOperation) -> Result<()> {
    trace!(op = %operation, "applying patch operation");
    let target = operation.target();

    match operation.op {
        Op::Add => add(root, &target, operation.value.clone().unwrap_or(Value::Null)),
        Op::Remove => remove(root, &target).map(drop),
        Op::Replace => replace(root, &target, operation.value.clone().unwrap_or(Value::Null)),
        Op::Copy => {
            let source = operation.source();
            let value = lookup(root, source.segments())
                .cloned()
                .ok_or_else(|| missing(&source))?;
            add(root, &target, value)
        }
        Op::Move => {
            let source = operation.source();
            if source.len() < target.len() && target.prefix(source.len()) == source {
                return Err(DocumentError::invalid_patch(format!(
                    "cannot move {} into its own child {}",
                    operation.from, operation.path
                )));
            }
            let value = remove(root, &source)?;
            add(root, &target, value)
        }
    }
}

/// Apply `operations` in order, stopping at the first failure.
pub fn apply_all<'a, I>(root: &mut Value, operations: I) -> Result<()>
where
    I: IntoIterator<Item = &'a PatchOperation>,
{
    for operation in operations {
        apply(root, operation)?;
    }
    Ok(())
}

fn add(root: &mut Value, target: &Path, value: Value) -> Result<()> {
    let Some(key) = target.last() else {
        *root = value;
        return Ok(());
    };

    match parent_of(root, target)? {
        Value::Object(map) => {
            map.insert(key.to_string(), value);
        }
        Value::Array(items) => {
            if key == TRAVERSAL {
                items.push(value);
            } else {
                let idx = array_index(key, items.len() + 1)?;
                items.insert(idx, value);
            }
        }
        other => {
            return Err(DocumentError::invalid_patch(format!(
                "cannot add {target} to {}",
                crate::errors::kind_name(other)
            )))
        }
    }
    Ok(())
}

fn replace(root: &mut Value, target: &Path, value: Value) -> Result<()> {
    match lookup_mut(root, target.segments()) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(missing(target)),
    }
}

fn remove(root: &mut Value, target: &Path) -> Result<Value> {
    let Some(key) = target.last() else {
        return Ok(std::mem::take(root));
    };

    let removed = match parent_of(root, target)? {
        Value::Object(map) => map.remove(key),
        Value::Array(items) => {
            let idx = array_index(key, items.len())?;
            Some(items.remove(idx))
        }
        _ => None,
    };
    removed.ok_or_else(|| missing(target))
}

fn parent_of<'v>(root: &'v mut Value, target: &Path) -> Result<&'v mut Value> {
    let parent = target.parent();
    lookup_mut(root, parent.segments()).ok_or_else(|| missing(&parent))
}

fn missing(path: &Path) -> DocumentError {
    DocumentError::not_found(path.last().unwrap_or_default(), path.clone())
}

/// Parse an array index that must be below `bound`.
fn array_index(key: &str, bound: usize) -> Result<usize> {
    key.parse::<usize>()
        .ok()
        .filter(|idx| *idx < bound)
        .ok_or_else(|| DocumentError::invalid_patch(format!("array index {key} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn add_inserts_and_appends() {
        let mut doc = json!({"list": [1, 3]});
        apply(&mut doc, &PatchOperation::add("/list/1", json!(2))).unwrap();
        apply(&mut doc, &PatchOperation::add("/list/-", json!(4))).unwrap();
        apply(&mut doc, &PatchOperation::add("/name", json!("x"))).unwrap();
        assert_eq!(doc, json!({"list": [1, 2, 3, 4], "name": "x"}));
    }

    #[test]
    fn add_past_end_is_rejected() {
        let mut doc = json!({"list": []});
        let err = apply(&mut doc, &PatchOperation::add("/list/1", json!(0))).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidPatch { .. }));
    }

    #[test]
    fn replace_and_remove_need_existing_target() {
        let mut doc = json!({"a": 1});
        assert!(apply(&mut doc, &PatchOperation::replace("/b", json!(2)))
            .unwrap_err()
            .is_not_found());
        assert!(apply(&mut doc, &PatchOperation::remove("/b"))
            .unwrap_err()
            .is_not_found());

        apply(&mut doc, &PatchOperation::replace("/a", json!(2))).unwrap();
        assert_eq!(doc, json!({"a": 2}));
        apply(&mut doc, &PatchOperation::remove("/a")).unwrap();
        assert_eq!(doc, json!({}));
    }

    #[test]
    fn copy_and_move() {
        let mut doc = json!({"a": {"x": 1}, "b": {}});
        apply(&mut doc, &PatchOperation::copy("/a/x", "/b/y")).unwrap();
        apply(&mut doc, &PatchOperation::move_to("/a", "/c")).unwrap();
        assert_eq!(doc, json!({"b": {"y": 1}, "c": {"x": 1}}));

        let err = apply(&mut doc, &PatchOperation::move_to("/c", "/c/inner")).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidPatch { .. }));
    }

    #[test]
    fn apply_all_stops_at_first_failure() {
        let mut doc = json!({});
        let ops = vec![
            PatchOperation::add("/a", json!(1)),
            PatchOperation::remove("/missing"),
            PatchOperation::add("/b", json!(2)),
        ];
        assert!(apply_all(&mut doc, &ops).is_err());
        assert_eq!(doc, json!({"a": 1}));
    }
}
