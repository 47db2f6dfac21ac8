//! Path resolution over `serde_json::Value` trees.
//!
//! Walking happens in two phases. Resolution borrows the tree immutably and
//! turns the requested [`Path`] into concrete target paths (every `-` replaced
//! by the index that matched). Mutation then visits those targets in reverse
//! order and splices each result into its parent container, so removals
//! never shift an index that is still to be written.

pub mod args;

pub use args::{MatchFn, NotFoundFn, WalkArgs};

use crate::errors::{kind_name, DocumentError, Result};
use crate::path::{ArrayNotation, Path, TRAVERSAL};
use serde_json::Value;
use tracing::{debug, trace};

/// A resolved location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Target {
    /// Concrete path: object keys and array indices only.
    pub path: Path,
    /// The final key does not exist yet; a mutation creates it.
    pub vacant: bool,
    /// Mutation appends to the parent array instead of overwriting the
    /// element that was matched.
    pub append: bool,
}

/// Shape of a walk result. `Many` mirrors how a `match_all` traversal
/// nests the values it collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolution {
    Hit(Target),
    Many(Vec<Resolution>),
}

impl Resolution {
    /// Targets in depth-first order.
    pub(crate) fn targets(&self) -> Vec<&Target> {
        let mut out = Vec::new();
        self.collect_targets(&mut out);
        out
    }

    fn collect_targets<'r>(&'r self, out: &mut Vec<&'r Target>) {
        match self {
            Resolution::Hit(target) => out.push(target),
            Resolution::Many(children) => {
                for child in children {
                    child.collect_targets(out);
                }
            }
        }
    }

    pub(crate) fn first(&self) -> Option<&Target> {
        match self {
            Resolution::Hit(target) => Some(target),
            Resolution::Many(children) => children.iter().find_map(Resolution::first),
        }
    }

    /// Rebuild the walk result, taking one value per target in depth-first
    /// order.
    fn build(&self, value_of: &mut dyn FnMut(&Target) -> Value) -> Value {
        match self {
            Resolution::Hit(target) => value_of(target),
            Resolution::Many(children) => {
                Value::Array(children.iter().map(|child| child.build(value_of)).collect())
            }
        }
    }
}

/// Resolve `path` and return the value found there.
///
/// With `match_all`, a `-` traversal yields every matching element: one match
/// is returned as-is, several as an array. Without it the first matching
/// element wins.
pub fn walk(root: &Value, path: &Path, mut args: WalkArgs<'_>) -> Result<Value> {
    let resolution = resolve(root, path, &mut args, false)?;
    Ok(resolution.build(&mut |target| {
        lookup(root, target.path.segments())
            .cloned()
            .unwrap_or(Value::Null)
    }))
}

/// Resolve `path` and replace every match with the result of `mutate`.
///
/// `mutate` receives the current value, or `None` when the final key of the
/// path does not exist yet. Returning `None` deletes the key or array
/// element; returning `Some` overwrites it, or appends when the path ends in a
/// first-match `-` traversal. Mutating the root with `None` leaves `null`.
///
/// The returned value has the same shape as [`walk`] and holds the values
/// written (`null` for deletions).
pub fn walk_mut<F>(root: &mut Value, path: &Path, mut args: WalkArgs<'_>, mut mutate: F) -> Result<Value>
where
    F: FnMut(Option<Value>) -> Option<Value>,
{
    let resolution = resolve(root, path, &mut args, true)?;
    let targets = resolution.targets();
    debug!(path = %path, targets = targets.len(), "mutating document");

    let mut written = vec![Value::Null; targets.len()];
    for (idx, target) in targets.iter().enumerate().rev() {
        written[idx] = write_back(root, target, &mut mutate)?;
    }

    let mut written = written.into_iter();
    Ok(resolution.build(&mut |_| written.next().unwrap_or(Value::Null)))
}

/// Borrow the first value `path` resolves to.
pub fn get<'v>(root: &'v Value, path: &Path) -> Result<&'v Value> {
    let mut args = WalkArgs::new();
    let resolution = resolve(root, path, &mut args, false)?;
    resolution
        .first()
        .and_then(|target| lookup(root, target.path.segments()))
        .ok_or_else(|| DocumentError::not_found("", path.clone()))
}

pub(crate) fn resolve(
    root: &Value,
    path: &Path,
    args: &mut WalkArgs<'_>,
    creates: bool,
) -> Result<Resolution> {
    let mut resolver = Resolver { args, creates };
    resolver.resolve(root, path.segments(), Path::root(), false)
}

struct Resolver<'a, 'b> {
    args: &'b mut WalkArgs<'a>,
    /// A missing final key resolves to a vacant target instead of failing.
    creates: bool,
}

impl Resolver<'_, '_> {
    fn resolve(
        &mut self,
        node: &Value,
        path: &[String],
        walked: Path,
        append: bool,
    ) -> Result<Resolution> {
        let Some((segment, rest)) = path.split_first() else {
            if let Some(matches) = self.args.match_fn.as_mut() {
                if !matches(node, &walked) {
                    return Err(self.missing(&walked, ""));
                }
            }
            return Ok(Resolution::Hit(Target {
                path: walked,
                vacant: false,
                append,
            }));
        };

        match node {
            Value::Object(map) => {
                if ArrayNotation::of(segment).is_array() {
                    return Err(DocumentError::NotAnArray {
                        key: key_of(&walked).to_string(),
                    });
                }
                match map.get(segment) {
                    Some(child) => self.resolve(child, rest, walked.child(segment), false),
                    None if rest.is_empty() && self.creates => {
                        trace!(path = %walked, key = %segment, "creating missing key");
                        Ok(Resolution::Hit(Target {
                            path: walked.child(segment),
                            vacant: true,
                            append: false,
                        }))
                    }
                    None => Err(self.missing(&walked, segment)),
                }
            }
            Value::Array(items) => match ArrayNotation::of(segment) {
                ArrayNotation::Index => {
                    let child = segment
                        .parse::<usize>()
                        .ok()
                        .and_then(|idx| items.get(idx));
                    match child {
                        Some(child) => self.resolve(child, rest, walked.child(segment), false),
                        None => Err(self.missing(&walked, segment)),
                    }
                }
                ArrayNotation::Traversal => self.traverse(items, rest, &walked),
                ArrayNotation::Invalid => Err(DocumentError::MissingArrayTraversal {
                    key: key_of(&walked).to_string(),
                }),
            },
            Value::Null => Err(DocumentError::not_traversable(format!(
                "{} is nil",
                key_of(&walked)
            ))),
            other => Err(DocumentError::not_traversable(format!(
                "{} is {}",
                key_of(&walked),
                kind_name(other)
            ))),
        }
    }

    fn traverse(&mut self, items: &[Value], rest: &[String], walked: &Path) -> Result<Resolution> {
        if !self.args.match_all {
            for (idx, child) in items.iter().enumerate() {
                if let Ok(found) = self.resolve(child, rest, walked.child(idx.to_string()), true) {
                    return Ok(found);
                }
            }
            return Err(self.missing(walked, TRAVERSAL));
        }

        // Errors in individual elements only mean that element did not match.
        let mut found = Vec::new();
        for (idx, child) in items.iter().enumerate() {
            if let Ok(resolution) = self.resolve(child, rest, walked.child(idx.to_string()), false)
            {
                found.push(resolution);
            }
        }

        match found.len() {
            0 => Err(self.missing(walked, TRAVERSAL)),
            1 => Ok(found.remove(0)),
            _ => Ok(Resolution::Many(found)),
        }
    }

    fn missing(&mut self, walked: &Path, segment: &str) -> DocumentError {
        let reached = if segment.is_empty() {
            walked.clone()
        } else {
            walked.child(segment)
        };
        if let Some(not_found) = self.args.not_found_fn.as_mut() {
            not_found(&reached);
        }
        DocumentError::not_found(segment, reached)
    }
}

fn key_of(walked: &Path) -> &str {
    walked.last().unwrap_or("")
}

/// Follow a concrete path (keys and indices only).
pub(crate) fn lookup<'v>(root: &'v Value, segments: &[String]) -> Option<&'v Value> {
    segments.iter().try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
        _ => None,
    })
}

pub(crate) fn lookup_mut<'v>(root: &'v mut Value, segments: &[String]) -> Option<&'v mut Value> {
    let mut node = root;
    for segment in segments {
        node = match node {
            Value::Object(map) => map.get_mut(segment)?,
            Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(node)
}

fn write_back<F>(root: &mut Value, target: &Target, mutate: &mut F) -> Result<Value>
where
    F: FnMut(Option<Value>) -> Option<Value>,
{
    let Some(key) = target.path.last() else {
        let current = std::mem::take(root);
        let next = mutate(Some(current)).unwrap_or(Value::Null);
        *root = next.clone();
        return Ok(next);
    };

    let parent_path = target.path.parent();
    let parent = lookup_mut(root, parent_path.segments()).ok_or_else(|| {
        DocumentError::not_traversable(format!("{parent_path} no longer resolves"))
    })?;

    match parent {
        Value::Object(map) => {
            let current = map.get_mut(key).map(std::mem::take);
            match mutate(current) {
                Some(next) => {
                    map.insert(key.to_string(), next.clone());
                    Ok(next)
                }
                None => {
                    map.remove(key);
                    Ok(Value::Null)
                }
            }
        }
        Value::Array(items) => {
            let idx = key
                .parse::<usize>()
                .ok()
                .filter(|idx| *idx < items.len())
                .ok_or_else(|| DocumentError::not_found(key, target.path.clone()))?;

            if target.append {
                return match mutate(Some(items[idx].clone())) {
                    Some(next) => {
                        items.push(next.clone());
                        Ok(next)
                    }
                    None => {
                        items.remove(idx);
                        Ok(Value::Null)
                    }
                };
            }

            let current = std::mem::take(&mut items[idx]);
            match mutate(Some(current)) {
                Some(next) => {
                    items[idx] = next.clone();
                    Ok(next)
                }
                None => {
                    items.remove(idx);
                    Ok(Value::Null)
                }
            }
        }
        other => Err(DocumentError::not_traversable(format!(
            "parent {parent_path} is {}",
            kind_name(other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jq(path: &str) -> Path {
        Path::parse_jq(path)
    }

    #[test]
    fn reads_nested_keys_and_indices() {
        let doc = json!({"a": {"list": ["x", "y"], "nested": [["a", "b"], ["c"]]}});

        assert_eq!(walk(&doc, &jq("a.list[1]"), WalkArgs::new()).unwrap(), json!("y"));
        assert_eq!(walk(&doc, &jq("a.list[]"), WalkArgs::new()).unwrap(), json!("x"));
        assert_eq!(walk(&doc, &jq("a.nested[0][1]"), WalkArgs::new()).unwrap(), json!("b"));
    }

    #[test]
    fn structural_errors_are_distinct() {
        let doc = json!({"obj": {"k": "v"}, "list": [1, 2], "empty": null});

        assert!(matches!(
            walk(&doc, &jq("obj[].k"), WalkArgs::new()),
            Err(DocumentError::NotAnArray { key }) if key == "obj"
        ));
        assert!(matches!(
            walk(&doc, &jq("list.k"), WalkArgs::new()),
            Err(DocumentError::MissingArrayTraversal { key }) if key == "list"
        ));
        assert!(matches!(
            walk(&doc, &jq("empty.k"), WalkArgs::new()),
            Err(DocumentError::NotTraversable { .. })
        ));
        assert!(matches!(
            walk(&doc, &jq("obj.k.deeper"), WalkArgs::new()),
            Err(DocumentError::NotTraversable { reason }) if reason == "k is string"
        ));
        assert!(matches!(
            walk(&doc, &jq("list[5]"), WalkArgs::new()),
            Err(DocumentError::NotFound { segment, .. }) if segment == "5"
        ));
    }

    #[test]
    fn not_found_reports_reached_path() {
        let doc = json!({"a": {"b": {}}});
        let mut reached = Vec::new();
        let result = walk(
            &doc,
            &jq("a.b.c.d"),
            WalkArgs::new().on_not_found(|path| reached.push(path.clone())),
        );

        assert!(result.unwrap_err().is_not_found());
        assert_eq!(reached, vec![Path::from(["a", "b", "c"])]);
    }

    #[test]
    fn rejected_match_is_not_found() {
        let doc = json!({"a": "value"});
        let result = walk(&doc, &jq("a"), WalkArgs::new().on_match(|v, _| v == "other"));
        assert!(matches!(
            result,
            Err(DocumentError::NotFound { segment, .. }) if segment.is_empty()
        ));
    }

    #[test]
    fn first_match_traversal_skips_failing_elements() {
        let doc = json!({"items": [{"other": 1}, {"name": "second"}]});
        let value = walk(&doc, &jq("items[].name"), WalkArgs::new()).unwrap();
        assert_eq!(value, json!("second"));
    }

    #[test]
    fn match_all_nests_inner_collections() {
        let doc = json!({"a": [{"b": [1, 2]}, {"b": [3]}]});
        let value = walk(&doc, &jq("a[].b[]"), WalkArgs::new().match_all(true)).unwrap();
        assert_eq!(value, json!([[1, 2], 3]));
    }

    #[test]
    fn mutate_overwrites_creates_and_deletes() {
        let mut doc = json!({"a": {"b": 1}});

        walk_mut(&mut doc, &jq("a.b"), WalkArgs::new(), |_| Some(json!(2))).unwrap();
        assert_eq!(doc, json!({"a": {"b": 2}}));

        walk_mut(&mut doc, &jq("a.c"), WalkArgs::new(), |current| {
            assert!(current.is_none());
            Some(json!("new"))
        })
        .unwrap();
        assert_eq!(doc, json!({"a": {"b": 2, "c": "new"}}));

        walk_mut(&mut doc, &jq("a.b"), WalkArgs::new(), |_| None).unwrap();
        assert_eq!(doc, json!({"a": {"c": "new"}}));
    }

    #[test]
    fn missing_intermediate_key_is_not_created() {
        let mut doc = json!({"a": {}});
        let result = walk_mut(&mut doc, &jq("a.b.c"), WalkArgs::new(), |_| Some(json!(1)));
        assert!(result.unwrap_err().is_not_found());
        assert_eq!(doc, json!({"a": {}}));
    }

    #[test]
    fn first_match_traversal_appends_on_mutate() {
        let mut doc = json!({"list": ["a"]});
        let written =
            walk_mut(&mut doc, &jq("list[]"), WalkArgs::new(), |_| Some(json!("b"))).unwrap();
        assert_eq!(written, json!("b"));
        assert_eq!(doc, json!({"list": ["a", "b"]}));
    }

    #[test]
    fn match_all_mutation_overwrites_each_match() {
        let mut doc = json!({"list": [{"v": 1}, {"v": 2}, {"x": 3}]});
        let written = walk_mut(
            &mut doc,
            &jq("list[].v"),
            WalkArgs::new().match_all(true),
            |current| current.and_then(|v| v.as_i64()).map(|v| json!(v * 10)),
        )
        .unwrap();
        assert_eq!(written, json!([10, 20]));
        assert_eq!(doc, json!({"list": [{"v": 10}, {"v": 20}, {"x": 3}]}));
    }

    #[test]
    fn match_all_deletion_keeps_indices_stable() {
        let mut doc = json!({"list": ["a", "b", "a", "c"]});
        walk_mut(
            &mut doc,
            &jq("list[]"),
            WalkArgs::new().match_all(true).on_match(|v, _| v == "a"),
            |_| None,
        )
        .unwrap();
        assert_eq!(doc, json!({"list": ["b", "c"]}));
    }

    #[test]
    fn mutating_root_replaces_document() {
        let mut doc = json!({"a": 1});
        walk_mut(&mut doc, &Path::root(), WalkArgs::new(), |_| Some(json!([1]))).unwrap();
        assert_eq!(doc, json!([1]));
    }

    #[test]
    fn get_borrows_first_match() {
        let doc = json!({"list": [{"k": "a"}, {"k": "b"}]});
        assert_eq!(get(&doc, &jq("list[].k")).unwrap(), "a");
        assert_eq!(get(&doc, &jq("list[1].k")).unwrap(), "b");
    }
}
