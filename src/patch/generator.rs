//! Minimal "add" patches for paths that do not fully exist yet.

use crate::errors::{DocumentError, Result};
use crate::path::{ArrayNotation, Path, TRAVERSAL};
use crate::walk::{self, WalkArgs};
use serde_json::{Map, Value};
use tracing::debug;

/// Shrink `path` to its longest existing prefix and grow `value` by the
/// structure that is missing below it.
///
/// Applying the result with add semantics (insert at the prefix, or append
/// when it ends in `-`) produces the same document as writing `value` at
/// `path` with every missing intermediate level created. Missing arrays can
/// only be created through `-`; an explicit index into an array that does
/// not exist fails with [`DocumentError::IndexNotation`].
///
/// ```
/// use docwalk::{patch::generate_patch, Path};
/// use serde_json::json;
///
/// let doc = json!({"spec": {}});
/// let (prefix, value) =
///     generate_patch(&doc, &Path::parse_jq("spec.ports[].name"), json!("http")).unwrap();
/// assert_eq!(prefix, Path::from(["spec", "ports"]));
/// assert_eq!(value, json!([{"name": "http"}]));
/// ```
pub fn generate_patch(root: &Value, path: &Path, value: Value) -> Result<(Path, Value)> {
    if path.is_empty() {
        return Ok((path.clone(), value));
    }

    let mut reached = Path::root();
    let outcome = {
        let mut args = WalkArgs::new().on_not_found(|walked| reached = walked.clone());
        walk::resolve(root, path, &mut args, false)
    };

    match outcome {
        Ok(resolution) => {
            let concrete = resolution
                .first()
                .map(|target| target.path.clone())
                .unwrap_or_else(|| path.clone());
            // Keep the append marker so the patch adds instead of overwriting.
            let concrete = if path.ends_in_traversal() {
                concrete.with_last(TRAVERSAL)
            } else {
                concrete
            };
            return Ok((concrete, value));
        }
        Err(err) if !err.is_not_found() => return Err(err),
        Err(_) => {}
    }

    if reached.len() == path.len() {
        return Ok((reached, value));
    }

    debug!(path = %path, reached = %reached, "extending patch value");

    let mut first = reached.len();
    let mut builder = match reached.len().checked_sub(1).map(|idx| path.is_array(idx).1) {
        None | Some(ArrayNotation::Invalid) => Builder::new(Some(Node::Object)),
        Some(ArrayNotation::Traversal) => {
            if path.get(first) == Some(TRAVERSAL) {
                // The array itself is missing: its traversal marker is part of
                // the unresolved remainder.
                first += 1;
                Builder::new(Some(Node::Array))
            } else {
                Builder::new(None)
            }
        }
        Some(ArrayNotation::Index) => return Err(DocumentError::IndexNotation),
    };

    let last = path.len() - 1;
    let mut idx = first;
    while idx <= last {
        let key = &path.segments()[idx];
        match path.is_array(idx).1 {
            ArrayNotation::Invalid => {
                if idx < last {
                    builder.attach(key, Node::Object);
                }
            }
            ArrayNotation::Traversal => {
                builder.attach(key, Node::Array);
                if key != TRAVERSAL {
                    idx += 1;
                }
            }
            ArrayNotation::Index => return Err(DocumentError::IndexNotation),
        }
        idx += 1;
    }

    builder.attach_value(&path.segments()[last]);
    Ok((reached, builder.finish(value)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Object,
    Array,
}

/// How a synthesized level holds its single child.
#[derive(Debug)]
enum Wrap {
    Key(String),
    Element,
}

/// Builds the synthesized value as a chain of single-child containers,
/// outermost first.
struct Builder {
    open: Option<Node>,
    wraps: Vec<Wrap>,
}

impl Builder {
    /// `open` is the container the next key attaches to; `None` means the
    /// patch targets an existing array and the first level is the element
    /// itself.
    fn new(open: Option<Node>) -> Self {
        Self {
            open,
            wraps: Vec::new(),
        }
    }

    fn attach(&mut self, key: &str, node: Node) {
        self.attach_value(key);
        self.open = Some(node);
    }

    fn attach_value(&mut self, key: &str) {
        let into_array = matches!(self.open, Some(Node::Array));
        if into_array || (self.open.is_none() && key == TRAVERSAL) {
            self.wraps.push(Wrap::Element);
        }
        if key != TRAVERSAL || matches!(self.open, Some(Node::Object)) {
            self.wraps.push(Wrap::Key(key.to_string()));
        }
    }

    fn finish(self, value: Value) -> Value {
        self.wraps.into_iter().rev().fold(value, |inner, wrap| match wrap {
            Wrap::Element => Value::Array(vec![inner]),
            Wrap::Key(key) => {
                let mut map = Map::new();
                map.insert(key, inner);
                Value::Object(map)
            }
        })
    }
}
