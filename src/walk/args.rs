use crate::path::Path;
use serde_json::Value;
use std::fmt;

/// Predicate called with a resolved value and its concrete path.
pub type MatchFn<'a> = Box<dyn FnMut(&Value, &Path) -> bool + 'a>;

/// Callback receiving the path walked up to (and including) the segment that
/// failed to resolve.
pub type NotFoundFn<'a> = Box<dyn FnMut(&Path) + 'a>;

/// Per-call walk configuration.
///
/// ```
/// use docwalk::{walk, Path, WalkArgs};
/// use serde_json::json;
///
/// let doc = json!({"items": [{"name": "a"}, {"name": "b"}]});
/// let mut seen = Vec::new();
/// let names = walk::walk(
///     &doc,
///     &Path::parse_jq("items[].name"),
///     WalkArgs::new()
///         .match_all(true)
///         .on_match(|_, path| {
///             seen.push(path.clone());
///             true
///         }),
/// )
/// .unwrap();
/// assert_eq!(names, json!(["a", "b"]));
/// assert_eq!(seen.len(), 2);
/// ```
#[derive(Default)]
pub struct WalkArgs<'a> {
    pub(crate) match_all: bool,
    pub(crate) match_fn: Option<MatchFn<'a>>,
    pub(crate) not_found_fn: Option<NotFoundFn<'a>>,
}

impl<'a> WalkArgs<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every match of a `-` traversal instead of stopping at the first.
    pub fn match_all(mut self, match_all: bool) -> Self {
        self.match_all = match_all;
        self
    }

    /// Only accept resolved values for which `f` returns true. A rejected
    /// value is reported as not found.
    pub fn on_match(mut self, f: impl FnMut(&Value, &Path) -> bool + 'a) -> Self {
        self.match_fn = Some(Box::new(f));
        self
    }

    pub fn on_not_found(mut self, f: impl FnMut(&Path) + 'a) -> Self {
        self.not_found_fn = Some(Box::new(f));
        self
    }

    pub fn is_match_all(&self) -> bool {
        self.match_all
    }
}

impl fmt::Debug for WalkArgs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkArgs")
            .field("match_all", &self.match_all)
            .field("match_fn", &self.match_fn.is_some())
            .field("not_found_fn", &self.not_found_fn.is_some())
            .finish()
    }
}
