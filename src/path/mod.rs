//! Paths into semi-structured documents.
//!
//! A [`Path`] is an ordered list of string segments. Array access takes two
//! segments: the key naming the array followed by either an explicit index
//! (`"0"`, `"12"`) or the traversal marker `"-"` (any element on read, append
//! on write). Segment classes are decided purely by their text, see
//! [`ArrayNotation`].

pub mod notation;
pub mod parser;

pub use notation::{ArrayNotation, TRAVERSAL};

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// An immutable sequence of path segments.
///
/// Constructors that extend a path ([`Path::child`], [`Path::join`],
/// [`Path::concat`]) always allocate, so a shared prefix such as
/// `metadata.annotations` can be reused across calls without aliasing.
///
/// ```
/// use docwalk::Path;
///
/// let path = Path::parse_jq("spec.containers[].name");
/// assert_eq!(path.segments(), &["spec", "containers", "-", "name"]);
/// assert_eq!(path.to_json_pointer(), "/spec/containers/-/name");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// The empty path, addressing the document root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a JQ-like path such as `metadata.'app.kubernetes.io/name'` or
    /// `spec.containers[0].ports[]`.
    pub fn parse_jq(input: &str) -> Self {
        Self {
            segments: parser::parse_jq(input),
        }
    }

    /// Parse an RFC 6901 JSON Pointer such as `/metadata/labels/app~1name`.
    pub fn parse_json_pointer(input: &str) -> Self {
        Self {
            segments: parser::parse_json_pointer(input),
        }
    }

    /// Render as a JSON Pointer, escaping `~` and `/` in every segment.
    pub fn to_json_pointer(&self) -> String {
        parser::to_json_pointer(&self.segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.segments.iter()
    }

    /// New path with `key` appended.
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(key.into());
        Self { segments }
    }

    /// New path with all `keys` appended.
    pub fn join<I, S>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut segments = self.segments.clone();
        segments.extend(keys.into_iter().map(Into::into));
        Self { segments }
    }

    /// New path made of `self` followed by `other`.
    pub fn concat(&self, other: &Path) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + other.segments.len());
        segments.extend_from_slice(&self.segments);
        segments.extend_from_slice(&other.segments);
        Self { segments }
    }

    /// The first `len` segments (or the whole path if it is shorter).
    pub fn prefix(&self, len: usize) -> Self {
        let len = len.min(self.segments.len());
        Self {
            segments: self.segments[..len].to_vec(),
        }
    }

    /// Everything but the last segment. The root is its own parent.
    pub fn parent(&self) -> Self {
        self.prefix(self.segments.len().saturating_sub(1))
    }

    /// New path with the last segment replaced by `segment`.
    pub fn with_last(&self, segment: impl Into<String>) -> Self {
        self.parent().child(segment)
    }

    /// Split off the key the path ends in.
    ///
    /// Trailing array notation is dropped together with the key it belongs
    /// to, so `a.b[]` and `a.b[1]` both split into (`a`, `b`).
    pub fn split_key(&self) -> (Path, String) {
        if self.segments.is_empty() {
            return (Path::root(), String::new());
        }

        let mut key_idx = self.segments.len() - 1;
        while key_idx > 0 && ArrayNotation::of(&self.segments[key_idx]).is_array() {
            key_idx -= 1;
        }

        (self.prefix(key_idx), self.segments[key_idx].clone())
    }

    /// Whether the segment at `index` denotes array access, either because it
    /// is array notation itself or because it names an array followed by
    /// array notation.
    pub fn is_array(&self, index: usize) -> (bool, ArrayNotation) {
        let Some(segment) = self.segments.get(index) else {
            return (false, ArrayNotation::Invalid);
        };

        let notation = ArrayNotation::of(segment);
        if notation.is_array() {
            return (true, notation);
        }

        match self.segments.get(index + 1).map(|next| ArrayNotation::of(next)) {
            Some(next) if next.is_array() => (true, next),
            _ => (false, ArrayNotation::Invalid),
        }
    }

    /// True if the path ends in the traversal marker.
    pub fn ends_in_traversal(&self) -> bool {
        self.last() == Some(TRAVERSAL)
    }
}

impl fmt::Display for Path {
    /// JQ-like rendering that [`Path::parse_jq`] reads back.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.segments.iter().enumerate() {
            match ArrayNotation::of(segment) {
                ArrayNotation::Traversal => f.write_str("[]")?,
                ArrayNotation::Index => write!(f, "[{segment}]")?,
                ArrayNotation::Invalid => {
                    if idx > 0 {
                        f.write_str(".")?;
                    }
                    if needs_quotes(segment) {
                        write!(f, "'{}'", segment.replace('\'', "''"))?;
                    } else {
                        f.write_str(segment)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn needs_quotes(key: &str) -> bool {
    key.is_empty() || key.contains(['.', '[', ']', '\''])
}

impl FromStr for Path {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Path::parse_jq(s))
    }
}

impl<S: Into<String>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Path::from_segments(iter)
    }
}

impl From<Vec<String>> for Path {
    fn from(segments: Vec<String>) -> Self {
        Self { segments }
    }
}

impl From<&[&str]> for Path {
    fn from(segments: &[&str]) -> Self {
        Path::from_segments(segments.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for Path {
    fn from(segments: [&str; N]) -> Self {
        Path::from_segments(segments)
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
