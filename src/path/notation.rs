/// Segment that means "any element" on read and "append" on write.
pub const TRAVERSAL: &str = "-";

/// How a path segment addresses an array, decided purely by its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayNotation {
    /// Not array notation: the segment is an ordinary object key.
    Invalid,
    /// A non-negative decimal integer, e.g. `"0"` or `"12"`.
    Index,
    /// Exactly `"-"`.
    Traversal,
}

impl ArrayNotation {
    /// Classify a single segment.
    pub fn of(segment: &str) -> Self {
        if segment == TRAVERSAL {
            ArrayNotation::Traversal
        } else if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            ArrayNotation::Index
        } else {
            ArrayNotation::Invalid
        }
    }

    pub fn is_array(self) -> bool {
        !matches!(self, ArrayNotation::Invalid)
    }
}
