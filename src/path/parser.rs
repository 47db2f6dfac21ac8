//! Text forms of a [`Path`](super::Path): JQ-like dotted paths and RFC 6901
//! JSON Pointers.

use super::notation::TRAVERSAL;

/// Split a JQ-like path into segments.
///
/// Keys are separated by unquoted `.`. A key may be wrapped in single quotes
/// to keep `.`, `[` and `]` literal; inside quotes `''` stands for one `'`.
/// Unquoted `name[]` yields `name`, `-` and unquoted `name[N]` yields `name`,
/// `N`.
pub(crate) fn parse_jq(input: &str) -> Vec<String> {
    let mut splitter = Splitter {
        input,
        start: 0,
        escaped: false,
        parts: Vec::new(),
    };
    if input.is_empty() {
        return splitter.parts;
    }

    let mut quoted = false;
    let mut chars = input.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\'' if quoted && chars.peek().is_some_and(|&(_, next)| next == '\'') => {
                chars.next();
                splitter.escaped = true;
            }
            '\'' => {
                if quoted {
                    quoted = false;
                    splitter.cut(idx, Some(ch));
                } else {
                    quoted = true;
                    splitter.start = idx + 1;
                }
            }
            '.' | '[' | ']' if !quoted => splitter.cut(idx, Some(ch)),
            _ => {}
        }
    }

    splitter.cut(input.len(), None);
    splitter.parts
}

struct Splitter<'a> {
    input: &'a str,
    start: usize,
    /// The open element holds a doubled quote.
    escaped: bool,
    parts: Vec<String>,
}

impl Splitter<'_> {
    /// Close the element ending at `idx`. An empty element closed by `]` is
    /// the `[]` postfix and becomes the traversal marker.
    fn cut(&mut self, idx: usize, terminator: Option<char>) {
        let element = self.input.get(self.start..idx).unwrap_or("");
        if std::mem::take(&mut self.escaped) {
            self.parts.push(element.replace("''", "'"));
        } else if !element.is_empty() {
            self.parts.push(element.to_string());
        } else if terminator == Some(']') {
            self.parts.push(TRAVERSAL.to_string());
        }
        self.start = idx + 1;
    }
}

/// Split a JSON Pointer into unescaped segments. `""` and `"/"` both address
/// the root.
pub(crate) fn parse_json_pointer(input: &str) -> Vec<String> {
    if input.is_empty() || input == "/" {
        return Vec::new();
    }

    let mut tokens = input.split('/').peekable();
    if tokens.peek().is_some_and(|first| first.is_empty()) {
        tokens.next();
    }

    tokens.map(unescape_token).collect()
}

/// Render segments as a JSON Pointer; the empty path renders as `/`.
pub(crate) fn to_json_pointer(segments: &[String]) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }

    let capacity = segments.iter().map(|s| s.len() + 1).sum();
    let mut out = String::with_capacity(capacity);
    for segment in segments {
        out.push('/');
        out.push_str(&escape_token(segment));
    }
    out
}

fn unescape_token(token: &str) -> String {
    if token.contains('~') {
        token.replace("~1", "/").replace("~0", "~")
    } else {
        token.to_string()
    }
}

fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jq(input: &str) -> Vec<String> {
        parse_jq(input)
    }

    #[test]
    fn parse_jq_table() {
        let cases: &[(&str, &[&str])] = &[
            ("", &[]),
            ("a", &["a"]),
            ("'a'", &["a"]),
            ("a[]", &["a", "-"]),
            ("'a[]'", &["a[]"]),
            ("a[1]", &["a", "1"]),
            ("'a[1]'", &["a[1]"]),
            ("a.b", &["a", "b"]),
            ("a.'b'", &["a", "b"]),
            ("a.b[]", &["a", "b", "-"]),
            ("a.'b[]'", &["a", "b[]"]),
            ("a.b[1]", &["a", "b", "1"]),
            ("a.'b[1]'", &["a", "b[1]"]),
            ("a.b.c", &["a", "b", "c"]),
            ("a.'b'.c", &["a", "b", "c"]),
            ("a.b[].c", &["a", "b", "-", "c"]),
            ("a.'b[]'.c", &["a", "b[]", "c"]),
            ("a.b[1].c", &["a", "b", "1", "c"]),
            ("a.'b[1]'.c", &["a", "b[1]", "c"]),
            ("a.'b.c'", &["a", "b.c"]),
            ("a.'b.c'[]", &["a", "b.c", "-"]),
            ("a.'b.c'[1]", &["a", "b.c", "1"]),
            ("a.'b.c[]'", &["a", "b.c[]"]),
            ("a.'b.c[1]'", &["a", "b.c[1]"]),
            ("a[][]", &["a", "-", "-"]),
            ("[0]", &["0"]),
            ("'it''s'", &["it's"]),
            ("a.'it''s'.b", &["a", "it's", "b"]),
            ("''''", &["'"]),
        ];

        for (input, expected) in cases {
            assert_eq!(jq(input), *expected, "input: {input}");
        }
    }

    #[test]
    fn parse_json_pointer_table() {
        let cases: &[(&str, &[&str])] = &[
            ("", &[]),
            ("/", &[]),
            ("/a", &["a"]),
            ("/a/-", &["a", "-"]),
            ("/a/1", &["a", "1"]),
            ("/a/b/-/c", &["a", "b", "-", "c"]),
            ("/a/b~1c", &["a", "b/c"]),
            ("/a/b~0c", &["a", "b~c"]),
            ("/a/b~0c~1d/e", &["a", "b~c/d", "e"]),
            ("a/b", &["a", "b"]),
        ];

        for (input, expected) in cases {
            assert_eq!(parse_json_pointer(input), *expected, "input: {input}");
        }
    }

    #[test]
    fn escape_is_applied_per_segment() {
        let segments = vec!["a/b".to_string(), "c~d".to_string()];
        assert_eq!(to_json_pointer(&segments), "/a~1b/c~0d");
        assert_eq!(to_json_pointer(&[]), "/");
    }
}
