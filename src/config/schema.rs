use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Describes which keys to strip from a document.
///
/// `fields` are removed from the object the cleaner is applied to. Each
/// `nested` entry applies another cleaner to the value under that key; an
/// entry with no fields and no nested cleaners removes the key entirely.
///
/// In TOML:
///
/// ```toml
/// [nested.metadata]
/// fields = ["uid", "resourceVersion"]
///
/// [nested.metadata.nested.annotations]
/// fields = ["kubectl.kubernetes.io/last-applied-configuration"]
///
/// [nested.status]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldCleaner {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub nested: BTreeMap<String, FieldCleaner>,
}

impl FieldCleaner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add keys to remove at this level.
    pub fn remove<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Clean the value under `key` with `cleaner`.
    pub fn nest(mut self, key: impl Into<String>, cleaner: FieldCleaner) -> Self {
        self.nested.insert(key.into(), cleaner);
        self
    }

    /// True if this cleaner neither removes nor recurses, which as a nested
    /// entry means "remove the whole key".
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.nested.is_empty()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        self.collect_issues(&mut Vec::new(), &mut issues);

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    fn collect_issues(&self, scope: &mut Vec<String>, issues: &mut Vec<ValidationIssue>) {
        let mut seen = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if field.trim().is_empty() {
                issues.push(ValidationIssue::EmptyFieldName {
                    scope: scope_name(scope),
                });
            } else if seen.contains(&field) {
                issues.push(ValidationIssue::DuplicateField {
                    scope: scope_name(scope),
                    key: field.clone(),
                });
            } else {
                seen.push(field);
            }
        }

        for (key, cleaner) in &self.nested {
            if key.trim().is_empty() {
                issues.push(ValidationIssue::EmptyFieldName {
                    scope: scope_name(scope),
                });
            }
            if self.fields.contains(key) {
                issues.push(ValidationIssue::RemovedAndNested {
                    scope: scope_name(scope),
                    key: key.clone(),
                });
            }
            scope.push(key.clone());
            cleaner.collect_issues(scope, issues);
            scope.pop();
        }
    }
}

fn scope_name(scope: &[String]) -> String {
    if scope.is_empty() {
        "<root>".to_string()
    } else {
        scope.join(".")
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyFieldName { scope: String },
    DuplicateField { scope: String, key: String },
    RemovedAndNested { scope: String, key: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyFieldName { scope } => {
                write!(f, "cleaner '{scope}' contains an empty field name")
            }
            ValidationIssue::DuplicateField { scope, key } => {
                write!(f, "cleaner '{scope}' lists field '{key}' more than once")
            }
            ValidationIssue::RemovedAndNested { scope, key } => write!(
                f,
                "cleaner '{scope}' both removes and descends into '{key}'"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_every_issue_with_scope() {
        let cleaner = FieldCleaner::new().remove(["status"]).nest(
            "metadata",
            FieldCleaner::new()
                .remove(["uid", "", "uid"])
                .nest("uid", FieldCleaner::new().remove(["x"])),
        );
        let err = cleaner.validate().unwrap_err();
        assert_eq!(
            err.issues,
            vec![
                ValidationIssue::EmptyFieldName {
                    scope: "metadata".to_string()
                },
                ValidationIssue::DuplicateField {
                    scope: "metadata".to_string(),
                    key: "uid".to_string()
                },
                ValidationIssue::RemovedAndNested {
                    scope: "metadata".to_string(),
                    key: "uid".to_string()
                },
            ]
        );
        assert_eq!(
            err.to_string().lines().next(),
            Some("cleaner 'metadata' contains an empty field name")
        );
    }

    #[test]
    fn empty_cleaner_is_valid() {
        assert!(FieldCleaner::new().validate().is_ok());
        assert!(FieldCleaner::new().is_empty());
    }
}
