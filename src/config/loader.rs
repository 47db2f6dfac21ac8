//! Reading [`FieldCleaner`] descriptors from TOML.

use crate::config::schema::{FieldCleaner, ValidationError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read cleaner config {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse cleaner config{}: {source}", origin(.path))]
    Parse {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },

    #[error("invalid cleaner config{}: {source}", origin(.path))]
    Invalid {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

fn origin(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|path| format!(" {}", path.display()))
        .unwrap_or_default()
}

/// Parse and validate a cleaner descriptor from TOML text.
pub fn load_from_str(input: &str) -> Result<FieldCleaner, ConfigError> {
    parse(input, None)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<FieldCleaner, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents, Some(path))
}

fn parse(input: &str, path: Option<&Path>) -> Result<FieldCleaner, ConfigError> {
    let cleaner: FieldCleaner =
        toml_edit::de::from_str(input).map_err(|source| ConfigError::Parse {
            path: path.map(Path::to_path_buf),
            source,
        })?;
    cleaner.validate().map_err(|source| ConfigError::Invalid {
        path: path.map(Path::to_path_buf),
        source,
    })?;
    Ok(cleaner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_nested_tables() {
        let cleaner = load_from_str(
            r#"
fields = ["status"]

[nested.metadata]
fields = ["uid", "resourceVersion"]

[nested.metadata.nested.annotations]
fields = ["kubectl.kubernetes.io/last-applied-configuration"]

[nested.spec]
"#,
        )
        .unwrap();

        assert_eq!(cleaner.fields, vec!["status"]);
        let metadata = &cleaner.nested["metadata"];
        assert_eq!(metadata.fields, vec!["uid", "resourceVersion"]);
        assert_eq!(
            metadata.nested["annotations"].fields,
            vec!["kubectl.kubernetes.io/last-applied-configuration"]
        );
        assert!(cleaner.nested["spec"].is_empty());
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let err = load_from_str("feilds = [\"uid\"]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { path: None, .. }));
        assert!(err.to_string().starts_with("failed to parse cleaner config: "));
    }

    #[test]
    fn validation_errors_carry_the_file_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "fields = [\"\"]").unwrap();

        let err = load_from_path(file.path()).unwrap_err();
        match &err {
            ConfigError::Invalid { path, .. } => assert_eq!(path.as_deref(), Some(file.path())),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("empty field name"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_from_path("/nonexistent/cleaner.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
