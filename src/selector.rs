//! Kubernetes-style label selectors read from a document section.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("failed to parse {field} as string: {value}")]
    NotAString { field: String, value: Value },

    #[error("failed to parse {field} as object: {value}")]
    NotAnObject { field: String, value: Value },

    #[error("failed to parse {field} as list: {value}")]
    NotAList { field: String, value: Value },

    #[error("unknown operator in {field}: {operator}")]
    UnknownOperator { field: String, operator: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "In" => Ok(Operator::In),
            "NotIn" => Ok(Operator::NotIn),
            "Exists" => Ok(Operator::Exists),
            "DoesNotExist" => Ok(Operator::DoesNotExist),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operator::In => "In",
            Operator::NotIn => "NotIn",
            Operator::Exists => "Exists",
            Operator::DoesNotExist => "DoesNotExist",
        };
        f.write_str(name)
    }
}

/// One entry of `matchExpressions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub key: String,
    pub operator: Operator,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl Requirement {
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        let value = labels.get(&self.key);
        match self.operator {
            Operator::In => value.is_some_and(|v| self.values.contains(v)),
            Operator::NotIn => value.map_or(true, |v| !self.values.contains(v)),
            Operator::Exists => value.is_some(),
            Operator::DoesNotExist => value.is_none(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_expressions: Vec<Requirement>,
}

impl LabelSelector {
    /// Read a selector section.
    ///
    /// A section with `matchLabels` and/or `matchExpressions` is parsed as a
    /// full selector. Any other section is a service-style selector and is
    /// taken as `matchLabels` as a whole.
    ///
    /// ```
    /// use docwalk::selector::LabelSelector;
    /// use serde_json::json;
    ///
    /// let section = json!({"app": "web"});
    /// let selector = LabelSelector::parse(section.as_object().unwrap()).unwrap();
    /// assert_eq!(selector.match_labels["app"], "web");
    /// ```
    pub fn parse(section: &Map<String, Value>) -> Result<Self, SelectorError> {
        let match_labels = section.get("matchLabels");
        let match_expressions = section.get("matchExpressions");

        if match_labels.is_none() && match_expressions.is_none() {
            return Ok(Self {
                match_labels: string_map("selector", section)?,
                match_expressions: Vec::new(),
            });
        }

        let mut selector = Self::default();
        if let Some(labels) = match_labels {
            let labels = labels.as_object().ok_or_else(|| SelectorError::NotAnObject {
                field: "matchLabels".to_string(),
                value: labels.clone(),
            })?;
            selector.match_labels = string_map("matchLabels", labels)?;
        }

        if let Some(expressions) = match_expressions {
            let expressions = expressions.as_array().ok_or_else(|| SelectorError::NotAList {
                field: "matchExpressions".to_string(),
                value: expressions.clone(),
            })?;
            selector.match_expressions = expressions
                .iter()
                .enumerate()
                .map(|(idx, entry)| parse_requirement(&format!("matchExpressions[{idx}]"), entry))
                .collect::<Result<_, _>>()?;
        }

        Ok(selector)
    }

    pub fn is_empty(&self) -> bool {
        self.match_labels.is_empty() && self.match_expressions.is_empty()
    }

    /// True if `labels` satisfy every label and expression. The empty
    /// selector matches everything.
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.match_labels
            .iter()
            .all(|(key, value)| labels.get(key) == Some(value))
            && self
                .match_expressions
                .iter()
                .all(|requirement| requirement.matches(labels))
    }
}

fn string_map(
    field: &str,
    section: &Map<String, Value>,
) -> Result<BTreeMap<String, String>, SelectorError> {
    section
        .iter()
        .map(|(key, value)| {
            let text = string_at(&format!("{field}[{key}]"), value)?;
            Ok((key.clone(), text))
        })
        .collect()
}

fn parse_requirement(field: &str, entry: &Value) -> Result<Requirement, SelectorError> {
    let entry = entry.as_object().ok_or_else(|| SelectorError::NotAnObject {
        field: field.to_string(),
        value: entry.clone(),
    })?;

    let key = string_at(
        &format!("{field}.key"),
        entry.get("key").unwrap_or(&Value::Null),
    )?;

    let operator = string_at(
        &format!("{field}.operator"),
        entry.get("operator").unwrap_or(&Value::Null),
    )?;
    let operator = operator
        .parse::<Operator>()
        .map_err(|operator| SelectorError::UnknownOperator {
            field: format!("{field}.operator"),
            operator,
        })?;

    let values: Vec<String> = match entry.get("values") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(idx, item)| string_at(&format!("{field}.values[{idx}]"), item))
            .collect::<Result<_, _>>()?,
        Some(other) => {
            return Err(SelectorError::NotAList {
                field: format!("{field}.values"),
                value: other.clone(),
            })
        }
    };

    Ok(Requirement {
        key,
        operator,
        values,
    })
}

fn string_at(field: &str, value: &Value) -> Result<String, SelectorError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SelectorError::NotAString {
            field: field.to_string(),
            value: value.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(section: Value) -> Result<LabelSelector, SelectorError> {
        LabelSelector::parse(section.as_object().unwrap())
    }

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn service_selector_is_match_labels() {
        let selector = parse(json!({
            "app.kubernetes.io/instance": "test",
            "app.kubernetes.io/name": "test"
        }))
        .unwrap();

        assert_eq!(selector.match_labels.len(), 2);
        assert!(selector.match_expressions.is_empty());
        assert_eq!(selector.match_labels["app.kubernetes.io/name"], "test");
    }

    #[test]
    fn expressions_are_parsed() {
        let selector = parse(json!({
            "matchExpressions": [{
                "key": "kubernetes.io/metadata.name",
                "operator": "NotIn",
                "values": ["kube-system", "kube-public"]
            }, {
                "key": "tier",
                "operator": "Exists"
            }]
        }))
        .unwrap();

        assert!(selector.match_labels.is_empty());
        assert_eq!(selector.match_expressions.len(), 2);
        assert_eq!(selector.match_expressions[0].operator, Operator::NotIn);
        assert_eq!(selector.match_expressions[0].values.len(), 2);
        assert!(selector.match_expressions[1].values.is_empty());
    }

    #[test]
    fn errors_name_the_offending_entry() {
        let err = parse(json!({"matchLabels": {"app": 1}})).unwrap_err();
        assert_eq!(
            err,
            SelectorError::NotAString {
                field: "matchLabels[app]".to_string(),
                value: json!(1)
            }
        );

        let err = parse(json!({
            "matchExpressions": [{"key": "a", "operator": "Near", "values": []}]
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            SelectorError::UnknownOperator { field, operator }
                if field == "matchExpressions[0].operator" && operator == "Near"
        ));

        let err = parse(json!({"matchExpressions": {}})).unwrap_err();
        assert!(matches!(err, SelectorError::NotAList { .. }));
    }

    #[test]
    fn matching_follows_operator_semantics() {
        let selector = parse(json!({
            "matchLabels": {"app": "web"},
            "matchExpressions": [
                {"key": "env", "operator": "In", "values": ["prod", "staging"]},
                {"key": "legacy", "operator": "DoesNotExist"}
            ]
        }))
        .unwrap();

        assert!(selector.matches(&labels(&[("app", "web"), ("env", "prod")])));
        assert!(!selector.matches(&labels(&[("app", "web"), ("env", "dev")])));
        assert!(!selector.matches(&labels(&[
            ("app", "web"),
            ("env", "prod"),
            ("legacy", "1")
        ])));
        assert!(LabelSelector::default().matches(&labels(&[])));
    }

    #[test]
    fn serializes_in_kubernetes_shape() {
        let selector = parse(json!({"matchLabels": {"app": "web"}})).unwrap();
        assert_eq!(
            serde_json::to_value(&selector).unwrap(),
            json!({"matchLabels": {"app": "web"}})
        );
    }
}
