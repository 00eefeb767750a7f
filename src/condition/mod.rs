use serde_json::Value;

use crate::error::{ForgeError, Result};
use crate::session::{RelativeTo, Session};
use crate::store::display_value;

/// A boolean gate attached to a directive.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The dotted key is present in the data.
    Exists { key: String },
    /// A file (path templated) exists under the chosen base directory.
    FilePresent {
        file: String,
        relative_to: RelativeTo,
    },
    /// The value at `key` equals `value`, comparing scalars by their text.
    Equals { key: String, value: Value },
    Not(Box<Condition>),
}

impl Condition {
    /// Build a condition from `{"condition": <type>, ...}`. Unknown types are
    /// rejected rather than skipped.
    pub fn parse(spec: &Value) -> Result<Self> {
        let name = spec
            .get("condition")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ForgeError::MissingField {
                kind: "condition",
                subject: spec.to_string(),
                field: "condition",
            })?;

        let condition = match name {
            "exists" => Self::exists(spec, name)?,
            "notExists" => Self::exists(spec, name)?.negate(),
            "filePresent" => Self::file_present(spec, name)?,
            "fileNotPresent" => Self::file_present(spec, name)?.negate(),
            "equals" => Self::equals(spec, name)?,
            "notEquals" => Self::equals(spec, name)?.negate(),
            other => {
                return Err(ForgeError::UnknownCondition {
                    name: other.to_string(),
                })
            }
        };
        Ok(condition)
    }

    fn exists(spec: &Value, name: &str) -> Result<Self> {
        Ok(Condition::Exists {
            key: required_str(spec, "condition", name, "key")?,
        })
    }

    fn file_present(spec: &Value, name: &str) -> Result<Self> {
        Ok(Condition::FilePresent {
            file: required_str(spec, "condition", name, "file")?,
            relative_to: relative_to(spec, "condition")?,
        })
    }

    fn equals(spec: &Value, name: &str) -> Result<Self> {
        let value = spec
            .get("value")
            .cloned()
            .ok_or_else(|| ForgeError::MissingField {
                kind: "condition",
                subject: name.to_string(),
                field: "value",
            })?;
        Ok(Condition::Equals {
            key: required_str(spec, "condition", name, "key")?,
            value,
        })
    }

    pub fn negate(self) -> Self {
        Condition::Not(Box::new(self))
    }

    pub fn evaluate(&self, session: &Session<'_>) -> Result<bool> {
        match self {
            Condition::Exists { key } => Ok(session.data.has(key)),
            Condition::FilePresent { file, relative_to } => {
                let path = session.base_dir(*relative_to)?.join(session.render(file)?);
                Ok(session.files().exists(&path))
            }
            Condition::Equals { key, value } => Ok(session
                .data
                .get(key)
                .is_some_and(|actual| loosely_equal(actual, value))),
            Condition::Not(inner) => inner.evaluate(session).map(|passed| !passed),
        }
    }
}

/// One condition or a list of them; a list passes only when all members pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionGroup(Vec<Condition>);

impl ConditionGroup {
    pub fn parse(spec: &Value) -> Result<Self> {
        match spec {
            Value::Array(items) => items
                .iter()
                .map(Condition::parse)
                .collect::<Result<Vec<_>>>()
                .map(Self),
            single => Condition::parse(single).map(|c| Self(vec![c])),
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.0
    }

    pub fn evaluate(&self, session: &Session<'_>) -> Result<bool> {
        for condition in &self.0 {
            if !condition.evaluate(session)? {
                log::debug!("condition {condition:?} did not pass");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn loosely_equal(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    let scalar = |v: &Value| !matches!(v, Value::Array(_) | Value::Object(_));
    scalar(actual) && scalar(expected) && display_value(actual) == display_value(expected)
}

pub(crate) fn required_str(
    spec: &Value,
    kind: &'static str,
    subject: &str,
    field: &'static str,
) -> Result<String> {
    spec.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ForgeError::MissingField {
            kind,
            subject: subject.to_string(),
            field,
        })
}

/// Read the optional `relativeTo` field.
pub(crate) fn relative_to(spec: &Value, kind: &'static str) -> Result<RelativeTo> {
    match spec.get("relativeTo").and_then(Value::as_str) {
        None | Some("") => Ok(RelativeTo::default()),
        Some(name) => RelativeTo::from_name(name).ok_or_else(|| ForgeError::InvalidSpec {
            kind,
            reason: format!(
                "relativeTo must be workingDir, projectRoot or templateDir, got '{name}'"
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::Harness;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({"condition": "exists", "key": "a"}))]
    #[case(json!({"condition": "exists", "key": "missing"}))]
    #[case(json!({"condition": "filePresent", "file": "present.txt"}))]
    #[case(json!({"condition": "filePresent", "file": "{{ a }}.txt"}))]
    #[case(json!({"condition": "filePresent", "file": "absent.txt"}))]
    #[case(json!({"condition": "equals", "key": "a", "value": "present"}))]
    #[case(json!({"condition": "equals", "key": "a", "value": "other"}))]
    fn negation_is_exact_inverse(#[case] spec: Value) {
        let harness = Harness::new();
        let work = tempfile::tempdir().unwrap();
        std::fs::write(work.path().join("present.txt"), "").unwrap();
        let mut session = Session::new(harness.services(), work.path());
        session.data.set("a", "present");

        let name = spec["condition"].as_str().unwrap();
        let negated_name = match name {
            "exists" => "notExists",
            "filePresent" => "fileNotPresent",
            "equals" => "notEquals",
            _ => unreachable!(),
        };
        let mut negated_spec = spec.clone();
        negated_spec["condition"] = json!(negated_name);

        let positive = Condition::parse(&spec).unwrap().evaluate(&session).unwrap();
        let negative = Condition::parse(&negated_spec)
            .unwrap()
            .evaluate(&session)
            .unwrap();
        assert_eq!(negative, !positive);
    }

    #[test]
    fn exists_checks_dotted_keys() {
        let harness = Harness::new();
        let mut session = Session::new(harness.services(), "/work");
        session.data.set("skip_flag", true);
        let exists = Condition::parse(&json!({"condition": "exists", "key": "skip_flag"})).unwrap();
        let nested =
            Condition::parse(&json!({"condition": "exists", "key": "prefixes.short"})).unwrap();
        assert!(exists.evaluate(&session).unwrap());
        assert!(!nested.evaluate(&session).unwrap());
    }

    #[test]
    fn file_present_resolves_against_base_dir() {
        let harness = Harness::new();
        let work = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        std::fs::write(project.path().join("composer.json"), "{}").unwrap();

        let mut session = Session::new(harness.services(), work.path());
        session.project_root = project.path().to_path_buf();

        let in_work = Condition::parse(&json!({"condition": "filePresent", "file": "composer.json"}))
            .unwrap();
        let in_project = Condition::parse(&json!({
            "condition": "filePresent", "file": "composer.json", "relativeTo": "projectRoot"
        }))
        .unwrap();
        assert!(!in_work.evaluate(&session).unwrap());
        assert!(in_project.evaluate(&session).unwrap());
    }

    #[test]
    fn equals_compares_loosely() {
        let harness = Harness::new();
        let mut session = Session::new(harness.services(), "/work");
        session.data.set("enabled", "true");
        session.data.set("count", 3);
        let bool_vs_text =
            Condition::parse(&json!({"condition": "equals", "key": "enabled", "value": true}))
                .unwrap();
        let number_vs_text =
            Condition::parse(&json!({"condition": "equals", "key": "count", "value": "3"}))
                .unwrap();
        let missing =
            Condition::parse(&json!({"condition": "equals", "key": "nope", "value": ""})).unwrap();
        assert!(bool_vs_text.evaluate(&session).unwrap());
        assert!(number_vs_text.evaluate(&session).unwrap());
        assert!(!missing.evaluate(&session).unwrap());
    }

    #[test]
    fn unknown_condition_is_fatal() {
        let err = Condition::parse(&json!({"condition": "sometimes"})).unwrap_err();
        assert!(matches!(err, ForgeError::UnknownCondition { name } if name == "sometimes"));
    }

    #[rstest]
    #[case(json!({"key": "a"}), "condition")]
    #[case(json!({"condition": "exists"}), "key")]
    #[case(json!({"condition": "fileNotPresent"}), "file")]
    #[case(json!({"condition": "equals", "key": "a"}), "value")]
    fn missing_fields_are_named(#[case] spec: Value, #[case] expected: &str) {
        match Condition::parse(&spec).unwrap_err() {
            ForgeError::MissingField { field, .. } => assert_eq!(field, expected),
            other => panic!("expected MissingField, got: {other:?}"),
        }
    }

    #[test]
    fn bad_relative_to_is_invalid() {
        let err = Condition::parse(&json!({
            "condition": "filePresent", "file": "x", "relativeTo": "somewhere"
        }))
        .unwrap_err();
        assert!(matches!(err, ForgeError::InvalidSpec { .. }));
    }

    #[test]
    fn group_requires_every_member() {
        let harness = Harness::new();
        let mut session = Session::new(harness.services(), "/work");
        session.data.set("a", 1);

        let both = ConditionGroup::parse(&json!([
            {"condition": "exists", "key": "a"},
            {"condition": "notExists", "key": "b"}
        ]))
        .unwrap();
        let one_fails = ConditionGroup::parse(&json!([
            {"condition": "exists", "key": "a"},
            {"condition": "exists", "key": "b"}
        ]))
        .unwrap();
        let single = ConditionGroup::parse(&json!({"condition": "exists", "key": "a"})).unwrap();

        assert!(both.evaluate(&session).unwrap());
        assert!(!one_fails.evaluate(&session).unwrap());
        assert!(single.evaluate(&session).unwrap());
        assert_eq!(single.conditions().len(), 1);
    }
}
