use serde::Deserialize;
use serde_json::Value;

use crate::error::{ForgeError, Result};
use crate::store::display_value;
use crate::transform::TransformChain;

/// Kinds of prompt a [`Prompter`](super::Prompter) knows how to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    Input,
    Multiline,
    Password,
    Confirm,
    Enum,
    Radio,
    Checkboxes,
}

impl PromptKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "input" => Some(PromptKind::Input),
            "multiline" => Some(PromptKind::Multiline),
            "password" => Some(PromptKind::Password),
            "confirm" | "boolean" => Some(PromptKind::Confirm),
            "enum" => Some(PromptKind::Enum),
            "radio" => Some(PromptKind::Radio),
            "checkboxes" => Some(PromptKind::Checkboxes),
            _ => None,
        }
    }

    pub fn needs_options(self) -> bool {
        matches!(
            self,
            PromptKind::Enum | PromptKind::Radio | PromptKind::Checkboxes
        )
    }
}

/// One selectable option: the stored value and the label shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A validated prompt entry from a template config.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSpec {
    pub name: String,
    pub message: String,
    /// The `type` as written, kept for diagnostics.
    pub type_name: String,
    pub kind: PromptKind,
    pub default: Option<Value>,
    pub transform: TransformChain,
    pub transform_default: TransformChain,
    pub options: Vec<Choice>,
}

#[derive(Deserialize)]
struct RawPrompt {
    name: Option<String>,
    message: Option<String>,
    #[serde(rename = "type")]
    type_name: Option<String>,
    default: Option<Value>,
    #[serde(default)]
    transform: TransformChain,
    #[serde(default)]
    transform_default: TransformChain,
    options: Option<Value>,
}

impl PromptSpec {
    /// Parse one entry. An unrecognised `type` becomes [`PromptKind::Input`];
    /// [`PromptSpec::is_fallback`] reports it.
    pub fn parse(value: &Value) -> Result<Self> {
        let raw: RawPrompt =
            serde_json::from_value(value.clone()).map_err(|e| ForgeError::InvalidSpec {
                kind: "prompt",
                reason: e.to_string(),
            })?;

        let name = raw
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| ForgeError::MissingField {
                kind: "prompt",
                subject: raw.message.clone().unwrap_or_default(),
                field: "name",
            })?;

        let type_name = raw
            .type_name
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "input".to_string());
        let kind = PromptKind::from_name(&type_name).unwrap_or(PromptKind::Input);

        let options = match raw.options {
            Some(options) => parse_options(&name, options)?,
            None => Vec::new(),
        };
        if kind.needs_options() && options.is_empty() {
            return Err(ForgeError::MissingField {
                kind: "prompt",
                subject: name,
                field: "options",
            });
        }

        Ok(Self {
            message: raw.message.unwrap_or_else(|| name.clone()),
            name,
            type_name,
            kind,
            default: raw.default.filter(|d| !d.is_null()),
            transform: raw.transform,
            transform_default: raw.transform_default,
            options,
        })
    }

    /// True when the written `type` was not recognised.
    pub fn is_fallback(&self) -> bool {
        PromptKind::from_name(&self.type_name).is_none()
    }
}

fn parse_options(name: &str, options: Value) -> Result<Vec<Choice>> {
    match options {
        Value::Array(items) => Ok(items
            .iter()
            .map(|item| {
                let text = display_value(item);
                Choice::new(text.clone(), text)
            })
            .collect()),
        Value::Object(map) => Ok(map
            .iter()
            .map(|(value, label)| Choice::new(value.clone(), display_value(label)))
            .collect()),
        other => Err(ForgeError::InvalidSpec {
            kind: "prompt",
            reason: format!("options for '{name}' must be a list or a map, got {other}"),
        }),
    }
}
