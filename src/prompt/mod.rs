pub mod engine;
pub mod interactive;
pub mod spec;

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use serde_json::Value;

use crate::error::{ForgeError, Result};
use crate::store::display_value;

pub use engine::PromptPipeline;
pub use interactive::InquirePrompter;
pub use spec::{Choice, PromptKind, PromptSpec};

/// One question handed to a [`Prompter`], with its default already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest<'a> {
    pub name: &'a str,
    pub kind: PromptKind,
    pub message: &'a str,
    pub default: Option<Value>,
    pub choices: &'a [Choice],
}

impl<'a> PromptRequest<'a> {
    pub fn new(name: &'a str, kind: PromptKind, message: &'a str) -> Self {
        Self {
            name,
            kind,
            message,
            default: None,
            choices: &[],
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_choices(mut self, choices: &'a [Choice]) -> Self {
        self.choices = choices;
        self
    }

    pub fn default_text(&self) -> Option<String> {
        self.default.as_ref().map(display_value)
    }
}

/// Asks the operator for a value. Implementations block until answered.
pub trait Prompter {
    fn ask(&self, request: &PromptRequest<'_>) -> Result<Value>;

    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        let request = PromptRequest::new(message, PromptKind::Confirm, message).with_default(default);
        self.ask(&request).map(|value| is_truthy(&value))
    }

    fn input(&self, message: &str, default: Option<&str>) -> Result<String> {
        let mut request = PromptRequest::new(message, PromptKind::Input, message);
        if let Some(default) = default {
            request = request.with_default(default);
        }
        self.ask(&request).map(|value| display_value(&value))
    }
}

/// Loose truthiness for answers that may arrive as text.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "y" | "1" | "on"
        ),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// The answer a non-interactive run gives for `request`.
fn default_answer(request: &PromptRequest<'_>) -> Result<Value> {
    match (request.kind, &request.default) {
        (PromptKind::Confirm, Some(default)) => Ok(Value::Bool(is_truthy(default))),
        (PromptKind::Confirm, None) => Ok(Value::Bool(false)),
        (PromptKind::Checkboxes, None) => Ok(Value::Array(Vec::new())),
        (_, Some(default)) => Ok(default.clone()),
        (_, None) => Err(ForgeError::NoDefault {
            name: request.name.to_string(),
        }),
    }
}

/// Answers every prompt with its resolved default (`--defaults`).
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultsPrompter;

impl Prompter for DefaultsPrompter {
    fn ask(&self, request: &PromptRequest<'_>) -> Result<Value> {
        default_answer(request)
    }
}

/// A prompt as seen by [`ScriptedPrompter`].
#[derive(Debug, Clone, PartialEq)]
pub struct AskedPrompt {
    pub name: String,
    pub kind: PromptKind,
    pub message: String,
    pub default: Option<Value>,
}

/// Canned answers keyed by prompt name, falling back to the default.
/// Records every request it receives.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: RefCell<HashMap<String, VecDeque<Value>>>,
    asked: RefCell<Vec<AskedPrompt>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `value` for the next prompt named `name`.
    pub fn answer(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.answers
            .borrow_mut()
            .entry(name.into())
            .or_default()
            .push_back(value.into());
    }

    pub fn asked(&self) -> Vec<AskedPrompt> {
        self.asked.borrow().clone()
    }

    pub fn asked_names(&self) -> Vec<String> {
        self.asked.borrow().iter().map(|a| a.name.clone()).collect()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, request: &PromptRequest<'_>) -> Result<Value> {
        self.asked.borrow_mut().push(AskedPrompt {
            name: request.name.to_string(),
            kind: request.kind,
            message: request.message.to_string(),
            default: request.default.clone(),
        });

        let scripted = self
            .answers
            .borrow_mut()
            .get_mut(request.name)
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(value) => Ok(value),
            None => default_answer(request),
        }
    }
}
