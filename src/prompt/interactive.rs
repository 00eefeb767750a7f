use inquire::validator::{ErrorMessage, Validation, ValueRequiredValidator};
use inquire::InquireError;
use serde_json::Value;

use crate::error::{ForgeError, Result};
use crate::prompt::{is_truthy, PromptKind, PromptRequest, Prompter};
use crate::store::display_value;

/// Terminal prompts backed by `inquire`.
#[derive(Debug, Default, Clone, Copy)]
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn ask(&self, request: &PromptRequest<'_>) -> Result<Value> {
        match request.kind {
            PromptKind::Input => text(request).map(Value::String),
            PromptKind::Multiline => multiline(request).map(Value::String),
            PromptKind::Password => password(request).map(Value::String),
            PromptKind::Confirm => {
                let default = request.default.as_ref().is_some_and(is_truthy);
                inquire::Confirm::new(request.message)
                    .with_default(default)
                    .prompt()
                    .map(Value::Bool)
                    .map_err(prompt_error)
            }
            PromptKind::Enum => restricted_text(request).map(Value::String),
            PromptKind::Radio => select(request),
            PromptKind::Checkboxes => multi_select(request),
        }
    }
}

fn prompt_error(err: InquireError) -> ForgeError {
    match err {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => {
            ForgeError::UserAbort
        }
        source => ForgeError::Prompt { source },
    }
}

fn text(request: &PromptRequest<'_>) -> Result<String> {
    let default = request.default_text().filter(|d| !d.is_empty());
    let mut prompt = inquire::Text::new(request.message);
    match &default {
        Some(default) => prompt = prompt.with_default(default),
        None => prompt = prompt.with_validator(ValueRequiredValidator::default()),
    }
    prompt.prompt().map_err(prompt_error)
}

fn multiline(request: &PromptRequest<'_>) -> Result<String> {
    let default = request.default_text().unwrap_or_default();
    let mut prompt = inquire::Editor::new(request.message);
    if default.is_empty() {
        prompt = prompt.with_validator(ValueRequiredValidator::default());
    } else {
        prompt = prompt.with_predefined_text(&default);
    }
    prompt.prompt().map_err(prompt_error)
}

fn password(request: &PromptRequest<'_>) -> Result<String> {
    let default = request.default_text().filter(|d| !d.is_empty());
    let mut prompt = inquire::Password::new(request.message)
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked);
    if default.is_none() {
        prompt = prompt.with_validator(ValueRequiredValidator::default());
    }
    let answer = prompt.prompt().map_err(prompt_error)?;
    Ok(match default {
        Some(default) if answer.is_empty() => default,
        _ => answer,
    })
}

fn restricted_text(request: &PromptRequest<'_>) -> Result<String> {
    let allowed: Vec<String> = request.choices.iter().map(|c| c.value.clone()).collect();
    let hint = allowed.join(", ");
    let default = request.default_text().filter(|d| !d.is_empty());

    let mut prompt = inquire::Text::new(request.message)
        .with_help_message(&hint)
        .with_validator(move |input: &str| {
            if allowed.iter().any(|value| value == input) {
                Ok(Validation::Valid)
            } else {
                Ok(Validation::Invalid(ErrorMessage::Custom(format!(
                    "Must be one of: {}",
                    allowed.join(", ")
                ))))
            }
        });
    if let Some(default) = &default {
        prompt = prompt.with_default(default);
    }
    prompt.prompt().map_err(prompt_error)
}

fn select(request: &PromptRequest<'_>) -> Result<Value> {
    let labels: Vec<String> = request.choices.iter().map(|c| c.label.clone()).collect();
    let mut prompt = inquire::Select::new(request.message, labels);
    if let Some(default) = request.default_text() {
        if let Some(idx) = request.choices.iter().position(|c| c.value == default) {
            prompt = prompt.with_starting_cursor(idx);
        }
    }
    let picked = prompt.raw_prompt().map_err(prompt_error)?;
    Ok(Value::String(request.choices[picked.index].value.clone()))
}

fn multi_select(request: &PromptRequest<'_>) -> Result<Value> {
    let labels: Vec<String> = request.choices.iter().map(|c| c.label.clone()).collect();
    let defaults: Vec<usize> = match &request.default {
        Some(Value::Array(values)) => values
            .iter()
            .map(display_value)
            .filter_map(|v| request.choices.iter().position(|c| c.value == v))
            .collect(),
        Some(single) => {
            let single = display_value(single);
            request
                .choices
                .iter()
                .position(|c| c.value == single)
                .into_iter()
                .collect()
        }
        None => Vec::new(),
    };

    let mut prompt = inquire::MultiSelect::new(request.message, labels);
    if !defaults.is_empty() {
        prompt = prompt.with_default(&defaults);
    }
    let picked = prompt.raw_prompt().map_err(prompt_error)?;
    Ok(Value::Array(
        picked
            .into_iter()
            .map(|option| Value::String(request.choices[option.index].value.clone()))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_a_user_abort() {
        assert!(matches!(
            prompt_error(InquireError::OperationCanceled),
            ForgeError::UserAbort
        ));
        assert!(matches!(
            prompt_error(InquireError::OperationInterrupted),
            ForgeError::UserAbort
        ));
        assert!(matches!(
            prompt_error(InquireError::NotTTY),
            ForgeError::Prompt { .. }
        ));
    }
}
