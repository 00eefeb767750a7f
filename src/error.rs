#![allow(unused_assignments)]

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ForgeError {
    #[error("Failed to parse config file {path}")]
    #[diagnostic(help("Check the JSON syntax of the config file"))]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write config file {path}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} '{subject}' is missing required field '{field}'")]
    #[diagnostic(help("Add the '{field}' field to the {kind} in the template config"))]
    MissingField {
        kind: &'static str,
        subject: String,
        field: &'static str,
    },

    #[error("Directive type '{name}' not found")]
    #[diagnostic(help("Supported directives: copy, run, execute"))]
    UnknownDirective { name: String },

    #[error("Condition type '{name}' not found")]
    #[diagnostic(help(
        "Supported conditions: exists, notExists, filePresent, fileNotPresent, equals, notEquals"
    ))]
    UnknownCondition { name: String },

    #[error("Transform '{name}' is not registered")]
    UnknownTransform { name: String },

    #[error("Invalid {kind}: {reason}")]
    InvalidSpec { kind: &'static str, reason: String },

    #[error("Unable to locate file: {path}")]
    FileMissing { path: PathBuf },

    #[error("Command failed: {command} ({status})")]
    ExternalCommand { command: String, status: String },

    #[error("Aborted")]
    UserAbort,

    #[error("No default value available for prompt '{name}'")]
    #[diagnostic(help("Answer the prompt interactively or pass it with --data {name}=VALUE"))]
    NoDefault { name: String },

    #[error("Prompt failed")]
    Prompt {
        #[source]
        source: inquire::InquireError,
    },

    #[error("Script '{file}' failed: {message}")]
    #[diagnostic(help("Check the Rhai script for errors"))]
    Script { file: String, message: String },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Glob pattern error: {pattern}")]
    GlobPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Template not found: {name}")]
    #[diagnostic(help("Run `forge template list` to see the installed templates"))]
    TemplateNotFound { name: String },

    #[error("Template config is missing: {path}")]
    TemplateConfigMissing { path: PathBuf },

    #[error("No template is active for this directive")]
    NoActiveTemplate,

    #[error("Could not determine the home directory")]
    #[diagnostic(help("Set FORGE_HOME to choose where forge keeps its data"))]
    HomeDirMissing,

    #[error("Git is not installed")]
    #[diagnostic(help("Install git and make sure it is on your PATH"))]
    GitNotFound,

    #[error("git {operation} failed: {reason}")]
    Git { operation: String, reason: String },

    #[error("Repository '{name}' has already been cloned")]
    #[diagnostic(help("Run `forge repo update --as {name}` to update, or pass --force"))]
    RepoExists { name: String },

    #[error("No repository found under the name '{name}'")]
    #[diagnostic(help("Run `forge repo clone` to clone a new repository"))]
    RepoNotFound { name: String },

    #[error("Invalid sub-command '{command}': {reason}")]
    InvalidSubcommand { command: String, reason: String },
}

impl ForgeError {
    /// Process exit status for this error. A declined confirmation is a clean
    /// termination and gets its own status.
    pub fn exit_code(&self) -> i32 {
        match self {
            ForgeError::UserAbort => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, ForgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_abort_has_distinct_exit_code() {
        assert_eq!(ForgeError::UserAbort.exit_code(), 2);
        assert_eq!(
            ForgeError::FileMissing {
                path: PathBuf::from("x")
            }
            .exit_code(),
            1
        );
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = ForgeError::MissingField {
            kind: "directive",
            subject: "run".into(),
            field: "command",
        };
        assert_eq!(
            err.to_string(),
            "directive 'run' is missing required field 'command'"
        );
    }
}
