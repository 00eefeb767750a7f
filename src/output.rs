use std::cell::RefCell;

use console::style;
use serde::{Deserialize, Serialize};

/// Severity of an operator-facing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Out,
    Info,
    Success,
    Warning,
    Error,
    Notice,
}

impl MessageKind {
    /// Unknown names are plain output.
    pub fn from_name(name: &str) -> Self {
        match name {
            "info" => MessageKind::Info,
            "success" => MessageKind::Success,
            "warning" | "warn" => MessageKind::Warning,
            "error" => MessageKind::Error,
            "notice" => MessageKind::Notice,
            _ => MessageKind::Out,
        }
    }
}

/// A line queued for display at the end of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

impl Message {
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Where operator-facing text goes.
pub trait Output {
    fn emit(&self, kind: MessageKind, text: &str);

    fn out(&self, text: &str) {
        self.emit(MessageKind::Out, text);
    }

    fn info(&self, text: &str) {
        self.emit(MessageKind::Info, text);
    }

    fn success(&self, text: &str) {
        self.emit(MessageKind::Success, text);
    }

    fn warning(&self, text: &str) {
        self.emit(MessageKind::Warning, text);
    }

    fn error(&self, text: &str) {
        self.emit(MessageKind::Error, text);
    }

    fn notice(&self, text: &str) {
        self.emit(MessageKind::Notice, text);
    }

    fn flush(&self, messages: &[Message]) {
        for message in messages {
            self.emit(message.kind, &message.text);
        }
    }
}

/// Styled terminal output. Warnings and errors go to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleOutput;

impl Output for ConsoleOutput {
    fn emit(&self, kind: MessageKind, text: &str) {
        match kind {
            MessageKind::Out => println!("{text}"),
            MessageKind::Info => println!("{}", style(text).cyan()),
            MessageKind::Success => println!("{} {}", style("✓").green().bold(), text),
            MessageKind::Notice => println!("{}", style(text).dim()),
            MessageKind::Warning => eprintln!(
                "{} {}",
                style("warning:").yellow().bold(),
                style(text).yellow()
            ),
            MessageKind::Error => eprintln!("{} {}", style("error:").red().bold(), text),
        }
    }
}

/// Captures everything emitted, for tests and embedders.
#[derive(Debug, Default)]
pub struct RecordingOutput {
    lines: RefCell<Vec<Message>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lines.borrow().clone()
    }

    pub fn texts(&self, kind: MessageKind) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter(|m| m.kind == kind)
            .map(|m| m.text.clone())
            .collect()
    }
}

impl Output for RecordingOutput {
    fn emit(&self, kind: MessageKind, text: &str) {
        self.lines.borrow_mut().push(Message::new(kind, text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("info", MessageKind::Info)]
    #[case("success", MessageKind::Success)]
    #[case("warning", MessageKind::Warning)]
    #[case("error", MessageKind::Error)]
    #[case("notice", MessageKind::Notice)]
    #[case("out", MessageKind::Out)]
    #[case("shout", MessageKind::Out)]
    fn message_kind_from_name(#[case] name: &str, #[case] expected: MessageKind) {
        assert_eq!(MessageKind::from_name(name), expected);
    }

    #[test]
    fn recording_output_keeps_order_and_kind() {
        let output = RecordingOutput::new();
        output.success("Created a");
        output.warning("careful");
        output.flush(&[Message::new(MessageKind::Info, "later")]);

        assert_eq!(output.texts(MessageKind::Success), vec!["Created a"]);
        assert_eq!(output.texts(MessageKind::Warning), vec!["careful"]);
        assert_eq!(output.messages().len(), 3);
        assert_eq!(output.messages()[2], Message::new(MessageKind::Info, "later"));
    }
}
