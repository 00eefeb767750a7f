use std::path::{Path, PathBuf};

use rhai::{Array, Dynamic, Engine, Scope};
use serde_json::{Map, Value};

use crate::condition::required_str;
use crate::error::{ForgeError, Result};
use crate::output::{Message, MessageKind};
use crate::session::Session;

/// Run a Rhai script shipped with the template against the session data.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteDirective {
    pub file: String,
}

impl ExecuteDirective {
    pub fn parse(spec: &Value) -> Result<Self> {
        Ok(Self {
            file: required_str(spec, "directive", "execute", "file")?,
        })
    }

    pub fn run(&self, session: &mut Session<'_>) -> Result<()> {
        let path = session.template_dir()?.join(session.render(&self.file)?);
        let files = session.files();
        if !files.exists(&path) {
            return Err(ForgeError::FileMissing { path });
        }
        let script = String::from_utf8_lossy(&files.read(&path)?).into_owned();
        let script_error = |message: String| ForgeError::Script {
            file: path.display().to_string(),
            message,
        };

        let engine = create_engine(&session.working_dir);
        let mut scope = build_scope(session).map_err(script_error)?;
        log::debug!("executing {}", path.display());
        engine
            .run_with_scope(&mut scope, &script)
            .map_err(|e| script_error(e.to_string()))?;

        if let Some(data) = scope.get_value::<Dynamic>("data") {
            let entries: Map<String, Value> = rhai::serde::from_dynamic(&data)
                .map_err(|e| script_error(format!("`data` must stay a map: {e}")))?;
            session.data.replace_ordered(entries);
        }
        if let Some(messages) = scope.get_value::<Dynamic>("messages") {
            let messages: Vec<Value> = rhai::serde::from_dynamic(&messages)
                .map_err(|e| script_error(format!("`messages` must stay an array: {e}")))?;
            for message in messages {
                session.defer(to_message(message));
            }
        }
        Ok(())
    }
}

/// A sandboxed engine with forge's helper functions.
fn create_engine(working_dir: &Path) -> Engine {
    let mut engine = Engine::new();

    engine.set_max_call_levels(32);
    engine.set_max_operations(100_000);
    engine.set_max_string_size(10 * 1024 * 1024);

    let base: PathBuf = working_dir.to_path_buf();
    engine.register_fn("file_exists", move |path: &str| base.join(path).exists());

    engine
}

fn build_scope<'a>(session: &Session<'_>) -> std::result::Result<Scope<'a>, String> {
    let data = rhai::serde::to_dynamic(session.data.to_map()).map_err(|e| e.to_string())?;
    let template_dir = session
        .template_dir()
        .map(|dir| dir.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut scope = Scope::new();
    scope.push("data", data);
    scope.push("template_dir", template_dir);
    scope.push(
        "working_dir",
        session.working_dir.to_string_lossy().into_owned(),
    );
    scope.push(
        "project_root",
        session.project_root.to_string_lossy().into_owned(),
    );
    scope.push("messages", Array::new());
    Ok(scope)
}

fn to_message(value: Value) -> Message {
    match value {
        Value::String(text) => Message::new(MessageKind::Out, text),
        Value::Object(map) => {
            let kind = map
                .get("type")
                .and_then(Value::as_str)
                .map(MessageKind::from_name)
                .unwrap_or_default();
            let text = map
                .get("message")
                .map(crate::store::display_value)
                .unwrap_or_default();
            Message::new(kind, text)
        }
        other => Message::new(MessageKind::Out, crate::store::display_value(&other)),
    }
}
