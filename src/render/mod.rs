pub mod file;

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::Result;
use crate::store::{display_value, DataStore};
use crate::transform::TransformRegistry;

pub use file::{is_binary, render_content};

const OPEN: &str = "{{";

/// Cheap check used to skip the renderer for plain text.
pub fn has_placeholders(text: &str) -> bool {
    text.contains(OPEN)
}

/// Substitute `{{ key }}` and `{{ key | transform | ... }}` placeholders.
///
/// Missing keys render as an empty string, `{{{ expr }}}` is the same as
/// `{{ expr }}` and `{{! ... }}` is a comment. An opening marker without a
/// matching close is kept as literal text.
pub fn render(text: &str, data: &DataStore, transforms: &TransformRegistry) -> Result<String> {
    if !has_placeholders(text) {
        return Ok(text.to_string());
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let (open_len, close) = if tail.starts_with("{{{") {
            (3, "}}}")
        } else {
            (2, "}}")
        };

        let Some(end) = tail[open_len..].find(close) else {
            out.push_str(tail);
            return Ok(out);
        };

        let expr = &tail[open_len..open_len + end];
        out.push_str(&evaluate(expr, data, transforms)?);
        rest = &tail[open_len + end + close.len()..];
    }

    out.push_str(rest);
    Ok(out)
}

fn evaluate(expr: &str, data: &DataStore, transforms: &TransformRegistry) -> Result<String> {
    let expr = expr.trim();
    if expr.starts_with('!') {
        return Ok(String::new());
    }

    let mut parts = expr.split('|').map(str::trim);
    let key = parts.next().unwrap_or_default();
    let names: Vec<&str> = parts.filter(|name| !name.is_empty()).collect();
    transforms.ensure_known(&names)?;

    let value = data.get(key).cloned().unwrap_or(Value::Null);
    let value = transforms.apply(value, &names)?;
    Ok(display_value(&value))
}

/// Render every component of a relative path (`src/{{ slug }}.rs`).
pub fn render_path(
    rel_path: &Path,
    data: &DataStore,
    transforms: &TransformRegistry,
) -> Result<PathBuf> {
    let mut rendered = PathBuf::new();
    for component in rel_path.components() {
        let part = component.as_os_str().to_string_lossy();
        rendered.push(render(&part, data, transforms)?);
    }
    Ok(rendered)
}
