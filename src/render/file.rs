use crate::error::Result;
use crate::render::render;
use crate::store::DataStore;
use crate::transform::TransformRegistry;

const SNIFF_LEN: usize = 8192;

/// Detect binary content using content_inspector (BOM-aware, null-byte scanning).
///
/// Only the first 8KB are inspected.
pub fn is_binary(content: &[u8]) -> bool {
    let head = &content[..content.len().min(SNIFF_LEN)];
    !content_inspector::inspect(head).is_text()
}

/// Render file content as text, passing binary or non-UTF-8 content through
/// untouched.
pub fn render_content(
    content: Vec<u8>,
    data: &DataStore,
    transforms: &TransformRegistry,
) -> Result<Vec<u8>> {
    if is_binary(&content) {
        return Ok(content);
    }
    match String::from_utf8(content) {
        Ok(text) => Ok(render(&text, data, transforms)?.into_bytes()),
        Err(err) => Ok(err.into_bytes()),
    }
}
