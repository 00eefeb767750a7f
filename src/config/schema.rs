use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ForgeError, Result};
use crate::output::{Message, MessageKind};
use crate::store::DataStore;

/// The sections of a template's `config.json`.
///
/// Prompts and directives stay as raw JSON here; each entry is validated by
/// its own parser so errors can name the offending entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TemplateConfig {
    #[serde(default)]
    pub prompts: Vec<Value>,

    #[serde(default)]
    pub directives: Vec<Value>,

    #[serde(default)]
    pub messages: Vec<MessageSpec>,
}

impl TemplateConfig {
    pub fn from_store(data: &DataStore, path: &Path) -> Result<Self> {
        serde_json::from_value(data.to_value()).map_err(|e| ForgeError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// A deferred message shown once the run finishes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MessageSpec {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub message: String,
}

impl MessageSpec {
    pub fn to_message(&self, text: String) -> Message {
        Message::new(MessageKind::from_name(&self.kind), text)
    }
}
