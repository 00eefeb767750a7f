pub mod case;
pub mod inflect;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ForgeError, Result};
use crate::store::display_value;

pub type TransformFn = Box<dyn Fn(&str) -> Value + Send + Sync>;

/// Named string transformations referenced from prompt specs and `{{ x | name }}`
/// placeholders.
pub struct TransformRegistry {
    table: BTreeMap<String, TransformFn>,
}

impl TransformRegistry {
    pub fn empty() -> Self {
        Self {
            table: BTreeMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register_text("abbreviate", case::initials);
        registry.register_text("basename", basename);
        registry.register_text("camelCase", case::camel_case);
        registry.register_text("kebabCase", case::kebab_case);
        registry.register_text("lowercase", str::to_lowercase);
        registry.register_text("pascalCase", case::pascal_case);
        registry.register_text("plural", inflect::plural);
        registry.register_text("realpath", realpath);
        registry.register_text("singular", inflect::singular);
        registry.register_text("snakeCase", case::snake_case);
        registry.register_text("titleCase", case::title_case);
        registry.register_text("trim", |s| s.trim().to_string());
        registry.register_text("uppercase", str::to_uppercase);
        registry.register_text("words", case::words);
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, transform: F)
    where
        F: Fn(&str) -> Value + Send + Sync + 'static,
    {
        self.table.insert(name.into(), Box::new(transform));
    }

    fn register_text(&mut self, name: &str, transform: fn(&str) -> String) {
        self.register(name, move |s| Value::String(transform(s)));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    pub fn ensure_known<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        match names.iter().find(|n| !self.contains(n.as_ref())) {
            Some(unknown) => Err(ForgeError::UnknownTransform {
                name: unknown.as_ref().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Apply `names` left to right. Lists are transformed element-wise and
    /// null passes through untouched.
    pub fn apply<S: AsRef<str>>(&self, value: Value, names: &[S]) -> Result<Value> {
        names
            .iter()
            .try_fold(value, |acc, name| self.apply_one(acc, name.as_ref()))
    }

    pub fn apply_one(&self, value: Value, name: &str) -> Result<Value> {
        let transform = self
            .table
            .get(name)
            .ok_or_else(|| ForgeError::UnknownTransform {
                name: name.to_string(),
            })?;

        Ok(match value {
            Value::Null => Value::Null,
            Value::String(s) => transform(&s),
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.apply_one(item, name))
                    .collect::<Result<_>>()?,
            ),
            other => transform(&display_value(&other)),
        })
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// A list of transform names that may be written as a single string in config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OneOrMany")]
pub struct TransformChain(pub Vec<String>);

impl TransformChain {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for TransformChain {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(name) if name.is_empty() => Self(Vec::new()),
            OneOrMany::One(name) => Self(vec![name]),
            OneOrMany::Many(names) => Self(names),
        }
    }
}

fn realpath(input: &str) -> String {
    let path = Path::new(input);
    let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    });
    resolved.to_string_lossy().into_owned()
}

fn basename(input: &str) -> String {
    Path::new(input)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.to_string())
}
