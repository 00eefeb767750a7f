pub mod schema;
pub mod settings;

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{ForgeError, Result};
use crate::store::DataStore;

pub use schema::{MessageSpec, TemplateConfig};
pub use settings::Settings;

/// One JSON config file on disk and its in-memory data.
///
/// The template, project and global layers differ only in directory and file
/// name.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    dir: PathBuf,
    file_name: String,
    data: DataStore,
}

impl ConfigFile {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
            data: DataStore::new(),
        }
    }

    /// The `config.json` inside a template directory.
    pub fn template(settings: &Settings, template_dir: &Path) -> Self {
        Self::new(template_dir, &settings.template_config_file)
    }

    /// The project config kept at a project root.
    pub fn project(settings: &Settings, project_root: &Path) -> Self {
        Self::new(project_root, &settings.project_config_file)
    }

    /// The user-level config in the home directory.
    pub fn global(settings: &Settings) -> Self {
        Self::new(&settings.home_dir, &settings.global_config_file)
    }

    /// Find the nearest project config at or above `start`. When none exists
    /// the layer points at `start` itself.
    ///
    /// The global config shares its file name with project configs, so the
    /// home directory's file is never taken as a project.
    pub fn discover_project(settings: &Settings, start: &Path) -> Self {
        let root = start
            .ancestors()
            .find(|dir| {
                !is_home_dir(settings, dir) && dir.join(&settings.project_config_file).is_file()
            })
            .unwrap_or(start);
        Self::project(settings, root)
    }

    /// True when this file is the same file as the global config.
    pub fn is_global(&self, settings: &Settings) -> bool {
        self.file_name == settings.global_config_file && is_home_dir(settings, &self.dir)
    }

    pub fn with_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_data(mut self, data: DataStore) -> Self {
        self.data = data;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// True when the file exists and is not empty.
    pub fn has_config(&self) -> bool {
        std::fs::metadata(self.file_path())
            .map(|meta| meta.is_file() && meta.len() > 0)
            .unwrap_or(false)
    }

    pub fn data(&self) -> &DataStore {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut DataStore {
        &mut self.data
    }

    /// Load the file, replacing the current data. A missing or blank file
    /// yields an empty store.
    pub fn parse(&mut self) -> Result<&DataStore> {
        let path = self.file_path();
        self.data.reset();
        if !path.is_file() {
            return Ok(&self.data);
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ForgeError::Io {
            context: format!("reading config {}", path.display()),
            source: e,
        })?;
        if content.trim().is_empty() {
            return Ok(&self.data);
        }

        let root: Map<String, Value> = serde_json::from_str(&content)
            .map_err(|e| ForgeError::ConfigParse { path, source: e })?;
        self.data = DataStore::from_map(root);
        Ok(&self.data)
    }

    /// Write the data as pretty-printed JSON, creating the directory if needed.
    pub fn save(&self) -> Result<()> {
        let path = self.file_path();
        let write_error = |source| ForgeError::ConfigWrite {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(write_error)?;
        let mut content = serde_json::to_string_pretty(&self.data).map_err(|e| {
            ForgeError::ConfigWrite {
                path: path.clone(),
                source: std::io::Error::other(e),
            }
        })?;
        content.push('\n');
        std::fs::write(&path, content).map_err(write_error)?;
        log::debug!("saved config {}", path.display());
        Ok(())
    }
}

fn is_home_dir(settings: &Settings, dir: &Path) -> bool {
    if dir == settings.home_dir.as_path() {
        return true;
    }
    match (dir.canonicalize(), settings.home_dir.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
