use std::path::{Path, PathBuf};

use crate::error::{ForgeError, Result};

pub const BASE_COMMAND: &str = "forge";
pub const TEMPLATE_CONFIG_FILE: &str = "config.json";
pub const PROJECT_CONFIG_FILE: &str = ".forge.json";
pub const GLOBAL_CONFIG_FILE: &str = ".forge.json";

/// Process-wide, read-only settings resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_command: String,
    pub home_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub template_config_file: String,
    pub project_config_file: String,
    pub global_config_file: String,
    pub default_template_repo: Option<String>,
}

impl Settings {
    /// Settings rooted at `home`, with no environment overrides applied.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let mut settings = Self {
            base_command: BASE_COMMAND.to_string(),
            home_dir: home.into(),
            templates_dir: PathBuf::new(),
            template_config_file: TEMPLATE_CONFIG_FILE.to_string(),
            project_config_file: PROJECT_CONFIG_FILE.to_string(),
            global_config_file: GLOBAL_CONFIG_FILE.to_string(),
            default_template_repo: None,
        };
        settings.templates_dir = settings.data_dir().join("templates");
        settings
    }

    /// Resolve settings from the user's home directory.
    ///
    /// `FORGE_HOME` replaces the home directory, `FORGE_TEMPLATES_DIR` moves the
    /// template store and `FORGE_DEFAULT_TEMPLATE_REPO` names a repository to
    /// register as `default` on first run.
    pub fn from_env() -> Result<Self> {
        let home = match std::env::var_os("FORGE_HOME") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir().ok_or(ForgeError::HomeDirMissing)?,
        };
        let mut settings = Self::with_home(home);
        if let Some(dir) = std::env::var_os("FORGE_TEMPLATES_DIR") {
            settings.templates_dir = PathBuf::from(dir);
        }
        settings.default_template_repo = std::env::var("FORGE_DEFAULT_TEMPLATE_REPO")
            .ok()
            .filter(|url| !url.is_empty());
        Ok(settings)
    }

    pub fn with_templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = dir.into();
        self
    }

    pub fn with_default_template_repo(mut self, url: impl Into<String>) -> Self {
        self.default_template_repo = Some(url.into());
        self
    }

    /// Root of everything forge keeps in the home directory.
    pub fn data_dir(&self) -> PathBuf {
        self.home_dir.join(".forge")
    }

    /// Directory a repository registered as `name` is cloned into.
    pub fn repo_dir(&self, name: &str) -> PathBuf {
        self.templates_dir.join(name)
    }

    pub fn template_dir(&self, namespace: &str, name: &str) -> PathBuf {
        self.templates_dir.join(namespace).join(name)
    }

    pub fn is_base_command(&self, word: &str) -> bool {
        word == self.base_command
            || Path::new(word)
                .file_name()
                .is_some_and(|name| name == self.base_command.as_str())
    }
}
