use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigFile, Settings};
use crate::error::{ForgeError, Result};
use crate::fs::FileStore;
use crate::output::{Message, Output};
use crate::prompt::Prompter;
use crate::render::render;
use crate::store::DataStore;
use crate::template::ActiveTemplate;
use crate::transform::TransformRegistry;

/// Dispatches a `forge ...` command line inside the running process.
pub trait CommandHost {
    /// `args` excludes the base command itself.
    fn invoke(&self, session: &mut Session<'_>, args: &[String]) -> Result<()>;
}

/// Shared, read-only collaborators for one run.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub settings: &'a Settings,
    pub files: &'a dyn FileStore,
    pub output: &'a dyn Output,
    pub prompter: &'a dyn Prompter,
    pub transforms: &'a TransformRegistry,
    pub host: Option<&'a dyn CommandHost>,
}

impl fmt::Debug for Services<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("settings", self.settings)
            .field("transforms", self.transforms)
            .field("host", &self.host.is_some())
            .finish_non_exhaustive()
    }
}

/// Base directory a relative path in a template config is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RelativeTo {
    #[default]
    WorkingDir,
    ProjectRoot,
    TemplateDir,
}

impl RelativeTo {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "workingDir" => Some(RelativeTo::WorkingDir),
            "projectRoot" => Some(RelativeTo::ProjectRoot),
            "templateDir" => Some(RelativeTo::TemplateDir),
            _ => None,
        }
    }
}

/// Mutable state of one scaffolding run, shared by prompts, conditions and
/// directives in declaration order.
#[derive(Debug)]
pub struct Session<'a> {
    pub services: Services<'a>,
    pub data: DataStore,
    pub messages: Vec<Message>,
    pub template: Option<ActiveTemplate>,
    pub namespace: Option<String>,
    pub working_dir: PathBuf,
    pub project_root: PathBuf,
    pub overwrite: bool,
}

impl<'a> Session<'a> {
    /// A session with no project config loaded; the project root is the
    /// working directory.
    pub fn new(services: Services<'a>, working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        let mut session = Self {
            services,
            data: DataStore::new(),
            messages: Vec::new(),
            template: None,
            namespace: None,
            project_root: working_dir.clone(),
            working_dir,
            overwrite: false,
        };
        session.publish_paths();
        session
    }

    /// Start a session in `working_dir`, pre-filling the data with the nearest
    /// project config's answers.
    pub fn open(services: Services<'a>, working_dir: impl Into<PathBuf>) -> Result<Self> {
        let working_dir = working_dir.into();
        let mut project = ConfigFile::discover_project(services.settings, &working_dir);
        project.parse()?;
        log::debug!("project root: {}", project.dir().display());

        let mut session = Self::new(services, &working_dir);
        session.project_root = project.dir().to_path_buf();
        session.data.merge(project.data());
        session.publish_paths();
        Ok(session)
    }

    fn publish_paths(&mut self) {
        let project_root = self.project_root.to_string_lossy().into_owned();
        let working_dir = self.working_dir.to_string_lossy().into_owned();
        self.data.set("project_root", project_root);
        self.data.set("working_dir", working_dir);
    }

    pub fn settings(&self) -> &'a Settings {
        self.services.settings
    }

    pub fn files(&self) -> &'a dyn FileStore {
        self.services.files
    }

    pub fn output(&self) -> &'a dyn Output {
        self.services.output
    }

    pub fn transforms(&self) -> &'a TransformRegistry {
        self.services.transforms
    }

    pub fn render(&self, text: &str) -> Result<String> {
        render(text, &self.data, self.services.transforms)
    }

    pub fn template_dir(&self) -> Result<&Path> {
        self.template
            .as_ref()
            .map(|t| t.dir.as_path())
            .ok_or(ForgeError::NoActiveTemplate)
    }

    pub fn base_dir(&self, relative_to: RelativeTo) -> Result<PathBuf> {
        match relative_to {
            RelativeTo::WorkingDir => Ok(self.working_dir.clone()),
            RelativeTo::ProjectRoot => Ok(self.project_root.clone()),
            RelativeTo::TemplateDir => self.template_dir().map(Path::to_path_buf),
        }
    }

    pub fn defer(&mut self, message: Message) {
        self.messages.push(message);
    }
}
