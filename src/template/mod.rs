pub mod authoring;
pub mod repo;

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Settings;
use crate::error::{ForgeError, Result};
use crate::session::Session;

pub const DEFAULT_NAMESPACE: &str = "default";

/// A `[namespace:]name` template argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRef {
    pub namespace: Option<String>,
    pub name: String,
}

impl TemplateRef {
    pub fn parse(arg: &str) -> Result<Self> {
        let (namespace, name) = match arg.split_once(':') {
            Some((ns, name)) => (Some(ns.trim()).filter(|ns| !ns.is_empty()), name.trim()),
            None => (None, arg.trim()),
        };
        if name.is_empty() {
            return Err(ForgeError::InvalidSpec {
                kind: "template",
                reason: format!("no template name in '{arg}'"),
            });
        }
        Ok(Self {
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
        })
    }
}

/// The template a `make` run is working from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTemplate {
    pub namespace: String,
    pub name: String,
    pub dir: PathBuf,
}

impl ActiveTemplate {
    pub fn new(settings: &Settings, namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            dir: settings.template_dir(namespace, name),
        }
    }

    pub fn id(&self) -> String {
        format!("{}:{}", self.namespace, self.name)
    }
}

/// Resolve `reference` to a template directory. When it is not where the
/// namespace says, other namespaces are searched and the operator confirms
/// each candidate.
pub fn locate(session: &mut Session<'_>, reference: &TemplateRef) -> Result<ActiveTemplate> {
    let settings = session.settings();
    let namespace = reference
        .namespace
        .clone()
        .or_else(|| session.namespace.clone())
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
    if session.namespace.is_none() {
        session.namespace = Some(namespace.clone());
    }

    let template = ActiveTemplate::new(settings, &namespace, &reference.name);
    if template.dir.exists() {
        return Ok(template);
    }

    let output = session.output();
    output.warning(&format!(
        "Unable to find template at: {}",
        template.dir.display()
    ));
    output.warning("Attempting to locate template from another location...");

    for candidate in namespaces_with(settings, &reference.name)? {
        if candidate.namespace == namespace {
            continue;
        }
        output.success(&format!("Found template at: {}", candidate.dir.display()));
        if session
            .services
            .prompter
            .confirm("Are you sure you want to use this template?", false)?
        {
            return Ok(candidate);
        }
    }

    Err(ForgeError::TemplateNotFound {
        name: template.id(),
    })
}

/// Every namespace holding a directory called `name`.
fn namespaces_with(settings: &Settings, name: &str) -> Result<Vec<ActiveTemplate>> {
    if !settings.templates_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut found = Vec::new();
    for entry in WalkDir::new(&settings.templates_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| ForgeError::Io {
            context: format!("reading {}", settings.templates_dir.display()),
            source: e.into(),
        })?;
        let namespace = entry.file_name().to_string_lossy();
        if entry.file_type().is_dir() && entry.path().join(name).is_dir() {
            found.push(ActiveTemplate::new(settings, &namespace, name));
        }
    }
    Ok(found)
}

/// Every installed template: a directory below the templates root holding a
/// template config. Hidden directories are not searched.
pub fn find_templates(settings: &Settings) -> Result<Vec<ActiveTemplate>> {
    let root = &settings.templates_dir;
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut templates = Vec::new();
    let mut walker = WalkDir::new(root)
        .min_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e.file_name().to_string_lossy().as_ref()));

    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|e| ForgeError::Io {
            context: format!("searching {}", root.display()),
            source: e.into(),
        })?;
        if !entry.file_type().is_dir()
            || !entry.path().join(&settings.template_config_file).is_file()
        {
            continue;
        }
        if let Some(template) = from_path(root, entry.path()) {
            templates.push(template);
        }
        walker.skip_current_dir();
    }
    Ok(templates)
}

fn from_path(root: &Path, dir: &Path) -> Option<ActiveTemplate> {
    let rel = dir.strip_prefix(root).ok()?;
    let mut components = rel.components();
    let namespace = components.next()?.as_os_str().to_string_lossy().into_owned();
    let name = components.as_path().to_string_lossy().replace('\\', "/");
    Some(ActiveTemplate {
        namespace,
        name,
        dir: dir.to_path_buf(),
    })
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.') && name.len() > 1
}
