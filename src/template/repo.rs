use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

use crate::config::{ConfigFile, Settings};
use crate::error::{ForgeError, Result};
use crate::fs::FileStore;
use crate::output::Output;

pub const DEFAULT_REMOTE: &str = "origin";

/// A template repository registered in the global config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoEntry {
    pub name: String,
    pub url: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct CloneOptions {
    pub name: Option<String>,
    pub branch: Option<String>,
    pub force: bool,
}

/// Known git failures and what the user can do about them.
const GIT_HINTS: &[(fn(&str) -> bool, &str)] = &[
    (
        |err| err.contains("Authentication failed") || err.contains("could not read Username"),
        "the remote rejected the credentials, set up a git credential helper or an SSH key for this host",
    ),
    (
        |err| {
            err.contains("Repository not found")
                || (err.contains("repository") && err.contains("not found"))
        },
        "nothing to clone at this URL; private template repositories also need git credentials",
    ),
    (
        |err| err.contains("Host key verification failed"),
        "the SSH host is not trusted yet, add it with: ssh-keyscan <host> >> ~/.ssh/known_hosts",
    ),
    (
        |err| err.contains("Could not resolve host") || err.contains("Connection refused"),
        "the remote could not be reached, check the URL and your network",
    ),
    (
        |err| err.contains("couldn't find remote ref"),
        "the remote has no such branch, check the --branch value",
    ),
];

/// Prefix git's stderr with a hint when the failure is a known one.
fn classify_git_error(stderr: &str) -> String {
    match GIT_HINTS.iter().find(|(matches, _)| matches(stderr)) {
        Some((_, hint)) => format!("{hint}\n\ngit said:\n{stderr}"),
        None => stderr.to_string(),
    }
}

pub fn ensure_git() -> Result<()> {
    Command::new("git")
        .arg("--version")
        .output()
        .map_err(|_| ForgeError::GitNotFound)?;
    Ok(())
}

/// Run git with prompts disabled, so the user's credential helpers and SSH
/// agent are used but nothing blocks on a terminal.
fn git(operation: &str, args: &[&str], dir: Option<&Path>) -> Result<()> {
    let mut cmd = Command::new("git");
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    if let Some(dir) = dir {
        cmd.arg("-C").arg(dir);
    }
    cmd.args(args);
    log::debug!("running git {}", args.join(" "));

    let output = cmd.output().map_err(|e| ForgeError::Io {
        context: format!("running git {operation}"),
        source: e,
    })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ForgeError::Git {
            operation: operation.to_string(),
            reason: classify_git_error(stderr.trim()),
        });
    }
    Ok(())
}

fn repo_name(name: Option<&str>) -> &str {
    name.filter(|n| !n.is_empty()).unwrap_or("default")
}

/// Where the repository registered as `name` lives. Falls back to the
/// conventional location when it is not registered.
pub fn repo_path(settings: &Settings, global: &ConfigFile, name: &str) -> PathBuf {
    global
        .data()
        .get_str(&format!("templates.{name}.path"))
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.repo_dir(name))
}

/// Clone `url` into the templates directory and register it.
///
/// The clone goes to a temporary sibling directory first and is renamed into
/// place only once git succeeds.
pub fn clone_repo(
    settings: &Settings,
    global: &mut ConfigFile,
    url: &str,
    options: &CloneOptions,
    files: &dyn FileStore,
    output: &dyn Output,
) -> Result<PathBuf> {
    ensure_git()?;
    let name = repo_name(options.name.as_deref());
    let path = settings.repo_dir(name);

    if files.exists(&path) {
        if !options.force {
            return Err(ForgeError::RepoExists {
                name: name.to_string(),
            });
        }
        output.info(&format!("Deleting existing files located at: {}", path.display()));
        files.delete(&path)?;
    }

    std::fs::create_dir_all(&settings.templates_dir).map_err(|e| ForgeError::Io {
        context: format!("creating {}", settings.templates_dir.display()),
        source: e,
    })?;
    let tmp_dir = tempfile::tempdir_in(&settings.templates_dir).map_err(|e| ForgeError::Io {
        context: "creating temporary directory for git clone".into(),
        source: e,
    })?;
    let staging = tmp_dir.path().join("repo");
    let staging_str = staging.to_string_lossy();

    let mut args = vec!["clone"];
    if let Some(branch) = options.branch.as_deref() {
        args.extend(["--branch", branch]);
    }
    args.extend(["--", url, &*staging_str]);
    git("clone", &args, None)?;

    std::fs::rename(&staging, &path).map_err(|e| ForgeError::Io {
        context: format!("moving clone into {}", path.display()),
        source: e,
    })?;

    register(global, name, url, &path)?;
    output.success(&format!("Cloned {url} as '{name}'"));
    Ok(path)
}

pub fn register(global: &mut ConfigFile, name: &str, url: &str, path: &Path) -> Result<()> {
    let data = global.data_mut();
    data.set(&format!("templates.{name}.url"), url);
    data.set(
        &format!("templates.{name}.path"),
        path.to_string_lossy().into_owned(),
    );
    global.save()
}

/// Pull the latest changes for a registered repository.
pub fn update_repo(
    settings: &Settings,
    global: &ConfigFile,
    name: Option<&str>,
    branch: Option<&str>,
    remote: Option<&str>,
    output: &dyn Output,
) -> Result<()> {
    ensure_git()?;
    let name = repo_name(name);
    let path = repo_path(settings, global, name);
    if !path.is_dir() {
        return Err(ForgeError::RepoNotFound {
            name: name.to_string(),
        });
    }

    let remote = remote.unwrap_or(DEFAULT_REMOTE);
    let mut args = vec!["pull", remote];
    if let Some(branch) = branch {
        args.push(branch);
    }
    git("pull", &args, Some(&path))?;
    output.success(&format!("Updated '{name}' from {remote}"));
    Ok(())
}

/// Remove a repository's files and its registration.
pub fn delete_repo(
    settings: &Settings,
    global: &mut ConfigFile,
    name: Option<&str>,
    files: &dyn FileStore,
    output: &dyn Output,
) -> Result<()> {
    let name = repo_name(name);
    let path = repo_path(settings, global, name);
    let registered = global.data().has(&format!("templates.{name}"));
    let on_disk = files.exists(&path);
    if !registered && !on_disk {
        return Err(ForgeError::RepoNotFound {
            name: name.to_string(),
        });
    }

    if on_disk {
        output.info(&format!("Deleting existing files located at: {}", path.display()));
        files.delete(&path)?;
    }
    global.data_mut().forget(&format!("templates.{name}"));
    global.save()?;
    output.success("Repository deleted successfully!");
    Ok(())
}

/// Registered repositories, in registration order.
pub fn list_repos(settings: &Settings, global: &ConfigFile) -> Vec<RepoEntry> {
    let Some(Value::Object(templates)) = global.data().get("templates") else {
        return Vec::new();
    };
    templates
        .keys()
        .map(|name| RepoEntry {
            name: name.clone(),
            url: global
                .data()
                .get_str(&format!("templates.{name}.url"))
                .unwrap_or_default()
                .to_string(),
            path: repo_path(settings, global, name),
        })
        .collect()
}
