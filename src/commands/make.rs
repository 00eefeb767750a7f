use forge::error::Result;
use forge::session::Session;
use forge::template::repo::{clone_repo, CloneOptions};
use forge::template::{TemplateRef, DEFAULT_NAMESPACE};
use forge::MakeOptions;

use super::global_config;

pub fn run(
    session: &mut Session<'_>,
    template: &str,
    force: bool,
    data: Vec<(String, String)>,
) -> Result<()> {
    ensure_default_repo(session, template)?;

    let options = MakeOptions { force, data };
    forge::make(session, template, &options)
}

/// Clone the default template repository when a template from the default
/// namespace is requested before any repository was installed.
fn ensure_default_repo(session: &Session<'_>, template: &str) -> Result<()> {
    let reference = TemplateRef::parse(template)?;
    let namespace = reference
        .namespace
        .as_deref()
        .or(session.namespace.as_deref())
        .unwrap_or(DEFAULT_NAMESPACE);
    let settings = session.settings();
    if namespace != DEFAULT_NAMESPACE || settings.repo_dir(DEFAULT_NAMESPACE).exists() {
        return Ok(());
    }

    let mut global = global_config(session)?;
    let Some(url) = global
        .data()
        .get_str("default_template_repo")
        .map(str::to_string)
    else {
        return Ok(());
    };

    session
        .output()
        .info(&format!("Installing default templates from {url}"));
    let options = CloneOptions {
        name: Some(DEFAULT_NAMESPACE.to_string()),
        ..CloneOptions::default()
    };
    clone_repo(
        settings,
        &mut global,
        &url,
        &options,
        session.files(),
        session.output(),
    )?;
    Ok(())
}
