pub mod condition;
pub mod config;
pub mod directive;
pub mod error;
pub mod fs;
pub mod output;
pub mod project;
pub mod prompt;
pub mod render;
pub mod scaffold;
pub mod session;
pub mod store;
pub mod template;
pub mod transform;

use crate::config::{ConfigFile, MessageSpec, TemplateConfig};
use crate::directive::Directive;
use crate::error::{ForgeError, Result};
use crate::prompt::PromptPipeline;
use crate::session::Session;
use crate::template::{locate, ActiveTemplate, TemplateRef};

#[derive(Debug, Clone, Default)]
pub struct MakeOptions {
    /// Overwrite existing files for the duration of this run.
    pub force: bool,
    /// Values stored before prompting; prompts for these keys are skipped.
    pub data: Vec<(String, String)>,
}

/// A template config with every prompt and directive already validated.
#[derive(Debug)]
pub struct LoadedTemplate {
    pub template: ActiveTemplate,
    pub prompts: PromptPipeline,
    pub directives: Vec<Directive>,
    pub messages: Vec<MessageSpec>,
}

/// Load and validate the config of `template`. Nothing is asked or written.
pub fn load_template(session: &Session<'_>, template: ActiveTemplate) -> Result<LoadedTemplate> {
    let mut config = ConfigFile::template(session.settings(), &template.dir);
    if !config.has_config() {
        return Err(ForgeError::TemplateConfigMissing {
            path: config.file_path(),
        });
    }
    config.parse()?;
    let spec = TemplateConfig::from_store(config.data(), &config.file_path())?;

    let prompts = PromptPipeline::parse(&spec.prompts, session.transforms(), session.output())?;
    let directives = Directive::parse_all(&spec.directives)?;
    log::debug!(
        "loaded {}: {} prompts, {} directives",
        template.id(),
        prompts.specs().len(),
        directives.len()
    );

    Ok(LoadedTemplate {
        template,
        prompts,
        directives,
        messages: spec.messages,
    })
}

/// Scaffold from `template` (`[namespace:]name`) into the session's working
/// directory.
///
/// The previously active template is restored afterwards, so a `make` nested
/// inside another template's `run` directive hands control back cleanly.
pub fn make(session: &mut Session<'_>, template: &str, options: &MakeOptions) -> Result<()> {
    for (key, value) in &options.data {
        session.data.set(key, value.as_str());
    }

    let reference = TemplateRef::parse(template)?;
    let active = locate(session, &reference)?;
    let loaded = load_template(session, active)?;

    let previous_template = session.template.replace(loaded.template.clone());
    let previous_overwrite = session.overwrite;
    session.overwrite |= options.force;

    let result = run_template(session, &loaded);

    session.overwrite = previous_overwrite;
    session.template = previous_template;
    match &session.template {
        Some(outer) => {
            let dir = outer.dir.to_string_lossy().into_owned();
            session.data.set("template_dir", dir);
        }
        None => {
            session.data.forget("template_dir");
        }
    }
    result
}

fn run_template(session: &mut Session<'_>, loaded: &LoadedTemplate) -> Result<()> {
    let dir = loaded.template.dir.to_string_lossy().into_owned();
    session.data.set("template_dir", dir);

    loaded.prompts.collect(
        &mut session.data,
        session.services.prompter,
        session.services.transforms,
    )?;

    for directive in &loaded.directives {
        directive.run(session)?;
    }

    for message in &loaded.messages {
        let text = session.render(&message.message)?;
        session.defer(message.to_message(text));
    }
    Ok(())
}
