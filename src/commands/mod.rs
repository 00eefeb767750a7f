pub mod init;
pub mod make;
pub mod repo;
pub mod template;

use clap::Parser;
use forge::config::{ConfigFile, Settings};
use forge::error::{ForgeError, Result};
use forge::session::{CommandHost, Session};

use crate::cli::{Cli, Commands};

pub fn dispatch(session: &mut Session<'_>, command: Commands) -> Result<()> {
    match command {
        Commands::Make {
            template,
            force,
            data,
        } => make::run(session, &template, force, data),
        Commands::Init { force } => init::run(session, force),
        Commands::Repo(command) => repo::run(session, command),
        Commands::Template(command) => template::run(session, command),
    }
}

/// Runs `forge ...` lines from `run` directives against the current session.
pub struct CliHost;

impl CommandHost for CliHost {
    fn invoke(&self, session: &mut Session<'_>, args: &[String]) -> Result<()> {
        let base = session.settings().base_command.clone();
        let argv = std::iter::once(base.as_str()).chain(args.iter().map(String::as_str));
        let cli = Cli::try_parse_from(argv).map_err(|e| ForgeError::InvalidSubcommand {
            command: format!("{base} {}", args.join(" ")),
            reason: e.to_string(),
        })?;
        dispatch(session, cli.command)
    }
}

/// Record the configured default template repository in the global config
/// the first time forge runs with one.
pub fn bootstrap(settings: &Settings) -> Result<ConfigFile> {
    let mut global = ConfigFile::global(settings);
    global.parse()?;
    if let Some(url) = &settings.default_template_repo {
        if !global.data().has("default_template_repo") {
            global
                .data_mut()
                .set("default_template_repo", url.as_str());
            global.save()?;
        }
    }
    Ok(global)
}

/// The global config, freshly read.
fn global_config(session: &Session<'_>) -> Result<ConfigFile> {
    let mut global = ConfigFile::global(session.settings());
    global.parse()?;
    Ok(global)
}
