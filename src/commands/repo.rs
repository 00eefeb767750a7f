use console::style;
use forge::error::{ForgeError, Result};
use forge::session::Session;
use forge::template::repo::{self, CloneOptions};

use super::global_config;
use crate::cli::RepoCommands;

pub fn run(session: &mut Session<'_>, command: RepoCommands) -> Result<()> {
    let settings = session.settings();
    let output = session.output();
    let mut global = global_config(session)?;

    match command {
        RepoCommands::Clone {
            url,
            name,
            branch,
            force,
        } => {
            let options = CloneOptions {
                name: Some(name),
                branch,
                force,
            };
            let files = session.files();
            match repo::clone_repo(settings, &mut global, &url, &options, files, output) {
                Err(ForgeError::RepoExists { name }) => {
                    output.error("Repository has already been cloned!");
                    output.out(&format!(
                        "Run '{} repo update --as {name}' to update, or clone with --force.",
                        settings.base_command
                    ));
                    Err(ForgeError::RepoExists { name })
                }
                other => other.map(|_| ()),
            }
        }
        RepoCommands::Update {
            name,
            branch,
            remote,
        } => repo::update_repo(
            settings,
            &global,
            Some(&name),
            branch.as_deref(),
            Some(&remote),
            output,
        ),
        RepoCommands::Delete { name, yes } => {
            if !yes
                && !session
                    .services
                    .prompter
                    .confirm("Are you sure you want to delete this repository?", false)?
            {
                return Err(ForgeError::UserAbort);
            }
            repo::delete_repo(settings, &mut global, Some(&name), session.files(), output)
        }
        RepoCommands::List => {
            let repos = repo::list_repos(settings, &global);
            if repos.is_empty() {
                output.out(&format!(
                    "No template repositories. Use '{}' to add one.",
                    style(format!("{} repo clone <url>", settings.base_command)).cyan()
                ));
            }
            for entry in repos {
                output.out(&format!("{}: {}", style(&entry.name).bold(), entry.url));
            }
            Ok(())
        }
    }
}
