mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use forge::config::Settings;
use forge::error::ForgeError;
use forge::fs::LocalFiles;
use forge::output::{ConsoleOutput, Output};
use forge::prompt::{DefaultsPrompter, InquirePrompter, Prompter};
use forge::session::{Services, Session};
use forge::transform::TransformRegistry;

fn main() -> miette::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = Settings::from_env()?;
    commands::bootstrap(&settings)?;
    let working_dir = std::env::current_dir().map_err(|e| ForgeError::Io {
        context: "getting current directory".into(),
        source: e,
    })?;

    let prompter: &dyn Prompter = if cli.defaults {
        &DefaultsPrompter
    } else {
        &InquirePrompter
    };
    let output = ConsoleOutput;
    let transforms = TransformRegistry::with_builtins();
    let host = commands::CliHost;
    let services = Services {
        settings: &settings,
        files: &LocalFiles,
        output: &output,
        prompter,
        transforms: &transforms,
        host: Some(&host),
    };

    let mut session = Session::open(services, working_dir)?;
    let result = commands::dispatch(&mut session, cli.command);
    output.flush(&session.messages);

    match result {
        Err(ForgeError::UserAbort) => {
            output.error("Aborted");
            std::process::exit(ForgeError::UserAbort.exit_code());
        }
        other => other.map_err(Into::into),
    }
}
