use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "forge",
    about = "Scaffold projects from reusable, prompt-driven templates",
    version
)]
pub struct Cli {
    /// Answer every prompt with its default value
    #[arg(long, global = true)]
    pub defaults: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold files from a template into the current directory
    Make {
        /// Template to use, as `name` or `namespace:name`
        template: String,

        /// Overwrite files that already exist
        #[arg(long)]
        force: bool,

        /// Set values up front (can be repeated: -d key=value)
        #[arg(short, long = "data", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        data: Vec<(String, String)>,
    },

    /// Generate a project config in the current directory
    Init {
        /// Overwrite an existing project config without asking
        #[arg(long)]
        force: bool,
    },

    /// Manage template repositories
    #[command(subcommand)]
    Repo(RepoCommands),

    /// Author and list templates
    #[command(subcommand)]
    Template(TemplateCommands),
}

#[derive(Subcommand, Debug)]
pub enum RepoCommands {
    /// Clone a template repository
    Clone {
        /// Git URL of the repository
        url: String,

        /// Name to register the repository under
        #[arg(long = "as", default_value = "default")]
        name: String,

        /// Branch to check out
        #[arg(long)]
        branch: Option<String>,

        /// Replace an existing clone with the same name
        #[arg(long)]
        force: bool,
    },

    /// Pull the latest changes for a template repository
    Update {
        /// Name the repository is registered under
        #[arg(long = "as", default_value = "default")]
        name: String,

        /// Branch to pull
        #[arg(long)]
        branch: Option<String>,

        /// Remote to pull from
        #[arg(long, default_value = forge::template::repo::DEFAULT_REMOTE)]
        remote: String,
    },

    /// Delete a template repository
    Delete {
        /// Name the repository is registered under
        #[arg(default_value = "default")]
        name: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// List registered template repositories
    List,
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// Write a template config in the current directory
    Create {
        /// Overwrite an existing template config
        #[arg(long)]
        force: bool,
    },

    /// List installed templates
    List,
}

/// Split a `-d KEY=VALUE` argument. The value may itself contain `=`.
fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
