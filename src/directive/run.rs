use std::process::Command;

use serde_json::Value;

use crate::condition::{relative_to, required_str};
use crate::error::{ForgeError, Result};
use crate::session::{RelativeTo, Session};

/// Run a shell command, or one of forge's own commands in-process.
#[derive(Debug, Clone, PartialEq)]
pub struct RunDirective {
    pub command: String,
    pub relative_to: RelativeTo,
}

impl RunDirective {
    pub fn parse(spec: &Value) -> Result<Self> {
        Ok(Self {
            command: required_str(spec, "directive", "run", "command")?,
            relative_to: relative_to(spec, "directive")?,
        })
    }

    pub fn run(&self, session: &mut Session<'_>) -> Result<()> {
        let command = session.render(&self.command)?;
        let words = shlex::split(&command).ok_or_else(|| ForgeError::InvalidSpec {
            kind: "directive",
            reason: format!("unbalanced quotes in command: {command}"),
        })?;

        match words.split_first() {
            Some((first, rest)) if session.settings().is_base_command(first) => {
                let host = session
                    .services
                    .host
                    .ok_or_else(|| ForgeError::InvalidSubcommand {
                        command: command.clone(),
                        reason: "no command host is available".into(),
                    })?;
                log::debug!("dispatching '{command}' in-process");
                host.invoke(session, rest)
            }
            Some(_) => self.spawn(session, &command),
            None => Ok(()),
        }
    }

    fn spawn(&self, session: &Session<'_>, command: &str) -> Result<()> {
        let dir = session.base_dir(self.relative_to)?;
        log::debug!("spawning '{command}' in {}", dir.display());

        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(&dir)
            .status()
            .map_err(|e| ForgeError::Io {
                context: format!("spawning '{command}'"),
                source: e,
            })?;

        if !status.success() {
            return Err(ForgeError::ExternalCommand {
                command: command.to_string(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}
