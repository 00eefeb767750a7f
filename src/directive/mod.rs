pub mod copy;
pub mod execute;
pub mod run;

use serde_json::Value;

use crate::condition::ConditionGroup;
use crate::error::{ForgeError, Result};
use crate::session::Session;

pub use copy::{CopyAction, CopyDirective};
pub use execute::ExecuteDirective;
pub use run::RunDirective;

#[derive(Debug, Clone, PartialEq)]
pub enum DirectiveKind {
    Copy(CopyDirective),
    Run(RunDirective),
    Execute(ExecuteDirective),
}

/// One validated entry of a template's `directives` list.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub condition: Option<ConditionGroup>,
}

impl Directive {
    /// Validate `{"directive": <type>, ...}` including its attached condition.
    pub fn parse(spec: &Value) -> Result<Self> {
        let name = spec
            .get("directive")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ForgeError::MissingField {
                kind: "directive",
                subject: spec.to_string(),
                field: "directive",
            })?;

        let kind = match name {
            "copy" => DirectiveKind::Copy(CopyDirective::parse(spec)?),
            "run" | "runCommand" => DirectiveKind::Run(RunDirective::parse(spec)?),
            "execute" => DirectiveKind::Execute(ExecuteDirective::parse(spec)?),
            other => {
                return Err(ForgeError::UnknownDirective {
                    name: other.to_string(),
                })
            }
        };

        let condition = match spec.get("condition") {
            None | Some(Value::Null) => None,
            Some(condition) => Some(ConditionGroup::parse(condition)?),
        };

        Ok(Self { kind, condition })
    }

    /// Validate a whole list, failing on the first bad entry.
    pub fn parse_all(specs: &[Value]) -> Result<Vec<Self>> {
        specs.iter().map(Self::parse).collect()
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            DirectiveKind::Copy(_) => "copy",
            DirectiveKind::Run(_) => "run",
            DirectiveKind::Execute(_) => "execute",
        }
    }

    /// Run the directive unless its condition fails, in which case nothing
    /// happens at all. Returns whether it ran.
    pub fn run(&self, session: &mut Session<'_>) -> Result<bool> {
        if let Some(condition) = &self.condition {
            if !condition.evaluate(session)? {
                log::debug!("skipping {} directive, condition not met", self.name());
                return Ok(false);
            }
        }

        log::debug!("running {} directive", self.name());
        match &self.kind {
            DirectiveKind::Copy(copy) => copy.run(session)?,
            DirectiveKind::Run(run) => run.run(session)?,
            DirectiveKind::Execute(execute) => execute.run(session)?,
        }
        Ok(true)
    }
}
