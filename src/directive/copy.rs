use serde_json::Value;

use crate::condition::{relative_to, required_str};
use crate::error::{ForgeError, Result};
use crate::fs::join_path;
use crate::scaffold::Scaffold;
use crate::session::{RelativeTo, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyAction {
    CopyDir,
    CopyFile,
}

impl CopyAction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "copyDir" => Some(CopyAction::CopyDir),
            "copyFile" => Some(CopyAction::CopyFile),
            _ => None,
        }
    }
}

/// Copy a file or directory from the active template into the project.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyDirective {
    pub from: String,
    pub to: String,
    pub action: Option<CopyAction>,
    pub overwrite: Option<bool>,
    pub exclude: Vec<String>,
    pub relative_to: RelativeTo,
}

impl CopyDirective {
    pub fn parse(spec: &Value) -> Result<Self> {
        let from = required_str(spec, "directive", "copy", "from")?;
        let to = required_str(spec, "directive", "copy", "to")?;

        let action = match spec.get("action").and_then(Value::as_str) {
            None | Some("") => None,
            Some(name) => Some(CopyAction::from_name(name).ok_or_else(|| {
                ForgeError::InvalidSpec {
                    kind: "directive",
                    reason: format!("copy action must be copyDir or copyFile, got '{name}'"),
                }
            })?),
        };

        let overwrite = match spec.get("overwrite") {
            None | Some(Value::Null) => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(other) => {
                return Err(ForgeError::InvalidSpec {
                    kind: "directive",
                    reason: format!("copy overwrite must be true or false, got {other}"),
                })
            }
        };

        let exclude = match spec.get("exclude") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(pattern)) => vec![pattern.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| ForgeError::InvalidSpec {
                            kind: "directive",
                            reason: format!("copy exclude entries must be strings, got {item}"),
                        })
                })
                .collect::<Result<_>>()?,
            Some(other) => {
                return Err(ForgeError::InvalidSpec {
                    kind: "directive",
                    reason: format!("copy exclude must be a list of globs, got {other}"),
                })
            }
        };

        Ok(Self {
            from,
            to,
            action,
            overwrite,
            exclude,
            relative_to: relative_to(spec, "directive")?,
        })
    }

    pub fn run(&self, session: &mut Session<'_>) -> Result<()> {
        let template_dir = session.template_dir()?.to_path_buf();
        let source = join_path(&template_dir, session.render(&self.from)?);
        let target = join_path(
            &session.base_dir(self.relative_to)?,
            session.render(&self.to)?,
        );

        let files = session.files();
        if !files.exists(&source) {
            return Err(ForgeError::FileMissing { path: source });
        }

        let scaffold = Scaffold::new(files, session.output(), session.transforms())
            .overwrite(self.overwrite.unwrap_or(session.overwrite))
            .exclude(&self.exclude)?
            .ignore(template_dir.join(&session.settings().template_config_file))
            .display_relative_to(&session.working_dir);

        let action = self.action.unwrap_or(if files.is_dir(&source) {
            CopyAction::CopyDir
        } else {
            CopyAction::CopyFile
        });
        match action {
            CopyAction::CopyDir => {
                let report = scaffold.copy_dir(&source, &target, &session.data)?;
                log::debug!(
                    "copied {} -> {}: {} created, {} skipped",
                    source.display(),
                    target.display(),
                    report.created.len(),
                    report.skipped.len()
                );
            }
            CopyAction::CopyFile => {
                scaffold.copy_file(&source, &target, &session.data)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MessageKind;
    use crate::session::testing::Harness;
    use crate::template::ActiveTemplate;
    use serde_json::json;
    use std::fs;

    fn template(harness: &Harness) -> std::path::PathBuf {
        let dir = harness.settings.template_dir("default", "widget");
        fs::create_dir_all(dir.join("src")).unwrap();
        fs::write(dir.join("config.json"), "{}").unwrap();
        fs::write(dir.join("README.md"), "{{ project_name }}").unwrap();
        fs::write(dir.join("src/lib.rs"), "// {{ project_name | snakeCase }}").unwrap();
        fs::write(dir.join("notes.log"), "log").unwrap();
        dir
    }

    fn session<'a>(harness: &'a Harness, work: &std::path::Path) -> Session<'a> {
        let mut session = Session::new(harness.services(), work);
        session.template = Some(ActiveTemplate::new(&harness.settings, "default", "widget"));
        session.data.set("project_name", "Big Widget");
        session
    }

    #[test]
    fn copies_the_whole_template_except_its_config() {
        let harness = Harness::new();
        template(&harness);
        let work = tempfile::tempdir().unwrap();
        let mut session = session(&harness, work.path());

        CopyDirective::parse(&json!({"from": ".", "to": ".", "exclude": ["*.log"]}))
            .unwrap()
            .run(&mut session)
            .unwrap();

        assert_eq!(
            fs::read_to_string(work.path().join("README.md")).unwrap(),
            "Big Widget"
        );
        assert_eq!(
            fs::read_to_string(work.path().join("src/lib.rs")).unwrap(),
            "// big_widget"
        );
        assert!(!work.path().join("config.json").exists());
        assert!(!work.path().join("notes.log").exists());
        assert!(harness
            .output
            .texts(MessageKind::Success)
            .contains(&"Created README.md".to_string()));
    }

    #[test]
    fn copies_a_single_file_to_a_rendered_name() {
        let harness = Harness::new();
        template(&harness);
        let work = tempfile::tempdir().unwrap();
        let mut session = session(&harness, work.path());

        CopyDirective::parse(&json!({
            "from": "README.md",
            "to": "docs/{{ project_name | kebabCase }}.md"
        }))
        .unwrap()
        .run(&mut session)
        .unwrap();

        assert_eq!(
            fs::read_to_string(work.path().join("docs/big-widget.md")).unwrap(),
            "Big Widget"
        );
    }

    #[test]
    fn per_directive_overwrite_wins() {
        let harness = Harness::new();
        template(&harness);
        let work = tempfile::tempdir().unwrap();
        fs::write(work.path().join("README.md"), "old").unwrap();
        let mut session = session(&harness, work.path());
        session.overwrite = false;

        CopyDirective::parse(&json!({"from": "README.md", "to": "README.md", "overwrite": true}))
            .unwrap()
            .run(&mut session)
            .unwrap();
        assert_eq!(
            fs::read_to_string(work.path().join("README.md")).unwrap(),
            "Big Widget"
        );
    }

    #[test]
    fn missing_source_is_fatal() {
        let harness = Harness::new();
        let dir = template(&harness);
        let work = tempfile::tempdir().unwrap();
        let mut session = session(&harness, work.path());

        let err = CopyDirective::parse(&json!({"from": "nope.txt", "to": "."}))
            .unwrap()
            .run(&mut session)
            .unwrap_err();
        assert!(matches!(err, ForgeError::FileMissing { path } if path == dir.join("nope.txt")));
    }

    #[test]
    fn rejects_unknown_action() {
        let err = CopyDirective::parse(&json!({"from": ".", "to": ".", "action": "move"}))
            .unwrap_err();
        assert!(matches!(err, ForgeError::InvalidSpec { .. }));
    }
}
