use std::path::Path;
use std::sync::OnceLock;

use regex_lite::Regex;
use serde_json::{json, Map, Value};

use crate::config::{ConfigFile, Settings};
use crate::error::{ForgeError, Result};
use crate::output::Output;
use crate::prompt::{PromptKind, PromptPipeline, Prompter};
use crate::store::DataStore;
use crate::transform::TransformRegistry;

/// Questions asked for every prompt added to a new template.
fn field_prompts() -> Vec<Value> {
    vec![
        json!({"name": "message", "message": "Message to show the user"}),
        json!({"name": "name", "message": "Internal field name (used for replacements)"}),
        json!({
            "name": "type",
            "message": "Select a field type",
            "type": "radio",
            "default": "input",
            "options": {
                "input": "Text input (single line)",
                "multiline": "Text input (multi-line)",
                "password": "Password",
                "confirm": "Yes or no",
                "enum": "Pick one (text)",
                "radio": "Pick one (radio)",
                "checkboxes": "Pick many (checkboxes)"
            }
        }),
    ]
}

/// Walk the operator through writing a template `config.json` in `dir`.
pub fn create_template_config(
    dir: &Path,
    settings: &Settings,
    prompter: &dyn Prompter,
    transforms: &TransformRegistry,
    output: &dyn Output,
    force: bool,
) -> Result<ConfigFile> {
    let mut config = ConfigFile::template(settings, dir);
    if config.file_path().exists() && !force {
        return Err(ForgeError::InvalidSubcommand {
            command: "template create".into(),
            reason: format!(
                "{} already exists, add --force to overwrite it",
                config.file_path().display()
            ),
        });
    }

    let mut prompts = Vec::new();
    if prompter.confirm("Would you like to request data from the user?", false)? {
        let pipeline = PromptPipeline::parse(&field_prompts(), transforms, output)?;
        loop {
            prompts.push(ask_field(&pipeline, prompter, transforms)?);
            if !prompter.confirm("Add another prompt?", false)? {
                break;
            }
        }
    }

    let mut directives = Vec::new();
    if prompter.confirm("Copy all template files into the project?", true)? {
        directives.push(json!({"directive": "copy", "from": ".", "to": "."}));
    }

    let data = config.data_mut();
    data.set("prompts", prompts);
    data.set("directives", directives);
    data.set("messages", Vec::<Value>::new());
    config.save()?;
    output.success(&format!("Created {}", config.file_path().display()));
    Ok(config)
}

fn ask_field(
    pipeline: &PromptPipeline,
    prompter: &dyn Prompter,
    transforms: &TransformRegistry,
) -> Result<Value> {
    let mut field = DataStore::new();
    pipeline.collect(&mut field, prompter, transforms)?;

    let kind = field
        .get_str("type")
        .and_then(PromptKind::from_name)
        .unwrap_or(PromptKind::Input);

    if kind == PromptKind::Input && prompter.confirm("Set a default value?", false)? {
        let default = prompter.input("Default value", None)?;
        field.set("default", default);
    }
    if kind.needs_options() {
        let list = prompter.input(
            "Provide a comma separated list of options (use \"key > value\" syntax to set keys)",
            None,
        )?;
        field.set("options", parse_options(&list));
    }
    Ok(field.to_value())
}

/// Parse `a > Apple, b > Banana, Cherry` into an option map. An entry without
/// a key uses its label as the key.
pub fn parse_options(list: &str) -> Map<String, Value> {
    static ENTRY: OnceLock<Regex> = OnceLock::new();
    let entry = ENTRY.get_or_init(|| {
        Regex::new(r"^\s*(?:(?P<key>[^>]*?)\s*>\s*)?(?P<label>.*?)\s*$").expect("valid regex")
    });

    let mut options = Map::new();
    for item in list.split(',') {
        let Some(caps) = entry.captures(item) else {
            continue;
        };
        let label = caps.name("label").map_or("", |m| m.as_str());
        if label.is_empty() {
            continue;
        }
        let key = caps
            .name("key")
            .map(|m| m.as_str())
            .filter(|k| !k.is_empty())
            .unwrap_or(label);
        options.insert(key.to_string(), Value::String(label.to_string()));
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::RecordingOutput;
    use crate::prompt::ScriptedPrompter;
    use rstest::rstest;

    #[rstest]
    #[case("a > Apple, b > Banana", json!({"a": "Apple", "b": "Banana"}))]
    #[case("Cherry,  Damson ", json!({"Cherry": "Cherry", "Damson": "Damson"}))]
    #[case("x>Y, , z", json!({"x": "Y", "z": "z"}))]
    #[case("", json!({}))]
    fn parses_option_lists(#[case] list: &str, #[case] expected: Value) {
        assert_eq!(Value::Object(parse_options(list)), expected);
    }

    #[test]
    fn writes_prompts_and_copy_directive() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::with_home(dir.path().join("home"));
        let prompter = ScriptedPrompter::new()
            .answer("Would you like to request data from the user?", true)
            .answer("message", "Project name")
            .answer("name", "project_name")
            .answer("type", "input")
            .answer("Set a default value?", true)
            .answer("Default value", "Widget")
            .answer("Add another prompt?", true)
            .answer("message", "Flavour")
            .answer("name", "flavour")
            .answer("type", "radio")
            .answer(
                "Provide a comma separated list of options (use \"key > value\" syntax to set keys)",
                "v > Vanilla, c > Chocolate",
            )
            .answer("Add another prompt?", false)
            .answer("Copy all template files into the project?", true);
        let output = RecordingOutput::new();

        let config = create_template_config(
            dir.path(),
            &settings,
            &prompter,
            &TransformRegistry::with_builtins(),
            &output,
            false,
        )
        .unwrap();

        let mut saved = ConfigFile::template(&settings, dir.path());
        saved.parse().unwrap();
        assert_eq!(saved.data(), config.data());
        assert_eq!(
            saved.data().to_value(),
            json!({
                "prompts": [
                    {"message": "Project name", "name": "project_name", "type": "input", "default": "Widget"},
                    {"message": "Flavour", "name": "flavour", "type": "radio",
                     "options": {"v": "Vanilla", "c": "Chocolate"}}
                ],
                "directives": [{"directive": "copy", "from": ".", "to": "."}],
                "messages": []
            })
        );
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        let settings = Settings::with_home(dir.path().join("home"));
        let result = create_template_config(
            dir.path(),
            &settings,
            &ScriptedPrompter::new(),
            &TransformRegistry::with_builtins(),
            &RecordingOutput::new(),
            false,
        );
        assert!(matches!(result, Err(ForgeError::InvalidSubcommand { .. })));
    }
}
