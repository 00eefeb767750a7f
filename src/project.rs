use std::path::PathBuf;

use serde_json::{json, Value};

use crate::config::ConfigFile;
use crate::error::{ForgeError, Result};
use crate::prompt::PromptPipeline;
use crate::session::Session;
use crate::store::DataStore;

/// The questions `init` asks, in order. Later defaults build on earlier
/// answers.
fn project_prompts(working_dir: &str, dir_name: &str) -> Vec<Value> {
    vec![
        json!({
            "name": "project_root", "message": "Project root path",
            "default": working_dir, "transform": "realpath"
        }),
        json!({"name": "project_name", "message": "Project name"}),
        json!({"name": "vendor_name", "message": "Vendor name"}),
        json!({
            "name": "package_name", "message": "Package name",
            "default": "{{ project_name }}", "transform_default": "kebabCase"
        }),
        json!({"name": "text_domain", "message": "Project text domain", "default": dir_name}),
        json!({
            "name": "namespace", "message": "Project namespace",
            "default": "{{ project_name }}", "transform_default": "pascalCase"
        }),
        json!({
            "name": "prefixes.long", "message": "Long prefix",
            "default": "{{ project_name }}", "transform_default": "pascalCase"
        }),
        json!({
            "name": "prefixes.short", "message": "Short prefix",
            "default": "{{ project_name }}", "transform_default": "abbreviate"
        }),
        json!({
            "name": "prefixes.function", "message": "Function prefix",
            "default": "{{ prefixes.short }}_", "transform_default": "lowercase"
        }),
        json!({
            "name": "prefixes.constant", "message": "Constant prefix",
            "default": "{{ prefixes.short }}_", "transform_default": "uppercase"
        }),
        json!({
            "name": "prefixes.meta", "message": "Meta prefix (used for post meta, options, etc.)",
            "default": "{{ prefixes.short }}_", "transform_default": "lowercase"
        }),
        json!({
            "name": "prefixes.slug",
            "message": "Slug prefix (used for post types and taxonomy names)",
            "default": "{{ prefixes.short }}-", "transform_default": "lowercase"
        }),
    ]
}

/// Ask for the project details and write them to the project config at the
/// chosen project root.
pub fn init(session: &mut Session<'_>, force: bool) -> Result<ConfigFile> {
    let services = session.services;
    let existing = ConfigFile::project(services.settings, &session.working_dir);
    if existing.has_config() && !existing.is_global(services.settings) && !force {
        services.output.error("A project config already exists!");
        if !services
            .prompter
            .confirm("Do you want to force overwrite?", false)?
        {
            return Err(ForgeError::UserAbort);
        }
    }

    let working_dir = session.working_dir.to_string_lossy().into_owned();
    let dir_name = session
        .working_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let pipeline = PromptPipeline::parse(
        &project_prompts(&working_dir, &dir_name),
        services.transforms,
        services.output,
    )?;

    let mut answers = DataStore::new();
    pipeline.collect(&mut answers, services.prompter, services.transforms)?;

    let project_root = answers
        .forget("project_root")
        .map(|root| PathBuf::from(crate::store::display_value(&root)))
        .filter(|root| !root.as_os_str().is_empty())
        .unwrap_or_else(|| session.working_dir.clone());
    let project_root = crate::fs::join_path(&session.working_dir, project_root);

    let config = ConfigFile::project(services.settings, &project_root).with_data(answers);
    if config.is_global(services.settings) {
        return Err(ForgeError::InvalidSpec {
            kind: "project",
            reason: format!(
                "{} is the global config, pick a project root other than the home directory",
                config.file_path().display()
            ),
        });
    }
    config.save()?;
    services.output.success(&format!(
        "Project config saved to {}",
        config.file_path().display()
    ));

    session.project_root = project_root;
    session.data.merge(config.data());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use crate::session::testing::Harness;

    fn harness() -> Harness {
        let mut harness = Harness::new();
        harness.prompter = ScriptedPrompter::new()
            .answer("project_name", "Acme Widget Factory")
            .answer("vendor_name", "acme");
        harness
    }

    #[test]
    fn derives_defaults_from_earlier_answers() {
        let harness = harness();
        let work = tempfile::tempdir().unwrap();
        let mut session = Session::new(harness.services(), work.path());

        let config = init(&mut session, false).unwrap();
        let data = config.data();
        assert_eq!(data.get_str("package_name"), Some("acme-widget-factory"));
        assert_eq!(data.get_str("namespace"), Some("AcmeWidgetFactory"));
        assert_eq!(data.get_str("prefixes.long"), Some("AcmeWidgetFactory"));
        assert_eq!(data.get_str("prefixes.short"), Some("AWF"));
        assert_eq!(data.get_str("prefixes.function"), Some("awf_"));
        assert_eq!(data.get_str("prefixes.constant"), Some("AWF_"));
        assert_eq!(data.get_str("prefixes.meta"), Some("awf_"));
        assert_eq!(data.get_str("prefixes.slug"), Some("awf-"));
        assert!(!data.has("project_root"));
    }

    #[test]
    fn saves_to_the_chosen_project_root() {
        let harness = harness();
        let work = tempfile::tempdir().unwrap();
        let root = work.path().join("site");
        std::fs::create_dir_all(&root).unwrap();
        harness
            .prompter
            .push("project_root", root.to_string_lossy().into_owned());
        let mut session = Session::new(harness.services(), work.path());

        init(&mut session, false).unwrap();
        let mut saved = ConfigFile::project(&harness.settings, &root.canonicalize().unwrap());
        saved.parse().unwrap();
        assert_eq!(saved.data().get_str("vendor_name"), Some("acme"));
        assert_eq!(session.data.get_str("project_name"), Some("Acme Widget Factory"));
    }

    #[test]
    fn declining_overwrite_aborts() {
        let harness = harness();
        let work = tempfile::tempdir().unwrap();
        std::fs::write(work.path().join(".forge.json"), r#"{"project_name": "Old"}"#).unwrap();
        let mut session = Session::new(harness.services(), work.path());

        let err = init(&mut session, false).unwrap_err();
        assert!(matches!(err, ForgeError::UserAbort));
        assert!(harness.prompter.asked_names() == vec!["Do you want to force overwrite?"]);
    }

    #[test]
    fn force_skips_the_question() {
        let harness = harness();
        let work = tempfile::tempdir().unwrap();
        std::fs::write(work.path().join(".forge.json"), r#"{"project_name": "Old"}"#).unwrap();
        let mut session = Session::new(harness.services(), work.path());

        init(&mut session, true).unwrap();
        assert!(!harness
            .prompter
            .asked_names()
            .contains(&"Do you want to force overwrite?".to_string()));
    }

    #[test]
    fn refuses_to_write_over_the_global_config() {
        let harness = harness();
        let mut global = ConfigFile::global(&harness.settings);
        global
            .data_mut()
            .set("templates.default.url", "https://example.com/t.git");
        global.save().unwrap();
        let mut session = Session::new(harness.services(), harness.home.path());

        let err = init(&mut session, false).unwrap_err();
        assert!(matches!(err, ForgeError::InvalidSpec { kind: "project", .. }));

        let mut reloaded = ConfigFile::global(&harness.settings);
        reloaded.parse().unwrap();
        assert!(reloaded.data().has("templates.default.url"));
        assert!(!reloaded.data().has("project_name"));
    }
}
