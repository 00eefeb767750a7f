use std::fs;
use std::path::{Path, PathBuf};

use forge::config::{ConfigFile, Settings};
use forge::error::{ForgeError, Result};
use forge::fs::LocalFiles;
use forge::output::{MessageKind, RecordingOutput};
use forge::prompt::{DefaultsPrompter, Prompter, ScriptedPrompter};
use forge::session::{CommandHost, Services, Session};
use forge::template::find_templates;
use forge::transform::TransformRegistry;
use forge::MakeOptions;
use rstest::rstest;
use serde_json::json;

fn fixture_templates() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/templates")
}

/// Handles `forge make <template>` lines from `run` directives.
struct MakeHost;

impl CommandHost for MakeHost {
    fn invoke(&self, session: &mut Session<'_>, args: &[String]) -> Result<()> {
        match args {
            [command, template, ..] if command == "make" => {
                forge::make(session, template, &MakeOptions::default())
            }
            _ => Err(ForgeError::InvalidSubcommand {
                command: args.join(" "),
                reason: "only make is supported here".into(),
            }),
        }
    }
}

struct TestEnv {
    settings: Settings,
    output: RecordingOutput,
    prompter: ScriptedPrompter,
    transforms: TransformRegistry,
    work: tempfile::TempDir,
    _home: tempfile::TempDir,
}

impl TestEnv {
    fn new() -> Self {
        let home = tempfile::tempdir().unwrap();
        Self {
            settings: Settings::with_home(home.path()).with_templates_dir(fixture_templates()),
            output: RecordingOutput::new(),
            prompter: ScriptedPrompter::new(),
            transforms: TransformRegistry::with_builtins(),
            work: tempfile::tempdir().unwrap(),
            _home: home,
        }
    }

    fn services_with<'a>(&'a self, prompter: &'a dyn Prompter) -> Services<'a> {
        Services {
            settings: &self.settings,
            files: &LocalFiles,
            output: &self.output,
            prompter,
            transforms: &self.transforms,
            host: Some(&MakeHost),
        }
    }

    fn session(&self) -> Session<'_> {
        Session::open(self.services_with(&self.prompter), self.work.path()).unwrap()
    }

    fn work(&self) -> &Path {
        self.work.path()
    }

    fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.work().join(rel)).unwrap()
    }
}

#[test]
fn test_make_renders_answers_into_files() {
    let env = TestEnv::new();
    env.prompter.push("project_name", "Widget");
    let mut session = env.session();

    forge::make(&mut session, "widget", &MakeOptions::default()).unwrap();

    assert_eq!(env.read("README.md"), "Widget");
    assert_eq!(env.read("src/widget.txt"), "slug: widget\n");
    assert!(!env.work().join("config.json").exists());
    assert_eq!(session.data.get_str("project_slug"), Some("widget"));
    assert_eq!(session.messages.len(), 1);
    assert_eq!(session.messages[0].kind, MessageKind::Success);
    assert_eq!(session.messages[0].text, "Scaffolded Widget");
    assert_eq!(env.prompter.asked_names(), vec!["project_name", "project_slug"]);
}

#[rstest]
#[case(None, true)]
#[case(Some("true"), false)]
#[case(Some("yes"), false)]
fn test_condition_gates_directive(#[case] skip_flag: Option<&str>, #[case] copied: bool) {
    let env = TestEnv::new();
    let mut session = env.session();
    let options = MakeOptions {
        data: skip_flag
            .map(|v| vec![("skip_flag".to_string(), v.to_string())])
            .unwrap_or_default(),
        ..MakeOptions::default()
    };

    forge::make(&mut session, "gated", &options).unwrap();

    assert_eq!(env.work().join("gated.txt").exists(), copied);
    if !copied {
        assert!(env.output.messages().is_empty());
    }
}

#[test]
fn test_unknown_prompt_type_warns_once_and_falls_back() {
    let env = TestEnv::new();
    let mut session = env.session();

    forge::make(&mut session, "typo", &MakeOptions::default()).unwrap();

    let warnings = env.output.texts(MessageKind::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("foo"));
    assert!(warnings[0].contains("color"));
    assert_eq!(session.data.get_str("color"), Some("blue"));
}

#[test]
fn test_prefilled_keys_are_never_prompted() {
    let env = TestEnv::new();
    let mut session = env.session();
    let options = MakeOptions {
        data: vec![("project_name".into(), "Preset".into())],
        ..MakeOptions::default()
    };

    forge::make(&mut session, "widget", &options).unwrap();

    assert!(!env.prompter.asked_names().contains(&"project_name".to_string()));
    assert_eq!(env.read("README.md"), "Preset");
}

#[test]
fn test_project_config_answers_skip_prompts() {
    let env = TestEnv::new();
    fs::write(
        env.work().join(".forge.json"),
        r#"{"project_name": "From Config"}"#,
    )
    .unwrap();
    let mut session = env.session();

    forge::make(&mut session, "widget", &MakeOptions::default()).unwrap();

    assert_eq!(env.prompter.asked_names(), vec!["project_slug"]);
    assert_eq!(env.read("src/from-config.txt"), "slug: from-config\n");
}

#[test]
fn test_existing_files_are_kept_unless_forced() {
    let env = TestEnv::new();
    fs::write(env.work().join("README.md"), "hand written").unwrap();
    let options = MakeOptions {
        data: vec![("project_name".into(), "Widget".into())],
        ..MakeOptions::default()
    };

    let mut session = env.session();
    forge::make(&mut session, "widget", &options).unwrap();
    assert_eq!(env.read("README.md"), "hand written");
    assert!(env
        .output
        .texts(MessageKind::Notice)
        .contains(&"File exists, skipping: README.md".to_string()));

    let forced = MakeOptions {
        force: true,
        ..options
    };
    forge::make(&mut session, "widget", &forced).unwrap();
    assert_eq!(env.read("README.md"), "Widget");
    assert!(!session.overwrite);
}

#[test]
fn test_execute_script_updates_data_and_messages() {
    let env = TestEnv::new();
    env.prompter.push("project_name", "Widget");
    let mut session = env.session();

    forge::make(&mut session, "scripted", &MakeOptions::default()).unwrap();

    assert_eq!(env.read("out.txt"), "WIDGET");
    assert_eq!(session.data.get_str("shout"), Some("WIDGET"));
    assert!(session
        .messages
        .iter()
        .any(|m| m.kind == MessageKind::Info && m.text == "scripted WIDGET"));
}

#[test]
fn test_nested_make_shares_data_and_restores_template() {
    let env = TestEnv::new();
    env.prompter.push("project_name", "Widget");
    let mut session = env.session();

    forge::make(&mut session, "nested", &MakeOptions::default()).unwrap();

    // The nested widget template reused the answer instead of asking again.
    assert_eq!(env.prompter.asked_names(), vec!["project_name", "project_slug"]);
    assert_eq!(env.read("README.md"), "Widget");
    let nested_dir = fixture_templates().join("default/nested");
    assert_eq!(env.read("after.txt"), nested_dir.to_string_lossy());
    assert!(session.template.is_none());
    assert!(!session.data.has("template_dir"));
    assert_eq!(session.namespace.as_deref(), Some("default"));
}

#[test]
fn test_explicit_namespace() {
    let env = TestEnv::new();
    let mut session = env.session();
    let options = MakeOptions {
        data: vec![("project_name".into(), "Widget".into())],
        ..MakeOptions::default()
    };

    forge::make(&mut session, "acme:widget", &options).unwrap();

    assert_eq!(env.read("acme.txt"), "acme Widget");
    assert_eq!(session.namespace.as_deref(), Some("acme"));
}

#[test]
fn test_missing_template_is_searched_in_other_namespaces() {
    let env = TestEnv::new();
    env.prompter
        .push("Are you sure you want to use this template?", true);
    let mut session = env.session();

    forge::make(&mut session, "badge", &MakeOptions::default()).unwrap();

    assert!(env.work().join("badge.svg").exists());
    let warnings = env.output.texts(MessageKind::Warning);
    assert!(warnings[0].starts_with("Unable to find template at:"));
    assert_eq!(
        warnings[1],
        "Attempting to locate template from another location..."
    );
    assert!(env.output.texts(MessageKind::Success)[0].starts_with("Found template at:"));
}

#[test]
fn test_unknown_template_is_not_found() {
    let env = TestEnv::new();
    let mut session = env.session();
    let err = forge::make(&mut session, "nothing-here", &MakeOptions::default()).unwrap_err();
    assert!(matches!(err, ForgeError::TemplateNotFound { name } if name == "default:nothing-here"));
}

#[test]
fn test_template_without_config_fails() {
    let env = TestEnv::new();
    let mut session = env.session();
    let err = forge::make(&mut session, "noconfig", &MakeOptions::default()).unwrap_err();
    assert!(matches!(err, ForgeError::TemplateConfigMissing { .. }));
}

#[test]
fn test_invalid_directive_fails_before_anything_happens() {
    let env = TestEnv::new();
    let mut session = env.session();
    let err = forge::make(&mut session, "broken", &MakeOptions::default()).unwrap_err();

    assert!(matches!(err, ForgeError::UnknownDirective { name } if name == "teleport"));
    assert!(env.prompter.asked_names().is_empty());
    assert!(!env.work().join("file.txt").exists());
}

#[test]
fn test_defaults_prompter_needs_defaults() {
    let env = TestEnv::new();
    let mut session =
        Session::open(env.services_with(&DefaultsPrompter), env.work()).unwrap();
    let err = forge::make(&mut session, "widget", &MakeOptions::default()).unwrap_err();
    assert!(matches!(err, ForgeError::NoDefault { name } if name == "project_name"));
}

#[test]
fn test_find_templates_lists_fixture_templates() {
    let env = TestEnv::new();
    let ids: Vec<String> = find_templates(&env.settings)
        .unwrap()
        .iter()
        .map(|t| t.id())
        .collect();
    assert_eq!(
        ids,
        vec![
            "acme:badge",
            "acme:widget",
            "default:broken",
            "default:gated",
            "default:nested",
            "default:scripted",
            "default:typo",
            "default:widget",
        ]
    );
}

#[test]
fn test_init_then_make_uses_saved_answers() {
    let env = TestEnv::new();
    env.prompter.push("project_name", "Acme Widget");
    env.prompter.push("vendor_name", "acme");
    let mut session = env.session();
    forge::project::init(&mut session, false).unwrap();

    let mut saved = ConfigFile::project(&env.settings, &env.work().canonicalize().unwrap());
    saved.parse().unwrap();
    assert_eq!(
        saved.data().get("prefixes"),
        Some(&json!({
            "long": "AcmeWidget",
            "short": "AW",
            "function": "aw_",
            "constant": "AW_",
            "meta": "aw_",
            "slug": "aw-"
        }))
    );

    let fresh = TestEnv::new();
    fs::copy(saved.file_path(), fresh.work().join(".forge.json")).unwrap();
    let mut session = fresh.session();
    forge::make(&mut session, "widget", &MakeOptions::default()).unwrap();
    assert_eq!(fresh.read("README.md"), "Acme Widget");
}
