use console::style;
use forge::error::Result;
use forge::session::Session;
use forge::template::authoring::create_template_config;
use forge::template::find_templates;

use crate::cli::TemplateCommands;

pub fn run(session: &mut Session<'_>, command: TemplateCommands) -> Result<()> {
    let settings = session.settings();
    let output = session.output();

    match command {
        TemplateCommands::Create { force } => {
            create_template_config(
                &session.working_dir,
                settings,
                session.services.prompter,
                session.transforms(),
                output,
                force,
            )?;
            Ok(())
        }
        TemplateCommands::List => {
            let templates = find_templates(settings)?;
            if templates.is_empty() {
                output.out(&format!(
                    "No templates found in {}",
                    settings.templates_dir.display()
                ));
                return Ok(());
            }
            output.out(&format!(
                "{} ({} template{})",
                style("Installed templates").bold(),
                templates.len(),
                if templates.len() == 1 { "" } else { "s" }
            ));
            for template in templates {
                output.out(&format!(
                    "  {}  {}",
                    style(template.id()).cyan(),
                    style(template.dir.display()).dim()
                ));
            }
            Ok(())
        }
    }
}
