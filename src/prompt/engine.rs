use serde_json::Value;

use crate::error::Result;
use crate::output::Output;
use crate::prompt::spec::PromptSpec;
use crate::prompt::{PromptRequest, Prompter};
use crate::render::{has_placeholders, render};
use crate::store::DataStore;
use crate::transform::TransformRegistry;

/// An ordered list of validated prompts from one template config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptPipeline {
    specs: Vec<PromptSpec>,
}

impl PromptPipeline {
    /// Validate every entry. An unknown prompt type is reported once on
    /// `output` and treated as plain input; anything else invalid is an error.
    pub fn parse(
        entries: &[Value],
        transforms: &TransformRegistry,
        output: &dyn Output,
    ) -> Result<Self> {
        let mut specs = Vec::with_capacity(entries.len());
        for entry in entries {
            let spec = PromptSpec::parse(entry)?;
            if spec.is_fallback() {
                output.warning(&format!(
                    "Prompt type '{}' not found for: {}; defaulting to 'input'",
                    spec.type_name, spec.name
                ));
            }
            transforms.ensure_known(spec.transform.names())?;
            transforms.ensure_known(spec.transform_default.names())?;
            specs.push(spec);
        }
        Ok(Self { specs })
    }

    pub fn specs(&self) -> &[PromptSpec] {
        &self.specs
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Ask every prompt whose key is not yet in `data`, in order, storing each
    /// answer before the next prompt resolves its default.
    pub fn collect(
        &self,
        data: &mut DataStore,
        prompter: &dyn Prompter,
        transforms: &TransformRegistry,
    ) -> Result<()> {
        for spec in &self.specs {
            if data.has(&spec.name) {
                log::debug!("prompt '{}' already answered, skipping", spec.name);
                continue;
            }

            let default = resolve_default(spec, data, transforms)?;
            let mut request = PromptRequest::new(&spec.name, spec.kind, &spec.message)
                .with_choices(&spec.options);
            request.default = default;

            let answer = prompter.ask(&request)?;
            let value = transforms.apply(answer, spec.transform.names())?;
            log::trace!("prompt '{}' answered", spec.name);
            data.set(&spec.name, value);
        }
        Ok(())
    }
}

fn resolve_default(
    spec: &PromptSpec,
    data: &DataStore,
    transforms: &TransformRegistry,
) -> Result<Option<Value>> {
    let Some(default) = &spec.default else {
        return Ok(None);
    };

    let rendered = match default {
        Value::String(text) if has_placeholders(text) => {
            Value::String(render(text, data, transforms)?)
        }
        other => other.clone(),
    };
    transforms
        .apply(rendered, spec.transform_default.names())
        .map(Some)
}
