use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::{ForgeError, Result};
use crate::fs::FileStore;
use crate::output::Output;
use crate::render::{render_content, render_path};
use crate::store::DataStore;
use crate::transform::TransformRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Created,
    Skipped,
}

/// Files touched by one copy, as target paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub created: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

impl CopyReport {
    fn record(&mut self, outcome: CopyOutcome, target: PathBuf) {
        match outcome {
            CopyOutcome::Created => self.created.push(target),
            CopyOutcome::Skipped => self.skipped.push(target),
        }
    }
}

/// Copies template files into a project, rendering contents and names.
pub struct Scaffold<'a> {
    files: &'a dyn FileStore,
    output: &'a dyn Output,
    transforms: &'a TransformRegistry,
    overwrite: bool,
    exclude: GlobSet,
    ignored: Vec<PathBuf>,
    display_base: Option<PathBuf>,
}

impl<'a> Scaffold<'a> {
    pub fn new(
        files: &'a dyn FileStore,
        output: &'a dyn Output,
        transforms: &'a TransformRegistry,
    ) -> Self {
        Self {
            files,
            output,
            transforms,
            overwrite: false,
            exclude: GlobSet::empty(),
            ignored: Vec::new(),
            display_base: None,
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Skip sources whose path relative to the copied directory matches any
    /// of `patterns`.
    pub fn exclude(mut self, patterns: &[String]) -> Result<Self> {
        self.exclude = build_glob_set(patterns)?;
        Ok(self)
    }

    /// Never copy this exact source path.
    pub fn ignore(mut self, source: impl Into<PathBuf>) -> Self {
        self.ignored.push(source.into());
        self
    }

    /// Report target paths relative to `base` when they live under it.
    pub fn display_relative_to(mut self, base: impl Into<PathBuf>) -> Self {
        self.display_base = Some(base.into());
        self
    }

    /// Copy every file below `from` into `to`, depth first, keeping the
    /// relative layout. Path components are rendered too.
    pub fn copy_dir(&self, from: &Path, to: &Path, data: &DataStore) -> Result<CopyReport> {
        let mut report = CopyReport::default();
        let mut pending = vec![PathBuf::new()];

        while let Some(rel_dir) = pending.pop() {
            let mut subdirs = Vec::new();
            for source in self.files.list(&from.join(&rel_dir))? {
                let Some(name) = source.file_name() else {
                    continue;
                };
                let rel = rel_dir.join(name);
                if self.skips(&source, &rel) {
                    log::trace!("not copying {}", source.display());
                    continue;
                }
                if self.files.is_dir(&source) {
                    subdirs.push(rel);
                    continue;
                }

                let target = to.join(render_path(&rel, data, self.transforms)?);
                let outcome = self.copy_file(&source, &target, data)?;
                report.record(outcome, target);
            }
            pending.extend(subdirs.into_iter().rev());
        }

        Ok(report)
    }

    /// Copy one file, rendering its content. An existing target is left alone
    /// unless overwriting, and the source is not read in that case.
    pub fn copy_file(&self, from: &Path, to: &Path, data: &DataStore) -> Result<CopyOutcome> {
        if self.files.exists(to) && !self.overwrite {
            self.output
                .notice(&format!("File exists, skipping: {}", self.shown(to)));
            return Ok(CopyOutcome::Skipped);
        }
        if !self.files.exists(from) {
            return Err(ForgeError::FileMissing {
                path: from.to_path_buf(),
            });
        }

        let content = self.files.read(from)?;
        let rendered = render_content(content, data, self.transforms)?;
        self.files.write(to, &rendered)?;
        self.output.success(&format!("Created {}", self.shown(to)));
        Ok(CopyOutcome::Created)
    }

    fn skips(&self, source: &Path, rel: &Path) -> bool {
        self.ignored.iter().any(|ignored| ignored == source) || self.exclude.is_match(rel)
    }

    fn shown(&self, path: &Path) -> String {
        self.display_base
            .as_deref()
            .and_then(|base| path.strip_prefix(base).ok())
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ForgeError::GlobPattern {
            pattern: pattern.clone(),
            source: e,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ForgeError::GlobPattern {
        pattern: "<combined>".into(),
        source: e,
    })
}
