use crate::error::PrintoutError;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, warn};

/// A byte-identical copy of a template in the temp namespace.
///
/// The file is removed by [`TemplateStager::cleanup`]; if the value is dropped
/// first (early return, cancellation), the drop removes it instead.
#[derive(Debug)]
pub struct StagedTemplate {
    path: TempPath,
}

impl StagedTemplate {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Copies templates into ephemeral files the render call can consume.
#[derive(Debug, Clone, Default)]
pub struct TemplateStager {
    temp_dir: Option<PathBuf>,
}

impl TemplateStager {
    /// `temp_dir` overrides the platform temporary directory.
    pub fn new(temp_dir: Option<PathBuf>) -> Self {
        Self { temp_dir }
    }

    pub async fn stage(&self, template: &Path) -> Result<StagedTemplate, PrintoutError> {
        match self.copy_to_temp(template).await {
            Ok(staged) => {
                debug!(
                    template = %template.display(),
                    staged = %staged.path().display(),
                    "template staged"
                );
                Ok(staged)
            }
            Err(source) => {
                warn!(
                    template = %template.display(),
                    error = %source,
                    "failed to stage template into a temporary file"
                );
                Err(PrintoutError::Staging {
                    path: template.to_path_buf(),
                    source,
                })
            }
        }
    }

    /// Delete the staged copy. A failed delete is logged, never raised.
    pub fn cleanup(&self, staged: StagedTemplate) {
        let shown = staged.path().display().to_string();
        match staged.path.close() {
            Ok(()) => debug!(staged = %shown, "staged template removed"),
            Err(e) => warn!(staged = %shown, error = %e, "failed to remove staged template"),
        }
    }

    async fn copy_to_temp(&self, template: &Path) -> std::io::Result<StagedTemplate> {
        let content = tokio::fs::read(template).await?;

        let suffix = template
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()));
        let mut builder = tempfile::Builder::new();
        builder.prefix("printout-");
        if let Some(suffix) = suffix.as_deref() {
            builder.suffix(suffix);
        }
        let file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        let path = file.into_temp_path();
        tokio::fs::write(&path, &content).await?;
        Ok(StagedTemplate { path })
    }
}
