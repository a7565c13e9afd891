use crate::api::EnovaBackend;
use crate::config::ReportConfig;
use crate::error::{PrintoutError, RenderFailure};
use crate::service::classifier::classify;
use crate::service::template_stager::{StagedTemplate, TemplateStager};
use crate::types::{ReportFormat, ReportOutcome, ReportRequest, Session};
use std::fs::Permissions;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Stages the template, renders it through the backend and persists the
/// document.
///
/// Every run ends with the staged template removed, whatever the outcome.
/// The output file is only touched after a non-empty document was received.
pub struct ReportPipeline {
    template_path: PathBuf,
    output_path: PathBuf,
    format: ReportFormat,
    render_timeout: Duration,
    stager: TemplateStager,
    run_lock: Mutex<()>,
}

impl ReportPipeline {
    pub fn new(cfg: &ReportConfig) -> Self {
        Self {
            template_path: cfg.template_path.clone(),
            output_path: cfg.output_path.clone(),
            format: cfg.format,
            render_timeout: Duration::from_secs(cfg.render_timeout_secs),
            stager: TemplateStager::new(cfg.temp_dir.clone()),
            run_lock: Mutex::new(()),
        }
    }

    pub fn with_render_timeout(mut self, render_timeout: Duration) -> Self {
        self.render_timeout = render_timeout;
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Execute one run and return the persisted document.
    pub async fn run<B: EnovaBackend>(
        &self,
        backend: &B,
        session: &Session,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, PrintoutError> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| PrintoutError::RunInProgress)?;
        let started = Instant::now();
        info!(
            template = %self.template_path.display(),
            format = %self.format,
            "Report run started"
        );

        let staged = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(PrintoutError::ReportGeneration(RenderFailure::Cancelled));
            }
            staged = self.stager.stage(&self.template_path) => staged?,
        };

        let rendered = self.render(backend, session, &staged, cancel).await;
        let outcome = classify(rendered);
        self.stager.cleanup(staged);

        let payload = match outcome {
            ReportOutcome::Success(payload) => payload,
            ReportOutcome::Failure(failure) => {
                error!(
                    error = %failure,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Report generation failed"
                );
                return Err(PrintoutError::ReportGeneration(failure));
            }
        };

        if cancel.is_cancelled() {
            return Err(PrintoutError::ReportGeneration(RenderFailure::Cancelled));
        }
        persist(&self.output_path, &payload).await?;
        info!(
            output = %self.output_path.display(),
            bytes = payload.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Report persisted"
        );
        Ok(payload)
    }

    async fn render<B: EnovaBackend>(
        &self,
        backend: &B,
        session: &Session,
        staged: &StagedTemplate,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, RenderFailure> {
        let request = ReportRequest::new(session, staged.path(), self.format);
        debug!(
            session = %session.id,
            staged = %staged.path().display(),
            timeout_secs = self.render_timeout.as_secs_f64(),
            "Invoking enova render"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RenderFailure::Cancelled),
            rendered = tokio::time::timeout(self.render_timeout, backend.render(&request)) => {
                match rendered {
                    Ok(Ok(payload)) => Ok(payload),
                    Ok(Err(e)) => Err(e.into()),
                    Err(_) => Err(RenderFailure::TimedOut(self.render_timeout)),
                }
            }
        }
    }
}

/// Write the document next to its destination, then rename it into place so
/// the destination never holds a partial file.
///
/// The replacement keeps the mode of the file it replaces; a new file is
/// world-readable rather than inheriting the owner-only temp file mode.
async fn persist(output: &Path, payload: &[u8]) -> Result<(), PrintoutError> {
    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let partial = tempfile::Builder::new()
        .prefix(".printout-")
        .tempfile_in(dir)?
        .into_temp_path();
    tokio::fs::write(&partial, payload).await?;

    let permissions = match tokio::fs::metadata(output).await {
        Ok(meta) => Some(meta.permissions()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => new_file_permissions(),
        Err(e) => return Err(e.into()),
    };
    if let Some(permissions) = permissions {
        tokio::fs::set_permissions(&partial, permissions).await?;
    }

    partial.persist(output).map_err(|e| PrintoutError::Io(e.error))?;
    Ok(())
}

#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}
