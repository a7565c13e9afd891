use crate::error::RenderFailure;
use crate::types::session::Session;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Output document format requested from the render service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Pdf,
    Html,
    Xlsx,
    Docx,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Html => "html",
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Docx => "docx",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Where the render service reads the template from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateSource {
    /// Template content is shipped with the request.
    Local,
}

/// A single render request. Borrows the session and the staged template, so it
/// cannot outlive the run that built it.
#[derive(Debug)]
pub struct ReportRequest<'a> {
    session: &'a Session,
    template: &'a Path,
    source: TemplateSource,
    format: ReportFormat,
}

impl<'a> ReportRequest<'a> {
    pub fn new(session: &'a Session, template: &'a Path, format: ReportFormat) -> Self {
        Self {
            session,
            template,
            source: TemplateSource::Local,
            format,
        }
    }

    pub fn session(&self) -> &Session {
        self.session
    }

    pub fn template(&self) -> &Path {
        self.template
    }

    pub fn source(&self) -> TemplateSource {
        self.source
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }
}

/// Result of one render attempt after classification.
#[derive(Debug)]
pub enum ReportOutcome {
    Success(Vec<u8>),
    Failure(RenderFailure),
}

impl ReportOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ReportOutcome::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parses_lowercase() {
        let fmt: ReportFormat = serde_json::from_str("\"xlsx\"").unwrap();
        assert_eq!(fmt, ReportFormat::Xlsx);
        assert_eq!(serde_json::to_string(&ReportFormat::Pdf).unwrap(), "\"pdf\"");
        assert_eq!(ReportFormat::default().to_string(), "pdf");
    }

    #[test]
    fn request_is_bound_to_local_source() {
        let session = Session {
            id: "s-1".to_string(),
            user: "Administrator".to_string(),
            database: "Demo".to_string(),
        };
        let path = Path::new("/tmp/printout-abc.aspx");
        let request = ReportRequest::new(&session, path, ReportFormat::Pdf);
        assert_eq!(request.session().id, "s-1");
        assert_eq!(request.template(), path);
        assert_eq!(request.source(), TemplateSource::Local);
        assert_eq!(request.format(), ReportFormat::Pdf);
    }
}
