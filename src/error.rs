use reqwest::StatusCode;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum PrintoutError {
    #[error("enova initialization failed: {0}")]
    Initialization(String),

    #[error("enova not initialized")]
    NotInitialized,

    #[error("failed to stage template {}: {source}", .path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("report generation failed: {0}")]
    ReportGeneration(RenderFailure),

    #[error("a report run is already in progress")]
    RunInProgress,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("enova error ({status}) {code}: {message}")]
    Backend {
        status: StatusCode,
        code: String,
        message: String,
    },
}

impl PrintoutError {
    /// Build an error from a non-success backend response body.
    /// Falls back to the bare status when the body is not an enova error document.
    pub fn from_error_body(status: StatusCode, body: &[u8]) -> Self {
        match serde_json::from_slice::<EnovaError>(body) {
            Ok(err) => PrintoutError::Backend {
                status,
                code: err.error.code,
                message: err.error.message,
            },
            Err(_) => PrintoutError::UpstreamStatus(status),
        }
    }

    /// True when the backend refused the caller's identity.
    pub fn is_auth_rejection(&self) -> bool {
        let status = match self {
            PrintoutError::Backend { status, .. } => *status,
            PrintoutError::UpstreamStatus(status) => *status,
            _ => return false,
        };
        status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
    }
}

/// Why a render attempt did not produce a document.
#[derive(Debug, ThisError)]
pub enum RenderFailure {
    #[error(transparent)]
    Backend(Box<PrintoutError>),

    #[error("backend returned an empty document")]
    EmptyPayload,

    #[error("render cancelled")]
    Cancelled,

    #[error("render timed out after {0:?}")]
    TimedOut(Duration),
}

impl From<PrintoutError> for RenderFailure {
    fn from(e: PrintoutError) -> Self {
        RenderFailure::Backend(Box::new(e))
    }
}

/// enova gateway error response structure
#[derive(Deserialize, Debug)]
pub struct EnovaError {
    pub error: EnovaErrorBody,
}

#[derive(Deserialize, Debug)]
pub struct EnovaErrorBody {
    pub code: String,
    pub message: String,
}
