pub mod api;
pub mod config;
pub mod error;
pub mod service;
pub mod shutdown;
pub mod types;

pub use api::{EnovaApi, EnovaBackend};
pub use error::{PrintoutError, RenderFailure};
pub use service::{ReportPipeline, SessionManager};
