//! Session lifecycle and the report-generation pipeline.

pub mod classifier;
pub mod report_pipeline;
pub mod session_manager;
pub mod template_stager;
pub mod trigger;

pub use report_pipeline::ReportPipeline;
pub use session_manager::SessionManager;
pub use template_stager::{StagedTemplate, TemplateStager};
pub use trigger::{Schedule, Trigger};
