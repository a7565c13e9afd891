//! Domain types shared by the session manager, the backend client and the
//! report pipeline.

pub mod credentials;
pub mod report;
pub mod session;

pub use credentials::Credentials;
pub use report::{ReportFormat, ReportOutcome, ReportRequest, TemplateSource};
pub use session::{Connection, RuntimeInfo, Session};
