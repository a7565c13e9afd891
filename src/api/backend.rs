use crate::error::PrintoutError;
use crate::types::{Connection, Credentials, ReportRequest, RuntimeInfo, Session};
use std::future::Future;

/// Operations consumed from the enova backend.
///
/// The session manager drives the lifecycle calls and the report pipeline
/// drives `render`. Implementations report raw transport or backend errors;
/// callers decide how each one is classified.
pub trait EnovaBackend: Send + Sync {
    /// Load backend-side runtime dependencies.
    fn load_runtime(&self) -> impl Future<Output = Result<RuntimeInfo, PrintoutError>> + Send;

    fn open_database(
        &self,
        database: &str,
    ) -> impl Future<Output = Result<Connection, PrintoutError>> + Send;

    fn login(
        &self,
        connection: &Connection,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Session, PrintoutError>> + Send;

    /// Render the staged template and return the document bytes.
    fn render(
        &self,
        request: &ReportRequest<'_>,
    ) -> impl Future<Output = Result<Vec<u8>, PrintoutError>> + Send;

    fn release_session(
        &self,
        session: &Session,
    ) -> impl Future<Output = Result<(), PrintoutError>> + Send;

    fn close_connection(
        &self,
        connection: &Connection,
    ) -> impl Future<Output = Result<(), PrintoutError>> + Send;
}
