use crate::api::EnovaBackend;
use crate::error::PrintoutError;
use crate::types::{Connection, Credentials, Session};
use tracing::{debug, info, warn};

/// Owns the process-wide enova connection and the session logged in on it.
///
/// Constructed once at startup and lent by reference to the report pipeline.
/// The session is created by [`SessionManager::initialize`] and released,
/// together with its connection, by [`SessionManager::dispose`].
pub struct SessionManager<B> {
    backend: B,
    credentials: Credentials,
    connection: Option<Connection>,
    session: Option<Session>,
}

impl<B: EnovaBackend> SessionManager<B> {
    pub fn new(backend: B, credentials: Credentials) -> Self {
        Self {
            backend,
            credentials,
            connection: None,
            session: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Load the runtime, open the database and log in.
    ///
    /// Runs the backend work only once; later calls return the existing session.
    pub async fn initialize(&mut self) -> Result<&Session, PrintoutError> {
        if self.session.is_some() {
            debug!("enova session already established; skipping login");
            return self.session();
        }

        let connection = match self.connection.take() {
            Some(connection) => connection,
            None => self.open_connection().await?,
        };
        let login = self.backend.login(&connection, &self.credentials).await;
        // Kept even when login fails so that dispose() closes it.
        self.connection = Some(connection);

        let session = login.map_err(|e| self.login_error(e))?;
        info!(
            database = %session.database,
            user = %session.user,
            session = %session.id,
            "Logged in to enova"
        );
        Ok(&*self.session.insert(session))
    }

    /// The authenticated session. Fails until [`SessionManager::initialize`] succeeded.
    pub fn session(&self) -> Result<&Session, PrintoutError> {
        self.session.as_ref().ok_or(PrintoutError::NotInitialized)
    }

    /// Release the session, then the connection. Safe to call repeatedly.
    pub async fn dispose(&mut self) {
        if let Some(session) = self.session.take() {
            match self.backend.release_session(&session).await {
                Ok(()) => info!(session = %session.id, "enova session released"),
                Err(e) => warn!(session = %session.id, error = %e, "failed to release enova session"),
            }
        }

        if let Some(connection) = self.connection.take() {
            match self.backend.close_connection(&connection).await {
                Ok(()) => info!(
                    database = %connection.database,
                    connection = %connection.id,
                    "enova connection closed"
                ),
                Err(e) => warn!(
                    connection = %connection.id,
                    error = %e,
                    "failed to close enova connection"
                ),
            }
        }
    }

    async fn open_connection(&self) -> Result<Connection, PrintoutError> {
        let runtime = self.backend.load_runtime().await.map_err(|e| {
            PrintoutError::Initialization(format!("failed to load enova runtime: {e}"))
        })?;
        info!(version = %runtime.version, "enova runtime loaded");

        let database = self.credentials.database.as_str();
        let connection = self.backend.open_database(database).await.map_err(|e| {
            PrintoutError::Initialization(format!("failed to open database '{database}': {e}"))
        })?;
        info!(database, connection = %connection.id, "enova database opened");
        Ok(connection)
    }

    fn login_error(&self, e: PrintoutError) -> PrintoutError {
        let user = &self.credentials.login;
        if e.is_auth_rejection() {
            PrintoutError::Initialization(format!("credentials rejected for user '{user}': {e}"))
        } else {
            PrintoutError::Initialization(format!("login failed for user '{user}': {e}"))
        }
    }
}
