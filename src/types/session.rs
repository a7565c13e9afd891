use serde::Deserialize;

/// Handle to an opened enova database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Connection {
    pub id: String,
    pub database: String,
}

/// Authenticated session bound to a [`Connection`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Session {
    pub id: String,
    pub user: String,
    pub database: String,
}

/// Backend runtime description returned when the runtime is loaded.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeInfo {
    pub version: String,
}
