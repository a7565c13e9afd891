use std::fmt;

/// Login material for one enova database.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub database: String,
    pub login: String,
    pub password: String,
}

impl Credentials {
    pub fn new(
        database: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            login: login.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("database", &self.database)
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}
