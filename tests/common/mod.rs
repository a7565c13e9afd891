#![allow(dead_code)]

use enova_printouts::EnovaBackend;
use enova_printouts::PrintoutError;
use enova_printouts::types::{Connection, Credentials, ReportRequest, RuntimeInfo, Session};
use reqwest::StatusCode;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// What the fake render call does.
#[derive(Clone)]
pub enum RenderBehavior {
    Payload(Vec<u8>),
    Fail { code: String, message: String },
    Hang,
}

/// What the fake backend saw when `render` was called.
#[derive(Clone, Debug)]
pub struct SeenTemplate {
    pub path: PathBuf,
    pub content: Option<Vec<u8>>,
}

/// In-process stand-in for the enova gateway that records every call.
#[derive(Clone)]
pub struct FakeBackend {
    calls: Arc<Mutex<Vec<String>>>,
    seen: Arc<Mutex<Vec<SeenTemplate>>>,
    pub reject_login: bool,
    pub fail_open: bool,
    pub fail_release: bool,
    pub render: RenderBehavior,
}

impl FakeBackend {
    pub fn rendering(payload: Vec<u8>) -> Self {
        Self {
            calls: Arc::default(),
            seen: Arc::default(),
            reject_login: false,
            fail_open: false,
            fail_release: false,
            render: RenderBehavior::Payload(payload),
        }
    }

    pub fn with_render(mut self, render: RenderBehavior) -> Self {
        self.render = render;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == op).count()
    }

    pub fn seen_templates(&self) -> Vec<SeenTemplate> {
        self.seen.lock().unwrap().clone()
    }

    fn record(&self, op: &str) {
        self.calls.lock().unwrap().push(op.to_string());
    }
}

impl EnovaBackend for FakeBackend {
    async fn load_runtime(&self) -> Result<RuntimeInfo, PrintoutError> {
        self.record("load_runtime");
        Ok(RuntimeInfo {
            version: "2406.1.3".to_string(),
        })
    }

    async fn open_database(&self, database: &str) -> Result<Connection, PrintoutError> {
        self.record("open_database");
        if self.fail_open {
            return Err(PrintoutError::UpstreamStatus(StatusCode::SERVICE_UNAVAILABLE));
        }
        Ok(Connection {
            id: "conn-1".to_string(),
            database: database.to_string(),
        })
    }

    async fn login(
        &self,
        connection: &Connection,
        credentials: &Credentials,
    ) -> Result<Session, PrintoutError> {
        self.record("login");
        if self.reject_login {
            return Err(PrintoutError::Backend {
                status: StatusCode::UNAUTHORIZED,
                code: "INVALID_CREDENTIALS".to_string(),
                message: "invalid login or password".to_string(),
            });
        }
        Ok(Session {
            id: "session-1".to_string(),
            user: credentials.login.clone(),
            database: connection.database.clone(),
        })
    }

    async fn render(&self, request: &ReportRequest<'_>) -> Result<Vec<u8>, PrintoutError> {
        self.record("render");
        let path = request.template().to_path_buf();
        let content = match &self.render {
            RenderBehavior::Hang => None,
            _ => tokio::fs::read(&path).await.ok(),
        };
        self.seen
            .lock()
            .unwrap()
            .push(SeenTemplate { path, content });

        match &self.render {
            RenderBehavior::Payload(payload) => Ok(payload.clone()),
            RenderBehavior::Fail { code, message } => Err(PrintoutError::Backend {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: code.clone(),
                message: message.clone(),
            }),
            RenderBehavior::Hang => std::future::pending().await,
        }
    }

    async fn release_session(&self, _session: &Session) -> Result<(), PrintoutError> {
        self.record("release_session");
        if self.fail_release {
            return Err(PrintoutError::UpstreamStatus(StatusCode::BAD_GATEWAY));
        }
        Ok(())
    }

    async fn close_connection(&self, _connection: &Connection) -> Result<(), PrintoutError> {
        self.record("close_connection");
        Ok(())
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("Demo", "Administrator", "secret")
}
