use crate::api::backend::EnovaBackend;
use crate::config::EnovaConfig;
use crate::error::PrintoutError;
use crate::types::{
    Connection, Credentials, ReportFormat, ReportRequest, RuntimeInfo, Session, TemplateSource,
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// HTTP client for the enova service gateway.
#[derive(Clone)]
pub struct EnovaApi {
    client: reqwest::Client,
    base_url: Url,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    login: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RenderBody<'a> {
    template_name: &'a str,
    template_source: TemplateSource,
    template_content: String,
    format: ReportFormat,
}

impl EnovaApi {
    /// Build the client from the `[enova]` section and an optional proxy.
    pub fn new(cfg: &EnovaConfig, proxy: Option<&Url>) -> Result<Self, PrintoutError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("enova-printouts/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .timeout(Duration::from_secs(cfg.request_timeout_secs));
        if let Some(proxy_url) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }
        let client = builder.build()?;
        Ok(Self::with_client(client, cfg.base_url.clone()))
    }

    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, PrintoutError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                PrintoutError::Config(format!(
                    "enova base url '{}' cannot be a base",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, PrintoutError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.bytes().await?;
        Err(PrintoutError::from_error_body(status, &body))
    }

    /// DELETE that treats 404 as already released.
    async fn release(&self, url: Url, token: &str) -> Result<(), PrintoutError> {
        let resp = self.client.delete(url).bearer_auth(token).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!("resource already released on the backend");
            return Ok(());
        }
        Self::check(resp).await?;
        Ok(())
    }
}

impl EnovaBackend for EnovaApi {
    async fn load_runtime(&self) -> Result<RuntimeInfo, PrintoutError> {
        let url = self.endpoint(&["api", "runtime"])?;
        let resp = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;
        let info: RuntimeInfo = Self::check(resp).await?.json().await?;
        Ok(info)
    }

    async fn open_database(&self, database: &str) -> Result<Connection, PrintoutError> {
        let url = self.endpoint(&["api", "databases", database, "connections"])?;
        let resp = self.client.post(url).send().await?;
        let connection: Connection = Self::check(resp).await?.json().await?;
        debug!(database, connection = %connection.id, "database opened");
        Ok(connection)
    }

    async fn login(
        &self,
        connection: &Connection,
        credentials: &Credentials,
    ) -> Result<Session, PrintoutError> {
        let url = self.endpoint(&["api", "connections", &connection.id, "login"])?;
        let resp = self
            .client
            .post(url)
            .json(&LoginBody {
                login: &credentials.login,
                password: &credentials.password,
            })
            .send()
            .await?;
        let session: Session = Self::check(resp).await?.json().await?;
        Ok(session)
    }

    async fn render(&self, request: &ReportRequest<'_>) -> Result<Vec<u8>, PrintoutError> {
        let session = request.session();
        let template = tokio::fs::read(request.template()).await?;
        let template_name = request
            .template()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        let url = self.endpoint(&["api", "sessions", &session.id, "reports"])?;
        let body = RenderBody {
            template_name,
            template_source: request.source(),
            template_content: BASE64_STANDARD.encode(&template),
            format: request.format(),
        };
        let resp = self
            .client
            .post(url)
            .bearer_auth(&session.id)
            .json(&body)
            .send()
            .await?;
        let payload = Self::check(resp).await?.bytes().await?;
        info!(
            session = %session.id,
            format = %request.format(),
            bytes = payload.len(),
            "Report rendered by enova"
        );
        Ok(payload.to_vec())
    }

    async fn release_session(&self, session: &Session) -> Result<(), PrintoutError> {
        let url = self.endpoint(&["api", "sessions", &session.id])?;
        self.release(url, &session.id).await
    }

    async fn close_connection(&self, connection: &Connection) -> Result<(), PrintoutError> {
        let url = self.endpoint(&["api", "connections", &connection.id])?;
        self.release(url, &connection.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> EnovaApi {
        EnovaApi::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn endpoint_encodes_segments() {
        let url = api("http://enova.local:8080/")
            .endpoint(&["api", "databases", "Demo Firma", "connections"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://enova.local:8080/api/databases/Demo%20Firma/connections"
        );
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let url = api("http://gateway.local/enova")
            .endpoint(&["api", "runtime"])
            .unwrap();
        assert_eq!(url.as_str(), "http://gateway.local/enova/api/runtime");
    }
}
