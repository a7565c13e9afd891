use crate::error::PrintoutError;
use crate::types::{Credentials, ReportFormat};
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable naming an alternative configuration file.
pub const CONFIG_PATH_ENV: &str = "PRINTOUTS_CONFIG";
/// Prefix of environment overrides, e.g. `PRINTOUTS_ENOVA__PASSWORD`.
pub const ENV_PREFIX: &str = "PRINTOUTS_";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub enova: EnovaConfig,
    pub worker: WorkerConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub loglevel: String,
    pub proxy: Option<Url>,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            loglevel: "info".to_string(),
            proxy: None,
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct EnovaConfig {
    pub base_url: Url,
    #[serde(deserialize_with = "deserialize_text")]
    pub database: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub login: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub password: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl EnovaConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.database, &self.login, &self.password)
    }
}

impl Default for EnovaConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://127.0.0.1:8080/").expect("static URL is valid"),
            database: String::new(),
            login: String::new(),
            password: String::new(),
            connect_timeout_secs: 5,
            request_timeout_secs: 300,
        }
    }
}

impl fmt::Debug for EnovaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnovaConfig")
            .field("base_url", &self.base_url.as_str())
            .field("database", &self.database)
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub execute_on_startup: bool,
    /// Period between runs. Zero means a single run at startup.
    #[serde(deserialize_with = "deserialize_timespan")]
    pub execution_time: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            execute_on_startup: true,
            execution_time: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub template_path: PathBuf,
    pub output_path: PathBuf,
    pub format: ReportFormat,
    pub temp_dir: Option<PathBuf>,
    pub render_timeout_secs: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            template_path: PathBuf::new(),
            output_path: PathBuf::new(),
            format: ReportFormat::Pdf,
            temp_dir: None,
            render_timeout_secs: 240,
        }
    }
}

impl Config {
    /// Load from `config.toml` (or `$PRINTOUTS_CONFIG`) and `PRINTOUTS_*` variables.
    pub fn load() -> Result<Self, PrintoutError> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::from_figment(Self::figment(&path))
    }

    pub fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, PrintoutError> {
        let cfg: Config = figment.extract().map_err(Box::new)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), PrintoutError> {
        if self.enova.database.trim().is_empty() {
            return Err(PrintoutError::Config("enova.database must be set".to_string()));
        }
        if self.enova.login.trim().is_empty() {
            return Err(PrintoutError::Config("enova.login must be set".to_string()));
        }
        if self.enova.base_url.cannot_be_a_base() {
            return Err(PrintoutError::Config(format!(
                "enova.base_url '{}' is not a usable base URL",
                self.enova.base_url
            )));
        }
        if self.enova.connect_timeout_secs == 0 || self.enova.request_timeout_secs == 0 {
            return Err(PrintoutError::Config(
                "enova timeouts must be greater than zero".to_string(),
            ));
        }
        if self.report.template_path.as_os_str().is_empty() {
            return Err(PrintoutError::Config(
                "report.template_path must be set".to_string(),
            ));
        }
        if self.report.output_path.file_name().is_none() {
            return Err(PrintoutError::Config(format!(
                "report.output_path '{}' must name a file",
                self.report.output_path.display()
            )));
        }
        if self.report.render_timeout_secs == 0 {
            return Err(PrintoutError::Config(
                "report.render_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.report.render_timeout_secs > self.enova.request_timeout_secs {
            return Err(PrintoutError::Config(format!(
                "report.render_timeout_secs ({}) must not exceed enova.request_timeout_secs ({})",
                self.report.render_timeout_secs, self.enova.request_timeout_secs
            )));
        }
        Ok(())
    }
}

/// Parse a `[d.]hh:mm[:ss]` time span.
pub fn parse_timespan(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    let (days, clock) = match s.split_once('.') {
        Some((d, rest)) if !d.contains(':') => (
            d.parse::<u64>()
                .map_err(|_| format!("invalid day count in time span '{input}'"))?,
            rest,
        ),
        _ => (0, s),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m] => (*h, *m, "0"),
        [h, m, sec] => (*h, *m, *sec),
        _ => return Err(format!("time span '{input}' must look like [d.]hh:mm[:ss]")),
    };

    let field = |value: &str, name: &str, max: u64| -> Result<u64, String> {
        let n = value
            .parse::<u64>()
            .map_err(|_| format!("invalid {name} in time span '{input}'"))?;
        if n >= max {
            return Err(format!("{name} out of range in time span '{input}'"));
        }
        Ok(n)
    };
    let hours = field(hours, "hours", 24)?;
    let minutes = field(minutes, "minutes", 60)?;
    let seconds = field(seconds, "seconds", 60)?;

    days.checked_mul(86_400)
        .and_then(|secs| secs.checked_add(hours * 3_600 + minutes * 60 + seconds))
        .map(Duration::from_secs)
        .ok_or_else(|| format!("day count out of range in time span '{input}'"))
}

/// Accepts either a `[d.]hh:mm[:ss]` string or a number of seconds.
fn deserialize_timespan<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
        Raw::Text(text) => parse_timespan(&text).map_err(serde::de::Error::custom),
    }
}

/// Environment overrides arrive as typed values, so `PRINTOUTS_ENOVA__PASSWORD=123456`
/// is a number by the time it reaches a `String` field.
fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Flag(bool),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Unsigned(n) => n.to_string(),
        Raw::Signed(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
        Raw::Flag(b) => b.to_string(),
    })
}
