use crate::workflows::adherence::StatusVocabulary;
use crate::workflows::enrollments::{ColumnMapping, DEFAULT_COURSE_COLUMN, DEFAULT_STATUS_COLUMN};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub report: ReportConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let vocabulary = match non_empty_var("ADHERENCE_STATUS_LABELS") {
            Some(raw) => parse_status_labels(&raw)?,
            None => StatusVocabulary::standard(),
        };

        let report = ReportConfig {
            source_path: non_empty_var("ADHERENCE_SOURCE_PATH").map(PathBuf::from),
            recipient: non_empty_var("ADHERENCE_RECIPIENT"),
            outbox_dir: PathBuf::from(
                non_empty_var("ADHERENCE_OUTBOX_DIR").unwrap_or_else(|| "outbox".to_string()),
            ),
            columns: ColumnMapping {
                course_column: non_empty_var("ADHERENCE_COURSE_COLUMN")
                    .unwrap_or_else(|| DEFAULT_COURSE_COLUMN.to_string()),
                status_column: non_empty_var("ADHERENCE_STATUS_COLUMN")
                    .unwrap_or_else(|| DEFAULT_STATUS_COLUMN.to_string()),
            },
            vocabulary,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            report,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parses `CODE=Label` pairs separated by `;`.
pub fn parse_status_labels(raw: &str) -> Result<StatusVocabulary, ConfigError> {
    let mut pairs = Vec::new();
    for entry in raw.split(';').map(str::trim).filter(|entry| !entry.is_empty()) {
        let (code, label) = entry
            .split_once('=')
            .map(|(code, label)| (code.trim(), label.trim()))
            .filter(|(code, label)| !code.is_empty() && !label.is_empty())
            .ok_or_else(|| ConfigError::InvalidStatusLabels {
                entry: entry.to_string(),
            })?;
        pairs.push((code.to_string(), label.to_string()));
    }

    if pairs.is_empty() {
        return Err(ConfigError::InvalidStatusLabels {
            entry: raw.to_string(),
        });
    }

    Ok(StatusVocabulary::from_pairs(pairs))
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where enrollments come from, how they are labelled, and where the
/// finished report goes.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub source_path: Option<PathBuf>,
    pub recipient: Option<String>,
    pub outbox_dir: PathBuf,
    pub columns: ColumnMapping,
    pub vocabulary: StatusVocabulary,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidStatusLabels { entry: String },
    MissingSetting { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidStatusLabels { entry } => write!(
                f,
                "ADHERENCE_STATUS_LABELS entry '{}' must look like CODE=Label",
                entry
            ),
            ConfigError::MissingSetting { name } => {
                write!(f, "{} is not set and no override was given", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidStatusLabels { .. }
            | ConfigError::MissingSetting { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "ADHERENCE_SOURCE_PATH",
            "ADHERENCE_RECIPIENT",
            "ADHERENCE_OUTBOX_DIR",
            "ADHERENCE_COURSE_COLUMN",
            "ADHERENCE_STATUS_COLUMN",
            "ADHERENCE_STATUS_LABELS",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.report.columns, ColumnMapping::default());
        assert_eq!(config.report.vocabulary, StatusVocabulary::standard());
        assert_eq!(config.report.outbox_dir, PathBuf::from("outbox"));
        assert!(config.report.source_path.is_none());
        assert!(config.report.recipient.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn report_settings_come_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ADHERENCE_SOURCE_PATH", "/data/enrollments.csv");
        env::set_var("ADHERENCE_RECIPIENT", "gestor@example.com");
        env::set_var("ADHERENCE_COURSE_COLUMN", "Course");
        env::set_var("ADHERENCE_STATUS_LABELS", "COMPLETED=Done; IN_PROGRESS = Started");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.report.source_path,
            Some(PathBuf::from("/data/enrollments.csv"))
        );
        assert_eq!(config.report.recipient.as_deref(), Some("gestor@example.com"));
        assert_eq!(config.report.columns.course_column, "Course");
        assert_eq!(config.report.columns.status_column, DEFAULT_STATUS_COLUMN);
        assert_eq!(config.report.vocabulary.label_for("IN_PROGRESS"), Some("Started"));
        assert_eq!(config.report.vocabulary.label_for("NOT_STARTED"), None);
        reset_env();
    }

    #[test]
    fn malformed_status_labels_are_rejected() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ADHERENCE_STATUS_LABELS", "COMPLETED=Done;BROKEN");
        let error = AppConfig::load().expect_err("invalid labels");
        assert!(matches!(
            error,
            ConfigError::InvalidStatusLabels { ref entry } if entry == "BROKEN"
        ));
        reset_env();
    }

    #[test]
    fn parse_status_labels_requires_code_and_label() {
        assert!(parse_status_labels("=Done").is_err());
        assert!(parse_status_labels("COMPLETED=").is_err());
        assert!(parse_status_labels(" ; ").is_err());
        let vocabulary = parse_status_labels("COMPLETED=Done;").expect("parses");
        assert_eq!(vocabulary.len(), 1);
    }
}
