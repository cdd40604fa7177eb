use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::workflows::celebrations::DEFAULT_HEBCAL_URL;

/// Distinguishes runtime behavior for different stages of the runner.
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
    pub telemetry: TelemetryConfig,
    pub contacts: ContactsConfig,
    pub hebcal: HebcalConfig,
    pub notifications: NotificationConfig,
    /// `None` when `SMTP_HOST` is unset; only dry runs work then.
    pub smtp: Option<SmtpConfig>,
    pub schedule: ScheduleConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );
        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let contacts = ContactsConfig {
            path: PathBuf::from(
                env::var("LUACH_CONTACTS_PATH").unwrap_or_else(|_| "contacts.csv".to_string()),
            ),
        };

        let hebcal = HebcalConfig {
            base_url: env::var("LUACH_HEBCAL_URL")
                .unwrap_or_else(|_| DEFAULT_HEBCAL_URL.to_string()),
            timeout_secs: number_var("LUACH_HEBCAL_TIMEOUT_SECS", 30)?,
        };

        let notifications = NotificationConfig {
            operator_address: optional_var("LUACH_OPERATOR_ADDRESS"),
        };

        let schedule = ScheduleConfig {
            hour: number_var("LUACH_SCHEDULE_HOUR", 9)?,
            minute: number_var("LUACH_SCHEDULE_MINUTE", 0)?,
            registry_path: PathBuf::from(
                env::var("LUACH_TRIGGERS_PATH").unwrap_or_else(|_| "triggers.json".to_string()),
            ),
        };
        schedule.validate()?;

        Ok(Self {
            environment,
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            contacts,
            hebcal,
            notifications,
            smtp: SmtpConfig::from_env()?,
            schedule,
        })
    }

    /// Address copied on every notification. Scans cannot run without it.
    pub fn operator_address(&self) -> Result<&str, ConfigError> {
        self.notifications
            .operator_address
            .as_deref()
            .ok_or(ConfigError::MissingVar("LUACH_OPERATOR_ADDRESS"))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

#[derive(Debug, Clone)]
pub struct ContactsConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct HebcalConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl HebcalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub operator_address: Option<String>,
}

/// Local time of the daily trigger and where registered triggers live.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub hour: u32,
    pub minute: u32,
    pub registry_path: PathBuf,
}

impl ScheduleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hour > 23 || self.minute > 59 {
            return Err(ConfigError::InvalidSchedule {
                hour: self.hour,
                minute: self.minute,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    StartTls,
    Tls,
    Plain,
}

impl SmtpSecurity {
    /// Port used when `SMTP_PORT` is unset.
    pub fn default_port(self) -> u16 {
        match self {
            Self::StartTls => 587,
            Self::Tls => 465,
            Self::Plain => 25,
        }
    }
}

impl FromStr for SmtpSecurity {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "starttls" => Ok(Self::StartTls),
            "tls" | "ssl" => Ok(Self::Tls),
            "none" | "plain" => Ok(Self::Plain),
            other => Err(ConfigError::InvalidTlsMode(other.to_string())),
        }
    }
}

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub security: SmtpSecurity,
}

impl SmtpConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(host) = optional_var("SMTP_HOST") else {
            return Ok(None);
        };

        let from = optional_var("SMTP_FROM").ok_or(ConfigError::MissingVar("SMTP_FROM"))?;
        let security = match optional_var("SMTP_TLS") {
            Some(mode) => mode.parse()?,
            None => SmtpSecurity::StartTls,
        };

        Ok(Some(Self {
            host,
            port: number_var("SMTP_PORT", security.default_port())?,
            username: optional_var("SMTP_USERNAME"),
            password: optional_var("SMTP_PASSWORD"),
            from,
            security,
        }))
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("from", &self.from)
            .field("security", &self.security)
            .finish_non_exhaustive()
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn number_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional_var(name) {
        Some(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { var: name }),
        None => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { var: &'static str },
    InvalidSchedule { hour: u32, minute: u32 },
    MissingVar(&'static str),
    InvalidTlsMode(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { var } => write!(f, "{var} must be a valid number"),
            ConfigError::InvalidSchedule { hour, minute } => write!(
                f,
                "schedule time {hour:02}:{minute:02} is outside 00:00-23:59"
            ),
            ConfigError::MissingVar(var) => write!(f, "{var} must be set"),
            ConfigError::InvalidTlsMode(mode) => write!(
                f,
                "SMTP_TLS '{mode}' is not one of starttls, tls or none"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
