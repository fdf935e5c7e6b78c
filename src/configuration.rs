use crate::errors::AppError;
use crate::validation::ValidatedEmail;
use config::{Config, Environment, File, FileFormat};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub email_client: EmailClientSettings,
    pub files: FileSettings,
    pub schedule: ScheduleSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub path: PathBuf,
    #[serde(default = "default_true")]
    pub create_if_missing: bool,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub sender_email: String,
    pub authorization_token: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
    pub recipients: Vec<String>,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct FileSettings {
    pub import_path: PathBuf,
    pub duplicates_report_path: PathBuf,
    pub summary_log_path: PathBuf,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ScheduleSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub tick_seconds: u64,
    pub import: String,
    pub deliveries: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl DatabaseSettings {
    pub fn connection_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(self.create_if_missing)
            .journal_mode(SqliteJournalMode::Wal)
    }
}

impl EmailClientSettings {
    pub fn parse_email(&self) -> Result<ValidatedEmail, AppError> {
        ValidatedEmail::parse(&self.sender_email)
    }

    /// Every configured recipient must be a valid address; one bad entry fails the lot.
    pub fn parse_recipients(&self) -> Result<Vec<ValidatedEmail>, AppError> {
        self.recipients
            .iter()
            .map(|r| ValidatedEmail::parse(r))
            .collect()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let base_path = std::env::current_dir()?;
    let env: Env = std::env::var("APP_ENV")
        .unwrap_or_else(|_| "local".into())
        .try_into()?;
    get_configuration_from(&base_path.join("config"), env)
}

pub fn get_configuration_from(config_dir: &Path, env: Env) -> Result<Settings, AppError> {
    let additional_conf_name = format!("{}.yaml", env.as_str());

    let settings = Config::builder()
        .add_source(File::from(config_dir.join("base.yaml")))
        .add_source(
            File::new(
                config_dir
                    .join(additional_conf_name.as_str())
                    .to_str()
                    .ok_or_else(|| AppError::ConfigError("non utf-8 config path".into()))?,
                FileFormat::Yaml,
            )
            .required(false),
        )
        // e.g. APP_EMAIL_CLIENT__AUTHORIZATION_TOKEN=... overrides email_client.authorization_token
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .map_err(|e| AppError::ConfigError(e.to_string()))?;
    settings
        .try_deserialize::<Settings>()
        .map_err(|e| AppError::ConfigError(e.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Env {
    Local,
    Production,
}

impl Env {
    pub fn as_str(&self) -> &str {
        match self {
            Env::Local => "local",
            Env::Production => "production",
        }
    }
}

impl TryFrom<String> for Env {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            _ => Err(AppError::EnvError(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parsing_is_case_insensitive() {
        assert_eq!(Env::try_from("Production".to_string()).unwrap(), Env::Production);
        assert_eq!(Env::try_from("local".to_string()).unwrap(), Env::Local);
        assert!(Env::try_from("staging".to_string()).is_err());
    }

    #[test]
    fn recipients_must_all_be_valid() {
        let settings = EmailClientSettings {
            base_url: "http://127.0.0.1".into(),
            sender_email: "vocab@example.com".into(),
            authorization_token: "token".into(),
            timeout_milliseconds: 2000,
            recipients: vec!["5555550100@txt.att.net".into(), "not-an-address".into()],
        };
        assert!(settings.parse_recipients().is_err());
        assert_eq!(settings.timeout(), Duration::from_secs(2));
    }
}
