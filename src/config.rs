//! Configuration management for FieldLog server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_secret: String,
    pub session_expiration_hours: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    /// Directory for daily rolling log files; stdout only when unset
    pub directory: Option<String>,
}

/// Remote tabular store (spreadsheet) credentials and endpoints.
///
/// Every credential field is optional: a missing spreadsheet ID or service
/// account degrades the server to local-only mode instead of failing.
#[derive(Debug, Deserialize, Clone)]
pub struct SheetsConfig {
    pub visits_spreadsheet_id: Option<String>,
    pub directory_spreadsheet_id: Option<String>,
    pub service_account_email: Option<String>,
    /// PEM-encoded RSA private key; `\n` escapes are unfolded on load
    pub private_key: Option<String>,
    pub api_base: String,
    pub token_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BlobConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub storage_limit_bytes: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub blob: BlobConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix FIELDLOG_)
            .add_source(
                Environment::with_prefix("FIELDLOG")
                    .separator("_")
                    .try_parsing(true),
            )
            // Override store credentials from well-known env vars if present
            .set_override_option(
                "sheets.visits_spreadsheet_id",
                env::var("SHEET_ID").ok(),
            )?
            .set_override_option(
                "sheets.service_account_email",
                env::var("SERVICE_ACCOUNT_EMAIL").ok(),
            )?
            .set_override_option(
                "sheets.private_key",
                env::var("SERVICE_ACCOUNT_KEY").ok(),
            )?
            .set_override_option(
                "blob.token",
                env::var("BLOB_READ_WRITE_TOKEN").ok(),
            )?
            .set_override_option(
                "auth.session_secret",
                env::var("SESSION_SECRET").ok(),
            )?
            .build()?;

        let mut loaded: Self = config.try_deserialize()?;

        // Keys pasted into env vars usually carry literal \n sequences
        if let Some(key) = loaded.sheets.private_key.as_mut() {
            *key = key.replace("\\n", "\n");
        }

        Ok(loaded)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: "change-this-secret-in-production".to_string(),
            session_expiration_hours: 24,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            directory: None,
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            visits_spreadsheet_id: None,
            directory_spreadsheet_id: None,
            service_account_email: None,
            private_key: None,
            api_base: "https://sheets.googleapis.com/v4".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
        }
    }
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            base_url: "https://blob.vercel-storage.com".to_string(),
            token: None,
            storage_limit_bytes: 1_000_000_000,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: "data/visits-cache.json".to_string(),
        }
    }
}
