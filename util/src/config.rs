//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton holding
//! runtime configuration loaded from environment variables. Both service
//! binaries read the same key set; each process supplies its own values.

use std::env;
use std::sync::{OnceLock, RwLock};

/// Complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Base URL the relay uses to reach the backend.
    pub backend_api_url: String,
    /// Base URL the backend uses to reach the relay.
    pub widget_api_url: String,
    /// Shared bearer key for cross-service calls.
    pub api_key: String,
    pub ws_ping_secs: u64,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "helpdesk".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "api=info,relay=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "helpdesk.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".into())
                .parse()
                .unwrap_or(3000),
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "data/helpdesk.db".into()),
            backend_api_url: env::var("BACKEND_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            widget_api_url: env::var("WIDGET_API_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            api_key: env::var("API_KEY").unwrap_or_default(),
            ws_ping_secs: env::var("WS_PING_SECS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .unwrap_or(30),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock cannot be acquired.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().expect("Failed to acquire AppConfig write lock");
            *guard = AppConfig::from_env();
        }
    }

    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    pub fn set_host(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.host = value.into());
    }

    pub fn set_port(value: u16) {
        AppConfig::set_field(|cfg| cfg.port = value);
    }

    pub fn set_backend_api_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.backend_api_url = value.into());
    }

    pub fn set_widget_api_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.widget_api_url = value.into());
    }

    pub fn set_api_key(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.api_key = value.into());
    }
}

// --- Free accessor functions used across the workspace ---

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}

pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

pub fn backend_api_url() -> String {
    AppConfig::global().backend_api_url.clone()
}

pub fn widget_api_url() -> String {
    AppConfig::global().widget_api_url.clone()
}

pub fn api_key() -> String {
    AppConfig::global().api_key.clone()
}

pub fn ws_ping_secs() -> u64 {
    AppConfig::global().ws_ping_secs
}
