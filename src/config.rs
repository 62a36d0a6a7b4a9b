// src/config.rs

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Префикс переменных окружения: `WALLET_MFA__WEB_SERVER__ADDRESS=...`
pub const ENV_PREFIX: &str = "WALLET_MFA";

/// Секрет по умолчанию — только для локального запуска
pub const DEV_TOKEN_SECRET: &str = "demo-mfa-token-secret";

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub web_server: ServerConfig,

    #[serde(default)]
    pub mfa: MfaConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            max_request_size: default_max_request_size(),
        }
    }
}

fn default_address() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_max_request_size() -> usize {
    1024 * 1024 // 1 MB
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MfaConfig {
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_token_secret")]
    pub token_secret: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

impl Default for MfaConfig {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            token_secret: default_token_secret(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

fn default_issuer() -> String {
    "wallet-mfa-backend".to_string()
}

fn default_token_secret() -> String {
    DEV_TOKEN_SECRET.to_string()
}

fn default_token_ttl_secs() -> u64 {
    3600
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub enable_json_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            enable_json_output: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Значения по умолчанию → файл (если задан) → `.env` и окружение.
    ///
    /// `PORT` поддерживается отдельно и заменяет порт в `web_server.address`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        );

        let mut cfg: AppConfig = builder
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        if let Ok(port) = std::env::var("PORT") {
            cfg.web_server.address = with_port(&cfg.web_server.address, &port)?;
        }

        Ok(cfg)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path.as_ref(), content)
            .with_context(|| format!("failed to write {}", path.as_ref().display()))?;
        Ok(())
    }

    pub fn uses_dev_token_secret(&self) -> bool {
        self.mfa.token_secret == DEV_TOKEN_SECRET
    }
}

fn with_port(address: &str, port: &str) -> anyhow::Result<String> {
    let port: u16 = port
        .trim()
        .parse()
        .with_context(|| format!("invalid PORT value: {port}"))?;
    let host = address
        .rsplit_once(':')
        .map(|(host, _)| host)
        .unwrap_or(address);
    Ok(format!("{host}:{port}"))
}
