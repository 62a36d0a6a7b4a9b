// src/logging.rs

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Инициализация tracing. `RUST_LOG` имеет приоритет над конфигурацией.
pub fn init(config: &LoggingConfig) {
    let level = config.level.to_lowercase();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wallet_mfa_backend={level},tower_http={level}")));

    let registry = tracing_subscriber::registry().with(filter);
    if config.enable_json_output {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
