// src/main.rs

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use wallet_mfa_backend::config::AppConfig;
use wallet_mfa_backend::logging;
use wallet_mfa_backend::mfa_service::MfaService;
use wallet_mfa_backend::signature::LocalWallet;
use wallet_mfa_backend::verification::verify_message;
use wallet_mfa_backend::web::run_web_server;

/// Основная команда
#[derive(Parser)]
#[command(name = "wallet-mfa-backend", version)]
#[command(about = "Проверка подписей кошелька и демо-MFA", long_about = None)]
struct Args {
    /// Путь к файлу конфигурации (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Запустить веб-сервер (по умолчанию)
    Serve {
        /// Адрес, например 127.0.0.1:5000
        #[arg(long)]
        addr: Option<String>,
    },
    /// Подписать сообщение (personal_sign)
    Sign {
        /// Приватный ключ в hex; без него создаётся случайный
        #[arg(short, long)]
        key: Option<String>,
        #[arg(short, long)]
        message: String,
    },
    /// Проверить подпись и вывести результат в JSON
    Verify {
        #[arg(short, long)]
        message: String,
        #[arg(short, long)]
        signature: String,
    },
    /// Записать конфигурацию по умолчанию
    InitConfig {
        #[arg(short, long, default_value = "config.yaml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command.unwrap_or(Command::Serve { addr: None }) {
        Command::Serve { addr } => {
            let mut config = AppConfig::load(args.config.as_deref())?;
            if let Some(addr) = addr {
                config.web_server.address = addr;
            }
            logging::init(&config.logging);

            if config.uses_dev_token_secret() {
                warn!("using the built-in MFA token secret; set mfa.token_secret for anything but local demos");
            }

            let state = Arc::new(MfaService::from_config(&config.mfa)?);
            info!("🚀 Запуск веб-API на http://{}", config.web_server.address);
            run_web_server(state, &config.web_server).await?;
        }
        Command::Sign { key, message } => {
            let wallet = match key {
                Some(key) => LocalWallet::from_hex(&key)?,
                None => LocalWallet::random(),
            };
            let signature = wallet.sign_message(&message)?;
            println!("address:   {}", wallet.address());
            println!("signature: {}", signature);
        }
        Command::Verify { message, signature } => {
            let result = verify_message(&Value::String(message), &Value::String(signature));
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::InitConfig { path } => {
            AppConfig::default().save(&path)?;
            println!("✅ Конфигурация записана в {}", path.display());
        }
    }

    Ok(())
}
