mod app;
mod config;
mod ui;

use anyhow::Result;
use clap::Parser;
use stockpilot_core::{ApiConfig, Credential, DEFAULT_BASE_URL};

#[derive(Parser)]
#[command(
    name = "stockpilot-cli",
    version,
    about = "Terminal client for the Stockpilot supply chain AI suite"
)]
struct Cli {
    /// Backend base URL (overrides the stored one)
    #[arg(long)]
    base_url: Option<String>,

    /// Bearer key for the chat proxy (overrides the stored one)
    #[arg(long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let file_config = config::CliConfig::load();

    let base_url = cli
        .base_url
        .or_else(|| file_config.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let api_key = cli.api_key.or_else(|| file_config.api_key.clone());

    let mut api_config = ApiConfig::new(base_url);
    if let Some(key) = api_key {
        api_config = api_config.with_credential(Credential::new(key));
    }

    let app = app::App::new(api_config, file_config)?;

    let mut terminal = ui::init_terminal()?;
    let result = app.run(&mut terminal).await;
    ui::restore_terminal(terminal)?;

    result
}

/// File-backed logging so the alternate screen stays clean. Level via
/// STOCKPILOT_LOG_LEVEL; logging is skipped when no data dir exists.
fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let Some(log_dir) = dirs::data_dir().map(|dir| dir.join("stockpilot").join("logs")) else {
        return;
    };
    if std::fs::create_dir_all(&log_dir).is_err() {
        return;
    }
    let Ok(log_file) = std::fs::File::create(log_dir.join("stockpilot-cli.log")) else {
        return;
    };

    let filter = EnvFilter::try_from_env("STOCKPILOT_LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file))
        .init();
}
