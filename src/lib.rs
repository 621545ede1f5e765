// Kite Panel Library
// Web panel for configuring PageKite through its configuration tool

pub mod actions;
pub mod config;
pub mod error;
pub mod logging;
pub mod pagekite;
pub mod web;

use config::PanelConfig;
use error::AppError;
use web::PanelServer;

/// 启动面板，直到收到 Ctrl-C
pub async fn run() -> Result<(), AppError> {
    logging::init();

    let config_dir = PanelConfig::resolve_config_dir()?;
    let config = PanelConfig::load(&config_dir);
    tracing::info!(
        config = %PanelConfig::get_config_path(&config_dir).display(),
        command = %config.action_command,
        superuser = config.superuser,
        "Loaded settings"
    );

    let handle = PanelServer::new(config).start(None).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    handle.shutdown_and_wait().await;

    Ok(())
}
