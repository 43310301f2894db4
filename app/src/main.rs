use std::path::Path;

use tracing::Level;

use mmflink_core::{targets, AppConfig, HttpCommandClient};
use mmflink_ui::logging::{apply_log_level, init_logging, LogLevel, LogStore};
use mmflink_ui::{run, Flags, UiResult};

fn main() -> UiResult {
    let log_store = LogStore::new(2000);
    let reload_handle = init_logging(log_store.clone(), LogLevel::Info);

    let config_path = AppConfig::config_path();
    let first_run = !Path::new(&config_path).exists();
    let config = match AppConfig::load(&config_path) {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(
                target: targets::SETTINGS,
                path = %config_path,
                "{}: {}",
                error.user_summary(),
                error.technical_detail()
            );
            std::process::exit(1);
        }
    };

    if first_run {
        match config.save(&config_path) {
            Ok(()) => tracing::info!(target: targets::SETTINGS, path = %config_path, "Default config written"),
            Err(error) => tracing::warn!(target: targets::SETTINGS, "{}", error.technical_detail()),
        }
    }

    let log_level = config.log_level.parse::<LogLevel>().unwrap_or_else(|error| {
        tracing::warn!(target: targets::SETTINGS, "{}, using info", error);
        LogLevel::Info
    });
    apply_log_level(&reload_handle, log_level);

    let client = match HttpCommandClient::new(&config) {
        Ok(client) => client,
        Err(error) => {
            tracing::error!(target: targets::COMMAND, "{}", error.technical_detail());
            std::process::exit(1);
        }
    };

    tracing::info!(target: targets::UI, server = %config.server_url, "MyMiniFactory Link starting");
    tracing::event!(target: targets::UI, Level::DEBUG, "Logging infrastructure online");

    run(Flags {
        log_store,
        reload_handle,
        log_level,
        config,
        client,
    })
}
