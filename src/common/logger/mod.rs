use std::{fs, path::Path, sync::Mutex};

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub mod formatter;

pub use formatter::*;

use crate::configs::LoggingConfig;

/// Builds the filter directive string from the logging section.
pub fn filter_directives(logging: &LoggingConfig) -> String {
    let level = logging.level.as_deref().unwrap_or("info");
    match logging.filters.as_deref() {
        Some(filters) if !filters.trim().is_empty() => format!("{},{}", level, filters.trim()),
        _ => level.to_string(),
    }
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over the config.
pub fn init(logging: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(logging)));

    let stdout_layer = fmt::layer()
        .event_format(PartyFormatter::new(true))
        .with_ansi(true);

    let file_layer = logging.file.as_ref().and_then(|file_config| {
        if let Some(parent) = Path::new(&file_config.path).parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Failed to create log directory: {}", e);
            }
        }

        match fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_config.path)
        {
            Ok(file) => Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .event_format(PartyFormatter::new(false))
                    .with_ansi(false),
            ),
            Err(e) => {
                eprintln!("Failed to open log file {}: {}", file_config.path, e);
                None
            }
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();
}
