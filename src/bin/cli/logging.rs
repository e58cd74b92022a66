use std::fs::{self, OpenOptions};
use std::io::Write;

use anyhow::{Context, Result};

use flashdeck_lib::AppConfig;

/// Set up `env_logger` from the config.
///
/// With a log file, everything at `info` and up is appended there as
/// `<timestamp> - <LEVEL> - <message>`. Without one, only warnings reach stderr.
/// `RUST_LOG` overrides either default.
pub fn init(config: &AppConfig) -> Result<()> {
    let mut builder = env_logger::Builder::new();

    let default_level = if config.log_file.is_some() { "info" } else { "warn" };
    builder.parse_filters(config.log_level.as_deref().unwrap_or(default_level));
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    if let Some(path) = &config.log_file {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        builder.target(env_logger::Target::Pipe(Box::new(file)));
        builder.format(|buf, record| {
            writeln!(buf, "{} - {} - {}", buf.timestamp(), record.level(), record.args())
        });
    }

    builder
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(())
}
