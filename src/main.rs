mod catalog;
mod config;
mod generate;
mod genres;
mod logging;
mod lookup;
mod playlist;
mod stations;
mod stream_format;
mod stream_validation;

use anyhow::Context;
use config::Config;
use serde_json::json;
use std::env;

use crate::logging::init_logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = init_logger("radio-catalog-rs");

    let config = Config::load().context("failed to load configuration")?;

    match env::args().nth(1).as_deref() {
        Some("check-config") => {
            logger.info(
                "config.check_passed",
                serde_json::to_value(&config).unwrap_or_else(|_| json!({ "status": "ok" })),
            );
            Ok(())
        }
        Some("generate") => generate::run(&config),
        Some("validate") => stream_validation::run(&config).await,
        other => {
            logger.error(
                "cli.unknown_command",
                json!({ "command": other, "expected": ["generate", "validate", "check-config"] }),
            );
            anyhow::bail!("usage: radio-catalog-rs <generate|validate|check-config>")
        }
    }
}
