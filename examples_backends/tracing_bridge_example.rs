use std::sync::Arc;

use partition_log::init::{init_tracing_with_config, LayerConfig};
use partition_log::{Logger, LoggerConfig};
use tracing::{error, info, warn};

/// Route ordinary `tracing` events into partitioned files under
/// `$PARTITION_LOG_ROOT` (default `./logs`).
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logger = Arc::new(Logger::with_file_router(LoggerConfig::from_env()?));
    init_tracing_with_config(logger.clone(), LayerConfig { enable_stdout: true })?;

    info!("starting service");
    warn!(log_type = "payments", attempt = 2u64, "retrying charge");
    error!(user_id = 42u64, reason = "invalid password", "authentication failed for {{<user_id>}}");

    println!("records written under {}", logger.config().root.display());
    Ok(())
}
