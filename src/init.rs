use crate::layer::PartitionLayer;
use crate::logger::Logger;
use std::sync::Arc;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the global `tracing` subscriber installed by
/// [`init_tracing_with_config`].
///
/// **Fields**
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   added next to [`PartitionLayer`] so events are also printed to the
///   console.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            enable_stdout: true,
        }
    }
}

/// Install a global `tracing` subscriber that forwards every event to
/// `logger`.
///
/// **Parameters**
/// - `logger`: the [`Logger`] that renders and stores forwarded events.
///   Its own threshold still applies.
/// - `config`: [`LayerConfig`] controlling the optional console output.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already installed.
pub fn init_tracing_with_config(
    logger: Arc<Logger>,
    config: LayerConfig,
) -> Result<(), SetGlobalDefaultError> {
    let layer = PartitionLayer::new(logger);

    // The two subscriber shapes have different types, so install each
    // branch separately.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Install the bridge with [`LayerConfig::default`].
pub fn init_tracing(logger: Arc<Logger>) -> Result<(), SetGlobalDefaultError> {
    init_tracing_with_config(logger, LayerConfig::default())
}
