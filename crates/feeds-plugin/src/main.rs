//! feeds-plugin: the median reporting plugin process.
//!
//! Loads the plugin configuration, assembles the median factory and serves it
//! until interrupted.

use feeds_median::report_codec::median_report_codec;
use feeds_plugin::config::PluginConfig;
use feeds_plugin::factory::MedianFactory;
use feeds_plugin::service::FactoryService;
use feeds_types::MAX_ORACLES;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = PluginConfig::load()?;

    // 2. Initialize tracing; RUST_LOG overrides the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.level)),
        )
        .init();

    info!(
        path = %PluginConfig::config_path().display(),
        "feeds plugin starting"
    );

    // 3. Assemble the factory
    let factory = MedianFactory::new(&config, median_report_codec())?;
    info!(
        max_report_length = factory.report_codec().max_report_length(MAX_ORACLES)?,
        "median report codec ready"
    );

    // 4. Serve until interrupted
    let service = FactoryService::new("ReportingPluginFactory", factory);
    service.start()?;
    for (name, health) in service.health_report() {
        match health {
            Ok(()) => info!(service = %name, "healthy"),
            Err(e) => warn!(service = %name, error = %e, "unhealthy"),
        }
    }

    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received, shutting down");

    service.close()?;
    info!("feeds plugin stopped");
    Ok(())
}
