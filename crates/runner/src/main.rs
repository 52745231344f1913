//! Mock Drive Runner - Main Entry Point

use runner::{init_logging, install_metrics, run, RunnerConfig};
use std::path::PathBuf;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(Level::INFO)?;

    info!("=== Mock Drive Runner v{} ===", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = RunnerConfig::load(config_path.as_deref())?;
    let metrics = install_metrics()?;

    let report = run(&config).await?;
    println!("{}", report.to_json()?);

    info!("Metrics snapshot:\n{}", metrics.render());
    Ok(())
}
