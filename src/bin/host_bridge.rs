//! Headless host bridge for stdin/stdout JSON communication.
//!
//! Reads `CommandEnvelope` messages as newline-delimited JSON from stdin,
//! dispatches them to the application, and writes `ResponseEnvelope` and
//! `EventEnvelope` messages to stdout.
//!
//! All tracing output goes to stderr and the log file so that stdout
//! remains a clean JSON protocol channel.

use anyhow::Context;
use jaculatoria::host::{EventSink, run_stdio_bridge};
use jaculatoria::{App, RuntimeConfig, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RuntimeConfig::load_default().context("loading runtime config")?;
    let _log_guard = logging::init().context("initialising logging")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        assets = %config.assets_dir.display(),
        "jaculatoria-host starting"
    );

    let events = EventSink::new(config.host.event_capacity);
    let app = App::from_config(&config, events.clone()).context("building application")?;
    app.start();

    let result = run_stdio_bridge(app.clone(), events, config.host).await;
    app.shutdown();

    result.map_err(|e| {
        tracing::error!(error = %e, "jaculatoria-host exited with error");
        anyhow::anyhow!("jaculatoria-host failed: {e}")
    })?;

    tracing::info!("jaculatoria-host shut down cleanly");
    Ok(())
}
