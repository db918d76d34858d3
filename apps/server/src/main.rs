use anyhow::Context;
use clap::Parser;
use tokio::time::Duration;
use tracing::info;

use kierki_server::cli::Args;
use kierki_server::runtime::Server;
use kierki_server::{schedule, telemetry};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    telemetry::init_tracing();

    let schedule = schedule::load_schedule(&args.file)
        .with_context(|| format!("failed to load deal schedule {}", args.file.display()))?;
    info!(deals = schedule.len(), "loaded deal schedule");

    let server = Server::bind(
        ("::", args.port),
        schedule,
        Duration::from_secs(args.timeout_secs),
    )
    .await
    .with_context(|| format!("failed to bind port {}", args.port))?;
    info!(addr = %server.local_addr()?, "listening");

    server.run().await.context("server failed")?;
    Ok(())
}
