use clap::Parser;

use kierki_client::cli::Args;
use kierki_client::{runtime, telemetry};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    telemetry::init_tracing();
    runtime::run(args).await
}
