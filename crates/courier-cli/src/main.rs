//! Courier CLI entry point.

use clap::Parser;
use courier_cli::{run, Cli};
use courier_core::env::vars;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays pipeable.
    let default_filter = match cli.verbose {
        0 => "courier=warn",
        1 => "courier=info",
        _ => "courier=debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(vars::COURIER_LOG)
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    run(cli).await
}
