//! Rollup contract deployer binary.

use clap::Parser;
use rollup_deployer_cli::Cli;

#[tokio::main]
async fn main() {
    init_tracing_subscriber();

    if let Err(err) = Cli::parse().run().await {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber. Logs are written to stderr, filtered by `RUST_LOG` and
/// defaulting to `info`.
fn init_tracing_subscriber() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}
