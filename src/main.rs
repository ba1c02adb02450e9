use clap::Parser;
use miette::{IntoDiagnostic, Result};
use staffpay::interfaces::cli::{self, Cli};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Logs go to stderr so stdout stays parseable. `STAFFPAY_LOG` takes an
/// `EnvFilter` directive and defaults to `warn`.
fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_env("STAFFPAY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .init();
    } else {
        tracing_subscriber::registry().with(filter).with(layer).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    cli::run(cli).await.into_diagnostic()
}
