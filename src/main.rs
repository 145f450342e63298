mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing on stderr, so stdout stays clean for command output.
///
/// Filter directives come from `ANYFLUX_LOG` (default: `info`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("ANYFLUX_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    cli::run(cli::Cli::parse())
}
