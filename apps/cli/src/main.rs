//! gameshelf command line entry point.

mod app;
mod cli;
mod config;

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so listings stay pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli::build_command().get_matches();

    let config = config::Config::load()?;
    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        install_dir = %config.install_dir,
        "configuration loaded"
    );

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(app::run(config, matches))
}
