//! SecureDefaults CLI entry point.

use clap::Parser;
use securedefaults_cli::{log_filter, run, Cli};
use securedefaults_core::env::{self, vars};
use securedefaults_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The config may be broken; logging still has to come up to report it.
    let configured = cli
        .config_path()
        .ok()
        .and_then(|path| Config::load_or_default(&path).ok())
        .map(|config| config.logging.level);
    let filter = match env::get_var(vars::SECUREDEFAULTS_LOG) {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::new(log_filter(cli.verbose, configured.as_deref())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    run(cli)
}
