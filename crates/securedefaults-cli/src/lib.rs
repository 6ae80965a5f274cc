//! SecureDefaults command-line interface.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use securedefaults_core::env::vars;
use securedefaults_core::{paths, Config};

use commands::store::ValueType;
use commands::Context;

/// SecureDefaults - encrypted key-value preferences
#[derive(Parser)]
#[command(name = "securedefaults")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = vars::SECUREDEFAULTS_CONFIG, global = true)]
    pub config: Option<PathBuf>,

    /// Suite (namespace) to operate on, overriding the config
    #[arg(short, long, global = true)]
    pub suite: Option<String>,

    /// Password used when key material has to be derived
    #[arg(long, env = vars::SECUREDEFAULTS_PASSWORD, hide_env_values = true, global = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Config file the command operates on.
    pub fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Ok(paths::config_file()?),
        }
    }
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print a decrypted value
    Get {
        /// Preference name
        name: String,

        /// Print the stored bytes (hex) without decrypting
        #[arg(long)]
        raw: bool,
    },

    /// Encrypt and store a value
    Set {
        /// Preference name
        name: String,

        /// Value, interpreted according to --type
        value: String,

        /// How to interpret the value
        #[arg(long = "type", value_enum, default_value_t = ValueType::String)]
        kind: ValueType,
    },

    /// Remove a value
    Remove {
        /// Preference name
        name: String,
    },

    /// Store a value as-is, without encryption
    RawSet {
        /// Preference name
        name: String,

        /// Value stored as UTF-8 bytes
        value: String,
    },

    /// Replace the password and derive new key material
    ///
    /// Values written under the old key can no longer be read.
    Password,

    /// Show the suite, storage locations and key material state
    Status,

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Show version information
    Version,
}

/// Run the CLI with the given arguments.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config_path()?;
    match cli.command {
        Commands::Config(args) => commands::config::run(args, &config_path),
        Commands::Version => {
            println!("securedefaults {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        command => {
            let mut config = Config::load_or_default(&config_path)?;
            if cli.suite.is_some() {
                config.suite = cli.suite;
            }
            let ctx = Context::new(config_path, config, cli.password);
            run_store_command(&ctx, command)
        }
    }
}

fn run_store_command(ctx: &Context, command: Commands) -> anyhow::Result<()> {
    use commands::store;

    match command {
        Commands::Get { name, raw } => store::get(ctx, &name, raw),
        Commands::Set { name, value, kind } => store::set(ctx, &name, &value, kind),
        Commands::Remove { name } => store::remove(ctx, &name),
        Commands::RawSet { name, value } => store::raw_set(ctx, &name, &value),
        Commands::Password => store::password(ctx),
        Commands::Status => store::status(ctx),
        Commands::Config(_) | Commands::Version => Ok(()),
    }
}

/// Log filter used when `SECUREDEFAULTS_LOG` is unset.
///
/// `-v` selects debug and `-vv` trace; otherwise the configured level
/// applies. A configured value that is already a directive list is used
/// as-is.
pub fn log_filter(verbose: u8, configured: Option<&str>) -> String {
    let level = match verbose {
        0 => configured.filter(|l| !l.trim().is_empty()).unwrap_or("warn"),
        1 => "debug",
        _ => "trace",
    };
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("securedefaults={level}")
    }
}
