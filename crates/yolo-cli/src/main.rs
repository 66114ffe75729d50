//! yolo-weights CLI
//!
//! Inspect and pack pretrained convolutional weight stores.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use tracing::{debug, error};
use yolo_common::StoreConfig;

mod commands;

use commands::{ConfigAction, InspectCommand, PackCommand};

/// Pretrained weights store toolkit
#[derive(Parser)]
#[command(name = "yolo-weights")]
#[command(about = "Inspect and pack pretrained convolutional weights")]
#[command(long_about = r#"
Tools for the versioned flat-array weight store used by the YOLO loader.

Examples:
  # Show a 3x3 kernel with 3 input and 32 output channels
  yolo-weights --root weights inspect conv_0 --kind kernel --width 3 --height 3 --input-depth 3 --output-depth 32

  # Pack a JSON array as batch-norm gamma
  yolo-weights --root weights pack bn_0_gamma --input gamma.json --output-depth 32

  # Print the effective configuration
  yolo-weights config show
"#)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Store root directory (overrides config and YOLO_WEIGHTS_ROOT)
    #[arg(long, value_name = "DIR", global = true)]
    root: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true, default_value = "warn")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a stored parameter and print its shape and statistics
    Inspect(InspectCommand),

    /// Write flat values into the store
    Pack(PackCommand),

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Compact,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli.log_level, cli.log_format);

    let result = load_configuration(&cli).and_then(|config| match cli.command {
        Some(Commands::Inspect(cmd)) => cmd.execute(&config),
        Some(Commands::Pack(cmd)) => cmd.execute(&config),
        Some(Commands::Config { action }) => action.execute(&config),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    });

    if let Err(e) = result {
        error!("Command failed: {}", e);

        let mut source = e.source();
        while let Some(err) = source {
            error!("  Caused by: {}", err);
            source = err.source();
        }

        std::process::exit(1);
    }

    Ok(())
}

/// Resolve the store configuration from file or environment, then CLI flags.
fn load_configuration(cli: &Cli) -> Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => StoreConfig::from_env().context("Failed to load configuration from environment")?,
    };

    if let Some(root) = &cli.root {
        config = config.with_root(root);
    }
    config.validate().context("Invalid configuration")?;

    debug!("Effective configuration: {:?}", config);
    Ok(config)
}

fn setup_logging(level: &str, format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => {
            subscriber.json().with_timer(tracing_subscriber::fmt::time::uptime()).init();
        }
        LogFormat::Compact => subscriber.compact().init(),
        LogFormat::Pretty => subscriber.pretty().init(),
    }
}
