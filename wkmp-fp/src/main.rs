//! wkmp-fp - Audio fingerprint lookup
//!
//! Identifies each audio file named on the command line: WAV files are read
//! directly, MP3 and Ogg Vorbis files are decoded with `lame` / `oggdec`,
//! then fingerprinted with Chromaprint and looked up on AcoustID.
//!
//! Results go to standard output, logs to standard error.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use wkmp_fp::config::{FpConfig, MODULE_NAME};
use wkmp_fp::fingerprint::ChromaprintFingerprinter;
use wkmp_fp::lookup::AcoustIdClient;
use wkmp_fp::{Driver, FailurePolicy};

#[derive(Parser)]
#[command(name = "wkmp-fp")]
#[command(about = "Identify audio files by acoustic fingerprint")]
#[command(version)]
struct Cli {
    /// Audio files to identify (.wav, .mp3, .ogg)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Config file (default: ~/.config/wkmp/wkmp-fp.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// AcoustID client key
    #[arg(long)]
    client_key: Option<String>,

    /// Keep processing after a file fails and print a summary
    #[arg(long)]
    keep_going: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (toml_config, config_origin) =
        wkmp_common::config::load_config(cli.config.as_deref(), MODULE_NAME)?;

    // RUST_LOG overrides the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&toml_config.logging.level))
        .context("Invalid logging level")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting wkmp-fp (fingerprint lookup)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    config_origin.log();

    let config = FpConfig::resolve(cli.client_key.as_deref(), &toml_config);
    let policy = if cli.keep_going {
        FailurePolicy::Continue
    } else {
        FailurePolicy::Abort
    };

    let driver = Driver::new(
        config.file_loader(),
        ChromaprintFingerprinter::new(),
        AcoustIdClient::new()?,
        config.client.clone(),
    )
    .with_policy(policy);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = driver.run(&cli.files, &mut out).await?;
    out.flush()?;

    std::process::exit(report.exit_code());
}
