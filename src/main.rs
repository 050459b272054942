use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use sunsynk_export::{config, Settings, SunsynkExporterBuilder};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Export a Sunsynk plant's monthly and daily energy history to Excel.
///
/// Credentials are read from SUNSYNK_USERNAME / SUNSYNK_PASSWORD (or
/// SUNSYNK_BEARER_TOKEN), optionally via a `.env` file.
#[derive(Debug, Parser)]
#[command(name = "sunsynk-export", version, about)]
struct Cli {
    /// Plant to export; defaults to SUNSYNK_PLANT_ID, then the account's first plant
    #[arg(long)]
    plant_id: Option<u64>,

    /// Directory the workbook is written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// API host override
    #[arg(long)]
    api_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = config::DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,
}

fn main() -> ExitCode {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(path) => {
            info!("data exported to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> sunsynk_export::Result<PathBuf> {
    let settings = Settings::from_env()?;

    let mut builder = SunsynkExporterBuilder::from_settings(settings)
        .timeout(Duration::from_secs(cli.timeout_secs));
    if let Some(url) = cli.api_url {
        builder = builder.base_url(url);
    }
    if let Some(id) = cli.plant_id {
        builder = builder.plant_id(id);
    }

    let mut exporter = builder.build()?;
    info!("starting export: {}", exporter);
    exporter.run(&cli.output_dir)
}
