//! Mididash binary: console front-end for the control surface engine.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mididash::paths;
use mididash::storage::SledStorage;
use mididash::transport::midir_backend::MidirAccess;
use mididash::{ConfigStore, ControlSurface, Transport};

/// Mididash - virtual MIDI control surface
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Data directory (defaults to the platform data dir)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// List available MIDI outputs and exit
    #[arg(long)]
    list_ports: bool,

    /// Re-send every knob's current value and exit
    #[arg(long)]
    send_all: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let data_dir = paths::data_dir(args.data_dir);
    let db_path = paths::ensure_db_path(&data_dir)?;
    let storage = Arc::new(SledStorage::open(&db_path)?);
    info!("Data directory: {}", data_dir.display());

    let store = ConfigStore::new(storage.clone());
    let mut transport = Transport::new(Box::new(MidirAccess), storage);
    transport.initialize().await;

    if let Some(error) = transport.error() {
        eprintln!("{}", error);
    }

    let mut surface = ControlSurface::new(store, transport);

    if args.list_ports {
        for output in surface.transport().outputs() {
            println!("{}  {}", output.id, output.name);
        }
        return Ok(());
    }

    if args.send_all {
        surface.send_all();
        return Ok(());
    }

    mididash::cli::run_repl(&mut surface)
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}
