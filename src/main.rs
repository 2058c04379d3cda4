use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use kinetic_endpoint::actuator::PinMap;
use kinetic_endpoint::config::{DEFAULT_BAUDRATE, DEFAULT_PORT};
use kinetic_endpoint::motor::export_all;
use kinetic_endpoint::runtime::{self, RunOptions};

/// Serial command endpoint for a two-motor controller
#[derive(Parser, Debug)]
#[command(name = "kinetic-endpoint", version)]
struct Args {
    /// Serial port the host writes commands to
    #[arg(short, long, default_value = DEFAULT_PORT)]
    port: String,

    /// Baud rate of the serial link
    #[arg(short, long, default_value_t = DEFAULT_BAUDRATE)]
    baud: u32,

    /// JSON pin map (defaults to the reference wiring)
    #[arg(long, value_name = "FILE")]
    pins: Option<PathBuf>,

    /// Log pin writes instead of publishing them over Zenoh
    #[arg(long)]
    simulate: bool,

    /// Write the host keymaps for both motors into DIR and exit
    #[arg(long, value_name = "DIR")]
    export_keymaps: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    if let Err(e) = start(args).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}

async fn start(args: Args) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if let Some(dir) = args.export_keymaps {
        export_all(dir)?;
        return Ok(());
    }

    let pins = match args.pins {
        Some(path) => PinMap::load(path)?,
        None => PinMap::default(),
    };

    runtime::run(RunOptions {
        port: args.port,
        baudrate: args.baud,
        pins,
        simulate: args.simulate,
    })
    .await
}
