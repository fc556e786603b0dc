//! Bridge server entry point.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sbridge_runner::config::BridgeConfig;
use sbridge_runner::server::{BridgeServer, SessionWriter};
use sbridge_runner::sim_client::SimClient;
use sbridge_runtime::{Dispatcher, JsonDocumentCache};

#[derive(Debug, Parser)]
#[command(name = "sbridge", about = "Serial-to-device-shadow bridge server")]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured listen port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the configured chunk size.
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = match &args.config {
        Some(path) => match BridgeConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("sbridge: {}", e);
                process::exit(1);
            }
        },
        None => BridgeConfig::default(),
    };
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Err(e) = config.validate() {
        eprintln!("sbridge: {}", e);
        process::exit(1);
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let server = match BridgeServer::bind(&addr, config.max_line).await {
        Ok(server) => server,
        Err(e) => {
            eprintln!("sbridge: failed to bind {}: {}", addr, e);
            process::exit(1);
        }
    };
    info!(
        addr = %addr,
        chunk_size = config.chunk_size,
        documents = config.documents.len(),
        "bridge listening"
    );

    let result = server
        .serve(|| {
            let mut cache = JsonDocumentCache::new();
            for (identifier, document) in &config.documents {
                cache.insert(identifier.clone(), document.clone());
            }
            let mut dispatcher = Dispatcher::new(SessionWriter::new(config.chunk_size));
            dispatcher.set_client(Box::new(SimClient::new()));
            dispatcher.set_shadow(Box::new(cache));
            dispatcher
        })
        .await;

    if let Err(e) = result {
        eprintln!("sbridge: server error: {}", e);
        process::exit(1);
    }
}
