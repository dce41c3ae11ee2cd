use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cropcast::{run, AppState, Args};
use cropcast::db::MongoClient;

#[tokio::main]
async fn main() {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cropcast={},info", args.log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    info!("Starting Cropcast v{}", env!("CARGO_PKG_VERSION"));
    info!("Node ID: {}", args.node_id);
    info!("Listen address: {}", args.listen);
    info!("Model version: {}", args.model_version);
    info!(
        "Mode: {}",
        if args.dev_mode {
            "development"
        } else {
            "production"
        }
    );
    if let Some(url) = &args.billing_url {
        info!("Billing service: {}", url);
    } else {
        info!("Billing service: not configured (stored profile tier is used)");
    }

    // Connect to MongoDB. In dev mode a failed connection degrades the
    // service instead of aborting it; prediction and profile endpoints
    // respond 503 until a database is available.
    let mongo = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => Some(client),
        Err(e) => {
            if args.dev_mode {
                warn!("MongoDB unavailable, running degraded: {}", e);
                None
            } else {
                error!("Failed to connect to MongoDB: {}", e);
                std::process::exit(1);
            }
        }
    };

    let state = match AppState::new(args, mongo) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to initialize: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(state).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
