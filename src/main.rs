//! Healthbot - regional health assistant backend

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use healthbot::{
    config::{Args, LogFormat},
    db::{redact_uri, HealthStore, InMemoryHealthStore, MongoClient, MongoHealthStore},
    reference::seed_quizzes,
    server::{self, AppState},
};

fn init_tracing(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("healthbot={},info", args.log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    match args.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn connect_store(args: &Args) -> anyhow::Result<Arc<dyn HealthStore>> {
    let connected = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => MongoHealthStore::new(client).await,
        Err(e) => Err(e),
    };

    match connected {
        Ok(store) => {
            info!("MongoDB connected successfully");
            Ok(Arc::new(store))
        }
        Err(e) if args.dev_mode => {
            warn!("MongoDB connection failed (dev mode, using in-memory store): {}", e);
            let store = InMemoryHealthStore::new();
            let seeded = seed_quizzes(&store).await?;
            info!("Seeded {} quizzes into the in-memory store", seeded);
            Ok(Arc::new(store))
        }
        Err(e) => Err(anyhow::anyhow!("MongoDB connection failed: {}", e)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing(&args);

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Healthbot - {} health assistant", args.region_name);
    info!("======================================");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!(
        "MongoDB: {} (db: {})",
        redact_uri(&args.mongodb_uri),
        args.mongodb_db
    );
    info!("Classifier: {}", args.classifier.classifier_url);
    info!("LLM: {} ({})", args.llm.llm_api_url, args.llm.llm_model);
    info!("Cache dir: {}", args.cache_dir.display());
    info!("======================================");

    let store = connect_store(&args).await?;
    let state = Arc::new(AppState::new(args, store));

    server::run(state).await?;
    info!("Healthbot stopped");
    Ok(())
}
