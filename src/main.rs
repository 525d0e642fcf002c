//! TeamUp - team formation with AI failure-risk audits

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use teamup::{
    config::Args,
    db::{MemoryTeamStore, MongoClient, MongoTeamStore, SharedStore, TeamStore},
    logging::UsageLogger,
    oracle::{GeminiOracle, Oracle, ScriptedOracle, SharedOracle},
    risk::{DemoShowcaseOverride, NoOverride, VerdictOverride},
    seed, server, TeamUpService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("teamup={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  TeamUp - Team Risk Audits");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {}", args.mongodb_uri);
    info!("Daily oracle quota: {}", args.daily_quota);
    info!(
        "Showcase override: {}",
        if args.demo_override { args.demo_title.as_str() } else { "off" }
    );
    info!("======================================");

    let usage = UsageLogger::new(args.node_id.to_string());
    if let Some(ref path) = args.usage_log {
        if let Err(e) = usage.init_file(path.clone()).await {
            warn!("Usage log {} unavailable, logging to tracing only: {}", path.display(), e);
        }
    }

    // MongoDB is optional in dev mode
    let (store, store_kind): (SharedStore, &'static str) =
        match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
            Ok(client) => {
                info!("MongoDB connected successfully");
                let store: SharedStore = Arc::new(MongoTeamStore::new(&client).await?);
                (store, "mongodb")
            }
            Err(e) => {
                if args.dev_mode {
                    warn!("MongoDB connection failed (dev mode, using in-memory store): {}", e);
                    let store: SharedStore = Arc::new(MemoryTeamStore::new());
                    (store, "memory")
                } else {
                    error!("MongoDB connection failed: {}", e);
                    std::process::exit(1);
                }
            }
        };

    if args.seed_demo {
        if store.count_ideas().await? == 0 {
            let summary = seed::seed_demo(store.as_ref()).await?;
            info!(idea_id = %summary.idea_id, "Showcase scenario installed");
        } else {
            warn!("Store already holds ideas, skipping showcase seeding");
        }
    }

    let oracle: SharedOracle = match args.oracle.gemini_config() {
        Some(config) => Arc::new(GeminiOracle::new(config)?),
        None => {
            warn!("No GEMINI_API_KEY set (dev mode): oracle calls will fail");
            Arc::new(ScriptedOracle::new())
        }
    };
    info!("Oracle model: {}", oracle.model());

    let override_policy: Arc<dyn VerdictOverride> = if args.demo_override {
        Arc::new(DemoShowcaseOverride::new(
            args.demo_title.clone(),
            args.demo_min_team,
        ))
    } else {
        Arc::new(NoOverride)
    };

    let service = TeamUpService::new(
        Arc::clone(&store),
        Arc::clone(&oracle),
        override_policy,
        args.daily_quota,
        usage,
    );

    let oracle_model = oracle.model().to_string();
    let state = Arc::new(server::AppState::new(args, service, store_kind, oracle_model));

    if let Err(e) = server::run(state).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
