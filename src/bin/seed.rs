//! TeamUp Seed - installs the showcase scenario into MongoDB
//!
//! Clears ideas, members and applications, then creates the "AI Study
//! Buddy" idea with a team missing its backend developer.
//!
//! Usage:
//!   teamup-seed --mongodb-uri mongodb://localhost:27017 --mongodb-db teamup
//!
//! Environment variables:
//!   MONGODB_URI - MongoDB connection URI (default: mongodb://localhost:27017)
//!   MONGODB_DB - Database name (default: teamup)

use clap::Parser;
use teamup::db::{MongoClient, MongoTeamStore};
use teamup::seed::seed_demo;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "teamup-seed")]
#[command(about = "Install the TeamUp showcase scenario")]
#[command(version)]
struct Args {
    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "teamup")]
    mongodb_db: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,teamup=debug")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let client = MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await?;
    info!("MongoDB connected for seeding ({})", client.db_name());
    let store = MongoTeamStore::new(&client).await?;

    info!("Clearing old data...");
    store.clear_demo_data().await?;

    let summary = seed_demo(&store).await?;
    info!(
        idea_id = %summary.idea_id,
        pending_application = %summary.pending_application,
        "Seed complete. Accept Mike's application to complete the team"
    );

    Ok(())
}
