use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use panchayat_carbon_service::seed::{fallback_panchayats, load_panchayat_file, Seeder};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

#[derive(Parser)]
#[command(name = "seed-data")]
#[command(about = "Seed emission factors, panchayats and starter accounts", long_about = None)]
struct Cli {
    /// Database connection string
    #[arg(long, env)]
    database_url: String,

    /// JSON file of panchayats: [{"id"?, "name", "district", "state"?}]
    #[arg(long, default_value = "kerala_panchayats.json")]
    panchayats_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists (ignore errors if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&cli.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let seeder = Seeder::new(pool);

    let factors = seeder.seed_factors().await?;
    info!("Active emission factors: row {}", factors.id);

    let seeds = load_panchayat_file(&cli.panchayats_file)?;
    let total = seeds
        .as_ref()
        .map_or_else(|| fallback_panchayats().len(), Vec::len);
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );
    let created = seeder.seed_panchayats(seeds, || pb.inc(1)).await?;
    pb.finish_with_message(format!("✓ {created} panchayats created"));

    let users = seeder.seed_users().await?;
    info!("Seeding complete: {created} panchayats, {users} users created");

    Ok(())
}
