use std::env;

use amarea_site::{
    config::AppConfig,
    repository::PostgresRepository,
    seed::{self, SeedAdmin},
};
use sqlx::postgres::PgPoolOptions;

/// Seeds the default site content into the configured database.
///
/// Set `SEED_ADMIN_EMAIL` and `SEED_ADMIN_PASSWORD` to also create (or reset) an
/// admin account.
#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "amarea_site=info".into()),
        )
        .init();

    let config = AppConfig::load().expect("FATAL: invalid configuration");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("FATAL: database migrations failed");

    let repo = PostgresRepository::new(pool);
    let admin = SeedAdmin::from_lookup(|key| env::var(key).ok());
    if admin.is_none() {
        tracing::info!("SEED_ADMIN_EMAIL/SEED_ADMIN_PASSWORD not set, skipping admin account");
    }

    match seed::seed(&repo, admin).await {
        Ok(report) => tracing::info!(
            inserted = report.inserted,
            skipped = report.skipped,
            admin = ?report.admin,
            "seed complete"
        ),
        Err(e) => {
            tracing::error!("seed failed: {}", e);
            std::process::exit(1);
        }
    }
}
