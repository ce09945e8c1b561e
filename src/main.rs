mod config;
mod error;
mod migration;
mod models;
mod services;
mod utils;

use sea_orm_migration::MigratorTrait;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Ops entry point: apply migrations and seed the default notification
/// templates. The engine itself is a library invoked in-process by the
/// order/product/customer modules.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verko=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration before doing anything else
    let db_config = config::database::DbConfig::from_env()?;

    tracing::info!("Starting Verko notification setup v{}...", env!("CARGO_PKG_VERSION"));

    let db = db_config.connect().await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let seeded = services::bootstrap_templates::ensure_default_templates(&db).await?;
    tracing::info!(seeded, "Default templates ensured");

    let email_service = services::email::EmailService::from_env();
    if email_service.is_configured() {
        tracing::info!("SMTP email service configured");
    } else {
        tracing::warn!("SMTP not configured, notification emails will stay pending");
    }

    Ok(())
}
