use sea_orm_migration::MigratorTrait;
use smart_economato::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    migration::Migrator,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;

    let pending = Migrator::get_pending_migrations(&orm).await?;
    if pending.is_empty() {
        info!("schema is up to date");
        return Ok(());
    }
    for migration in &pending {
        info!(name = migration.name(), "pending migration");
    }

    run_migrations(&orm).await?;
    info!(applied = pending.len(), "migrations applied");
    Ok(())
}
