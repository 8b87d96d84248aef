use std::{future::Future, pin::Pin, time::Duration};

use anyhow::Result;
use sea_orm::{
    ConnectOptions, Database, DatabaseConnection, DatabaseTransaction, TransactionError,
    TransactionTrait,
};
use sea_orm_migration::MigratorTrait;

use crate::{
    error::{AppError, AppResult},
    migration::Migrator,
};

/// Create a SeaORM connection.
///
/// An in-memory SQLite database lives only as long as its connection, so
/// that URL is pinned to a single pooled connection.
pub async fn create_orm_conn(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    if database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory") {
        options.max_connections(1).min_connections(1);
    }
    let conn = Database::connect(options).await?;
    Ok(conn)
}

/// Apply every pending schema migration.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    Migrator::up(conn, None).await?;
    Ok(())
}

/// Run `work` inside one database transaction: committed when it returns
/// `Ok`, rolled back when it returns `Err`.
pub async fn with_transaction<T, F>(conn: &DatabaseConnection, work: F) -> AppResult<T>
where
    F: for<'c> FnOnce(
            &'c DatabaseTransaction,
        ) -> Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'c>>
        + Send,
    T: Send,
{
    conn.transaction::<F, T, AppError>(work)
        .await
        .map_err(|err| match err {
            TransactionError::Connection(db_err) => AppError::from(db_err),
            TransactionError::Transaction(app_err) => app_err,
        })
}
