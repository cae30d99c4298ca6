use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::{config::DbConfig, migration::Migrator};

/// Create a SeaORM connection pool.
pub async fn create_orm_conn(config: &DbConfig) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .sqlx_logging(config.sql_logging);
    let conn = Database::connect(options).await?;
    tracing::debug!(
        backend = ?conn.get_database_backend(),
        max_connections = config.max_connections,
        "database connected"
    );
    Ok(conn)
}

/// Apply every pending schema migration.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    Migrator::up(conn, None).await?;
    Ok(())
}
