use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Fallback when no database URL is configured (local runs and tests).
pub const EPHEMERAL_URL: &str = "sqlite::memory:";

/// Connect to the database and return a SeaORM [`DatabaseConnection`].
///
/// A private in-memory sqlite database exists per connection, so the pool
/// is clamped to a single connection for [`EPHEMERAL_URL`].
pub async fn connect(db_url: &str, max_connections: u32) -> Result<DatabaseConnection> {
    let max_connections = if db_url == EPHEMERAL_URL {
        1
    } else {
        max_connections
    };
    let mut opts = ConnectOptions::new(db_url.to_owned());
    opts.max_connections(max_connections)
        .sqlx_logging_level(log::LevelFilter::Debug);
    let db = Database::connect(opts).await?;
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connects_to_an_ephemeral_database() {
        let db = connect(EPHEMERAL_URL, 10).await.unwrap();
        assert!(db.ping().await.is_ok());
    }
}
