use std::{str::FromStr, time::Duration};

use sea_orm::sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use sea_orm_migration::MigratorTrait;

pub mod entities;
pub mod models;
pub mod types;

pub use sea_orm::{DbErr, TransactionTrait};

pub type DbPool = DatabaseConnection;

#[derive(Clone)]
pub struct DBService {
    pub pool: DbPool,
}

impl DBService {
    /// Open (creating if missing) the database at `database_url` and bring
    /// the schema up to date.
    pub async fn new(database_url: &str) -> Result<DBService, DbErr> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| DbErr::Custom(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| DbErr::Custom(format!("database connection failed: {e}")))?;
        let pool = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);
        db_migration::Migrator::up(&pool, None).await?;
        Ok(DBService { pool })
    }

    /// Wrap an already-connected database, e.g. an in-memory one in tests.
    pub fn from_connection(pool: DatabaseConnection) -> DBService {
        DBService { pool }
    }
}
