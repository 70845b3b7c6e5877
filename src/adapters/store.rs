//! PostgreSQL account/algorithm store adapter.
//!
//! This core is a read-only consumer: it streams running accounts and loads
//! the algorithm directory fresh on every run. A malformed row is logged and
//! skipped; a stream-level query error is fatal to the run.

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Account, AccountStatus};
use crate::error::{Result, TransactorError};

/// Source of accounts and the algorithm directory for one run.
#[async_trait]
pub trait AccountFeed: Send + Sync {
    /// Full algorithm-id → algorithm-name mapping, loaded once per run.
    async fn algorithm_directory(&self) -> Result<HashMap<Uuid, String>>;

    /// Lazy, forward-only stream of accounts with `status = running`.
    ///
    /// Items are per-record: a `Decode` error means that one row was
    /// malformed, any other error is a store failure that ends the stream.
    fn running_accounts(&self) -> BoxStream<'_, Result<Account>>;
}

/// PostgreSQL storage adapter
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect to the account store.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Run migrations (local/dev bring-up; production owns its own schema).
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn decode_account(row: &PgRow) -> Result<Account> {
    let decode = |e: sqlx::Error| TransactorError::Decode(e.to_string());

    let pair_raw: String = row.try_get("pair").map_err(decode)?;
    let pair = pair_raw.parse().map_err(TransactorError::Decode)?;

    Ok(Account {
        id: row.try_get("id").map_err(decode)?,
        algorithm: row.try_get("algorithm").map_err(decode)?,
        encrypted_private_key: row.try_get("encrypted_private_key").map_err(decode)?,
        pair,
        provider: row.try_get("provider").map_err(decode)?,
        interval: row.try_get("interval").map_err(decode)?,
    })
}

#[async_trait]
impl AccountFeed for PostgresStore {
    async fn algorithm_directory(&self) -> Result<HashMap<Uuid, String>> {
        let mut directory = HashMap::new();

        let mut rows = sqlx::query("SELECT id, name FROM algorithms").fetch(&self.pool);
        while let Some(row) = rows.next().await {
            let row = row?;
            let id: Uuid = match row.try_get("id") {
                Ok(id) => id,
                Err(e) => {
                    warn!("Skipping malformed algorithm row: {e}");
                    continue;
                }
            };
            let name: String = match row.try_get("name") {
                Ok(name) => name,
                Err(e) => {
                    warn!(algorithm = %id, "Skipping malformed algorithm row: {e}");
                    continue;
                }
            };
            directory.insert(id, name);
        }

        info!(algorithms = directory.len(), "Loaded algorithm directory");
        Ok(directory)
    }

    fn running_accounts(&self) -> BoxStream<'_, Result<Account>> {
        sqlx::query(
            r#"
            SELECT id, algorithm, encrypted_private_key, pair, provider, interval
            FROM accounts
            WHERE status = $1
            "#,
        )
        .bind(AccountStatus::Running.as_str())
        .fetch(&self.pool)
        .map(|row| match row {
            Ok(row) => decode_account(&row),
            Err(e) => Err(TransactorError::Store(e)),
        })
        .boxed()
    }
}
