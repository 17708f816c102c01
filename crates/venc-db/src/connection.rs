use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use log::info;
use sqlx::sqlite::{
    SqliteConnectOptions,
    SqliteJournalMode,
    SqlitePool,
    SqlitePoolOptions,
};

use crate::schema;

const MAX_CONNECTIONS: u32 = 8;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A handle to the database, safe to share between tasks.
/// Clones use the same connection pool.
#[derive(Debug, Clone)]
pub struct Connection {
    pool: SqlitePool,
}

impl Connection {
    /// Open a connection to the database.
    /// The database file is created if missing.
    pub async fn open(url: &str) -> Result<Self> {
        let opts = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(opts)
            .await?;
        info!("opened database {}", url);
        Ok(Self { pool })
    }

    /// Open a new test database connection.
    /// The database will be created on each open.
    pub async fn open_test() -> (TestHandle, Self) {
        let filename = format!("/tmp/vencimientos_test_{}.sqlite3", rand::random::<u64>());
        let handle = TestHandle { filename: filename.clone() };
        let conn = Self::open(&filename).await.unwrap();

        // Install the schema
        schema::install(&conn).await.unwrap();

        (handle, conn)
    }

    /// Wait for all pooled connections to close.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("database closed");
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Removes the test database files when dropped.
pub struct TestHandle {
    filename: String
}

impl Drop for TestHandle {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let filename = format!("{}{}", self.filename, suffix);
            let path = Path::new(&filename);
            if path.exists() {
                let _ = fs::remove_file(path);
            }
        }
    }
}
