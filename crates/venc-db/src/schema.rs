use anyhow::Result;
use log::info;
use sqlx::Executor;

use crate::Connection;

/// Install the database schema.
/// Existing tables are left untouched.
pub async fn install(conn: &Connection) -> Result<()> {
    let schema_data = include_str!("../db/schema.sql");
    info!("installing database schema");
    conn.pool().execute(schema_data).await?;
    Ok(())
}
