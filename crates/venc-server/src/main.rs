use anyhow::Result;
use log::{info, warn};

use venc_db::{schema, seed, Connection};
use venc_server::{
    config::Config,
    logging,
    routes::{self, AppState},
};

/// Resolves on Ctrl-C
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("could not listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let config = Config::init();
    logging::init(&config.log_level);

    let db = Connection::open(&config.database_url).await?;
    schema::install(&db).await?;
    if !config.no_seed {
        seed::seed_examples(&db).await?;
    }

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("listening on {}", listener.local_addr()?);

    let state = AppState { db: db.clone() };
    axum::serve(listener, routes::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    Ok(())
}
