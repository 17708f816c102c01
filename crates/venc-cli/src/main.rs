use anyhow::Result;
use env_logger::Env;

use venc_cli::cli::{Command, Cli};
use venc_db::Connection;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::init();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let conn = Connection::open(&cli.database_url).await?;
    let result = match cli.command {
        Command::Init(cmd) => cmd.run(&conn).await,
        Command::Seed(cmd) => cmd.run(&conn).await,
        Command::Items(cmd) => cmd.run(&conn).await,
    };
    conn.close().await;

    result
}
