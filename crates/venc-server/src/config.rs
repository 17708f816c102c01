use clap::Parser;

/// Server settings, read from the command line or the environment.
#[derive(Parser, Debug)]
#[clap(name = "venc-server", version=env!("CARGO_PKG_VERSION"))]
pub struct Config {
    /// Database url or file name
    #[clap(long, env = "DATABASE_URL", default_value = "sqlite://vencimientos.sqlite3")]
    pub database_url: String,

    /// Address to listen on
    #[clap(long, env = "BIND_ADDR", default_value = "127.0.0.1:8000")]
    pub bind: String,

    /// Do not create example items in an empty database
    #[clap(long, env = "NO_SEED")]
    pub no_seed: bool,

    /// Log level, overridden by RUST_LOG
    #[clap(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn init() -> Self {
        Self::parse()
    }
}
