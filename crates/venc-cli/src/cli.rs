
use clap::{Parser, Subcommand};

use crate::commands::{
    InitDatabase,
    SeedExamples,
    Items,
};

#[derive(Parser, Debug)]
#[clap(name = "venc", version=env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[clap(long, env = "DATABASE_URL", default_value = "sqlite://vencimientos.sqlite3")]
    pub database_url: String,

    #[clap(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn init() -> Self {
        Self::parse()
    }
}


#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install the database schema
    #[clap(name = "init")]
    Init(InitDatabase),
    /// Create example items in an empty database
    #[clap(name = "seed")]
    Seed(SeedExamples),
    /// Manage due items
    #[clap(subcommand)]
    Items(Items),
}
