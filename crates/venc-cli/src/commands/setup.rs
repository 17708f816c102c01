use anyhow::Result;
use clap::Args;

use venc_db::{schema, seed, Connection};

#[derive(Args, Debug)]
pub struct InitDatabase {}

impl InitDatabase {
    /// Initialize the database
    pub async fn run(self, db: &Connection) -> Result<()> {
        schema::install(db).await?;
        println!("Database schema installed.");
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SeedExamples {}

impl SeedExamples {
    /// Install the schema if needed and add the example items
    pub async fn run(self, db: &Connection) -> Result<()> {
        schema::install(db).await?;
        let count = seed::seed_examples(db).await?;
        if count == 0 {
            println!("Database is not empty, no examples added.");
        } else {
            println!("{} example items added.", count);
        }
        Ok(())
    }
}
