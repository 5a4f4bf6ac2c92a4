use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use trellis_metadata::Reflect;
use trellis_schema::Schema;

use super::UnwrapOrExit;

#[derive(Args)]
pub struct CheckCommand {
    /// Path to the schema file
    schema: PathBuf,
}

impl CheckCommand {
    pub fn run(&self) -> Result<()> {
        let schema = Schema::from_file(&self.schema).unwrap_or_exit();
        println!(
            "{}: {} types, {} operations",
            schema.name,
            schema.arena.len(),
            schema.operations.len()
        );
        Ok(())
    }
}
