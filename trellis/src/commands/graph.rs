use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use trellis_ir::ConfigOverrides;
use trellis_schema::Schema;

use super::UnwrapOrExit;

#[derive(Args)]
pub struct GraphCommand {
    /// Path to the schema file
    schema: PathBuf,
}

impl GraphCommand {
    pub fn run(&self) -> Result<()> {
        let schema = Schema::from_file(&self.schema).unwrap_or_exit();
        let graph = schema.build_graph(&ConfigOverrides::default());
        println!("{}", serde_json::to_string_pretty(&graph)?);
        Ok(())
    }
}
