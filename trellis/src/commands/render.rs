use std::fs;
use std::path::PathBuf;

use clap::Args;
use eyre::{Result, WrapErr};
use trellis_codegen::{Emitter, Language};
use trellis_codegen_vbnet::VbNetGenerator;
use trellis_ir::ConfigOverrides;
use trellis_schema::Schema;

use super::UnwrapOrExit;

#[derive(Args)]
pub struct RenderCommand {
    /// Path to the schema file
    schema: PathBuf,

    /// Target language
    #[arg(long, default_value = "vbnet")]
    lang: Language,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the configured base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Override whether classes are emitted as Partial
    #[arg(long)]
    make_partial: Option<bool>,

    /// Override whether properties are emitted as Overridable
    #[arg(long)]
    make_virtual: Option<bool>,

    /// Override the implicit version stamped into operation constructors
    #[arg(long)]
    add_implicit_version: Option<i32>,
}

impl RenderCommand {
    pub fn run(&self) -> Result<()> {
        let schema = Schema::from_file(&self.schema).unwrap_or_exit();

        let overrides = ConfigOverrides {
            base_url: self.base_url.clone(),
            make_partial: self.make_partial,
            make_virtual: self.make_virtual,
            add_implicit_version: self.add_implicit_version,
            ..Default::default()
        };
        let graph = schema.build_graph(&overrides);

        let emitter: Box<dyn Emitter> = match self.lang {
            Language::VbNet => Box::new(VbNetGenerator),
        };
        let code = emitter.render(&graph)?;

        match &self.output {
            Some(path) => fs::write(path, code)
                .wrap_err_with(|| format!("failed to write '{}'", path.display()))?,
            None => print!("{code}"),
        }

        Ok(())
    }
}
