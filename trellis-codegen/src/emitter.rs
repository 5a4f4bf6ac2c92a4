//! Language-agnostic emitter contract.

use std::fmt;
use std::str::FromStr;

use eyre::Result;
use trellis_ir::MetadataGraph;

/// Trait for language-specific source emitters.
///
/// An emitter is stateless given the graph: the graph carries the resolved
/// configuration snapshot, and `render` produces the complete source text
/// in one call. Implement this trait to add a new target language.
pub trait Emitter {
    /// Language identifier (e.g. "vbnet")
    fn language(&self) -> &'static str;

    /// File extension for generated source files (e.g. "vb")
    fn file_extension(&self) -> &'static str;

    /// Render the whole graph as one source document.
    ///
    /// # Errors
    ///
    /// Returns an error when the graph carries metadata that cannot be
    /// interpolated safely; no partial output is produced.
    fn render(&self, graph: &MetadataGraph) -> Result<String>;
}

/// Supported target languages.
///
/// The VB.NET generator is the reference instantiation of the [`Emitter`]
/// contract; further languages add a variant here and a generator crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    VbNet,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::VbNet => "vbnet",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vbnet" | "vb" => Ok(Language::VbNet),
            other => Err(format!("unknown language '{other}', expected one of: vbnet")),
        }
    }
}

/// Namespaces reserved for the platform; emitters never render type
/// declarations into them.
pub fn is_reserved_namespace(namespace: &str) -> bool {
    namespace.starts_with("System")
}
