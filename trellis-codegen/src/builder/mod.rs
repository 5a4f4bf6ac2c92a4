//! Code generation building blocks.
//!
//! - [`CodeBuilder`] - indented line-by-line text assembly
//! - [`Indent`] - indentation configuration

mod code_builder;
mod indent;

pub use code_builder::CodeBuilder;
pub use indent::Indent;
