//! VB.NET source emitter for the Trellis service type-graph compiler.
//!
//! This crate is the reference instantiation of the shared
//! [`Emitter`] contract: it renders a [`trellis_ir::MetadataGraph`] as a
//! single VB.NET source document. Further target languages follow the same
//! contract with their own syntax tables.
//!
//! # Usage
//!
//! ```ignore
//! use trellis_codegen::Emitter;
//! use trellis_codegen_vbnet::VbNetGenerator;
//!
//! let graph = schema.build_graph(&overrides);
//! let code = VbNetGenerator.render(&graph)?;
//! ```
//!
//! # Generated Output
//!
//! One `.vb` document: a header comment block documenting the active
//! configuration, `Imports` for every referenced namespace, and one
//! `Namespace` block per service namespace holding the operation request
//! classes, response classes, model classes, and enums in (namespace,
//! name) order.

mod aliases;
mod generator;

pub use generator::VbNetGenerator;
pub use trellis_codegen::{Emitter, Language};
