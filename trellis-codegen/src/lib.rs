//! Shared emitter contract and rendering primitives.
//!
//! Every per-language generator consumes the same [`trellis_ir::MetadataGraph`]
//! and satisfies the same [`Emitter`] contract; this crate holds that
//! contract plus the pieces all emitters share:
//!
//! - [`builder`] - indented text assembly ([`CodeBuilder`], [`Indent`])
//! - [`safe`] - injection-safe token and value validation
//! - [`Language`] - target-language selection
//!
//! Emitters are selected by configuration, not discovered: the binary maps
//! a [`Language`] to a concrete generator crate.

pub mod builder;
pub mod safe;

mod emitter;
mod error;

pub use builder::{CodeBuilder, Indent};
pub use emitter::{Emitter, Language, is_reserved_namespace};
pub use error::Error;
