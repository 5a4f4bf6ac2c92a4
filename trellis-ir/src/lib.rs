//! Metadata graph types for the Trellis service type-graph compiler.
//!
//! This crate provides the canonical, language-neutral representation of a
//! service's type surface. The types here are the single source of truth
//! shared by the graph builder and every code emitter.
//!
//! # Architecture
//!
//! ```text
//! type universe → trellis-metadata (closure) → trellis-ir (graph) → emitters
//! ```
//!
//! The graph types are designed to be:
//! - Language-agnostic (no target-language concerns)
//! - Serializable (the whole graph can be dumped and diffed)
//! - Minimal when serialized (tri-state flags are absent unless set)

mod config;
mod graph;
mod types;

pub use config::{ConfigOverrides, GenerationConfig};
pub use graph::{MetadataGraph, OperationDescriptor};
pub use types::{
    AttributeDescriptor, DataContract, DataMember, PropertyDescriptor, RouteDescriptor,
    TypeDescriptor, TypeName,
};
