//! Type-graph closure and metadata assembly.
//!
//! This crate turns a service's type universe into a [`trellis_ir::MetadataGraph`]:
//!
//! - [`reflect`] models introspection as plain data: a [`TypeArena`] of
//!   [`NativeType`] records behind the [`Reflect`] trait, so the same
//!   algorithms run over a pre-serialized schema, static analysis output,
//!   or any other provider.
//! - [`Assembler`] describes one native type as a language-neutral
//!   [`trellis_ir::TypeDescriptor`], including attribute lowering and the
//!   enum layout optimization.
//! - [`GraphBuilder`] performs the breadth-first closure over everything
//!   reachable from the service's operations.
//!
//! # Architecture
//!
//! ```text
//! operations + Reflect universe → GraphBuilder (Assembler per type) → MetadataGraph
//! ```
//!
//! The builder owns its considered-set for the duration of one build, so
//! independent builds can run concurrently over the same universe.

mod assemble;
mod builder;
pub mod catalog;
pub mod reflect;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use assemble::Assembler;
pub use builder::{GraphBuilder, ServiceOperation};
pub use reflect::{
    NativeAllowableValues, NativeApiMember, NativeAttribute, NativeAttributeValue,
    NativeDataContract, NativeDataMember, NativeEnumMember, NativeParam, NativeProperty,
    NativeRoute, NativeType, Reflect, ReturnMarker, TypeArena, TypeId, TypeKind, TypeOrigin,
};
