//! The metadata graph root aggregate.

use serde::{Deserialize, Serialize};

use crate::{GenerationConfig, TypeDescriptor};

/// One service operation: its request type, optional response type, and
/// the HTTP actions it accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<String>>,
    pub request: TypeDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<TypeDescriptor>,
}

/// The complete, immutable result of one graph build: the resolved
/// configuration snapshot, the service operations, every other reachable
/// type, and the namespaces they touch.
///
/// A type identity appears at most once across `operations` and `types`
/// combined, and container/array types never appear at all — only their
/// element types do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataGraph {
    pub config: GenerationConfig,
    pub operations: Vec<OperationDescriptor>,
    pub types: Vec<TypeDescriptor>,
    pub namespaces: Vec<String>,
}

impl MetadataGraph {
    /// An empty graph carrying only a configuration snapshot.
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            operations: Vec::new(),
            types: Vec::new(),
            namespaces: Vec::new(),
        }
    }
}
