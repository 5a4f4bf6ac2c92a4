//! Breadth-first closure over the reachable type graph.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexSet;
use trellis_ir::{GenerationConfig, MetadataGraph, OperationDescriptor, TypeName};

use crate::assemble::Assembler;
use crate::reflect::{Reflect, TypeId, TypeKind};

/// One visible service operation, as supplied by the service-metadata
/// collaborator: visibility filtering has already happened.
#[derive(Debug, Clone)]
pub struct ServiceOperation {
    pub request: TypeId,
    pub response: Option<TypeId>,
    pub actions: Vec<String>,
}

/// Builds a [`MetadataGraph`] from a seed set of operations.
///
/// The builder owns no state across builds; the considered-set lives for
/// one `build` call, which is what makes traversal terminate on cyclic
/// type graphs and keeps independent builds safe to run concurrently.
pub struct GraphBuilder<'a> {
    universe: &'a dyn Reflect,
    config: GenerationConfig,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(universe: &'a dyn Reflect, config: GenerationConfig) -> Self {
        Self { universe, config }
    }

    pub fn build(&self, operations: &[ServiceOperation]) -> MetadataGraph {
        let assembler = Assembler::new(self.universe, &self.config);
        let mut graph = MetadataGraph::new(self.config.clone());

        let skip_types: HashSet<TypeName> = self.config.ignore_types.iter().cloned().collect();
        let skip_namespaces = self.config.ignore_types_in_namespaces.as_slice();

        // Seed phase: operation request/response types.
        let mut op_types: IndexSet<TypeId> = IndexSet::new();
        for op in operations {
            if op_types.contains(&op.request) {
                continue;
            }
            if skip_types.contains(&assembler.to_type_name(op.request)) {
                continue;
            }
            let request = self.universe.get(op.request);
            if request
                .namespace
                .as_ref()
                .is_some_and(|ns| skip_namespaces.contains(ns))
            {
                continue;
            }

            let mut descriptor = OperationDescriptor {
                actions: if op.actions.is_empty() { None } else { Some(op.actions.clone()) },
                request: assembler.to_type(op.request),
                response: op.response.map(|id| assembler.to_type(id)),
            };
            op_types.insert(op.request);

            if let Some(response) = op.response {
                if skip_types.contains(&assembler.to_type_name(response)) {
                    // The operation survives a skip-listed response; only
                    // the response reference is cleared.
                    descriptor.response = None;
                } else {
                    op_types.insert(response);
                }
            }

            graph.operations.push(descriptor);
        }

        let mut closure = Closure {
            universe: self.universe,
            assembler,
            skip_types,
            skip_namespaces,
            considered: op_types.iter().copied().collect(),
            queue: op_types.iter().copied().collect(),
            types: Vec::new(),
            namespaces: IndexSet::new(),
        };
        closure.run();

        graph.types = closure.types;
        graph.namespaces = closure.namespaces.into_iter().collect();
        graph
    }
}

/// State for one closure traversal.
struct Closure<'a> {
    universe: &'a dyn Reflect,
    assembler: Assembler<'a>,
    skip_types: HashSet<TypeName>,
    skip_namespaces: &'a [String],
    considered: HashSet<TypeId>,
    queue: VecDeque<TypeId>,
    types: Vec<trellis_ir::TypeDescriptor>,
    namespaces: IndexSet<String>,
}

impl Closure<'_> {
    fn run(&mut self) {
        let universe = self.universe;
        while let Some(id) = self.queue.pop_front() {
            let ty = universe.get(id);

            // Containers dissolve into their element type; the container
            // itself is never part of the graph.
            if ty.is_system_collection() {
                if let Some(element) = ty.element {
                    if !self.ignored(Some(element)) {
                        self.register(element);
                    }
                }
                continue;
            }

            // Nested types pull in their enclosing type.
            if let Some(declaring) = ty.declaring_type {
                if !self.ignored(Some(declaring)) {
                    self.register(declaring);
                }
            }

            // Platform leaves have no members worth walking.
            if !ty.is_domain_class() && ty.kind != TypeKind::Interface {
                continue;
            }

            for prop in &ty.properties {
                if self.ignored(Some(prop.ty)) {
                    continue;
                }
                self.register(prop.ty);

                let prop_ty = universe.get(prop.ty);
                if prop_ty.is_array {
                    if let Some(element) = prop_ty.element {
                        if !self.ignored(Some(element)) {
                            self.register(element);
                        }
                    }
                }
                for &arg in &prop_ty.generic_args {
                    if !self.ignored(Some(arg)) {
                        self.register(arg);
                    }
                }
            }

            if let Some(base_id) = ty.base.filter(|&base| !self.ignored(Some(base))) {
                let base = universe.get(base_id);
                if base.is_generic() {
                    // A generic base contributes its definition and each
                    // argument as separate graph entries.
                    if let Some(definition) = base.generic_definition {
                        if !self.ignored(Some(definition)) {
                            self.register(definition);
                        }
                    }
                    for &arg in &base.generic_args {
                        if !self.ignored(Some(arg)) {
                            self.register(arg);
                        }
                    }
                } else {
                    self.register(base_id);
                }
            }

            for &arg in &ty.generic_args {
                if !self.ignored(Some(arg)) {
                    self.register(arg);
                }
            }
        }
    }

    /// Exclusion predicate: absent, a generic parameter, already
    /// considered, skip-listed, or in a skipped namespace.
    fn ignored(&self, id: Option<TypeId>) -> bool {
        let Some(id) = id else {
            return true;
        };
        let ty = self.universe.get(id);
        ty.is_generic_parameter
            || self.considered.contains(&id)
            || self.skip_types.contains(&self.assembler.to_type_name(id))
            || ty.namespace
                .as_ref()
                .is_some_and(|ns| self.skip_namespaces.contains(ns))
    }

    /// Mark `id` considered and queue it; describe it when it is a
    /// non-system class, enum, or interface. "Considered" and "described"
    /// are different sets: system types are traversed but never described.
    fn register(&mut self, id: TypeId) {
        let ty = self.universe.get(id);
        if ty.is_array || (ty.is_system() && ty.name == "Array") {
            return;
        }

        self.considered.insert(id);
        self.queue.push_back(id);

        if !ty.is_system()
            && matches!(ty.kind, TypeKind::Class | TypeKind::Enum | TypeKind::Interface)
            && !ty.is_generic_parameter
        {
            let descriptor = self.assembler.to_type(id);
            self.types.push(descriptor);
            for ns in self.assembler.namespaces_used(id) {
                self.namespaces.insert(ns);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use trellis_ir::GenerationConfig;

    use super::*;
    use crate::testing::UniverseBuilder;

    fn op(request: TypeId, response: Option<TypeId>) -> ServiceOperation {
        ServiceOperation { request, response, actions: vec!["ANY".to_string()] }
    }

    fn type_names(graph: &MetadataGraph) -> Vec<&str> {
        graph.types.iter().map(|t| t.name.as_str()).collect()
    }

    /// One operation reaching an enum through a class through an array
    /// property: everything reachable appears exactly once, containers
    /// never appear.
    #[test]
    fn test_closure_reaches_through_properties_and_arrays() {
        let mut u = UniverseBuilder::new();
        let role = u.enum_type("MyApp.Model", "Role", &[("Admin", 0), ("Member", 1)]);
        let roles = u.array_of(role);
        let user = u.class("MyApp.Model", "User");
        u.add_property(user, "Roles", roles);
        let response = u.class("MyApp.Model", "GetUserResponse");
        u.add_property(response, "User", user);
        let request = u.class("MyApp.Model", "GetUserRequest");
        u.set_response_marker(request, response);

        let builder = GraphBuilder::new(u.universe(), GenerationConfig::default());
        let graph = builder.build(&[op(request, Some(response))]);

        assert_eq!(graph.operations.len(), 1);
        assert_eq!(type_names(&graph), vec!["User", "Role"]);
    }

    #[test]
    fn test_closure_deduplicates_shared_types() {
        let mut u = UniverseBuilder::new();
        let user = u.class("MyApp.Model", "User");
        let a = u.class("MyApp.Model", "AResponse");
        u.add_property(a, "User", user);
        let b = u.class("MyApp.Model", "BResponse");
        u.add_property(b, "Owner", user);
        u.add_property(b, "Author", user);
        let req_a = u.class("MyApp.Model", "GetA");
        let req_b = u.class("MyApp.Model", "GetB");

        let builder = GraphBuilder::new(u.universe(), GenerationConfig::default());
        let graph = builder.build(&[op(req_a, Some(a)), op(req_b, Some(b))]);

        assert_eq!(type_names(&graph), vec!["User"]);
    }

    #[test]
    fn test_duplicate_request_type_seeds_one_operation() {
        let mut u = UniverseBuilder::new();
        let request = u.class("MyApp.Model", "Ping");

        let builder = GraphBuilder::new(u.universe(), GenerationConfig::default());
        let graph = builder.build(&[op(request, None), op(request, None)]);

        assert_eq!(graph.operations.len(), 1);
    }

    #[test]
    fn test_skip_listed_request_drops_operation() {
        let mut u = UniverseBuilder::new();
        let request = u.class("MyApp.Model", "Hidden");
        let config = GenerationConfig {
            ignore_types: vec![trellis_ir::TypeName::new("Hidden", Some("MyApp.Model"))],
            ..Default::default()
        };

        let builder = GraphBuilder::new(u.universe(), config);
        let graph = builder.build(&[op(request, None)]);
        assert!(graph.operations.is_empty());
    }

    #[test]
    fn test_skip_listed_response_keeps_operation_clears_response() {
        let mut u = UniverseBuilder::new();
        let response = u.class("MyApp.Model", "SecretResponse");
        let request = u.class("MyApp.Model", "GetSecret");
        let config = GenerationConfig {
            ignore_types: vec![trellis_ir::TypeName::new("SecretResponse", Some("MyApp.Model"))],
            ..Default::default()
        };

        let builder = GraphBuilder::new(u.universe(), config);
        let graph = builder.build(&[op(request, Some(response))]);

        assert_eq!(graph.operations.len(), 1);
        assert!(graph.operations[0].response.is_none());
        assert!(type_names(&graph).is_empty());
    }

    #[test]
    fn test_skipped_namespace_excludes_types() {
        let mut u = UniverseBuilder::new();
        let vendored = u.class("Vendor.Internal", "Blob");
        let response = u.class("MyApp.Model", "GetBlobResponse");
        u.add_property(response, "Blob", vendored);
        let request = u.class("MyApp.Model", "GetBlob");
        let config = GenerationConfig {
            ignore_types_in_namespaces: vec!["Vendor.Internal".to_string()],
            ..Default::default()
        };

        let builder = GraphBuilder::new(u.universe(), config);
        let graph = builder.build(&[op(request, Some(response))]);
        assert!(type_names(&graph).is_empty());
    }

    #[test]
    fn test_container_property_registers_element_only() {
        let mut u = UniverseBuilder::new();
        let tag = u.class("MyApp.Model", "Tag");
        let list = u.list_of(tag);
        let response = u.class("MyApp.Model", "GetTagsResponse");
        u.add_property(response, "Tags", list);
        let request = u.class("MyApp.Model", "GetTags");

        let builder = GraphBuilder::new(u.universe(), GenerationConfig::default());
        let graph = builder.build(&[op(request, Some(response))]);

        assert_eq!(type_names(&graph), vec!["Tag"]);
    }

    #[test]
    fn test_dictionary_property_registers_key_and_value() {
        let mut u = UniverseBuilder::new();
        let string = u.builtin("String");
        let score = u.class("MyApp.Model", "Score");
        let map = u.dictionary_of(string, score);
        let response = u.class("MyApp.Model", "GetScoresResponse");
        u.add_property(response, "Scores", map);
        let request = u.class("MyApp.Model", "GetScores");

        let builder = GraphBuilder::new(u.universe(), GenerationConfig::default());
        let graph = builder.build(&[op(request, Some(response))]);

        assert_eq!(type_names(&graph), vec!["Score"]);
    }

    #[test]
    fn test_nested_type_registers_declaring_type() {
        let mut u = UniverseBuilder::new();
        let outer = u.class("MyApp.Model", "Report");
        let inner = u.class("MyApp.Model", "Row");
        u.set_declaring(inner, outer);
        let response = u.class("MyApp.Model", "GetReportResponse");
        u.add_property(response, "FirstRow", inner);
        let request = u.class("MyApp.Model", "GetReport");

        let builder = GraphBuilder::new(u.universe(), GenerationConfig::default());
        let graph = builder.build(&[op(request, Some(response))]);

        let names = type_names(&graph);
        assert!(names.contains(&"Row"));
        assert!(names.contains(&"Report"));
    }

    #[test]
    fn test_generic_base_registers_definition_and_args() {
        let mut u = UniverseBuilder::new();
        let item = u.class("MyApp.Model", "Item");
        let query_def = u.generic_class_definition("MyApp.Model", "QueryBase`1", &["T"]);
        let query_items = u.construct_generic(query_def, &[item]);
        let request = u.class("MyApp.Model", "FindItems");
        u.set_base(request, query_items);

        let builder = GraphBuilder::new(u.universe(), GenerationConfig::default());
        let graph = builder.build(&[op(request, None)]);

        let names = type_names(&graph);
        assert!(names.contains(&"QueryBase`1"));
        assert!(names.contains(&"Item"));
        // the constructed base itself is not described
        assert_eq!(names.iter().filter(|n| **n == "QueryBase`1").count(), 1);
    }

    /// Mutually recursive types terminate through the considered set.
    #[test]
    fn test_cyclic_references_terminate() {
        let mut u = UniverseBuilder::new();
        let node = u.class("MyApp.Model", "Node");
        let edge = u.class("MyApp.Model", "Edge");
        u.add_property(node, "Out", edge);
        u.add_property(edge, "Target", node);
        u.add_property(node, "Parent", node);
        let request = u.class("MyApp.Model", "GetGraph");
        let response = u.class("MyApp.Model", "GetGraphResponse");
        u.add_property(response, "Root", node);

        let builder = GraphBuilder::new(u.universe(), GenerationConfig::default());
        let graph = builder.build(&[op(request, Some(response))]);

        assert_eq!(type_names(&graph), vec!["Node", "Edge"]);
    }

    #[test]
    fn test_namespaces_accumulate_from_registered_types() {
        let mut u = UniverseBuilder::new();
        let role = u.enum_type("MyApp.Enums", "Role", &[("Admin", 0)]);
        let list = u.list_of(role);
        let user = u.class("MyApp.Model", "User");
        u.add_property(user, "Roles", list);
        let response = u.class("MyApp.Model", "GetUserResponse");
        u.add_property(response, "User", user);
        let request = u.class("MyApp.Model", "GetUser");

        let builder = GraphBuilder::new(u.universe(), GenerationConfig::default());
        let graph = builder.build(&[op(request, Some(response))]);

        assert!(graph.namespaces.contains(&"MyApp.Model".to_string()));
        assert!(graph.namespaces.contains(&"MyApp.Enums".to_string()));
        assert!(graph.namespaces.contains(&"System.Collections.Generic".to_string()));
    }

    /// System types are traversed but never described.
    #[test]
    fn test_system_types_are_considered_but_not_described() {
        let mut u = UniverseBuilder::new();
        let string = u.builtin("String");
        let response = u.class("MyApp.Model", "EchoResponse");
        u.add_property(response, "Message", string);
        let request = u.class("MyApp.Model", "Echo");

        let builder = GraphBuilder::new(u.universe(), GenerationConfig::default());
        let graph = builder.build(&[op(request, Some(response))]);
        assert!(type_names(&graph).is_empty());
    }

    #[test]
    fn test_determinism_same_input_same_graph() {
        let mut u = UniverseBuilder::new();
        let role = u.enum_type("MyApp.Model", "Role", &[("Admin", 0)]);
        let user = u.class("MyApp.Model", "User");
        let roles = u.array_of(role);
        u.add_property(user, "Roles", roles);
        let response = u.class("MyApp.Model", "GetUserResponse");
        u.add_property(response, "User", user);
        let request = u.class("MyApp.Model", "GetUser");

        let builder = GraphBuilder::new(u.universe(), GenerationConfig::default());
        let ops = [op(request, Some(response))];
        let first = builder.build(&ops);
        let second = builder.build(&ops);

        assert_eq!(type_names(&first), type_names(&second));
        assert_eq!(first.namespaces, second.namespaces);
    }
}
