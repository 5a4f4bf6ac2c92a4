//! TOML type-universe schema for the Trellis service type-graph compiler.
//!
//! The reflection capability consumed by `trellis-metadata` is abstract; this
//! crate is its pre-serialized-schema implementation. A single TOML document
//! describes the service: its generation defaults, its types (classes,
//! interfaces, enums, attributes), and its operations. Loading resolves
//! every type reference and produces a ready-to-traverse
//! [`trellis_metadata::TypeArena`] plus the operation seed list.
//!
//! # Example
//!
//! ```
//! use trellis_schema::Schema;
//!
//! let schema: Schema = r#"
//!     [service]
//!     name = "Demo"
//!     namespace = "Demo.Model"
//!
//!     [[types]]
//!     name = "Ping"
//!     returns_void = true
//!
//!     [[operations]]
//!     request = "Ping"
//! "#
//! .parse()
//! .unwrap();
//!
//! assert_eq!(schema.operations.len(), 1);
//! ```

mod build;
mod error;
mod raw;

use std::path::Path;
use std::str::FromStr;

pub use error::{Error, Result, SourceContext};
use trellis_ir::{ConfigOverrides, GenerationConfig, MetadataGraph};
use trellis_metadata::{GraphBuilder, ServiceOperation, TypeArena};

/// A loaded service schema: the type universe and the operation list.
#[derive(Debug)]
pub struct Schema {
    /// Service name.
    pub name: String,
    /// Service-wide generation defaults from `[config]`.
    pub config: GenerationConfig,
    /// The resolved type universe.
    pub arena: TypeArena,
    /// Operation seed list, in declaration order.
    pub operations: Vec<ServiceOperation>,
}

impl FromStr for Schema {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_schema(s, "schema.toml")
    }
}

impl Schema {
    /// Load a schema from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        parse_schema(&content, &path.display().to_string())
    }

    /// Parse a schema from a string with a custom filename for error
    /// reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        parse_schema(content, filename)
    }

    /// Build the metadata graph for this schema, resolving per-request
    /// overrides against the schema's `[config]` defaults.
    pub fn build_graph(&self, overrides: &ConfigOverrides) -> MetadataGraph {
        let config = self.config.merged(overrides);
        GraphBuilder::new(&self.arena, config).build(&self.operations)
    }
}

/// Parse a schema from content with the given filename for error reporting.
pub fn parse_schema(content: &str, filename: &str) -> Result<Schema> {
    let ctx = SourceContext::new(content, filename);
    let raw: raw::RawSchema = toml::from_str(content).map_err(|e| ctx.parse_error(e))?;
    build::build(raw, &ctx)
}

#[cfg(test)]
mod tests {
    use trellis_metadata::{Reflect, ReturnMarker, TypeKind};

    use super::*;

    fn load(src: &str) -> Schema {
        src.parse().expect("schema should parse")
    }

    #[test]
    fn test_minimal_schema() {
        let schema = load(
            r#"
            [service]
            name = "Demo"
            namespace = "Demo.Model"

            [[types]]
            name = "Ping"
            returns_void = true

            [[operations]]
            request = "Ping"
            actions = ["GET"]
            "#,
        );

        assert_eq!(schema.name, "Demo");
        assert_eq!(schema.operations.len(), 1);
        let request = schema.arena.get(schema.operations[0].request);
        assert_eq!(request.name, "Ping");
        assert_eq!(request.return_marker, Some(ReturnMarker::Void));
    }

    #[test]
    fn test_property_type_references() {
        let schema = load(
            r#"
            [service]
            name = "Demo"
            namespace = "Demo.Model"

            [[types]]
            name = "Role"
            kind = "enum"
            members = [{ name = "Admin" }, { name = "Member" }]

            [[types]]
            name = "User"

            [[types.properties]]
            name = "Id"
            type = "Int32"

            [[types.properties]]
            name = "Roles"
            type = "Role[]"

            [[types.properties]]
            name = "Tags"
            type = "List<String>"

            [[types.properties]]
            name = "Age"
            type = "Int32?"
            "#,
        );

        let user = schema.arena.find("User", Some("Demo.Model")).unwrap();
        let props = &schema.arena.get(user).properties;
        assert_eq!(props.len(), 4);

        let roles = schema.arena.get(props[1].ty);
        assert!(roles.is_array);
        assert_eq!(roles.name, "Role[]");

        let tags = schema.arena.get(props[2].ty);
        assert_eq!(tags.name, "List`1");
        assert!(tags.is_enumerable);

        let age = schema.arena.get(props[3].ty);
        assert_eq!(age.name, "Nullable`1");
    }

    #[test]
    fn test_enum_members_default_to_ordinals() {
        let schema = load(
            r#"
            [service]
            name = "Demo"
            namespace = "Demo.Model"

            [[types]]
            name = "Role"
            kind = "enum"
            members = [{ name = "Admin" }, { name = "Member" }, { name = "Guest", value = 9 }]
            "#,
        );

        let role = schema.arena.find("Role", Some("Demo.Model")).unwrap();
        let members = &schema.arena.get(role).enum_members;
        assert_eq!(members[0].value, 0);
        assert_eq!(members[1].value, 1);
        assert_eq!(members[2].value, 9);
    }

    #[test]
    fn test_generic_definition_and_construction() {
        let schema = load(
            r#"
            [service]
            name = "Demo"
            namespace = "Demo.Model"

            [[types]]
            name = "QueryBase"
            params = ["T"]

            [[types]]
            name = "Item"

            [[types]]
            name = "FindItems"
            base = "QueryBase<Item>"
            "#,
        );

        let find = schema.arena.find("FindItems", Some("Demo.Model")).unwrap();
        let base = schema.arena.get(find).base.unwrap();
        let base_ty = schema.arena.get(base);
        assert_eq!(base_ty.name, "QueryBase`1");
        assert!(base_ty.generic_definition.is_some());
        assert_eq!(base_ty.generic_args.len(), 1);
    }

    #[test]
    fn test_nested_type_wiring() {
        let schema = load(
            r#"
            [service]
            name = "Demo"
            namespace = "Demo.Model"

            [[types]]
            name = "Report"

            [[types]]
            name = "Row"
            nested_in = "Report"
            "#,
        );

        let report = schema.arena.find("Report", Some("Demo.Model")).unwrap();
        let row = schema.arena.find("Row", Some("Demo.Model")).unwrap();
        assert_eq!(schema.arena.get(row).declaring_type, Some(report));
        assert_eq!(schema.arena.get(report).nested_types, vec![row]);
    }

    #[test]
    fn test_attribute_declaration_and_use() {
        let schema = load(
            r#"
            [service]
            name = "Demo"
            namespace = "Demo.Model"

            [config]
            export_attributes = ["RouteAttribute"]

            [[types]]
            name = "RouteAttribute"
            ctor = [{ name = "path", type = "String" }]

            [[types]]
            name = "GetUsers"

            [[types.attributes]]
            type = "RouteAttribute"
            values = [{ name = "Path", value = "/users", read_only = true }]
            "#,
        );

        let get_users = schema.arena.find("GetUsers", Some("Demo.Model")).unwrap();
        let attrs = &schema.arena.get(get_users).attributes;
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].values[0].value.as_deref(), Some("/users"));
        assert!(attrs[0].values[0].read_only);

        let route = schema.arena.get(attrs[0].ty);
        assert_eq!(route.constructor_params.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_attribute_value_type_inference() {
        let schema = load(
            r#"
            [service]
            name = "Demo"
            namespace = "Demo.Model"

            [[types]]
            name = "LimitAttribute"

            [[types]]
            name = "Search"

            [[types.attributes]]
            type = "LimitAttribute"
            values = [{ name = "Max", value = 100 }]
            "#,
        );

        let search = schema.arena.find("Search", Some("Demo.Model")).unwrap();
        let value = &schema.arena.get(search).attributes[0].values[0];
        assert_eq!(value.value.as_deref(), Some("100"));
        assert_eq!(schema.arena.get(value.ty).name, "Int32");
    }

    #[test]
    fn test_unknown_type_reference_fails() {
        let err = Schema::from_str(
            r#"
            [service]
            name = "Demo"
            namespace = "Demo.Model"

            [[types]]
            name = "User"

            [[types.properties]]
            name = "Role"
            type = "Missing"
            "#,
        )
        .unwrap_err();

        assert!(matches!(*err, Error::UnknownType { .. }));
    }

    #[test]
    fn test_duplicate_type_fails() {
        let err = Schema::from_str(
            r#"
            [service]
            name = "Demo"
            namespace = "Demo.Model"

            [[types]]
            name = "User"

            [[types]]
            name = "User"
            "#,
        )
        .unwrap_err();

        assert!(matches!(*err, Error::DuplicateType { .. }));
    }

    #[test]
    fn test_conflicting_return_markers_fail() {
        let err = Schema::from_str(
            r#"
            [service]
            name = "Demo"
            namespace = "Demo.Model"

            [[types]]
            name = "Confused"
            returns = "String"
            returns_void = true
            "#,
        )
        .unwrap_err();

        assert!(matches!(*err, Error::Validation { .. }));
    }

    #[test]
    fn test_malformed_toml_reports_parse_error() {
        let err = Schema::from_str("[service\nname = ").unwrap_err();
        assert!(matches!(*err, Error::Parse { .. }));
    }

    #[test]
    fn test_operation_request_must_be_declared() {
        let err = Schema::from_str(
            r#"
            [service]
            name = "Demo"
            namespace = "Demo.Model"

            [[operations]]
            request = "String"
            "#,
        )
        .unwrap_err();

        assert!(matches!(*err, Error::Validation { .. }));
    }

    #[test]
    fn test_config_section_round_trips() {
        let schema = load(
            r#"
            [service]
            name = "Demo"
            namespace = "Demo.Model"

            [config]
            make_partial = false
            add_implicit_version = 2
            ignore_types_in_namespaces = ["Vendor.Internal"]
            "#,
        );

        assert!(!schema.config.make_partial);
        assert_eq!(schema.config.add_implicit_version, Some(2));
        assert_eq!(
            schema.config.ignore_types_in_namespaces,
            vec!["Vendor.Internal".to_string()]
        );
    }

    /// Graph construction straight from a schema document.
    #[test]
    fn test_build_graph_end_to_end() {
        let schema = load(
            r#"
            [service]
            name = "Demo"
            namespace = "Demo.Model"

            [[types]]
            name = "Role"
            kind = "enum"
            members = [{ name = "Admin" }, { name = "Member" }]

            [[types]]
            name = "User"
            properties = [{ name = "Roles", type = "Role[]" }]

            [[types]]
            name = "GetUserResponse"
            properties = [{ name = "User", type = "User" }]

            [[types]]
            name = "GetUser"
            returns = "GetUserResponse"

            [[operations]]
            request = "GetUser"
            response = "GetUserResponse"
            "#,
        );

        let graph = schema.build_graph(&trellis_ir::ConfigOverrides::default());
        assert_eq!(graph.operations.len(), 1);
        let names: Vec<&str> = graph.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["User", "Role"]);
        assert!(graph.types.iter().all(|t| t.is_enum != Some(true) || t.name == "Role"));
    }

    #[test]
    fn test_struct_kind_is_value_type() {
        let schema = load(
            r#"
            [service]
            name = "Demo"
            namespace = "Demo.Model"

            [[types]]
            name = "Money"
            kind = "struct"
            "#,
        );

        let money = schema.arena.find("Money", Some("Demo.Model")).unwrap();
        assert_eq!(schema.arena.get(money).kind, TypeKind::Struct);
        assert!(schema.arena.get(money).is_value_type());
    }
}
