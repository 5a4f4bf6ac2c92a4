//! Core descriptor types.
//!
//! A [`TypeName`] is the lightweight identity of a type; a [`TypeDescriptor`]
//! carries the full shape of one. Optional fields serialize only when
//! present so a dumped graph stays compact.

use serde::{Deserialize, Serialize};

/// Lightweight type identity: name, namespace, and generic arguments.
///
/// Generic type names carry a backtick arity suffix (e.g. ``List`1``);
/// `generic_args` is `None` for non-generic types. Two names are equal iff
/// name, namespace, and generic arguments all match, which makes `TypeName`
/// usable as a map or set key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeName {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_args: Option<Vec<TypeName>>,
}

impl TypeName {
    /// A non-generic type name.
    pub fn new(name: impl Into<String>, namespace: Option<&str>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.map(str::to_string),
            generic_args: None,
        }
    }

    /// A constructed generic type name.
    pub fn generic(name: impl Into<String>, namespace: Option<&str>, args: Vec<TypeName>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.map(str::to_string),
            generic_args: Some(args),
        }
    }

    /// Namespace-qualified name, e.g. `MyApp.Model.User`.
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    /// The name without its backtick arity suffix (``List`1`` → `List`).
    pub fn base_name(&self) -> &str {
        self.name.split('`').next().unwrap_or(&self.name)
    }

    /// True for array identities, which carry a `[]` suffix.
    pub fn is_array(&self) -> bool {
        self.name.ends_with("[]")
    }
}

/// Full description of one type in the graph.
///
/// The identity fields mirror [`TypeName`]; `type_name()` recovers the
/// identity for de-duplication. Flags are tri-state: `Some(true)` or absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_args: Option<Vec<TypeName>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<AttributeDescriptor>>,
    /// Declared instance properties, declaration order preserved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<PropertyDescriptor>>,
    /// Base type; absent for root object types and enums.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherits: Option<TypeName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_nested: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_interface: Option<bool>,
    /// This operation declares "no meaningful response".
    #[serde(default, skip_serializing_if = "is_false")]
    pub return_void_marker: bool,
    /// Explicit response-type override declared on the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_marker: Option<TypeName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<RouteDescriptor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_contract: Option<DataContract>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_names: Option<Vec<String>>,
    /// Parallel to `enum_names`; absent entirely under the default layout
    /// where every member's value equals its ordinal position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Nested types declared within this type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_types: Option<Vec<TypeName>>,
}

impl TypeDescriptor {
    /// The identity of this type.
    pub fn type_name(&self) -> TypeName {
        TypeName {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            generic_args: self.generic_args.clone(),
        }
    }

    /// Namespace-qualified name, e.g. `MyApp.Model.User`.
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }
}

/// One property (or resolved attribute argument).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub ty: TypeName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_value_type: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<AttributeDescriptor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_member: Option<DataMember>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowable_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowable_min: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowable_max: Option<i32>,
    /// Present only when this descriptor is a resolved constructor or
    /// attribute argument, never for a class member.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
}

impl PropertyDescriptor {
    /// True when the property's type is an array or a generic collection.
    pub fn is_collection(&self) -> bool {
        self.ty.is_array() || self.ty.namespace.as_deref() == Some("System.Collections.Generic")
    }
}

/// A lowered annotation: either positional constructor arguments or named
/// arguments, never both (see the assembler's lowering rule).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constructor_args: Option<Vec<PropertyDescriptor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<PropertyDescriptor>>,
}

/// Per-property serialization metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataMember {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emit_default_value: Option<bool>,
}

/// One route declared on an operation type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Serialization-boundary metadata attached to a type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataContract {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}
