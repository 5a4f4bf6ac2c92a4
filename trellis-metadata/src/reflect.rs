//! The introspection capability, modeled as data.
//!
//! Reflection is an external collaborator: something that can answer, for a
//! given type, "what are your properties, base type, generic arguments,
//! attributes, and enum members". This module fixes the answer format — a
//! [`NativeType`] record per type, addressed by [`TypeId`] — and the
//! [`Reflect`] trait any provider implements. [`TypeArena`] is the canonical
//! in-memory provider.

use serde::{Deserialize, Serialize};

/// Index of a type within its universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeId(pub usize);

/// What sort of type a [`NativeType`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
}

/// Whether a type belongs to the service's own model or to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeOrigin {
    Domain,
    System,
}

/// Response declaration carried by an operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnMarker {
    /// The operation produces no meaningful response.
    Void,
    /// The operation produces the given response type.
    Response(TypeId),
}

/// One reflected type.
///
/// Generic type names carry a backtick arity suffix (``List`1``); array
/// names carry a `[]` suffix. `generic_args` is empty for non-generic
/// types; constructed generics also point at their `generic_definition`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeType {
    pub name: String,
    pub namespace: Option<String>,
    pub kind: TypeKind,
    pub origin: TypeOrigin,
    pub is_generic_parameter: bool,
    pub is_array: bool,
    /// Implements a built-in enumerable interface.
    pub is_enumerable: bool,
    /// Element type of an array or enumerable container.
    pub element: Option<TypeId>,
    pub generic_args: Vec<TypeId>,
    pub generic_definition: Option<TypeId>,
    /// Enclosing type, for nested types.
    pub declaring_type: Option<TypeId>,
    pub base: Option<TypeId>,
    /// Declared instance properties, declaration order.
    pub properties: Vec<NativeProperty>,
    /// Attribute instances on the type, with resolved values.
    pub attributes: Vec<NativeAttribute>,
    /// Primary constructor parameters. Only meaningful for attribute
    /// types; `None` means constructor information is unavailable.
    pub constructor_params: Option<Vec<NativeParam>>,
    pub enum_members: Vec<NativeEnumMember>,
    pub nested_types: Vec<TypeId>,
    pub return_marker: Option<ReturnMarker>,
    pub routes: Vec<NativeRoute>,
    pub description: Option<String>,
    pub data_contract: Option<NativeDataContract>,
}

impl NativeType {
    /// A bare record with the given identity; everything else empty.
    pub fn new(
        name: impl Into<String>,
        namespace: Option<&str>,
        kind: TypeKind,
        origin: TypeOrigin,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.map(str::to_string),
            kind,
            origin,
            is_generic_parameter: false,
            is_array: false,
            is_enumerable: false,
            element: None,
            generic_args: Vec::new(),
            generic_definition: None,
            declaring_type: None,
            base: None,
            properties: Vec::new(),
            attributes: Vec::new(),
            constructor_params: None,
            enum_members: Vec::new(),
            nested_types: Vec::new(),
            return_marker: None,
            routes: Vec::new(),
            description: None,
            data_contract: None,
        }
    }

    pub fn is_system(&self) -> bool {
        self.origin == TypeOrigin::System
    }

    /// A class belonging to the service's own model.
    pub fn is_domain_class(&self) -> bool {
        self.kind == TypeKind::Class && !self.is_system()
    }

    /// An enum belonging to the service's own model.
    pub fn is_domain_enum(&self) -> bool {
        self.kind == TypeKind::Enum && !self.is_system()
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_args.is_empty()
    }

    pub fn is_value_type(&self) -> bool {
        matches!(self.kind, TypeKind::Struct | TypeKind::Enum)
    }

    /// An array or a built-in enumerable container. These are unwrapped to
    /// their element type during closure and never described themselves.
    pub fn is_system_collection(&self) -> bool {
        self.is_array || (self.is_system() && self.is_enumerable)
    }
}

/// One declared instance property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeProperty {
    pub name: String,
    pub ty: TypeId,
    pub attributes: Vec<NativeAttribute>,
    pub data_member: Option<NativeDataMember>,
    pub description: Option<String>,
    pub api_member: Option<NativeApiMember>,
    pub allowable_values: Option<NativeAllowableValues>,
}

impl NativeProperty {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            attributes: Vec::new(),
            data_member: None,
            description: None,
            api_member: None,
            allowable_values: None,
        }
    }
}

/// An attribute instance: its type plus the instance's resolved property
/// values, in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeAttribute {
    pub ty: TypeId,
    pub values: Vec<NativeAttributeValue>,
}

/// One resolved property value on an attribute instance. `value` is `None`
/// when the property still holds its default, and the provider renders
/// non-string values to display form (`Role.Admin`, `typeof(My.Type)`,
/// `42`) ahead of time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeAttributeValue {
    pub name: String,
    pub ty: TypeId,
    pub value: Option<String>,
    /// The property has no setter, so its value can only have come through
    /// a constructor.
    pub read_only: bool,
}

/// One constructor parameter of an attribute type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeParam {
    pub name: String,
    pub ty: TypeId,
    pub attributes: Vec<NativeAttribute>,
    pub description: Option<String>,
}

/// One enum member with its underlying value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeEnumMember {
    pub name: String,
    pub value: i64,
}

/// Serialization metadata declared on a property. Defaults mirror the
/// undeclared state: `order` below zero means unset, `emit_default_value`
/// defaults to true, `is_required` to false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeDataMember {
    pub name: Option<String>,
    pub order: i32,
    pub is_required: bool,
    pub emit_default_value: bool,
}

impl Default for NativeDataMember {
    fn default() -> Self {
        Self {
            name: None,
            order: -1,
            is_required: false,
            emit_default_value: true,
        }
    }
}

/// API documentation hints declared on a property.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NativeApiMember {
    pub is_required: bool,
    pub param_type: Option<String>,
    pub data_type: Option<String>,
}

/// Allowable-values documentation declared on a property.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NativeAllowableValues {
    pub values: Option<Vec<String>>,
    pub min: Option<i32>,
    pub max: Option<i32>,
}

/// One route declared on an operation type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeRoute {
    pub path: String,
    pub verbs: Option<String>,
    pub summary: Option<String>,
    pub notes: Option<String>,
}

/// Data-contract metadata declared on a type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NativeDataContract {
    pub name: Option<String>,
    pub namespace: Option<String>,
}

/// An introspection provider.
pub trait Reflect {
    /// The record for `id`. Providers own id allocation, so every id they
    /// hand out resolves.
    fn get(&self, id: TypeId) -> &NativeType;

    /// Number of types in the universe.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The canonical in-memory universe: a flat arena of [`NativeType`]s.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeArena {
    types: Vec<NativeType>,
}

impl TypeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and return its id.
    pub fn alloc(&mut self, ty: NativeType) -> TypeId {
        let id = TypeId(self.types.len());
        self.types.push(ty);
        id
    }

    pub fn get_mut(&mut self, id: TypeId) -> &mut NativeType {
        &mut self.types[id.0]
    }

    /// Find a type by namespace-qualified lookup: first by exact name and
    /// namespace, then by bare name if the namespace is not given.
    pub fn find(&self, name: &str, namespace: Option<&str>) -> Option<TypeId> {
        self.types
            .iter()
            .position(|t| {
                t.name == name
                    && match namespace {
                        Some(ns) => t.namespace.as_deref() == Some(ns),
                        None => true,
                    }
            })
            .map(TypeId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &NativeType)> {
        self.types.iter().enumerate().map(|(i, t)| (TypeId(i), t))
    }

    /// Synthesize a constructed generic over `definition` (e.g. ``List`1``
    /// of `User`). Enumerable single-argument containers record their
    /// element type.
    pub fn construct_generic(&mut self, definition: TypeId, args: &[TypeId]) -> TypeId {
        let def = self.get(definition);
        let name = def.name.clone();
        let namespace = def.namespace.clone();
        let kind = def.kind;
        let origin = def.origin;
        let is_enumerable = def.is_enumerable;
        let mut ty = NativeType::new(name, namespace.as_deref(), kind, origin);
        ty.is_enumerable = is_enumerable;
        ty.generic_args = args.to_vec();
        ty.generic_definition = Some(definition);
        if ty.is_enumerable && args.len() == 1 {
            ty.element = Some(args[0]);
        }
        self.alloc(ty)
    }

    /// Synthesize the array type of `element`, named `Element[]` in the
    /// element's namespace.
    pub fn array_of(&mut self, element: TypeId) -> TypeId {
        let elem = self.get(element);
        let name = format!("{}[]", elem.name);
        let namespace = elem.namespace.clone();
        let origin = elem.origin;
        let mut ty = NativeType::new(name, namespace.as_deref(), TypeKind::Class, origin);
        ty.is_array = true;
        ty.element = Some(element);
        self.alloc(ty)
    }
}

impl Reflect for TypeArena {
    fn get(&self, id: TypeId) -> &NativeType {
        &self.types[id.0]
    }

    fn len(&self) -> usize {
        self.types.len()
    }
}
