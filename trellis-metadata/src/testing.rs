//! Test helpers for building small type universes by hand.
//!
//! Only compiled for tests and for downstream crates that enable the
//! `testing` feature.

use crate::catalog::{self, SYSTEM, SYSTEM_COLLECTIONS_GENERIC};
use crate::reflect::{
    NativeAttribute, NativeAttributeValue, NativeEnumMember, NativeParam, NativeProperty,
    NativeRoute, NativeType, ReturnMarker, TypeArena, TypeId, TypeKind, TypeOrigin,
};

/// Fluent construction of a [`TypeArena`] seeded with the builtin catalog.
pub struct UniverseBuilder {
    arena: TypeArena,
}

impl Default for UniverseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UniverseBuilder {
    pub fn new() -> Self {
        Self { arena: catalog::arena() }
    }

    /// The finished universe.
    pub fn universe(&self) -> &TypeArena {
        &self.arena
    }

    /// Direct access for cases the helpers don't cover.
    pub fn arena_mut(&mut self) -> &mut TypeArena {
        &mut self.arena
    }

    /// Look up a builtin by bare name (`String`, `Int32`, ``List`1``, …).
    pub fn builtin(&self, name: &str) -> TypeId {
        self.arena
            .find(name, Some(SYSTEM))
            .or_else(|| self.arena.find(name, Some(SYSTEM_COLLECTIONS_GENERIC)))
            .unwrap_or_else(|| panic!("no builtin type named {name}"))
    }

    /// A domain class with `System.Object` as its base.
    pub fn class(&mut self, namespace: &str, name: &str) -> TypeId {
        let object = self.builtin("Object");
        let mut ty = NativeType::new(name, Some(namespace), TypeKind::Class, TypeOrigin::Domain);
        ty.base = Some(object);
        self.arena.alloc(ty)
    }

    /// A domain interface.
    pub fn interface(&mut self, namespace: &str, name: &str) -> TypeId {
        self.arena.alloc(NativeType::new(
            name,
            Some(namespace),
            TypeKind::Interface,
            TypeOrigin::Domain,
        ))
    }

    /// A domain enum with the given members and underlying values.
    pub fn enum_type(&mut self, namespace: &str, name: &str, members: &[(&str, i64)]) -> TypeId {
        let mut ty = NativeType::new(name, Some(namespace), TypeKind::Enum, TypeOrigin::Domain);
        ty.enum_members = members
            .iter()
            .map(|(name, value)| NativeEnumMember { name: name.to_string(), value: *value })
            .collect();
        self.arena.alloc(ty)
    }

    /// A generic domain class definition, e.g. ``QueryBase`1`` over `T`.
    pub fn generic_class_definition(
        &mut self,
        namespace: &str,
        name: &str,
        params: &[&str],
    ) -> TypeId {
        let args: Vec<TypeId> = params
            .iter()
            .map(|p| {
                let mut param = NativeType::new(*p, None, TypeKind::Class, TypeOrigin::Domain);
                param.is_generic_parameter = true;
                self.arena.alloc(param)
            })
            .collect();
        let object = self.builtin("Object");
        let mut ty = NativeType::new(name, Some(namespace), TypeKind::Class, TypeOrigin::Domain);
        ty.base = Some(object);
        ty.generic_args = args;
        self.arena.alloc(ty)
    }

    /// A constructed generic type over `definition`.
    pub fn construct_generic(&mut self, definition: TypeId, args: &[TypeId]) -> TypeId {
        self.arena.construct_generic(definition, args)
    }

    /// A constructed ``List`1`` of `element`.
    pub fn list_of(&mut self, element: TypeId) -> TypeId {
        let def = self.builtin("List`1");
        self.construct_generic(def, &[element])
    }

    /// A constructed ``Dictionary`2``.
    pub fn dictionary_of(&mut self, key: TypeId, value: TypeId) -> TypeId {
        let def = self.builtin("Dictionary`2");
        self.construct_generic(def, &[key, value])
    }

    /// A constructed ``Nullable`1`` of `inner`.
    pub fn nullable_of(&mut self, inner: TypeId) -> TypeId {
        let def = self.builtin("Nullable`1");
        self.construct_generic(def, &[inner])
    }

    /// An array of `element`, named `Element[]` in the element's namespace.
    pub fn array_of(&mut self, element: TypeId) -> TypeId {
        self.arena.array_of(element)
    }

    /// An attribute class with the given primary constructor parameters.
    pub fn attribute_type(
        &mut self,
        namespace: &str,
        name: &str,
        params: &[(&str, TypeId)],
    ) -> TypeId {
        let id = self.class(namespace, name);
        self.arena.get_mut(id).constructor_params = Some(
            params
                .iter()
                .map(|(name, ty)| NativeParam {
                    name: name.to_string(),
                    ty: *ty,
                    attributes: Vec::new(),
                    description: None,
                })
                .collect(),
        );
        id
    }

    /// An attribute class with no constructor information.
    pub fn attribute_type_without_ctor(&mut self, namespace: &str, name: &str) -> TypeId {
        self.class(namespace, name)
    }

    /// Attach an attribute instance. Values are `(name, value, read_only)`
    /// string-typed resolved values.
    pub fn add_attribute(&mut self, target: TypeId, attr_ty: TypeId, values: &[(&str, &str, bool)]) {
        let string = self.builtin("String");
        let attr = NativeAttribute {
            ty: attr_ty,
            values: values
                .iter()
                .map(|(name, value, read_only)| NativeAttributeValue {
                    name: name.to_string(),
                    ty: string,
                    value: Some(value.to_string()),
                    read_only: *read_only,
                })
                .collect(),
        };
        self.arena.get_mut(target).attributes.push(attr);
    }

    /// Declare an instance property on `owner`.
    pub fn add_property(&mut self, owner: TypeId, name: &str, ty: TypeId) {
        let prop = NativeProperty::new(name, ty);
        self.arena.get_mut(owner).properties.push(prop);
    }

    pub fn set_base(&mut self, ty: TypeId, base: TypeId) {
        self.arena.get_mut(ty).base = Some(base);
    }

    /// Nest `inner` inside `outer`.
    pub fn set_declaring(&mut self, inner: TypeId, outer: TypeId) {
        self.arena.get_mut(inner).declaring_type = Some(outer);
        self.arena.get_mut(outer).nested_types.push(inner);
    }

    pub fn set_void_marker(&mut self, ty: TypeId) {
        self.arena.get_mut(ty).return_marker = Some(ReturnMarker::Void);
    }

    pub fn set_response_marker(&mut self, ty: TypeId, response: TypeId) {
        self.arena.get_mut(ty).return_marker = Some(ReturnMarker::Response(response));
    }

    pub fn set_description(&mut self, ty: TypeId, description: &str) {
        self.arena.get_mut(ty).description = Some(description.to_string());
    }

    pub fn add_route(&mut self, ty: TypeId, path: &str, verbs: Option<&str>) {
        self.arena.get_mut(ty).routes.push(NativeRoute {
            path: path.to_string(),
            verbs: verbs.map(str::to_string),
            summary: None,
            notes: None,
        });
    }
}
