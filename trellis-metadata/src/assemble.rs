//! The metadata assembler: one native type → one descriptor.

use std::collections::HashMap;

use indexmap::IndexSet;
use trellis_ir::{
    AttributeDescriptor, DataContract, DataMember, GenerationConfig, PropertyDescriptor,
    RouteDescriptor, TypeDescriptor, TypeName,
};

use crate::reflect::{
    NativeAttribute, NativeDataMember, NativeProperty, NativeType, Reflect, ReturnMarker, TypeId,
    TypeKind,
};

/// Converts native reflected types into [`TypeDescriptor`]s.
///
/// Pure given a universe and a configuration; the configuration is only
/// consulted for the exported-attribute allow-list.
pub struct Assembler<'a> {
    universe: &'a dyn Reflect,
    config: &'a GenerationConfig,
}

impl<'a> Assembler<'a> {
    pub fn new(universe: &'a dyn Reflect, config: &'a GenerationConfig) -> Self {
        Self { universe, config }
    }

    /// The lightweight identity of `id`.
    pub fn to_type_name(&self, id: TypeId) -> TypeName {
        let ty = self.universe.get(id);
        TypeName {
            name: ty.name.clone(),
            namespace: ty.namespace.clone(),
            generic_args: if ty.generic_args.is_empty() {
                None
            } else {
                Some(ty.generic_args.iter().map(|&a| self.to_type_name(a)).collect())
            },
        }
    }

    /// The full descriptor of `id`.
    pub fn to_type(&self, id: TypeId) -> TypeDescriptor {
        let ty = self.universe.get(id);
        let identity = self.to_type_name(id);

        let mut descriptor = TypeDescriptor {
            name: identity.name,
            namespace: identity.namespace,
            generic_args: identity.generic_args,
            attributes: self.type_attributes(ty),
            properties: self.type_properties(ty),
            inherits: None,
            is_nested: ty.declaring_type.is_some().then_some(true),
            is_enum: (ty.kind == TypeKind::Enum).then_some(true),
            is_interface: (ty.kind == TypeKind::Interface).then_some(true),
            return_void_marker: false,
            return_marker: None,
            routes: None,
            description: ty.description.clone(),
            data_contract: ty.data_contract.as_ref().map(|dc| DataContract {
                name: dc.name.clone(),
                namespace: dc.namespace.clone(),
            }),
            enum_names: None,
            enum_values: None,
            inner_types: None,
        };

        if let Some(base) = ty.base {
            let base_ty = self.universe.get(base);
            if !(base_ty.name == "Object" && base_ty.is_system()) && ty.kind != TypeKind::Enum {
                descriptor.inherits = Some(self.to_type_name(base));
            }
        }

        // Void marker wins over a typed marker.
        match ty.return_marker {
            Some(ReturnMarker::Void) => descriptor.return_void_marker = true,
            Some(ReturnMarker::Response(response)) => {
                descriptor.return_marker = Some(self.to_type_name(response));
            }
            None => {}
        }

        if !ty.routes.is_empty() {
            descriptor.routes = Some(
                ty.routes
                    .iter()
                    .map(|r| RouteDescriptor {
                        path: r.path.clone(),
                        verbs: r.verbs.clone(),
                        summary: r.summary.clone(),
                        notes: r.notes.clone(),
                    })
                    .collect(),
            );
        }

        if ty.kind == TypeKind::Enum {
            let mut names = Vec::with_capacity(ty.enum_members.len());
            let mut values = Vec::with_capacity(ty.enum_members.len());
            let mut default_layout = true;
            for (i, member) in ty.enum_members.iter().enumerate() {
                if member.value != i as i64 {
                    default_layout = false;
                }
                names.push(member.name.clone());
                values.push(member.value.to_string());
            }
            descriptor.enum_names = Some(names);
            // Values carry no information under the default 0,1,2,… layout.
            descriptor.enum_values = if default_layout { None } else { Some(values) };
        }

        if !ty.nested_types.is_empty() {
            descriptor.inner_types = Some(
                ty.nested_types.iter().map(|&inner| self.to_type_name(inner)).collect(),
            );
        }

        descriptor
    }

    /// Namespaces referenced by `id`: its own, its properties', and its
    /// generic arguments'. A type always contributes at least its own
    /// namespace, even when it declares nothing.
    pub fn namespaces_used(&self, id: TypeId) -> IndexSet<String> {
        let ty = self.universe.get(id);
        let mut used = IndexSet::new();

        if ty.is_domain_class() || ty.kind == TypeKind::Interface || ty.is_enumerable {
            for prop in &ty.properties {
                let prop_ty = self.universe.get(prop.ty);
                if let Some(ns) = &prop_ty.namespace {
                    used.insert(ns.clone());
                }
                for &arg in &prop_ty.generic_args {
                    if let Some(ns) = &self.universe.get(arg).namespace {
                        used.insert(ns.clone());
                    }
                }
            }

            for &arg in &ty.generic_args {
                if let Some(ns) = &self.universe.get(arg).namespace {
                    used.insert(ns.clone());
                }
            }
        }

        if let Some(ns) = &ty.namespace {
            used.insert(ns.clone());
        }

        used
    }

    fn type_attributes(&self, ty: &NativeType) -> Option<Vec<AttributeDescriptor>> {
        let convertible =
            (ty.is_domain_class() || ty.is_domain_enum() || ty.kind == TypeKind::Interface)
                && !ty.is_enumerable;
        if !convertible {
            return None;
        }
        self.to_attributes(&ty.attributes)
    }

    fn type_properties(&self, ty: &NativeType) -> Option<Vec<PropertyDescriptor>> {
        let convertible =
            (ty.is_domain_class() || ty.kind == TypeKind::Interface) && !ty.is_enumerable;
        if !convertible {
            return None;
        }
        let props: Vec<PropertyDescriptor> =
            ty.properties.iter().map(|p| self.to_property(p)).collect();
        if props.is_empty() { None } else { Some(props) }
    }

    /// Convert attribute instances, keeping only allow-listed types.
    pub fn to_attributes(&self, attrs: &[NativeAttribute]) -> Option<Vec<AttributeDescriptor>> {
        let converted: Vec<AttributeDescriptor> = attrs
            .iter()
            .filter(|a| {
                let name = &self.universe.get(a.ty).name;
                self.config.export_attributes.iter().any(|allowed| allowed == name)
            })
            .map(|a| self.to_attribute(a))
            .collect();
        if converted.is_empty() { None } else { Some(converted) }
    }

    /// Lower one attribute instance to either positional constructor
    /// arguments or named arguments, never both.
    pub fn to_attribute(&self, attr: &NativeAttribute) -> AttributeDescriptor {
        let attr_ty = self.universe.get(attr.ty);
        let name = attr_ty
            .name
            .strip_suffix("Attribute")
            .unwrap_or(&attr_ty.name)
            .to_string();

        // Non-default instance values become named arguments; TypeId is
        // bookkeeping, not metadata.
        let mut args: Vec<PropertyDescriptor> = attr
            .values
            .iter()
            .filter(|v| v.name != "TypeId" && v.value.is_some())
            .map(|v| {
                let value_ty = self.universe.get(v.ty);
                PropertyDescriptor {
                    name: v.name.clone(),
                    ty: self.to_type_name(v.ty),
                    is_value_type: value_ty.is_value_type().then_some(true),
                    value: v.value.clone(),
                    read_only: v.read_only.then_some(true),
                    ..Default::default()
                }
            })
            .collect();

        let arg_values: HashMap<String, String> = args
            .iter()
            .filter_map(|a| a.value.clone().map(|v| (a.name.to_ascii_lowercase(), v)))
            .collect();
        let original_named = args.len();

        // A read-only value can only have come through a constructor, so it
        // must not survive as a settable named argument.
        args.retain(|a| a.read_only != Some(true));

        let mut constructor_args: Option<Vec<PropertyDescriptor>> =
            attr_ty.constructor_params.as_ref().map(|params| {
                params
                    .iter()
                    .map(|p| {
                        let param_ty = self.universe.get(p.ty);
                        PropertyDescriptor {
                            name: p.name.clone(),
                            ty: self.to_type_name(p.ty),
                            is_value_type: param_ty.is_value_type().then_some(true),
                            attributes: self.to_attributes(&p.attributes),
                            description: p.description.clone(),
                            ..Default::default()
                        }
                    })
                    .collect()
            });

        if let Some(params) = &mut constructor_args {
            for param in params.iter_mut() {
                if let Some(value) = arg_values.get(&param.name.to_ascii_lowercase()) {
                    param.value = Some(value.clone());
                }
            }
            params.retain(|p| p.value.is_some());
            if params.is_empty() {
                constructor_args = None;
            }
        }

        // All-or-nothing: positional form only when every constructor
        // parameter received a value and those values account for every
        // originally resolved argument.
        match constructor_args {
            Some(ctor) if ctor.len() == original_named => AttributeDescriptor {
                name,
                constructor_args: Some(ctor),
                args: None,
            },
            _ => AttributeDescriptor {
                name,
                constructor_args: None,
                args: if args.is_empty() { None } else { Some(args) },
            },
        }
    }

    /// Convert one declared property.
    pub fn to_property(&self, prop: &NativeProperty) -> PropertyDescriptor {
        let prop_ty = self.universe.get(prop.ty);
        let mut descriptor = PropertyDescriptor {
            name: prop.name.clone(),
            ty: self.to_type_name(prop.ty),
            is_value_type: prop_ty.is_value_type().then_some(true),
            attributes: self.to_attributes(&prop.attributes),
            data_member: prop.data_member.as_ref().map(to_data_member),
            description: prop.description.clone(),
            ..Default::default()
        };

        if let Some(api) = &prop.api_member {
            if api.is_required {
                descriptor.is_required = Some(true);
            }
            descriptor.param_type = api.param_type.clone();
            descriptor.display_type = api.data_type.clone();
        }

        if let Some(allowable) = &prop.allowable_values {
            descriptor.allowable_values = allowable.values.clone();
            descriptor.allowable_min = allowable.min;
            descriptor.allowable_max = allowable.max;
        }

        descriptor
    }
}

/// Normalize declared data-member metadata, dropping fields that carry
/// their default.
fn to_data_member(dm: &NativeDataMember) -> DataMember {
    DataMember {
        name: dm.name.clone(),
        order: (dm.order >= 0).then_some(dm.order),
        is_required: dm.is_required.then_some(true),
        emit_default_value: (!dm.emit_default_value).then_some(false),
    }
}

#[cfg(test)]
mod tests {
    use trellis_ir::GenerationConfig;

    use super::*;
    use crate::testing::UniverseBuilder;

    fn config_with_attrs(attrs: &[&str]) -> GenerationConfig {
        GenerationConfig {
            export_attributes: attrs.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_enum_default_layout_omits_values() {
        let mut u = UniverseBuilder::new();
        let role = u.enum_type("MyApp.Model", "Role", &[("Admin", 0), ("Member", 1), ("Guest", 2)]);
        let config = GenerationConfig::default();
        let assembler = Assembler::new(u.universe(), &config);

        let descriptor = assembler.to_type(role);
        assert_eq!(
            descriptor.enum_names,
            Some(vec!["Admin".into(), "Member".into(), "Guest".into()])
        );
        assert_eq!(descriptor.enum_values, None);
    }

    #[test]
    fn test_enum_explicit_layout_keeps_values() {
        let mut u = UniverseBuilder::new();
        let flags = u.enum_type("MyApp.Model", "Access", &[("Read", 1), ("Write", 2), ("Delete", 4)]);
        let config = GenerationConfig::default();
        let assembler = Assembler::new(u.universe(), &config);

        let descriptor = assembler.to_type(flags);
        assert_eq!(
            descriptor.enum_values,
            Some(vec!["1".into(), "2".into(), "4".into()])
        );
    }

    #[test]
    fn test_inherits_skips_root_object_and_enums() {
        let mut u = UniverseBuilder::new();
        let base = u.class("MyApp.Model", "EntityBase");
        let user = u.class("MyApp.Model", "User");
        u.set_base(user, base);
        let role = u.enum_type("MyApp.Model", "Role", &[("Admin", 0)]);
        let config = GenerationConfig::default();
        let assembler = Assembler::new(u.universe(), &config);

        assert_eq!(
            assembler.to_type(user).inherits.map(|b| b.name),
            Some("EntityBase".to_string())
        );
        // base defaults to Object, which is not reported
        assert_eq!(assembler.to_type(base).inherits, None);
        assert_eq!(assembler.to_type(role).inherits, None);
    }

    #[test]
    fn test_return_markers() {
        let mut u = UniverseBuilder::new();
        let response = u.class("MyApp.Model", "PingResponse");
        let ping = u.class("MyApp.Model", "Ping");
        u.set_response_marker(ping, response);
        let silent = u.class("MyApp.Model", "FireAndForget");
        u.set_void_marker(silent);
        let config = GenerationConfig::default();
        let assembler = Assembler::new(u.universe(), &config);

        let ping_desc = assembler.to_type(ping);
        assert!(!ping_desc.return_void_marker);
        assert_eq!(ping_desc.return_marker.map(|m| m.name), Some("PingResponse".to_string()));

        let silent_desc = assembler.to_type(silent);
        assert!(silent_desc.return_void_marker);
        assert_eq!(silent_desc.return_marker, None);
    }

    #[test]
    fn test_attribute_allow_list_filters() {
        let mut u = UniverseBuilder::new();
        let user = u.class("MyApp.Model", "User");
        let exported = u.attribute_type("MyApp", "TagAttribute", &[]);
        let internal = u.attribute_type("MyApp", "InternalAttribute", &[]);
        u.add_attribute(user, exported, &[]);
        u.add_attribute(user, internal, &[]);

        let config = config_with_attrs(&["TagAttribute"]);
        let assembler = Assembler::new(u.universe(), &config);
        let attrs = assembler.to_type(user).attributes.unwrap();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].name, "Tag");
    }

    #[test]
    fn test_attribute_lowering_exclusive_constructor_form() {
        let mut u = UniverseBuilder::new();
        let string = u.builtin("String");
        let user = u.class("MyApp.Model", "User");
        // One ctor param "path" matched (case-insensitively) by one value.
        let route = u.attribute_type("MyApp", "RouteAttribute", &[("path", string)]);
        u.add_attribute(user, route, &[("Path", "/users", false)]);

        let config = config_with_attrs(&["RouteAttribute"]);
        let assembler = Assembler::new(u.universe(), &config);
        let attrs = assembler.to_type(user).attributes.unwrap();
        let ctor = attrs[0].constructor_args.as_ref().unwrap();
        assert_eq!(ctor.len(), 1);
        assert_eq!(ctor[0].value.as_deref(), Some("/users"));
        assert!(attrs[0].args.is_none());
    }

    #[test]
    fn test_attribute_lowering_falls_back_to_named_form() {
        let mut u = UniverseBuilder::new();
        let string = u.builtin("String");
        let user = u.class("MyApp.Model", "User");
        // Two non-default values but only one ctor parameter: counts differ,
        // so everything stays in named form.
        let api = u.attribute_type("MyApp", "ApiAttribute", &[("summary", string)]);
        u.add_attribute(user, api, &[("Summary", "Users", false), ("Notes", "Full CRUD", false)]);

        let config = config_with_attrs(&["ApiAttribute"]);
        let assembler = Assembler::new(u.universe(), &config);
        let attrs = assembler.to_type(user).attributes.unwrap();
        assert!(attrs[0].constructor_args.is_none());
        let args = attrs[0].args.as_ref().unwrap();
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_attribute_lowering_drops_read_only_named_args() {
        let mut u = UniverseBuilder::new();
        let string = u.builtin("String");
        let user = u.class("MyApp.Model", "User");
        let named = u.attribute_type("MyApp", "NamedAttribute", &[("name", string)]);
        // The read-only value feeds the ctor parameter but must not remain
        // as a named argument.
        u.add_attribute(user, named, &[("Name", "users", true)]);

        let config = config_with_attrs(&["NamedAttribute"]);
        let assembler = Assembler::new(u.universe(), &config);
        let attrs = assembler.to_type(user).attributes.unwrap();
        let ctor = attrs[0].constructor_args.as_ref().unwrap();
        assert_eq!(ctor[0].value.as_deref(), Some("users"));
        assert!(attrs[0].args.is_none());
    }

    #[test]
    fn test_attribute_without_constructor_info_degrades_to_named() {
        let mut u = UniverseBuilder::new();
        let user = u.class("MyApp.Model", "User");
        let bare = u.attribute_type_without_ctor("MyApp", "LooseAttribute");
        u.add_attribute(user, bare, &[("Hint", "x", false)]);

        let config = config_with_attrs(&["LooseAttribute"]);
        let assembler = Assembler::new(u.universe(), &config);
        let attrs = assembler.to_type(user).attributes.unwrap();
        assert!(attrs[0].constructor_args.is_none());
        assert_eq!(attrs[0].args.as_ref().unwrap()[0].name, "Hint");
    }

    #[test]
    fn test_namespaces_used_includes_own_namespace_for_empty_types() {
        let mut u = UniverseBuilder::new();
        let marker = u.class("MyApp.Markers", "EmptyMarker");
        let config = GenerationConfig::default();
        let assembler = Assembler::new(u.universe(), &config);

        let used = assembler.namespaces_used(marker);
        assert!(used.contains("MyApp.Markers"));
    }

    #[test]
    fn test_namespaces_used_covers_properties_and_generic_args() {
        let mut u = UniverseBuilder::new();
        let role = u.enum_type("MyApp.Enums", "Role", &[("Admin", 0)]);
        let list = u.list_of(role);
        let user = u.class("MyApp.Model", "User");
        u.add_property(user, "Roles", list);

        let config = GenerationConfig::default();
        let assembler = Assembler::new(u.universe(), &config);
        let used = assembler.namespaces_used(user);
        assert!(used.contains("System.Collections.Generic"));
        assert!(used.contains("MyApp.Enums"));
        assert!(used.contains("MyApp.Model"));
    }

    #[test]
    fn test_data_member_normalization() {
        let dm = NativeDataMember {
            name: Some("user_name".into()),
            order: 2,
            is_required: false,
            emit_default_value: true,
        };
        let lowered = to_data_member(&dm);
        assert_eq!(lowered.name.as_deref(), Some("user_name"));
        assert_eq!(lowered.order, Some(2));
        assert_eq!(lowered.is_required, None);
        assert_eq!(lowered.emit_default_value, None);

        let defaulted = to_data_member(&NativeDataMember::default());
        assert_eq!(defaulted.order, None);
    }
}
