//! Semantic resolution: raw document → type arena + operations.

use std::collections::HashMap;

use indexmap::IndexMap;
use trellis_metadata::catalog::{SYSTEM, SYSTEM_COLLECTIONS_GENERIC};
use trellis_metadata::{
    NativeAllowableValues, NativeApiMember, NativeAttribute, NativeAttributeValue,
    NativeDataContract, NativeDataMember, NativeEnumMember, NativeParam, NativeProperty,
    NativeRoute, NativeType, Reflect, ReturnMarker, ServiceOperation, TypeArena, TypeId, TypeKind,
    TypeOrigin, catalog,
};

use crate::error::{Result, SourceContext};
use crate::raw::{RawAttributeUse, RawKind, RawSchema, RawType};
use crate::Schema;

pub(crate) fn build(raw: RawSchema, ctx: &SourceContext) -> Result<Schema> {
    let mut builder = Builder {
        ctx,
        arena: catalog::arena(),
        declared: IndexMap::new(),
        constructed: HashMap::new(),
        default_namespace: raw.service.namespace.clone(),
    };

    let ids = builder.declare_types(&raw.types)?;
    for (raw_ty, &id) in raw.types.iter().zip(&ids) {
        builder.populate_type(raw_ty, id)?;
    }

    let mut operations = Vec::with_capacity(raw.operations.len());
    for op in &raw.operations {
        let context = format!("operation '{}'", op.request);
        let request = builder.resolve_ref(&op.request, &context)?;
        if builder.arena.get(request).is_system() {
            return Err(ctx.validation_error(format!(
                "operation request '{}' must be a declared service type",
                op.request
            )));
        }
        let response = match &op.response {
            Some(r) => Some(builder.resolve_ref(r, &context)?),
            None => None,
        };
        operations.push(ServiceOperation {
            request,
            response,
            actions: op.actions.clone(),
        });
    }

    Ok(Schema {
        name: raw.service.name,
        config: raw.config,
        arena: builder.arena,
        operations,
    })
}

struct Builder<'a> {
    ctx: &'a SourceContext,
    arena: TypeArena,
    /// (namespace, name-with-arity) → id, declaration order.
    declared: IndexMap<(String, String), TypeId>,
    /// Normalized reference text → synthesized constructed type.
    constructed: HashMap<String, TypeId>,
    default_namespace: Option<String>,
}

impl Builder<'_> {
    /// First pass: allocate every declared type so references resolve
    /// regardless of declaration order.
    fn declare_types(&mut self, types: &[RawType]) -> Result<Vec<TypeId>> {
        let object = self.arena.find("Object", Some(SYSTEM)).expect("catalog seeds Object");
        let mut ids = Vec::with_capacity(types.len());

        for raw_ty in types {
            let namespace = raw_ty
                .namespace
                .clone()
                .or_else(|| self.default_namespace.clone())
                .ok_or_else(|| {
                    self.ctx.validation_error(format!(
                        "type '{}' has no namespace and [service] declares no default",
                        raw_ty.name
                    ))
                })?;
            let name = if raw_ty.params.is_empty() {
                raw_ty.name.clone()
            } else {
                format!("{}`{}", raw_ty.name, raw_ty.params.len())
            };

            let key = (namespace.clone(), name.clone());
            if self.declared.contains_key(&key) {
                return Err(self.ctx.duplicate_type_error(format!("{namespace}.{name}")));
            }

            let kind = match raw_ty.kind {
                RawKind::Class => TypeKind::Class,
                RawKind::Struct => TypeKind::Struct,
                RawKind::Interface => TypeKind::Interface,
                RawKind::Enum => TypeKind::Enum,
            };

            let params: Vec<TypeId> = raw_ty
                .params
                .iter()
                .map(|p| {
                    let mut param =
                        NativeType::new(p.as_str(), None, TypeKind::Class, TypeOrigin::Domain);
                    param.is_generic_parameter = true;
                    self.arena.alloc(param)
                })
                .collect();

            let mut ty =
                NativeType::new(name.as_str(), Some(namespace.as_str()), kind, TypeOrigin::Domain);
            ty.generic_args = params;
            if kind == TypeKind::Class {
                ty.base = Some(object);
            }
            if kind == TypeKind::Enum {
                let mut seen = Vec::new();
                ty.enum_members = raw_ty
                    .members
                    .iter()
                    .enumerate()
                    .map(|(i, m)| {
                        if seen.contains(&m.name.as_str()) {
                            return Err(self.ctx.validation_error(format!(
                                "enum '{}' declares member '{}' more than once",
                                raw_ty.name, m.name
                            )));
                        }
                        seen.push(&m.name);
                        Ok(NativeEnumMember {
                            name: m.name.clone(),
                            value: m.value.unwrap_or(i as i64),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
            }

            let id = self.arena.alloc(ty);
            self.declared.insert(key, id);
            ids.push(id);
        }

        Ok(ids)
    }

    /// Second pass: resolve cross-references and fill in details.
    fn populate_type(&mut self, raw_ty: &RawType, id: TypeId) -> Result<()> {
        let context = format!("type '{}'", raw_ty.name);

        if let Some(base) = &raw_ty.base {
            if raw_ty.kind == RawKind::Enum {
                return Err(self
                    .ctx
                    .validation_error(format!("enum '{}' cannot declare a base type", raw_ty.name)));
            }
            let base_id = self.resolve_ref(base, &context)?;
            self.arena.get_mut(id).base = Some(base_id);
        }

        if raw_ty.returns_void && raw_ty.returns.is_some() {
            return Err(self.ctx.validation_error(format!(
                "type '{}' declares both 'returns' and 'returns_void'",
                raw_ty.name
            )));
        }
        if raw_ty.returns_void {
            self.arena.get_mut(id).return_marker = Some(ReturnMarker::Void);
        } else if let Some(response) = &raw_ty.returns {
            let response_id = self.resolve_ref(response, &context)?;
            self.arena.get_mut(id).return_marker = Some(ReturnMarker::Response(response_id));
        }

        if let Some(outer) = &raw_ty.nested_in {
            let outer_id = self.resolve_ref(outer, &context)?;
            if self.arena.get(outer_id).is_system() {
                return Err(self.ctx.validation_error(format!(
                    "type '{}' cannot be nested in builtin type '{}'",
                    raw_ty.name, outer
                )));
            }
            self.arena.get_mut(id).declaring_type = Some(outer_id);
            self.arena.get_mut(outer_id).nested_types.push(id);
        }

        let attributes = self.resolve_attribute_uses(&raw_ty.attributes, &context)?;

        let mut properties = Vec::with_capacity(raw_ty.properties.len());
        for prop in &raw_ty.properties {
            let prop_context = format!("property '{}.{}'", raw_ty.name, prop.name);
            let ty = self.resolve_ref(&prop.ty, &prop_context)?;
            let mut native = NativeProperty::new(&prop.name, ty);
            native.description = prop.description.clone();
            native.attributes = self.resolve_attribute_uses(&prop.attributes, &prop_context)?;
            if prop.required || prop.param_type.is_some() || prop.display_type.is_some() {
                native.api_member = Some(NativeApiMember {
                    is_required: prop.required,
                    param_type: prop.param_type.clone(),
                    data_type: prop.display_type.clone(),
                });
            }
            if prop.allowable_values.is_some() || prop.min.is_some() || prop.max.is_some() {
                native.allowable_values = Some(NativeAllowableValues {
                    values: prop.allowable_values.clone(),
                    min: prop.min,
                    max: prop.max,
                });
            }
            if let Some(dm) = &prop.data_member {
                native.data_member = Some(NativeDataMember {
                    name: dm.name.clone(),
                    order: dm.order.unwrap_or(-1),
                    is_required: dm.required,
                    emit_default_value: dm.emit_default,
                });
            }
            properties.push(native);
        }

        let constructor_params = if raw_ty.ctor.is_empty() {
            None
        } else {
            let mut params = Vec::with_capacity(raw_ty.ctor.len());
            for param in &raw_ty.ctor {
                let param_context = format!("constructor of '{}'", raw_ty.name);
                params.push(NativeParam {
                    name: param.name.clone(),
                    ty: self.resolve_ref(&param.ty, &param_context)?,
                    attributes: Vec::new(),
                    description: None,
                });
            }
            Some(params)
        };

        let ty = self.arena.get_mut(id);
        ty.description = raw_ty.description.clone();
        ty.attributes = attributes;
        ty.properties = properties;
        ty.constructor_params = constructor_params;
        ty.routes = raw_ty
            .routes
            .iter()
            .map(|r| NativeRoute {
                path: r.path.clone(),
                verbs: r.verbs.clone(),
                summary: r.summary.clone(),
                notes: r.notes.clone(),
            })
            .collect();
        ty.data_contract = raw_ty.data_contract.as_ref().map(|dc| NativeDataContract {
            name: dc.name.clone(),
            namespace: dc.namespace.clone(),
        });

        Ok(())
    }

    fn resolve_attribute_uses(
        &mut self,
        uses: &[RawAttributeUse],
        context: &str,
    ) -> Result<Vec<NativeAttribute>> {
        let mut attrs = Vec::with_capacity(uses.len());
        for attr_use in uses {
            let ty = self.resolve_ref(&attr_use.ty, context)?;
            let mut values = Vec::with_capacity(attr_use.values.len());
            for value in &attr_use.values {
                let value_ty = match &value.ty {
                    Some(reference) => self.resolve_ref(reference, context)?,
                    None => self.infer_value_type(&value.value, &value.name, context)?,
                };
                values.push(NativeAttributeValue {
                    name: value.name.clone(),
                    ty: value_ty,
                    value: Some(scalar_to_string(&value.value)),
                    read_only: value.read_only,
                });
            }
            attrs.push(NativeAttribute { ty, values });
        }
        Ok(attrs)
    }

    fn infer_value_type(
        &self,
        value: &toml::Value,
        name: &str,
        context: &str,
    ) -> Result<TypeId> {
        let builtin = match value {
            toml::Value::String(_) => "String",
            toml::Value::Integer(_) => "Int32",
            toml::Value::Float(_) => "Double",
            toml::Value::Boolean(_) => "Boolean",
            _ => {
                return Err(self.ctx.validation_error(format!(
                    "attribute value '{name}' on {context} must be a scalar"
                )));
            }
        };
        Ok(self
            .arena
            .find(builtin, Some(SYSTEM))
            .expect("catalog seeds scalar types"))
    }

    /// Resolve one type reference: `Name`, `Ns.Name`, `Name[]`, `Name?`,
    /// or `Generic<A, B>`, recursively.
    fn resolve_ref(&mut self, reference: &str, context: &str) -> Result<TypeId> {
        let normalized: String = reference.chars().filter(|c| !c.is_whitespace()).collect();
        self.resolve_normalized(&normalized, reference, context)
    }

    fn resolve_normalized(&mut self, s: &str, original: &str, context: &str) -> Result<TypeId> {
        if s.is_empty() {
            return Err(self.ctx.invalid_reference_error(original, "empty reference"));
        }
        if let Some(&id) = self.constructed.get(s) {
            return Ok(id);
        }

        if let Some(inner) = s.strip_suffix("[]") {
            let element = self.resolve_normalized(inner, original, context)?;
            let id = self.arena.array_of(element);
            self.constructed.insert(s.to_string(), id);
            return Ok(id);
        }

        if let Some(inner) = s.strip_suffix('?') {
            let element = self.resolve_normalized(inner, original, context)?;
            let definition = self
                .arena
                .find("Nullable`1", Some(SYSTEM))
                .expect("catalog seeds Nullable`1");
            let id = self.arena.construct_generic(definition, &[element]);
            self.constructed.insert(s.to_string(), id);
            return Ok(id);
        }

        if let Some(open) = s.find('<') {
            if !s.ends_with('>') {
                return Err(self.ctx.invalid_reference_error(original, "unbalanced angle brackets"));
            }
            let name = &s[..open];
            let parts = split_top_level(&s[open + 1..s.len() - 1])
                .map_err(|reason| self.ctx.invalid_reference_error(original, reason))?;
            let mut args = Vec::with_capacity(parts.len());
            for part in &parts {
                args.push(self.resolve_normalized(part, original, context)?);
            }
            let definition = self.lookup(&format!("{}`{}", name, args.len()), context)?;
            let id = self.arena.construct_generic(definition, &args);
            self.constructed.insert(s.to_string(), id);
            return Ok(id);
        }

        self.lookup(s, context)
    }

    fn lookup(&self, name: &str, context: &str) -> Result<TypeId> {
        if let Some((ns, bare)) = name.rsplit_once('.') {
            if let Some(&id) = self.declared.get(&(ns.to_string(), bare.to_string())) {
                return Ok(id);
            }
            if let Some(id) = self.arena.find(bare, Some(ns)) {
                return Ok(id);
            }
            return Err(self.ctx.unknown_type_error(name, context));
        }

        let candidates: Vec<TypeId> = self
            .declared
            .iter()
            .filter(|((_, declared_name), _)| declared_name == name)
            .map(|(_, &id)| id)
            .collect();
        match candidates.len() {
            1 => Ok(candidates[0]),
            0 => self
                .arena
                .find(name, Some(SYSTEM))
                .or_else(|| self.arena.find(name, Some(SYSTEM_COLLECTIONS_GENERIC)))
                .ok_or_else(|| self.ctx.unknown_type_error(name, context)),
            _ => Err(self.ctx.validation_error(format!(
                "type reference '{name}' is ambiguous; qualify it with a namespace"
            ))),
        }
    }
}

/// Split generic arguments on top-level commas.
fn split_top_level(s: &str) -> std::result::Result<Vec<&str>, &'static str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth = depth.checked_sub(1).ok_or("unbalanced angle brackets")?;
            }
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err("unbalanced angle brackets");
    }
    parts.push(&s[start..]);
    Ok(parts)
}

fn scalar_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        _ => String::new(),
    }
}
