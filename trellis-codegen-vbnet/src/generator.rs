//! The VB.NET renderer.

use std::collections::{HashMap, HashSet};

use eyre::Result;
use indexmap::IndexSet;
use trellis_codegen::builder::CodeBuilder;
use trellis_codegen::{Emitter, is_reserved_namespace, safe};
use trellis_ir::{
    AttributeDescriptor, DataContract, DataMember, GenerationConfig, MetadataGraph,
    OperationDescriptor, PropertyDescriptor, RouteDescriptor, TypeDescriptor, TypeName,
};

use crate::aliases;

const VERSION: i32 = 1;

/// The reference VB.NET emitter.
pub struct VbNetGenerator;

impl Emitter for VbNetGenerator {
    fn language(&self) -> &'static str {
        "vbnet"
    }

    fn file_extension(&self) -> &'static str {
        "vb"
    }

    fn render(&self, graph: &MetadataGraph) -> Result<String> {
        Renderer { config: &graph.config }.render(graph)
    }
}

/// How the type currently being rendered relates to the operation list.
#[derive(Default)]
struct TypeOptions {
    /// Marker interface for request types.
    implements: Option<String>,
    is_request: bool,
    is_response: bool,
    is_nested_type: bool,
}

impl TypeOptions {
    fn is_operation(&self) -> bool {
        self.is_request || self.is_response
    }
}

struct Renderer<'a> {
    config: &'a GenerationConfig,
}

impl Renderer<'_> {
    fn render(&self, graph: &MetadataGraph) -> Result<String> {
        let mut namespaces: IndexSet<String> = IndexSet::new();
        for ns in &self.config.default_namespaces {
            namespaces.insert(ns.clone());
        }
        for ty in &graph.types {
            if let Some(ns) = &ty.namespace {
                namespaces.insert(ns.clone());
            }
        }
        for op in &graph.operations {
            if let Some(ns) = &op.request.namespace {
                namespaces.insert(ns.clone());
            }
        }

        let mut sb = CodeBuilder::vbnet();
        sb.push_line("' Options:");
        sb.push_line(&format!("'Version: {VERSION}"));
        sb.push_line(&format!("'BaseUrl: {}", self.config.base_url.as_deref().unwrap_or_default()));
        sb.push_blank();
        sb.push_line(&format!("'MakePartial: {}", self.config.make_partial));
        sb.push_line(&format!("'MakeOverridable: {}", self.config.make_virtual));
        sb.push_line(&format!(
            "'MakeDataContractsExtensible: {}",
            self.config.make_data_contracts_extensible
        ));
        sb.push_line(&format!("'AddReturnMarker: {}", self.config.add_return_marker));
        sb.push_line(&format!(
            "'AddDescriptionAsComments: {}",
            self.config.add_description_as_comments
        ));
        sb.push_line(&format!(
            "'AddDataContractAttributes: {}",
            self.config.add_data_contract_attributes
        ));
        sb.push_line(&format!(
            "'AddIndexesToDataMembers: {}",
            self.config.add_indexes_to_data_members
        ));
        sb.push_line(&format!("'AddResponseStatus: {}", self.config.add_response_status));
        sb.push_line(&format!(
            "'AddImplicitVersion: {}",
            self.config.add_implicit_version.map(|v| v.to_string()).unwrap_or_default()
        ));
        sb.push_line(&format!("'InitializeCollections: {}", self.config.initialize_collections));
        sb.push_line(&format!(
            "'AddDefaultXmlNamespace: {}",
            self.config.add_default_xml_namespace.as_deref().unwrap_or_default()
        ));
        sb.push_blank();

        for ns in &namespaces {
            sb.push_line(&format!("Imports {}", safe::safe_token(ns)?));
        }

        if self.config.add_data_contract_attributes {
            if let Some(xml_ns) = &self.config.add_default_xml_namespace {
                sb.push_blank();
                for ns in namespaces.iter().filter(|x| !self.config.default_namespaces.contains(*x)) {
                    sb.push_line(&format!(
                        "<Assembly: ContractNamespace(\"{}\", ClrNamespace:=\"{}\")>",
                        safe::safe_value(xml_ns)?,
                        safe::safe_token(ns)?
                    ));
                }
            }
        }

        sb.push_blank();

        let request_map: HashMap<String, &OperationDescriptor> = graph
            .operations
            .iter()
            .map(|op| (op.request.full_name(), op))
            .collect();
        let response_names: HashSet<String> = graph
            .operations
            .iter()
            .filter_map(|op| op.response.as_ref().map(|r| r.full_name()))
            .collect();
        let plain_names: HashSet<String> = graph.types.iter().map(|t| t.full_name()).collect();

        let mut all_types: Vec<&TypeDescriptor> = Vec::new();
        all_types.extend(graph.operations.iter().map(|op| &op.request));
        all_types.extend(graph.operations.iter().filter_map(|op| op.response.as_ref()));
        all_types.extend(graph.types.iter());

        let mut ordered = all_types.clone();
        ordered.sort_by(|a, b| {
            (a.namespace.as_deref(), a.name.as_str()).cmp(&(b.namespace.as_deref(), b.name.as_str()))
        });

        let mut last_ns: Option<String> = None;
        let mut existing_ops: HashSet<String> = HashSet::new();

        for ty in &ordered {
            let full_name = ty.full_name();
            if let Some(operation) = request_map.get(&full_name) {
                if !existing_ops.contains(&full_name) {
                    let implements = self.request_marker(ty, operation.response.as_ref())?;
                    last_ns = self.append_type(
                        &mut sb,
                        ty,
                        last_ns,
                        &all_types,
                        &TypeOptions { implements, is_request: true, ..Default::default() },
                    )?;
                    existing_ops.insert(full_name);
                }
            } else if response_names.contains(&full_name) {
                let skipped_ns = ty
                    .namespace
                    .as_ref()
                    .is_some_and(|ns| self.config.ignore_types_in_namespaces.contains(ns));
                if !existing_ops.contains(&full_name) && !skipped_ns {
                    last_ns = self.append_type(
                        &mut sb,
                        ty,
                        last_ns,
                        &all_types,
                        &TypeOptions { is_response: true, ..Default::default() },
                    )?;
                    existing_ops.insert(full_name);
                }
            } else if plain_names.contains(&full_name) && !existing_ops.contains(&full_name) {
                last_ns =
                    self.append_type(&mut sb, ty, last_ns, &all_types, &TypeOptions::default())?;
            }
        }

        if last_ns.is_some() {
            sb.push_line("End Namespace");
        }
        sb.push_blank();

        Ok(sb.build())
    }

    /// Marker interface for a request type: explicit void marker, then
    /// explicit typed marker, then the operation's declared response type.
    fn request_marker(
        &self,
        ty: &TypeDescriptor,
        response: Option<&TypeDescriptor>,
    ) -> Result<Option<String>> {
        if !self.config.add_return_marker && !ty.return_void_marker && ty.return_marker.is_none() {
            return Ok(None);
        }
        if ty.return_void_marker {
            return Ok(Some("IReturnVoid".to_string()));
        }
        if let Some(marker) = &ty.return_marker {
            return Ok(Some(format!("IReturn(Of {})", self.type_ref(marker, false)?)));
        }
        match response {
            Some(response) => Ok(Some(format!(
                "IReturn(Of {})",
                self.type_str(&response.name, response.generic_args.as_deref(), false)?
            ))),
            None => Ok(None),
        }
    }

    fn append_type(
        &self,
        sb: &mut CodeBuilder,
        ty: &TypeDescriptor,
        last_ns: Option<String>,
        all_types: &[&TypeDescriptor],
        options: &TypeOptions,
    ) -> Result<Option<String>> {
        // Nested types render inside their enclosing class only, and the
        // platform namespaces are never declared.
        if (ty.is_nested == Some(true) && !options.is_nested_type)
            || ty.namespace.as_deref().is_some_and(is_reserved_namespace)
        {
            return Ok(last_ns);
        }

        let mut last_ns = last_ns;
        if ty.namespace != last_ns {
            if last_ns.is_some() {
                sb.push_line("End Namespace");
            }
            last_ns = ty.namespace.clone();
            if let Some(ns) = &ty.namespace {
                sb.push_blank();
                sb.push_line(&format!("Namespace {}", safe::safe_token(ns)?));
            }
        }

        sb.push_indent();
        sb.push_blank();
        self.append_comments(sb, ty.description.as_deref())?;
        if let Some(routes) = &ty.routes {
            let route_attrs: Vec<AttributeDescriptor> =
                routes.iter().map(route_to_attribute).collect();
            self.append_attributes(sb, &route_attrs)?;
        }
        if let Some(attrs) = &ty.attributes {
            self.append_attributes(sb, attrs)?;
        }
        self.append_data_contract(sb, ty.data_contract.as_ref())?;

        if ty.is_enum == Some(true) {
            sb.push_line(&format!(
                "Public Enum {}",
                self.type_str(&ty.name, ty.generic_args.as_deref(), false)?
            ));
            sb.push_indent();
            if let Some(names) = &ty.enum_names {
                for (i, name) in names.iter().enumerate() {
                    match ty.enum_values.as_ref().map(|values| values[i].as_str()) {
                        None => sb.push_line(&format!("{},", safe::safe_token(name)?)),
                        Some(value) => {
                            sb.push_line(&format!("{} = {},", safe::safe_token(name)?, value))
                        }
                    };
                }
            }
            sb.push_dedent();
            sb.push_line("End Enum");
        } else {
            let partial = if self.config.make_partial { "Partial " } else { "" };
            sb.push_line(&format!(
                "Public {}Class {}",
                partial,
                self.type_str(&ty.name, ty.generic_args.as_deref(), false)?
            ));

            let mut inherits = Vec::new();
            if let Some(base) = &ty.inherits {
                inherits.push(self.type_ref(base, true)?);
            }
            if let Some(marker) = &options.implements {
                inherits.push(marker.clone());
            }
            let make_extensible =
                self.config.make_data_contracts_extensible && ty.inherits.is_none();
            if make_extensible {
                inherits.push("IExtensibleDataObject".to_string());
            }
            if !inherits.is_empty() {
                sb.push_line(&format!("    Inherits {}", inherits.join(", ")));
            }

            sb.push_indent();
            self.add_constructor(sb, ty, options)?;
            self.add_properties(sb, ty)?;

            for inner_ref in ty.inner_types.as_deref().unwrap_or_default() {
                let Some(inner) = all_types.iter().find(|t| t.name == inner_ref.name) else {
                    continue;
                };
                sb.push_dedent();
                self.append_type(
                    sb,
                    inner,
                    last_ns.clone(),
                    all_types,
                    &TypeOptions { is_nested_type: true, ..Default::default() },
                )?;
                sb.push_indent();
            }

            sb.push_dedent();
            sb.push_line("End Class");
        }

        sb.push_dedent();
        Ok(last_ns)
    }

    /// Synthesized constructor: implicit version assignment first, then one
    /// initializer per collection property, in declared order.
    fn add_constructor(
        &self,
        sb: &mut CodeBuilder,
        ty: &TypeDescriptor,
        options: &TypeOptions,
    ) -> Result<()> {
        if self.config.add_implicit_version.is_none() && !self.config.initialize_collections {
            return Ok(());
        }

        let collection_props: Vec<&PropertyDescriptor> = if self.config.initialize_collections {
            ty.properties
                .as_deref()
                .unwrap_or_default()
                .iter()
                .filter(|p| p.is_collection())
                .collect()
        } else {
            Vec::new()
        };

        let add_version = self.config.add_implicit_version.is_some() && options.is_operation();
        if !add_version && collection_props.is_empty() {
            return Ok(());
        }

        let overridable = if self.config.make_virtual { "Overridable " } else { "" };
        if add_version {
            sb.push_line(&format!("Public {}Property Version As Integer", overridable));
            sb.push_blank();
        }

        sb.push_line("Public Sub New()");
        sb.push_indent();
        if let Some(version) = self.config.add_implicit_version {
            if add_version {
                sb.push_line(&format!("Version = {version}"));
            }
        }
        for prop in collection_props {
            sb.push_line(&format!(
                "{} = New {}",
                safe::safe_token(&prop.name)?,
                self.type_str(&prop.ty.name, prop.ty.generic_args.as_deref(), false)?
            ));
        }
        sb.push_dedent();
        sb.push_line("End Sub");
        sb.push_blank();
        Ok(())
    }

    fn add_properties(&self, sb: &mut CodeBuilder, ty: &TypeDescriptor) -> Result<()> {
        let make_extensible = self.config.make_data_contracts_extensible && ty.inherits.is_none();
        let overridable = if self.config.make_virtual { "Overridable " } else { "" };
        let mut was_added = false;
        let mut data_member_index = 1;

        for prop in ty.properties.as_deref().unwrap_or_default() {
            if was_added {
                sb.push_blank();
            }
            let prop_type = self.type_str(&prop.ty.name, prop.ty.generic_args.as_deref(), false)?;
            was_added = self.append_data_member(sb, prop.data_member.as_ref(), data_member_index)?;
            data_member_index += 1;
            was_added = self.append_attributes(sb, prop.attributes.as_deref().unwrap_or_default())?
                || was_added;
            sb.push_line(&format!(
                "Public {}Property {} As {}",
                overridable,
                safe::safe_token(&prop.name)?,
                prop_type
            ));
        }

        let has_property = |name: &str| {
            ty.properties
                .as_deref()
                .unwrap_or_default()
                .iter()
                .any(|p| p.name == name)
        };

        if self.config.add_response_status && !has_property("ResponseStatus") {
            if was_added {
                sb.push_blank();
            }
            was_added = true;
            self.append_data_member(sb, None, data_member_index)?;
            sb.push_line(&format!(
                "Public {}Property ResponseStatus As ResponseStatus",
                overridable
            ));
        }

        if make_extensible && !has_property("ExtensionData") {
            if was_added {
                sb.push_blank();
            }
            sb.push_line(&format!(
                "Public {}Property ExtensionData As ExtensionDataObject",
                overridable
            ));
        }

        Ok(())
    }

    fn append_comments(&self, sb: &mut CodeBuilder, description: Option<&str>) -> Result<()> {
        let Some(description) = description else {
            return Ok(());
        };
        if self.config.add_description_as_comments {
            sb.push_line("'''<Summary>");
            sb.push_line(&format!("'''{}", safe::safe_comment(description)));
            sb.push_line("'''</Summary>");
        } else {
            sb.push_line(&format!("<Description({})>", safe::quoted_safe_value(description)?));
        }
        Ok(())
    }

    fn append_attributes(
        &self,
        sb: &mut CodeBuilder,
        attributes: &[AttributeDescriptor],
    ) -> Result<bool> {
        if attributes.is_empty() {
            return Ok(false);
        }

        for attr in attributes {
            let name = safe::safe_token(&attr.name)?;
            let ctor_args = attr.constructor_args.as_deref().unwrap_or_default();
            let named_args = attr.args.as_deref().unwrap_or_default();

            if ctor_args.is_empty() && named_args.is_empty() {
                sb.push_line(&format!("<{name}>"));
                continue;
            }

            let mut rendered = String::new();
            if !ctor_args.is_empty() {
                for arg in ctor_args {
                    if !rendered.is_empty() {
                        rendered.push_str(", ");
                    }
                    rendered.push_str(&self.type_value(&arg.ty, arg.value.as_deref())?);
                }
            } else {
                for arg in named_args {
                    if !rendered.is_empty() {
                        rendered.push_str(", ");
                    }
                    rendered.push_str(&format!(
                        "{}:={}",
                        safe::safe_token(&arg.name)?,
                        self.type_value(&arg.ty, arg.value.as_deref())?
                    ));
                }
            }
            sb.push_line(&format!("<{name}({rendered})>"));
        }

        Ok(true)
    }

    /// Render a resolved argument value: quoted for strings, `Nothing` when
    /// absent, validated verbatim otherwise.
    fn type_value(&self, ty: &TypeName, value: Option<&str>) -> Result<String> {
        let alias = self.type_alias(&ty.name, false)?;
        let Some(value) = value else {
            return Ok("Nothing".to_string());
        };
        if alias == "String" {
            Ok(safe::quoted_safe_value(value)?)
        } else {
            Ok(safe::safe_token(value)?.to_string())
        }
    }

    fn append_data_contract(
        &self,
        sb: &mut CodeBuilder,
        contract: Option<&DataContract>,
    ) -> Result<()> {
        let Some(contract) = contract else {
            if self.config.add_data_contract_attributes {
                sb.push_line("<DataContract>");
            }
            return Ok(());
        };

        let mut dc_args = String::new();
        if contract.name.is_some() || contract.namespace.is_some() {
            if let Some(name) = &contract.name {
                dc_args = format!("Name:={}", safe::quoted_safe_value(name)?);
            }
            if let Some(namespace) = &contract.namespace {
                if !dc_args.is_empty() {
                    dc_args.push_str(", ");
                }
                dc_args.push_str(&format!("Namespace:={}", safe::quoted_safe_value(namespace)?));
            }
            dc_args = format!("({dc_args})");
        }
        sb.push_line(&format!("<DataContract{dc_args}>"));
        Ok(())
    }

    fn append_data_member(
        &self,
        sb: &mut CodeBuilder,
        member: Option<&DataMember>,
        index: i32,
    ) -> Result<bool> {
        let Some(member) = member else {
            if self.config.add_data_contract_attributes {
                if self.config.add_indexes_to_data_members {
                    sb.push_line(&format!("<DataMember(Order:={index})>"));
                } else {
                    sb.push_line("<DataMember>");
                }
                return Ok(true);
            }
            return Ok(false);
        };

        let mut dm_args = String::new();
        if member.name.is_some()
            || member.order.is_some()
            || member.is_required.is_some()
            || member.emit_default_value.is_some()
            || self.config.add_indexes_to_data_members
        {
            if let Some(name) = &member.name {
                dm_args = format!("Name:={}", safe::quoted_safe_value(name)?);
            }
            if member.order.is_some() || self.config.add_indexes_to_data_members {
                if !dm_args.is_empty() {
                    dm_args.push_str(", ");
                }
                dm_args.push_str(&format!("Order:={}", member.order.unwrap_or(index)));
            }
            if let Some(required) = member.is_required {
                if !dm_args.is_empty() {
                    dm_args.push_str(", ");
                }
                dm_args.push_str(&format!("IsRequired:={required}"));
            }
            if let Some(emit) = member.emit_default_value {
                if !dm_args.is_empty() {
                    dm_args.push_str(", ");
                }
                dm_args.push_str(&format!("EmitDefaultValue:={emit}"));
            }
            dm_args = format!("({dm_args})");
        }
        sb.push_line(&format!("<DataMember{dm_args}>"));
        Ok(true)
    }

    fn type_ref(&self, name: &TypeName, include_nested: bool) -> Result<String> {
        self.type_str(&name.name, name.generic_args.as_deref(), include_nested)
    }

    /// Render a type occurrence: generic group syntax, the `Nullable`
    /// special case, and alias/array handling for everything else.
    fn type_str(
        &self,
        name: &str,
        generic_args: Option<&[TypeName]>,
        include_nested: bool,
    ) -> Result<String> {
        if let Some(args) = generic_args {
            if !args.is_empty() {
                if name == "Nullable`1" {
                    return Ok(format!(
                        "Nullable(Of {})",
                        self.type_ref(&args[0], include_nested)?
                    ));
                }
                if name.contains('`') {
                    let mut rendered = String::new();
                    for arg in args {
                        if !rendered.is_empty() {
                            rendered.push_str(", ");
                        }
                        rendered.push_str(&self.type_ref(arg, include_nested)?);
                    }
                    return Ok(format!(
                        "{}(Of {})",
                        self.name_only(name, include_nested)?,
                        rendered
                    ));
                }
            }
        }

        self.type_alias(name, include_nested)
    }

    fn type_alias(&self, name: &str, include_nested: bool) -> Result<String> {
        if let Some((element, _)) = name.split_once('[') {
            return Ok(format!("{}()", self.type_alias(element, include_nested)?));
        }

        if let Some(alias) = self
            .config
            .type_aliases
            .get(VbNetGenerator.language())
            .and_then(|table| table.get(name))
        {
            return Ok(safe::safe_token(alias)?.to_string());
        }
        if let Some(alias) = aliases::vb_type_name(name) {
            return Ok(alias.to_string());
        }

        self.name_only(name, include_nested)
    }

    fn name_only(&self, name: &str, include_nested: bool) -> Result<String> {
        let base = name.split('`').next().unwrap_or(name);
        let base = if include_nested {
            base
        } else {
            base.rsplit('.').next().unwrap_or(base)
        };
        Ok(safe::safe_token(base)?.to_string())
    }
}

/// Routes render as synthetic `Route` attributes: the path is the first
/// constructor argument, the verbs an optional second.
fn route_to_attribute(route: &RouteDescriptor) -> AttributeDescriptor {
    let string = TypeName::new("String", Some("System"));
    let mut constructor_args = vec![PropertyDescriptor {
        ty: string.clone(),
        value: Some(route.path.clone()),
        ..Default::default()
    }];
    if let Some(verbs) = &route.verbs {
        constructor_args.push(PropertyDescriptor {
            ty: string,
            value: Some(verbs.clone()),
            ..Default::default()
        });
    }
    AttributeDescriptor {
        name: "Route".to_string(),
        constructor_args: Some(constructor_args),
        args: None,
    }
}
