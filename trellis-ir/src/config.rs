//! Generation configuration and per-request override merging.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::TypeName;

/// Service-wide code generation options.
///
/// Every downstream decision — what the builder skips, what the emitters
/// synthesize — reads from one of these. A snapshot of the resolved config
/// is embedded in each [`crate::MetadataGraph`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub base_url: Option<String>,
    pub make_partial: bool,
    pub make_virtual: bool,
    pub add_return_marker: bool,
    pub add_description_as_comments: bool,
    pub add_data_contract_attributes: bool,
    pub make_data_contracts_extensible: bool,
    pub add_indexes_to_data_members: bool,
    pub initialize_collections: bool,
    pub add_implicit_version: Option<i32>,
    pub add_response_status: bool,
    pub add_framework_types: bool,
    pub add_model_extensions: bool,
    pub make_properties_optional: bool,
    pub add_default_xml_namespace: Option<String>,
    /// Namespaces always imported by generated code, in order.
    pub default_namespaces: Vec<String>,
    /// Type identities excluded from the graph.
    pub ignore_types: Vec<TypeName>,
    /// Namespaces whose types are excluded from the graph.
    pub ignore_types_in_namespaces: Vec<String>,
    /// Attribute type names exported into generated code. Attributes not on
    /// this list are silently dropped by the assembler.
    pub export_attributes: Vec<String>,
    /// Per-target type alias tables, keyed by language identifier.
    pub type_aliases: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            make_partial: true,
            make_virtual: true,
            add_return_marker: true,
            add_description_as_comments: true,
            add_data_contract_attributes: false,
            make_data_contracts_extensible: false,
            add_indexes_to_data_members: false,
            initialize_collections: true,
            add_implicit_version: None,
            add_response_status: false,
            add_framework_types: true,
            add_model_extensions: false,
            make_properties_optional: false,
            add_default_xml_namespace: None,
            default_namespaces: vec![
                "System".to_string(),
                "System.Collections".to_string(),
                "System.Collections.Generic".to_string(),
                "System.Runtime.Serialization".to_string(),
            ],
            ignore_types: Vec::new(),
            ignore_types_in_namespaces: Vec::new(),
            export_attributes: Vec::new(),
            type_aliases: BTreeMap::new(),
        }
    }
}

impl GenerationConfig {
    /// Resolve per-request overrides against these service-wide defaults.
    ///
    /// Each overridable field takes the request value if present, else the
    /// default. The skip-sets, alias tables, and attribute allow-list are
    /// not overridable and always come from the defaults.
    pub fn merged(&self, req: &ConfigOverrides) -> GenerationConfig {
        GenerationConfig {
            base_url: req.base_url.clone().or_else(|| self.base_url.clone()),
            make_partial: req.make_partial.unwrap_or(self.make_partial),
            make_virtual: req.make_virtual.unwrap_or(self.make_virtual),
            add_return_marker: req.add_return_marker.unwrap_or(self.add_return_marker),
            add_description_as_comments: req
                .add_description_as_comments
                .unwrap_or(self.add_description_as_comments),
            add_data_contract_attributes: req
                .add_data_contract_attributes
                .unwrap_or(self.add_data_contract_attributes),
            make_data_contracts_extensible: req
                .make_data_contracts_extensible
                .unwrap_or(self.make_data_contracts_extensible),
            add_indexes_to_data_members: req
                .add_indexes_to_data_members
                .unwrap_or(self.add_indexes_to_data_members),
            initialize_collections: req
                .initialize_collections
                .unwrap_or(self.initialize_collections),
            add_implicit_version: req.add_implicit_version.or(self.add_implicit_version),
            add_response_status: req.add_response_status.unwrap_or(self.add_response_status),
            add_framework_types: req.add_framework_types.unwrap_or(self.add_framework_types),
            add_model_extensions: req.add_model_extensions.unwrap_or(self.add_model_extensions),
            make_properties_optional: req
                .make_properties_optional
                .unwrap_or(self.make_properties_optional),
            add_default_xml_namespace: req
                .add_default_xml_namespace
                .clone()
                .or_else(|| self.add_default_xml_namespace.clone()),
            default_namespaces: req
                .default_namespaces
                .clone()
                .unwrap_or_else(|| self.default_namespaces.clone()),
            ignore_types: self.ignore_types.clone(),
            ignore_types_in_namespaces: self.ignore_types_in_namespaces.clone(),
            export_attributes: self.export_attributes.clone(),
            type_aliases: self.type_aliases.clone(),
        }
    }
}

/// Per-request configuration overrides.
///
/// Only the fields a single render request may override; `None` falls back
/// to the service-wide default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub make_partial: Option<bool>,
    pub make_virtual: Option<bool>,
    pub add_return_marker: Option<bool>,
    pub add_description_as_comments: Option<bool>,
    pub add_data_contract_attributes: Option<bool>,
    pub make_data_contracts_extensible: Option<bool>,
    pub add_indexes_to_data_members: Option<bool>,
    pub initialize_collections: Option<bool>,
    pub add_implicit_version: Option<i32>,
    pub add_response_status: Option<bool>,
    pub add_framework_types: Option<bool>,
    pub add_model_extensions: Option<bool>,
    pub make_properties_optional: Option<bool>,
    pub add_default_xml_namespace: Option<String>,
    pub default_namespaces: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_request_values() {
        let defaults = GenerationConfig {
            make_partial: true,
            base_url: Some("https://api.example.org".into()),
            ..Default::default()
        };
        let overrides = ConfigOverrides {
            make_partial: Some(false),
            add_implicit_version: Some(3),
            ..Default::default()
        };

        let merged = defaults.merged(&overrides);
        assert!(!merged.make_partial);
        assert_eq!(merged.add_implicit_version, Some(3));
        // untouched fields fall back to defaults
        assert_eq!(merged.base_url.as_deref(), Some("https://api.example.org"));
        assert!(merged.make_virtual);
    }

    #[test]
    fn test_merge_keeps_service_only_fields() {
        let defaults = GenerationConfig {
            ignore_types: vec![TypeName::new("Secret", Some("MyApp.Model"))],
            export_attributes: vec!["RouteAttribute".into()],
            ..Default::default()
        };

        let merged = defaults.merged(&ConfigOverrides::default());
        assert_eq!(merged.ignore_types.len(), 1);
        assert_eq!(merged.export_attributes, vec!["RouteAttribute".to_string()]);
    }

    #[test]
    fn test_default_namespaces_override_replaces_whole_list() {
        let defaults = GenerationConfig::default();
        let overrides = ConfigOverrides {
            default_namespaces: Some(vec!["MyApp".into()]),
            ..Default::default()
        };

        let merged = defaults.merged(&overrides);
        assert_eq!(merged.default_namespaces, vec!["MyApp".to_string()]);
    }
}
