//! Raw serde document shapes for the schema TOML.
//!
//! These structs mirror the document one-to-one; semantic resolution into
//! a type arena happens in [`crate::build`].

use serde::Deserialize;
use trellis_ir::GenerationConfig;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSchema {
    pub service: RawService,
    #[serde(default)]
    pub config: GenerationConfig,
    #[serde(default)]
    pub types: Vec<RawType>,
    #[serde(default)]
    pub operations: Vec<RawOperation>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawService {
    pub name: String,
    /// Default namespace for types that do not declare one.
    pub namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawType {
    pub name: String,
    pub namespace: Option<String>,
    #[serde(default)]
    pub kind: RawKind,
    /// Generic definition parameters, e.g. `["T"]` for a `QueryBase<T>`.
    #[serde(default)]
    pub params: Vec<String>,
    pub base: Option<String>,
    /// Typed-return marker: the operation's declared response type.
    pub returns: Option<String>,
    /// Void marker: the operation has no meaningful response.
    #[serde(default)]
    pub returns_void: bool,
    /// Enclosing type, for nested types.
    pub nested_in: Option<String>,
    pub description: Option<String>,
    pub data_contract: Option<RawDataContract>,
    #[serde(default)]
    pub routes: Vec<RawRoute>,
    #[serde(default)]
    pub properties: Vec<RawProperty>,
    #[serde(default)]
    pub attributes: Vec<RawAttributeUse>,
    /// Primary constructor parameters, for attribute types.
    #[serde(default)]
    pub ctor: Vec<RawParam>,
    /// Enum members.
    #[serde(default)]
    pub members: Vec<RawEnumMember>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawKind {
    #[default]
    Class,
    Struct,
    Interface,
    Enum,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub description: Option<String>,
    /// API-doc hint: the property is required.
    #[serde(default)]
    pub required: bool,
    pub param_type: Option<String>,
    pub display_type: Option<String>,
    pub allowable_values: Option<Vec<String>>,
    pub min: Option<i32>,
    pub max: Option<i32>,
    pub data_member: Option<RawDataMember>,
    #[serde(default)]
    pub attributes: Vec<RawAttributeUse>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDataMember {
    pub name: Option<String>,
    pub order: Option<i32>,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_true")]
    pub emit_default: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawAttributeUse {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub values: Vec<RawAttributeValue>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawAttributeValue {
    pub name: String,
    /// Scalar value, rendered to display form during resolution.
    pub value: toml::Value,
    /// Explicit value type reference; inferred from the TOML scalar when
    /// absent.
    #[serde(rename = "type")]
    pub ty: Option<String>,
    #[serde(default)]
    pub read_only: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawEnumMember {
    pub name: String,
    /// Underlying value; defaults to the member's ordinal position.
    pub value: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRoute {
    pub path: String,
    pub verbs: Option<String>,
    pub summary: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDataContract {
    pub name: Option<String>,
    pub namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawOperation {
    pub request: String,
    pub response: Option<String>,
    #[serde(default)]
    pub actions: Vec<String>,
}

fn default_true() -> bool {
    true
}
