//! Component manifest schema.
//!
//! The manifest is the contract between the scanner that produces it and the
//! playground runtime that consumes it. The two sides may be built and deployed
//! independently, so every manifest carries a schema version that the consumer
//! checks before trusting anything else (see [`crate::core::validate`]).
//!
//! Serialization follows the wire shape exactly:
//!
//! ```json
//! { "version": "1",
//!   "components": [
//!     { "name": "Button", "path": "src/Button.tsx", "isDefaultExport": false,
//!       "props": { "label": { "type": "string" } } } ] }
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::core::validate::{validate_manifest, ManifestValidationError};

/// Schema version emitted by the scanner and required by the validator.
///
/// Bump this on any breaking change to the wire shape.
pub const MANIFEST_VERSION: &str = "1";

/// Scalar property kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
}

impl PrimitiveKind {
    /// The `type` discriminator used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a closed option set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    /// A union of string literal types.
    Union,
    /// An enum declaration.
    Enum,
}

impl OptionKind {
    /// The `type` discriminator used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKind::Union => "union",
            OptionKind::Enum => "enum",
        }
    }
}

/// A closed, ordered, duplicate-free, non-empty set of string values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet {
    kind: OptionKind,
    name: Option<String>,
    options: Vec<String>,
}

impl OptionSet {
    /// Build an option set, dropping repeated values (first occurrence wins).
    ///
    /// Returns `None` if no options remain.
    pub fn new<I, S>(kind: OptionKind, name: Option<String>, options: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for option in options {
            let option = option.into();
            if !unique.contains(&option) {
                unique.push(option);
            }
        }

        if unique.is_empty() {
            return None;
        }

        Some(OptionSet {
            kind,
            name,
            options: unique,
        })
    }

    /// Option set for a string literal union.
    pub fn union<I, S>(options: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OptionSet::new(OptionKind::Union, None, options)
    }

    /// Option set for a named enum declaration.
    pub fn enumeration<I, S>(name: impl Into<String>, options: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OptionSet::new(OptionKind::Enum, Some(name.into()), options)
    }

    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    /// Human-readable origin name (enum declarations only).
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Check whether `value` is one of the allowed options.
    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|o| o == value)
    }
}

/// A property shape that may appear as an array element.
///
/// There is deliberately no array variant here: arrays nest one level only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementDefinition {
    Primitive(PrimitiveKind),
    Option(OptionSet),
}

impl ElementDefinition {
    /// The `type` discriminator used on the wire.
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementDefinition::Primitive(kind) => kind.as_str(),
            ElementDefinition::Option(set) => set.kind().as_str(),
        }
    }

    fn to_wire(&self) -> WireDefinition<'_> {
        match self {
            ElementDefinition::Primitive(kind) => WireDefinition::primitive(*kind),
            ElementDefinition::Option(set) => WireDefinition::option(set),
        }
    }
}

/// The classified, renderable shape of one component property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyDefinition {
    Primitive(PrimitiveKind),
    Option(OptionSet),
    Array(ElementDefinition),
}

impl PropertyDefinition {
    pub fn string() -> Self {
        PropertyDefinition::Primitive(PrimitiveKind::String)
    }

    pub fn number() -> Self {
        PropertyDefinition::Primitive(PrimitiveKind::Number)
    }

    pub fn boolean() -> Self {
        PropertyDefinition::Primitive(PrimitiveKind::Boolean)
    }

    /// The `type` discriminator used on the wire.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyDefinition::Primitive(kind) => kind.as_str(),
            PropertyDefinition::Option(set) => set.kind().as_str(),
            PropertyDefinition::Array(_) => "array",
        }
    }

    /// Narrow to an element definition, if this is not an array.
    pub fn as_element(&self) -> Option<ElementDefinition> {
        match self {
            PropertyDefinition::Primitive(kind) => Some(ElementDefinition::Primitive(*kind)),
            PropertyDefinition::Option(set) => Some(ElementDefinition::Option(set.clone())),
            PropertyDefinition::Array(_) => None,
        }
    }

    fn to_wire(&self) -> WireDefinition<'_> {
        match self {
            PropertyDefinition::Primitive(kind) => WireDefinition::primitive(*kind),
            PropertyDefinition::Option(set) => WireDefinition::option(set),
            PropertyDefinition::Array(element) => WireDefinition::Array {
                element: Box::new(element.to_wire()),
            },
        }
    }
}

impl From<ElementDefinition> for PropertyDefinition {
    fn from(element: ElementDefinition) -> Self {
        match element {
            ElementDefinition::Primitive(kind) => PropertyDefinition::Primitive(kind),
            ElementDefinition::Option(set) => PropertyDefinition::Option(set),
        }
    }
}

impl Serialize for PropertyDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

impl Serialize for ElementDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

/// Wire representation of property definitions.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireDefinition<'a> {
    String,
    Number,
    Boolean,
    Union {
        options: &'a [String],
    },
    Enum {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<&'a str>,
        options: &'a [String],
    },
    Array {
        element: Box<WireDefinition<'a>>,
    },
}

impl<'a> WireDefinition<'a> {
    fn primitive(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::String => WireDefinition::String,
            PrimitiveKind::Number => WireDefinition::Number,
            PrimitiveKind::Boolean => WireDefinition::Boolean,
        }
    }

    fn option(set: &'a OptionSet) -> Self {
        match set.kind() {
            OptionKind::Union => WireDefinition::Union {
                options: set.options(),
            },
            OptionKind::Enum => WireDefinition::Enum {
                name: set.name(),
                options: set.options(),
            },
        }
    }
}

/// Stable identity of a component within a manifest.
///
/// A single file may export a default component and a named component with
/// the same display name, so the export kind is part of the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentIdentity {
    pub path: String,
    pub name: String,
    pub is_default_export: bool,
}

impl fmt::Display for ComponentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default_export {
            write!(f, "{} (default export {})", self.path, self.name)
        } else {
            write!(f, "{}#{}", self.path, self.name)
        }
    }
}

/// A discovered component and its controllable properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinition {
    /// Display name (file base name for default exports).
    pub name: String,

    /// File path relative to the project root, always `/`-separated.
    pub path: String,

    /// Whether the component is the module's default export.
    pub is_default_export: bool,

    /// Supported properties by name, in declaration order.
    pub props: IndexMap<String, PropertyDefinition>,
}

impl ComponentDefinition {
    /// Create a component with no properties.
    pub fn new(name: impl Into<String>, path: impl Into<String>, is_default_export: bool) -> Self {
        ComponentDefinition {
            name: name.into(),
            path: path.into(),
            is_default_export,
            props: IndexMap::new(),
        }
    }

    /// Add a property.
    pub fn with_prop(mut self, name: impl Into<String>, definition: PropertyDefinition) -> Self {
        self.props.insert(name.into(), definition);
        self
    }

    pub fn identity(&self) -> ComponentIdentity {
        ComponentIdentity {
            path: self.path.clone(),
            name: self.name.clone(),
            is_default_export: self.is_default_export,
        }
    }
}

/// The versioned list of all discovered components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    /// Schema version; always [`MANIFEST_VERSION`] for manifests built here.
    pub version: String,

    /// Components in file-discovery then export order.
    pub components: Vec<ComponentDefinition>,
}

impl Manifest {
    /// Create a manifest stamped with the current schema version.
    pub fn new(components: Vec<ComponentDefinition>) -> Self {
        Manifest {
            version: MANIFEST_VERSION.to_string(),
            components,
        }
    }

    /// Parse and validate an untrusted JSON payload.
    pub fn from_json(payload: &str) -> Result<Self, ManifestValidationError> {
        let value: serde_json::Value = serde_json::from_str(payload)
            .map_err(|e| ManifestValidationError::new(format!("Manifest payload is not valid JSON: {}", e)))?;
        validate_manifest(&value)
    }

    /// Serialize to a compact JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to a pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Find a component by identity.
    pub fn find(&self, identity: &ComponentIdentity) -> Option<&ComponentDefinition> {
        self.components.iter().find(|c| c.identity() == *identity)
    }

    /// All components with the given display name.
    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ComponentDefinition> + 'a {
        self.components.iter().filter(move |c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_option_set_dedups_in_order() {
        let set = OptionSet::union(["b", "a", "b", "c", "a"]).unwrap();
        assert_eq!(set.options(), &["b", "a", "c"]);
        assert_eq!(set.kind(), OptionKind::Union);
        assert!(set.name().is_none());
    }

    #[test]
    fn test_option_set_rejects_empty() {
        assert!(OptionSet::union(Vec::<String>::new()).is_none());
        assert!(OptionSet::enumeration("Empty", Vec::<String>::new()).is_none());
    }

    #[test]
    fn test_property_definition_wire_shape() {
        let status = OptionSet::enumeration("Status", ["active", "disabled"]).unwrap();
        let component = ComponentDefinition::new("Button", "src/Button.tsx", false)
            .with_prop("label", PropertyDefinition::string())
            .with_prop("count", PropertyDefinition::number())
            .with_prop("disabled", PropertyDefinition::boolean())
            .with_prop(
                "variant",
                PropertyDefinition::Option(OptionSet::union(["primary", "secondary"]).unwrap()),
            )
            .with_prop("status", PropertyDefinition::Option(status))
            .with_prop(
                "tags",
                PropertyDefinition::Array(ElementDefinition::Primitive(PrimitiveKind::String)),
            );

        let value = serde_json::to_value(&component).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "Button",
                "path": "src/Button.tsx",
                "isDefaultExport": false,
                "props": {
                    "count": { "type": "number" },
                    "disabled": { "type": "boolean" },
                    "label": { "type": "string" },
                    "status": { "type": "enum", "name": "Status", "options": ["active", "disabled"] },
                    "tags": { "type": "array", "element": { "type": "string" } },
                    "variant": { "type": "union", "options": ["primary", "secondary"] }
                }
            })
        );
    }

    #[test]
    fn test_props_keep_declaration_order() {
        let component = ComponentDefinition::new("Card", "src/Card.tsx", true)
            .with_prop("title", PropertyDefinition::string())
            .with_prop("elevation", PropertyDefinition::number())
            .with_prop("active", PropertyDefinition::boolean());

        let json = serde_json::to_string(&component).unwrap();
        let title = json.find("\"title\"").unwrap();
        let elevation = json.find("\"elevation\"").unwrap();
        let active = json.find("\"active\"").unwrap();
        assert!(title < elevation && elevation < active, "{}", json);

        let reparsed = Manifest::from_json(&Manifest::new(vec![component]).to_json().unwrap()).unwrap();
        let names: Vec<_> = reparsed.components[0].props.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["title", "elevation", "active"]);
    }

    #[test]
    fn test_enum_without_name_omits_field() {
        let set = OptionSet::new(OptionKind::Enum, None, ["x"]).unwrap();
        let value = serde_json::to_value(PropertyDefinition::Option(set)).unwrap();
        assert_eq!(value, json!({ "type": "enum", "options": ["x"] }));
    }

    #[test]
    fn test_manifest_stamps_version() {
        let manifest = Manifest::new(Vec::new());
        assert_eq!(manifest.version, MANIFEST_VERSION);
        assert_eq!(manifest.to_json().unwrap(), r#"{"version":"1","components":[]}"#);
    }

    #[test]
    fn test_identity_distinguishes_default_and_named() {
        let named = ComponentDefinition::new("Button", "Button.tsx", false);
        let default = ComponentDefinition::new("Button", "Button.tsx", true);
        assert_ne!(named.identity(), default.identity());

        let manifest = Manifest::new(vec![named.clone(), default.clone()]);
        assert_eq!(manifest.find(&default.identity()), Some(&default));
        assert_eq!(manifest.find_by_name("Button").count(), 2);
    }

    #[test]
    fn test_as_element_refuses_arrays() {
        let array = PropertyDefinition::Array(ElementDefinition::Primitive(PrimitiveKind::Number));
        assert!(array.as_element().is_none());
        assert_eq!(
            PropertyDefinition::boolean().as_element(),
            Some(ElementDefinition::Primitive(PrimitiveKind::Boolean))
        );
    }
}
