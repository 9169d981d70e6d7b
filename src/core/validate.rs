//! Consumer-side manifest validation.
//!
//! A manifest crosses a trust boundary: the process reading it may have been
//! built from a different revision than the scanner that wrote it. Nothing in
//! the payload is trusted until it has been walked here. Validation is
//! all-or-nothing; the first violation aborts with a message that names the
//! offending component and field.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::manifest::{
    ComponentDefinition, ElementDefinition, Manifest, OptionKind, OptionSet, PrimitiveKind,
    PropertyDefinition, MANIFEST_VERSION,
};

/// Raised when a manifest payload is incompatible or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ManifestValidationError {
    message: String,
}

impl ManifestValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        ManifestValidationError {
            message: message.into(),
        }
    }

    /// Human-readable description of the violation.
    pub fn message(&self) -> &str {
        &self.message
    }
}

type Result<T> = std::result::Result<T, ManifestValidationError>;

fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(ManifestValidationError::new(message()))
    }
}

fn describe(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Validate an arbitrary payload against the manifest schema.
pub fn validate_manifest(payload: &Value) -> Result<Manifest> {
    let object = payload
        .as_object()
        .ok_or_else(|| ManifestValidationError::new("Manifest payload must be an object."))?;

    let version = object.get("version");
    ensure(version.and_then(Value::as_str) == Some(MANIFEST_VERSION), || {
        format!(
            "Unsupported manifest version \"{}\". Expected version \"{}\".",
            describe(version),
            MANIFEST_VERSION
        )
    })?;

    let components = object
        .get("components")
        .and_then(Value::as_array)
        .ok_or_else(|| ManifestValidationError::new("Manifest \"components\" must be an array."))?;

    let components = components
        .iter()
        .enumerate()
        .map(|(index, component)| validate_component(index, component))
        .collect::<Result<Vec<_>>>()?;

    Ok(Manifest::new(components))
}

/// Validate a single component definition.
///
/// `index` is only used to identify unnamed components in error messages.
pub fn validate_component(index: usize, value: &Value) -> Result<ComponentDefinition> {
    let object = value
        .as_object()
        .ok_or_else(|| ManifestValidationError::new(format!("Component at index {} must be an object.", index)))?;

    let name = match object.get("name") {
        Some(Value::String(name)) if !name.is_empty() => name.clone(),
        _ => {
            return Err(ManifestValidationError::new(format!(
                "Component at index {} requires a name.",
                index
            )))
        }
    };

    let path = match object.get("path") {
        Some(Value::String(path)) if !path.is_empty() => path.clone(),
        _ => {
            return Err(ManifestValidationError::new(format!(
                "Component \"{}\" requires a file path.",
                name
            )))
        }
    };

    let is_default_export = object
        .get("isDefaultExport")
        .and_then(Value::as_bool)
        .ok_or_else(|| {
            ManifestValidationError::new(format!(
                "Component \"{}\" must specify whether it is a default export.",
                name
            ))
        })?;

    let empty = Map::new();
    let props = match object.get("props") {
        None => &empty,
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(ManifestValidationError::new(format!(
                "Component \"{}\" must define props as an object map.",
                name
            )))
        }
    };

    let mut validated = IndexMap::new();
    for (prop_name, prop_value) in props {
        let definition = validate_property(&name, prop_name, prop_value)?;
        validated.insert(prop_name.clone(), definition);
    }

    Ok(ComponentDefinition {
        name,
        path,
        is_default_export,
        props: validated,
    })
}

fn validate_property(component: &str, prop: &str, value: &Value) -> Result<PropertyDefinition> {
    if value.get("type").and_then(Value::as_str) == Some("array") {
        let element = value.get("element").ok_or_else(|| {
            ManifestValidationError::new(format!(
                "Prop \"{}\" on component \"{}\" must specify an element definition when using type \"array\".",
                prop, component
            ))
        })?;
        let element = validate_base(component, &format!("{}[]", prop), element)?;
        return Ok(PropertyDefinition::Array(element));
    }

    validate_base(component, prop, value).map(PropertyDefinition::from)
}

/// Validate a non-array definition. Arrays are rejected here, which is what
/// keeps nested arrays out of the consumer.
fn validate_base(component: &str, prop: &str, value: &Value) -> Result<ElementDefinition> {
    let object = value.as_object().ok_or_else(|| {
        ManifestValidationError::new(format!(
            "Prop \"{}\" on component \"{}\" must be an object.",
            prop, component
        ))
    })?;

    let type_tag = object.get("type");
    let kind = match type_tag.and_then(Value::as_str) {
        Some("string") => return Ok(ElementDefinition::Primitive(PrimitiveKind::String)),
        Some("number") => return Ok(ElementDefinition::Primitive(PrimitiveKind::Number)),
        Some("boolean") => return Ok(ElementDefinition::Primitive(PrimitiveKind::Boolean)),
        Some("union") => OptionKind::Union,
        Some("enum") => OptionKind::Enum,
        _ => {
            return Err(ManifestValidationError::new(format!(
                "Prop \"{}\" on component \"{}\" has unsupported type \"{}\".",
                prop,
                component,
                describe(type_tag)
            )))
        }
    };

    let options = validate_options(component, prop, kind, object.get("options"))?;
    let name = match kind {
        OptionKind::Enum => object.get("name").and_then(Value::as_str).map(str::to_string),
        OptionKind::Union => None,
    };

    let set = OptionSet::new(kind, name, options).ok_or_else(|| {
        ManifestValidationError::new(format!(
            "Prop \"{}\" on component \"{}\" must provide at least one option for {} types.",
            prop,
            component,
            kind.as_str()
        ))
    })?;

    Ok(ElementDefinition::Option(set))
}

fn validate_options(
    component: &str,
    prop: &str,
    kind: OptionKind,
    value: Option<&Value>,
) -> Result<Vec<String>> {
    let invalid = || {
        ManifestValidationError::new(format!(
            "Prop \"{}\" on component \"{}\" must provide a string[] options array for {} types.",
            prop,
            component,
            kind.as_str()
        ))
    };

    let items = value.and_then(Value::as_array).ok_or_else(invalid)?;
    let mut options: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let option = item.as_str().ok_or_else(invalid)?;
        ensure(!options.iter().any(|o| o == option), || {
            format!(
                "Prop \"{}\" on component \"{}\" lists option \"{}\" more than once.",
                prop, component, option
            )
        })?;
        options.push(option.to_string());
    }

    Ok(options)
}
