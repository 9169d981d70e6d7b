//! Editable controls derived from property definitions.
//!
//! Each property kind maps onto one control, and raw user input (text from a
//! form field or a `--prop key=value` flag) is coerced into the JSON value the
//! rendered component receives.

use serde_json::{Number, Value};
use thiserror::Error;

use crate::core::manifest::{ElementDefinition, OptionSet, PrimitiveKind, PropertyDefinition};

/// Errors from coercing raw input into a property value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("expected a number, got `{0}`")]
    NotANumber(String),

    #[error("expected `true` or `false`, got `{0}`")]
    NotABoolean(String),

    #[error("`{value}` is not one of: {allowed}")]
    NotAnOption { value: String, allowed: String },
}

/// The input widget used to edit a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlKind {
    Checkbox,
    Text,
    Number,
    Select { options: Vec<String> },
    List { element: ElementDefinition },
}

impl ControlKind {
    pub fn for_definition(definition: &PropertyDefinition) -> Self {
        match definition {
            PropertyDefinition::Primitive(PrimitiveKind::Boolean) => ControlKind::Checkbox,
            PropertyDefinition::Primitive(PrimitiveKind::String) => ControlKind::Text,
            PropertyDefinition::Primitive(PrimitiveKind::Number) => ControlKind::Number,
            PropertyDefinition::Option(set) => ControlKind::Select {
                options: set.options().to_vec(),
            },
            PropertyDefinition::Array(element) => ControlKind::List {
                element: element.clone(),
            },
        }
    }
}

/// Initial value shown for a property before the user edits it.
pub fn default_value(definition: &PropertyDefinition) -> Value {
    match definition {
        PropertyDefinition::Primitive(PrimitiveKind::String) => Value::String(String::new()),
        PropertyDefinition::Primitive(PrimitiveKind::Number) => Value::from(0),
        PropertyDefinition::Primitive(PrimitiveKind::Boolean) => Value::Bool(false),
        PropertyDefinition::Option(set) => set
            .options()
            .first()
            .map(|o| Value::String(o.clone()))
            .unwrap_or(Value::Null),
        PropertyDefinition::Array(_) => Value::Array(Vec::new()),
    }
}

/// Coerce one raw textual input into a property value.
pub fn coerce_value(definition: &PropertyDefinition, raw: &str) -> Result<Value, ControlError> {
    match definition {
        PropertyDefinition::Primitive(kind) => coerce_primitive(*kind, raw),
        PropertyDefinition::Option(set) => coerce_option(set, raw),
        PropertyDefinition::Array(element) => Ok(Value::Array(parse_array_input(raw, element))),
    }
}

fn coerce_primitive(kind: PrimitiveKind, raw: &str) -> Result<Value, ControlError> {
    match kind {
        PrimitiveKind::String => Ok(Value::String(raw.to_string())),
        PrimitiveKind::Number => parse_number(raw.trim()).ok_or_else(|| ControlError::NotANumber(raw.to_string())),
        PrimitiveKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(ControlError::NotABoolean(raw.to_string())),
        },
    }
}

fn coerce_option(set: &OptionSet, raw: &str) -> Result<Value, ControlError> {
    if set.contains(raw) {
        Ok(Value::String(raw.to_string()))
    } else {
        Err(ControlError::NotAnOption {
            value: raw.to_string(),
            allowed: set.options().join(", "),
        })
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    if let Ok(int) = raw.parse::<i64>() {
        return Some(Value::from(int));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

/// Parse comma-separated list input for an array property.
///
/// Entries that do not fit the element kind are dropped rather than rejected,
/// so a half-typed list never blocks a re-render.
pub fn parse_array_input(raw: &str, element: &ElementDefinition) -> Vec<Value> {
    let parts = raw.split(',').map(str::trim).filter(|part| !part.is_empty());

    match element {
        ElementDefinition::Primitive(PrimitiveKind::String) => {
            parts.map(|part| Value::String(part.to_string())).collect()
        }
        ElementDefinition::Primitive(PrimitiveKind::Number) => parts.filter_map(parse_number).collect(),
        ElementDefinition::Primitive(PrimitiveKind::Boolean) => parts
            .filter_map(|part| match part.to_ascii_lowercase().as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            })
            .collect(),
        ElementDefinition::Option(set) => parts
            .filter(|part| set.contains(part))
            .map(|part| Value::String(part.to_string()))
            .collect(),
    }
}

/// Hint text shown under a list control.
pub fn describe_array_element(element: &ElementDefinition) -> String {
    match element {
        ElementDefinition::Primitive(PrimitiveKind::String) => "Comma-separated text values".to_string(),
        ElementDefinition::Primitive(PrimitiveKind::Number) => "Comma-separated numbers".to_string(),
        ElementDefinition::Primitive(PrimitiveKind::Boolean) => {
            "Comma-separated true/false values".to_string()
        }
        ElementDefinition::Option(set) => format!("Allowed values: {}", set.options().join(", ")),
    }
}
