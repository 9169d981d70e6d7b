//! Prop type classification.
//!
//! [`classify`] maps a resolved [`TypeShape`] onto a [`PropertyDefinition`].
//! Rules, in order:
//!
//! 1. `null`/`undefined` arms are stripped to get the base type.
//! 2. `string`, `number` and `boolean` (or a `true | false` union) are primitives.
//! 3. An enum becomes an `enum` option set of its member values.
//! 4. A union of string literals becomes a `union` option set.
//! 5. An array classifies its element with rules 1-4.
//!
//! Everything else is unsupported.

use crate::core::{ElementDefinition, OptionSet, PrimitiveKind, PropertyDefinition};
use crate::source::TypeShape;

/// Classify a prop type, or `None` if it has no supported control.
pub fn classify(shape: &TypeShape) -> Option<PropertyDefinition> {
    match strip_nullish(shape)? {
        TypeShape::Array(element) => classify_element(&element).map(PropertyDefinition::Array),
        base => classify_element(&base).map(PropertyDefinition::from),
    }
}

fn classify_element(shape: &TypeShape) -> Option<ElementDefinition> {
    match strip_nullish(shape)? {
        TypeShape::Primitive(kind) => Some(ElementDefinition::Primitive(kind)),
        TypeShape::Enum { name, members } => {
            OptionSet::enumeration(name, members).map(ElementDefinition::Option)
        }
        TypeShape::Union(arms) => classify_union(&arms),
        _ => None,
    }
}

fn classify_union(arms: &[TypeShape]) -> Option<ElementDefinition> {
    if arms.iter().all(|arm| matches!(arm, TypeShape::BooleanLiteral(_)))
        && arms.contains(&TypeShape::BooleanLiteral(true))
        && arms.contains(&TypeShape::BooleanLiteral(false))
    {
        return Some(ElementDefinition::Primitive(PrimitiveKind::Boolean));
    }

    let literals: Option<Vec<&str>> = arms
        .iter()
        .map(|arm| match arm {
            TypeShape::StringLiteral(value) => Some(value.as_str()),
            _ => None,
        })
        .collect();
    OptionSet::union(literals?).map(ElementDefinition::Option)
}

/// Remove `null`/`undefined` arms. A union left with one arm collapses to
/// that arm; a union of only nullish arms has no base type.
fn strip_nullish(shape: &TypeShape) -> Option<TypeShape> {
    match shape {
        TypeShape::Nullish => None,
        TypeShape::Union(arms) => {
            let mut rest: Vec<TypeShape> = arms
                .iter()
                .filter(|arm| **arm != TypeShape::Nullish)
                .cloned()
                .collect();
            match rest.len() {
                0 => None,
                1 => rest.pop(),
                _ => Some(TypeShape::Union(rest)),
            }
        }
        other => Some(other.clone()),
    }
}
