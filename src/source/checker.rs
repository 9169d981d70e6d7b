//! Type queries over a loaded [`Program`].
//!
//! Syntax-level [`TypeExpr`]s are resolved across modules into [`TypeShape`],
//! a small closed representation that prop classification works on. Alias
//! chains are followed at most [`MAX_RESOLUTION_DEPTH`] deep; anything deeper
//! or unresolvable becomes [`TypeShape::Unknown`].

use super::ast::{EnumDecl, EnumValue, InterfaceDecl, PropertySignature, TypeExpr, TypeKeyword};
use super::program::{ModuleId, Program, Space, Symbol, SymbolKind, MAX_RESOLUTION_DEPTH};
use crate::core::PrimitiveKind;

/// Resolved shape of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    Primitive(PrimitiveKind),
    StringLiteral(String),
    NumberLiteral(String),
    BooleanLiteral(bool),
    /// `null`, `undefined` or `void`.
    Nullish,
    /// An enum declaration with its member values in declaration order.
    Enum { name: String, members: Vec<String> },
    /// A flattened union.
    Union(Vec<TypeShape>),
    Array(Box<TypeShape>),
    Object,
    Function,
    Unknown,
}

/// A property of an object-like type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyShape {
    pub name: String,
    pub optional: bool,
    pub shape: TypeShape,
}

#[derive(Clone, Copy)]
struct Scope<'a> {
    module: ModuleId,
    type_params: &'a [String],
}

pub struct TypeChecker<'p> {
    program: &'p Program,
}

impl<'p> TypeChecker<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self { program }
    }

    /// Resolve a type annotation written in `module`.
    pub fn shape_of(&self, module: ModuleId, ty: &TypeExpr) -> TypeShape {
        self.shape(Scope { module, type_params: &[] }, ty, 0)
    }

    /// Properties of an object-like type annotation written in `module`, or
    /// `None` if the type is not object-like or cannot be resolved.
    pub fn properties_of(&self, module: ModuleId, ty: &TypeExpr) -> Option<Vec<PropertyShape>> {
        self.properties(Scope { module, type_params: &[] }, ty, 0)
    }

    fn shape(&self, scope: Scope<'p>, ty: &TypeExpr, depth: usize) -> TypeShape {
        if depth > MAX_RESOLUTION_DEPTH {
            return TypeShape::Unknown;
        }

        match ty {
            TypeExpr::Keyword(keyword) => match keyword {
                TypeKeyword::String => TypeShape::Primitive(PrimitiveKind::String),
                TypeKeyword::Number => TypeShape::Primitive(PrimitiveKind::Number),
                TypeKeyword::Boolean => TypeShape::Primitive(PrimitiveKind::Boolean),
                TypeKeyword::Null | TypeKeyword::Undefined | TypeKeyword::Void => {
                    TypeShape::Nullish
                }
                TypeKeyword::Object => TypeShape::Object,
                _ => TypeShape::Unknown,
            },
            TypeExpr::StringLiteral(s) => TypeShape::StringLiteral(s.clone()),
            TypeExpr::NumberLiteral(n) => TypeShape::NumberLiteral(n.clone()),
            TypeExpr::BooleanLiteral(b) => TypeShape::BooleanLiteral(*b),
            TypeExpr::Array(element) => {
                TypeShape::Array(Box::new(self.shape(scope, element, depth + 1)))
            }
            TypeExpr::Union(arms) => {
                let mut flat = Vec::with_capacity(arms.len());
                for arm in arms {
                    match self.shape(scope, arm, depth + 1) {
                        TypeShape::Union(inner) => flat.extend(inner),
                        other => flat.push(other),
                    }
                }
                TypeShape::Union(flat)
            }
            TypeExpr::Intersection(_) | TypeExpr::Object(_) => TypeShape::Object,
            TypeExpr::Function => TypeShape::Function,
            TypeExpr::Indexed { object, key } => self
                .properties(scope, object, depth + 1)
                .and_then(|props| props.into_iter().find(|p| &p.name == key))
                .map(|p| p.shape)
                .unwrap_or(TypeShape::Unknown),
            TypeExpr::Reference { name, args } => self.reference_shape(scope, name, args, depth),
            TypeExpr::Other => TypeShape::Unknown,
        }
    }

    fn reference_shape(
        &self,
        scope: Scope<'p>,
        name: &[String],
        args: &[TypeExpr],
        depth: usize,
    ) -> TypeShape {
        if let ([single], [element]) = (name, args) {
            if (single == "Array" || single == "ReadonlyArray")
                && !scope.type_params.contains(single)
                && self.resolve(scope, name, depth).is_none()
            {
                return TypeShape::Array(Box::new(self.shape(scope, element, depth + 1)));
            }
        }

        let Some(symbol) = self.resolve(scope, name, depth) else {
            return TypeShape::Unknown;
        };
        match symbol.kind {
            SymbolKind::TypeAlias(alias) => self.shape(
                Scope {
                    module: symbol.module,
                    type_params: &alias.type_params,
                },
                &alias.ty,
                depth + 1,
            ),
            SymbolKind::Interface(_) => TypeShape::Object,
            SymbolKind::Enum(decl) => TypeShape::Enum {
                name: decl.name.clone(),
                members: enum_values(decl),
            },
            SymbolKind::Function(_) | SymbolKind::Value | SymbolKind::Namespace(_) => {
                TypeShape::Unknown
            }
        }
    }

    fn properties(
        &self,
        scope: Scope<'p>,
        ty: &TypeExpr,
        depth: usize,
    ) -> Option<Vec<PropertyShape>> {
        if depth > MAX_RESOLUTION_DEPTH {
            return None;
        }

        match ty {
            TypeExpr::Object(members) => Some(self.member_shapes(scope, members, depth)),
            TypeExpr::Intersection(parts) => {
                let mut merged = Vec::new();
                let mut object_like = false;
                for part in parts {
                    if let Some(props) = self.properties(scope, part, depth + 1) {
                        object_like = true;
                        merge_properties(&mut merged, props);
                    }
                }
                object_like.then_some(merged)
            }
            TypeExpr::Reference { name, .. } => {
                let symbol = self.resolve(scope, name, depth)?;
                match symbol.kind {
                    SymbolKind::Interface(decl) => {
                        Some(self.interface_properties(symbol.module, decl, depth + 1))
                    }
                    SymbolKind::TypeAlias(alias) => self.properties(
                        Scope {
                            module: symbol.module,
                            type_params: &alias.type_params,
                        },
                        &alias.ty,
                        depth + 1,
                    ),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn interface_properties(
        &self,
        module: ModuleId,
        decl: &'p InterfaceDecl,
        depth: usize,
    ) -> Vec<PropertyShape> {
        let scope = Scope {
            module,
            type_params: &decl.type_params,
        };
        let mut merged = Vec::new();
        for base in &decl.extends {
            if let Some(props) = self.properties(scope, base, depth + 1) {
                merge_properties(&mut merged, props);
            }
        }
        merge_properties(&mut merged, self.member_shapes(scope, &decl.members, depth));
        merged
    }

    fn member_shapes(
        &self,
        scope: Scope<'p>,
        members: &[PropertySignature],
        depth: usize,
    ) -> Vec<PropertyShape> {
        members
            .iter()
            .map(|member| PropertyShape {
                name: member.name.clone(),
                optional: member.optional,
                shape: self.shape(scope, &member.ty, depth + 1),
            })
            .collect()
    }

    /// Resolve a possibly qualified type name.
    fn resolve(&self, scope: Scope<'p>, name: &[String], depth: usize) -> Option<Symbol<'p>> {
        if depth > MAX_RESOLUTION_DEPTH {
            return None;
        }
        let (first, rest) = name.split_first()?;
        if scope.type_params.contains(first) {
            return None;
        }

        let Some((last, middle)) = rest.split_last() else {
            return self.program.lookup(scope.module, first, Space::Type);
        };

        let mut namespace = match self.program.lookup(scope.module, first, Space::Value)?.kind {
            SymbolKind::Namespace(target) => target,
            _ => return None,
        };
        for segment in middle {
            namespace = match self.program.lookup_export(namespace, segment, Space::Value)?.kind {
                SymbolKind::Namespace(target) => target,
                _ => return None,
            };
        }
        self.program.lookup_export(namespace, last, Space::Type)
    }
}

fn merge_properties(into: &mut Vec<PropertyShape>, props: Vec<PropertyShape>) {
    for prop in props {
        match into.iter_mut().find(|existing| existing.name == prop.name) {
            Some(existing) => *existing = prop,
            None => into.push(prop),
        }
    }
}

/// Member values of an enum in declaration order.
///
/// A member without an initializer takes the previous numeric value plus one
/// (0 for the first member). When that value is not known, because the
/// previous member is a string or computed, the member name is used, as it
/// is for computed members themselves.
pub fn enum_values(decl: &EnumDecl) -> Vec<String> {
    let mut next = Some(0.0);
    decl.members
        .iter()
        .map(|member| {
            let numeric = match &member.value {
                Some(EnumValue::String(value)) => {
                    next = None;
                    return value.clone();
                }
                Some(EnumValue::Number(raw)) => numeric_value(raw),
                Some(EnumValue::Computed) => None,
                None => next,
            };
            next = numeric.map(|n| n + 1.0);
            match numeric {
                Some(n) => n.to_string(),
                None => member.name.clone(),
            }
        })
        .collect()
}

/// Value of a numeric literal as written in source, with an optional sign.
fn numeric_value(raw: &str) -> Option<f64> {
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let digits = digits.replace('_', "");
    let radix = match digits.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0b" | "0B") => Some(2),
        Some("0o" | "0O") => Some(8),
        _ => None,
    };
    let value = match radix {
        Some(radix) => u64::from_str_radix(&digits[2..], radix).ok()? as f64,
        None => digits.parse::<f64>().ok()?,
    };
    Some(if negative { -value } else { value })
}
