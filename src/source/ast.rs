//! Declaration-level syntax tree for a TypeScript module.
//!
//! Function bodies and initializers are not represented; only the shapes the
//! scanner needs to find exported components and resolve their prop types.

use std::path::PathBuf;

/// A parsed source file.
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub path: PathBuf,
    pub imports: Vec<Import>,
    pub declarations: Vec<Declaration>,
    pub exports: Vec<Export>,
}

impl Module {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Import specifiers in first-seen order, including re-export sources.
    pub fn specifiers(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        let from_imports = self.imports.iter().map(|i| i.source.as_str());
        let from_exports = self.exports.iter().filter_map(Export::source);
        for specifier in from_imports.chain(from_exports) {
            if !seen.contains(&specifier) {
                seen.push(specifier);
            }
        }
        seen
    }

    /// Find a local value or type declaration by name.
    pub fn declaration(&self, name: &str) -> impl Iterator<Item = &Declaration> + '_ {
        let name = name.to_string();
        self.declarations.iter().filter(move |d| d.name() == Some(name.as_str()))
    }

    pub fn import(&self, local: &str) -> Option<&Import> {
        self.imports.iter().find(|i| i.local == local)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub local: String,
    pub imported: ImportedName,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedName {
    Default,
    Named(String),
    Namespace,
}

impl ImportedName {
    /// The export name this import binds to in the source module.
    pub fn export_name(&self) -> Option<&str> {
        match self {
            ImportedName::Default => Some("default"),
            ImportedName::Named(name) => Some(name),
            ImportedName::Namespace => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Function(FunctionDecl),
    TypeAlias(TypeAliasDecl),
    Interface(InterfaceDecl),
    Enum(EnumDecl),
    /// A value binding whose initializer is not function-shaped.
    Variable(String),
}

impl Declaration {
    pub fn name(&self) -> Option<&str> {
        match self {
            Declaration::Function(f) => f.name.as_deref(),
            Declaration::TypeAlias(t) => Some(&t.name),
            Declaration::Interface(i) => Some(&i.name),
            Declaration::Enum(e) => Some(&e.name),
            Declaration::Variable(name) => Some(name),
        }
    }

    pub fn is_type(&self) -> bool {
        matches!(
            self,
            Declaration::TypeAlias(_) | Declaration::Interface(_) | Declaration::Enum(_)
        )
    }

    pub fn is_value(&self) -> bool {
        matches!(
            self,
            Declaration::Function(_) | Declaration::Enum(_) | Declaration::Variable(_)
        )
    }
}

/// A function declaration, function expression or arrow function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Option<String>,
    pub params: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Binding name, or `None` for destructuring patterns.
    pub name: Option<String>,
    pub ty: Option<TypeExpr>,
    pub rest: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
    pub name: String,
    pub type_params: Vec<String>,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: String,
    pub type_params: Vec<String>,
    pub extends: Vec<TypeExpr>,
    pub members: Vec<PropertySignature>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: String,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub value: Option<EnumValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnumValue {
    String(String),
    Number(String),
    /// Any initializer other than a plain literal.
    Computed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertySignature {
    pub name: String,
    pub optional: bool,
    pub ty: TypeExpr,
}

/// A type annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Keyword(TypeKeyword),
    StringLiteral(String),
    NumberLiteral(String),
    BooleanLiteral(bool),
    /// A possibly qualified reference such as `Props`, `T.Status` or `Array<string>`.
    Reference {
        name: Vec<String>,
        args: Vec<TypeExpr>,
    },
    Array(Box<TypeExpr>),
    Union(Vec<TypeExpr>),
    Intersection(Vec<TypeExpr>),
    Object(Vec<PropertySignature>),
    /// `Props["variant"]`
    Indexed {
        object: Box<TypeExpr>,
        key: String,
    },
    Function,
    /// Tuples, mapped, conditional, template literal, `typeof` and `keyof` types.
    Other,
}

impl TypeExpr {
    pub fn reference(name: &str) -> Self {
        TypeExpr::Reference {
            name: name.split('.').map(str::to_string).collect(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKeyword {
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    Object,
    Any,
    Unknown,
    Never,
    Void,
    Null,
    Undefined,
}

impl TypeKeyword {
    pub fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "string" => TypeKeyword::String,
            "number" => TypeKeyword::Number,
            "boolean" => TypeKeyword::Boolean,
            "bigint" => TypeKeyword::BigInt,
            "symbol" => TypeKeyword::Symbol,
            "object" => TypeKeyword::Object,
            "any" => TypeKeyword::Any,
            "unknown" => TypeKeyword::Unknown,
            "never" => TypeKeyword::Never,
            "void" => TypeKeyword::Void,
            "null" => TypeKeyword::Null,
            "undefined" => TypeKeyword::Undefined,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Export {
    /// `export function X`, `export const X`, `export { a as b }`
    Local { local: String, exported: String },
    Default(DefaultExport),
    /// `export { a as b } from './x'`
    ReExport {
        imported: String,
        exported: String,
        source: String,
    },
    /// `export * from './x'`
    ReExportAll { source: String },
}

impl Export {
    pub fn source(&self) -> Option<&str> {
        match self {
            Export::ReExport { source, .. } | Export::ReExportAll { source } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DefaultExport {
    /// `export default function (...) {}` or a default-exported arrow function.
    Function(FunctionDecl),
    /// `export default Name;`
    Ident(String),
    /// Any other expression, e.g. `export default memo(Button)`.
    Expression,
}
