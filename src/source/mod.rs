//! TypeScript source front end.
//!
//! - [`lexer`]: logos tokenizer
//! - [`parser`]: declaration-level parser producing [`ast::Module`]
//! - [`program`]: loading and linking modules, symbol lookup
//! - [`checker`]: resolving type annotations into [`TypeShape`]

pub mod ast;
pub mod checker;
pub mod lexer;
pub mod parser;
pub mod program;

pub use checker::{PropertyShape, TypeChecker, TypeShape};
pub use parser::{parse_module, ParseError};
pub use program::{LoadOutcome, ModuleId, Program, SourceError, Space, Symbol, SymbolKind};
