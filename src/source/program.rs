//! A set of parsed modules linked by their relative imports.
//!
//! [`Program::load`] parses the given root files and every file reachable
//! from them through relative import or re-export specifiers, one breadth
//! level at a time on the rayon pool. Once loaded the program is immutable and
//! answers symbol queries across module boundaries.

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use rayon::prelude::*;
use thiserror::Error;

use super::ast::{
    Declaration, DefaultExport, EnumDecl, Export, FunctionDecl, InterfaceDecl, Module,
    TypeAliasDecl,
};
use super::parser::{parse_module, ParseError};
use crate::util::fs::normalize_lexically;

/// Maximum number of import/export/alias hops followed for one query.
pub const MAX_RESOLUTION_DEPTH: usize = 16;

const SOURCE_EXTENSIONS: &[&str] = &["tsx", "ts", "d.ts"];

/// Errors from loading one source file.
#[derive(Debug, Error, Diagnostic)]
pub enum SourceError {
    #[error("failed to read {}", path.display())]
    #[diagnostic(code(rplite::source::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),
}

/// Index of a module inside a [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(usize);

impl ModuleId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Which declaration space a name is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Space {
    Type,
    Value,
}

#[derive(Debug, Clone, Copy)]
pub enum SymbolKind<'p> {
    Function(&'p FunctionDecl),
    TypeAlias(&'p TypeAliasDecl),
    Interface(&'p InterfaceDecl),
    Enum(&'p EnumDecl),
    /// A value that is not function-shaped.
    Value,
    /// `import * as ns from './x'`
    Namespace(ModuleId),
}

/// A resolved declaration and the module that declares it.
#[derive(Debug, Clone, Copy)]
pub struct Symbol<'p> {
    pub module: ModuleId,
    pub kind: SymbolKind<'p>,
}

/// Result of [`Program::load`]: the program plus the files that failed.
#[derive(Debug)]
pub struct LoadOutcome {
    pub program: Program,
    pub failures: Vec<(PathBuf, SourceError)>,
}

#[derive(Debug, Default)]
pub struct Program {
    modules: Vec<Module>,
    by_path: HashMap<PathBuf, ModuleId>,
    /// Per module: import specifier to linked module.
    links: Vec<HashMap<String, ModuleId>>,
}

impl Program {
    /// Load `roots` and everything they reach through relative specifiers.
    pub fn load(roots: &[PathBuf]) -> LoadOutcome {
        let mut program = Program::default();
        let mut failures = Vec::new();
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut frontier: Vec<PathBuf> = roots
            .iter()
            .filter(|path| seen.insert((*path).clone()))
            .cloned()
            .collect();

        while !frontier.is_empty() {
            let parsed: Vec<(PathBuf, Result<Module, SourceError>)> = frontier
                .par_iter()
                .map(|path| (path.clone(), parse_file(path)))
                .collect();

            frontier = Vec::new();
            for (path, result) in parsed {
                match result {
                    Ok(module) => {
                        for specifier in module.specifiers() {
                            let target = candidates(&path, specifier)
                                .into_iter()
                                .find(|candidate| candidate.is_file());
                            if let Some(target) = target {
                                if seen.insert(target.clone()) {
                                    frontier.push(target);
                                }
                            }
                        }
                        program.insert(module);
                    }
                    Err(error) => {
                        tracing::debug!("failed to load {}: {}", path.display(), error);
                        failures.push((path, error));
                    }
                }
            }
        }

        program.link();
        LoadOutcome { program, failures }
    }

    /// Build a program from in-memory sources. Specifiers resolve only
    /// against the given paths.
    pub fn from_sources<I, P, S>(sources: I) -> Result<Program, SourceError>
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<PathBuf>,
        S: AsRef<str>,
    {
        let mut program = Program::default();
        for (path, source) in sources {
            let path = path.into();
            program.insert(parse_module(&path, source.as_ref())?);
        }
        program.link();
        Ok(program)
    }

    fn insert(&mut self, module: Module) -> ModuleId {
        let id = ModuleId(self.modules.len());
        self.by_path.insert(module.path.clone(), id);
        self.modules.push(module);
        id
    }

    fn link(&mut self) {
        self.links = self
            .modules
            .iter()
            .map(|module| {
                module
                    .specifiers()
                    .into_iter()
                    .filter_map(|specifier| {
                        candidates(&module.path, specifier)
                            .iter()
                            .find_map(|candidate| self.by_path.get(candidate).copied())
                            .map(|id| (specifier.to_string(), id))
                    })
                    .collect()
            })
            .collect();
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn module_id(&self, path: &Path) -> Option<ModuleId> {
        self.by_path.get(path).copied()
    }

    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.0]
    }

    /// The module a specifier in `from` links to, if it was loaded.
    pub fn resolve_specifier(&self, from: ModuleId, specifier: &str) -> Option<ModuleId> {
        self.links.get(from.0)?.get(specifier).copied()
    }

    /// Resolve a name as seen from inside `module`: a local declaration or an
    /// import followed to its declaration.
    pub fn lookup(&self, module: ModuleId, name: &str, space: Space) -> Option<Symbol<'_>> {
        Walk::new(self).lookup(module, name, space, 0)
    }

    /// Resolve what `module` exports under `exported` (`"default"` included).
    pub fn lookup_export(
        &self,
        module: ModuleId,
        exported: &str,
        space: Space,
    ) -> Option<Symbol<'_>> {
        Walk::new(self).lookup_export(module, exported, space, 0)
    }
}

/// One resolution query. Each `(module, name, space)` step is visited at
/// most once, and no chain is followed past [`MAX_RESOLUTION_DEPTH`] hops.
struct Walk<'p> {
    program: &'p Program,
    visited: HashSet<(ModuleId, String, Space, bool)>,
}

impl<'p> Walk<'p> {
    fn new(program: &'p Program) -> Self {
        Self {
            program,
            visited: HashSet::new(),
        }
    }

    fn first_visit(&mut self, module: ModuleId, name: &str, space: Space, export: bool) -> bool {
        self.visited.insert((module, name.to_string(), space, export))
    }

    fn lookup(
        &mut self,
        module: ModuleId,
        name: &str,
        space: Space,
        depth: usize,
    ) -> Option<Symbol<'p>> {
        if depth > MAX_RESOLUTION_DEPTH || !self.first_visit(module, name, space, false) {
            return None;
        }
        let program = self.program;
        let source = program.module(module);

        for declaration in source.declaration(name) {
            if let Some(kind) = symbol_kind(declaration, space) {
                return Some(Symbol { module, kind });
            }
        }

        let import = source.import(name)?;
        let target = program.resolve_specifier(module, &import.source)?;
        match import.imported.export_name() {
            Some(exported) => self.lookup_export(target, exported, space, depth + 1),
            None => Some(Symbol {
                module: target,
                kind: SymbolKind::Namespace(target),
            }),
        }
    }

    fn lookup_export(
        &mut self,
        module: ModuleId,
        exported: &str,
        space: Space,
        depth: usize,
    ) -> Option<Symbol<'p>> {
        if depth > MAX_RESOLUTION_DEPTH || !self.first_visit(module, exported, space, true) {
            return None;
        }
        let program = self.program;
        let source = program.module(module);

        for export in &source.exports {
            let found = match export {
                Export::Local { local, exported: name } if name == exported => {
                    self.lookup(module, local, space, depth + 1)
                }
                Export::Default(default) if exported == "default" => match default {
                    DefaultExport::Function(function) if space == Space::Value => Some(Symbol {
                        module,
                        kind: SymbolKind::Function(function),
                    }),
                    DefaultExport::Ident(local) => self.lookup(module, local, space, depth + 1),
                    DefaultExport::Expression if space == Space::Value => Some(Symbol {
                        module,
                        kind: SymbolKind::Value,
                    }),
                    _ => None,
                },
                Export::ReExport {
                    imported,
                    exported: name,
                    source: specifier,
                } if name == exported => program
                    .resolve_specifier(module, specifier)
                    .and_then(|target| self.lookup_export(target, imported, space, depth + 1)),
                _ => None,
            };
            if found.is_some() {
                return found;
            }
        }

        if exported == "default" {
            return None;
        }
        for export in &source.exports {
            if let Export::ReExportAll { source: specifier } = export {
                let found = program
                    .resolve_specifier(module, specifier)
                    .and_then(|target| self.lookup_export(target, exported, space, depth + 1));
                if found.is_some() {
                    return found;
                }
            }
        }
        None
    }
}

fn symbol_kind(declaration: &Declaration, space: Space) -> Option<SymbolKind<'_>> {
    match (declaration, space) {
        (Declaration::Function(f), Space::Value) => Some(SymbolKind::Function(f)),
        (Declaration::Variable(_), Space::Value) => Some(SymbolKind::Value),
        (Declaration::Enum(e), _) => Some(SymbolKind::Enum(e)),
        (Declaration::TypeAlias(t), Space::Type) => Some(SymbolKind::TypeAlias(t)),
        (Declaration::Interface(i), Space::Type) => Some(SymbolKind::Interface(i)),
        _ => None,
    }
}

fn parse_file(path: &Path) -> Result<Module, SourceError> {
    let source = std::fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_module(path, &source)?)
}

/// Candidate files for a relative specifier, in resolution order. Bare
/// (package) specifiers have none.
fn candidates(importer: &Path, specifier: &str) -> Vec<PathBuf> {
    let relative = specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier == "."
        || specifier == "..";
    if !relative {
        return Vec::new();
    }

    let dir = importer.parent().unwrap_or_else(|| Path::new(""));
    let base = normalize_lexically(&dir.join(specifier));
    let mut out = Vec::new();

    match base.extension().and_then(|e| e.to_str()) {
        Some("ts" | "tsx") => out.push(base.clone()),
        Some("js" | "jsx" | "mjs") => {
            out.push(base.with_extension("tsx"));
            out.push(base.with_extension("ts"));
        }
        _ => {}
    }
    for ext in SOURCE_EXTENSIONS {
        out.push(with_appended_extension(&base, ext));
    }
    for ext in SOURCE_EXTENSIONS {
        out.push(base.join(format!("index.{ext}")));
    }
    out
}

fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}
