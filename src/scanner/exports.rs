//! Component resolution for one module's exports.

use std::path::Path;

use crate::core::ComponentDefinition;
use crate::source::ast::{DefaultExport, Export, FunctionDecl};
use crate::source::{ModuleId, Program, Space, Symbol, SymbolKind, TypeChecker};
use crate::util::diagnostic::Diagnostic;
use crate::util::fs::project_relative;

use super::infer::classify;

/// Components found in one file, plus the diagnostics raised while looking.
///
/// Diagnostics are returned rather than logged so that files resolved in
/// parallel still report in discovery order.
#[derive(Debug, Default)]
pub struct ResolvedFile {
    pub components: Vec<ComponentDefinition>,
    pub diagnostics: Vec<Diagnostic>,
}

/// An exported binding that may be a component.
struct Candidate<'p> {
    exposed: &'p str,
    symbol: Option<Symbol<'p>>,
}

pub struct ExportResolver<'p> {
    program: &'p Program,
    checker: TypeChecker<'p>,
    project_root: &'p Path,
}

impl<'p> ExportResolver<'p> {
    pub fn new(program: &'p Program, project_root: &'p Path) -> Self {
        Self {
            program,
            checker: TypeChecker::new(program),
            project_root,
        }
    }

    /// Resolve every export of `module` in source order.
    pub fn resolve(&self, module: ModuleId) -> ResolvedFile {
        let source = self.program.module(module);
        let path = project_relative(self.project_root, &source.path);
        let stem = source
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut resolved = ResolvedFile::default();
        for export in &source.exports {
            let Some(candidate) = self.candidate(module, export) else {
                continue;
            };

            let is_default_export = candidate.exposed == "default";
            let name = if is_default_export {
                stem.as_str()
            } else {
                candidate.exposed
            };

            let component = ComponentDefinition::new(name, path.as_str(), is_default_export);
            if resolved
                .components
                .iter()
                .any(|c| c.identity() == component.identity())
            {
                continue;
            }

            let rejected = |reason: &str| {
                Diagnostic::debug("Skipping export")
                    .with_context("export", candidate.exposed)
                    .with_context("reason", reason)
                    .with_location(&source.path)
            };

            let function = match candidate.symbol.map(|s| (s.module, s.kind)) {
                Some((declared_in, SymbolKind::Function(function))) => (declared_in, function),
                Some(_) => {
                    resolved.diagnostics.push(rejected("not a function"));
                    continue;
                }
                None => {
                    resolved.diagnostics.push(rejected("unresolved"));
                    continue;
                }
            };

            match self.build(component, function, &source.path) {
                Ok((component, warnings)) => {
                    resolved.diagnostics.extend(warnings);
                    resolved.components.push(component);
                }
                Err(reason) => resolved.diagnostics.push(rejected(reason)),
            }
        }

        resolved
    }

    fn candidate(&self, module: ModuleId, export: &'p Export) -> Option<Candidate<'p>> {
        let program = self.program;
        let candidate = match export {
            Export::Local { local, exported } => Candidate {
                exposed: exported,
                symbol: program.lookup(module, local, Space::Value),
            },
            Export::Default(default) => Candidate {
                exposed: "default",
                symbol: match default {
                    DefaultExport::Function(function) => Some(Symbol {
                        module,
                        kind: SymbolKind::Function(function),
                    }),
                    DefaultExport::Ident(local) => program.lookup(module, local, Space::Value),
                    DefaultExport::Expression => None,
                },
            },
            Export::ReExport {
                imported,
                exported,
                source,
            } => Candidate {
                exposed: exported,
                symbol: program
                    .resolve_specifier(module, source)
                    .and_then(|target| program.lookup_export(target, imported, Space::Value)),
            },
            Export::ReExportAll { .. } => return None,
        };
        Some(candidate)
    }

    /// Classify the props of a function candidate. Props resolve in the
    /// declaring module; the component keeps the exporting file's path.
    fn build(
        &self,
        mut component: ComponentDefinition,
        (declared_in, function): (ModuleId, &FunctionDecl),
        location: &Path,
    ) -> Result<(ComponentDefinition, Vec<Diagnostic>), &'static str> {
        let [param] = function.params.as_slice() else {
            return Err("expected exactly one parameter");
        };
        if param.rest {
            return Err("rest parameter");
        }
        let ty = param.ty.as_ref().ok_or("parameter has no type annotation")?;
        let props = self
            .checker
            .properties_of(declared_in, ty)
            .ok_or("parameter type is not object-like")?;

        let mut warnings = Vec::new();
        for prop in props {
            match classify(&prop.shape) {
                Some(definition) => {
                    component.props.insert(prop.name, definition);
                }
                None => warnings.push(
                    Diagnostic::warning("Unsupported prop type")
                        .with_context("component", &component.name)
                        .with_context("prop", &prop.name)
                        .with_location(location),
                ),
            }
        }

        if component.props.is_empty() {
            return Err("no supported props");
        }
        Ok((component, warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ElementDefinition, OptionKind, PrimitiveKind, PropertyDefinition};
    use crate::util::diagnostic::Severity;
    use std::path::PathBuf;

    fn resolve(sources: &[(&str, &str)], file: &str) -> ResolvedFile {
        let program =
            Program::from_sources(sources.iter().map(|(p, s)| (PathBuf::from(p), *s))).unwrap();
        let module = program.module_id(Path::new(file)).unwrap();
        ExportResolver::new(&program, Path::new("/p")).resolve(module)
    }

    fn names(resolved: &ResolvedFile) -> Vec<(&str, bool)> {
        resolved
            .components
            .iter()
            .map(|c| (c.name.as_str(), c.is_default_export))
            .collect()
    }

    #[test]
    fn test_default_and_named_in_one_file() {
        let resolved = resolve(
            &[(
                "/p/src/Button.tsx",
                r#"
                export enum ButtonStatus { Active = 'active', Disabled = 'disabled' }
                type Variant = 'primary' | 'secondary';
                export interface ButtonProps {
                  label: string;
                  disabled?: boolean;
                  variant: Variant;
                  tags: string[];
                  status: ButtonStatus;
                  onClick?: () => void;
                }
                export function Button({ label }: ButtonProps) {
                  return <button>{label}</button>;
                }
                export default function ({ label }: ButtonProps) {
                  return <span>{label}</span>;
                }
                "#,
            )],
            "/p/src/Button.tsx",
        );

        assert_eq!(names(&resolved), vec![("Button", false), ("Button", true)]);
        let button = &resolved.components[0];
        assert_eq!(button.path, "src/Button.tsx");
        assert_eq!(button.props["label"], PropertyDefinition::string());
        assert_eq!(button.props["disabled"], PropertyDefinition::boolean());
        assert_eq!(
            button.props["tags"],
            PropertyDefinition::Array(ElementDefinition::Primitive(PrimitiveKind::String))
        );
        let PropertyDefinition::Option(status) = &button.props["status"] else {
            panic!("expected an option set");
        };
        assert_eq!(status.kind(), OptionKind::Enum);
        assert_eq!(status.options(), ["active", "disabled"]);
        assert!(!button.props.contains_key("onClick"));

        let warnings: Vec<_> = resolved
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .collect();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].context_value("component"), Some("Button"));
        assert_eq!(warnings[0].context_value("prop"), Some("onClick"));
    }

    #[test]
    fn test_variable_bound_and_export_lists() {
        let resolved = resolve(
            &[(
                "/p/src/cards.tsx",
                r#"
                type P = { title: string };
                const Card = (props: P) => <div />;
                const Tile = function (props: P) { return null; };
                const Panel = ((props: P) => null) as unknown as Widget;
                export { Card, Tile as Square, Panel };
                export default Card;
                "#,
            )],
            "/p/src/cards.tsx",
        );
        assert_eq!(
            names(&resolved),
            vec![("Card", false), ("Square", false), ("Panel", false), ("cards", true)]
        );
    }

    #[test]
    fn test_reexports_keep_exporting_path() {
        let resolved = resolve(
            &[
                (
                    "/p/src/Card.tsx",
                    "import type { CardProps } from './types';\nexport default function Card(p: CardProps) {}",
                ),
                ("/p/src/types.ts", "export interface CardProps { size: number }"),
                ("/p/src/index.ts", "export { default as Card, default } from './Card';"),
            ],
            "/p/src/index.ts",
        );
        assert_eq!(names(&resolved), vec![("Card", false), ("index", true)]);
        assert!(resolved.components.iter().all(|c| c.path == "src/index.ts"));
        assert_eq!(resolved.components[0].props["size"], PropertyDefinition::number());
    }

    #[test]
    fn test_non_components_are_skipped_quietly() {
        let resolved = resolve(
            &[(
                "/p/src/misc.tsx",
                r#"
                type P = { onClick: () => void };
                export const VERSION = '1.0';
                export function twoArgs(a: { x: string }, b: number) {}
                export function untyped(props) {}
                export function noSupported(props: P) {}
                export default memo(Thing);
                "#,
            )],
            "/p/src/misc.tsx",
        );
        assert!(resolved.components.is_empty());
        assert!(resolved.diagnostics.iter().all(|d| d.severity == Severity::Debug));
        assert_eq!(resolved.diagnostics.len(), 5);
    }

    #[test]
    fn test_circular_reexport_yields_nothing() {
        let resolved = resolve(
            &[
                ("/p/a.ts", "export { X } from './b';"),
                ("/p/b.ts", "export { X } from './a';"),
            ],
            "/p/a.ts",
        );
        assert!(resolved.components.is_empty());
    }
}
