//! A headless [`ComponentHost`] that renders components as text.
//!
//! Modules are loaded with the source front end, so a missing export is
//! reported the same way a browser host would report it. Mounting writes one
//! JSX-like line per render to the output.

use std::io::Write;
use std::path::PathBuf;

use serde_json::Value;

use super::message::Props;
use super::surface::{ComponentHost, ExportName, RenderError};
use crate::source::{ModuleId, Program, Space, SymbolKind};

pub struct StaticModule {
    program: Program,
    id: ModuleId,
    stem: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticComponent {
    pub name: String,
}

pub struct StaticHost<W> {
    root: PathBuf,
    out: W,
    mounted: Option<String>,
}

impl<W: Write> StaticHost<W> {
    pub fn new(root: impl Into<PathBuf>, out: W) -> Self {
        Self {
            root: root.into(),
            out,
            mounted: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_element(&mut self, name: &str, props: &Props) -> Result<(), RenderError> {
        let line = render_element(name, props);
        writeln!(self.out, "{}", line).map_err(|e| RenderError::Mount {
            component: name.to_string(),
            message: e.to_string(),
        })
    }
}

impl<W: Write> ComponentHost for StaticHost<W> {
    type Module = StaticModule;
    type Component = StaticComponent;

    fn load(&mut self, path: &str) -> Result<StaticModule, RenderError> {
        let file = self.root.join(path);
        let mut outcome = Program::load(&[file.clone()]);
        if let Some((_, error)) = outcome.failures.drain(..).find(|(p, _)| *p == file) {
            return Err(RenderError::ModuleLoad {
                path: path.to_string(),
                message: error.to_string(),
            });
        }
        let id = outcome.program.module_id(&file).ok_or_else(|| RenderError::ModuleLoad {
            path: path.to_string(),
            message: "module not loaded".to_string(),
        })?;
        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(StaticModule {
            program: outcome.program,
            id,
            stem,
        })
    }

    fn export(&self, module: &StaticModule, name: ExportName<'_>) -> Option<StaticComponent> {
        let symbol = module
            .program
            .lookup_export(module.id, name.as_str(), Space::Value)?;
        let SymbolKind::Function(function) = symbol.kind else {
            return None;
        };
        let name = match name {
            ExportName::Named(name) => name.to_string(),
            ExportName::Default => function.name.clone().unwrap_or_else(|| module.stem.clone()),
        };
        Some(StaticComponent { name })
    }

    fn mount(&mut self, component: &StaticComponent, props: &Props) -> Result<(), RenderError> {
        self.write_element(&component.name, props)?;
        self.mounted = Some(component.name.clone());
        Ok(())
    }

    fn rerender(&mut self, props: &Props) -> Result<(), RenderError> {
        let name = self.mounted.clone().ok_or_else(|| RenderError::Mount {
            component: "<none>".to_string(),
            message: "nothing is mounted".to_string(),
        })?;
        self.write_element(&name, props)
    }

    fn unmount(&mut self) {
        if let Some(name) = self.mounted.take() {
            tracing::debug!("unmounted {}", name);
        }
    }

    fn show_error(&mut self, error: &RenderError) {
        self.mounted = None;
        if let Err(e) = writeln!(self.out, "error: {}", error) {
            tracing::debug!("failed to write render error: {}", e);
        }
    }
}

/// `<Button label="Hi" count={3} tags={["a","b"]} />`
fn render_element(name: &str, props: &Props) -> String {
    let mut out = format!("<{}", name);
    for (key, value) in props {
        match value {
            Value::String(_) => out.push_str(&format!(" {}={}", key, value)),
            other => out.push_str(&format!(" {}={{{}}}", key, other)),
        }
    }
    out.push_str(" />");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ComponentDefinition, PropertyDefinition};
    use crate::protocol::RenderSurface;
    use serde_json::json;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("src")).unwrap();
        std::fs::write(
            tmp.path().join("src/Button.tsx"),
            "type P = { label: string };\nexport function Button(p: P) { return <b>{p.label}</b>; }\nexport default Button;",
        )
        .unwrap();
        tmp
    }

    fn render(component: &ComponentDefinition, props: Value) -> Value {
        json!({ "type": "render", "component": component, "props": props })
    }

    #[test]
    fn test_render_element() {
        let mut props = Props::new();
        props.insert("label".into(), json!("Hi \"there\""));
        props.insert("tags".into(), json!(["a", "b"]));
        props.insert("count".into(), json!(3));
        assert_eq!(
            render_element("Button", &props),
            r#"<Button label="Hi \"there\"" tags={["a","b"]} count={3} />"#
        );
        assert_eq!(render_element("Empty", &Props::new()), "<Empty />");
    }

    #[test]
    fn test_surface_over_static_host() {
        let tmp = project();
        let mut surface = RenderSurface::new(StaticHost::new(tmp.path(), Vec::new()));
        let named = ComponentDefinition::new("Button", "src/Button.tsx", false)
            .with_prop("label", PropertyDefinition::string());
        let default = ComponentDefinition::new("Button", "src/Button.tsx", true)
            .with_prop("label", PropertyDefinition::string());
        let missing = ComponentDefinition::new("Card", "src/Button.tsx", false)
            .with_prop("label", PropertyDefinition::string());

        surface.handle(&render(&named, json!({ "label": "a" })));
        surface.handle(&render(&named, json!({ "label": "b" })));
        surface.handle(&render(&default, json!({})));
        surface.handle(&render(&missing, json!({})));

        let output = String::from_utf8(surface.into_host().into_inner()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], r#"<Button label="a" />"#);
        assert_eq!(lines[1], r#"<Button label="b" />"#);
        assert_eq!(lines[2], "<Button />");
        assert!(lines[3].starts_with("error: component not found at src/Button.tsx"));
    }

    #[test]
    fn test_missing_module() {
        let tmp = project();
        let mut host = StaticHost::new(tmp.path(), Vec::new());
        assert!(matches!(
            host.load("src/Nope.tsx"),
            Err(RenderError::ModuleLoad { ref path, .. }) if path == "src/Nope.tsx"
        ));
    }
}
