//! `rplite preview` command
//!
//! Scans the project, picks one component, builds its props from the control
//! defaults plus `--prop` overrides, and renders it through the render
//! protocol against the headless host.

use anyhow::{bail, Context, Result};

use crate::cli::PreviewArgs;
use rplite::core::controls::{coerce_value, default_value, describe_array_element, ControlKind};
use rplite::protocol::{spawn_surface, Props};
use rplite::{ComponentDefinition, Manifest, RenderSurface, StaticHost};

pub fn execute(args: PreviewArgs) -> Result<()> {
    let scanner = super::scanner(args.project)?;
    let manifest = scanner.manifest();
    let component = pick(&manifest, &args.component, args.named, args.default)?;

    if args.controls {
        print_controls(&component);
        return Ok(());
    }

    let props = build_props(&component, &args.props)?;
    let root = scanner.project_root().to_path_buf();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("failed to start the render runtime")?;

    runtime.block_on(async move {
        let host = StaticHost::new(root, std::io::stdout());
        let (mut link, surface) = spawn_surface(RenderSurface::new(host));

        link.select(component);
        link.set_props(props);
        if !link.wait_ready().await {
            bail!("render surface exited before it was ready");
        }
        link.close();

        surface.await.context("render surface task failed")?;
        Ok::<(), anyhow::Error>(())
    })
}

fn pick(
    manifest: &Manifest,
    name: &str,
    named: bool,
    default: bool,
) -> Result<ComponentDefinition> {
    let matches: Vec<&ComponentDefinition> = manifest
        .find_by_name(name)
        .filter(|c| !(named && c.is_default_export) && !(default && !c.is_default_export))
        .collect();

    match matches.as_slice() {
        [] => {
            let known: Vec<&str> = manifest.components.iter().map(|c| c.name.as_str()).collect();
            if known.is_empty() {
                bail!("no component named `{}` (no components found)", name);
            }
            bail!("no component named `{}` (found: {})", name, known.join(", "));
        }
        [component] => Ok((*component).clone()),
        several => {
            let identities: Vec<String> = several.iter().map(|c| c.identity().to_string()).collect();
            bail!(
                "`{}` is ambiguous: {}\nhelp: pass --named or --default",
                name,
                identities.join(", ")
            );
        }
    }
}

fn build_props(component: &ComponentDefinition, overrides: &[String]) -> Result<Props> {
    let mut props: Props = component
        .props
        .iter()
        .map(|(name, definition)| (name.clone(), default_value(definition)))
        .collect();

    for raw in overrides {
        let Some((key, value)) = raw.split_once('=') else {
            bail!("invalid --prop `{}`: expected KEY=VALUE", raw);
        };
        let key = key.trim();
        let Some(definition) = component.props.get(key) else {
            let known: Vec<&str> = component.props.keys().map(String::as_str).collect();
            bail!(
                "`{}` has no prop `{}` (props: {})",
                component.name,
                key,
                known.join(", ")
            );
        };
        let value = coerce_value(definition, value)
            .with_context(|| format!("invalid value for prop `{}`", key))?;
        props.insert(key.to_string(), value);
    }

    Ok(props)
}

fn print_controls(component: &ComponentDefinition) {
    println!("{}", component.identity());
    for (name, definition) in &component.props {
        let control = match ControlKind::for_definition(definition) {
            ControlKind::Checkbox => "checkbox".to_string(),
            ControlKind::Text => "text".to_string(),
            ControlKind::Number => "number".to_string(),
            ControlKind::Select { options } => format!("select [{}]", options.join(", ")),
            ControlKind::List { element } => format!("list ({})", describe_array_element(&element)),
        };
        println!("  {}: {}", name, control);
    }
}
