//! Surface side of the render protocol.
//!
//! A [`RenderSurface`] owns a [`ComponentHost`] and turns inbound messages
//! into host calls. Failures never escape: host errors and panics are shown
//! inline through [`ComponentHost::show_error`] and the surface keeps
//! listening.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::Value;
use thiserror::Error;

use super::message::{ControllerMessage, Props, SurfaceMessage};
use crate::core::{ComponentDefinition, ComponentIdentity};

/// A failure while loading or rendering a component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("failed to load module `{path}`: {message}")]
    ModuleLoad { path: String, message: String },

    #[error("component not found at {path}: no export `{export}`")]
    MissingExport { path: String, export: String },

    #[error("failed to render {component}: {message}")]
    Mount { component: String, message: String },

    #[error("render panicked: {0}")]
    Panicked(String),
}

/// Which export of a module holds the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportName<'a> {
    Default,
    Named(&'a str),
}

impl<'a> ExportName<'a> {
    pub fn of(component: &'a ComponentDefinition) -> Self {
        if component.is_default_export {
            ExportName::Default
        } else {
            ExportName::Named(&component.name)
        }
    }

    pub fn as_str(&self) -> &'a str {
        match self {
            ExportName::Default => "default",
            ExportName::Named(name) => name,
        }
    }
}

/// The component framework the surface drives.
pub trait ComponentHost {
    type Module;
    type Component;

    /// Load the module at a project-relative path.
    fn load(&mut self, path: &str) -> Result<Self::Module, RenderError>;

    fn export(&self, module: &Self::Module, name: ExportName<'_>) -> Option<Self::Component>;

    /// Mount a fresh instance.
    fn mount(&mut self, component: &Self::Component, props: &Props) -> Result<(), RenderError>;

    /// Re-render the mounted instance in place.
    fn rerender(&mut self, props: &Props) -> Result<(), RenderError>;

    /// Discard the mounted instance. Also called after a panic interrupted
    /// [`mount`](ComponentHost::mount), so a partial instance may be all
    /// there is to discard.
    fn unmount(&mut self);

    /// Replace the surface content with an error.
    fn show_error(&mut self, error: &RenderError);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Ready,
    Rendering,
    Unmounted,
}

pub struct RenderSurface<H> {
    host: H,
    state: SurfaceState,
    mounted: Option<ComponentIdentity>,
}

impl<H: ComponentHost> RenderSurface<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            state: SurfaceState::Ready,
            mounted: None,
        }
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn mounted(&self) -> Option<&ComponentIdentity> {
        self.mounted.as_ref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// The announcement sent once the surface is listening.
    pub fn ready_message(&self) -> Value {
        SurfaceMessage::Ready.encode()
    }

    /// Dispatch an inbound payload. Unknown payloads are ignored.
    pub fn handle(&mut self, payload: &Value) {
        if self.state == SurfaceState::Unmounted {
            return;
        }
        match ControllerMessage::decode(payload) {
            Some(ControllerMessage::Render { component, props }) => self.render(&component, &props),
            Some(ControllerMessage::Unmount) => self.unmount(),
            None => {}
        }
    }

    fn render(&mut self, component: &ComponentDefinition, props: &Props) {
        self.state = SurfaceState::Rendering;
        let identity = component.identity();

        let outcome = catch_unwind(AssertUnwindSafe(|| self.render_inner(component, &identity, props)));
        let error = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(error)) => Some(error),
            Err(panic) => {
                self.mounted = None;
                self.host.unmount();
                Some(RenderError::Panicked(panic_message(panic.as_ref())))
            }
        };

        match error {
            None => self.mounted = Some(identity),
            Some(error) => {
                tracing::debug!("render failed: {}", error);
                self.mounted = None;
                self.host.show_error(&error);
            }
        }
        self.state = SurfaceState::Ready;
    }

    fn render_inner(
        &mut self,
        component: &ComponentDefinition,
        identity: &ComponentIdentity,
        props: &Props,
    ) -> Result<(), RenderError> {
        if self.mounted.as_ref() == Some(identity) {
            return self.host.rerender(props);
        }
        self.unmount();

        let module = self.host.load(&component.path)?;
        let export = ExportName::of(component);
        let instance = self
            .host
            .export(&module, export)
            .ok_or_else(|| RenderError::MissingExport {
                path: component.path.clone(),
                export: export.as_str().to_string(),
            })?;
        self.host.mount(&instance, props)
    }

    fn unmount(&mut self) {
        if self.mounted.take().is_some() {
            self.host.unmount();
        }
    }

    /// Tear the surface down. Later messages are ignored.
    pub fn teardown(&mut self) {
        self.unmount();
        self.state = SurfaceState::Unmounted;
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
