//! Controller side of the render protocol.
//!
//! [`RenderController`] is a pure state machine: every operation returns the
//! messages to send, in order, and never blocks on the surface. The caller
//! owns the transport (see [`super::transport`]).

use serde_json::Value;

use super::message::{ControllerMessage, Props, SurfaceMessage};
use crate::core::{ComponentDefinition, ComponentIdentity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    /// Waiting for the surface's `ready`; the latest intent is buffered.
    Uninitialized,
    /// The surface is listening. `mounted` is the identity it last rendered.
    Ready { mounted: Option<ComponentIdentity> },
    /// Closed; every later operation is a no-op.
    Unmounted,
}

#[derive(Debug)]
pub struct RenderController {
    state: ControllerState,
    component: Option<ComponentDefinition>,
    props: Props,
}

impl Default for RenderController {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderController {
    pub fn new() -> Self {
        Self {
            state: ControllerState::Uninitialized,
            component: None,
            props: Props::new(),
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ControllerState::Ready { .. })
    }

    pub fn selected(&self) -> Option<&ComponentDefinition> {
        self.component.as_ref()
    }

    /// Dispatch an inbound payload from the surface.
    pub fn handle(&mut self, payload: &Value) -> Vec<ControllerMessage> {
        match SurfaceMessage::decode(payload) {
            Some(SurfaceMessage::Ready) => self.on_ready(),
            None => Vec::new(),
        }
    }

    fn on_ready(&mut self) -> Vec<ControllerMessage> {
        match self.state {
            ControllerState::Unmounted => Vec::new(),
            // A repeated `ready` means the surface restarted with nothing mounted.
            ControllerState::Uninitialized | ControllerState::Ready { .. } => {
                self.state = ControllerState::Ready { mounted: None };
                self.flush()
            }
        }
    }

    /// Select the component to render. Selecting a different identity
    /// clears the buffered props.
    pub fn select(&mut self, component: ComponentDefinition) -> Vec<ControllerMessage> {
        if self.state == ControllerState::Unmounted {
            return Vec::new();
        }
        let changed = self
            .component
            .as_ref()
            .map_or(true, |current| current.identity() != component.identity());
        if changed {
            self.props.clear();
        }
        self.component = Some(component);
        self.flush()
    }

    pub fn set_props(&mut self, props: Props) -> Vec<ControllerMessage> {
        if self.state == ControllerState::Unmounted {
            return Vec::new();
        }
        self.props = props;
        self.flush()
    }

    /// Close the controller, unmounting whatever the surface shows.
    pub fn close(&mut self) -> Vec<ControllerMessage> {
        let state = std::mem::replace(&mut self.state, ControllerState::Unmounted);
        match state {
            ControllerState::Ready { mounted: Some(_) } => vec![ControllerMessage::Unmount],
            _ => Vec::new(),
        }
    }

    fn flush(&mut self) -> Vec<ControllerMessage> {
        let ControllerState::Ready { mounted } = &mut self.state else {
            return Vec::new();
        };
        let Some(component) = &self.component else {
            return Vec::new();
        };

        let identity = component.identity();
        let mut out = Vec::with_capacity(2);
        if mounted.as_ref().is_some_and(|current| *current != identity) {
            out.push(ControllerMessage::Unmount);
        }
        out.push(ControllerMessage::Render {
            component: component.clone(),
            props: self.props.clone(),
        });
        *mounted = Some(identity);
        out
    }
}
