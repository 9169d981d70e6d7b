//! Channel transport between a controller and a surface task.
//!
//! Payloads travel as JSON values over unbounded tokio channels, one per
//! direction. Delivery is best-effort: a send to a closed channel is dropped.

use serde_json::Value;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use super::controller::RenderController;
use super::message::{ControllerMessage, Props};
use super::surface::{ComponentHost, RenderSurface};
use crate::core::ComponentDefinition;

/// Run `surface` on its own task. The task announces `ready`, handles
/// messages until the controller side is dropped, tears the surface down
/// and hands the host back.
pub fn spawn_surface<H>(mut surface: RenderSurface<H>) -> (ControllerLink, JoinHandle<H>)
where
    H: ComponentHost + Send + 'static,
{
    let (to_surface, mut inbox) = unbounded_channel::<Value>();
    let (outbox, from_surface) = unbounded_channel::<Value>();

    let handle = tokio::spawn(async move {
        if outbox.send(surface.ready_message()).is_err() {
            tracing::debug!("controller went away before the surface was ready");
        }
        while let Some(payload) = inbox.recv().await {
            surface.handle(&payload);
        }
        surface.teardown();
        surface.into_host()
    });

    let link = ControllerLink {
        controller: RenderController::new(),
        to_surface: Some(to_surface),
        from_surface,
    };
    (link, handle)
}

/// The controller end of a spawned surface.
pub struct ControllerLink {
    controller: RenderController,
    to_surface: Option<UnboundedSender<Value>>,
    from_surface: UnboundedReceiver<Value>,
}

impl ControllerLink {
    pub fn controller(&self) -> &RenderController {
        &self.controller
    }

    pub fn select(&mut self, component: ComponentDefinition) {
        let messages = self.controller.select(component);
        self.send(messages);
    }

    pub fn set_props(&mut self, props: Props) {
        let messages = self.controller.set_props(props);
        self.send(messages);
    }

    /// Wait for one message from the surface and dispatch it. Returns
    /// `false` once the surface has gone away.
    pub async fn recv(&mut self) -> bool {
        match self.from_surface.recv().await {
            Some(payload) => {
                let messages = self.controller.handle(&payload);
                self.send(messages);
                true
            }
            None => false,
        }
    }

    /// Dispatch surface messages until the surface has announced itself.
    pub async fn wait_ready(&mut self) -> bool {
        while !self.controller.is_ready() {
            if !self.recv().await {
                return false;
            }
        }
        true
    }

    /// Close the controller and the channel. The surface drains what was
    /// already sent, then tears down.
    pub fn close(&mut self) {
        let messages = self.controller.close();
        self.send(messages);
        self.to_surface = None;
    }

    fn send(&self, messages: Vec<ControllerMessage>) {
        let Some(sender) = &self.to_surface else {
            return;
        };
        for message in messages {
            if sender.send(message.encode()).is_err() {
                tracing::debug!("surface channel closed; dropping message");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PropertyDefinition;
    use crate::test_support::{HostEvent, RecordingHost};
    use serde_json::json;

    fn component(name: &str) -> ComponentDefinition {
        ComponentDefinition::new(name, format!("src/{name}.tsx"), false)
            .with_prop("label", PropertyDefinition::string())
    }

    #[tokio::test]
    async fn test_session_end_to_end() {
        let host = RecordingHost::new()
            .with_module("src/Button.tsx", &["Button"])
            .with_module("src/Card.tsx", &["Card"]);
        let (mut link, handle) = spawn_surface(RenderSurface::new(host));

        link.select(component("Button"));
        assert!(link.wait_ready().await);

        let mut props = Props::new();
        props.insert("label".into(), json!("Hi"));
        link.set_props(props);
        link.select(component("Card"));
        link.close();

        let host = handle.await.unwrap();
        assert_eq!(
            host.events(),
            vec![
                HostEvent::Load("src/Button.tsx".into()),
                HostEvent::Mount("Button".into(), json!({})),
                HostEvent::Rerender(json!({ "label": "Hi" })),
                HostEvent::Unmount,
                HostEvent::Load("src/Card.tsx".into()),
                HostEvent::Mount("Card".into(), json!({})),
                HostEvent::Unmount,
            ]
        );
    }

    #[tokio::test]
    async fn test_close_before_ready() {
        let (mut link, handle) = spawn_surface(RenderSurface::new(RecordingHost::new()));
        link.select(component("Button"));
        link.close();

        let host = handle.await.unwrap();
        assert!(host.events().is_empty());

        while link.recv().await {}
        assert!(!link.controller().is_ready());
    }
}
