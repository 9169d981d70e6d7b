//! Wire messages between the controller and the render surface.
//!
//! Messages cross the transport as JSON values. Inbound payloads are
//! untrusted: they are sniffed by their `type` field and anything unknown or
//! malformed is dropped rather than treated as an error.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::validate::validate_component;
use crate::core::ComponentDefinition;

/// Props passed to a rendered component.
pub type Props = Map<String, Value>;

/// Controller to surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControllerMessage {
    Render {
        component: ComponentDefinition,
        props: Props,
    },
    Unmount,
}

/// Surface to controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SurfaceMessage {
    Ready,
}

impl ControllerMessage {
    pub fn encode(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Decode an inbound payload. The component of a `render` message goes
    /// through the same validation as a manifest entry.
    pub fn decode(payload: &Value) -> Option<Self> {
        match message_type(payload)? {
            "render" => {
                let component = match payload.get("component") {
                    Some(component) => match validate_component(0, component) {
                        Ok(component) => component,
                        Err(error) => {
                            tracing::debug!("dropping render message: {}", error);
                            return None;
                        }
                    },
                    None => return dropped(payload),
                };
                let props = match payload.get("props") {
                    None | Some(Value::Null) => Props::new(),
                    Some(Value::Object(props)) => props.clone(),
                    Some(_) => return dropped(payload),
                };
                Some(ControllerMessage::Render { component, props })
            }
            "unmount" => Some(ControllerMessage::Unmount),
            _ => dropped(payload),
        }
    }
}

impl SurfaceMessage {
    pub fn encode(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn decode(payload: &Value) -> Option<Self> {
        match message_type(payload)? {
            "ready" => Some(SurfaceMessage::Ready),
            _ => dropped(payload),
        }
    }
}

fn message_type(payload: &Value) -> Option<&str> {
    let kind = payload.get("type").and_then(Value::as_str);
    if kind.is_none() {
        tracing::debug!("ignoring untyped message: {}", payload);
    }
    kind
}

fn dropped<T>(payload: &Value) -> Option<T> {
    tracing::debug!("ignoring unrecognized message: {}", payload);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PropertyDefinition;
    use serde_json::json;

    fn button() -> ComponentDefinition {
        ComponentDefinition::new("Button", "src/Button.tsx", false)
            .with_prop("label", PropertyDefinition::string())
    }

    #[test]
    fn test_render_wire_shape() {
        let mut props = Props::new();
        props.insert("label".into(), json!("Hi"));
        let message = ControllerMessage::Render {
            component: button(),
            props,
        };
        let value = message.encode();
        assert_eq!(value["type"], "render");
        assert_eq!(value["component"]["isDefaultExport"], false);
        assert_eq!(value["props"]["label"], "Hi");
        assert_eq!(ControllerMessage::decode(&value), Some(message));

        assert_eq!(ControllerMessage::Unmount.encode(), json!({ "type": "unmount" }));
        assert_eq!(SurfaceMessage::Ready.encode(), json!({ "type": "ready" }));
    }

    #[test]
    fn test_unknown_payloads_are_ignored() {
        for payload in [
            json!("ready"),
            json!({}),
            json!({ "type": 3 }),
            json!({ "type": "webpackHotUpdate" }),
            json!({ "type": "render" }),
            json!({ "type": "render", "component": { "name": "" } }),
            json!({ "type": "render", "component": button(), "props": [] }),
        ] {
            assert_eq!(ControllerMessage::decode(&payload), None, "{payload}");
        }
        assert_eq!(SurfaceMessage::decode(&json!({ "type": "render" })), None);
        assert_eq!(
            SurfaceMessage::decode(&json!({ "type": "ready", "extra": 1 })),
            Some(SurfaceMessage::Ready)
        );
    }

    #[test]
    fn test_render_without_props() {
        let payload = json!({ "type": "render", "component": button() });
        let Some(ControllerMessage::Render { props, .. }) = ControllerMessage::decode(&payload) else {
            panic!("expected a render message");
        };
        assert!(props.is_empty());
    }
}
