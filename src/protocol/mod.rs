//! Render protocol between a controller and an isolated render surface.
//!
//! ```text
//! controller                     surface
//!     |  <-------- ready ----------  |
//!     |  ---- render {component} -->  |   load module, mount
//!     |  ---- render {props} ------>  |   re-render in place
//!     |  ---- unmount ------------->  |   before an identity change
//! ```
//!
//! The controller never sends `render` before it has seen `ready`, and sends
//! `unmount` exactly when the identity it renders changes.

pub mod controller;
pub mod message;
pub mod static_host;
pub mod surface;
pub mod transport;

pub use controller::{ControllerState, RenderController};
pub use message::{ControllerMessage, Props, SurfaceMessage};
pub use static_host::StaticHost;
pub use surface::{ComponentHost, ExportName, RenderError, RenderSurface, SurfaceState};
pub use transport::{spawn_surface, ControllerLink};
