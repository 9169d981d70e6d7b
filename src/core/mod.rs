//! Core data structures for rplite.
//!
//! This module contains the types shared by the scanner and the runtime:
//! - The manifest schema (components and property definitions)
//! - Consumer-side manifest validation
//! - Controls derived from property definitions

pub mod controls;
pub mod manifest;
pub mod validate;

pub use controls::{ControlError, ControlKind};
pub use manifest::{
    ComponentDefinition, ComponentIdentity, ElementDefinition, Manifest, OptionKind, OptionSet,
    PrimitiveKind, PropertyDefinition, MANIFEST_VERSION,
};
pub use validate::{validate_manifest, ManifestValidationError};
