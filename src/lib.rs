//! rplite - a component playground for TypeScript UI components
//!
//! This crate provides the core library functionality for rplite:
//! scanning a source tree for components, the versioned manifest that
//! describes them, and the protocol that drives an isolated render surface.

pub mod core;
pub mod protocol;
pub mod scanner;
pub mod source;
pub mod util;

/// Test utilities for rplite unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides a recording logger, a recording component host and component
/// source fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{
    validate_manifest, ComponentDefinition, Manifest, ManifestValidationError, PropertyDefinition,
    MANIFEST_VERSION,
};
pub use protocol::{ComponentHost, RenderController, RenderSurface, StaticHost};
pub use scanner::{ScanError, ScanMode, Scanner, ScannerOptions};
pub use util::config::Config;
