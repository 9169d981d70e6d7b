//! Test utilities for rplite unit tests.
//!
//! - [`RecordingLogger`] captures scanner diagnostics.
//! - [`RecordingHost`] is a [`ComponentHost`] that records every call.
//! - [`fixtures`] writes component sources to a temporary project.

pub mod fixtures;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use crate::protocol::{ComponentHost, ExportName, Props, RenderError};
use crate::util::diagnostic::{Diagnostic, ScanLogger};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Logger that keeps every diagnostic it receives.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<Diagnostic>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        lock(&self.entries).clone()
    }
}

impl ScanLogger for RecordingLogger {
    fn log(&self, diagnostic: &Diagnostic) {
        lock(&self.entries).push(diagnostic.clone());
    }
}

/// A call made on a [`RecordingHost`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Load(String),
    /// Mounted export name and props.
    Mount(String, Value),
    Rerender(Value),
    Unmount,
    Error(String),
}

/// In-memory host. Modules are declared up front as lists of export names.
/// Clones share the event log, so a host moved into a surface task can still
/// be inspected.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    modules: HashMap<String, Vec<String>>,
    events: Arc<Mutex<Vec<HostEvent>>>,
    panic_on_mount: bool,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, path: &str, exports: &[&str]) -> Self {
        self.modules
            .insert(path.to_string(), exports.iter().map(|e| e.to_string()).collect());
        self
    }

    pub fn panic_on_mount(mut self) -> Self {
        self.panic_on_mount = true;
        self
    }

    pub fn events(&self) -> Vec<HostEvent> {
        lock(&self.events).clone()
    }

    fn record(&self, event: HostEvent) {
        lock(&self.events).push(event);
    }
}

impl ComponentHost for RecordingHost {
    type Module = Vec<String>;
    type Component = String;

    fn load(&mut self, path: &str) -> Result<Vec<String>, RenderError> {
        self.record(HostEvent::Load(path.to_string()));
        self.modules
            .get(path)
            .cloned()
            .ok_or_else(|| RenderError::ModuleLoad {
                path: path.to_string(),
                message: "no such module".to_string(),
            })
    }

    fn export(&self, module: &Vec<String>, name: ExportName<'_>) -> Option<String> {
        module.iter().find(|e| e.as_str() == name.as_str()).cloned()
    }

    fn mount(&mut self, component: &String, props: &Props) -> Result<(), RenderError> {
        if self.panic_on_mount {
            panic!("mount exploded");
        }
        self.record(HostEvent::Mount(component.clone(), Value::Object(props.clone())));
        Ok(())
    }

    fn rerender(&mut self, props: &Props) -> Result<(), RenderError> {
        self.record(HostEvent::Rerender(Value::Object(props.clone())));
        Ok(())
    }

    fn unmount(&mut self) {
        self.record(HostEvent::Unmount);
    }

    fn show_error(&mut self, error: &RenderError) {
        self.record(HostEvent::Error(error.to_string()));
    }
}
