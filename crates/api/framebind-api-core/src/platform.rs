//! Host capabilities the core calls out to.
//!
//! The view tree, property mutation and unit conversion all belong to the host.
//! The core only holds opaque `ViewHandle`s and talks through these traits.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::{EventKind, Value};

/// Opaque reference to a host view.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewHandle(pub u64);

impl fmt::Display for ViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Extra information handed to `ViewUpdater::update` alongside the value.
#[derive(Copy, Clone, Debug)]
pub struct UpdateContext<'a> {
    pub kind: EventKind,
    pub token: &'a str,
    /// Element reference as written in the binding request.
    pub element: &'a str,
}

pub trait ViewFinder: Send + Sync {
    fn find_view_by(&self, reference: &str, instance_id: Option<&str>) -> Option<ViewHandle>;
}

/// Applies an evaluated value to a view property. Runs synchronously on the rendering thread.
pub trait ViewUpdater: Send + Sync {
    fn update(
        &self,
        view: ViewHandle,
        property: &str,
        value: &Value,
        translator: &dyn ResolutionTranslator,
        config: &Map<String, serde_json::Value>,
        context: &UpdateContext<'_>,
    );
}

/// Converts between device units and the logical units scripts work in.
pub trait ResolutionTranslator: Send + Sync {
    fn native_to_web(&self, value: f64) -> f64;
    fn web_to_native(&self, value: f64) -> f64;
}

#[derive(Copy, Clone, Debug, Default)]
pub struct IdentityTranslator;

impl ResolutionTranslator for IdentityTranslator {
    fn native_to_web(&self, value: f64) -> f64 {
        value
    }

    fn web_to_native(&self, value: f64) -> f64 {
        value
    }
}

/// Bundle of host collaborators shared by every binding of one core.
#[derive(Clone)]
pub struct Platform {
    pub view_finder: Arc<dyn ViewFinder>,
    pub view_updater: Arc<dyn ViewUpdater>,
    pub translator: Arc<dyn ResolutionTranslator>,
}

impl Platform {
    pub fn new(view_finder: Arc<dyn ViewFinder>, view_updater: Arc<dyn ViewUpdater>) -> Self {
        Self {
            view_finder,
            view_updater,
            translator: Arc::new(IdentityTranslator),
        }
    }

    pub fn with_translator(mut self, translator: Arc<dyn ResolutionTranslator>) -> Self {
        self.translator = translator;
        self
    }
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform").finish_non_exhaustive()
    }
}
