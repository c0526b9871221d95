//! Shared fixtures and host doubles for framebind tests.
//!
//! Fixture files live under `fixtures/` at the workspace root and are indexed by
//! `fixtures/manifest.json`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub mod doubles;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    bindings: HashMap<String, String>,
    #[serde(rename = "pointer-streams")]
    pointer_streams: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod bindings {
    use super::*;
    use framebind_api_core::BindingRequest;

    pub fn keys() -> Vec<String> {
        MANIFEST.bindings.keys().cloned().collect()
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.bindings, "binding", name)?;
        super::load_json(rel)
    }

    /// Parse the fixture through the same normalization scripts go through.
    pub fn request(name: &str) -> Result<BindingRequest> {
        let raw: serde_json::Value = load(name)?;
        BindingRequest::from_json(&raw)
            .with_context(|| format!("binding fixture '{name}' is not a valid request"))
    }
}

pub mod pointer_streams {
    use super::*;
    use framebind_gesture_core::PointerEvent;

    pub fn keys() -> Vec<String> {
        MANIFEST.pointer_streams.keys().cloned().collect()
    }

    pub fn load(name: &str) -> Result<Vec<PointerEvent>> {
        let rel = lookup(&MANIFEST.pointer_streams, "pointer stream", name)?;
        super::load_json(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_binding_fixture_parses() {
        let mut keys = bindings::keys();
        keys.sort();
        assert_eq!(keys.len(), 6);
        for key in keys {
            let req = bindings::request(&key).unwrap();
            assert!(!req.props.is_empty(), "{key} has no props");
        }
    }

    #[test]
    fn pointer_streams_load() {
        for key in pointer_streams::keys() {
            assert!(!pointer_streams::load(&key).unwrap().is_empty(), "{key} is empty");
        }
        let drag = pointer_streams::load("pan-drag").unwrap();
        assert_eq!(drag.len(), 5);
        assert!(pointer_streams::load("missing").is_err());
    }
}
