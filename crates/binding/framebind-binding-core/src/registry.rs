//! Token to live-binding store.
//!
//! The store is shared (`Arc<BindingRegistry>`) and may be handed to several
//! cores or inspected by the host. Each handler sits behind its own mutex so a
//! slow tick on one binding never blocks lookups of another.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use framebind_api_core::EventKind;
use hashbrown::HashMap;

use crate::handlers::EventHandler;
use crate::Token;

pub type SharedHandler = Arc<Mutex<EventHandler>>;

#[derive(Clone, Debug)]
pub struct RegistryEntry {
    pub kind: EventKind,
    pub anchor: Option<String>,
    pub handler: SharedHandler,
}

#[derive(Debug, Default)]
pub struct BindingRegistry {
    entries: RwLock<HashMap<Token, RegistryEntry>>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry previously stored under `token`, if any.
    pub fn insert(&self, token: Token, entry: RegistryEntry) -> Option<RegistryEntry> {
        self.write().insert(token, entry)
    }

    pub fn remove(&self, token: &Token) -> Option<RegistryEntry> {
        self.write().remove(token)
    }

    pub fn get(&self, token: &Token) -> Option<RegistryEntry> {
        self.read().get(token).cloned()
    }

    pub fn contains(&self, token: &Token) -> bool {
        self.read().contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn tokens(&self) -> Vec<Token> {
        self.read().keys().copied().collect()
    }

    /// Copy of every entry, so callers can dispatch without holding the store lock.
    pub fn snapshot(&self) -> Vec<(Token, RegistryEntry)> {
        self.read()
            .iter()
            .map(|(token, entry)| (*token, entry.clone()))
            .collect()
    }

    pub fn drain(&self) -> Vec<(Token, RegistryEntry)> {
        self.write().drain().collect()
    }

    /// Legacy lookup by source reference and kind.
    pub fn find_by_source(&self, anchor: &str, kind: EventKind) -> Option<Token> {
        self.read()
            .iter()
            .find(|(_, e)| e.kind == kind && e.anchor.as_deref() == Some(anchor))
            .map(|(token, _)| *token)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Token, RegistryEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Token, RegistryEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{EventHandler, HandlerContext};
    use crate::CoreConfig;
    use framebind_animation_core::FrameCaps;
    use framebind_api_core::{JsonAstEvaluator, Platform};
    use framebind_test_fixtures::doubles::{RecordingViewUpdater, StaticViewFinder};

    fn entry(kind: EventKind, anchor: Option<&str>) -> (Token, RegistryEntry) {
        let ctx = HandlerContext {
            platform: Platform::new(
                Arc::new(StaticViewFinder::new()),
                Arc::new(RecordingViewUpdater::new()),
            ),
            evaluator: Arc::new(JsonAstEvaluator::new()),
            config: CoreConfig::default(),
            caps: FrameCaps::default(),
            render: None,
        };
        let token = Token::new_v4();
        let handler = EventHandler::for_kind(kind, token, &ctx);
        (
            token,
            RegistryEntry {
                kind,
                anchor: anchor.map(str::to_string),
                handler: Arc::new(Mutex::new(handler)),
            },
        )
    }

    #[test]
    fn insert_lookup_remove() {
        let registry = BindingRegistry::new();
        let (pan, pan_entry) = entry(EventKind::Pan, Some("box"));
        let (timing, timing_entry) = entry(EventKind::Timing, None);
        assert!(registry.insert(pan, pan_entry).is_none());
        registry.insert(timing, timing_entry);
        assert_eq!(registry.len(), 2);

        assert_eq!(registry.find_by_source("box", EventKind::Pan), Some(pan));
        assert_eq!(registry.find_by_source("box", EventKind::Scroll), None);
        assert_eq!(registry.get(&timing).map(|e| e.kind), Some(EventKind::Timing));

        assert!(registry.remove(&pan).is_some());
        assert!(registry.remove(&pan).is_none());
        assert_eq!(registry.drain().len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn concurrent_inserts_are_all_kept() {
        let registry = Arc::new(BindingRegistry::new());
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for _ in 0..8 {
                        let (token, e) = entry(EventKind::Spring, None);
                        registry.insert(token, e);
                        assert!(registry.contains(&token));
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }
        assert_eq!(registry.len(), 32);
        assert_eq!(registry.snapshot().len(), 32);
    }
}
