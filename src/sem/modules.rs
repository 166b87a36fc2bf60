//! Module registry: dotted path → module facts.
//!
//! The registry stands in for the host framework's project index at
//! the resolution boundary. An editor session inserts facts as module
//! files are analyzed and replaces them when files change; resolver
//! instances only read.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use smol_str::SmolStr;

use super::facts::ModuleFacts;

/// Maps dotted module paths (e.g. `pkg.pyxl.html`) to their facts.
///
/// Thread-safe via internal locking; lookups clone an `Arc`, so read
/// results stay valid after the registry changes.
#[derive(Debug, Default)]
pub struct ModuleIndex {
    inner: RwLock<ModuleIndexInner>,
}

#[derive(Debug, Default)]
struct ModuleIndexInner {
    /// Insertion-ordered so iteration and debugging are deterministic.
    modules: IndexMap<SmolStr, Arc<ModuleFacts>>,
}

impl ModuleIndex {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the facts for a module path.
    pub fn insert(&self, path: impl Into<SmolStr>, facts: ModuleFacts) {
        let mut inner = self.inner.write();
        inner.modules.insert(path.into(), Arc::new(facts));
    }

    /// Look up the facts for a module path.
    pub fn get(&self, path: &str) -> Option<Arc<ModuleFacts>> {
        self.inner.read().modules.get(path).cloned()
    }

    /// Check whether a module path is known.
    pub fn contains(&self, path: &str) -> bool {
        self.inner.read().modules.contains_key(path)
    }

    /// Remove a module's facts, returning them if present.
    pub fn remove(&self, path: &str) -> Option<Arc<ModuleFacts>> {
        self.inner.write().modules.swap_remove(path)
    }

    /// All registered module paths, in insertion order.
    pub fn paths(&self) -> Vec<SmolStr> {
        self.inner.read().modules.keys().cloned().collect()
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.inner.read().modules.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
