//! Process-wide index of every enum field defined on every model.
//!
//! The registry is keyed by model key (see [`crate::keys::model_key`]) and then by accessor. It is
//! independent of each model's own field table, so tooling can introspect all models at once.
//! Accessors keep their registration order; redefining one updates it in place.
//! [`reset_registry`] swaps in a fresh instance; handles obtained earlier keep pointing at the
//! old, now detached, data.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use log::info;
use serde_json::{Map, Value};

use crate::definition::EnumDefinition;
use crate::host::HostModel;

/// Plain nested mapping: model key -> accessor -> normalized definition data.
///
/// Model keys are sorted; accessors follow registration order.
pub type RegistrySnapshot = BTreeMap<String, Map<String, Value>>;

/// Definitions registered for one model, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ModelFields {
    entries: Vec<(String, Arc<EnumDefinition>)>,
}

impl ModelFields {
    fn upsert(&mut self, accessor: &str, definition: Arc<EnumDefinition>) {
        match self.entries.iter_mut().find(|(registered, _)| registered == accessor) {
            Some((_, existing)) => *existing = definition,
            None => self.entries.push((accessor.to_string(), definition)),
        }
    }

    pub fn get(&self, accessor: &str) -> Option<&Arc<EnumDefinition>> {
        self.entries
            .iter()
            .find(|(registered, _)| registered == accessor)
            .map(|(_, definition)| definition)
    }

    pub fn contains(&self, accessor: &str) -> bool {
        self.get(accessor).is_some()
    }

    pub fn accessors(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(accessor, _)| accessor.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<EnumDefinition>)> {
        self.entries.iter().map(|(accessor, definition)| (accessor.as_str(), definition))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn to_map(&self) -> Map<String, Value> {
        self.iter()
            .map(|(accessor, definition)| (accessor.to_string(), definition.to_value()))
            .collect()
    }
}

static REGISTRY: OnceLock<RwLock<Arc<Registry>>> = OnceLock::new();

fn current() -> &'static RwLock<Arc<Registry>> {
    REGISTRY.get_or_init(|| RwLock::new(Arc::new(Registry::new())))
}

/// Handle to the current process-wide registry.
pub fn registry() -> Arc<Registry> {
    Arc::clone(&current().read().unwrap_or_else(PoisonError::into_inner))
}

/// Registers `definition` under the model's registry key and `accessor`.
pub fn register<M: HostModel + ?Sized>(model: &M, accessor: &str, definition: Arc<EnumDefinition>) {
    registry().register(&model.registry_key(), accessor, definition);
}

/// Installs a fresh, empty registry and returns it.
pub fn reset_registry() -> Arc<Registry> {
    let fresh = Arc::new(Registry::new());
    let mut slot = current().write().unwrap_or_else(PoisonError::into_inner);
    let previous = std::mem::replace(&mut *slot, Arc::clone(&fresh));
    info!("enum field registry reset ({} models discarded)", previous.len());
    fresh
}

#[derive(Debug, Default)]
pub struct Registry {
    store: RwLock<HashMap<String, ModelFields>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent upsert of one (model key, accessor) pair.
    pub fn register(&self, model_key: &str, accessor: &str, definition: Arc<EnumDefinition>) {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        store
            .entry(model_key.to_string())
            .or_default()
            .upsert(accessor, definition);
    }

    /// Accessor -> definition entries of one model.
    pub fn lookup(&self, model_key: &str) -> Option<ModelFields> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store.get(model_key).cloned()
    }

    pub fn get(&self, model_key: &str, accessor: &str) -> Option<Arc<EnumDefinition>> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store.get(model_key).and_then(|fields| fields.get(accessor)).cloned()
    }

    /// Registered model keys, sorted.
    pub fn model_keys(&self) -> Vec<String> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = store.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.store.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the whole registry into a plain nested mapping.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store
            .iter()
            .map(|(model_key, fields)| (model_key.clone(), fields.to_map()))
            .collect()
    }
}
