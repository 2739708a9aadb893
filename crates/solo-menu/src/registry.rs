//! Component Registry

use std::collections::BTreeMap;

use crate::component::{ComponentId, ComponentMetadata};

/// Active components. Registration and removal are idempotent.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    components: BTreeMap<ComponentId, ComponentMetadata>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component; returns false if it was already registered
    pub fn register(&mut self, id: ComponentId, metadata: ComponentMetadata) -> bool {
        if self.components.contains_key(&id) {
            tracing::debug!("Component {} already registered", id);
            self.components.insert(id, metadata);
            return false;
        }
        tracing::info!("Registered component {}", id);
        self.components.insert(id, metadata);
        true
    }

    /// Remove a component; returns false if it was not registered
    pub fn unregister(&mut self, id: &ComponentId) -> bool {
        let removed = self.components.remove(id).is_some();
        if removed {
            tracing::info!("Unregistered component {}", id);
        }
        removed
    }

    pub fn is_registered(&self, id: &ComponentId) -> bool {
        self.components.contains_key(id)
    }

    pub fn metadata(&self, id: &ComponentId) -> Option<&ComponentMetadata> {
        self.components.get(id)
    }

    /// Registered ids in stable order
    pub fn ids(&self) -> Vec<ComponentId> {
        self.components.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
