//! In-memory stand-in for a real datastore.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use serde_json::Number;
use uuid::Uuid;

use crate::app::types::{ItemPatch, SampleResource};

/// Sample resources keyed by public id. Iteration order is by public id.
#[derive(Debug, Default)]
pub struct MockBackend {
    resources: RwLock<BTreeMap<String, SampleResource>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend holding two sample records.
    pub fn seeded() -> Self {
        let backend = Self::new();
        backend.create("Jean", Some(Number::from(14)));
        backend.create("Will", Some(Number::from(33)));
        backend
    }

    pub fn list(&self) -> Vec<SampleResource> {
        let resources = self.resources.read().unwrap_or_else(PoisonError::into_inner);
        resources.values().cloned().collect()
    }

    pub fn get(&self, public_id: &str) -> Option<SampleResource> {
        let resources = self.resources.read().unwrap_or_else(PoisonError::into_inner);
        resources.get(public_id).cloned()
    }

    pub fn create(&self, name: &str, age: Option<Number>) -> SampleResource {
        let resource = SampleResource {
            public_id: Uuid::new_v4().simple().to_string(),
            name: name.to_string(),
            age,
        };
        let mut resources = self.resources.write().unwrap_or_else(PoisonError::into_inner);
        resources.insert(resource.public_id.clone(), resource.clone());
        resource
    }

    pub fn update(&self, public_id: &str, patch: ItemPatch) -> Option<SampleResource> {
        let mut resources = self.resources.write().unwrap_or_else(PoisonError::into_inner);
        let resource = resources.get_mut(public_id)?;
        if let Some(name) = patch.name {
            resource.name = name;
        }
        if patch.age.is_some() {
            resource.age = patch.age;
        }
        Some(resource.clone())
    }

    pub fn remove(&self, public_id: &str) -> Option<SampleResource> {
        let mut resources = self.resources.write().unwrap_or_else(PoisonError::into_inner);
        resources.remove(public_id)
    }

    pub fn len(&self) -> usize {
        self.resources.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
