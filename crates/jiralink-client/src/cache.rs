//! Per-project cache of server entities.

use parking_lot::Mutex;
use std::collections::HashMap;

/// Entities cached by project key, then by entity id.
#[derive(Debug)]
pub struct ProjectCache<T> {
    entries: Mutex<HashMap<String, Vec<(String, T)>>>,
}

impl<T> Default for ProjectCache<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Clone> ProjectCache<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached entities of a project, in insertion order.
    #[must_use]
    pub fn get(&self, project: &str) -> Option<Vec<T>> {
        self.entries
            .lock()
            .get(project)
            .map(|items| items.iter().map(|(_, item)| item.clone()).collect())
    }

    /// Store a project's entities unless the project is already cached.
    ///
    /// Returns the cached entities, which may differ from `items`.
    pub fn add_if_missing(&self, project: &str, items: Vec<(String, T)>) -> Vec<T> {
        let mut entries = self.entries.lock();
        entries
            .entry(project.to_string())
            .or_insert(items)
            .iter()
            .map(|(_, item)| item.clone())
            .collect()
    }

    /// Add or replace one entity in a project that is already cached.
    ///
    /// Uncached projects are left alone so the next lookup fetches the full list.
    /// Returns whether the entity was stored.
    pub fn insert(&self, project: &str, id: impl Into<String>, item: T) -> bool {
        let id = id.into();
        let mut entries = self.entries.lock();
        let Some(items) = entries.get_mut(project) else {
            return false;
        };
        match items.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => slot.1 = item,
            None => items.push((id, item)),
        }
        true
    }

    /// Remove one entity; returns whether it was cached.
    pub fn remove(&self, project: &str, id: &str) -> bool {
        let mut entries = self.entries.lock();
        let Some(items) = entries.get_mut(project) else {
            return false;
        };
        let before = items.len();
        items.retain(|(existing, _)| existing != id);
        items.len() != before
    }
}
