use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::direction::Coords;
use crate::explorer::MouseState;
use crate::memory::MemoryGrid;

/// String-keyed blob store. Writes are best effort: a store that cannot
/// persist simply forgets, and the mouse explores again next time.
pub trait BlobStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

impl<T: BlobStore + ?Sized> BlobStore for Box<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) {
        (**self).remove(key)
    }
}

/// In-process store, handy for tests and for runs that should not touch disk.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.items.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.items.remove(key);
    }
}

pub fn memory_key(maze_name: &str) -> String {
    format!("mouse-maze-{maze_name}")
}

/// What the mouse remembers about a finished maze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeSnapshot {
    pub board: MemoryGrid,
    pub cheese: Option<Coords>,
    pub total_cells: u32,
    pub explored_cells: u32,
    pub state: MouseState,
}

impl MazeSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_get_set_remove() {
        let mut store = MemoryStore::new();
        assert!(store.get("a").is_none());
        store.set("a", "1");
        store.set("a", "2");
        assert_eq!(store.get("a").as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
        store.remove("a");
        assert!(store.is_empty());
    }

    #[test]
    fn keys_are_namespaced_by_maze() {
        assert_eq!(memory_key("classic-16"), "mouse-maze-classic-16");
    }
}
