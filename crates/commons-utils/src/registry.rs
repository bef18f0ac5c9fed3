//! Explicit name-keyed registry.
//!
//! Callers register their types by hand instead of relying on directory
//! scanning. An entry that declares a model name is keyed by it; otherwise
//! the caller-supplied name is used.

use std::collections::BTreeMap;

/// Something that may declare its own registry name.
pub trait Named {
    /// Declared model name, if any.
    fn model_name(&self) -> Option<&str> {
        None
    }
}

/// Name-keyed collection of registered items.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    entries: BTreeMap<String, T>,
}

impl<T> Registry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert under an explicit name, returning any replaced entry.
    pub fn insert(&mut self, name: impl Into<String>, item: T) -> Option<T> {
        let name = name.into();
        tracing::info!("Initialized class {name}");
        self.entries.insert(name, item)
    }

    /// Look up an entry.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    /// Whether an entry exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Named> Registry<T> {
    /// Register under the declared model name, else under `fallback_name`.
    ///
    /// Returns the key used.
    pub fn register(&mut self, fallback_name: &str, item: T) -> String {
        match item.model_name().filter(|n| !n.is_empty()).map(str::to_string) {
            Some(model_name) => {
                tracing::info!("Initialized model {model_name}");
                self.entries.insert(model_name.clone(), item);
                model_name
            }
            None => {
                self.insert(fallback_name, item);
                fallback_name.to_string()
            }
        }
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Model(Option<&'static str>);

    impl Named for Model {
        fn model_name(&self) -> Option<&str> {
            self.0
        }
    }

    #[test]
    fn test_register_prefers_model_name() {
        let mut registry = Registry::new();
        let key = registry.register("user_schema", Model(Some("User")));
        assert_eq!(key, "User");
        assert!(registry.contains("User"));
        assert!(!registry.contains("user_schema"));
    }

    #[test]
    fn test_register_falls_back_to_supplied_name() {
        let mut registry = Registry::new();
        registry.register("helpers", Model(None));
        registry.register("blank", Model(Some("")));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["blank", "helpers"]);
    }

    #[test]
    fn test_insert_replaces() {
        let mut registry = Registry::new();
        assert!(registry.insert("a", 1).is_none());
        assert_eq!(registry.insert("a", 2), Some(1));
        assert_eq!(registry.get("a"), Some(&2));
        assert_eq!(registry.len(), 1);
    }
}
