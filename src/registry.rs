//! Name-keyed handler registry
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Generic over commands and event listeners, duplicate rejection

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use log::{info, warn};

use crate::core::error::{DiscoveryError, DuplicateNameError};

/// Something that can be stored in a [`HandlerRegistry`]
///
/// `key` doubles as validation: a definition that cannot produce its
/// identity is malformed and is skipped during discovery.
pub trait Keyed {
    type Key: Eq + Hash + Clone + Display;

    /// Kind label used in logs ("command", "event")
    const KIND: &'static str;

    fn key(&self) -> Result<Self::Key, DiscoveryError>;
}

/// A pluggable provider of handler definitions
pub trait HandlerSource<T>: Send + Sync {
    fn load(&self) -> Vec<T>;
}

impl<T: Clone + Send + Sync> HandlerSource<T> for Vec<T> {
    fn load(&self) -> Vec<T> {
        self.clone()
    }
}

/// Outcome of a discovery pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub loaded: usize,
    pub skipped: Vec<DiscoveryError>,
    pub duplicates: Vec<DuplicateNameError>,
}

/// Registry mapping unique keys to handler definitions
///
/// Populated once at startup and read-only afterwards. The first definition
/// for a key wins; later ones are rejected with [`DuplicateNameError`].
pub struct HandlerRegistry<H: Keyed> {
    handlers: HashMap<H::Key, H>,
}

impl<H: Keyed> HandlerRegistry<H> {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Load every definition a source yields
    pub fn discover<S>(source: &S) -> (Self, DiscoveryReport)
    where
        S: HandlerSource<H> + ?Sized,
    {
        Self::from_entries(source.load())
    }

    /// Build a registry from definitions, skipping malformed ones and
    /// rejecting duplicates
    pub fn from_entries<I>(entries: I) -> (Self, DiscoveryReport)
    where
        I: IntoIterator<Item = H>,
    {
        let mut registry = Self::new();
        let mut report = DiscoveryReport::default();

        for entry in entries {
            match registry.insert(entry) {
                Ok(()) => report.loaded += 1,
                Err(InsertError::Malformed(e)) => {
                    warn!("Skipping malformed {}: {e}", H::KIND);
                    report.skipped.push(e);
                }
                Err(InsertError::Duplicate(e)) => {
                    warn!("{e}");
                    report.duplicates.push(e);
                }
            }
        }

        info!("Loaded {} {}s.", report.loaded, H::KIND);
        (registry, report)
    }

    /// Insert a single definition
    pub fn insert(&mut self, handler: H) -> Result<(), InsertError> {
        let key = handler.key().map_err(InsertError::Malformed)?;
        if self.handlers.contains_key(&key) {
            return Err(InsertError::Duplicate(DuplicateNameError {
                kind: H::KIND,
                name: key.to_string(),
            }));
        }
        self.handlers.insert(key, handler);
        Ok(())
    }

    pub fn get(&self, key: &H::Key) -> Option<&H> {
        self.handlers.get(key)
    }

    pub fn contains(&self, key: &H::Key) -> bool {
        self.handlers.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &H::Key> {
        self.handlers.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &H> {
        self.handlers.values()
    }
}

impl<H: Keyed> Default for HandlerRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a definition was not inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertError {
    Malformed(DiscoveryError),
    Duplicate(DuplicateNameError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    struct MockHandler {
        name: &'static str,
        tag: u32,
    }

    impl Keyed for MockHandler {
        type Key = String;
        const KIND: &'static str = "mock";

        fn key(&self) -> Result<String, DiscoveryError> {
            if self.name.is_empty() {
                return Err(DiscoveryError::InvalidName {
                    name: String::new(),
                    reason: "missing",
                });
            }
            Ok(self.name.to_string())
        }
    }

    fn mock(name: &'static str, tag: u32) -> MockHandler {
        MockHandler { name, tag }
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry: HandlerRegistry<MockHandler> = HandlerRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_discover_from_vec_source() {
        let source = vec![mock("ping", 1), mock("help", 2)];
        let (registry, report) = HandlerRegistry::discover(&source);

        assert_eq!(report.loaded, 2);
        assert!(report.skipped.is_empty());
        assert!(registry.contains(&"ping".to_string()));
        assert!(registry.contains(&"help".to_string()));
        assert!(!registry.contains(&"pong".to_string()));
    }

    #[test]
    fn test_duplicate_rejected_first_wins() {
        let (registry, report) =
            HandlerRegistry::from_entries(vec![mock("ping", 1), mock("ping", 2)]);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&"ping".to_string()).unwrap().tag, 1);
        assert_eq!(report.loaded, 1);
        assert_eq!(
            report.duplicates,
            vec![DuplicateNameError {
                kind: "mock",
                name: "ping".to_string()
            }]
        );
    }

    #[test]
    fn test_malformed_skipped_rest_loaded() {
        let (registry, report) =
            HandlerRegistry::from_entries(vec![mock("", 1), mock("ok", 2)]);

        assert_eq!(registry.len(), 1);
        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn test_insert_reports_duplicate() {
        let mut registry = HandlerRegistry::new();
        assert!(registry.insert(mock("a", 1)).is_ok());
        assert!(matches!(
            registry.insert(mock("a", 2)),
            Err(InsertError::Duplicate(_))
        ));
    }
}
