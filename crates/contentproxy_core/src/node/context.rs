//! Contexts: the workspace and visibility rules under which nodes are read.

use super::{Node, NodeData};
use crate::types::NodeIdentifier;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Default workspace name.
pub const LIVE_WORKSPACE: &str = "live";

/// Configuration of a context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextConfig {
    /// Workspace to read from.
    pub workspace_name: String,
    /// Allowed dimension values; empty means no dimension filtering.
    pub dimensions: BTreeMap<String, Vec<String>>,
    /// Whether hidden nodes are visible.
    pub invisible_content_shown: bool,
    /// Whether removed nodes are visible.
    pub removed_content_shown: bool,
}

impl ContextConfig {
    /// Creates a configuration for `workspace_name` showing only visible,
    /// non-removed content.
    pub fn new(workspace_name: impl Into<String>) -> Self {
        Self {
            workspace_name: workspace_name.into(),
            dimensions: BTreeMap::new(),
            invisible_content_shown: false,
            removed_content_shown: false,
        }
    }

    /// Sets whether hidden nodes are visible.
    #[must_use]
    pub fn with_invisible_content_shown(mut self, shown: bool) -> Self {
        self.invisible_content_shown = shown;
        self
    }

    /// Sets whether removed nodes are visible.
    #[must_use]
    pub fn with_removed_content_shown(mut self, shown: bool) -> Self {
        self.removed_content_shown = shown;
        self
    }

    /// Restricts one dimension to the given values.
    #[must_use]
    pub fn with_dimension(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.dimensions.insert(name.into(), values);
        self
    }

    /// Stable string identifying this configuration.
    pub fn identity(&self) -> String {
        let dimensions: Vec<String> = self
            .dimensions
            .iter()
            .map(|(name, values)| format!("{}={}", name, values.join(",")))
            .collect();
        format!(
            "{}|{}|invisible={}|removed={}",
            self.workspace_name,
            dimensions.join(";"),
            self.invisible_content_shown,
            self.removed_content_shown
        )
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self::new(LIVE_WORKSPACE)
    }
}

/// Context-scoped cache of materialised nodes.
///
/// Must be flushed after any mutation made through the context, otherwise
/// later reads get the cached pre-mutation instances.
#[derive(Default)]
pub struct FirstLevelNodeCache {
    by_identifier: RwLock<HashMap<NodeIdentifier, Arc<Node>>>,
}

impl FirstLevelNodeCache {
    /// Gets a cached node by identifier.
    pub fn get_by_identifier(&self, identifier: &NodeIdentifier) -> Option<Arc<Node>> {
        self.by_identifier.read().get(identifier).cloned()
    }

    /// Caches a node by identifier.
    pub fn set(&self, node: Arc<Node>) {
        self.by_identifier
            .write()
            .insert(node.identifier().clone(), node);
    }

    /// Number of cached nodes.
    pub fn len(&self) -> usize {
        self.by_identifier.read().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all cached nodes.
    pub fn flush(&self) {
        self.by_identifier.write().clear();
    }
}

impl std::fmt::Debug for FirstLevelNodeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirstLevelNodeCache")
            .field("len", &self.len())
            .finish()
    }
}

/// A workspace selection plus visibility rules.
#[derive(Debug)]
pub struct Context {
    config: ContextConfig,
    first_level_cache: FirstLevelNodeCache,
}

impl Context {
    /// Creates a context. Prefer [`ContextFactory::create`], which reuses
    /// instances per configuration.
    pub fn new(config: ContextConfig) -> Self {
        Self {
            config,
            first_level_cache: FirstLevelNodeCache::default(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Returns the workspace name.
    pub fn workspace_name(&self) -> &str {
        &self.config.workspace_name
    }

    /// Returns the first-level node cache.
    pub fn first_level_cache(&self) -> &FirstLevelNodeCache {
        &self.first_level_cache
    }

    /// Returns true if `data` is visible under this context.
    pub fn is_visible(&self, data: &NodeData) -> bool {
        if data.workspace != self.config.workspace_name {
            return false;
        }
        if data.removed && !self.config.removed_content_shown {
            return false;
        }
        if data.hidden && !self.config.invisible_content_shown {
            return false;
        }
        self.config.dimensions.iter().all(|(name, allowed)| {
            match data.dimensions.get(name) {
                Some(values) => values.iter().any(|v| allowed.contains(v)),
                None => true,
            }
        })
    }
}

/// Creates contexts, returning the same instance for the same configuration.
#[derive(Debug, Default)]
pub struct ContextFactory {
    instances: Mutex<HashMap<String, Arc<Context>>>,
}

impl ContextFactory {
    /// Creates an empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the context for `config`, creating it on first use.
    pub fn create(&self, config: ContextConfig) -> Arc<Context> {
        let mut instances = self.instances.lock();
        Arc::clone(
            instances
                .entry(config.identity())
                .or_insert_with(|| Arc::new(Context::new(config))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> NodeData {
        NodeData::new("n-1", "/sites/shop/chair", "live", "Acme.Shop:ProductPage")
    }

    #[test]
    fn visibility_rules() {
        let context = Context::new(ContextConfig::new("live"));
        assert!(context.is_visible(&record()));
        assert!(!context.is_visible(&record().hidden()));
        assert!(!context.is_visible(&record().removed()));

        let mut other = record();
        other.workspace = "user-admin".into();
        assert!(!context.is_visible(&other));

        let backend = Context::new(
            ContextConfig::new("live")
                .with_invisible_content_shown(true)
                .with_removed_content_shown(true),
        );
        assert!(backend.is_visible(&record().hidden()));
        assert!(backend.is_visible(&record().removed()));
    }

    #[test]
    fn dimension_rules() {
        let context = Context::new(
            ContextConfig::new("live").with_dimension("language", vec!["en".into(), "de".into()]),
        );

        assert!(context.is_visible(&record()));
        assert!(context.is_visible(&record().with_dimension("language", vec!["de".into()])));
        assert!(!context.is_visible(&record().with_dimension("language", vec!["fr".into()])));
    }

    #[test]
    fn factory_reuses_instances_per_configuration() {
        let factory = ContextFactory::new();
        let a = factory.create(ContextConfig::new("live"));
        let b = factory.create(ContextConfig::new("live"));
        let c = factory.create(ContextConfig::new("live").with_invisible_content_shown(true));

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
