//! Configuration for the synchronization engine.

use contentproxy_core::{LIVE_WORKSPACE, PROXY_MAPPING_OPTION};

/// Configuration for sync operations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Workspace synchronized when an entity persistence event triggers a
    /// resync.
    pub live_workspace: String,
    /// Node type option holding the per-entity-type rename mapping.
    pub mapping_option_key: String,
    /// Log stream progress every this many entities; 0 disables it.
    pub progress_interval: usize,
}

impl SyncConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self {
            live_workspace: LIVE_WORKSPACE.to_owned(),
            mapping_option_key: PROXY_MAPPING_OPTION.to_owned(),
            progress_interval: 100,
        }
    }

    /// Sets the workspace used by event-triggered resyncs.
    pub fn with_live_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.live_workspace = workspace.into();
        self
    }

    /// Sets the node type option key holding rename mappings.
    pub fn with_mapping_option_key(mut self, key: impl Into<String>) -> Self {
        self.mapping_option_key = key.into();
        self
    }

    /// Sets the progress logging interval.
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.live_workspace, "live");
        assert_eq!(config.mapping_option_key, "contentObjectProxyMapping");
        assert_eq!(config.progress_interval, 100);
    }

    #[test]
    fn sync_config_builder() {
        let config = SyncConfig::new()
            .with_live_workspace("production")
            .with_mapping_option_key("proxyMapping")
            .with_progress_interval(0);

        assert_eq!(config.live_workspace, "production");
        assert_eq!(config.mapping_option_key, "proxyMapping");
        assert_eq!(config.progress_interval, 0);
    }
}
