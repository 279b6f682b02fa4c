//! Pass reports and cumulative statistics.

use contentproxy_core::{EntityIdentifier, EntityType};
use std::time::{Duration, Instant};

/// Outcome for one entity within a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySummary {
    /// Entity identifier.
    pub identifier: EntityIdentifier,
    /// Bound nodes visited.
    pub nodes_processed: usize,
    /// Bound nodes written.
    pub nodes_updated: usize,
}

/// Result of synchronizing all entities of one type.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Type that was synchronized.
    pub entity_type: EntityType,
    /// Per-entity outcomes in stream order.
    pub entities: Vec<EntitySummary>,
    /// Duration of the pass.
    pub duration: Duration,
}

impl SyncReport {
    pub(crate) fn new(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            entities: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Number of entities visited.
    pub fn entities_processed(&self) -> usize {
        self.entities.len()
    }

    /// Total bound nodes visited.
    pub fn nodes_processed(&self) -> usize {
        self.entities.iter().map(|e| e.nodes_processed).sum()
    }

    /// Total bound nodes written.
    pub fn nodes_updated(&self) -> usize {
        self.entities.iter().map(|e| e.nodes_updated).sum()
    }
}

/// Cumulative statistics of one engine.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Completed `synchronize_all` passes.
    pub passes_completed: u64,
    /// Entities visited across all passes.
    pub entities_processed: u64,
    /// Nodes visited across all passes.
    pub nodes_processed: u64,
    /// Nodes written across all passes.
    pub nodes_updated: u64,
    /// Node edits written back to entities.
    pub reverse_edits: u64,
    /// Passes triggered by entity persistence events.
    pub resyncs_triggered: u64,
    /// Persistence events ignored while suppressed.
    pub events_suppressed: u64,
    /// Time the last pass completed.
    pub last_sync_time: Option<Instant>,
    /// Last error message.
    pub last_error: Option<String>,
}

impl SyncStats {
    pub(crate) fn record_pass(&mut self, report: &SyncReport) {
        self.passes_completed += 1;
        self.entities_processed += report.entities_processed() as u64;
        self.nodes_processed += report.nodes_processed() as u64;
        self.nodes_updated += report.nodes_updated() as u64;
        self.last_sync_time = Some(Instant::now());
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, processed: usize, updated: usize) -> EntitySummary {
        EntitySummary {
            identifier: id.into(),
            nodes_processed: processed,
            nodes_updated: updated,
        }
    }

    #[test]
    fn report_totals() {
        let mut report = SyncReport::new("Acme.Shop:Product".into());
        report.entities.push(summary("p-1", 2, 2));
        report.entities.push(summary("p-2", 0, 0));
        report.entities.push(summary("p-3", 3, 1));

        assert_eq!(report.entities_processed(), 3);
        assert_eq!(report.nodes_processed(), 5);
        assert_eq!(report.nodes_updated(), 3);
    }

    #[test]
    fn stats_accumulate_passes() {
        let mut report = SyncReport::new("Acme.Shop:Product".into());
        report.entities.push(summary("p-1", 2, 1));

        let mut stats = SyncStats {
            last_error: Some("store offline".into()),
            ..SyncStats::default()
        };
        stats.record_pass(&report);
        stats.record_pass(&report);

        assert_eq!(stats.passes_completed, 2);
        assert_eq!(stats.entities_processed, 2);
        assert_eq!(stats.nodes_processed, 4);
        assert_eq!(stats.nodes_updated, 2);
        assert!(stats.last_sync_time.is_some());
        assert!(stats.last_error.is_none());
    }
}
