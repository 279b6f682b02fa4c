//! The synchronization engine: bulk entity-to-node passes.

use crate::applier::PropertyApplier;
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::guard::SynchronizationGuard;
use crate::locator::NodeLocator;
use crate::registry::CapabilityRegistry;
use crate::report::{EntitySummary, SyncReport, SyncStats};
use crate::stream::EntityStream;
use contentproxy_core::{
    ContentRepository, Context, ContextConfig, ContextFactory, EntityStore, EntityType,
    MetadataProvider, Node, NodeFactory, ProxyableEntity,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Callback invoked once per visited node with the node, its entity and
/// whether the node was written.
pub type NodeCallback<'a> = dyn FnMut(&Node, &dyn ProxyableEntity, bool) + 'a;

/// Keeps content nodes consistent with the entities they mirror.
///
/// The engine drives entity-to-node passes over a whole type and hosts the
/// reverse hooks (see [`SyncEngine::propagate_node_edit`] and
/// [`SyncEngine::on_entity_persisted`]). Both directions share one
/// [`SynchronizationGuard`], which keeps them from triggering each other.
pub struct SyncEngine<S: EntityStore + 'static, R: ContentRepository + 'static> {
    pub(crate) config: SyncConfig,
    pub(crate) store: Arc<S>,
    repository: Arc<R>,
    pub(crate) registry: CapabilityRegistry,
    contexts: ContextFactory,
    factory: Arc<NodeFactory>,
    locator: NodeLocator,
    applier: PropertyApplier,
    pub(crate) guard: SynchronizationGuard,
    pub(crate) stats: RwLock<SyncStats>,
    cancelled: AtomicBool,
    active_passes: AtomicUsize,
}

impl<S: EntityStore + 'static, R: ContentRepository + 'static> SyncEngine<S, R> {
    /// Creates an engine, discovering mirrorable types from `metadata`.
    pub fn new(
        config: SyncConfig,
        metadata: &dyn MetadataProvider,
        store: Arc<S>,
        repository: Arc<R>,
    ) -> SyncResult<Self> {
        let registry = CapabilityRegistry::discover(metadata)?;
        let content: Arc<dyn ContentRepository> = repository.clone();
        let factory = Arc::new(NodeFactory::new(Arc::clone(&content)));
        let locator = NodeLocator::new(Arc::clone(&content), Arc::clone(&factory));
        let applier = PropertyApplier::new(
            content,
            Arc::clone(&factory),
            config.mapping_option_key.clone(),
        );

        Ok(Self {
            config,
            store,
            repository,
            registry,
            contexts: ContextFactory::new(),
            factory,
            locator,
            applier,
            guard: SynchronizationGuard::new(),
            stats: RwLock::new(SyncStats::default()),
            cancelled: AtomicBool::new(false),
            active_passes: AtomicUsize::new(0),
        })
    }

    /// Gets the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Gets the mirrorable types.
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Gets the entity store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Gets the content repository.
    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Gets the reentrancy guard.
    pub fn guard(&self) -> &SynchronizationGuard {
        &self.guard
    }

    /// Gets the node factory.
    pub fn node_factory(&self) -> &NodeFactory {
        &self.factory
    }

    /// Gets the current stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Creates the context used by maintenance passes: `workspace` with
    /// hidden content included.
    pub fn create_content_context(&self, workspace: &str) -> Arc<Context> {
        self.contexts
            .create(ContextConfig::new(workspace).with_invisible_content_shown(true))
    }

    /// Returns the context for an arbitrary configuration.
    pub fn context(&self, config: ContextConfig) -> Arc<Context> {
        self.contexts.create(config)
    }

    /// Cancels any ongoing pass. Checked between entities.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Resets the cancelled flag.
    pub fn reset_cancel(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    fn check_cancelled(&self) -> SyncResult<()> {
        if self.cancelled.load(Ordering::SeqCst) {
            Err(SyncError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Synchronizes every entity of `entity_type` onto its bound nodes in
    /// `context`.
    ///
    /// `on_each_node` is called after each node with the node, the entity
    /// and whether the node was written. The first failure aborts the pass;
    /// nodes flushed before it stay written.
    pub fn synchronize_all(
        &self,
        entity_type: &EntityType,
        context: &Context,
        on_each_node: Option<&mut NodeCallback<'_>>,
    ) -> SyncResult<SyncReport> {
        if !self.registry.contains(entity_type) {
            return Err(SyncError::UnknownEntityType {
                entity_type: entity_type.clone(),
            });
        }

        let result = {
            let pass = PassScope::enter(&self.active_passes);
            if pass.outermost {
                self.reset_cancel();
            }
            self.run_pass(entity_type, context, on_each_node)
        };

        match &result {
            Ok(report) => self.stats.write().record_pass(report),
            Err(err) => {
                tracing::warn!(entity_type = %entity_type, error = %err, "synchronization failed");
                self.stats.write().last_error = Some(err.to_string());
            }
        }
        result
    }

    /// Runs [`SyncEngine::synchronize_all`] for each type in order.
    pub fn synchronize_types(
        &self,
        entity_types: &[EntityType],
        context: &Context,
    ) -> SyncResult<Vec<SyncReport>> {
        entity_types
            .iter()
            .map(|entity_type| self.synchronize_all(entity_type, context, None))
            .collect()
    }

    fn run_pass(
        &self,
        entity_type: &EntityType,
        context: &Context,
        mut on_each_node: Option<&mut NodeCallback<'_>>,
    ) -> SyncResult<SyncReport> {
        let start = Instant::now();
        let interval = self.config.progress_interval;
        let mut stream = EntityStream::new(self.store.stream_all(entity_type)?).with_observer(
            |_, index| {
                if interval > 0 && index > 0 && index % interval == 0 {
                    tracing::debug!(
                        entity_type = %entity_type,
                        streamed = index,
                        "stream progress"
                    );
                }
                Ok(())
            },
        );

        let mut report = SyncReport::new(entity_type.clone());
        loop {
            self.check_cancelled()?;
            let entity = match stream.next() {
                Some(entity) => entity?,
                None => break,
            };

            let identifier = self.store.identifier_of(entity.as_ref())?;
            let properties = entity.readable_properties();
            let runtime_type = entity.entity_type();
            let mut summary = EntitySummary {
                identifier: identifier.clone(),
                nodes_processed: 0,
                nodes_updated: 0,
            };

            for node in self.locator.locate(&identifier, context)? {
                let updated = self.applier.apply(
                    &self.guard,
                    &node,
                    &properties,
                    &runtime_type,
                    context,
                )?;
                if let Some(callback) = on_each_node.as_deref_mut() {
                    callback(&*node, entity.as_ref(), updated);
                }
                summary.nodes_processed += 1;
                if updated {
                    summary.nodes_updated += 1;
                }
            }

            tracing::info!(
                module = "content-object-proxy",
                action = "entity-synchronized",
                entity_type = %runtime_type,
                identifier = %identifier,
                node_updated = summary.nodes_updated,
                node_processed = summary.nodes_processed,
                "entity synchronized"
            );
            report.entities.push(summary);
        }

        report.duration = start.elapsed();
        Ok(report)
    }
}

/// Counts a running pass; the count drops when the scope does, unwinding
/// included.
struct PassScope<'a> {
    active: &'a AtomicUsize,
    outermost: bool,
}

impl<'a> PassScope<'a> {
    fn enter(active: &'a AtomicUsize) -> Self {
        let outermost = active.fetch_add(1, Ordering::SeqCst) == 0;
        Self { active, outermost }
    }
}

impl Drop for PassScope<'_> {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<S: EntityStore + 'static, R: ContentRepository + 'static> std::fmt::Debug
    for SyncEngine<S, R>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("guard", &self.guard)
            .finish()
    }
}
