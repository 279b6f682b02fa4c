//! Sync command implementation.

use contentproxy_core::{EntityType, Node, ProxyableEntity};
use serde::Serialize;
use std::collections::HashSet;
use std::io::{self, Write};
use std::path::Path;

/// Outcome of a sync run.
#[derive(Debug, Serialize)]
pub struct SyncSummary {
    /// Synchronized type.
    pub entity_type: String,
    /// Workspace that was synchronized.
    pub workspace: String,
    /// Entities visited.
    pub entities_processed: usize,
    /// Nodes visited.
    pub nodes_processed: usize,
    /// Nodes written.
    pub nodes_updated: usize,
    /// Duration in milliseconds.
    pub duration_ms: u128,
}

/// Runs the sync command.
pub fn run(
    dataset: &Path,
    entity_type: &str,
    workspace: &str,
    output: Option<&Path>,
    format: &str,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let backends = super::load_backends(dataset)?;
    let engine = super::open_engine(&backends)?;
    let context = engine.create_content_context(workspace);
    let entity_type = EntityType::from(entity_type);
    let verbose_nodes = format != "json";

    let mut processed = HashSet::new();
    let mut write_error: Option<io::Error> = None;
    let mut report_node = |node: &Node, _entity: &dyn ProxyableEntity, updated: bool| {
        if !verbose_nodes || write_error.is_some() {
            return;
        }
        if let Err(err) = print_node(&mut *out, &mut processed, node, updated) {
            write_error = Some(err);
        }
    };
    let report = engine.synchronize_all(&entity_type, &context, Some(&mut report_node))?;
    if let Some(err) = write_error {
        return Err(err.into());
    }

    let summary = SyncSummary {
        entity_type: report.entity_type.to_string(),
        workspace: workspace.to_owned(),
        entities_processed: report.entities_processed(),
        nodes_processed: report.nodes_processed(),
        nodes_updated: report.nodes_updated(),
        duration_ms: report.duration.as_millis(),
    };

    match format {
        "json" => {
            writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
        }
        _ => {
            writeln!(out)?;
            writeln!(
                out,
                "Synchronized {} entities of {}: {} of {} nodes updated in workspace {}",
                summary.entities_processed,
                summary.entity_type,
                summary.nodes_updated,
                summary.nodes_processed,
                summary.workspace
            )?;
        }
    }

    if let Some(path) = output {
        backends.snapshot().save(path)?;
        if verbose_nodes {
            writeln!(out, "Dataset written to {}", path.display())?;
        }
    }

    Ok(())
}

fn print_node(
    out: &mut dyn Write,
    processed: &mut HashSet<String>,
    node: &Node,
    updated: bool,
) -> io::Result<()> {
    let identifier = node
        .content_object()
        .map(|reference| reference.identifier.to_string())
        .unwrap_or_default();
    if processed.insert(identifier.clone()) {
        writeln!(out)?;
        writeln!(out, "Process entity \"{}\" ({})", node.label(), identifier)?;
    }

    let marker = if updated { "++ node updated" } else { "~~ node skipped" };
    writeln!(
        out,
        "{} {} in workspace {} ({})",
        marker,
        node.path(),
        node.workspace_name(),
        node.identifier()
    )
}
