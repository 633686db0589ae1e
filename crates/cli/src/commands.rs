use crate::git::GitCliProvider;
use anyhow::{Context, Result};
use archmap_delta::extract_system_change;
use archmap_flow::{build_flows, build_service_edges, DependencyGraph};
use archmap_merge::merge_system_change;
use archmap_model::{FlowSummary, MicroserviceSystem, SystemChange};
use std::fs;
use std::path::{Path, PathBuf};

/// Extract the full system model from a checked-out repository.
pub fn build(root: &Path, name: &str, commit: &str, output: &Path) -> Result<()> {
    let service_roots = archmap_extractor::discover_service_roots(root);
    log::info!("Discovered {} service roots", service_roots.len());
    let system = archmap_extractor::build_system(root, &service_roots, name, commit)?;
    write_json(output, &system)
}

/// Compute the semantic change batch between two revisions.
pub fn diff(repo: &Path, old_revision: &str, new_revision: &str, output: &Path) -> Result<()> {
    let provider = GitCliProvider::new(repo);
    let change = extract_system_change(&provider, old_revision, new_revision)?;
    write_json(output, &change)
}

/// Apply a change batch to a persisted system model.
pub fn merge(system_path: &Path, delta_path: &Path, output: &Path) -> Result<()> {
    let mut system: MicroserviceSystem = read_json(system_path)?;
    let change: SystemChange = read_json(delta_path)?;
    merge_system_change(&mut system, &change);
    write_json(output, &system)
}

/// Trace request flows over a persisted system model.
pub fn flows(system_path: &Path, output: Option<PathBuf>) -> Result<()> {
    let system: MicroserviceSystem = read_json(system_path)?;
    let summaries: Vec<FlowSummary> = build_flows(&system)
        .iter()
        .map(|flow| flow.summary())
        .collect();
    match output {
        Some(path) => write_json(&path, &summaries),
        None => print_json(&summaries),
    }
}

/// Resolve cross-service dependency edges over a persisted system model.
pub fn edges(system_path: &Path, output: Option<PathBuf>) -> Result<()> {
    let system: MicroserviceSystem = read_json(system_path)?;
    let edges = build_service_edges(&system);
    let graph = DependencyGraph::from_system(&system);
    log::info!(
        "Dependency graph: {} services, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    match output {
        Some(path) => write_json(&path, &edges),
        None => print_json(&edges),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
