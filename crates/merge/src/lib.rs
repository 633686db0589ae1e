//! # Archmap Merge
//!
//! Applies an ordered batch of file-level deltas to a standing system model,
//! producing the model at the batch's target revision without recomputing
//! anything from scratch.
//!
//! Two passes run over each batch. The service-boundary pass reacts to build
//! manifest adds and deletes: new service roots are created (dissolving any
//! coarser service they refine), deleted roots are removed, and the classes
//! of a dissolved service wait in the orphan pool until a service whose root
//! contains them appears. The per-file pass then applies every delta in
//! batch order, routing each file to its owning service by path containment
//! or to the orphan pool when no service claims it.
//!
//! The engine never aborts a batch: missing payloads, already-absent files,
//! and inconsistent deletes are logged and skipped. Applying the same batch
//! twice duplicates its adds — callers apply each batch exactly once per
//! revision transition.

mod manifest;

use archmap_model::{ChangeType, Delta, MicroserviceSystem, ProjectFile, SystemChange};

/// Apply one change batch to the system and advance its revision.
pub fn merge_system_change(system: &mut MicroserviceSystem, change: &SystemChange) {
    if change.changes.is_empty() {
        log::debug!(
            "No changes found at {} -> {}",
            change.old_commit,
            change.new_commit
        );
        system.commit_id = change.new_commit.clone();
        return;
    }

    manifest::update_service_topology(system, change);

    for delta in &change.changes {
        match delta.change_type {
            ChangeType::Add => add_file(system, delta),
            ChangeType::Modify => {
                remove_file(system, delta);
                add_file(system, delta);
            }
            ChangeType::Delete => remove_file(system, delta),
        }
    }

    system.commit_id = change.new_commit.clone();
    log::info!("Merged system model to {}", change.new_commit);
}

/// Insert a delta's payload into its owning service, or the orphan pool when
/// no service root contains it. Payload-less adds (unparsable files) are
/// dropped with a warning.
fn add_file(system: &mut MicroserviceSystem, delta: &Delta) {
    let Some(data) = &delta.data else {
        log::warn!(
            "[Filtered] An added file has no change information {}",
            delta.new_path
        );
        return;
    };

    let owner = system
        .microservices
        .iter()
        .position(|m| m.contains_path(&delta.new_path));
    let Some(owner) = owner else {
        log::debug!("[File added] {} to orphans", delta.new_path);
        system.orphans.push(data.clone());
        return;
    };

    let service = &mut system.microservices[owner];
    match data.clone() {
        ProjectFile::Class(class) => service.add_class(class),
        ProjectFile::Config(config) => service.files.push(config),
    }
    log::debug!(
        "[File added] {} to microservice {}",
        delta.new_path,
        system.microservices[owner].path
    );
}

/// Remove the file at a delta's old path: from its owning service when one
/// claims the path, otherwise from the orphan pool. A file found nowhere is
/// already absent, which is not an error.
fn remove_file(system: &mut MicroserviceSystem, delta: &Delta) {
    let owner = system
        .microservices
        .iter()
        .position(|m| m.contains_path(&delta.old_path));
    if let Some(owner) = owner {
        let service = &mut system.microservices[owner];
        if service.remove_file(&delta.old_path) {
            log::debug!("[File removed] {} from {}", delta.old_path, service.path);
        } else {
            log::debug!("[File not found] {} in {}", delta.old_path, service.path);
        }
        return;
    }

    if let Some(pos) = system
        .orphans
        .iter()
        .position(|orphan| orphan.path() == delta.old_path)
    {
        system.orphans.remove(pos);
        log::debug!("[File removed] {} from orphans", delta.old_path);
    } else {
        log::debug!("[File not found] {} in orphans", delta.old_path);
    }
}
