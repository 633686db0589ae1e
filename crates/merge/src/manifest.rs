use archmap_extractor::{is_build_manifest, manifest_root};
use archmap_model::{ChangeType, Delta, Microservice, MicroserviceSystem, SystemChange};

/// Apply the build-manifest deltas of a batch to the system's service
/// topology. Runs once per batch, before any per-file delta; manifest
/// modifications never change topology and are ignored here.
pub(crate) fn update_service_topology(system: &mut MicroserviceSystem, change: &SystemChange) {
    for delta in filter_build_deltas(system, change) {
        match delta.change_type {
            ChangeType::Add => apply_service_add(system, delta, change),
            ChangeType::Delete => apply_service_delete(system, delta, change),
            ChangeType::Modify => unreachable!("modifications are filtered out"),
        }
    }
}

/// Reduce a batch to the manifest deltas that can change topology, with
/// redundant entries removed:
/// - adds of the same normalized root collapse to the earliest;
/// - of two nested add roots, only the more specific survives;
/// - duplicate deletes of one root collapse to one survivor;
/// - a delete whose service is not present in the system is dropped — the
///   service it refers to was itself filtered out as redundant earlier.
fn filter_build_deltas<'a>(
    system: &MicroserviceSystem,
    change: &'a SystemChange,
) -> Vec<&'a Delta> {
    let manifests: Vec<&Delta> = change
        .changes
        .iter()
        .filter(|d| is_build_manifest(&d.old_path) || is_build_manifest(&d.new_path))
        .filter(|d| d.change_type != ChangeType::Modify)
        .collect();

    let mut adds: Vec<&Delta> = Vec::new();
    for delta in manifests
        .iter()
        .copied()
        .filter(|d| d.change_type == ChangeType::Add)
    {
        let root = manifest_root(&delta.new_path);
        let duplicate = adds
            .iter()
            .any(|kept| manifest_root(&kept.new_path) == root);
        if duplicate {
            log::debug!("Filtered duplicate service add for {root}");
        } else {
            adds.push(delta);
        }
    }
    // Of two nested roots added in one batch, the deeper one wins.
    let add_snapshot = adds.clone();
    adds.retain(|delta| {
        let root = manifest_root(&delta.new_path);
        let shadowed = add_snapshot.iter().any(|other| {
            let other_root = manifest_root(&other.new_path);
            other_root != root && other_root.starts_with(&format!("{root}/"))
        });
        if shadowed {
            log::debug!("Filtered service add {root}: a more specific root is added in the batch");
        }
        !shadowed
    });

    let mut deletes: Vec<&Delta> = Vec::new();
    for delta in manifests
        .iter()
        .copied()
        .filter(|d| d.change_type == ChangeType::Delete)
    {
        if system.find_microservice_by_path(&delta.old_path).is_none() {
            log::debug!(
                "Filtered service delete {}: no containing service",
                delta.old_path
            );
            continue;
        }
        let root = manifest_root(&delta.old_path);
        let duplicate = deletes
            .iter()
            .any(|kept| manifest_root(&kept.old_path) == root);
        if duplicate {
            log::debug!("Filtered duplicate service delete for {root}");
        } else {
            deletes.push(delta);
        }
    }

    adds.into_iter().chain(deletes).collect()
}

fn apply_service_add(system: &mut MicroserviceSystem, delta: &Delta, change: &SystemChange) {
    let root = manifest_root(&delta.new_path);

    // A service already rooted deeper than the new root wins; the add is
    // redundant aggregation above it.
    let shadowed = system
        .microservices
        .iter()
        .any(|m| m.path.starts_with(&format!("{root}/")));
    if shadowed {
        log::debug!("Skipped service add {root}: a more specific service exists");
        return;
    }

    // A service rooted above the new root is dissolved first; its files wait
    // in the orphan pool and are adopted below where they match.
    let outer_root = system
        .microservices
        .iter()
        .find(|m| root.starts_with(&format!("{}/", m.path)))
        .map(|m| m.path.clone());
    if let Some(outer_root) = outer_root {
        if let Some(outer) = system.take_microservice_by_root(&outer_root) {
            log::debug!("Dissolved service {} into orphans for {root}", outer.path);
            system.orphanize(outer);
        }
    }

    let name = root.rsplit('/').next().unwrap_or(&root).to_string();
    let mut service = Microservice::new(name, root.clone());
    system.adopt(&mut service);
    log::debug!(
        "[Microservice added] {} {} at {} -> {}",
        service.name,
        service.path,
        change.old_commit,
        change.new_commit
    );
    system.microservices.push(service);
}

fn apply_service_delete(system: &mut MicroserviceSystem, delta: &Delta, change: &SystemChange) {
    let root = manifest_root(&delta.old_path);
    let Some(service) = system.take_microservice_by_root(&root) else {
        // An inconsistent delta stream; skip the delta, keep the batch.
        log::error!(
            "[Microservice not found] {} at {} -> {}",
            delta.old_path,
            change.old_commit,
            change.new_commit
        );
        return;
    };
    log::debug!(
        "[Microservice removed] {} {} at {} -> {}",
        service.name,
        service.path,
        change.old_commit,
        change.new_commit
    );
    system.orphanize(service);
}
