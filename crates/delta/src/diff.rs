use crate::error::Result;
use crate::provider::{FileChange, RevisionProvider};
use archmap_extractor::{classify_config_file, is_configuration_file, is_valid_file, Extractor};
use archmap_model::{ChangeType, Delta, ProjectFile, SystemChange, DEV_NULL};
use once_cell::sync::Lazy;
use regex::Regex;

/// Line comments, block comments, and whitespace runs; what is left after
/// removal is the executable content compared across revisions.
static NON_SEMANTIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(//[^\n]*|/\*[^*]*\*+(?:[^/*][^*]*\*+)*/|\s+)").unwrap());

/// Compute the semantic change batch between two revisions.
///
/// Raw changes come from the revision provider; this pass drops files
/// outside the recognized set, drops the repository-root build manifest
/// unconditionally, and suppresses source changes that do not alter
/// executable content. Surviving adds and modifications carry the freshly
/// extracted entity payload. Input order is preserved and nothing is
/// deduplicated here; that is the merge engine's job.
pub fn extract_system_change(
    provider: &dyn RevisionProvider,
    old_revision: &str,
    new_revision: &str,
) -> Result<SystemChange> {
    let mut extractor = Extractor::new()?;
    let mut system_change = SystemChange::new(old_revision, new_revision);

    for change in provider.list_changes(old_revision, new_revision)? {
        let path = affected_path(&change);

        // The repository root manifest delimits no service.
        if path == "pom.xml" {
            continue;
        }
        if !is_valid_file(path) {
            continue;
        }
        if path.ends_with(".java") && !is_code_change(provider, old_revision, new_revision, &change)
        {
            log::debug!(
                "Suppressed non-semantic change to {path} at {old_revision} -> {new_revision}"
            );
            continue;
        }

        let (old_path, new_path) = delta_paths(&change);
        let data = match change.kind {
            ChangeType::Add | ChangeType::Modify => {
                extract_payload(provider, &mut extractor, new_revision, &new_path, &change)
            }
            ChangeType::Delete => None,
        };
        system_change
            .changes
            .push(Delta::new(old_path, new_path, change.kind, data));
    }

    log::info!(
        "Extracted {} delta changes between {old_revision} -> {new_revision}",
        system_change.changes.len()
    );
    Ok(system_change)
}

/// Strip comments and whitespace from source text.
#[must_use]
pub fn strip_comments_and_whitespace(content: &str) -> String {
    NON_SEMANTIC.replace_all(content, "").into_owned()
}

fn affected_path(change: &FileChange) -> &str {
    if change.kind == ChangeType::Add {
        &change.new_path
    } else {
        &change.old_path
    }
}

/// Whether a source-file change survives comment/whitespace stripping.
/// Configuration files are never subject to this suppression.
fn is_code_change(
    provider: &dyn RevisionProvider,
    old_revision: &str,
    new_revision: &str,
    change: &FileChange,
) -> bool {
    let old_content = (!change.old_path.is_empty())
        .then(|| provider.read_file(old_revision, &change.old_path))
        .flatten()
        .unwrap_or_default();
    let new_content = (!change.new_path.is_empty())
        .then(|| provider.read_file(new_revision, &change.new_path))
        .flatten()
        .unwrap_or_default();

    strip_comments_and_whitespace(&old_content) != strip_comments_and_whitespace(&new_content)
}

/// Model paths are rooted with a leading slash; the missing side of an add
/// or delete becomes `/dev/null`.
fn delta_paths(change: &FileChange) -> (String, String) {
    match change.kind {
        ChangeType::Add => (DEV_NULL.to_string(), rooted(&change.new_path)),
        ChangeType::Delete => (rooted(&change.old_path), DEV_NULL.to_string()),
        ChangeType::Modify => (rooted(&change.old_path), rooted(&change.new_path)),
    }
}

fn rooted(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

fn extract_payload(
    provider: &dyn RevisionProvider,
    extractor: &mut Extractor,
    new_revision: &str,
    model_path: &str,
    change: &FileChange,
) -> Option<ProjectFile> {
    if is_configuration_file(model_path) {
        return classify_config_file(model_path).map(ProjectFile::Config);
    }

    let Some(source) = provider.read_file(new_revision, &change.new_path) else {
        log::warn!("No content for {model_path} at {new_revision}");
        return None;
    };
    // The owning service is unknown at diff time; the merge engine stamps it.
    let class = extractor.classify_and_extract(&source, model_path, "");
    if class.is_none() {
        log::warn!("No parsable payload for {model_path} at {new_revision}");
    }
    class.map(ProjectFile::Class)
}
