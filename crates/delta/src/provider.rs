use crate::error::Result;
use archmap_model::ChangeType;

/// A raw file-level change between two revisions, as reported by source
/// control. Paths are repository-relative without a leading slash; the
/// missing side of an add or delete is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub old_path: String,
    pub new_path: String,
    pub kind: ChangeType,
}

impl FileChange {
    pub fn added(path: impl Into<String>) -> Self {
        Self {
            old_path: String::new(),
            new_path: path.into(),
            kind: ChangeType::Add,
        }
    }

    pub fn modified(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            old_path: path.clone(),
            new_path: path,
            kind: ChangeType::Modify,
        }
    }

    pub fn deleted(path: impl Into<String>) -> Self {
        Self {
            old_path: path.into(),
            new_path: String::new(),
            kind: ChangeType::Delete,
        }
    }
}

/// Access to a repository's history, supplied by surrounding tooling. The
/// core never clones, checks out, or resets anything itself; it consumes
/// already-computed change lists and already-materialized file text.
pub trait RevisionProvider {
    /// Ordered list of file-level changes between two revisions, restricted
    /// to files existing in at least one of the two.
    fn list_changes(&self, old_revision: &str, new_revision: &str) -> Result<Vec<FileChange>>;

    /// Raw text of a file at a revision. `None` when the file does not exist
    /// there or cannot be read; never a fatal condition for a batch.
    fn read_file(&self, revision: &str, path: &str) -> Option<String>;
}
