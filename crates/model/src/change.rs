use crate::class::{ConfigFile, JavaClass, ProjectFile};
use serde::{Deserialize, Serialize};

/// Kind of a single file-level change between two revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Add,
    Modify,
    Delete,
}

/// Path placeholder for the missing side of an add or delete.
pub const DEV_NULL: &str = "/dev/null";

/// One file-level change. For adds and modifications `data` carries the
/// freshly extracted entity payload; it is `None` for deletes and for files
/// whose payload failed to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    pub old_path: String,
    pub new_path: String,
    pub change_type: ChangeType,
    #[serde(default)]
    pub data: Option<ProjectFile>,
}

impl Delta {
    pub fn new(
        old_path: impl Into<String>,
        new_path: impl Into<String>,
        change_type: ChangeType,
        data: Option<ProjectFile>,
    ) -> Self {
        Self {
            old_path: old_path.into(),
            new_path: new_path.into(),
            change_type,
            data,
        }
    }

    /// The path this delta affects: the new path for adds, the old path
    /// otherwise.
    #[must_use]
    pub fn affected_path(&self) -> &str {
        if self.old_path == DEV_NULL {
            &self.new_path
        } else {
            &self.old_path
        }
    }

    /// The class payload, if this delta carries one.
    #[must_use]
    pub fn class_change(&self) -> Option<&JavaClass> {
        self.data.as_ref().and_then(ProjectFile::as_class)
    }

    /// The configuration payload, if this delta carries one.
    #[must_use]
    pub fn config_change(&self) -> Option<&ConfigFile> {
        self.data.as_ref().and_then(ProjectFile::as_config)
    }
}

/// An ordered batch of deltas between two named revisions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemChange {
    pub old_commit: String,
    pub new_commit: String,
    #[serde(default)]
    pub changes: Vec<Delta>,
}

impl SystemChange {
    pub fn new(old_commit: impl Into<String>, new_commit: impl Into<String>) -> Self {
        Self {
            old_commit: old_commit.into(),
            new_commit: new_commit.into(),
            changes: Vec::new(),
        }
    }
}
