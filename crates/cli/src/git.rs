use archmap_delta::{DeltaError, FileChange, Result, RevisionProvider};
use std::path::PathBuf;
use std::process::Command;

/// Revision provider backed by the `git` binary of an already checked-out
/// repository. Cloning and checkout management stay with the caller; this
/// only lists tree differences and reads blobs.
pub struct GitCliProvider {
    repo: PathBuf,
}

impl GitCliProvider {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }

    fn git(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo)
            .args(args)
            .output()
            .map_err(|e| DeltaError::provider(format!("failed to run git: {e}")))?;
        if !output.status.success() {
            return Err(DeltaError::provider(format!(
                "git {} failed: {}",
                args.first().unwrap_or(&""),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl RevisionProvider for GitCliProvider {
    fn list_changes(&self, old_revision: &str, new_revision: &str) -> Result<Vec<FileChange>> {
        let range = format!("{old_revision}..{new_revision}");
        let listing = self.git(&["diff", "--name-status", "-M", &range])?;

        let mut changes = Vec::new();
        for line in listing.lines().filter(|l| !l.is_empty()) {
            let mut parts = line.split('\t');
            let status = parts.next().unwrap_or_default();
            let first = parts.next().unwrap_or_default().to_string();
            let second = parts.next().map(str::to_string);

            match status.chars().next() {
                Some('A') => changes.push(FileChange::added(first)),
                Some('M') => changes.push(FileChange::modified(first)),
                Some('D') => changes.push(FileChange::deleted(first)),
                // A rename is a delete of the old path plus an add of the
                // new one; the model has no rename notion.
                Some('R') => {
                    changes.push(FileChange::deleted(first));
                    if let Some(new_path) = second {
                        changes.push(FileChange::added(new_path));
                    }
                }
                Some('C') => {
                    if let Some(new_path) = second {
                        changes.push(FileChange::added(new_path));
                    }
                }
                _ => log::debug!("Ignoring diff entry: {line}"),
            }
        }
        Ok(changes)
    }

    fn read_file(&self, revision: &str, path: &str) -> Option<String> {
        self.git(&["show", &format!("{revision}:{path}")]).ok()
    }
}
