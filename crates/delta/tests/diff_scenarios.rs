use archmap_delta::{extract_system_change, FileChange, Result, RevisionProvider};
use archmap_model::{ChangeType, DEV_NULL};
use std::collections::HashMap;

/// In-memory revision history: (revision, path) -> content.
#[derive(Default)]
struct FakeRepo {
    files: HashMap<(String, String), String>,
    changes: Vec<FileChange>,
}

impl FakeRepo {
    fn file(mut self, revision: &str, path: &str, content: &str) -> Self {
        self.files
            .insert((revision.to_string(), path.to_string()), content.to_string());
        self
    }

    fn change(mut self, change: FileChange) -> Self {
        self.changes.push(change);
        self
    }
}

impl RevisionProvider for FakeRepo {
    fn list_changes(&self, _old: &str, _new: &str) -> Result<Vec<FileChange>> {
        Ok(self.changes.clone())
    }

    fn read_file(&self, revision: &str, path: &str) -> Option<String> {
        self.files
            .get(&(revision.to_string(), path.to_string()))
            .cloned()
    }
}

const CONTROLLER_V1: &str = "package com.example;\n\
    @RestController\n\
    @RequestMapping(\"users\")\n\
    public class UserController {\n\
        @GetMapping(\"{id}\")\n\
        public User getUser(@PathVariable String id) { return null; }\n\
    }\n";

#[test]
fn comment_only_modification_is_suppressed() {
    let reformatted = format!("// touched a comment\n{CONTROLLER_V1}");
    let repo = FakeRepo::default()
        .file("old", "users/src/UserController.java", CONTROLLER_V1)
        .file("new", "users/src/UserController.java", &reformatted)
        .change(FileChange::modified("users/src/UserController.java"));

    let change = extract_system_change(&repo, "old", "new").unwrap();
    assert!(change.changes.is_empty());
    assert_eq!(change.old_commit, "old");
    assert_eq!(change.new_commit, "new");
}

#[test]
fn semantic_modification_carries_extracted_payload() {
    let v2 = CONTROLLER_V1.replace("getUser", "fetchUser");
    let repo = FakeRepo::default()
        .file("old", "users/src/UserController.java", CONTROLLER_V1)
        .file("new", "users/src/UserController.java", &v2)
        .change(FileChange::modified("users/src/UserController.java"));

    let change = extract_system_change(&repo, "old", "new").unwrap();
    assert_eq!(change.changes.len(), 1);

    let delta = &change.changes[0];
    assert_eq!(delta.change_type, ChangeType::Modify);
    assert_eq!(delta.old_path, "/users/src/UserController.java");
    assert_eq!(delta.new_path, "/users/src/UserController.java");

    let class = delta.class_change().expect("class payload");
    assert_eq!(class.name, "UserController");
    assert_eq!(class.endpoints().count(), 1);
}

#[test]
fn root_manifest_and_unrecognized_files_are_excluded() {
    let repo = FakeRepo::default()
        .file("new", "pom.xml", "<project></project>")
        .file("new", "README.md", "docs")
        .file("new", "billing/pom.xml", "<project></project>")
        .change(FileChange::modified("pom.xml"))
        .change(FileChange::added("README.md"))
        .change(FileChange::added("billing/pom.xml"));

    let change = extract_system_change(&repo, "old", "new").unwrap();
    assert_eq!(change.changes.len(), 1);
    assert_eq!(change.changes[0].new_path, "/billing/pom.xml");
    assert!(change.changes[0].config_change().is_some());
}

#[test]
fn configuration_changes_are_never_suppressed() {
    let repo = FakeRepo::default()
        .file("old", "users/src/main/resources/application.yml", "port: 1\n")
        .file("new", "users/src/main/resources/application.yml", "port: 1\n")
        .change(FileChange::modified("users/src/main/resources/application.yml"));

    let change = extract_system_change(&repo, "old", "new").unwrap();
    assert_eq!(change.changes.len(), 1);
}

#[test]
fn deletes_carry_no_payload() {
    let repo = FakeRepo::default().change(FileChange::deleted("users/src/UserController.java"));

    let change = extract_system_change(&repo, "old", "new").unwrap();
    assert_eq!(change.changes.len(), 1);

    let delta = &change.changes[0];
    assert_eq!(delta.change_type, ChangeType::Delete);
    assert_eq!(delta.old_path, "/users/src/UserController.java");
    assert_eq!(delta.new_path, DEV_NULL);
    assert!(delta.data.is_none());
}

#[test]
fn unparsable_added_source_yields_empty_payload() {
    let repo = FakeRepo::default()
        .file("new", "users/src/Broken.java", "public class {{{")
        .change(FileChange::added("users/src/Broken.java"));

    let change = extract_system_change(&repo, "old", "new").unwrap();
    assert_eq!(change.changes.len(), 1);
    assert!(change.changes[0].data.is_none());
}
