use archmap_model::ConfigFile;
use std::path::Path;

/// File names and suffixes that participate in the model: Java sources plus
/// the build/deploy manifests that delimit or configure a service.
const VALID_SUFFIXES: [&str; 2] = [".java", ".yml"];
const VALID_BASENAMES: [&str; 3] = ["pom.xml", "build.gradle", "Dockerfile"];

/// Whether a repository path belongs in the model at all.
///
/// Anything under `.github` is CI metadata, not part of the system.
#[must_use]
pub fn is_valid_file(path: &str) -> bool {
    if path.contains(".github") {
        return false;
    }
    if VALID_SUFFIXES.iter().any(|s| path.ends_with(s)) {
        return true;
    }
    basename(path)
        .map(|name| VALID_BASENAMES.contains(&name))
        .unwrap_or(false)
}

/// Whether a path is a configuration file (valid, but not a Java source).
#[must_use]
pub fn is_configuration_file(path: &str) -> bool {
    is_valid_file(path) && !path.ends_with(".java")
}

/// Whether a path is a build manifest that delimits a service root.
#[must_use]
pub fn is_build_manifest(path: &str) -> bool {
    matches!(basename(path), Some("pom.xml") | Some("build.gradle"))
}

/// The service root implied by a build-manifest path, i.e. the path with the
/// manifest basename stripped. `/billing/pom.xml` yields `/billing`.
#[must_use]
pub fn manifest_root(path: &str) -> String {
    path.trim_end_matches("/pom.xml")
        .trim_end_matches("/build.gradle")
        .to_string()
}

/// Classify a configuration file into an opaque record, or `None` for
/// formats the model does not track.
#[must_use]
pub fn classify_config_file(path: &str) -> Option<ConfigFile> {
    let name = basename(path)?;
    let recognized = name.ends_with(".yml") || VALID_BASENAMES.contains(&name);
    recognized.then(|| ConfigFile::new(path, name))
}

fn basename(path: &str) -> Option<&str> {
    Path::new(path).file_name()?.to_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_files_cover_sources_and_manifests() {
        assert!(is_valid_file("/users/src/main/java/UserController.java"));
        assert!(is_valid_file("/users/pom.xml"));
        assert!(is_valid_file("/users/build.gradle"));
        assert!(is_valid_file("/users/src/main/resources/application.yml"));
        assert!(!is_valid_file("/users/README.md"));
        assert!(!is_valid_file("/.github/workflows/ci.yml"));
    }

    #[test]
    fn configuration_excludes_java_sources() {
        assert!(is_configuration_file("/users/pom.xml"));
        assert!(!is_configuration_file("/users/src/Main.java"));
    }

    #[test]
    fn manifest_root_strips_basename() {
        assert_eq!(manifest_root("/billing/pom.xml"), "/billing");
        assert_eq!(manifest_root("/billing/build.gradle"), "/billing");
        assert_eq!(manifest_root("/billing/other.txt"), "/billing/other.txt");
    }

    #[test]
    fn classify_config_file_recognizes_known_formats() {
        assert!(classify_config_file("/a/application.yml").is_some());
        assert!(classify_config_file("/a/Dockerfile").is_some());
        assert!(classify_config_file("/a/notes.txt").is_none());
    }
}
