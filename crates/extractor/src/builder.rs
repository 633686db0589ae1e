use crate::classify::Extractor;
use crate::error::{ExtractError, Result};
use crate::file_type;
use archmap_model::{Microservice, MicroserviceSystem};
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};

/// Discover service root directories under `repo_root`: directories holding
/// a build manifest that does not aggregate nested modules. When roots nest,
/// only the more specific one survives.
#[must_use]
pub fn discover_service_roots(repo_root: &Path) -> Vec<PathBuf> {
    let mut roots = Vec::new();

    let walker = WalkBuilder::new(repo_root)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .build();
    for entry in walker.flatten() {
        let path = entry.path();
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let is_root_manifest = match name {
            // An aggregator pom only lists modules; it is not a service.
            "pom.xml" => fs::read_to_string(path)
                .map(|content| !content.contains("<modules>"))
                .unwrap_or(false),
            "build.gradle" => true,
            _ => false,
        };
        if is_root_manifest {
            if let Some(parent) = path.parent() {
                if parent != repo_root {
                    roots.push(parent.to_path_buf());
                }
            }
        }
    }

    // Keep only the most specific root of any nested pair.
    let snapshot = roots.clone();
    roots.retain(|candidate| {
        !snapshot
            .iter()
            .any(|other| other != candidate && other.starts_with(candidate))
    });
    roots.sort();
    roots
}

/// Build the full architectural model of a checked-out repository: scan each
/// service root, classify every valid file, and bucket the results into
/// services. Files that fail to parse or carry no role marker contribute
/// nothing; the orphan pool starts empty because every scanned file has a
/// known service.
pub fn build_system(
    repo_root: &Path,
    service_roots: &[PathBuf],
    system_name: &str,
    commit_id: &str,
) -> Result<MicroserviceSystem> {
    let mut extractor = Extractor::new()?;
    let mut system = MicroserviceSystem::new(system_name, commit_id);

    for root in service_roots {
        let name = root
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ExtractError::invalid_path(root.display().to_string()))?;
        let mut service = Microservice::new(name, repo_relative_path(repo_root, root)?);
        scan_service(&mut extractor, repo_root, root, &mut service)?;
        log::info!(
            "Scanned service {} at {}: {} classes, {} files",
            service.name,
            service.path,
            service.classes().count(),
            service.files.len()
        );
        system.microservices.push(service);
    }

    if system.microservices.is_empty() {
        log::info!("No services found under {}", repo_root.display());
    }
    Ok(system)
}

fn scan_service(
    extractor: &mut Extractor,
    repo_root: &Path,
    service_root: &Path,
    service: &mut Microservice,
) -> Result<()> {
    let walker = WalkBuilder::new(service_root)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .build();
    for entry in walker.flatten() {
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        let model_path = repo_relative_path(repo_root, path)?;
        if !file_type::is_valid_file(&model_path) {
            continue;
        }

        if file_type::is_configuration_file(&model_path) {
            if let Some(config) = file_type::classify_config_file(&model_path) {
                service.files.push(config);
            }
            continue;
        }

        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                log::warn!("Failed to read {}: {e}", path.display());
                continue;
            }
        };
        if let Some(class) = extractor.classify_and_extract(&source, &model_path, &service.name) {
            service.add_class(class);
        }
    }
    Ok(())
}

/// Repository-relative model path with a leading slash and `/` separators.
fn repo_relative_path(repo_root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(repo_root)
        .map_err(|_| ExtractError::invalid_path(path.display().to_string()))?;
    let mut out = String::new();
    for component in relative.components() {
        out.push('/');
        out.push_str(&component.as_os_str().to_string_lossy());
    }
    if out.is_empty() {
        out.push('/');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn discovers_manifest_directories_without_modules() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "pom.xml", "<project><modules><module>users</module></modules></project>");
        write(root, "users/pom.xml", "<project></project>");
        write(root, "billing/build.gradle", "plugins {}");

        let roots = discover_service_roots(root);
        assert_eq!(roots.len(), 2);
        assert!(roots.contains(&root.join("users")));
        assert!(roots.contains(&root.join("billing")));
    }

    #[test]
    fn nested_roots_keep_the_more_specific() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "platform/pom.xml", "<project></project>");
        write(root, "platform/users/pom.xml", "<project></project>");

        let roots = discover_service_roots(root);
        assert_eq!(roots, vec![root.join("platform/users")]);
    }

    #[test]
    fn builds_system_from_service_roots() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "users/pom.xml", "<project></project>");
        write(
            root,
            "users/src/main/java/UserController.java",
            "package com.example;\n\
             @RestController\n\
             @RequestMapping(\"users\")\n\
             public class UserController {\n\
                 @GetMapping(\"{id}\")\n\
                 public User getUser(@PathVariable String id) { return null; }\n\
             }\n",
        );
        write(root, "users/src/main/resources/application.yml", "server:\n  port: 8080\n");

        let roots = discover_service_roots(root);
        let system = build_system(root, &roots, "shop", "abc123").unwrap();

        assert_eq!(system.microservices.len(), 1);
        let service = &system.microservices[0];
        assert_eq!(service.name, "users");
        assert_eq!(service.path, "/users");
        assert_eq!(service.controllers.len(), 1);
        // The manifest and the yml both count as configuration files.
        assert_eq!(service.files.len(), 2);
        assert_eq!(service.endpoints().count(), 1);
        assert!(system.orphans.is_empty());
    }
}
