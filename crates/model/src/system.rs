use crate::class::{JavaClass, ProjectFile};
use crate::service::Microservice;
use serde::{Deserialize, Serialize};

/// The standing architectural model of one multi-service repository at a
/// given revision.
///
/// Every known file is reachable either through exactly one service or
/// through the orphan pool, never both and never neither. Orphans are files
/// whose owning service is not (yet) known, e.g. classes added before their
/// service's build manifest was seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MicroserviceSystem {
    pub name: String,
    #[serde(rename = "commitID")]
    pub commit_id: String,
    #[serde(default)]
    pub microservices: Vec<Microservice>,
    #[serde(default)]
    pub orphans: Vec<ProjectFile>,
}

impl MicroserviceSystem {
    pub fn new(name: impl Into<String>, commit_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commit_id: commit_id.into(),
            microservices: Vec::new(),
            orphans: Vec::new(),
        }
    }

    /// The service whose root path contains `path`, if any.
    #[must_use]
    pub fn find_microservice_by_path(&self, path: &str) -> Option<&Microservice> {
        self.microservices.iter().find(|m| m.contains_path(path))
    }

    /// Mutable variant of [`Self::find_microservice_by_path`].
    pub fn find_microservice_by_path_mut(&mut self, path: &str) -> Option<&mut Microservice> {
        self.microservices
            .iter_mut()
            .find(|m| m.contains_path(path))
    }

    /// The service rooted exactly at `root`, if any.
    #[must_use]
    pub fn find_microservice_by_root(&self, root: &str) -> Option<&Microservice> {
        self.microservices.iter().find(|m| m.path == root)
    }

    /// Remove the service rooted exactly at `root`, returning it.
    pub fn take_microservice_by_root(&mut self, root: &str) -> Option<Microservice> {
        let pos = self.microservices.iter().position(|m| m.path == root)?;
        Some(self.microservices.remove(pos))
    }

    /// Dissolve a removed service into the orphan pool. The service-name
    /// stamp on its classes is cleared; configuration files move over as-is.
    pub fn orphanize(&mut self, service: Microservice) {
        let (classes, files) = service.into_contents();
        for mut class in classes {
            class.set_microservice_name("");
            self.orphans.push(ProjectFile::Class(class));
        }
        for file in files {
            self.orphans.push(ProjectFile::Config(file));
        }
    }

    /// Move every orphan living under `service`'s root into the service,
    /// re-stamping adopted classes with the service name.
    pub fn adopt(&mut self, service: &mut Microservice) {
        let mut remaining = Vec::with_capacity(self.orphans.len());
        for orphan in self.orphans.drain(..) {
            if !service.contains_path(orphan.path()) {
                remaining.push(orphan);
                continue;
            }
            match orphan {
                ProjectFile::Class(class) => service.add_class(class),
                ProjectFile::Config(config) => service.files.push(config),
            }
        }
        self.orphans = remaining;
    }

    /// Find a class anywhere in the system by file path: services first,
    /// then the orphan pool.
    #[must_use]
    pub fn find_class(&self, path: &str) -> Option<&JavaClass> {
        self.microservices
            .iter()
            .flat_map(Microservice::classes)
            .find(|c| c.path == path)
            .or_else(|| {
                self.orphans
                    .iter()
                    .filter_map(ProjectFile::as_class)
                    .find(|c| c.path == path)
            })
    }

    /// Whether any service or the orphan pool holds a file at `path`.
    #[must_use]
    pub fn contains_file(&self, path: &str) -> bool {
        self.microservices.iter().any(|m| {
            m.classes().any(|c| c.path == path) || m.files.iter().any(|f| f.path == path)
        }) || self.orphans.iter().any(|o| o.path() == path)
    }
}
