use crate::class::{ConfigFile, JavaClass, Method, MethodCall};
use crate::types::ClassRole;
use serde::{Deserialize, Serialize};

/// One microservice: a root path and role-bucketed collections of the classes
/// and configuration files living under it.
///
/// A class belongs to at most one service at a time; membership is decided by
/// path containment against `path`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Microservice {
    /// Service name, conventionally the last segment of the root path.
    pub name: String,
    /// Root path of the service folder.
    pub path: String,
    #[serde(default)]
    pub controllers: Vec<JavaClass>,
    #[serde(default)]
    pub services: Vec<JavaClass>,
    #[serde(default)]
    pub repositories: Vec<JavaClass>,
    #[serde(default)]
    pub entities: Vec<JavaClass>,
    #[serde(default)]
    pub feign_clients: Vec<JavaClass>,
    #[serde(default)]
    pub files: Vec<ConfigFile>,
}

impl Microservice {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Whether `file_path` falls under this service's root.
    #[must_use]
    pub fn contains_path(&self, file_path: &str) -> bool {
        file_path == self.path || file_path.starts_with(&format!("{}/", self.path))
    }

    /// Add a class to the bucket matching its role, re-stamping the
    /// denormalized service name on the class.
    pub fn add_class(&mut self, mut class: JavaClass) {
        class.set_microservice_name(&self.name);
        match class.class_role {
            ClassRole::Controller => self.controllers.push(class),
            ClassRole::Service => self.services.push(class),
            ClassRole::Repository | ClassRole::RepositoryRestResource => {
                self.repositories.push(class);
            }
            ClassRole::Entity => self.entities.push(class),
            ClassRole::FeignClient => self.feign_clients.push(class),
            // Unknown-role classes are dropped at extraction and never reach
            // a service.
            ClassRole::Unknown => {}
        }
    }

    /// Remove the class or configuration file at `file_path`. Absence is not
    /// an error; returns whether anything was removed.
    pub fn remove_file(&mut self, file_path: &str) -> bool {
        if let Some(pos) = self.files.iter().position(|f| f.path == file_path) {
            self.files.remove(pos);
            return true;
        }
        for bucket in [
            &mut self.controllers,
            &mut self.services,
            &mut self.repositories,
            &mut self.entities,
            &mut self.feign_clients,
        ] {
            if let Some(pos) = bucket.iter().position(|c| c.path == file_path) {
                bucket.remove(pos);
                return true;
            }
        }
        false
    }

    /// All classes across every role bucket.
    pub fn classes(&self) -> impl Iterator<Item = &JavaClass> {
        self.controllers
            .iter()
            .chain(self.services.iter())
            .chain(self.repositories.iter())
            .chain(self.entities.iter())
            .chain(self.feign_clients.iter())
    }

    /// Consume the service, yielding its classes and configuration files.
    /// Used when a service is dissolved and its contents are orphaned.
    pub fn into_contents(self) -> (Vec<JavaClass>, Vec<ConfigFile>) {
        let mut classes = self.controllers;
        classes.extend(self.services);
        classes.extend(self.repositories);
        classes.extend(self.entities);
        classes.extend(self.feign_clients);
        (classes, self.files)
    }

    /// All endpoints exposed by this service's controllers.
    pub fn endpoints(&self) -> impl Iterator<Item = &Method> {
        self.controllers.iter().flat_map(JavaClass::endpoints)
    }

    /// All outbound rest calls made anywhere in this service.
    pub fn rest_calls(&self) -> impl Iterator<Item = &MethodCall> {
        self.classes().flat_map(JavaClass::rest_calls)
    }

    /// All methods declared anywhere in this service.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.classes().flat_map(|c| c.methods.iter())
    }

    /// All call sites recorded anywhere in this service.
    pub fn method_calls(&self) -> impl Iterator<Item = &MethodCall> {
        self.classes().flat_map(|c| c.method_calls.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str, path: &str, role: ClassRole) -> JavaClass {
        JavaClass {
            name: name.to_string(),
            path: path.to_string(),
            package_name: "com.example".to_string(),
            class_role: role,
            methods: Vec::new(),
            fields: Vec::new(),
            annotations: Vec::new(),
            method_calls: Vec::new(),
            implemented_types: Vec::new(),
        }
    }

    #[test]
    fn add_class_buckets_by_role() {
        let mut service = Microservice::new("users", "/users");
        service.add_class(class("UserController", "/users/a.java", ClassRole::Controller));
        service.add_class(class("UserRepository", "/users/b.java", ClassRole::Repository));
        service.add_class(class(
            "OrderResource",
            "/users/c.java",
            ClassRole::RepositoryRestResource,
        ));

        assert_eq!(service.controllers.len(), 1);
        assert_eq!(service.repositories.len(), 2);
        assert_eq!(service.classes().count(), 3);
    }

    #[test]
    fn contains_path_requires_segment_boundary() {
        let service = Microservice::new("users", "/users");
        assert!(service.contains_path("/users/src/Main.java"));
        assert!(!service.contains_path("/users-archive/src/Main.java"));
    }

    #[test]
    fn remove_file_is_quiet_on_absent_paths() {
        let mut service = Microservice::new("users", "/users");
        service.add_class(class("UserController", "/users/a.java", ClassRole::Controller));

        assert!(service.remove_file("/users/a.java"));
        assert!(!service.remove_file("/users/a.java"));
        assert!(service.controllers.is_empty());
    }
}
