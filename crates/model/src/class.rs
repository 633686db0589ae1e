use crate::types::{Annotation, ClassRole, Field, HttpMethod, Parameter, Route};
use serde::{Deserialize, Serialize};

/// A method declaration extracted from a class.
///
/// Identity is `(owning class, name)`; overloads are not disambiguated. When
/// the optional routing payload is present the method is an endpoint exposed
/// on an HTTP route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    pub name: String,
    pub package_and_class_name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub return_type: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    pub microservice_name: String,
    pub class_name: String,
    /// Present only on endpoints; flattened so the serialized form carries a
    /// plain `url` field that deserialization branches on. A `None` route
    /// contributes no fields at all.
    #[serde(flatten)]
    pub route: Option<Route>,
}

impl Method {
    /// Whether this method is exposed on an HTTP route.
    #[must_use]
    pub const fn is_endpoint(&self) -> bool {
        self.route.is_some()
    }

    /// Resolved URL template, if this method is an endpoint.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.route.as_ref().map(|r| r.url.as_str())
    }

    /// Resolved HTTP verb, if this method is an endpoint.
    #[must_use]
    pub fn http_method(&self) -> Option<HttpMethod> {
        self.route.as_ref().map(|r| r.http_method)
    }
}

/// A call expression found inside a method body.
///
/// When the optional routing payload is present the call is an outbound rest
/// call made through a recognized HTTP-client object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodCall {
    /// Name of the invoked method.
    pub name: String,
    pub package_and_class_name: String,
    /// Best-effort resolved type of the receiver; empty when unknown.
    pub object_type: String,
    /// Name of the variable or field the call is made through.
    pub object_name: String,
    /// Name of the enclosing method.
    pub called_from: String,
    /// Raw argument text, comma-joined.
    pub parameter_contents: String,
    pub microservice_name: String,
    pub class_name: String,
    #[serde(flatten)]
    pub route: Option<Route>,
}

impl MethodCall {
    /// Whether this call targets an HTTP endpoint through a known client.
    #[must_use]
    pub const fn is_rest_call(&self) -> bool {
        self.route.is_some()
    }

    /// Resolved URL template, if this call is a rest call.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.route.as_ref().map(|r| r.url.as_str())
    }

    /// Resolved HTTP verb, if this call is a rest call.
    #[must_use]
    pub fn http_method(&self) -> Option<HttpMethod> {
        self.route.as_ref().map(|r| r.http_method)
    }
}

/// A role-tagged class extracted from one source file. Identity is the file
/// path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaClass {
    pub name: String,
    pub path: String,
    pub package_name: String,
    pub class_role: ClassRole,
    #[serde(default)]
    pub methods: Vec<Method>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub method_calls: Vec<MethodCall>,
    /// Simple names of implemented interfaces.
    #[serde(default)]
    pub implemented_types: Vec<String>,
}

impl JavaClass {
    /// Methods exposed as endpoints.
    pub fn endpoints(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter().filter(|m| m.is_endpoint())
    }

    /// Calls promoted to rest calls.
    pub fn rest_calls(&self) -> impl Iterator<Item = &MethodCall> {
        self.method_calls.iter().filter(|c| c.is_rest_call())
    }

    /// Re-stamp the denormalized owning-service name on the class and every
    /// method and call it holds. This is the only mutation applied to a class
    /// after extraction, when it moves between the orphan pool and a service.
    pub fn set_microservice_name(&mut self, name: &str) {
        for method in &mut self.methods {
            method.microservice_name = name.to_string();
        }
        for call in &mut self.method_calls {
            call.microservice_name = name.to_string();
        }
    }
}

/// An opaque configuration file record. Conversion of the underlying format
/// is delegated to external tooling; the core only tracks that the file
/// exists and is classified as configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub path: String,
    pub name: String,
    /// Structured representation produced by an external converter, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ConfigFile {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            data: None,
        }
    }
}

/// Any file tracked by the model: a role-tagged class or a configuration
/// file. The `fileType` tag is the persisted discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "fileType")]
pub enum ProjectFile {
    #[serde(rename = "JCLASS")]
    Class(JavaClass),
    #[serde(rename = "CONFIG")]
    Config(ConfigFile),
}

impl ProjectFile {
    /// Path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Class(class) => &class.path,
            Self::Config(config) => &config.path,
        }
    }

    /// The class payload, if this is a class record.
    #[must_use]
    pub const fn as_class(&self) -> Option<&JavaClass> {
        match self {
            Self::Class(class) => Some(class),
            Self::Config(_) => None,
        }
    }

    /// The configuration payload, if this is a configuration record.
    #[must_use]
    pub const fn as_config(&self) -> Option<&ConfigFile> {
        match self {
            Self::Class(_) => None,
            Self::Config(config) => Some(config),
        }
    }
}
