use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// HTTP verb carried by endpoints and outbound rest calls.
///
/// `All` is the wildcard produced by a generic route mapping with no explicit
/// verb attribute; `None` marks a call whose verb could not be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    All,
    None,
}

impl HttpMethod {
    /// Wire/display name of the verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
            Self::All => "ALL",
            Self::None => "NONE",
        }
    }
}

/// Architectural role a class plays inside its service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassRole {
    /// Entry point exposing HTTP routes.
    Controller,
    /// Business logic, typically called by controllers.
    Service,
    /// Persistence operations.
    Repository,
    /// Data-access interface auto-exposed as HTTP resources by convention.
    RepositoryRestResource,
    /// Domain entity.
    Entity,
    /// Declarative proxy for another service's HTTP endpoints.
    FeignClient,
    /// No recognized role marker; such classes never enter the model.
    Unknown,
}

/// A declaration-level annotation with its string-literal attributes.
///
/// Attribute values that are not string literals are dropped at extraction
/// time; a single positional literal is stored under the key `"default"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub name: String,
    pub package_and_class_name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Annotation {
    pub fn new(name: impl Into<String>, package_and_class_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package_and_class_name: package_and_class_name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Look up a string attribute by key.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// A declared field of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub package_and_class_name: String,
    /// Declared type, by simple name (e.g. `UserService`).
    #[serde(rename = "type")]
    pub type_name: String,
}

/// A method parameter with its own annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub package_and_class_name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// Routing payload that promotes a `Method` to an endpoint or a `MethodCall`
/// to a rest call. Persisted forms flatten this into the owner, so the
/// presence of a `url` key is what distinguishes the richer variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub url: String,
    pub http_method: HttpMethod,
}

impl Route {
    pub fn new(url: impl Into<String>, http_method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            http_method,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_method_serializes_uppercase() {
        let json = serde_json::to_string(&HttpMethod::Get).unwrap();
        assert_eq!(json, "\"GET\"");
        let back: HttpMethod = serde_json::from_str("\"PATCH\"").unwrap();
        assert_eq!(back, HttpMethod::Patch);
    }

    #[test]
    fn class_role_round_trips() {
        let json = serde_json::to_string(&ClassRole::RepositoryRestResource).unwrap();
        assert_eq!(json, "\"REPOSITORY_REST_RESOURCE\"");
        let back: ClassRole = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ClassRole::RepositoryRestResource);
    }

    #[test]
    fn annotation_attribute_lookup() {
        let mut annotation = Annotation::new("RequestParam", "com.example.UserController");
        annotation
            .attributes
            .insert("name".to_string(), "id".to_string());
        assert_eq!(annotation.attribute("name"), Some("id"));
        assert_eq!(annotation.attribute("missing"), None);
    }
}
