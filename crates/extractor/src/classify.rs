use crate::analyzer::{java_parser, JavaUnit, MethodDecl};
use crate::error::Result;
use crate::file_type;
use crate::routes::{
    self, resolve_endpoint_route, resolve_rest_call_route, simplify_url, RestResourceDefaults,
    ENDPOINT_ANNOTATIONS, PATH_VARIABLE, REST_CLIENT_METHODS, REST_CLIENT_TYPES,
};
use archmap_model::{Annotation, ClassRole, HttpMethod, JavaClass, Method, MethodCall, Route};
use tree_sitter::{Node, Parser};

/// Role markers in priority order; the first table row with a matching
/// class-level annotation wins.
const ROLE_TABLE: [(&[&str], ClassRole); 6] = [
    (&["RestController", "Controller"], ClassRole::Controller),
    (&["Service"], ClassRole::Service),
    (&["Repository"], ClassRole::Repository),
    (
        &["RepositoryRestResource"],
        ClassRole::RepositoryRestResource,
    ),
    (&["Entity", "Embeddable"], ClassRole::Entity),
    (&["FeignClient"], ClassRole::FeignClient),
];

/// Determine the architectural role from class-level annotation names.
#[must_use]
pub fn classify_role(annotation_names: &[String]) -> ClassRole {
    for (markers, role) in ROLE_TABLE {
        if annotation_names.iter().any(|n| markers.contains(&n.as_str())) {
            return role;
        }
    }
    ClassRole::Unknown
}

/// Classifies source files and extracts role-tagged classes from them.
///
/// Holds one parser instance; independent files share no state beyond it, so
/// parallel extraction only needs one `Extractor` per worker.
pub struct Extractor {
    parser: Parser,
    defaults: RestResourceDefaults,
}

impl Extractor {
    pub fn new() -> Result<Self> {
        Self::with_defaults(RestResourceDefaults::default())
    }

    pub fn with_defaults(defaults: RestResourceDefaults) -> Result<Self> {
        Ok(Self {
            parser: java_parser()?,
            defaults,
        })
    }

    /// Classify one source file and extract its class, or `None` when the
    /// file contributes nothing: configuration files, unparsable sources
    /// (logged), and classes with no recognized role marker.
    pub fn classify_and_extract(
        &mut self,
        source: &str,
        path: &str,
        microservice_name: &str,
    ) -> Option<JavaClass> {
        if file_type::is_configuration_file(path) {
            log::debug!("Filtered {path}: configuration file");
            return None;
        }

        let unit = match JavaUnit::parse(&mut self.parser, source, path) {
            Ok(unit) => unit,
            Err(e) => {
                log::warn!("Failed to parse {path}: {e}");
                return None;
            }
        };

        let annotation_nodes = unit.class_annotations();
        let annotation_names: Vec<String> = annotation_nodes
            .iter()
            .map(|&node| unit.annotation_name(node))
            .collect();
        let role = classify_role(&annotation_names);
        if role == ClassRole::Unknown {
            log::debug!("Filtered {path}: class role unknown");
            return None;
        }

        let request_mapping = annotation_nodes
            .iter()
            .zip(&annotation_names)
            .find(|(_, name)| name.as_str() == "RequestMapping")
            .map(|(&node, _)| node);

        let class = match role {
            ClassRole::FeignClient => {
                self.extract_feign_client(&unit, path, request_mapping, &annotation_nodes, microservice_name)
            }
            ClassRole::RepositoryRestResource => {
                self.extract_repository_rest_resource(&unit, path, &annotation_nodes, microservice_name)
            }
            _ => self.extract_regular(&unit, path, role, request_mapping, &annotation_nodes, microservice_name),
        };
        Some(class)
    }

    fn extract_regular(
        &self,
        unit: &JavaUnit,
        path: &str,
        role: ClassRole,
        request_mapping: Option<Node>,
        annotation_nodes: &[Node],
        microservice_name: &str,
    ) -> JavaClass {
        JavaClass {
            name: unit.class_name().to_string(),
            path: path.to_string(),
            package_name: unit.package_name().to_string(),
            class_role: role,
            methods: self.parse_methods(unit, request_mapping, microservice_name),
            fields: unit.fields(),
            annotations: model_annotations(unit, annotation_nodes),
            method_calls: self.parse_method_calls(unit, microservice_name),
            implemented_types: unit.implemented_types(),
        }
    }

    /// Methods of the file, each promoted to an endpoint when it carries a
    /// routing annotation. Only the first routing annotation counts, the
    /// way the framework itself considers only the first mapping.
    fn parse_methods(
        &self,
        unit: &JavaUnit,
        request_mapping: Option<Node>,
        microservice_name: &str,
    ) -> Vec<Method> {
        unit.methods()
            .into_iter()
            .map(|decl| {
                let route = unit
                    .annotation_nodes(decl.node)
                    .into_iter()
                    .find(|&node| {
                        ENDPOINT_ANNOTATIONS.contains(&unit.annotation_name(node).as_str())
                    })
                    .map(|node| resolve_endpoint_route(unit, request_mapping, node));
                self.method_from_decl(unit, &decl, microservice_name, route)
            })
            .collect()
    }

    fn method_from_decl(
        &self,
        unit: &JavaUnit,
        decl: &MethodDecl,
        microservice_name: &str,
        route: Option<Route>,
    ) -> Method {
        Method {
            name: decl.name.clone(),
            package_and_class_name: unit.package_and_class_name(),
            parameters: decl.parameters.clone(),
            return_type: decl.return_type.clone(),
            annotations: decl.annotations.clone(),
            microservice_name: microservice_name.to_string(),
            class_name: unit.class_name().to_string(),
            route,
        }
    }

    /// Call sites of the file, each promoted to a rest call when its
    /// receiver type and invoked name match the recognized HTTP-client
    /// family and a URL can be traced.
    fn parse_method_calls(&self, unit: &JavaUnit, microservice_name: &str) -> Vec<MethodCall> {
        unit.method_calls()
            .into_iter()
            .map(|call| {
                let route = (REST_CLIENT_TYPES.contains(&call.object_type.as_str())
                    && REST_CLIENT_METHODS.contains(&call.name.as_str()))
                .then(|| resolve_rest_call_route(unit, &call))
                .flatten();
                MethodCall {
                    name: call.name,
                    package_and_class_name: unit.package_and_class_name(),
                    object_type: call.object_type,
                    object_name: call.object_name,
                    called_from: call.called_from,
                    parameter_contents: call.argument_contents,
                    microservice_name: microservice_name.to_string(),
                    class_name: unit.class_name().to_string(),
                    route,
                }
            })
            .collect()
    }

    /// A declarative remote-service client: an interface whose routed,
    /// bodiless methods are bindings to another service's endpoints. Each
    /// routed method splits into a plain method (routing annotation
    /// stripped) plus a synthesized rest call carrying the bound URL.
    fn extract_feign_client(
        &self,
        unit: &JavaUnit,
        path: &str,
        request_mapping: Option<Node>,
        annotation_nodes: &[Node],
        microservice_name: &str,
    ) -> JavaClass {
        let parsed = self.parse_methods(unit, request_mapping, microservice_name);
        let client_name = unit.class_name().to_string();
        let client_field = lower_camel(&client_name);

        let mut methods = Vec::with_capacity(parsed.len());
        let mut method_calls = Vec::new();
        for mut method in parsed {
            let Some(route) = method.route.take() else {
                methods.push(method);
                continue;
            };

            let query = feign_query_params(&method.parameters);
            method_calls.push(MethodCall {
                name: "exchange".to_string(),
                package_and_class_name: unit.package_and_class_name(),
                object_type: client_name.clone(),
                object_name: client_field.clone(),
                called_from: method.name.clone(),
                parameter_contents: String::new(),
                microservice_name: microservice_name.to_string(),
                class_name: client_name.clone(),
                route: Some(Route::new(
                    format!("{}{}", route.url, query),
                    route.http_method,
                )),
            });

            method
                .annotations
                .retain(|a| !ENDPOINT_ANNOTATIONS.contains(&a.name.as_str()));
            methods.push(method);
        }

        JavaClass {
            name: client_name,
            path: path.to_string(),
            package_name: unit.package_name().to_string(),
            class_role: ClassRole::FeignClient,
            methods,
            fields: unit.fields(),
            annotations: model_annotations(unit, annotation_nodes),
            method_calls,
            implemented_types: unit.implemented_types(),
        }
    }

    /// A data-access interface auto-exposed as HTTP resources: every
    /// exported method becomes a GET endpoint under a pluralized default
    /// prefix, with `/search/<name>` for non-CRUD finders.
    fn extract_repository_rest_resource(
        &self,
        unit: &JavaUnit,
        path: &str,
        annotation_nodes: &[Node],
        microservice_name: &str,
    ) -> JavaClass {
        let class_name = unit.class_name().to_string();
        let default_prefix = format!(
            "/{}s",
            class_name.to_lowercase().replace("repository", "")
        );
        let prefix = annotation_nodes
            .iter()
            .find(|&&node| unit.annotation_name(node) == "RepositoryRestResource")
            .and_then(|&node| unit.annotation_path_value(node, &["path", "value"]))
            .map(|p| routes::join_route_paths(&p, ""))
            .unwrap_or(default_prefix);

        let mut methods = Vec::new();
        for decl in unit.methods() {
            let rest_resource = unit
                .annotation_nodes(decl.node)
                .into_iter()
                .find(|&node| unit.annotation_name(node) == "RestResource");

            let exported = rest_resource
                .and_then(|node| unit.annotation_named_value(node, &["exported"]))
                .map(|value| value != "false")
                .unwrap_or(true);
            if !exported {
                continue;
            }

            let suffix = rest_resource
                .and_then(|node| unit.annotation_path_value(node, &["path", "value"]))
                .map(|p| routes::join_route_paths(&p, ""))
                .unwrap_or_else(|| self.defaults.default_suffix(&decl.name));

            let url = simplify_url(&routes::join_route_paths(&prefix, &suffix));
            let route = Some(Route::new(url, HttpMethod::Get));
            methods.push(self.method_from_decl(unit, &decl, microservice_name, route));
        }

        JavaClass {
            name: class_name,
            path: path.to_string(),
            package_name: unit.package_name().to_string(),
            class_role: ClassRole::RepositoryRestResource,
            methods,
            fields: unit.fields(),
            annotations: model_annotations(unit, annotation_nodes),
            method_calls: Vec::new(),
            implemented_types: unit.implemented_types(),
        }
    }
}

/// Append `?a={?}&b={?}` query placeholders for every `RequestParam`-marked
/// parameter. The annotation's explicit name beats the raw parameter name.
fn feign_query_params(parameters: &[archmap_model::Parameter]) -> String {
    let mut query = String::new();
    for parameter in parameters {
        for annotation in &parameter.annotations {
            if annotation.name != "RequestParam" {
                continue;
            }
            let name = annotation
                .attribute("default")
                .or_else(|| annotation.attribute("name"))
                .unwrap_or(&parameter.name);
            query.push(if query.is_empty() { '?' } else { '&' });
            query.push_str(name);
            query.push('=');
            query.push_str(PATH_VARIABLE);
        }
    }
    query
}

fn model_annotations(unit: &JavaUnit, nodes: &[Node]) -> Vec<Annotation> {
    nodes.iter().map(|&node| unit.annotation_model(node)).collect()
}

fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
