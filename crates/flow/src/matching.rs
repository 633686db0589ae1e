use archmap_model::{HttpMethod, Method, MethodCall, MicroserviceSystem};
use serde::Serialize;

/// A resolved cross-service dependency: one rest call matched to one
/// endpoint of another service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEdge {
    /// Service making the call.
    pub source: String,
    /// Service exposing the endpoint.
    pub target: String,
    /// The endpoint's normalized URL template.
    pub url: String,
    /// The call's verb.
    pub http_method: HttpMethod,
}

/// Split a normalized URL at the first real query separator. The `{?}`
/// path-variable placeholder contains a question mark that is not one.
#[must_use]
pub fn split_query(url: &str) -> (&str, Option<&str>) {
    let bytes = url.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'?' {
            continue;
        }
        let inside_placeholder =
            i > 0 && bytes[i - 1] == b'{' && i + 1 < bytes.len() && bytes[i + 1] == b'}';
        if !inside_placeholder {
            return (&url[..i], Some(&url[i + 1..]));
        }
    }
    (url, None)
}

/// Whether a rest call targets a given endpoint.
///
/// The two must live in different services (a same-service call is not a
/// cross-service edge), their URLs must be equal once the call's query
/// string is cut off, the verbs must agree (the wildcard endpoint verb
/// accepts anything), and every required query parameter the endpoint
/// declares must appear in the call's query string.
#[must_use]
pub fn match_endpoint(rest_call: &MethodCall, endpoint: &Method) -> bool {
    if rest_call.microservice_name == endpoint.microservice_name {
        return false;
    }
    let (Some(call_url), Some(endpoint_url)) = (rest_call.url(), endpoint.url()) else {
        return false;
    };
    let (base, query) = split_query(call_url);
    if base != endpoint_url {
        return false;
    }
    let verb_matches = endpoint.http_method() == Some(HttpMethod::All)
        || rest_call.http_method() == endpoint.http_method();
    verb_matches && query_params_match(endpoint, query)
}

/// Every `RequestParam`-annotated endpoint parameter that is required must
/// have a `name=` token in the call's query substring. The annotation's
/// explicit name beats the raw parameter name; a named parameter marked
/// `required = false` is exempt.
fn query_params_match(endpoint: &Method, query: Option<&str>) -> bool {
    for parameter in &endpoint.parameters {
        for annotation in &parameter.annotations {
            if annotation.name != "RequestParam" {
                continue;
            }
            let expected = if let Some(positional) = annotation.attribute("default") {
                positional
            } else if let Some(name) = annotation.attribute("name") {
                if annotation.attribute("required") == Some("false") {
                    continue;
                }
                name
            } else {
                &parameter.name
            };
            let token = format!("{expected}=");
            if !query.is_some_and(|q| q.contains(&token)) {
                return false;
            }
        }
    }
    true
}

/// Match every rest call in the system against every endpoint of every
/// other service. All matches are kept: static analysis cannot always pick
/// a single callee, and a multi-match is a first-class result.
#[must_use]
pub fn build_service_edges(system: &MicroserviceSystem) -> Vec<ServiceEdge> {
    let mut edges = Vec::new();
    for caller in &system.microservices {
        for rest_call in caller.rest_calls() {
            for callee in &system.microservices {
                if callee.name == caller.name {
                    continue;
                }
                for endpoint in callee.endpoints() {
                    if match_endpoint(rest_call, endpoint) {
                        edges.push(ServiceEdge {
                            source: caller.name.clone(),
                            target: callee.name.clone(),
                            url: endpoint.url().unwrap_or_default().to_string(),
                            http_method: rest_call.http_method().unwrap_or(HttpMethod::None),
                        });
                    }
                }
            }
        }
    }
    log::info!("Matched {} cross-service edges", edges.len());
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use archmap_model::{Annotation, Parameter, Route};
    use pretty_assertions::assert_eq;

    fn endpoint(service: &str, url: &str, verb: HttpMethod) -> Method {
        Method {
            name: "handler".to_string(),
            package_and_class_name: "com.example.Controller".to_string(),
            parameters: Vec::new(),
            return_type: "String".to_string(),
            annotations: Vec::new(),
            microservice_name: service.to_string(),
            class_name: "Controller".to_string(),
            route: Some(Route::new(url, verb)),
        }
    }

    fn rest_call(service: &str, url: &str, verb: HttpMethod) -> MethodCall {
        MethodCall {
            name: "getForObject".to_string(),
            package_and_class_name: "com.example.Caller".to_string(),
            object_type: "RestTemplate".to_string(),
            object_name: "restTemplate".to_string(),
            called_from: "run".to_string(),
            parameter_contents: String::new(),
            microservice_name: service.to_string(),
            class_name: "Caller".to_string(),
            route: Some(Route::new(url, verb)),
        }
    }

    fn query_param(name_attr: Option<(&str, &str)>, param_name: &str) -> Parameter {
        let mut annotation = Annotation::new("RequestParam", "com.example.Controller");
        if let Some((key, value)) = name_attr {
            annotation
                .attributes
                .insert(key.to_string(), value.to_string());
        }
        Parameter {
            name: param_name.to_string(),
            package_and_class_name: "com.example.Controller".to_string(),
            type_name: "String".to_string(),
            annotations: vec![annotation],
        }
    }

    #[test]
    fn split_query_ignores_placeholder_question_marks() {
        assert_eq!(split_query("/api/orders/{?}"), ("/api/orders/{?}", None));
        assert_eq!(
            split_query("/api/orders/{?}?expand={?}"),
            ("/api/orders/{?}", Some("expand={?}"))
        );
    }

    #[test]
    fn equal_urls_across_services_match() {
        let call = rest_call("users", "/api/orders/{?}", HttpMethod::Get);
        let target = endpoint("orders", "/api/orders/{?}", HttpMethod::Get);
        assert!(match_endpoint(&call, &target));
    }

    #[test]
    fn same_service_never_matches() {
        let call = rest_call("orders", "/api/orders/{?}", HttpMethod::Get);
        let target = endpoint("orders", "/api/orders/{?}", HttpMethod::Get);
        assert!(!match_endpoint(&call, &target));
    }

    #[test]
    fn wildcard_endpoint_verb_accepts_any_call_verb() {
        let call = rest_call("users", "/api/orders", HttpMethod::Post);
        let target = endpoint("orders", "/api/orders", HttpMethod::All);
        assert!(match_endpoint(&call, &target));

        let strict = endpoint("orders", "/api/orders", HttpMethod::Get);
        assert!(!match_endpoint(&call, &strict));
    }

    #[test]
    fn required_query_param_must_appear_in_call() {
        let call = rest_call("users", "/api/orders?expand={?}", HttpMethod::Get);
        let mut target = endpoint("orders", "/api/orders", HttpMethod::Get);
        target.parameters = vec![query_param(Some(("name", "expand")), "e")];
        assert!(match_endpoint(&call, &target));

        let bare = rest_call("users", "/api/orders", HttpMethod::Get);
        assert!(!match_endpoint(&bare, &target));
    }

    #[test]
    fn optional_query_param_may_be_absent() {
        let bare = rest_call("users", "/api/orders", HttpMethod::Get);
        let mut target = endpoint("orders", "/api/orders", HttpMethod::Get);
        let mut annotation = Annotation::new("RequestParam", "com.example.Controller");
        annotation
            .attributes
            .insert("name".to_string(), "expand".to_string());
        annotation
            .attributes
            .insert("required".to_string(), "false".to_string());
        target.parameters = vec![Parameter {
            name: "expand".to_string(),
            package_and_class_name: "com.example.Controller".to_string(),
            type_name: "String".to_string(),
            annotations: vec![annotation],
        }];
        assert!(match_endpoint(&bare, &target));
    }

    #[test]
    fn unannotated_parameter_name_is_the_expected_token() {
        let call = rest_call("users", "/api/orders?page={?}", HttpMethod::Get);
        let mut target = endpoint("orders", "/api/orders", HttpMethod::Get);
        target.parameters = vec![query_param(None, "page")];
        assert!(match_endpoint(&call, &target));
    }
}
