use crate::analyzer::{strip_quotes, CallSite, JavaUnit};
use archmap_model::{HttpMethod, Route};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use tree_sitter::Node;

/// Method-level routing annotations that promote a method to an endpoint.
pub const ENDPOINT_ANNOTATIONS: [&str; 6] = [
    "RequestMapping",
    "GetMapping",
    "PutMapping",
    "PostMapping",
    "DeleteMapping",
    "PatchMapping",
];

/// Receiver types recognized as HTTP clients.
pub const REST_CLIENT_TYPES: [&str; 4] = [
    "RestTemplate",
    "OAuth2RestOperations",
    "OAuth2RestTemplate",
    "WebClient",
];

/// Invoked names recognized as HTTP-client calls.
pub const REST_CLIENT_METHODS: [&str; 10] = [
    "getForObject",
    "postForObject",
    "patchForObject",
    "put",
    "delete",
    "exchange",
    "get",
    "post",
    "options",
    "patch",
];

/// Placeholder every path variable normalizes to; the unit of URL comparison.
pub const PATH_VARIABLE: &str = "{?}";

static BRACE_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^{}]*\}").unwrap());
static QUOTED_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]*/[^"]+)""#).unwrap());
static FORMAT_SPECIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"%[sdif]").unwrap());

/// Normalize every embedded `{name}` segment to the `{?}` placeholder.
/// Idempotent: normalizing an already-normalized URL is a no-op.
#[must_use]
pub fn simplify_url(url: &str) -> String {
    BRACE_SEGMENT.replace_all(url, PATH_VARIABLE).into_owned()
}

/// Strip scheme and authority from a resolved call URL, plus stray trailing
/// quotes and slashes, so only the path template remains for comparison.
#[must_use]
pub(crate) fn clean_url(url: &str) -> String {
    let mut s = url.replace("http://", "").replace("https://", "");
    if let Some(idx) = s.find('/') {
        if idx > 0 {
            s = s[idx..].to_string();
        }
    }
    if s.ends_with('"') {
        s.pop();
    }
    if s.ends_with('/') {
        s.pop();
    }
    s
}

/// Join a class-level prefix and a method-level path into one normalized
/// route: each non-empty segment gains a leading `/`, consecutive slashes
/// collapse, and a trailing slash is dropped (a bare `/` survives).
#[must_use]
pub(crate) fn join_route_paths(prefix: &str, path: &str) -> String {
    let mut combined = String::new();
    for segment in [prefix, path] {
        if segment.is_empty() {
            continue;
        }
        if !segment.starts_with('/') {
            combined.push('/');
        }
        combined.push_str(segment);
    }
    if combined.is_empty() {
        return "/".to_string();
    }
    while combined.contains("//") {
        combined = combined.replace("//", "/");
    }
    if combined.len() > 1 && combined.ends_with('/') {
        combined.pop();
    }
    combined
}

/// Verb implied by a shorthand mapping annotation name or a
/// `RequestMethod.X` attribute value.
#[must_use]
pub(crate) fn verb_from_mapping(name: &str) -> HttpMethod {
    match name {
        "GetMapping" | "RequestMethod.GET" => HttpMethod::Get,
        "PostMapping" | "RequestMethod.POST" => HttpMethod::Post,
        "DeleteMapping" | "RequestMethod.DELETE" => HttpMethod::Delete,
        "PutMapping" | "RequestMethod.PUT" => HttpMethod::Put,
        "PatchMapping" | "RequestMethod.PATCH" => HttpMethod::Patch,
        _ => HttpMethod::All,
    }
}

/// Resolve the route of a method carrying a routing annotation, combining
/// the class-level mapping prefix (if any) with the method-level path.
pub(crate) fn resolve_endpoint_route(
    unit: &JavaUnit,
    class_mapping: Option<Node>,
    method_annotation: Node,
) -> Route {
    let prefix = class_mapping
        .and_then(|node| unit.annotation_path_value(node, &["path", "value"]))
        .unwrap_or_default();
    let path = unit
        .annotation_path_value(method_annotation, &["path", "value"])
        .unwrap_or_default();

    let mut verb = unit
        .annotation_named_value(method_annotation, &["method"])
        .map(|value| verb_from_mapping(&value))
        .unwrap_or(HttpMethod::All);
    if verb == HttpMethod::All {
        verb = verb_from_mapping(&unit.annotation_name(method_annotation));
    }

    Route::new(simplify_url(&join_route_paths(&prefix, &path)), verb)
}

/// Resolve the route of a call made through a recognized HTTP client.
/// Returns `None` when no URL text can be traced, in which case the call
/// stays a plain call.
pub(crate) fn resolve_rest_call_route(unit: &JavaUnit, call: &CallSite) -> Option<Route> {
    let verb = match call.name.as_str() {
        "getForObject" | "get" => HttpMethod::Get,
        "postForObject" | "post" => HttpMethod::Post,
        "patchForObject" | "patch" => HttpMethod::Patch,
        "put" => HttpMethod::Put,
        "delete" => HttpMethod::Delete,
        "exchange" => exchange_verb(&call.argument_contents),
        _ => HttpMethod::None,
    };

    // A fluent client resolves its path from the enclosing call's first
    // argument rather than its own.
    let url_argument = if call.object_type == "WebClient" {
        call.node
            .parent()
            .filter(|parent| parent.kind() == "method_invocation")
            .and_then(first_argument)
    } else {
        first_argument(call.node)
    };

    let raw = url_argument
        .map(|argument| clean_url(&trace_url_expression(unit, argument)))
        .unwrap_or_default();
    let url = simplify_url(&raw);
    if url.is_empty() {
        return None;
    }
    Some(Route::new(url, verb))
}

/// The verb of a generic `exchange(...)` call, read out of its argument
/// text. GET when no explicit verb is present.
fn exchange_verb(arguments: &str) -> HttpMethod {
    if arguments.contains("HttpMethod.POST") {
        HttpMethod::Post
    } else if arguments.contains("HttpMethod.PUT") {
        HttpMethod::Put
    } else if arguments.contains("HttpMethod.DELETE") {
        HttpMethod::Delete
    } else if arguments.contains("HttpMethod.PATCH") {
        HttpMethod::Patch
    } else {
        HttpMethod::Get
    }
}

fn first_argument(invocation: Node) -> Option<Node> {
    let arguments = invocation.child_by_field_name("arguments")?;
    let mut cursor = arguments.walk();
    let children: Vec<_> = arguments.children(&mut cursor).collect();
    children.into_iter().find(|c| c.is_named())
}

/// Trace URL text out of an argument expression.
///
/// String literals pass through; `+` concatenations recurse on both sides;
/// parenthesized expressions recurse through; nested calls fall back to a
/// regex scan of their text; a bare name resolves through a same-class field
/// initializer when one exists, except names that already denote a full
/// URI/URL, which contribute nothing.
fn trace_url_expression(unit: &JavaUnit, node: Node) -> String {
    match node.kind() {
        "string_literal" => strip_quotes(unit.text(node)).to_string(),
        "binary_expression" => {
            let left = node
                .child_by_field_name("left")
                .map(|n| trace_url_expression(unit, n))
                .unwrap_or_default();
            let right = node
                .child_by_field_name("right")
                .map(|n| trace_url_expression(unit, n))
                .unwrap_or_default();
            format!("{left}{right}")
        }
        "parenthesized_expression" => {
            let mut cursor = node.walk();
            let inner = node.children(&mut cursor).find(|c| c.is_named());
            inner
                .map(|n| trace_url_expression(unit, n))
                .unwrap_or_default()
        }
        "method_invocation" => {
            let fallback = fallback_url(unit.text(node));
            if fallback.is_empty() {
                PATH_VARIABLE.to_string()
            } else {
                fallback
            }
        }
        "identifier" => {
            let name = unit.text(node);
            let lowered = name.to_lowercase();
            if lowered.contains("uri") || lowered.contains("url") {
                // Already a full URI; contributes no literal path text.
                return String::new();
            }
            unit.field_initializer(name)
                .unwrap_or_else(|| PATH_VARIABLE.to_string())
        }
        "field_access" => {
            let field = node
                .child_by_field_name("field")
                .map(|n| unit.text(n))
                .unwrap_or_default();
            unit.field_initializer(field).unwrap_or_default()
        }
        _ => fallback_url(unit.text(node)),
    }
}

/// Regex fallback over raw expression text: the first quoted substring
/// containing a path, with printf-style format specifiers replaced by the
/// path-variable placeholder.
fn fallback_url(text: &str) -> String {
    let Some(captures) = QUOTED_PATH.captures(text) else {
        return String::new();
    };
    let quoted = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    let substituted = FORMAT_SPECIFIER.replace_all(quoted, PATH_VARIABLE);
    clean_url(&substituted)
}

/// Default-route table for data-access classes auto-exposed as HTTP
/// resources.
///
/// Methods in the conventional CRUD set map to the collection root instead
/// of the `/search/<name>` namespace. The exact convention table of the
/// target framework is only partially observable from source, so it is data
/// here, not code; swap it via [`RestResourceDefaults::with_crud_methods`].
#[derive(Debug, Clone)]
pub struct RestResourceDefaults {
    crud_methods: BTreeSet<String>,
}

impl Default for RestResourceDefaults {
    fn default() -> Self {
        Self::with_crud_methods([
            "findAll",
            "findById",
            "save",
            "delete",
            "deleteById",
            "count",
            "existsById",
        ])
    }
}

impl RestResourceDefaults {
    pub fn with_crud_methods<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            crud_methods: methods.into_iter().map(Into::into).collect(),
        }
    }

    /// Default URL suffix for an exposed method with no explicit path:
    /// the collection root for conventional CRUD names, `/search/<name>`
    /// for everything else.
    #[must_use]
    pub fn default_suffix(&self, method_name: &str) -> String {
        if self.crud_methods.contains(method_name) {
            String::new()
        } else {
            format!("/search/{method_name}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn simplify_url_replaces_and_is_idempotent() {
        let once = simplify_url("/users/{id}/orders/{orderId}");
        assert_eq!(once, "/users/{?}/orders/{?}");
        assert_eq!(simplify_url(&once), once);
    }

    #[test]
    fn join_route_paths_normalizes_slashes() {
        assert_eq!(join_route_paths("users", "{id}"), "/users/{id}");
        assert_eq!(join_route_paths("/users/", "/{id}"), "/users/{id}");
        assert_eq!(join_route_paths("", ""), "/");
        assert_eq!(join_route_paths("/", ""), "/");
        assert_eq!(join_route_paths("/users", ""), "/users");
    }

    #[test]
    fn clean_url_strips_scheme_and_authority() {
        assert_eq!(
            clean_url("http://orders-service/api/orders/{?}"),
            "/api/orders/{?}"
        );
        assert_eq!(clean_url("https://svc/api/"), "/api");
        assert_eq!(clean_url("/already/relative"), "/already/relative");
    }

    #[test]
    fn fallback_url_extracts_first_quoted_path() {
        let url = fallback_url("String.format(\"http://svc/api/%s/items\", id)");
        assert_eq!(url, "/api/{?}/items");
        assert_eq!(fallback_url("noPathHere(42)"), "");
    }

    #[test]
    fn verb_table_covers_shorthands_and_request_methods() {
        assert_eq!(verb_from_mapping("GetMapping"), HttpMethod::Get);
        assert_eq!(verb_from_mapping("RequestMethod.DELETE"), HttpMethod::Delete);
        assert_eq!(verb_from_mapping("RequestMapping"), HttpMethod::All);
    }

    #[test]
    fn rest_resource_defaults_distinguish_crud_from_search() {
        let defaults = RestResourceDefaults::default();
        assert_eq!(defaults.default_suffix("findAll"), "");
        assert_eq!(defaults.default_suffix("findByName"), "/search/findByName");

        let custom = RestResourceDefaults::with_crud_methods(["lookup"]);
        assert_eq!(custom.default_suffix("lookup"), "");
        assert_eq!(custom.default_suffix("findAll"), "/search/findAll");
    }
}
