use archmap_extractor::Extractor;
use archmap_model::{ClassRole, HttpMethod};

fn extract(source: &str, path: &str) -> Option<archmap_model::JavaClass> {
    Extractor::new()
        .unwrap()
        .classify_and_extract(source, path, "users")
}

#[test]
fn class_prefix_and_method_path_compose_into_endpoint_url() {
    // Neither segment carries its own slash; both gain one.
    let source = "package com.example;\n\
        @RestController\n\
        @RequestMapping(\"users\")\n\
        public class UserController {\n\
            @GetMapping(\"{id}\")\n\
            public User getUser(@PathVariable String id) { return null; }\n\
        }\n";
    let class = extract(source, "/users/src/UserController.java").unwrap();
    let endpoint = class.endpoints().next().unwrap();
    assert_eq!(endpoint.url(), Some("/users/{?}"));
    assert_eq!(endpoint.http_method(), Some(HttpMethod::Get));
}

#[test]
fn outbound_concatenated_url_resolves_with_placeholder() {
    let source = "package com.example;\n\
        @Service\n\
        public class OrderLookup {\n\
            private RestTemplate restTemplate;\n\
            public Order find(String id) {\n\
                return restTemplate.getForObject(\"http://orders-service/api/orders/\" + id, Order.class);\n\
            }\n\
        }\n";
    let class = extract(source, "/users/src/OrderLookup.java").unwrap();
    let call = class.rest_calls().next().unwrap();
    assert_eq!(call.url(), Some("/api/orders/{?}"));
    assert_eq!(call.http_method(), Some(HttpMethod::Get));
}

#[test]
fn generic_request_mapping_defaults_to_wildcard_verb() {
    let source = "package com.example;\n\
        @RestController\n\
        public class PingController {\n\
            @RequestMapping(\"/ping\")\n\
            public String ping() { return \"pong\"; }\n\
        }\n";
    let class = extract(source, "/users/src/PingController.java").unwrap();
    let endpoint = class.endpoints().next().unwrap();
    assert_eq!(endpoint.url(), Some("/ping"));
    assert_eq!(endpoint.http_method(), Some(HttpMethod::All));
}

#[test]
fn request_mapping_method_attribute_sets_the_verb() {
    let source = "package com.example;\n\
        @RestController\n\
        public class UserController {\n\
            @RequestMapping(path = \"/users\", method = RequestMethod.POST)\n\
            public User create() { return null; }\n\
        }\n";
    let class = extract(source, "/users/src/UserController.java").unwrap();
    let endpoint = class.endpoints().next().unwrap();
    assert_eq!(endpoint.url(), Some("/users"));
    assert_eq!(endpoint.http_method(), Some(HttpMethod::Post));
}

#[test]
fn marker_mapping_on_bare_controller_is_the_root_route() {
    let source = "package com.example;\n\
        @RestController\n\
        public class RootController {\n\
            @GetMapping\n\
            public String index() { return \"\"; }\n\
        }\n";
    let class = extract(source, "/users/src/RootController.java").unwrap();
    let endpoint = class.endpoints().next().unwrap();
    assert_eq!(endpoint.url(), Some("/"));
}

#[test]
fn exchange_verb_is_read_from_arguments() {
    let source = "package com.example;\n\
        @Service\n\
        public class Publisher {\n\
            private RestTemplate restTemplate;\n\
            public void push(Payload payload) {\n\
                restTemplate.exchange(\"/api/events\", HttpMethod.POST, payload, Void.class);\n\
            }\n\
        }\n";
    let class = extract(source, "/users/src/Publisher.java").unwrap();
    let call = class.rest_calls().next().unwrap();
    assert_eq!(call.url(), Some("/api/events"));
    assert_eq!(call.http_method(), Some(HttpMethod::Post));
}

#[test]
fn url_from_field_initializer_resolves() {
    let source = "package com.example;\n\
        @Service\n\
        public class InventoryClient {\n\
            private static final String INVENTORY_PATH = \"/api/inventory\";\n\
            private RestTemplate restTemplate;\n\
            public Stock load() {\n\
                return restTemplate.getForObject(INVENTORY_PATH, Stock.class);\n\
            }\n\
        }\n";
    let class = extract(source, "/users/src/InventoryClient.java").unwrap();
    let call = class.rest_calls().next().unwrap();
    assert_eq!(call.url(), Some("/api/inventory"));
}

#[test]
fn unresolvable_url_keeps_the_call_unpromoted() {
    let source = "package com.example;\n\
        @Service\n\
        public class OpaqueClient {\n\
            private RestTemplate restTemplate;\n\
            public Object load(String fullUrl) {\n\
                return restTemplate.getForObject(fullUrl, Object.class);\n\
            }\n\
        }\n";
    let class = extract(source, "/users/src/OpaqueClient.java").unwrap();
    // The receiver is a known client but no URL text can be traced: the
    // name denotes an already-absolute URL and contributes nothing.
    assert_eq!(class.rest_calls().count(), 0);
    assert_eq!(class.method_calls.len(), 1);
}

#[test]
fn unknown_receiver_calls_are_retained_but_never_promoted() {
    let source = "package com.example;\n\
        @Service\n\
        public class Loosely {\n\
            public void run() {\n\
                helper.getForObject(\"/api/x\", Object.class);\n\
            }\n\
        }\n";
    let class = extract(source, "/users/src/Loosely.java").unwrap();
    assert_eq!(class.method_calls.len(), 1);
    assert_eq!(class.method_calls[0].object_type, "");
    assert_eq!(class.rest_calls().count(), 0);
}

#[test]
fn web_client_fluent_chain_resolves_from_enclosing_call() {
    let source = "package com.example;\n\
        @Service\n\
        public class OrderStream {\n\
            private WebClient webClient;\n\
            public Flux<Order> stream(String id) {\n\
                return webClient.get().uri(\"/api/orders/\" + id).retrieve();\n\
            }\n\
        }\n";
    let class = extract(source, "/users/src/OrderStream.java").unwrap();
    let call = class.rest_calls().next().unwrap();
    assert_eq!(call.name, "get");
    assert_eq!(call.url(), Some("/api/orders/{?}"));
    assert_eq!(call.http_method(), Some(HttpMethod::Get));
}

#[test]
fn nested_format_call_falls_back_to_quoted_path() {
    let source = "package com.example;\n\
        @Service\n\
        public class ReportClient {\n\
            private RestTemplate restTemplate;\n\
            public Report fetch(int year) {\n\
                return restTemplate.getForObject(String.format(\"http://reports/api/reports/%d\", year), Report.class);\n\
            }\n\
        }\n";
    let class = extract(source, "/users/src/ReportClient.java").unwrap();
    let call = class.rest_calls().next().unwrap();
    assert_eq!(call.url(), Some("/api/reports/{?}"));
}

#[test]
fn entity_classes_extract_without_routes() {
    let source = "package com.example;\n\
        @Entity\n\
        public class User {\n\
            private String id;\n\
            private String name;\n\
        }\n";
    let class = extract(source, "/users/src/User.java").unwrap();
    assert_eq!(class.class_role, ClassRole::Entity);
    assert_eq!(class.fields.len(), 2);
    assert_eq!(class.endpoints().count(), 0);
}
