use archmap_model::{Field, Flow, JavaClass, Method, MethodCall, MicroserviceSystem};

/// Trace every request flow in the system.
///
/// One flow is seeded per controller endpoint, then pushed down two layers
/// with the same three-step pattern: find the calls made from the current
/// method, resolve the field each call goes through, and resolve the classes
/// that field's type may refer to. Interface-based polymorphism can produce
/// several candidate classes; every candidate continues as its own branch,
/// a deliberate over-approximation. A branch that stops resolving is kept as
/// a partial flow, so every returned flow is a valid prefix of the full
/// controller → service → repository chain.
#[must_use]
pub fn build_flows(system: &MicroserviceSystem) -> Vec<Flow<'_>> {
    let mut flows = Vec::new();
    for microservice in &system.microservices {
        for controller in &microservice.controllers {
            for endpoint in controller.endpoints() {
                let seed = Flow::seeded(microservice, controller, endpoint);
                extend_into_services(seed, &mut flows);
            }
        }
    }
    log::info!("Traced {} request flows", flows.len());
    flows
}

fn extend_into_services<'a>(seed: Flow<'a>, flows: &mut Vec<Flow<'a>>) {
    let controller = seed.controller.expect("seeded flow has a controller");
    let endpoint = seed.controller_endpoint.expect("seeded flow has an endpoint");
    let microservice = seed.microservice.expect("seeded flow has a service");

    let calls = calls_from(controller, &endpoint.name);
    if calls.is_empty() {
        flows.push(seed);
        return;
    }

    for call in calls {
        let mut flow = seed.clone();
        flow.service_method_call = Some(call);

        let Some(field) = field_named(controller, &call.object_name) else {
            flows.push(flow);
            continue;
        };
        flow.controller_service_field = Some(field);

        let candidates = classes_for_type(&microservice.services, &field.type_name);
        if candidates.is_empty() {
            flows.push(flow);
            continue;
        }
        for service_class in candidates {
            let mut branch = flow.clone();
            branch.service = Some(service_class);

            let Some(method) = method_named(service_class, &call.name) else {
                flows.push(branch);
                continue;
            };
            branch.service_method = Some(method);
            extend_into_repositories(branch, service_class, method, flows);
        }
    }
}

fn extend_into_repositories<'a>(
    seed: Flow<'a>,
    service_class: &'a JavaClass,
    service_method: &'a Method,
    flows: &mut Vec<Flow<'a>>,
) {
    let microservice = seed.microservice.expect("flow has a service");

    let calls = calls_from(service_class, &service_method.name);
    if calls.is_empty() {
        flows.push(seed);
        return;
    }

    for call in calls {
        let mut flow = seed.clone();
        flow.repository_method_call = Some(call);

        let Some(field) = field_named(service_class, &call.object_name) else {
            flows.push(flow);
            continue;
        };
        flow.service_repository_field = Some(field);

        let candidates = classes_for_type(&microservice.repositories, &field.type_name);
        if candidates.is_empty() {
            flows.push(flow);
            continue;
        }
        for repository in candidates {
            let mut branch = flow.clone();
            branch.repository = Some(repository);
            branch.repository_method = method_named(repository, &call.name);
            flows.push(branch);
        }
    }
}

/// Calls made from inside the named method.
fn calls_from<'a>(class: &'a JavaClass, method_name: &str) -> Vec<&'a MethodCall> {
    class
        .method_calls
        .iter()
        .filter(|call| call.called_from == method_name)
        .collect()
}

fn field_named<'a>(class: &'a JavaClass, name: &str) -> Option<&'a Field> {
    class.fields.iter().find(|field| field.name == name)
}

fn method_named<'a>(class: &'a JavaClass, name: &str) -> Option<&'a Method> {
    class.methods.iter().find(|method| method.name == name)
}

/// Classes a declared field type may resolve to at runtime: a class whose
/// own name matches, or one implementing an interface of that name.
fn classes_for_type<'a>(bucket: &'a [JavaClass], type_name: &str) -> Vec<&'a JavaClass> {
    bucket
        .iter()
        .filter(|class| {
            class.name == type_name || class.implemented_types.iter().any(|t| t == type_name)
        })
        .collect()
}
