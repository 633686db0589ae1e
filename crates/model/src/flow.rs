use crate::class::{JavaClass, Method, MethodCall};
use crate::service::Microservice;
use crate::types::Field;
use serde::Serialize;

/// One resolved (possibly partial) request path from a controller endpoint
/// down through business logic to data access.
///
/// Flows are ephemeral: they borrow from a system snapshot, are recomputed on
/// demand, and are never persisted with the model. Every link is optional
/// except the seed (service, controller, endpoint); resolution only ever adds
/// links, it never retracts one, so any flow is a valid prefix of the full
/// controller → service → repository chain.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Flow<'a> {
    pub microservice: Option<&'a Microservice>,
    pub controller: Option<&'a JavaClass>,
    pub controller_endpoint: Option<&'a Method>,
    pub service_method_call: Option<&'a MethodCall>,
    pub controller_service_field: Option<&'a Field>,
    pub service: Option<&'a JavaClass>,
    pub service_method: Option<&'a Method>,
    pub repository_method_call: Option<&'a MethodCall>,
    pub service_repository_field: Option<&'a Field>,
    pub repository: Option<&'a JavaClass>,
    pub repository_method: Option<&'a Method>,
}

impl<'a> Flow<'a> {
    /// Seed a flow at an endpoint of a controller.
    #[must_use]
    pub fn seeded(
        microservice: &'a Microservice,
        controller: &'a JavaClass,
        endpoint: &'a Method,
    ) -> Self {
        Self {
            microservice: Some(microservice),
            controller: Some(controller),
            controller_endpoint: Some(endpoint),
            ..Self::default()
        }
    }

    /// Names-only view of the chain, for reporting.
    #[must_use]
    pub fn summary(&self) -> FlowSummary {
        fn name_of<T, F: Fn(&T) -> &str>(value: Option<&T>, f: F) -> String {
            value.map(f).unwrap_or_default().to_string()
        }
        FlowSummary {
            microservice: name_of(self.microservice, |m| &m.name),
            controller: name_of(self.controller, |c| &c.name),
            controller_endpoint: name_of(self.controller_endpoint, |m| &m.name),
            service_method_call: name_of(self.service_method_call, |c| &c.name),
            service: name_of(self.service, |c| &c.name),
            service_method: name_of(self.service_method, |m| &m.name),
            repository_method_call: name_of(self.repository_method_call, |c| &c.name),
            repository: name_of(self.repository, |c| &c.name),
            repository_method: name_of(self.repository_method, |m| &m.name),
        }
    }
}

/// Owned, names-only projection of a [`Flow`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSummary {
    pub microservice: String,
    pub controller: String,
    pub controller_endpoint: String,
    pub service_method_call: String,
    pub service: String,
    pub service_method: String,
    pub repository_method_call: String,
    pub repository: String,
    pub repository_method: String,
}
