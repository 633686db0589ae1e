//! # Archmap Model
//!
//! Shared entity model for the architecture-recovery pipeline: services,
//! role-tagged classes, methods and endpoints, call sites and rest calls,
//! file-level change batches, and derived request flows.
//!
//! Everything downstream (extraction, differencing, merging, flow
//! resolution) communicates through these types. Classes, methods and calls
//! are immutable value data once extracted — the only post-construction
//! mutation is re-stamping the denormalized owning-service name when a class
//! moves between the orphan pool and a service.
//!
//! ## Persisted forms
//!
//! All types serialize with `serde`. Two shapes are contractual with the
//! external serializer:
//! - a system serializes as `{name, commitID, microservices, orphans}`;
//! - a method/endpoint pair and a call/rest-call pair are one record whose
//!   routing payload is flattened, so deserialization branches on the
//!   presence of a `url` field; class and configuration records carry a
//!   `fileType` discriminator (`JCLASS` / `CONFIG`).

mod change;
mod class;
mod flow;
mod service;
mod system;
mod types;

pub use change::{ChangeType, Delta, SystemChange, DEV_NULL};
pub use class::{ConfigFile, JavaClass, Method, MethodCall, ProjectFile};
pub use flow::{Flow, FlowSummary};
pub use service::Microservice;
pub use system::MicroserviceSystem;
pub use types::{Annotation, ClassRole, Field, HttpMethod, Parameter, Route};
