//! # Archmap Flow
//!
//! Derived views over a completed system model. Nothing here mutates the
//! model: both queries read a snapshot and are recomputed on demand.
//!
//! - **Cross-service edges**: every outbound rest call is matched against
//!   every endpoint of every other service by normalized URL, verb, and
//!   required query parameters. Matches feed a `petgraph` service
//!   dependency graph.
//! - **Request flows**: each controller endpoint seeds a flow that is traced
//!   call-by-call through business-logic classes down to data access.
//!   Interface polymorphism can yield several candidates per step; all of
//!   them branch, and partial resolutions are kept.

mod graph;
mod matching;
mod trace;

pub use graph::DependencyGraph;
pub use matching::{build_service_edges, match_endpoint, split_query, ServiceEdge};
pub use trace::build_flows;
