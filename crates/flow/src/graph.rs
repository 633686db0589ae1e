use crate::matching::{build_service_edges, ServiceEdge};
use archmap_model::MicroserviceSystem;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Service-level dependency graph derived from matched cross-service edges.
pub struct DependencyGraph {
    /// Directed graph (caller service -> callee service).
    pub graph: DiGraph<String, ServiceEdge>,

    /// Service name -> NodeIndex mapping for fast lookup.
    pub service_index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Build the graph for a completed system snapshot. Every service is a
    /// node even when isolated; parallel edges are kept, one per matched
    /// call/endpoint pair.
    #[must_use]
    pub fn from_system(system: &MicroserviceSystem) -> Self {
        let mut graph = DiGraph::new();
        let mut service_index = HashMap::new();

        for service in &system.microservices {
            let idx = graph.add_node(service.name.clone());
            service_index.insert(service.name.clone(), idx);
        }

        for edge in build_service_edges(system) {
            let (Some(&from), Some(&to)) = (
                service_index.get(&edge.source),
                service_index.get(&edge.target),
            ) else {
                continue;
            };
            graph.add_edge(from, to, edge);
        }

        Self {
            graph,
            service_index,
        }
    }

    /// Find a service node by name.
    #[must_use]
    pub fn find_node(&self, service_name: &str) -> Option<NodeIndex> {
        self.service_index.get(service_name).copied()
    }

    /// Names of the services a given service calls into.
    #[must_use]
    pub fn dependencies_of(&self, service_name: &str) -> Vec<&str> {
        let Some(idx) = self.find_node(service_name) else {
            return Vec::new();
        };
        let mut targets: Vec<&str> = self
            .graph
            .neighbors(idx)
            .filter_map(|n| self.graph.node_weight(n))
            .map(String::as_str)
            .collect();
        targets.sort_unstable();
        targets.dedup();
        targets
    }

    /// Get node count
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get edge count
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
