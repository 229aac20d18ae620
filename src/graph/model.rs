use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeCategory {
    PrimaryMeasurement,
    Improvement,
    Center,
    Polymer,
    Composite,
    Modification,
    Dispersion,
    PolymerClass,
    Performance,
    Bin,
}

impl NodeCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::PrimaryMeasurement => "primary-measurement",
            Self::Improvement => "improvement",
            Self::Center => "center",
            Self::Polymer => "polymer",
            Self::Composite => "composite",
            Self::Modification => "modification",
            Self::Dispersion => "dispersion",
            Self::PolymerClass => "polymer_type",
            Self::Performance => "performance",
            Self::Bin => "bin",
        }
    }
}

/// Node attribute bag. `label` is the node's identity: inserting a second
/// node with the same label reuses the first one, which is how rows whose
/// values format identically share a node.
#[derive(Clone, Debug)]
pub struct NodeAttrs {
    pub label: String,
    /// Shown instead of `label` when the display text differs from the
    /// identity (center-graph nodes carry per-row ids but show the percent).
    pub display: Option<String>,
    pub category: NodeCategory,
    pub value: Option<f64>,
    pub log10_value: Option<f64>,
    pub color: String,
    pub size: f64,
    pub title: String,
    pub position: Option<(f64, f64)>,
    pub pinned: bool,
    pub font_size: Option<u32>,
}

impl NodeAttrs {
    pub fn new(label: impl Into<String>, category: NodeCategory) -> Self {
        Self {
            label: label.into(),
            display: None,
            category,
            value: None,
            log10_value: None,
            color: "gray".to_string(),
            size: 15.0,
            title: String::new(),
            position: None,
            pinned: false,
            font_size: None,
        }
    }

    pub fn display_label(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.label)
    }
}

#[derive(Clone, Debug)]
pub struct EdgeAttrs {
    pub weight: f64,
    pub color: String,
    pub width: f64,
    pub label: Option<String>,
    pub title: String,
    pub length: Option<f64>,
    pub distance: Option<f64>,
    pub primary_value: Option<f64>,
    pub improvement_value: Option<f64>,
    pub primary_log10: Option<f64>,
    pub improvement_log10: Option<f64>,
    pub relation: Option<String>,
}

impl Default for EdgeAttrs {
    fn default() -> Self {
        Self {
            weight: 1.0,
            color: "gray".to_string(),
            width: 1.0,
            label: None,
            title: String::new(),
            length: None,
            distance: None,
            primary_value: None,
            improvement_value: None,
            primary_log10: None,
            improvement_log10: None,
            relation: None,
        }
    }
}

/// Undirected attribute graph with label-keyed node identity.
#[derive(Clone, Debug, Default)]
pub struct PropertyGraph {
    graph: UnGraph<NodeAttrs, EdgeAttrs>,
    by_label: HashMap<String, NodeIndex>,
}

impl PropertyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, or updates the attributes of the node already holding
    /// this label. Later insertions win, matching the source's behavior of
    /// re-adding a node id with fresh attributes.
    pub fn upsert_node(&mut self, attrs: NodeAttrs) -> NodeIndex {
        if let Some(&index) = self.by_label.get(&attrs.label) {
            self.graph[index] = attrs;
            index
        } else {
            let label = attrs.label.clone();
            let index = self.graph.add_node(attrs);
            self.by_label.insert(label, index);
            index
        }
    }

    pub fn node_by_label(&self, label: &str) -> Option<NodeIndex> {
        self.by_label.get(label).copied()
    }

    /// Adds an edge unconditionally; parallel edges between the same pair
    /// are kept, one per input row.
    pub fn add_edge(&mut self, a: NodeIndex, b: NodeIndex, attrs: EdgeAttrs) {
        self.graph.add_edge(a, b, attrs);
    }

    /// Adds an edge, replacing any existing edge between the pair. Used by
    /// the categorical graphs where repeated co-occurrences collapse to a
    /// single relationship.
    pub fn connect(&mut self, a: NodeIndex, b: NodeIndex, attrs: EdgeAttrs) {
        if let Some(existing) = self.graph.find_edge(a, b) {
            self.graph[existing] = attrs;
        } else {
            self.graph.add_edge(a, b, attrs);
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, index: NodeIndex) -> &NodeAttrs {
        &self.graph[index]
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &NodeAttrs)> + '_ {
        self.graph
            .node_indices()
            .map(move |index| (index, &self.graph[index]))
    }

    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, &EdgeAttrs)> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (edge.source(), edge.target(), edge.weight()))
    }

    pub fn edges_mut(&mut self) -> impl Iterator<Item = &mut EdgeAttrs> + '_ {
        self.graph.edge_weights_mut()
    }

    pub fn neighbors(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(index)
    }

    pub fn degree(&self, index: NodeIndex) -> usize {
        self.graph.edges(index).count()
    }

    pub fn connected_components(&self) -> usize {
        petgraph::algo::connected_components(&self.graph)
    }

    pub fn inner(&self) -> &UnGraph<NodeAttrs, EdgeAttrs> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_reuses_label_and_updates_attrs() {
        let mut graph = PropertyGraph::new();
        let first = graph.upsert_node(NodeAttrs {
            size: 10.0,
            ..NodeAttrs::new("2.00 GPa", NodeCategory::PrimaryMeasurement)
        });
        let second = graph.upsert_node(NodeAttrs {
            size: 14.0,
            ..NodeAttrs::new("2.00 GPa", NodeCategory::PrimaryMeasurement)
        });

        assert_eq!(first, second);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node(first).size, 14.0);
    }

    #[test]
    fn add_edge_keeps_parallel_edges() {
        let mut graph = PropertyGraph::new();
        let a = graph.upsert_node(NodeAttrs::new("a", NodeCategory::Polymer));
        let b = graph.upsert_node(NodeAttrs::new("b", NodeCategory::Polymer));
        graph.add_edge(a, b, EdgeAttrs::default());
        graph.add_edge(a, b, EdgeAttrs::default());
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn connect_replaces_existing_edge() {
        let mut graph = PropertyGraph::new();
        let a = graph.upsert_node(NodeAttrs::new("a", NodeCategory::Polymer));
        let b = graph.upsert_node(NodeAttrs::new("b", NodeCategory::Polymer));
        graph.connect(a, b, EdgeAttrs { weight: 1.0, ..EdgeAttrs::default() });
        graph.connect(a, b, EdgeAttrs { weight: 7.0, ..EdgeAttrs::default() });

        assert_eq!(graph.edge_count(), 1);
        let (_, _, attrs) = graph.edges().next().expect("edge exists");
        assert_eq!(attrs.weight, 7.0);
    }
}
