use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use super::model::PropertyGraph;

/// Fraction of other nodes each node touches: degree / (n - 1). Graphs with
/// a single node score 1, matching the reference graph library.
pub fn degree_centrality(graph: &PropertyGraph) -> HashMap<NodeIndex, f64> {
    let n = graph.node_count();
    if n <= 1 {
        return graph.node_indices().map(|index| (index, 1.0)).collect();
    }

    let scale = 1.0 / (n - 1) as f64;
    graph
        .node_indices()
        .map(|index| (index, graph.degree(index) as f64 * scale))
        .collect()
}

/// Sum of incident edge weights per node.
pub fn weighted_degree(graph: &PropertyGraph) -> HashMap<NodeIndex, f64> {
    graph
        .node_indices()
        .map(|index| {
            let total = graph
                .inner()
                .edges(index)
                .map(|edge| edge.weight().weight)
                .sum();
            (index, total)
        })
        .collect()
}

/// Brandes betweenness centrality, normalized by 1 / ((n-1)(n-2)) so the
/// hub of a star scores 1.0. With `weighted`, edge weights are treated as
/// shortest-path distances; otherwise every hop counts 1.
pub fn betweenness_centrality(graph: &PropertyGraph, weighted: bool) -> HashMap<NodeIndex, f64> {
    let nodes: Vec<NodeIndex> = graph.node_indices().collect();
    let n = nodes.len();
    let mut centrality: HashMap<NodeIndex, f64> =
        nodes.iter().map(|&index| (index, 0.0)).collect();

    for &source in &nodes {
        let paths = if weighted {
            dijkstra_paths(graph, source)
        } else {
            bfs_paths(graph, source)
        };

        let mut delta: HashMap<NodeIndex, f64> =
            nodes.iter().map(|&index| (index, 0.0)).collect();
        for &node in paths.order.iter().rev() {
            let coefficient = (1.0 + delta[&node]) / paths.sigma[&node];
            if let Some(predecessors) = paths.predecessors.get(&node) {
                for &predecessor in predecessors {
                    *delta.get_mut(&predecessor).expect("known node") +=
                        paths.sigma[&predecessor] * coefficient;
                }
            }
            if node != source {
                *centrality.get_mut(&node).expect("known node") += delta[&node];
            }
        }
    }

    // Every unordered pair was visited from both endpoints; the normalization
    // absorbs the doubling.
    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        for value in centrality.values_mut() {
            *value *= scale;
        }
    }

    centrality
}

struct ShortestPaths {
    /// Nodes in nondecreasing distance from the source.
    order: Vec<NodeIndex>,
    /// Number of shortest paths reaching each node.
    sigma: HashMap<NodeIndex, f64>,
    predecessors: HashMap<NodeIndex, Vec<NodeIndex>>,
}

fn bfs_paths(graph: &PropertyGraph, source: NodeIndex) -> ShortestPaths {
    let mut order = Vec::new();
    let mut sigma: HashMap<NodeIndex, f64> = HashMap::new();
    let mut predecessors: HashMap<NodeIndex, Vec<NodeIndex>> = HashMap::new();
    let mut distance: HashMap<NodeIndex, usize> = HashMap::new();

    sigma.insert(source, 1.0);
    distance.insert(source, 0);
    let mut queue = VecDeque::from([source]);

    while let Some(current) = queue.pop_front() {
        order.push(current);
        let current_distance = distance[&current];
        let current_sigma = sigma[&current];

        for neighbor in graph.neighbors(current) {
            match distance.get(&neighbor) {
                None => {
                    distance.insert(neighbor, current_distance + 1);
                    sigma.insert(neighbor, current_sigma);
                    predecessors.insert(neighbor, vec![current]);
                    queue.push_back(neighbor);
                }
                Some(&known) if known == current_distance + 1 => {
                    *sigma.get_mut(&neighbor).expect("visited") += current_sigma;
                    predecessors.entry(neighbor).or_default().push(current);
                }
                Some(_) => {}
            }
        }
    }

    ShortestPaths {
        order,
        sigma,
        predecessors,
    }
}

#[derive(PartialEq)]
struct QueueEntry {
    distance: f64,
    node: NodeIndex,
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap over finite distances.
        other
            .distance
            .partial_cmp(&self.distance)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn dijkstra_paths(graph: &PropertyGraph, source: NodeIndex) -> ShortestPaths {
    const EPSILON: f64 = 1e-12;

    let mut order = Vec::new();
    let mut sigma: HashMap<NodeIndex, f64> = HashMap::new();
    let mut predecessors: HashMap<NodeIndex, Vec<NodeIndex>> = HashMap::new();
    let mut distance: HashMap<NodeIndex, f64> = HashMap::new();
    let mut settled: HashMap<NodeIndex, bool> = HashMap::new();

    sigma.insert(source, 1.0);
    distance.insert(source, 0.0);
    let mut heap = BinaryHeap::new();
    heap.push(QueueEntry {
        distance: 0.0,
        node: source,
    });

    while let Some(QueueEntry { distance: current_distance, node }) = heap.pop() {
        if *settled.get(&node).unwrap_or(&false) {
            continue;
        }
        settled.insert(node, true);
        order.push(node);

        for edge in graph.inner().edges(node) {
            let neighbor = if edge.source() == node {
                edge.target()
            } else {
                edge.source()
            };
            let candidate = current_distance + edge.weight().weight;

            match distance.get(&neighbor).copied() {
                Some(known) if candidate > known + EPSILON => {}
                Some(known) if (candidate - known).abs() <= EPSILON => {
                    // Another shortest path through `node`.
                    if !settled.get(&neighbor).copied().unwrap_or(false) {
                        let through = sigma[&node];
                        *sigma.get_mut(&neighbor).expect("seen") += through;
                        predecessors.entry(neighbor).or_default().push(node);
                    }
                }
                _ => {
                    distance.insert(neighbor, candidate);
                    sigma.insert(neighbor, sigma[&node]);
                    predecessors.insert(neighbor, vec![node]);
                    heap.push(QueueEntry {
                        distance: candidate,
                        node: neighbor,
                    });
                }
            }
        }
    }

    ShortestPaths {
        order,
        sigma,
        predecessors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeAttrs, NodeAttrs, NodeCategory};

    fn weighted_edge(weight: f64) -> EdgeAttrs {
        EdgeAttrs {
            weight,
            ..EdgeAttrs::default()
        }
    }

    fn attr_node(label: &str) -> NodeAttrs {
        NodeAttrs::new(label, NodeCategory::Polymer)
    }

    /// a - b - c path.
    fn path_graph() -> (PropertyGraph, [NodeIndex; 3]) {
        let mut graph = PropertyGraph::new();
        let a = graph.upsert_node(attr_node("a"));
        let b = graph.upsert_node(attr_node("b"));
        let c = graph.upsert_node(attr_node("c"));
        graph.add_edge(a, b, weighted_edge(1.0));
        graph.add_edge(b, c, weighted_edge(2.0));
        (graph, [a, b, c])
    }

    #[test]
    fn degree_centrality_on_path() {
        let (graph, [a, b, c]) = path_graph();
        let centrality = degree_centrality(&graph);
        assert_eq!(centrality[&a], 0.5);
        assert_eq!(centrality[&b], 1.0);
        assert_eq!(centrality[&c], 0.5);
    }

    #[test]
    fn weighted_degree_sums_incident_weights() {
        let (graph, [a, b, c]) = path_graph();
        let degrees = weighted_degree(&graph);
        assert_eq!(degrees[&a], 1.0);
        assert_eq!(degrees[&b], 3.0);
        assert_eq!(degrees[&c], 2.0);
    }

    #[test]
    fn betweenness_peaks_at_star_hub() {
        let mut graph = PropertyGraph::new();
        let hub = graph.upsert_node(attr_node("hub"));
        let leaves: Vec<NodeIndex> = (0..4)
            .map(|i| graph.upsert_node(attr_node(&format!("leaf{i}"))))
            .collect();
        for &leaf in &leaves {
            graph.add_edge(hub, leaf, weighted_edge(1.0));
        }

        for weighted in [false, true] {
            let centrality = betweenness_centrality(&graph, weighted);
            assert!((centrality[&hub] - 1.0).abs() < 1e-9);
            for leaf in &leaves {
                assert!(centrality[leaf].abs() < 1e-9);
            }
        }
    }

    #[test]
    fn weighted_betweenness_follows_cheap_detour() {
        // a-b direct costs 10; a-c-b costs 2, so c lies on the only
        // shortest a..b path.
        let mut graph = PropertyGraph::new();
        let a = graph.upsert_node(attr_node("a"));
        let b = graph.upsert_node(attr_node("b"));
        let c = graph.upsert_node(attr_node("c"));
        graph.add_edge(a, b, weighted_edge(10.0));
        graph.add_edge(a, c, weighted_edge(1.0));
        graph.add_edge(c, b, weighted_edge(1.0));

        let weighted = betweenness_centrality(&graph, true);
        assert!((weighted[&c] - 1.0).abs() < 1e-9);

        // Hop-counting sees the direct edge instead.
        let unweighted = betweenness_centrality(&graph, false);
        assert!(unweighted[&c].abs() < 1e-9);
    }
}
