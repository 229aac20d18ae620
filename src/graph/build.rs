use super::model::{EdgeAttrs, NodeAttrs, NodeCategory, PropertyGraph};
use super::property::{improvement_color, improvement_label, improvement_size, Property};
use super::scale::{edge_length, edge_width, Span};

/// One cleaned table row: the primary measurement, its improvement
/// percentage, and the precomputed log10 transforms when present.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValuePair {
    pub primary: f64,
    pub improvement: f64,
    pub primary_log10: Option<f64>,
    pub improvement_log10: Option<f64>,
}

/// Which pair of components feeds the Euclidean edge distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceBasis {
    Raw,
    Log10,
}

#[derive(Clone, Copy, Debug)]
pub struct BuildConfig {
    pub property: Property,
    pub basis: DistanceBasis,
    /// Color primary nodes by sign (the raw-distance variants do, the log10
    /// variants do not).
    pub signed_palette: bool,
}

/// Builds the value-pair graph: two nodes and one edge per row. Node
/// identity is the formatted value, so rows that round to the same label
/// share a node; edges are never merged. Rows missing a log10 transform
/// under the log10 basis contribute nothing, the same exclusion the dataset
/// layer applies.
pub fn build_value_pair_graph(rows: &[ValuePair], config: BuildConfig) -> PropertyGraph {
    let mut graph = PropertyGraph::new();
    let property = config.property;

    for row in rows {
        let (a, b) = match config.basis {
            DistanceBasis::Raw => (row.primary, row.improvement),
            DistanceBasis::Log10 => match (row.primary_log10, row.improvement_log10) {
                (Some(primary), Some(improvement)) => (primary, improvement),
                _ => continue,
            },
        };

        let primary = graph.upsert_node(NodeAttrs {
            value: Some(row.primary),
            log10_value: row.primary_log10,
            color: property.primary_color(row.primary, config.signed_palette).to_string(),
            size: property.primary_size(row.primary),
            title: property.primary_title(row.primary, row.primary_log10),
            ..NodeAttrs::new(
                property.primary_label(row.primary),
                NodeCategory::PrimaryMeasurement,
            )
        });

        let improvement = graph.upsert_node(NodeAttrs {
            value: Some(row.improvement),
            log10_value: row.improvement_log10,
            color: improvement_color(row.improvement).to_string(),
            size: improvement_size(row.improvement),
            title: property.improvement_title(row.improvement, row.improvement_log10),
            ..NodeAttrs::new(improvement_label(row.improvement), NodeCategory::Improvement)
        });

        graph.add_edge(
            primary,
            improvement,
            EdgeAttrs {
                distance: Some(a.hypot(b)),
                primary_value: Some(row.primary),
                improvement_value: Some(row.improvement),
                primary_log10: row.primary_log10,
                improvement_log10: row.improvement_log10,
                ..EdgeAttrs::default()
            },
        );
    }

    graph
}

/// Second pass over a built graph: min-max scan of the edge distances, then
/// per-edge length, width, label, and hover text. A graph with no edges is
/// left untouched.
pub fn apply_distance_layout(graph: &mut PropertyGraph, config: BuildConfig) {
    let span = match Span::of(graph.edges().filter_map(|(_, _, edge)| edge.distance)) {
        Some(span) => span,
        None => return,
    };

    for edge in graph.edges_mut() {
        let distance = match edge.distance {
            Some(distance) => distance,
            None => continue,
        };

        let length = edge_length(&span, distance);
        let title = edge_title(config, edge, distance, length);
        edge.length = Some(length);
        edge.width = edge_width(&span, distance);
        edge.label = Some(match config.basis {
            DistanceBasis::Raw => format!("{distance:.2}"),
            DistanceBasis::Log10 => format!("{distance:.3}"),
        });
        edge.title = title;
    }
}

fn edge_title(config: BuildConfig, edge: &EdgeAttrs, distance: f64, length: f64) -> String {
    let property = config.property;
    let primary = edge.primary_value.unwrap_or(0.0);
    let improvement = edge.improvement_value.unwrap_or(0.0);

    let mut title = match config.basis {
        DistanceBasis::Raw => format!("Euclidean Distance: {distance:.4}\n"),
        DistanceBasis::Log10 => format!("Euclidean Distance (Log10 based): {distance:.4}\n"),
    };
    title.push_str(&format!("Edge Length: {length:.0}\n"));
    title.push_str("Original Values:\n");
    title.push_str(&format!(
        "  - {}: {}\n",
        property.display_name(),
        property.primary_label(primary)
    ));
    title.push_str(&format!("  - Improvement: {improvement:.1}%\n"));

    match config.basis {
        DistanceBasis::Raw => {
            title.push_str(&format!(
                "Calculation: \u{221a}({primary:.2}\u{b2} + {improvement:.1}\u{b2})"
            ));
        }
        DistanceBasis::Log10 => {
            let primary_log10 = edge.primary_log10.unwrap_or(0.0);
            let improvement_log10 = edge.improvement_log10.unwrap_or(0.0);
            title.push_str("Log10 Values:\n");
            title.push_str(&format!(
                "  - {} Log10: {primary_log10:.4}\n",
                property.display_name()
            ));
            title.push_str(&format!("  - Improvement Log10: {improvement_log10:.4}\n"));
            title.push_str(&format!(
                "Calculation: \u{221a}({primary_log10:.4}\u{b2} + {improvement_log10:.4}\u{b2})"
            ));
        }
    }

    title
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeCategory;

    const TOLERANCE: f64 = 1e-9;

    fn log10_config() -> BuildConfig {
        BuildConfig {
            property: Property::Modulus,
            basis: DistanceBasis::Log10,
            signed_palette: false,
        }
    }

    fn raw_config() -> BuildConfig {
        BuildConfig {
            property: Property::Strength,
            basis: DistanceBasis::Raw,
            signed_palette: true,
        }
    }

    #[test]
    fn one_edge_per_row_with_log10_distance() {
        let rows = [ValuePair {
            primary: 2.0,
            improvement: 50.0,
            primary_log10: Some(0.301),
            improvement_log10: Some(1.699),
        }];
        let graph = build_value_pair_graph(&rows, log10_config());

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);

        let primary = graph.node_by_label("2.00 GPa").expect("primary node");
        assert_eq!(graph.node(primary).category, NodeCategory::PrimaryMeasurement);
        let improvement = graph.node_by_label("50.0%").expect("improvement node");
        assert_eq!(graph.node(improvement).category, NodeCategory::Improvement);

        let (_, _, edge) = graph.edges().next().expect("edge");
        let expected = (0.301_f64.powi(2) + 1.699_f64.powi(2)).sqrt();
        assert!((edge.distance.unwrap() - expected).abs() < TOLERANCE);
        assert!((edge.distance.unwrap() - 1.7265).abs() < 1e-4);
    }

    #[test]
    fn raw_distance_uses_original_values() {
        let rows = [ValuePair {
            primary: 30.0,
            improvement: -40.0,
            primary_log10: None,
            improvement_log10: None,
        }];
        let graph = build_value_pair_graph(&rows, raw_config());

        let (_, _, edge) = graph.edges().next().expect("edge");
        assert!((edge.distance.unwrap() - 50.0).abs() < TOLERANCE);

        let improvement = graph.node_by_label("-40.0%").expect("improvement node");
        assert_eq!(graph.node(improvement).color, "lightcoral");
    }

    #[test]
    fn empty_input_builds_empty_graph() {
        let mut graph = build_value_pair_graph(&[], log10_config());
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        // Layout over an empty graph is a no-op, not a crash.
        apply_distance_layout(&mut graph, log10_config());
    }

    #[test]
    fn rows_without_log10_are_excluded_under_log10_basis() {
        let rows = [ValuePair {
            primary: 2.0,
            improvement: 50.0,
            primary_log10: Some(0.301),
            improvement_log10: None,
        }];
        let graph = build_value_pair_graph(&rows, log10_config());
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn colliding_labels_share_a_node_but_not_edges() {
        let rows = [
            ValuePair {
                primary: 2.001,
                improvement: 50.0,
                primary_log10: None,
                improvement_log10: None,
            },
            ValuePair {
                primary: 2.004,
                improvement: 75.0,
                primary_log10: None,
                improvement_log10: None,
            },
        ];
        let config = BuildConfig {
            property: Property::Modulus,
            basis: DistanceBasis::Raw,
            signed_palette: false,
        };
        let graph = build_value_pair_graph(&rows, config);

        // Both primaries format as "2.00 GPa".
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.node_by_label("2.00 GPa").is_some());
        assert!(graph.node_by_label("50.0%").is_some());
        assert!(graph.node_by_label("75.0%").is_some());
    }

    #[test]
    fn building_twice_is_identical() {
        let rows = [
            ValuePair {
                primary: 1.5,
                improvement: 20.0,
                primary_log10: Some(0.176),
                improvement_log10: Some(1.301),
            },
            ValuePair {
                primary: 3.0,
                improvement: -10.0,
                primary_log10: Some(0.477),
                improvement_log10: Some(1.0),
            },
        ];
        let first = build_value_pair_graph(&rows, log10_config());
        let second = build_value_pair_graph(&rows, log10_config());

        assert_eq!(first.node_count(), second.node_count());
        assert_eq!(first.edge_count(), second.edge_count());
        let labels = |graph: &PropertyGraph| {
            let mut labels: Vec<String> =
                graph.nodes().map(|(_, node)| node.label.clone()).collect();
            labels.sort();
            labels
        };
        assert_eq!(labels(&first), labels(&second));
        let distances = |graph: &PropertyGraph| {
            graph
                .edges()
                .map(|(_, _, edge)| edge.distance.unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(distances(&first), distances(&second));
    }

    #[test]
    fn layout_annotates_length_width_and_label() {
        let rows = [
            ValuePair {
                primary: 10.0,
                improvement: 0.0,
                primary_log10: None,
                improvement_log10: None,
            },
            ValuePair {
                primary: 30.0,
                improvement: 40.0,
                primary_log10: None,
                improvement_log10: None,
            },
        ];
        let mut graph = build_value_pair_graph(&rows, raw_config());
        apply_distance_layout(&mut graph, raw_config());

        let lengths: Vec<f64> = graph
            .edges()
            .map(|(_, _, edge)| edge.length.unwrap())
            .collect();
        assert!(lengths.contains(&50.0));
        assert!(lengths.contains(&500.0));

        for (_, _, edge) in graph.edges() {
            assert!(edge.width >= 0.5 && edge.width <= 3.0);
            assert!(edge.label.is_some());
            assert!(edge.title.starts_with("Euclidean Distance"));
        }
    }
}
