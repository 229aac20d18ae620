use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::dataset::{Dataset, Record};
use crate::graph::{degree_centrality, EdgeAttrs, NodeAttrs, NodeCategory, PropertyGraph};
use crate::render::{force_atlas_2, save_graphml, save_html, save_node_link, HtmlDoc};

const HIGH_PERFORMANCE: &str = "High Elastic Performance";

/// Categorical co-occurrence graph over polymer names, modifications,
/// dispersion types and polymer classes, with a gold hub for polymers
/// whose composites gained more than 100% elastic modulus.
pub fn run(dataset: &Dataset, out_dir: &Path) -> Result<()> {
    let rows: Vec<&Record> = dataset
        .records()
        .iter()
        .filter(|record| record.mmt_weight.is_some() && record.polymer.is_some())
        .collect();
    info!("{} clean rows for the attribute graph", rows.len());

    let graph = build_attribute_graph(&rows);
    info!(
        "graph built: {} nodes, {} edges, {} connected components",
        graph.node_count(),
        graph.edge_count(),
        graph.connected_components()
    );

    let dir = out_dir.join("nanocomposite_output");
    fs::create_dir_all(&dir)?;

    save_graphml(&dir.join("nanocomposite_graph_basic.graphml"), &graph)?;
    save_node_link(&dir.join("nanocomposite_graph.json"), &graph)?;

    let report = analysis_report(&graph);
    let report_path = dir.join("graph_analysis_report.txt");
    fs::write(&report_path, &report)
        .with_context(|| format!("failed to write {}", report_path.display()))?;

    let mut doc = HtmlDoc::new("Nanocomposite Knowledge Graph", force_atlas_2());
    doc.height = "800px";
    save_html(&dir.join("nanocomposite_interactive_graph.html"), &doc, &graph)?;

    info!("attribute graph artifacts saved under {}", dir.display());
    Ok(())
}

fn build_attribute_graph(rows: &[&Record]) -> PropertyGraph {
    let mut graph = PropertyGraph::new();

    for record in rows {
        let polymer = match &record.polymer {
            Some(polymer) => graph.upsert_node(NodeAttrs {
                color: "lightblue".to_string(),
                size: 20.0,
                title: format!("{polymer} (polymer)"),
                ..NodeAttrs::new(polymer.clone(), NodeCategory::Polymer)
            }),
            None => continue,
        };
        let mmt = record.mmt_weight.unwrap_or(1.0);

        if let Some(modification) = record.modification {
            let node = graph.upsert_node(NodeAttrs {
                color: "lightgreen".to_string(),
                title: format!("{} (modification)", modification.label()),
                ..NodeAttrs::new(modification.label(), NodeCategory::Modification)
            });
            graph.connect(
                polymer,
                node,
                EdgeAttrs {
                    weight: mmt,
                    color: "green".to_string(),
                    relation: Some("has_modification".to_string()),
                    ..EdgeAttrs::default()
                },
            );
        }

        if let Some(dispersion) = &record.dispersion {
            let node = graph.upsert_node(NodeAttrs {
                color: "lightyellow".to_string(),
                title: format!("{dispersion} (dispersion)"),
                ..NodeAttrs::new(dispersion.clone(), NodeCategory::Dispersion)
            });
            graph.connect(
                polymer,
                node,
                EdgeAttrs {
                    weight: mmt,
                    color: "blue".to_string(),
                    relation: Some("has_dispersion".to_string()),
                    ..EdgeAttrs::default()
                },
            );
        }

        if let Some(class) = &record.polymer_class {
            let node = graph.upsert_node(NodeAttrs {
                color: "lightcoral".to_string(),
                size: 18.0,
                title: format!("{class} (polymer type)"),
                ..NodeAttrs::new(class.clone(), NodeCategory::PolymerClass)
            });
            graph.connect(
                polymer,
                node,
                EdgeAttrs {
                    color: "red".to_string(),
                    relation: Some("is_type".to_string()),
                    ..EdgeAttrs::default()
                },
            );
        }
    }

    // Gold hub for the strongest performers.
    let high: Vec<(String, f64)> = rows
        .iter()
        .filter_map(|record| {
            let improvement = record.modulus_improvement?;
            let polymer = record.polymer.clone()?;
            (improvement > 100.0).then_some((polymer, improvement))
        })
        .collect();

    if !high.is_empty() {
        let hub = graph.upsert_node(NodeAttrs {
            color: "gold".to_string(),
            size: 25.0,
            title: format!("{HIGH_PERFORMANCE} (performance)"),
            ..NodeAttrs::new(HIGH_PERFORMANCE, NodeCategory::Performance)
        });
        for (polymer, improvement) in high {
            if let Some(node) = graph.node_by_label(&polymer) {
                graph.connect(
                    node,
                    hub,
                    EdgeAttrs {
                        color: "gold".to_string(),
                        relation: Some("achieves".to_string()),
                        improvement_value: Some(improvement),
                        ..EdgeAttrs::default()
                    },
                );
            }
        }
    }

    graph
}

fn analysis_report(graph: &PropertyGraph) -> String {
    let count_category = |category: NodeCategory| {
        graph
            .nodes()
            .filter(|(_, node)| node.category == category)
            .count()
    };

    let mut report = String::new();
    let _ = writeln!(report, "NANOCOMPOSITE GRAPH ANALYSIS");
    let _ = writeln!(report, "==========================");
    let _ = writeln!(report);
    let _ = writeln!(report, "Graph Statistics:");
    let _ = writeln!(report, "- Total nodes: {}", graph.node_count());
    let _ = writeln!(report, "- Total edges: {}", graph.edge_count());
    let _ = writeln!(
        report,
        "- Connected components: {}",
        graph.connected_components()
    );
    let _ = writeln!(report);
    let _ = writeln!(report, "Node Types:");
    let _ = writeln!(report, "- Polymers: {}", count_category(NodeCategory::Polymer));
    let _ = writeln!(
        report,
        "- Modifications: {}",
        count_category(NodeCategory::Modification)
    );
    let _ = writeln!(
        report,
        "- Dispersions: {}",
        count_category(NodeCategory::Dispersion)
    );
    let _ = writeln!(
        report,
        "- Polymer types: {}",
        count_category(NodeCategory::PolymerClass)
    );
    let _ = writeln!(report);
    let _ = writeln!(report, "Top 10 Hub Nodes by Degree Centrality:");

    let centrality = degree_centrality(graph);
    let mut ranked: Vec<_> = centrality.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    for (rank, (index, centrality)) in ranked.into_iter().take(10).enumerate() {
        let _ = writeln!(
            report,
            "{}. {} (degree: {}, centrality: {:.3})",
            rank + 1,
            graph.node(index).label,
            graph.degree(index),
            centrality
        );
    }

    report
}
