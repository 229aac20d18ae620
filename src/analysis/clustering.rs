use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;
use serde_json::json;

use crate::dataset::{Dataset, Modification, Record};
use crate::graph::{
    betweenness_centrality, degree_centrality, weighted_degree, EdgeAttrs, NodeAttrs,
    NodeCategory, PropertyGraph,
};
use crate::render::{barnes_hut, save_html, HtmlDoc};

/// Stiffness regimes over the neat polymer matrix modulus.
static CLUSTERS: [Cluster; 4] = [
    Cluster {
        id: "C1",
        name: "Soft elastomeric",
        color: "#FF6B6B",
        lo: 0.0,
        hi: 0.1,
    },
    Cluster {
        id: "C2",
        name: "Semi-soft thermoplastic",
        color: "#4ECDC4",
        lo: 0.1,
        hi: 0.5,
    },
    Cluster {
        id: "C3",
        name: "Intermediate",
        color: "#45B7D1",
        lo: 0.5,
        hi: 1.0,
    },
    Cluster {
        id: "C4",
        name: "Rigid polymer",
        color: "#96CEB4",
        lo: 1.0,
        hi: f64::INFINITY,
    },
];

struct Cluster {
    id: &'static str,
    name: &'static str,
    color: &'static str,
    lo: f64,
    hi: f64,
}

impl Cluster {
    fn contains(&self, modulus: f64) -> bool {
        self.lo <= modulus && modulus < self.hi
    }

    fn range_label(&self) -> String {
        format!("{}-{} GPa", self.lo, self.hi)
    }
}

struct PolymerMetrics {
    name: String,
    degree: f64,
    weighted: f64,
    betweenness: f64,
}

#[derive(Default)]
struct Comparison {
    modified_count: usize,
    unmodified_count: usize,
    avg_modified: f64,
    avg_unmodified: f64,
}

struct ClusterReport {
    cluster: &'static Cluster,
    samples: usize,
    avg_improvement: f64,
    pct_modified: f64,
    /// Polymer nodes sorted by weighted degree, descending.
    polymers: Vec<PolymerMetrics>,
    comparison: Comparison,
}

/// Modulus-regime clustering: one bipartite polymer-composite graph per
/// cluster, polymer-node centrality tables, and the modified-vs-unmodified
/// comparison, all written under `phase1_output/`.
pub fn run(dataset: &Dataset, out_dir: &Path) -> Result<()> {
    let rows: Vec<&Record> = dataset
        .records()
        .iter()
        .filter(|record| record.polymer.is_some() && record.matrix_modulus.is_some())
        .collect();
    info!("{} clean rows for the clustering analysis", rows.len());

    let dir = out_dir.join("phase1_output");
    fs::create_dir_all(&dir)?;

    let mut reports = Vec::new();
    for cluster in &CLUSTERS {
        let members: Vec<&Record> = rows
            .iter()
            .copied()
            .filter(|record| {
                record
                    .matrix_modulus
                    .is_some_and(|modulus| cluster.contains(modulus))
            })
            .collect();
        info!("{} ({}): {} samples", cluster.id, cluster.name, members.len());

        if members.is_empty() {
            warn!("no samples in cluster {}, skipping", cluster.id);
            continue;
        }

        let graph = build_cluster_graph(&members);
        info!(
            "cluster {}: {} nodes, {} edges",
            cluster.id,
            graph.node_count(),
            graph.edge_count()
        );

        let report = evaluate_cluster(cluster, &members, &graph);
        save_cluster_html(&dir, &report, &graph)?;
        reports.push(report);
    }

    write_conference_summary(&dir, &rows, &reports)?;
    write_detailed_report(&dir, &reports)?;
    write_raw_centrality(&dir, &reports)?;

    info!("clustering artifacts saved under {}", dir.display());
    Ok(())
}

fn is_modified(record: &Record) -> bool {
    record.modification == Some(Modification::Modified)
}

/// Bipartite graph for one cluster: one node per polymer matrix, one node
/// per composite row, edges weighted by the absolute improvement.
fn build_cluster_graph(members: &[&Record]) -> PropertyGraph {
    let mut graph = PropertyGraph::new();

    // Polymer nodes first, carrying the mean matrix modulus.
    for record in members {
        let polymer = match &record.polymer {
            Some(polymer) => polymer,
            None => continue,
        };
        if graph.node_by_label(polymer).is_some() {
            continue;
        }
        let moduli: Vec<f64> = members
            .iter()
            .filter(|other| other.polymer.as_deref() == Some(polymer))
            .filter_map(|other| other.matrix_modulus)
            .collect();
        let mean = moduli.iter().sum::<f64>() / moduli.len() as f64;
        graph.upsert_node(NodeAttrs {
            display: Some(format!("{polymer}\n(E={mean:.2} GPa)")),
            value: Some(mean),
            color: "#3498db".to_string(),
            size: 20.0,
            title: format!("{polymer}: mean matrix modulus {mean:.2} GPa"),
            ..NodeAttrs::new(polymer.clone(), NodeCategory::Polymer)
        });
    }

    for (row, record) in members.iter().enumerate() {
        let polymer = match &record.polymer {
            Some(polymer) => polymer.clone(),
            None => continue,
        };
        let composite_modulus = match record.composite_modulus {
            Some(modulus) => modulus,
            None => continue,
        };

        let color = if is_modified(record) {
            "#27ae60"
        } else {
            "#e74c3c"
        };
        let mut title = format!(
            "{polymer} composite: {composite_modulus:.2} GPa ({})",
            if is_modified(record) { "modified" } else { "unmodified" }
        );
        if let Some(article) = &record.article {
            title.push_str(&format!("\nSource: {article}"));
        }
        let composite = graph.upsert_node(NodeAttrs {
            value: Some(composite_modulus),
            color: color.to_string(),
            title,
            ..NodeAttrs::new(format!("{polymer}_composite_{row}"), NodeCategory::Composite)
        });

        if let Some(improvement) = record.modulus_improvement {
            let polymer_node = graph.node_by_label(&polymer).expect("polymer inserted");
            graph.add_edge(
                polymer_node,
                composite,
                EdgeAttrs {
                    weight: improvement.abs(),
                    color: if improvement > 0.0 { "green" } else { "red" }.to_string(),
                    width: (improvement.abs() / 10.0).min(10.0),
                    title: format!("Improvement: {improvement:.1}%"),
                    improvement_value: Some(improvement),
                    ..EdgeAttrs::default()
                },
            );
        }
    }

    graph
}

fn evaluate_cluster(
    cluster: &'static Cluster,
    members: &[&Record],
    graph: &PropertyGraph,
) -> ClusterReport {
    let degree = degree_centrality(graph);
    let weighted = weighted_degree(graph);
    let betweenness = betweenness_centrality(graph, true);

    let mut polymers: Vec<PolymerMetrics> = graph
        .nodes()
        .filter(|(_, node)| node.category == NodeCategory::Polymer)
        .map(|(index, node)| PolymerMetrics {
            name: node.label.clone(),
            degree: degree[&index],
            weighted: weighted[&index],
            betweenness: betweenness[&index],
        })
        .collect();
    polymers.sort_by(|a, b| b.weighted.total_cmp(&a.weighted));

    let improvements: Vec<f64> = members
        .iter()
        .filter_map(|record| record.modulus_improvement)
        .collect();
    let avg_improvement = mean(&improvements);
    let modified = members.iter().filter(|record| is_modified(record)).count();
    let pct_modified = modified as f64 / members.len() as f64 * 100.0;

    ClusterReport {
        cluster,
        samples: members.len(),
        avg_improvement,
        pct_modified,
        polymers,
        comparison: compare_modified(graph),
    }
}

/// Composite-node counts and mean edge improvements, split by modification.
fn compare_modified(graph: &PropertyGraph) -> Comparison {
    let mut comparison = Comparison::default();
    let mut modified = Vec::new();
    let mut unmodified = Vec::new();

    // Modified composites are the green ones.
    for (_, node) in graph.nodes() {
        if node.category != NodeCategory::Composite {
            continue;
        }
        if node.color == "#27ae60" {
            comparison.modified_count += 1;
        } else {
            comparison.unmodified_count += 1;
        }
    }

    for (source, target, edge) in graph.edges() {
        let improvement = match edge.improvement_value {
            Some(improvement) => improvement,
            None => continue,
        };
        let composite = if graph.node(target).category == NodeCategory::Composite {
            target
        } else {
            source
        };
        if graph.node(composite).color == "#27ae60" {
            modified.push(improvement);
        } else {
            unmodified.push(improvement);
        }
    }

    comparison.avg_modified = mean(&modified);
    comparison.avg_unmodified = mean(&unmodified);
    comparison
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn save_cluster_html(dir: &Path, report: &ClusterReport, graph: &PropertyGraph) -> Result<()> {
    // Large clusters need weaker springs and a long stabilization run to
    // settle; the small ones are fine with the stock solver.
    let options = if graph.node_count() > 200 {
        json!({
            "physics": {
                "enabled": true,
                "barnesHut": {
                    "gravitationalConstant": -15000,
                    "centralGravity": 0.1,
                    "springLength": 300,
                    "springConstant": 0.0001,
                    "damping": 0.6,
                    "avoidOverlap": 1,
                },
                "stabilization": { "iterations": 2000 },
            },
        })
    } else {
        barnes_hut(-80000.0, 0.3, 250.0, 0.001, 0.09, 1.0)
    };

    let cluster = report.cluster;
    let title = format!("Cluster {}: {}", cluster.id, cluster.name);
    let mut doc = HtmlDoc::new(&title, options);
    doc.height = "800px";
    doc.bgcolor = "#ffffff";
    doc.font_color = "black";
    doc.physics_panel = false;
    doc.header = Some(format!(
        r#"<div style="padding: 20px; background-color: #f8f9fa; margin: 10px; border-radius: 5px; border: 2px solid {color};">
    <h2 style="color: {color};">Cluster {id}: {name}</h2>
    <p><strong>Modulus range:</strong> {range}</p>
    <p><strong>n_samples:</strong> {samples} | <strong>avg &#916;E%:</strong> {avg:.1}% | <strong>% modified:</strong> {pct:.1}%</p>
    <p><strong>Legend:</strong> Blue: Polymer matrices | Green: Modified composites | Red: Unmodified composites</p>
    <p><strong>Edge width:</strong> Proportional to improvement magnitude | <strong>Edge color:</strong> Green (positive) / Red (negative)</p>
</div>"#,
        color = cluster.color,
        id = cluster.id,
        name = cluster.name,
        range = cluster.range_label(),
        samples = report.samples,
        avg = report.avg_improvement,
        pct = report.pct_modified,
    ));

    save_html(
        &dir.join(format!("cluster_{}_graph.html", cluster.id)),
        &doc,
        graph,
    )
}

fn write_conference_summary(
    dir: &Path,
    rows: &[&Record],
    reports: &[ClusterReport],
) -> Result<()> {
    let modified = rows.iter().filter(|record| is_modified(record)).count();

    let mut text = String::new();
    let _ = writeln!(text, "=== Phase 1: Conference Stage Analysis ===");
    let _ = writeln!(text);
    let _ = writeln!(text, "Elastic Modulus-Based Clustering Results");
    let _ = writeln!(text);
    let _ = writeln!(text, "Total samples: {}", rows.len());
    let _ = writeln!(text, "Modified samples: {modified}");
    let _ = writeln!(text, "Unmodified samples: {}", rows.len() - modified);

    for report in reports {
        let cluster = report.cluster;
        let _ = writeln!(text);
        let _ = writeln!(text, "{} - {} regime:", cluster.id, cluster.name);
        let _ = writeln!(text, "  Range: {}", cluster.range_label());
        let _ = writeln!(
            text,
            "  Modified: {} samples, avg improvement: {:.1}%",
            report.comparison.modified_count, report.comparison.avg_modified
        );
        let _ = writeln!(
            text,
            "  Unmodified: {} samples, avg improvement: {:.1}%",
            report.comparison.unmodified_count, report.comparison.avg_unmodified
        );
        if let Some(hub) = report.polymers.first() {
            let _ = writeln!(text, "  Knowledge hub: {}", hub.name);
        }
    }

    let path = dir.join("conference_summary.txt");
    fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))
}

fn write_detailed_report(dir: &Path, reports: &[ClusterReport]) -> Result<()> {
    let rule = "=".repeat(80);
    let dash = "-".repeat(80);

    let mut text = String::new();
    let _ = writeln!(text, "{rule}");
    let _ = writeln!(text, "PHASE 1: DETAILED CENTRALITY EVALUATION REPORT");
    let _ = writeln!(text, "{rule}");
    let _ = writeln!(text);
    let _ = writeln!(
        text,
        "Centrality metrics evaluate which polymer matrices act as 'knowledge hubs'"
    );
    let _ = writeln!(text, "within each stiffness regime (C1-C4).");
    let _ = writeln!(text);

    for report in reports {
        let cluster = report.cluster;
        let _ = writeln!(text);
        let _ = writeln!(text, "{dash}");
        let _ = writeln!(text, "CLUSTER {}: {} regime", cluster.id, cluster.name);
        let _ = writeln!(text, "Range: {}", cluster.range_label());
        let _ = writeln!(text, "{dash}");
        let _ = writeln!(text);
        let _ = writeln!(text, "ALL Polymers by Centrality Metrics:");
        let _ = writeln!(text, "{dash}");
        let _ = writeln!(
            text,
            "{:<30} {:<15} {:<15} {:<15}",
            "Polymer", "Degree Cent.", "Weighted Deg.", "Between. Cent."
        );
        let _ = writeln!(text, "{dash}");

        for polymer in &report.polymers {
            let _ = writeln!(
                text,
                "{:<30} {:<15} {:<15} {:<15}",
                polymer.name,
                format!("{:.4}", polymer.degree),
                format!("{:.2}", polymer.weighted),
                format!("{:.4}", polymer.betweenness),
            );
        }

        let average = mean(
            &report
                .polymers
                .iter()
                .map(|polymer| polymer.weighted)
                .collect::<Vec<_>>(),
        );
        let _ = writeln!(text);
        let _ = writeln!(text, "Cluster {} Summary:", cluster.id);
        let _ = writeln!(text, "- Total polymer types: {}", report.polymers.len());
        if let Some(top) = report.polymers.first() {
            let _ = writeln!(
                text,
                "- Highest weighted degree: {} ({:.2})",
                top.name, top.weighted
            );
        }
        let _ = writeln!(text, "- Average weighted degree: {average:.2}");

        let _ = writeln!(text);
        let _ = writeln!(text, "Interpretation for {}:", cluster.id);
        if matches!(cluster.id, "C1" | "C2") {
            let _ = writeln!(
                text,
                "- High weighted degree values indicate large property improvements"
            );
            let _ = writeln!(
                text,
                "- Soft/semi-soft systems show high variability in response"
            );
        } else {
            let _ = writeln!(text, "- More consistent but lower improvement values");
            let _ = writeln!(
                text,
                "- Dense networks indicate systematic reinforcement mechanisms"
            );
        }
    }

    let _ = writeln!(text);
    let _ = writeln!(text);
    let _ = writeln!(text, "{rule}");
    let _ = writeln!(text, "MODIFIED VS UNMODIFIED CENTRALITY COMPARISON");
    let _ = writeln!(text, "{rule}");
    let _ = writeln!(text);

    for report in reports {
        let comparison = &report.comparison;
        let _ = writeln!(text);
        let _ = writeln!(text, "{}:", report.cluster.id);
        let _ = writeln!(text, "  Modified systems: {} nodes", comparison.modified_count);
        let _ = writeln!(
            text,
            "  Unmodified systems: {} nodes",
            comparison.unmodified_count
        );
        let _ = writeln!(
            text,
            "  Avg improvement (modified): {:.1}%",
            comparison.avg_modified
        );
        let _ = writeln!(
            text,
            "  Avg improvement (unmodified): {:.1}%",
            comparison.avg_unmodified
        );
        if comparison.avg_modified > comparison.avg_unmodified {
            let _ = writeln!(
                text,
                "  \u{2192} Modified systems show {:.1}% higher improvement",
                comparison.avg_modified - comparison.avg_unmodified
            );
        } else {
            let _ = writeln!(
                text,
                "  \u{2192} Unmodified systems show {:.1}% higher improvement",
                comparison.avg_unmodified - comparison.avg_modified
            );
        }
    }

    let path = dir.join("centrality_evaluation_detailed.txt");
    fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))
}

#[derive(Serialize)]
struct RawCentrality {
    degree_centrality: BTreeMap<String, f64>,
    weighted_degree: BTreeMap<String, f64>,
    betweenness_centrality: BTreeMap<String, f64>,
}

fn write_raw_centrality(dir: &Path, reports: &[ClusterReport]) -> Result<()> {
    let as_map = |report: &ClusterReport, pick: fn(&PolymerMetrics) -> f64| {
        report
            .polymers
            .iter()
            .map(|polymer| (polymer.name.clone(), pick(polymer)))
            .collect::<BTreeMap<_, _>>()
    };
    let data: BTreeMap<&str, RawCentrality> = reports
        .iter()
        .map(|report| {
            let raw = RawCentrality {
                degree_centrality: as_map(report, |polymer| polymer.degree),
                weighted_degree: as_map(report, |polymer| polymer.weighted),
                betweenness_centrality: as_map(report, |polymer| polymer.betweenness),
            };
            (report.cluster.id, raw)
        })
        .collect();

    let path = dir.join("centrality_raw_data.json");
    let file = fs::File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &data)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(polymer: &str, matrix: f64, composite: f64, improvement: f64, modified: bool) -> Record {
        Record {
            polymer: Some(polymer.to_string()),
            matrix_modulus: Some(matrix),
            composite_modulus: Some(composite),
            modulus_improvement: Some(improvement),
            modification: Some(if modified {
                Modification::Modified
            } else {
                Modification::Unmodified
            }),
            ..Record::default()
        }
    }

    #[test]
    fn cluster_ranges_are_half_open() {
        assert!(CLUSTERS[0].contains(0.0));
        assert!(!CLUSTERS[0].contains(0.1));
        assert!(CLUSTERS[1].contains(0.1));
        assert!(CLUSTERS[3].contains(1.0));
        assert!(CLUSTERS[3].contains(250.0));
    }

    #[test]
    fn range_label_prints_the_open_end() {
        assert_eq!(CLUSTERS[0].range_label(), "0-0.1 GPa");
        assert_eq!(CLUSTERS[3].range_label(), "1-inf GPa");
    }

    #[test]
    fn cluster_graph_is_bipartite_with_mean_polymer_modulus() {
        let rows = [
            record("PU", 0.02, 0.05, 150.0, true),
            record("PU", 0.04, 0.03, -20.0, false),
            record("EVA", 0.05, 0.08, 60.0, true),
        ];
        let refs: Vec<&Record> = rows.iter().collect();
        let graph = build_cluster_graph(&refs);

        // 2 polymers + 3 composites.
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 3);

        let pu = graph.node_by_label("PU").expect("polymer");
        assert_eq!(graph.node(pu).value, Some(0.03));
        assert_eq!(graph.node(pu).display_label(), "PU\n(E=0.03 GPa)");
        assert_eq!(graph.degree(pu), 2);
    }

    #[test]
    fn edge_weight_is_absolute_improvement() {
        let rows = [record("PU", 0.02, 0.05, -40.0, false)];
        let refs: Vec<&Record> = rows.iter().collect();
        let graph = build_cluster_graph(&refs);

        let (_, _, edge) = graph.edges().next().expect("edge");
        assert_eq!(edge.weight, 40.0);
        assert_eq!(edge.improvement_value, Some(-40.0));
        assert_eq!(edge.color, "red");
        assert_eq!(edge.width, 4.0);
    }

    #[test]
    fn comparison_splits_by_modification() {
        let rows = [
            record("PU", 0.02, 0.05, 100.0, true),
            record("PU", 0.02, 0.04, 50.0, true),
            record("PU", 0.02, 0.03, 10.0, false),
        ];
        let refs: Vec<&Record> = rows.iter().collect();
        let graph = build_cluster_graph(&refs);

        let comparison = compare_modified(&graph);
        assert_eq!(comparison.modified_count, 2);
        assert_eq!(comparison.unmodified_count, 1);
        assert_eq!(comparison.avg_modified, 75.0);
        assert_eq!(comparison.avg_unmodified, 10.0);
    }

    #[test]
    fn metrics_rank_the_busiest_polymer_first() {
        let rows = [
            record("PU", 0.02, 0.05, 100.0, true),
            record("PU", 0.02, 0.04, 50.0, true),
            record("EVA", 0.05, 0.08, 20.0, false),
        ];
        let refs: Vec<&Record> = rows.iter().collect();
        let graph = build_cluster_graph(&refs);
        let report = evaluate_cluster(&CLUSTERS[0], &refs, &graph);

        assert_eq!(report.polymers.len(), 2);
        assert_eq!(report.polymers[0].name, "PU");
        assert_eq!(report.polymers[0].weighted, 150.0);
        // 2 edges out of 4 other nodes.
        assert_eq!(report.polymers[0].degree, 0.5);
        assert_eq!(report.samples, 3);
        assert!((report.pct_modified - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn composites_without_modulus_are_left_out() {
        let mut row = record("PU", 0.02, 0.05, 100.0, true);
        row.composite_modulus = None;
        let rows = [row];
        let refs: Vec<&Record> = rows.iter().collect();
        let graph = build_cluster_graph(&refs);

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }
}
