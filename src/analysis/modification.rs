use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Result;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use crate::dataset::{Dataset, Modification};
use crate::graph::{EdgeAttrs, NodeAttrs, NodeCategory, PropertyGraph, Span};
use crate::render::{barnes_hut, repulsion, save_html, HtmlDoc};
use crate::util::{even_angles, polar};

const SAMPLE_SEED: u64 = 42;
const MAX_SAMPLE: usize = 100;
const SPIRAL_TURNS: f64 = 8.0;

/// One clean row for the modification analyses: the elastic modulus
/// improvement percent and its log10 transform.
#[derive(Clone, Copy, Debug)]
struct Sample {
    percent: f64,
    log10: f64,
}

/// Per-group color scheme. The center and edge tones identify the group;
/// the positive/negative pair encodes the improvement sign.
struct Scheme {
    modification: Modification,
    center_color: &'static str,
    positive: &'static str,
    negative: &'static str,
    edge_color: &'static str,
    faint_edge_color: &'static str,
}

static SCHEMES: [Scheme; 2] = [
    Scheme {
        modification: Modification::Modified,
        center_color: "#FFD700",
        positive: "#4CAF50",
        negative: "#F44336",
        edge_color: "rgba(255, 215, 0, 0.3)",
        faint_edge_color: "rgba(255, 215, 0, 0.2)",
    },
    Scheme {
        modification: Modification::Unmodified,
        center_color: "#00CED1",
        positive: "#2196F3",
        negative: "#FF9800",
        edge_color: "rgba(0, 206, 209, 0.3)",
        faint_edge_color: "rgba(0, 206, 209, 0.2)",
    },
];

impl Scheme {
    fn sign_color(&self, percent: f64) -> &'static str {
        if percent >= 0.0 {
            self.positive
        } else {
            self.negative
        }
    }

    fn center_title(&self) -> String {
        match self.modification {
            Modification::Modified => "Modified Materials".to_string(),
            Modification::Unmodified => "Unmodified Materials".to_string(),
        }
    }

    fn center_node(&self, size: f64, font_size: u32) -> NodeAttrs {
        NodeAttrs {
            color: self.center_color.to_string(),
            size,
            title: self.center_title(),
            font_size: Some(font_size),
            ..NodeAttrs::new(
                self.modification.center_label(),
                NodeCategory::Center,
            )
        }
    }
}

/// Center-node graphs over the elastic modulus improvement column, one set
/// of five styles per modification group, all written under
/// `modification_interactive_output/`.
pub fn run(dataset: &Dataset, out_dir: &Path) -> Result<()> {
    let dir = out_dir.join("modification_interactive_output");
    fs::create_dir_all(&dir)?;

    let groups: Vec<(&Scheme, Vec<Sample>)> = SCHEMES
        .iter()
        .map(|scheme| (scheme, collect_samples(dataset, scheme.modification)))
        .collect();

    let total: usize = groups.iter().map(|(_, samples)| samples.len()).sum();
    info!("{total} clean rows across the modification groups");

    for (scheme, samples) in &groups {
        let name = scheme.modification.label();
        info!("{name}: {} rows", samples.len());
        log_group_stats(name, samples);

        let graph = edge_based_graph(samples, scheme);
        let title = format!("{} Edge-Based Graph", scheme.center_title());
        let doc = HtmlDoc::new(&title, barnes_hut(-50000.0, 0.3, 200.0, 0.01, 0.09, 0.0));
        save_html(&dir.join(format!("{name}_edge_based_graph.html")), &doc, &graph)?;

        let graph = distance_based_graph(samples, scheme);
        let title = format!("{} Distance-Based Graph", scheme.center_title());
        let doc = HtmlDoc::new(&title, repulsion(200.0, 200.0, 0.05));
        save_html(
            &dir.join(format!("{name}_distance_based_graph.html")),
            &doc,
            &graph,
        )?;

        let graph = spiral_graph(samples, scheme);
        let title = format!("{} All Samples", scheme.center_title());
        let mut doc = HtmlDoc::new(&title, spiral_options());
        doc.bgcolor = "#0d1117";
        save_html(
            &dir.join(format!("{name}_all_samples_clean.html")),
            &doc,
            &graph,
        )?;

        let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);
        let graph = sampled_graph(samples, scheme, &mut rng);
        let title = format!("{} Sampled Graph", scheme.center_title());
        let mut doc = HtmlDoc::new(&title, barnes_hut(-80000.0, 0.01, 300.0, 0.008, 0.09, 0.5));
        doc.bgcolor = "#1a1a1a";
        save_html(&dir.join(format!("{name}_clean_graph.html")), &doc, &graph)?;

        let graph = clustered_graph(samples, scheme);
        let title = format!("{} Clustered Graph", scheme.center_title());
        let mut doc = HtmlDoc::new(&title, repulsion(200.0, 300.0, 0.02));
        doc.bgcolor = "#1a1a1a";
        save_html(&dir.join(format!("{name}_clustered.html")), &doc, &graph)?;

        info!("{name}: five interactive graphs saved under {}", dir.display());
    }

    let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);
    let graph = combined_graph(&groups, &mut rng);
    let doc = HtmlDoc::new(
        "Modified vs Unmodified Comparison",
        barnes_hut(-30000.0, 0.1, 300.0, 0.005, 0.09, 0.0),
    );
    save_html(&dir.join("combined_edge_based_graph.html"), &doc, &graph)?;
    info!("combined comparison graph saved under {}", dir.display());

    Ok(())
}

fn collect_samples(dataset: &Dataset, modification: Modification) -> Vec<Sample> {
    dataset
        .records()
        .iter()
        .filter(|record| record.modification == Some(modification))
        .filter_map(|record| {
            Some(Sample {
                percent: record.modulus_improvement?,
                log10: record.modulus_improvement_log10?,
            })
        })
        .collect()
}

fn log_group_stats(name: &str, samples: &[Sample]) {
    if samples.is_empty() {
        return;
    }
    let mean = samples.iter().map(|sample| sample.percent).sum::<f64>() / samples.len() as f64;
    let positive = samples.iter().filter(|sample| sample.percent > 0.0).count();
    let negative = samples.iter().filter(|sample| sample.percent < 0.0).count();
    info!("{name}: mean improvement {mean:.1}%, {positive} positive, {negative} negative");
}

fn sample_title(sample: Sample) -> String {
    format!(
        "Elastic Modulus Improvement\nValue: {:.1}%\nLog10: {:.4}",
        sample.percent, sample.log10
    )
}

/// Star graph from the group center, node size keyed to the log10 magnitude.
fn edge_based_graph(samples: &[Sample], scheme: &Scheme) -> PropertyGraph {
    let mut graph = PropertyGraph::new();
    let center = graph.upsert_node(scheme.center_node(50.0, 20));

    for (row, sample) in samples.iter().enumerate() {
        let node = graph.upsert_node(NodeAttrs {
            display: Some(format!("{:.1}%", sample.percent)),
            value: Some(sample.percent),
            log10_value: Some(sample.log10),
            color: scheme.sign_color(sample.percent).to_string(),
            size: 15.0 + (sample.log10.abs() * 10.0).min(35.0),
            title: sample_title(*sample),
            ..NodeAttrs::new(
                format!("EM_{row}_{:.1}%", sample.percent),
                NodeCategory::Improvement,
            )
        });
        graph.add_edge(
            center,
            node,
            EdgeAttrs {
                width: 2.0,
                color: scheme.edge_color.to_string(),
                title: format!(
                    "{} \u{2192} {:.1}%\nLog10: {:.4}",
                    scheme.modification.center_label(),
                    sample.percent,
                    sample.log10
                ),
                ..EdgeAttrs::default()
            },
        );
    }

    graph
}

/// Star graph where the edge length carries the normalized improvement:
/// low percent close to the center, high percent far out.
fn distance_based_graph(samples: &[Sample], scheme: &Scheme) -> PropertyGraph {
    let mut graph = PropertyGraph::new();
    let center = graph.upsert_node(scheme.center_node(60.0, 20));

    let span = Span::of(samples.iter().map(|sample| sample.percent));

    for (row, sample) in samples.iter().enumerate() {
        let length = match &span {
            Some(span) => span.scale(sample.percent, 100.0, 500.0),
            None => 300.0,
        };

        let node = graph.upsert_node(NodeAttrs {
            display: Some(format!("{:.0}%", sample.percent)),
            value: Some(sample.percent),
            log10_value: Some(sample.log10),
            color: scheme.sign_color(sample.percent).to_string(),
            size: 10.0 + (sample.percent.abs() / 5.0).min(30.0),
            title: format!("{}\nEdge Length: {length:.0}", sample_title(*sample)),
            ..NodeAttrs::new(
                format!("{}{row}", &scheme.modification.center_label()[..1]),
                NodeCategory::Improvement,
            )
        });
        graph.add_edge(
            center,
            node,
            EdgeAttrs {
                weight: 1.0 / length,
                width: 2.0,
                color: distance_edge_color(sample.percent).to_string(),
                title: format!(
                    "Improvement: {:.1}%\nEdge Length: {length:.0}",
                    sample.percent
                ),
                length: Some(length),
                improvement_value: Some(sample.percent),
                ..EdgeAttrs::default()
            },
        );
    }

    graph
}

fn distance_edge_color(percent: f64) -> &'static str {
    if percent < 0.0 {
        "rgba(255, 100, 100, 0.3)"
    } else if percent < 50.0 {
        "rgba(255, 200, 100, 0.3)"
    } else if percent < 100.0 {
        "rgba(100, 255, 100, 0.3)"
    } else {
        "rgba(100, 100, 255, 0.3)"
    }
}

/// Every sample on a spiral: sorted by percent, angle advances with the
/// sort position, radius with the normalized percent. Positions are fixed
/// so the page opens readable even with hundreds of nodes.
fn spiral_graph(samples: &[Sample], scheme: &Scheme) -> PropertyGraph {
    let mut graph = PropertyGraph::new();
    let center = graph.upsert_node(NodeAttrs {
        position: Some((0.0, 0.0)),
        pinned: true,
        ..scheme.center_node(80.0, 30)
    });

    let mut sorted: Vec<Sample> = samples.to_vec();
    sorted.sort_by(|a, b| a.percent.total_cmp(&b.percent));
    let span = Span::of(sorted.iter().map(|sample| sample.percent));

    for (position, sample) in sorted.iter().enumerate() {
        let radius = match &span {
            Some(span) => span.scale(sample.percent, 150.0, 800.0),
            None => 150.0,
        };
        let progress = position as f64 / sorted.len() as f64;
        let angle = progress * SPIRAL_TURNS * std::f64::consts::TAU;

        let node = graph.upsert_node(NodeAttrs {
            display: Some(format!("{:.0}%", sample.percent)),
            value: Some(sample.percent),
            log10_value: Some(sample.log10),
            color: spiral_node_color(sample.percent, scheme).to_string(),
            size: 8.0 + (sample.percent.abs() / 20.0).min(15.0),
            title: format!("{:.1}%", sample.percent),
            position: Some(polar(radius, angle)),
            font_size: Some(6),
            ..NodeAttrs::new(
                format!(
                    "{}_{position}_{:.0}",
                    &scheme.modification.center_label()[..1],
                    sample.percent
                ),
                NodeCategory::Improvement,
            )
        });
        graph.add_edge(
            center,
            node,
            EdgeAttrs {
                width: (sample.percent.abs() / 100.0).min(3.0).max(0.5),
                color: spiral_edge_color(sample.percent).to_string(),
                title: format!("{:.1}%", sample.percent),
                ..EdgeAttrs::default()
            },
        );
    }

    graph
}

fn spiral_node_color(percent: f64, scheme: &Scheme) -> &'static str {
    if percent >= 100.0 {
        "#00FF00"
    } else if percent >= 50.0 {
        scheme.positive
    } else if percent >= 0.0 {
        "#FFFF00"
    } else {
        scheme.negative
    }
}

fn spiral_edge_color(percent: f64) -> &'static str {
    if percent >= 100.0 {
        "rgba(0, 255, 0, 0.4)"
    } else if percent >= 50.0 {
        "rgba(76, 175, 80, 0.4)"
    } else if percent >= 0.0 {
        "rgba(255, 255, 0, 0.4)"
    } else {
        "rgba(244, 67, 54, 0.4)"
    }
}

fn spiral_options() -> serde_json::Value {
    json!({
        "nodes": {
            "font": { "size": 8 },
            "borderWidth": 1,
        },
        "edges": {
            "smooth": { "enabled": false },
        },
        "physics": {
            "enabled": true,
            "solver": "repulsion",
            "repulsion": {
                "nodeDistance": 300,
                "centralGravity": 0.001,
                "springLength": 400,
                "springConstant": 0.001,
                "damping": 0.09,
            },
        },
    })
}

/// Seeded sample of at most 100 rows on a circle, radius keyed to the
/// normalized percent. The draw is the only randomness in the program.
fn sampled_graph(samples: &[Sample], scheme: &Scheme, rng: &mut StdRng) -> PropertyGraph {
    let mut graph = PropertyGraph::new();
    let center = graph.upsert_node(NodeAttrs {
        position: Some((0.0, 0.0)),
        pinned: true,
        ..scheme.center_node(60.0, 25)
    });

    let amount = samples.len().min(MAX_SAMPLE);
    let chosen: Vec<Sample> = if amount == samples.len() {
        samples.to_vec()
    } else {
        rand::seq::index::sample(rng, samples.len(), amount)
            .into_iter()
            .map(|index| samples[index])
            .collect()
    };

    let span = Span::of(chosen.iter().map(|sample| sample.percent));
    let angles = even_angles(chosen.len());

    for (position, sample) in chosen.iter().enumerate() {
        let radius = match &span {
            Some(span) => span.scale(sample.percent, 200.0, 600.0),
            None => 200.0,
        };

        let node = graph.upsert_node(NodeAttrs {
            display: Some(format!("{:.0}%", sample.percent)),
            value: Some(sample.percent),
            color: scheme.sign_color(sample.percent).to_string(),
            size: 15.0 + (sample.percent.abs() / 10.0).min(25.0),
            title: format!(
                "{}\nImprovement: {:.1}%\nDistance from center: {radius:.0}",
                scheme.center_title().trim_end_matches('s'),
                sample.percent
            ),
            position: Some(polar(radius, angles[position])),
            font_size: Some(10),
            ..NodeAttrs::new(
                format!("{}{position}", &scheme.modification.center_label()[..1]),
                NodeCategory::Improvement,
            )
        });
        graph.add_edge(
            center,
            node,
            EdgeAttrs {
                color: scheme.faint_edge_color.to_string(),
                title: format!("Improvement: {:.1}%", sample.percent),
                ..EdgeAttrs::default()
            },
        );
    }

    graph
}

/// Compact variant: rows grouped into 10-percent bins, one node per bin
/// sized by the bin population.
fn clustered_graph(samples: &[Sample], scheme: &Scheme) -> PropertyGraph {
    let mut bins: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for sample in samples {
        let bin = ((sample.percent / 10.0).floor() * 10.0) as i64;
        bins.entry(bin).or_default().push(sample.percent);
    }

    let mut graph = PropertyGraph::new();
    let center = graph.upsert_node(NodeAttrs {
        display: Some(format!(
            "{}\n({})",
            scheme.modification.center_label(),
            samples.len()
        )),
        title: format!("{} ({} samples)", scheme.center_title(), samples.len()),
        position: Some((0.0, 0.0)),
        pinned: true,
        ..scheme.center_node(60.0, 16)
    });

    let angles = even_angles(bins.len());

    for (position, (bin, members)) in bins.iter().enumerate() {
        let count = members.len();
        let mean = members.iter().sum::<f64>() / count as f64;
        let distance = 200.0 + (*bin as f64).abs() / 5.0;

        let node = graph.upsert_node(NodeAttrs {
            display: Some(format!("{bin}%+\n({count})")),
            value: Some(mean),
            color: scheme.sign_color(mean).to_string(),
            size: 15.0 + (count as f64 * 2.0).min(40.0),
            title: format!(
                "Range: {bin}% - {}%\nSamples: {count}\nAvg: {mean:.1}%",
                bin + 10
            ),
            position: Some(polar(distance, angles[position])),
            font_size: Some(10),
            ..NodeAttrs::new(
                format!("{}_cluster_{bin}", scheme.modification.label()),
                NodeCategory::Bin,
            )
        });
        graph.add_edge(
            center,
            node,
            EdgeAttrs {
                width: (count as f64 / 5.0).min(5.0),
                color: "rgba(200, 200, 200, 0.5)".to_string(),
                ..EdgeAttrs::default()
            },
        );
    }

    graph
}

/// Both groups on one page: two pinned centers, up to 50 rows each,
/// scattered around their center with a seeded jitter.
fn combined_graph(groups: &[(&Scheme, Vec<Sample>)], rng: &mut StdRng) -> PropertyGraph {
    let mut graph = PropertyGraph::new();

    for (side, (scheme, samples)) in groups.iter().enumerate() {
        let center_x = if side == 0 { -400.0 } else { 400.0 };
        let center = graph.upsert_node(NodeAttrs {
            position: Some((center_x, 0.0)),
            pinned: true,
            ..scheme.center_node(60.0, 25)
        });

        for (row, sample) in samples.iter().take(50).enumerate() {
            let x = center_x + rng.gen_range(-200.0..200.0);
            let y = rng.gen_range(-300.0..300.0);
            let node = graph.upsert_node(NodeAttrs {
                display: Some(format!("{:.0}%", sample.percent)),
                value: Some(sample.percent),
                color: scheme.sign_color(sample.percent).to_string(),
                size: 10.0,
                title: format!(
                    "{}: {:.1}%",
                    scheme.center_title().trim_end_matches(" Materials"),
                    sample.percent
                ),
                position: Some((x, y)),
                ..NodeAttrs::new(
                    format!("{}_{row}", &scheme.modification.center_label()[..1]),
                    NodeCategory::Improvement,
                )
            });
            graph.add_edge(
                center,
                node,
                EdgeAttrs {
                    color: scheme.faint_edge_color.to_string(),
                    ..EdgeAttrs::default()
                },
            );
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(percents: &[f64]) -> Vec<Sample> {
        percents
            .iter()
            .map(|&percent| Sample {
                percent,
                log10: percent.abs().max(1.0).log10(),
            })
            .collect()
    }

    fn modified_scheme() -> &'static Scheme {
        &SCHEMES[0]
    }

    #[test]
    fn edge_based_is_a_star_from_the_center() {
        let graph = edge_based_graph(&samples(&[50.0, -10.0, 120.0]), modified_scheme());
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);

        let center = graph.node_by_label("MODIFIED").expect("center");
        assert_eq!(graph.degree(center), 3);
        assert_eq!(graph.node(center).size, 50.0);
    }

    #[test]
    fn distance_length_tracks_the_percent() {
        let graph = distance_based_graph(&samples(&[0.0, 100.0]), modified_scheme());
        let lengths: Vec<f64> = graph
            .edges()
            .map(|(_, _, edge)| edge.length.expect("length"))
            .collect();
        assert!(lengths.contains(&100.0));
        assert!(lengths.contains(&500.0));
    }

    #[test]
    fn spiral_pins_every_node() {
        let graph = spiral_graph(&samples(&[-20.0, 10.0, 60.0, 150.0]), modified_scheme());
        for (_, node) in graph.nodes() {
            assert!(node.position.is_some());
        }
        // 4-band color coding.
        let colors: Vec<&str> = graph
            .nodes()
            .filter(|(_, node)| node.category == NodeCategory::Improvement)
            .map(|(_, node)| node.color.as_str())
            .collect();
        assert!(colors.contains(&"#F44336"));
        assert!(colors.contains(&"#FFFF00"));
        assert!(colors.contains(&"#4CAF50"));
        assert!(colors.contains(&"#00FF00"));
    }

    #[test]
    fn sampling_caps_the_node_count_and_is_reproducible() {
        let many = samples(&(0..250).map(|value| value as f64).collect::<Vec<_>>());
        let mut first_rng = StdRng::seed_from_u64(SAMPLE_SEED);
        let first = sampled_graph(&many, modified_scheme(), &mut first_rng);
        assert_eq!(first.node_count(), MAX_SAMPLE + 1);

        let mut second_rng = StdRng::seed_from_u64(SAMPLE_SEED);
        let second = sampled_graph(&many, modified_scheme(), &mut second_rng);
        let labels = |graph: &PropertyGraph| {
            let mut labels: Vec<String> = graph
                .nodes()
                .map(|(_, node)| node.display_label().to_string())
                .collect();
            labels.sort();
            labels
        };
        assert_eq!(labels(&first), labels(&second));
    }

    #[test]
    fn clustered_bins_by_ten_percent() {
        let graph = clustered_graph(&samples(&[1.0, 5.0, 12.0, -3.0]), modified_scheme());
        // Bins -10, 0 and 10, plus the center.
        assert_eq!(graph.node_count(), 4);

        let zero_bin = graph.node_by_label("modified_cluster_0").expect("bin");
        assert_eq!(graph.node(zero_bin).display_label(), "0%+\n(2)");
        assert_eq!(graph.node(zero_bin).size, 15.0 + 4.0);
    }

    #[test]
    fn negative_percent_bins_round_down() {
        let graph = clustered_graph(&samples(&[-3.0]), modified_scheme());
        assert!(graph.node_by_label("modified_cluster_-10").is_some());
    }
}
