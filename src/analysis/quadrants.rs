use std::fs;
use std::path::Path;

use anyhow::Result;
use log::{info, warn};

use crate::dataset::Dataset;
use crate::graph::{
    apply_distance_layout, build_value_pair_graph, BuildConfig, DistanceBasis, Property, ValuePair,
};
use crate::render::{barnes_hut, save_html, HtmlDoc};

/// The four sign quadrants of (primary value, improvement). Raw-value
/// distances here, since log10 transforms are undefined for the negative
/// half of each axis.
const QUADRANTS: [Quadrant; 4] = [
    Quadrant {
        slug: "positive_positive",
        description: "Positive Value / Positive Improvement",
        primary_positive: true,
        improvement_positive: true,
    },
    Quadrant {
        slug: "positive_negative",
        description: "Positive Value / Negative Improvement",
        primary_positive: true,
        improvement_positive: false,
    },
    Quadrant {
        slug: "negative_positive",
        description: "Negative Value / Positive Improvement",
        primary_positive: false,
        improvement_positive: true,
    },
    Quadrant {
        slug: "negative_negative",
        description: "Negative Value / Negative Improvement",
        primary_positive: false,
        improvement_positive: false,
    },
];

struct Quadrant {
    slug: &'static str,
    description: &'static str,
    primary_positive: bool,
    improvement_positive: bool,
}

impl Quadrant {
    fn contains(&self, row: &ValuePair) -> bool {
        let primary = if self.primary_positive {
            row.primary > 0.0
        } else {
            row.primary < 0.0
        };
        let improvement = if self.improvement_positive {
            row.improvement >= 0.0
        } else {
            row.improvement < 0.0
        };
        primary && improvement
    }
}

/// One raw-distance graph per sign quadrant, written under
/// `{property}_direct_output_new/`. Empty quadrants are reported and
/// skipped rather than producing empty pages.
pub fn run(dataset: &Dataset, property: Property, out_dir: &Path) -> Result<()> {
    let config = BuildConfig {
        property,
        basis: DistanceBasis::Raw,
        signed_palette: true,
    };

    let rows = dataset.value_pairs(property, config.basis);
    info!(
        "{} clean rows for the {} quadrant graphs",
        rows.len(),
        property.display_name()
    );

    let dir = out_dir.join(format!("{}_direct_output_new", property.slug()));
    fs::create_dir_all(&dir)?;

    for quadrant in &QUADRANTS {
        let group: Vec<ValuePair> = rows
            .iter()
            .copied()
            .filter(|row| quadrant.contains(row))
            .collect();

        if group.is_empty() {
            warn!("no rows in the {} quadrant, skipping", quadrant.slug);
            continue;
        }

        let mut graph = build_value_pair_graph(&group, config);
        apply_distance_layout(&mut graph, config);
        info!(
            "{}: {} rows, {} nodes, {} edges",
            quadrant.slug,
            group.len(),
            graph.node_count(),
            graph.edge_count()
        );

        let title = format!(
            "{} Network Graph ({})",
            property.display_name(),
            quadrant.description
        );
        let doc = HtmlDoc::new(&title, barnes_hut(-8000.0, 0.3, 200.0, 0.05, 0.09, 0.0));
        let path = dir.join(format!("{}_graph.html", quadrant.slug));
        save_html(&path, &doc, &graph)?;
        info!("interactive graph saved: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(primary: f64, improvement: f64) -> ValuePair {
        ValuePair {
            primary,
            improvement,
            primary_log10: None,
            improvement_log10: None,
        }
    }

    #[test]
    fn quadrants_partition_nonzero_rows() {
        let rows = [
            pair(2.0, 50.0),
            pair(2.0, -10.0),
            pair(-1.0, 30.0),
            pair(-1.0, -5.0),
        ];
        for row in &rows {
            let hits = QUADRANTS
                .iter()
                .filter(|quadrant| quadrant.contains(row))
                .count();
            assert_eq!(hits, 1, "row ({}, {})", row.primary, row.improvement);
        }
    }

    #[test]
    fn zero_improvement_counts_as_positive() {
        let row = pair(3.0, 0.0);
        assert!(QUADRANTS[0].contains(&row));
        assert!(!QUADRANTS[1].contains(&row));
    }

    #[test]
    fn zero_primary_belongs_to_no_quadrant() {
        let row = pair(0.0, 10.0);
        assert!(QUADRANTS.iter().all(|quadrant| !quadrant.contains(&row)));
    }
}
