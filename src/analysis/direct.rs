use std::fs;
use std::path::Path;

use anyhow::Result;
use log::info;

use crate::dataset::Dataset;
use crate::graph::{
    apply_distance_layout, build_value_pair_graph, BuildConfig, DistanceBasis, Property, Span,
};
use crate::render::{barnes_hut, save_html, HtmlDoc};

/// Per-row value-pair graph: one primary node, one improvement node, one
/// edge per complete row, with log10-based Euclidean distances driving edge
/// length and width.
pub fn run(dataset: &Dataset, property: Property, out_dir: &Path) -> Result<()> {
    let config = BuildConfig {
        property,
        basis: DistanceBasis::Log10,
        signed_palette: false,
    };

    let rows = dataset.value_pairs(property, config.basis);
    info!(
        "{} clean rows for the {} direct graph",
        rows.len(),
        property.display_name()
    );

    let mut graph = build_value_pair_graph(&rows, config);
    apply_distance_layout(&mut graph, config);

    info!(
        "graph built: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    if let Some(span) = Span::of(graph.edges().filter_map(|(_, _, edge)| edge.distance)) {
        info!("distance range: {:.4} - {:.4}", span.min(), span.max());
    }
    if let Some(primaries) = Span::of(rows.iter().map(|row| row.primary)) {
        info!(
            "{} range: {:.2} - {:.2}",
            property.display_name(),
            primaries.min(),
            primaries.max()
        );
    }
    if let Some(improvements) = Span::of(rows.iter().map(|row| row.improvement)) {
        info!(
            "improvement range: {:.1}% - {:.1}%",
            improvements.min(),
            improvements.max()
        );
    }

    let dir = out_dir.join(format!("{}_direct_output", property.slug()));
    fs::create_dir_all(&dir)?;

    let title = format!("Direct {} Network Graph", property.display_name());
    let doc = HtmlDoc::new(&title, barnes_hut(-8000.0, 0.3, 200.0, 0.05, 0.09, 0.0));
    let path = dir.join(format!("{}_direct_graph.html", property.slug()));
    save_html(&path, &doc, &graph)?;
    info!("interactive graph saved: {}", path.display());

    Ok(())
}
