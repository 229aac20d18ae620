use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::graph::PropertyGraph;

/// Node-link serialization matching the layout of the reference graph
/// library's JSON export: node ids are labels, links reference them.
pub fn node_link_data(graph: &PropertyGraph) -> Value {
    let nodes: Vec<Value> = graph
        .nodes()
        .map(|(_, node)| {
            let mut object = json!({
                "id": node.label,
                "node_type": node.category.label(),
                "color": node.color,
                "size": node.size,
            });
            if let Some(value) = node.value {
                object["value"] = json!(value);
            }
            if let Some(log10) = node.log10_value {
                object["log10_value"] = json!(log10);
            }
            object
        })
        .collect();

    let links: Vec<Value> = graph
        .edges()
        .map(|(source, target, edge)| {
            let mut object = json!({
                "source": graph.node(source).label,
                "target": graph.node(target).label,
                "weight": edge.weight,
            });
            if let Some(relation) = &edge.relation {
                object["relation"] = json!(relation);
            }
            if let Some(distance) = edge.distance {
                object["distance"] = json!(distance);
            }
            if let Some(improvement) = edge.improvement_value {
                object["improvement"] = json!(improvement);
            }
            object
        })
        .collect();

    json!({
        "directed": false,
        "multigraph": false,
        "graph": {},
        "nodes": nodes,
        "links": links,
    })
}

pub fn save_node_link(path: &Path, graph: &PropertyGraph) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &node_link_data(graph))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeAttrs, NodeAttrs, NodeCategory};

    #[test]
    fn node_link_uses_labels_as_ids() {
        let mut graph = PropertyGraph::new();
        let a = graph.upsert_node(NodeAttrs::new("PA6", NodeCategory::Polymer));
        let b = graph.upsert_node(NodeAttrs::new("intercalated", NodeCategory::Dispersion));
        graph.add_edge(
            a,
            b,
            EdgeAttrs {
                weight: 3.0,
                relation: Some("has_dispersion".to_string()),
                ..EdgeAttrs::default()
            },
        );

        let data = node_link_data(&graph);
        assert_eq!(data["directed"], json!(false));
        assert_eq!(data["nodes"].as_array().unwrap().len(), 2);

        let link = &data["links"][0];
        assert_eq!(link["source"], json!("PA6"));
        assert_eq!(link["target"], json!("intercalated"));
        assert_eq!(link["weight"], json!(3.0));
        assert_eq!(link["relation"], json!("has_dispersion"));
    }
}
