use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::graph::PropertyGraph;

/// GraphML export for external tools (Gephi, Cytoscape). Node ids are the
/// node labels; attributes are declared up front and emitted when present.
pub fn write_graphml<W: Write>(writer: &mut W, graph: &PropertyGraph) -> std::io::Result<()> {
    writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        writer,
        r#"<graphml xmlns="http://graphml.graphdrawing.org/xmlns">"#
    )?;

    for (id, name, kind, target) in [
        ("d0", "node_type", "string", "node"),
        ("d1", "value", "double", "node"),
        ("d2", "log10_value", "double", "node"),
        ("d3", "color", "string", "node"),
        ("d4", "size", "double", "node"),
        ("d5", "weight", "double", "edge"),
        ("d6", "relation", "string", "edge"),
        ("d7", "distance", "double", "edge"),
        ("d8", "improvement", "double", "edge"),
    ] {
        writeln!(
            writer,
            r#"  <key id="{id}" for="{target}" attr.name="{name}" attr.type="{kind}"/>"#
        )?;
    }

    writeln!(writer, r#"  <graph edgedefault="undirected">"#)?;

    for (_, node) in graph.nodes() {
        writeln!(writer, r#"    <node id="{}">"#, escape_xml(&node.label))?;
        writeln!(
            writer,
            r#"      <data key="d0">{}</data>"#,
            node.category.label()
        )?;
        if let Some(value) = node.value {
            writeln!(writer, r#"      <data key="d1">{value}</data>"#)?;
        }
        if let Some(log10) = node.log10_value {
            writeln!(writer, r#"      <data key="d2">{log10}</data>"#)?;
        }
        writeln!(
            writer,
            r#"      <data key="d3">{}</data>"#,
            escape_xml(&node.color)
        )?;
        writeln!(writer, r#"      <data key="d4">{}</data>"#, node.size)?;
        writeln!(writer, r#"    </node>"#)?;
    }

    for (source, target, edge) in graph.edges() {
        writeln!(
            writer,
            r#"    <edge source="{}" target="{}">"#,
            escape_xml(&graph.node(source).label),
            escape_xml(&graph.node(target).label)
        )?;
        writeln!(writer, r#"      <data key="d5">{}</data>"#, edge.weight)?;
        if let Some(relation) = &edge.relation {
            writeln!(
                writer,
                r#"      <data key="d6">{}</data>"#,
                escape_xml(relation)
            )?;
        }
        if let Some(distance) = edge.distance {
            writeln!(writer, r#"      <data key="d7">{distance}</data>"#)?;
        }
        if let Some(improvement) = edge.improvement_value {
            writeln!(writer, r#"      <data key="d8">{improvement}</data>"#)?;
        }
        writeln!(writer, r#"    </edge>"#)?;
    }

    writeln!(writer, r#"  </graph>"#)?;
    writeln!(writer, r#"</graphml>"#)
}

pub fn save_graphml(path: &Path, graph: &PropertyGraph) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_graphml(&mut writer, graph)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeAttrs, NodeAttrs, NodeCategory};

    #[test]
    fn emits_nodes_edges_and_escapes_labels() {
        let mut graph = PropertyGraph::new();
        let a = graph.upsert_node(NodeAttrs {
            value: Some(5.0),
            ..NodeAttrs::new("epoxy & resin", NodeCategory::Polymer)
        });
        let b = graph.upsert_node(NodeAttrs::new("modified", NodeCategory::Modification));
        graph.add_edge(
            a,
            b,
            EdgeAttrs {
                weight: 2.5,
                relation: Some("has_modification".to_string()),
                ..EdgeAttrs::default()
            },
        );

        let mut output = Vec::new();
        write_graphml(&mut output, &graph).expect("write succeeds");
        let xml = String::from_utf8(output).expect("valid utf-8");

        assert!(xml.contains(r#"<node id="epoxy &amp; resin">"#));
        assert!(xml.contains(r#"<data key="d1">5</data>"#));
        assert!(xml.contains(r#"<data key="d5">2.5</data>"#));
        assert!(xml.contains("has_modification"));
        assert!(xml.contains(r#"edgedefault="undirected""#));
    }
}
