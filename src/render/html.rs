use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::graph::PropertyGraph;

/// One interactive visualization page: a vis-network canvas fed with the
/// graph's nodes and edges and a physics options block.
pub struct HtmlDoc<'a> {
    pub title: &'a str,
    pub height: &'a str,
    pub bgcolor: &'a str,
    pub font_color: &'a str,
    pub options: Value,
    /// Adds the physics tuning panel, the counterpart of the source's
    /// interactive controls.
    pub physics_panel: bool,
    /// Optional block injected above the canvas (cluster info headers).
    pub header: Option<String>,
}

impl<'a> HtmlDoc<'a> {
    pub fn new(title: &'a str, options: Value) -> Self {
        Self {
            title,
            height: "1000px",
            bgcolor: "#222222",
            font_color: "white",
            options,
            physics_panel: true,
            header: None,
        }
    }
}

pub fn barnes_hut(
    gravity: f64,
    central_gravity: f64,
    spring_length: f64,
    spring_constant: f64,
    damping: f64,
    avoid_overlap: f64,
) -> Value {
    json!({
        "physics": {
            "enabled": true,
            "solver": "barnesHut",
            "barnesHut": {
                "gravitationalConstant": gravity,
                "centralGravity": central_gravity,
                "springLength": spring_length,
                "springConstant": spring_constant,
                "damping": damping,
                "avoidOverlap": avoid_overlap,
            },
        },
    })
}

pub fn repulsion(node_distance: f64, spring_length: f64, spring_constant: f64) -> Value {
    json!({
        "physics": {
            "enabled": true,
            "solver": "repulsion",
            "repulsion": {
                "nodeDistance": node_distance,
                "centralGravity": 0.2,
                "springLength": spring_length,
                "springConstant": spring_constant,
                "damping": 0.09,
            },
        },
    })
}

pub fn force_atlas_2() -> Value {
    json!({
        "physics": {
            "enabled": true,
            "solver": "forceAtlas2Based",
        },
    })
}

pub fn save_html(path: &Path, doc: &HtmlDoc, graph: &PropertyGraph) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_html(&mut writer, doc, graph)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

pub fn write_html<W: Write>(writer: &mut W, doc: &HtmlDoc, graph: &PropertyGraph) -> std::io::Result<()> {
    let nodes = node_values(doc, graph);
    let edges = edge_values(graph);
    let options = merged_options(doc);

    write!(
        writer,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <script src="https://unpkg.com/vis-network/standalone/umd/vis-network.min.js"></script>
    <style>
        body {{ margin: 0; background-color: {bgcolor}; color: {font_color}; font-family: sans-serif; }}
        #network {{ width: 100%; height: {height}; }}
    </style>
</head>
<body>
"#,
        title = escape_html(doc.title),
        bgcolor = doc.bgcolor,
        font_color = doc.font_color,
        height = doc.height,
    )?;

    if let Some(header) = &doc.header {
        writeln!(writer, "<center>\n{header}\n</center>")?;
    }

    write!(
        writer,
        r#"<div id="network"></div>
<script>
    const nodes = new vis.DataSet({nodes});
    const edges = new vis.DataSet({edges});
    const container = document.getElementById("network");
    const network = new vis.Network(container, {{ nodes, edges }}, {options});
</script>
</body>
</html>
"#,
        nodes = Value::Array(nodes),
        edges = Value::Array(edges),
        options = options,
    )
}

fn node_values(doc: &HtmlDoc, graph: &PropertyGraph) -> Vec<Value> {
    graph
        .nodes()
        .map(|(index, node)| {
            let mut object = json!({
                "id": index.index(),
                "label": node.display_label(),
                "color": node.color,
                "size": node.size,
                "title": node.title,
            });
            if let Some((x, y)) = node.position {
                object["x"] = json!(x);
                object["y"] = json!(y);
            }
            if node.pinned {
                object["physics"] = json!(false);
            }
            if let Some(size) = node.font_size {
                object["font"] = json!({ "size": size, "color": doc.font_color });
            }
            object
        })
        .collect()
}

fn edge_values(graph: &PropertyGraph) -> Vec<Value> {
    graph
        .edges()
        .map(|(source, target, edge)| {
            let mut object = json!({
                "from": source.index(),
                "to": target.index(),
                "width": edge.width,
                "color": edge.color,
                "title": edge.title,
            });
            if let Some(label) = &edge.label {
                object["label"] = json!(label);
                object["font"] = json!({ "color": "white", "size": 10 });
            }
            if let Some(length) = edge.length {
                object["length"] = json!(length);
            }
            object
        })
        .collect()
}

fn merged_options(doc: &HtmlDoc) -> Value {
    let mut options = doc.options.clone();
    if doc.physics_panel {
        if let Value::Object(map) = &mut options {
            map.insert(
                "configure".to_string(),
                json!({ "enabled": true, "filter": "physics" }),
            );
        }
    }
    options
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeAttrs, NodeAttrs, NodeCategory};

    #[test]
    fn page_embeds_nodes_edges_and_physics() {
        let mut graph = PropertyGraph::new();
        let a = graph.upsert_node(NodeAttrs {
            color: "lightblue".to_string(),
            ..NodeAttrs::new("2.00 GPa", NodeCategory::PrimaryMeasurement)
        });
        let b = graph.upsert_node(NodeAttrs::new("50.0%", NodeCategory::Improvement));
        graph.add_edge(
            a,
            b,
            EdgeAttrs {
                label: Some("1.727".to_string()),
                length: Some(120.0),
                ..EdgeAttrs::default()
            },
        );

        let doc = HtmlDoc::new("test graph", barnes_hut(-8000.0, 0.3, 200.0, 0.05, 0.09, 0.0));
        let mut output = Vec::new();
        write_html(&mut output, &doc, &graph).expect("write succeeds");
        let html = String::from_utf8(output).expect("valid utf-8");

        assert!(html.contains("2.00 GPa"));
        assert!(html.contains("50.0%"));
        assert!(html.contains("\"length\":120.0"));
        assert!(html.contains("barnesHut"));
        assert!(html.contains("\"filter\":\"physics\""));
    }

    #[test]
    fn pinned_nodes_disable_physics() {
        let mut graph = PropertyGraph::new();
        graph.upsert_node(NodeAttrs {
            position: Some((0.0, 0.0)),
            pinned: true,
            ..NodeAttrs::new("MODIFIED", NodeCategory::Center)
        });

        let doc = HtmlDoc::new("centers", repulsion(200.0, 200.0, 0.05));
        let mut output = Vec::new();
        write_html(&mut output, &doc, &graph).expect("write succeeds");
        let html = String::from_utf8(output).expect("valid utf-8");

        assert!(html.contains("\"physics\":false"));
        assert!(html.contains("\"x\":0.0"));
    }
}
