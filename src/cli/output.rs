//! Output formatting module
//!
//! This module writes a pathway graph in the supported output formats.

use crate::pathway::{GapWarning, MetadataTable, PathwayGraph};
use crate::Result;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

/// Write the node-link JSON document, four-space indented
pub fn output_json(w: &mut impl std::io::Write, graph: &PathwayGraph) -> Result<()> {
    let value = graph.to_node_link();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut *w, formatter);
    value.serialize(&mut serializer)?;
    writeln!(w)?; // Add trailing newline
    Ok(())
}

/// Write the graph in Graphviz DOT format
pub fn output_dot(w: &mut impl std::io::Write, graph: &PathwayGraph) -> Result<()> {
    w.write_all(graph.to_dot().as_bytes())?;
    Ok(())
}

/// Write a summary and the edge list as a text table
pub fn output_table(
    w: &mut impl std::io::Write,
    graph: &PathwayGraph,
    warnings: &[GapWarning],
) -> Result<()> {
    let stats = graph.stats();

    writeln!(w, "Cohort Pathways - Transition Graph")?;
    writeln!(w, "{}", "=".repeat(80))?;
    writeln!(w)?;

    writeln!(w, "Summary:")?;
    writeln!(w, "  Students:        {}", stats.students)?;
    writeln!(w, "  Time buckets:    {}", stats.max_bucket)?;
    writeln!(w, "  Nodes:           {}", stats.total_nodes)?;
    writeln!(w, "  Edges:           {}", stats.total_edges)?;
    writeln!(w, "  Gap warnings:    {}", warnings.len())?;
    writeln!(w)?;

    let edges = graph.sorted_edges();
    if !edges.is_empty() {
        writeln!(w, "Edges:")?;
        writeln!(w, "{:-<80}", "")?;
        writeln!(w, "{:<34} {:<34} {:>8}", "Source", "Target", "Students")?;
        writeln!(w, "{:-<80}", "")?;

        for (source, target, edge) in edges {
            let marker = if edge.missing_source { " *" } else { "" };
            writeln!(
                w,
                "{:<34} {:<34} {:>8}{}",
                truncate(&source.name(), 34),
                truncate(&target.name(), 34),
                edge.count,
                marker
            )?;
        }
        writeln!(w)?;
    }

    if !warnings.is_empty() {
        writeln!(w, "* source missing; drawn from the no-record node")?;
        for warning in warnings {
            writeln!(w, "  {}", warning)?;
        }
        writeln!(w)?;
    }

    Ok(())
}

/// Write the metadata table
pub fn output_vocabulary(w: &mut impl std::io::Write, table: &MetadataTable) -> Result<()> {
    writeln!(w, "{:<30} {:>5} {:<9} Long name", "Key", "Order", "Color")?;
    writeln!(w, "{:-<80}", "")?;
    for (key, meta) in table.sorted() {
        writeln!(
            w,
            "{:<30} {:>5} {:<9} {}",
            key, meta.sort_order, meta.color, meta.long_name
        )?;
    }
    Ok(())
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width - 3).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathway::AggregatedEdge;

    fn create_test_graph() -> PathwayGraph {
        let edges = vec![
            AggregatedEdge {
                source: Some("hsgrad-0".parse().unwrap()),
                target: "enr4year-1".parse().unwrap(),
                time: 0,
                ids: vec!["101".to_string(), "102".to_string()],
            },
            AggregatedEdge {
                source: None,
                target: "enr2year-2".parse().unwrap(),
                time: 1,
                ids: vec!["103".to_string()],
            },
        ];
        PathwayGraph::assemble(&edges, &MetadataTable::reference()).unwrap()
    }

    #[test]
    fn test_output_json() {
        let graph = create_test_graph();
        let mut output = Vec::new();
        output_json(&mut output, &graph).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("\n    \"directed\": true"));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["links"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_output_dot() {
        let graph = create_test_graph();
        let mut output = Vec::new();
        output_dot(&mut output, &graph).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("style=dashed"));
    }

    #[test]
    fn test_output_table() {
        let graph = create_test_graph();
        let warnings = vec![GapWarning {
            student_id: "103".to_string(),
            time: 1,
        }];
        let mut output = Vec::new();
        output_table(&mut output, &graph, &warnings).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Students:        3"));
        assert!(text.contains("norecordfound-1"));
        assert!(text.contains("student 103 has no state at bucket 1"));
    }

    #[test]
    fn test_output_vocabulary() {
        let mut output = Vec::new();
        output_vocabulary(&mut output, &MetadataTable::reference()).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("No College Record Found"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("enr2year,enr4year,enr<2years-10", 12), "enr2year,...");
    }
}
