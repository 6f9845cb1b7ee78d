//! Graphviz PNG renderer.
//!
//! The graph is converted into a strict directed DOT graph with boxed nodes,
//! polyline splines and edge concentration, then handed to the `dot`
//! executable.

use std::path::Path;

use dot_structures::{
    Attribute, Edge, EdgeTy, Graph, GraphAttributes, Id, Node, NodeId as DotNodeId, Stmt, Vertex,
};
use graphviz_rust::{
    cmd::{CommandArg, Format},
    exec,
    printer::{DotPrinter, PrinterContext},
};
use log::debug;

use astviz_core::graph::{AstGraph, NodeId};

use super::{RenderError, Renderer};

/// Renders syntax graphs to PNG files with the Graphviz `dot` layout engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct GraphvizRenderer;

impl GraphvizRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for GraphvizRenderer {
    fn render(&self, graph: &AstGraph, output: &Path) -> Result<(), RenderError> {
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            output = output.display().to_string();
            "Invoking graphviz"
        );

        exec(
            to_dot_graph(graph),
            &mut PrinterContext::default(),
            vec![
                CommandArg::Format(Format::Png),
                CommandArg::Output(output.display().to_string()),
            ],
        )
        .map_err(RenderError::Graphviz)?;

        Ok(())
    }
}

/// Builds the DOT description of a syntax graph.
pub fn to_dot_graph(graph: &AstGraph) -> Graph {
    let mut stmts = vec![
        Stmt::GAttribute(GraphAttributes::Graph(vec![
            attr("concentrate", "true"),
            attr("splines", "polyline"),
        ])),
        Stmt::GAttribute(GraphAttributes::Node(vec![attr("shape", "box")])),
    ];

    stmts.extend(graph.nodes().map(|node| {
        Stmt::Node(Node {
            id: dot_node_id(node.id()),
            attributes: vec![Attribute(
                Id::Plain("label".to_string()),
                Id::Escaped(quote(node.label())),
            )],
        })
    }));

    stmts.extend(graph.edges().map(|(from, to)| {
        Stmt::Edge(Edge {
            ty: EdgeTy::Pair(
                Vertex::N(dot_node_id(from)),
                Vertex::N(dot_node_id(to)),
            ),
            attributes: Vec::new(),
        })
    }));

    Graph::DiGraph {
        id: Id::Plain("ast".to_string()),
        strict: true,
        stmts,
    }
}

/// Prints the DOT text of a syntax graph.
pub fn to_dot(graph: &AstGraph) -> String {
    to_dot_graph(graph).print(&mut PrinterContext::default())
}

fn attr(key: &str, value: &str) -> Attribute {
    Attribute(Id::Plain(key.to_string()), Id::Plain(value.to_string()))
}

fn dot_node_id(id: NodeId) -> DotNodeId {
    DotNodeId(Id::Plain(id.to_string()), None)
}

/// Wraps a label in DOT double quotes.
fn quote(label: &str) -> String {
    let mut quoted = String::with_capacity(label.len() + 2);
    quoted.push('"');
    for ch in label.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => {}
            _ => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(dot: &str) -> String {
        dot.chars().filter(|ch| !ch.is_whitespace()).collect()
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("Name (id=x)"), "\"Name (id=x)\"");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote("a\\b"), "\"a\\\\b\"");
        assert_eq!(quote("one\r\ntwo"), "\"one\\ntwo\"");
    }

    #[test]
    fn test_dot_contains_nodes_and_edges() {
        let mut graph = AstGraph::new();
        let root = graph.add_root("Module");
        let assign = graph.add_child(root, "Assign");
        graph.add_child(assign, "Name (id=x)");

        let dot = compact(&to_dot(&graph));
        assert!(dot.starts_with("strictdigraphast{"), "{dot}");
        assert!(dot.contains("concentrate=true"));
        assert!(dot.contains("splines=polyline"));
        assert!(dot.contains("shape=box"));
        assert!(dot.contains("n0[label=\"Module\"]"));
        assert!(dot.contains("n2[label=\"Name(id=x)\"]"));
        assert!(dot.contains("n0->n1"));
        assert!(dot.contains("n1->n2"));
    }

    #[test]
    fn test_dot_graph_shape() {
        let mut graph = AstGraph::new();
        let root = graph.add_root("Module");
        graph.add_child(root, "Pass");

        let Graph::DiGraph { strict, stmts, .. } = to_dot_graph(&graph) else {
            panic!("expected a directed graph");
        };
        assert!(strict);
        let nodes = stmts.iter().filter(|s| matches!(s, Stmt::Node(_))).count();
        let edges = stmts.iter().filter(|s| matches!(s, Stmt::Edge(_))).count();
        assert_eq!((nodes, edges), (2, 1));
    }
}
