//! Dependency graph over component definitions: one node per definition,
//! one edge per declared reference, provider pointing at consumer.

use anyhow::Result;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use std::ops::Index;

use crate::types::ComponentDefinition;

pub struct DefinitionGraph {
    graph: DiGraph<ComponentDefinition, String>,
    node_map: HashMap<String, NodeIndex>,
}

impl DefinitionGraph {
    /// Build the graph, rejecting references to undefined components and
    /// circular references.
    pub fn build(definitions: &[ComponentDefinition]) -> Result<Self> {
        let mut graph = DiGraph::<ComponentDefinition, String>::new();
        let mut node_map = HashMap::<String, NodeIndex>::new();

        for definition in definitions {
            let index = graph.add_node(definition.clone());
            node_map.insert(definition.name.clone(), index);
        }

        for definition in definitions {
            let consumer = *node_map.get(&definition.name).unwrap();
            for (field, target) in &definition.refs {
                let Some(provider) = node_map.get(target) else {
                    anyhow::bail!(
                        "component '{}' references undefined component '{}'",
                        definition.name,
                        target
                    );
                };
                graph.update_edge(*provider, consumer, field.clone());
            }
        }

        if let Err(cycle) = petgraph::algo::toposort(&graph, None) {
            let name = &graph[cycle.node_id()].name;
            anyhow::bail!("circular reference detected involving '{name}'");
        }

        Ok(Self { graph, node_map })
    }

    /// Node indices in instantiation order.
    pub fn build_order(&self) -> Vec<NodeIndex> {
        petgraph::algo::toposort(&self.graph, None).unwrap()
    }

    pub fn get_node_index(&self, name: &str) -> Option<NodeIndex> {
        self.node_map.get(name).copied()
    }

    /// Write the graph to a DOT file.
    pub fn write_dot_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.dot())
            .map_err(|e| anyhow::anyhow!("Failed to write DOT file: {e}"))?;
        Ok(())
    }

    fn dot(&self) -> String {
        let mut output = String::from("digraph DefinitionGraph {\n");
        output.push_str("  rankdir=BT;\n");
        output.push_str("  node [fontname=\"Arial\", fontsize=10];\n");
        output.push_str("  edge [fontname=\"Arial\", fontsize=9];\n");

        for node_index in self.graph.node_indices() {
            let definition = &self.graph[node_index];
            output.push_str(&format!(
                "  {} [label=\"{}\\n({})\", shape=box, fillcolor=lightblue, style=\"rounded,filled\"];\n",
                node_index.index(),
                definition.name,
                definition.kind
            ));
        }

        for edge_ref in self.graph.edge_references() {
            output.push_str(&format!(
                "  {} -> {} [label=\"{}\", color=blue];\n",
                edge_ref.source().index(),
                edge_ref.target().index(),
                edge_ref.weight()
            ));
        }

        output.push_str("}\n");
        output
    }
}

impl Index<NodeIndex> for DefinitionGraph {
    type Output = ComponentDefinition;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.graph[index]
    }
}
