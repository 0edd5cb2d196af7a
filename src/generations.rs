//! The generation planner.
//!
//! Groups a module's blocks into evaluation generations: layer 0 holds the
//! blocks with no dependencies on sibling blocks, layer k+1 the blocks whose
//! dependencies all live in layers ≤ k. Dependencies are recovered with the
//! [`crate::tracker`] and matched against block identity keys; references to
//! anything that is not a sibling block are ignored.

use std::collections::HashMap;

use petgraph::graphmap::DiGraphMap;

use crate::ast::{Block, Module};
use crate::diagnostics::{Diagnostic, Result};
use crate::tracker::block_variable_references;

/// Plans the blocks of `module` (optionally filtered by type) into
/// topological generations, dependencies first. With `reverse`, dependents
/// come first instead.
pub fn blocks_by_generation<'m>(
    module: &'m Module,
    block_type: Option<&str>,
    reverse: bool,
) -> Result<Vec<Vec<&'m Block>>> {
    let blocks = module.get_blocks(block_type);
    let mut generations = topological_generations(&blocks)?;
    if reverse {
        generations.reverse();
    }
    Ok(generations)
}

fn topological_generations<'m>(blocks: &[&'m Block]) -> Result<Vec<Vec<&'m Block>>> {
    let keys: Vec<Vec<String>> = blocks.iter().map(|block| block.key_path()).collect();
    let index_by_key: HashMap<&[String], usize> = keys
        .iter()
        .enumerate()
        .map(|(index, key)| (key.as_slice(), index))
        .collect();

    // Edges point from a dependency to the block that needs it.
    let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();
    for (index, block) in blocks.iter().enumerate() {
        graph.add_node(index);
        let references = block_variable_references(block).map_err(|diag| {
            diag.with_context(format!(
                "while resolving references for block {}",
                block.key_path().join(".")
            ))
        })?;
        for reference in &references {
            if let Some(&dependency) = index_by_key.get(reference.as_slice()) {
                // A block depending on its own key is the smallest cycle.
                if dependency == index {
                    return Err(Diagnostic::error(
                        "hcl2::generations::graph_cycle",
                        "graph is not a DAG",
                    )
                    .with_label(
                        block.r#type.span,
                        format!("block {} depends on itself", block.key_path().join(".")),
                    ));
                }
                graph.add_edge(dependency, index, ());
            }
        }
    }

    // Kahn-style peeling: each round removes every node with no remaining
    // incoming edge; a stalled round means a cycle.
    let mut generations = Vec::new();
    while graph.node_count() > 0 {
        let ready: Vec<usize> = graph
            .nodes()
            .filter(|&node| {
                graph
                    .neighbors_directed(node, petgraph::Direction::Incoming)
                    .next()
                    .is_none()
            })
            .collect();

        if ready.is_empty() {
            return Err(cycle_error(blocks, &graph));
        }
        for &node in &ready {
            graph.remove_node(node);
        }
        generations.push(ready.into_iter().map(|index| blocks[index]).collect());
    }

    Ok(generations)
}

fn cycle_error(blocks: &[&Block], remaining: &DiGraphMap<usize, ()>) -> Diagnostic {
    let mut diag = Diagnostic::error("hcl2::generations::graph_cycle", "graph is not a DAG");
    for node in remaining.nodes() {
        let block = blocks[node];
        diag = diag.with_label(
            block.r#type.span,
            format!("block {} participates in a cycle", block.key_path().join(".")),
        );
    }
    diag
}
