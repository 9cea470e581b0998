use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use petgraph::{
    graph::{EdgeIndex, NodeIndex},
    visit::EdgeRef,
};

use super::state::State;
use crate::{model::StreetGraph, routing::scoring::EdgeCost};

/// Nodes and edges of a path found by [`dijkstra_path`], from start to target
#[derive(Debug, Clone, PartialEq)]
pub struct PathTrace {
    pub nodes: Vec<NodeIndex>,
    pub edges: Vec<EdgeIndex>,
    pub cost: f64,
}

/// Edge used when travelling from `from` to `to`.
///
/// Parallel edges between the same ordered pair are resolved by a canonical
/// rule: the cheapest edge under `cost`, ties going to the lowest edge index
/// (insertion order). Only this edge is ever considered for the pair.
pub fn canonical_edge<C: EdgeCost + ?Sized>(
    graph: &StreetGraph,
    from: NodeIndex,
    to: NodeIndex,
    cost: &C,
) -> Option<(EdgeIndex, f64)> {
    canonical_edges(graph, from, cost)
        .into_iter()
        .find(|&(target, _, _)| target == to)
        .map(|(_, edge, weight)| (edge, weight))
}

/// Canonical outgoing edge per neighbour, sorted by neighbour index
fn canonical_edges<C: EdgeCost + ?Sized>(
    graph: &StreetGraph,
    node: NodeIndex,
    cost: &C,
) -> Vec<(NodeIndex, EdgeIndex, f64)> {
    let mut best: Vec<(NodeIndex, EdgeIndex, f64)> = Vec::new();

    for edge in graph.edges(node) {
        let weight = cost.cost(edge.weight());
        if !weight.is_finite() || weight < 0.0 {
            log::warn!(
                "Skipping edge {} with unusable cost {weight}",
                edge.id().index()
            );
            continue;
        }

        let candidate = (edge.target(), edge.id(), weight);
        match best.iter_mut().find(|(target, _, _)| *target == edge.target()) {
            Some(slot) => {
                if weight < slot.2 || (weight == slot.2 && edge.id() < slot.1) {
                    *slot = candidate;
                }
            }
            None => best.push(candidate),
        }
    }

    best.sort_unstable_by_key(|&(target, _, _)| target);
    best
}

/// Dijkstra's algorithm from `start` to `target` under an arbitrary edge cost.
///
/// Returns `None` when the target cannot be reached. For a fixed graph the
/// result is deterministic: equal-cost frontier nodes are expanded in node
/// index order and a node's predecessor only changes on a strictly better
/// cost.
pub fn dijkstra_path<C: EdgeCost + ?Sized>(
    graph: &StreetGraph,
    start: NodeIndex,
    target: NodeIndex,
    cost: &C,
) -> Option<PathTrace> {
    let estimated_nodes = graph.node_count().min(1000);
    let mut distances: HashMap<NodeIndex, f64> = HashMap::with_capacity(estimated_nodes);
    let mut predecessors: HashMap<NodeIndex, (NodeIndex, EdgeIndex)> =
        HashMap::with_capacity(estimated_nodes);
    let mut settled = FixedBitSet::with_capacity(graph.node_count());
    let mut heap = BinaryHeap::with_capacity(estimated_nodes / 4);

    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost: current, node }) = heap.pop() {
        if node == target {
            break;
        }

        // Stale heap entry
        if settled.put(node.index()) {
            continue;
        }

        for (next, edge, weight) in canonical_edges(graph, node, cost) {
            if settled.contains(next.index()) {
                continue;
            }
            let next_cost = current + weight;

            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                    predecessors.insert(next, (node, edge));
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                        predecessors.insert(next, (node, edge));
                    }
                }
            }
        }
    }

    let total = *distances.get(&target)?;

    let mut nodes = vec![target];
    let mut edges = Vec::new();
    let mut current = target;
    while current != start {
        let &(prev, edge) = predecessors.get(&current)?;
        nodes.push(prev);
        edges.push(edge);
        current = prev;
    }
    nodes.reverse();
    edges.reverse();

    Some(PathTrace {
        nodes,
        edges,
        cost: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::StreetGraphBuilder;
    use crate::model::EdgeAttributes;
    use crate::routing::scoring::LengthCost;

    fn ladder() -> StreetGraph {
        // 1 - 2 - 3
        // |       |
        // 4 ----- 5
        let mut builder = StreetGraphBuilder::new();
        for (id, lon, lat) in [
            (1, 34.770, 32.080),
            (2, 34.771, 32.080),
            (3, 34.772, 32.080),
            (4, 34.770, 32.079),
            (5, 34.772, 32.079),
        ] {
            builder.add_node(id, lon, lat).unwrap();
        }
        for (from, to, length) in [(1, 2, 100.0), (2, 3, 100.0), (1, 4, 50.0), (4, 5, 200.0), (5, 3, 50.0)] {
            builder
                .add_street(from, to, length, EdgeAttributes::new())
                .unwrap();
        }
        builder.build()
    }

    #[test]
    fn finds_cheapest_path() {
        let graph = ladder();
        let start = graph.node_index(1).unwrap();
        let target = graph.node_index(3).unwrap();

        let trace = dijkstra_path(&graph, start, target, &LengthCost).unwrap();
        let ids: Vec<_> = trace.nodes.iter().map(|&n| graph.node(n).unwrap().id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(trace.edges.len(), 2);
        assert_eq!(trace.cost, 200.0);
    }

    #[test]
    fn start_equals_target() {
        let graph = ladder();
        let start = graph.node_index(4).unwrap();
        let trace = dijkstra_path(&graph, start, start, &LengthCost).unwrap();
        assert_eq!(trace.nodes, vec![start]);
        assert!(trace.edges.is_empty());
        assert_eq!(trace.cost, 0.0);
    }

    #[test]
    fn equal_cost_paths_resolve_identically() {
        let mut builder = StreetGraphBuilder::new();
        for (id, lon) in [(1, 34.770), (2, 34.771), (3, 34.772), (4, 34.773)] {
            builder.add_node(id, lon, 32.08).unwrap();
        }
        // two equal-length detours between 1 and 4
        for (from, to) in [(1, 2), (2, 4), (1, 3), (3, 4)] {
            builder
                .add_street(from, to, 10.0, EdgeAttributes::new())
                .unwrap();
        }
        let graph = builder.build();
        let start = graph.node_index(1).unwrap();
        let target = graph.node_index(4).unwrap();

        let first = dijkstra_path(&graph, start, target, &LengthCost).unwrap();
        for _ in 0..10 {
            assert_eq!(dijkstra_path(&graph, start, target, &LengthCost).unwrap(), first);
        }
    }

    #[test]
    fn canonical_edge_prefers_cheapest_then_oldest() {
        let mut builder = StreetGraphBuilder::new();
        builder.add_node(1, 34.770, 32.08).unwrap();
        builder.add_node(2, 34.771, 32.08).unwrap();
        builder.add_edge(1, 2, 30.0, EdgeAttributes::new()).unwrap();
        builder.add_edge(1, 2, 20.0, EdgeAttributes::new()).unwrap();
        builder.add_edge(1, 2, 20.0, EdgeAttributes::new()).unwrap();
        let graph = builder.build();

        let (edge, weight) = canonical_edge(
            &graph,
            graph.node_index(1).unwrap(),
            graph.node_index(2).unwrap(),
            &LengthCost,
        )
        .unwrap();
        assert_eq!(edge.index(), 1);
        assert_eq!(weight, 20.0);
    }
}
