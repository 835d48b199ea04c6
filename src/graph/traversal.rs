//! Graph traversal algorithms (BFS, dependency cycles, ordering).

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::types::{CatError, CatResult, Edge, EdgeType};

use super::{GraphNode, KnowledgeGraph};

/// Direction for graph traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalDirection {
    /// Follow outgoing edges (source -> target).
    Forward,
    /// Follow incoming edges (target <- source).
    Backward,
    /// Follow edges in both directions.
    Both,
}

/// Nodes reached by a breadth-first traversal.
#[derive(Debug, Clone, Default)]
pub struct Traversal {
    /// Visited node ids in visit order, starting node first.
    pub visited: Vec<String>,
    /// Edges used to reach each newly visited node.
    pub edges: Vec<Edge>,
    /// Hop count from the start for every visited node.
    pub depths: HashMap<String, u32>,
}

/// BFS traversal from a starting node, following specific edge types.
pub fn bfs_traverse<N: GraphNode>(
    graph: &KnowledgeGraph<N>,
    start_id: &str,
    edge_types: &[EdgeType],
    direction: TraversalDirection,
    max_depth: u32,
    max_results: usize,
) -> CatResult<Traversal> {
    if !graph.contains(start_id) {
        return Err(CatError::NodeNotFound(start_id.to_string()));
    }

    let edge_set: HashSet<EdgeType> = edge_types.iter().copied().collect();
    let mut result = Traversal::default();
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<(String, u32)> = VecDeque::new();

    visited.insert(start_id.to_string());
    result.visited.push(start_id.to_string());
    result.depths.insert(start_id.to_string(), 0);
    queue.push_back((start_id.to_string(), 0));

    while let Some((current_id, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        if result.visited.len() >= max_results {
            break;
        }

        let mut neighbors: Vec<(&str, &Edge)> = Vec::new();

        if direction != TraversalDirection::Backward {
            for edge in graph.edges_from(&current_id) {
                if edge_set.contains(&edge.edge_type) {
                    neighbors.push((edge.target_id.as_str(), edge));
                }
            }
        }

        if direction != TraversalDirection::Forward {
            for edge in graph.edges_to(&current_id) {
                if edge_set.contains(&edge.edge_type) {
                    neighbors.push((edge.source_id.as_str(), edge));
                }
            }
        }

        for (neighbor_id, edge) in neighbors {
            if visited.contains(neighbor_id) {
                continue;
            }
            if result.visited.len() >= max_results {
                break;
            }

            visited.insert(neighbor_id.to_string());
            result.visited.push(neighbor_id.to_string());
            result.depths.insert(neighbor_id.to_string(), depth + 1);
            result.edges.push(edge.clone());
            queue.push_back((neighbor_id.to_string(), depth + 1));
        }
    }

    Ok(result)
}

/// Ids of the `depends_on` targets of a node, in edge insertion order.
fn prerequisite_ids<'a, N: GraphNode>(graph: &'a KnowledgeGraph<N>, id: &str) -> Vec<&'a str> {
    graph
        .edges_from(id)
        .into_iter()
        .filter(|e| e.edge_type == EdgeType::DependsOn)
        .map(|e| e.target_id.as_str())
        .collect()
}

/// Depth-first search over `depends_on` edges from `start_id`.
///
/// Returns the cycle as a path whose first and last ids are equal, or `None`.
/// Uses an explicit stack, so graph depth never touches the call stack.
pub fn find_cycle<N: GraphNode>(graph: &KnowledgeGraph<N>, start_id: &str) -> Option<Vec<String>> {
    let root = graph.get(start_id).map(|n| n.id())?;
    search_cycle(graph, root, &mut HashSet::new())
}

/// Whether a `depends_on` cycle is reachable from `start_id`.
pub fn has_cycle<N: GraphNode>(graph: &KnowledgeGraph<N>, start_id: &str) -> bool {
    find_cycle(graph, start_id).is_some()
}

/// First `depends_on` cycle anywhere in the graph, trying roots in id order.
///
/// One pass over the whole graph: nodes fully explored from an earlier root
/// are not searched again.
pub fn find_any_cycle<N: GraphNode>(graph: &KnowledgeGraph<N>) -> Option<Vec<String>> {
    let mut done: HashSet<&str> = HashSet::new();
    for node in graph.nodes() {
        if done.contains(node.id()) {
            continue;
        }
        if let Some(cycle) = search_cycle(graph, node.id(), &mut done) {
            return Some(cycle);
        }
    }
    None
}

/// Iterative DFS from `root`, skipping and extending `done`.
///
/// A node in `done` has every descendant explored with no cycle found.
fn search_cycle<'a, N: GraphNode>(
    graph: &'a KnowledgeGraph<N>,
    root: &'a str,
    done: &mut HashSet<&'a str>,
) -> Option<Vec<String>> {
    let mut on_stack: HashSet<&str> = HashSet::new();
    // (node, its prerequisites, index of the next one to visit)
    let mut stack: Vec<(&str, Vec<&str>, usize)> = Vec::new();

    on_stack.insert(root);
    stack.push((root, prerequisite_ids(graph, root), 0));

    while let Some((node, children, next)) = stack.last_mut() {
        if *next >= children.len() {
            on_stack.remove(*node);
            done.insert(*node);
            stack.pop();
            continue;
        }
        let child = children[*next];
        *next += 1;

        if on_stack.contains(child) {
            let from = stack.iter().position(|(n, _, _)| *n == child).unwrap_or(0);
            let mut path: Vec<String> = stack[from..].iter().map(|(n, _, _)| n.to_string()).collect();
            path.push(child.to_string());
            return Some(path);
        }
        if done.contains(child) || !graph.contains(child) {
            continue;
        }
        on_stack.insert(child);
        stack.push((child, prerequisite_ids(graph, child), 0));
    }

    None
}

/// Every node transitively required by `id`, nearest first.
pub fn prerequisite_closure<N: GraphNode>(
    graph: &KnowledgeGraph<N>,
    id: &str,
) -> CatResult<Vec<String>> {
    let traversal = bfs_traverse(
        graph,
        id,
        &[EdgeType::DependsOn],
        TraversalDirection::Forward,
        u32::MAX,
        usize::MAX,
    )?;
    Ok(traversal.visited.into_iter().skip(1).collect())
}

/// Every node in an order where prerequisites come before their dependents.
///
/// Ties are broken by node id. Fails with the offending path on a cycle.
pub fn learning_order<N: GraphNode>(graph: &KnowledgeGraph<N>) -> CatResult<Vec<String>> {
    // Remaining unmet prerequisites per node.
    let mut pending: BTreeMap<&str, usize> = graph
        .nodes()
        .map(|n| (n.id(), prerequisite_ids(graph, n.id()).len()))
        .collect();

    let mut ready: Vec<&str> = pending
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut order: Vec<String> = Vec::with_capacity(pending.len());

    while let Some(id) = pop_smallest(&mut ready) {
        pending.remove(id);
        order.push(id.to_string());
        for edge in graph.edges_to(id) {
            if edge.edge_type != EdgeType::DependsOn {
                continue;
            }
            if let Some(count) = pending.get_mut(edge.source_id.as_str()) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    ready.push(edge.source_id.as_str());
                }
            }
        }
    }

    if !pending.is_empty() {
        let cycle = pending
            .keys()
            .find_map(|id| find_cycle(graph, id))
            .unwrap_or_else(|| pending.keys().map(|id| id.to_string()).collect());
        return Err(CatError::DependencyCycle(cycle));
    }
    Ok(order)
}

fn pop_smallest<'a>(ready: &mut Vec<&'a str>) -> Option<&'a str> {
    let (idx, _) = ready.iter().enumerate().min_by_key(|(_, id)| **id)?;
    Some(ready.swap_remove(idx))
}

impl<N: GraphNode> KnowledgeGraph<N> {
    /// See [`has_cycle`].
    pub fn has_cycle(&self, start_id: &str) -> bool {
        has_cycle(self, start_id)
    }

    /// See [`find_cycle`].
    pub fn find_cycle(&self, start_id: &str) -> Option<Vec<String>> {
        find_cycle(self, start_id)
    }

    pub fn has_any_cycle(&self) -> bool {
        find_any_cycle(self).is_some()
    }

    /// See [`prerequisite_closure`].
    pub fn prerequisite_closure(&self, id: &str) -> CatResult<Vec<String>> {
        prerequisite_closure(self, id)
    }

    /// See [`learning_order`].
    pub fn learning_order(&self) -> CatResult<Vec<String>> {
        learning_order(self)
    }

    /// Breadth-first traversal with no result cap.
    pub fn traverse(
        &self,
        start_id: &str,
        edge_types: &[EdgeType],
        direction: TraversalDirection,
        max_depth: u32,
    ) -> CatResult<Traversal> {
        bfs_traverse(self, start_id, edge_types, direction, max_depth, usize::MAX)
    }
}
