//! Dependency ordering of pipeline nodes.

use super::dataset::strip_transcoding;
use super::error::{PipelineError, PipelineResult};
use super::node::Node;
use std::collections::{BTreeSet, HashMap};

/// Computes the dependency structure of a set of nodes.
///
/// Edges are implied by dataset names: node `b` depends on node `a` when one
/// of `b`'s inputs is one of `a`'s outputs. Transcoding suffixes are ignored
/// for matching, so `A@spark` depends on a producer of `A@pandas`.
pub struct TopologySorter;

impl TopologySorter {
    /// Group nodes into dependency layers using Kahn's algorithm.
    ///
    /// Every node in layer `n` only depends on nodes in layers `< n`. Indices
    /// within a layer are ordered by node order so the result is deterministic.
    ///
    /// # Returns
    /// Layers of indices into `nodes`, or `CircularDependency` naming every
    /// node that could not be scheduled.
    pub fn group(nodes: &[Node]) -> PipelineResult<Vec<Vec<usize>>> {
        let n = nodes.len();
        let (fwd_adj, mut in_degree) = Self::build_adjacency(nodes);

        let mut layer: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut groups = Vec::new();
        let mut scheduled = 0;

        while !layer.is_empty() {
            layer.sort_by(|&a, &b| nodes[a].cmp(&nodes[b]));
            scheduled += layer.len();

            let mut next = Vec::new();
            for &node in &layer {
                for &neighbor in &fwd_adj[node] {
                    in_degree[neighbor] -= 1;
                    if in_degree[neighbor] == 0 {
                        next.push(neighbor);
                    }
                }
            }

            groups.push(layer);
            layer = next;
        }

        if scheduled != n {
            let mut stuck: Vec<String> = (0..n)
                .filter(|&i| in_degree[i] > 0)
                .map(|i| nodes[i].name())
                .collect();
            stuck.sort();
            tracing::debug!(
                "Only {} of {} nodes could be scheduled; cycle among {:?}",
                scheduled,
                n,
                stuck
            );
            return Err(PipelineError::CircularDependency(stuck));
        }

        Ok(groups)
    }

    /// Flattened topological order.
    pub fn order(nodes: &[Node]) -> PipelineResult<Vec<usize>> {
        Ok(Self::group(nodes)?.into_iter().flatten().collect())
    }

    /// Build forward adjacency lists and in-degrees.
    ///
    /// Duplicate edges (a node reading two outputs of the same producer) are
    /// collapsed so in-degrees count distinct parents.
    fn build_adjacency(nodes: &[Node]) -> (Vec<Vec<usize>>, Vec<u32>) {
        let n = nodes.len();

        let mut producers: HashMap<&str, Vec<usize>> = HashMap::new();
        for (idx, node) in nodes.iter().enumerate() {
            for output in node.output_names() {
                producers
                    .entry(strip_transcoding(output))
                    .or_default()
                    .push(idx);
            }
        }

        let mut fwd_adj = vec![Vec::new(); n];
        let mut in_degree = vec![0u32; n];

        for (idx, node) in nodes.iter().enumerate() {
            let parents: BTreeSet<usize> = node
                .input_names()
                .into_iter()
                .filter_map(|input| producers.get(strip_transcoding(input)))
                .flatten()
                .copied()
                .collect();

            for parent in parents {
                fwd_adj[parent].push(idx);
                in_degree[idx] += 1;
            }
        }

        (fwd_adj, in_degree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, inputs: &[&str], outputs: &[&str]) -> Node {
        Node::builder("f", inputs.to_vec(), outputs.to_vec())
            .name(name)
            .build()
            .unwrap()
    }

    #[test]
    fn test_group_linear() {
        // c → b → a declared out of order
        let nodes = vec![
            node("c", &["C"], &["D"]),
            node("a", &["A"], &["B"]),
            node("b", &["B"], &["C"]),
        ];
        let groups = TopologySorter::group(&nodes).unwrap();
        assert_eq!(groups, vec![vec![1], vec![2], vec![0]]);
    }

    #[test]
    fn test_group_diamond() {
        // Diamond: a → b, a → c, b → d, c → d
        let nodes = vec![
            node("a", &["IN"], &["X", "Y"]),
            node("c", &["Y"], &["Z2"]),
            node("b", &["X"], &["Z1"]),
            node("d", &["Z1", "Z2"], &["OUT"]),
        ];
        let groups = TopologySorter::group(&nodes).unwrap();
        assert_eq!(groups, vec![vec![0], vec![2, 1], vec![3]]);
        assert_eq!(TopologySorter::order(&nodes).unwrap(), vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_transcoded_edges() {
        let nodes = vec![
            node("read", &["A@spark"], &["B"]),
            node("write", &["IN"], &["A@pandas"]),
        ];
        assert_eq!(TopologySorter::order(&nodes).unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_cycle_detected() {
        let nodes = vec![
            node("a", &["C"], &["A"]),
            node("b", &["A"], &["B"]),
            node("c", &["B"], &["C"]),
            node("free", &["X"], &["Y"]),
        ];
        let err = TopologySorter::group(&nodes).unwrap_err();
        assert_eq!(
            err,
            PipelineError::CircularDependency(vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string()
            ])
        );
    }

    #[test]
    fn test_empty() {
        assert!(TopologySorter::group(&[]).unwrap().is_empty());
    }
}
