//! Connectivity checks over the joint/beam graph.

use std::collections::BTreeMap;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Dfs;

use crate::truss::{Beam, Joint};

/// Outcome of a graph check: the joints that violate it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphCheck {
    /// Offending joint indices in ascending order.
    pub offending: Vec<usize>,
}

impl GraphCheck {
    /// A check with no offending joints.
    #[must_use]
    pub fn pass() -> Self {
        Self::default()
    }

    /// Whether the check found nothing wrong.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.offending.is_empty()
    }
}

/// Undirected graph with node `i` standing for joint `i` and one edge per beam.
///
/// Beams with an endpoint outside `0..joint_count` are left out.
#[must_use]
pub fn beam_graph(joint_count: usize, beams: &[Beam]) -> UnGraph<(), usize> {
    let mut graph = UnGraph::with_capacity(joint_count, beams.len());
    for _ in 0..joint_count {
        graph.add_node(());
    }
    for (index, beam) in beams.iter().enumerate() {
        if beam.start < joint_count && beam.end < joint_count {
            graph.add_edge(NodeIndex::new(beam.start), NodeIndex::new(beam.end), index);
        }
    }
    graph
}

/// Collect the joints not marked in `visited`.
fn unvisited(visited: &[bool]) -> Vec<usize> {
    visited
        .iter()
        .enumerate()
        .filter(|(_, seen)| !**seen)
        .map(|(joint, _)| joint)
        .collect()
}

/// Check that every joint can reach every other joint through beams.
///
/// The traversal starts at the first joint with an incident beam. A structure
/// of zero or one joint is trivially connected.
#[must_use]
pub fn check_connectivity(joint_count: usize, beams: &[Beam]) -> GraphCheck {
    if joint_count <= 1 {
        return GraphCheck::pass();
    }
    let graph = beam_graph(joint_count, beams);
    let Some(start) = graph
        .node_indices()
        .find(|&node| graph.neighbors(node).next().is_some())
    else {
        return GraphCheck {
            offending: (0..joint_count).collect(),
        };
    };

    let mut visited = vec![false; joint_count];
    let mut dfs = Dfs::new(&graph, start);
    while let Some(node) = dfs.next(&graph) {
        visited[node.index()] = true;
    }
    GraphCheck {
        offending: unvisited(&visited),
    }
}

/// Check that every joint has a beam path to at least one anchor.
#[must_use]
pub fn check_anchor_reachability(joints: &[Joint], beams: &[Beam]) -> GraphCheck {
    let anchors: Vec<usize> = joints
        .iter()
        .enumerate()
        .filter(|(_, joint)| joint.is_anchor())
        .map(|(index, _)| index)
        .collect();
    if anchors.is_empty() {
        return GraphCheck {
            offending: (0..joints.len()).collect(),
        };
    }
    if anchors.len() == joints.len() {
        return GraphCheck::pass();
    }

    let graph = beam_graph(joints.len(), beams);
    let mut visited = vec![false; joints.len()];
    let mut dfs = Dfs::empty(&graph);
    for anchor in anchors {
        dfs.move_to(NodeIndex::new(anchor));
        while let Some(node) = dfs.next(&graph) {
            visited[node.index()] = true;
        }
    }
    GraphCheck {
        offending: unvisited(&visited),
    }
}

/// Rounded coordinate as an exact map key. `-0.0` and `0.0` share a key.
fn rounded_key(value: f64, scale: f64) -> u64 {
    let rounded = (value * scale).round();
    if rounded == 0.0 {
        0.0_f64.to_bits()
    } else {
        rounded.to_bits()
    }
}

/// Find anchors that share coordinates once rounded to `decimals` places.
#[must_use]
pub fn find_coincident_anchors(joints: &[Joint], decimals: u32) -> GraphCheck {
    let scale = 10_f64.powi(i32::try_from(decimals.min(308)).unwrap_or(308));
    let mut groups: BTreeMap<(u64, u64), Vec<usize>> = BTreeMap::new();
    for (index, joint) in joints.iter().enumerate() {
        if joint.is_anchor() {
            let key = (
                rounded_key(joint.position.x, scale),
                rounded_key(joint.position.y, scale),
            );
            groups.entry(key).or_default().push(index);
        }
    }
    let mut offending: Vec<usize> = groups
        .into_values()
        .filter(|group| group.len() > 1)
        .flatten()
        .collect();
    offending.sort_unstable();
    GraphCheck { offending }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point;
    use crate::truss::AnchorType;

    fn free(x: f64, y: f64) -> Joint {
        Joint::new(point(x, y))
    }

    fn pin(x: f64, y: f64) -> Joint {
        Joint::anchored(point(x, y), AnchorType::Pin)
    }

    #[test]
    fn trivial_structures_are_connected() {
        assert!(check_connectivity(0, &[]).passed());
        assert!(check_connectivity(1, &[]).passed());
    }

    #[test]
    fn joints_without_beams_are_disconnected() {
        assert_eq!(check_connectivity(3, &[]).offending, vec![0, 1, 2]);
    }

    #[test]
    fn isolated_joint_is_reported() {
        let beams = [Beam::new(1, 2), Beam::new(2, 3)];
        // Joint 0 has no beam; traversal starts from joint 1.
        assert_eq!(check_connectivity(4, &beams).offending, vec![0]);
    }

    #[test]
    fn dangling_beams_are_ignored_by_the_graph() {
        let beams = [Beam::new(0, 1), Beam::new(1, 7)];
        let graph = beam_graph(2, &beams);
        assert_eq!(graph.edge_count(), 1);
        assert!(check_connectivity(2, &beams).passed());
    }

    #[test]
    fn no_anchors_makes_every_joint_unreachable() {
        let joints = [free(0.0, 0.0), free(1.0, 0.0)];
        let beams = [Beam::new(0, 1)];
        assert_eq!(
            check_anchor_reachability(&joints, &beams).offending,
            vec![0, 1]
        );
    }

    #[test]
    fn all_anchor_structure_is_reachable() {
        let joints = [pin(0.0, 0.0), pin(1.0, 0.0)];
        assert!(check_anchor_reachability(&joints, &[]).passed());
    }

    #[test]
    fn reachability_seeds_from_every_anchor() {
        let joints = [
            pin(0.0, 0.0),
            free(1.0, 1.0),
            pin(5.0, 0.0),
            free(6.0, 1.0),
            free(9.0, 9.0),
        ];
        let beams = [Beam::new(0, 1), Beam::new(2, 3)];
        assert_eq!(
            check_anchor_reachability(&joints, &beams).offending,
            vec![4]
        );
    }

    #[test]
    fn coincident_anchors_are_grouped_after_rounding() {
        let joints = [
            pin(0.0, 0.0),
            free(0.0, 0.0),
            pin(10.0, 0.0),
            pin(0.0001, -0.0002),
            pin(10.2, 0.0),
        ];
        assert_eq!(find_coincident_anchors(&joints, 3).offending, vec![0, 3]);
        assert!(find_coincident_anchors(&joints[..3], 3).passed());
        assert_eq!(
            find_coincident_anchors(&joints, 0).offending,
            vec![0, 2, 3, 4]
        );
    }

    #[test]
    fn identical_anchor_positions_coincide() {
        let joints = [pin(3.5, 7.25), free(1.0, 1.0), pin(3.5, 7.25)];
        assert_eq!(find_coincident_anchors(&joints, 3).offending, vec![0, 2]);
    }

    #[test]
    fn far_apart_anchors_stay_distinct() {
        let joints = [pin(1.0e17, 0.0), pin(2.0e17, 0.0), pin(-1.0e17, 0.0)];
        assert!(find_coincident_anchors(&joints, 3).passed());
        let joints = [pin(-0.0001, 0.0), pin(0.0001, 0.0)];
        assert_eq!(find_coincident_anchors(&joints, 3).offending, vec![0, 1]);
    }
}
