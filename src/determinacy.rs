//! Counting argument for static determinacy and global support coverage.

use crate::errors::{AnalysisError, Axis};
use crate::truss::{AnchorType, Joint};

/// Anchored joint and its support kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnchorSupport {
    /// Joint index.
    pub joint: usize,
    /// Support condition at the joint.
    pub kind: AnchorType,
}

/// Anchored joints in index order.
#[must_use]
pub fn collect_anchors(joints: &[Joint]) -> Vec<AnchorSupport> {
    joints
        .iter()
        .enumerate()
        .filter_map(|(joint, node)| node.anchor.map(|kind| AnchorSupport { joint, kind }))
        .collect()
}

/// Summary of the unknowns and support coverage of a structure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Determinacy {
    /// Anchored joints.
    pub anchors: Vec<usize>,
    /// Reaction components contributed by all anchors.
    pub reaction_unknowns: usize,
    /// Whether some anchor resists X forces.
    pub resists_x: bool,
    /// Whether some anchor resists Y forces.
    pub resists_y: bool,
    /// Number of joints.
    pub joint_count: usize,
    /// Number of beams.
    pub beam_count: usize,
}

impl Determinacy {
    /// Classify the supports of a structure.
    #[must_use]
    pub fn classify(anchors: &[AnchorSupport], joint_count: usize, beam_count: usize) -> Self {
        Self {
            anchors: anchors.iter().map(|anchor| anchor.joint).collect(),
            reaction_unknowns: anchors.iter().map(|a| a.kind.reaction_unknowns()).sum(),
            resists_x: anchors.iter().any(|a| a.kind.restrains_x()),
            resists_y: anchors.iter().any(|a| a.kind.restrains_y()),
            joint_count,
            beam_count,
        }
    }

    /// Beam forces plus reaction components.
    #[must_use]
    pub fn total_unknowns(&self) -> usize {
        self.beam_count + self.reaction_unknowns
    }

    /// Two equilibrium equations per joint.
    #[must_use]
    pub fn total_equations(&self) -> usize {
        2 * self.joint_count
    }

    /// Two or more anchored joints are needed to resist rotation.
    #[must_use]
    pub fn resists_moment(&self) -> bool {
        self.anchors.len() >= 2
    }

    /// Check that unknowns and equations balance exactly.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::DeterminacyMismatch`] for mechanisms and
    /// indeterminate structures alike.
    pub fn check_count(&self) -> Result<(), AnalysisError> {
        let equations = self.total_equations();
        let unknowns = self.total_unknowns();
        if equations == unknowns {
            Ok(())
        } else {
            Err(AnalysisError::DeterminacyMismatch {
                equations,
                unknowns,
            })
        }
    }

    /// Check that the supports can equilibrate the structure globally.
    ///
    /// # Errors
    ///
    /// Returns, in order of precedence, [`AnalysisError::InsufficientReactions`],
    /// [`AnalysisError::MissingDirectionCoverage`] or
    /// [`AnalysisError::InsufficientMomentResistance`].
    pub fn check_supports(&self) -> Result<(), AnalysisError> {
        if self.reaction_unknowns < 3 {
            return Err(AnalysisError::InsufficientReactions {
                unknowns: self.reaction_unknowns,
                anchors: self.anchors.clone(),
            });
        }
        let axes: Vec<Axis> = [(Axis::X, self.resists_x), (Axis::Y, self.resists_y)]
            .into_iter()
            .filter(|(_, covered)| !covered)
            .map(|(axis, _)| axis)
            .collect();
        if !axes.is_empty() {
            return Err(AnalysisError::MissingDirectionCoverage {
                axes,
                anchors: self.anchors.clone(),
            });
        }
        if !self.resists_moment() {
            return Err(AnalysisError::InsufficientMomentResistance {
                anchors: self.anchors.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point;

    fn support(joint: usize, kind: AnchorType) -> AnchorSupport {
        AnchorSupport { joint, kind }
    }

    #[test]
    fn collects_anchors_in_joint_order() {
        let joints = [
            Joint::new(point(0.0, 0.0)),
            Joint::anchored(point(1.0, 0.0), AnchorType::RollerY),
            Joint::anchored(point(2.0, 0.0), AnchorType::Pin),
        ];
        assert_eq!(
            collect_anchors(&joints),
            vec![
                support(1, AnchorType::RollerY),
                support(2, AnchorType::Pin)
            ]
        );
    }

    #[test]
    fn pin_and_roller_triangle_is_determinate() {
        let anchors = [support(0, AnchorType::Pin), support(1, AnchorType::RollerX)];
        let determinacy = Determinacy::classify(&anchors, 3, 3);
        assert_eq!(determinacy.reaction_unknowns, 3);
        assert_eq!(determinacy.total_unknowns(), 6);
        assert_eq!(determinacy.total_equations(), 6);
        assert!(determinacy.check_count().is_ok());
        assert!(determinacy.check_supports().is_ok());
    }

    #[test]
    fn count_mismatch_is_reported_both_ways() {
        let single_pin = [support(0, AnchorType::Pin)];
        assert_eq!(
            Determinacy::classify(&single_pin, 3, 3).check_count(),
            Err(AnalysisError::DeterminacyMismatch {
                equations: 6,
                unknowns: 5
            })
        );
        let two_pins = [support(0, AnchorType::Pin), support(1, AnchorType::Pin)];
        assert_eq!(
            Determinacy::classify(&two_pins, 3, 3).check_count(),
            Err(AnalysisError::DeterminacyMismatch {
                equations: 6,
                unknowns: 7
            })
        );
    }

    #[test]
    fn too_few_reactions_take_precedence() {
        let anchors = [support(3, AnchorType::Pin)];
        assert_eq!(
            Determinacy::classify(&anchors, 4, 6).check_supports(),
            Err(AnalysisError::InsufficientReactions {
                unknowns: 2,
                anchors: vec![3]
            })
        );
    }

    #[test]
    fn rollers_in_one_direction_miss_an_axis() {
        let anchors = [
            support(0, AnchorType::RollerX),
            support(1, AnchorType::RollerX),
            support(2, AnchorType::RollerX),
        ];
        assert_eq!(
            Determinacy::classify(&anchors, 3, 3).check_supports(),
            Err(AnalysisError::MissingDirectionCoverage {
                axes: vec![Axis::X],
                anchors: vec![0, 1, 2]
            })
        );
    }

    #[test]
    fn every_anchor_kind_counts_toward_coverage() {
        let anchors = [
            support(0, AnchorType::RollerX),
            support(1, AnchorType::RollerY),
            support(2, AnchorType::RollerY),
        ];
        let determinacy = Determinacy::classify(&anchors, 3, 3);
        assert!(determinacy.resists_x && determinacy.resists_y);
        assert!(determinacy.resists_moment());
        assert!(determinacy.check_supports().is_ok());
    }
}
