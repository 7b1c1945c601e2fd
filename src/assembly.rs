//! Method-of-joints equilibrium system and mapping of its solution.
//!
//! Unknown columns hold the beam forces first, followed by the reaction
//! components of each anchor in anchor order. Row `2i` is the X balance of
//! joint `i` and row `2i + 1` its Y balance.

use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::determinacy::AnchorSupport;
use crate::errors::AnalysisError;
use crate::geometry::Force;
use crate::solver::solve_linear_system;
use crate::truss::{AnchorType, Beam, Joint, Reaction};

/// Columns holding the reaction components of one anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReactionColumns {
    /// Anchored joint.
    pub joint: usize,
    /// Support kind.
    pub kind: AnchorType,
    /// Column of the X component, for anchors restraining X.
    pub rx: Option<usize>,
    /// Column of the Y component, for anchors restraining Y.
    pub ry: Option<usize>,
}

/// Assign reaction columns after the `beam_count` beam columns.
#[must_use]
pub fn reaction_layout(anchors: &[AnchorSupport], beam_count: usize) -> Vec<ReactionColumns> {
    let mut next = beam_count;
    let mut take = |restrained: bool| {
        restrained.then(|| {
            next += 1;
            next - 1
        })
    };
    anchors
        .iter()
        .map(|anchor| {
            let rx = take(anchor.kind.restrains_x());
            let ry = take(anchor.kind.restrains_y());
            ReactionColumns {
                joint: anchor.joint,
                kind: anchor.kind,
                rx,
                ry,
            }
        })
        .collect()
}

/// Assembled joint equilibrium equations `matrix * x = rhs`.
#[derive(Clone, Debug, PartialEq)]
pub struct EquilibriumSystem {
    /// Direction cosines and reaction coefficients.
    pub matrix: DMatrix<f64>,
    /// Negated external loads.
    pub rhs: DVector<f64>,
    /// Reaction column assignment.
    pub reactions: Vec<ReactionColumns>,
    /// Number of beam columns.
    pub beam_count: usize,
}

impl EquilibriumSystem {
    /// Assemble the equilibrium equations of every joint.
    ///
    /// The matrix has `2 * joints.len()` rows and one column per beam and per
    /// reaction component.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::DanglingBeam`] for a beam endpoint out of range
    /// and [`AnalysisError::ZeroLengthBeam`] for a beam shorter than `tolerance`.
    pub fn assemble(
        joints: &[Joint],
        beams: &[Beam],
        anchors: &[AnchorSupport],
        tolerance: f64,
    ) -> Result<Self, AnalysisError> {
        let reactions = reaction_layout(anchors, beams.len());
        let unknowns = beams.len()
            + anchors
                .iter()
                .map(|anchor| anchor.kind.reaction_unknowns())
                .sum::<usize>();
        let equations = 2 * joints.len();

        let mut matrix = DMatrix::zeros(equations, unknowns);
        let mut rhs = DVector::zeros(equations);

        for (index, joint) in joints.iter().enumerate() {
            rhs[2 * index] = -joint.load.x;
            rhs[2 * index + 1] = -joint.load.y;
        }

        for columns in &reactions {
            if let Some(rx) = columns.rx {
                matrix[(2 * columns.joint, rx)] = 1.0;
            }
            if let Some(ry) = columns.ry {
                matrix[(2 * columns.joint + 1, ry)] = 1.0;
            }
        }

        for (index, beam) in beams.iter().enumerate() {
            for joint in [beam.start, beam.end] {
                if joint >= joints.len() {
                    return Err(AnalysisError::DanglingBeam {
                        beam: index,
                        joint,
                        joint_count: joints.len(),
                    });
                }
            }
            let delta =
                joints[beam.end].position.to_vector() - joints[beam.start].position.to_vector();
            let length = delta.norm();
            if length < tolerance {
                return Err(AnalysisError::ZeroLengthBeam {
                    beam: index,
                    start: beam.start,
                    end: beam.end,
                });
            }
            let direction = delta / length;

            // A tension member pulls each endpoint towards the other one.
            matrix[(2 * beam.start, index)] += direction.x;
            matrix[(2 * beam.start + 1, index)] += direction.y;
            matrix[(2 * beam.end, index)] -= direction.x;
            matrix[(2 * beam.end + 1, index)] -= direction.y;
        }

        Ok(Self {
            matrix,
            rhs,
            reactions,
            beam_count: beams.len(),
        })
    }

    /// Solve the system for beam forces and reaction components.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::SingularMatrix`] when the solver rejects the matrix.
    pub fn solve(&self, pivot_tolerance: f64) -> Result<DVector<f64>, AnalysisError> {
        let solution = solve_linear_system(&self.matrix, &self.rhs, pivot_tolerance)
            .map_err(|source| AnalysisError::SingularMatrix { source })?;
        debug!(
            residual = self.residual(&solution).norm(),
            unknowns = solution.len(),
            "solved equilibrium system"
        );
        Ok(solution)
    }

    /// Equation residual `matrix * solution - rhs`.
    #[must_use]
    pub fn residual(&self, solution: &DVector<f64>) -> DVector<f64> {
        &self.matrix * solution - &self.rhs
    }

    /// Write solved forces into `beams` and return the reaction of every anchor.
    pub fn extract(&self, solution: &DVector<f64>, beams: &mut [Beam]) -> BTreeMap<usize, Reaction> {
        for (index, beam) in beams.iter_mut().enumerate().take(self.beam_count) {
            beam.set_force(solution[index]);
        }
        self.reactions
            .iter()
            .map(|columns| {
                let component = |column: Option<usize>| column.map_or(0.0, |c| solution[c]);
                let force = Force::new(component(columns.rx), component(columns.ry));
                (columns.joint, Reaction::restrained(columns.kind, force))
            })
            .collect()
    }
}
