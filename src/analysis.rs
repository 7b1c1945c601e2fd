//! Engine entry point: classify the structure, then solve it when possible.

use std::collections::BTreeMap;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::assembly::EquilibriumSystem;
use crate::determinacy::{collect_anchors, AnchorSupport, Determinacy};
use crate::errors::AnalysisError;
use crate::graph::{check_anchor_reachability, check_connectivity, find_coincident_anchors};
use crate::params::AnalysisParams;
use crate::truss::{Beam, Joint, Reaction};

/// Message reported after a successful solve.
pub const SUCCESS_MESSAGE: &str = "structural analysis successful";

/// Message reported when a beamless structure consists only of anchors.
pub const ANCHORS_ONLY_MESSAGE: &str =
    "structure consists only of anchors (no beams); static if loads are balanced by reactions";

/// Message reported when every joint is anchored and nothing is loaded.
pub const FULLY_ANCHORED_MESSAGE: &str =
    "every joint is anchored and unloaded; beams carry no force";

/// How a structure that passed every check is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Resolution {
    /// Assemble and solve the equilibrium equations.
    Equilibrium,
    /// All joints are supports and carry no load: the zero state balances.
    FullyAnchored,
}

/// Snapshot returned by [`analyze`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructuralState {
    /// Input joints with `problematic` recomputed.
    pub joints: Vec<Joint>,
    /// Input beams with force and stress filled in (zero unless solved).
    pub beams: Vec<Beam>,
    /// Reactions keyed by anchor joint index, present only on success.
    pub reactions: BTreeMap<usize, Reaction>,
    /// Whether the structure was solved.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Joints flagged as problematic, ascending.
    pub problematic_joints: Vec<usize>,
    /// Failure that ended the pass, if any.
    pub failure: Option<AnalysisError>,
}

impl StructuralState {
    /// Failure reported by the pass, as a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the [`AnalysisError`] that stopped the analysis.
    pub fn outcome(&self) -> Result<(), &AnalysisError> {
        self.failure.as_ref().map_or(Ok(()), Err)
    }

    /// Reaction at an anchor joint.
    #[must_use]
    pub fn reaction(&self, joint: usize) -> Option<&Reaction> {
        self.reactions.get(&joint)
    }

    /// Successful snapshot.
    fn solved(
        joints: Vec<Joint>,
        beams: Vec<Beam>,
        reactions: BTreeMap<usize, Reaction>,
        message: &str,
    ) -> Self {
        Self {
            joints,
            beams,
            reactions,
            success: true,
            message: message.to_owned(),
            problematic_joints: Vec::new(),
            failure: None,
        }
    }

    /// Failed snapshot with the implicated joints flagged.
    fn failed(mut joints: Vec<Joint>, beams: Vec<Beam>, error: AnalysisError) -> Self {
        let problematic_joints = error.problematic_joints(joints.len());
        for &joint in &problematic_joints {
            joints[joint].problematic = true;
        }
        warn!(
            kind = error.kind(),
            problematic = problematic_joints.len(),
            "analysis failed: {error}"
        );
        Self {
            joints,
            beams,
            reactions: BTreeMap::new(),
            success: false,
            message: error.to_string(),
            problematic_joints,
            failure: Some(error),
        }
    }
}

/// Analyse a structure by static equilibrium.
///
/// The inputs are never modified. The returned snapshot holds copies of the
/// joints with `problematic` recomputed and of the beams with force and stress
/// reset, then filled in when the structure solves. Checks run in a fixed
/// order and the first failing one ends the pass.
///
/// # Examples
/// ```
/// use bridgestat::{analyze, force, point, AnalysisParams, AnchorType, Beam, Joint};
///
/// let joints = vec![
///     Joint::anchored(point(0.0, 0.0), AnchorType::Pin),
///     Joint::anchored(point(100.0, 0.0), AnchorType::RollerX),
///     Joint::loaded(point(50.0, 87.0), force(0.0, -1_000.0)),
/// ];
/// let beams = vec![Beam::new(0, 1), Beam::new(1, 2), Beam::new(0, 2)];
///
/// let state = analyze(&joints, &beams, &AnalysisParams::default());
/// assert!(state.success, "{}", state.message);
/// assert_eq!(state.reactions.len(), 2);
/// ```
#[must_use]
pub fn analyze(joints: &[Joint], beams: &[Beam], params: &AnalysisParams) -> StructuralState {
    info!(
        joints = joints.len(),
        beams = beams.len(),
        "starting structural analysis"
    );

    let fresh_joints: Vec<Joint> = joints
        .iter()
        .map(|joint| Joint {
            problematic: false,
            ..*joint
        })
        .collect();
    let mut fresh_beams: Vec<Beam> = beams
        .iter()
        .map(|beam| {
            let mut beam = *beam;
            beam.set_force(0.0);
            beam
        })
        .collect();

    let anchors = collect_anchors(joints);
    let outcome = if beams.is_empty() {
        solve_beamless(joints, &anchors)
    } else {
        classify(joints, beams, &anchors, params).and_then(|resolution| {
            let system =
                EquilibriumSystem::assemble(joints, beams, &anchors, params.float_tolerance)?;
            match resolution {
                Resolution::Equilibrium => {
                    let solution = system.solve(params.pivot_tolerance)?;
                    Ok((system.extract(&solution, &mut fresh_beams), SUCCESS_MESSAGE))
                }
                Resolution::FullyAnchored => {
                    let zero = DVector::zeros(system.matrix.ncols());
                    Ok((system.extract(&zero, &mut fresh_beams), FULLY_ANCHORED_MESSAGE))
                }
            }
        })
    };

    match outcome {
        Ok((reactions, message)) => {
            info!(reactions = reactions.len(), "{message}");
            StructuralState::solved(fresh_joints, fresh_beams, reactions, message)
        }
        Err(error) => StructuralState::failed(fresh_joints, fresh_beams, error),
    }
}

/// Structures without beams: only a set of anchors can stand on its own.
fn solve_beamless(
    joints: &[Joint],
    anchors: &[AnchorSupport],
) -> Result<(BTreeMap<usize, Reaction>, &'static str), AnalysisError> {
    if joints.is_empty() {
        return Err(AnalysisError::EmptyStructure);
    }
    if anchors.is_empty() {
        return Err(AnalysisError::NoAnchors);
    }
    if anchors.len() < joints.len() {
        let floating = joints
            .iter()
            .enumerate()
            .filter(|(_, joint)| !joint.is_anchor())
            .map(|(index, _)| index)
            .collect();
        return Err(AnalysisError::UnreachableFromAnchor { joints: floating });
    }
    let reactions = anchors
        .iter()
        .map(|anchor| {
            let load = joints[anchor.joint].load;
            (anchor.joint, Reaction::restrained(anchor.kind, -load))
        })
        .collect();
    Ok((reactions, ANCHORS_ONLY_MESSAGE))
}

/// Run every pre-assembly check in order.
fn classify(
    joints: &[Joint],
    beams: &[Beam],
    anchors: &[AnchorSupport],
    params: &AnalysisParams,
) -> Result<Resolution, AnalysisError> {
    let dangling = beams.iter().enumerate().find_map(|(index, beam)| {
        [beam.start, beam.end]
            .into_iter()
            .find(|&joint| joint >= joints.len())
            .map(|joint| (index, joint))
    });
    debug!(passed = dangling.is_none(), "beam endpoint check");
    if let Some((beam, joint)) = dangling {
        return Err(AnalysisError::DanglingBeam {
            beam,
            joint,
            joint_count: joints.len(),
        });
    }

    let connectivity = check_connectivity(joints.len(), beams);
    debug!(passed = connectivity.passed(), "connectivity check");
    if !connectivity.passed() {
        return Err(AnalysisError::Disconnected {
            isolated: connectivity.offending,
        });
    }

    debug!(
        passed = !anchors.is_empty(),
        anchors = anchors.len(),
        "anchor presence check"
    );
    if anchors.is_empty() {
        return Err(AnalysisError::NoAnchors);
    }

    let coincident = find_coincident_anchors(joints, params.coincidence_decimals);
    debug!(passed = coincident.passed(), "coincident anchor check");
    if !coincident.passed() {
        return Err(AnalysisError::CoincidentAnchors {
            joints: coincident.offending,
        });
    }

    let reachability = check_anchor_reachability(joints, beams);
    debug!(passed = reachability.passed(), "anchor reachability check");
    if !reachability.passed() {
        return Err(AnalysisError::UnreachableFromAnchor {
            joints: reachability.offending,
        });
    }

    if anchors.len() == joints.len()
        && joints
            .iter()
            .all(|joint| !joint.load.is_significant(params.float_tolerance))
    {
        debug!("every joint anchored and unloaded");
        return Ok(Resolution::FullyAnchored);
    }

    let determinacy = Determinacy::classify(anchors, joints.len(), beams.len());
    debug!(
        equations = determinacy.total_equations(),
        unknowns = determinacy.total_unknowns(),
        reactions = determinacy.reaction_unknowns,
        "determinacy check"
    );
    determinacy.check_count()?;
    determinacy.check_supports()?;
    Ok(Resolution::Equilibrium)
}
