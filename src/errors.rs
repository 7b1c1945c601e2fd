//! Error types produced while editing or analysing trusses.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Global axis of the plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("X"),
            Axis::Y => f.write_str("Y"),
        }
    }
}

/// Reason a structure could not be analysed.
///
/// The [`Display`](std::fmt::Display) output is the diagnostic shown to the
/// user. [`AnalysisError::problematic_joints`] names the joints to highlight.
#[derive(Clone, Debug, Error, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "details", rename_all = "snake_case")]
pub enum AnalysisError {
    /// Returned when the structure has no joints at all.
    #[error("system empty; add joints and beams")]
    EmptyStructure,
    /// Returned when no joint is anchored.
    #[error("structure has no anchors; it cannot resist loads and is unstable")]
    NoAnchors,
    /// Returned when a beam references a joint that does not exist.
    #[error("beam {beam} references joint {joint}, but the structure has {joint_count} joints")]
    DanglingBeam {
        /// Index of the offending beam.
        beam: usize,
        /// Out-of-range joint index.
        joint: usize,
        /// Number of joints in the structure.
        joint_count: usize,
    },
    /// Returned when the beams do not connect every joint.
    #[error("structure is not fully connected; joints {isolated:?} are cut off from the rest")]
    Disconnected {
        /// Joints not reached from the traversal start.
        isolated: Vec<usize>,
    },
    /// Returned when some joints have no beam path to any anchor.
    #[error("not all parts of the structure are connected to an anchor; joints {joints:?} are floating")]
    UnreachableFromAnchor {
        /// Joints without a path to an anchor.
        joints: Vec<usize>,
    },
    /// Returned when two or more anchors sit at the same coordinates.
    #[error("multiple anchors are at the same location: joints {joints:?}")]
    CoincidentAnchors {
        /// Anchors sharing a location.
        joints: Vec<usize>,
    },
    /// Returned when the anchors provide fewer than three reaction components.
    #[error("insufficient reactions ({unknowns}) to ensure global stability; a 2D truss needs at least 3")]
    InsufficientReactions {
        /// Number of reaction components provided.
        unknowns: usize,
        /// Anchor joints.
        anchors: Vec<usize>,
    },
    /// Returned when no anchor restrains one of the global axes.
    #[error("structure lacks ability to resist {} forces globally", axes_phrase(.axes))]
    MissingDirectionCoverage {
        /// Axes without any restraint.
        axes: Vec<Axis>,
        /// Anchor joints.
        anchors: Vec<usize>,
    },
    /// Returned when a single anchor joint carries all reactions.
    #[error("structure lacks ability to resist rotation; {} anchor joint(s), at least 2 are needed", .anchors.len())]
    InsufficientMomentResistance {
        /// Anchor joints.
        anchors: Vec<usize>,
    },
    /// Returned when the unknown count differs from the equation count.
    #[error(
        "system is not statically determinate by count: equations {equations}, unknowns {unknowns} ({})",
        determinacy_hint(.equations, .unknowns)
    )]
    DeterminacyMismatch {
        /// Two equilibrium equations per joint.
        equations: usize,
        /// Beam forces plus reaction components.
        unknowns: usize,
    },
    /// Returned when a beam connects coincident joints.
    #[error("beam {beam} (joints {start}-{end}) has zero length or connects coincident joints")]
    ZeroLengthBeam {
        /// Index of the offending beam.
        beam: usize,
        /// First endpoint.
        start: usize,
        /// Second endpoint.
        end: usize,
    },
    /// Returned when the assembled equilibrium system cannot be solved.
    #[error("matrix solution failed; structure may be a mechanism or indeterminate due to geometry or supports")]
    SingularMatrix {
        /// Failure reported by the solver.
        #[source]
        source: SolverError,
    },
}

impl AnalysisError {
    /// Short machine-readable name of the failure.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::EmptyStructure => "empty_structure",
            AnalysisError::NoAnchors => "no_anchors",
            AnalysisError::DanglingBeam { .. } => "dangling_beam",
            AnalysisError::Disconnected { .. } => "disconnected",
            AnalysisError::UnreachableFromAnchor { .. } => "unreachable_from_anchor",
            AnalysisError::CoincidentAnchors { .. } => "coincident_anchors",
            AnalysisError::InsufficientReactions { .. } => "insufficient_reactions",
            AnalysisError::MissingDirectionCoverage { .. } => "missing_direction_coverage",
            AnalysisError::InsufficientMomentResistance { .. } => {
                "insufficient_moment_resistance"
            }
            AnalysisError::DeterminacyMismatch { .. } => "determinacy_mismatch",
            AnalysisError::ZeroLengthBeam { .. } => "zero_length_beam",
            AnalysisError::SingularMatrix { .. } => "singular_matrix",
        }
    }

    /// Joints implicated by this failure, sorted and limited to `joint_count`.
    ///
    /// Failures that concern the structure as a whole implicate every joint.
    #[must_use]
    pub fn problematic_joints(&self, joint_count: usize) -> Vec<usize> {
        let mut joints = match self {
            AnalysisError::EmptyStructure => Vec::new(),
            AnalysisError::NoAnchors
            | AnalysisError::DanglingBeam { .. }
            | AnalysisError::Disconnected { .. }
            | AnalysisError::DeterminacyMismatch { .. }
            | AnalysisError::SingularMatrix { .. } => (0..joint_count).collect(),
            AnalysisError::UnreachableFromAnchor { joints }
            | AnalysisError::CoincidentAnchors { joints } => joints.clone(),
            AnalysisError::InsufficientReactions { anchors, .. }
            | AnalysisError::MissingDirectionCoverage { anchors, .. }
            | AnalysisError::InsufficientMomentResistance { anchors } => anchors.clone(),
            AnalysisError::ZeroLengthBeam { start, end, .. } => vec![*start, *end],
        };
        joints.retain(|&joint| joint < joint_count);
        joints.sort_unstable();
        joints.dedup();
        joints
    }
}

/// Render a list of axes as `X-direction and Y-direction`.
fn axes_phrase(axes: &[Axis]) -> String {
    axes.iter()
        .map(|axis| format!("{axis}-direction"))
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Explain what a determinacy mismatch most likely means.
fn determinacy_hint(equations: &usize, unknowns: &usize) -> &'static str {
    if unknowns < equations {
        "likely a mechanism / unstable"
    } else {
        "likely statically indeterminate; only determinate systems are solved"
    }
}

/// Error returned by the dense linear solver.
#[derive(Clone, Copy, Debug, Error, PartialEq, Serialize, Deserialize)]
pub enum SolverError {
    /// Returned when no acceptable pivot exists for a column.
    #[error("matrix is singular or near-singular at column {column} (pivot {pivot:e})")]
    Singular {
        /// Column being eliminated.
        column: usize,
        /// Largest available pivot magnitude.
        pivot: f64,
    },
    /// Returned when the system is empty or not square.
    #[error("expected a non-empty square system, got a {rows}x{columns} matrix and {rhs} right-hand side entries")]
    DimensionMismatch {
        /// Matrix rows.
        rows: usize,
        /// Matrix columns.
        columns: usize,
        /// Right-hand side length.
        rhs: usize,
    },
}

/// Error returned when editing a [`Truss`](crate::Truss) with invalid input.
///
/// # Examples
///
/// ```
/// use bridgestat::{point, EditError, Truss};
///
/// let mut truss = Truss::new();
/// let a = truss.add_joint(point(0.0, 0.0)).expect("first joint");
/// let error = truss.add_beam(a, a).expect_err("self connection rejected");
/// assert_eq!(error, EditError::SelfConnection(a));
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EditError {
    /// Returned when a joint index is out of range.
    #[error("joint {0} does not exist in this truss")]
    UnknownJoint(usize),
    /// Returned when a beam index is out of range.
    #[error("beam {0} does not exist in this truss")]
    UnknownBeam(usize),
    /// Returned when a joint already exists at the requested location.
    #[error("a joint already exists at this location (joint {existing})")]
    DuplicateJoint {
        /// Joint occupying the location.
        existing: usize,
    },
    /// Returned when a beam would connect a joint to itself.
    #[error("cannot connect joint {0} to itself")]
    SelfConnection(usize),
    /// Returned when a beam already connects the two joints.
    #[error("beam {existing} already connects these joints")]
    DuplicateBeam {
        /// Beam connecting the pair.
        existing: usize,
    },
    /// Returned when a load is applied to an anchor.
    #[error("loads cannot be applied to anchor joint {0}")]
    LoadOnAnchor(usize),
    /// Returned when a beam area is zero or negative.
    #[error("beam {beam} area must be positive (received {area})")]
    NonPositiveArea {
        /// Affected beam.
        beam: usize,
        /// Rejected area.
        area: f64,
    },
}
