//! Structure model and the editing operations performed by the host editor.

use serde::{Deserialize, Serialize};

use crate::analysis::{analyze, StructuralState};
use crate::errors::EditError;
use crate::geometry::{Force, Point};
use crate::params::{AnalysisParams, DEFAULT_BEAM_AREA};

/// Support condition applied to a joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorType {
    /// Restrains both X and Y translation.
    Pin,
    /// Slides along X; restrains Y only.
    RollerX,
    /// Slides along Y; restrains X only.
    RollerY,
}

impl AnchorType {
    /// Number of reaction components this anchor contributes.
    #[must_use]
    pub const fn reaction_unknowns(self) -> usize {
        match self {
            AnchorType::Pin => 2,
            AnchorType::RollerX | AnchorType::RollerY => 1,
        }
    }

    /// Whether the anchor resists forces along X.
    #[must_use]
    pub const fn restrains_x(self) -> bool {
        matches!(self, AnchorType::Pin | AnchorType::RollerY)
    }

    /// Whether the anchor resists forces along Y.
    #[must_use]
    pub const fn restrains_y(self) -> bool {
        matches!(self, AnchorType::Pin | AnchorType::RollerX)
    }

    /// Next state of the editor's anchor tool: none, pin, roller X, roller Y, none.
    #[must_use]
    pub const fn cycle(current: Option<AnchorType>) -> Option<AnchorType> {
        match current {
            None => Some(AnchorType::Pin),
            Some(AnchorType::Pin) => Some(AnchorType::RollerX),
            Some(AnchorType::RollerX) => Some(AnchorType::RollerY),
            Some(AnchorType::RollerY) => None,
        }
    }
}

/// Support reaction at an anchor, carrying only the components its kind restrains.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "anchor", rename_all = "snake_case")]
pub enum Reaction {
    /// Reaction of a pin.
    Pin {
        /// Horizontal component.
        rx: f64,
        /// Vertical component.
        ry: f64,
    },
    /// Reaction of a roller sliding along X.
    RollerX {
        /// Vertical component.
        ry: f64,
    },
    /// Reaction of a roller sliding along Y.
    RollerY {
        /// Horizontal component.
        rx: f64,
    },
}

impl Reaction {
    /// Build the reaction for `anchor` keeping only the restrained components of `force`.
    #[must_use]
    pub fn restrained(anchor: AnchorType, force: Force) -> Self {
        match anchor {
            AnchorType::Pin => Reaction::Pin {
                rx: force.x,
                ry: force.y,
            },
            AnchorType::RollerX => Reaction::RollerX { ry: force.y },
            AnchorType::RollerY => Reaction::RollerY { rx: force.x },
        }
    }

    /// Anchor kind that produced this reaction.
    #[must_use]
    pub const fn anchor(&self) -> AnchorType {
        match self {
            Reaction::Pin { .. } => AnchorType::Pin,
            Reaction::RollerX { .. } => AnchorType::RollerX,
            Reaction::RollerY { .. } => AnchorType::RollerY,
        }
    }

    /// Horizontal component, when restrained.
    #[must_use]
    pub const fn rx(&self) -> Option<f64> {
        match self {
            Reaction::Pin { rx, .. } | Reaction::RollerY { rx } => Some(*rx),
            Reaction::RollerX { .. } => None,
        }
    }

    /// Vertical component, when restrained.
    #[must_use]
    pub const fn ry(&self) -> Option<f64> {
        match self {
            Reaction::Pin { ry, .. } | Reaction::RollerX { ry } => Some(*ry),
            Reaction::RollerY { .. } => None,
        }
    }

    /// Reaction as a force vector with unrestrained components set to zero.
    #[must_use]
    pub fn as_force(&self) -> Force {
        Force::new(self.rx().unwrap_or(0.0), self.ry().unwrap_or(0.0))
    }
}

/// A truss joint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    /// Position in world units.
    pub position: Point,
    /// Support condition, if the joint is anchored.
    pub anchor: Option<AnchorType>,
    /// External load in newtons.
    pub load: Force,
    /// Set by the last analysis when this joint is implicated in a failure.
    pub problematic: bool,
}

impl Joint {
    /// Create a free, unloaded joint.
    #[must_use]
    pub fn new(position: Point) -> Self {
        Self {
            position,
            anchor: None,
            load: Force::default(),
            problematic: false,
        }
    }

    /// Create an anchored joint.
    #[must_use]
    pub fn anchored(position: Point, anchor: AnchorType) -> Self {
        Self {
            anchor: Some(anchor),
            ..Self::new(position)
        }
    }

    /// Create a free joint carrying `load`.
    #[must_use]
    pub fn loaded(position: Point, load: Force) -> Self {
        Self {
            load,
            ..Self::new(position)
        }
    }

    /// Whether the joint is anchored.
    #[must_use]
    pub const fn is_anchor(&self) -> bool {
        self.anchor.is_some()
    }
}

/// A two-force member between two joints.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    /// Index of the first joint.
    pub start: usize,
    /// Index of the second joint.
    pub end: usize,
    /// Axial force; positive in tension, negative in compression.
    pub force: f64,
    /// Cross-sectional area.
    pub area: f64,
    /// Axial stress, `force / area`.
    pub stress: f64,
}

impl Beam {
    /// Create an unloaded beam with the default area.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            force: 0.0,
            area: DEFAULT_BEAM_AREA,
            stress: 0.0,
        }
    }

    /// Store an axial force and the matching stress.
    pub fn set_force(&mut self, force: f64) {
        self.force = force;
        self.stress = if self.area > 0.0 { force / self.area } else { 0.0 };
    }

    /// Whether the beam touches `joint`.
    #[must_use]
    pub const fn is_incident_to(&self, joint: usize) -> bool {
        self.start == joint || self.end == joint
    }

    /// Endpoint opposite to `joint`, if the beam touches it.
    #[must_use]
    pub const fn other_end(&self, joint: usize) -> Option<usize> {
        if self.start == joint {
            Some(self.end)
        } else if self.end == joint {
            Some(self.start)
        } else {
            None
        }
    }

    /// Whether the beam connects `a` and `b` in either order.
    #[must_use]
    pub const fn connects(&self, a: usize, b: usize) -> bool {
        (self.start == a && self.end == b) || (self.start == b && self.end == a)
    }
}

/// Container for a pin-jointed planar truss.
///
/// Joints are identified by their position in the joint list. Removing a joint
/// shifts every later joint down by one and rewrites beam endpoints to match.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Truss {
    /// Joints in creation order.
    joints: Vec<Joint>,
    /// Beams in creation order.
    beams: Vec<Beam>,
    /// Tolerances for editing and analysis.
    #[serde(default)]
    params: AnalysisParams,
}

impl Truss {
    /// Create an empty truss.
    ///
    /// # Examples
    /// ```
    /// use bridgestat::Truss;
    ///
    /// let truss = Truss::new();
    /// assert_eq!(truss.joint_count(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty truss using custom tolerances.
    #[must_use]
    pub fn with_params(params: AnalysisParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Build a truss from existing collections without validation.
    #[must_use]
    pub fn from_parts(joints: Vec<Joint>, beams: Vec<Beam>) -> Self {
        Self {
            joints,
            beams,
            params: AnalysisParams::default(),
        }
    }

    /// Tolerances used by this truss.
    #[must_use]
    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    /// Return the number of joints.
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Return the number of beams.
    #[must_use]
    pub fn beam_count(&self) -> usize {
        self.beams.len()
    }

    /// All joints in index order.
    #[must_use]
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// All beams in index order.
    #[must_use]
    pub fn beams(&self) -> &[Beam] {
        &self.beams
    }

    /// Look up a joint.
    #[must_use]
    pub fn joint(&self, joint: usize) -> Option<&Joint> {
        self.joints.get(joint)
    }

    /// Look up a beam.
    #[must_use]
    pub fn beam(&self, beam: usize) -> Option<&Beam> {
        self.beams.get(beam)
    }

    /// Add a new free joint and return its index.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::DuplicateJoint`] when a joint already occupies the location.
    ///
    /// # Examples
    /// ```
    /// use bridgestat::{point, Truss};
    ///
    /// let mut truss = Truss::new();
    /// let joint = truss.add_joint(point(0.0, 0.0)).expect("empty location");
    /// assert_eq!(joint, 0);
    /// assert!(truss.add_joint(point(0.0, 0.0)).is_err());
    /// ```
    pub fn add_joint(&mut self, position: Point) -> Result<usize, EditError> {
        let tolerance = self.params.float_tolerance;
        if let Some(existing) = self
            .joints
            .iter()
            .position(|joint| joint.position.coincides_with(position, tolerance))
        {
            return Err(EditError::DuplicateJoint { existing });
        }
        self.joints.push(Joint::new(position));
        Ok(self.joints.len() - 1)
    }

    /// Add a new anchored joint and return its index.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::DuplicateJoint`] when a joint already occupies the location.
    pub fn add_anchor(&mut self, position: Point, anchor: AnchorType) -> Result<usize, EditError> {
        let joint = self.add_joint(position)?;
        self.set_anchor(joint, Some(anchor))?;
        Ok(joint)
    }

    /// Update the position of an existing joint.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::UnknownJoint`] when `joint` is out of range.
    pub fn move_joint(&mut self, joint: usize, position: Point) -> Result<(), EditError> {
        let node = self.joint_mut(joint)?;
        node.position = position;
        Ok(())
    }

    /// Remove a joint together with every beam that touches it.
    ///
    /// Beam endpoints above the removed index shift down by one.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::UnknownJoint`] when `joint` is out of range.
    pub fn remove_joint(&mut self, joint: usize) -> Result<Joint, EditError> {
        if joint >= self.joints.len() {
            return Err(EditError::UnknownJoint(joint));
        }
        let removed = self.joints.remove(joint);
        self.beams.retain(|beam| !beam.is_incident_to(joint));
        for beam in &mut self.beams {
            if beam.start > joint {
                beam.start -= 1;
            }
            if beam.end > joint {
                beam.end -= 1;
            }
        }
        Ok(removed)
    }

    /// Connect two joints with a new beam and return its index.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::UnknownJoint`] for an out-of-range endpoint,
    /// [`EditError::SelfConnection`] when both endpoints match and
    /// [`EditError::DuplicateBeam`] when the pair is already connected.
    pub fn add_beam(&mut self, start: usize, end: usize) -> Result<usize, EditError> {
        for joint in [start, end] {
            if joint >= self.joints.len() {
                return Err(EditError::UnknownJoint(joint));
            }
        }
        if start == end {
            return Err(EditError::SelfConnection(start));
        }
        if let Some(existing) = self.beams.iter().position(|beam| beam.connects(start, end)) {
            return Err(EditError::DuplicateBeam { existing });
        }
        self.beams.push(Beam::new(start, end));
        Ok(self.beams.len() - 1)
    }

    /// Remove a beam.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::UnknownBeam`] when `beam` is out of range.
    pub fn remove_beam(&mut self, beam: usize) -> Result<Beam, EditError> {
        if beam >= self.beams.len() {
            return Err(EditError::UnknownBeam(beam));
        }
        Ok(self.beams.remove(beam))
    }

    /// Set the support condition of a joint. Anchoring clears the joint's load.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::UnknownJoint`] when `joint` is out of range.
    pub fn set_anchor(&mut self, joint: usize, anchor: Option<AnchorType>) -> Result<(), EditError> {
        let node = self.joint_mut(joint)?;
        node.anchor = anchor;
        if anchor.is_some() {
            node.load = Force::zero();
        }
        Ok(())
    }

    /// Advance the anchor tool on a joint and return the new support condition.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::UnknownJoint`] when `joint` is out of range.
    pub fn toggle_anchor(&mut self, joint: usize) -> Result<Option<AnchorType>, EditError> {
        let current = self.joint(joint).ok_or(EditError::UnknownJoint(joint))?.anchor;
        let next = AnchorType::cycle(current);
        self.set_anchor(joint, next)?;
        Ok(next)
    }

    /// Apply a point load to a free joint.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::UnknownJoint`] when `joint` is out of range and
    /// [`EditError::LoadOnAnchor`] when the joint is anchored.
    pub fn set_load(&mut self, joint: usize, load: Force) -> Result<(), EditError> {
        let node = self.joint_mut(joint)?;
        if node.is_anchor() {
            return Err(EditError::LoadOnAnchor(joint));
        }
        node.load = load;
        Ok(())
    }

    /// Set the cross-sectional area of a beam.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::UnknownBeam`] when `beam` is out of range and
    /// [`EditError::NonPositiveArea`] when `area` is not strictly positive.
    pub fn set_beam_area(&mut self, beam: usize, area: f64) -> Result<(), EditError> {
        if area <= 0.0 {
            return Err(EditError::NonPositiveArea { beam, area });
        }
        let member = self.beams.get_mut(beam).ok_or(EditError::UnknownBeam(beam))?;
        member.area = area;
        member.set_force(member.force);
        Ok(())
    }

    /// Remove every joint and beam.
    pub fn clear(&mut self) {
        self.joints.clear();
        self.beams.clear();
    }

    /// Analyse the current structure.
    #[must_use]
    pub fn analyze(&self) -> StructuralState {
        analyze(&self.joints, &self.beams, &self.params)
    }

    /// Analyse the structure and keep the computed forces and flags.
    pub fn evaluate(&mut self) -> StructuralState {
        let state = self.analyze();
        self.joints.clone_from(&state.joints);
        self.beams.clone_from(&state.beams);
        state
    }

    /// Mutable joint lookup.
    fn joint_mut(&mut self, joint: usize) -> Result<&mut Joint, EditError> {
        self.joints.get_mut(joint).ok_or(EditError::UnknownJoint(joint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{force, point};

    /// Square with a diagonal: joints 0..4, beams 01 12 23 30 02.
    fn braced_square() -> Truss {
        let mut truss = Truss::new();
        for position in [
            point(0.0, 0.0),
            point(1.0, 0.0),
            point(1.0, 1.0),
            point(0.0, 1.0),
        ] {
            truss.add_joint(position).expect("distinct joint");
        }
        for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)] {
            truss.add_beam(a, b).expect("new beam");
        }
        truss
    }

    #[test]
    fn anchor_kinds_describe_their_restraints() {
        assert_eq!(AnchorType::Pin.reaction_unknowns(), 2);
        assert_eq!(AnchorType::RollerX.reaction_unknowns(), 1);
        assert!(AnchorType::RollerX.restrains_y() && !AnchorType::RollerX.restrains_x());
        assert!(AnchorType::RollerY.restrains_x() && !AnchorType::RollerY.restrains_y());
    }

    #[test]
    fn anchor_tool_cycles_through_every_kind() {
        let mut state = None;
        let mut seen = Vec::new();
        for _ in 0..4 {
            state = AnchorType::cycle(state);
            seen.push(state);
        }
        assert_eq!(
            seen,
            vec![
                Some(AnchorType::Pin),
                Some(AnchorType::RollerX),
                Some(AnchorType::RollerY),
                None
            ]
        );
    }

    #[test]
    fn reactions_expose_only_restrained_components() {
        let roller = Reaction::restrained(AnchorType::RollerX, force(3.0, 4.0));
        assert_eq!(roller, Reaction::RollerX { ry: 4.0 });
        assert_eq!(roller.rx(), None);
        assert_eq!(roller.ry(), Some(4.0));
        assert_eq!(roller.as_force(), force(0.0, 4.0));
        assert_eq!(roller.anchor(), AnchorType::RollerX);
    }

    #[test]
    fn setting_force_updates_stress() {
        let mut beam = Beam::new(0, 1);
        beam.set_force(-50.0);
        assert!((beam.stress - (-50.0 / DEFAULT_BEAM_AREA)).abs() < 1.0e-9);
        assert_eq!(beam.other_end(1), Some(0));
        assert_eq!(beam.other_end(2), None);
    }

    #[test]
    fn duplicate_joints_and_beams_are_rejected() {
        let mut truss = braced_square();
        assert_eq!(
            truss.add_joint(point(1.0, 1.0)),
            Err(EditError::DuplicateJoint { existing: 2 })
        );
        assert_eq!(
            truss.add_beam(2, 0),
            Err(EditError::DuplicateBeam { existing: 4 })
        );
        assert_eq!(truss.add_beam(0, 9), Err(EditError::UnknownJoint(9)));
        assert_eq!(truss.add_beam(3, 3), Err(EditError::SelfConnection(3)));
    }

    #[test]
    fn removing_a_joint_reindexes_beams() {
        let mut truss = braced_square();
        let incident = truss.beams().iter().filter(|b| b.is_incident_to(1)).count();
        let before = truss.beam_count();

        truss.remove_joint(1).expect("joint exists");

        assert_eq!(truss.joint_count(), 3);
        assert_eq!(truss.beam_count(), before - incident);
        let pairs: Vec<(usize, usize)> = truss.beams().iter().map(|b| (b.start, b.end)).collect();
        // 23 -> 12, 30 -> 20, 02 -> 01
        assert_eq!(pairs, vec![(1, 2), (2, 0), (0, 1)]);
        assert!(truss
            .beams()
            .iter()
            .all(|b| b.start < truss.joint_count() && b.end < truss.joint_count()));
    }

    #[test]
    fn anchors_refuse_loads_and_clear_existing_ones() {
        let mut truss = braced_square();
        truss.set_load(2, force(0.0, -10.0)).expect("free joint");
        assert_eq!(truss.toggle_anchor(2), Ok(Some(AnchorType::Pin)));
        assert_eq!(truss.joint(2).map(|j| j.load), Some(Force::zero()));
        assert_eq!(
            truss.set_load(2, force(1.0, 0.0)),
            Err(EditError::LoadOnAnchor(2))
        );
    }

    #[test]
    fn edits_on_unknown_indices_are_rejected() {
        let mut truss = braced_square();
        assert_eq!(
            truss.move_joint(7, point(0.0, 0.0)),
            Err(EditError::UnknownJoint(7))
        );
        assert_eq!(truss.remove_joint(4), Err(EditError::UnknownJoint(4)));
        assert_eq!(truss.remove_beam(5), Err(EditError::UnknownBeam(5)));
        assert_eq!(truss.toggle_anchor(8), Err(EditError::UnknownJoint(8)));
        assert!(matches!(
            truss.set_beam_area(0, 0.0),
            Err(EditError::NonPositiveArea { .. })
        ));
    }

    #[test]
    fn clear_empties_the_structure() {
        let mut truss = braced_square();
        truss.clear();
        assert_eq!(truss.joint_count(), 0);
        assert_eq!(truss.beam_count(), 0);
    }

    #[test]
    fn custom_tolerance_governs_duplicate_joints() {
        let mut coarse = Truss::with_params(AnalysisParams::default().float_tolerance(0.5));
        assert!((coarse.params().float_tolerance - 0.5).abs() < f64::EPSILON);
        coarse.add_joint(point(0.0, 0.0)).expect("empty location");
        assert_eq!(
            coarse.add_joint(point(0.25, 0.25)),
            Err(EditError::DuplicateJoint { existing: 0 })
        );

        let mut fine = Truss::new();
        assert_eq!(fine.params(), &AnalysisParams::default());
        fine.add_joint(point(0.0, 0.0)).expect("empty location");
        assert_eq!(fine.add_joint(point(0.25, 0.25)), Ok(1));
    }

    #[test]
    fn assembled_parts_analyze_like_edited_ones() {
        let joints = vec![
            Joint::anchored(point(0.0, 0.0), AnchorType::Pin),
            Joint::anchored(point(4.0, 0.0), AnchorType::RollerX),
            Joint::loaded(point(2.0, 2.0), force(0.0, -10.0)),
        ];
        let beams = vec![Beam::new(0, 1), Beam::new(1, 2), Beam::new(0, 2)];
        let mut truss = Truss::from_parts(joints, beams);
        assert_eq!(truss.params(), &AnalysisParams::default());
        assert_eq!((truss.joint_count(), truss.beam_count()), (3, 3));

        let state = truss.evaluate();
        assert!(state.success, "{}", state.message);
        assert!(truss.beam(0).is_some_and(|beam| beam.force > 0.0));
        assert!(truss.beam(1).is_some_and(|beam| beam.force < 0.0));
    }
}
