//! Plain-text summary of an analysis pass.

use std::fmt::Write;

use crate::analysis::StructuralState;
use crate::truss::Reaction;

/// Render a textual summary of a [`StructuralState`].
///
/// Tension is reported with a `+` sign and compression with `-`, following
/// the convention of <https://en.wikipedia.org/wiki/Truss#Analysis>.
#[must_use]
pub fn render_summary(state: &StructuralState) -> String {
    let mut output = String::new();

    let status = if state.success { "OK" } else { "FAILED" };
    writeln!(
        &mut output,
        "Truss analysis [{status}]: {} joints, {} beams",
        state.joints.len(),
        state.beams.len()
    )
    .expect("writing to string cannot fail");
    writeln!(&mut output, "{}", state.message).expect("writing to string cannot fail");

    if !state.success {
        if !state.problematic_joints.is_empty() {
            writeln!(
                &mut output,
                "Problematic joints: {:?}",
                state.problematic_joints
            )
            .expect("writing to string cannot fail");
        }
        return output;
    }

    for (index, beam) in state.beams.iter().enumerate() {
        let kind = if beam.force > 0.0 {
            "tension"
        } else if beam.force < 0.0 {
            "compression"
        } else {
            "unloaded"
        };
        writeln!(
            &mut output,
            "Beam {index} ({}-{}): force = {:+.1} N ({kind}), stress = {:+.3e} Pa",
            beam.start, beam.end, beam.force, beam.stress
        )
        .expect("writing to string cannot fail");
    }

    for (joint, reaction) in &state.reactions {
        let components = match reaction {
            Reaction::Pin { rx, ry } => format!("rx = {rx:+.1} N, ry = {ry:+.1} N"),
            Reaction::RollerX { ry } => format!("ry = {ry:+.1} N"),
            Reaction::RollerY { rx } => format!("rx = {rx:+.1} N"),
        };
        writeln!(
            &mut output,
            "Reaction at joint {joint} ({:?}): {components}",
            reaction.anchor()
        )
        .expect("writing to string cannot fail");
    }

    output
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::errors::AnalysisError;
    use crate::geometry::point;
    use crate::truss::{AnchorType, Beam, Joint};

    #[test]
    fn formats_forces_and_reactions() {
        let mut beam = Beam::new(0, 1);
        beam.set_force(-250.0);
        let state = StructuralState {
            joints: vec![
                Joint::anchored(point(0.0, 0.0), AnchorType::Pin),
                Joint::anchored(point(1.0, 0.0), AnchorType::RollerX),
            ],
            beams: vec![beam],
            reactions: BTreeMap::from([
                (0, Reaction::Pin { rx: 0.0, ry: 125.0 }),
                (1, Reaction::RollerX { ry: 125.0 }),
            ]),
            success: true,
            message: "structural analysis successful".to_owned(),
            problematic_joints: Vec::new(),
            failure: None,
        };
        let report = render_summary(&state);
        assert!(report.contains("[OK]: 2 joints, 1 beams"));
        assert!(report.contains("force = -250.0 N (compression)"));
        assert!(report.contains("Reaction at joint 0 (Pin): rx = +0.0 N, ry = +125.0 N"));
        assert!(report.contains("Reaction at joint 1 (RollerX): ry = +125.0 N"));
    }

    #[test]
    fn failures_list_problematic_joints() {
        let error = AnalysisError::NoAnchors;
        let state = StructuralState {
            joints: vec![Joint::new(point(0.0, 0.0))],
            beams: Vec::new(),
            reactions: BTreeMap::new(),
            success: false,
            message: error.to_string(),
            problematic_joints: vec![0],
            failure: Some(error),
        };
        let report = render_summary(&state);
        assert!(report.contains("[FAILED]"));
        assert!(report.contains("no anchors"));
        assert!(report.contains("Problematic joints: [0]"));
    }
}
