//! Tolerances and defaults used by the analysis engine.

use serde::{Deserialize, Serialize};

/// Cross-sectional area assigned to newly created beams.
pub const DEFAULT_BEAM_AREA: f64 = 0.01;

/// Parameters for a single analysis pass.
///
/// # Example
///
/// ```
/// use bridgestat::AnalysisParams;
///
/// let params = AnalysisParams::default();
/// assert!((params.float_tolerance - 1.0e-6).abs() < 1.0e-12);
///
/// let strict = AnalysisParams::default().pivot_tolerance(1.0e-12);
/// assert!((strict.pivot_tolerance - 1.0e-12).abs() < 1.0e-18);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    /// Geometric tolerance. Beams shorter than this are degenerate and joints
    /// closer than this on both axes are considered coincident.
    pub float_tolerance: f64,

    /// Smallest pivot magnitude accepted by the linear solver. Solution entries
    /// below it are reported as exactly zero.
    pub pivot_tolerance: f64,

    /// Number of decimals anchor coordinates are rounded to before they are
    /// compared for coincidence.
    pub coincidence_decimals: u32,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            float_tolerance: 1e-6,
            pivot_tolerance: 1e-9,
            coincidence_decimals: 3,
        }
    }
}

impl AnalysisParams {
    /// Set the geometric tolerance.
    #[must_use]
    pub const fn float_tolerance(mut self, tolerance: f64) -> Self {
        self.float_tolerance = tolerance;
        self
    }

    /// Set the solver pivot tolerance.
    #[must_use]
    pub const fn pivot_tolerance(mut self, tolerance: f64) -> Self {
        self.pivot_tolerance = tolerance;
        self
    }

    /// Set the rounding precision for anchor coincidence.
    #[must_use]
    pub const fn coincidence_decimals(mut self, decimals: u32) -> Self {
        self.coincidence_decimals = decimals;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = AnalysisParams::default();
        assert!((params.float_tolerance - 1e-6).abs() < f64::EPSILON);
        assert!((params.pivot_tolerance - 1e-9).abs() < f64::EPSILON);
        assert_eq!(params.coincidence_decimals, 3);
    }

    #[test]
    fn test_builder_pattern() {
        let params = AnalysisParams::default()
            .float_tolerance(1e-3)
            .pivot_tolerance(1e-6)
            .coincidence_decimals(1);

        assert!((params.float_tolerance - 1e-3).abs() < f64::EPSILON);
        assert!((params.pivot_tolerance - 1e-6).abs() < f64::EPSILON);
        assert_eq!(params.coincidence_decimals, 1);
    }
}
