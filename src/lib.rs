#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_doc_code_examples)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod analysis;
pub mod assembly;
pub mod determinacy;
pub mod errors;
pub mod geometry;
pub mod graph;
pub mod params;
pub mod report;
pub mod solver;
pub mod truss;

pub use analysis::{analyze, StructuralState};
pub use errors::{AnalysisError, Axis, EditError, SolverError};
pub use geometry::{force, point, Force, Point};
pub use params::{AnalysisParams, DEFAULT_BEAM_AREA};
pub use report::render_summary;
pub use solver::solve_linear_system;
pub use truss::{AnchorType, Beam, Joint, Reaction, Truss};
