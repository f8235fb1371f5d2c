//! vinadock-molecules - Molecular docking orchestration.
//!
//! This crate runs one docking job end to end:
//! 1. Fetching the protein and ligand structures from the datastore
//! 2. Preparing receptor/ligand PDBQT inputs (Open Babel)
//! 3. Molecular docking (AutoDock Vina)
//! 4. Formatting binding modes and affinities
//! 5. Uploading the results summary

pub mod docking;
pub mod error;
pub mod pdb;
pub mod pdbqt;
pub mod pipeline;
pub mod result;
pub mod scratch;

pub use docking::{DockedComplex, PoseGenerator, StubPoseGenerator, VinaPoseGenerator};
pub use error::{DockingError, DockingFailure};
pub use pipeline::{DockingOrchestrator, DockingRequest};
pub use result::{DockingResult, ModeScore, ScoreTable};
