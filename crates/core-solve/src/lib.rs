//! Constraint builder and solver driver for the booth-layout problem.
//!
//! [`model::LayoutModel::build`] transcribes the scene into a mixed-integer
//! program: integer positions and a rotation Boolean per booth, reified
//! geometric constraints (lowered to big-M form, since the backend has no
//! native implications), and a weighted linear objective. [`driver`] runs
//! the backend once and maps the result onto the status taxonomy.

use thiserror::Error;

pub mod driver;
pub mod model;

pub use driver::{solve_model, SolveOutcome, SolveStatus};
pub use model::LayoutModel;

use core_scene::{BoothRequest, SceneConfig, SolverSettings};

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("booth {id} must attach to a curtain rail but the scene defines none")]
    NoRailsDefined { id: i64 },
    #[error("booth {id}: non-positive dimensions {width}x{depth}")]
    BadBoothSize { id: i64, width: i64, depth: i64 },
    #[error("solved placement violates invariants: {0}")]
    Invariant(#[from] core_scene::PlacementError),
}

/// Build the model for a scene and solve it in one call.
pub fn optimize(
    scene: &SceneConfig,
    requests: &[BoothRequest],
    settings: &SolverSettings,
) -> Result<SolveOutcome, SolveError> {
    let model = LayoutModel::build(scene, requests)?;
    driver::solve_model(model, settings)
}
