//! Single-shot solver invocation and result extraction.

use std::fmt;

use good_lp::{default_solver, IntoAffineExpression, ResolutionError, Solution, SolverModel};
use tracing::{info, warn};

use core_scene::{BoothPlacement, Placement, SolverSettings};

use crate::model::LayoutModel;
use crate::SolveError;

/// Terminal status of one solver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    ModelInvalid,
    Unknown,
}

impl SolveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::ModelInvalid => "MODEL_INVALID",
            SolveStatus::Unknown => "UNKNOWN",
        }
    }

    /// Statuses that carry a usable incumbent.
    pub fn is_success(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one run: the status, and on success the verified placement
/// and objective value.
#[derive(Debug)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub placement: Option<Placement>,
    pub objective: Option<f64>,
}

/// Run the backend once and extract the placement.
///
/// The settings are honored where the backend exposes them; the default
/// pure-Rust backend is a deterministic single-threaded branch-and-bound
/// with neither a wall-clock nor a worker knob, so there they are recorded
/// for the log only.
pub fn solve_model(
    model: LayoutModel,
    settings: &SolverSettings,
) -> Result<SolveOutcome, SolveError> {
    let LayoutModel {
        vars,
        constraints,
        objective,
        booths,
        requests,
        scene,
        ..
    } = model;

    info!(
        target: "solve.driver",
        booths = booths.len(),
        constraints = constraints.len(),
        max_time_s = settings.max_time_in_seconds,
        workers = settings.num_workers,
        "solver_invoked"
    );

    let mut problem = vars.maximise(objective.clone()).using(default_solver);
    for constraint in constraints {
        problem = problem.with(constraint);
    }

    match problem.solve() {
        Ok(solution) => {
            let placed = booths
                .iter()
                .zip(&requests)
                .map(|(vars, request)| {
                    let rotated = solution.value(vars.rot) > 0.5;
                    let (width_mm, depth_mm) = if rotated {
                        (request.depth_mm, request.width_mm)
                    } else {
                        (request.width_mm, request.depth_mm)
                    };
                    BoothPlacement {
                        id: request.id,
                        name: request.name.clone(),
                        x_mm: solution.value(vars.x).round() as i64,
                        y_mm: solution.value(vars.y).round() as i64,
                        width_mm,
                        depth_mm,
                        rotated: rotated as u8,
                    }
                })
                .collect();
            let placement = Placement { booths: placed };
            placement.verify(&scene, &requests)?;
            let objective_value = objective.eval_with(&solution);
            info!(
                target: "solve.driver",
                objective = objective_value,
                "solve_complete"
            );
            Ok(SolveOutcome {
                status: SolveStatus::Optimal,
                placement: Some(placement),
                objective: Some(objective_value),
            })
        }
        Err(ResolutionError::Infeasible) => {
            info!(target: "solve.driver", "infeasible");
            Ok(SolveOutcome {
                status: SolveStatus::Infeasible,
                placement: None,
                objective: None,
            })
        }
        Err(ResolutionError::Unbounded) => {
            warn!(target: "solve.driver", "unbounded_model");
            Ok(SolveOutcome {
                status: SolveStatus::ModelInvalid,
                placement: None,
                objective: None,
            })
        }
        Err(error) => {
            warn!(target: "solve.driver", %error, "solver_error");
            Ok(SolveOutcome {
                status: SolveStatus::Unknown,
                placement: None,
                objective: None,
            })
        }
    }
}
