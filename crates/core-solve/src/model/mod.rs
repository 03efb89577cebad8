//! The layout model: decision variables, reified geometric constraints, and
//! the weighted objective.
//!
//! Construction order is part of the contract: the backend's search is
//! sensitive to variable and constraint insertion order, so every family is
//! added booth-major in a fixed sequence. All reified forms go through the
//! big-M helpers below; biconditionals use the integer complement
//! (`¬(e ≤ c)` ⇔ `e ≥ c + 1`), which is exact because every quantity in the
//! model is an integer number of millimeters.

mod frontage;
mod geometry;
mod objective;
mod outlets;
mod rails;
mod walls;

use good_lp::constraint;
use good_lp::{variable, Constraint, Expression, ProblemVariables, Variable};
use tracing::{debug, warn};

use core_scene::geometry::Axis;
use core_scene::{BoothRequest, SceneConfig};

use crate::SolveError;

/// Outward normal of a booth face; also the booth's front direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrontDir {
    Right = 0,
    Left = 1,
    Up = 2,
    Down = 3,
}

/// One rail-attachment indicator and the front direction it implies.
pub(crate) struct RailAttachment {
    pub lit: Variable,
    pub front: FrontDir,
}

/// Band or touch indicators for the four outer walls.
pub(crate) struct SideSet {
    pub left: Variable,
    pub right: Variable,
    pub bottom: Variable,
    pub top: Variable,
}

impl SideSet {
    pub fn all(&self) -> [Variable; 4] {
        [self.left, self.right, self.bottom, self.top]
    }
}

/// Per-booth decision variables and derived affine expressions.
pub(crate) struct BoothVars {
    pub x: Variable,
    pub y: Variable,
    pub rot: Variable,
    /// Natural (unrotated) size.
    pub width: i64,
    pub depth: i64,
    pub rail_required: bool,
    pub band: SideSet,
    pub touch: SideSet,
    /// Touch literals against attachable inner walls, split by wall axis.
    pub inner_touch_vertical: Vec<Variable>,
    pub inner_touch_horizontal: Vec<Variable>,
    pub attachments: Vec<RailAttachment>,
    /// Front-direction indicators, indexed by `FrontDir`, when the
    /// front-clearance corridor is active.
    pub front: Option<[Variable; 4]>,
}

impl BoothVars {
    /// `w_eff = w + r·(h − w)`
    pub fn w_eff(&self) -> Expression {
        (self.depth - self.width) as f64 * self.rot + self.width as f64
    }

    /// `h_eff = h + r·(w − h)`
    pub fn h_eff(&self) -> Expression {
        (self.width - self.depth) as f64 * self.rot + self.depth as f64
    }

    pub fn right(&self) -> Expression {
        self.w_eff() + self.x
    }

    pub fn top(&self) -> Expression {
        self.h_eff() + self.y
    }

    /// Doubled center abscissa `2x + w_eff`; doubling keeps L1 center
    /// distances integral.
    pub fn cx2(&self) -> Expression {
        self.w_eff() + 2.0 * self.x
    }

    pub fn cy2(&self) -> Expression {
        self.h_eff() + 2.0 * self.y
    }
}

pub struct LayoutModel {
    pub(crate) vars: ProblemVariables,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) objective: Expression,
    pub(crate) big_m: f64,
    pub(crate) booths: Vec<BoothVars>,
    pub(crate) rails: Vec<Axis>,
    pub(crate) requests: Vec<BoothRequest>,
    pub(crate) scene: SceneConfig,
}

impl LayoutModel {
    /// Transcribe the scene and booth requests into a solvable model.
    pub fn build(scene: &SceneConfig, requests: &[BoothRequest]) -> Result<Self, SolveError> {
        for request in requests {
            if request.width_mm <= 0 || request.depth_mm <= 0 {
                return Err(SolveError::BadBoothSize {
                    id: request.id,
                    width: request.width_mm,
                    depth: request.depth_mm,
                });
            }
        }

        let rails: Vec<Axis> = scene
            .infrastructure
            .curtain_rails
            .iter()
            .enumerate()
            .filter_map(|(index, rail)| {
                let axis = rail.axis();
                if axis.is_none() {
                    warn!(target: "solve.model", index, "diagonal_rail_skipped");
                }
                axis
            })
            .collect();

        if rails.is_empty() {
            if let Some(request) = requests.iter().find(|r| scene.rail_required(r)) {
                return Err(SolveError::NoRailsDefined { id: request.id });
            }
        }

        let hall = &scene.hall;
        let req = &scene.requirements;
        let radius_reach = 2 * req
            .outlet_demand_hard_radius_mm
            .max(req.outlet_reserve_radius_mm);
        let big_m = (2 * (hall.width_mm + hall.depth_mm)
            + hall.min_aisle_mm
            + req.front_clear_mm
            + radius_reach
            + 1) as f64;

        let mut model = Self {
            vars: ProblemVariables::new(),
            constraints: Vec::new(),
            objective: Expression::default(),
            big_m,
            booths: Vec::new(),
            rails,
            requests: requests.to_vec(),
            scene: scene.clone(),
        };

        model.add_booth_vars();
        model.add_containment();
        model.add_non_overlap();
        model.add_wall_bands();
        model.add_wall_touches();
        model.add_inner_wall_touches();
        model.add_inner_wall_crossing();
        model.add_no_go_zones();
        model.add_preferred_areas();
        model.add_rail_attachments();
        model.add_wall_contact_terms();
        model.add_rotation_heuristic();
        model.add_outlet_terms();
        model.add_front_clearance();
        model.add_compactness();

        debug!(
            target: "solve.model",
            booths = model.booths.len(),
            constraints = model.constraints.len(),
            big_m = model.big_m,
            "model_built"
        );
        Ok(model)
    }

    fn add_booth_vars(&mut self) {
        let width = self.scene.hall.width_mm as f64;
        let depth = self.scene.hall.depth_mm as f64;
        for (i, request) in self.requests.iter().enumerate() {
            let x = self.vars.add(
                variable()
                    .integer()
                    .min(0.0)
                    .max(width)
                    .name(format!("x_{i}")),
            );
            let y = self.vars.add(
                variable()
                    .integer()
                    .min(0.0)
                    .max(depth)
                    .name(format!("y_{i}")),
            );
            let rot = self.vars.add(variable().binary().name(format!("rot_{i}")));
            let band = SideSet {
                left: self.vars.add(variable().binary().name(format!("band_l_{i}"))),
                right: self.vars.add(variable().binary().name(format!("band_r_{i}"))),
                bottom: self.vars.add(variable().binary().name(format!("band_b_{i}"))),
                top: self.vars.add(variable().binary().name(format!("band_t_{i}"))),
            };
            let touch = SideSet {
                left: self.vars.add(variable().binary().name(format!("touch_l_{i}"))),
                right: self.vars.add(variable().binary().name(format!("touch_r_{i}"))),
                bottom: self.vars.add(variable().binary().name(format!("touch_b_{i}"))),
                top: self.vars.add(variable().binary().name(format!("touch_t_{i}"))),
            };
            self.booths.push(BoothVars {
                x,
                y,
                rot,
                width: request.width_mm,
                depth: request.depth_mm,
                rail_required: self.scene.rail_required(request),
                band,
                touch,
                inner_touch_vertical: Vec::new(),
                inner_touch_horizontal: Vec::new(),
                attachments: Vec::new(),
                front: None,
            });
        }
    }

    // ---- variable and reification helpers ----

    pub(crate) fn binary(&mut self, name: String) -> Variable {
        self.vars.add(variable().binary().name(name))
    }

    pub(crate) fn int_var(&mut self, min: f64, max: f64, name: String) -> Variable {
        self.vars
            .add(variable().integer().min(min).max(max).name(name))
    }

    pub(crate) fn require(&mut self, c: Constraint) {
        self.constraints.push(c);
    }

    pub(crate) fn add_objective(&mut self, term: Expression) {
        let objective = std::mem::take(&mut self.objective);
        self.objective = objective + term;
    }

    /// A constant as an `Expression`, for the helpers that want one.
    pub(crate) fn constant(value: f64) -> Expression {
        Expression::default() + value
    }

    /// `guard ⇒ small ≤ large`
    pub(crate) fn implies_le(&mut self, guard: Variable, small: Expression, large: Expression) {
        let m = self.big_m;
        self.require(constraint::leq(small - large + m * guard, m));
    }

    /// `guard ⇒ large ≥ small`
    pub(crate) fn implies_ge(&mut self, guard: Variable, large: Expression, small: Expression) {
        let m = self.big_m;
        self.require(constraint::geq(large - small - m * guard, -m));
    }

    /// `guard ⇒ a = b`
    pub(crate) fn implies_eq(&mut self, guard: Variable, a: Expression, b: Expression) {
        self.implies_le(guard, a.clone(), b.clone());
        self.implies_ge(guard, a, b);
    }

    /// `lit ⇔ expr ≤ bound` for an integer-valued `expr`.
    pub(crate) fn iff_le(&mut self, lit: Variable, expr: Expression, bound: f64) {
        let m = self.big_m;
        self.require(constraint::leq(expr.clone() + m * lit, bound + m));
        self.require(constraint::geq(expr + m * lit, bound + 1.0));
    }

    /// `lit ⇔ expr ≥ bound` for an integer-valued `expr`.
    pub(crate) fn iff_ge(&mut self, lit: Variable, expr: Expression, bound: f64) {
        let m = self.big_m;
        self.require(constraint::geq(expr.clone() - m * lit, bound - m));
        self.require(constraint::leq(expr - m * lit, bound - 1.0));
    }

    /// Fresh Boolean equal to the disjunction of `lits`.
    pub(crate) fn or_var(&mut self, lits: &[Variable], name: String) -> Variable {
        let var = self.binary(name);
        let mut sum = Expression::default();
        for lit in lits {
            self.require(constraint::geq(Expression::from(var) - *lit, 0.0));
            sum = sum + *lit;
        }
        self.require(constraint::leq(Expression::from(var) - sum, 0.0));
        var
    }

    pub(crate) fn sum(lits: &[Variable]) -> Expression {
        let mut total = Expression::default();
        for lit in lits {
            total = total + *lit;
        }
        total
    }
}
