//! Containment, pairwise separation, forbidden zones, and inner-wall
//! non-crossing.

use good_lp::{constraint, Expression};

use core_scene::geometry::Axis;

use super::LayoutModel;

impl LayoutModel {
    /// `right_i ≤ W`, `top_i ≤ H` (origins are bounded by the variable
    /// domains).
    pub(crate) fn add_containment(&mut self) {
        let width = self.scene.hall.width_mm as f64;
        let depth = self.scene.hall.depth_mm as f64;
        for i in 0..self.booths.len() {
            let (right, top) = {
                let booth = &self.booths[i];
                (booth.right(), booth.top())
            };
            self.require(constraint::leq(right, width));
            self.require(constraint::leq(top, depth));
        }
    }

    /// For every unordered pair, one of the four aisle-separated side
    /// relations must hold.
    pub(crate) fn add_non_overlap(&mut self) {
        let aisle = self.scene.hall.min_aisle_mm as f64;
        for i in 0..self.booths.len() {
            for j in (i + 1)..self.booths.len() {
                let (xi, yi, right_i, top_i) = {
                    let booth = &self.booths[i];
                    (booth.x, booth.y, booth.right(), booth.top())
                };
                let (xj, yj, right_j, top_j) = {
                    let booth = &self.booths[j];
                    (booth.x, booth.y, booth.right(), booth.top())
                };
                let sides = [
                    self.binary(format!("sep_left_{i}_{j}")),
                    self.binary(format!("sep_right_{i}_{j}")),
                    self.binary(format!("sep_below_{i}_{j}")),
                    self.binary(format!("sep_above_{i}_{j}")),
                ];
                self.require(constraint::geq(Self::sum(&sides), 1.0));
                self.implies_le(sides[0], right_i + aisle, Expression::from(xj));
                self.implies_le(sides[1], right_j + aisle, Expression::from(xi));
                self.implies_le(sides[2], top_i + aisle, Expression::from(yj));
                self.implies_le(sides[3], top_j + aisle, Expression::from(yi));
            }
        }
    }

    /// Each booth lies fully outside each forbidden rectangle.
    pub(crate) fn add_no_go_zones(&mut self) {
        let zones: Vec<[i64; 4]> = self
            .scene
            .infrastructure
            .no_go_zones
            .iter()
            .map(|zone| zone.rect)
            .collect();
        for i in 0..self.booths.len() {
            for (k, rect) in zones.iter().enumerate() {
                let [xmin, ymin, xmax, ymax] = rect.map(|v| v as f64);
                let (x, y, right, top) = {
                    let booth = &self.booths[i];
                    (booth.x, booth.y, booth.right(), booth.top())
                };
                let sides = [
                    self.binary(format!("zone_left_{i}_{k}")),
                    self.binary(format!("zone_right_{i}_{k}")),
                    self.binary(format!("zone_below_{i}_{k}")),
                    self.binary(format!("zone_above_{i}_{k}")),
                ];
                self.require(constraint::geq(Self::sum(&sides), 1.0));
                self.implies_le(sides[0], right, Self::constant(xmin));
                self.implies_ge(sides[1], Expression::from(x), Self::constant(xmax));
                self.implies_le(sides[2], top, Self::constant(ymin));
                self.implies_ge(sides[3], Expression::from(y), Self::constant(ymax));
            }
        }
    }

    /// The booth rectangle must lie on one side of the line through each
    /// inner wall, or entirely outside the wall's span. Applies to every
    /// axis-aligned wall, attachable or not.
    pub(crate) fn add_inner_wall_crossing(&mut self) {
        let walls: Vec<Axis> = self
            .scene
            .infrastructure
            .inner_walls
            .iter()
            .filter_map(|wall| wall.axis())
            .collect();
        for i in 0..self.booths.len() {
            for (k, axis) in walls.iter().enumerate() {
                let (x, y, right, top) = {
                    let booth = &self.booths[i];
                    (booth.x, booth.y, booth.right(), booth.top())
                };
                let sides = [
                    self.binary(format!("iw_clear_a_{i}_{k}")),
                    self.binary(format!("iw_clear_b_{i}_{k}")),
                    self.binary(format!("iw_clear_c_{i}_{k}")),
                    self.binary(format!("iw_clear_d_{i}_{k}")),
                ];
                self.require(constraint::geq(Self::sum(&sides), 1.0));
                match *axis {
                    Axis::Vertical { x: x0, y0: ymin, y1: ymax } => {
                        self.implies_le(sides[0], right, Self::constant(x0 as f64));
                        self.implies_ge(
                            sides[1],
                            Expression::from(x),
                            Self::constant(x0 as f64),
                        );
                        self.implies_ge(
                            sides[2],
                            Expression::from(y),
                            Self::constant(ymax as f64),
                        );
                        self.implies_le(sides[3], top, Self::constant(ymin as f64));
                    }
                    Axis::Horizontal { y: y0, x0: xmin, x1: xmax } => {
                        self.implies_le(sides[0], top, Self::constant(y0 as f64));
                        self.implies_ge(
                            sides[1],
                            Expression::from(y),
                            Self::constant(y0 as f64),
                        );
                        self.implies_ge(
                            sides[2],
                            Expression::from(x),
                            Self::constant(xmax as f64),
                        );
                        self.implies_le(sides[3], right, Self::constant(xmin as f64));
                    }
                }
            }
        }
    }

    /// Hard or soft preferred-area containment per booth.
    pub(crate) fn add_preferred_areas(&mut self) {
        let default_hard =
            self.scene.requirements.preferred_area_default == core_scene::ClearanceMode::Hard;
        let bonus = core_scene::Weights::scaled(self.scene.weights.preferred_area_bonus) as f64;
        for i in 0..self.booths.len() {
            let Some(preferred) = self.requests[i].preferred.clone() else {
                continue;
            };
            let [xmin, ymin, xmax, ymax] = preferred.rect.map(|v| v as f64);
            let (x, y, right, top) = {
                let booth = &self.booths[i];
                (booth.x, booth.y, booth.right(), booth.top())
            };
            if preferred.hard.unwrap_or(default_hard) {
                self.require(constraint::geq(Expression::from(x), xmin));
                self.require(constraint::geq(Expression::from(y), ymin));
                self.require(constraint::leq(right, xmax));
                self.require(constraint::leq(top, ymax));
            } else {
                let inside = self.binary(format!("pref_{i}"));
                self.implies_ge(inside, Expression::from(x), Self::constant(xmin));
                self.implies_ge(inside, Expression::from(y), Self::constant(ymin));
                self.implies_le(inside, right, Self::constant(xmax));
                self.implies_le(inside, top, Self::constant(ymax));
                self.add_objective(bonus * inside);
            }
        }
    }
}
