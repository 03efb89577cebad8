//! Wall bands, wall touches, the wall-contact requirement/reward, and the
//! rotation heuristic.
//!
//! Bands are biconditional classifiers. Touch literals are sufficient-only:
//! a true literal implies edge coincidence, but coincident geometry never
//! forces the literal. Only the band indicators get the reverse direction.

use good_lp::{constraint, Expression};

use core_scene::geometry::Axis;
use core_scene::Weights;

use super::LayoutModel;

impl LayoutModel {
    /// `bl ⇔ x ≤ B`, `br ⇔ right ≥ W−B`, `bb ⇔ y ≤ B`, `bt ⇔ top ≥ H−B`,
    /// plus the optional outer-band membership requirement.
    pub(crate) fn add_wall_bands(&mut self) {
        let hall = self.scene.hall;
        let band = hall.wall_band_mm as f64;
        let enforce = self.scene.requirements.enforce_outer_wall_band;
        for i in 0..self.booths.len() {
            let (x, y, right, top, sides) = {
                let booth = &self.booths[i];
                (booth.x, booth.y, booth.right(), booth.top(), booth.band.all())
            };
            self.iff_le(sides[0], Expression::from(x), band);
            self.iff_ge(sides[1], right, hall.width_mm as f64 - band);
            self.iff_le(sides[2], Expression::from(y), band);
            self.iff_ge(sides[3], top, hall.depth_mm as f64 - band);
            if enforce {
                self.require(constraint::geq(Self::sum(&sides), 1.0));
            }
        }
    }

    /// Sufficient-only outer-wall touch literals: each implies coincidence
    /// with one hall edge; the reverse direction is intentionally absent.
    pub(crate) fn add_wall_touches(&mut self) {
        let hall = self.scene.hall;
        for i in 0..self.booths.len() {
            let (x, y, right, top, sides) = {
                let booth = &self.booths[i];
                (
                    booth.x,
                    booth.y,
                    booth.right(),
                    booth.top(),
                    booth.touch.all(),
                )
            };
            self.implies_le(sides[0], Expression::from(x), Self::constant(0.0));
            self.implies_ge(sides[1], right, Self::constant(hall.width_mm as f64));
            self.implies_le(sides[2], Expression::from(y), Self::constant(0.0));
            self.implies_ge(sides[3], top, Self::constant(hall.depth_mm as f64));
        }
    }

    /// Touch literals against attachable inner walls. A vertical wall can be
    /// touched from either side (`right = x0` or `x = x0`) with the booth's
    /// doubled center inside the doubled span; horizontal walls mirror this.
    pub(crate) fn add_inner_wall_touches(&mut self) {
        let walls: Vec<Axis> = self
            .scene
            .infrastructure
            .inner_walls
            .iter()
            .filter(|wall| wall.attachable)
            .filter_map(|wall| wall.axis())
            .collect();
        for i in 0..self.booths.len() {
            for (k, axis) in walls.iter().enumerate() {
                match *axis {
                    Axis::Vertical { x: x0, y0: ymin, y1: ymax } => {
                        let (x, right, cy2) = {
                            let booth = &self.booths[i];
                            (booth.x, booth.right(), booth.cy2())
                        };
                        let left_side = self.binary(format!("iwv_left_{i}_{k}"));
                        self.implies_eq(left_side, right, Self::constant(x0 as f64));
                        self.implies_ge(left_side, cy2.clone(), Self::constant(2.0 * ymin as f64));
                        self.implies_le(left_side, cy2.clone(), Self::constant(2.0 * ymax as f64));
                        let right_side = self.binary(format!("iwv_right_{i}_{k}"));
                        self.implies_eq(
                            right_side,
                            Expression::from(x),
                            Self::constant(x0 as f64),
                        );
                        self.implies_ge(right_side, cy2.clone(), Self::constant(2.0 * ymin as f64));
                        self.implies_le(right_side, cy2, Self::constant(2.0 * ymax as f64));
                        let booth = &mut self.booths[i];
                        booth.inner_touch_vertical.push(left_side);
                        booth.inner_touch_vertical.push(right_side);
                    }
                    Axis::Horizontal { y: y0, x0: xmin, x1: xmax } => {
                        let (y, top, cx2) = {
                            let booth = &self.booths[i];
                            (booth.y, booth.top(), booth.cx2())
                        };
                        let bottom_side = self.binary(format!("iwh_bottom_{i}_{k}"));
                        self.implies_eq(
                            bottom_side,
                            Expression::from(y),
                            Self::constant(y0 as f64),
                        );
                        self.implies_ge(bottom_side, cx2.clone(), Self::constant(2.0 * xmin as f64));
                        self.implies_le(bottom_side, cx2.clone(), Self::constant(2.0 * xmax as f64));
                        let top_side = self.binary(format!("iwh_top_{i}_{k}"));
                        self.implies_eq(top_side, top, Self::constant(y0 as f64));
                        self.implies_ge(top_side, cx2.clone(), Self::constant(2.0 * xmin as f64));
                        self.implies_le(top_side, cx2, Self::constant(2.0 * xmax as f64));
                        let booth = &mut self.booths[i];
                        booth.inner_touch_horizontal.push(bottom_side);
                        booth.inner_touch_horizontal.push(top_side);
                    }
                }
            }
        }
    }

    /// Hard wall contact for non-rail-required booths when configured, and
    /// the wall-contact bonus.
    pub(crate) fn add_wall_contact_terms(&mut self) {
        let req = &self.scene.requirements;
        let include_inner = req.inner_walls_count_as_wall_contact;
        let required = req.wall_contact_required();
        let prefer = req.wall_contact_prefer;
        let bonus = Weights::scaled(self.scene.weights.wall_contact_bonus) as f64;

        for i in 0..self.booths.len() {
            let (rail_required, lits) = {
                let booth = &self.booths[i];
                let mut lits = booth.touch.all().to_vec();
                if include_inner {
                    lits.extend(&booth.inner_touch_vertical);
                    lits.extend(&booth.inner_touch_horizontal);
                }
                (booth.rail_required, lits)
            };
            if rail_required {
                continue;
            }
            if required {
                self.require(constraint::geq(Self::sum(&lits), 1.0));
            }
            if prefer && bonus > 0.0 {
                let any = self.or_var(&lits, format!("wall_any_{i}"));
                self.add_objective(bonus * any);
            }
        }
    }

    /// Two-tier rotation forcing for booths not pinned by a rail: when
    /// exactly one axis of wall *touch* is active, the long edge aligns with
    /// that wall; otherwise the band indicators decide the same way. When
    /// both axes (or neither) are active at a tier, rotation stays free.
    pub(crate) fn add_rotation_heuristic(&mut self) {
        for i in 0..self.booths.len() {
            let (rail_required, rot, vertical_lits, horizontal_lits, band) = {
                let booth = &self.booths[i];
                let mut vertical = vec![booth.touch.left, booth.touch.right];
                vertical.extend(&booth.inner_touch_vertical);
                let mut horizontal = vec![booth.touch.bottom, booth.touch.top];
                horizontal.extend(&booth.inner_touch_horizontal);
                (
                    booth.rail_required,
                    booth.rot,
                    vertical,
                    horizontal,
                    booth.band.all(),
                )
            };
            if rail_required {
                continue;
            }
            let vt = self.or_var(&vertical_lits, format!("vtouch_{i}"));
            let ht = self.or_var(&horizontal_lits, format!("htouch_{i}"));
            let vb = self.or_var(&[band[0], band[1]], format!("vband_{i}"));
            let hb = self.or_var(&[band[2], band[3]], format!("hband_{i}"));

            // Touch tier: (vt ∧ ¬ht) ⇒ rot, (ht ∧ ¬vt) ⇒ ¬rot.
            self.require(constraint::geq(Expression::from(rot) - vt + ht, 0.0));
            self.require(constraint::leq(Expression::from(rot) + ht - vt, 1.0));
            // Band tier applies only when no touch literal fired at all.
            self.require(constraint::geq(
                Expression::from(rot) - vb + hb + vt + ht,
                0.0,
            ));
            self.require(constraint::leq(
                Expression::from(rot) + hb - vb - vt - ht,
                1.0,
            ));
        }
    }
}
