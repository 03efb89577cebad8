//! L1 outlet distances over doubled centers.
//!
//! `nearest2_i = min_k |cx2_i − 2·ox_k| + |cy2_i − 2·oy_k|`. The absolute
//! values decompose into two lower bounds on a nonnegative integer, and the
//! min aggregation uses one selector Boolean per outlet: `nearest2` is
//! bounded above by every distance and forced up to the selected one.

use good_lp::{constraint, Expression};

use core_scene::Weights;

use super::LayoutModel;

impl LayoutModel {
    pub(crate) fn add_outlet_terms(&mut self) {
        let outlets = self.scene.infrastructure.outlets.clone();
        if outlets.is_empty() {
            return;
        }
        let hall = self.scene.hall;
        let req = &self.scene.requirements;
        let demand_radius = req.outlet_demand_hard_radius_mm;
        let reserve_radius = req.outlet_reserve_radius_mm;
        let distance_weight = Weights::scaled(self.scene.weights.outlet_distance) as f64;
        let repel_weight = Weights::scaled(self.scene.weights.outlet_repel_non_wanter);
        let repel_active = reserve_radius > 0 && repel_weight > 0;

        for i in 0..self.booths.len() {
            let wants = self.requests[i].want_outlet;
            if !wants && !repel_active {
                continue;
            }

            let (cx2, cy2) = {
                let booth = &self.booths[i];
                (booth.cx2(), booth.cy2())
            };
            let mut distances: Vec<Expression> = Vec::with_capacity(outlets.len());
            for (k, outlet) in outlets.iter().enumerate() {
                let ox2 = 2.0 * outlet[0] as f64;
                let oy2 = 2.0 * outlet[1] as f64;
                let dx = self.int_var(
                    0.0,
                    2.0 * hall.width_mm as f64,
                    format!("odx_{i}_{k}"),
                );
                let dy = self.int_var(
                    0.0,
                    2.0 * hall.depth_mm as f64,
                    format!("ody_{i}_{k}"),
                );
                // dx ≥ ±(cx2 − 2·ox), dy likewise.
                self.require(constraint::geq(Expression::from(dx) - cx2.clone(), -ox2));
                self.require(constraint::geq(Expression::from(dx) + cx2.clone(), ox2));
                self.require(constraint::geq(Expression::from(dy) - cy2.clone(), -oy2));
                self.require(constraint::geq(Expression::from(dy) + cy2.clone(), oy2));
                distances.push(Expression::from(dx) + dy);
            }

            let bound = 2.0 * (hall.width_mm + hall.depth_mm) as f64;
            let nearest2 = self.int_var(0.0, bound, format!("nearest2_{i}"));
            let mut selectors = Vec::with_capacity(distances.len());
            for (k, distance) in distances.iter().enumerate() {
                self.require(constraint::leq(
                    Expression::from(nearest2) - distance.clone(),
                    0.0,
                ));
                let selected = self.binary(format!("nearest_sel_{i}_{k}"));
                self.implies_ge(selected, Expression::from(nearest2), distance.clone());
                selectors.push(selected);
            }
            self.require(constraint::eq(Self::sum(&selectors), 1.0));

            if wants {
                self.add_objective(-distance_weight * nearest2);
                if demand_radius > 0 {
                    self.require(constraint::leq(
                        Expression::from(nearest2),
                        2.0 * demand_radius as f64,
                    ));
                }
            } else {
                // Keep non-wanters out of the reserved ring around outlets.
                let near = self.binary(format!("outlet_near_{i}"));
                self.iff_le(
                    near,
                    Expression::from(nearest2),
                    2.0 * reserve_radius as f64,
                );
                self.add_objective(-(1000 * repel_weight) as f64 * near);
            }
        }
    }
}
