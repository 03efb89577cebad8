//! Compactness: penalize the bounding box of all booths.

use good_lp::{constraint, Expression};

use core_scene::Weights;

use super::LayoutModel;

impl LayoutModel {
    /// Aggregate bounds envelope every booth; the objective pays
    /// `W_compact · (bbox_w + bbox_h)`, which pins the four aggregate
    /// variables to the true extrema.
    pub(crate) fn add_compactness(&mut self) {
        let weight = Weights::scaled(self.scene.weights.compactness) as f64;
        if weight <= 0.0 || self.booths.is_empty() {
            return;
        }
        let hall_w = self.scene.hall.width_mm as f64;
        let hall_h = self.scene.hall.depth_mm as f64;
        let x_min = self.int_var(0.0, hall_w, "bbox_xmin".to_string());
        let x_max = self.int_var(0.0, hall_w, "bbox_xmax".to_string());
        let y_min = self.int_var(0.0, hall_h, "bbox_ymin".to_string());
        let y_max = self.int_var(0.0, hall_h, "bbox_ymax".to_string());

        for i in 0..self.booths.len() {
            let (x, y, right, top) = {
                let booth = &self.booths[i];
                (booth.x, booth.y, booth.right(), booth.top())
            };
            self.require(constraint::leq(Expression::from(x_min) - x, 0.0));
            self.require(constraint::geq(Expression::from(x_max) - right, 0.0));
            self.require(constraint::leq(Expression::from(y_min) - y, 0.0));
            self.require(constraint::geq(Expression::from(y_max) - top, 0.0));
        }

        self.add_objective(weight * x_min);
        self.add_objective(-weight * x_max);
        self.add_objective(weight * y_min);
        self.add_objective(-weight * y_max);
    }
}
