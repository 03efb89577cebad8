//! Curtain-rail attachment indicators.
//!
//! A horizontal rail can carry a booth on its bottom or top edge (rotation
//! forced to 0 so the long edge runs along the rail); a vertical rail on its
//! left or right edge (rotation forced to 1). Rail-required booths pick
//! exactly one attachment across all rails; everyone else gets all
//! indicators forced false.

use good_lp::{constraint, Expression};

use core_scene::geometry::Axis;
use core_scene::Weights;

use super::{FrontDir, LayoutModel, RailAttachment};

impl LayoutModel {
    pub(crate) fn add_rail_attachments(&mut self) {
        let rails = self.rails.clone();
        let match_bonus = Weights::scaled(self.scene.weights.curtain_rail_match) as f64;

        for i in 0..self.booths.len() {
            for (k, axis) in rails.iter().enumerate() {
                match *axis {
                    Axis::Horizontal { y: y0, x0: xmin, x1: xmax } => {
                        let (x, y, rot, right, top) = {
                            let booth = &self.booths[i];
                            (booth.x, booth.y, booth.rot, booth.right(), booth.top())
                        };
                        // Booth sits above the rail, back edge on it.
                        let bottom = self.binary(format!("att_h_bottom_{i}_{k}"));
                        self.implies_eq(bottom, Expression::from(y), Self::constant(y0 as f64));
                        self.implies_ge(bottom, Expression::from(x), Self::constant(xmin as f64));
                        self.implies_le(bottom, right.clone(), Self::constant(xmax as f64));
                        self.require(constraint::leq(Expression::from(rot) + bottom, 1.0));
                        // Booth hangs below the rail.
                        let top_att = self.binary(format!("att_h_top_{i}_{k}"));
                        self.implies_eq(top_att, top, Self::constant(y0 as f64));
                        self.implies_ge(top_att, Expression::from(x), Self::constant(xmin as f64));
                        self.implies_le(top_att, right, Self::constant(xmax as f64));
                        self.require(constraint::leq(Expression::from(rot) + top_att, 1.0));

                        let booth = &mut self.booths[i];
                        booth.attachments.push(RailAttachment {
                            lit: bottom,
                            front: FrontDir::Up,
                        });
                        booth.attachments.push(RailAttachment {
                            lit: top_att,
                            front: FrontDir::Down,
                        });
                    }
                    Axis::Vertical { x: x0, y0: ymin, y1: ymax } => {
                        let (x, y, rot, right, top) = {
                            let booth = &self.booths[i];
                            (booth.x, booth.y, booth.rot, booth.right(), booth.top())
                        };
                        // Booth to the left of the rail, right edge on it.
                        let left = self.binary(format!("att_v_left_{i}_{k}"));
                        self.implies_eq(left, right, Self::constant(x0 as f64));
                        self.implies_ge(left, Expression::from(y), Self::constant(ymin as f64));
                        self.implies_le(left, top.clone(), Self::constant(ymax as f64));
                        self.require(constraint::geq(Expression::from(rot) - left, 0.0));
                        // Booth to the right of the rail.
                        let right_att = self.binary(format!("att_v_right_{i}_{k}"));
                        self.implies_eq(right_att, Expression::from(x), Self::constant(x0 as f64));
                        self.implies_ge(right_att, Expression::from(y), Self::constant(ymin as f64));
                        self.implies_le(right_att, top, Self::constant(ymax as f64));
                        self.require(constraint::geq(Expression::from(rot) - right_att, 0.0));

                        let booth = &mut self.booths[i];
                        booth.attachments.push(RailAttachment {
                            lit: left,
                            front: FrontDir::Left,
                        });
                        booth.attachments.push(RailAttachment {
                            lit: right_att,
                            front: FrontDir::Right,
                        });
                    }
                }
            }

            let (rail_required, lits): (bool, Vec<_>) = {
                let booth = &self.booths[i];
                (
                    booth.rail_required,
                    booth.attachments.iter().map(|att| att.lit).collect(),
                )
            };
            if lits.is_empty() {
                continue;
            }
            if rail_required {
                // Exactly one attachment face across all rails.
                self.require(constraint::eq(Self::sum(&lits), 1.0));
                if match_bonus > 0.0 {
                    for lit in &lits {
                        self.add_objective(match_bonus * *lit);
                    }
                }
            } else {
                self.require(constraint::eq(Self::sum(&lits), 0.0));
            }
        }
    }
}
