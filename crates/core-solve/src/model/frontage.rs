//! Front-clearance corridors.
//!
//! Every booth gets exactly one front direction. Rail-attached booths face
//! away from their attachment edge; free booths derive the direction from
//! rotation and the active wall/band sides, defaulting to right (rotated)
//! or up (unrotated) in the open floor. A corridor of the configured depth
//! in front of each booth must then be free of every other booth.

use good_lp::{constraint, Expression};

use super::{FrontDir, LayoutModel};

impl LayoutModel {
    pub(crate) fn add_front_clearance(&mut self) {
        if !self.scene.requirements.front_clearance_active() {
            return;
        }
        let clear = self.scene.requirements.front_clear_mm as f64;

        self.add_front_directions();
        self.add_corridors(clear);
    }

    fn add_front_directions(&mut self) {
        for i in 0..self.booths.len() {
            let fronts = [
                self.binary(format!("front_right_{i}")),
                self.binary(format!("front_left_{i}")),
                self.binary(format!("front_up_{i}")),
                self.binary(format!("front_down_{i}")),
            ];
            self.require(constraint::eq(Self::sum(&fronts), 1.0));

            let (rail_required, attachment_fronts, rot, touch, band) = {
                let booth = &self.booths[i];
                (
                    booth.rail_required,
                    booth
                        .attachments
                        .iter()
                        .map(|att| (att.lit, att.front))
                        .collect::<Vec<_>>(),
                    booth.rot,
                    booth.touch.all(),
                    booth.band.all(),
                )
            };

            if rail_required {
                // Outward normal of the attached rail face.
                for (lit, front) in attachment_fronts {
                    self.require(constraint::geq(
                        Expression::from(fronts[front as usize]) - lit,
                        0.0,
                    ));
                }
            } else {
                // Active wall/band side per direction (touch or band).
                let left = self.or_var(&[touch[0], band[0]], format!("side_left_{i}"));
                let right = self.or_var(&[touch[1], band[1]], format!("side_right_{i}"));
                let bottom = self.or_var(&[touch[2], band[2]], format!("side_bottom_{i}"));
                let top = self.or_var(&[touch[3], band[3]], format!("side_top_{i}"));

                // Exactly one active side, rotation agreeing: face away.
                // rot=1 against the left wall faces right, and mirrors.
                self.require(constraint::geq(
                    Expression::from(fronts[FrontDir::Right as usize]) - rot - left
                        + right
                        + bottom
                        + top,
                    -1.0,
                ));
                self.require(constraint::geq(
                    Expression::from(fronts[FrontDir::Left as usize]) - rot - right
                        + left
                        + bottom
                        + top,
                    -1.0,
                ));
                self.require(constraint::geq(
                    Expression::from(fronts[FrontDir::Up as usize]) + rot - bottom
                        + left
                        + right
                        + top,
                    0.0,
                ));
                self.require(constraint::geq(
                    Expression::from(fronts[FrontDir::Down as usize]) + rot - top
                        + left
                        + right
                        + bottom,
                    0.0,
                ));
                // Open floor: right when rotated, up otherwise.
                self.require(constraint::geq(
                    Expression::from(fronts[FrontDir::Right as usize]) - rot
                        + left
                        + right
                        + bottom
                        + top,
                    0.0,
                ));
                self.require(constraint::geq(
                    Expression::from(fronts[FrontDir::Up as usize]) + rot
                        + left
                        + right
                        + bottom
                        + top,
                    1.0,
                ));
            }

            self.booths[i].front = Some(fronts);
        }
    }

    /// For each oriented booth and every other booth, the neighbor stays
    /// behind the front edge, beyond the corridor depth, or laterally clear.
    fn add_corridors(&mut self, clear: f64) {
        for i in 0..self.booths.len() {
            for j in 0..self.booths.len() {
                if i == j {
                    continue;
                }
                let Some(fronts) = self.booths[i].front else {
                    continue;
                };
                let (xi, yi, right_i, top_i) = {
                    let booth = &self.booths[i];
                    (booth.x, booth.y, booth.right(), booth.top())
                };
                let (xj, yj, right_j, top_j) = {
                    let booth = &self.booths[j];
                    (booth.x, booth.y, booth.right(), booth.top())
                };

                for dir in [FrontDir::Right, FrontDir::Left, FrontDir::Up, FrontDir::Down] {
                    let guard = fronts[dir as usize];
                    let tag = match dir {
                        FrontDir::Right => "r",
                        FrontDir::Left => "l",
                        FrontDir::Up => "u",
                        FrontDir::Down => "d",
                    };
                    let escapes = [
                        self.binary(format!("clear_{tag}_behind_{i}_{j}")),
                        self.binary(format!("clear_{tag}_beyond_{i}_{j}")),
                        self.binary(format!("clear_{tag}_side_a_{i}_{j}")),
                        self.binary(format!("clear_{tag}_side_b_{i}_{j}")),
                    ];
                    // When this direction is the front, one escape must hold.
                    self.require(constraint::geq(Self::sum(&escapes) - guard, 0.0));
                    match dir {
                        FrontDir::Right => {
                            self.implies_le(escapes[0], right_j.clone(), right_i.clone());
                            self.implies_ge(
                                escapes[1],
                                Expression::from(xj),
                                right_i.clone() + clear,
                            );
                            self.implies_le(escapes[2], top_j.clone(), Expression::from(yi));
                            self.implies_ge(escapes[3], Expression::from(yj), top_i.clone());
                        }
                        FrontDir::Left => {
                            self.implies_ge(
                                escapes[0],
                                Expression::from(xj),
                                Expression::from(xi),
                            );
                            self.implies_le(
                                escapes[1],
                                right_j.clone(),
                                Expression::from(xi) - clear,
                            );
                            self.implies_le(escapes[2], top_j.clone(), Expression::from(yi));
                            self.implies_ge(escapes[3], Expression::from(yj), top_i.clone());
                        }
                        FrontDir::Up => {
                            self.implies_le(escapes[0], top_j.clone(), top_i.clone());
                            self.implies_ge(
                                escapes[1],
                                Expression::from(yj),
                                top_i.clone() + clear,
                            );
                            self.implies_le(escapes[2], right_j.clone(), Expression::from(xi));
                            self.implies_ge(escapes[3], Expression::from(xj), right_i.clone());
                        }
                        FrontDir::Down => {
                            self.implies_ge(
                                escapes[0],
                                Expression::from(yj),
                                Expression::from(yi),
                            );
                            self.implies_le(
                                escapes[1],
                                top_j.clone(),
                                Expression::from(yi) - clear,
                            );
                            self.implies_le(escapes[2], right_j.clone(), Expression::from(xi));
                            self.implies_ge(escapes[3], Expression::from(xj), right_i.clone());
                        }
                    }
                }
            }
        }
    }
}
