//! Solved placements and their post-solve invariants.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{BoothRequest, SceneConfig};

/// Final position of one booth: lower-left origin plus effective size after
/// rotation. `rotated = 1` means the natural width/depth were swapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoothPlacement {
    pub id: i64,
    pub name: String,
    pub x_mm: i64,
    pub y_mm: i64,
    pub width_mm: i64,
    pub depth_mm: i64,
    pub rotated: u8,
}

impl BoothPlacement {
    pub fn right(&self) -> i64 {
        self.x_mm + self.width_mm
    }

    pub fn top(&self) -> i64 {
        self.y_mm + self.depth_mm
    }
}

/// One placement per booth, in booth-table order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub booths: Vec<BoothPlacement>,
}

#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("booth {id}: placed outside the hall ({x},{y}) {w}x{h}")]
    OutOfBounds {
        id: i64,
        x: i64,
        y: i64,
        w: i64,
        h: i64,
    },
    #[error("booth {id}: effective size {w}x{h} does not match request under rotation {rotated}")]
    RotationMismatch {
        id: i64,
        w: i64,
        h: i64,
        rotated: u8,
    },
    #[error("booths {a} and {b}: aisle separation below {aisle} mm")]
    AisleViolation { a: i64, b: i64, aisle: i64 },
    #[error("booth {id}: overlaps forbidden zone `{zone}`")]
    ZoneOverlap { id: i64, zone: String },
    #[error("placement covers {got} booths, expected {expected}")]
    CountMismatch { got: usize, expected: usize },
}

impl Placement {
    /// Check the run invariants every emitted placement must satisfy:
    /// containment, rotation consistency with the request, pairwise aisle
    /// separation, and forbidden-zone exclusion. Violation means the solve
    /// result is unusable and nothing may be emitted.
    pub fn verify(
        &self,
        scene: &SceneConfig,
        requests: &[BoothRequest],
    ) -> Result<(), PlacementError> {
        if self.booths.len() != requests.len() {
            return Err(PlacementError::CountMismatch {
                got: self.booths.len(),
                expected: requests.len(),
            });
        }

        let hall = &scene.hall;
        for (placed, request) in self.booths.iter().zip(requests) {
            if placed.x_mm < 0
                || placed.y_mm < 0
                || placed.right() > hall.width_mm
                || placed.top() > hall.depth_mm
            {
                return Err(PlacementError::OutOfBounds {
                    id: placed.id,
                    x: placed.x_mm,
                    y: placed.y_mm,
                    w: placed.width_mm,
                    h: placed.depth_mm,
                });
            }

            let expected = if placed.rotated == 0 {
                (request.width_mm, request.depth_mm)
            } else {
                (request.depth_mm, request.width_mm)
            };
            if (placed.width_mm, placed.depth_mm) != expected {
                return Err(PlacementError::RotationMismatch {
                    id: placed.id,
                    w: placed.width_mm,
                    h: placed.depth_mm,
                    rotated: placed.rotated,
                });
            }

            for zone in &scene.infrastructure.no_go_zones {
                let disjoint = placed.right() <= zone.xmin()
                    || placed.x_mm >= zone.xmax()
                    || placed.top() <= zone.ymin()
                    || placed.y_mm >= zone.ymax();
                if !disjoint {
                    return Err(PlacementError::ZoneOverlap {
                        id: placed.id,
                        zone: zone.name.clone(),
                    });
                }
            }
        }

        let aisle = hall.min_aisle_mm;
        for (i, a) in self.booths.iter().enumerate() {
            for b in &self.booths[i + 1..] {
                let separated = a.right() + aisle <= b.x_mm
                    || b.right() + aisle <= a.x_mm
                    || a.top() + aisle <= b.y_mm
                    || b.top() + aisle <= a.y_mm;
                if !separated {
                    return Err(PlacementError::AisleViolation {
                        a: a.id,
                        b: b.id,
                        aisle,
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(width: i64, depth: i64, aisle: i64) -> SceneConfig {
        let mut scene: SceneConfig = serde_json::from_str(&format!(
            r#"{{"room":{{"width_mm":{width},"depth_mm":{depth},"min_aisle_mm":{aisle}}}}}"#
        ))
        .unwrap();
        scene.infrastructure.no_go_zones.push(crate::NoGoZone {
            name: "pillar".into(),
            rect: [4000, 0, 5000, 1000],
        });
        scene
    }

    fn request(id: i64, w: i64, h: i64) -> BoothRequest {
        BoothRequest {
            id,
            name: format!("b{id}"),
            width_mm: w,
            depth_mm: h,
            want_outlet: false,
            want_curtain: false,
            group: None,
            preferred: None,
        }
    }

    fn placed(id: i64, x: i64, y: i64, w: i64, h: i64, rotated: u8) -> BoothPlacement {
        BoothPlacement {
            id,
            name: format!("b{id}"),
            x_mm: x,
            y_mm: y,
            width_mm: w,
            depth_mm: h,
            rotated,
        }
    }

    #[test]
    fn accepts_a_valid_layout() {
        let scene = scene(10000, 6000, 1000);
        let requests = vec![request(1, 2000, 1500), request(2, 1500, 2000)];
        let placement = Placement {
            booths: vec![
                placed(1, 0, 0, 2000, 1500, 0),
                placed(2, 3000, 0, 2000, 1500, 1),
            ],
        };
        placement.verify(&scene, &requests).unwrap();
    }

    #[test]
    fn rejects_out_of_bounds() {
        let scene = scene(10000, 6000, 0);
        let requests = vec![request(1, 2000, 1500)];
        let placement = Placement {
            booths: vec![placed(1, 9000, 0, 2000, 1500, 0)],
        };
        assert!(matches!(
            placement.verify(&scene, &requests),
            Err(PlacementError::OutOfBounds { id: 1, .. })
        ));
    }

    #[test]
    fn rejects_rotation_mismatch() {
        let scene = scene(10000, 6000, 0);
        let requests = vec![request(1, 2000, 1500)];
        let placement = Placement {
            booths: vec![placed(1, 0, 0, 2000, 1500, 1)],
        };
        assert!(matches!(
            placement.verify(&scene, &requests),
            Err(PlacementError::RotationMismatch { id: 1, .. })
        ));
    }

    #[test]
    fn rejects_aisle_violation() {
        let scene = scene(10000, 6000, 1000);
        let requests = vec![request(1, 2000, 1500), request(2, 2000, 1500)];
        let placement = Placement {
            booths: vec![
                placed(1, 0, 0, 2000, 1500, 0),
                placed(2, 2500, 0, 2000, 1500, 0),
            ],
        };
        assert!(matches!(
            placement.verify(&scene, &requests),
            Err(PlacementError::AisleViolation { a: 1, b: 2, .. })
        ));
    }

    #[test]
    fn touching_booths_are_legal_with_zero_aisle() {
        let scene = scene(4000, 2000, 0);
        let requests = vec![request(1, 2000, 1500), request(2, 2000, 1500)];
        let placement = Placement {
            booths: vec![
                placed(1, 0, 0, 2000, 1500, 0),
                placed(2, 2000, 0, 2000, 1500, 0),
            ],
        };
        placement.verify(&scene, &requests).unwrap();
    }

    #[test]
    fn rejects_zone_overlap() {
        let scene = scene(10000, 6000, 0);
        let requests = vec![request(1, 2000, 1500)];
        let placement = Placement {
            booths: vec![placed(1, 3500, 0, 2000, 1500, 0)],
        };
        assert!(matches!(
            placement.verify(&scene, &requests),
            Err(PlacementError::ZoneOverlap { id: 1, .. })
        ));
    }
}
