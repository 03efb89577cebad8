//! Canonical scene description for the booth-layout pipeline.
//!
//! The compiler (`core-compile`) produces a [`SceneConfig`]; the solver
//! (`core-solve`) consumes it together with the booth requests parsed from
//! the booth table; the emitters (`core-emit`) turn the resulting
//! [`Placement`] into files. Everything is integer millimeters with the
//! origin at the hall's lower-left corner, +x right, +y up.
//!
//! The serialized form matches the configuration object consumed by the
//! rest of the toolchain: a `room` block, an `infrastructure` block, and
//! `requirements` / `weights` / `solver` blocks that all fall back to
//! documented defaults when absent.

use serde::{Deserialize, Serialize};

pub mod booths;
pub mod config;
pub mod geometry;
pub mod placement;

pub use booths::{BoothRequest, PreferredArea, TableError};
pub use config::ConfigError;
pub use geometry::Axis;
pub use placement::{BoothPlacement, Placement, PlacementError};

/// The hall rectangle and the two global spacing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hall {
    pub width_mm: i64,
    pub depth_mm: i64,
    /// Width of the wall-adjacent band used for "near a wall" classification.
    #[serde(default)]
    pub wall_band_mm: i64,
    /// Minimum gap between any two booths on any side.
    #[serde(default)]
    pub min_aisle_mm: i64,
}

/// An axis-aligned curtain-rail segment. `band_mm` is render-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurtainRail {
    pub p1: [i64; 2],
    pub p2: [i64; 2],
    #[serde(default = "default_band_mm")]
    pub band_mm: i64,
}

fn default_band_mm() -> i64 {
    1000
}

impl CurtainRail {
    pub fn axis(&self) -> Option<Axis> {
        geometry::classify(self.p1, self.p2)
    }
}

/// An axis-aligned inner-wall segment. Thickness is display-only;
/// `attachable` decides whether touching this wall counts as wall contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerWall {
    #[serde(default)]
    pub name: String,
    pub p1: [i64; 2],
    pub p2: [i64; 2],
    #[serde(default = "default_thickness_mm")]
    pub thickness_mm: i64,
    #[serde(default = "default_true")]
    pub attachable: bool,
}

fn default_thickness_mm() -> i64 {
    100
}

fn default_true() -> bool {
    true
}

impl InnerWall {
    pub fn axis(&self) -> Option<Axis> {
        geometry::classify(self.p1, self.p2)
    }
}

/// An axis-aligned rectangle `[xmin, ymin, xmax, ymax]` no booth may overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoGoZone {
    #[serde(default)]
    pub name: String,
    pub rect: [i64; 4],
}

impl NoGoZone {
    pub fn xmin(&self) -> i64 {
        self.rect[0]
    }
    pub fn ymin(&self) -> i64 {
        self.rect[1]
    }
    pub fn xmax(&self) -> i64 {
        self.rect[2]
    }
    pub fn ymax(&self) -> i64 {
        self.rect[3]
    }
}

/// Fixed infrastructure inside the hall.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Infrastructure {
    #[serde(default)]
    pub outlets: Vec<[i64; 2]>,
    #[serde(default)]
    pub curtain_rails: Vec<CurtainRail>,
    #[serde(default)]
    pub no_go_zones: Vec<NoGoZone>,
    #[serde(default)]
    pub inner_walls: Vec<InnerWall>,
}

/// Which booths must attach to a curtain rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurtainRailMode {
    IfWanted,
    All,
    None,
}

/// Hard versus soft enforcement of an optional constraint family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearanceMode {
    Hard,
    Soft,
}

/// Behavioral switches for the constraint builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Requirements {
    pub curtain_rail_mode: CurtainRailMode,
    pub wall_contact_prefer: bool,
    pub wall_contact_default_hard: bool,
    pub wall_contact_hard: bool,
    pub inner_walls_count_as_wall_contact: bool,
    pub enforce_outer_wall_band: bool,
    pub front_clear_mm: i64,
    pub front_clear_mode: ClearanceMode,
    pub outlet_demand_hard_radius_mm: i64,
    pub outlet_reserve_radius_mm: i64,
    pub preferred_area_default: ClearanceMode,
}

impl Default for Requirements {
    fn default() -> Self {
        Self {
            curtain_rail_mode: CurtainRailMode::IfWanted,
            wall_contact_prefer: true,
            wall_contact_default_hard: true,
            wall_contact_hard: false,
            inner_walls_count_as_wall_contact: true,
            enforce_outer_wall_band: false,
            front_clear_mm: 0,
            front_clear_mode: ClearanceMode::Hard,
            outlet_demand_hard_radius_mm: 0,
            outlet_reserve_radius_mm: 0,
            preferred_area_default: ClearanceMode::Soft,
        }
    }
}

impl Requirements {
    /// `wall_contact_hard` and `wall_contact_default_hard` trigger the same
    /// hard requirement; they stay separate fields for config compatibility
    /// and merge here.
    pub fn wall_contact_required(&self) -> bool {
        self.wall_contact_hard || self.wall_contact_default_hard
    }

    /// True when the hard front-clearance corridor is active.
    pub fn front_clearance_active(&self) -> bool {
        self.front_clear_mm > 0 && self.front_clear_mode == ClearanceMode::Hard
    }
}

/// Objective weights. Scaled by 100 into integers at model-build time so the
/// solver stays in integer arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub compactness: f64,
    pub wall_contact_bonus: f64,
    pub outlet_distance: f64,
    pub curtain_rail_match: f64,
    pub outlet_repel_non_wanter: f64,
    pub preferred_area_bonus: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            compactness: 3000.0,
            wall_contact_bonus: 500.0,
            outlet_distance: 1.0,
            curtain_rail_match: 1.0,
            outlet_repel_non_wanter: 0.0,
            preferred_area_bonus: 1000.0,
        }
    }
}

impl Weights {
    /// ×100, rounded once. All objective coefficients go through this.
    pub fn scaled(weight: f64) -> i64 {
        (weight * 100.0).round() as i64
    }
}

/// Solver invocation knobs from the configuration's `solver` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub max_time_in_seconds: f64,
    pub num_workers: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_time_in_seconds: 30.0,
            num_workers: 8,
        }
    }
}

/// The full configuration object: hall, infrastructure, and tuning blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(rename = "room")]
    pub hall: Hall,
    #[serde(default)]
    pub infrastructure: Infrastructure,
    #[serde(default)]
    pub requirements: Requirements,
    #[serde(default)]
    pub weights: Weights,
    #[serde(default)]
    pub solver: SolverSettings,
}

impl SceneConfig {
    /// A booth must attach to a rail under the current mode.
    pub fn rail_required(&self, booth: &BoothRequest) -> bool {
        match self.requirements.curtain_rail_mode {
            CurtainRailMode::All => true,
            CurtainRailMode::IfWanted => booth.want_curtain,
            CurtainRailMode::None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirements_defaults_match_contract() {
        let req = Requirements::default();
        assert_eq!(req.curtain_rail_mode, CurtainRailMode::IfWanted);
        assert!(req.wall_contact_prefer);
        assert!(req.wall_contact_default_hard);
        assert!(!req.wall_contact_hard);
        assert!(req.inner_walls_count_as_wall_contact);
        assert!(!req.enforce_outer_wall_band);
        assert_eq!(req.front_clear_mm, 0);
        assert_eq!(req.front_clear_mode, ClearanceMode::Hard);
        assert_eq!(req.preferred_area_default, ClearanceMode::Soft);
        assert!(req.wall_contact_required(), "default_hard implies required");
    }

    #[test]
    fn either_hard_flag_triggers_requirement() {
        let mut req = Requirements {
            wall_contact_default_hard: false,
            ..Requirements::default()
        };
        assert!(!req.wall_contact_required());
        req.wall_contact_hard = true;
        assert!(req.wall_contact_required());
    }

    #[test]
    fn weight_scaling_rounds_to_integer() {
        assert_eq!(Weights::scaled(1.0), 100);
        assert_eq!(Weights::scaled(0.004), 0);
        assert_eq!(Weights::scaled(0.006), 1);
        assert_eq!(Weights::scaled(3000.0), 300_000);
    }

    #[test]
    fn rail_required_follows_mode() {
        let mut scene: SceneConfig = serde_json::from_str(
            r#"{"room":{"width_mm":1000,"depth_mm":1000}}"#,
        )
        .unwrap();
        let wanter = BoothRequest {
            id: 1,
            name: "a".into(),
            width_mm: 10,
            depth_mm: 10,
            want_outlet: false,
            want_curtain: true,
            group: None,
            preferred: None,
        };
        let indifferent = BoothRequest {
            want_curtain: false,
            id: 2,
            ..wanter.clone()
        };

        scene.requirements.curtain_rail_mode = CurtainRailMode::IfWanted;
        assert!(scene.rail_required(&wanter));
        assert!(!scene.rail_required(&indifferent));

        scene.requirements.curtain_rail_mode = CurtainRailMode::All;
        assert!(scene.rail_required(&indifferent));

        scene.requirements.curtain_rail_mode = CurtainRailMode::None;
        assert!(!scene.rail_required(&wanter));
    }

    #[test]
    fn mode_tokens_round_trip() {
        for (token, mode) in [
            ("\"if_wanted\"", CurtainRailMode::IfWanted),
            ("\"all\"", CurtainRailMode::All),
            ("\"none\"", CurtainRailMode::None),
        ] {
            let parsed: CurtainRailMode = serde_json::from_str(token).unwrap();
            assert_eq!(parsed, mode);
            assert_eq!(serde_json::to_string(&mode).unwrap(), token);
        }
    }
}
