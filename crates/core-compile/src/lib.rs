//! Scene compiler: annotated SVG drawing → canonical configuration.
//!
//! The drawing carries the hall rectangle plus styled primitives for
//! outlets, curtain rails, inner walls, and forbidden zones; shapes are
//! classified by class/id tokens (on the shape or an ancestor group) with a
//! color→class table as fallback. The y axis is flipped so the hall origin
//! is its lower-left corner, and every millimeter dimension is multiplied by
//! one fixed scale so the compiled configuration lives in the same domain as
//! the booth table.

use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::Document;
use thiserror::Error;
use tracing::{info, warn};

use core_scene::{CurtainRailMode, SceneConfig};

pub mod color;
mod extract;

pub use color::{Channel, ColorTable, TagColors};

/// Exact numerator/denominator of the dimensional scale (≈ 3.5275). The
/// booth table already lives in the scaled domain, so this ratio must not
/// drift.
pub const SCALE_NUM: i64 = 2_108_407;
pub const SCALE_DEN: i64 = 597_700;

/// Apply the uniform dimensional scale to one millimeter value.
pub fn scale_mm(value: i64) -> i64 {
    ((value as f64 * SCALE_NUM as f64) / SCALE_DEN as f64).round() as i64
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to read `{path}`")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse SVG: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("drawing has no hall: no element with id `room` and no rect with a room-mapped color")]
    MissingHall,
    #[error("element <{tag}>: attribute `{attr}` is not a length: `{value}`")]
    BadLength {
        tag: String,
        attr: &'static str,
        value: String,
    },
    #[error("no SVG drawing found in `{dir}`")]
    NoSvgFound { dir: String },
}

/// Compiler inputs besides the drawing itself.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub wall_band_mm: i64,
    pub aisle_mm: i64,
    pub colors: ColorTable,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            wall_band_mm: 500,
            aisle_mm: 1000,
            colors: ColorTable::builtin(),
        }
    }
}

/// Compile an SVG string into the canonical scene.
pub fn compile_str(svg: &str, options: &CompileOptions) -> Result<SceneConfig, CompileError> {
    let doc = Document::parse(svg)?;
    let mut scene = extract::extract_scene(&doc, options)?;

    if scene.infrastructure.curtain_rails.is_empty()
        && scene.requirements.curtain_rail_mode != CurtainRailMode::None
    {
        // Pre-empt the rail-required-with-no-rails contradiction.
        warn!(target: "compile", "no_rails_demoting_curtain_mode");
        scene.requirements.curtain_rail_mode = CurtainRailMode::None;
    }

    scale_scene(&mut scene);
    info!(
        target: "compile",
        hall_w = scene.hall.width_mm,
        hall_h = scene.hall.depth_mm,
        outlets = scene.infrastructure.outlets.len(),
        rails = scene.infrastructure.curtain_rails.len(),
        inner_walls = scene.infrastructure.inner_walls.len(),
        no_go_zones = scene.infrastructure.no_go_zones.len(),
        "scene_compiled"
    );
    Ok(scene)
}

/// Compile an SVG file.
pub fn compile_file(path: &Path, options: &CompileOptions) -> Result<SceneConfig, CompileError> {
    let svg = fs::read_to_string(path).map_err(|source| CompileError::Read {
        path: path.display().to_string(),
        source,
    })?;
    compile_str(&svg, options)
}

/// Pick a drawing when none was named: `hall.svg`, else the
/// lexicographically first `*.svg` containing `hall`, else the most
/// recently modified `*.svg`.
pub fn discover_svg(dir: &Path) -> Result<PathBuf, CompileError> {
    let preferred = dir.join("hall.svg");
    if preferred.exists() {
        return Ok(preferred);
    }

    let mut svgs: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|source| CompileError::Read {
            path: dir.display().to_string(),
            source,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("svg"))
                .unwrap_or(false)
        })
        .collect();
    if svgs.is_empty() {
        return Err(CompileError::NoSvgFound {
            dir: dir.display().to_string(),
        });
    }

    svgs.sort();
    if let Some(hallish) = svgs.iter().find(|path| {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_ascii_lowercase().contains("hall"))
            .unwrap_or(false)
    }) {
        return Ok(hallish.clone());
    }

    svgs.sort_by_key(|path| {
        std::cmp::Reverse(
            fs::metadata(path)
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH),
        )
    });
    Ok(svgs.remove(0))
}

/// Load a user color table and merge it over the built-in default.
pub fn load_color_table(path: &Path) -> Result<ColorTable, CompileError> {
    let text = fs::read_to_string(path).map_err(|source| CompileError::Read {
        path: path.display().to_string(),
        source,
    })?;
    match serde_json::from_str::<ColorTable>(&text) {
        Ok(user) => {
            let mut table = ColorTable::builtin();
            table.merge(user);
            Ok(table)
        }
        Err(error) => {
            warn!(target: "compile", %error, path = %path.display(), "color_table_unreadable_using_builtin");
            Ok(ColorTable::builtin())
        }
    }
}

/// Multiply every millimeter dimension by the fixed scale. Weights and
/// booleans are untouched; only the mm-valued requirement fields scale.
fn scale_scene(scene: &mut SceneConfig) {
    let hall = &mut scene.hall;
    hall.width_mm = scale_mm(hall.width_mm);
    hall.depth_mm = scale_mm(hall.depth_mm);
    hall.wall_band_mm = scale_mm(hall.wall_band_mm);
    hall.min_aisle_mm = scale_mm(hall.min_aisle_mm);

    let infra = &mut scene.infrastructure;
    for outlet in &mut infra.outlets {
        outlet[0] = scale_mm(outlet[0]);
        outlet[1] = scale_mm(outlet[1]);
    }
    for rail in &mut infra.curtain_rails {
        rail.p1 = [scale_mm(rail.p1[0]), scale_mm(rail.p1[1])];
        rail.p2 = [scale_mm(rail.p2[0]), scale_mm(rail.p2[1])];
        rail.band_mm = scale_mm(rail.band_mm);
    }
    for wall in &mut infra.inner_walls {
        wall.p1 = [scale_mm(wall.p1[0]), scale_mm(wall.p1[1])];
        wall.p2 = [scale_mm(wall.p2[0]), scale_mm(wall.p2[1])];
        wall.thickness_mm = scale_mm(wall.thickness_mm);
    }
    for zone in &mut infra.no_go_zones {
        zone.rect = [
            scale_mm(zone.rect[0]),
            scale_mm(zone.rect[1]),
            scale_mm(zone.rect[2]),
            scale_mm(zone.rect[3]),
        ];
    }

    let req = &mut scene.requirements;
    req.front_clear_mm = scale_mm(req.front_clear_mm);
    req.outlet_demand_hard_radius_mm = scale_mm(req.outlet_demand_hard_radius_mm);
    req.outlet_reserve_radius_mm = scale_mm(req.outlet_reserve_radius_mm);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_constant_is_exact() {
        assert_eq!(scale_mm(0), 0);
        assert_eq!(scale_mm(597_700), 2_108_407);
        assert_eq!(scale_mm(10_000), 35_275);
        assert_eq!(scale_mm(1_000), 3_528);
    }

    #[test]
    fn discovery_prefers_hall_svg() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("zoo.svg"), "<svg/>").unwrap();
        fs::write(dir.path().join("hall.svg"), "<svg/>").unwrap();
        assert_eq!(
            discover_svg(dir.path()).unwrap(),
            dir.path().join("hall.svg")
        );
    }

    #[test]
    fn discovery_falls_back_to_hallish_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("zoo.svg"), "<svg/>").unwrap();
        fs::write(dir.path().join("main-hall-2026.svg"), "<svg/>").unwrap();
        assert_eq!(
            discover_svg(dir.path()).unwrap(),
            dir.path().join("main-hall-2026.svg")
        );
    }

    #[test]
    fn discovery_errors_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            discover_svg(dir.path()),
            Err(CompileError::NoSvgFound { .. })
        ));
    }
}
