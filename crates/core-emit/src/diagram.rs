//! Layout diagram rendering.
//!
//! One mm→px scale factor for the whole drawing; the y axis is inverted
//! back into screen coordinates. Booth labels are drawn twice, a fat white
//! halo under the black text, so names stay readable over the fill.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use tracing::info;

use core_scene::{Placement, SceneConfig};

use crate::EmitError;

/// Target drawing width in px; the scale derives from the hall width.
const TARGET_WIDTH_PX: f64 = 1200.0;
const MARGIN_PX: f64 = 24.0;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the scene and its placement as an SVG document.
pub fn render_diagram(scene: &SceneConfig, placement: &Placement) -> String {
    let hall = &scene.hall;
    let scale = TARGET_WIDTH_PX / hall.width_mm.max(1) as f64;
    let sx = |x: i64| MARGIN_PX + x as f64 * scale;
    let sy = |y: i64| MARGIN_PX + (hall.depth_mm - y) as f64 * scale;
    let canvas_w = hall.width_mm as f64 * scale + 2.0 * MARGIN_PX;
    let canvas_h = hall.depth_mm as f64 * scale + 2.0 * MARGIN_PX;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{canvas_w:.0}" height="{canvas_h:.0}" viewBox="0 0 {canvas_w:.0} {canvas_h:.0}">"##
    );

    // Hall outline.
    let _ = writeln!(
        svg,
        r##"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="white" stroke="black" stroke-width="2"/>"##,
        sx(0),
        sy(hall.depth_mm),
        hall.width_mm as f64 * scale,
        hall.depth_mm as f64 * scale,
    );

    // Forbidden zones as translucent red boxes.
    for zone in &scene.infrastructure.no_go_zones {
        let _ = writeln!(
            svg,
            r##"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="#ff0000" fill-opacity="0.25" stroke="#cc0000"/>"##,
            sx(zone.xmin()),
            sy(zone.ymax()),
            (zone.xmax() - zone.xmin()) as f64 * scale,
            (zone.ymax() - zone.ymin()) as f64 * scale,
        );
        if !zone.name.is_empty() {
            let _ = writeln!(
                svg,
                r##"  <text x="{:.1}" y="{:.1}" font-size="11" fill="#cc0000">{}</text>"##,
                sx(zone.xmin()) + 3.0,
                sy(zone.ymax()) + 13.0,
                escape(&zone.name),
            );
        }
    }

    // Inner walls: black lines with their labels.
    for wall in &scene.infrastructure.inner_walls {
        let _ = writeln!(
            svg,
            r##"  <line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="black" stroke-width="3"/>"##,
            sx(wall.p1[0]),
            sy(wall.p1[1]),
            sx(wall.p2[0]),
            sy(wall.p2[1]),
        );
        if !wall.name.is_empty() {
            let mid_x = (sx(wall.p1[0]) + sx(wall.p2[0])) / 2.0;
            let mid_y = (sy(wall.p1[1]) + sy(wall.p2[1])) / 2.0;
            let _ = writeln!(
                svg,
                r##"  <text x="{:.1}" y="{:.1}" font-size="11" fill="black">{}</text>"##,
                mid_x + 4.0,
                mid_y - 4.0,
                escape(&wall.name),
            );
        }
    }

    // Curtain rails: thick green lines labeled R1, R2, ...
    for (k, rail) in scene.infrastructure.curtain_rails.iter().enumerate() {
        let _ = writeln!(
            svg,
            r##"  <line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="#0a7a0a" stroke-width="6" stroke-linecap="round"/>"##,
            sx(rail.p1[0]),
            sy(rail.p1[1]),
            sx(rail.p2[0]),
            sy(rail.p2[1]),
        );
        let _ = writeln!(
            svg,
            r##"  <text x="{:.1}" y="{:.1}" font-size="12" fill="#0a7a0a">R{}</text>"##,
            sx(rail.p1[0]) + 4.0,
            sy(rail.p1[1]) - 6.0,
            k + 1,
        );
    }

    // Outlets: small socket glyphs, white rounded body with two red slots.
    for outlet in &scene.infrastructure.outlets {
        let cx = sx(outlet[0]);
        let cy = sy(outlet[1]);
        let _ = writeln!(
            svg,
            r##"  <rect x="{:.1}" y="{:.1}" width="16" height="12" rx="3" fill="white" stroke="#333333"/>"##,
            cx - 8.0,
            cy - 6.0,
        );
        for slot_dx in [-4.0, 2.0] {
            let _ = writeln!(
                svg,
                r##"  <rect x="{:.1}" y="{:.1}" width="2" height="6" fill="#cc0000"/>"##,
                cx + slot_dx,
                cy - 3.0,
            );
        }
    }

    // Booths: light blue boxes, name centered with a white halo under the
    // black text.
    for booth in &placement.booths {
        let _ = writeln!(
            svg,
            r##"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="#add8e6" stroke="#2a5d8a" stroke-width="1.5"/>"##,
            sx(booth.x_mm),
            sy(booth.top()),
            booth.width_mm as f64 * scale,
            booth.depth_mm as f64 * scale,
        );
        let label_x = sx(booth.x_mm) + booth.width_mm as f64 * scale / 2.0;
        let label_y = sy(booth.top()) + booth.depth_mm as f64 * scale / 2.0;
        let name = escape(&booth.name);
        let _ = writeln!(
            svg,
            r##"  <text x="{label_x:.1}" y="{label_y:.1}" font-size="12" text-anchor="middle" dominant-baseline="central" stroke="white" stroke-width="4" stroke-linejoin="round">{name}</text>"##
        );
        let _ = writeln!(
            svg,
            r##"  <text x="{label_x:.1}" y="{label_y:.1}" font-size="12" text-anchor="middle" dominant-baseline="central" fill="black">{name}</text>"##
        );
    }

    svg.push_str("</svg>\n");
    svg
}

/// Render and write the diagram file.
pub fn write_diagram(
    scene: &SceneConfig,
    placement: &Placement,
    path: &Path,
) -> Result<(), EmitError> {
    let svg = render_diagram(scene, placement);
    fs::write(path, svg).map_err(|source| EmitError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(target: "emit.diagram", path = %path.display(), "diagram_written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_scene::{BoothPlacement, CurtainRail, NoGoZone};

    fn scene() -> SceneConfig {
        let mut scene: SceneConfig =
            serde_json::from_str(r#"{"room":{"width_mm":10000,"depth_mm":6000}}"#).unwrap();
        scene.infrastructure.outlets.push([1000, 1000]);
        scene.infrastructure.curtain_rails.push(CurtainRail {
            p1: [0, 6000],
            p2: [10000, 6000],
            band_mm: 1000,
        });
        scene.infrastructure.no_go_zones.push(NoGoZone {
            name: "stage".into(),
            rect: [4000, 0, 6000, 2000],
        });
        scene
    }

    fn placement() -> Placement {
        Placement {
            booths: vec![BoothPlacement {
                id: 1,
                name: "A & B <Co>".into(),
                x_mm: 0,
                y_mm: 0,
                width_mm: 2000,
                depth_mm: 1500,
                rotated: 0,
            }],
        }
    }

    #[test]
    fn renders_every_scene_element() {
        let svg = render_diagram(&scene(), &placement());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r##"stroke="#0a7a0a""##), "rail line missing");
        assert!(svg.contains(">R1<"), "rail label missing");
        assert!(svg.contains(r#"fill-opacity="0.25""#), "zone missing");
        assert!(svg.contains("stage"), "zone label missing");
        assert!(svg.contains(r##"fill="#add8e6""##), "booth fill missing");
        // Halo + text: the escaped name appears exactly twice.
        let escaped = "A &amp; B &lt;Co&gt;";
        assert_eq!(svg.matches(escaped).count(), 2);
    }

    #[test]
    fn y_axis_is_inverted() {
        let svg = render_diagram(&scene(), &placement());
        // The booth sits at the hall's bottom edge, so its rect's top-left
        // corner lands at hall depth minus booth depth in screen space.
        let scale = TARGET_WIDTH_PX / 10000.0;
        let expected_y = MARGIN_PX + (6000.0 - 1500.0) * scale;
        assert!(svg.contains(&format!("y=\"{expected_y:.1}\"")));
    }

    #[test]
    fn writes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.svg");
        write_diagram(&scene(), &placement(), &path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("</svg>"));
    }
}
