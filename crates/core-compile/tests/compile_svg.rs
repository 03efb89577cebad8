//! End-to-end compiler checks on a small but fully annotated drawing.

use core_compile::{compile_str, scale_mm, CompileError, CompileOptions};
use core_scene::CurtainRailMode;
use pretty_assertions::assert_eq;

const HALL_SVG: &str = r##"
<svg xmlns="http://www.w3.org/2000/svg" width="1000" height="600">
  <rect id="room" x="0" y="0" width="1000" height="600" fill="none" stroke="#000000"/>
  <circle cx="100" cy="100" r="5" fill="#ff00ff"/>
  <rect class="outlet" x="880" y="80" width="40" height="40"/>
  <line x1="0" y1="0" x2="1000" y2="0" stroke="#0a7a0a" data-band-mm="80"/>
  <path d="M 1000,100 L 1000,500" style="stroke: rgb(10,122,10)"/>
  <line x1="0" y1="0" x2="300" y2="300" stroke="#0a7a0a"/>
  <line class="inner-wall" x1="400" y1="600" x2="400" y2="350"
        data-name="w1" data-thickness-mm="50" data-attachable="no"/>
  <rect x="700" y="500" width="200" height="100" fill="#ffa500" data-name="storage"/>
  <g id="no-go-zones">
    <polygon points="10,580 60,580 60,540 10,540"/>
  </g>
</svg>
"##;

#[test]
fn compiles_the_full_scene() {
    let scene = compile_str(HALL_SVG, &CompileOptions::default()).unwrap();

    assert_eq!(scene.hall.width_mm, scale_mm(1000));
    assert_eq!(scene.hall.depth_mm, scale_mm(600));
    assert_eq!(scene.hall.wall_band_mm, scale_mm(500));
    assert_eq!(scene.hall.min_aisle_mm, scale_mm(1000));

    // Outlet centers, y flipped about the hall height.
    assert_eq!(
        scene.infrastructure.outlets,
        vec![
            [scale_mm(100), scale_mm(500)],
            [scale_mm(900), scale_mm(500)],
        ]
    );

    // The diagonal rail is dropped; the line and the path survive.
    let rails = &scene.infrastructure.curtain_rails;
    assert_eq!(rails.len(), 2);
    assert_eq!(rails[0].p1, [0, scale_mm(600)]);
    assert_eq!(rails[0].p2, [scale_mm(1000), scale_mm(600)]);
    assert_eq!(rails[0].band_mm, scale_mm(80));
    assert_eq!(rails[1].p1, [scale_mm(1000), scale_mm(500)]);
    assert_eq!(rails[1].p2, [scale_mm(1000), scale_mm(100)]);
    assert_eq!(rails[1].band_mm, scale_mm(1000));

    let walls = &scene.infrastructure.inner_walls;
    assert_eq!(walls.len(), 1);
    assert_eq!(walls[0].name, "w1");
    assert_eq!(walls[0].p1, [scale_mm(400), 0]);
    assert_eq!(walls[0].p2, [scale_mm(400), scale_mm(250)]);
    assert_eq!(walls[0].thickness_mm, scale_mm(50));
    assert!(!walls[0].attachable);

    let zones = &scene.infrastructure.no_go_zones;
    assert_eq!(zones.len(), 2);
    assert_eq!(zones[0].name, "storage");
    assert_eq!(
        zones[0].rect,
        [scale_mm(700), 0, scale_mm(900), scale_mm(100)]
    );
    // Polygon under the no-go-zones layer, bounding box flipped.
    assert_eq!(
        zones[1].rect,
        [scale_mm(10), scale_mm(20), scale_mm(60), scale_mm(60)]
    );

    // Rails exist, so the default curtain mode survives.
    assert_eq!(
        scene.requirements.curtain_rail_mode,
        CurtainRailMode::IfWanted
    );
    // Weights are never scaled.
    assert_eq!(scene.weights.compactness, 3000.0);
    // The mm-valued requirement defaults are zero and stay zero.
    assert_eq!(scene.requirements.front_clear_mm, 0);
}

#[test]
fn demotes_curtain_mode_when_no_rails() {
    let svg = r#"<svg width="500" height="400">
        <rect id="room" width="500" height="400"/>
    </svg>"#;
    let scene = compile_str(svg, &CompileOptions::default()).unwrap();
    assert_eq!(scene.requirements.curtain_rail_mode, CurtainRailMode::None);
}

#[test]
fn missing_hall_is_fatal() {
    let svg = r#"<svg width="500" height="400"><circle cx="1" cy="1" r="1"/></svg>"#;
    assert!(matches!(
        compile_str(svg, &CompileOptions::default()),
        Err(CompileError::MissingHall)
    ));
}

#[test]
fn hall_found_by_room_color_without_id() {
    let svg = r##"<svg width="500" height="400">
        <rect x="0" y="0" width="500" height="400" stroke="#000000" fill="none"/>
    </svg>"##;
    let scene = compile_str(svg, &CompileOptions::default()).unwrap();
    assert_eq!(scene.hall.width_mm, scale_mm(500));
}

#[test]
fn unparsable_hall_dimension_is_fatal() {
    let svg = r#"<svg><rect id="room" width="wide" height="400"/></svg>"#;
    assert!(matches!(
        compile_str(svg, &CompileOptions::default()),
        Err(CompileError::BadLength { attr: "width", .. })
    ));
}

#[test]
fn scaling_is_uniform_across_predrawn_scale() {
    // Compiling a drawing whose dimensions are already ×3 yields a scene
    // that is ×3 of the base scene up to rounding of the shared constant.
    let base = compile_str(HALL_SVG, &CompileOptions::default()).unwrap();
    let tripled = HALL_SVG
        .replace("width=\"1000\" height=\"600\"", "width=\"3000\" height=\"1800\"")
        .replace("cx=\"100\" cy=\"100\"", "cx=\"300\" cy=\"300\"");
    let scene = compile_str(&tripled, &CompileOptions::default()).unwrap();
    assert_eq!(scene.hall.width_mm, scale_mm(3000));
    let base_outlet = base.infrastructure.outlets[0];
    let tripled_outlet = scene.infrastructure.outlets[0];
    // Same physical point at triple resolution: within rounding of ×3.
    assert!((tripled_outlet[0] - 3 * base_outlet[0]).abs() <= 2);
    assert!((tripled_outlet[1] - 3 * base_outlet[1]).abs() <= 2);
}
