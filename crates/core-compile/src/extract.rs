//! Geometry extraction from the parsed drawing.
//!
//! All coordinates are read in SVG space (origin top-left), flipped about
//! the hall height into hall space (origin bottom-left), and rounded to
//! integer millimeters. The caller applies the uniform dimensional scale
//! afterwards.

use roxmltree::{Document, Node};
use tracing::debug;

use core_scene::{CurtainRail, Hall, InnerWall, NoGoZone, SceneConfig};

use crate::color::{self, Channel, ColorTable};
use crate::{CompileError, CompileOptions};

/// Tolerance for the horizontal/vertical decision on rail endpoints.
const EPS_ALIGN: f64 = 0.5;

pub(crate) fn extract_scene(
    doc: &Document,
    options: &CompileOptions,
) -> Result<SceneConfig, CompileError> {
    let table = &options.colors;
    let hall_node = find_hall(doc, table).ok_or(CompileError::MissingHall)?;
    let width = required_len(hall_node, "width")?;
    let height = required_len(hall_node, "height")?;
    let flip = |y: f64| height - y;

    let mut scene = SceneConfig {
        hall: Hall {
            width_mm: width.round() as i64,
            depth_mm: height.round() as i64,
            wall_band_mm: options.wall_band_mm,
            min_aisle_mm: options.aisle_mm,
        },
        infrastructure: Default::default(),
        requirements: Default::default(),
        weights: Default::default(),
        solver: Default::default(),
    };

    extract_outlets(doc, table, flip, &mut scene)?;
    extract_rails(doc, table, flip, &mut scene)?;
    extract_inner_walls(doc, table, flip, &mut scene)?;
    extract_zones(doc, table, hall_node, flip, &mut scene)?;
    Ok(scene)
}

/// The element with `id="room"` wins; otherwise the first `rect` whose
/// resolved color maps to `room`.
fn find_hall<'a, 'input>(
    doc: &'a Document<'input>,
    table: &ColorTable,
) -> Option<Node<'a, 'input>> {
    if let Some(node) = doc
        .descendants()
        .find(|n| n.is_element() && n.attribute("id") == Some("room"))
    {
        return Some(node);
    }
    doc.descendants().find(|n| {
        n.is_element() && n.tag_name().name() == "rect" && color_marks(*n, table, "room")
    })
}

fn extract_outlets(
    doc: &Document,
    table: &ColorTable,
    flip: impl Fn(f64) -> f64,
    scene: &mut SceneConfig,
) -> Result<(), CompileError> {
    for node in elements(doc, &["circle", "rect"]) {
        let marked = has_ancestor_token(node, &["outlet"], &["outlet"], &[])
            || color_marks(node, table, "outlet");
        if !marked {
            continue;
        }
        let (cx, cy) = if node.tag_name().name() == "circle" {
            (opt_len(node, "cx")?, opt_len(node, "cy")?)
        } else {
            (
                opt_len(node, "x")? + opt_len(node, "width")? / 2.0,
                opt_len(node, "y")? + opt_len(node, "height")? / 2.0,
            )
        };
        scene
            .infrastructure
            .outlets
            .push([cx.round() as i64, flip(cy).round() as i64]);
    }
    Ok(())
}

fn extract_rails(
    doc: &Document,
    table: &ColorTable,
    flip: impl Fn(f64) -> f64,
    scene: &mut SceneConfig,
) -> Result<(), CompileError> {
    let mut targets =
        table.hexes_for_class(&["line", "path", "polyline"], Channel::Stroke, "curtain-rail");
    if targets.is_empty() {
        // No rail color configured anywhere: accept the stock greens.
        targets.insert("#0a7a0a".to_string());
        targets.insert("#009944".to_string());
    }

    for node in elements(doc, &["line", "path", "polyline"]) {
        let by_token = has_ancestor_token(node, &["curtain-rail"], &[], &[]);
        let by_color = effective_color(node, Channel::Stroke)
            .map(|hex| targets.contains(&hex))
            .unwrap_or(false);
        if !by_token && !by_color {
            continue;
        }

        let endpoints = match node.tag_name().name() {
            "line" => Some((
                opt_len(node, "x1")?,
                opt_len(node, "y1")?,
                opt_len(node, "x2")?,
                opt_len(node, "y2")?,
            )),
            "path" => path_endpoints(node.attribute("d")),
            _ => polyline_endpoints(node.attribute("points")),
        };
        let Some((x1, y1, x2, y2)) = endpoints else {
            continue;
        };

        let band_mm = data_attr(node, "data-band-mm")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(1000.0)
            .round() as i64;

        if (x1 - x2).abs() <= EPS_ALIGN {
            let x = ((x1 + x2) / 2.0).round() as i64;
            let (y_min, y_max) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
            scene.infrastructure.curtain_rails.push(CurtainRail {
                p1: [x, flip(y_min).round() as i64],
                p2: [x, flip(y_max).round() as i64],
                band_mm,
            });
        } else if (y1 - y2).abs() <= EPS_ALIGN {
            let y = flip((y1 + y2) / 2.0).round() as i64;
            let (x_min, x_max) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
            scene.infrastructure.curtain_rails.push(CurtainRail {
                p1: [x_min.round() as i64, y],
                p2: [x_max.round() as i64, y],
                band_mm,
            });
        } else {
            debug!(target: "compile.rails", x1, y1, x2, y2, "diagonal_rail_dropped");
        }
    }
    Ok(())
}

fn extract_inner_walls(
    doc: &Document,
    table: &ColorTable,
    flip: impl Fn(f64) -> f64,
    scene: &mut SceneConfig,
) -> Result<(), CompileError> {
    for node in elements(doc, &["line"]) {
        let marked = has_ancestor_token(node, &["inner-wall"], &["inner", "wall"], &[])
            || color_marks(node, table, "inner-wall");
        if !marked {
            continue;
        }
        let x1 = opt_len(node, "x1")?;
        let y1 = opt_len(node, "y1")?;
        let x2 = opt_len(node, "x2")?;
        let y2 = opt_len(node, "y2")?;
        let p1 = [x1.round() as i64, flip(y1).round() as i64];
        let p2 = [x2.round() as i64, flip(y2).round() as i64];
        if core_scene::geometry::classify(p1, p2).is_none() {
            tracing::warn!(target: "compile.walls", x1, y1, x2, y2, "diagonal_inner_wall_dropped");
            continue;
        }
        let name = node
            .attribute("data-name")
            .or_else(|| node.attribute("id"))
            .unwrap_or_default()
            .to_string();
        let thickness_mm = node
            .attribute("data-thickness-mm")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(100.0)
            .round() as i64;
        let attachable = node
            .attribute("data-attachable")
            .map(bool_token)
            .unwrap_or(true);
        scene.infrastructure.inner_walls.push(InnerWall {
            name,
            p1,
            p2,
            thickness_mm,
            attachable,
        });
    }
    Ok(())
}

fn extract_zones(
    doc: &Document,
    table: &ColorTable,
    hall_node: Node,
    flip: impl Fn(f64) -> f64,
    scene: &mut SceneConfig,
) -> Result<(), CompileError> {
    let hall_id = hall_node.attribute("id");
    for node in elements(doc, &["rect", "polygon"]) {
        if node == hall_node || (hall_id.is_some() && node.attribute("id") == hall_id) {
            continue;
        }
        let marked = has_ancestor_token(
            node,
            &["no-go", "no-go-zone"],
            &["no-go", "nogozone"],
            &["no-go-zones"],
        ) || color_marks(node, table, "no-go");
        if !marked {
            continue;
        }

        let bbox = if node.tag_name().name() == "rect" {
            let x = opt_len(node, "x")?;
            let y = opt_len(node, "y")?;
            let w = opt_len(node, "width")?;
            let h = opt_len(node, "height")?;
            Some((x, y, x + w, y + h))
        } else {
            polygon_bbox(node.attribute("points"))
        };
        let Some((xmin_s, ymin_s, xmax_s, ymax_s)) = bbox else {
            continue;
        };

        // SVG top-origin box: its ymax becomes the hall-space ymin.
        scene.infrastructure.no_go_zones.push(NoGoZone {
            name: node
                .attribute("data-name")
                .or_else(|| node.attribute("id"))
                .unwrap_or_default()
                .to_string(),
            rect: [
                xmin_s.round() as i64,
                flip(ymax_s).round() as i64,
                xmax_s.round() as i64,
                flip(ymin_s).round() as i64,
            ],
        });
    }
    Ok(())
}

// ---- classification helpers ----

fn elements<'a, 'input: 'a>(
    doc: &'a Document<'input>,
    tags: &'a [&'a str],
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    doc.descendants()
        .filter(move |n| n.is_element() && tags.contains(&n.tag_name().name()))
}

/// Class token on the element or any ancestor: a `class` list entry, an id
/// prefix, or an exact id.
fn has_ancestor_token(
    node: Node,
    classes: &[&str],
    id_prefixes: &[&str],
    ids: &[&str],
) -> bool {
    node.ancestors().any(|anc| {
        if let Some(list) = anc.attribute("class") {
            if list
                .split_whitespace()
                .any(|token| classes.contains(&token))
            {
                return true;
            }
        }
        if let Some(id) = anc.attribute("id") {
            if ids.contains(&id) || id_prefixes.iter().any(|p| id.starts_with(p)) {
                return true;
            }
        }
        false
    })
}

/// True when the element's resolved fill or stroke maps to `class` for its
/// tag. Polygons reuse the `rect` table entries.
fn color_marks(node: Node, table: &ColorTable, class: &str) -> bool {
    let tag = node.tag_name().name();
    let tag = if tag == "polygon" { "rect" } else { tag };
    for channel in [Channel::Fill, Channel::Stroke] {
        if let Some(hex) = effective_color(node, channel) {
            if table.class_for(tag, channel, &hex) == Some(class) {
                return true;
            }
        }
    }
    false
}

/// Resolve the effective color for one channel: explicit attribute, then the
/// inline style string, walking ancestors up to the root. First token found
/// wins (even if it fails to normalize).
fn effective_color(node: Node, channel: Channel) -> Option<String> {
    for anc in node.ancestors() {
        if let Some(raw) = anc.attribute(channel.attr()) {
            if !raw.trim().eq_ignore_ascii_case("none") {
                return color::normalize(raw);
            }
        }
        if let Some(style) = anc.attribute("style") {
            if let Some(hex) = color::style_color(style, channel) {
                return Some(hex);
            }
        }
    }
    None
}

/// First value of a `data-*` attribute walking up from the element.
fn data_attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.ancestors().find_map(|anc| anc.attribute(name))
}

fn bool_token(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

// ---- numeric helpers ----

fn sanitize_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        .collect();
    cleaned.parse().ok()
}

/// Geometry attribute with the SVG default of 0 when absent; present but
/// unparsable is fatal.
fn opt_len(node: Node, attr: &'static str) -> Result<f64, CompileError> {
    match node.attribute(attr) {
        None => Ok(0.0),
        Some(raw) => sanitize_number(raw).ok_or_else(|| CompileError::BadLength {
            tag: node.tag_name().name().to_string(),
            attr,
            value: raw.to_string(),
        }),
    }
}

/// Attribute that must be present and numeric (the hall dimensions).
fn required_len(node: Node, attr: &'static str) -> Result<f64, CompileError> {
    let raw = node.attribute(attr).ok_or_else(|| CompileError::BadLength {
        tag: node.tag_name().name().to_string(),
        attr,
        value: String::new(),
    })?;
    sanitize_number(raw).ok_or_else(|| CompileError::BadLength {
        tag: node.tag_name().name().to_string(),
        attr,
        value: raw.to_string(),
    })
}

fn numbers(raw: &str) -> Vec<f64> {
    use regex::Regex;
    use std::sync::OnceLock;
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"[-+]?\d*\.?\d+(?:[eE][-+]?\d+)?").unwrap());
    re.find_iter(raw)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// First and last coordinate pair of a path `d` string (straight rails).
fn path_endpoints(d: Option<&str>) -> Option<(f64, f64, f64, f64)> {
    let nums = numbers(d?);
    if nums.len() < 4 {
        return None;
    }
    Some((nums[0], nums[1], nums[nums.len() - 2], nums[nums.len() - 1]))
}

fn polyline_endpoints(points: Option<&str>) -> Option<(f64, f64, f64, f64)> {
    let tokens: Vec<&str> = points?
        .split([',', ' ', '\t', '\n', '\r'])
        .filter(|t| !t.is_empty())
        .collect();
    let mut vals = Vec::with_capacity(tokens.len());
    for token in tokens {
        vals.push(token.parse::<f64>().ok()?);
    }
    if vals.len() < 4 {
        return None;
    }
    Some((vals[0], vals[1], vals[vals.len() - 2], vals[vals.len() - 1]))
}

/// Bounding box of a polygon's point list.
fn polygon_bbox(points: Option<&str>) -> Option<(f64, f64, f64, f64)> {
    let nums = numbers(points?);
    if nums.len() < 2 {
        return None;
    }
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for pair in nums.chunks_exact(2) {
        xs.push(pair[0]);
        ys.push(pair[1]);
    }
    let xmin = xs.iter().cloned().fold(f64::INFINITY, f64::min);
    let xmax = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let ymin = ys.iter().cloned().fold(f64::INFINITY, f64::min);
    let ymax = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    Some((xmin, ymin, xmax, ymax))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_endpoints_take_first_and_last() {
        assert_eq!(
            path_endpoints(Some("M 10,20 L 10,500")),
            Some((10.0, 20.0, 10.0, 500.0))
        );
        assert_eq!(path_endpoints(Some("M 1 2")), None);
    }

    #[test]
    fn polyline_tolerates_mixed_separators() {
        assert_eq!(
            polyline_endpoints(Some("0,600  400 600, 900,600")),
            Some((0.0, 600.0, 900.0, 600.0))
        );
        assert_eq!(polyline_endpoints(Some("0,600 x,600")), None);
    }

    #[test]
    fn polygon_bbox_spans_all_points() {
        assert_eq!(
            polygon_bbox(Some("10,10 40,5 30,50")),
            Some((10.0, 5.0, 40.0, 50.0))
        );
    }

    #[test]
    fn sanitizer_strips_units() {
        assert_eq!(sanitize_number("100mm"), Some(100.0));
        assert_eq!(sanitize_number(" 2.5e2px"), Some(250.0));
        assert_eq!(sanitize_number("wide"), None);
    }
}
