//! Color normalization and the color→class table.
//!
//! Shape classification falls back to colors when no class/id token is
//! present, so every color read from the drawing is normalized to lowercase
//! `#rrggbb` before the table lookup. The table itself is keyed
//! tag → channel → hex → class and a user-supplied table is deep-merged
//! over the built-in default.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

/// Which styling channel a lookup reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Fill,
    Stroke,
}

impl Channel {
    pub fn attr(self) -> &'static str {
        match self {
            Channel::Fill => "fill",
            Channel::Stroke => "stroke",
        }
    }
}

const NAMED: [(&str, &str); 15] = [
    ("black", "#000000"),
    ("white", "#ffffff"),
    ("red", "#ff0000"),
    ("green", "#008000"),
    ("blue", "#0000ff"),
    ("magenta", "#ff00ff"),
    ("fuchsia", "#ff00ff"),
    ("yellow", "#ffff00"),
    ("gray", "#808080"),
    ("grey", "#808080"),
    ("orange", "#ffa500"),
    ("cyan", "#00ffff"),
    ("aqua", "#00ffff"),
    ("lime", "#00ff00"),
    ("navy", "#000080"),
];

fn rgb_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^rgba?\(([^)]+)\)$").unwrap())
}

fn hex3_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#[0-9a-f]{3}$").unwrap())
}

fn hex6_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#[0-9a-f]{6}$").unwrap())
}

fn clamp_component(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let value = if let Some(pct) = raw.strip_suffix('%') {
        pct.trim().parse::<f64>().ok()? * 2.55
    } else {
        raw.parse::<f64>().ok()?
    };
    Some((value.round() as i64).clamp(0, 255))
}

/// Normalize a raw color token to lowercase `#rrggbb`. Accepts 3- and
/// 6-digit hex, `rgb()`, `rgba()` (byte or percentage components, alpha
/// ignored) and a fixed named set. `none` and anything unrecognized
/// resolve to `None`.
pub fn normalize(raw: &str) -> Option<String> {
    let c = raw.trim().to_ascii_lowercase();
    if c.is_empty() || c == "none" {
        return None;
    }
    if let Some((_, hex)) = NAMED.iter().find(|(name, _)| *name == c) {
        return Some((*hex).to_string());
    }
    if hex3_re().is_match(&c) {
        let mut out = String::from("#");
        for ch in c.chars().skip(1) {
            out.push(ch);
            out.push(ch);
        }
        return Some(out);
    }
    if hex6_re().is_match(&c) {
        return Some(c);
    }
    if let Some(caps) = rgb_re().captures(&c) {
        let parts: Vec<&str> = caps[1].split(',').collect();
        if parts.len() >= 3 {
            let r = clamp_component(parts[0])?;
            let g = clamp_component(parts[1])?;
            let b = clamp_component(parts[2])?;
            return Some(format!("#{r:02x}{g:02x}{b:02x}"));
        }
    }
    None
}

/// Per-tag color→class entries for the two channels.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TagColors {
    #[serde(default)]
    pub fill: HashMap<String, String>,
    #[serde(default)]
    pub stroke: HashMap<String, String>,
}

/// The shape-tag → channel → color → class mapping.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ColorTable(pub HashMap<String, TagColors>);

impl ColorTable {
    /// The built-in default applied when no table is provided.
    pub fn builtin() -> Self {
        let mut table = ColorTable::default();
        table.insert("line", Channel::Stroke, "#0a7a0a", "curtain-rail");
        table.insert("line", Channel::Stroke, "#0080ff", "inner-wall");
        table.insert("rect", Channel::Fill, "#ffa500", "no-go");
        table.insert("rect", Channel::Stroke, "#000000", "room");
        table.insert("circle", Channel::Fill, "#ff00ff", "outlet");
        table
    }

    fn insert(&mut self, tag: &str, channel: Channel, hex: &str, class: &str) {
        let entry = self.0.entry(tag.to_string()).or_default();
        let map = match channel {
            Channel::Fill => &mut entry.fill,
            Channel::Stroke => &mut entry.stroke,
        };
        map.insert(hex.to_string(), class.to_string());
    }

    /// Deep-merge a user table over this one; user entries win. Color keys
    /// are normalized so `rgb(...)` or 3-digit keys match resolved colors.
    pub fn merge(&mut self, user: ColorTable) {
        for (tag, colors) in user.0 {
            let entry = self.0.entry(tag).or_default();
            for (hex, class) in colors.fill {
                let key = normalize(&hex).unwrap_or_else(|| hex.to_ascii_lowercase());
                entry.fill.insert(key, class);
            }
            for (hex, class) in colors.stroke {
                let key = normalize(&hex).unwrap_or_else(|| hex.to_ascii_lowercase());
                entry.stroke.insert(key, class);
            }
        }
    }

    /// Look up the class a resolved color maps to, if any.
    pub fn class_for(&self, tag: &str, channel: Channel, hex: &str) -> Option<&str> {
        let colors = self.0.get(tag)?;
        let map = match channel {
            Channel::Fill => &colors.fill,
            Channel::Stroke => &colors.stroke,
        };
        map.get(hex).map(String::as_str)
    }

    /// All colors mapped to `class` on `channel` across the given tags.
    pub fn hexes_for_class(&self, tags: &[&str], channel: Channel, class: &str) -> HashSet<String> {
        let mut out = HashSet::new();
        for tag in tags {
            if let Some(colors) = self.0.get(*tag) {
                let map = match channel {
                    Channel::Fill => &colors.fill,
                    Channel::Stroke => &colors.stroke,
                };
                for (hex, mapped) in map {
                    if mapped == class {
                        out.insert(hex.clone());
                    }
                }
            }
        }
        out
    }
}

/// Pull one channel out of an inline `style="fill:#abc; stroke:red"` string.
pub fn style_color(style: &str, channel: Channel) -> Option<String> {
    for part in style.split(';') {
        if let Some((key, value)) = part.split_once(':') {
            if key.trim().eq_ignore_ascii_case(channel.attr()) {
                let value = value.trim();
                if value.eq_ignore_ascii_case("none") {
                    return None;
                }
                return normalize(value);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_hex_forms() {
        assert_eq!(normalize("#FA0").as_deref(), Some("#ffaa00"));
        assert_eq!(normalize(" #0A7A0A ").as_deref(), Some("#0a7a0a"));
        assert_eq!(normalize("#12345").as_deref(), None);
    }

    #[test]
    fn normalizes_rgb_and_rgba() {
        assert_eq!(normalize("rgb(255, 0, 128)").as_deref(), Some("#ff0080"));
        assert_eq!(normalize("rgba(0,153,68,0.5)").as_deref(), Some("#009944"));
        assert_eq!(normalize("rgb(100%, 0%, 50%)").as_deref(), Some("#ff0080"));
        assert_eq!(normalize("rgb(300, -4, 12)").as_deref(), Some("#ff000c"));
    }

    #[test]
    fn normalizes_named_and_rejects_unknown() {
        assert_eq!(normalize("Fuchsia").as_deref(), Some("#ff00ff"));
        assert_eq!(normalize("navy").as_deref(), Some("#000080"));
        assert_eq!(normalize("none"), None);
        assert_eq!(normalize("url(#grad)"), None);
    }

    #[test]
    fn style_string_lookup() {
        let style = "fill:#ffa500; stroke: rgb(0,0,0)";
        assert_eq!(style_color(style, Channel::Fill).as_deref(), Some("#ffa500"));
        assert_eq!(
            style_color(style, Channel::Stroke).as_deref(),
            Some("#000000")
        );
        assert_eq!(style_color("stroke:none", Channel::Stroke), None);
    }

    #[test]
    fn builtin_table_lookups() {
        let table = ColorTable::builtin();
        assert_eq!(
            table.class_for("line", Channel::Stroke, "#0080ff"),
            Some("inner-wall")
        );
        assert_eq!(
            table.class_for("circle", Channel::Fill, "#ff00ff"),
            Some("outlet")
        );
        assert_eq!(table.class_for("rect", Channel::Fill, "#0080ff"), None);
    }

    #[test]
    fn user_table_merges_over_builtin() {
        let mut table = ColorTable::builtin();
        let user: ColorTable = serde_json::from_str(
            r##"{ "line": { "stroke": { "rgb(9,9,9)": "inner-wall", "#0a7a0a": "no-go" } } }"##,
        )
        .unwrap();
        table.merge(user);
        // New key, normalized.
        assert_eq!(
            table.class_for("line", Channel::Stroke, "#090909"),
            Some("inner-wall")
        );
        // User entry overrides the builtin rail color.
        assert_eq!(
            table.class_for("line", Channel::Stroke, "#0a7a0a"),
            Some("no-go")
        );
        // Untouched tags survive.
        assert_eq!(
            table.class_for("rect", Channel::Stroke, "#000000"),
            Some("room")
        );
    }

    #[test]
    fn rail_hex_set_with_fallback_semantics() {
        let table = ColorTable::builtin();
        let hexes = table.hexes_for_class(&["line", "path", "polyline"], Channel::Stroke, "curtain-rail");
        assert!(hexes.contains("#0a7a0a"));
        assert!(!hexes.contains("#0080ff"));
    }
}
