//! Configuration object I/O.
//!
//! The on-disk format is JSON with human annotations: `/* ... */` and
//! `// ...` comments are stripped (string-aware) before the strict
//! `serde_json` parse, so annotated files keep working without a custom
//! parser.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::SceneConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration `{path}`")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write configuration `{path}`")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Remove `//` line comments and `/* */` block comments, leaving string
/// literals untouched. Newlines inside comments are preserved so parse
/// errors still report useful line numbers.
pub fn strip_comments(input: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Code,
        Str { escaped: bool },
        Line,
        Block,
    }

    let mut out = String::with_capacity(input.len());
    let mut state = State::Code;
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '"' => {
                    state = State::Str { escaped: false };
                    out.push(c);
                }
                '/' => match chars.peek() {
                    Some('/') => {
                        chars.next();
                        state = State::Line;
                    }
                    Some('*') => {
                        chars.next();
                        state = State::Block;
                    }
                    _ => out.push(c),
                },
                _ => out.push(c),
            },
            State::Str { escaped } => {
                if escaped {
                    state = State::Str { escaped: false };
                } else if c == '\\' {
                    state = State::Str { escaped: true };
                } else if c == '"' {
                    state = State::Code;
                }
                out.push(c);
            }
            State::Line => {
                if c == '\n' {
                    state = State::Code;
                    out.push(c);
                }
            }
            State::Block => {
                if c == '\n' {
                    out.push(c);
                } else if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                }
            }
        }
    }
    out
}

/// Parse a (possibly commented) configuration string.
pub fn from_str(text: &str) -> Result<SceneConfig, ConfigError> {
    let cleaned = strip_comments(text);
    Ok(serde_json::from_str(&cleaned)?)
}

/// Load a configuration file.
pub fn load(path: &Path) -> Result<SceneConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    from_str(&text)
}

/// Write a configuration file as pretty-printed JSON.
pub fn save(config: &SceneConfig, path: &Path) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json).map_err(|source| ConfigError::Write {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MINIMAL: &str = r#"
    /* hall exported from the floor plan */
    {
        "room": { "width_mm": 10000, "depth_mm": 6000,
                  "wall_band_mm": 500, "min_aisle_mm": 1000 },
        // infrastructure block intentionally sparse
        "infrastructure": {
            "outlets": [[1000, 1000]],
            "curtain_rails": [
                { "p1": [0, 6000], "p2": [10000, 6000], "band_mm": 800 }
            ]
        }
    }
    "#;

    #[test]
    fn strips_line_and_block_comments() {
        let cleaned = strip_comments("{\"a\": 1, // note\n \"b\": /* gone */ 2}");
        assert_eq!(cleaned, "{\"a\": 1, \n \"b\":  2}");
    }

    #[test]
    fn comment_markers_inside_strings_survive() {
        let cleaned = strip_comments(r#"{"url": "http://x/*y*/z"}"#);
        assert_eq!(cleaned, r#"{"url": "http://x/*y*/z"}"#);
    }

    #[test]
    fn escaped_quote_does_not_terminate_string() {
        let cleaned = strip_comments(r#"{"s": "a\"// not a comment"}"#);
        assert_eq!(cleaned, r#"{"s": "a\"// not a comment"}"#);
    }

    #[test]
    fn newlines_in_comments_are_preserved() {
        let cleaned = strip_comments("1 /* a\nb\nc */ 2");
        assert_eq!(cleaned, "1 \n\n 2");
    }

    #[test]
    fn parses_commented_config_with_defaults() {
        let scene = from_str(MINIMAL).unwrap();
        assert_eq!(scene.hall.width_mm, 10000);
        assert_eq!(scene.hall.min_aisle_mm, 1000);
        assert_eq!(scene.infrastructure.outlets, vec![[1000, 1000]]);
        assert_eq!(scene.infrastructure.curtain_rails[0].band_mm, 800);
        // Missing blocks come back as defaults.
        assert_eq!(scene.weights, crate::Weights::default());
        assert_eq!(scene.solver.max_time_in_seconds, 30.0);
        assert_eq!(scene.solver.num_workers, 8);
    }

    #[test]
    fn save_then_load_round_trips() {
        let scene = from_str(MINIMAL).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        save(&scene, &path).unwrap();
        let reloaded = load(&path).unwrap();
        assert_eq!(scene, reloaded);
    }

    #[test]
    fn missing_room_is_an_error() {
        assert!(from_str("{}").is_err());
    }
}
