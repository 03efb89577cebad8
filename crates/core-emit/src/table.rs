//! Placement table output.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use core_scene::Placement;

use crate::EmitError;

fn prev_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".prev");
    PathBuf::from(name)
}

/// Write the placement table. An existing table is renamed to `<path>.prev`
/// first, keeping exactly one previous generation for post-mortem diffs.
pub fn write_placement(placement: &Placement, path: &Path) -> Result<(), EmitError> {
    if path.exists() {
        let prev = prev_path(path);
        fs::rename(path, &prev).map_err(|source| EmitError::Io {
            path: prev.display().to_string(),
            source,
        })?;
        debug!(target: "emit.table", prev = %prev.display(), "previous_placement_snapshotted");
    }

    let mut writer = csv::Writer::from_path(path).map_err(EmitError::Csv)?;
    for booth in &placement.booths {
        writer.serialize(booth)?;
    }
    writer.flush().map_err(|source| EmitError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(target: "emit.table", path = %path.display(), booths = placement.booths.len(), "placement_written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_scene::BoothPlacement;

    fn placement(x: i64) -> Placement {
        Placement {
            booths: vec![BoothPlacement {
                id: 1,
                name: "Acme".into(),
                x_mm: x,
                y_mm: 0,
                width_mm: 2000,
                depth_mm: 1500,
                rotated: 0,
            }],
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("placement.csv");
        write_placement(&placement(500), &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,name,x_mm,y_mm,width_mm,depth_mm,rotated"
        );
        assert_eq!(lines.next().unwrap(), "1,Acme,500,0,2000,1500,0");
    }

    #[test]
    fn keeps_one_previous_generation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("placement.csv");
        write_placement(&placement(100), &path).unwrap();
        write_placement(&placement(200), &path).unwrap();
        write_placement(&placement(300), &path).unwrap();

        let current = fs::read_to_string(&path).unwrap();
        let previous = fs::read_to_string(dir.path().join("placement.csv.prev")).unwrap();
        assert!(current.contains("300,"));
        assert!(previous.contains("200,"), "only one generation is retained");
        assert!(!previous.contains("100,"));
    }
}
