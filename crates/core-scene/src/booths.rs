//! Booth-table parsing.
//!
//! One CSV row per booth. Required columns: `id`, `name`, `width_mm`,
//! `depth_mm`, `want_outlet`, `want_curtain_rail`. Optional: `group`, the
//! four `pref_*_mm` columns (jointly present or jointly absent per row) and
//! `pref_area_hard`. Want flags are true exactly for the token `TRUE`,
//! case-insensitively; the hard flag accepts `1`/`true`/`yes`.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

/// Optional preferred rectangle for one booth. `hard: None` defers to
/// `requirements.preferred_area_default`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferredArea {
    /// `[xmin, ymin, xmax, ymax]` in mm.
    pub rect: [i64; 4],
    pub hard: Option<bool>,
}

/// One requested booth, sizes in the same (scaled) mm domain as the
/// compiled configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoothRequest {
    pub id: i64,
    pub name: String,
    pub width_mm: i64,
    pub depth_mm: i64,
    pub want_outlet: bool,
    pub want_curtain: bool,
    pub group: Option<String>,
    pub preferred: Option<PreferredArea>,
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read booth table `{path}`")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed booth table: {0}")]
    Csv(#[from] csv::Error),
    #[error("booth table is missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("booth table row {row}: no value for column `{column}`")]
    MissingValue { row: usize, column: &'static str },
    #[error("booth table row {row}: invalid {column} `{value}`")]
    BadValue {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("booth table row {row}: width_mm and depth_mm must be positive")]
    NonPositiveSize { row: usize },
    #[error("booth table row {row}: pref_*_mm columns must be given together")]
    PartialPreferredArea { row: usize },
    #[error("booth table row {row}: duplicate booth id {id}")]
    DuplicateId { row: usize, id: i64 },
}

const REQUIRED: [&str; 6] = [
    "id",
    "name",
    "width_mm",
    "depth_mm",
    "want_outlet",
    "want_curtain_rail",
];
const PREF: [&str; 4] = ["pref_xmin_mm", "pref_ymin_mm", "pref_xmax_mm", "pref_ymax_mm"];

struct Columns {
    required: [usize; 6],
    group: Option<usize>,
    pref: [Option<usize>; 4],
    pref_hard: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, TableError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let mut required = [0usize; 6];
        for (slot, name) in required.iter_mut().zip(REQUIRED) {
            *slot = find(name).ok_or(TableError::MissingColumn(name))?;
        }
        let mut pref = [None; 4];
        for (slot, name) in pref.iter_mut().zip(PREF) {
            *slot = find(name);
        }
        Ok(Self {
            required,
            group: find("group"),
            pref,
            pref_hard: find("pref_area_hard"),
        })
    }
}

/// The want flags are true exactly for the token `TRUE` (case-insensitive);
/// anything else, including an empty cell, is false.
fn parse_want(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn parse_hard_flag(value: &str) -> Option<bool> {
    let v = value.trim().to_ascii_lowercase();
    if v.is_empty() {
        None
    } else {
        Some(matches!(v.as_str(), "1" | "true" | "yes"))
    }
}

fn parse_int(
    record: &csv::StringRecord,
    index: usize,
    row: usize,
    column: &'static str,
) -> Result<i64, TableError> {
    let raw = record
        .get(index)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(TableError::MissingValue { row, column })?;
    raw.parse().map_err(|_| TableError::BadValue {
        row,
        column,
        value: raw.to_string(),
    })
}

fn optional_cell<'r>(record: &'r csv::StringRecord, index: Option<usize>) -> Option<&'r str> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Parse a booth table from any reader.
pub fn parse_booths<R: Read>(reader: R) -> Result<Vec<BoothRequest>, TableError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let columns = Columns::resolve(csv_reader.headers()?)?;

    let mut booths = Vec::new();
    let mut seen_ids = HashSet::new();
    for (offset, record) in csv_reader.records().enumerate() {
        let record = record?;
        // Header is line 1; data starts on line 2.
        let row = offset + 2;

        let [id_col, name_col, width_col, depth_col, outlet_col, curtain_col] = columns.required;
        let id = parse_int(&record, id_col, row, "id")?;
        if !seen_ids.insert(id) {
            return Err(TableError::DuplicateId { row, id });
        }
        let name = record
            .get(name_col)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(TableError::MissingValue { row, column: "name" })?
            .to_string();
        let width_mm = parse_int(&record, width_col, row, "width_mm")?;
        let depth_mm = parse_int(&record, depth_col, row, "depth_mm")?;
        if width_mm <= 0 || depth_mm <= 0 {
            return Err(TableError::NonPositiveSize { row });
        }
        let want_outlet = record.get(outlet_col).map(parse_want).unwrap_or(false);
        let want_curtain = record.get(curtain_col).map(parse_want).unwrap_or(false);
        let group = optional_cell(&record, columns.group).map(str::to_string);

        let pref_cells: Vec<Option<&str>> = columns
            .pref
            .iter()
            .map(|idx| optional_cell(&record, *idx))
            .collect();
        let preferred = if pref_cells.iter().all(Option::is_some) {
            let mut rect = [0i64; 4];
            for (slot, (cell, column)) in
                rect.iter_mut().zip(pref_cells.iter().zip(PREF))
            {
                let raw = cell.unwrap_or_default();
                *slot = raw.parse().map_err(|_| TableError::BadValue {
                    row,
                    column,
                    value: raw.to_string(),
                })?;
            }
            let hard = optional_cell(&record, columns.pref_hard).and_then(parse_hard_flag);
            Some(PreferredArea { rect, hard })
        } else if pref_cells.iter().any(Option::is_some) {
            return Err(TableError::PartialPreferredArea { row });
        } else {
            None
        };

        booths.push(BoothRequest {
            id,
            name,
            width_mm,
            depth_mm,
            want_outlet,
            want_curtain,
            group,
            preferred,
        });
    }

    debug!(target: "scene.booths", count = booths.len(), "booth_table_parsed");
    Ok(booths)
}

/// Load a booth table from disk.
pub fn load_booths(path: &Path) -> Result<Vec<BoothRequest>, TableError> {
    let file = File::open(path).map_err(|source| TableError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_booths(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TABLE: &str = "\
id,name,width_mm,depth_mm,want_outlet,want_curtain_rail,group,pref_xmin_mm,pref_ymin_mm,pref_xmax_mm,pref_ymax_mm,pref_area_hard
1,Acme,2000,1500,TRUE,false,food,,,,,
2,Umbrella,3000,1000,no,True,,0,0,5000,3000,yes
3,Initech,1200,1200,,,,,,,,
";

    #[test]
    fn parses_rows_flags_and_preferred_area() {
        let booths = parse_booths(TABLE.as_bytes()).unwrap();
        assert_eq!(booths.len(), 3);

        assert_eq!(booths[0].id, 1);
        assert!(booths[0].want_outlet);
        assert!(!booths[0].want_curtain, "`false` is not the TRUE token");
        assert_eq!(booths[0].group.as_deref(), Some("food"));
        assert_eq!(booths[0].preferred, None);

        assert!(!booths[1].want_outlet, "`no` is not the TRUE token");
        assert!(booths[1].want_curtain, "TRUE is case-insensitive");
        assert_eq!(
            booths[1].preferred,
            Some(PreferredArea {
                rect: [0, 0, 5000, 3000],
                hard: Some(true),
            })
        );

        assert!(!booths[2].want_outlet, "empty cell is false");
        assert_eq!(booths[2].group, None);
    }

    #[test]
    fn hard_flag_tokens() {
        assert_eq!(parse_hard_flag("1"), Some(true));
        assert_eq!(parse_hard_flag("TRUE"), Some(true));
        assert_eq!(parse_hard_flag("Yes"), Some(true));
        assert_eq!(parse_hard_flag("0"), Some(false));
        assert_eq!(parse_hard_flag("soft"), Some(false));
        assert_eq!(parse_hard_flag("  "), None);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let err = parse_booths("id,name,width_mm,depth_mm,want_outlet\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            TableError::MissingColumn("want_curtain_rail")
        ));
    }

    #[test]
    fn partial_preferred_area_is_fatal() {
        let table = "\
id,name,width_mm,depth_mm,want_outlet,want_curtain_rail,pref_xmin_mm,pref_ymin_mm,pref_xmax_mm,pref_ymax_mm
1,A,100,100,false,false,0,,100,100
";
        let err = parse_booths(table.as_bytes()).unwrap_err();
        assert!(matches!(err, TableError::PartialPreferredArea { row: 2 }));
    }

    #[test]
    fn non_positive_size_is_fatal() {
        let table = "id,name,width_mm,depth_mm,want_outlet,want_curtain_rail\n1,A,0,100,,\n";
        let err = parse_booths(table.as_bytes()).unwrap_err();
        assert!(matches!(err, TableError::NonPositiveSize { row: 2 }));
    }

    #[test]
    fn duplicate_id_is_fatal() {
        let table = "id,name,width_mm,depth_mm,want_outlet,want_curtain_rail\n\
                     7,A,100,100,,\n7,B,100,100,,\n";
        let err = parse_booths(table.as_bytes()).unwrap_err();
        assert!(matches!(err, TableError::DuplicateId { row: 3, id: 7 }));
    }
}
