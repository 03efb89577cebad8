//! Placement emitters: the tabular placement record (with a one-generation
//! `.prev` snapshot of the file it replaces) and the rendered layout
//! diagram.

use thiserror::Error;

pub mod diagram;
pub mod table;

pub use diagram::{render_diagram, write_diagram};
pub use table::write_placement;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to write `{path}`")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write placement table: {0}")]
    Csv(#[from] csv::Error),
}
