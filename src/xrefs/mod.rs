//! Cross-reference table curation.
//!
//! Loading, normalizing and reporting on `xrefs.tsv`, the table relating
//! chemicals to the entities they modulate.

pub mod loader;
pub mod normalizer;
pub mod report;
pub mod tsv;
pub mod types;

pub use self::loader::{load_table, read_table};
pub use self::normalizer::{
    normalize_table, sort_and_dedup, write_table, NormalizeOptions, NormalizeSummary,
};
pub use self::report::{
    export_single_mappings, get_single_mappings, get_single_mappings_to, report_mappings,
    MappingReport,
};
pub use self::types::*;

// Module-level constants
pub const TARGET_XREFS: &str = "xrefs";
