use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

use crate::error::{Result, XrefError};

/// Columns of `xrefs.tsv`, in file order.
pub const XREFS_COLUMNS: [&str; 8] = [
    "source_db",
    "source_id",
    "source_name",
    "modulation",
    "target_type",
    "target_db",
    "target_id",
    "target_name",
];

pub const SOURCE_DB: &str = "source_db";
pub const SOURCE_ID: &str = "source_id";
pub const SOURCE_NAME: &str = "source_name";
pub const MODULATION: &str = "modulation";
pub const TARGET_ID: &str = "target_id";
pub const TARGET_NAME: &str = "target_name";

/// One cross-reference: a source entity related to a target entity through a
/// modulation. Every field is kept verbatim as text, so identifiers such as
/// `"007"` never lose their leading zeros.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Xref {
    pub source_db: String,
    pub source_id: String,
    pub source_name: String,
    pub modulation: String,
    pub target_type: String,
    pub target_db: String,
    pub target_id: String,
    pub target_name: String,
}

impl Xref {
    fn into_record(self) -> Vec<String> {
        vec![
            self.source_db,
            self.source_id,
            self.source_name,
            self.modulation,
            self.target_type,
            self.target_db,
            self.target_id,
            self.target_name,
        ]
    }

    fn from_cells(cells: &[String]) -> Self {
        let cell = |i: usize| cells.get(i).cloned().unwrap_or_default();
        Xref {
            source_db: cell(0),
            source_id: cell(1),
            source_name: cell(2),
            modulation: cell(3),
            target_type: cell(4),
            target_db: cell(5),
            target_id: cell(6),
            target_name: cell(7),
        }
    }
}

/// In-memory tabular data: a header and text rows of the same width.
///
/// Comment lines skipped while reading are remembered so a rewrite can put
/// them back if asked to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub comments: Vec<String>,
}

impl Table {
    pub fn new(header: Vec<String>) -> Self {
        Table {
            header,
            rows: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Builds a table with the `xrefs.tsv` header.
    pub fn from_xrefs<I>(xrefs: I) -> Self
    where
        I: IntoIterator<Item = Xref>,
    {
        let mut table = Table::new(XREFS_COLUMNS.iter().map(|c| c.to_string()).collect());
        table.rows = xrefs.into_iter().map(Xref::into_record).collect();
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the named column.
    pub fn column(&self, name: &str) -> Result<usize> {
        self.header
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| XrefError::Lookup(format!("no column named '{}'", name)))
    }

    /// Typed view of the rows. Only meaningful for tables with the
    /// `xrefs.tsv` layout.
    pub fn xrefs(&self) -> impl Iterator<Item = Xref> + '_ {
        self.rows.iter().map(|row| Xref::from_cells(row))
    }

    pub fn push(&mut self, xref: Xref) {
        self.rows.push(xref.into_record());
    }
}

/// Chooses a subset of a table's rows. Row labels are zero-based positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    /// One flag per row.
    Mask(Vec<bool>),
    /// Half-open positional range.
    Range(Range<usize>),
    /// Explicit row positions; duplicates are harmless.
    Rows(Vec<usize>),
    /// Rows whose `column` cell equals `value`.
    Equals { column: String, value: String },
}

impl Selection {
    pub fn equals(column: impl Into<String>, value: impl Into<String>) -> Self {
        Selection::Equals {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Resolves the selection to row positions in ascending order.
    pub fn resolve(&self, table: &Table) -> Result<Vec<usize>> {
        let len = table.len();
        match self {
            Selection::All => Ok((0..len).collect()),
            Selection::Mask(mask) => {
                if mask.len() != len {
                    return Err(XrefError::Lookup(format!(
                        "mask has {} entries but the table has {} rows",
                        mask.len(),
                        len
                    )));
                }
                Ok(mask
                    .iter()
                    .enumerate()
                    .filter_map(|(i, keep)| keep.then_some(i))
                    .collect())
            }
            Selection::Range(range) => {
                if range.start > range.end || range.end > len {
                    return Err(XrefError::Lookup(format!(
                        "row range {:?} is outside 0..{}",
                        range, len
                    )));
                }
                Ok(range.clone().collect())
            }
            Selection::Rows(rows) => {
                if let Some(bad) = rows.iter().find(|&&i| i >= len) {
                    return Err(XrefError::Lookup(format!(
                        "row {} is outside 0..{}",
                        bad, len
                    )));
                }
                let mut rows = rows.clone();
                rows.sort_unstable();
                rows.dedup();
                Ok(rows)
            }
            Selection::Equals { column, value } => {
                let col = table.column(column)?;
                Ok(table
                    .rows
                    .iter()
                    .enumerate()
                    .filter(|(_, row)| row.get(col).map(String::as_str) == Some(value.as_str()))
                    .map(|(i, _)| i)
                    .collect())
            }
        }
    }
}

/// A source identifier with exactly one target anywhere in the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SingleMapping {
    pub source_id: String,
    pub target_id: String,
    pub target_name: String,
}

impl SingleMapping {
    pub fn new(source_id: &str, target_id: &str, target_name: &str) -> Self {
        SingleMapping {
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            target_name: target_name.to_string(),
        }
    }
}

impl fmt::Display for SingleMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} only mapped to {} {}",
            self.source_id, self.target_id, self.target_name
        )
    }
}

/// A source identifier that maps to more than one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmbiguousMapping {
    pub source_id: String,
    pub targets: Vec<(String, String)>,
}
