//! Single-mapping report.
//!
//! Finds the source identifiers, among a selection of rows, that appear in
//! exactly one row of the whole table. Such identifiers are usually worth a
//! second look during curation: either the mapping is complete or a target was
//! missed.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info};

use super::normalizer::{write_table, NormalizeOptions};
use super::types::{
    AmbiguousMapping, Selection, SingleMapping, Table, SOURCE_ID, TARGET_ID, TARGET_NAME,
};
use super::TARGET_XREFS;
use crate::config::Config;
use crate::error::{Result, XrefError};

pub const SINGLE_MAPPINGS_FILE_NAME: &str = "single_mappings.tsv";

/// Outcome of grouping the selected source identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingReport {
    /// Identifiers with exactly one row, in ascending `source_id` order.
    pub singles: Vec<SingleMapping>,
    /// Identifiers with more than one row, in ascending `source_id` order.
    pub ambiguous: Vec<AmbiguousMapping>,
}

impl MappingReport {
    pub fn single_set(&self) -> BTreeSet<SingleMapping> {
        self.singles.iter().cloned().collect()
    }

    /// Writes one `<source_id> only mapped to <target_id> <target_name>` line
    /// per single mapping.
    pub fn write_diagnostics<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for mapping in &self.singles {
            writeln!(out, "{}", mapping)?;
        }
        Ok(())
    }
}

fn cell(row: &[String], col: usize) -> &str {
    row.get(col).map(String::as_str).unwrap_or("")
}

/// Groups the selected rows' source identifiers over the entire table.
pub fn report_mappings(table: &Table, selection: &Selection) -> Result<MappingReport> {
    let source_col = table.column(SOURCE_ID)?;
    let target_id_col = table.column(TARGET_ID)?;
    let target_name_col = table.column(TARGET_NAME)?;

    // Empty identifiers are missing values and never form a group.
    let selected: BTreeSet<&str> = selection
        .resolve(table)?
        .into_iter()
        .map(|i| cell(&table.rows[i], source_col))
        .filter(|id| !id.is_empty())
        .collect();

    let mut groups: BTreeMap<&str, Vec<&[String]>> = BTreeMap::new();
    for row in &table.rows {
        let source_id = cell(row, source_col);
        if selected.contains(source_id) {
            groups.entry(source_id).or_default().push(row.as_slice());
        }
    }

    let mut report = MappingReport::default();
    for (source_id, rows) in groups {
        if let [row] = rows.as_slice() {
            report.singles.push(SingleMapping::new(
                source_id,
                cell(row, target_id_col),
                cell(row, target_name_col),
            ));
        } else {
            debug!(
                target: TARGET_XREFS,
                "{} mapped to {} targets", source_id, rows.len()
            );
            report.ambiguous.push(AmbiguousMapping {
                source_id: source_id.to_string(),
                targets: rows
                    .iter()
                    .map(|row| {
                        (
                            cell(row, target_id_col).to_string(),
                            cell(row, target_name_col).to_string(),
                        )
                    })
                    .collect(),
            });
        }
    }

    Ok(report)
}

/// Source identifiers among the selected rows that map to exactly one target
/// in the whole table. Prints one diagnostic line per hit to stdout, in
/// ascending identifier order.
pub fn get_single_mappings(table: &Table, selection: &Selection) -> Result<BTreeSet<SingleMapping>> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    get_single_mappings_to(table, selection, &mut out)
}

/// Same as [`get_single_mappings`], writing the diagnostic lines to `out`.
pub fn get_single_mappings_to<W: Write>(
    table: &Table,
    selection: &Selection,
    out: &mut W,
) -> Result<BTreeSet<SingleMapping>> {
    let report = report_mappings(table, selection)?;
    report.write_diagnostics(out).map_err(XrefError::Output)?;
    Ok(report.single_set())
}

/// Writes the single mappings to `single_mappings.tsv` in the export
/// directory, creating the directory if needed.
pub fn export_single_mappings(config: &Config, singles: &[SingleMapping]) -> Result<PathBuf> {
    fs::create_dir_all(&config.export_dir)
        .map_err(|e| XrefError::file_access(&config.export_dir, e))?;
    let path = config.export_dir.join(SINGLE_MAPPINGS_FILE_NAME);

    let mut table = Table::new(vec![
        SOURCE_ID.to_string(),
        TARGET_ID.to_string(),
        TARGET_NAME.to_string(),
    ]);
    table.rows = singles
        .iter()
        .map(|m| vec![m.source_id.clone(), m.target_id.clone(), m.target_name.clone()])
        .collect();

    write_table(&table, &path, NormalizeOptions::default())?;
    info!(
        target: TARGET_XREFS,
        "exported {} single mappings to {}",
        singles.len(),
        path.display()
    );
    Ok(path)
}
