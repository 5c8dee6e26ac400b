use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::loader::load_table;
use super::tsv::join_record;
use super::types::{Table, MODULATION, SOURCE_DB, SOURCE_NAME};
use super::TARGET_XREFS;
use crate::config::Config;
use crate::error::{Result, XrefError};

/// Options controlling how a table is written back to disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    /// Re-emit comment lines collected on read above the header.
    pub keep_comments: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NormalizeSummary {
    pub rows_read: usize,
    pub rows_written: usize,
    pub duplicates_removed: usize,
}

/// Sorts and de-duplicates `xrefs.tsv` in place.
pub fn normalize_table(config: &Config, options: NormalizeOptions) -> Result<NormalizeSummary> {
    let mut table = load_table(config)?;
    let rows_read = table.len();

    let duplicates_removed = sort_and_dedup(&mut table)?;
    write_table(&table, &config.xrefs_path, options)?;

    let summary = NormalizeSummary {
        rows_read,
        rows_written: table.len(),
        duplicates_removed,
    };
    info!(
        target: TARGET_XREFS,
        "normalized {}: {} rows read, {} written, {} duplicates removed",
        config.xrefs_path.display(),
        summary.rows_read,
        summary.rows_written,
        summary.duplicates_removed
    );
    Ok(summary)
}

/// Stable sort on (source_db, source_name, modulation), then drops rows equal
/// in every cell to an earlier row. Returns the number of rows dropped.
pub fn sort_and_dedup(table: &mut Table) -> Result<usize> {
    let keys = [
        table.column(SOURCE_DB)?,
        table.column(SOURCE_NAME)?,
        table.column(MODULATION)?,
    ];

    table.rows.sort_by(|a, b| {
        keys.iter()
            .map(|&k| a.get(k).cmp(&b.get(k)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let before = table.rows.len();
    let mut seen = HashSet::with_capacity(before);
    table.rows.retain(|row| seen.insert(row.clone()));
    let removed = before - table.rows.len();

    debug!(target: TARGET_XREFS, "removed {} duplicate rows", removed);
    Ok(removed)
}

/// Renders the table as tab-delimited text with a header and no index column.
pub fn render_table(table: &Table, options: NormalizeOptions) -> String {
    let mut out = String::new();
    if options.keep_comments {
        for comment in &table.comments {
            out.push_str(comment);
            out.push('\n');
        }
    }
    out.push_str(&join_record(&table.header));
    out.push('\n');
    for row in &table.rows {
        out.push_str(&join_record(row));
        out.push('\n');
    }
    out
}

/// Replaces `path` with the rendered table.
///
/// The content is written to a temporary file in the same directory and then
/// renamed over `path`, so an interrupted write leaves the old file intact.
pub fn write_table(table: &Table, path: &Path, options: NormalizeOptions) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let content = render_table(table, options);

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| XrefError::file_access(path, e))?;
    tmp.write_all(content.as_bytes())
        .and_then(|_| tmp.flush())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| XrefError::file_access(path, e))?;

    // The temp file is created 0600; keep whatever mode the target had
    if let Ok(metadata) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| XrefError::file_access(path, e))?;
    }
    tmp.persist(path)
        .map_err(|e| XrefError::file_access(path, e.error))?;

    debug!(target: TARGET_XREFS, "wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xrefs::loader::read_table;
    use tempfile::tempdir;

    const HEADER: &str = "source_db\tsource_id\tsource_name\tmodulation\ttarget_type\ttarget_db\ttarget_id\ttarget_name";

    const UNSORTED: &str = "# curated xrefs\n\
source_db\tsource_id\tsource_name\tmodulation\ttarget_type\ttarget_db\ttarget_id\ttarget_name\n\
chebi\t27732\tcaffeine\tinhibits\tprotein\thgnc\t263\tADORA1\n\
mesh\tD001241\taspirin\tinhibits\tprotein\thgnc\t9605\tPTGS2\n\
chebi\t15365\taspirin\tinhibits\tprotein\thgnc\t9604\tPTGS1\n\
chebi\t27732\tcaffeine\tinhibits\tprotein\thgnc\t263\tADORA1\n\
chebi\t15365\taspirin\tactivates\tprotein\thgnc\t0042\tTP53\n\
chebi\t15365\taspirin\tinhibits\tprotein\thgnc\t9605\tPTGS2\n";

    fn setup(content: &str) -> (tempfile::TempDir, Config) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("xrefs.tsv");
        fs::write(&path, content).unwrap();
        let config = Config::new().with_xrefs_path(path);
        (dir, config)
    }

    fn key(row: &[String]) -> (&str, &str, &str) {
        (row[0].as_str(), row[2].as_str(), row[3].as_str())
    }

    #[test]
    fn test_sorted_and_deduplicated() {
        let (_dir, config) = setup(UNSORTED);
        let summary = normalize_table(&config, NormalizeOptions::default()).unwrap();
        assert_eq!(
            summary,
            NormalizeSummary {
                rows_read: 6,
                rows_written: 5,
                duplicates_removed: 1
            }
        );

        let table = read_table(&config.xrefs_path).unwrap();
        for pair in table.rows.windows(2) {
            assert!(key(&pair[0]) <= key(&pair[1]));
        }
        for (i, a) in table.rows.iter().enumerate() {
            for b in &table.rows[i + 1..] {
                assert_ne!(a, b);
            }
        }

        // Ties keep input order: PTGS1 was listed before PTGS2
        let targets: Vec<&str> = table.rows.iter().map(|r| r[7].as_str()).collect();
        assert_eq!(targets, vec!["TP53", "PTGS1", "PTGS2", "ADORA1", "PTGS2"]);
        // Identifiers with leading zeros survive the rewrite
        assert_eq!(table.rows[0][6], "0042");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let (_dir, config) = setup(UNSORTED);
        normalize_table(&config, NormalizeOptions::default()).unwrap();
        let first = fs::read(&config.xrefs_path).unwrap();
        normalize_table(&config, NormalizeOptions::default()).unwrap();
        let second = fs::read(&config.xrefs_path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_leading_hash_cell_survives_rewrites() {
        let content = format!(
            "{}\n\"#db\"\t1\tn\tup\tgene\thgnc\t2\tg\nchebi\t3\tm\tup\tgene\thgnc\t4\th\n",
            HEADER
        );
        let (_dir, config) = setup(&content);

        let first = normalize_table(&config, NormalizeOptions::default()).unwrap();
        assert_eq!(first.rows_written, 2);
        let written = fs::read(&config.xrefs_path).unwrap();

        let second = normalize_table(&config, NormalizeOptions::default()).unwrap();
        assert_eq!(second.rows_read, 2);
        assert_eq!(second.rows_written, 2);
        assert_eq!(fs::read(&config.xrefs_path).unwrap(), written);

        let table = read_table(&config.xrefs_path).unwrap();
        assert_eq!(table.rows[0][0], "#db");
        assert!(table.comments.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_rewrite_keeps_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, config) = setup(UNSORTED);
        fs::set_permissions(&config.xrefs_path, fs::Permissions::from_mode(0o644)).unwrap();
        normalize_table(&config, NormalizeOptions::default()).unwrap();
        let mode = fs::metadata(&config.xrefs_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_comments_dropped_by_default() {
        let (_dir, config) = setup(UNSORTED);
        normalize_table(&config, NormalizeOptions::default()).unwrap();
        let content = fs::read_to_string(&config.xrefs_path).unwrap();
        assert!(content.starts_with(HEADER));
        assert!(!content.contains("# curated xrefs"));
    }

    #[test]
    fn test_comments_kept_when_requested() {
        let (_dir, config) = setup(UNSORTED);
        let options = NormalizeOptions {
            keep_comments: true,
        };
        normalize_table(&config, options).unwrap();
        let content = fs::read_to_string(&config.xrefs_path).unwrap();
        assert!(content.starts_with("# curated xrefs\n"));
        assert_eq!(read_table(&config.xrefs_path).unwrap().len(), 5);
    }

    #[test]
    fn test_write_leaves_no_temporary_files() {
        let (dir, config) = setup(UNSORTED);
        normalize_table(&config, NormalizeOptions::default()).unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_missing_file_propagates() {
        let dir = tempdir().unwrap();
        let config = Config::new().with_xrefs_path(dir.path().join("missing.tsv"));
        assert!(matches!(
            normalize_table(&config, NormalizeOptions::default()),
            Err(XrefError::FileAccess { .. })
        ));
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let table = Table::default();
        let path = dir.path().join("no").join("such").join("xrefs.tsv");
        assert!(matches!(
            write_table(&table, &path, NormalizeOptions::default()),
            Err(XrefError::FileAccess { .. })
        ));
    }

    #[test]
    fn test_sort_requires_key_columns() {
        let mut table = Table::new(vec!["source_id".into()]);
        assert!(matches!(
            sort_and_dedup(&mut table),
            Err(XrefError::Lookup(_))
        ));
    }
}
