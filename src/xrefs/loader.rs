use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

use super::tsv::{is_comment, split_record, RecordError};
use super::types::{Table, XREFS_COLUMNS};
use super::TARGET_XREFS;
use crate::config::Config;
use crate::error::{Result, XrefError};

/// Reads `xrefs.tsv` from the configured location.
pub fn load_table(config: &Config) -> Result<Table> {
    read_table(&config.xrefs_path)
}

/// Reads an xrefs table from `path`.
///
/// Lines starting with `#` and blank lines are skipped; the first remaining
/// line must be the `xrefs.tsv` header. Every cell is kept as text.
pub fn read_table(path: &Path) -> Result<Table> {
    info!(target: TARGET_XREFS, "reading xrefs from {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::InvalidData => XrefError::parse(path, 0, "file is not valid UTF-8"),
        _ => XrefError::file_access(path, e),
    })?;
    let table = parse_table(&content, path)?;
    debug!(target: TARGET_XREFS, "loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Parses tab-delimited text. `path` only labels errors.
pub fn parse_table(content: &str, path: &Path) -> Result<Table> {
    let mut table = Table::default();
    let mut header_seen = false;
    let mut lines = content.lines().enumerate();

    while let Some((index, line)) = lines.next() {
        let line_no = index + 1;
        if is_comment(line) {
            table.comments.push(line.to_string());
            continue;
        }
        if line.is_empty() {
            continue;
        }

        let cells = split_continued(line, &mut lines)
            .map_err(|e| XrefError::parse(path, line_no, e.to_string()))?;

        if !header_seen {
            if cells != XREFS_COLUMNS {
                return Err(XrefError::parse(
                    path,
                    line_no,
                    format!(
                        "expected header '{}', found '{}'",
                        XREFS_COLUMNS.join("\t"),
                        cells.join("\t")
                    ),
                ));
            }
            table.header = cells;
            header_seen = true;
            continue;
        }

        table.rows.push(pad_row(cells, table.header.len(), path, line_no)?);
    }

    if !header_seen {
        return Err(XrefError::parse(path, 0, "missing header row"));
    }

    Ok(table)
}

/// Splits `line`, pulling in following lines while a quoted field is still open.
fn split_continued<'a, I>(line: &str, rest: &mut I) -> std::result::Result<Vec<String>, RecordError>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut record = line.to_string();
    loop {
        match split_record(&record) {
            Err(RecordError::Unterminated) => match rest.next() {
                Some((_, next)) => {
                    record.push('\n');
                    record.push_str(next);
                }
                None => return Err(RecordError::Unterminated),
            },
            other => return other,
        }
    }
}

// Short rows are padded with empty cells, long rows are rejected.
fn pad_row(mut cells: Vec<String>, width: usize, path: &Path, line_no: usize) -> Result<Vec<String>> {
    if cells.len() > width {
        return Err(XrefError::parse(
            path,
            line_no,
            format!("expected {} fields, saw {}", width, cells.len()),
        ));
    }
    cells.resize(width, String::new());
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const HEADER: &str = "source_db\tsource_id\tsource_name\tmodulation\ttarget_type\ttarget_db\ttarget_id\ttarget_name";

    fn parse(content: &str) -> Result<Table> {
        parse_table(content, &PathBuf::from("xrefs.tsv"))
    }

    #[test]
    fn test_comment_lines_are_skipped() {
        let content = format!(
            "# maintained by hand\n{}\nchebi\t15365\taspirin\tinhibits\tprotein\thgnc\t9604\tPTGS1\n\
             chebi\t15365\taspirin\tinhibits\tprotein\thgnc\t9605\tPTGS2\n",
            HEADER
        );
        let table = parse(&content).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.comments, vec!["# maintained by hand"]);
        assert_eq!(table.rows[1][7], "PTGS2");
    }

    #[test]
    fn test_cells_stay_text() {
        let content = format!("{}\nchebi\t007\tx\tup\tgene\thgnc\t00042\t1e5\n", HEADER);
        let table = parse(&content).unwrap();
        let xref = table.xrefs().next().unwrap();
        assert_eq!(xref.source_id, "007");
        assert_eq!(xref.target_id, "00042");
        assert_eq!(xref.target_name, "1e5");
    }

    #[test]
    fn test_short_rows_are_padded() {
        let content = format!("{}\nchebi\t1\tname\n", HEADER);
        let table = parse(&content).unwrap();
        assert_eq!(table.rows[0].len(), 8);
        assert_eq!(table.rows[0][7], "");
    }

    #[test]
    fn test_long_rows_are_rejected() {
        let content = format!("{}\na\tb\tc\td\te\tf\tg\th\ti\n", HEADER);
        match parse(&content) {
            Err(XrefError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_header_mismatch() {
        assert!(matches!(
            parse("source_db\tsource_id\n"),
            Err(XrefError::Parse { .. })
        ));
        assert!(matches!(parse("# only a comment\n"), Err(XrefError::Parse { .. })));
    }

    #[test]
    fn test_quoted_field_spanning_lines() {
        let content = format!("{}\nchebi\t1\t\"two\nlines\"\tup\tgene\thgnc\t2\tg\n", HEADER);
        let table = parse(&content).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0][2], "two\nlines");
    }

    #[test]
    fn test_crlf_input() {
        let content = format!("{}\r\nchebi\t1\tn\tup\tgene\thgnc\t2\tg\r\n", HEADER);
        let table = parse(&content).unwrap();
        assert_eq!(table.rows[0][7], "g");
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("xrefs.tsv");
        let mut bytes = format!("{}\nchebi\t1\t", HEADER).into_bytes();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        std::fs::write(&path, bytes).unwrap();
        assert!(matches!(
            read_table(&path),
            Err(XrefError::Parse { line: 0, .. })
        ));
    }

    #[test]
    fn test_missing_file_is_file_access_error() {
        let dir = tempdir().unwrap();
        let config = Config::new().with_xrefs_path(dir.path().join("absent.tsv"));
        assert!(matches!(
            load_table(&config),
            Err(XrefError::FileAccess { .. })
        ));
    }
}
