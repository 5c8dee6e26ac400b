//! Tab-delimited record codec.
//!
//! Fields are separated by a single tab. A field that starts with `"` is
//! quoted: it runs until the matching closing quote, and `""` inside it stands
//! for one literal quote. On output, only fields containing a tab, a quote or a
//! line break are quoted.

pub const DELIMITER: char = '\t';
pub const QUOTE: char = '"';
pub const COMMENT: char = '#';

/// Why a line could not be split into fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A quoted field reached the end of input. The record may continue on the next line.
    Unterminated,
    /// Something other than a delimiter followed a closing quote.
    TrailingAfterQuote(char),
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::Unterminated => write!(f, "unterminated quoted field"),
            RecordError::TrailingAfterQuote(c) => {
                write!(f, "unexpected '{}' after quoted field", c)
            }
        }
    }
}

/// Splits one record into its fields.
pub fn split_record(line: &str) -> Result<Vec<String>, RecordError> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        let mut field = String::new();

        if chars.peek() == Some(&QUOTE) {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                if c == QUOTE {
                    if chars.peek() == Some(&QUOTE) {
                        chars.next();
                        field.push(QUOTE);
                    } else {
                        closed = true;
                        break;
                    }
                } else {
                    field.push(c);
                }
            }
            if !closed {
                return Err(RecordError::Unterminated);
            }
            match chars.next() {
                None => {
                    fields.push(field);
                    return Ok(fields);
                }
                Some(DELIMITER) => fields.push(field),
                Some(c) => return Err(RecordError::TrailingAfterQuote(c)),
            }
        } else {
            loop {
                match chars.next() {
                    None => {
                        fields.push(field);
                        return Ok(fields);
                    }
                    Some(DELIMITER) => {
                        fields.push(field);
                        break;
                    }
                    Some(c) => field.push(c),
                }
            }
        }
    }
}

fn needs_quoting(field: &str) -> bool {
    field
        .chars()
        .any(|c| c == DELIMITER || c == QUOTE || c == '\n' || c == '\r')
}

/// Joins fields into one line, without the trailing newline.
pub fn join_record<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(DELIMITER);
        }
        let field = field.as_ref();
        // A leading '#' would turn the whole record into a comment line
        if needs_quoting(field) || (i == 0 && field.starts_with(COMMENT)) {
            line.push(QUOTE);
            line.push_str(&field.replace(QUOTE, "\"\""));
            line.push(QUOTE);
        } else {
            line.push_str(field);
        }
    }
    line
}

pub fn is_comment(line: &str) -> bool {
    line.starts_with(COMMENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain() {
        assert_eq!(
            split_record("chebi\t15365\taspirin").unwrap(),
            vec!["chebi", "15365", "aspirin"]
        );
        assert_eq!(split_record("a\t\tc").unwrap(), vec!["a", "", "c"]);
        assert_eq!(split_record("a\t").unwrap(), vec!["a", ""]);
        assert_eq!(split_record("").unwrap(), vec![""]);
    }

    #[test]
    fn test_split_quoted() {
        assert_eq!(
            split_record("\"a\tb\"\tc").unwrap(),
            vec!["a\tb", "c"]
        );
        assert_eq!(
            split_record("\"say \"\"hi\"\"\"\tx").unwrap(),
            vec!["say \"hi\"", "x"]
        );
        // A quote inside an unquoted field is literal
        assert_eq!(split_record("5\" disk\tx").unwrap(), vec!["5\" disk", "x"]);
    }

    #[test]
    fn test_split_malformed() {
        assert_eq!(split_record("\"open\tx"), Err(RecordError::Unterminated));
        assert_eq!(
            split_record("\"closed\"junk\tx"),
            Err(RecordError::TrailingAfterQuote('j'))
        );
        // Embedded line breaks survive once the record is complete
        assert_eq!(
            split_record("\"two\nlines\"\tx").unwrap(),
            vec!["two\nlines", "x"]
        );
    }

    #[test]
    fn test_join_quotes_only_when_needed() {
        assert_eq!(join_record(&["a", "b c", "007"]), "a\tb c\t007");
        assert_eq!(join_record(&["a\tb", "say \"hi\""]), "\"a\tb\"\t\"say \"\"hi\"\"\"");
        let line = join_record(&["x\ty", "q\"", "plain"]);
        assert_eq!(split_record(&line).unwrap(), vec!["x\ty", "q\"", "plain"]);
    }

    #[test]
    fn test_leading_hash_is_quoted() {
        let line = join_record(&["#db", "1", "#tag"]);
        assert_eq!(line, "\"#db\"\t1\t#tag");
        assert!(!is_comment(&line));
        assert_eq!(split_record(&line).unwrap(), vec!["#db", "1", "#tag"]);
    }

    #[test]
    fn test_is_comment() {
        assert!(is_comment("# curated by hand"));
        assert!(!is_comment("chebi\t#1"));
        assert!(!is_comment(" #indented"));
    }
}
