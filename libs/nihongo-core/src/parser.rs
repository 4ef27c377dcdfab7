//! Line parser for bulk item entry.
//!
//! # Format
//! ```text
//! 私は学生です | I am a student | sentence | Basic self-introduction | JLPT N5, grammar
//! 本 | book | vocabulary | | JLPT N5, nouns
//! ```
//!
//! Fields are `content | english | type | notes | tags`; notes and tags are
//! optional and tags are comma separated. Lines with fewer than three fields
//! are skipped rather than reported.
//!
//! [`parse_csv`] reads the same records from a CSV file with a header row.

use crate::error::ImportError;
use crate::types::ImportRecord;
use serde::Deserialize;

const FIELD_SEPARATOR: char = '|';
const TAG_SEPARATOR: char = ',';

/// Columns a CSV import must have; `notes` and `tags` are optional.
pub const REQUIRED_CSV_COLUMNS: [&str; 3] = ["content", "english", "item_type"];

/// Parsed bulk line, keeping its position for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkLine {
    pub line_number: usize,
    pub record: ImportRecord,
}

/// Parse bulk-entry text into import records.
pub fn parse_bulk(content: &str) -> Vec<BulkLine> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            parse_line(line).map(|record| BulkLine {
                line_number: idx + 1,
                record,
            })
        })
        .collect()
}

fn parse_line(line: &str) -> Option<ImportRecord> {
    if line.trim().is_empty() {
        return None;
    }

    let parts: Vec<&str> = line.split(FIELD_SEPARATOR).map(str::trim).collect();
    if parts.len() < 3 {
        return None;
    }

    let notes = parts.get(3).copied().unwrap_or_default();
    let tags = parts
        .get(4)
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_tags(raw))
        .unwrap_or_default();

    Some(ImportRecord {
        content: Some(parts[0].to_string()),
        english: Some(parts[1].to_string()),
        item_type: Some(parts[2].to_string()),
        notes: Some(notes.to_string()),
        tags: Some(tags),
    })
}

fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(TAG_SEPARATOR)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvRow {
    content: Option<String>,
    english: Option<String>,
    item_type: Option<String>,
    notes: Option<String>,
    tags: Option<String>,
}

impl From<CsvRow> for ImportRecord {
    fn from(row: CsvRow) -> Self {
        Self {
            content: row.content,
            english: row.english,
            item_type: row.item_type,
            notes: row.notes,
            tags: row.tags.as_deref().map(parse_tags),
        }
    }
}

/// Parse a CSV export with a header row into import records.
///
/// Fails only when the header lacks a required column. Rows that cannot be
/// read are skipped; incomplete rows are left for
/// [`ImportRecord::validate`] to reject.
pub fn parse_csv(content: &str) -> Result<Vec<ImportRecord>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?;
    let missing: Vec<&'static str> = REQUIRED_CSV_COLUMNS
        .into_iter()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns(missing));
    }

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
        match row {
            Ok(row) => records.push(row.into()),
            Err(err) => tracing::debug!(row = index + 1, error = %err, "skipping unreadable csv row"),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_line() {
        let lines = parse_bulk("私は学生です | I am a student | sentence | Basic self-introduction | JLPT N5, grammar");
        assert_eq!(lines.len(), 1);
        let record = &lines[0].record;
        assert_eq!(record.content.as_deref(), Some("私は学生です"));
        assert_eq!(record.english.as_deref(), Some("I am a student"));
        assert_eq!(record.item_type.as_deref(), Some("sentence"));
        assert_eq!(record.notes.as_deref(), Some("Basic self-introduction"));
        assert_eq!(
            record.tags,
            Some(vec!["JLPT N5".to_string(), "grammar".to_string()])
        );
    }

    #[test]
    fn parse_empty_notes_keeps_tags() {
        let lines = parse_bulk("本 | book | vocabulary | | JLPT N5, nouns");
        let record = &lines[0].record;
        assert_eq!(record.notes.as_deref(), Some(""));
        assert_eq!(record.tags.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn parse_minimal_line() {
        let lines = parse_bulk("水 | water | kanji");
        let record = &lines[0].record;
        assert_eq!(record.notes.as_deref(), Some(""));
        assert_eq!(record.tags, Some(vec![]));
    }

    #[test]
    fn skip_short_and_blank_lines() {
        let input = "水 | water | kanji\n\nonly | two\n火 | fire | kanji";
        let lines = parse_bulk(input);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_number, 1);
        assert_eq!(lines[1].line_number, 4);
    }

    #[test]
    fn parse_empty_content() {
        assert!(parse_bulk("").is_empty());
    }

    #[test]
    fn csv_rows_become_records() {
        let input = "content,english,item_type,notes,tags\n\
                     本,book,vocabulary,,\"JLPT N5, nouns\"\n\
                     水,water,kanji,element,\n";
        let records = parse_csv(input).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].content.as_deref(), Some("本"));
        assert_eq!(records[0].notes, None);
        assert_eq!(
            records[0].tags,
            Some(vec!["JLPT N5".to_string(), "nouns".to_string()])
        );
        assert_eq!(records[1].notes.as_deref(), Some("element"));
        assert_eq!(records[1].tags, None);
    }

    #[test]
    fn csv_optional_columns_may_be_absent() {
        let records = parse_csv("item_type,english,content\nkanji,fire,火\n").unwrap();
        let item = records.into_iter().next().unwrap().validate().unwrap();
        assert_eq!(item.content, "火");
        assert!(item.tags.is_empty());
    }

    #[test]
    fn csv_short_rows_stay_incomplete() {
        let records = parse_csv("content,english,item_type\n本,book\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].item_type, None);
        assert!(records[0].clone().validate().is_none());
    }

    #[test]
    fn csv_missing_required_column() {
        let err = parse_csv("content,notes\n本,\n").unwrap_err();
        assert!(matches!(
            err,
            ImportError::MissingColumns(ref missing) if missing == &["english", "item_type"]
        ));
        assert_eq!(
            err.to_string(),
            "csv is missing required columns: english, item_type"
        );
    }
}
