//! RowParser - header-driven survey CSV reader
//!
//! The survey export has one header line holding the question texts and one
//! line per answer. The parser locates the name, birth and parents columns
//! through [`ColumnMarkers`] and turns every data line into a
//! [`PersonRecord`].
//!
//! Splitting is a plain comma split: commas inside quoted answers are not
//! supported. Malformed rows are skipped and reported as [`RowWarning`]s;
//! only a missing column is fatal.

use crate::config::ColumnMarkers;
use crate::date::BirthDate;
use crate::error::{ColumnField, ParseError, Result};
use crate::record::{PersonRecord, RowWarning, RowWarningKind};
use serde::Serialize;
use tracing::{debug, warn};

/// Byte-order mark some spreadsheet tools prepend to UTF-8 exports.
const BOM: char = '\u{feff}';

/// Value meaning "not given" in optional columns.
const ABSENT: &str = "-";

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// Zero-based positions of the required columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnLayout {
    pub name: usize,
    pub birth: usize,
    pub parents: usize,
}

impl ColumnLayout {
    /// Number of fields a row needs so that every required column exists.
    pub fn min_fields(&self) -> usize {
        self.name.max(self.birth).max(self.parents) + 1
    }

    fn set(&mut self, field: ColumnField, index: usize) {
        match field {
            ColumnField::Name => self.name = index,
            ColumnField::Birth => self.birth = index,
            ColumnField::Parents => self.parents = index,
        }
    }
}

/// Output of a successful parse.
#[derive(Debug, Clone)]
pub struct ParsedRows {
    pub layout: ColumnLayout,
    pub records: Vec<PersonRecord>,
    pub warnings: Vec<RowWarning>,
}

// ─────────────────────────────────────────────────────────────────────────────
// RowParser
// ─────────────────────────────────────────────────────────────────────────────

/// Reads survey CSV text into typed records.
#[derive(Debug, Clone, Default)]
pub struct RowParser {
    markers: ColumnMarkers,
}

impl RowParser {
    pub fn new(markers: ColumnMarkers) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &ColumnMarkers {
        &self.markers
    }

    /// Parses a whole CSV document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::HeaderNotFound`] when the header line has no
    /// column for one of the markers. Nothing is parsed in that case.
    pub fn parse(&self, text: &str) -> Result<ParsedRows> {
        let text = text.strip_prefix(BOM).unwrap_or(text);
        let mut lines = text.lines().enumerate();

        let header: Vec<String> = lines
            .next()
            .map(|(_, line)| line.split(',').map(|h| clean_field(h).to_lowercase()).collect())
            .unwrap_or_default();

        let layout = self.resolve_layout(&header)?;
        debug!(
            "column layout: name={} birth={} parents={}",
            layout.name, layout.birth, layout.parents
        );

        let mut records = Vec::new();
        let mut warnings = Vec::new();

        for (index, line) in lines {
            let line_no = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            match self.parse_row(line_no, line, &layout) {
                Ok((record, birth_warning)) => {
                    warnings.extend(birth_warning);
                    records.push(record);
                }
                Err(warning) => {
                    warn!("skipping row: {}", warning);
                    warnings.push(warning);
                }
            }
        }

        debug!(
            "parsed {} records ({} warnings)",
            records.len(),
            warnings.len()
        );

        Ok(ParsedRows {
            layout,
            records,
            warnings,
        })
    }

    /// Locates each marker's column.
    ///
    /// Longer markers are resolved first and a claimed column is not offered
    /// again, so "who are you" cannot take the "who are your parents" column.
    fn resolve_layout(&self, header: &[String]) -> Result<ColumnLayout> {
        let mut order = self.markers.fields();
        order.sort_by(|a, b| b.1.chars().count().cmp(&a.1.chars().count()));

        let mut layout = ColumnLayout {
            name: 0,
            birth: 0,
            parents: 0,
        };
        let mut claimed: Vec<usize> = Vec::with_capacity(order.len());

        for (field, marker) in order {
            let needle = marker.trim().to_lowercase();
            let index = header
                .iter()
                .enumerate()
                .find(|(i, h)| !claimed.contains(i) && h.contains(&needle))
                .map(|(i, _)| i)
                .ok_or_else(|| ParseError::header_not_found(field, marker))?;

            claimed.push(index);
            layout.set(field, index);
        }

        Ok(layout)
    }

    /// Reads one data line. A birth field that is present but unreadable is
    /// kept as raw text and reported alongside the record.
    fn parse_row(
        &self,
        line_no: usize,
        line: &str,
        layout: &ColumnLayout,
    ) -> std::result::Result<(PersonRecord, Option<RowWarning>), RowWarning> {
        let fields: Vec<&str> = line.split(',').map(clean_field).collect();

        let expected = layout.min_fields();
        if fields.len() < expected {
            return Err(RowWarning {
                line: line_no,
                kind: RowWarningKind::TooFewFields {
                    expected,
                    found: fields.len(),
                },
            });
        }

        let name = fields[layout.name];
        if name.is_empty() {
            return Err(RowWarning {
                line: line_no,
                kind: RowWarningKind::EmptyName,
            });
        }

        let raw_birth = Some(fields[layout.birth])
            .filter(|b| !b.is_empty() && *b != ABSENT)
            .map(str::to_string);

        let birth_warning = raw_birth
            .as_deref()
            .filter(|raw| BirthDate::parse(raw).is_none())
            .map(|raw| RowWarning {
                line: line_no,
                kind: RowWarningKind::UnparsedBirthDate {
                    raw: raw.to_string(),
                },
            });

        let record = PersonRecord::new(line_no, name, raw_birth, fields[layout.parents]);
        Ok((record, birth_warning))
    }
}

/// Trims a field and removes one pair of surrounding double quotes.
fn clean_field(field: &str) -> &str {
    let trimmed = field.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .map(str::trim)
        .unwrap_or(trimmed)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Who are you,When were you born,Who are your parents";

    fn parse(text: &str) -> Result<ParsedRows> {
        RowParser::new(ColumnMarkers::default()).parse(text)
    }

    #[test]
    fn test_parse_basic_rows() {
        let text = format!("{HEADER}\nAlice,1950,-\nBob,1980,Alice\n");
        let parsed = parse(&text).unwrap();

        assert_eq!(parsed.records.len(), 2);
        assert!(parsed.warnings.is_empty());

        let alice = &parsed.records[0];
        assert_eq!(alice.line, 2);
        assert_eq!(alice.raw_name, "Alice");
        assert_eq!(alice.raw_birth.as_deref(), Some("1950"));
        assert_eq!(alice.raw_parents, "-");

        assert_eq!(parsed.records[1].raw_parents, "Alice");
    }

    #[test]
    fn test_header_only_yields_no_records() {
        let parsed = parse(HEADER).unwrap();
        assert!(parsed.records.is_empty());
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let err = parse("Who are you,When were you born\nAlice,1950").unwrap_err();
        match err {
            ParseError::HeaderNotFound { field, marker } => {
                assert_eq!(field, ColumnField::Parents);
                assert_eq!(marker, "who are your parents");
            }
        }
    }

    #[test]
    fn test_empty_document_is_fatal() {
        assert!(parse("").is_err());
    }

    #[test]
    fn test_header_discovery_ignores_order_and_extra_columns() {
        let text = "Timestamp,Who are your parents?,Who are you?,When were you born?\n\
                    2024-01-01,Alice,Bob,1980\n";
        let parsed = parse(text).unwrap();

        assert_eq!(
            parsed.layout,
            ColumnLayout {
                name: 2,
                birth: 3,
                parents: 1
            }
        );
        assert_eq!(parsed.records[0].raw_name, "Bob");
        assert_eq!(parsed.records[0].raw_parents, "Alice");
    }

    #[test]
    fn test_danish_markers() {
        let text = "Tidsstempel,Hvem er I?,Hvornår er du født?,Hvem er dine forældre?\n\
                    1/1/2024,Karen og Tomas,1/9/1953,Niels Peter og Dorthea\n";
        let parsed = RowParser::new(ColumnMarkers::danish()).parse(text).unwrap();

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].raw_name, "Karen og Tomas");
        assert_eq!(parsed.records[0].raw_birth.as_deref(), Some("1/9/1953"));
    }

    #[test]
    fn test_short_row_is_skipped_with_warning() {
        let text = format!("{HEADER}\nAlice,1950,-\nBroken\nBob,1980,Alice\n");
        let parsed = parse(&text).unwrap();

        assert_eq!(parsed.records.len(), 2);
        assert_eq!(
            parsed.warnings,
            vec![RowWarning {
                line: 3,
                kind: RowWarningKind::TooFewFields {
                    expected: 3,
                    found: 1
                },
            }]
        );
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        let text = format!("{HEADER}\r\nAlice,1950,-\r\n\r\n   \n");
        let parsed = parse(&text).unwrap();

        assert_eq!(parsed.records.len(), 1);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_empty_name_is_skipped() {
        let text = format!("{HEADER}\n ,1950,-\n");
        let parsed = parse(&text).unwrap();

        assert!(parsed.records.is_empty());
        assert_eq!(parsed.warnings[0].kind, RowWarningKind::EmptyName);
    }

    #[test]
    fn test_unreadable_birth_keeps_row() {
        let text = format!("{HEADER}\nAlice,the fifties,-\nBob,-,Alice\n");
        let parsed = parse(&text).unwrap();

        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].raw_birth.as_deref(), Some("the fifties"));
        assert_eq!(parsed.records[1].raw_birth, None);
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].line, 2);
    }

    #[test]
    fn test_quotes_and_bom_are_stripped() {
        let text = format!("\u{feff}{HEADER}\n\"Alice\", \"1950\" ,\"-\"\n");
        let parsed = parse(&text).unwrap();

        assert_eq!(parsed.records[0].raw_name, "Alice");
        assert_eq!(parsed.records[0].raw_birth.as_deref(), Some("1950"));
    }
}
