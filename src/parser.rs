//! Inventory text parsing.
//!
//! The format is a plain comma separated file: one header line followed by
//! `id,name,size,quality` lines. There is no quoting or escaping, so a value
//! containing a comma makes its line unusable and that line is dropped.

use tracing::debug;

use crate::record::{Dataset, Record};

pub const DELIMITER: char = ',';
pub const FIELD_COUNT: usize = 4;

/// Parses raw inventory text into a dataset.
///
/// The first line is always treated as a header and skipped. Lines that do not
/// split into exactly four fields are dropped without error.
pub fn parse(raw_text: &str) -> Dataset {
    let mut dropped = 0;
    let records: Vec<Record> = raw_text
        .split('\n')
        .skip(1)
        .filter_map(|line| {
            let record = parse_line(line);
            if record.is_none() {
                dropped += 1;
            }
            record
        })
        .collect();

    debug!(
        "Parsed {} records, dropped {} malformed lines",
        records.len(),
        dropped
    );
    Dataset::new(records)
}

fn parse_line(line: &str) -> Option<Record> {
    let fields: Vec<&str> = line.split(DELIMITER).map(trim_field).collect();
    if fields.len() != FIELD_COUNT {
        return None;
    }
    Some(Record::new(fields[0], fields[1], fields[2], fields[3]))
}

// Byte order marks count as whitespace here.
fn trim_field(field: &str) -> &str {
    field.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVENTORY: &str = "id,name,size,quality\n\
        101, Violin ,4/4,Excellent\n\
        102,Viola,15.5,Good\n\
        103,Cello,3/4,Fair\n";

    #[test]
    fn parses_every_well_formed_line_in_order() {
        let ds = parse(INVENTORY);
        assert_eq!(ds.len(), 3);
        let ids: Vec<&str> = ds.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["101", "102", "103"]);
        assert_eq!(ds.records()[0].name, "Violin");
    }

    #[test]
    fn header_is_skipped_whatever_it_contains() {
        let ds = parse("1,Flute,C,Good\n2,Oboe,C,Fair");
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].name, "Oboe");
    }

    #[test]
    fn wrong_field_counts_drop_only_that_line() {
        let text = "h\n1,Violin,4/4,Good\n2,Viola,Good\n3,Cello,4/4,Fair,extra\n4,Bass,3/4,Poor";
        let ds = parse(text);
        let ids: Vec<&str> = ds.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1", "4"]);
    }

    #[test]
    fn embedded_delimiter_is_not_supported() {
        let ds = parse("h\n1,\"Violin, student\",4/4,Good");
        assert!(ds.is_empty());
    }

    #[test]
    fn crlf_and_blank_lines_are_tolerated() {
        let ds = parse("id,name,size,quality\r\n1,Harp,Concert,Good\r\n\r\n");
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].quality, "Good");
    }

    #[test]
    fn empty_input_yields_empty_dataset() {
        assert!(parse("").is_empty());
        assert!(parse("id,name,size,quality").is_empty());
    }

    #[test]
    fn byte_order_marks_are_trimmed() {
        let ds = parse("\u{feff}id,name,size,quality\n\u{feff}1,Violin,4/4,Good\u{feff}\n");
        assert_eq!(ds.records(), [Record::new("1", "Violin", "4/4", "Good")]);
    }

    #[test]
    fn empty_fields_are_kept() {
        let ds = parse("h\n,,,");
        assert_eq!(ds.records(), [Record::new("", "", "", "")]);
    }
}
