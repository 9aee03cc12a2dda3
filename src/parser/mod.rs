//! Lenient delimited-text parser for vendor product feeds.
//!
//! The feed this tool ingests does not follow strict CSV rules: quoted
//! description fields embed literal newlines and semicolons, quoting is
//! sometimes unbalanced, and rows can be ragged relative to the header. A
//! strict CSV engine rejects such input, so parsing is a hand-rolled state
//! machine that degrades by literal-izing unexpected characters instead of
//! raising.
//!
//! Guarantees:
//!
//! - A quote character toggles the "inside quoted field" state.
//! - A doubled quote inside a quoted field emits one literal quote.
//! - Delimiters and newlines inside a quoted field are literal content.
//! - Zero-length lines are dropped, never emitted as empty rows.
//! - End of input inside an open quote is not an error; the buffered row is
//!   flushed as-is.
//! - After [`parse_feed`], every row has exactly as many fields as the
//!   header. Short rows are right-padded; overflowing rows have their excess
//!   fields delimiter-joined back into the last column (which preserves
//!   semicolons that appeared inside unquoted description text).

use crate::error::{CsvError, CsvResult};

/// Field delimiter used by the vendor feed.
pub const DEFAULT_DELIMITER: char = ';';

/// Quote character used by the vendor feed.
pub const QUOTE: char = '"';

// =============================================================================
// Feed table
// =============================================================================

/// A tokenized feed: header plus rows reconciled to the header's width.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedTable {
    /// Raw column names from the first line, in feed order.
    pub headers: Vec<String>,
    /// Data rows; every row has exactly `headers.len()` fields.
    pub rows: Vec<Vec<String>>,
}

impl FeedTable {
    /// Field count every row is reconciled to.
    pub fn expected_cols(&self) -> usize {
        self.headers.len()
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode raw feed bytes using a single declared encoding.
///
/// Undecodable byte sequences are replaced, never fatal: a feed with a few
/// mangled characters still parses.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()
        }
        _ => String::from_utf8_lossy(bytes).to_string(),
    }
}

// =============================================================================
// Tokenizer
// =============================================================================

/// Tokenize raw text into rows of raw field strings.
///
/// Scans character by character, honoring the quoting semantics documented at
/// the module level. Never fails: malformed quoting degrades to literal
/// content.
pub fn tokenize(text: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    // Doubled quote: one literal quote, state unchanged.
                    field.push(QUOTE);
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else if c == QUOTE {
            in_quotes = true;
        } else if c == delimiter {
            row.push(std::mem::take(&mut field));
        } else if c == '\n' {
            if field.ends_with('\r') {
                field.pop();
            }
            row.push(std::mem::take(&mut field));
            // Empty trailing lines are dropped, not emitted as empty rows.
            if row.len() == 1 && row[0].is_empty() {
                row.clear();
            } else {
                rows.push(std::mem::take(&mut row));
            }
        } else {
            field.push(c);
        }
    }

    // Lenient EOF: flush whatever accumulated, even with an unclosed quote.
    if !in_quotes && field.ends_with('\r') {
        field.pop();
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

// =============================================================================
// Row reconciliation
// =============================================================================

/// Adapt a raw row to the header's field count.
///
/// Short rows are right-padded with empty strings. Overflowing rows keep
/// their first `expected - 1` fields verbatim and delimiter-join everything
/// from index `expected - 1` onward into the final field, so delimiters that
/// appeared inside an unquoted description survive as literal text.
pub fn reconcile_row(mut row: Vec<String>, expected: usize, delimiter: char) -> Vec<String> {
    use std::cmp::Ordering;
    match row.len().cmp(&expected) {
        Ordering::Less => {
            row.resize(expected, String::new());
            row
        }
        Ordering::Greater => {
            let tail = row.split_off(expected.saturating_sub(1));
            row.push(tail.join(&delimiter.to_string()));
            row
        }
        Ordering::Equal => row,
    }
}

// =============================================================================
// Feed parsing
// =============================================================================

/// Parse a whole feed body: header line first, then the tokenized body.
///
/// The header line is isolated and consumed before the char-by-char body scan
/// begins — it is assumed delimiter-correct and free of embedded newlines, so
/// splitting on the first newline is safe even though the body is not
/// line-splittable.
///
/// # Errors
///
/// [`CsvError::EmptyFeed`] when the body has no content at all and
/// [`CsvError::NoHeaders`] when the header line yields no columns. These are
/// the only failure modes; data rows never error.
pub fn parse_feed(text: &str, delimiter: char) -> CsvResult<FeedTable> {
    if text.trim().is_empty() {
        return Err(CsvError::EmptyFeed);
    }

    let (header_line, body) = match text.find('\n') {
        Some(pos) => (&text[..pos], &text[pos + 1..]),
        None => (text, ""),
    };
    let header_line = header_line.trim_end_matches('\r');

    let headers = tokenize(header_line, delimiter)
        .into_iter()
        .next()
        .unwrap_or_default();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let expected = headers.len();
    let rows = tokenize(body, delimiter)
        .into_iter()
        .map(|row| reconcile_row(row, expected, delimiter))
        .collect();

    Ok(FeedTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_rows() {
        let rows = tokenize("a;b;c\n1;2;3", ';');
        assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]);
    }

    #[test]
    fn test_quoted_field_with_embedded_delimiter() {
        let rows = tokenize("\"x;y\";z", ';');
        assert_eq!(rows, vec![vec!["x;y", "z"]]);
    }

    #[test]
    fn test_quoted_field_with_embedded_newline() {
        let rows = tokenize("\"line one\nline two\";after", ';');
        assert_eq!(rows, vec![vec!["line one\nline two", "after"]]);
    }

    #[test]
    fn test_doubled_quote_escape() {
        let rows = tokenize("\"say \"\"hi\"\"\";x", ';');
        assert_eq!(rows, vec![vec!["say \"hi\"", "x"]]);
    }

    #[test]
    fn test_quoted_roundtrip_all_specials() {
        // Embedded delimiter, newline, and doubled-quote escape in one field.
        let rows = tokenize("\"a;b\nc \"\"d\"\"\";tail", ';');
        assert_eq!(rows, vec![vec!["a;b\nc \"d\"", "tail"]]);
    }

    #[test]
    fn test_unclosed_quote_at_eof_is_flushed() {
        let rows = tokenize("ok;fine\nid9;\"never closed", ';');
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["id9", "never closed"]);
    }

    #[test]
    fn test_empty_trailing_lines_dropped() {
        let rows = tokenize("a;b\n1;2\n\n\n", ';');
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_blank_line_between_rows_dropped() {
        let rows = tokenize("1;2\n\n3;4", ';');
        assert_eq!(rows, vec![vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn test_crlf_terminators() {
        let rows = tokenize("a;b\r\n1;2\r\n", ';');
        assert_eq!(rows, vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn test_newline_inside_quotes_is_literal_crlf_kept() {
        // Only unquoted \r\n is a terminator; quoted content is untouched.
        let rows = tokenize("\"a\r\nb\";x", ';');
        assert_eq!(rows, vec![vec!["a\r\nb", "x"]]);
    }

    #[test]
    fn test_trailing_delimiter_makes_empty_field() {
        let rows = tokenize("1;2;\n", ';');
        assert_eq!(rows, vec![vec!["1", "2", ""]]);
    }

    #[test]
    fn test_reconcile_identity() {
        let row = vec!["a".to_string(), "b".to_string()];
        assert_eq!(reconcile_row(row.clone(), 2, ';'), row);
    }

    #[test]
    fn test_reconcile_pads_short_row() {
        let row = vec!["a".to_string()];
        assert_eq!(reconcile_row(row, 3, ';'), vec!["a", "", ""]);
    }

    #[test]
    fn test_reconcile_merges_overflow_into_last_field() {
        let row: Vec<String> = ["id", "desc part", "extra", "more"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let out = reconcile_row(row, 2, ';');
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], "id");
        assert_eq!(out[1], "desc part;extra;more");
    }

    #[test]
    fn test_parse_feed_postcondition() {
        let feed = "artnr;produktnamn;beskrivning\nA1;Bike\nA2;Bench;padded;extra;cols\n";
        let table = parse_feed(feed, ';').unwrap();
        assert_eq!(table.expected_cols(), 3);
        for row in &table.rows {
            assert_eq!(row.len(), 3);
        }
        assert_eq!(table.rows[0][2], "");
        assert_eq!(table.rows[1][2], "padded;extra;cols");
    }

    #[test]
    fn test_parse_feed_quoted_header() {
        let table = parse_feed("\"artnr\";\"pris\"\nA1;10", ';').unwrap();
        assert_eq!(table.headers, vec!["artnr", "pris"]);
    }

    #[test]
    fn test_parse_feed_empty_input() {
        assert!(matches!(parse_feed("", ';'), Err(CsvError::EmptyFeed)));
        assert!(matches!(parse_feed("  \n ", ';'), Err(CsvError::EmptyFeed)));
    }

    #[test]
    fn test_decode_utf8_lossy() {
        let bytes = [b'a', 0xFF, b'b'];
        let decoded = decode_content(&bytes, "utf-8");
        assert!(decoded.starts_with('a'));
        assert!(decoded.ends_with('b'));
    }

    #[test]
    fn test_decode_latin1() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }
}
