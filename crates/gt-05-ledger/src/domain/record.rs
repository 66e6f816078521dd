//! # Ledger Records
//!
//! Delimited text, one record per row. The first row is a header and is
//! always skipped; blank lines are ignored. Fields may be wrapped in double
//! quotes (a doubled quote inside stands for one quote) and are trimmed. A
//! quoted field may span lines; its row is numbered by the line it starts on.

use super::layout::{LedgerLayout, MagnitudeFormat};
use crate::errors::LedgerParseError;
use gt_01_numeric::{parse_base_units, to_base_units};
use shared_types::{Address, U256};

/// One ledger row resolved to where the money goes and how much.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    /// 1-based line number in the source text.
    pub line: usize,
    /// Address the amount is attributed to, for layouts with a source column.
    pub source: Option<Address>,
    /// Address that is paid.
    pub destination: Address,
    /// Amount in base units.
    pub magnitude: U256,
}

impl LedgerRecord {
    /// Record without a source, for building ledgers by hand.
    pub fn new(destination: Address, magnitude: U256) -> Self {
        Self {
            line: 0,
            source: None,
            destination,
            magnitude,
        }
    }
}

/// Parse a whole ledger. Fails on the first malformed row.
pub fn parse_ledger(text: &str, layout: &LedgerLayout) -> Result<Vec<LedgerRecord>, LedgerParseError> {
    let mut records = Vec::new();
    for (line, raw) in rows(text).into_iter().skip(1) {
        if raw.trim().is_empty() {
            continue;
        }
        records.push(parse_record(line, &raw, layout)?);
    }
    Ok(records)
}

/// Join physical lines into rows while a quoted field is still open.
///
/// Yields `(first line number, row text)`. An unterminated quote swallows
/// the rest of the text and is reported by [`split_fields`].
fn rows(text: &str) -> Vec<(usize, String)> {
    let mut rows = Vec::new();
    let mut open: Option<(usize, String)> = None;
    for (index, raw) in text.lines().enumerate() {
        let (line, row) = match open.take() {
            Some((line, mut row)) => {
                row.push('\n');
                row.push_str(raw);
                (line, row)
            }
            None => (index + 1, raw.to_string()),
        };
        // Doubled quotes come in pairs, so an odd count means a field is open.
        if row.matches('"').count() % 2 == 1 {
            open = Some((line, row));
        } else {
            rows.push((line, row));
        }
    }
    rows.extend(open);
    rows
}

/// Parse one data row found on `line`.
pub fn parse_record(line: usize, raw: &str, layout: &LedgerLayout) -> Result<LedgerRecord, LedgerParseError> {
    let fields = split_fields(raw, layout.delimiter)
        .ok_or_else(|| LedgerParseError::malformed(line, "unterminated quoted field"))?;
    if fields.len() < layout.min_fields() {
        return Err(LedgerParseError::malformed(
            line,
            format!("expected at least {} fields, found {}", layout.min_fields(), fields.len()),
        ));
    }

    let address = |column: usize| -> Result<Address, LedgerParseError> {
        let text = &fields[column];
        text.parse()
            .map_err(|_| LedgerParseError::malformed(line, format!("column {column}: invalid address {text:?}")))
    };

    let destination = address(layout.destination)?;
    let source = layout.source.map(address).transpose()?;

    let text = &fields[layout.magnitude];
    let magnitude = match layout.format {
        MagnitudeFormat::Integer => parse_base_units(text),
        MagnitudeFormat::Decimal => to_base_units(text),
    }
    .map_err(|e| LedgerParseError::malformed(line, format!("column {}: {e}", layout.magnitude)))?;

    Ok(LedgerRecord {
        line,
        source,
        destination,
        magnitude,
    })
}

/// Split a row on `delimiter`, honouring double quotes.
///
/// Returns `None` if a quoted field is never closed.
pub(crate) fn split_fields(raw: &str, delimiter: char) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            c => current.push(c),
        }
    }
    if in_quotes {
        return None;
    }
    fields.push(current.trim().to_string());
    Some(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    const V1: &str = "0x44b39830a0215a0904137c4474927dcfd049acbb";
    const V2: &str = "0xdc9e2ea9c16c75e22b1aa904d6c94ca70d0c57f3";

    #[test]
    fn test_validator_rows() {
        let text = format!("address,name,reward\n{V1},alpha, 100 \n\n{V2},beta,50\n");
        let records = parse_ledger(&text, &LedgerLayout::VALIDATOR_PAYOUT).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].destination, V1.parse().unwrap());
        assert_eq!(records[0].magnitude, U256::from(100u64));
        assert_eq!(records[1].line, 4);
        assert_eq!(records[1].source, None);
    }

    #[test]
    fn test_voter_rows_carry_source() {
        let text = format!("epoch,validator,voter,coins,reward\n7,{V1},{V2},0.5,500000000000000000\n");
        let records = parse_ledger(&text, &LedgerLayout::VOTER_PAYOUT).unwrap();
        assert_eq!(records[0].source, Some(V1.parse().unwrap()));
        assert_eq!(records[0].destination, V2.parse().unwrap());

        let decimal = parse_ledger(&text, &LedgerLayout::VOTER_PAYOUT_DECIMAL).unwrap();
        assert_eq!(decimal[0].magnitude, records[0].magnitude);
    }

    #[test]
    fn test_decimal_column_accepts_scientific_notation() {
        let text = format!("h,validator,voter,coins\n1,{V1},{V2},4.28E-05\n");
        let records = parse_ledger(&text, &LedgerLayout::VOTER_PAYOUT_DECIMAL).unwrap();
        assert_eq!(records[0].magnitude, U256::from(42_800_000_000_000u64));
    }

    #[test]
    fn test_header_only_is_empty() {
        assert!(parse_ledger("address,name,reward\n", &LedgerLayout::VALIDATOR_PAYOUT)
            .unwrap()
            .is_empty());
        assert!(parse_ledger("", &LedgerLayout::VALIDATOR_PAYOUT).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_rows_name_the_line() {
        let layout = LedgerLayout::VALIDATOR_PAYOUT;
        let cases = [
            format!("h\n{V1},a,-5\n"),
            format!("h\n{V1},a,1.5\n"),
            format!("h\n{V1},a,lots\n"),
            "h\n0x1234,a,5\n".to_string(),
            format!("h\n{V1},a\n"),
            format!("h\n\"{V1},a,5\n"),
        ];
        for text in cases {
            match parse_ledger(&text, &layout) {
                Err(LedgerParseError::MalformedRecord { line: 2, .. }) => {}
                other => panic!("{text:?} gave {other:?}"),
            }
        }
    }

    #[test]
    fn test_bad_row_aborts_whole_file() {
        let text = format!("h\n{V1},a,1\n{V2},b,x\n{V1},c,2\n");
        assert!(parse_ledger(&text, &LedgerLayout::VALIDATOR_PAYOUT).is_err());
    }

    #[test]
    fn test_quoted_field_spans_lines() {
        let text = format!(
            "address,\"display\nname\",reward\n{V1},\"alpha\nstaking, \"\"east\"\"\",100\n{V2},beta,50\n"
        );
        let records = parse_ledger(&text, &LedgerLayout::VALIDATOR_PAYOUT).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 3);
        assert_eq!(records[0].magnitude, U256::from(100u64));
        assert_eq!(records[1].destination, V2.parse().unwrap());
        assert_eq!(records[1].line, 5);
        assert_eq!(
            split_fields(&rows(&text)[1].1, ',').unwrap()[1],
            "alpha\nstaking, \"east\""
        );
    }

    #[test]
    fn test_split_fields_quotes() {
        assert_eq!(
            split_fields(r#"a, "b,c" ,"say ""hi""""#, ',').unwrap(),
            vec!["a", "b,c", r#"say "hi""#]
        );
        assert_eq!(split_fields("a;b", ';').unwrap(), vec!["a", "b"]);
        assert!(split_fields(r#"a,"b"#, ',').is_none());
    }
}
