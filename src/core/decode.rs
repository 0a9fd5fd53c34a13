use crate::domain::model::{InputRow, InputTable, TextEncoding};
use crate::utils::error::{ReportError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads an uploaded export into a text table.
///
/// The first attempt reads `;`-separated Latin-1 text. If that attempt fails the
/// file is read again as `,`-separated UTF-8. A `;` attempt that finds a single
/// column while the header line contains commas also counts as failed.
pub fn decode_table(bytes: &[u8]) -> Result<InputTable> {
    let latin1 = decode_latin1(bytes);
    let primary = parse_delimited(&latin1, b';', TextEncoding::Latin1).and_then(|table| {
        if table.column_count() == 1 && table.headers[0].contains(',') {
            Err(ReportError::DecodeError {
                message: "only one column found with ';' separator".to_string(),
            })
        } else {
            Ok(table)
        }
    });

    match primary {
        Ok(table) => Ok(table),
        Err(primary_err) => {
            tracing::info!(
                "Reading as ';'-separated Latin-1 failed ({}), retrying as ','-separated UTF-8",
                primary_err
            );
            let text = decode_utf8(bytes)?;
            parse_delimited(&text, b',', TextEncoding::Utf8).map_err(|e| ReportError::DecodeError {
                message: format!(
                    "neither ';' nor ',' separated reading worked (first: {}; second: {})",
                    primary_err, e
                ),
            })
        }
    }
}

/// Reads with a fixed delimiter. UTF-8 is used when the bytes are valid UTF-8,
/// Latin-1 otherwise.
pub fn decode_table_with_delimiter(bytes: &[u8], delimiter: u8) -> Result<InputTable> {
    match decode_utf8(bytes) {
        Ok(text) => parse_delimited(&text, delimiter, TextEncoding::Utf8),
        Err(_) => parse_delimited(&decode_latin1(bytes), delimiter, TextEncoding::Latin1),
    }
}

/// ISO-8859-1 maps every byte to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn decode_utf8(bytes: &[u8]) -> Result<String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8(bytes.to_vec()).map_err(|e| ReportError::DecodeError {
        message: format!("file is not valid UTF-8: {}", e),
    })
}

/// Cell texts read as missing values, the same set a dataframe reader uses.
const MISSING_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell)
}

fn parse_delimited(text: &str, delimiter: u8, encoding: TextEncoding) -> Result<InputTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(ReportError::DecodeError {
            message: "file has no header line".to_string(),
        });
    }

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        // A trailing delimiter on data lines adds empty fields past the header.
        if record.iter().skip(headers.len()).any(|cell| !cell.is_empty()) {
            return Err(ReportError::DecodeError {
                message: format!(
                    "expected {} fields in line {}, saw {}",
                    headers.len(),
                    index + 2,
                    record.len()
                ),
            });
        }
        let cells = record
            .iter()
            .take(headers.len())
            .map(|cell| (!is_missing(cell)).then(|| cell.to_string()))
            .collect();
        rows.push(InputRow::new(cells));
    }

    tracing::debug!(
        "Read {} rows with {} columns (delimiter '{}', {:?})",
        rows.len(),
        headers.len(),
        delimiter as char,
        encoding
    );

    Ok(InputTable {
        headers,
        rows,
        delimiter,
        encoding,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "A;B;C;D;E;F;G;H;I;J";

    #[test]
    fn test_semicolon_latin1() {
        let mut bytes = format!("{}\n1;2;3;P1;5;6;100,00;8;9;/FF/1001/x\n", HEADER).into_bytes();
        // "Müller" in Latin-1
        bytes.extend_from_slice(b"1;2;3;P2;5;6;50,00;8;M\xFCller;/FF/1001/x\n");

        let table = decode_table(&bytes).unwrap();

        assert_eq!(table.delimiter, b';');
        assert_eq!(table.encoding, TextEncoding::Latin1);
        assert_eq!(table.column_count(), 10);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].cell(8), Some("Müller"));
        assert_eq!(table.rows[0].cell(6), Some("100,00"));
    }

    #[test]
    fn test_empty_cells_and_short_rows_are_missing() {
        let text = format!("{}\n1;;3\n", HEADER);

        let table = decode_table(text.as_bytes()).unwrap();

        assert_eq!(table.rows[0].cell(0), Some("1"));
        assert_eq!(table.rows[0].cell(1), None);
        assert_eq!(table.rows[0].cell(9), None);
    }

    #[test]
    fn test_falls_back_to_comma_utf8_on_extra_fields() {
        let text = "A;B\n1;2;3\n";

        let table = decode_table(text.as_bytes()).unwrap();

        assert_eq!(table.delimiter, b',');
        assert_eq!(table.encoding, TextEncoding::Utf8);
        assert_eq!(table.column_count(), 1);
        assert_eq!(table.rows[0].cell(0), Some("1;2;3"));
    }

    #[test]
    fn test_falls_back_to_comma_for_single_column() {
        let text = "\u{feff}A,B,C,D,E,F,G,H,I,J\n1,2,3,P1,5,6,\"1.234,56\",8,Zürich,/FF/7/x\n";

        let table = decode_table(text.as_bytes()).unwrap();

        assert_eq!(table.delimiter, b',');
        assert_eq!(table.headers[0], "A");
        assert_eq!(table.rows[0].cell(6), Some("1.234,56"));
        assert_eq!(table.rows[0].cell(8), Some("Zürich"));
    }

    #[test]
    fn test_both_attempts_failing_is_surfaced() {
        // Too many fields for ';' and invalid UTF-8 for the ',' attempt.
        let bytes = b"A;B\n1;2;3\xFF\n";

        let err = decode_table(bytes).unwrap_err();
        assert!(matches!(err, ReportError::DecodeError { .. }));
    }

    #[test]
    fn test_trailing_semicolon_on_latin1_lines() {
        let mut bytes = format!("{}\n1;2;3;P1;5;6;100,00;8;9;/FF/1001/x/;\n", HEADER).into_bytes();
        bytes.extend_from_slice(b"1;2;3;P2;5;6;50,00;8;M\xFCller;/FF/1001/x/;\n");

        let table = decode_table(&bytes).unwrap();

        assert_eq!(table.delimiter, b';');
        assert_eq!(table.encoding, TextEncoding::Latin1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].cells.len(), 10);
        assert_eq!(table.rows[1].cell(8), Some("Müller"));
        assert_eq!(table.rows[1].cell(9), Some("/FF/1001/x/"));
    }

    #[test]
    fn test_non_empty_extra_field_still_fails_first_attempt() {
        let text = format!("{}\n1;2;3;P1;5;6;1,00;8;9;/FF/1/x/;extra\n", HEADER);

        let table = decode_table(text.as_bytes()).unwrap();
        assert_eq!(table.delimiter, b',');
    }

    #[test]
    fn test_missing_value_markers() {
        let text = format!("{}\nNA;N/A;null;#N/A;NaN;;7;none;NULL;x\n", HEADER);

        let table = decode_table(text.as_bytes()).unwrap();

        let row = &table.rows[0];
        for i in [0, 1, 2, 3, 4, 5, 8] {
            assert_eq!(row.cell(i), None, "cell {} should be missing", i);
        }
        assert_eq!(row.cell(6), Some("7"));
        assert_eq!(row.cell(7), Some("none"));
    }

    #[test]
    fn test_empty_file_is_an_error() {
        assert!(decode_table(b"").is_err());
    }

    #[test]
    fn test_header_only_gives_empty_table() {
        let table = decode_table(HEADER.as_bytes()).unwrap();
        assert_eq!(table.column_count(), 10);
        assert!(table.is_empty());
    }

    #[test]
    fn test_fixed_delimiter() {
        let text = "A\tB\n1\t2\n";
        let table = decode_table_with_delimiter(text.as_bytes(), b'\t').unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.encoding, TextEncoding::Utf8);
        assert_eq!(table.rows[0].cell(1), Some("2"));
    }
}
