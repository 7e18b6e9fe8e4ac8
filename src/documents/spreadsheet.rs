// =============================================================================
// Spreadsheet decoding (.xlsx / .xls / .csv)
// =============================================================================
//
// Workbooks are read with calamine, delimited files with the csv reader.  Both
// take the first row as column names and skip it, then emit every non-empty
// cell as text in column-major order.  Only the first worksheet is read.
// =============================================================================

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use super::{DecodeError, DecodedDocument, DocumentKind};

fn malformed(reason: impl ToString) -> DecodeError {
    DecodeError::Malformed {
        kind: DocumentKind::Spreadsheet,
        reason: reason.to_string(),
    }
}

/// Non-empty cells of `rows` (header row already removed), column by column.
fn column_major(rows: &[Vec<String>]) -> Vec<String> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut cells = Vec::new();
    for col in 0..width {
        for row in rows {
            if let Some(cell) = row.get(col) {
                if !cell.trim().is_empty() {
                    cells.push(cell.clone());
                }
            }
        }
    }
    cells
}

pub(super) fn decode_workbook(bytes: &[u8]) -> Result<DecodedDocument, DecodeError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(malformed)?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(malformed)?,
        None => return Ok(DecodedDocument::Cells(Vec::new())),
    };

    let rows: Vec<Vec<String>> = range
        .rows()
        .skip(1)
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect();

    Ok(DecodedDocument::Cells(column_major(&rows)))
}

pub(super) fn decode_csv(bytes: &[u8]) -> Result<DecodedDocument, DecodeError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(malformed)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(DecodedDocument::Cells(column_major(&rows)))
}
