// =============================================================================
// Built-in document decoder
// =============================================================================
//
// Dispatches on document kind:
//   .xlsx / .xls  calamine workbook, first sheet
//   .csv          csv reader
//   .docx         zip + document.xml
//   .pdf          lopdf page text
//   .txt          UTF-8 text
// =============================================================================

use std::path::Path;

use super::{pdf, spreadsheet, word};
use super::{DecodeError, DecodedDocument, DocumentDecoder, DocumentKind};

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinDecoder;

fn decode_text(bytes: &[u8]) -> Result<DecodedDocument, DecodeError> {
    String::from_utf8(bytes.to_vec())
        .map(DecodedDocument::Text)
        .map_err(|e| DecodeError::Malformed {
            kind: DocumentKind::PlainText,
            reason: e.to_string(),
        })
}

impl DocumentDecoder for BuiltinDecoder {
    fn decode(&self, kind: DocumentKind, filename: &str, bytes: &[u8]) -> Result<DecodedDocument, DecodeError> {
        let is_csv = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

        match kind {
            DocumentKind::Spreadsheet if is_csv => spreadsheet::decode_csv(bytes),
            DocumentKind::Spreadsheet => spreadsheet::decode_workbook(bytes),
            DocumentKind::Pdf => pdf::decode_pdf(bytes),
            DocumentKind::WordProcessor => word::decode_docx(bytes),
            DocumentKind::PlainText => decode_text(bytes),
        }
    }
}
