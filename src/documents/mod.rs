// =============================================================================
// Document Ticker Extraction
// =============================================================================
//
// Uploaded portfolio documents are decoded into raw strings by a
// `DocumentDecoder`, and those strings are fed to the symbol extractor.  The
// decoding step is pluggable; only what happens to the decoded text is fixed:
//
//   Cells  (spreadsheet)   : extract per cell, merge keeping first occurrence
//   Pages  (PDF)           : concatenate page texts with no separator, extract
//   Text   (word processor): extract
//
// No decoding failure ever propagates: every error degrades to an empty
// candidate list plus a user-facing warning.
// =============================================================================

pub mod builtin;
mod pdf;
mod spreadsheet;
mod word;

use std::fmt;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::symbols::{extract_tickers, extract_tickers_from_fragments};

pub use builtin::BuiltinDecoder;

const NO_TICKERS_WARNING: &str = "No tickers found in the file. Please check the file content.";

/// Broad document family, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Spreadsheet,
    Pdf,
    WordProcessor,
    PlainText,
}

impl DocumentKind {
    /// Classify `filename` by its extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Result<Self, DecodeError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "xlsx" | "xls" | "csv" => Ok(Self::Spreadsheet),
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::WordProcessor),
            "txt" => Ok(Self::PlainText),
            _ => Err(DecodeError::Unsupported { extension }),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spreadsheet => write!(f, "Spreadsheet"),
            Self::Pdf => write!(f, "PDF"),
            Self::WordProcessor => write!(f, "Word"),
            Self::PlainText => write!(f, "Text"),
        }
    }
}

/// Raw strings produced by a decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedDocument {
    /// One string per non-empty spreadsheet cell.
    Cells(Vec<String>),
    /// Extracted text of each PDF page, in page order.
    Pages(Vec<String>),
    /// Paragraph text followed by every table-cell text.
    Text(String),
}

impl DecodedDocument {
    pub fn tickers(&self) -> Vec<String> {
        match self {
            Self::Cells(cells) => extract_tickers_from_fragments(cells),
            Self::Pages(pages) => extract_tickers(&pages.concat()),
            Self::Text(text) => extract_tickers(text),
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unsupported file format")]
    Unsupported { extension: String },

    #[error("Error reading {kind} file: {reason}")]
    Malformed { kind: DocumentKind, reason: String },
}

/// Turns document bytes into raw strings for the symbol extractor.
pub trait DocumentDecoder: Send + Sync {
    fn decode(&self, kind: DocumentKind, filename: &str, bytes: &[u8]) -> Result<DecodedDocument, DecodeError>;
}

/// Candidate symbols found in a document, plus a notice for the user when
/// nothing usable came out of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extraction {
    pub tickers: Vec<String>,
    pub warning: Option<String>,
}

impl Extraction {
    fn warn(message: impl Into<String>) -> Self {
        Self {
            tickers: Vec::new(),
            warning: Some(message.into()),
        }
    }
}

/// Decode `bytes` and extract candidate symbols.
pub fn extract_from_document(decoder: &dyn DocumentDecoder, filename: &str, bytes: &[u8]) -> Extraction {
    let decoded = DocumentKind::from_filename(filename).and_then(|kind| decoder.decode(kind, filename, bytes));

    let document = match decoded {
        Ok(document) => document,
        Err(e) => {
            warn!(filename, error = %e, "document could not be decoded");
            return Extraction::warn(e.to_string());
        }
    };

    let tickers = document.tickers();
    if tickers.is_empty() {
        return Extraction::warn(NO_TICKERS_WARNING);
    }

    info!(filename, count = tickers.len(), "tickers extracted from document");
    Extraction {
        tickers,
        warning: None,
    }
}
