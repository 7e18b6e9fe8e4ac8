// =============================================================================
// PDF decoding
// =============================================================================
//
// Text of each page, in page order, via lopdf.  Page texts are returned
// separately; joining them is the caller's concern.
// =============================================================================

use tracing::debug;

use super::{DecodeError, DecodedDocument, DocumentKind};

fn malformed(reason: impl ToString) -> DecodeError {
    DecodeError::Malformed {
        kind: DocumentKind::Pdf,
        reason: reason.to_string(),
    }
}

pub(super) fn decode_pdf(bytes: &[u8]) -> Result<DecodedDocument, DecodeError> {
    let document = lopdf::Document::load_mem(bytes).map_err(malformed)?;

    let pages = document.get_pages();
    debug!(pages = pages.len(), "PDF loaded");

    let mut texts = Vec::with_capacity(pages.len());
    for &number in pages.keys() {
        let text = document
            .extract_text(&[number])
            .map_err(|e| malformed(format!("page {number}: {e}")))?;
        texts.push(text);
    }

    Ok(DecodedDocument::Pages(texts))
}
