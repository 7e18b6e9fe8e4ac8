// =============================================================================
// Word document decoding (.docx)
// =============================================================================
//
// A .docx file is a zip archive; the body lives in `word/document.xml`.
// Top-level paragraphs are joined with a space, then the text of every cell of
// every top-level table is appended, each preceded by a space.  A cell's text
// is its paragraphs joined by newlines.
// =============================================================================

use std::io::{Cursor, Read};

use roxmltree::Node;

use super::{DecodeError, DecodedDocument, DocumentKind};

const DOCUMENT_PART: &str = "word/document.xml";

fn malformed(reason: impl ToString) -> DecodeError {
    DecodeError::Malformed {
        kind: DocumentKind::WordProcessor,
        reason: reason.to_string(),
    }
}

fn children<'a, 'input>(node: Node<'a, 'input>, name: &'a str) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

/// Text of a `w:p`: run text in order, tabs and breaks kept.  Runs nested in
/// hyperlinks count; tab stops declared in paragraph properties do not.
fn paragraph_text(paragraph: Node) -> String {
    let mut text = String::new();
    let runs = paragraph
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "r");
    for run in runs {
        for node in run.children().filter(Node::is_element) {
            match node.tag_name().name() {
                "t" => text.push_str(node.text().unwrap_or_default()),
                "tab" => text.push('\t'),
                "br" | "cr" => text.push('\n'),
                _ => {}
            }
        }
    }
    text
}

fn cell_text(cell: Node) -> String {
    children(cell, "p").map(paragraph_text).collect::<Vec<_>>().join("\n")
}

fn body_text(xml: &str) -> Result<String, DecodeError> {
    let doc = roxmltree::Document::parse(xml).map_err(malformed)?;
    let body = children(doc.root_element(), "body")
        .next()
        .ok_or_else(|| malformed("document has no body"))?;

    let paragraphs: Vec<String> = children(body, "p").map(paragraph_text).collect();
    let mut text = paragraphs.join(" ");

    for table in children(body, "tbl") {
        for row in children(table, "tr") {
            for cell in children(row, "tc") {
                text.push(' ');
                text.push_str(&cell_text(cell));
            }
        }
    }
    Ok(text)
}

pub(super) fn decode_docx(bytes: &[u8]) -> Result<DecodedDocument, DecodeError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(malformed)?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(malformed)?
        .read_to_string(&mut xml)
        .map_err(malformed)?;

    body_text(&xml).map(DecodedDocument::Text)
}
