use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::types::DocxExtractor;
use super::ExtractionError;

/// Main document part inside every WordprocessingML package.
const DOCUMENT_PART: &str = "word/document.xml";

/// Upper bound on the decompressed main part, guards against zip bombs.
const MAX_DOCUMENT_XML_BYTES: u64 = 64 * 1024 * 1024;

/// DOCX text extractor: opens the OOXML zip container and walks
/// `word/document.xml`, emitting run text with paragraph breaks.
pub struct DocxTextExtractor;

impl DocxExtractor for DocxTextExtractor {
    fn extract_text(&self, docx_bytes: &[u8]) -> Result<String, ExtractionError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(docx_bytes))
            .map_err(|e| ExtractionError::DocxParsing(format!("not a DOCX container: {e}")))?;

        let part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| ExtractionError::DocxParsing(format!("missing {DOCUMENT_PART}: {e}")))?;

        let mut xml = String::new();
        part.take(MAX_DOCUMENT_XML_BYTES)
            .read_to_string(&mut xml)
            .map_err(|e| ExtractionError::DocxParsing(e.to_string()))?;

        document_xml_to_text(&xml)
    }
}

/// Flatten WordprocessingML into plain text.
/// `<w:t>` carries text, `<w:tab/>` and `<w:br/>` map to whitespace,
/// and every closed `<w:p>` ends a line.
fn document_xml_to_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::with_capacity(xml.len() / 4);
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_run = true;
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => out.push('\t'),
                b"br" | b"cr" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let text = t
                    .unescape()
                    .map_err(|e| ExtractionError::DocxParsing(e.to_string()))?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ExtractionError::DocxParsing(format!(
                    "malformed document XML at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
        }
    }

    Ok(out.trim_end().to_string())
}
