use std::path::Path;

use serde::{Deserialize, Serialize};

/// Extraction strategy selected for an uploaded file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    PlainText,
    Pdf,
    Docx,
    Image,
    Unsupported,
}

impl FormatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "plain_text",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Image => "image",
            Self::Unsupported => "unsupported",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Extensions accepted when the declared MIME type is inconclusive.
const EXTENSIONS: &[(&str, FormatKind)] = &[
    ("txt", FormatKind::PlainText),
    ("pdf", FormatKind::Pdf),
    ("docx", FormatKind::Docx),
    ("jpg", FormatKind::Image),
    ("jpeg", FormatKind::Image),
    ("png", FormatKind::Image),
    ("bmp", FormatKind::Image),
    ("tif", FormatKind::Image),
    ("tiff", FormatKind::Image),
    ("gif", FormatKind::Image),
    ("webp", FormatKind::Image),
];

/// Pick an extraction strategy from the declared MIME type and the file name.
///
/// The MIME type wins whenever it names a known kind; the extension
/// (case-insensitive) is only consulted when the MIME type is empty,
/// generic, or unknown.
pub fn classify(declared_mime_type: &str, file_name: &str) -> FormatKind {
    classify_mime(declared_mime_type)
        .or_else(|| classify_extension(file_name))
        .unwrap_or(FormatKind::Unsupported)
}

/// Declared type for a file on disk, guessed from its name the way a
/// browser reports it on upload. Empty when the extension is unknown.
pub fn guess_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or_default()
        .to_string()
}

fn classify_mime(declared: &str) -> Option<FormatKind> {
    // Drop parameters such as "; charset=utf-8"
    let essence = declared
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "text/plain" => Some(FormatKind::PlainText),
        "application/pdf" => Some(FormatKind::Pdf),
        DOCX_MIME => Some(FormatKind::Docx),
        // Every image type goes to OCR; undecodable ones fail there
        other if other.starts_with("image/") => Some(FormatKind::Image),
        _ => None,
    }
}

fn classify_extension(file_name: &str) -> Option<FormatKind> {
    let ext = Path::new(file_name.trim())
        .extension()
        .and_then(|e| e.to_str())?
        .to_ascii_lowercase();

    EXTENSIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, kind)| *kind)
}
