/// Sanitize extracted text before passing downstream.
/// Strips control and zero-width characters, trims every line and drops
/// blank ones. Line structure is kept because labels and bullets are
/// line-oriented in prescriptions.
pub fn sanitize_extracted_text(raw: &str) -> String {
    raw.replace("\r\n", "\n")
        .replace('\r', "\n")
        .chars()
        .filter(|c| *c == '\n' || *c == '\t' || !(c.is_control() || is_zero_width(*c)))
        .collect::<String>()
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Plain-text uploads keep their layout: only NUL and other control
/// characters are removed. Line breaks and tabs stay as written.
pub fn strip_control_chars(raw: &str) -> String {
    raw.chars()
        .filter(|c| matches!(c, '\n' | '\r' | '\t') || !c.is_control())
        .collect()
}

fn is_zero_width(c: char) -> bool {
    matches!(
        c,
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{00AD}'
    )
}
