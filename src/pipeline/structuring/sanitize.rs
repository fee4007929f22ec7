// Clean prescription text before it is embedded in a model prompt.
// The heuristic tier never sees this output; it works on the original text.

/// Maximum input length sent to a model (characters).
pub const MAX_INPUT_CHARS: usize = 50_000;

const TRUNCATION_MARKER: &str = "…[TRUNCATED]";

/// Line prefixes that impersonate a chat role or a meta instruction.
/// Bare `Instructions:` is a dosing label in prescriptions, not a role.
const ROLE_MARKERS: &[&str] = &[
    "system:",
    "assistant:",
    "user:",
    "[system]",
    "[assistant]",
    "[inst]",
    "[/inst]",
    "<<sys>>",
    "<|im_start|>",
    "<|im_end|>",
    "note to ai:",
    "system update:",
];

/// Phrases that try to override the extraction instructions.
const OVERRIDE_PHRASES: &[&str] = &[
    "ignore previous instructions",
    "ignore all instructions",
    "ignore the above instructions",
    "disregard your instructions",
    "disregard all instructions",
    "forget your instructions",
    "forget all instructions",
];

/// Pseudo-XML tags used to fake prompt structure.
const INSTRUCTION_TAGS: &[&str] = &["<instruction", "</instruction", "<system", "</system"];

/// Sanitize text for model consumption: strip invisible characters, drop
/// injection lines, collapse blank runs and truncate.
pub fn sanitize_for_inference(raw: &str) -> String {
    let visible = remove_invisible_chars(raw);
    let (kept, removed) = drop_injection_lines(&visible);

    if removed > 0 {
        // Count only, never content
        tracing::warn!(removed_lines = removed, "Injection patterns removed from model input");
    }

    truncate_chars(&collapse_blank_lines(&kept), MAX_INPUT_CHARS)
}

fn remove_invisible_chars(text: &str) -> String {
    text.chars()
        .filter(|c| matches!(c, ' ' | '\n' | '\t') || !(c.is_control() || is_invisible_format(*c)))
        .collect()
}

/// Zero-width and bidirectional formatting characters.
fn is_invisible_format(c: char) -> bool {
    matches!(
        c,
        '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}'..='\u{2064}' | '\u{FEFF}'
    )
}

fn is_injection_line(lowered: &str) -> bool {
    ROLE_MARKERS.iter().any(|m| lowered.starts_with(m))
        || INSTRUCTION_TAGS.iter().any(|t| lowered.starts_with(t))
        || OVERRIDE_PHRASES.iter().any(|p| lowered.contains(p))
}

/// Drop suspicious lines, including override phrases split across two
/// lines where neither half matches alone.
fn drop_injection_lines(text: &str) -> (String, usize) {
    let lowered: Vec<String> = text.lines().map(|l| l.trim().to_lowercase()).collect();
    let lines: Vec<&str> = text.lines().collect();

    let mut kept = Vec::with_capacity(lines.len());
    let mut removed = 0usize;
    let mut i = 0;
    while i < lines.len() {
        if is_injection_line(&lowered[i]) {
            removed += 1;
            i += 1;
            continue;
        }
        if let Some(next) = lowered.get(i + 1) {
            let joined = format!("{} {}", lowered[i], next);
            if !is_injection_line(next) && OVERRIDE_PHRASES.iter().any(|p| joined.contains(p)) {
                removed += 2;
                i += 2;
                continue;
            }
        }
        kept.push(lines[i]);
        i += 1;
    }

    (kept.join("\n"), removed)
}

/// Trim every line and keep at most one blank line in a row.
fn collapse_blank_lines(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() && out.last().map_or(true, |prev| prev.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last() == Some(&"") {
        out.pop();
    }
    out.join("\n")
}

/// Truncate to `max_chars`, breaking at the last whitespace when there is one.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };
    let head = &text[..cut];
    let head = head
        .rfind(char::is_whitespace)
        .map_or(head, |pos| &head[..pos]);
    format!("{head}{TRUNCATION_MARKER}")
}
