//! Display text normalization
//!
//! Applied to `word`, `meaning` and `notes` whenever an item is written.

use crate::policy::SchedulerPolicy;

/// Shown when `word` is empty after normalization
pub const WORD_PLACEHOLDER: &str = "(untitled)";

/// Shown when `meaning` is empty after normalization
pub const MEANING_PLACEHOLDER: &str = "(no meaning)";

/// Characters that render as nothing but still occupy the string.
///
/// ZWJ/ZWNJ and variation selectors are kept: emoji sequences and several
/// scripts need them.
fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{034F}'
            | '\u{061C}'
            | '\u{115F}'
            | '\u{1160}'
            | '\u{17B4}'
            | '\u{17B5}'
            | '\u{180E}'
            | '\u{200B}'
            | '\u{200E}'
            | '\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{3164}'
            | '\u{FEFF}'
            | '\u{FFA0}'
    ) || (c.is_control() && !c.is_whitespace())
}

/// Collapse whitespace runs to one space and drop invisible characters
fn collapse_line(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for c in raw.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
        } else if is_invisible(c) {
            continue;
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }
    out
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => s[..byte_idx].trim_end().to_string(),
        None => s.to_string(),
    }
}

/// Normalize a single-line display field
///
/// Collapses internal whitespace, trims, strips invisible characters and
/// truncates to `max_chars`. Empty results become `placeholder`.
pub fn normalize_text(raw: &str, max_chars: usize, placeholder: &str) -> String {
    let collapsed = truncate_chars(&collapse_line(raw), max_chars);
    if collapsed.is_empty() {
        placeholder.to_string()
    } else {
        collapsed
    }
}

/// Normalize the optional multi-line notes field
///
/// Line breaks survive (CRLF/CR become LF, at most one blank line in a row);
/// everything else is normalized per line like [`normalize_text`]. Empty notes
/// become `None`.
pub fn normalize_notes(raw: Option<&str>, max_chars: usize) -> Option<String> {
    let raw = raw?;
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");

    let mut lines: Vec<String> = Vec::new();
    for line in unified.split('\n') {
        let line = collapse_line(line);
        let previous_blank = lines.last().is_none_or(|l| l.is_empty());
        if line.is_empty() && previous_blank {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    let joined = truncate_chars(&lines.join("\n"), max_chars);
    if joined.is_empty() { None } else { Some(joined) }
}

/// The three display fields of an item after normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DisplayText {
    pub word: String,
    pub meaning: String,
    pub notes: Option<String>,
}

impl DisplayText {
    /// Normalize all display fields against the policy's limits
    pub(crate) fn normalize(
        word: &str,
        meaning: &str,
        notes: Option<&str>,
        policy: &SchedulerPolicy,
    ) -> Self {
        Self {
            word: normalize_text(word, policy.word_max_chars, WORD_PLACEHOLDER),
            meaning: normalize_text(meaning, policy.meaning_max_chars, MEANING_PLACEHOLDER),
            notes: normalize_notes(notes, policy.notes_max_chars),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
