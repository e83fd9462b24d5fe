use crate::normalize::collapse_whitespace;

const ELLIPSIS: &str = "...";

/// Turns a retrieved span into display text.
pub trait AnswerFormat: Send + Sync {
    fn format(&self, text: &str) -> String;
}

/// Collapses whitespace, starts a new line at every section marker
/// (e.g. `BAB` headings) and hard-truncates to `max_chars` with `...`.
///
/// A marker matches a whole word, or a word prefix followed by a
/// non-alphabetic char (`BAB`, `BAB:`, `BAB1` but not `BABAK`). A marker at
/// the very start still gets its line break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionBreakFormatter {
    section_markers: Vec<String>,
    max_chars: usize,
}

impl SectionBreakFormatter {
    pub fn new(section_markers: Vec<String>, max_chars: usize) -> Self {
        let section_markers = section_markers.into_iter().filter(|m| !m.is_empty()).collect();
        Self { section_markers, max_chars }
    }

    fn is_marker(&self, word: &str) -> bool {
        self.section_markers.iter().any(|m| {
            word.strip_prefix(m.as_str())
                .is_some_and(|rest| !rest.starts_with(char::is_alphabetic))
        })
    }

    fn break_sections(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 8);
        for (i, word) in text.split(' ').enumerate() {
            if self.is_marker(word) {
                out.push('\n');
            } else if i > 0 {
                out.push(' ');
            }
            out.push_str(word);
        }
        out
    }
}

impl AnswerFormat for SectionBreakFormatter {
    fn format(&self, text: &str) -> String {
        let text = collapse_whitespace(text);
        if text.is_empty() {
            return text;
        }
        truncate_chars(&self.break_sections(&text), self.max_chars)
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.trim_end().to_string(),
        Some((cut, _)) => format!("{}{ELLIPSIS}", text[..cut].trim_end()),
    }
}
