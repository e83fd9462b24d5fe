/// Deterministic text cleanup applied to indexed content and queries alike.
///
/// Steps, in order: trim, optional lowercase, drop ASCII punctuation,
/// collapse whitespace runs to one space. `normalize` is idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    lowercase: bool,
}

impl Default for Normalizer {
    fn default() -> Self { Self { lowercase: true } }
}

impl Normalizer {
    pub fn new(lowercase: bool) -> Self { Self { lowercase } }

    pub fn normalize(&self, text: &str) -> String {
        let text = text.trim();
        let folded;
        let text = if self.lowercase {
            folded = text.to_lowercase();
            folded.as_str()
        } else {
            text
        };
        let stripped: String = text.chars().filter(|c| !c.is_ascii_punctuation()).collect();
        collapse_whitespace(&stripped)
    }

    pub fn normalize_all(&self, texts: &[String]) -> Vec<String> {
        texts.iter().map(|t| self.normalize(t)).collect()
    }
}

/// Collapse every whitespace run to a single space and trim both ends.
/// Punctuation is left alone.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
