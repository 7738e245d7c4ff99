//! Font metrics and text measurement for the builtin PDF fonts.
//!
//! The renderer only uses the standard 14 fonts, so no font files are read.
//! Widths come from per-face average advance heuristics, which is enough to
//! word-wrap table cells and size rows.

use std::collections::HashMap;

use crate::style::{FontFamily, StyleSpec, LINE_HEIGHT_FACTOR};

/// Metrics of one face, in em units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Average horizontal advance per character.
    pub avg_advance: f32,
    pub ascender: f32,
    pub descender: f32,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: FontFamily,
    pub bold: bool,
    pub italic: bool,
}

impl FontKey {
    pub fn of(spec: &StyleSpec) -> Self {
        Self {
            family: spec.family,
            bold: spec.is_bold(),
            italic: spec.is_italic(),
        }
    }
}

/// Registry of face metrics keyed by family and variant.
pub struct FontManager {
    fonts: HashMap<FontKey, FontMetrics>,
    fallback: FontMetrics,
}

impl FontManager {
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
            fallback: FontMetrics {
                avg_advance: 0.5,
                ascender: 0.75,
                descender: -0.25,
            },
        }
    }

    pub fn register(&mut self, key: FontKey, metrics: FontMetrics) {
        self.fonts.insert(key, metrics);
    }

    /// Register Helvetica- and Times-like metrics for every variant.
    pub fn ensure_builtin(&mut self) {
        for family in [FontFamily::Helvetica, FontFamily::Times] {
            for bold in [false, true] {
                for italic in [false, true] {
                    let base = match family {
                        FontFamily::Helvetica => 0.5,
                        FontFamily::Times => 0.45,
                    };
                    // Bold is ~10 % wider.
                    let avg_advance = if bold { base * 1.1 } else { base };
                    let ascender = match family {
                        FontFamily::Helvetica => 0.718,
                        FontFamily::Times => 0.683,
                    };
                    self.register(
                        FontKey {
                            family,
                            bold,
                            italic,
                        },
                        FontMetrics {
                            avg_advance,
                            ascender,
                            descender: -0.217,
                        },
                    );
                }
            }
        }
    }

    /// Metrics for a key, falling back to Helvetica-like defaults.
    pub fn get(&self, key: &FontKey) -> &FontMetrics {
        self.fonts.get(key).unwrap_or(&self.fallback)
    }

    /// Width of `text` set in `spec`, in points.
    pub fn measure_text_width(&self, text: &str, spec: &StyleSpec) -> f32 {
        let metrics = self.get(&FontKey::of(spec));
        text.chars().count() as f32 * spec.size * metrics.avg_advance
    }

    /// Line height in points.
    pub fn line_height(&self, spec: &StyleSpec) -> f32 {
        spec.size * LINE_HEIGHT_FACTOR
    }

    /// Distance from the top of a line to its baseline, in points.
    pub fn ascender(&self, spec: &StyleSpec) -> f32 {
        self.get(&FontKey::of(spec)).ascender * spec.size
    }
}

impl Default for FontManager {
    fn default() -> Self {
        let mut mgr = Self::new();
        mgr.ensure_builtin();
        mgr
    }
}

/// Word-wrap text to fit within `max_width` points. Returns a vec of lines.
///
/// Existing newlines are kept; a single word wider than `max_width` is broken
/// between characters.
pub fn wrap_text(text: &str, spec: &StyleSpec, max_width: f32, fonts: &FontManager) -> Vec<String> {
    if max_width <= 0.0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        for word in &words {
            if fonts.measure_text_width(word, spec) > max_width {
                if !current_line.is_empty() {
                    lines.push(std::mem::take(&mut current_line));
                }
                let mut pieces = break_word(word, spec, max_width, fonts);
                current_line = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
                continue;
            }
            let candidate = if current_line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current_line, word)
            };
            let w = fonts.measure_text_width(&candidate, spec);
            if w > max_width && !current_line.is_empty() {
                lines.push(current_line);
                current_line = word.to_string();
            } else {
                current_line = candidate;
            }
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Split one word into pieces no wider than `max_width`. Every piece holds
/// at least one character.
fn break_word(word: &str, spec: &StyleSpec, max_width: f32, fonts: &FontManager) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for ch in word.chars() {
        piece.push(ch);
        if piece.chars().count() > 1 && fonts.measure_text_width(&piece, spec) > max_width {
            piece.pop();
            pieces.push(std::mem::replace(&mut piece, ch.to_string()));
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{style_for, StyleRole};

    #[test]
    fn heuristic_text_width() {
        let mgr = FontManager::default();
        let body = style_for(StyleRole::Body);
        let w = mgr.measure_text_width("Hello", &body);
        // 5 chars × 7 × 0.5
        assert!((w - 17.5).abs() < 0.01);

        let bold = style_for(StyleRole::SubHeader);
        assert!(mgr.measure_text_width("Hello", &bold) > w);
    }

    #[test]
    fn word_wrap_basic() {
        let mgr = FontManager::default();
        let body = style_for(StyleRole::Body);
        let lines = wrap_text("Hello world foo bar", &body, 30.0, &mgr);
        assert!(lines.len() >= 2, "Expected wrapping, got {:?}", lines);
    }

    #[test]
    fn empty_text_keeps_one_line() {
        let mgr = FontManager::default();
        let body = style_for(StyleRole::Body);
        assert_eq!(wrap_text("", &body, 100.0, &mgr), vec![String::new()]);
    }

    #[test]
    fn overlong_word_is_broken_to_fit() {
        let mgr = FontManager::default();
        let body = style_for(StyleRole::Body);
        let address = "appointments.cardiology@citycareclinic.example.com";
        let lines = wrap_text(&format!("E-mail {address} today"), &body, 60.0, &mgr);

        assert!(lines.len() > 3, "got {:?}", lines);
        for line in &lines {
            assert!(mgr.measure_text_width(line, &body) <= 60.0, "{line:?} too wide");
        }
        assert_eq!(lines[0], "E-mail");
        assert_eq!(lines.concat().replace(' ', ""), format!("E-mail{address}today"));
    }
}
