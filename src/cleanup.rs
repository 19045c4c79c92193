//! Span text cleanup applied before layout.
//!
//! Editors and converters leave decomposed accents and stray control
//! characters in span text. The pipeline rewrites every span (and code
//! block body) into a form the shaper can measure.

use unicode_normalization::UnicodeNormalization;

use crate::model::{Block, Document, ListItem, Span};

/// Cleanup preset levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPreset {
    /// Unicode NFC normalization only
    Minimal,
    /// NFC + control characters + tabs + replacement characters
    #[default]
    Standard,
    /// Standard plus ligature expansion and Private Use Area removal
    Strict,
}

/// Options for text cleanup.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanupOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Remove control characters other than newline and tab
    pub remove_control_chars: bool,

    /// Replace each tab with this many spaces (0 = keep tabs)
    pub tab_width: u8,

    /// Remove Unicode replacement character (U+FFFD)
    pub remove_replacement_char: bool,

    /// Expand typographic ligatures (fi, fl, etc.)
    pub fix_ligatures: bool,

    /// Remove Private Use Area (PUA) characters
    pub remove_pua: bool,
}

impl CleanupOptions {
    /// Create options from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        match preset {
            CleanupPreset::Minimal => Self::minimal(),
            CleanupPreset::Standard => Self::standard(),
            CleanupPreset::Strict => Self::strict(),
        }
    }

    /// Minimal cleanup options.
    pub fn minimal() -> Self {
        Self {
            normalize_unicode: true,
            remove_control_chars: false,
            tab_width: 0,
            remove_replacement_char: false,
            fix_ligatures: false,
            remove_pua: false,
        }
    }

    /// Standard cleanup options.
    pub fn standard() -> Self {
        Self {
            normalize_unicode: true,
            remove_control_chars: true,
            tab_width: 4,
            remove_replacement_char: true,
            fix_ligatures: false,
            remove_pua: false,
        }
    }

    /// Strict cleanup options.
    pub fn strict() -> Self {
        Self {
            fix_ligatures: true,
            remove_pua: true,
            ..Self::standard()
        }
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::standard()
    }
}

/// Text cleanup pipeline.
pub struct TextCleanup {
    options: CleanupOptions,
    ligature_map: Vec<(char, &'static str)>,
}

impl TextCleanup {
    /// Create a new cleanup pipeline with the given options.
    pub fn new(options: CleanupOptions) -> Self {
        Self {
            options,
            ligature_map: vec![
                ('\u{FB00}', "ff"),
                ('\u{FB01}', "fi"),
                ('\u{FB02}', "fl"),
                ('\u{FB03}', "ffi"),
                ('\u{FB04}', "ffl"),
                ('\u{FB05}', "st"),
                ('\u{FB06}', "st"),
            ],
        }
    }

    /// Create a pipeline from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        Self::new(CleanupOptions::from_preset(preset))
    }

    /// Process a single string.
    pub fn process(&self, text: &str) -> String {
        let normalized: String = if self.options.normalize_unicode {
            text.nfc().collect()
        } else {
            text.to_string()
        };

        let mut result = String::with_capacity(normalized.len());
        for c in normalized.chars() {
            match c {
                '\t' if self.options.tab_width > 0 => {
                    result.extend(std::iter::repeat(' ').take(self.options.tab_width as usize));
                }
                '\n' | '\t' => result.push(c),
                '\u{FFFD}' if self.options.remove_replacement_char => {}
                c if self.options.remove_control_chars && c.is_control() => {}
                c if self.options.remove_pua && is_private_use(c) => {}
                c if self.options.fix_ligatures => match self.ligature(c) {
                    Some(expanded) => result.push_str(expanded),
                    None => result.push(c),
                },
                c => result.push(c),
            }
        }
        result
    }

    /// Clean every span and code body of a document in place.
    pub fn apply(&self, doc: &mut Document) {
        for block in &mut doc.blocks {
            self.apply_block(block);
        }
    }

    fn apply_block(&self, block: &mut Block) {
        match block {
            Block::Heading { spans, .. } | Block::Paragraph { spans } | Block::Caption { spans } => {
                self.apply_spans(spans)
            }
            Block::List { items, .. } => self.apply_items(items),
            Block::Table { rows, .. } => {
                for cell in rows.iter_mut().flat_map(|row| row.cells.iter_mut()) {
                    self.apply_spans(cell);
                }
            }
            Block::Code { content, .. } => *content = self.process(content),
            Block::Formula { latex } => *latex = self.process(latex),
            Block::Image { alt: Some(alt), .. } => *alt = self.process(alt),
            Block::Image { .. }
            | Block::Break { .. }
            | Block::PageBreak
            | Block::Exercise { .. } => {}
        }
    }

    fn apply_items(&self, items: &mut [ListItem]) {
        for item in items {
            self.apply_spans(&mut item.spans);
            self.apply_items(&mut item.children);
        }
    }

    fn apply_spans(&self, spans: &mut [Span]) {
        for span in spans {
            span.text = self.process(&span.text);
        }
    }

    fn ligature(&self, c: char) -> Option<&'static str> {
        self.ligature_map
            .iter()
            .find(|(lig, _)| *lig == c)
            .map(|(_, expanded)| *expanded)
    }
}

impl Default for TextCleanup {
    fn default() -> Self {
        Self::new(CleanupOptions::default())
    }
}

fn is_private_use(c: char) -> bool {
    let code = c as u32;
    (0xE000..=0xF8FF).contains(&code)
        || (0xF0000..=0xFFFFD).contains(&code)
        || (0x100000..=0x10FFFD).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableRow;

    #[test]
    fn test_unicode_normalization() {
        let pipeline = TextCleanup::from_preset(CleanupPreset::Minimal);
        // "e" + combining acute accent composes to "é"
        assert_eq!(pipeline.process("caf\u{0065}\u{0301}"), "caf\u{00E9}");
    }

    #[test]
    fn test_control_chars_removed() {
        let pipeline = TextCleanup::default();
        assert_eq!(pipeline.process("a\u{0007}b\u{008F}c\nd"), "abc\nd");
    }

    #[test]
    fn test_tab_expansion() {
        let pipeline = TextCleanup::default();
        assert_eq!(pipeline.process("\tx"), "    x");

        let keep = TextCleanup::from_preset(CleanupPreset::Minimal);
        assert_eq!(keep.process("\tx"), "\tx");
    }

    #[test]
    fn test_replacement_char() {
        let pipeline = TextCleanup::default();
        assert_eq!(pipeline.process("a\u{FFFD}b"), "ab");
    }

    #[test]
    fn test_strict_ligatures_and_pua() {
        let pipeline = TextCleanup::from_preset(CleanupPreset::Strict);
        assert_eq!(pipeline.process("\u{FB01}nd\u{E000}"), "find");
    }

    #[test]
    fn test_apply_document() {
        let mut doc = Document::with_blocks(vec![
            Block::paragraph("x\u{0007}y"),
            Block::table(1, vec![TableRow::from_texts(&["\tcell"])]),
            Block::code(None, "fn main() {\n\tok\n}"),
        ]);
        TextCleanup::default().apply(&mut doc);

        match &doc.blocks[0] {
            Block::Paragraph { spans } => assert_eq!(spans[0].text, "xy"),
            other => panic!("unexpected block {:?}", other),
        }
        match &doc.blocks[1] {
            Block::Table { rows, .. } => assert_eq!(rows[0].cells[0][0].text, "    cell"),
            other => panic!("unexpected block {:?}", other),
        }
        match &doc.blocks[2] {
            Block::Code { content, .. } => assert_eq!(content, "fn main() {\n    ok\n}"),
            other => panic!("unexpected block {:?}", other),
        }
    }
}
