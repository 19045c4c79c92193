//! Rich text shaping: greedy word wrapping of styled spans.
//!
//! Spans are cut into a token stream where a token is either a word (a
//! maximal run of non-whitespace, possibly crossing span boundaries) or a
//! whitespace run. Tokens are placed left to right; when the next word
//! would overflow the line, the line is closed with its trailing
//! whitespace trimmed. A word wider than the whole line is placed alone.
//!
//! A newline is a forced break and never reaches run text. Consecutive
//! newlines leave empty lines behind.

use crate::fonts::{FontVariant, GlyphMetrics, TextStyle};
use crate::model::{Highlight, Span};
use crate::style::Color;

/// Slack for floating-point width comparisons.
const EPSILON: f64 = 1e-9;

/// Block-level defaults a span's own flags are applied on top of.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseStyle {
    pub size: f64,
    pub color: Color,
    /// Render every span bold
    pub bold: bool,
    /// Render every span italic
    pub italic: bool,
    /// Ignore span colors
    pub force_color: bool,
}

impl BaseStyle {
    pub fn new(size: f64, color: Color) -> Self {
        Self {
            size,
            color,
            bold: false,
            italic: false,
            force_color: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn with_forced_color(mut self) -> Self {
        self.force_color = true;
        self
    }

    /// Resolve the style of a span under this base.
    pub fn resolve(&self, span: &Span) -> RunStyle {
        let mut font = FontVariant::from_flags(span.bold, span.italic, span.code);
        if self.bold {
            font = font.emboldened();
        }
        if self.italic {
            font = font.slanted();
        }
        let color = match span.color {
            Some(c) if !self.force_color => c.color(),
            _ => self.color,
        };
        RunStyle {
            font,
            size: self.size,
            color,
            highlight: span.highlight,
        }
    }

    /// Metrics style of unformatted text.
    pub fn text_style(&self) -> TextStyle {
        TextStyle::new(FontVariant::Regular, self.size)
    }
}

/// Styling shared by every character of a glyph run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStyle {
    pub font: FontVariant,
    pub size: f64,
    pub color: Color,
    pub highlight: Option<Highlight>,
}

impl RunStyle {
    pub fn text_style(&self) -> TextStyle {
        TextStyle::new(self.font, self.size)
    }
}

/// Uniformly styled text positioned within a line.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRun {
    pub text: String,
    /// Offset from the start of the line
    pub x: f64,
    pub width: f64,
    pub style: RunStyle,
}

impl GlyphRun {
    /// Whether the run has nothing to draw.
    pub fn is_blank(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

/// One wrapped line.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutLine {
    pub runs: Vec<GlyphRun>,
    pub width: f64,
    pub height: f64,
    /// Distance from the line top to the baseline
    pub ascent: f64,
}

impl LaidOutLine {
    /// Text of the line.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Result of shaping a span sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapedText {
    pub lines: Vec<LaidOutLine>,
    /// Space added between consecutive lines
    pub line_gap: f64,
}

impl ShapedText {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Σ line heights + (n − 1) × line gap.
    pub fn total_height(&self) -> f64 {
        if self.lines.is_empty() {
            return 0.0;
        }
        let lines: f64 = self.lines.iter().map(|l| l.height).sum();
        lines + (self.lines.len() - 1) as f64 * self.line_gap
    }

    /// Widest line.
    pub fn max_width(&self) -> f64 {
        self.lines.iter().map(|l| l.width).fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone)]
struct Piece {
    text: String,
    style: RunStyle,
    width: f64,
    space: bool,
}

#[derive(Debug)]
enum Token {
    Word(Vec<Piece>),
    Space(Piece),
    Break,
}

impl Token {
    fn width(&self) -> f64 {
        match self {
            Token::Word(pieces) => pieces.iter().map(|p| p.width).sum(),
            Token::Space(piece) => piece.width,
            Token::Break => 0.0,
        }
    }
}

/// Greedy line breaker.
pub struct Shaper<'a> {
    metrics: &'a dyn GlyphMetrics,
    line_gap: f64,
}

impl<'a> Shaper<'a> {
    pub fn new(metrics: &'a dyn GlyphMetrics, line_gap: f64) -> Self {
        Self { metrics, line_gap }
    }

    /// Wrap `spans` to `max_width`.
    pub fn shape(&self, spans: &[Span], max_width: f64, base: &BaseStyle) -> ShapedText {
        let tokens = self.tokenize(spans, base);
        let mut lines = Vec::new();
        let mut current: Vec<Piece> = Vec::new();
        let mut width = 0.0;
        let mut after_break = false;

        for token in tokens {
            let token_width = token.width();
            if let Token::Break = token {
                if !current.is_empty() || after_break {
                    lines.push(self.close_line(std::mem::take(&mut current), base));
                    width = 0.0;
                }
                after_break = true;
                continue;
            }
            after_break = false;
            match token {
                Token::Break => {}
                Token::Space(piece) => {
                    if current.is_empty() {
                        continue;
                    }
                    if width + token_width > max_width + EPSILON {
                        lines.push(self.close_line(std::mem::take(&mut current), base));
                        width = 0.0;
                        continue;
                    }
                    current.push(piece);
                    width += token_width;
                }
                Token::Word(pieces) => {
                    if !current.is_empty() && width + token_width > max_width + EPSILON {
                        lines.push(self.close_line(std::mem::take(&mut current), base));
                        width = 0.0;
                    }
                    current.extend(pieces);
                    width += token_width;
                }
            }
        }
        if !current.is_empty() {
            lines.push(self.close_line(current, base));
        }

        ShapedText {
            lines,
            line_gap: self.line_gap,
        }
    }

    /// Shape unwrapped text as a single line.
    pub fn single_line(&self, spans: &[Span], base: &BaseStyle) -> ShapedText {
        self.shape(spans, f64::INFINITY, base)
    }

    fn tokenize(&self, spans: &[Span], base: &BaseStyle) -> Vec<Token> {
        let mut tokens: Vec<Token> = Vec::new();
        for span in spans {
            let style = base.resolve(span);
            for (text, space) in split_whitespace_runs(&span.text) {
                if space {
                    for (i, segment) in text.split('\n').enumerate() {
                        if i > 0 {
                            tokens.push(Token::Break);
                        }
                        let segment = if text.contains('\n') {
                            segment.replace('\r', "")
                        } else {
                            segment.replace('\r', " ")
                        };
                        if !segment.is_empty() {
                            tokens.push(Token::Space(self.piece(segment, style, true)));
                        }
                    }
                    continue;
                }
                let piece = self.piece(text.to_string(), style, false);
                if let Some(Token::Word(pieces)) = tokens.last_mut() {
                    pieces.push(piece);
                } else {
                    tokens.push(Token::Word(vec![piece]));
                }
            }
        }
        tokens
    }

    fn piece(&self, text: String, style: RunStyle, space: bool) -> Piece {
        Piece {
            width: self.metrics.measure(&text, &style.text_style()),
            text,
            style,
            space,
        }
    }

    fn close_line(&self, mut pieces: Vec<Piece>, base: &BaseStyle) -> LaidOutLine {
        while pieces.last().is_some_and(|p| p.space) {
            pieces.pop();
        }

        let base_style = base.text_style();
        let mut height = self.metrics.line_height(&base_style);
        let mut ascent = self.metrics.ascent(&base_style);
        let mut runs: Vec<GlyphRun> = Vec::new();
        let mut x = 0.0;

        for piece in pieces {
            let style = piece.style.text_style();
            height = height.max(self.metrics.line_height(&style));
            ascent = ascent.max(self.metrics.ascent(&style));
            match runs.last_mut() {
                Some(run) if run.style == piece.style => {
                    run.text.push_str(&piece.text);
                    run.width += piece.width;
                }
                _ => runs.push(GlyphRun {
                    text: piece.text,
                    x,
                    width: piece.width,
                    style: piece.style,
                }),
            }
            x += piece.width;
        }

        LaidOutLine {
            runs,
            width: x,
            height,
            ascent,
        }
    }
}

/// Split text into alternating runs of whitespace and non-whitespace.
fn split_whitespace_runs(text: &str) -> Vec<(&str, bool)> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;
    for (i, c) in text.char_indices() {
        let space = c.is_whitespace();
        match current {
            Some(kind) if kind == space => {}
            Some(kind) => {
                runs.push((&text[start..i], kind));
                start = i;
                current = Some(space);
            }
            None => current = Some(space),
        }
    }
    if let Some(kind) = current {
        runs.push((&text[start..], kind));
    }
    runs
}
