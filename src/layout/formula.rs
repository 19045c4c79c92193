//! LaTeX to Unicode conversion for display and inline formulas.
//!
//! Only a small, fixed vocabulary is recognized: fractions, roots,
//! integrals and other large operators, relations, arrows, Greek letters,
//! and super/subscripts that have Unicode forms. Anything else passes
//! through literally.

use crate::model::Span;

const SYMBOLS: &[(&str, &str)] = &[
    // Greek lowercase
    ("alpha", "α"),
    ("beta", "β"),
    ("gamma", "γ"),
    ("delta", "δ"),
    ("epsilon", "ε"),
    ("varepsilon", "ε"),
    ("zeta", "ζ"),
    ("eta", "η"),
    ("theta", "θ"),
    ("vartheta", "ϑ"),
    ("iota", "ι"),
    ("kappa", "κ"),
    ("lambda", "λ"),
    ("mu", "μ"),
    ("nu", "ν"),
    ("xi", "ξ"),
    ("pi", "π"),
    ("varpi", "ϖ"),
    ("rho", "ρ"),
    ("sigma", "σ"),
    ("tau", "τ"),
    ("upsilon", "υ"),
    ("phi", "φ"),
    ("varphi", "φ"),
    ("chi", "χ"),
    ("psi", "ψ"),
    ("omega", "ω"),
    // Greek uppercase
    ("Gamma", "Γ"),
    ("Delta", "Δ"),
    ("Theta", "Θ"),
    ("Lambda", "Λ"),
    ("Xi", "Ξ"),
    ("Pi", "Π"),
    ("Sigma", "Σ"),
    ("Upsilon", "Υ"),
    ("Phi", "Φ"),
    ("Psi", "Ψ"),
    ("Omega", "Ω"),
    // Large operators
    ("int", "∫"),
    ("iint", "∬"),
    ("iiint", "∭"),
    ("oint", "∮"),
    ("sum", "∑"),
    ("prod", "∏"),
    ("coprod", "∐"),
    // Misc symbols
    ("infty", "∞"),
    ("partial", "∂"),
    ("nabla", "∇"),
    ("hbar", "ℏ"),
    ("ell", "ℓ"),
    ("emptyset", "∅"),
    ("forall", "∀"),
    ("exists", "∃"),
    ("neg", "¬"),
    ("angle", "∠"),
    ("degree", "°"),
    ("circ", "∘"),
    ("ldots", "…"),
    ("dots", "…"),
    ("cdots", "⋯"),
    ("vdots", "⋮"),
    // Binary operators
    ("pm", "±"),
    ("mp", "∓"),
    ("times", "×"),
    ("cdot", "·"),
    ("div", "÷"),
    ("ast", "∗"),
    ("cup", "∪"),
    ("cap", "∩"),
    ("land", "∧"),
    ("wedge", "∧"),
    ("lor", "∨"),
    ("vee", "∨"),
    ("oplus", "⊕"),
    ("otimes", "⊗"),
    // Relations
    ("leq", "≤"),
    ("le", "≤"),
    ("geq", "≥"),
    ("ge", "≥"),
    ("neq", "≠"),
    ("ne", "≠"),
    ("approx", "≈"),
    ("equiv", "≡"),
    ("sim", "∼"),
    ("simeq", "≃"),
    ("cong", "≅"),
    ("propto", "∝"),
    ("ll", "≪"),
    ("gg", "≫"),
    ("in", "∈"),
    ("notin", "∉"),
    ("ni", "∋"),
    ("subset", "⊂"),
    ("subseteq", "⊆"),
    ("supset", "⊃"),
    ("supseteq", "⊇"),
    ("perp", "⊥"),
    ("parallel", "∥"),
    // Arrows
    ("to", "→"),
    ("rightarrow", "→"),
    ("leftarrow", "←"),
    ("gets", "←"),
    ("leftrightarrow", "↔"),
    ("Rightarrow", "⇒"),
    ("Leftarrow", "⇐"),
    ("Leftrightarrow", "⇔"),
    ("implies", "⇒"),
    ("iff", "⇔"),
    ("mapsto", "↦"),
    ("uparrow", "↑"),
    ("downarrow", "↓"),
];

/// Function names rendered upright as plain text.
const FUNCTIONS: &[&str] = &[
    "sin", "cos", "tan", "cot", "sec", "csc", "arcsin", "arccos", "arctan", "sinh", "cosh",
    "tanh", "log", "ln", "exp", "lim", "max", "min", "sup", "inf", "det", "gcd", "deg",
];

const SUPERSCRIPTS: &[(char, char)] = &[
    ('0', '⁰'),
    ('1', '¹'),
    ('2', '²'),
    ('3', '³'),
    ('4', '⁴'),
    ('5', '⁵'),
    ('6', '⁶'),
    ('7', '⁷'),
    ('8', '⁸'),
    ('9', '⁹'),
    ('+', '⁺'),
    ('-', '⁻'),
    ('=', '⁼'),
    ('(', '⁽'),
    (')', '⁾'),
    ('n', 'ⁿ'),
    ('i', 'ⁱ'),
];

const SUBSCRIPTS: &[(char, char)] = &[
    ('0', '₀'),
    ('1', '₁'),
    ('2', '₂'),
    ('3', '₃'),
    ('4', '₄'),
    ('5', '₅'),
    ('6', '₆'),
    ('7', '₇'),
    ('8', '₈'),
    ('9', '₉'),
    ('+', '₊'),
    ('-', '₋'),
    ('=', '₌'),
    ('(', '₍'),
    (')', '₎'),
    ('a', 'ₐ'),
    ('e', 'ₑ'),
    ('o', 'ₒ'),
    ('x', 'ₓ'),
    ('i', 'ᵢ'),
    ('j', 'ⱼ'),
    ('n', 'ₙ'),
];

const VULGAR_FRACTIONS: &[(&str, &str, &str)] = &[
    ("1", "2", "½"),
    ("1", "3", "⅓"),
    ("2", "3", "⅔"),
    ("1", "4", "¼"),
    ("3", "4", "¾"),
    ("1", "5", "⅕"),
    ("1", "6", "⅙"),
    ("1", "8", "⅛"),
];

/// Convert a LaTeX expression to a single line of Unicode text.
pub fn latex_to_unicode(latex: &str) -> String {
    let body = strip_delimiters(latex.trim());
    let mut parser = Parser {
        chars: body.chars().collect(),
        pos: 0,
    };
    parser.group(None).trim().to_string()
}

fn strip_delimiters(latex: &str) -> &str {
    for (open, close) in [("$$", "$$"), ("\\[", "\\]"), ("\\(", "\\)"), ("$", "$")] {
        if latex.len() >= open.len() + close.len() {
            if let Some(inner) = latex
                .strip_prefix(open)
                .and_then(|rest| rest.strip_suffix(close))
            {
                return inner.trim();
            }
        }
    }
    latex
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Convert until `close` (consumed) or the end of input.
    fn group(&mut self, close: Option<char>) -> String {
        let mut out = String::new();
        while let Some(c) = self.bump() {
            if Some(c) == close {
                break;
            }
            match c {
                '\\' => out.push_str(&self.command()),
                '{' => out.push_str(&self.group(Some('}'))),
                '^' => {
                    let arg = self.argument();
                    out.push_str(&script(&arg, SUPERSCRIPTS, '^'));
                }
                '_' => {
                    let arg = self.argument();
                    out.push_str(&script(&arg, SUBSCRIPTS, '_'));
                }
                '~' => out.push(' '),
                c => out.push(c),
            }
        }
        out
    }

    /// One macro argument: a braced group, a command or a single character.
    fn argument(&mut self) -> String {
        while self.peek() == Some(' ') {
            self.pos += 1;
        }
        match self.bump() {
            Some('{') => self.group(Some('}')),
            Some('\\') => self.command(),
            Some(c) => c.to_string(),
            None => String::new(),
        }
    }

    fn optional_argument(&mut self) -> Option<String> {
        if self.peek() != Some('[') {
            return None;
        }
        self.pos += 1;
        Some(self.group(Some(']')))
    }

    fn command(&mut self) -> String {
        let name: String = match self.peek() {
            Some(c) if c.is_ascii_alphabetic() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
                    self.pos += 1;
                }
                self.chars[start..self.pos].iter().collect()
            }
            Some(c) => {
                self.pos += 1;
                c.to_string()
            }
            None => return "\\".to_string(),
        };

        match name.as_str() {
            "frac" | "dfrac" | "tfrac" => {
                let num = self.argument();
                let den = self.argument();
                fraction(&num, &den)
            }
            "sqrt" => {
                let index = self.optional_argument();
                let arg = self.argument();
                root(index.as_deref(), &arg)
            }
            "left" | "right" | "big" | "Big" | "bigg" | "Bigg" | "displaystyle" | "limits" => {
                String::new()
            }
            "text" | "mathrm" | "mathit" | "mathbf" | "mathsf" | "operatorname" => self.argument(),
            "mathbb" => self.argument().chars().map(double_struck).collect(),
            "," | ":" | ";" | " " | "quad" => " ".to_string(),
            "qquad" => "  ".to_string(),
            "!" => String::new(),
            "\\" => " ".to_string(),
            "{" | "}" | "$" | "%" | "&" | "#" | "_" => name,
            other if FUNCTIONS.contains(&other) => name,
            other => match SYMBOLS.iter().find(|(key, _)| *key == other) {
                Some((_, symbol)) => symbol.to_string(),
                None => format!("\\{}", other),
            },
        }
    }
}

fn is_atom(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '.')
}

fn fraction(num: &str, den: &str) -> String {
    let (num, den) = (num.trim(), den.trim());
    if let Some((_, _, glyph)) = VULGAR_FRACTIONS
        .iter()
        .find(|(n, d, _)| *n == num && *d == den)
    {
        return glyph.to_string();
    }
    let wrap = |part: &str| {
        if is_atom(part) {
            part.to_string()
        } else {
            format!("({})", part)
        }
    };
    if is_atom(num) && is_atom(den) {
        format!("{}⁄{}", num, den)
    } else {
        format!("{}/{}", wrap(num), wrap(den))
    }
}

fn root(index: Option<&str>, arg: &str) -> String {
    let sign = match index.map(str::trim) {
        Some("3") => "∛".to_string(),
        Some("4") => "∜".to_string(),
        Some(n) if !n.is_empty() => format!("{}√", script(n, SUPERSCRIPTS, '^')),
        _ => "√".to_string(),
    };
    let arg = arg.trim();
    if arg.chars().count() <= 1 || is_atom(arg) {
        format!("{}{}", sign, arg)
    } else {
        format!("{}({})", sign, arg)
    }
}

fn script(arg: &str, table: &[(char, char)], marker: char) -> String {
    let mapped: Option<String> = arg
        .chars()
        .map(|c| table.iter().find(|(from, _)| *from == c).map(|(_, to)| *to))
        .collect();
    match mapped {
        Some(s) if !s.is_empty() => s,
        _ if arg.chars().count() == 1 => format!("{}{}", marker, arg),
        _ => format!("{}({})", marker, arg),
    }
}

fn double_struck(c: char) -> char {
    match c {
        'R' => 'ℝ',
        'N' => 'ℕ',
        'Z' => 'ℤ',
        'Q' => 'ℚ',
        'C' => 'ℂ',
        'P' => 'ℙ',
        other => other,
    }
}

/// Replace `$...$` segments of non-code spans with converted formula text.
///
/// A math segment becomes its own span with the surrounding span's style.
/// `\$` is a literal dollar sign and an unclosed `$` is kept as text.
pub fn expand_inline_math(spans: &[Span]) -> Vec<Span> {
    let mut out = Vec::with_capacity(spans.len());
    for span in spans {
        if span.code || !span.text.contains('$') {
            out.push(span.clone());
            continue;
        }
        for (text, math) in split_math(&span.text) {
            let text = if math { latex_to_unicode(&text) } else { text };
            if !text.is_empty() {
                out.push(span.restyle(text));
            }
        }
    }
    out
}

fn split_math(text: &str) -> Vec<(String, bool)> {
    let mut segments: Vec<(String, bool)> = Vec::new();
    let mut current = String::new();
    let mut in_math = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'$') => {
                chars.next();
                if in_math {
                    current.push_str("\\$");
                } else {
                    current.push('$');
                }
            }
            '$' => {
                segments.push((std::mem::take(&mut current), in_math));
                in_math = !in_math;
            }
            c => current.push(c),
        }
    }

    if in_math {
        let literal = format!("${}", current);
        match segments.last_mut() {
            Some((text, false)) => text.push_str(&literal),
            _ => segments.push((literal, false)),
        }
    } else {
        segments.push((current, false));
    }
    segments
}
