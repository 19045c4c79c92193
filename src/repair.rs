//! Lenient document parsing.
//!
//! Hand-written and machine-generated document descriptions often fail strict
//! parsing for small reasons: a trailing comma, a comment, a truncated tail,
//! a paragraph whose `text` is a bare string. [`parse_document_lenient`]
//! fixes what it can, records each fix as a note, and then validates the
//! result exactly as strictly as [`parse_document`](crate::parse_document).

use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::model::{validate, Document};

/// A document recovered from malformed input, with the repairs applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Repaired {
    /// The parsed and validated document
    pub document: Document,

    /// Human-readable description of each repair, in the order applied
    pub notes: Vec<String>,
}

impl Repaired {
    /// Check if any repair was needed.
    pub fn was_repaired(&self) -> bool {
        !self.notes.is_empty()
    }

    /// One-line summary of the repairs.
    pub fn summary(&self) -> String {
        if self.notes.is_empty() {
            "No repairs needed".to_string()
        } else {
            format!("{} repair(s): {}", self.notes.len(), self.notes.join("; "))
        }
    }
}

/// Parse a document description, repairing common mistakes.
///
/// # Example
///
/// ```
/// use notesetter::parse_document_lenient;
///
/// let repaired = parse_document_lenient(r#"{"blocks": [{"text": "Hi"},]}"#)?;
/// assert_eq!(repaired.document.block_count(), 1);
/// assert!(repaired.was_repaired());
/// # Ok::<(), notesetter::Error>(())
/// ```
pub fn parse_document_lenient(input: &str) -> Result<Repaired> {
    let mut notes = Vec::new();

    let value = match serde_json::from_str::<Value>(input) {
        Ok(value) => value,
        Err(e) => {
            log::info!("JSON parsing failed ({}), attempting repair", e);
            let repaired = repair_json_text(input, &mut notes)?;
            serde_json::from_str::<Value>(&repaired).map_err(|e| {
                Error::Json(format!(
                    "could not repair JSON after {} fix(es): {}",
                    notes.len(),
                    e
                ))
            })?
        }
    };

    let value = repair_structure(value, &mut notes)?;
    let document: Document =
        serde_json::from_value(value).map_err(|e| Error::validation("document", e.to_string()))?;
    validate(&document)?;

    if !notes.is_empty() {
        log::info!("document repaired with {} fix(es)", notes.len());
    }
    Ok(Repaired { document, notes })
}

/// Matches a complete JSON string literal, so that replacements can skip it.
const STRING_LITERAL: &str = r#""(?:[^"\\]|\\.)*""#;

fn pattern(source: &str) -> Result<Regex> {
    Regex::new(source).map_err(|e| Error::Render(format!("invalid repair pattern: {}", e)))
}

fn repair_json_text(input: &str, notes: &mut Vec<String>) -> Result<String> {
    let mut text = input.to_string();

    if let Some(stripped) = text.strip_prefix('\u{feff}') {
        text = stripped.to_string();
        notes.push("removed byte order mark".to_string());
    }

    let control = pattern(r"[\x00-\x08\x0b\x0c\x0e-\x1f\x7f]")?;
    if control.is_match(&text) {
        text = control.replace_all(&text, "").into_owned();
        notes.push("removed control characters".to_string());
    }

    let comments = pattern(&format!(r"{}|//[^\n]*|/\*[\s\S]*?\*/", STRING_LITERAL))?;
    let mut removed = false;
    text = comments
        .replace_all(&text, |caps: &Captures| {
            let matched = &caps[0];
            if matched.starts_with('"') {
                matched.to_string()
            } else {
                removed = true;
                String::new()
            }
        })
        .into_owned();
    if removed {
        notes.push("removed comments".to_string());
    }

    let strings = pattern(STRING_LITERAL)?;
    let mut escaped = false;
    text = strings
        .replace_all(&text, |caps: &Captures| {
            let literal = &caps[0];
            if literal.contains(['\n', '\r', '\t']) {
                escaped = true;
                literal
                    .replace('\n', "\\n")
                    .replace('\r', "\\r")
                    .replace('\t', "\\t")
            } else {
                literal.to_string()
            }
        })
        .into_owned();
    if escaped {
        notes.push("escaped line breaks inside strings".to_string());
    }

    let closers = unclosed(&text);
    if closers.in_string {
        text.push('"');
        notes.push("closed unterminated string".to_string());
    }
    if !closers.pending.is_empty() {
        text.extend(closers.pending.iter().rev());
        notes.push(format!("appended {} missing closing bracket(s)", closers.pending.len()));
    }

    let trailing = pattern(&format!(r"{}|,(\s*[}}\]])", STRING_LITERAL))?;
    let mut removed = false;
    text = trailing
        .replace_all(&text, |caps: &Captures| match caps.get(1) {
            Some(close) => {
                removed = true;
                close.as_str().to_string()
            }
            None => caps[0].to_string(),
        })
        .into_owned();
    if removed {
        notes.push("removed trailing commas".to_string());
    }

    Ok(text)
}

struct Unclosed {
    /// Closing characters still owed, innermost last
    pending: Vec<char>,
    in_string: bool,
}

fn unclosed(text: &str) -> Unclosed {
    let mut pending = Vec::new();
    let mut in_string = false;
    let mut escape = false;

    for c in text.chars() {
        if in_string {
            match c {
                _ if escape => escape = false,
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => pending.push('}'),
            '[' => pending.push(']'),
            '}' | ']' => {
                if pending.last() == Some(&c) {
                    pending.pop();
                }
            }
            _ => {}
        }
    }

    Unclosed { pending, in_string }
}

fn repair_structure(value: Value, notes: &mut Vec<String>) -> Result<Value> {
    let mut root = match value {
        Value::Object(map) => map,
        Value::Array(blocks) => {
            notes.push("wrapped top-level array as 'blocks'".to_string());
            let mut map = Map::new();
            map.insert("blocks".to_string(), Value::Array(blocks));
            map
        }
        other => {
            return Err(Error::validation(
                "document",
                format!("expected an object, got {}", type_name(&other)),
            ))
        }
    };

    if !matches!(root.get("meta"), Some(Value::Object(_))) {
        root.insert("meta".to_string(), Value::Object(Map::new()));
        notes.push("added missing 'meta' object".to_string());
    }

    let blocks = match root.remove("blocks") {
        Some(Value::Array(blocks)) => blocks,
        Some(Value::Null) | None => {
            notes.push("added missing 'blocks' array".to_string());
            Vec::new()
        }
        Some(other) => {
            notes.push("converted 'blocks' to an array".to_string());
            vec![other]
        }
    };

    let mut fixed = Vec::with_capacity(blocks.len());
    for (index, block) in blocks.into_iter().enumerate() {
        let path = format!("blocks[{}]", index);
        match block {
            Value::Object(map) => {
                if let Some(map) = repair_block(map, &path, notes) {
                    fixed.push(Value::Object(map));
                }
            }
            _ => notes.push(format!("dropped {}: not an object", path)),
        }
    }
    root.insert("blocks".to_string(), Value::Array(fixed));

    Ok(Value::Object(root))
}

fn repair_block(
    mut block: Map<String, Value>,
    path: &str,
    notes: &mut Vec<String>,
) -> Option<Map<String, Value>> {
    if !block.contains_key("type") {
        match infer_type(&block) {
            Some(kind) => {
                notes.push(format!("inferred {} type as '{}'", path, kind));
                block.insert("type".to_string(), Value::from(kind));
            }
            None => {
                notes.push(format!("dropped {}: cannot infer type", path));
                return None;
            }
        }
    }

    for key in ["text", "spans"] {
        if let Some(text) = block.get_mut(key) {
            repair_spans(text, &format!("{}.{}", path, key), notes);
        }
    }

    let kind = block.get("type").and_then(Value::as_str).unwrap_or_default().to_string();
    match kind.as_str() {
        "heading" => {
            let level = block.get("level").and_then(Value::as_u64);
            if !matches!(level, Some(1..=3)) {
                block.insert("level".to_string(), Value::from(1));
                notes.push(format!("set {} heading level to 1", path));
            }
        }
        "formula" if !block.contains_key("latex") => {
            notes.push(format!("dropped {}: formula without latex", path));
            return None;
        }
        "code" => {
            if let Some(Value::Array(lines)) = block.get("content") {
                if lines.iter().all(Value::is_string) {
                    let joined: Vec<&str> = lines.iter().filter_map(Value::as_str).collect();
                    let joined = joined.join("\n");
                    block.insert("content".to_string(), Value::from(joined));
                    notes.push(format!("joined {} content lines", path));
                }
            }
        }
        "list" => {
            if !block.contains_key("variant") {
                block.insert("variant".to_string(), Value::from("bullet"));
                notes.push(format!("added default variant to {}", path));
            }
            match block.get_mut("items") {
                Some(Value::Array(items)) => repair_items(items, &format!("{}.items", path), notes),
                _ => {
                    block.insert("items".to_string(), Value::Array(Vec::new()));
                    notes.push(format!("added empty items to {}", path));
                }
            }
        }
        "table" => {
            if let Some(Value::Array(rows)) = block.get_mut("rows") {
                repair_rows(rows, &format!("{}.rows", path), notes);
            }
        }
        _ => {}
    }

    Some(block)
}

fn infer_type(block: &Map<String, Value>) -> Option<&'static str> {
    let has = |key: &str| block.contains_key(key);
    if has("level") && has("text") {
        Some("heading")
    } else if has("text") || has("spans") {
        Some("paragraph")
    } else if has("latex") {
        Some("formula")
    } else if has("content") {
        Some("code")
    } else if has("items") {
        Some("list")
    } else if has("src") {
        Some("image")
    } else {
        None
    }
}

/// Normalize a rich-text value into an array of span objects.
fn repair_spans(text: &mut Value, path: &str, notes: &mut Vec<String>) {
    match text {
        Value::String(s) => {
            *text = Value::Array(vec![span(std::mem::take(s))]);
            notes.push(format!("converted {} to rich text", path));
        }
        Value::Array(spans) => {
            let mut fixed = Vec::with_capacity(spans.len());
            for (index, item) in std::mem::take(spans).into_iter().enumerate() {
                match item {
                    Value::String(s) => {
                        notes.push(format!("converted {}[{}] to a span", path, index));
                        fixed.push(span(s));
                    }
                    Value::Object(ref map) if map.get("text").is_some_and(Value::is_string) => {
                        fixed.push(item)
                    }
                    _ => notes.push(format!("dropped invalid span {}[{}]", path, index)),
                }
            }
            *spans = fixed;
        }
        _ => {}
    }
}

fn repair_items(items: &mut Vec<Value>, path: &str, notes: &mut Vec<String>) {
    for (index, item) in items.iter_mut().enumerate() {
        let item_path = format!("{}[{}]", path, index);
        if let Value::String(s) = item {
            let mut map = Map::new();
            map.insert("text".to_string(), Value::Array(vec![span(std::mem::take(s))]));
            *item = Value::Object(map);
            notes.push(format!("converted {} to a list item", item_path));
            continue;
        }
        if let Value::Object(map) = item {
            for key in ["text", "spans"] {
                if let Some(text) = map.get_mut(key) {
                    repair_spans(text, &format!("{}.{}", item_path, key), notes);
                }
            }
            if let Some(Value::Array(children)) = map.get_mut("children") {
                repair_items(children, &format!("{}.children", item_path), notes);
            }
        }
    }
}

fn repair_rows(rows: &mut [Value], path: &str, notes: &mut Vec<String>) {
    for (r, row) in rows.iter_mut().enumerate() {
        let row_path = format!("{}[{}]", path, r);
        if let Value::Array(cells) = row {
            let mut map = Map::new();
            map.insert("cells".to_string(), Value::Array(std::mem::take(cells)));
            *row = Value::Object(map);
            notes.push(format!("wrapped {} cells", row_path));
        }
        if let Some(Value::Array(cells)) = row.get_mut("cells") {
            for (c, cell) in cells.iter_mut().enumerate() {
                repair_spans(cell, &format!("{}.cells[{}]", row_path, c), notes);
            }
        }
    }
}

fn span(text: String) -> Value {
    let mut map = Map::new();
    map.insert("text".to_string(), Value::String(text));
    Value::Object(map)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
