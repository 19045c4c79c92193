//! Content block types.

use serde::{Deserialize, Deserializer, Serialize};

use super::span::Span;

/// One structural document unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Section heading, levels 1 to 3
    Heading {
        level: u8,
        #[serde(rename = "text", alias = "spans")]
        spans: Vec<Span>,
    },

    /// Body paragraph
    Paragraph {
        #[serde(rename = "text", alias = "spans")]
        spans: Vec<Span>,
    },

    /// Small muted line, usually under a figure
    Caption {
        #[serde(rename = "text", alias = "spans")]
        spans: Vec<Span>,
    },

    /// Bullet, numbered, task or toggle list
    List {
        #[serde(default)]
        variant: ListVariant,
        #[serde(default)]
        items: Vec<ListItem>,
    },

    /// Preformatted source code
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        content: String,
    },

    /// Display formula written in LaTeX
    Formula { latex: String },

    /// Grid of rich-text cells; the first row is the header
    Table {
        columns: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        widths: Option<Vec<f64>>,
        #[serde(default)]
        rows: Vec<TableRow>,
    },

    /// Ornamental separator
    Break {
        #[serde(default)]
        strength: BreakStrength,
    },

    /// Forced page transition
    PageBreak,

    /// Raster image resolved through the image collaborator
    Image {
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width_mm: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height_mm: Option<f64>,
        #[serde(default)]
        fit: ImageFit,
    },

    /// Empty area with a writing pattern
    Exercise {
        #[serde(default)]
        variant: ExerciseVariant,
        #[serde(default = "default_exercise_height")]
        height_mm: f64,
    },
}

fn default_exercise_height() -> f64 {
    40.0
}

impl Block {
    /// Create a heading block.
    pub fn heading(level: u8, spans: Vec<Span>) -> Self {
        Block::Heading { level, spans }
    }

    /// Create a paragraph from plain text.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph {
            spans: vec![Span::new(text)],
        }
    }

    /// Create a caption from plain text.
    pub fn caption(text: impl Into<String>) -> Self {
        Block::Caption {
            spans: vec![Span::new(text)],
        }
    }

    /// Create a list block.
    pub fn list(variant: ListVariant, items: Vec<ListItem>) -> Self {
        Block::List { variant, items }
    }

    /// Create a code block.
    pub fn code(language: Option<&str>, content: impl Into<String>) -> Self {
        Block::Code {
            language: language.map(str::to_string),
            content: content.into(),
        }
    }

    /// Create a formula block.
    pub fn formula(latex: impl Into<String>) -> Self {
        Block::Formula {
            latex: latex.into(),
        }
    }

    /// Create a table with equal column widths.
    pub fn table(columns: usize, rows: Vec<TableRow>) -> Self {
        Block::Table {
            columns,
            widths: None,
            rows,
        }
    }

    /// Create an image block sized from the image itself.
    pub fn image(src: impl Into<String>, alt: Option<&str>) -> Self {
        Block::Image {
            src: src.into(),
            alt: alt.map(str::to_string),
            width_mm: None,
            height_mm: None,
            fit: ImageFit::Contain,
        }
    }

    /// Create an exercise area.
    pub fn exercise(variant: ExerciseVariant, height_mm: f64) -> Self {
        Block::Exercise { variant, height_mm }
    }

    /// The wire name of this block's variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Heading { .. } => "heading",
            Block::Paragraph { .. } => "paragraph",
            Block::Caption { .. } => "caption",
            Block::List { .. } => "list",
            Block::Code { .. } => "code",
            Block::Formula { .. } => "formula",
            Block::Table { .. } => "table",
            Block::Break { .. } => "break",
            Block::PageBreak => "page_break",
            Block::Image { .. } => "image",
            Block::Exercise { .. } => "exercise",
        }
    }
}

/// List marker style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListVariant {
    #[default]
    Bullet,
    Number,
    Task,
    Toggle,
}

/// One list entry with optional nested entries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListItem {
    /// Item content
    #[serde(
        rename = "text",
        alias = "spans",
        default,
        deserialize_with = "null_as_default"
    )]
    pub spans: Vec<Span>,

    /// Completion state for task lists
    #[serde(default, deserialize_with = "null_as_default")]
    pub checked: bool,

    /// Nested items
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<ListItem>,
}

impl ListItem {
    /// Create an item from plain text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            spans: vec![Span::new(text)],
            ..Default::default()
        }
    }

    /// Set the checked state.
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Set nested items.
    pub fn with_children(mut self, children: Vec<ListItem>) -> Self {
        self.children = children;
        self
    }

    /// Total number of items in this subtree, including this one.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ListItem::count).sum::<usize>()
    }
}

/// A table row; each cell is a short run of spans.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<Vec<Span>>,
}

impl TableRow {
    /// Create a row of plain-text cells.
    pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Self {
        Self {
            cells: texts
                .iter()
                .map(|t| vec![Span::new(t.as_ref())])
                .collect(),
        }
    }
}

/// Visual weight of an ornamental break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakStrength {
    ExtraLight,
    Light,
    #[default]
    Regular,
    Strong,
}

/// How an image fills an explicit box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFit {
    #[default]
    Contain,
    Cover,
}

/// Pattern drawn inside an exercise area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseVariant {
    #[default]
    Ruled,
    Dotgrid,
    Square,
    Blank,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_tagging() {
        let block: Block =
            serde_json::from_str(r#"{"type": "heading", "level": 2, "text": [{"text": "Hi"}]}"#)
                .unwrap();
        assert_eq!(block, Block::heading(2, vec![Span::new("Hi")]));

        let json = serde_json::to_string(&Block::PageBreak).unwrap();
        assert_eq!(json, r#"{"type":"page_break"}"#);
    }

    #[test]
    fn test_list_item_nulls() {
        let item: ListItem =
            serde_json::from_str(r#"{"text": null, "checked": null, "children": null}"#).unwrap();
        assert!(item.spans.is_empty());
        assert!(!item.checked);
        assert!(item.children.is_empty());
    }

    #[test]
    fn test_block_defaults() {
        let block: Block = serde_json::from_str(r#"{"type": "break"}"#).unwrap();
        assert_eq!(
            block,
            Block::Break {
                strength: BreakStrength::Regular
            }
        );

        let block: Block = serde_json::from_str(r#"{"type": "image", "src": "a.png"}"#).unwrap();
        assert_eq!(block, Block::image("a.png", None));
    }

    #[test]
    fn test_unknown_block_type_rejected() {
        let result = serde_json::from_str::<Block>(r#"{"type": "card", "text": []}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_list_item_count() {
        let item = ListItem::new("a").with_children(vec![
            ListItem::new("b"),
            ListItem::new("c").with_children(vec![ListItem::new("d")]),
        ]);
        assert_eq!(item.count(), 4);
    }

    #[test]
    fn test_break_strength_order() {
        assert!(BreakStrength::ExtraLight < BreakStrength::Light);
        assert!(BreakStrength::Regular < BreakStrength::Strong);
    }
}
