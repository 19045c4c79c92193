//! Layout statistics.

use serde::{Deserialize, Serialize};

use crate::layout::{BlockKind, BlockLayout};

/// Statistics collected while paginating a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutStats {
    /// Total number of pages produced
    pub page_count: u32,

    /// Number of headings placed
    pub heading_count: u32,

    /// Number of paragraphs placed
    pub paragraph_count: u32,

    /// Number of captions placed
    pub caption_count: u32,

    /// Number of list items, nested items included
    pub list_item_count: u32,

    /// Number of tables placed
    pub table_count: u32,

    /// Number of table rows, header rows included
    pub table_row_count: u32,

    /// Number of code blocks placed
    pub code_block_count: u32,

    /// Number of formulas placed
    pub formula_count: u32,

    /// Number of images placed
    pub image_count: u32,

    /// Images replaced by their alt text
    pub degraded_image_count: u32,

    /// Number of exercise areas placed
    pub exercise_count: u32,

    /// Number of ornamental breaks
    pub break_count: u32,

    /// Number of explicit page breaks
    pub page_break_count: u32,

    /// Wrapped text lines
    pub line_count: u32,

    /// Blocks divided across a page boundary (one per boundary)
    pub split_count: u32,

    /// Pieces placed even though they did not fit a fresh page
    pub overflow_count: u32,
}

impl LayoutStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment page count.
    pub fn add_page(&mut self) {
        self.page_count += 1;
    }

    /// Increment split count.
    pub fn add_split(&mut self) {
        self.split_count += 1;
    }

    /// Increment overflow count.
    pub fn add_overflow(&mut self) {
        self.overflow_count += 1;
    }

    /// Count one laid-out block.
    pub fn count_block(&mut self, layout: &BlockLayout) {
        let items = layout.item_count as u32;
        match layout.kind {
            BlockKind::Heading => self.heading_count += 1,
            BlockKind::Paragraph => self.paragraph_count += 1,
            BlockKind::Caption => self.caption_count += 1,
            BlockKind::List => self.list_item_count += items,
            BlockKind::Table => {
                self.table_count += 1;
                self.table_row_count += items;
            }
            BlockKind::Code => self.code_block_count += 1,
            BlockKind::Formula => self.formula_count += 1,
            BlockKind::Image if layout.degraded => self.degraded_image_count += 1,
            BlockKind::Image => self.image_count += 1,
            BlockKind::Exercise => self.exercise_count += 1,
            BlockKind::Break => self.break_count += 1,
            BlockKind::PageBreak => self.page_break_count += 1,
        }
        self.line_count += layout.line_count as u32;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &LayoutStats) {
        self.page_count += other.page_count;
        self.heading_count += other.heading_count;
        self.paragraph_count += other.paragraph_count;
        self.caption_count += other.caption_count;
        self.list_item_count += other.list_item_count;
        self.table_count += other.table_count;
        self.table_row_count += other.table_row_count;
        self.code_block_count += other.code_block_count;
        self.formula_count += other.formula_count;
        self.image_count += other.image_count;
        self.degraded_image_count += other.degraded_image_count;
        self.exercise_count += other.exercise_count;
        self.break_count += other.break_count;
        self.page_break_count += other.page_break_count;
        self.line_count += other.line_count;
        self.split_count += other.split_count;
        self.overflow_count += other.overflow_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_block() {
        let mut stats = LayoutStats::new();
        let mut table = BlockLayout::empty(BlockKind::Table).counting_items(5);
        table.line_count = 10;
        stats.count_block(&table);
        let mut image = BlockLayout::empty(BlockKind::Image);
        image.degraded = true;
        stats.count_block(&image);

        assert_eq!(stats.table_count, 1);
        assert_eq!(stats.table_row_count, 5);
        assert_eq!(stats.line_count, 10);
        assert_eq!(stats.image_count, 0);
        assert_eq!(stats.degraded_image_count, 1);
    }

    #[test]
    fn test_stats_merge() {
        let mut a = LayoutStats::new();
        a.add_page();
        a.add_split();

        let mut b = LayoutStats::new();
        b.add_page();
        b.add_page();
        b.add_overflow();

        a.merge(&b);
        assert_eq!(a.page_count, 3);
        assert_eq!(a.split_count, 1);
        assert_eq!(a.overflow_count, 1);
    }
}
