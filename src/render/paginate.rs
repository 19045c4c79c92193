//! Pagination: places laid-out blocks onto pages.
//!
//! The paginator consumes [`BlockLayout`]s in document order and keeps a
//! [`PageCursor`] for the page being filled. A block that does not fit is
//! split between units when it is splittable and the split respects the
//! widow and orphan limits, or moved whole to the next page otherwise. A
//! piece that does not fit even an empty page is placed anyway and counted
//! as an overflow.
//!
//! Vertical spacing collapses at page edges: `space_before` is dropped at
//! the top of a page and `space_after` never pushes past the bottom.

use super::{DrawCommand, LayoutStats, RenderedPage};
use crate::layout::{BlockKind, BlockLayout, LayoutUnit};
use crate::style::{PageGeometry, PaginationRules};

/// Slack for floating-point height comparisons.
const EPSILON: f64 = 1e-6;

/// Pagination state, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginatorState {
    AccumulatingPage,
    Flushing,
    Done,
}

/// Position on the page being filled.
#[derive(Debug, Clone, Default)]
pub struct PageCursor {
    /// 0-indexed page number
    pub page_index: usize,
    /// Vertical space already consumed
    pub used: f64,
    pub content_width: f64,
    pub content_height: f64,
    commands: Vec<DrawCommand>,
    has_content: bool,
}

impl PageCursor {
    fn new(page_index: usize, geometry: &PageGeometry) -> Self {
        Self {
            page_index,
            used: 0.0,
            content_width: geometry.content_width(),
            content_height: geometry.content_height(),
            commands: Vec::new(),
            has_content: false,
        }
    }

    /// Remaining vertical budget.
    pub fn remaining(&self) -> f64 {
        (self.content_height - self.used).max(0.0)
    }

    /// Whether anything has been placed on the page.
    pub fn has_content(&self) -> bool {
        self.has_content
    }
}

/// Page-filling state machine.
pub struct Paginator {
    geometry: PageGeometry,
    rules: PaginationRules,
    cursor: PageCursor,
    pages: Vec<RenderedPage>,
    stats: LayoutStats,
    state: PaginatorState,
}

impl Paginator {
    pub fn new(geometry: PageGeometry, rules: PaginationRules) -> Self {
        Self {
            cursor: PageCursor::new(0, &geometry),
            geometry,
            rules,
            pages: Vec::new(),
            stats: LayoutStats::new(),
            state: PaginatorState::AccumulatingPage,
        }
    }

    pub fn state(&self) -> PaginatorState {
        self.state
    }

    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    /// Place one block. `next` is the block that follows it, if any.
    pub fn place(&mut self, layout: &BlockLayout, next: Option<&BlockLayout>) {
        if layout.page_break {
            self.stats.count_block(layout);
            self.flush();
            return;
        }
        if layout.units.is_empty() {
            return;
        }
        self.stats.count_block(layout);

        if self.should_keep_with_next(layout, next) {
            log::debug!(
                "page {}: moving {:?} to keep it with the next block",
                self.cursor.page_index + 1,
                layout.kind
            );
            self.flush();
        }

        let units = layout.units.as_slice();
        let mut start = 0;
        let mut continuation = false;
        loop {
            let lead = if self.cursor.has_content {
                layout.space_before
            } else {
                0.0
            };
            let head = if continuation {
                layout.repeat_head.as_ref()
            } else {
                None
            };
            let fixed = lead + layout.frame_padding() + head.map_or(0.0, |u| u.height);
            let rest = &units[start..];
            let budget = self.cursor.remaining() - fixed;

            if height_of(rest) <= budget + EPSILON {
                self.emit(layout, head, rest, lead);
                self.cursor.used =
                    (self.cursor.used + layout.space_after).min(self.cursor.content_height);
                return;
            }

            if layout.splittable && rest.len() >= 2 {
                let mut split = best_split(rest, budget, layout.min_head, layout.min_tail);
                if split.is_none() && !self.cursor.has_content {
                    split = best_split(rest, budget, 1, 1);
                }
                if let Some(k) = split {
                    self.emit(layout, head, &rest[..k], lead);
                    self.stats.add_split();
                    self.flush();
                    start += k;
                    continuation = true;
                    continue;
                }
            }

            if self.cursor.has_content {
                self.flush();
                continue;
            }

            // Nothing fits on an empty page.
            let take = if layout.splittable { 1 } else { rest.len() };
            log::warn!(
                "{:?} block taller than the page ({:.1}pt > {:.1}pt), placing anyway",
                layout.kind,
                fixed + height_of(&rest[..take]),
                self.cursor.content_height
            );
            self.stats.add_overflow();
            self.emit(layout, head, &rest[..take], lead);
            if take == rest.len() {
                self.cursor.used = self.cursor.content_height;
                return;
            }
            self.flush();
            start += take;
            continuation = true;
        }
    }

    /// Flush the last page and return the pages with their statistics.
    pub fn finish(mut self) -> (Vec<RenderedPage>, LayoutStats) {
        if self.cursor.has_content || self.pages.is_empty() {
            self.flush();
        }
        self.transition(PaginatorState::Done);
        (self.pages, self.stats)
    }

    fn should_keep_with_next(&self, layout: &BlockLayout, next: Option<&BlockLayout>) -> bool {
        if layout.kind != BlockKind::Heading
            || !self.rules.keep_heading_with_next
            || !self.cursor.has_content
        {
            return false;
        }
        let Some(next) = next.filter(|n| !n.page_break && !n.units.is_empty()) else {
            return false;
        };
        let heading = layout.frame_padding() + layout.content_height() + layout.space_after;
        let together = layout.space_before + heading + next.min_lead_height();
        let remaining = self.cursor.remaining();
        layout.required_height() <= remaining + EPSILON
            && together > remaining + EPSILON
            && heading + next.min_lead_height() - next.space_before
                <= self.cursor.content_height + EPSILON
    }

    /// Draw a piece of `layout` at the cursor.
    fn emit(
        &mut self,
        layout: &BlockLayout,
        head: Option<&LayoutUnit>,
        units: &[LayoutUnit],
        lead: f64,
    ) {
        let margin = self.geometry.margin;
        let top = margin + self.cursor.used + lead;
        let padding = layout.frame.as_ref().map_or(0.0, |f| f.padding);
        let body = head.map_or(0.0, |u| u.height) + height_of(units);

        if let Some(frame) = &layout.frame {
            self.cursor
                .commands
                .extend(frame.commands(margin, top, body + 2.0 * padding));
        }
        let mut y = top + padding;
        for unit in head.into_iter().chain(units) {
            self.cursor
                .commands
                .extend(unit.commands.iter().map(|c| c.translated(margin, y)));
            y += unit.height;
        }

        self.cursor.used += lead + body + 2.0 * padding;
        self.cursor.has_content = true;
    }

    fn flush(&mut self) {
        self.transition(PaginatorState::Flushing);
        let index = self.pages.len();
        let mut page = RenderedPage::new(
            index as u32 + 1,
            self.geometry.page_width,
            self.geometry.page_height,
        );
        page.commands = std::mem::take(&mut self.cursor.commands);
        log::debug!(
            "page {} complete: {} commands, {:.1}pt used",
            page.number,
            page.commands.len(),
            self.cursor.used
        );
        self.pages.push(page);
        self.stats.add_page();
        self.cursor = PageCursor::new(index + 1, &self.geometry);
        self.transition(PaginatorState::AccumulatingPage);
    }

    fn transition(&mut self, to: PaginatorState) {
        log::debug!(
            "paginator: {:?} -> {:?} (page {})",
            self.state,
            to,
            self.cursor.page_index + 1
        );
        self.state = to;
    }
}

fn height_of(units: &[LayoutUnit]) -> f64 {
    units.iter().map(|u| u.height).sum()
}

/// Largest prefix length that fits `budget`, keeps at least `min_head`
/// units and leaves at least `min_tail` units.
fn best_split(units: &[LayoutUnit], budget: f64, min_head: usize, min_tail: usize) -> Option<usize> {
    let max_head = units.len().checked_sub(min_tail.max(1))?;
    let mut height = 0.0;
    let mut best = None;
    for (i, unit) in units.iter().enumerate().take(max_head) {
        height += unit.height;
        if height > budget + EPSILON {
            break;
        }
        if i + 1 >= min_head.max(1) {
            best = Some(i + 1);
        }
    }
    best
}

/// Paginate a sequence of block layouts.
pub fn paginate(
    layouts: &[BlockLayout],
    geometry: PageGeometry,
    rules: PaginationRules,
) -> (Vec<RenderedPage>, LayoutStats) {
    let mut paginator = Paginator::new(geometry, rules);
    for (i, layout) in layouts.iter().enumerate() {
        paginator.place(layout, layouts.get(i + 1));
    }
    paginator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageSize;
    use crate::style::Color;

    /// 100pt of content height: a 200pt page with 50pt margins.
    fn geometry() -> PageGeometry {
        PageGeometry {
            page_width: 200.0,
            page_height: 200.0,
            margin: 50.0,
        }
    }

    fn marker(tag: &str) -> DrawCommand {
        DrawCommand::PlaceTextRun {
            x: 0.0,
            y: 0.0,
            font: Default::default(),
            size: 10.0,
            color: Color::BLACK,
            text: tag.to_string(),
        }
    }

    fn block(kind: BlockKind, heights: &[f64]) -> BlockLayout {
        let units = heights
            .iter()
            .enumerate()
            .map(|(i, h)| LayoutUnit::new(*h, vec![marker(&format!("{}", i))]))
            .collect();
        BlockLayout::empty(kind).with_units(units)
    }

    fn para(lines: usize) -> BlockLayout {
        block(BlockKind::Paragraph, &vec![10.0; lines]).splittable(2, 2)
    }

    fn run(layouts: &[BlockLayout]) -> (Vec<RenderedPage>, LayoutStats) {
        paginate(layouts, geometry(), PaginationRules::default())
    }

    fn lines_per_page(pages: &[RenderedPage]) -> Vec<usize> {
        pages.iter().map(|p| p.texts().count()).collect()
    }

    #[test]
    fn test_empty_document_has_one_page() {
        let (pages, stats) = run(&[]);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].is_blank());
        assert_eq!(stats.page_count, 1);
    }

    #[test]
    fn test_fits_on_one_page() {
        let (pages, _) = run(&[para(3), para(3)]);
        assert_eq!(pages.len(), 1);
        assert_eq!(lines_per_page(&pages), vec![6]);
    }

    #[test]
    fn test_units_translated_to_page() {
        let layouts = [para(1).with_spacing(5.0, 5.0), para(1).with_spacing(5.0, 5.0)];
        let (pages, _) = run(&layouts);
        let ys: Vec<f64> = pages[0]
            .commands
            .iter()
            .map(|c| c.vertical_extent().0)
            .collect();
        // First block drops its leading space at the page top.
        assert_eq!(ys, vec![50.0, 70.0]);
        match &pages[0].commands[0] {
            DrawCommand::PlaceTextRun { x, .. } => assert_eq!(*x, 50.0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_split_respects_widows_and_orphans() {
        // 9 lines used, 1 line left: an orphan would be needed, so move.
        let layouts = [para(9), para(4)];
        let (pages, stats) = run(&layouts);
        assert_eq!(lines_per_page(&pages), vec![9, 4]);
        assert_eq!(stats.split_count, 0);

        // 7 lines used, 3 left: 3 of 4 would leave a widow, so 2 + 2.
        let layouts = [para(7), para(4)];
        let (pages, stats) = run(&layouts);
        assert_eq!(lines_per_page(&pages), vec![9, 2]);
        assert_eq!(stats.split_count, 1);
    }

    #[test]
    fn test_long_paragraph_spans_pages() {
        let (pages, stats) = run(&[para(25)]);
        assert_eq!(lines_per_page(&pages), vec![10, 10, 5]);
        assert_eq!(stats.split_count, 2);
        assert_eq!(stats.page_count, 3);
    }

    #[test]
    fn test_unsplittable_moves_whole() {
        let layouts = [para(6), block(BlockKind::Heading, &[50.0])];
        let (pages, _) = run(&layouts);
        assert_eq!(lines_per_page(&pages), vec![6, 1]);
    }

    #[test]
    fn test_overflow_placed_on_fresh_page() {
        let layouts = [para(2), block(BlockKind::Image, &[300.0]), para(2)];
        let (pages, stats) = run(&layouts);
        assert_eq!(lines_per_page(&pages), vec![2, 1, 2]);
        assert_eq!(stats.overflow_count, 1);
    }

    #[test]
    fn test_oversized_unit_in_splittable_block() {
        let layouts = [block(BlockKind::Code, &[10.0, 150.0, 10.0]).splittable(1, 1)];
        let (pages, stats) = run(&layouts);
        assert_eq!(lines_per_page(&pages), vec![1, 1, 1]);
        assert_eq!(stats.overflow_count, 1);
    }

    #[test]
    fn test_relaxed_on_fresh_page() {
        // Three 40pt lines on a 100pt page cannot honor 2/2.
        let layouts = [block(BlockKind::Paragraph, &[40.0, 40.0, 40.0]).splittable(2, 2)];
        let (pages, stats) = run(&layouts);
        assert_eq!(lines_per_page(&pages), vec![2, 1]);
        assert_eq!(stats.overflow_count, 0);
    }

    #[test]
    fn test_page_breaks() {
        let (pages, stats) = run(&[para(1), BlockLayout::page_break(), para(1)]);
        assert_eq!(lines_per_page(&pages), vec![1, 1]);
        assert_eq!(stats.page_break_count, 1);

        // Leading and doubled breaks give blank pages; trailing does not.
        let layouts = [
            BlockLayout::page_break(),
            para(1),
            BlockLayout::page_break(),
            BlockLayout::page_break(),
            para(1),
            BlockLayout::page_break(),
        ];
        let (pages, _) = run(&layouts);
        assert_eq!(lines_per_page(&pages), vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_page_break_takes_no_space() {
        let (with_break, _) = run(&[para(1), BlockLayout::page_break(), para(10)]);
        let (alone, _) = run(&[para(10)]);
        assert_eq!(with_break[1].commands, alone[0].commands);
    }

    #[test]
    fn test_space_after_collapses_at_bottom() {
        let layouts = [para(10).with_spacing(0.0, 30.0)];
        let (pages, stats) = run(&layouts);
        assert_eq!(pages.len(), 1);
        assert_eq!(stats.overflow_count, 0);
    }

    #[test]
    fn test_heading_kept_with_next() {
        let heading = block(BlockKind::Heading, &[20.0]);
        let layouts = [para(7), heading, para(4)];
        // 70 used; heading fits (90) but the paragraph's first two lines don't.
        let (pages, _) = run(&layouts);
        assert_eq!(lines_per_page(&pages), vec![7, 5]);

        let (pages, _) = paginate(
            &layouts,
            geometry(),
            PaginationRules {
                keep_heading_with_next: false,
                ..Default::default()
            },
        );
        assert_eq!(lines_per_page(&pages), vec![8, 4]);
    }

    #[test]
    fn test_frame_drawn_per_piece() {
        let frame = crate::layout::Frame {
            padding: 5.0,
            fill: Some(Color::WHITE),
            stroke: None,
            radius: 6.0,
            width: 100.0,
        };
        let code = block(BlockKind::Code, &[10.0; 15]).splittable(1, 1).with_frame(frame);
        let (pages, _) = run(&[code]);
        assert_eq!(pages.len(), 2);
        for page in &pages {
            assert!(matches!(page.commands[0], DrawCommand::FillRect { .. }));
        }
        // 100pt holds 5pt padding twice and nine lines.
        assert_eq!(lines_per_page(&pages), vec![9, 6]);
    }

    #[test]
    fn test_repeat_head_on_continuation() {
        let mut table = block(BlockKind::Table, &[10.0; 15]).splittable(1, 1);
        table.repeat_head = Some(LayoutUnit::new(10.0, vec![marker("head")]));
        let (pages, _) = run(&[table]);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].texts().next(), Some("head"));
        assert_eq!(pages[0].texts().filter(|t| *t == "head").count(), 0);
    }

    #[test]
    fn test_paginator_states() {
        let mut paginator = Paginator::new(
            PageGeometry::new(PageSize::A4, 20.0),
            PaginationRules::default(),
        );
        assert_eq!(paginator.state(), PaginatorState::AccumulatingPage);
        paginator.place(&para(3), None);
        assert!(paginator.cursor().has_content());
        assert_eq!(paginator.cursor().used, 30.0);
        let (pages, _) = paginator.finish();
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_best_split() {
        let units = vec![LayoutUnit::new(10.0, Vec::new()); 6];
        assert_eq!(best_split(&units, 35.0, 2, 2), Some(3));
        assert_eq!(best_split(&units, 100.0, 2, 2), Some(4));
        assert_eq!(best_split(&units, 15.0, 2, 2), None);
        assert_eq!(best_split(&units, 15.0, 1, 1), Some(1));
    }
}
