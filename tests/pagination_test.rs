//! Integration tests for page distribution.

use notesetter::model::MM_TO_PT;
use notesetter::{
    render_document, render_document_with_options, Block, Document, DrawCommand, Engine,
    ExerciseVariant, LayoutOptions, Meta, PageSize, PaginationRules, Span, TableRow,
};

const MARGIN: f64 = 20.0 * MM_TO_PT;

fn words(n: usize) -> String {
    vec!["abcd"; n].join(" ")
}

/// Sixteen four-letter words fill one body line on A4 with 20 mm margins.
fn lines(n: usize) -> Block {
    Block::paragraph(words(16 * n))
}

fn first_baseline(commands: &[DrawCommand]) -> Option<f64> {
    commands.iter().find_map(|cmd| match cmd {
        DrawCommand::PlaceTextRun { y, .. } => Some(*y),
        _ => None,
    })
}

fn table(rows: usize) -> Block {
    let mut all = vec![TableRow::from_texts(&["Name", "Kind", "Size"])];
    all.extend(
        (1..rows).map(|i| TableRow::from_texts(&[format!("r{}", i), "x".into(), "y".into()])),
    );
    Block::table(3, all)
}

#[test]
fn test_empty_document_is_one_blank_page() {
    let rendered = render_document(&Document::new()).unwrap();
    assert_eq!(rendered.page_count(), 1);
    assert!(rendered.pages[0].is_blank());
    assert_eq!(rendered.stats.page_count, 1);
}

#[test]
fn test_page_breaks() {
    let p = || Block::paragraph("x");

    // Trailing break adds nothing.
    let doc = Document::with_blocks(vec![p(), Block::PageBreak]);
    assert_eq!(render_document(&doc).unwrap().page_count(), 1);

    // Leading and consecutive breaks leave blank pages.
    let doc = Document::with_blocks(vec![
        Block::PageBreak,
        p(),
        Block::PageBreak,
        Block::PageBreak,
        p(),
    ]);
    let rendered = render_document(&doc).unwrap();
    assert_eq!(rendered.page_count(), 4);
    let blank: Vec<bool> = rendered.pages.iter().map(|p| p.is_blank()).collect();
    assert_eq!(blank, vec![true, false, true, false]);
    assert_eq!(rendered.stats.page_break_count, 3);

    let numbers: Vec<u32> = rendered.pages.iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
}

#[test]
fn test_page_break_occupies_no_height() {
    let doc = Document::with_blocks(vec![lines(1), Block::PageBreak, lines(1)]);
    let rendered = render_document(&doc).unwrap();
    assert_eq!(rendered.page_count(), 2);

    let first = first_baseline(&rendered.pages[0].commands).unwrap();
    let second = first_baseline(&rendered.pages[1].commands).unwrap();
    assert_eq!(first, second);
    assert!((first - (MARGIN + 9.6)).abs() < 1e-9);
}

#[test]
fn test_long_paragraph_flows_over_pages() {
    // 16pt per line (12pt plus a 4pt gap) into 728.5pt of content.
    let doc = Document::with_blocks(vec![lines(100)]);
    let rendered = render_document(&doc).unwrap();

    assert_eq!(rendered.page_count(), 3);
    let per_page: Vec<usize> = rendered.pages.iter().map(|p| p.texts().count()).collect();
    assert_eq!(per_page, vec![45, 45, 10]);
    assert_eq!(rendered.stats.split_count, 2);
    assert_eq!(rendered.stats.line_count, 100);
}

#[test]
fn test_widow_control_moves_an_extra_line() {
    // The exercise leaves room for 8 lines; a 9-line paragraph would leave
    // a lone widow, so only 7 lines stay.
    let doc = Document::with_blocks(vec![
        Block::exercise(ExerciseVariant::Blank, 200.0),
        lines(9),
    ]);
    let rendered = render_document(&doc).unwrap();

    assert_eq!(rendered.page_count(), 2);
    assert_eq!(rendered.pages[0].texts().count(), 7);
    assert_eq!(rendered.pages[1].texts().count(), 2);

    let relaxed = render_document_with_options(
        &doc,
        LayoutOptions::new().with_pagination(PaginationRules::relaxed()),
    )
    .unwrap();
    assert_eq!(relaxed.pages[0].texts().count(), 8);
    assert_eq!(relaxed.pages[1].texts().count(), 1);
}

#[test]
fn test_space_before_dropped_at_page_top() {
    let doc = Document::with_blocks(vec![lines(45), lines(3)]);
    let rendered = render_document(&doc).unwrap();

    assert_eq!(rendered.page_count(), 2);
    let top = first_baseline(&rendered.pages[1].commands).unwrap();
    assert!((top - (MARGIN + 9.6)).abs() < 1e-9);
}

#[test]
fn test_heading_kept_with_next_block() {
    // 41 lines leave 64.5pt: room for the heading, not for two lines after it.
    let doc = Document::with_blocks(vec![
        lines(41),
        Block::heading(2, vec![Span::new("Next section")]),
        lines(3),
    ]);
    let rendered = render_document(&doc).unwrap();

    assert_eq!(rendered.page_count(), 2);
    assert!(!rendered.pages[0].texts().any(|t| t == "Next section"));
    assert_eq!(rendered.pages[1].texts().next(), Some("Next section"));

    let loose = Engine::new()
        .with_options(LayoutOptions::new().with_pagination(PaginationRules {
            keep_heading_with_next: false,
            ..PaginationRules::default()
        }))
        .render(&doc)
        .unwrap();
    assert!(loose.pages[0].texts().any(|t| t == "Next section"));
}

#[test]
fn test_table_header_not_repeated_by_default() {
    let doc = Document::with_blocks(vec![table(50)]);
    let rendered = render_document(&doc).unwrap();

    assert!(rendered.page_count() >= 2);
    let headers = rendered.texts().filter(|t| *t == "Name").count();
    assert_eq!(headers, 1);
    assert_eq!(rendered.stats.table_row_count, 50);
    assert_eq!(rendered.stats.split_count, 1);

    // Every row shows up exactly once.
    for i in 1..50 {
        let label = format!("r{}", i);
        assert_eq!(rendered.texts().filter(|t| *t == label).count(), 1);
    }
}

#[test]
fn test_table_header_repeated_when_enabled() {
    let doc = Document::with_blocks(vec![table(50)]);
    let rendered = Engine::new()
        .with_options(LayoutOptions::new().with_repeat_table_header(true))
        .render(&doc)
        .unwrap();

    assert_eq!(rendered.page_count(), 2);
    for page in &rendered.pages {
        assert_eq!(page.texts().next(), Some("Name"));
    }
}

#[test]
fn test_oversized_block_is_placed_and_counted() {
    let doc = Document::with_blocks(vec![
        Block::paragraph("before"),
        Block::heading(1, vec![Span::new(words(400))]),
        Block::paragraph("after"),
    ]);
    let rendered = render_document(&doc).unwrap();

    assert_eq!(rendered.stats.overflow_count, 1);
    assert_eq!(rendered.page_count(), 3);
    assert_eq!(rendered.pages[0].texts().collect::<Vec<_>>(), vec!["before"]);
    assert_eq!(rendered.pages[2].texts().collect::<Vec<_>>(), vec!["after"]);
}

#[test]
fn test_letter_page_size() {
    let doc = Document::with_blocks(vec![lines(1)])
        .with_meta(Meta::default().with_page_size(PageSize::Letter).with_margin_mm(10.0));
    let rendered = render_document(&doc).unwrap();

    assert_eq!(rendered.page_width, 612.0);
    assert_eq!(rendered.page_height, 792.0);
    assert_eq!((rendered.pages[0].width, rendered.pages[0].height), (612.0, 792.0));
}

#[test]
fn test_pages_never_overrun_bottom_margin() {
    let doc = Document::with_blocks(vec![
        lines(30),
        Block::code(None, (0..80).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n")),
        table(40),
        lines(20),
    ]);
    let rendered = render_document(&doc).unwrap();
    assert_eq!(rendered.stats.overflow_count, 0);

    let bottom = rendered.page_height - MARGIN;
    for page in &rendered.pages {
        for cmd in &page.commands {
            let (_, lowest) = cmd.vertical_extent();
            assert!(lowest <= bottom + 1e-6, "page {}: {:?}", page.number, cmd);
        }
    }
}
