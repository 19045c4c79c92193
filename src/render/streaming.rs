//! Page stream: the boundary between layout and an output writer.
//!
//! A [`PageStream`] walks a finished [`RenderedDocument`] and yields
//! [`StreamEvent`]s one at a time, so a writer can translate commands into
//! its own format without holding a second copy of the output.
//!
//! # Example
//!
//! ```
//! use notesetter::render::{PageStream, StreamEvent};
//! use notesetter::{render_document, Block, Document};
//!
//! fn main() -> notesetter::Result<()> {
//!     let doc = Document::with_blocks(vec![Block::paragraph("Hello")]);
//!     let rendered = render_document(&doc)?;
//!
//!     for event in PageStream::new(&rendered) {
//!         match event {
//!             StreamEvent::PageStart { number, .. } => println!("page {}", number),
//!             StreamEvent::Command(cmd) => println!("  {:?}", cmd),
//!             _ => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```

use super::{DrawCommand, RenderedDocument};

/// Events emitted while streaming a rendered document.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent<'a> {
    /// Streaming has started.
    DocumentStart {
        title: Option<&'a str>,
        author: Option<&'a str>,
        /// Total number of pages
        page_count: u32,
    },

    /// A new page begins; commands that follow belong to it.
    PageStart {
        /// 1-indexed page number
        number: u32,
        width: f64,
        height: f64,
    },

    /// One draw command in page coordinates.
    Command(&'a DrawCommand),

    /// The current page is complete.
    PageEnd {
        /// 1-indexed page number
        number: u32,
    },

    /// All pages have been emitted.
    DocumentEnd,
}

impl StreamEvent<'_> {
    /// Check if this is a page boundary event.
    pub fn is_page_boundary(&self) -> bool {
        matches!(
            self,
            StreamEvent::PageStart { .. } | StreamEvent::PageEnd { .. }
        )
    }

    /// Check if this is a document boundary event.
    pub fn is_document_boundary(&self) -> bool {
        matches!(
            self,
            StreamEvent::DocumentStart { .. } | StreamEvent::DocumentEnd
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Initial,
    /// Before the page at `page_index` starts
    BetweenPages { page_index: usize },
    InPage { page_index: usize, command_index: usize },
    PagesComplete,
    Done,
}

/// Iterator over the events of a rendered document.
pub struct PageStream<'a> {
    doc: &'a RenderedDocument,
    state: StreamState,
}

impl<'a> PageStream<'a> {
    pub fn new(doc: &'a RenderedDocument) -> Self {
        Self {
            doc,
            state: StreamState::Initial,
        }
    }

    /// Check if streaming is complete.
    pub fn is_done(&self) -> bool {
        self.state == StreamState::Done
    }
}

impl<'a> Iterator for PageStream<'a> {
    type Item = StreamEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let doc: &'a RenderedDocument = self.doc;
        let pages = &doc.pages;
        match self.state {
            StreamState::Initial => {
                self.state = StreamState::BetweenPages { page_index: 0 };
                Some(StreamEvent::DocumentStart {
                    title: doc.title.as_deref(),
                    author: doc.author.as_deref(),
                    page_count: pages.len() as u32,
                })
            }

            StreamState::BetweenPages { page_index } => match pages.get(page_index) {
                Some(page) => {
                    self.state = StreamState::InPage {
                        page_index,
                        command_index: 0,
                    };
                    Some(StreamEvent::PageStart {
                        number: page.number,
                        width: page.width,
                        height: page.height,
                    })
                }
                None => {
                    self.state = StreamState::Done;
                    Some(StreamEvent::DocumentEnd)
                }
            },

            StreamState::InPage {
                page_index,
                command_index,
            } => {
                let page = &pages[page_index];
                match page.commands.get(command_index) {
                    Some(cmd) => {
                        self.state = StreamState::InPage {
                            page_index,
                            command_index: command_index + 1,
                        };
                        Some(StreamEvent::Command(cmd))
                    }
                    None => {
                        self.state = if page_index + 1 < pages.len() {
                            StreamState::BetweenPages {
                                page_index: page_index + 1,
                            }
                        } else {
                            StreamState::PagesComplete
                        };
                        Some(StreamEvent::PageEnd {
                            number: page.number,
                        })
                    }
                }
            }

            StreamState::PagesComplete => {
                self.state = StreamState::Done;
                Some(StreamEvent::DocumentEnd)
            }

            StreamState::Done => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{LayoutStats, RenderedPage};
    use crate::style::Color;

    fn doc(pages: usize, commands_per_page: usize) -> RenderedDocument {
        let pages = (0..pages)
            .map(|i| {
                let mut page = RenderedPage::new(i as u32 + 1, 100.0, 200.0);
                for _ in 0..commands_per_page {
                    page.commands.push(DrawCommand::FillRect {
                        x: 0.0,
                        y: 0.0,
                        w: 1.0,
                        h: 1.0,
                        color: Color::BLACK,
                        radius: 0.0,
                    });
                }
                page
            })
            .collect();
        RenderedDocument {
            title: Some("T".to_string()),
            author: None,
            font_family: "Helvetica".to_string(),
            page_width: 100.0,
            page_height: 200.0,
            pages,
            stats: LayoutStats::default(),
        }
    }

    #[test]
    fn test_event_order() {
        let rendered = doc(2, 1);
        let events: Vec<_> = PageStream::new(&rendered).collect();
        assert_eq!(events.len(), 8);
        assert!(matches!(
            events[0],
            StreamEvent::DocumentStart {
                title: Some("T"),
                page_count: 2,
                ..
            }
        ));
        assert!(matches!(events[1], StreamEvent::PageStart { number: 1, .. }));
        assert!(matches!(events[2], StreamEvent::Command(_)));
        assert!(matches!(events[3], StreamEvent::PageEnd { number: 1 }));
        assert!(matches!(events[4], StreamEvent::PageStart { number: 2, .. }));
        assert!(matches!(events[6], StreamEvent::PageEnd { number: 2 }));
        assert_eq!(events[7], StreamEvent::DocumentEnd);
    }

    #[test]
    fn test_blank_page_still_has_boundaries() {
        let rendered = doc(1, 0);
        let mut stream = PageStream::new(&rendered);
        let events: Vec<_> = stream.by_ref().collect();
        assert_eq!(events.len(), 4);
        assert!(events[1].is_page_boundary());
        assert!(events[2].is_page_boundary());
        assert!(events[3].is_document_boundary());
        assert!(stream.is_done());
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_no_pages() {
        let rendered = doc(0, 0);
        let events: Vec<_> = PageStream::new(&rendered).collect();
        assert_eq!(events.len(), 2);
    }
}
