//! Pagination – splits the positioned top-level boxes into pages.
//!
//! Handles:
//! - A4 page boundaries
//! - Keep-together hints (best effort: a block taller than a page still
//!   flows over several pages)
//! - Table row splitting across pages
//! - Horizontal text alignment, resolved into per-line offsets

use crate::fonts::FontManager;
use crate::layout::{BoxContent, PositionedBox};
use crate::layout_config::*;
use crate::style::{style_for, TextAlign};

/// Default page margins in points.
pub const PAGE_MARGIN_PT: f32 = 36.0;

struct Paginator<'a> {
    config: LayoutConfig,
    current_page: PageLayout,
    /// Document-space y at which the current page begins. All
    /// `PositionedBox.y` values are absolute document coordinates, so
    /// `pbox.y - page_start_doc_y` gives the y-on-page for any box.
    page_start_doc_y: f32,
    content_height: f32,
    page_margin: f32,
    fonts: &'a FontManager,
}

impl Paginator<'_> {
    fn place(&mut self, pbox: &PositionedBox) {
        let y_on_page = (pbox.y - self.page_start_doc_y).max(0.0);
        let page_is_empty = self.current_page.boxes.is_empty();
        let can_split = pbox.splittable && !pbox.children.is_empty();

        if y_on_page + pbox.height <= self.content_height || (page_is_empty && !can_split) {
            self.push(pbox);
            return;
        }

        let oversized = pbox.height > self.content_height;
        if can_split && (!pbox.page_break_inside_avoid || oversized) {
            if pbox.page_break_inside_avoid && !page_is_empty {
                self.break_page(pbox.y);
            }
            for child in &pbox.children {
                self.place(child);
            }
            return;
        }

        if !page_is_empty {
            self.break_page(pbox.y);
        }
        self.push(pbox);
    }

    fn push(&mut self, pbox: &PositionedBox) {
        let y_on_page = (pbox.y - self.page_start_doc_y).max(0.0);
        let layout_box = build_layout_box(pbox, pbox.x, self.page_margin + y_on_page, self.fonts);
        self.current_page.boxes.push(layout_box);
    }

    fn break_page(&mut self, next_start_doc_y: f32) {
        let finished = std::mem::replace(
            &mut self.current_page,
            PageLayout {
                page_index: self.config.pages.len() + 1,
                boxes: Vec::new(),
            },
        );
        self.config.pages.push(finished);
        self.page_start_doc_y = next_start_doc_y;
    }

    fn finish(mut self) -> LayoutConfig {
        if !self.current_page.boxes.is_empty() || self.config.pages.is_empty() {
            self.config.pages.push(self.current_page);
        }
        self.config
    }
}

/// Convert positioned boxes into a paginated LayoutConfig.
pub fn paginate(
    boxes: &[PositionedBox],
    page_width: f32,
    page_height: f32,
    page_margin: f32,
    fonts: &FontManager,
) -> LayoutConfig {
    let mut paginator = Paginator {
        config: LayoutConfig::new(page_width, page_height),
        current_page: PageLayout {
            page_index: 0,
            boxes: Vec::new(),
        },
        page_start_doc_y: 0.0,
        content_height: page_height - 2.0 * page_margin,
        page_margin,
        fonts,
    };

    for pbox in boxes {
        paginator.place(pbox);
    }

    let config = paginator.finish();
    log::debug!("paginated into {} page(s)", config.pages.len());
    config
}

/// Recursively build a LayoutBox tree where every box carries *page-absolute*
/// x/y coordinates (origin = top-left of the physical page).
///
/// Each child's PositionedBox.y is a document-space absolute, so
/// `child_abs_y = parent_abs_y + (child.y − parent.y)`.
fn build_layout_box(
    pbox: &PositionedBox,
    abs_x: f32,
    abs_y: f32,
    fonts: &FontManager,
) -> LayoutBox {
    let mut lb = LayoutBox::new(abs_x, abs_y, pbox.width, pbox.height);

    if let Some(fill) = pbox.fill.filter(|c| !c.is_transparent()) {
        lb.background_color = Some(fill.to_array());
    }

    if let Some(border) = pbox.border.filter(|b| b.width > 0.0) {
        lb.border = Some(BorderStyle {
            width: border.width,
            color: border.color.to_array(),
        });
    }

    if let BoxContent::Text { lines, role, align } = &pbox.content {
        let spec = style_for(*role);
        let line_height = fonts.line_height(&spec);
        let text_lines: Vec<TextLine> = lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let slack = (pbox.width - fonts.measure_text_width(line, &spec)).max(0.0);
                TextLine {
                    text: line.clone(),
                    x_offset: match align {
                        TextAlign::Left => 0.0,
                        TextAlign::Center => slack / 2.0,
                        TextAlign::Right => slack,
                    },
                    y_offset: i as f32 * line_height,
                }
            })
            .collect();

        lb.text = Some(TextContent {
            lines: text_lines,
            font_family: spec.family,
            font_size: spec.size,
            bold: spec.is_bold(),
            italic: spec.is_italic(),
            color: spec.color.to_array(),
            line_height,
            ascender: fonts.ascender(&spec),
            text_align: *align,
        });
    }

    for child in &pbox.children {
        let child_abs_y = abs_y + (child.y - pbox.y);
        lb.children
            .push(build_layout_box(child, child.x, child_abs_y, fonts));
    }

    lb
}
