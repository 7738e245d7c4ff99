//! Layout engine – uses Taffy to position the assembled node tree, then
//! converts the result into a tree of positioned boxes in document
//! coordinates.
//!
//! Groups become flex columns, tables become CSS grids with one fixed track
//! per column and explicit row/column spans, cells become padded flex
//! columns whose main-axis justification gives the vertical alignment.

use std::collections::HashMap;
use taffy::prelude::*;

use crate::error::{Error, Result};
use crate::fonts::{wrap_text, FontManager};
use crate::node::{LayoutNode, TextRun};
use crate::style::{style_for, Color, StyleRole, TextAlign, VerticalAlign};
use crate::table::{Border, Cell, Table, CELL_PADDING};

/// Taffy grid lines are `i16`, so a table may span at most this many rows
/// (or columns) with room left for the closing line.
pub const MAX_GRID_ROWS: usize = i16::MAX as usize - 1;

// ---------------------------------------------------------------------------
// Intermediate layout tree (pre-pagination)
// ---------------------------------------------------------------------------

/// A positioned box in document coordinates (before page splitting).
#[derive(Debug, Clone)]
pub struct PositionedBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub content: BoxContent,
    pub fill: Option<Color>,
    pub border: Option<Border>,
    pub children: Vec<PositionedBox>,
    /// Pagination may place the children on different pages.
    pub splittable: bool,
    pub page_break_inside_avoid: bool,
}

#[derive(Debug, Clone)]
pub enum BoxContent {
    None,
    Text {
        lines: Vec<String>,
        role: StyleRole,
        align: TextAlign,
    },
}

/// Per-node attributes Taffy has no slot for.
#[derive(Debug, Clone, Default)]
struct Decoration {
    fill: Option<Color>,
    border: Option<Border>,
    splittable: bool,
    keep_together: bool,
}

// ---------------------------------------------------------------------------
// Build Taffy tree from layout nodes
// ---------------------------------------------------------------------------

struct LayoutBuilder<'a> {
    taffy: TaffyTree<()>,
    fonts: &'a FontManager,
    node_content: HashMap<NodeId, BoxContent>,
    node_decor: HashMap<NodeId, Decoration>,
}

impl<'a> LayoutBuilder<'a> {
    fn new(fonts: &'a FontManager) -> Self {
        let mut taffy = TaffyTree::new();
        // Page coordinates are fractional points.
        taffy.disable_rounding();
        Self {
            taffy,
            fonts,
            node_content: HashMap::new(),
            node_decor: HashMap::new(),
        }
    }

    /// `width` is the horizontal space the node will occupy, used to
    /// word-wrap text and size table columns.
    fn build_node(&mut self, node: &LayoutNode, width: f32) -> Result<NodeId> {
        match node {
            LayoutNode::Text(run) => self.build_text(run, width),
            LayoutNode::Spacer(height) => self.build_spacer(*height),
            LayoutNode::Group(group) => {
                let children = group
                    .children
                    .iter()
                    .map(|child| self.build_node(child, width))
                    .collect::<Result<Vec<_>>>()?;
                let style = Style {
                    display: taffy::Display::Flex,
                    flex_direction: taffy::FlexDirection::Column,
                    size: Size {
                        width: Dimension::Percent(1.0),
                        height: Dimension::Auto,
                    },
                    flex_shrink: 0.0,
                    ..Default::default()
                };
                let id = self.taffy.new_with_children(style, &children)?;
                self.node_decor.insert(
                    id,
                    Decoration {
                        splittable: true,
                        keep_together: group.keep_together,
                        ..Default::default()
                    },
                );
                Ok(id)
            }
            LayoutNode::Table(table) => self.build_table(table, width),
        }
    }

    fn build_text(&mut self, run: &TextRun, width: f32) -> Result<NodeId> {
        let spec = style_for(run.role);
        let lines = wrap_text(run.text.trim(), &spec, width, self.fonts);
        let height = lines.len() as f32 * self.fonts.line_height(&spec);

        let style = Style {
            size: Size {
                width: Dimension::Percent(1.0),
                height: Dimension::Length(height),
            },
            flex_shrink: 0.0,
            ..Default::default()
        };
        let id = self.taffy.new_leaf(style)?;
        self.node_content.insert(
            id,
            BoxContent::Text {
                lines,
                role: run.role,
                align: run.align,
            },
        );
        Ok(id)
    }

    fn build_spacer(&mut self, height: f32) -> Result<NodeId> {
        let style = Style {
            size: Size {
                width: Dimension::Percent(1.0),
                height: Dimension::Length(height),
            },
            flex_shrink: 0.0,
            ..Default::default()
        };
        Ok(self.taffy.new_leaf(style)?)
    }

    fn build_table(&mut self, table: &Table, width: f32) -> Result<NodeId> {
        let placements = table.placements();
        let rows = placements
            .iter()
            .map(|p| p.row + p.row_span)
            .max()
            .unwrap_or(0)
            .max(table.columns());
        if rows > MAX_GRID_ROWS {
            return Err(Error::TooManyRows {
                rows,
                max: MAX_GRID_ROWS,
            });
        }

        let mut cell_ids = Vec::with_capacity(table.cells.len());
        for (cell, place) in table.cells.iter().zip(&placements) {
            let cell_width = table.span_width(place.column, place.col_span, width);
            let id = self.build_cell(cell, cell_width)?;

            let mut style = self.taffy.style(id)?.clone();
            style.grid_row = taffy::Line {
                start: line(grid_line(place.row, rows)?),
                end: span(grid_span(place.row_span, rows)?),
            };
            style.grid_column = taffy::Line {
                start: line(grid_line(place.column, rows)?),
                end: span(grid_span(place.col_span, rows)?),
            };
            self.taffy.set_style(id, style)?;
            cell_ids.push(id);
        }

        let columns = (0..table.columns())
            .map(|c| TrackSizingFunction::from_length(table.span_width(c, 1, width)))
            .collect();

        let style = Style {
            display: taffy::Display::Grid,
            grid_template_columns: columns,
            size: Size {
                width: Dimension::Percent(1.0),
                height: Dimension::Auto,
            },
            flex_shrink: 0.0,
            ..Default::default()
        };
        let id = self.taffy.new_with_children(style, &cell_ids)?;
        self.node_decor.insert(
            id,
            Decoration {
                splittable: true,
                ..Default::default()
            },
        );
        Ok(id)
    }

    fn build_cell(&mut self, cell: &Cell, width: f32) -> Result<NodeId> {
        let inner_width = (width - 2.0 * CELL_PADDING).max(1.0);
        let children = cell
            .content
            .iter()
            .map(|node| self.build_node(node, inner_width))
            .collect::<Result<Vec<_>>>()?;

        let border = cell.border.map_or(0.0, |b| b.width);
        let style = Style {
            display: taffy::Display::Flex,
            flex_direction: taffy::FlexDirection::Column,
            justify_content: Some(match cell.v_align {
                VerticalAlign::Top => taffy::JustifyContent::Start,
                VerticalAlign::Middle => taffy::JustifyContent::Center,
                VerticalAlign::Bottom => taffy::JustifyContent::End,
            }),
            size: Size {
                width: Dimension::Auto,
                height: cell
                    .fixed_height
                    .map_or(Dimension::Auto, Dimension::Length),
            },
            min_size: Size {
                width: Dimension::Length(0.0),
                height: Dimension::Auto,
            },
            padding: Rect {
                top: LengthPercentage::Length(CELL_PADDING),
                right: LengthPercentage::Length(CELL_PADDING),
                bottom: LengthPercentage::Length(CELL_PADDING),
                left: LengthPercentage::Length(CELL_PADDING),
            },
            border: Rect {
                top: LengthPercentage::Length(border),
                right: LengthPercentage::Length(border),
                bottom: LengthPercentage::Length(border),
                left: LengthPercentage::Length(border),
            },
            ..Default::default()
        };
        let id = self.taffy.new_with_children(style, &children)?;
        self.node_decor.insert(
            id,
            Decoration {
                fill: cell.fill,
                border: cell.border,
                ..Default::default()
            },
        );
        Ok(id)
    }

    /// Extract positioned boxes after layout computation.
    fn extract(&self, node: NodeId, offset_x: f32, offset_y: f32) -> Result<PositionedBox> {
        let layout = self.taffy.layout(node)?;
        let decor = self.node_decor.get(&node).cloned().unwrap_or_default();
        let content = self
            .node_content
            .get(&node)
            .cloned()
            .unwrap_or(BoxContent::None);

        let x = offset_x + layout.location.x;
        let y = offset_y + layout.location.y;

        let children = self
            .taffy
            .children(node)?
            .iter()
            .map(|&child| self.extract(child, x, y))
            .collect::<Result<Vec<_>>>()?;

        Ok(PositionedBox {
            x,
            y,
            width: layout.size.width,
            height: layout.size.height,
            content,
            fill: decor.fill,
            border: decor.border,
            children,
            splittable: decor.splittable,
            page_break_inside_avoid: decor.keep_together,
        })
    }
}

/// 1-based grid line for a 0-based slot index.
fn grid_line(index: usize, rows: usize) -> Result<i16> {
    index
        .checked_add(1)
        .and_then(|n| i16::try_from(n).ok())
        .ok_or(Error::TooManyRows {
            rows,
            max: MAX_GRID_ROWS,
        })
}

fn grid_span(count: usize, rows: usize) -> Result<u16> {
    u16::try_from(count).map_err(|_| Error::TooManyRows {
        rows,
        max: MAX_GRID_ROWS,
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute layout for the assembled blocks, returning the top-level
/// positioned boxes in document coordinates.
pub fn compute_layout(
    blocks: &[LayoutNode],
    page_width: f32,
    page_margin: f32,
    fonts: &FontManager,
) -> Result<Vec<PositionedBox>> {
    let content_width = page_width - 2.0 * page_margin;
    let mut builder = LayoutBuilder::new(fonts);

    let child_ids = blocks
        .iter()
        .map(|block| builder.build_node(block, content_width))
        .collect::<Result<Vec<_>>>()?;

    let root_style = Style {
        display: taffy::Display::Flex,
        flex_direction: taffy::FlexDirection::Column,
        size: Size {
            width: Dimension::Length(content_width),
            height: Dimension::Auto,
        },
        ..Default::default()
    };

    let root = builder.taffy.new_with_children(root_style, &child_ids)?;

    builder.taffy.compute_layout(
        root,
        Size {
            width: AvailableSpace::Definite(content_width),
            height: AvailableSpace::MaxContent,
        },
    )?;

    let root_box = builder.extract(root, page_margin, 0.0)?;
    Ok(root_box.children)
}
