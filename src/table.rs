//! Table layout model – column ratios, row-major cells with row/column
//! spans, and the slot placement that resolves spans into grid positions.
//!
//! Every table in the prescription document is built from a handful of
//! shapes defined here: the full-width title band, the label-span table
//! (one label cell merged down the whole row run), the header+rows table,
//! and the plain single-column list.

use crate::node::LayoutNode;
use crate::style::{Color, StyleRole, TextAlign, VerticalAlign, BAND_FILL};

/// Height of one data row in repeating-row tables, in points.
pub const ROW_HEIGHT: f32 = 15.0;

/// Inner padding applied on every side of a cell, in points.
pub const CELL_PADDING: f32 = 2.0;

/// Column ratios of the label-span tables.
pub const LABEL_COLUMNS: [f32; 2] = [25.0, 75.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    pub width: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub content: Vec<LayoutNode>,
    pub col_span: usize,
    pub row_span: usize,
    /// `None` suppresses the border.
    pub border: Option<Border>,
    pub align: TextAlign,
    pub v_align: VerticalAlign,
    pub fixed_height: Option<f32>,
    pub fill: Option<Color>,
}

impl Cell {
    pub fn new(content: Vec<LayoutNode>) -> Self {
        Self {
            content,
            col_span: 1,
            row_span: 1,
            border: None,
            align: TextAlign::Left,
            v_align: VerticalAlign::Middle,
            fixed_height: None,
            fill: None,
        }
    }

    pub fn text(text: impl Into<String>, role: StyleRole) -> Self {
        Self::new(vec![LayoutNode::text(text, role)])
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn row_span(mut self, rows: usize) -> Self {
        self.row_span = rows.max(1);
        self
    }

    pub fn col_span(mut self, cols: usize) -> Self {
        self.col_span = cols.max(1);
        self
    }

    pub fn fixed_height(mut self, height: f32) -> Self {
        self.fixed_height = Some(height);
        self
    }

    pub fn fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        for node in &mut self.content {
            if let LayoutNode::Text(run) = node {
                run.align = align;
            }
        }
        self
    }

    pub fn v_align(mut self, v_align: VerticalAlign) -> Self {
        self.v_align = v_align;
        self
    }
}

/// Where a cell landed after span resolution (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub row: usize,
    pub column: usize,
    pub row_span: usize,
    pub col_span: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Relative column widths; normalised against their sum.
    pub column_widths: Vec<f32>,
    /// Cells in row-major order.
    pub cells: Vec<Cell>,
}

impl Table {
    pub fn new(column_widths: &[f32]) -> Self {
        let column_widths = if column_widths.is_empty() {
            vec![1.0]
        } else {
            column_widths.to_vec()
        };
        Self {
            column_widths,
            cells: Vec::new(),
        }
    }

    /// `count` equal-width columns.
    pub fn with_columns(count: usize) -> Self {
        Self::new(&vec![1.0; count.max(1)])
    }

    pub fn push(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    pub fn columns(&self) -> usize {
        self.column_widths.len()
    }

    /// Resolve every cell to a grid slot.
    ///
    /// Cells flow row-major into the next free slot wide enough for their
    /// column span; slots claimed by an earlier row span are skipped.
    /// Column spans wider than the table are clamped.
    pub fn placements(&self) -> Vec<Placement> {
        let columns = self.columns();
        let mut occupied: Vec<Vec<bool>> = Vec::new();
        let mut row = 0usize;
        let mut column = 0usize;
        let mut out = Vec::with_capacity(self.cells.len());

        for cell in &self.cells {
            let col_span = cell.col_span.clamp(1, columns);
            let row_span = cell.row_span.max(1);

            loop {
                if column + col_span > columns {
                    row += 1;
                    column = 0;
                    continue;
                }
                ensure_rows(&mut occupied, row + 1, columns);
                if (column..column + col_span).all(|c| !occupied[row][c]) {
                    break;
                }
                column += 1;
            }

            ensure_rows(&mut occupied, row + row_span, columns);
            for r in row..row + row_span {
                for c in column..column + col_span {
                    occupied[r][c] = true;
                }
            }

            out.push(Placement {
                row,
                column,
                row_span,
                col_span,
            });
            column += col_span;
        }
        out
    }

    /// Number of grid rows the cells occupy, including rows claimed only by
    /// a row span.
    pub fn row_count(&self) -> usize {
        self.placements()
            .iter()
            .map(|p| p.row + p.row_span)
            .max()
            .unwrap_or(0)
    }

    /// Width in points of `span` columns starting at `column` when the table
    /// is `table_width` wide.
    pub fn span_width(&self, column: usize, span: usize, table_width: f32) -> f32 {
        let total: f32 = self.column_widths.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        let end = (column + span).min(self.columns());
        let share: f32 = self.column_widths[column.min(end)..end].iter().sum();
        table_width * share / total
    }
}

fn ensure_rows(occupied: &mut Vec<Vec<bool>>, rows: usize, columns: usize) {
    while occupied.len() < rows {
        occupied.push(vec![false; columns]);
    }
}

// ---------------------------------------------------------------------------
// Table shapes
// ---------------------------------------------------------------------------

/// Full-width gray title band, e.g. `MEDICATION`.
pub fn band(title: &str) -> Table {
    let mut table = Table::with_columns(1);
    table.push(Cell::text(title, StyleRole::TableHeader).fill(BAND_FILL));
    table
}

/// Label cell merged down all rows, one fixed-height data cell per row.
///
/// `rows` must be non-empty; callers omit the section otherwise.
pub fn label_span_table(label: &str, rows: &[String], column_widths: &[f32]) -> Table {
    debug_assert!(!rows.is_empty(), "label-span table needs at least one row");
    let mut table = Table::new(column_widths);
    table.push(Cell::text(label, StyleRole::SubHeader).row_span(rows.len()));
    for value in rows {
        table.push(Cell::text(value.as_str(), StyleRole::Body).fixed_height(ROW_HEIGHT));
    }
    table
}

/// A sub-header row followed by one row per record.
pub fn header_rows_table(headers: &[&str], rows: &[Vec<String>], column_widths: &[f32]) -> Table {
    let mut table = Table::new(column_widths);
    for header in headers {
        table.push(Cell::text(*header, StyleRole::SubHeader));
    }
    for row in rows {
        for value in row {
            table.push(Cell::text(value.as_str(), StyleRole::Body));
        }
    }
    table
}

/// One fixed-height row per entry in a single column.
pub fn list_table(rows: &[String]) -> Table {
    let mut table = Table::with_columns(1);
    for value in rows {
        table.push(Cell::text(value.as_str(), StyleRole::Body).fixed_height(ROW_HEIGHT));
    }
    table
}
