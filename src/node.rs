//! Layout nodes – the immutable tree the section builders produce and the
//! layout engine consumes. Nodes carry style roles, never backend types.

use crate::style::{StyleRole, TextAlign};
use crate::table::Table;

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutNode {
    Text(TextRun),
    Table(Table),
    Group(Group),
    /// Blank vertical space of the given height in points.
    Spacer(f32),
}

/// A run of text in one style. Embedded `\n` starts a new line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub role: StyleRole,
    pub align: TextAlign,
}

/// Children stacked vertically.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub children: Vec<LayoutNode>,
    /// Ask the paginator not to split this group across pages.
    pub keep_together: bool,
}

impl LayoutNode {
    pub fn text(text: impl Into<String>, role: StyleRole) -> Self {
        LayoutNode::Text(TextRun {
            text: text.into(),
            role,
            align: TextAlign::Left,
        })
    }

    pub fn group(children: Vec<LayoutNode>) -> Self {
        LayoutNode::Group(Group {
            children,
            keep_together: false,
        })
    }

    pub fn keep_together(children: Vec<LayoutNode>) -> Self {
        LayoutNode::Group(Group {
            children,
            keep_together: true,
        })
    }

    /// All text runs in document order, depth first.
    pub fn texts(&self) -> Vec<&TextRun> {
        let mut out = Vec::new();
        self.collect_texts(&mut out);
        out
    }

    fn collect_texts<'a>(&'a self, out: &mut Vec<&'a TextRun>) {
        match self {
            LayoutNode::Text(run) => out.push(run),
            LayoutNode::Table(table) => {
                for cell in &table.cells {
                    for node in &cell.content {
                        node.collect_texts(out);
                    }
                }
            }
            LayoutNode::Group(group) => {
                for child in &group.children {
                    child.collect_texts(out);
                }
            }
            LayoutNode::Spacer(_) => {}
        }
    }

    /// All tables in document order, depth first (outer before nested).
    pub fn tables(&self) -> Vec<&Table> {
        let mut out = Vec::new();
        self.collect_tables(&mut out);
        out
    }

    fn collect_tables<'a>(&'a self, out: &mut Vec<&'a Table>) {
        match self {
            LayoutNode::Table(table) => {
                out.push(table);
                for cell in &table.cells {
                    for node in &cell.content {
                        node.collect_tables(out);
                    }
                }
            }
            LayoutNode::Group(group) => {
                for child in &group.children {
                    child.collect_tables(out);
                }
            }
            LayoutNode::Text(_) | LayoutNode::Spacer(_) => {}
        }
    }

    /// True when any text run in the subtree equals `text`.
    pub fn contains_text(&self, text: &str) -> bool {
        self.texts().iter().any(|run| run.text == text)
    }
}
