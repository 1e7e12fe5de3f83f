//! Serialisation of the node tree: HTML markup for hosts, plain text for
//! terminals.

use std::fmt::Write;

use super::node::{
    CellContent, CellNode, RowNode, TableNode, Toggle, ROW_TOGGLE_CLASS, SORT_ICON_CLASS,
};
use super::pool::NodePool;

const TREE_GUIDE_CLASS: &str = "pd-tree-group";
const GROUP_NAME_CLASS: &str = "pd-group-name";
const OPEN_GUIDE_STYLE: &str = "margin-left:5px;margin-right:15px;border-left:1px solid #eee;height:19px";

/// Minimal HTML escaping for attribute/text content.
fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl TableNode {
    /// Render as a `<table>` element.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<table>");
        write_section(&mut out, "thead", self.head());
        write_section(&mut out, "tbody", self.body());
        out.push_str("</table>");
        out
    }

    /// Render as aligned plain text, header rows first.
    pub fn to_text(&self) -> String {
        let widths = text_column_widths(self);
        let mut out = String::new();
        for row in self.head().rows() {
            push_text_row(&mut out, row, &widths);
        }
        if self.head().num_rows() > 0 {
            let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
            out.push_str(&"-".repeat(total));
            out.push('\n');
        }
        for row in self.body().rows() {
            push_text_row(&mut out, row, &widths);
        }
        out
    }
}

fn write_section(out: &mut String, tag: &str, pool: &NodePool) {
    let _ = write!(out, "<{tag}>");
    for row in pool.rows() {
        out.push_str("<tr>");
        for cell in row.cells() {
            write_cell(out, cell);
        }
        out.push_str("</tr>");
    }
    let _ = write!(out, "</{tag}>");
}

fn write_cell(out: &mut String, cell: &CellNode) {
    let tag = cell.tag().as_str();
    let _ = write!(out, "<{tag}");
    if !cell.classes().is_empty() {
        let _ = write!(out, " class=\"{}\"", html_escape(&cell.classes().join(" ")));
    }
    if cell.colspan() > 1 {
        let _ = write!(out, " colspan=\"{}\"", cell.colspan());
    }
    if let Some(min) = cell.min_width() {
        let _ = write!(out, " style=\"min-width:{min}px\"");
    }
    out.push('>');

    match cell.content() {
        CellContent::Empty => {}
        CellContent::Text(text) => out.push_str(&html_escape(text)),
        CellContent::Header { label, sort_glyphs } if sort_glyphs.is_empty() => {
            out.push_str(&html_escape(label));
        }
        CellContent::Header { label, sort_glyphs } => {
            let _ = write!(
                out,
                "<span>{}</span><span class=\"{SORT_ICON_CLASS}\">{}</span>",
                html_escape(label),
                sort_glyphs.join(",")
            );
        }
        CellContent::Tree {
            depth,
            label,
            toggle,
        } => {
            out.push_str("<div style=\"display:flex;align-items:stretch\">");
            match toggle {
                None => {
                    for _ in 0..*depth {
                        let _ = write!(out, "<span class=\"{TREE_GUIDE_CLASS}\"></span>");
                    }
                    let _ = write!(
                        out,
                        "<span class=\"{GROUP_NAME_CLASS}\" style=\"margin-left:12px\">{}</span>",
                        html_escape(label)
                    );
                }
                Some(toggle) => {
                    for _ in 0..*depth {
                        let _ = write!(out, "<span style=\"{OPEN_GUIDE_STYLE}\"></span>");
                    }
                    let _ = write!(
                        out,
                        "<span class=\"{ROW_TOGGLE_CLASS}\">{}</span><span class=\"{GROUP_NAME_CLASS}\">{}</span>",
                        toggle.icon(),
                        html_escape(label)
                    );
                }
            }
            out.push_str("</div>");
        }
    }
    let _ = write!(out, "</{tag}>");
}

fn text_label(cell: &CellNode) -> String {
    match cell.content() {
        CellContent::Tree {
            depth,
            label,
            toggle,
        } => {
            let marker = match toggle {
                Some(Toggle::Open) => "- ",
                Some(Toggle::Closed) => "+ ",
                None => "  ",
            };
            format!("{}{marker}{label}", "  ".repeat(*depth))
        }
        CellContent::Header { label, sort_glyphs } if !sort_glyphs.is_empty() => {
            let arrows: String = sort_glyphs.iter().map(|g| glyph_char(g)).collect();
            format!("{label} {arrows}")
        }
        content => content.label().to_string(),
    }
}

fn glyph_char(glyph: &str) -> char {
    match glyph {
        "arrow_upward" => '↑',
        "arrow_downward" => '↓',
        "arrow_back" => '←',
        "arrow_forward" => '→',
        other => other.chars().next().unwrap_or(' '),
    }
}

/// Character width of each leaf column. Group cells spanning several
/// columns do not widen them.
fn text_column_widths(table: &TableNode) -> Vec<usize> {
    let mut widths: Vec<usize> = Vec::new();
    let rows = table.head().rows().iter().chain(table.body().rows());
    for row in rows {
        let mut column = 0;
        for cell in row.cells() {
            if cell.colspan() == 1 {
                let len = text_label(cell).chars().count();
                if widths.len() <= column {
                    widths.resize(column + 1, 0);
                }
                if let Some(w) = widths.get_mut(column) {
                    *w = (*w).max(len);
                }
            }
            column += cell.colspan();
        }
    }
    widths
}

fn push_text_row(out: &mut String, row: &RowNode, widths: &[usize]) {
    let mut column = 0;
    let mut line = String::new();
    for cell in row.cells() {
        let span = cell.colspan().max(1);
        let width: usize = widths.iter().skip(column).take(span).sum::<usize>() + 2 * (span - 1);
        if column > 0 {
            line.push_str("  ");
        }
        let label = text_label(cell);
        let _ = write!(line, "{label:<width$}");
        column += span;
    }
    out.push_str(line.trim_end());
    out.push('\n');
}
