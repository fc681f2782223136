//! Themed terminal output: bordered panels and tables.

use crossterm::style::{Color, Stylize};
use std::io::IsTerminal;

const BORDER_COLOR: Color = Color::Red;
const SUCCESS_COLOR: Color = Color::Green;

/// Width used when the terminal size is unknown.
const DEFAULT_WIDTH: usize = 80;

/// A message framed by a titled border.
#[derive(Debug, Clone)]
pub struct Panel {
    body: String,
    title: String,
    success: bool,
}

impl Panel {
    pub fn new(body: impl Into<String>, title: impl Into<String>, success: bool) -> Self {
        Self {
            body: body.into(),
            title: title.into(),
            success,
        }
    }

    /// Render to `width` columns. Without `styled` no escape codes are emitted.
    pub fn render(&self, width: usize, styled: bool) -> String {
        let title_len = self.title.chars().count();
        let inner = width.saturating_sub(4).max(title_len + 2);
        let paint = Painter { styled };

        let mut out = String::new();
        out.push_str(&paint.border("╭─ "));
        out.push_str(&paint.title(&self.title, self.success));
        out.push_str(&paint.border(&format!(" {}╮", "─".repeat(inner - title_len - 1))));
        out.push('\n');

        for line in wrap(&self.body, inner) {
            let pad = inner.saturating_sub(line.chars().count());
            out.push_str(&paint.border("│ "));
            out.push_str(&line);
            out.push_str(&" ".repeat(pad));
            out.push_str(&paint.border(" │"));
            out.push('\n');
        }

        out.push_str(&paint.border(&format!("╰{}╯", "─".repeat(inner + 2))));
        out
    }
}

/// A table with a title and a header row.
#[derive(Debug, Clone)]
pub struct Table {
    title: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(title: impl Into<String>, headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            title: title.into(),
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing cells render empty, extra cells are dropped.
    pub fn add_row<S: Into<String>>(&mut self, cells: impl IntoIterator<Item = S>) {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn render(&self, styled: bool) -> String {
        let paint = Painter { styled };
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let rule = |left: &str, mid: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            paint.border(&format!("{}{}{}", left, segments.join(mid), right))
        };
        let line = |cells: &[String], header: bool| {
            let mut out = paint.border("│");
            for (cell, width) in cells.iter().zip(&widths) {
                let padded = format!(" {}{} ", cell, " ".repeat(width - cell.chars().count()));
                if header {
                    out.push_str(&paint.bold(&padded));
                } else {
                    out.push_str(&padded);
                }
                out.push_str(&paint.border("│"));
            }
            out
        };

        let total: usize = widths.iter().map(|w| w + 3).sum::<usize>() + 1;
        let title_pad = total.saturating_sub(self.title.chars().count()) / 2;

        let mut out = vec![
            format!("{}{}", " ".repeat(title_pad), paint.bold(&self.title)),
            rule("┌", "┬", "┐"),
            line(self.headers.as_slice(), true),
            rule("├", "┼", "┤"),
        ];
        out.extend(self.rows.iter().map(|row| line(row.as_slice(), false)));
        out.push(rule("└", "┴", "┘"));
        out.join("\n")
    }
}

struct Painter {
    styled: bool,
}

impl Painter {
    fn border(&self, text: &str) -> String {
        if self.styled {
            text.with(BORDER_COLOR).to_string()
        } else {
            text.to_string()
        }
    }

    fn title(&self, text: &str, success: bool) -> String {
        if self.styled && success {
            text.with(SUCCESS_COLOR).to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.styled {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Word-wrap `text` to `width` columns, keeping explicit line breaks.
/// Words longer than `width` are left whole.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let len = line.chars().count();
            if len > 0 && len + 1 + word.chars().count() > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(columns, _)| usize::from(columns))
        .unwrap_or(DEFAULT_WIDTH)
}

/// Print `body` in a panel titled `title`; the title is green on success.
pub fn echo_in_panel(body: &str, title: &str, success: bool) {
    let stdout = std::io::stdout();
    let styled = stdout.is_terminal();
    println!("{}", Panel::new(body, title, success).render(terminal_width(), styled));
}

pub fn echo_table(table: &Table) {
    println!("{}", table.render(std::io::stdout().is_terminal()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_layout() {
        let rendered = Panel::new("Hello", "Title", true).render(20, false);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], format!("╭─ Title {}╮", "─".repeat(10)));
        assert_eq!(lines[1], format!("│ Hello{} │", " ".repeat(11)));
        assert_eq!(lines[2], format!("╰{}╯", "─".repeat(18)));
    }

    #[test]
    fn test_panel_lines_have_equal_width() {
        let body = "You are not logged in. Please run 'extralit login' to login to the Extralit server.";
        let rendered = Panel::new(body, "Not logged in", false).render(40, false);

        let widths: Vec<usize> = rendered.lines().map(|l| l.chars().count()).collect();
        assert!(widths.len() > 3);
        assert!(widths.iter().all(|w| *w == 40));
        assert!(rendered.contains("'extralit"));
    }

    #[test]
    fn test_panel_narrower_than_title() {
        let rendered = Panel::new("x", "A long title", true).render(4, false);
        assert!(rendered.starts_with("╭─ A long title ─╮"));
    }

    #[test]
    fn test_styled_title_only_on_success() {
        let success = Panel::new("body", "Done", true).render(30, true);
        let failure = Panel::new("body", "Failed", false).render(30, true);

        assert!(success.contains(&"Done".with(SUCCESS_COLOR).to_string()));
        assert!(failure.contains("Failed"));
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("a bb ccc", 4), vec!["a bb", "ccc"]);
        assert_eq!(wrap("first\nsecond", 80), vec!["first", "second"]);
        assert_eq!(wrap("", 10), vec![""]);
        assert_eq!(wrap("unbreakable", 3), vec!["unbreakable"]);
    }

    #[test]
    fn test_table_layout() {
        let mut table = Table::new("Workspaces", ["Name", "ID"]);
        table.add_row(["team", "1"]);
        table.add_row(["research-group"]);

        let rendered = table.render(false);
        let lines: Vec<&str> = rendered.lines().collect();

        let (name, id) = ("─".repeat(16), "─".repeat(4));
        assert_eq!(lines[1], format!("┌{}┬{}┐", name, id));
        assert_eq!(lines[2], format!("│ Name{} │ ID │", " ".repeat(10)));
        assert_eq!(lines[3], format!("├{}┼{}┤", name, id));
        assert_eq!(lines[4], format!("│ team{} │ 1  │", " ".repeat(10)));
        assert_eq!(lines[5], "│ research-group │    │");
        assert_eq!(lines[6], format!("└{}┴{}┘", name, id));
        assert_eq!(lines[0].trim(), "Workspaces");
    }
}
