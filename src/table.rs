use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{data::Value, rank::RankedTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Renders `rows` under `headers` with two-space gutters. Columns missing from
/// `align` are left-aligned.
pub fn render_table(headers: &[String], rows: &[Vec<String>], align: &[Align]) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }
    for width in &mut widths {
        *width = (*width).max(3);
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths, align));
    let separator = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths, &[]));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, align));
    }
    output
}

/// Ranked table as text; numeric columns are right-aligned and empty cells
/// stay blank. `limit` caps the number of rows shown.
pub fn render_ranked(table: &RankedTable, limit: Option<usize>) -> String {
    let cells = table.cells();
    let shown = limit.unwrap_or(cells.len()).min(cells.len());
    let cells = &cells[..shown];

    let align = (0..table.headers.len())
        .map(|col| {
            let numeric = cells
                .iter()
                .filter_map(|row| row.get(col).and_then(Option::as_ref))
                .all(Value::is_numeric);
            if numeric { Align::Right } else { Align::Left }
        })
        .collect::<Vec<_>>();
    let rows = cells
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.as_ref().map(Value::as_display).unwrap_or_default())
                .collect()
        })
        .collect::<Vec<Vec<String>>>();
    render_table(&table.headers, &rows, &align)
}

fn format_row(values: &[String], widths: &[usize], align: &[Align]) -> String {
    let mut cells = Vec::with_capacity(values.len());
    for (idx, value) in values.iter().enumerate().take(widths.len()) {
        let sanitized = sanitize_cell(value);
        let padding = " ".repeat(widths[idx].saturating_sub(display_width(&sanitized)));
        let cell = match align.get(idx) {
            Some(Align::Right) => format!("{padding}{sanitized}"),
            _ => format!("{sanitized}{padding}"),
        };
        cells.push(cell);
    }
    cells.join("  ").trim_end().to_string()
}

fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // ANSI escape, e.g. \x1b[31m
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else if is_wide(ch) {
            width += 2;
        } else {
            width += 1;
        }
    }
    width
}

/// CJK ideographs and full-width forms occupy two terminal columns.
fn is_wide(ch: char) -> bool {
    matches!(
        ch as u32,
        0x1100..=0x115F | 0x2E80..=0x303E | 0x3041..=0x33FF | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF | 0xA000..=0xA4CF | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F | 0xFF00..=0xFF60 | 0xFFE0..=0xFFE6
    )
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
