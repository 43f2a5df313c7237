use std::io::{self, IsTerminal, Write};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::Config;
use crate::datetime::to_iso_date;
use crate::layout::{ChipSegment, DayCell, MonthLayout, WEEKDAY_LABELS};
use crate::task::{Category, Task};

const CELL_WIDTH: usize = 12;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            color: cfg.color_enabled() && io::stdout().is_terminal(),
        }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip(self, tasks))]
    pub fn print_task_table(&self, tasks: &[Task]) -> anyhow::Result<()> {
        let out = io::stdout().lock();
        self.write_task_table(out, tasks)
    }

    #[tracing::instrument(skip(self, layout), fields(title = %layout.title))]
    pub fn print_month(&self, layout: &MonthLayout) -> anyhow::Result<()> {
        let out = io::stdout().lock();
        self.write_month(out, layout)
    }

    pub fn write_task_table<W: Write>(&self, writer: W, tasks: &[Task]) -> anyhow::Result<()> {
        let headers = vec![
            "ID".to_string(),
            "Category".to_string(),
            "Start".to_string(),
            "End".to_string(),
            "Days".to_string(),
            "Name".to_string(),
            "Video".to_string(),
        ];

        let rows = tasks
            .iter()
            .map(|task| {
                vec![
                    self.paint(short_id(task.id.as_str()), "33"),
                    self.paint_category(task.category.label(), task.category),
                    to_iso_date(task.start),
                    to_iso_date(task.end),
                    (task.range().span_days() + 1).to_string(),
                    task.name.clone(),
                    task.video_url.clone().unwrap_or_default(),
                ]
            })
            .collect();

        write_table(writer, headers, rows)
    }

    /// One block per week: a line of day numbers, then one line per chip
    /// row, chips in list order.
    pub fn write_month<W: Write>(&self, mut writer: W, layout: &MonthLayout) -> anyhow::Result<()> {
        let total = (CELL_WIDTH + 1) * 7;
        writeln!(writer, "{:^total$}", layout.title)?;

        for label in WEEKDAY_LABELS {
            write!(writer, "{label:<CELL_WIDTH$} ")?;
        }
        writeln!(writer)?;
        writeln!(writer, "{:-<total$}", "")?;

        for week in layout.weeks() {
            for cell in week {
                let text = pad(&day_label(cell), CELL_WIDTH);
                let text = if cell.is_today {
                    self.paint(&text, "1;4")
                } else if !cell.in_month {
                    self.paint(&text, "2")
                } else {
                    text
                };
                write!(writer, "{text} ")?;
            }
            writeln!(writer)?;

            let rows = week.iter().map(|cell| cell.chips.len()).max().unwrap_or(0);
            for row in 0..rows {
                for cell in week {
                    let text = match cell.chips.get(row) {
                        Some(chip) => self.paint_category(&chip_label(chip, CELL_WIDTH), chip.category),
                        None => " ".repeat(CELL_WIDTH),
                    };
                    write!(writer, "{text} ")?;
                }
                writeln!(writer)?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }

    fn paint_category(&self, text: &str, category: Category) -> String {
        match hex_to_rgb(category.color()) {
            Some((r, g, b)) => self.paint(text, &format!("38;2;{r};{g};{b}")),
            None => text.to_string(),
        }
    }
}

fn day_label(cell: &DayCell) -> String {
    let day = cell.date.format("%-d").to_string();
    if cell.is_today {
        format!("[{day}]")
    } else if cell.selected {
        format!("<{day}>")
    } else {
        day
    }
}

/// `[name` on the first day, `name]` on the last, dashes in between.
fn chip_label(chip: &ChipSegment, width: usize) -> String {
    let open = if chip.is_start { "[" } else { "-" };
    let close = if chip.is_end { "]" } else { "-" };
    let inner_width = width.saturating_sub(2);

    let inner = if chip.is_start {
        let mut name = chip.name.clone();
        if chip.video_url.is_some() {
            name.push_str(" \u{25b6}");
        }
        pad_with(&truncate(&name, inner_width), inner_width, ' ')
    } else {
        "-".repeat(inner_width)
    };

    format!("{open}{inner}{close}")
}

fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(idx, _)| &id[..idx])
}

fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn truncate(text: &str, width: usize) -> String {
    if UnicodeWidthStr::width(text) <= width {
        return text.to_string();
    }

    let budget = width.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('\u{2026}');
    out
}

fn pad(text: &str, width: usize) -> String {
    pad_with(text, width, ' ')
}

fn pad_with(text: &str, width: usize, fill: char) -> String {
    let visible = UnicodeWidthStr::width(strip_ansi(text).as_str());
    let mut out = text.to_string();
    out.extend(std::iter::repeat_n(fill, width.saturating_sub(visible)));
    out
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            write!(writer, "{} ", pad(&row[idx], widths[idx]))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
