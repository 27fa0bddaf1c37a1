//! Display line rendering.
//!
//! Widths are measured in rendered terminal columns via `unicode-width`, so
//! emoji and CJK names pad the same as ASCII ones.

use std::fmt;

use unicode_width::UnicodeWidthStr;

use crate::icons::IconTable;
use crate::types::GameRecord;

/// Rendered width of the "icon + name" column in single-line layout.
pub const NAME_COLUMN_WIDTH: usize = 35;

/// Clock glyph for even rank indices in single-line layout.
const CLOCK_EVEN: &str = "⌚";

/// Clock glyph for odd rank indices in single-line layout.
const CLOCK_ODD: &str = "⏱️";

/// Leading text of the second line in multi-line layout.
const MULTI_LINE_INDENT: &str = "\t\t🕘 ";

/// How each record is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineLayout {
    /// One padded line per record.
    #[default]
    SingleLine,
    /// A name line followed by an indented time line.
    MultiLine,
}

impl LineLayout {
    pub fn from_multi_line(multi_line: bool) -> Self {
        if multi_line {
            Self::MultiLine
        } else {
            Self::SingleLine
        }
    }
}

/// Whole hours and remaining minutes of a playtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playtime {
    pub hours: u64,
    pub mins: u64,
}

impl Playtime {
    pub fn from_minutes(minutes: u64) -> Self {
        Self {
            hours: minutes / 60,
            mins: minutes % 60,
        }
    }
}

impl fmt::Display for Playtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} hrs {} mins", self.hours, self.mins)
    }
}

/// Pads `s` on the right with spaces up to `width` rendered columns.
///
/// Never truncates: a string already at or past `width` is returned as-is.
pub fn pad_to_width(s: &str, width: usize) -> String {
    let current = s.width();
    if current >= width {
        return s.to_string();
    }
    let mut padded = String::with_capacity(s.len() + width - current);
    padded.push_str(s);
    padded.extend(std::iter::repeat_n(' ', width - current));
    padded
}

/// Clock glyph for the record at `rank`.
fn clock_for_rank(rank: usize) -> &'static str {
    if rank % 2 == 0 { CLOCK_EVEN } else { CLOCK_ODD }
}

/// Renders a single record at position `rank` into `out`.
fn push_record_lines(
    out: &mut Vec<String>,
    rank: usize,
    record: &GameRecord,
    icons: &IconTable,
    layout: LineLayout,
) {
    let label = icons.resolve(record.app_id, &record.name);
    let playtime = Playtime::from_minutes(record.total_playtime_minutes);

    match layout {
        LineLayout::SingleLine => {
            out.push(format!(
                "{} {} {playtime}",
                pad_to_width(&label, NAME_COLUMN_WIDTH),
                clock_for_rank(rank)
            ));
        }
        LineLayout::MultiLine => {
            out.push(label);
            out.push(format!("{MULTI_LINE_INDENT}{playtime}"));
        }
    }
}

/// Renders ranked records into display lines.
///
/// Single-line layout yields one line per record; multi-line yields two.
pub fn format_lines(records: &[GameRecord], icons: &IconTable, layout: LineLayout) -> Vec<String> {
    let per_record = match layout {
        LineLayout::SingleLine => 1,
        LineLayout::MultiLine => 2,
    };
    let mut lines = Vec::with_capacity(records.len() * per_record);
    for (rank, record) in records.iter().enumerate() {
        push_record_lines(&mut lines, rank, record, icons, layout);
    }
    lines
}
