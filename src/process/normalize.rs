// src/process/normalize.rs

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use super::raw_table::{Cell, RawTable};

static AM_DOTTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"a\.m").unwrap());
static PM_DOTTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"p\.m").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static FULL_STOP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.").unwrap());
static TWELVE_HOUR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):(\d+)(am|pm)$").unwrap());
static CLOCK_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}:\d{2}$").unwrap());

/// What a stage does to the table.
#[derive(Clone, Copy)]
pub enum StageKind {
    /// Drops every row holding a missing cell.
    DropIncomplete,
    /// Rewrites every present cell. Never drops anything.
    Rewrite(fn(&str) -> String),
    /// Drops the whole row if any present cell fails the check.
    Retain(fn(&str) -> bool),
    /// Marks cells failing the check as missing.
    Blank(fn(&str) -> bool),
}

#[derive(Clone, Copy)]
pub struct Stage {
    pub name: &'static str,
    pub kind: StageKind,
}

/// The cleaning pipeline, in the order it must run.
pub const STAGES: &[Stage] = &[
    Stage {
        name: "drop_incomplete",
        kind: StageKind::DropIncomplete,
    },
    Stage {
        name: "substitute",
        kind: StageKind::Rewrite(substitute),
    },
    Stage {
        name: "repair_missing_minutes",
        kind: StageKind::Rewrite(repair_missing_minutes),
    },
    Stage {
        name: "filter_charset",
        kind: StageKind::Retain(has_clock_charset),
    },
    Stage {
        name: "to_24_hour",
        kind: StageKind::Rewrite(to_24_hour),
    },
    Stage {
        name: "enforce_shape",
        kind: StageKind::Blank(has_clock_shape),
    },
    Stage {
        name: "drop_missing",
        kind: StageKind::DropIncomplete,
    },
];

/// Rows removed by each stage, in stage order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub input_rows: usize,
    pub dropped: Vec<(&'static str, usize)>,
}

impl NormalizeReport {
    pub fn total_dropped(&self) -> usize {
        self.dropped.iter().map(|(_, n)| n).sum()
    }

    pub fn output_rows(&self) -> usize {
        self.input_rows - self.total_dropped()
    }
}

impl Stage {
    fn apply(&self, mut table: RawTable) -> (RawTable, usize) {
        let before = table.rows.len();
        match self.kind {
            StageKind::DropIncomplete => {
                table.rows.retain(|row| row.iter().all(Option::is_some));
            }
            StageKind::Rewrite(f) => {
                for cell in table.rows.iter_mut().flatten() {
                    if let Some(v) = cell {
                        *v = f(v);
                    }
                }
            }
            StageKind::Retain(check) => {
                table
                    .rows
                    .retain(|row| row.iter().flatten().all(|v| check(v)));
            }
            StageKind::Blank(check) => {
                for cell in table.rows.iter_mut().flatten() {
                    if cell.as_deref().is_some_and(|v| !check(v)) {
                        trace!(stage = self.name, value = ?cell, "blanking cell");
                        *cell = None;
                    }
                }
            }
        }
        let dropped = before - table.rows.len();
        (table, dropped)
    }

    fn apply_cell(&self, cell: Cell) -> Cell {
        let v = cell?;
        match self.kind {
            StageKind::DropIncomplete => Some(v),
            StageKind::Rewrite(f) => Some(f(&v)),
            StageKind::Retain(check) | StageKind::Blank(check) => check(&v).then_some(v),
        }
    }
}

/// Runs every stage over every column. Surviving cells are `HH:MM` strings.
pub fn normalize_table(table: RawTable) -> (RawTable, NormalizeReport) {
    let mut report = NormalizeReport {
        input_rows: table.rows.len(),
        dropped: Vec::with_capacity(STAGES.len()),
    };
    let table = STAGES.iter().fold(table, |table, stage| {
        let (table, dropped) = stage.apply(table);
        debug!(stage = stage.name, dropped, remaining = table.rows.len(), "stage done");
        report.dropped.push((stage.name, dropped));
        table
    });
    (table, report)
}

/// Normalizes a single value the way `normalize_table` would for a one-cell
/// row; `None` means the row would be dropped.
pub fn normalize_cell(raw: &str) -> Option<String> {
    let start = (!raw.is_empty()).then(|| raw.to_string());
    STAGES
        .iter()
        .fold(start, |cell, stage| stage.apply_cell(cell))
}

/// `a.m`/`p.m` markers collapse to `am`/`pm`, whitespace goes, and every
/// remaining full stop becomes a colon.
pub fn substitute(s: &str) -> String {
    let s = AM_DOTTED.replace_all(s, "am");
    let s = PM_DOTTED.replace_all(&s, "pm");
    let s = WHITESPACE.replace_all(&s, "");
    FULL_STOP.replace_all(&s, ":").into_owned()
}

/// Inserts `:00` before the two-character am/pm suffix when there is no
/// minute field at all.
pub fn repair_missing_minutes(s: &str) -> String {
    if s.contains(':') {
        return s.to_string();
    }
    match s.char_indices().rev().nth(1) {
        Some((split, _)) => format!("{}:00{}", &s[..split], &s[split..]),
        None => s.to_string(),
    }
}

pub fn has_clock_charset(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ':' | 'a' | 'p' | 'm'))
}

/// `h:mm(am|pm)` to `HH:mm`. Anything else is returned untouched.
pub fn to_24_hour(s: &str) -> String {
    let Some(caps) = TWELVE_HOUR.captures(s) else {
        return s.to_string();
    };
    let Ok(hour) = caps[1].parse::<u64>() else {
        return s.to_string();
    };
    let hour = match (&caps[3], hour) {
        ("pm", h) if h != 12 => h.saturating_add(12),
        ("am", 12) => 0,
        (_, h) => h,
    };
    format!("{:02}:{}", hour, &caps[2])
}

pub fn has_clock_shape(s: &str) -> bool {
    CLOCK_SHAPE.is_match(s)
}
