use chrono::{NaiveTime, TimeDelta};
use tracing::debug;

use super::raw_table::{RawTable, DIFF_COLUMN, START_COLUMN, STOP_COLUMN};
use crate::error::{Result, TimeDiffError};

const CLOCK_FORMAT: &str = "%H:%M";

/// Parses `HH:MM` as a same-day clock time.
pub fn parse_clock(s: &str) -> std::result::Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(s, CLOCK_FORMAT)
}

/// `stop - start`, negative when stop precedes start.
pub fn elapsed(start: NaiveTime, stop: NaiveTime) -> TimeDelta {
    stop.signed_duration_since(start)
}

/// Renders as `[-]HH:MM:SS`.
pub fn format_duration(d: TimeDelta) -> String {
    let sign = if d < TimeDelta::zero() { "-" } else { "" };
    let secs = d.num_seconds().unsigned_abs();
    format!(
        "{sign}{:02}:{:02}:{:02}",
        secs / 3600,
        secs % 3600 / 60,
        secs % 60
    )
}

/// Inverse of [`format_duration`]. Only the canonical `[-]HH:MM:SS` form is
/// accepted: unsigned digit fields, at least two hour digits, no `-00:00:00`.
pub fn parse_duration(s: &str) -> Option<TimeDelta> {
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let mut parts = body.split(':');
    let (h, m, sec) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || h.len() < 2 || m.len() != 2 || sec.len() != 2 {
        return None;
    }
    let h = digits(h)?;
    let (m, sec) = (digits(m)?, digits(sec)?);
    if m >= 60 || sec >= 60 {
        return None;
    }
    let total = h.checked_mul(3600)?.checked_add(m * 60 + sec)?;
    if negative && total == 0 {
        return None;
    }
    let d = TimeDelta::try_seconds(total)?;
    Some(if negative { -d } else { d })
}

fn digits(field: &str) -> Option<i64> {
    if !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Appends a `diff_time` column computed from `start_time` and `stop_time`.
/// Fails on the first cell that is not a valid clock time.
pub fn append_diff_column(table: &mut RawTable) -> Result<()> {
    let start_idx = required_column(table, START_COLUMN)?;
    let stop_idx = required_column(table, STOP_COLUMN)?;

    let mut diffs = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        let start = parse_cell(row[start_idx].as_deref(), i + 1, START_COLUMN)?;
        let stop = parse_cell(row[stop_idx].as_deref(), i + 1, STOP_COLUMN)?;
        diffs.push(format_duration(elapsed(start, stop)));
    }

    table.headers.push(DIFF_COLUMN.to_string());
    for (row, diff) in table.rows.iter_mut().zip(diffs) {
        row.push(Some(diff));
    }
    debug!(rows = table.rows.len(), "computed durations");
    Ok(())
}

fn required_column(table: &RawTable, name: &str) -> Result<usize> {
    table
        .column_index(name)
        .ok_or_else(|| TimeDiffError::invalid("<table>", format!("missing column {name}")))
}

fn parse_cell(cell: Option<&str>, row: usize, column: &str) -> Result<NaiveTime> {
    let value = cell.unwrap_or_default();
    parse_clock(value).map_err(|source| TimeDiffError::Parse {
        row,
        column: column.to_string(),
        value: value.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(s: &str) -> NaiveTime {
        parse_clock(s).unwrap()
    }

    fn table(rows: &[[&str; 2]]) -> RawTable {
        let mut t = RawTable::new(vec![START_COLUMN.into(), STOP_COLUMN.into()]);
        t.rows = rows
            .iter()
            .map(|r| r.iter().map(|c| Some(c.to_string())).collect())
            .collect();
        t
    }

    #[test]
    fn positive_span() {
        let d = elapsed(clock("09:00"), clock("17:30"));
        assert_eq!(d, TimeDelta::minutes(8 * 60 + 30));
        assert_eq!(format_duration(d), "08:30:00");
    }

    #[test]
    fn stop_before_start_stays_negative() {
        let d = elapsed(clock("14:00"), clock("09:00"));
        assert_eq!(d, TimeDelta::hours(-5));
        assert_eq!(format_duration(d), "-05:00:00");
    }

    #[test]
    fn rendering_round_trips() {
        for s in ["00:00:00", "08:30:00", "-05:00:00", "23:59:00", "-23:59:00"] {
            let d = parse_duration(s).unwrap();
            assert_eq!(format_duration(d), s);
        }
        assert_eq!(parse_duration("1:75:00"), None);
        assert_eq!(parse_duration("08:30"), None);
        assert_eq!(
            parse_duration("123:00:00"),
            Some(TimeDelta::hours(123))
        );
    }

    #[test]
    fn non_canonical_durations_are_rejected() {
        for s in [
            "--05:00:00",
            "+05:00:00",
            "-+05:00:00",
            "5:0:0",
            "05:0:00",
            "05:00:0",
            "05:+1:00",
            "-00:00:00",
            "05:00:00:00",
            "",
        ] {
            assert_eq!(parse_duration(s), None, "{s:?}");
        }
    }

    #[test]
    fn oversized_hours_do_not_overflow() {
        assert_eq!(parse_duration("2562047788015215:59:59"), None);
        assert_eq!(parse_duration("99999999999999999999:00:00"), None);
    }

    #[test]
    fn appends_trailing_column() -> anyhow::Result<()> {
        let mut t = table(&[["09:00", "17:30"], ["14:00", "09:00"]]);
        append_diff_column(&mut t)?;
        assert_eq!(t.headers.last().map(String::as_str), Some(DIFF_COLUMN));
        assert_eq!(t.rows[0][2].as_deref(), Some("08:30:00"));
        assert_eq!(t.rows[1][2].as_deref(), Some("-05:00:00"));
        Ok(())
    }

    #[test]
    fn out_of_range_time_is_a_parse_error() {
        let mut t = table(&[["09:00", "10:00"], ["99:99", "10:00"]]);
        let err = append_diff_column(&mut t).unwrap_err();
        match err {
            TimeDiffError::Parse {
                row, column, value, ..
            } => {
                assert_eq!(row, 2);
                assert_eq!(column, START_COLUMN);
                assert_eq!(value, "99:99");
            }
            other => panic!("unexpected error {other:?}"),
        }
        // nothing was appended
        assert_eq!(t.headers.len(), 2);
        assert!(t.rows.iter().all(|r| r.len() == 2));
    }
}
