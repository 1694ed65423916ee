//! Month panels for the period calendar.
//!
//! A panel is a Monday-first grid of day cells. The first week is padded with
//! the tail of the previous month and the last week with the head of the next
//! one, so every panel is a whole number of weeks.

mod selection;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use thiserror::Error;

pub use selection::{Calendar, CellState, RangeSelection, Selection, SelectionMode};

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("interval ends on {end} before it starts on {start}")]
    InvertedInterval { start: NaiveDate, end: NaiveDate },
}

// ─── Interval ─────────────────────────────────────────────────────────────────

/// Inclusive date range. `start <= end` holds for every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    start: NaiveDate,
    end:   NaiveDate,
}

impl Interval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CalendarError> {
        if end < start {
            return Err(CalendarError::InvertedInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    pub fn start(&self) -> NaiveDate { self.start }
    pub fn end(&self)   -> NaiveDate { self.end }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered, both ends included.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

// ─── Panels ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date:                NaiveDate,
    pub is_in_current_month: bool,
    pub is_today:            bool,
    /// Alternating week-row shading.
    pub is_shaded:           bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthPanel {
    pub year:  i32,
    pub month: u32,
    pub days:  Vec<DayCell>,
}

impl MonthPanel {
    /// Returns `None` only at the edges of chrono's supported date range.
    pub fn build(year: i32, month: u32, today: NaiveDate) -> Option<Self> {
        let first  = NaiveDate::from_ymd_opt(year, month, 1)?;
        let total  = days_in_month(year, month)? as i64;
        let offset = first.weekday().num_days_from_monday() as i64;
        let tail   = (7 - (offset + total) % 7) % 7;

        let days = (-offset..total + tail)
            .enumerate()
            .map(|(index, delta)| {
                let date = first + Duration::days(delta);
                DayCell {
                    date,
                    is_in_current_month: (0..total).contains(&delta),
                    is_today:            date == today,
                    is_shaded:           (index / 7) % 2 == 0,
                }
            })
            .collect();

        Some(Self { year, month, days })
    }

    /// "October 2026"
    pub fn title(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.days.chunks(7)
    }

    /// Index of the in-month cell for `date`, if this panel owns that date.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.days.iter().position(|c| c.is_in_current_month && c.date == date)
    }
}

/// Builds `previous_months + 1 + upcoming_months` panels in chronological
/// order around the month containing `current`.
pub fn build_calendar(
    current:         NaiveDate,
    previous_months: u32,
    upcoming_months: u32,
    today:           NaiveDate,
) -> Vec<MonthPanel> {
    let from = -(previous_months as i32);
    let to   = upcoming_months as i32;
    (from..=to)
        .filter_map(|delta| {
            let (year, month) = shift_month(current.year(), current.month(), delta);
            MonthPanel::build(year, month, today)
        })
        .collect()
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (ny, nm) = shift_month(year, month, 1);
    let next = NaiveDate::from_ymd_opt(ny, nm, 1)?;
    Some((next - first).num_days() as u32)
}

/// Moves `(year, month)` by `delta` months, rolling the year as needed.
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates. Timestamps are
/// reduced to their UTC calendar date.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// UTC midnight of `date`, the wire form the backend stores periods in.
pub fn to_iso_timestamp(date: NaiveDate) -> String {
    date.and_time(chrono::NaiveTime::MIN).and_utc().to_rfc3339()
}
