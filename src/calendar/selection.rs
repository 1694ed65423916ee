use chrono::NaiveDate;

use super::{build_calendar, DayCell, Interval, MonthPanel};

// ─── Two-click range state ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSelection {
    start: Option<NaiveDate>,
    end:   Option<NaiveDate>,
}

impl RangeSelection {
    /// Applies one click and returns the interval to report.
    ///
    /// A click after an open start closes the range when it lands later;
    /// anything else starts a fresh one-day range.
    pub fn click(&mut self, date: NaiveDate) -> Interval {
        match (self.start, self.end) {
            (Some(start), None) if date > start => {
                self.end = Some(date);
                Interval { start, end: date }
            }
            _ => {
                self.start = Some(date);
                self.end   = None;
                Interval::single(date)
            }
        }
    }

    pub fn interval(&self) -> Option<Interval> {
        let start = self.start?;
        Some(Interval { start, end: self.end.unwrap_or(start) })
    }

    pub fn is_complete(&self) -> bool { self.end.is_some() }

    fn highlights(&self, date: NaiveDate) -> bool {
        match (self.start, self.end) {
            (Some(s), Some(e)) => s <= date && date <= e,
            (Some(s), None)    => s == date,
            _                  => false,
        }
    }
}

// ─── Interaction modes ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMode {
    /// Every cell, padding included, reports its date.
    Click,
    /// Two-click range picking over in-month cells.
    RangeSelect(RangeSelection),
    /// Read-only view of recorded intervals.
    Display(Vec<Interval>),
}

impl SelectionMode {
    pub fn range() -> Self { Self::RangeSelect(RangeSelection::default()) }
}

/// What a click produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Day(NaiveDate),
    Range(Interval),
}

/// Render flags for one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellState {
    pub active:        bool,
    pub clickable:     bool,
    pub today:         bool,
    pub shaded:        bool,
    pub outside_month: bool,
}

// ─── Calendar ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Calendar {
    panels: Vec<MonthPanel>,
    mode:   SelectionMode,
}

impl Calendar {
    pub fn new(
        current:         NaiveDate,
        previous_months: u32,
        upcoming_months: u32,
        today:           NaiveDate,
        mode:            SelectionMode,
    ) -> Self {
        Self { panels: build_calendar(current, previous_months, upcoming_months, today), mode }
    }

    pub fn panels(&self) -> &[MonthPanel] { &self.panels }

    /// The range picked so far, in range-select mode.
    pub fn selection(&self) -> Option<Interval> {
        match &self.mode {
            SelectionMode::RangeSelect(r) => r.interval(),
            _ => None,
        }
    }

    /// Panel and cell index of the in-month cell for `date`.
    pub fn locate(&self, date: NaiveDate) -> Option<(usize, usize)> {
        self.panels.iter().enumerate()
            .find_map(|(p, panel)| panel.position(date).map(|c| (p, c)))
    }

    /// First and last in-month day across all panels.
    pub fn span(&self) -> Option<Interval> {
        let first = self.panels.first()?.days.iter().find(|c| c.is_in_current_month)?;
        let last  = self.panels.last()?.days.iter().rev().find(|c| c.is_in_current_month)?;
        Some(Interval { start: first.date, end: last.date })
    }

    /// Clicks the in-month cell for `date`.
    pub fn click_date(&mut self, date: NaiveDate) -> Option<Selection> {
        let (panel, cell) = self.locate(date)?;
        self.click(panel, cell)
    }

    /// Clicks the cell at `cell` of panel `panel`. Returns `None` when the
    /// cell is inert in the current mode or out of bounds.
    pub fn click(&mut self, panel: usize, cell: usize) -> Option<Selection> {
        let day = *self.panels.get(panel)?.days.get(cell)?;
        match &mut self.mode {
            SelectionMode::Click => Some(Selection::Day(day.date)),
            SelectionMode::RangeSelect(range) if day.is_in_current_month => {
                Some(Selection::Range(range.click(day.date)))
            }
            SelectionMode::RangeSelect(_) | SelectionMode::Display(_) => None,
        }
    }

    pub fn cell_state(&self, cell: &DayCell) -> CellState {
        let in_month = cell.is_in_current_month;
        let (active, clickable) = match &self.mode {
            SelectionMode::Click => (false, true),
            SelectionMode::RangeSelect(r) => (in_month && r.highlights(cell.date), in_month),
            SelectionMode::Display(intervals) => (
                in_month && intervals.iter().any(|iv| iv.contains(cell.date)),
                false,
            ),
        };
        CellState {
            active,
            clickable,
            today:         cell.is_today,
            shaded:        cell.is_shaded,
            outside_month: !in_month,
        }
    }
}
