//! ISO-8601 week arithmetic.
//!
//! Every function takes and returns `NaiveDate` values interpreted as UTC
//! calendar days. Nothing here consults the local timezone.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Week identity
// ---------------------------------------------------------------------------

/// An ISO week number paired with its ISO year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IsoWeekId {
    pub year: i32,
    pub week: u32,
}

impl IsoWeekId {
    pub fn new(year: i32, week: u32) -> Self {
        Self { year, week }
    }

    /// The week before this one. Stepping below week 1 moves to the prior
    /// year's last week as resolved by `rule`.
    pub fn previous(self, rule: RolloverRule) -> Self {
        if self.week > 1 {
            Self::new(self.year, self.week - 1)
        } else {
            let year = self.year.saturating_sub(1);
            Self::new(year, rule.last_week_of(year))
        }
    }

    pub fn span(self) -> WeekSpan {
        week_span(self.year, self.week)
    }
}

impl fmt::Display for IsoWeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// How the last ISO week of a year is found when a week sequence crosses
/// into the previous year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloverRule {
    /// Week number of December 31. When December 31 already belongs to week 1
    /// of the following year this yields 1, not 52; weekly history labels
    /// produced by earlier releases depend on that result.
    #[default]
    December31,
    /// Week number of December 28, which always lies in the year's last ISO week.
    IsoLastWeek,
}

impl RolloverRule {
    pub fn last_week_of(self, year: i32) -> u32 {
        let day = match self {
            Self::December31 => 31,
            Self::IsoLastWeek => 28,
        };
        iso_week_of(ymd(year, 12, day)).week
    }
}

impl fmt::Display for RolloverRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::December31 => write!(f, "december31"),
            Self::IsoLastWeek => write!(f, "iso_last_week"),
        }
    }
}

// ---------------------------------------------------------------------------
// Spans
// ---------------------------------------------------------------------------

/// Monday..Sunday of one ISO week, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekSpan {
    pub iso_week: u32,
    pub iso_year: i32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekSpan {
    /// Whole-day containment; a date equal to `end` is inside the span, which
    /// is the day-precision form of an end-of-day bound.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// ISO week and ISO year of `date`: the week holding the date's Thursday
/// decides both, so early January can belong to the previous ISO year and
/// late December to the next.
pub fn iso_week_of(date: NaiveDate) -> IsoWeekId {
    let iso = date.iso_week();
    IsoWeekId::new(iso.year(), iso.week())
}

/// Monday of `(iso_year, iso_week)`.
///
/// Computed from January 1 rather than validated, so it is defined for any
/// week number, including a week 53 the year does not have. Results beyond
/// chrono's range clamp to `NaiveDate::MIN` / `NaiveDate::MAX`.
pub fn week_start(iso_year: i32, iso_week: u32) -> NaiveDate {
    let probe = shift_days(ymd(iso_year, 1, 1), 7 * (i64::from(iso_week) - 1));
    let weekday = i64::from(probe.weekday().num_days_from_sunday());
    if weekday <= 4 {
        shift_days(probe, 1 - weekday)
    } else {
        shift_days(probe, 8 - weekday)
    }
}

/// Sunday of `(iso_year, iso_week)`.
pub fn week_end(iso_year: i32, iso_week: u32) -> NaiveDate {
    shift_days(week_start(iso_year, iso_week), 6)
}

pub fn week_span(iso_year: i32, iso_week: u32) -> WeekSpan {
    let start = week_start(iso_year, iso_week);
    WeekSpan {
        iso_week,
        iso_year,
        start,
        end: shift_days(start, 6),
    }
}

/// `count` weeks starting at `(start_year, start_week)` and walking backwards,
/// newest first, using the default rollover rule.
pub fn week_range(start_year: i32, start_week: u32, count: usize) -> Vec<IsoWeekId> {
    week_range_with(start_year, start_week, count, RolloverRule::default())
}

pub fn week_range_with(
    start_year: i32,
    start_week: u32,
    count: usize,
    rule: RolloverRule,
) -> Vec<IsoWeekId> {
    let mut weeks = Vec::with_capacity(count);
    let mut current = IsoWeekId::new(start_year, start_week);
    for _ in 0..count {
        weeks.push(current);
        current = current.previous(rule);
    }
    weeks
}

// ---------------------------------------------------------------------------
// Misc date helpers
// ---------------------------------------------------------------------------

/// Convert a spreadsheet serial day count (day 0 = 1899-12-30) to a date.
/// The fractional time-of-day part is dropped.
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.floor();
    if days.abs() > 3_000_000.0 {
        return None;
    }
    ymd(1899, 12, 30).checked_add_signed(Duration::days(days as i64))
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Years outside chrono's representable range saturate to the nearest end.
fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(if year < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}

/// `date + days`, saturating at chrono's range instead of overflowing.
fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
