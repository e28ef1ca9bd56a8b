//! Calendar arithmetic over timezone-naive days.
//!
//! A [`Day`] renders as fixed-width, zero-padded `YYYY-MM-DD`, so its
//! ordering matches the lexicographic ordering of the string form. Weeks
//! start on Monday. Months are calendar months with leap-year aware lengths.

use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// A calendar day with no time or timezone attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Day(NaiveDate);

impl Day {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Day)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day_of_month(&self) -> u32 {
        self.0.day()
    }

    /// Weekday with Sunday as 0 and Saturday as 6.
    pub fn weekday_from_sunday(&self) -> u32 {
        self.0.weekday().num_days_from_sunday()
    }

    /// Shift by `n` days in either direction, clamping at chrono's
    /// representable range.
    pub fn add_days(self, n: i64) -> Day {
        match self.0.checked_add_signed(Duration::days(n)) {
            Some(d) => Day(d),
            None if n < 0 => Day(NaiveDate::MIN),
            None => Day(NaiveDate::MAX),
        }
    }

    /// Signed number of days from `self` to `other`.
    pub fn days_until(&self, other: Day) -> i64 {
        (other.0 - self.0).num_days()
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

impl FromStr for Day {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        // chrono accepts unpadded fields; the fixed-width form is required here
        let fixed_width = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !fixed_width {
            return Err(ValidationError::InvalidDay(s.to_string()));
        }
        NaiveDate::parse_from_str(s, DAY_FORMAT)
            .map(Day)
            .map_err(|_| ValidationError::InvalidDay(s.to_string()))
    }
}

impl TryFrom<String> for Day {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Day> for String {
    fn from(day: Day) -> Self {
        day.to_string()
    }
}

impl From<NaiveDate> for Day {
    fn from(date: NaiveDate) -> Self {
        Day(date)
    }
}

/// An inclusive span of days. Empty when `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub start: Day,
    pub end: Day,
}

impl DayRange {
    pub fn new(start: Day, end: Day) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, day: Day) -> bool {
        self.start <= day && day <= self.end
    }

    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.start.days_until(self.end) + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Days in ascending order.
    pub fn days(&self) -> impl Iterator<Item = Day> {
        let start = self.start;
        (0..self.len() as i64).map(move |i| start.add_days(i))
    }
}

/// A calendar month, parsed from `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: Day,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        Day::from_ymd(year, month, 1).map(|first| Self { first })
    }

    pub fn of(day: Day) -> Self {
        Self {
            first: month_range(day).start,
        }
    }

    pub fn range(&self) -> DayRange {
        month_range(self.first)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.first.year(), self.first.month())
    }
}

impl FromStr for YearMonth {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidMonth(s.to_string());
        let (y, m) = s.split_once('-').ok_or_else(invalid)?;
        if y.len() != 4 || m.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        YearMonth::new(year, month).ok_or_else(invalid)
    }
}

/// Current local calendar date.
pub fn today() -> Day {
    Day(Local::now().date_naive())
}

pub fn add_days(day: Day, n: i64) -> Day {
    day.add_days(n)
}

/// Monday-start week containing `day`.
pub fn week_range(day: Day) -> DayRange {
    let dow = day.weekday_from_sunday() as i64;
    let to_monday = if dow == 0 { -6 } else { 1 - dow };
    let monday = day.add_days(to_monday);
    DayRange::new(monday, monday.add_days(6))
}

/// First through last day of `day`'s calendar month.
pub fn month_range(day: Day) -> DayRange {
    let first = day.add_days(1 - day.day_of_month() as i64);
    let last = first
        .date()
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map_or(Day(NaiveDate::MAX), Day);
    DayRange::new(first, last)
}

/// The `count` consecutive days ending at `end`, oldest first.
pub fn trailing_days(end: Day, count: u32) -> Vec<Day> {
    (0..count as i64).rev().map(|i| end.add_days(-i)).collect()
}
