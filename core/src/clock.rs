//! Simulation clock. Owns simulated UTC time and anchor-moment detection.

use crate::error::{SimError, SimResult};
use chrono::{DateTime, Datelike, Duration, Month, NaiveDate, TimeZone, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    current_time: DateTime<Utc>,
    anchor_hour:  u32,
}

impl SimClock {
    /// A clock seeded at `date` on the anchor hour, so the very first
    /// step of a run is an anchor step.
    pub fn at_anchor(date: NaiveDate, anchor_hour: u32) -> SimResult<Self> {
        let naive = date.and_hms_opt(anchor_hour, 0, 0).ok_or_else(|| SimError::InvalidConfig {
            reason: format!("anchor_hour {anchor_hour} is not a valid hour of day"),
        })?;
        Ok(Self {
            current_time: Utc.from_utc_datetime(&naive),
            anchor_hour,
        })
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.current_time
    }

    pub fn anchor_hour(&self) -> u32 {
        self.anchor_hour
    }

    /// Move time forward. Returns the new time. The clock is left
    /// untouched when the result falls outside the representable range.
    pub fn advance(&mut self, days: u32, minutes: u32) -> SimResult<DateTime<Utc>> {
        let next = self
            .current_time
            .checked_add_signed(Duration::days(days as i64))
            .and_then(|t| t.checked_add_signed(Duration::minutes(minutes as i64)))
            .ok_or(SimError::TimeOverflow { from: self.current_time, days, minutes })?;
        self.current_time = next;
        Ok(next)
    }

    /// True iff the clock reads exactly HH:00 on the anchor hour.
    pub fn is_anchor_moment(&self) -> bool {
        self.current_time.hour() == self.anchor_hour && self.current_time.minute() == 0
    }

    pub fn day_of_week(&self) -> DayOfWeek {
        DayOfWeek::from(self.current_time.weekday())
    }

    pub fn month(&self) -> Month {
        month_of(self.current_time.month())
    }

    pub fn month_number(&self) -> u32 {
        self.current_time.month()
    }

    pub fn season(&self) -> Season {
        Season::for_month(self.current_time.month())
    }
}

/// Monday-first day of week, rendered with its full English name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

impl DayOfWeek {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Monday    => "Monday",
            Self::Tuesday   => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday  => "Thursday",
            Self::Friday    => "Friday",
            Self::Saturday  => "Saturday",
            Self::Sunday    => "Sunday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn month_of(number: u32) -> Month {
    match number {
        1  => Month::January,
        2  => Month::February,
        3  => Month::March,
        4  => Month::April,
        5  => Month::May,
        6  => Month::June,
        7  => Month::July,
        8  => Month::August,
        9  => Month::September,
        10 => Month::October,
        11 => Month::November,
        _  => Month::December,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Fixed Northern-hemisphere mapping; total over 1..=12.
    pub fn for_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Self::Winter,
            3..=5      => Self::Spring,
            6..=8      => Self::Summer,
            _          => Self::Fall,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Winter => "Winter",
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall   => "Fall",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
