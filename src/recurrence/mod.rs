//! Weekly recurrence: the weekday-set representation and the pure
//! month expander that turns a routine template into concrete dates.

use chrono::{Datelike, NaiveDate};

/// A set of weekdays (0=Sunday .. 6=Saturday).
///
/// The domain is intentionally limited to "some subset of weekdays, every
/// week, no end date", so a fixed-size membership array beats a rule engine.
/// Stored as comma-separated day numbers, e.g. "1,3,5" for Mon/Wed/Fri.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WeekdaySet([bool; 7]);

impl WeekdaySet {
    /// Build a set from weekday codes. Codes outside 0-6 are ignored;
    /// reject them up front with `validation::validate_weekday_codes`.
    pub fn from_codes(codes: &[u8]) -> Self {
        let mut days = [false; 7];
        for &code in codes {
            if let Some(slot) = days.get_mut(usize::from(code)) {
                *slot = true;
            }
        }
        Self(days)
    }

    /// Parse the storage format, ignoring parts that are not valid codes.
    pub fn parse_lossy(s: &str) -> Self {
        let codes: Vec<u8> = s
            .split(',')
            .filter_map(|part| part.trim().parse::<u8>().ok())
            .filter(|&code| code <= 6)
            .collect();
        Self::from_codes(&codes)
    }

    /// Render the storage format: ascending comma-separated codes.
    pub fn to_storage(&self) -> String {
        self.codes()
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// The member codes in ascending order.
    pub fn codes(&self) -> Vec<u8> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, &member)| member)
            .filter_map(|(i, _)| u8::try_from(i).ok())
            .collect()
    }

    pub fn contains(&self, code: u32) -> bool {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.0.get(i))
            .copied()
            .unwrap_or(false)
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.contains(date.weekday().num_days_from_sunday())
    }

    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|&member| member)
    }
}

/// First and last calendar day of (year, month), or `None` if the month
/// is out of range.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month_start = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let end = next_month_start.pred_opt()?;
    Some((start, end))
}

/// Expand a weekday set over a month into concrete dates, ascending.
///
/// With `include_past` the window is the whole month; without it the window
/// starts at `today` (the caller's local calendar date). A window that ends
/// before it starts, an invalid month, or an empty weekday set all yield an
/// empty list; there are no error cases.
pub fn expand(
    days: &WeekdaySet,
    year: i32,
    month: u32,
    include_past: bool,
    today: NaiveDate,
) -> Vec<NaiveDate> {
    let Some((month_start, month_end)) = month_bounds(year, month) else {
        return Vec::new();
    };

    let effective_start = if include_past {
        month_start
    } else {
        today.max(month_start)
    };

    let mut dates = Vec::new();
    let mut date = effective_start;
    while date <= month_end {
        if days.contains_date(date) {
            dates.push(date);
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    dates
}
