use chrono::{Datelike, Months, NaiveDate};

pub fn get_days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        if let Some(next) = current.succ_opt() {
            current = next;
        } else {
            // Should not happen for typical date ranges
            break;
        }
    }
    days
}

/// Calendar-month bucket key for a date.
pub fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

pub fn start_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

/// `date` minus `months` calendar months, pinned to the last valid day of the
/// target month when the nominal day does not exist (e.g. May 31 minus 1
/// month is Apr 30).
pub fn months_back(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months)).unwrap_or(date)
}

pub fn years_back(date: NaiveDate, years: u32) -> NaiveDate {
    months_back(date, years * 12)
}
