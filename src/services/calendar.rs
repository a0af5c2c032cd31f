// src/services/calendar.rs
use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::models::Cadence;

/// Today's date in ISO-8601 `%Y-%m-%d`.
pub fn date_today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Label of the period containing `date`: week ending Sunday, month end,
/// quarter end or Dec 31. `Cadence::None` leaves the date as is.
pub fn period_end(date: NaiveDate, cadence: Cadence) -> NaiveDate {
    match cadence {
        Cadence::None => date,
        Cadence::Weekly => {
            let to_sunday = 6 - date.weekday().num_days_from_monday() as i64;
            date + Duration::days(to_sunday)
        }
        Cadence::Monthly => last_day_of_month(date.year(), date.month()),
        Cadence::Quarterly => {
            let quarter_end_month = ((date.month() - 1) / 3 + 1) * 3;
            last_day_of_month(date.year(), quarter_end_month)
        }
        Cadence::Yearly => last_day_of_month(date.year(), 12),
    }
}

/// Label of the period right after the one ending on `end`.
pub fn next_period_end(end: NaiveDate, cadence: Cadence) -> Option<NaiveDate> {
    match cadence {
        Cadence::None => end.succ_opt(),
        _ => end.succ_opt().map(|d| period_end(d, cadence)),
    }
}

/// Every period-end label from the period of `first` through the period of `last`.
pub fn period_ends(first: NaiveDate, last: NaiveDate, cadence: Cadence) -> Vec<NaiveDate> {
    let stop = period_end(last, cadence);
    let mut out = Vec::new();
    let mut current = Some(period_end(first, cadence));
    while let Some(label) = current {
        if label > stop {
            break;
        }
        out.push(label);
        current = next_period_end(label, cadence);
    }
    out
}

/// Years whose Dec 31 falls inside `[start, end]`.
pub fn year_ends_between(start: NaiveDate, end: NaiveDate) -> Vec<i32> {
    (start.year()..=end.year())
        .filter(|&year| {
            let year_end = last_day_of_month(year, 12);
            year_end >= start && year_end <= end
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekly_periods_end_on_sunday() {
        // 2024-01-03 is a Wednesday
        assert_eq!(period_end(d(2024, 1, 3), Cadence::Weekly), d(2024, 1, 7));
        assert_eq!(period_end(d(2024, 1, 7), Cadence::Weekly), d(2024, 1, 7));
        assert_eq!(period_end(d(2024, 1, 8), Cadence::Weekly), d(2024, 1, 14));
    }

    #[test]
    fn month_and_quarter_ends() {
        assert_eq!(period_end(d(2024, 2, 10), Cadence::Monthly), d(2024, 2, 29));
        assert_eq!(period_end(d(2023, 2, 10), Cadence::Monthly), d(2023, 2, 28));
        assert_eq!(period_end(d(2023, 12, 1), Cadence::Monthly), d(2023, 12, 31));
        assert_eq!(period_end(d(2023, 5, 1), Cadence::Quarterly), d(2023, 6, 30));
        assert_eq!(period_end(d(2023, 10, 1), Cadence::Quarterly), d(2023, 12, 31));
        assert_eq!(period_end(d(2023, 5, 1), Cadence::Yearly), d(2023, 12, 31));
    }

    #[test]
    fn period_ends_cover_the_span() {
        let labels = period_ends(d(2020, 1, 15), d(2020, 4, 2), Cadence::Monthly);
        assert_eq!(
            labels,
            vec![d(2020, 1, 31), d(2020, 2, 29), d(2020, 3, 31), d(2020, 4, 30)]
        );
    }

    #[test]
    fn year_ends_follow_window_bounds() {
        assert_eq!(year_ends_between(d(2000, 1, 1), d(2003, 12, 31)), vec![2000, 2001, 2002, 2003]);
        // 2003-06-30 has not reached the 2003 year end yet
        assert_eq!(year_ends_between(d(2000, 1, 1), d(2003, 6, 30)), vec![2000, 2001, 2002]);
    }

    #[test]
    fn today_is_iso_formatted() {
        let today = date_today();
        assert!(NaiveDate::parse_from_str(&today, "%Y-%m-%d").is_ok());
    }
}
