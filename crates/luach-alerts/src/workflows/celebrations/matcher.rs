//! Yearly recurrence checks shared by every notification kind.

use chrono::{Datelike, NaiveDate};

/// True when both dates fall on the same month and day, ignoring the year.
pub fn is_same_month_day(a: NaiveDate, b: NaiveDate) -> bool {
    a.month() == b.month() && a.day() == b.day()
}

/// Full years elapsed from `earlier` to `reference`.
///
/// The raw year difference is reduced by one while this year's recurrence of
/// `earlier` is still ahead of `reference`. A `reference` before `earlier`
/// yields a negative count.
pub fn years_between(earlier: NaiveDate, reference: NaiveDate) -> i32 {
    let years = reference.year() - earlier.year();
    if (reference.month(), reference.day()) < (earlier.month(), earlier.day()) {
        years - 1
    } else {
        years
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn same_month_day_ignores_year_and_is_symmetric() {
        let pairs = [
            (date(1990, 3, 1), date(2024, 3, 1), true),
            (date(1990, 3, 1), date(2024, 3, 2), false),
            (date(2000, 2, 29), date(2024, 2, 29), true),
            (date(2000, 2, 29), date(2023, 3, 1), false),
            (date(1999, 12, 31), date(1999, 1, 31), false),
        ];

        for (a, b, expected) in pairs {
            assert_eq!(is_same_month_day(a, b), expected, "{a} vs {b}");
            assert_eq!(is_same_month_day(a, b), is_same_month_day(b, a));
        }
    }

    #[test]
    fn years_between_is_zero_for_identical_dates() {
        for d in [date(1900, 1, 1), date(2000, 2, 29), date(2024, 12, 31)] {
            assert_eq!(years_between(d, d), 0);
        }
    }

    #[test]
    fn years_between_rolls_back_before_the_anniversary() {
        assert_eq!(years_between(date(2000, 5, 10), date(2024, 5, 9)), 23);
        assert_eq!(years_between(date(2000, 5, 10), date(2024, 5, 10)), 24);
        assert_eq!(years_between(date(2000, 5, 10), date(2024, 4, 30)), 23);
        assert_eq!(years_between(date(2000, 5, 10), date(2024, 6, 1)), 24);
    }

    #[test]
    fn years_between_spans_centuries() {
        assert_eq!(years_between(date(1899, 12, 31), date(2000, 1, 1)), 100);
        assert_eq!(years_between(date(1899, 12, 31), date(1999, 12, 30)), 99);
    }

    #[test]
    fn years_between_is_negative_when_reference_precedes() {
        assert_eq!(years_between(date(2024, 5, 10), date(2020, 5, 10)), -4);
        assert_eq!(years_between(date(2024, 5, 10), date(2024, 5, 9)), -1);
    }

    #[test]
    fn leap_day_birthdays_count_from_march() {
        let born = date(2000, 2, 29);
        assert_eq!(years_between(born, date(2023, 2, 28)), 22);
        assert_eq!(years_between(born, date(2023, 3, 1)), 23);
    }
}
