use crate::parameter_value::format_time_stamp;
use crate::{TimeLine, TimeStamp};
use chrono::{Datelike, Duration, NaiveDate};

fn start_of_year(year: i32) -> TimeStamp {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .expect("January 1st should exist for any year")
        .and_hms_opt(0, 0, 0)
        .expect("midnight should be a valid time")
}

fn hourly_range(start: TimeStamp, end: TimeStamp) -> TimeLine {
    let mut series = Vec::new();
    let mut stamp = start;
    while stamp <= end {
        series.push(stamp);
        stamp += Duration::hours(1);
    }
    series
}

/// Generates an hourly time index for a model year.
///
/// With `full_year` the index covers the whole year: 8784 stamps when the
/// leap day is kept, 8760 otherwise with February 29th dropped. Without it
/// `relative_pos` gives the start hour and the inclusive end offset in
/// hours from the start of the year; when the leap day is not modelled a
/// window that would begin on or after it starts one day later instead.
pub fn generate_time_index(
    year: i32,
    relative_pos: (i64, i64),
    full_year: bool,
    leap: bool,
) -> TimeLine {
    if full_year {
        let start = start_of_year(year);
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .expect("December 31st should exist for any year")
            .and_hms_opt(23, 0, 0)
            .expect("hour 23 should be a valid time");
        let range = hourly_range(start, end);
        if year % 4 == 0 && leap {
            return range.into_iter().take(8784).collect();
        }
        return range
            .into_iter()
            .filter(|stamp| !(stamp.month() == 2 && stamp.day() == 29))
            .take(8760)
            .collect();
    }
    let mut start = start_of_year(year) + Duration::hours(relative_pos.0);
    if !leap {
        if let Some(leap_day) = NaiveDate::from_ymd_opt(year, 2, 29) {
            let leap_day_start = leap_day
                .and_hms_opt(0, 0, 0)
                .expect("midnight should be a valid time");
            if start >= leap_day_start {
                start += Duration::days(1);
            }
        }
    }
    let end = start + Duration::hours(relative_pos.1);
    hourly_range(start, end)
}

/// Renders a time line the way parameter-value time stamps are keyed.
pub fn format_time_index(time_line: &TimeLine) -> Vec<String> {
    time_line.iter().map(format_time_stamp).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_non_leap_year_has_8760_hours() {
        let index = generate_time_index(2021, (0, 0), true, false);
        assert_eq!(index.len(), 8760);
        assert_eq!(format_time_stamp(&index[0]), "2021-01-01 00:00:00");
        assert_eq!(
            format_time_stamp(index.last().expect("index should not be empty")),
            "2021-12-31 23:00:00"
        );
    }

    #[test]
    fn full_leap_year_with_leap_day_has_8784_hours() {
        let index = generate_time_index(2020, (0, 0), true, true);
        assert_eq!(index.len(), 8784);
    }

    #[test]
    fn full_leap_year_without_leap_day_skips_february_29th() {
        let index = generate_time_index(2020, (0, 0), true, false);
        assert_eq!(index.len(), 8760);
        assert!(!index
            .iter()
            .any(|stamp| stamp.month() == 2 && stamp.day() == 29));
    }

    #[test]
    fn relative_window_is_inclusive() {
        let index = generate_time_index(2021, (0, 23), false, false);
        assert_eq!(index.len(), 24);
        assert_eq!(format_time_stamp(&index[0]), "2021-01-01 00:00:00");
        assert_eq!(format_time_stamp(&index[23]), "2021-01-01 23:00:00");
    }

    #[test]
    fn window_starting_on_the_leap_day_moves_one_day_forward() {
        // 2020-02-29 00:00 is hour 1416 of the leap year.
        let index = generate_time_index(2020, (1416, 0), false, false);
        assert_eq!(format_time_stamp(&index[0]), "2020-03-01 00:00:00");
    }

    #[test]
    fn formatting_matches_parameter_value_keys() {
        let index = generate_time_index(2021, (10, 1), false, false);
        let formatted = format_time_index(&index);
        assert_eq!(
            formatted,
            vec!["2021-01-01 10:00:00", "2021-01-01 11:00:00"]
        );
    }
}
