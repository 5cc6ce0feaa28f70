//! Elapsed incubation time from the sheet's date and time cells.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const ISO_DATE: &str = "%Y-%m-%d";
const DAY_FIRST_DATES: &[&str] = &["%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y"];
const MONTH_FIRST_DATES: &[&str] = &["%m/%d/%Y", "%m-%d-%Y"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%H:%M:%S%.f"];

/// Parse a date cell. ISO dates are always accepted; the ambiguous
/// slash/dash forms follow `day_first`.
///
/// A date cell that carries its own time of day (as spreadsheets export
/// datetime cells) yields that time too.
pub fn parse_date(cell: &str, day_first: bool) -> Option<(NaiveDate, Option<NaiveTime>)> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }

    for fmt in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cell, fmt) {
            return Some((dt.date(), Some(dt.time())));
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(cell, ISO_DATE) {
        return Some((d, None));
    }

    let formats = if day_first { DAY_FIRST_DATES } else { MONTH_FIRST_DATES };
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
        .map(|d| (d, None))
}

fn midnight() -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(0, 0, 0)
}

/// Parse a time cell; an empty cell is midnight
pub fn parse_time(cell: &str) -> Option<NaiveTime> {
    let cell = cell.trim();
    if cell.is_empty() {
        return midnight();
    }
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(cell, fmt).ok())
}

/// Combine one row's date and time cells. A non-empty time cell wins over a
/// time embedded in the date cell.
pub fn parse_timestamp(date: &str, time: &str, day_first: bool) -> Option<NaiveDateTime> {
    let (day, embedded) = parse_date(date, day_first)?;
    let time_of_day = if time.trim().is_empty() {
        embedded.or_else(midnight)?
    } else {
        parse_time(time)?
    };
    Some(day.and_time(time_of_day))
}

/// Fractional days since row 0. Unparsable rows, and every row when row 0
/// is unparsable, are `NaN`.
pub fn elapsed_days(dates: &[String], times: &[String], day_first: bool) -> Vec<f64> {
    let stamps: Vec<Option<NaiveDateTime>> = dates
        .iter()
        .zip(times)
        .map(|(d, t)| parse_timestamp(d, t, day_first))
        .collect();

    let origin = stamps.first().copied().flatten();

    stamps
        .iter()
        .map(|stamp| match (origin, stamp) {
            (Some(origin), Some(stamp)) => {
                let delta = *stamp - origin;
                delta.num_milliseconds() as f64 / 86_400_000.0
            }
            _ => f64::NAN,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_elapsed_days() {
        let dates = strings(&["2023-03-01", "2023-03-01", "2023-03-03"]);
        let times = strings(&["06:00:00", "18:00:00", ""]);

        let days = elapsed_days(&dates, &times, false);
        assert_eq!(days[0], 0.0);
        assert_eq!(days[1], 0.5);
        assert_eq!(days[2], 1.75);
    }

    #[test]
    fn test_day_first_switch() {
        let (d, _) = parse_date("03/04/2023", true).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2023, 4, 3).unwrap());

        let (d, _) = parse_date("03/04/2023", false).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2023, 3, 4).unwrap());
    }

    #[test]
    fn test_embedded_time() {
        let stamp = parse_timestamp("2023-03-01 12:00:00", "", false).unwrap();
        assert_eq!(stamp.time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());

        let stamp = parse_timestamp("2023-03-01 12:00:00", "08:30", false).unwrap();
        assert_eq!(stamp.time(), NaiveTime::from_hms_opt(8, 30, 0).unwrap());
    }

    #[test]
    fn test_unparsable_rows() {
        let dates = strings(&["2023-03-01", "not a date", "2023-03-02"]);
        let times = strings(&["", "", "25:00:00"]);

        let days = elapsed_days(&dates, &times, false);
        assert_eq!(days[0], 0.0);
        assert!(days[1].is_nan());
        assert!(days[2].is_nan());
    }

    #[test]
    fn test_unparsable_origin() {
        let dates = strings(&["", "2023-03-02"]);
        let times = strings(&["", ""]);
        assert!(elapsed_days(&dates, &times, false).iter().all(|d| d.is_nan()));
    }
}
