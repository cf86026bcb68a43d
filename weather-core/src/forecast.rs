//! Collapsing the 3-hour forecast feed into daily summaries.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::model::{DailyForecast, ForecastSlice};

/// Number of upcoming days kept after aggregation.
pub const FORECAST_DAYS: usize = 3;

/// Group `slices` by calendar date and reduce each group to a daily min/max.
///
/// Description and icon come from the first slice of each day in feed order.
/// Only dates strictly after `today` are kept, ascending, at most
/// [`FORECAST_DAYS`] of them.
pub fn aggregate_by_day(slices: &[ForecastSlice], today: NaiveDate) -> Vec<DailyForecast> {
    let mut days: BTreeMap<NaiveDate, DailyForecast> = BTreeMap::new();

    for slice in slices {
        days.entry(slice.date())
            .and_modify(|day| {
                day.temp_min_c = day.temp_min_c.min(slice.temp_min_c);
                day.temp_max_c = day.temp_max_c.max(slice.temp_max_c);
            })
            .or_insert_with(|| DailyForecast {
                date: slice.date(),
                temp_min_c: slice.temp_min_c,
                temp_max_c: slice.temp_max_c,
                description: slice.description.clone(),
                icon: slice.icon.clone(),
            });
    }

    days.into_values()
        .filter(|day| day.date > today)
        .take(FORECAST_DAYS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn slice(ts: &str, min: f64, max: f64, description: &str) -> ForecastSlice {
        ForecastSlice {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            temp_min_c: min,
            temp_max_c: max,
            description: description.to_string(),
            icon: format!("{description}-icon"),
        }
    }

    #[test]
    fn groups_and_reduces_same_day_slices() {
        let slices = vec![
            slice("2024-01-02 09:00:00", 1.0, 5.0, "clouds"),
            slice("2024-01-02 12:00:00", -1.0, 3.0, "snow"),
            slice("2024-01-03 09:00:00", 0.0, 2.0, "clear"),
        ];

        let days = aggregate_by_day(&slices, date("2024-01-01"));

        assert_eq!(
            days,
            vec![
                DailyForecast {
                    date: date("2024-01-02"),
                    temp_min_c: -1.0,
                    temp_max_c: 5.0,
                    description: "clouds".into(),
                    icon: "clouds-icon".into(),
                },
                DailyForecast {
                    date: date("2024-01-03"),
                    temp_min_c: 0.0,
                    temp_max_c: 2.0,
                    description: "clear".into(),
                    icon: "clear-icon".into(),
                },
            ]
        );
    }

    #[test]
    fn drops_today_and_keeps_three_days_ascending() {
        let slices = vec![
            slice("2024-03-05 00:00:00", 4.0, 9.0, "rain"),
            slice("2024-03-01 21:00:00", 1.0, 2.0, "clear"),
            slice("2024-03-03 12:00:00", 3.0, 6.0, "clouds"),
            slice("2024-03-02 12:00:00", 2.0, 8.0, "mist"),
            slice("2024-03-04 12:00:00", 5.0, 7.0, "snow"),
        ];

        let days = aggregate_by_day(&slices, date("2024-03-01"));
        let dates: Vec<_> = days.iter().map(|d| d.date).collect();

        assert_eq!(dates, vec![date("2024-03-02"), date("2024-03-03"), date("2024-03-04")]);
    }

    #[test]
    fn crosses_month_and_year_boundaries() {
        let slices = vec![
            slice("2023-12-31 18:00:00", 0.0, 1.0, "clear"),
            slice("2024-01-01 03:00:00", -2.0, 0.0, "clear"),
        ];

        let days = aggregate_by_day(&slices, date("2023-12-30"));
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, date("2023-12-31"));
        assert_eq!(days[1].date, date("2024-01-01"));
    }

    #[test]
    fn nothing_after_today_yields_empty() {
        let slices = vec![slice("2024-01-01 12:00:00", 0.0, 1.0, "clear")];
        assert!(aggregate_by_day(&slices, date("2024-01-01")).is_empty());
        assert!(aggregate_by_day(&[], date("2024-01-01")).is_empty());
    }

    #[test]
    fn full_five_day_feed_stays_bounded() {
        let start = NaiveDateTime::parse_from_str("2024-06-10 00:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        let slices: Vec<_> = (0..40)
            .map(|i| ForecastSlice {
                timestamp: start + chrono::Duration::hours(3 * i),
                temp_min_c: i as f64,
                temp_max_c: i as f64 + 1.0,
                description: "clear".into(),
                icon: "01d".into(),
            })
            .collect();

        let today = date("2024-06-10");
        let days = aggregate_by_day(&slices, today);

        assert_eq!(days.len(), FORECAST_DAYS);
        assert!(days.iter().all(|d| d.date > today));
        assert!(days.windows(2).all(|w| w[0].date < w[1].date));
        // 2024-06-11 covers slices 8..=15.
        assert_eq!(days[0].temp_min_c, 8.0);
        assert_eq!(days[0].temp_max_c, 16.0);
    }
}
