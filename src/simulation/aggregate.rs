use crate::calendar::WorkCalendar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const REPORTED_PERCENTILES: [f64; 3] = [0.50, 0.85, 0.95];

/// Index of the `p`-th percentile in a sorted sample of `count` values:
/// `floor(p * count)`, clamped to the last element.
pub fn percentile_index(p: f64, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let raw = (p * count as f64).floor() as usize;
    raw.min(count - 1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentilePoint {
    /// Whole-number percentile, e.g. 85.
    pub percentile: u8,
    pub index: usize,
    pub workdays: u32,
    pub end_date: NaiveDate,
}

/// Sorted trial outcomes and the percentiles read from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialStatistics {
    pub sorted_workdays: Vec<u32>,
    pub p50: PercentilePoint,
    pub p85: PercentilePoint,
    pub p95: PercentilePoint,
    pub min_workdays: u32,
    pub max_workdays: u32,
    pub mean_workdays: f64,
}

impl TrialStatistics {
    pub fn from_workdays(
        mut workdays: Vec<u32>,
        calendar: &WorkCalendar,
        start: NaiveDate,
    ) -> Self {
        workdays.sort_unstable();

        let point = |p: f64| {
            let index = percentile_index(p, workdays.len());
            let days = workdays.get(index).copied().unwrap_or(0);
            PercentilePoint {
                percentile: (p * 100.0).round() as u8,
                index,
                workdays: days,
                end_date: calendar.add_workdays(start, days),
            }
        };
        let [p50, p85, p95] = REPORTED_PERCENTILES.map(point);

        let mean_workdays = if workdays.is_empty() {
            0.0
        } else {
            workdays.iter().map(|&d| f64::from(d)).sum::<f64>() / workdays.len() as f64
        };

        Self {
            min_workdays: workdays.first().copied().unwrap_or(0),
            max_workdays: workdays.last().copied().unwrap_or(0),
            mean_workdays,
            p50,
            p85,
            p95,
            sorted_workdays: workdays,
        }
    }

    pub fn percentiles(&self) -> [&PercentilePoint; 3] {
        [&self.p50, &self.p85, &self.p95]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn index_is_floor_and_clamped() {
        assert_eq!(percentile_index(0.5, 10), 5);
        assert_eq!(percentile_index(0.85, 10), 8);
        assert_eq!(percentile_index(0.95, 10), 9);
        assert_eq!(percentile_index(0.95, 1), 0);
        assert_eq!(percentile_index(1.0, 4), 3);
    }

    #[test]
    fn reads_percentiles_from_sorted_trials() {
        let trials: Vec<u32> = (1..=20).rev().collect();
        let stats = TrialStatistics::from_workdays(trials, &WorkCalendar::default(), d(2024, 1, 1));
        assert_eq!(stats.p50.workdays, 11);
        assert_eq!(stats.p85.workdays, 18);
        assert_eq!(stats.p95.workdays, 20);
        assert_eq!(stats.min_workdays, 1);
        assert_eq!(stats.max_workdays, 20);
        assert!((stats.mean_workdays - 10.5).abs() < 1e-12);
        // Monday + 11 workdays
        assert_eq!(stats.p50.end_date, d(2024, 1, 16));
    }

    #[test]
    fn zero_workdays_projects_to_start() {
        let stats =
            TrialStatistics::from_workdays(vec![0, 0, 0], &WorkCalendar::default(), d(2024, 3, 9));
        assert_eq!(stats.p95.workdays, 0);
        assert_eq!(stats.p95.end_date, d(2024, 3, 9));
    }
}
