//! Trend aggregation and statistics.
//!
//! Pure functions turning a raw trend series into the derived metrics the
//! dashboard charts consume. Nothing here fails: empty or malformed input
//! degrades to zero or an empty series.

use crate::models::{GrowthPoint, SentimentCounts, TrendSample};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Sentiment above this is positive.
pub const POSITIVE_THRESHOLD: f64 = 0.2;

/// Sentiment below this is negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.2;

/// Which value of a sample a windowed metric reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelector {
    /// Sum of every numeric keyword value.
    Total,
    /// One keyword; absent or non-numeric counts as 0.
    Keyword(String),
}

impl FieldSelector {
    pub fn keyword(name: impl Into<String>) -> Self {
        FieldSelector::Keyword(name.into())
    }

    fn read(&self, sample: &TrendSample) -> f64 {
        match self {
            FieldSelector::Total => sample.total(),
            FieldSelector::Keyword(name) => sample.value(name),
        }
    }
}

/// Accumulator for one calendar month.
#[derive(Debug, Default)]
struct MonthlyBucket {
    total: f64,
    count: usize,
}

impl MonthlyBucket {
    fn average(&self) -> f64 {
        self.total / self.count as f64
    }
}

/// Round half toward positive infinity, matching the chart consumer.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn round_one_decimal(value: f64) -> f64 {
    // + 0.0 folds -0.0 into 0.0
    (value * 10.0).round() / 10.0 + 0.0
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %y").to_string())
        .unwrap_or_else(|| format!("{:04}-{:02}", year, month))
}

/// Month-over-month growth of the average sample total.
///
/// Samples are bucketed by calendar month and each bucket's average total
/// is compared against the previous month's. Buckets are walked in
/// chronological order regardless of input order. The first month has no
/// predecessor and yields no point, so the output is one shorter than the
/// number of distinct months.
///
/// A previous average of exactly zero yields a growth of `0.0` rather than
/// an infinite or undefined percentage.
pub fn monthly_growth(samples: &[TrendSample]) -> Vec<GrowthPoint> {
    let mut buckets: BTreeMap<(i32, u32), MonthlyBucket> = BTreeMap::new();

    for sample in samples {
        let bucket = buckets
            .entry((sample.date.year(), sample.date.month()))
            .or_default();
        bucket.total += sample.total();
        bucket.count += 1;
    }

    let mut points = Vec::with_capacity(buckets.len().saturating_sub(1));
    let mut previous: Option<f64> = None;

    for ((year, month), bucket) in &buckets {
        let average = bucket.average();

        if let Some(prev) = previous {
            let growth = if prev == 0.0 {
                0.0
            } else {
                round_one_decimal((average - prev) / prev * 100.0)
            };

            points.push(GrowthPoint {
                month: month_label(*year, *month),
                growth_percent: growth,
                average_value: round_half_up(average),
            });
        }

        previous = Some(average);
    }

    points
}

/// Average of the selected field over the last `n` samples.
///
/// The sum is always divided by `n`, even when fewer than `n` samples
/// exist, so a short series reads as a partially filled window.
pub fn rolling_average_last_n(samples: &[TrendSample], n: usize, selector: &FieldSelector) -> i64 {
    if samples.is_empty() || n == 0 {
        return 0;
    }

    let start = samples.len().saturating_sub(n);
    let sum: f64 = samples[start..].iter().map(|s| selector.read(s)).sum();

    round_half_up(sum / n as f64)
}

/// Percent change between the leading and trailing `n`-sample windows.
///
/// The two windows overlap when the series is shorter than `2n`. Returns 0
/// for fewer than two samples or when the leading average is zero.
pub fn period_over_period_change(
    samples: &[TrendSample],
    selector: &FieldSelector,
    n: usize,
) -> i64 {
    if samples.len() < 2 || n == 0 {
        return 0;
    }

    let width = n.min(samples.len());
    let window_average = |window: &[TrendSample]| -> f64 {
        window.iter().map(|s| selector.read(s)).sum::<f64>() / n as f64
    };

    let first = window_average(&samples[..width]);
    let last = window_average(&samples[samples.len() - width..]);

    if first == 0.0 {
        return 0;
    }

    round_half_up((last - first) / first * 100.0)
}

/// Partition sentiment scores into positive, neutral and negative counts.
pub fn sentiment_buckets<I>(sentiments: I) -> SentimentCounts
where
    I: IntoIterator<Item = f64>,
{
    sentiments
        .into_iter()
        .fold(SentimentCounts::default(), |mut counts, sentiment| {
            if sentiment > POSITIVE_THRESHOLD {
                counts.positive += 1;
            } else if sentiment < NEGATIVE_THRESHOLD {
                counts.negative += 1;
            } else {
                counts.neutral += 1;
            }
            counts
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn brand(date: NaiveDate, value: f64) -> TrendSample {
        TrendSample::new(date, [("brand", value)])
    }

    fn daily_series(len: usize, trend: f64, brand: f64) -> Vec<TrendSample> {
        (0..len)
            .map(|i| {
                TrendSample::new(
                    day(2024, 1, 1) + chrono::Duration::days(i as i64),
                    [("trend", trend), ("brand", brand)],
                )
            })
            .collect()
    }

    #[test]
    fn test_monthly_growth_example() {
        let samples = vec![
            brand(day(2024, 1, 5), 10.0),
            brand(day(2024, 1, 20), 20.0),
            brand(day(2024, 2, 5), 40.0),
        ];

        let growth = monthly_growth(&samples);

        assert_eq!(
            growth,
            vec![GrowthPoint {
                month: "Feb 24".to_string(),
                growth_percent: 166.7,
                average_value: 40,
            }]
        );
    }

    #[test]
    fn test_monthly_growth_empty() {
        assert!(monthly_growth(&[]).is_empty());
    }

    #[test]
    fn test_monthly_growth_single_month() {
        let samples = vec![brand(day(2024, 5, 1), 3.0), brand(day(2024, 5, 9), 4.0)];
        assert!(monthly_growth(&samples).is_empty());
    }

    #[test]
    fn test_monthly_growth_one_point_per_month_after_first() {
        let samples: Vec<TrendSample> = (1..=12)
            .flat_map(|m| vec![brand(day(2023, m, 3), m as f64), brand(day(2023, m, 17), 1.0)])
            .chain(std::iter::once(brand(day(2024, 1, 2), 9.0)))
            .collect();

        let growth = monthly_growth(&samples);

        assert_eq!(growth.len(), 12);
        assert_eq!(growth.first().unwrap().month, "Feb 23");
        assert_eq!(growth.last().unwrap().month, "Jan 24");
    }

    #[test]
    fn test_monthly_growth_flat_series_is_zero() {
        let samples = vec![
            brand(day(2024, 1, 1), 25.0),
            brand(day(2024, 2, 1), 25.0),
            brand(day(2024, 3, 1), 25.0),
        ];

        let growth = monthly_growth(&samples);

        assert_eq!(growth.len(), 2);
        assert!(growth.iter().all(|p| p.growth_percent == 0.0));
        assert!(growth.iter().all(|p| p.average_value == 25));
    }

    #[test]
    fn test_monthly_growth_tiny_decline_rounds_to_positive_zero() {
        let samples = vec![brand(day(2024, 1, 5), 10000.0), brand(day(2024, 2, 5), 9999.0)];

        let growth = monthly_growth(&samples);

        assert_eq!(growth[0].growth_percent, 0.0);
        assert!(growth[0].growth_percent.is_sign_positive());
    }

    #[test]
    fn test_monthly_growth_zero_previous_average() {
        let samples = vec![brand(day(2024, 1, 1), 0.0), brand(day(2024, 2, 1), 12.0)];

        let growth = monthly_growth(&samples);

        assert_eq!(growth[0].growth_percent, 0.0);
        assert!(growth[0].growth_percent.is_finite());
        assert_eq!(growth[0].average_value, 12);
    }

    #[test]
    fn test_monthly_growth_sorts_out_of_order_input() {
        let samples = vec![
            brand(day(2024, 3, 1), 30.0),
            brand(day(2024, 1, 1), 10.0),
            brand(day(2024, 2, 1), 20.0),
        ];

        let months: Vec<String> = monthly_growth(&samples).into_iter().map(|p| p.month).collect();

        assert_eq!(months, vec!["Feb 24", "Mar 24"]);
    }

    #[test]
    fn test_monthly_growth_sums_all_keywords() {
        let samples = vec![
            TrendSample::new(day(2024, 1, 14), [("trend", 10.0), ("ad", 10.0)]),
            TrendSample::new(day(2024, 2, 14), [("trend", 5.0), ("ad", 10.0)]),
        ];

        let growth = monthly_growth(&samples);

        assert_eq!(growth[0].growth_percent, -25.0);
        assert_eq!(growth[0].average_value, 15);
    }

    #[test]
    fn test_rolling_average_underfills() {
        let samples = daily_series(10, 2.0, 1.0);

        // 10 samples * 3.0 total = 30, divided by the window of 30
        assert_eq!(rolling_average_last_n(&samples, 30, &FieldSelector::Total), 1);
        assert_eq!(rolling_average_last_n(&samples, 10, &FieldSelector::Total), 3);
    }

    #[test]
    fn test_rolling_average_uses_trailing_window() {
        let mut samples = daily_series(5, 0.0, 100.0);
        samples.extend(daily_series(3, 0.0, 10.0));

        assert_eq!(rolling_average_last_n(&samples, 3, &FieldSelector::keyword("brand")), 10);
    }

    #[test]
    fn test_rolling_average_degenerate() {
        assert_eq!(rolling_average_last_n(&[], 30, &FieldSelector::Total), 0);
        let samples = daily_series(3, 1.0, 1.0);
        assert_eq!(rolling_average_last_n(&samples, 0, &FieldSelector::Total), 0);
        assert_eq!(rolling_average_last_n(&samples, 30, &FieldSelector::keyword("absent")), 0);
    }

    #[test]
    fn test_period_over_period_change() {
        let mut samples = daily_series(30, 10.0, 0.0);
        samples.extend(daily_series(30, 15.0, 0.0));

        assert_eq!(
            period_over_period_change(&samples, &FieldSelector::keyword("trend"), 30),
            50
        );
    }

    #[test]
    fn test_period_over_period_overlapping_windows() {
        let samples = vec![
            TrendSample::new(day(2024, 1, 1), [("trend", 10.0)]),
            TrendSample::new(day(2024, 1, 2), [("trend", 20.0)]),
        ];

        // Both windows cover the whole series
        assert_eq!(period_over_period_change(&samples, &FieldSelector::keyword("trend"), 30), 0);
        assert_eq!(period_over_period_change(&samples, &FieldSelector::keyword("trend"), 1), 100);
    }

    #[test]
    fn test_period_over_period_degenerate() {
        let trend = FieldSelector::keyword("trend");
        assert_eq!(period_over_period_change(&[], &trend, 30), 0);
        assert_eq!(period_over_period_change(&daily_series(1, 5.0, 0.0), &trend, 30), 0);

        let mut samples = daily_series(2, 0.0, 0.0);
        samples.extend(daily_series(2, 8.0, 0.0));
        assert_eq!(period_over_period_change(&samples, &trend, 2), 0);
    }

    #[test]
    fn test_sentiment_buckets() {
        let counts = sentiment_buckets(vec![0.5, 0.2, 0.0, -0.2, -0.21, 0.21, -1.0]);

        assert_eq!(counts.positive, 2);
        assert_eq!(counts.neutral, 3);
        assert_eq!(counts.negative, 2);
        assert_eq!(counts.total(), 7);
    }

    #[test]
    fn test_sentiment_buckets_empty() {
        assert_eq!(sentiment_buckets(Vec::new()), SentimentCounts::default());
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(2.49), 2);
    }
}
