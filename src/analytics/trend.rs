//! Trend analysis - pure statistics over immutable history snapshots
//!
//! Every function here is deterministic and total: identical inputs give
//! identical outputs, and insufficient data yields an explicit sentinel
//! instead of an error.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::history::HistoryEntry;
use crate::reading::{ActivityEntry, ActivityLevel, SleepSession};

// ============================================================================
// TREND DIRECTION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

/// Margin below which a first-half/second-half mean difference is read
/// as noise rather than a trend.
pub const TREND_NOISE_MARGIN: f64 = 0.3;

/// Compare first-half and second-half means of a chronological series.
pub fn trend_direction(chronological: &[f64]) -> TrendDirection {
    if chronological.len() < 2 {
        return TrendDirection::InsufficientData;
    }
    let mid = chronological.len() / 2;
    let (first, second) = chronological.split_at(mid);
    let first_mean = first.iter().sum::<f64>() / first.len() as f64;
    let second_mean = second.iter().sum::<f64>() / second.len() as f64;

    if second_mean > first_mean + TREND_NOISE_MARGIN {
        TrendDirection::Increasing
    } else if second_mean < first_mean - TREND_NOISE_MARGIN {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}

// ============================================================================
// NUMERIC SERIES STATISTICS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub data_points: usize,
}

/// Values within the trailing window, oldest first. Input entries are
/// newest-first, as history snapshots are.
pub fn windowed_values(
    entries: &[HistoryEntry<f64>],
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<f64> {
    let cutoff = now - window;
    let mut values: Vec<f64> = entries
        .iter()
        .filter(|e| e.timestamp > cutoff)
        .map(|e| e.value)
        .collect();
    values.reverse();
    values
}

/// Aggregate statistics over the trailing window. Requires at least two
/// points in the window; otherwise the data is insufficient.
pub fn series_stats(
    entries: &[HistoryEntry<f64>],
    now: DateTime<Utc>,
    window: Duration,
) -> Option<SeriesStats> {
    let values = windowed_values(entries, now, window);
    if values.len() < 2 {
        return None;
    }
    let sum: f64 = values.iter().sum();
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    Some(SeriesStats {
        average: sum / values.len() as f64,
        min,
        max,
        data_points: values.len(),
    })
}

// ============================================================================
// MODE
// ============================================================================

/// Most frequent value. Ties break toward the first-encountered value,
/// so the result is stable for any fixed input order.
pub fn mode<T: PartialEq + Clone>(items: &[T]) -> Option<T> {
    let mut best: Option<(&T, usize)> = None;
    for (i, item) in items.iter().enumerate() {
        if items[..i].contains(item) {
            continue;
        }
        let count = items.iter().filter(|x| *x == item).count();
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((item, count)),
        }
    }
    best.map(|(item, _)| item.clone())
}

// ============================================================================
// SLEEP ANALYSIS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SleepQuality {
    Excellent,
    Good,
    Fair,
    Poor,
    Unknown,
}

impl std::fmt::Display for SleepQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SleepQuality::Excellent => write!(f, "excellent"),
            SleepQuality::Good => write!(f, "good"),
            SleepQuality::Fair => write!(f, "fair"),
            SleepQuality::Poor => write!(f, "poor"),
            SleepQuality::Unknown => write!(f, "unknown"),
        }
    }
}

pub fn average_sleep_duration(sessions: &[SleepSession]) -> Option<f64> {
    if sessions.is_empty() {
        return None;
    }
    let total: f64 = sessions.iter().map(|s| s.duration_hours).sum();
    Some(total / sessions.len() as f64)
}

fn average_interruptions(sessions: &[SleepSession]) -> f64 {
    if sessions.is_empty() {
        return 0.0;
    }
    let total: u32 = sessions.iter().map(|s| s.interruptions).sum();
    f64::from(total) / sessions.len() as f64
}

/// Quality bands for infant sleep (14-17h is the recommended range).
/// Duration bounds are inclusive: 14.0h with one interruption is still
/// excellent.
pub fn sleep_quality(sessions: &[SleepSession]) -> SleepQuality {
    let Some(avg_duration) = average_sleep_duration(sessions) else {
        return SleepQuality::Unknown;
    };
    let avg_interruptions = average_interruptions(sessions);

    if avg_duration >= 14.0 && avg_interruptions < 2.0 {
        SleepQuality::Excellent
    } else if avg_duration >= 12.0 && avg_interruptions < 3.0 {
        SleepQuality::Good
    } else if avg_duration >= 10.0 {
        SleepQuality::Fair
    } else {
        SleepQuality::Poor
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SleepInsightKind {
    Duration,
    Interruptions,
    NapTiming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepInsight {
    pub kind: SleepInsightKind,
    pub message: String,
    pub action: String,
}

/// Actionable observations over the sleep log. Empty input yields no
/// insights, never an error.
pub fn sleep_insights(sessions: &[SleepSession]) -> Vec<SleepInsight> {
    let mut insights = Vec::new();

    if let Some(avg) = average_sleep_duration(sessions) {
        if avg < 12.0 {
            insights.push(SleepInsight {
                kind: SleepInsightKind::Duration,
                message: "Baby is sleeping less than recommended".to_string(),
                action: "Create consistent bedtime routine. Dim lights 30 minutes before sleep."
                    .to_string(),
            });
        }
    }

    if sessions.iter().any(|s| s.interruptions > 3) {
        insights.push(SleepInsight {
            kind: SleepInsightKind::Interruptions,
            message: "Multiple sleep interruptions detected".to_string(),
            action: "Check room temperature (18-21\u{b0}C is ideal). Reduce noise and light."
                .to_string(),
        });
    }

    if !sessions.is_empty() {
        let morning = sessions.iter().filter(|s| s.start.hour() < 12).count();
        if morning as f64 > sessions.len() as f64 * 0.7 {
            insights.push(SleepInsight {
                kind: SleepInsightKind::NapTiming,
                message: "Most sleep happens in morning".to_string(),
                action: "Consider adjusting daytime activities to match natural sleep patterns."
                    .to_string(),
            });
        }
    }

    insights
}

/// Typical sleep-start hour, the mode of session start hours.
pub fn predicted_sleep_hour(sessions: &[SleepSession]) -> Option<u32> {
    let hours: Vec<u32> = sessions.iter().map(|s| s.start.hour()).collect();
    mode(&hours)
}

/// Next wall-clock occurrence of the predicted sleep hour.
pub fn next_expected_sleep(predicted_hour: u32, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let today = now.with_hour(predicted_hour)?.with_minute(0)?.with_second(0)?.with_nanosecond(0)?;
    if today >= now {
        Some(today)
    } else {
        Some(today + Duration::days(1))
    }
}

// ============================================================================
// ACTIVITY ANALYSIS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActivityDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub distribution: ActivityDistribution,
    pub most_common: Option<ActivityLevel>,
    pub average_per_day: Option<f64>,
}

/// Days spanned by a log up to `now`, rounded up, at least one.
pub fn days_spanned<I>(timestamps: I, now: DateTime<Utc>) -> i64
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let Some(oldest) = timestamps.into_iter().min() else {
        return 1;
    };
    let elapsed = now - oldest;
    let days = (elapsed.num_seconds() as f64 / 86_400.0).ceil() as i64;
    days.max(1)
}

pub fn activity_summary(entries: &[ActivityEntry], now: DateTime<Utc>) -> ActivitySummary {
    let mut distribution = ActivityDistribution::default();
    for entry in entries {
        match entry.level {
            ActivityLevel::Low => distribution.low += 1,
            ActivityLevel::Medium => distribution.medium += 1,
            ActivityLevel::High => distribution.high += 1,
        }
    }

    let levels: Vec<ActivityLevel> = entries.iter().map(|e| e.level).collect();
    let most_common = mode(&levels);

    let average_per_day = if entries.is_empty() {
        None
    } else {
        let days = days_spanned(entries.iter().map(|e| e.timestamp), now);
        Some(entries.len() as f64 / days as f64)
    };

    ActivitySummary {
        distribution,
        most_common,
        average_per_day,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn entry(value: f64, secs: i64) -> HistoryEntry<f64> {
        HistoryEntry { value, timestamp: ts(secs) }
    }

    #[test]
    fn stats_need_two_points_in_window() {
        let now = ts(1000);
        let single = [entry(36.5, 900)];
        assert!(series_stats(&single, now, Duration::days(7)).is_none());

        // A second point exists but fell out of the window.
        let stale = [entry(36.5, 900), entry(37.0, -700_000_000)];
        assert!(series_stats(&stale, now, Duration::days(7)).is_none());
    }

    #[test]
    fn trend_margin_is_a_tie_break() {
        // Second-half mean exactly 0.3 above: still stable.
        assert_eq!(trend_direction(&[36.0, 36.3]), TrendDirection::Stable);
        assert_eq!(trend_direction(&[36.0, 36.31]), TrendDirection::Increasing);
        assert_eq!(trend_direction(&[36.31, 36.0]), TrendDirection::Decreasing);
        assert_eq!(trend_direction(&[36.0]), TrendDirection::InsufficientData);
    }

    #[test]
    fn mode_tie_breaks_to_first_encountered() {
        assert_eq!(mode(&[3, 1, 1, 3]), Some(3));
        assert_eq!(mode(&[1, 3, 3, 1]), Some(1));
        assert_eq!(mode::<u32>(&[]), None);
    }

    #[test]
    fn quality_duration_bound_is_inclusive() {
        let base = ts(0);
        let session = |d: f64, i: u32| SleepSession {
            start: base,
            duration_hours: d,
            interruptions: i,
        };
        assert_eq!(sleep_quality(&[session(14.0, 1)]), SleepQuality::Excellent);
        assert_ne!(sleep_quality(&[session(13.9, 1)]), SleepQuality::Excellent);
        assert_eq!(sleep_quality(&[session(13.9, 1)]), SleepQuality::Good);
        assert_eq!(sleep_quality(&[session(10.0, 5)]), SleepQuality::Fair);
        assert_eq!(sleep_quality(&[session(8.0, 0)]), SleepQuality::Poor);
        assert_eq!(sleep_quality(&[]), SleepQuality::Unknown);
    }

    #[test]
    fn stats_are_pure() {
        let now = ts(1000);
        let entries = [entry(36.5, 100), entry(38.1, 200), entry(36.0, 300)];
        let a = series_stats(&entries, now, Duration::days(7));
        let b = series_stats(&entries, now, Duration::days(7));
        assert_eq!(a, b);
        assert_eq!(trend_direction(&[1.0, 2.0]), trend_direction(&[1.0, 2.0]));
    }

    #[test]
    fn next_sleep_rolls_to_tomorrow() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 21, 30, 0).unwrap();
        let next = next_expected_sleep(20, now).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 6, 2, 20, 0, 0).unwrap());
        let later_today = next_expected_sleep(22, now).unwrap();
        assert_eq!(later_today, Utc.with_ymd_and_hms(2025, 6, 1, 22, 0, 0).unwrap());
    }

    #[test]
    fn activity_summary_tallies_and_averages() {
        let now = ts(86_400 * 2);
        let entries = [
            ActivityEntry { level: ActivityLevel::Medium, timestamp: ts(0) },
            ActivityEntry { level: ActivityLevel::Medium, timestamp: ts(3600) },
            ActivityEntry { level: ActivityLevel::High, timestamp: ts(7200) },
            ActivityEntry { level: ActivityLevel::Low, timestamp: ts(86_400) },
        ];
        let summary = activity_summary(&entries, now);
        assert_eq!(summary.distribution.medium, 2);
        assert_eq!(summary.most_common, Some(ActivityLevel::Medium));
        assert_eq!(summary.average_per_day, Some(2.0));
    }

    #[test]
    fn empty_activity_log_yields_sentinels() {
        let summary = activity_summary(&[], ts(0));
        assert_eq!(summary.most_common, None);
        assert_eq!(summary.average_per_day, None);
    }
}
