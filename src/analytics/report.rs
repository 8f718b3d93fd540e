//! Health report - composed trend analysis with recommendations

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::trend::{
    self, ActivitySummary, SeriesStats, SleepInsight, SleepQuality, TrendDirection,
};
use crate::config::AnalysisWindows;
use crate::history::HistoryEntry;
use crate::reading::{ActivityEntry, SleepSession};

/// Windowed temperature average above this reads as elevated.
pub const ELEVATED_TEMP_AVERAGE: f64 = 37.2;
/// Windowed temperature average above this earns a recommendation.
pub const TEMP_RECOMMENDATION_LIMIT: f64 = 37.0;
/// Average sleep duration below this earns a recommendation.
pub const SLEEP_RECOMMENDATION_LIMIT: f64 = 12.0;

// ============================================================================
// REPORT TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureStatus {
    Normal,
    Elevated,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureTrend {
    /// Windowed average, rounded to 0.1 degrees for display parity.
    pub average: Option<f64>,
    pub trend: TrendDirection,
    pub status: TemperatureStatus,
    pub data_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepTrend {
    pub average_duration: Option<f64>,
    pub total_sleep: f64,
    pub quality: SleepQuality,
    pub naps_per_day: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTrend {
    pub summary: ActivitySummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallHealth {
    Healthy,
    Monitor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub timestamp: DateTime<Utc>,
    pub temperature: TemperatureTrend,
    pub sleep: SleepTrend,
    pub activity: ActivityTrend,
    pub overall: OverallHealth,
    pub recommendations: Vec<String>,
}

/// Sleep prediction surface composed from the trend functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepInsights {
    pub predicted_sleep_hour: Option<u32>,
    pub average_duration: Option<f64>,
    pub next_expected_sleep: Option<DateTime<Utc>>,
    pub quality: SleepQuality,
    pub insights: Vec<SleepInsight>,
}

// ============================================================================
// HEALTH REPORT BUILDER
// ============================================================================

pub struct HealthReportBuilder {
    windows: AnalysisWindows,
}

impl HealthReportBuilder {
    pub fn new(windows: AnalysisWindows) -> Self {
        Self { windows }
    }

    /// Run the three trend analyses independently and compose them.
    /// Empty histories produce sentinel values, never an error, and a
    /// recommendation is only appended when its condition holds.
    pub fn build(
        &self,
        temperature: &[HistoryEntry<f64>],
        sleep: &[SleepSession],
        activity: &[ActivityEntry],
        now: DateTime<Utc>,
    ) -> HealthReport {
        let temperature = self.temperature_trend(temperature, now);
        let sleep = sleep_trend(sleep, now);
        let activity = ActivityTrend {
            summary: trend::activity_summary(activity, now),
        };

        // Fixed check order: temperature first, then sleep.
        let mut recommendations = Vec::new();
        if let Some(avg) = temperature.average {
            if avg > TEMP_RECOMMENDATION_LIMIT {
                recommendations.push(
                    "Monitor temperature closely. Ensure baby is not overheating.".to_string(),
                );
            }
        }
        if let Some(avg) = sleep.average_duration {
            if avg < SLEEP_RECOMMENDATION_LIMIT {
                recommendations.push(
                    "Improve sleep hygiene: consistent schedule, comfortable environment."
                        .to_string(),
                );
            }
        }

        let overall = if temperature.status == TemperatureStatus::Elevated
            || sleep.quality == SleepQuality::Poor
        {
            OverallHealth::Monitor
        } else {
            OverallHealth::Healthy
        };

        HealthReport {
            timestamp: now,
            temperature,
            sleep,
            activity,
            overall,
            recommendations,
        }
    }

    fn temperature_trend(
        &self,
        entries: &[HistoryEntry<f64>],
        now: DateTime<Utc>,
    ) -> TemperatureTrend {
        let window = Duration::days(self.windows.trend_window_days);
        let values = trend::windowed_values(entries, now, window);

        match trend::series_stats(entries, now, window) {
            Some(SeriesStats { average, .. }) => {
                let rounded = (average * 10.0).round() / 10.0;
                TemperatureTrend {
                    average: Some(rounded),
                    trend: trend::trend_direction(&values),
                    status: if average > ELEVATED_TEMP_AVERAGE {
                        TemperatureStatus::Elevated
                    } else {
                        TemperatureStatus::Normal
                    },
                    data_points: values.len(),
                }
            }
            None => TemperatureTrend {
                average: None,
                trend: TrendDirection::InsufficientData,
                status: TemperatureStatus::Unknown,
                data_points: values.len(),
            },
        }
    }
}

fn sleep_trend(sessions: &[SleepSession], now: DateTime<Utc>) -> SleepTrend {
    let average_duration = trend::average_sleep_duration(sessions);
    let total_sleep: f64 = sessions.iter().map(|s| s.duration_hours).sum();
    let naps_per_day = if sessions.is_empty() {
        None
    } else {
        let days = trend::days_spanned(sessions.iter().map(|s| s.start), now);
        Some(sessions.len() as f64 / days as f64)
    };

    SleepTrend {
        average_duration,
        total_sleep,
        quality: trend::sleep_quality(sessions),
        naps_per_day,
    }
}

/// Compose the sleep prediction surface from the trend functions.
pub fn sleep_insights(sessions: &[SleepSession], now: DateTime<Utc>) -> SleepInsights {
    let predicted_sleep_hour = trend::predicted_sleep_hour(sessions);
    SleepInsights {
        predicted_sleep_hour,
        average_duration: trend::average_sleep_duration(sessions),
        next_expected_sleep: predicted_sleep_hour
            .and_then(|hour| trend::next_expected_sleep(hour, now)),
        quality: trend::sleep_quality(sessions),
        insights: trend::sleep_insights(sessions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use chrono::TimeZone;

    fn builder() -> HealthReportBuilder {
        HealthReportBuilder::new(MonitorConfig::default().windows)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
    }

    fn temp_entry(value: f64, hours_ago: i64) -> HistoryEntry<f64> {
        HistoryEntry {
            value,
            timestamp: now() - Duration::hours(hours_ago),
        }
    }

    #[test]
    fn empty_histories_yield_unknown_report_without_error() {
        let report = builder().build(&[], &[], &[], now());
        assert_eq!(report.temperature.status, TemperatureStatus::Unknown);
        assert_eq!(report.temperature.average, None);
        assert_eq!(report.temperature.trend, TrendDirection::InsufficientData);
        assert_eq!(report.sleep.quality, SleepQuality::Unknown);
        assert_eq!(report.sleep.average_duration, None);
        assert_eq!(report.activity.summary.most_common, None);
        assert_eq!(report.overall, OverallHealth::Healthy);
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn elevated_average_sets_monitor_and_recommendation() {
        let temps = [temp_entry(37.4, 1), temp_entry(37.3, 2), temp_entry(37.5, 3)];
        let report = builder().build(&temps, &[], &[], now());
        assert_eq!(report.temperature.status, TemperatureStatus::Elevated);
        assert_eq!(report.overall, OverallHealth::Monitor);
        assert_eq!(report.recommendations.len(), 1);
        assert!(report.recommendations[0].contains("temperature"));
    }

    #[test]
    fn short_sleep_recommendation_comes_after_temperature() {
        let temps = [temp_entry(37.4, 1), temp_entry(37.5, 2)];
        let sleep = [SleepSession {
            start: now() - Duration::hours(20),
            duration_hours: 9.0,
            interruptions: 1,
        }];
        let report = builder().build(&temps, &sleep, &[], now());
        assert_eq!(report.recommendations.len(), 2);
        assert!(report.recommendations[0].contains("temperature"));
        assert!(report.recommendations[1].contains("sleep"));
    }

    #[test]
    fn poor_sleep_alone_sets_monitor() {
        let sleep = [SleepSession {
            start: now() - Duration::hours(20),
            duration_hours: 8.0,
            interruptions: 4,
        }];
        let report = builder().build(&[], &sleep, &[], now());
        assert_eq!(report.sleep.quality, SleepQuality::Poor);
        assert_eq!(report.overall, OverallHealth::Monitor);
    }

    #[test]
    fn normal_average_is_not_flagged() {
        let temps = [temp_entry(36.5, 1), temp_entry(36.7, 2), temp_entry(36.6, 3)];
        let report = builder().build(&temps, &[], &[], now());
        assert_eq!(report.temperature.status, TemperatureStatus::Normal);
        assert_eq!(report.temperature.average, Some(36.6));
        assert!(report.recommendations.is_empty());
        assert_eq!(report.overall, OverallHealth::Healthy);
    }

    #[test]
    fn insights_compose_prediction_and_quality() {
        let sleep: Vec<SleepSession> = (0..4)
            .map(|i| SleepSession {
                start: Utc.with_ymd_and_hms(2025, 5, 28 + i, 20, 0, 0).unwrap(),
                duration_hours: 11.0,
                interruptions: 1,
            })
            .collect();
        let insights = sleep_insights(&sleep, now());
        assert_eq!(insights.predicted_sleep_hour, Some(20));
        assert_eq!(insights.average_duration, Some(11.0));
        assert_eq!(
            insights.next_expected_sleep,
            Some(Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap())
        );
        assert_eq!(insights.quality, SleepQuality::Fair);
        // 11h < 12h recommended: the duration insight fires.
        assert_eq!(insights.insights.len(), 1);
    }

    #[test]
    fn empty_sleep_log_yields_unknown_insights() {
        let insights = sleep_insights(&[], now());
        assert_eq!(insights.predicted_sleep_hour, None);
        assert_eq!(insights.quality, SleepQuality::Unknown);
        assert!(insights.insights.is_empty());
    }
}
