use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Serialize, Deserialize};
use crate::data::records::SleepLog;

/// How many of the most recent nights the report looks at
pub const RECENT_NIGHTS: usize = 7;
/// Fewer logs than this and there is nothing meaningful to say
pub const MIN_LOGS_FOR_ANALYSIS: usize = 2;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SleepReport {
    /// 0-100, higher means steadier bedtimes
    pub consistency_score: u32,
    pub avg_quality: String,
    pub avg_duration: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChartPoint {
    pub day: String,
    pub hours: f64,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Hours slept. A wake time at or before bedtime is on the following day.
pub fn duration_hours(log: &SleepLog) -> f64 {
    let bed = NaiveDateTime::new(log.date, log.bedtime);
    let mut wake = NaiveDateTime::new(log.date, log.wake_time);
    if wake <= bed {
        wake += Duration::days(1);
    }
    (wake - bed).num_minutes() as f64 / 60.0
}

pub fn quality_label(avg_score: f64) -> &'static str {
    if avg_score > 3.5 {
        "Excellent"
    } else if avg_score > 2.5 {
        "Good"
    } else if avg_score > 1.5 {
        "Fair"
    } else {
        "Poor"
    }
}

/// The newest `RECENT_NIGHTS` logs. Expects newest-first input, as stored.
pub fn recent(logs: &[SleepLog]) -> &[SleepLog] {
    &logs[..logs.len().min(RECENT_NIGHTS)]
}

pub fn analyze(logs: &[SleepLog]) -> SleepReport {
    let recent = recent(logs);
    if recent.len() < MIN_LOGS_FOR_ANALYSIS {
        return SleepReport {
            consistency_score: 0,
            avg_quality: "N/A".to_string(),
            avg_duration: 0.0,
        };
    }
    let n = recent.len() as f64;

    // Standard deviation of bedtime, in minutes after midnight
    let bedtimes: Vec<f64> = recent
        .iter()
        .map(|l| (l.bedtime.hour() * 60 + l.bedtime.minute()) as f64)
        .collect();
    let mean = bedtimes.iter().sum::<f64>() / n;
    let variance = bedtimes.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n;
    let consistency = (100.0 - variance.sqrt()).max(0.0);

    let avg_quality = recent.iter().map(|l| l.quality.score()).sum::<f64>() / n;
    let avg_duration = recent.iter().map(duration_hours).sum::<f64>() / n;

    SleepReport {
        consistency_score: consistency.round() as u32,
        avg_quality: quality_label(avg_quality).to_string(),
        avg_duration: round1(avg_duration),
    }
}

/// Hours slept for each of the last seven days, oldest first. Missing nights are 0.
pub fn weekly_chart(logs: &[SleepLog], today: NaiveDate) -> Vec<ChartPoint> {
    (0..7)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            let hours = logs
                .iter()
                .find(|l| l.date == date)
                .map(duration_hours)
                .unwrap_or(0.0);
            ChartPoint {
                day: date.format("%a").to_string(),
                hours: round1(hours),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::records::SleepQuality;
    use chrono::NaiveTime;

    fn log(day: u32, bed: (u32, u32), wake: (u32, u32), quality: SleepQuality) -> SleepLog {
        SleepLog {
            id: day.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
            bedtime: NaiveTime::from_hms_opt(bed.0, bed.1, 0).unwrap(),
            wake_time: NaiveTime::from_hms_opt(wake.0, wake.1, 0).unwrap(),
            quality,
        }
    }

    #[test]
    fn test_duration_crosses_midnight() {
        assert_eq!(duration_hours(&log(1, (23, 0), (7, 30), SleepQuality::Good)), 8.5);
        assert_eq!(duration_hours(&log(1, (1, 0), (9, 0), SleepQuality::Good)), 8.0);
    }

    #[test]
    fn test_too_few_logs() {
        let report = analyze(&[log(1, (23, 0), (7, 0), SleepQuality::Good)]);
        assert_eq!(report.consistency_score, 0);
        assert_eq!(report.avg_quality, "N/A");
    }

    #[test]
    fn test_identical_bedtimes_score_100() {
        let logs = vec![
            log(3, (22, 30), (6, 30), SleepQuality::Excellent),
            log(2, (22, 30), (6, 30), SleepQuality::Good),
        ];
        let report = analyze(&logs);
        assert_eq!(report.consistency_score, 100);
        assert_eq!(report.avg_quality, "Good");
        assert_eq!(report.avg_duration, 8.0);
    }

    #[test]
    fn test_spread_bedtimes_lower_score() {
        // Bedtimes 60 minutes either side of the mean
        let logs = vec![
            log(3, (21, 0), (6, 0), SleepQuality::Fair),
            log(2, (23, 0), (6, 0), SleepQuality::Good),
        ];
        let report = analyze(&logs);
        assert_eq!(report.consistency_score, 40);
        assert_eq!(report.avg_quality, "Fair");
    }

    #[test]
    fn test_only_recent_week_counts() {
        let mut logs: Vec<SleepLog> = (1..=9)
            .rev()
            .map(|d| log(d, (23, 0), (7, 0), SleepQuality::Excellent))
            .collect();
        logs[7].quality = SleepQuality::Poor;
        logs[8].quality = SleepQuality::Poor;
        assert_eq!(analyze(&logs).avg_quality, "Excellent");
    }

    #[test]
    fn test_weekly_chart() {
        let logs = vec![log(15, (23, 0), (6, 30), SleepQuality::Good)];
        let chart = weekly_chart(&logs, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        assert_eq!(chart.len(), 7);
        assert_eq!(chart[6].day, "Fri");
        assert_eq!(chart[5].hours, 7.5);
        assert_eq!(chart[0].hours, 0.0);
    }
}
