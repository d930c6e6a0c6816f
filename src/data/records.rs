use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Serialize, Deserialize};
use crate::planner::Difficulty;

/// Subject as kept for the dashboard and to-do list; no exam date.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredSubject {
    pub id: String,
    pub name: String,
    pub topic_count: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub subject_id: String,
    pub title: String,
    pub completed: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StudyLog {
    pub date: DateTime<Utc>,
    /// Hours
    pub duration: f64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SleepQuality {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl SleepQuality {
    pub fn score(self) -> f64 {
        match self {
            SleepQuality::Poor => 1.0,
            SleepQuality::Fair => 2.0,
            SleepQuality::Good => 3.0,
            SleepQuality::Excellent => 4.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SleepQuality::Poor => "poor",
            SleepQuality::Fair => "fair",
            SleepQuality::Good => "good",
            SleepQuality::Excellent => "excellent",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SleepLog {
    pub id: String,
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub bedtime: NaiveTime,
    #[serde(with = "hh_mm")]
    pub wake_time: NaiveTime,
    pub quality: SleepQuality,
}

/// A sleep log before it has been assigned an id.
#[derive(Clone, Debug, PartialEq)]
pub struct NewSleepLog {
    pub date: NaiveDate,
    pub bedtime: NaiveTime,
    pub wake_time: NaiveTime,
    pub quality: SleepQuality,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Exam {
    pub id: u64,
    pub subject: String,
    pub date: NaiveDate,
}

/// `HH:MM` wall-clock times, as the sleep log form records them.
pub mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(raw.trim(), FORMAT).ok()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid HH:MM time '{}'", raw)))
    }
}
