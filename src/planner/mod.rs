pub mod form;
pub mod generator;
pub mod tasks;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use chrono::NaiveDate;
use serde::{Serialize, Deserialize};

pub use generator::{generate, generate_with};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Multiplier applied to a subject's topic count when scoring priority.
    pub fn weight(self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.5,
            Difficulty::Hard => 2.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// A course the student is preparing an exam for.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub topic_count: u32,
    pub difficulty: Difficulty,
    pub exam_date: NaiveDate,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPriority {
    pub name: String,
    pub priority_score: f64,
    pub days_until_exam: u32,
    pub study_hours: u32,
    pub revision_hours: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub start: String,
    pub end: String,
    /// "Study {name}", "Revise {name}" or "Break"
    pub activity: String,
}

impl Session {
    pub fn is_break(&self) -> bool {
        self.activity == BREAK_ACTIVITY
    }
}

pub const BREAK_ACTIVITY: &str = "Break";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DailySchedule {
    pub day: String,
    pub sessions: Vec<Session>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPlan {
    pub subject: String,
    pub total_hours: u32,
    /// Weekday name → hours. Weekdays without sessions are absent.
    pub daily_breakdown: BTreeMap<String, f64>,
}

impl WeeklyPlan {
    pub fn scheduled_hours(&self) -> f64 {
        self.daily_breakdown.values().sum()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionTracker {
    pub subject: String,
    pub total_topics: u32,
    pub subject_id: String,
}

/// Everything one generation run produces. Stored verbatim as the saved plan.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutput {
    pub subject_priorities: Vec<SubjectPriority>,
    pub daily_schedule: Vec<DailySchedule>,
    pub weekly_plan: Vec<WeeklyPlan>,
    pub completion_tracker: Vec<CompletionTracker>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parse() {
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(" easy ".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_plan_output_uses_camel_case() {
        let plan = PlanOutput {
            subject_priorities: vec![SubjectPriority {
                name: "Physics".into(),
                priority_score: 1.0,
                days_until_exam: 3,
                study_hours: 0,
                revision_hours: 2,
            }],
            daily_schedule: vec![],
            weekly_plan: vec![],
            completion_tracker: vec![CompletionTracker {
                subject: "Physics".into(),
                total_topics: 4,
                subject_id: "p1".into(),
            }],
        };
        let json = serde_json::to_string(&plan).unwrap();
        assert!(json.contains("\"subjectPriorities\""));
        assert!(json.contains("\"daysUntilExam\":3"));
        assert!(json.contains("\"revisionHours\":2"));
        assert!(json.contains("\"subjectId\":\"p1\""));
    }
}
