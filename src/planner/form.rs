use chrono::{NaiveDate, Utc};
use serde::{Serialize, Deserialize};
use crate::error::ValidationError;
use super::{Difficulty, Subject};
use super::generator::{
    MAX_HOURS_PER_DAY, MIN_HOURS_PER_DAY, MSG_MAX_HOURS, MSG_MIN_HOURS, MSG_MIN_TOPICS,
    MSG_NAME_REQUIRED, MSG_NO_SUBJECTS,
};

pub const MSG_BAD_DIFFICULTY: &str = "Difficulty must be one of easy, medium, hard";
pub const MSG_BAD_EXAM_DATE: &str = "Invalid exam date";
/// Upper bound on topics per subject; each topic becomes a stored task
pub const MAX_TOPICS: u32 = 1000;
pub const MSG_MAX_TOPICS: &str = "Cannot have more than 1000 topics";

/// A subject row as submitted, before any typing or checks.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SubjectForm {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    /// Missing means 1
    #[serde(default)]
    pub topics: Option<i64>,
    /// Missing means medium
    #[serde(default)]
    pub difficulty: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub exam_date: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanForm {
    #[serde(default)]
    pub subjects: Vec<SubjectForm>,
    #[serde(default)]
    pub hours_per_day: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StudyPlanRequest {
    pub subjects: Vec<Subject>,
    pub hours_per_day: f64,
}

impl SubjectForm {
    /// Untouched form rows carry neither a name nor a date.
    fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.exam_date.trim().is_empty()
    }
}

pub fn parse_exam_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Turn a submitted form into generator input, collecting every field error.
pub fn parse(form: &StudyPlanForm) -> Result<StudyPlanRequest, ValidationError> {
    let mut err = ValidationError::new();
    let mut subjects = Vec::new();
    let id_base = Utc::now().timestamp_millis();

    for (i, row) in form.subjects.iter().filter(|row| !row.is_blank()).enumerate() {
        let name = row.name.trim();
        if name.is_empty() {
            err.push(format!("subjects[{}].name", i), MSG_NAME_REQUIRED);
        }

        let topics = match row.topics.unwrap_or(1) {
            n if n < 1 => {
                err.push(format!("subjects[{}].topics", i), MSG_MIN_TOPICS);
                None
            }
            n => match u32::try_from(n) {
                Ok(n) if n <= MAX_TOPICS => Some(n),
                _ => {
                    err.push(format!("subjects[{}].topics", i), MSG_MAX_TOPICS);
                    None
                }
            },
        };

        let difficulty: Option<Difficulty> = match row.difficulty.as_deref().map(str::trim) {
            None | Some("") => Some(Default::default()),
            Some(raw) => raw.parse().ok(),
        };
        if difficulty.is_none() {
            err.push(format!("subjects[{}].difficulty", i), MSG_BAD_DIFFICULTY);
        }

        let exam_date = parse_exam_date(&row.exam_date);
        if exam_date.is_none() {
            err.push(format!("subjects[{}].examDate", i), MSG_BAD_EXAM_DATE);
        }

        if let (Some(topic_count), Some(difficulty), Some(exam_date)) = (topics, difficulty, exam_date) {
            let id = match row.id.as_deref().map(str::trim) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => (id_base + i as i64).to_string(),
            };
            subjects.push(Subject {
                id,
                name: name.to_string(),
                topic_count,
                difficulty,
                exam_date,
            });
        }
    }

    if subjects.is_empty() && err.is_empty() {
        err.push("subjects", MSG_NO_SUBJECTS);
    }

    match form.hours_per_day {
        Some(h) if h.is_finite() && h > MAX_HOURS_PER_DAY => err.push("hoursPerDay", MSG_MAX_HOURS),
        Some(h) if h.is_finite() && h >= MIN_HOURS_PER_DAY => {}
        _ => err.push("hoursPerDay", MSG_MIN_HOURS),
    }

    err.into_result()?;
    Ok(StudyPlanRequest {
        subjects,
        hours_per_day: form.hours_per_day.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, topics: Option<i64>, difficulty: Option<&str>, exam: &str) -> SubjectForm {
        SubjectForm {
            id: Some(format!("{}-id", name)),
            name: name.to_string(),
            topics,
            difficulty: difficulty.map(String::from),
            exam_date: exam.to_string(),
        }
    }

    #[test]
    fn test_parse_valid_form() {
        let form = StudyPlanForm {
            subjects: vec![
                row("Maths", Some(12), Some("hard"), "2026-11-20"),
                row("History", None, None, "2026-12-01"),
            ],
            hours_per_day: Some(3.5),
        };
        let req = parse(&form).unwrap();
        assert_eq!(req.hours_per_day, 3.5);
        assert_eq!(req.subjects.len(), 2);
        assert_eq!(req.subjects[0].difficulty, Difficulty::Hard);
        assert_eq!(req.subjects[0].id, "Maths-id");
        assert_eq!(req.subjects[1].topic_count, 1);
        assert_eq!(req.subjects[1].difficulty, Difficulty::Medium);
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let form = StudyPlanForm {
            subjects: vec![row("", None, None, ""), row("Art", Some(2), None, "2026-11-01")],
            hours_per_day: Some(2.0),
        };
        let req = parse(&form).unwrap();
        assert_eq!(req.subjects.len(), 1);
        assert_eq!(req.subjects[0].name, "Art");
    }

    #[test]
    fn test_collects_all_field_errors() {
        let form = StudyPlanForm {
            subjects: vec![
                row("", Some(0), Some("brutal"), "2026-11-01"),
                row("Latin", Some(3), None, "next week"),
            ],
            hours_per_day: Some(0.25),
        };
        let err = parse(&form).unwrap_err();
        assert!(err.messages("subjects[0].name").is_some());
        assert!(err.messages("subjects[0].topics").is_some());
        assert_eq!(
            err.messages("subjects[0].difficulty"),
            Some(&[MSG_BAD_DIFFICULTY.to_string()][..])
        );
        assert_eq!(
            err.messages("subjects[1].examDate"),
            Some(&[MSG_BAD_EXAM_DATE.to_string()][..])
        );
        assert_eq!(err.messages("hoursPerDay"), Some(&[MSG_MIN_HOURS.to_string()][..]));
    }

    #[test]
    fn test_topic_count_upper_bound() {
        let form = StudyPlanForm {
            subjects: vec![
                row("Law", Some(MAX_TOPICS as i64), None, "2026-11-01"),
                row("Greek", Some(MAX_TOPICS as i64 + 1), None, "2026-11-01"),
                row("Huge", Some(i64::from(u32::MAX) + 1), None, "2026-11-01"),
            ],
            hours_per_day: Some(2.0),
        };
        let err = parse(&form).unwrap_err();
        assert!(err.messages("subjects[0].topics").is_none());
        assert_eq!(err.messages("subjects[1].topics"), Some(&[MSG_MAX_TOPICS.to_string()][..]));
        assert_eq!(err.messages("subjects[2].topics"), Some(&[MSG_MAX_TOPICS.to_string()][..]));
    }

    #[test]
    fn test_empty_form() {
        let err = parse(&StudyPlanForm::default()).unwrap_err();
        assert!(err.messages("subjects").is_some());
        assert!(err.messages("hoursPerDay").is_some());
    }

    #[test]
    fn test_missing_id_is_generated() {
        let mut subject = row("Music", Some(4), None, "2026-11-01");
        subject.id = None;
        let form = StudyPlanForm { subjects: vec![subject], hours_per_day: Some(1.0) };
        let req = parse(&form).unwrap();
        assert!(!req.subjects[0].id.is_empty());
    }
}
