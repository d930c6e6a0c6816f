use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use serde::{Serialize, Deserialize};
use crate::data::records::{StoredSubject, StudyLog, Task};
use crate::sleep::ChartPoint;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub hours_studied: f64,
    pub tasks_completed: usize,
    pub courses_in_progress: usize,
    /// Percent of all tasks completed
    pub avg_score: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SubjectProgress {
    pub subject: String,
    pub progress: u32,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn percent(done: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (done as f64 / total as f64 * 100.0).round() as u32
}

pub fn compute_dashboard(
    subjects: &[StoredSubject],
    tasks: &[Task],
    study_logs: &[StudyLog],
    now: DateTime<Utc>,
) -> DashboardStats {
    let cutoff = now - Duration::days(7);
    let hours: f64 = study_logs
        .iter()
        .filter(|log| log.date > cutoff)
        .map(|log| log.duration)
        .sum();
    let completed = tasks.iter().filter(|t| t.completed).count();

    DashboardStats {
        hours_studied: round1(hours),
        tasks_completed: completed,
        courses_in_progress: subjects.len(),
        avg_score: percent(completed, tasks.len()),
    }
}

/// Completion percentage per subject, in subject order.
pub fn subject_progress(subjects: &[StoredSubject], tasks: &[Task]) -> Vec<SubjectProgress> {
    subjects
        .iter()
        .map(|subject| {
            let (total, done) = tasks
                .iter()
                .filter(|t| t.subject_id == subject.id)
                .fold((0, 0), |(total, done), t| (total + 1, done + usize::from(t.completed)));
            SubjectProgress {
                subject: subject.name.clone(),
                progress: percent(done, total),
            }
        })
        .collect()
}

/// Hours studied on each of the last seven local days, oldest first.
pub fn weekly_activity(study_logs: &[StudyLog], today: NaiveDate) -> Vec<ChartPoint> {
    (0..7)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            let hours: f64 = study_logs
                .iter()
                .filter(|log| log.date.with_timezone(&Local).date_naive() == date)
                .map(|log| log.duration)
                .sum();
            ChartPoint {
                day: date.format("%a").to_string(),
                hours: round1(hours),
            }
        })
        .collect()
}
