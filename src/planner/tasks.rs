use crate::data::records::{StoredSubject, Task};
use super::{CompletionTracker, Subject};

/// Stable id for the n-th topic task of a subject.
pub fn task_id(subject_id: &str, index: u32) -> String {
    format!("{}-task-{}", subject_id, index)
}

/// One unchecked to-do per topic, per tracked subject.
pub fn tasks_from_tracker(tracker: &[CompletionTracker]) -> Vec<Task> {
    tracker
        .iter()
        .flat_map(|entry| {
            (0..entry.total_topics).map(move |i| Task {
                id: task_id(&entry.subject_id, i),
                subject_id: entry.subject_id.clone(),
                title: format!("{} - Topic {}", entry.subject, i + 1),
                completed: false,
            })
        })
        .collect()
}

/// Subjects for the app-data store, taking difficulty from what was submitted.
pub fn subjects_from_tracker(tracker: &[CompletionTracker], submitted: &[Subject]) -> Vec<StoredSubject> {
    tracker
        .iter()
        .map(|entry| StoredSubject {
            id: entry.subject_id.clone(),
            name: entry.subject.clone(),
            topic_count: entry.total_topics,
            difficulty: submitted
                .iter()
                .find(|s| s.id == entry.subject_id)
                .map(|s| s.difficulty)
                .unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::Difficulty;
    use chrono::NaiveDate;

    fn tracker() -> Vec<CompletionTracker> {
        vec![
            CompletionTracker { subject: "Maths".into(), total_topics: 3, subject_id: "m".into() },
            CompletionTracker { subject: "Art".into(), total_topics: 1, subject_id: "a".into() },
        ]
    }

    #[test]
    fn test_one_task_per_topic() {
        let tasks = tasks_from_tracker(&tracker());
        assert_eq!(tasks.len(), 4);
        assert_eq!(tasks[0].id, "m-task-0");
        assert_eq!(tasks[2].title, "Maths - Topic 3");
        assert_eq!(tasks[3].id, "a-task-0");
        assert!(tasks.iter().all(|t| !t.completed));
    }

    #[test]
    fn test_subject_difficulty_carried_over() {
        let submitted = vec![Subject {
            id: "m".into(),
            name: "Maths".into(),
            topic_count: 3,
            difficulty: Difficulty::Hard,
            exam_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
        }];
        let subjects = subjects_from_tracker(&tracker(), &submitted);
        assert_eq!(subjects[0].difficulty, Difficulty::Hard);
        assert_eq!(subjects[1].difficulty, Difficulty::Medium);
        assert_eq!(subjects[1].topic_count, 1);
    }
}
