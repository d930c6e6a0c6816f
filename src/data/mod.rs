pub mod records;

use std::sync::Arc;
use chrono::Utc;
use crate::error::SynaptiqError;
use crate::planner::PlanOutput;
use crate::store::{
    self, KeyValueStore, EXAMS_KEY, SLEEP_LOGS_KEY, STUDY_LOGS_KEY, STUDY_PLAN_KEY, SUBJECTS_KEY,
    TASKS_KEY,
};
use records::{Exam, NewSleepLog, SleepLog, StoredSubject, StudyLog, Task};

/// Typed access to the app's collections on top of a key-value store.
#[derive(Clone)]
pub struct AppData {
    store: Arc<dyn KeyValueStore>,
}

impl AppData {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        AppData { store }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    fn list<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, SynaptiqError> {
        Ok(store::load_json(self.store(), key)?.unwrap_or_default())
    }

    pub fn subjects(&self) -> Result<Vec<StoredSubject>, SynaptiqError> {
        self.list(SUBJECTS_KEY)
    }

    pub fn set_subjects(&self, subjects: &[StoredSubject]) -> Result<(), SynaptiqError> {
        store::save_json(self.store(), SUBJECTS_KEY, subjects)
    }

    /// Returns false when a subject with the same name (any case) already exists.
    pub fn add_subject(&self, subject: StoredSubject) -> Result<bool, SynaptiqError> {
        let mut subjects = self.subjects()?;
        let exists = subjects
            .iter()
            .any(|s| s.name.to_lowercase() == subject.name.to_lowercase());
        if exists {
            return Ok(false);
        }
        subjects.push(subject);
        self.set_subjects(&subjects)?;
        Ok(true)
    }

    pub fn tasks(&self) -> Result<Vec<Task>, SynaptiqError> {
        self.list(TASKS_KEY)
    }

    pub fn set_tasks(&self, tasks: &[Task]) -> Result<(), SynaptiqError> {
        store::save_json(self.store(), TASKS_KEY, tasks)
    }

    /// Add a custom task under an existing subject.
    pub fn add_task(&self, subject_id: &str, title: &str) -> Result<Task, SynaptiqError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SynaptiqError::new("task title is required", "input"));
        }
        if !self.subjects()?.iter().any(|s| s.id == subject_id) {
            return Err(SynaptiqError::new(format!("no subject with id '{}'", subject_id), "input"));
        }

        let mut tasks = self.tasks()?;
        let mut id = Utc::now().timestamp_millis();
        while tasks.iter().any(|t| t.id == id.to_string()) {
            id += 1;
        }
        let task = Task {
            id: id.to_string(),
            subject_id: subject_id.to_string(),
            title: title.to_string(),
            completed: false,
        };
        tasks.push(task.clone());
        self.set_tasks(&tasks)?;
        Ok(task)
    }

    /// Flip a task's completion. `None` if no task has that id.
    pub fn toggle_task(&self, task_id: &str) -> Result<Option<bool>, SynaptiqError> {
        let mut tasks = self.tasks()?;
        let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) else {
            return Ok(None);
        };
        task.completed = !task.completed;
        let completed = task.completed;
        self.set_tasks(&tasks)?;
        Ok(Some(completed))
    }

    pub fn study_logs(&self) -> Result<Vec<StudyLog>, SynaptiqError> {
        self.list(STUDY_LOGS_KEY)
    }

    pub fn add_study_log(&self, log: StudyLog) -> Result<(), SynaptiqError> {
        let mut logs = self.study_logs()?;
        logs.push(log);
        store::save_json(self.store(), STUDY_LOGS_KEY, &logs)
    }

    /// Sleep logs, newest first.
    pub fn sleep_logs(&self) -> Result<Vec<SleepLog>, SynaptiqError> {
        self.list(SLEEP_LOGS_KEY)
    }

    /// Add a log, replacing any existing log for the same night.
    pub fn add_sleep_log(&self, log: NewSleepLog) -> Result<SleepLog, SynaptiqError> {
        let mut logs = self.sleep_logs()?;

        let mut id = Utc::now().timestamp_millis();
        while logs.iter().any(|l| l.id == id.to_string()) {
            id += 1;
        }
        let entry = SleepLog {
            id: id.to_string(),
            date: log.date,
            bedtime: log.bedtime,
            wake_time: log.wake_time,
            quality: log.quality,
        };

        match logs.iter_mut().find(|l| l.date == entry.date) {
            Some(existing) => *existing = entry.clone(),
            None => logs.push(entry.clone()),
        }
        logs.sort_by(|a, b| b.date.cmp(&a.date));

        store::save_json(self.store(), SLEEP_LOGS_KEY, &logs)?;
        Ok(entry)
    }

    pub fn remove_sleep_log(&self, log_id: &str) -> Result<bool, SynaptiqError> {
        let mut logs = self.sleep_logs()?;
        let before = logs.len();
        logs.retain(|l| l.id != log_id);
        if logs.len() == before {
            return Ok(false);
        }
        store::save_json(self.store(), SLEEP_LOGS_KEY, &logs)?;
        Ok(true)
    }

    pub fn exams(&self) -> Result<Vec<Exam>, SynaptiqError> {
        self.list(EXAMS_KEY)
    }

    pub fn set_exams(&self, exams: &[Exam]) -> Result<(), SynaptiqError> {
        store::save_json(self.store(), EXAMS_KEY, exams)
    }

    pub fn saved_plan(&self) -> Result<Option<PlanOutput>, SynaptiqError> {
        store::load_json(self.store(), STUDY_PLAN_KEY)
    }

    pub fn save_plan(&self, plan: &PlanOutput) -> Result<(), SynaptiqError> {
        store::save_json(self.store(), STUDY_PLAN_KEY, plan)
    }

    pub fn clear_plan(&self) -> Result<(), SynaptiqError> {
        self.store.remove(STUDY_PLAN_KEY)
    }
}
