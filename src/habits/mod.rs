use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Serialize, Deserialize};
use crate::data::AppData;
use crate::data::records::StudyLog;
use crate::error::SynaptiqError;
use crate::store::{self, HABITS_KEY};

/// The habit that records hours instead of a plain check-off.
pub const STUDY_HABIT_ID: &str = "study";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HabitDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub goal: &'static str,
}

pub const CATALOG: &[HabitDefinition] = &[
    HabitDefinition { id: STUDY_HABIT_ID, name: "Study", goal: "Log your hours" },
    HabitDefinition { id: "water", name: "Drink Water", goal: "8 glasses" },
    HabitDefinition { id: "exercise", name: "Exercise", goal: "30 minutes" },
    HabitDefinition { id: "sleep", name: "Good Sleep", goal: "8 hours" },
    HabitDefinition { id: "meditate", name: "Meditate", goal: "10 minutes" },
    HabitDefinition { id: "no-screen", name: "No Screen Time", goal: "1 hr before bed" },
];

pub fn definition(id: &str) -> Option<&'static HabitDefinition> {
    CATALOG.iter().find(|h| h.id == id)
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackedHabit {
    pub id: String,
    pub name: String,
    pub goal: String,
    pub streak: u32,
    pub last_completed: Option<NaiveDate>,
    #[serde(default)]
    pub completed_today: bool,
}

impl TrackedHabit {
    fn from_definition(def: &HabitDefinition) -> Self {
        TrackedHabit {
            id: def.id.to_string(),
            name: def.name.to_string(),
            goal: def.goal.to_string(),
            streak: 0,
            last_completed: None,
            completed_today: false,
        }
    }

    /// Bring a stored habit up to date with `today`.
    fn normalize(&mut self, today: NaiveDate) {
        if let Some(def) = definition(&self.id) {
            self.name = def.name.to_string();
            self.goal = def.goal.to_string();
        }
        self.completed_today = self.last_completed == Some(today);
        if let Some(last) = self.last_completed {
            if last < today - Duration::days(1) {
                self.streak = 0;
            }
        }
    }

    /// Returns false when it was already completed today.
    fn complete(&mut self, today: NaiveDate) -> bool {
        if self.completed_today || self.last_completed == Some(today) {
            return false;
        }
        self.streak = match self.last_completed {
            Some(last) if last == today - Duration::days(1) => self.streak + 1,
            _ => 1,
        };
        self.last_completed = Some(today);
        self.completed_today = true;
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HabitError {
    #[error("unknown habit '{0}'")]
    UnknownHabit(String),
    #[error("habit '{0}' is not being tracked")]
    NotTracked(String),
    /// The study habit is completed by logging hours
    #[error("log study hours to complete the study habit")]
    NeedsHours,
    #[error("study hours must be greater than zero")]
    InvalidHours,
}

impl From<HabitError> for SynaptiqError {
    fn from(err: HabitError) -> Self {
        SynaptiqError::new(err.to_string(), "habits")
    }
}

/// Tracked habits with daily streaks, persisted under `trackedHabits`.
pub struct HabitTracker {
    data: AppData,
    habits: Vec<TrackedHabit>,
}

impl HabitTracker {
    pub fn load(data: AppData, today: NaiveDate) -> Result<Self, SynaptiqError> {
        let mut habits: Vec<TrackedHabit> =
            store::load_json(data.store(), HABITS_KEY)?.unwrap_or_default();
        for habit in &mut habits {
            habit.normalize(today);
        }
        Ok(HabitTracker { data, habits })
    }

    pub fn habits(&self) -> &[TrackedHabit] {
        &self.habits
    }

    pub fn get(&self, id: &str) -> Option<&TrackedHabit> {
        self.habits.iter().find(|h| h.id == id)
    }

    /// Catalog habits not yet tracked
    pub fn available(&self) -> Vec<&'static HabitDefinition> {
        CATALOG
            .iter()
            .filter(|def| !self.habits.iter().any(|h| h.id == def.id))
            .collect()
    }

    fn save(&self) -> Result<(), SynaptiqError> {
        store::save_json(self.data.store(), HABITS_KEY, &self.habits)
    }

    pub fn add(&mut self, id: &str) -> Result<bool, SynaptiqError> {
        let def = definition(id).ok_or_else(|| HabitError::UnknownHabit(id.to_string()))?;
        if self.get(id).is_some() {
            return Ok(false);
        }
        self.habits.push(TrackedHabit::from_definition(def));
        self.save()?;
        Ok(true)
    }

    pub fn remove(&mut self, id: &str) -> Result<bool, SynaptiqError> {
        let before = self.habits.len();
        self.habits.retain(|h| h.id != id);
        if self.habits.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Check off a habit for `today`. Returns the streak afterwards.
    pub fn complete(&mut self, id: &str, today: NaiveDate) -> Result<u32, SynaptiqError> {
        if id == STUDY_HABIT_ID {
            return Err(HabitError::NeedsHours.into());
        }
        self.complete_tracked(id, today)
    }

    /// Record study hours and check off the study habit.
    pub fn log_study(&mut self, hours: f64, now: DateTime<Utc>, today: NaiveDate) -> Result<u32, SynaptiqError> {
        if !hours.is_finite() || hours <= 0.0 {
            return Err(HabitError::InvalidHours.into());
        }
        if self.get(STUDY_HABIT_ID).is_none() {
            return Err(HabitError::NotTracked(STUDY_HABIT_ID.to_string()).into());
        }
        self.data.add_study_log(StudyLog { date: now, duration: hours })?;
        self.complete_tracked(STUDY_HABIT_ID, today)
    }

    fn complete_tracked(&mut self, id: &str, today: NaiveDate) -> Result<u32, SynaptiqError> {
        let habit = self
            .habits
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| HabitError::NotTracked(id.to_string()))?;

        let changed = habit.complete(today);
        let streak = habit.streak;
        if changed {
            tracing::info!(habit = id, streak = streak, "Habit completed");
            self.save()?;
        }
        Ok(streak)
    }
}
