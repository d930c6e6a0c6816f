use std::sync::Arc;
use chrono::{NaiveDate, NaiveTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use synaptiq_lib::actions::{self, MSG_PLAN_GENERATED};
use synaptiq_lib::data::records::{NewSleepLog, SleepQuality};
use synaptiq_lib::habits::{HabitTracker, STUDY_HABIT_ID};
use synaptiq_lib::planner::form::StudyPlanForm;
use synaptiq_lib::state::AppState;
use synaptiq_lib::store::{FileStore, KeyValueStore, STUDY_PLAN_KEY};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn state_in(dir: &std::path::Path) -> AppState {
    AppState::new(Arc::new(FileStore::new(dir)))
}

fn form() -> StudyPlanForm {
    serde_json::from_str(
        r#"{
            "subjects": [
                {"id": "c", "name": "Chemistry", "topics": 4, "difficulty": "medium", "examDate": "2026-11-01"},
                {"id": "e", "name": "English", "topics": 2, "difficulty": "easy", "examDate": "2026-10-22"}
            ],
            "hoursPerDay": 3
        }"#,
    )
    .unwrap()
}

#[test]
fn test_plan_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(dir.path());
    let response = actions::generate_study_plan(&state, &form(), today(), &mut StdRng::seed_from_u64(5)).unwrap();
    assert_eq!(response.message, MSG_PLAN_GENERATED);
    assert!(dir.path().join(format!("{}.json", STUDY_PLAN_KEY)).exists());

    let reopened = state_in(dir.path());
    let saved = reopened.data.saved_plan().unwrap().unwrap();
    let generated = response.data.unwrap();
    assert_eq!(saved.daily_schedule, generated.daily_schedule);
    assert_eq!(saved.completion_tracker, generated.completion_tracker);

    let tasks = reopened.data.tasks().unwrap();
    assert_eq!(tasks.len(), 6);
    assert_eq!(tasks[0].id, "c-task-0");
    assert_eq!(tasks[5].id, "e-task-1");

    assert_eq!(reopened.data.toggle_task("c-task-1").unwrap(), Some(true));
    let board = actions::dashboard(&reopened, Utc::now(), today()).unwrap();
    assert_eq!(board.stats.tasks_completed, 1);
    assert_eq!(board.stats.courses_in_progress, 2);
    assert_eq!(board.stats.avg_score, 17);
    assert_eq!(board.subject_progress[0].progress, 25);
}

#[test]
fn test_corrupt_value_reads_as_missing() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    store.set(STUDY_PLAN_KEY, "{ not json").unwrap();

    let state = state_in(dir.path());
    assert!(state.data.saved_plan().unwrap().is_none());
}

#[test]
fn test_habits_and_sleep_persist() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(dir.path());

    let mut tracker = HabitTracker::load(state.data.clone(), today()).unwrap();
    tracker.add(STUDY_HABIT_ID).unwrap();
    tracker.log_study(2.0, Utc::now(), today()).unwrap();

    for (day, quality) in [(14, SleepQuality::Good), (15, SleepQuality::Excellent)] {
        state
            .data
            .add_sleep_log(NewSleepLog {
                date: NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
                bedtime: NaiveTime::from_hms_opt(22, 30, 0).unwrap(),
                wake_time: NaiveTime::from_hms_opt(6, 30, 0).unwrap(),
                quality,
            })
            .unwrap();
    }

    let reopened = state_in(dir.path());
    let tracker = HabitTracker::load(reopened.data.clone(), today()).unwrap();
    let study = tracker.get(STUDY_HABIT_ID).unwrap();
    assert_eq!(study.streak, 1);
    assert!(study.completed_today);
    assert_eq!(reopened.data.study_logs().unwrap().len(), 1);

    let overview = actions::sleep_overview(&reopened, today()).unwrap();
    assert_eq!(overview.logged_nights, 2);
    assert_eq!(overview.report.consistency_score, 100);
    assert_eq!(overview.report.avg_quality, "Good");
    assert_eq!(overview.report.avg_duration, 8.0);
    assert_eq!(overview.chart[6].hours, 0.0);
    assert_eq!(overview.chart[5].hours, 8.0);
}
