//! Request handlers. Each one takes already-deserialized input plus the shared
//! state and answers in the `{message, errors, data}` shape the dashboard forms use.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;
use crate::analytics::{self, DashboardStats, SubjectProgress};
use crate::error::{FieldErrors, SynaptiqError, ValidationError};
use crate::genai::flows::{self, CareerProfile, CareerRecommendations, SleepTips, SleepTipsInput};
use crate::genai::{RetryPolicy, TextGenerator};
use crate::planner::{self, form::StudyPlanForm, PlanOutput};
use crate::sleep::{self, ChartPoint, SleepReport};
use crate::state::AppState;
use crate::wellness::{self, CheckIn};

pub const MSG_PLAN_GENERATED: &str = "Study plan generated successfully.";
pub const MSG_INVALID_FORM: &str = "Invalid form data.";
pub const MSG_CAREER_GENERATED: &str = "Recommendations generated successfully.";
pub const MSG_CAREER_FAILED: &str = "Failed to generate recommendations. Please try again.";
pub const MSG_SLEEP_TIPS_GENERATED: &str = "Sleep tips generated successfully.";
pub const MSG_SLEEP_TIPS_FAILED: &str = "Failed to generate sleep tips. Please try again.";

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ActionResponse<T> {
    pub message: String,
    pub errors: Option<FieldErrors>,
    pub data: Option<T>,
}

impl<T> ActionResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        ActionResponse { message: message.to_string(), errors: None, data: Some(data) }
    }

    pub fn invalid(errors: ValidationError) -> Self {
        ActionResponse { message: MSG_INVALID_FORM.to_string(), errors: Some(errors.fields), data: None }
    }

    pub fn failure(message: &str) -> Self {
        ActionResponse { message: message.to_string(), errors: None, data: None }
    }

    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }
}

/// Validate the form, build a plan, and on success replace the stored plan,
/// subjects and topic tasks. A rejected form also drops the stored plan.
pub fn generate_study_plan<R: Rng + ?Sized>(
    state: &AppState,
    form: &StudyPlanForm,
    today: NaiveDate,
    rng: &mut R,
) -> Result<ActionResponse<PlanOutput>, SynaptiqError> {
    let outcome = planner::form::parse(form).and_then(|request| {
        planner::generate_with(&request.subjects, request.hours_per_day, today, rng)
            .map(|plan| (request, plan))
    });

    let (request, plan) = match outcome {
        Ok(ok) => ok,
        Err(errors) => {
            tracing::info!(fields = errors.fields.len(), "Study plan form rejected");
            state.metrics.record_plan_rejected();
            state.data.clear_plan()?;
            return Ok(ActionResponse::invalid(errors));
        }
    };

    state.data.save_plan(&plan)?;
    state
        .data
        .set_subjects(&planner::tasks::subjects_from_tracker(&plan.completion_tracker, &request.subjects))?;
    state
        .data
        .set_tasks(&planner::tasks::tasks_from_tracker(&plan.completion_tracker))?;
    state.metrics.record_plan_generated();

    Ok(ActionResponse::success(MSG_PLAN_GENERATED, plan))
}

pub async fn recommend_career<G: TextGenerator + ?Sized>(
    state: &AppState,
    generator: &G,
    policy: RetryPolicy,
    profile: &CareerProfile,
) -> ActionResponse<CareerRecommendations> {
    match flows::recommend_career_paths(state, generator, policy, profile).await {
        Err(errors) => ActionResponse::invalid(errors),
        Ok(Ok(recommendations)) => ActionResponse::success(MSG_CAREER_GENERATED, recommendations),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Career recommendation failed");
            ActionResponse::failure(MSG_CAREER_FAILED)
        }
    }
}

/// Tips for the stored sleep logs.
pub async fn sleep_tips<G: TextGenerator + ?Sized>(
    state: &AppState,
    generator: &G,
    policy: RetryPolicy,
) -> Result<ActionResponse<SleepTips>, SynaptiqError> {
    let logs = state.data.sleep_logs()?;
    let input = match SleepTipsInput::from_logs(&logs) {
        Ok(input) => input,
        Err(errors) => return Ok(ActionResponse::invalid(errors)),
    };

    Ok(match flows::generate_sleep_tips(state, generator, policy, &input).await {
        Ok(tips) => ActionResponse::success(MSG_SLEEP_TIPS_GENERATED, tips),
        Err(e) => {
            tracing::error!(error = %e, "Sleep tips failed");
            ActionResponse::failure(MSG_SLEEP_TIPS_FAILED)
        }
    })
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WellnessReply {
    pub check_in: CheckIn,
    pub suggestion: &'static str,
}

pub fn wellness_suggestion(check_in: CheckIn) -> WellnessReply {
    let suggestion = wellness::suggestion(&check_in);
    tracing::debug!(stress = ?check_in.stress, mood = ?check_in.mood, "Wellness check-in");
    WellnessReply { check_in, suggestion }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SleepOverview {
    pub report: SleepReport,
    pub chart: Vec<ChartPoint>,
    pub logged_nights: usize,
}

pub fn sleep_overview(state: &AppState, today: NaiveDate) -> Result<SleepOverview, SynaptiqError> {
    let logs = state.data.sleep_logs()?;
    Ok(SleepOverview {
        report: sleep::analyze(&logs),
        chart: sleep::weekly_chart(&logs, today),
        logged_nights: logs.len(),
    })
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub subject_progress: Vec<SubjectProgress>,
    pub weekly_activity: Vec<ChartPoint>,
}

pub fn dashboard(state: &AppState, now: DateTime<Utc>, today: NaiveDate) -> Result<Dashboard, SynaptiqError> {
    let subjects = state.data.subjects()?;
    let tasks = state.data.tasks()?;
    let logs = state.data.study_logs()?;
    Ok(Dashboard {
        stats: analytics::compute_dashboard(&subjects, &tasks, &logs, now),
        subject_progress: analytics::subject_progress(&subjects, &tasks),
        weekly_activity: analytics::weekly_activity(&logs, today),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::testing::{fast_policy, ScriptedGenerator};
    use crate::planner::form::SubjectForm;
    use crate::wellness::{Mood, StressLevel};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn form(hours: Option<f64>) -> StudyPlanForm {
        StudyPlanForm {
            subjects: vec![SubjectForm {
                id: Some("bio".into()),
                name: "Biology".into(),
                topics: Some(3),
                difficulty: Some("hard".into()),
                exam_date: "2026-03-12".into(),
            }],
            hours_per_day: hours,
        }
    }

    #[test]
    fn test_plan_success_replaces_subjects_and_tasks() {
        let state = AppState::in_memory();
        let mut rng = StdRng::seed_from_u64(7);
        let response = generate_study_plan(&state, &form(Some(2.0)), today(), &mut rng).unwrap();

        assert_eq!(response.message, MSG_PLAN_GENERATED);
        assert!(response.errors.is_none());
        assert!(state.data.saved_plan().unwrap().is_some());

        let subjects = state.data.subjects().unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].id, "bio");
        let tasks = state.data.tasks().unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[2].title, "Biology - Topic 3");
        assert_eq!(state.metrics.snapshot().plans_generated, 1);
    }

    #[test]
    fn test_invalid_form_clears_saved_plan() {
        let state = AppState::in_memory();
        let mut rng = StdRng::seed_from_u64(7);
        generate_study_plan(&state, &form(Some(2.0)), today(), &mut rng).unwrap();

        let response = generate_study_plan(&state, &form(Some(0.1)), today(), &mut rng).unwrap();
        assert_eq!(response.message, MSG_INVALID_FORM);
        assert!(response.data.is_none());
        assert!(response.errors.unwrap().contains_key("hoursPerDay"));
        assert!(state.data.saved_plan().unwrap().is_none());
        // Subjects and tasks from the earlier plan stay
        assert_eq!(state.data.tasks().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_career_failure_message() {
        let state = AppState::in_memory();
        let generator = ScriptedGenerator::new(vec![Err(SynaptiqError::new("quota", "http"))]);
        let profile = CareerProfile {
            interests: "music".into(),
            strengths: "patience".into(),
            academic_background: "BSc".into(),
            current_skills: "piano".into(),
        };
        let response = recommend_career(&state, &generator, fast_policy(0), &profile).await;
        assert_eq!(response.message, MSG_CAREER_FAILED);
        assert!(response.errors.is_none());
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_sleep_tips_without_logs_is_invalid() {
        let state = AppState::in_memory();
        let generator = ScriptedGenerator::ok("{}");
        let response = sleep_tips(&state, &generator, fast_policy(0)).await.unwrap();
        assert_eq!(response.message, MSG_INVALID_FORM);
        assert_eq!(generator.call_count(), 0);
    }

    #[test]
    fn test_wellness_and_dashboard() {
        let reply = wellness_suggestion(CheckIn { stress: StressLevel::Low, sleep: 8.0, mood: Mood::Good });
        assert!(reply.suggestion.starts_with("You're in a great state"));

        let state = AppState::in_memory();
        let board = dashboard(&state, Utc::now(), today()).unwrap();
        assert_eq!(board.stats.courses_in_progress, 0);
        assert_eq!(board.weekly_activity.len(), 7);
    }
}
