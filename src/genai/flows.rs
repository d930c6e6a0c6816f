//! Sleep coaching tips and career path recommendations.

use std::fmt::Write;
use serde::{Deserialize, Serialize};
use crate::data::records::SleepLog;
use crate::error::{SynaptiqError, ValidationError};
use crate::sleep::{self, MIN_LOGS_FOR_ANALYSIS};
use crate::state::AppState;
use super::{query, RetryPolicy, TextGenerator};

pub const MSG_NOT_ENOUGH_SLEEP_LOGS: &str = "Log at least two nights of sleep to get tips.";

/// What the sleep coach sees: the last week of logs plus the computed report.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SleepTipsInput {
    pub sleep_logs: Vec<SleepLog>,
    pub consistency_score: u32,
    pub average_quality: String,
}

impl SleepTipsInput {
    /// Newest-first logs in, or a validation error when there are too few to analyze.
    pub fn from_logs(logs: &[SleepLog]) -> Result<Self, ValidationError> {
        let recent = sleep::recent(logs);
        if recent.len() < MIN_LOGS_FOR_ANALYSIS {
            return Err(ValidationError::single("sleepLogs", MSG_NOT_ENOUGH_SLEEP_LOGS));
        }
        let report = sleep::analyze(logs);
        Ok(SleepTipsInput {
            sleep_logs: recent.to_vec(),
            consistency_score: report.consistency_score,
            average_quality: report.avg_quality,
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SleepTips {
    pub main_insight: String,
    pub personalized_tips: Vec<String>,
    pub reminder_suggestion: String,
}

pub fn sleep_tips_prompt(input: &SleepTipsInput) -> String {
    let mut prompt = String::from(
        "You are an expert sleep coach. Give encouraging, actionable and personalized advice \
         based on the user's recent sleep data.\n\nUser's sleep data:\n",
    );
    let _ = writeln!(prompt, "- Average quality: {}", input.average_quality);
    let _ = writeln!(prompt, "- Consistency score (0-100): {}", input.consistency_score);
    prompt.push_str("- Recent logs:\n");
    for log in &input.sleep_logs {
        let _ = writeln!(
            prompt,
            "  - Date: {}, Bedtime: {}, Wake time: {}, Quality: {}",
            log.date.format("%b %-d"),
            log.bedtime.format("%H:%M"),
            log.wake_time.format("%H:%M"),
            log.quality.as_str(),
        );
    }
    prompt.push_str(
        "\nReply with a single JSON object with these keys:\n\
         - \"mainInsight\": the most significant pattern or issue. If bedtimes are inconsistent, focus on that; \
         if quality is poor despite consistent times, focus on quality.\n\
         - \"personalizedTips\": 2-3 specific, actionable tips tied to the data.\n\
         - \"reminderSuggestion\": a realistic bedtime reminder based on their average bedtime.\n\
         Be supportive and non-judgmental.\n",
    );
    prompt
}

pub async fn generate_sleep_tips<G: TextGenerator + ?Sized>(
    state: &AppState,
    generator: &G,
    policy: RetryPolicy,
    input: &SleepTipsInput,
) -> Result<SleepTips, SynaptiqError> {
    let tips: SleepTips = query(state, generator, &sleep_tips_prompt(input), policy).await?;
    tracing::info!(tips = tips.personalized_tips.len(), "Sleep tips generated");
    Ok(tips)
}

/// Minimum trimmed length of every career profile field
pub const MIN_PROFILE_FIELD_LEN: usize = 3;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CareerProfile {
    pub interests: String,
    pub strengths: String,
    pub academic_background: String,
    pub current_skills: String,
}

impl CareerProfile {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let checks = [
            ("interests", &self.interests, "Please describe your interests."),
            ("strengths", &self.strengths, "Please describe your strengths."),
            ("academicBackground", &self.academic_background, "Please describe your academic background."),
            ("currentSkills", &self.current_skills, "Please list your current skills."),
        ];
        let mut errors = ValidationError::new();
        for (field, value, message) in checks {
            if value.trim().chars().count() < MIN_PROFILE_FIELD_LEN {
                errors.push(field, message);
            }
        }
        errors.into_result()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RoadmapPhase {
    pub phase: String,
    pub description: String,
    #[serde(default)]
    pub steps: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LearningResources {
    #[serde(default)]
    pub websites: Vec<String>,
    #[serde(default)]
    pub youtube_channels: Vec<String>,
    #[serde(default)]
    pub other: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CareerRecommendation {
    pub career_path: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    pub skill_gap_analysis: String,
    #[serde(default)]
    pub learning_roadmap: Vec<RoadmapPhase>,
    #[serde(default)]
    pub learning_resources: LearningResources,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CareerRecommendations {
    pub recommendations: Vec<CareerRecommendation>,
}

pub fn career_prompt(profile: &CareerProfile) -> String {
    format!(
        "You are an expert career counselor. Give detailed, actionable career guidance for this profile.\n\n\
         User profile:\n\
         - Interests: {}\n\
         - Strengths: {}\n\
         - Academic background: {}\n\
         - Current skills: {}\n\n\
         Recommend 3 to 4 distinct career paths. Reply with a single JSON object \
         {{\"recommendations\": [...]}} where each recommendation has:\n\
         - \"careerPath\": the name of the career.\n\
         - \"requiredSkills\": the most crucial skills for the role.\n\
         - \"skillGapAnalysis\": what is missing compared to the user's current skills.\n\
         - \"learningRoadmap\": 3-4 phases, each {{\"phase\", \"description\", \"steps\": [...]}}.\n\
         - \"learningResources\": {{\"websites\": [URLs], \"youtubeChannels\": [names], \"other\": [books, courses, communities]}}.\n\
         Be specific, encouraging and realistic.\n",
        profile.interests.trim(),
        profile.strengths.trim(),
        profile.academic_background.trim(),
        profile.current_skills.trim(),
    )
}

/// Validation failures come back separately so callers can show them per field.
pub async fn recommend_career_paths<G: TextGenerator + ?Sized>(
    state: &AppState,
    generator: &G,
    policy: RetryPolicy,
    profile: &CareerProfile,
) -> Result<Result<CareerRecommendations, SynaptiqError>, ValidationError> {
    profile.validate()?;
    let result = query::<CareerRecommendations, G>(state, generator, &career_prompt(profile), policy).await;
    if let Ok(ref recs) = result {
        tracing::info!(count = recs.recommendations.len(), "Career recommendations generated");
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::records::SleepQuality;
    use crate::genai::testing::{fast_policy, ScriptedGenerator};
    use chrono::{NaiveDate, NaiveTime};

    fn log(day: u32, quality: SleepQuality) -> SleepLog {
        SleepLog {
            id: day.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
            bedtime: NaiveTime::from_hms_opt(23, 15, 0).unwrap(),
            wake_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            quality,
        }
    }

    fn profile() -> CareerProfile {
        CareerProfile {
            interests: "robotics and maths".into(),
            strengths: "problem solving".into(),
            academic_background: "A-levels in physics".into(),
            current_skills: "Python, soldering".into(),
        }
    }

    #[test]
    fn test_sleep_input_needs_two_logs() {
        let err = SleepTipsInput::from_logs(&[log(1, SleepQuality::Good)]).unwrap_err();
        assert_eq!(err.messages("sleepLogs").unwrap()[0], MSG_NOT_ENOUGH_SLEEP_LOGS);
    }

    #[test]
    fn test_sleep_prompt_lists_logs() {
        let input = SleepTipsInput::from_logs(&[log(9, SleepQuality::Good), log(8, SleepQuality::Fair)]).unwrap();
        assert_eq!(input.consistency_score, 100);
        let prompt = sleep_tips_prompt(&input);
        assert!(prompt.contains("Date: Oct 9, Bedtime: 23:15, Wake time: 07:00, Quality: good"));
        assert!(prompt.contains("Consistency score (0-100): 100"));
        assert!(prompt.contains("\"reminderSuggestion\""));
    }

    #[tokio::test]
    async fn test_generate_sleep_tips() {
        let state = AppState::in_memory();
        let generator = ScriptedGenerator::ok(
            r#"{"mainInsight":"Steady bedtimes","personalizedTips":["Keep it up","Dim lights"],"reminderSuggestion":"10:45 PM"}"#,
        );
        let input = SleepTipsInput::from_logs(&[log(9, SleepQuality::Good), log(8, SleepQuality::Good)]).unwrap();
        let tips = generate_sleep_tips(&state, &generator, fast_policy(0), &input).await.unwrap();
        assert_eq!(tips.personalized_tips.len(), 2);
        assert_eq!(tips.reminder_suggestion, "10:45 PM");
    }

    #[test]
    fn test_career_profile_validation() {
        assert!(profile().validate().is_ok());

        let bad = CareerProfile { interests: "  ab  ".into(), current_skills: String::new(), ..profile() };
        let err = bad.validate().unwrap_err();
        assert_eq!(err.messages("interests").unwrap()[0], "Please describe your interests.");
        assert_eq!(err.messages("currentSkills").unwrap()[0], "Please list your current skills.");
        assert!(err.messages("strengths").is_none());
    }

    #[tokio::test]
    async fn test_invalid_profile_never_calls_model() {
        let state = AppState::in_memory();
        let generator = ScriptedGenerator::ok("{}");
        let result = recommend_career_paths(&state, &generator, fast_policy(0), &CareerProfile::default()).await;
        assert_eq!(result.unwrap_err().fields.len(), 4);
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_career_recommendations_tolerate_missing_lists() {
        let state = AppState::in_memory();
        let generator = ScriptedGenerator::ok(
            r#"```json
            {"recommendations": [{
                "careerPath": "Robotics Engineer",
                "requiredSkills": ["C++", "Control theory"],
                "skillGapAnalysis": "Needs embedded experience",
                "learningRoadmap": [{"phase": "Phase 1: Foundations", "description": "Basics", "steps": ["Linear algebra"]}],
                "learningResources": {"websites": ["https://ros.org"]},
            }]}
            ```"#,
        );
        let recs = recommend_career_paths(&state, &generator, fast_policy(0), &profile())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(recs.recommendations[0].career_path, "Robotics Engineer");
        assert!(recs.recommendations[0].learning_resources.youtube_channels.is_empty());
        assert!(generator.prompts.lock()[0].contains("Interests: robotics and maths"));
    }
}
