//! Study plan generation: priority scoring, hour allocation and session packing.

use std::collections::VecDeque;
use chrono::{Duration, Local, NaiveDate};
use rand::Rng;
use rand::seq::SliceRandom;
use crate::error::ValidationError;
use super::{
    CompletionTracker, DailySchedule, PlanOutput, Session, Subject, SubjectPriority, WeeklyPlan,
    BREAK_ACTIVITY,
};

pub const STUDY_BLOCK_MINUTES: u32 = 50;
pub const BREAK_MINUTES: u32 = 10;
const SESSION_MINUTES: u32 = STUDY_BLOCK_MINUTES + BREAK_MINUTES;
/// Final days before an exam reserved for revision
pub const REVISION_PERIOD_DAYS: u32 = 7;
const URGENCY_AMPLIFIER: f64 = 5.0;
const HOURS_PER_TOPIC: f64 = 1.0;
const DAY_START_MINUTES: u32 = 9 * 60;

pub const MIN_HOURS_PER_DAY: f64 = 0.5;
pub const MAX_HOURS_PER_DAY: f64 = 16.0;

pub const MSG_NO_SUBJECTS: &str = "At least one subject is required";
pub const MSG_NAME_REQUIRED: &str = "Subject name is required";
pub const MSG_MIN_TOPICS: &str = "Must have at least 1 topic";
pub const MSG_MIN_HOURS: &str = "Must study at least 30 minutes a day";
pub const MSG_MAX_HOURS: &str = "Must study at most 16 hours a day";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Study,
    Revise,
}

/// One 50-minute block waiting to be placed on the calendar.
#[derive(Debug, Clone, Copy)]
struct PoolEntry {
    subject: usize,
    kind: BlockKind,
}

/// Generate a plan for today using the thread-local random source.
pub fn generate(subjects: &[Subject], hours_per_day: f64) -> Result<PlanOutput, ValidationError> {
    let today = Local::now().date_naive();
    generate_with(subjects, hours_per_day, today, &mut rand::thread_rng())
}

/// Generate a plan with an explicit calendar day and random source.
/// Only the order of sessions in `daily_schedule` depends on `rng`.
pub fn generate_with<R: Rng + ?Sized>(
    subjects: &[Subject],
    hours_per_day: f64,
    today: NaiveDate,
    rng: &mut R,
) -> Result<PlanOutput, ValidationError> {
    validate(subjects, hours_per_day)?;

    let scored = score_subjects(subjects, today);
    let total_priority: f64 = scored.iter().map(|p| p.priority_score).sum();
    let total_study_days = scored.iter().map(|p| p.days_until_exam).max().unwrap_or(0);

    let subject_priorities = if total_priority > 0.0 {
        allocate_hours(subjects, scored, total_priority, total_study_days, hours_per_day)
    } else {
        // Every exam is behind us: nothing to share out
        scored
    };

    let mut weekly_plan: Vec<WeeklyPlan> = subject_priorities
        .iter()
        .map(|p| WeeklyPlan {
            subject: p.name.clone(),
            total_hours: p.study_hours + p.revision_hours,
            daily_breakdown: Default::default(),
        })
        .collect();

    let mut pool = build_session_pool(&subject_priorities);
    pool.shuffle(rng);

    let daily_schedule = pack_days(
        subjects,
        pool.into(),
        &mut weekly_plan,
        today,
        total_study_days,
        hours_per_day,
    );

    let completion_tracker = subjects
        .iter()
        .map(|s| CompletionTracker {
            subject: s.name.clone(),
            total_topics: s.topic_count,
            subject_id: s.id.clone(),
        })
        .collect();

    tracing::info!(
        subject_count = subjects.len(),
        total_study_days = total_study_days,
        scheduled_days = daily_schedule.len(),
        "Generated study plan"
    );

    Ok(PlanOutput {
        subject_priorities,
        daily_schedule,
        weekly_plan,
        completion_tracker,
    })
}

/// Check generator preconditions, collecting every failure.
pub fn validate(subjects: &[Subject], hours_per_day: f64) -> Result<(), ValidationError> {
    let mut err = ValidationError::new();

    if subjects.is_empty() {
        err.push("subjects", MSG_NO_SUBJECTS);
    }
    for (i, subject) in subjects.iter().enumerate() {
        if subject.name.trim().is_empty() {
            err.push(format!("subjects[{}].name", i), MSG_NAME_REQUIRED);
        }
        if subject.topic_count < 1 {
            err.push(format!("subjects[{}].topics", i), MSG_MIN_TOPICS);
        }
    }
    if !hours_per_day.is_finite() || hours_per_day < MIN_HOURS_PER_DAY {
        err.push("hoursPerDay", MSG_MIN_HOURS);
    } else if hours_per_day > MAX_HOURS_PER_DAY {
        err.push("hoursPerDay", MSG_MAX_HOURS);
    }

    err.into_result()
}

/// Whole days from `today` until `exam_date`; negative for past exams.
pub fn days_between(today: NaiveDate, exam_date: NaiveDate) -> i64 {
    (exam_date - today).num_days()
}

pub fn priority_score(topic_count: u32, weight: f64, days_until_exam: u32) -> f64 {
    let urgency = 1.0 / (days_until_exam as f64 + 1.0);
    topic_count as f64 * weight * (1.0 + urgency * URGENCY_AMPLIFIER)
}

fn score_subjects(subjects: &[Subject], today: NaiveDate) -> Vec<SubjectPriority> {
    subjects
        .iter()
        .map(|subject| {
            let days = days_between(today, subject.exam_date);
            if days < 0 {
                tracing::debug!(subject = %subject.name, "Exam date has passed, skipping");
                return SubjectPriority {
                    name: subject.name.clone(),
                    priority_score: 0.0,
                    days_until_exam: 0,
                    study_hours: 0,
                    revision_hours: 0,
                };
            }

            let days = u32::try_from(days).unwrap_or(u32::MAX);
            SubjectPriority {
                name: subject.name.clone(),
                priority_score: priority_score(subject.topic_count, subject.difficulty.weight(), days),
                days_until_exam: days,
                study_hours: 0,
                revision_hours: 0,
            }
        })
        .collect()
}

fn allocate_hours(
    subjects: &[Subject],
    scored: Vec<SubjectPriority>,
    total_priority: f64,
    total_study_days: u32,
    hours_per_day: f64,
) -> Vec<SubjectPriority> {
    let total_available_hours = total_study_days as f64 * hours_per_day;

    scored
        .into_iter()
        .zip(subjects)
        .map(|(mut priority, subject)| {
            let allocated = priority.priority_score / total_priority * total_available_hours;
            let days = priority.days_until_exam;

            let study_days = days.saturating_sub(REVISION_PERIOD_DAYS);
            let revision_days = days.min(REVISION_PERIOD_DAYS);
            let available_study = study_days as f64 * hours_per_day;
            let available_revision = revision_days as f64 * hours_per_day;

            let (study, revision) = if days > REVISION_PERIOD_DAYS {
                let needed = subject.topic_count as f64 * HOURS_PER_TOPIC;
                let study = allocated.min(needed).min(available_study);
                (study, (allocated - study).min(available_revision))
            } else {
                (0.0, allocated.min(available_revision))
            };

            priority.study_hours = study.round() as u32;
            priority.revision_hours = revision.round() as u32;

            tracing::debug!(
                subject = %priority.name,
                priority_score = priority.priority_score,
                allocated_hours = allocated,
                study_hours = priority.study_hours,
                revision_hours = priority.revision_hours,
                "Allocated hours"
            );
            priority
        })
        .collect()
}

fn blocks_for(hours: u32) -> usize {
    (hours as f64 * 60.0 / STUDY_BLOCK_MINUTES as f64).round() as usize
}

fn build_session_pool(priorities: &[SubjectPriority]) -> Vec<PoolEntry> {
    let mut pool = Vec::new();
    for (subject, priority) in priorities.iter().enumerate() {
        let study = std::iter::repeat(PoolEntry { subject, kind: BlockKind::Study })
            .take(blocks_for(priority.study_hours));
        let revise = std::iter::repeat(PoolEntry { subject, kind: BlockKind::Revise })
            .take(blocks_for(priority.revision_hours));
        pool.extend(study.chain(revise));
    }
    pool
}

/// Sessions that fit in one day: a 50-minute block plus its 10-minute break each.
pub fn sessions_per_day(hours_per_day: f64) -> usize {
    (hours_per_day * 60.0 / SESSION_MINUTES as f64).floor() as usize
}

fn pack_days(
    subjects: &[Subject],
    mut pool: VecDeque<PoolEntry>,
    weekly_plan: &mut [WeeklyPlan],
    today: NaiveDate,
    total_study_days: u32,
    hours_per_day: f64,
) -> Vec<DailySchedule> {
    let per_day = sessions_per_day(hours_per_day);
    let block_hours = STUDY_BLOCK_MINUTES as f64 / 60.0;
    let mut schedule = Vec::new();

    for offset in 0..total_study_days {
        if pool.is_empty() {
            break;
        }
        let date = today + Duration::days(offset as i64);
        let weekday = date.format("%A").to_string();
        let mut sessions = Vec::with_capacity(per_day * 2);
        let mut clock = DAY_START_MINUTES;

        for _ in 0..per_day {
            let Some(entry) = pool.pop_front() else { break };
            let name = &subjects[entry.subject].name;
            let activity = match entry.kind {
                BlockKind::Study => format!("Study {}", name),
                BlockKind::Revise => format!("Revise {}", name),
            };

            let session_end = clock + STUDY_BLOCK_MINUTES;
            let break_end = session_end + BREAK_MINUTES;
            sessions.push(Session {
                start: format_clock(clock),
                end: format_clock(session_end),
                activity,
            });
            sessions.push(Session {
                start: format_clock(session_end),
                end: format_clock(break_end),
                activity: BREAK_ACTIVITY.to_string(),
            });

            *weekly_plan[entry.subject]
                .daily_breakdown
                .entry(weekday.clone())
                .or_insert(0.0) += block_hours;

            clock = break_end;
        }

        if !sessions.is_empty() {
            schedule.push(DailySchedule {
                day: date.format("%A, %b %-d").to_string(),
                sessions,
            });
        }
    }

    if !pool.is_empty() {
        tracing::debug!(unplaced = pool.len(), "Horizon full, some blocks left unscheduled");
    }

    schedule
}

/// Render minutes since midnight as a 12-hour clock label, e.g. "9:00 AM".
/// Times past midnight wrap onto the next day.
pub fn format_clock(minutes: u32) -> String {
    let minutes = minutes % (24 * 60);
    let hour = minutes / 60;
    let minute = minutes % 60;
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    let meridiem = if hour < 12 { "AM" } else { "PM" };
    format!("{}:{:02} {}", display_hour, minute, meridiem)
}
