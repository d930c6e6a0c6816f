//! Command-line surface. Every command prints pretty JSON on stdout.

use std::path::{Path, PathBuf};
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::json;
use crate::actions;
use crate::config::AppConfig;
use crate::data::records::{hh_mm, Exam, NewSleepLog, SleepQuality, StoredSubject};
use crate::error::SynaptiqError;
use crate::genai::flows::CareerProfile;
use crate::genai::{GeminiClient, RetryPolicy};
use crate::habits::HabitTracker;
use crate::planner::Difficulty;
use crate::planner::form::{parse_exam_date, StudyPlanForm, MAX_TOPICS};
use crate::state::AppState;
use crate::wellness::{CheckIn, Mood, StressLevel};

/// Synaptiq - study planning and student well-being
#[derive(Parser, Debug)]
#[command(name = "synaptiq")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Study plan generation
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Subjects shown on the dashboard and task list
    Subjects {
        #[command(subcommand)]
        command: SubjectCommands,
    },
    /// Topic tasks created from the last plan
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Upcoming exam countdowns
    Exams {
        #[command(subcommand)]
        command: ExamCommands,
    },
    /// Daily habits and streaks
    Habits {
        #[command(subcommand)]
        command: HabitCommands,
    },
    /// Sleep log and coaching
    Sleep {
        #[command(subcommand)]
        command: SleepCommands,
    },
    /// Quick wellness check-in
    Wellness {
        #[arg(long, value_enum)]
        stress: StressLevel,
        /// Hours slept last night
        #[arg(long)]
        sleep: f64,
        #[arg(long, value_enum)]
        mood: Mood,
    },
    /// Career path recommendations
    Career {
        #[arg(long)]
        interests: String,
        #[arg(long)]
        strengths: String,
        #[arg(long)]
        academic_background: String,
        #[arg(long)]
        current_skills: String,
    },
    /// Progress overview
    Dashboard,
}

#[derive(Subcommand, Debug)]
pub enum PlanCommands {
    /// Generate a plan from a JSON form file
    Generate {
        /// `{"subjects": [...], "hoursPerDay": 4}`
        #[arg(short, long)]
        input: PathBuf,
        /// Overrides hoursPerDay from the file
        #[arg(long)]
        hours: Option<f64>,
        /// Fixed seed for a reproducible session order
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the saved plan
    Show,
    /// Forget the saved plan
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum SubjectCommands {
    List,
    /// Ignored when a subject with the same name exists
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 1)]
        topics: u32,
        #[arg(long, value_enum, default_value_t = Difficulty::Medium)]
        difficulty: Difficulty,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    List,
    /// Add a custom task to a subject
    Add {
        #[arg(long)]
        subject: String,
        title: String,
    },
    /// Flip a task between done and not done
    Toggle { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ExamCommands {
    List,
    Add {
        #[arg(long)]
        subject: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
    },
    Remove { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum HabitCommands {
    /// Tracked habits and the ones that can still be added
    List,
    Add { id: String },
    Remove { id: String },
    /// Check off a habit for today
    Complete { id: String },
    /// Log study hours, which also completes the study habit
    LogStudy { hours: f64 },
}

#[derive(Subcommand, Debug)]
pub enum SleepCommands {
    Add {
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<String>,
        /// HH:MM
        #[arg(long)]
        bedtime: String,
        /// HH:MM
        #[arg(long)]
        wake: String,
        #[arg(long, value_enum, default_value_t = SleepQuality::Good)]
        quality: SleepQuality,
    },
    Remove { id: String },
    /// Consistency, quality and the last seven nights
    Report,
    /// Personalized tips from the generation API
    Tips,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), SynaptiqError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn input_error(message: String) -> SynaptiqError {
    SynaptiqError::new(message, "input")
}

fn load_form(path: &Path) -> Result<StudyPlanForm, SynaptiqError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| SynaptiqError::from(e).with_context(path.display().to_string()))?;
    serde_json::from_str(&raw).map_err(|e| SynaptiqError::from(e).with_context(path.display().to_string()))
}

fn parse_time(raw: &str, field: &str) -> Result<chrono::NaiveTime, SynaptiqError> {
    hh_mm::parse(raw).ok_or_else(|| input_error(format!("{} must be HH:MM, got '{}'", field, raw)))
}

pub async fn execute(cli: Cli, state: &AppState, config: &AppConfig) -> Result<(), SynaptiqError> {
    let today: NaiveDate = Local::now().date_naive();

    match cli.command {
        Commands::Plan { command } => match command {
            PlanCommands::Generate { input, hours, seed } => {
                let mut form = load_form(&input)?;
                if hours.is_some() {
                    form.hours_per_day = hours;
                }
                form.hours_per_day = form.hours_per_day.or(Some(config.default_hours_per_day));

                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                print_json(&actions::generate_study_plan(state, &form, today, &mut rng)?)
            }
            PlanCommands::Show => print_json(&state.data.saved_plan()?),
            PlanCommands::Clear => {
                state.data.clear_plan()?;
                print_json(&json!({ "cleared": true }))
            }
        },

        Commands::Subjects { command } => match command {
            SubjectCommands::List => print_json(&state.data.subjects()?),
            SubjectCommands::Add { name, topics, difficulty } => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(input_error("subject name is required".to_string()));
                }
                if !(1..=MAX_TOPICS).contains(&topics) {
                    return Err(input_error(format!("topics must be between 1 and {}", MAX_TOPICS)));
                }
                let subject = StoredSubject {
                    id: Utc::now().timestamp_millis().to_string(),
                    name,
                    topic_count: topics,
                    difficulty,
                };
                let added = state.data.add_subject(subject.clone())?;
                print_json(&json!({ "subject": subject, "added": added }))
            }
        },

        Commands::Tasks { command } => match command {
            TaskCommands::List => print_json(&state.data.tasks()?),
            TaskCommands::Add { subject, title } => print_json(&state.data.add_task(&subject, &title)?),
            TaskCommands::Toggle { id } => match state.data.toggle_task(&id)? {
                Some(completed) => print_json(&json!({ "id": id, "completed": completed })),
                None => Err(input_error(format!("no task with id '{}'", id))),
            },
        },

        Commands::Exams { command } => {
            let mut exams = state.data.exams()?;
            match command {
                ExamCommands::List => print_json(&exams),
                ExamCommands::Add { subject, date } => {
                    let date = parse_exam_date(&date)
                        .ok_or_else(|| input_error(format!("date must be YYYY-MM-DD, got '{}'", date)))?;
                    let subject = subject.trim().to_string();
                    if subject.is_empty() {
                        return Err(input_error("subject is required".to_string()));
                    }
                    let id = exams.iter().map(|e| e.id).max().map_or(1, |max| max + 1);
                    let exam = Exam { id, subject, date };
                    exams.push(exam.clone());
                    exams.sort_by_key(|e| e.date);
                    state.data.set_exams(&exams)?;
                    print_json(&exam)
                }
                ExamCommands::Remove { id } => {
                    let before = exams.len();
                    exams.retain(|e| e.id != id);
                    let removed = exams.len() != before;
                    if removed {
                        state.data.set_exams(&exams)?;
                    }
                    print_json(&json!({ "id": id, "removed": removed }))
                }
            }
        }

        Commands::Habits { command } => {
            let mut tracker = HabitTracker::load(state.data.clone(), today)?;
            match command {
                HabitCommands::List => {
                    let available: Vec<_> = tracker
                        .available()
                        .iter()
                        .map(|h| json!({ "id": h.id, "name": h.name, "goal": h.goal }))
                        .collect();
                    print_json(&json!({ "tracked": tracker.habits(), "available": available }))
                }
                HabitCommands::Add { id } => {
                    let added = tracker.add(&id)?;
                    print_json(&json!({ "id": id, "added": added }))
                }
                HabitCommands::Remove { id } => {
                    let removed = tracker.remove(&id)?;
                    print_json(&json!({ "id": id, "removed": removed }))
                }
                HabitCommands::Complete { id } => {
                    let streak = tracker.complete(&id, today)?;
                    print_json(&json!({ "id": id, "streak": streak }))
                }
                HabitCommands::LogStudy { hours } => {
                    let streak = tracker.log_study(hours, Utc::now(), today)?;
                    print_json(&json!({ "hours": hours, "streak": streak }))
                }
            }
        }

        Commands::Sleep { command } => match command {
            SleepCommands::Add { date, bedtime, wake, quality } => {
                let date = match date {
                    Some(raw) => parse_exam_date(&raw)
                        .ok_or_else(|| input_error(format!("date must be YYYY-MM-DD, got '{}'", raw)))?,
                    None => today,
                };
                let log = NewSleepLog {
                    date,
                    bedtime: parse_time(&bedtime, "bedtime")?,
                    wake_time: parse_time(&wake, "wake")?,
                    quality,
                };
                print_json(&state.data.add_sleep_log(log)?)
            }
            SleepCommands::Remove { id } => {
                let removed = state.data.remove_sleep_log(&id)?;
                print_json(&json!({ "id": id, "removed": removed }))
            }
            SleepCommands::Report => print_json(&actions::sleep_overview(state, today)?),
            SleepCommands::Tips => {
                let client = GeminiClient::from_config(config)?;
                let response = actions::sleep_tips(state, &client, RetryPolicy::from_config(config)).await?;
                print_json(&response)
            }
        },

        Commands::Wellness { stress, sleep, mood } => {
            print_json(&actions::wellness_suggestion(CheckIn { stress, sleep, mood }))
        }

        Commands::Career { interests, strengths, academic_background, current_skills } => {
            let profile = CareerProfile { interests, strengths, academic_background, current_skills };
            // Bad input is reported without needing an API key
            if let Err(errors) = profile.validate() {
                return print_json(&actions::ActionResponse::<()>::invalid(errors));
            }
            let client = GeminiClient::from_config(config)?;
            let response =
                actions::recommend_career(state, &client, RetryPolicy::from_config(config), &profile).await;
            print_json(&response)
        }

        Commands::Dashboard => print_json(&actions::dashboard(state, Utc::now(), today)?),
    }
}
