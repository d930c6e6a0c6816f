use synaptiq_lib::error::{SynaptiqError, ValidationError};

#[test]
fn test_error_creation() {
    let error = SynaptiqError::new("Test error", "test_stage");
    assert_eq!(error.message, "Test error");
    assert_eq!(error.stage, "test_stage");
    assert!(!error.retry_succeeded);
}

#[test]
fn test_error_with_context() {
    let error = SynaptiqError::new("Test error", "test_stage").with_context("Additional context");
    assert_eq!(error.context.as_deref(), Some("Additional context"));
}

#[test]
fn test_error_with_model() {
    let error = SynaptiqError::new("Test error", "test_stage").with_model("gemini-2.5-flash");
    assert_eq!(error.model.as_deref(), Some("gemini-2.5-flash"));
}

#[test]
fn test_error_display() {
    let error = SynaptiqError::new("Test error", "test_stage")
        .with_context("context")
        .with_model("model");
    let display = error.to_string();
    assert!(display.contains("test_stage"));
    assert!(display.contains("Test error"));
    assert!(display.contains("model"));
}

#[test]
fn test_conversions_pick_a_stage() {
    let io: SynaptiqError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert_eq!(io.stage, "io");

    let json: SynaptiqError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert_eq!(json.stage, "json_parse");

    let any: SynaptiqError = anyhow::anyhow!("wrapped").into();
    assert_eq!(any.message, "wrapped");
}

#[test]
fn test_validation_error_collects_fields() {
    let mut err = ValidationError::new();
    assert!(err.clone().into_result().is_ok());

    err.push("hoursPerDay", "Must study at least 30 minutes a day");
    err.push("subjects[0].name", "Subject name is required");
    err.push("subjects[0].name", "again");

    assert_eq!(err.messages("subjects[0].name").unwrap().len(), 2);
    assert!(err.messages("subjects").is_none());
    let text = err.to_string();
    assert!(text.starts_with("invalid input:"));
    assert!(text.contains("hoursPerDay: Must study at least 30 minutes a day"));
    assert!(err.into_result().is_err());
}
