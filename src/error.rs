use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unified error type for everything outside input validation.
/// I/O, JSON, config and model-call failures all end up here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynaptiqError {
    pub message: String,
    pub stage: String,
    pub model: Option<String>,
    pub retry_succeeded: bool,
    pub context: Option<String>,
    pub source: Option<String>,
}

impl SynaptiqError {
    /// Create a new error with stage and message
    pub fn new<S: Into<String>>(message: S, stage: &'static str) -> Self {
        SynaptiqError {
            message: message.into(),
            stage: stage.to_string(),
            model: None,
            retry_succeeded: false,
            context: None,
            source: None,
        }
    }

    /// Add model context to the error
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Mark whether a retry succeeded
    pub fn with_retry(mut self, succeeded: bool) -> Self {
        self.retry_succeeded = succeeded;
        self
    }

    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for SynaptiqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)?;
        if let Some(ref model) = self.model {
            write!(f, " (model: {})", model)?;
        }
        if let Some(ref context) = self.context {
            write!(f, " (context: {})", context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (source: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for SynaptiqError {}

impl From<anyhow::Error> for SynaptiqError {
    fn from(err: anyhow::Error) -> Self {
        SynaptiqError::new(err.to_string(), "unknown").with_source("anyhow")
    }
}

impl From<std::io::Error> for SynaptiqError {
    fn from(err: std::io::Error) -> Self {
        SynaptiqError::new(format!("I/O error: {}", err), "io").with_source("std::io")
    }
}

impl From<serde_json::Error> for SynaptiqError {
    fn from(err: serde_json::Error) -> Self {
        SynaptiqError::new(format!("JSON error: {}", err), "json_parse").with_source("serde_json")
    }
}

impl From<toml::de::Error> for SynaptiqError {
    fn from(err: toml::de::Error) -> Self {
        SynaptiqError::new(format!("TOML error: {}", err), "config").with_source("toml")
    }
}

impl From<reqwest::Error> for SynaptiqError {
    fn from(err: reqwest::Error) -> Self {
        SynaptiqError::new(format!("HTTP error: {}", err), "http").with_source("reqwest")
    }
}

impl From<tokio::time::error::Elapsed> for SynaptiqError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        SynaptiqError::new("Operation timed out", "timeout").with_source("tokio::time")
    }
}

/// Field key → messages, in the shape form handlers expect.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Bad user input. Carries every failing field, not just the first one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid input: {}", summarize(.fields))]
pub struct ValidationError {
    pub fields: FieldErrors,
}

fn summarize(fields: &FieldErrors) -> String {
    fields
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn new() -> Self {
        ValidationError { fields: FieldErrors::new() }
    }

    pub fn single<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        let mut err = Self::new();
        err.push(field, message);
        err
    }

    pub fn push<F: Into<String>, M: Into<String>>(&mut self, field: F, message: M) {
        self.fields.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages recorded for one field, if any.
    pub fn messages(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(|m| m.as_slice())
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Default for ValidationError {
    fn default() -> Self {
        Self::new()
    }
}
