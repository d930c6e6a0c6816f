use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use crate::config::AppConfig;
use crate::error::SynaptiqError;
use crate::logging::log_timeout;
use super::TextGenerator;

/// API keys used in turn, one per request.
#[derive(Debug, Default)]
pub struct KeyRing {
    keys: Vec<String>,
    next: AtomicUsize,
}

impl KeyRing {
    /// Comma-separated `list` wins; `single` is the fallback.
    pub fn parse(list: Option<&str>, single: Option<&str>) -> Self {
        let mut keys: Vec<String> = list
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect();
        if keys.is_empty() {
            keys.extend(single.map(str::trim).filter(|k| !k.is_empty()).map(String::from));
        }
        KeyRing { keys, next: AtomicUsize::new(0) }
    }

    /// From `GEMINI_API_KEYS`, falling back to `GEMINI_API_KEY`.
    pub fn from_env() -> Self {
        let list = std::env::var("GEMINI_API_KEYS").ok();
        let single = std::env::var("GEMINI_API_KEY").ok();
        Self::parse(list.as_deref(), single.as_deref())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn next_key(&self) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let i = self.next.fetch_add(1, Ordering::Relaxed) % self.keys.len();
        Some(&self.keys[i])
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

fn request_body(prompt: &str) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: [Content { role: "user", parts: [RequestPart { text: prompt }] }],
        generation_config: GenerationConfig { response_mime_type: "application/json" },
    }
}

/// Concatenated text of the first candidate.
fn first_candidate_text(response: GenerateResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: Client,
    api_base: String,
    model: String,
    keys: KeyRing,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(config: &AppConfig, keys: KeyRing) -> Result<Self, SynaptiqError> {
        if keys.is_empty() {
            return Err(SynaptiqError::new(
                "No API key configured. Set GEMINI_API_KEYS or GEMINI_API_KEY",
                "config",
            ));
        }
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let http = Client::builder()
            .timeout(timeout)
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(4)
            .build()?;

        tracing::debug!(model = %config.model, keys = keys.len(), "Gemini client ready");
        Ok(GeminiClient {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            keys,
            timeout,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, SynaptiqError> {
        Self::new(config, KeyRing::from_env())
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    async fn call(&self, prompt: &str) -> Result<String, SynaptiqError> {
        let key = self
            .keys
            .next_key()
            .ok_or_else(|| SynaptiqError::new("No API key available", "config"))?;

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", key)])
            .json(&request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            return Err(SynaptiqError::new(format!("Gemini API returned {}", status), "model_call")
                .with_model(self.model.clone())
                .with_context(preview));
        }

        let parsed: GenerateResponse = response.json().await?;
        first_candidate_text(parsed).ok_or_else(|| {
            SynaptiqError::new("Model returned an empty response", "model_call").with_model(self.model.clone())
        })
    }
}

impl TextGenerator for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, SynaptiqError> {
        let start = Instant::now();
        match timeout(self.timeout, self.call(prompt)).await {
            Ok(result) => {
                tracing::debug!(
                    model = %self.model,
                    latency_ms = start.elapsed().as_millis() as u64,
                    ok = result.is_ok(),
                    "Gemini request finished"
                );
                result
            }
            Err(elapsed) => {
                log_timeout(&self.model, self.timeout.as_secs());
                Err(SynaptiqError::from(elapsed).with_model(self.model.clone()))
            }
        }
    }
}
