//! Minimal client for the Anthropic Messages API.
//!
//! Only what content generation needs: one blocking-completion call with a
//! system prompt, returning the generated text and token usage.

use crate::error::AppError;
use serde::{Deserialize, Serialize};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// A completed generation: output text plus token usage.
#[derive(Debug)]
pub struct Completion {
    pub text: String,
    pub prompt_tokens: i32,
    pub completion_tokens: i32,
}

impl Completion {
    pub fn total_tokens(&self) -> i32 {
        self.prompt_tokens + self.completion_tokens
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: i32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: i32,
    output_tokens: i32,
}

/// Run one completion against the Messages API.
///
/// # Errors
///
/// Returns `AppError::Generation` on transport failures, non-2xx statuses
/// and undecodable responses. The caller records the message on the
/// generation row before surfacing it.
pub async fn complete(
    api_key: &str,
    model: &str,
    system: Option<&str>,
    prompt: &str,
    temperature: f32,
    max_tokens: i32,
) -> Result<Completion, AppError> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .build()
        .map_err(|e| AppError::Generation(format!("HTTP client error: {}", e)))?;

    let request = MessagesRequest {
        model,
        max_tokens,
        temperature,
        system,
        messages: vec![Message {
            role: "user",
            content: prompt,
        }],
    };

    let response = client
        .post(API_URL)
        .header("x-api-key", api_key)
        .header("anthropic-version", API_VERSION)
        .json(&request)
        .send()
        .await
        .map_err(|e| AppError::Generation(format!("Request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(%status, %body, "model API returned an error");
        return Err(AppError::Generation(format!(
            "model API returned {}",
            status
        )));
    }

    let parsed: MessagesResponse = response
        .json()
        .await
        .map_err(|e| AppError::Generation(format!("Undecodable model response: {}", e)))?;

    let text = parsed
        .content
        .into_iter()
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("");

    Ok(Completion {
        text,
        prompt_tokens: parsed.usage.input_tokens,
        completion_tokens: parsed.usage.output_tokens,
    })
}
