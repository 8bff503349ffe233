//! Generative-AI suggestion client (OpenAI-compatible chat completions)
//!
//! Returns raw model text; decoding into candidates happens in
//! `services::ai_decode` so the transport stays dumb.
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::Preference,
    services::providers::PROVIDER_TIMEOUT,
};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiClient {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: Option<String>, api_url: String, model: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            model,
        }
    }

    pub fn credentialed(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Asks the model for date-course suggestions matching the preference
    pub async fn generate(&self, preference: &Preference) -> AppResult<Option<String>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AppError::MissingCredential("ai"))?;

        let prompt = build_prompt(preference);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: 0.7,
        };

        let url = format!("{}/chat/completions", self.api_url);
        let response = self
            .http_client
            .post(&url)
            .timeout(PROVIDER_TIMEOUT)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "AI provider returned status {}: {}",
                status, body
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Parse(format!("AI chat payload: {}", e)))?;

        let text = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty());

        tracing::info!(
            has_text = text.is_some(),
            provider = "openai",
            "AI suggestion generated"
        );

        Ok(text)
    }
}

/// Prompt asking for a small JSON array of course suggestions
fn build_prompt(preference: &Preference) -> String {
    format!(
        "Suggest up to 3 date-course ideas as a JSON array. Each item needs \
         title, description, category, duration_minutes, price_tier \
         (cheap|moderate|expensive) and tags.\n\
         Budget: {}\nLocation: {}\nDate: {}\nTime of day: {}\nWeather: {}\n\
         Interests: {}",
        preference.budget,
        preference.location,
        preference.date,
        preference.time_of_day,
        preference.weather.as_deref().unwrap_or("clear"),
        preference.interests.join(", "),
    )
}
