//! Itinerary generation and trip chat against the Gemini REST API.
//!
//! The rest of the crate only sees the [`Recommender`] trait; tests and
//! offline setups substitute their own implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::{
    config::AppConfig,
    error::AppError,
    models::itinerary::{ItineraryOption, ItineraryPlan},
};

/// One participant's preferences joined with their demographic data, the
/// unit the generator reasons over.
#[derive(Debug, Clone, Serialize)]
pub struct TravelerProfile {
    pub age: i64,
    pub gender: String,
    pub home_town: String,
    pub budget: String,
    pub tags: Vec<String>,
    pub dates: String,
}

/// Trip data handed to the chat assistant: the finalized option when one
/// exists, otherwise the candidate set still being voted on.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatContext {
    pub trip_name: String,
    pub travelers: Vec<String>,
    pub final_option: Option<ItineraryOption>,
    pub candidates: Option<ItineraryPlan>,
}

#[async_trait]
pub trait Recommender: Send + Sync {
    async fn generate_plan(&self, travelers: &[TravelerProfile])
        -> Result<ItineraryPlan, AppError>;

    async fn chat_reply(&self, context: &ChatContext, message: &str) -> Result<String, AppError>;
}

pub struct GeminiRecommender {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiRecommender {
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .map_err(|err| AppError::Config(format!("http client: {err}")))?;
        Ok(Self {
            http,
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            base_url: config.gemini_base_url.clone(),
        })
    }

    async fn complete(&self, prompt: &str) -> Result<String, AppError> {
        if self.api_key.is_empty() {
            return Err(AppError::Upstream(
                "Itinerary generator is not configured (missing GEMINI_API_KEY)".into(),
            ));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let body = json!({ "contents": [ { "parts": [ { "text": prompt } ] } ] });

        debug!(model = %self.model, "sending generation request");
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                AppError::Upstream(format!("recommendation service unreachable: {err}"))
            })?;

        let status = response.status();
        let payload: Value = response.json().await.map_err(|err| {
            AppError::Upstream(format!("recommendation service sent garbage: {err}"))
        })?;

        if !status.is_success() {
            let detail = payload
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(AppError::Upstream(format!(
                "recommendation service error ({status}): {detail}"
            )));
        }

        payload
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| AppError::Upstream("recommendation service returned no content".into()))
    }
}

#[async_trait]
impl Recommender for GeminiRecommender {
    async fn generate_plan(
        &self,
        travelers: &[TravelerProfile],
    ) -> Result<ItineraryPlan, AppError> {
        let prompt = build_plan_prompt(travelers)?;
        let text = self.complete(&prompt).await?;
        ItineraryPlan::parse(&text)
    }

    async fn chat_reply(&self, context: &ChatContext, message: &str) -> Result<String, AppError> {
        let prompt = build_chat_prompt(context, message)?;
        self.complete(&prompt).await
    }
}

fn build_plan_prompt(travelers: &[TravelerProfile]) -> Result<String, AppError> {
    let data = serde_json::to_string_pretty(travelers)
        .map_err(|err| AppError::Other(anyhow::anyhow!("serialize traveler data: {err}")))?;
    Ok(format!(
        r#"SYSTEM INSTRUCTION:
You are an expert AI travel agent specializing in personalized group travel.

YOUR GOAL:
Analyze the provided USER DATA and generate exactly TWO distinct trip itineraries.

ANALYSIS GUIDELINES:
1. Origin: look at each traveler's home_town. If the majority share a country, prefer destinations within it unless the tags ask for international travel.
2. Change of scene: the destination must differ from their home towns.
3. Demographics: use age and gender composition to balance energy, comfort and safety.
4. Underrated gems: skip the obvious tourist traps in favor of high-value, budget-friendly alternatives.

THE TWO OPTIONS:
- Option 1 (The Crowd Pleaser): a balanced choice that statistically fits the majority of budgets, tags and dates.
- Option 2 (The Underrated Wildcard): a less commercialized gem that fits the budget but offers a distinct experience.

OUTPUT FORMAT:
Return ONLY valid JSON. No markdown.

JSON Schema:
{{
  "analysis_summary": "Brief text explaining how you weighed ages, genders and origins...",
  "options": [
    {{
      "id": 1,
      "title": "Name of the trip",
      "location": "City, State/Country",
      "total_estimated_cost": "15,000 per person",
      "vibe_match": "Nature & Chill",
      "why_its_perfect": "Explanation relative to the group...",
      "itinerary": [
        {{ "day": 1, "activity": "..." }},
        {{ "day": 2, "activity": "..." }}
      ]
    }},
    {{ "id": 2, "title": "...", "location": "...", "total_estimated_cost": "...", "vibe_match": "...", "why_its_perfect": "...", "itinerary": [] }}
  ]
}}

USER DATA TO PROCESS:
{data}
"#
    ))
}

fn build_chat_prompt(context: &ChatContext, message: &str) -> Result<String, AppError> {
    let context_json = serde_json::to_string_pretty(context)
        .map_err(|err| AppError::Other(anyhow::anyhow!("serialize chat context: {err}")))?;
    Ok(format!(
        r#"You are the trip assistant for the group trip "{name}". Answer the
traveler's question using only the TRIP DATA below (itinerary, people,
budget). Be concise and friendly; if the data does not answer the
question, say so instead of inventing details.

TRIP DATA:
{context_json}

QUESTION:
{message}
"#,
        name = context.trip_name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn traveler() -> TravelerProfile {
        TravelerProfile {
            age: 24,
            gender: "Female".into(),
            home_town: "Pune".into(),
            budget: "Mid-Range".into(),
            tags: vec!["Beach".into(), "Food".into()],
            dates: "2026-09-01 to 2026-09-05".into(),
        }
    }

    #[test]
    fn plan_prompt_embeds_traveler_data_and_schema() {
        let prompt = build_plan_prompt(&[traveler()]).expect("prompt builds");
        assert!(prompt.contains("\"home_town\": \"Pune\""));
        assert!(prompt.contains("analysis_summary"));
        assert!(prompt.contains("Crowd Pleaser"));
        assert!(prompt.contains("Underrated Wildcard"));
    }

    #[test]
    fn chat_prompt_embeds_trip_context_and_question() {
        let context = ChatContext {
            trip_name: "Goa Getaway".into(),
            travelers: vec!["Asha".into(), "Ben".into()],
            final_option: None,
            candidates: None,
        };
        let prompt = build_chat_prompt(&context, "What is the budget?").expect("prompt builds");
        assert!(prompt.contains("Goa Getaway"));
        assert!(prompt.contains("What is the budget?"));
        assert!(prompt.contains("Asha"));
    }
}
