//! OpenAI-compatible chat completion as the fallback classifier.
//!
//! One request per listing, with a strict JSON schema as the response
//! format. The reply is parsed into [`ModelLabels`]; anything else is a
//! [`ClassifierError::Parse`].

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ClassifierError;
use crate::traits::{ModelLabels, TextClassifier};

use super::rules::DEPARTMENTS;

const SYSTEM_PROMPT: &str = "You classify German hospital physician job listings. \
Respond with JSON only, matching the given schema. \
`description` is one neutral German sentence about the position. \
`department` is one of the allowed labels or null. \
`tags` holds at most five short German keywords (employment type, training level, ward).";

#[derive(Clone)]
pub struct OpenAiClassifier {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClassifier {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ClassifierError::Request(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        })
    }

    /// Set the chat model (default: gpt-4o-mini).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for proxies or compatible APIs).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "description": { "type": "string" },
                "department": {
                    "anyOf": [
                        { "type": "string", "enum": DEPARTMENTS },
                        { "type": "null" }
                    ]
                },
                "tags": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["description", "department", "tags"],
            "additionalProperties": false
        })
    }

    async fn complete(&self, user: String) -> Result<String, ClassifierError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: "job_classification",
                    strict: true,
                    schema: Self::schema(),
                },
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClassifierError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Request(format!(
                "OpenAI returned {}: {}",
                status, error_text
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Parse(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ClassifierError::Parse("empty completion".into()))
    }
}

#[async_trait]
impl TextClassifier for OpenAiClassifier {
    async fn classify(
        &self,
        title: &str,
        employer_name: Option<&str>,
        location: Option<&str>,
    ) -> Result<ModelLabels, ClassifierError> {
        let user = format!(
            "Title: {}\nEmployer: {}\nLocation: {}",
            title,
            employer_name.unwrap_or("-"),
            location.unwrap_or("-"),
        );
        let content = self.complete(user).await?;
        parse_labels(&content)
    }
}

/// Parse the completion, tolerating a Markdown code fence around it.
pub(crate) fn parse_labels(content: &str) -> Result<ModelLabels, ClassifierError> {
    let trimmed = content.trim();
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(json.trim()).map_err(|e| ClassifierError::Parse(e.to_string()))
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: &'static str,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_fenced_json() {
        let plain = r#"{"description":"Stelle in der Kardiologie.","department":"Kardiologie","tags":["Vollzeit"]}"#;
        let labels = parse_labels(plain).unwrap();
        assert_eq!(labels.department.as_deref(), Some("Kardiologie"));

        let fenced = format!("```json\n{}\n```", plain);
        assert_eq!(parse_labels(&fenced).unwrap(), labels);
    }

    #[test]
    fn rejects_prose() {
        assert!(matches!(
            parse_labels("Sure! The department is cardiology."),
            Err(ClassifierError::Parse(_))
        ));
    }
}
