use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::assist::{AssistError, ExpenseParser, ParsedExpense};
use crate::config::AssistConfig;
use crate::domain::{defaults::UNCATEGORIZED_NAME, Category};

/// Parses expenses through the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiParser {
    config: AssistConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GeminiParser {
    pub fn new(config: AssistConfig) -> Result<Self, AssistError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            config,
            client: builder.build()?,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.credential().is_some()
    }

    /// Runs one parse attempt, surfacing the failure reason.
    pub async fn try_parse(
        &self,
        text: &str,
        categories: &[Category],
    ) -> Result<ParsedExpense, AssistError> {
        let api_key = self
            .config
            .credential()
            .ok_or(AssistError::MissingCredential)?;
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        );
        debug!(model = %self.config.model, "requesting expense parse");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&build_request(text, categories))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AssistError::Service {
                status: status.as_u16(),
                body,
            });
        }
        parse_response(&body)
    }
}

#[async_trait]
impl ExpenseParser for GeminiParser {
    async fn parse_expense(&self, text: &str, categories: &[Category]) -> Option<ParsedExpense> {
        if !self.is_enabled() {
            warn!("parsing assist disabled: no API key configured");
            return None;
        }
        match self.try_parse(text, categories).await {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                error!(error = %err, "error parsing expense text");
                None
            }
        }
    }
}

pub fn build_prompt(text: &str, categories: &[Category]) -> String {
    let names = categories
        .iter()
        .map(|category| category.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Parse the following user input to extract expense details.\n\
         The input is: \"{text}\"\n\n\
         Identify the description, the amount, and suggest the most relevant expense \
         category from this list: [{names}].\n\
         If no category seems to fit, suggest \"{UNCATEGORIZED_NAME}\".\n\n\
         Return the result as a JSON object matching the provided schema. Do not include \
         any other text or markdown formatting in your response."
    )
}

/// Output schema with all three fields required.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "description": {
                "type": "STRING",
                "description": "A concise description of the expense."
            },
            "amount": {
                "type": "NUMBER",
                "description": "The numerical amount of the expense."
            },
            "categorySuggestion": {
                "type": "STRING",
                "description": "The name of the most relevant category for this expense from the provided list."
            }
        },
        "required": ["description", "amount", "categorySuggestion"]
    })
}

fn build_request(text: &str, categories: &[Category]) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: Some(build_prompt(text, categories)),
            }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: response_schema(),
        },
    }
}

/// Pulls the first candidate's text out of a response body and decodes it.
fn parse_response(body: &str) -> Result<ParsedExpense, AssistError> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    let text = response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .find_map(|part| part.text)
        .ok_or(AssistError::EmptyResponse)?;
    Ok(serde_json::from_str(text.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoryKind, NewCategory};
    use chrono::Utc;
    use uuid::Uuid;

    fn categories() -> Vec<Category> {
        ["Groceries", "Transport"]
            .into_iter()
            .map(|name| {
                Category::create(
                    Uuid::new_v4(),
                    NewCategory::new(name, "•", "#000000", CategoryKind::Expense),
                    Utc::now(),
                )
            })
            .collect()
    }

    #[test]
    fn prompt_embeds_text_and_category_names() {
        let prompt = build_prompt("taxi to airport 23.40", &categories());
        assert!(prompt.contains("\"taxi to airport 23.40\""));
        assert!(prompt.contains("[Groceries, Transport]"));
        assert!(prompt.contains("suggest \"Uncategorized\""));
    }

    #[test]
    fn request_declares_json_schema() {
        let request = serde_json::to_value(build_request("coffee 3", &categories())).unwrap();
        let config = &request["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(
            config["responseSchema"]["required"],
            json!(["description", "amount", "categorySuggestion"])
        );
        assert!(request["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("coffee 3"));
    }

    #[test]
    fn response_text_is_decoded() {
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [{
                        "text": "{\"description\":\"Taxi\",\"amount\":23.4,\"categorySuggestion\":\"Transport\"}\n"
                    }]
                }
            }]
        })
        .to_string();
        let parsed = parse_response(&body).expect("decoded");
        assert_eq!(parsed.description, "Taxi");
        assert_eq!(parsed.amount, 23.4);
        assert_eq!(parsed.category_suggestion, "Transport");
    }

    #[test]
    fn empty_or_malformed_responses_fail() {
        assert!(matches!(
            parse_response(r#"{"candidates": []}"#),
            Err(AssistError::EmptyResponse)
        ));
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": "not json"}]}}]
        })
        .to_string();
        assert!(matches!(
            parse_response(&body),
            Err(AssistError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn missing_credential_short_circuits() {
        let config = AssistConfig {
            // Unroutable on purpose; a request here would fail loudly.
            endpoint: "http://127.0.0.1:1".into(),
            ..AssistConfig::default()
        };
        let parser = GeminiParser::new(config).unwrap();
        assert!(!parser.is_enabled());
        assert!(matches!(
            parser.try_parse("coffee 3", &categories()).await,
            Err(AssistError::MissingCredential)
        ));
        assert_eq!(parser.parse_expense("coffee 3", &categories()).await, None);
    }
}
