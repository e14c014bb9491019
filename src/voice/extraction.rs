use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::candidate::ExtractionCandidate;
use super::openai::OpenAiClient;
use crate::error::ExtractionError;

/// Transcript -> structured treatment candidate.
///
/// Implementations must only report what the transcript says: anything
/// absent is `None`, never a placeholder.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, transcript: &str) -> Result<ExtractionCandidate, ExtractionError>;

    /// Name for logging
    fn name(&self) -> &str;
}

const SYSTEM_PROMPT: &str = "당신은 미용실 시술 기록을 정리하는 어시스턴트입니다. \
디자이너의 음성 메모에서 시술 정보만 추출하세요. \
메모에 없는 정보는 추측하지 말고 반드시 null로 두세요. \
제품은 브랜드명과 제품 코드를 분리해서 기록하세요. \
예: '로레알 7.1' -> brand='로레알', code='7.1'. \
satisfaction은 high, medium, low 중 하나 또는 null입니다.";

/// JSON schema for strict structured output. Every property is required
/// and nullable, which is how strict mode expresses "optional".
pub fn treatment_schema() -> Value {
    let nullable_string = json!({ "type": ["string", "null"] });

    json!({
        "type": "object",
        "additionalProperties": false,
        "required": [
            "customer_name", "service_type", "products_used", "area",
            "duration_minutes", "satisfaction", "next_visit_recommendation", "summary"
        ],
        "properties": {
            "customer_name": nullable_string,
            "service_type": nullable_string,
            "products_used": {
                "type": ["array", "null"],
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["brand", "code", "area"],
                    "properties": {
                        "brand": nullable_string,
                        "code": nullable_string,
                        "area": nullable_string
                    }
                }
            },
            "area": nullable_string,
            "duration_minutes": { "type": ["integer", "null"] },
            "satisfaction": {
                "type": ["string", "null"],
                "enum": ["high", "medium", "low", null]
            },
            "next_visit_recommendation": nullable_string,
            "summary": nullable_string
        }
    })
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
    refusal: Option<String>,
}

/// Pull the candidate out of a chat completion response body.
fn parse_completion(body: &str) -> Result<ExtractionCandidate, ExtractionError> {
    let completion: ChatCompletion = serde_json::from_str(body)
        .map_err(|e| ExtractionError::Schema(format!("unexpected completion body: {e}")))?;

    let message = completion
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or(ExtractionError::MissingContent)?;

    if let Some(refusal) = message.refusal.filter(|r| !r.trim().is_empty()) {
        return Err(ExtractionError::Refused(refusal));
    }

    let content = message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or(ExtractionError::MissingContent)?;

    ExtractionCandidate::from_json(&content)
}

/// OpenAI chat completions with a strict `json_schema` response format.
pub struct OpenAiExtractor {
    client: OpenAiClient,
    model: String,
}

impl OpenAiExtractor {
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    fn request_body(&self, transcript: &str) -> Value {
        json!({
            "model": self.model,
            "temperature": 0,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": format!("다음 음성 메모에서 시술 정보를 추출하세요:\n\n{transcript}")
                }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "treatment_extraction",
                    "strict": true,
                    "schema": treatment_schema()
                }
            }
        })
    }
}

#[async_trait]
impl Extractor for OpenAiExtractor {
    async fn extract(&self, transcript: &str) -> Result<ExtractionCandidate, ExtractionError> {
        info!(
            "Extracting treatment info with {} ({} chars)",
            self.model,
            transcript.chars().count()
        );

        let response = self
            .client
            .post("chat/completions")
            .json(&self.request_body(transcript))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ExtractionError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        parse_completion(&body)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
