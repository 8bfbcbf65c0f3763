use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::logging::{log, obj, v_num, v_str, Level};
use crate::provider::TextProvider;

pub struct Gemini {
    client: Client,
    base: String,
    model: String,
    api_key: Option<String>,
}

impl Gemini {
    pub fn new(cfg: &Config) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            base: cfg.gemini_base.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
        })
    }

    fn endpoint(&self, key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base, self.model, key
        )
    }

    async fn call(&self, body: &GenerateRequest) -> Result<String> {
        let key = self.api_key.as_ref().ok_or_else(|| anyhow!("missing GEMINI_API_KEY"))?;
        let url = self.endpoint(key);

        let resp = self.client.post(&url).json(body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let err: GeminiError = serde_json::from_str(&text).unwrap_or(GeminiError {
                error: GeminiErrorDetail { code: status.as_u16() as i64, message: text.clone() },
            });
            return Err(anyhow!(
                "gemini request failed: {} - {}",
                err.error.code,
                err.error.message
            ));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)?;
        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("empty candidates in gemini response"))?;
        let payload: String = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect();

        log(
            Level::Debug,
            "provider",
            "gemini_response",
            obj(&[("model", v_str(&self.model)), ("payload_len", v_num(payload.len() as f64))]),
        );
        Ok(payload)
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    code: i64,
    message: String,
}

fn prompt_body(prompt: &str) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content { parts: vec![Part { text: prompt.to_string() }] }],
        generation_config: None,
    }
}

#[async_trait::async_trait]
impl TextProvider for Gemini {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.call(&prompt_body(prompt)).await
    }

    async fn generate_structured(&self, prompt: &str, schema: &Value) -> Result<String> {
        let mut body = prompt_body(prompt);
        body.generation_config = Some(GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: schema.clone(),
        });
        self.call(&body).await
    }
}
