//! LLM 모듈 - Gemini generateContent API를 통한 답변 생성
//!
//! 로컬 FAQ 점수가 낮을 때 사용하는 보조 전략입니다.
//!
//! ## 사용법
//! ```rust,ignore
//! let generator = GeminiGenerator::from_env(LlmConfig::default())?;
//! let answer = generator.generate("Как оплатить поездку?").await?;
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::knowledge::KnowledgeRecord;

// ============================================================================
// TextGenerator Trait
// ============================================================================

/// 텍스트 생성기 트레이트
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 프롬프트 하나에 대한 응답 텍스트
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// 생성기 이름
    fn name(&self) -> &str;
}

// ============================================================================
// Google Gemini
// ============================================================================

/// Gemini API 베이스 URL
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// 429 에러 시 최대 재시도 횟수
const MAX_RETRIES: u32 = 2;
/// 재시도 시 초기 백오프 (ms)
const INITIAL_BACKOFF_MS: u64 = 500;

/// Google Gemini 텍스트 생성 구현체
#[derive(Debug)]
pub struct GeminiGenerator {
    api_key: String,
    client: reqwest::Client,
    config: LlmConfig,
}

impl GeminiGenerator {
    /// 새 생성기
    ///
    /// # Arguments
    /// * `api_key` - Google AI API 키
    /// * `config` - 모델/타임아웃/생성 설정
    pub fn new(api_key: String, config: LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            api_key,
            client,
            config,
        })
    }

    /// 환경변수에서 API 키를 읽어 생성
    pub fn from_env(config: LlmConfig) -> Result<Self> {
        let api_key = get_api_key()?;
        Self::new(api_key, config)
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_API_BASE, self.config.model)
    }

    fn request(&self, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        }
    }
}

/// generateContent 요청 본문
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
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
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

/// generateContent 응답
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Gemini API 에러 응답
#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
    #[serde(default)]
    status: String,
}

/// 첫 후보의 텍스트 파트를 이어 붙임
fn extract_text(body: &str) -> Result<String> {
    let response: GenerateResponse =
        serde_json::from_str(body).context("Failed to parse generateContent response")?;

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    Ok(text.trim().to_string())
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = self.request(prompt);
        let url = self.endpoint();
        let mut last_error: Option<anyhow::Error> = None;

        // 재시도 루프 (429 에러 시 지수 백오프)
        for attempt in 0..=MAX_RETRIES {
            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&request)
                .send()
                .await
                .context("Failed to send generateContent request")?;

            let status = response.status();
            let body = response
                .text()
                .await
                .context("Failed to read response body")?;

            if status.is_success() {
                return extract_text(&body);
            }

            if status.as_u16() == 429 {
                let backoff = Duration::from_millis(INITIAL_BACKOFF_MS * 2u64.pow(attempt));
                tracing::warn!(
                    "Rate limit hit (429), backing off {:?} (attempt {}/{})",
                    backoff,
                    attempt + 1,
                    MAX_RETRIES
                );
                last_error = Some(anyhow::anyhow!("Rate limit exceeded (429)"));

                if attempt < MAX_RETRIES {
                    tokio::time::sleep(backoff).await;
                    continue;
                }
            } else {
                if let Ok(error) = serde_json::from_str::<GeminiError>(&body) {
                    anyhow::bail!(
                        "Gemini API error ({}): {}",
                        error.error.status,
                        error.error.message
                    );
                }
                anyhow::bail!("Gemini API error ({}): {}", status, body);
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow::anyhow!("Generation failed after {} retries", MAX_RETRIES)))
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}

// ============================================================================
// Prompt
// ============================================================================

/// 지원 봇 프롬프트 구성
///
/// 로컬 랭커의 근접 FAQ를 참고 자료로 넣습니다.
///
/// # Arguments
/// * `query` - 사용자 질문
/// * `context` - 참고할 FAQ 레코드 (점수 순)
pub fn build_support_prompt(query: &str, context: &[&KnowledgeRecord]) -> String {
    let mut prompt = String::from(
        "Ты оператор службы поддержки сервиса такси. \
         Ответь кратко и вежливо на русском языке. \
         Если ответа нет в справке, предложи обратиться в поддержку через приложение.\n",
    );

    if !context.is_empty() {
        prompt.push_str("\nСправка:\n");
        for record in context {
            prompt.push_str(&format!(
                "- Вопрос: {}\n  Ответ: {}\n",
                record.question, record.answer
            ));
        }
    }

    prompt.push_str(&format!("\nВопрос клиента: {}\nОтвет:", query.trim()));
    prompt
}

// ============================================================================
// API Key Management
// ============================================================================

const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_AI_API_KEY"];

/// API 키 로드 (환경변수에서)
///
/// 우선순위:
/// 1. `GEMINI_API_KEY` 환경변수
/// 2. `GOOGLE_AI_API_KEY` 환경변수
pub fn get_api_key() -> Result<String> {
    for var in API_KEY_VARS {
        if let Ok(key) = std::env::var(var) {
            if !key.is_empty() {
                tracing::debug!("Using API key from {}", var);
                return Ok(key);
            }
        }
    }

    anyhow::bail!(
        "API key not found. Set GEMINI_API_KEY or GOOGLE_AI_API_KEY environment variable.\n\
         Get your API key at: https://aistudio.google.com/app/apikey"
    )
}

/// API 키 존재 여부 확인
pub fn has_api_key() -> bool {
    API_KEY_VARS
        .iter()
        .any(|var| std::env::var(var).map(|k| !k.is_empty()).unwrap_or(false))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::Category;

    #[test]
    fn test_request_shape() {
        let generator =
            GeminiGenerator::new("fake_key".to_string(), LlmConfig::default()).unwrap();
        let json = serde_json::to_value(generator.request("привет")).unwrap();

        assert_eq!(json["contents"][0]["parts"][0]["text"], "привет");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 512);
        assert!(generator.endpoint().ends_with("gemini-2.0-flash:generateContent"));
    }

    #[test]
    fn test_extract_text() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Оплатить можно "}, {"text": "картой. "}]}}
            ]
        }"#;
        assert_eq!(extract_text(body).unwrap(), "Оплатить можно картой.");
    }

    #[test]
    fn test_extract_text_without_candidates() {
        assert_eq!(extract_text("{}").unwrap(), "");
        assert_eq!(extract_text(r#"{"candidates": [{}]}"#).unwrap(), "");
        assert!(extract_text("not json").is_err());
    }

    #[test]
    fn test_support_prompt_includes_context() {
        let record = KnowledgeRecord::new(
            0,
            "Как оплатить поездку?",
            "Картой или наличными.",
            vec![],
            vec![],
            Category::Payment,
        );
        let prompt = build_support_prompt("  можно картой?  ", &[&record]);

        assert!(prompt.contains("Вопрос: Как оплатить поездку?"));
        assert!(prompt.contains("Ответ: Картой или наличными."));
        assert!(prompt.ends_with("Вопрос клиента: можно картой?\nОтвет:"));
    }

    #[test]
    fn test_support_prompt_without_context() {
        let prompt = build_support_prompt("привет", &[]);
        assert!(!prompt.contains("Справка"));
    }
}
