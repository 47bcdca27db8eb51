//! 검색 전략 체인
//!
//! 설정 순서대로 전략을 시도하고 처음으로 답변을 채택한 결과를 사용합니다.
//! 각 전략 호출은 타임아웃으로 제한되며, 실패/타임아웃은 로그만 남기고 다음 전략으로 넘어갑니다.
//! 빈 질의와 빈 지식베이스는 어떤 전략도 호출하지 않고 바로 되묻기로 끝납니다.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::config::{AppConfig, LlmConfig, StrategyKind};
use crate::llm::{build_support_prompt, has_api_key, GeminiGenerator, TextGenerator};

use super::result::RetrievalResult;
use super::service::RetrievalService;

/// LLM 결과의 `source` 값
pub const LLM_SOURCE: &str = "llm";

// ============================================================================
// Retriever Trait
// ============================================================================

/// 검색 전략 트레이트
#[async_trait]
pub trait Retriever: Send + Sync {
    /// 질의 하나 처리
    async fn retrieve(&self, query: &str) -> Result<RetrievalResult>;

    /// 전략 이름
    fn name(&self) -> &str;
}

// ============================================================================
// Local
// ============================================================================

/// 로컬 FAQ 스코어러 전략 (실패하지 않음)
#[derive(Debug, Clone)]
pub struct LocalRetriever {
    service: Arc<RetrievalService>,
}

impl LocalRetriever {
    pub fn new(service: Arc<RetrievalService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Retriever for LocalRetriever {
    async fn retrieve(&self, query: &str) -> Result<RetrievalResult> {
        Ok(self.service.retrieve(query))
    }

    fn name(&self) -> &str {
        "local"
    }
}

// ============================================================================
// LLM
// ============================================================================

/// 외부 LLM 전략
///
/// 로컬 랭커의 상위 후보를 참고 자료로 프롬프트에 넣습니다.
pub struct LlmRetriever {
    generator: Arc<dyn TextGenerator>,
    service: Arc<RetrievalService>,
    config: LlmConfig,
}

impl LlmRetriever {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        service: Arc<RetrievalService>,
        config: LlmConfig,
    ) -> Self {
        Self {
            generator,
            service,
            config,
        }
    }
}

#[async_trait]
impl Retriever for LlmRetriever {
    async fn retrieve(&self, query: &str) -> Result<RetrievalResult> {
        let prompt = {
            let ranked = self.service.rank(query);
            let context: Vec<_> = ranked
                .iter()
                .filter(|c| c.combined_score > 0.0)
                .take(self.config.context_size)
                .map(|c| c.record)
                .collect();
            build_support_prompt(query, &context)
        };

        let text = self.generator.generate(&prompt).await?;
        if text.trim().is_empty() {
            bail!("{} returned an empty answer", self.generator.name());
        }

        Ok(RetrievalResult::answered(
            text.trim(),
            self.config.confidence,
            None,
            self.service.classify(query),
            LLM_SOURCE,
        ))
    }

    fn name(&self) -> &str {
        LLM_SOURCE
    }
}

// ============================================================================
// Strategy Chain
// ============================================================================

/// 순서가 있는 전략 목록
pub struct StrategyChain {
    strategies: Vec<Arc<dyn Retriever>>,
    timeout: Duration,
    service: Arc<RetrievalService>,
}

impl StrategyChain {
    /// # Arguments
    /// * `strategies` - 시도 순서대로 나열한 전략
    /// * `timeout` - 전략 하나의 최대 실행 시간
    /// * `service` - 모든 전략이 실패했을 때 사용할 로컬 서비스
    pub fn new(
        strategies: Vec<Arc<dyn Retriever>>,
        timeout: Duration,
        service: Arc<RetrievalService>,
    ) -> Self {
        Self {
            strategies,
            timeout,
            service,
        }
    }

    /// 설정으로 체인 구성
    ///
    /// API 키가 없으면 LLM 전략은 건너뜁니다.
    pub fn from_config(config: &AppConfig, service: Arc<RetrievalService>) -> Result<Self> {
        let mut strategies: Vec<Arc<dyn Retriever>> = Vec::new();

        for kind in &config.strategies {
            match kind {
                StrategyKind::Local => {
                    strategies.push(Arc::new(LocalRetriever::new(service.clone())));
                }
                StrategyKind::Llm => {
                    if !has_api_key() {
                        tracing::warn!("LLM strategy skipped: API key not set");
                        continue;
                    }
                    let generator = GeminiGenerator::from_env(config.llm.clone())?;
                    strategies.push(Arc::new(LlmRetriever::new(
                        Arc::new(generator),
                        service.clone(),
                        config.llm.clone(),
                    )));
                }
            }
        }

        Ok(Self::new(strategies, config.strategy_timeout(), service))
    }

    /// 전략 이름 목록
    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// 질의 처리
    ///
    /// 처음 답변한 전략의 결과, 없으면 첫 되묻기 결과를 반환합니다.
    pub async fn retrieve(&self, query: &str) -> RetrievalResult {
        if self.service.is_empty() || self.service.query_context(query).is_empty() {
            return self.service.retrieve(query);
        }

        let mut fallback: Option<RetrievalResult> = None;

        for strategy in &self.strategies {
            match tokio::time::timeout(self.timeout, strategy.retrieve(query)).await {
                Ok(Ok(result)) if result.is_answered() => {
                    tracing::debug!("Strategy '{}' answered", strategy.name());
                    return result;
                }
                Ok(Ok(result)) => {
                    let reason = result.clarification_reason();
                    tracing::debug!(
                        "Strategy '{}' needs clarification: {:?}",
                        strategy.name(),
                        reason
                    );
                    if !reason.is_some_and(|r| r.allows_fallback()) {
                        return result;
                    }
                    if fallback.is_none() {
                        fallback = Some(result);
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!("Strategy '{}' failed: {:#}", strategy.name(), e);
                }
                Err(_) => {
                    tracing::warn!(
                        "Strategy '{}' timed out after {:?}",
                        strategy.name(),
                        self.timeout
                    );
                }
            }
        }

        fallback.unwrap_or_else(|| self.service.retrieve(query))
    }
}

// ============================================================================
// Tests
// ============================================================================
