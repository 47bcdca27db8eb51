//! Retrieval 모듈 - 질의 → 답변 또는 되묻기
//!
//! - Scorer: 부분 점수 결합 + 신뢰도 + 랭킹
//! - CategoryClassifier: 고정 키워드 표 기반 분류
//! - RetrievalService: 상태 전이와 임계값 판정
//! - StrategyChain: 로컬/LLM 전략 순차 시도

mod category;
mod result;
mod scorer;
mod service;
mod strategy;

// Re-exports
pub use category::CategoryClassifier;
pub use result::{ClarificationReason, Outcome, RetrievalResult, RetrievalState};
pub use scorer::{IndexedRecord, ScoredCandidate, Scorer};
pub use service::{RetrievalService, LOCAL_SOURCE};
pub use strategy::{LlmRetriever, LocalRetriever, Retriever, StrategyChain, LLM_SOURCE};
