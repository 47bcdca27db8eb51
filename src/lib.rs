//! taxi-faq - 택시 고객지원 봇 FAQ 검색 코어
//!
//! 러시아어 질의를 정규화하고 키워드/변형/질문 세 가지 부분 점수로
//! FAQ 레코드를 랭킹한 뒤, 임계값을 넘으면 답변을, 아니면 되묻기를 반환합니다.

pub mod cli;
pub mod config;
pub mod knowledge;
pub mod llm;
pub mod matching;
pub mod retrieval;

// Re-exports
pub use config::{get_data_dir, AppConfig, CategoryMode, RetrievalConfig, ScoringWeights};
pub use knowledge::{load_knowledge_base, Category, KnowledgeRecord, KnowledgeStats, LoadError};
pub use llm::{get_api_key, has_api_key, GeminiGenerator, TextGenerator};
pub use matching::{normalize, NormalizedText, Normalizer, QueryContext};
pub use retrieval::{
    CategoryClassifier, ClarificationReason, Outcome, RetrievalResult, RetrievalService,
    RetrievalState, Retriever, StrategyChain,
};
