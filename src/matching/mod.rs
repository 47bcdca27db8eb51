//! Matching 모듈 - 질의와 FAQ 레코드 사이의 부분 점수
//!
//! - Normalizer / Stemmer: 러시아어 정규화와 경량 스테밍
//! - Keyword: 단계별 키워드/어근 매칭
//! - Variation: 변형 질문 겹침 + n-gram
//! - Question: 대표 질문 겹침 + 의문사/어순/중요 단어 보너스

mod keyword;
mod normalizer;
mod overlap;
mod question;
mod stemmer;
mod variation;

// Re-exports
pub use keyword::{match_keyword, score_keywords, MatchTier, PreparedKeyword, MAX_TIER_SCORE};
pub use normalizer::{is_stop_word, normalize, NormalizedText, Normalizer};
pub use overlap::{ngram_overlap, token_overlap};
pub use question::{score_question, score_question_parts, QuestionScore};
pub use stemmer::stem;
pub use variation::{score_variation, score_variations};

// ============================================================================
// Query / Prepared Text
// ============================================================================

/// 요청 하나의 질의 컨텍스트
#[derive(Debug, Clone, PartialEq)]
pub struct QueryContext {
    /// 원본 입력
    pub raw_text: String,
    /// 소문자 + 구두점 제거 (불용어 유지)
    pub cleaned_text: String,
    /// 불용어 제거, 스테밍 전 단어
    pub words: Vec<String>,
    /// `tokens`를 공백으로 이은 텍스트
    pub normalized_text: String,
    /// 정규화 토큰 (순서 유지)
    pub tokens: Vec<String>,
}

impl QueryContext {
    pub fn new(raw_text: &str, normalizer: &Normalizer) -> Self {
        let cleaned_text = normalizer.clean(raw_text);
        let words = normalizer.words(&cleaned_text);
        let normalized = normalizer.normalize_cleaned(&cleaned_text);

        Self {
            raw_text: raw_text.to_string(),
            cleaned_text,
            words,
            normalized_text: normalized.text,
            tokens: normalized.tokens,
        }
    }

    /// 정규화 후 토큰이 하나도 없는지
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// 레코드 쪽 텍스트 (질문/답변/변형) 사전 정규화 결과
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreparedText {
    pub cleaned: String,
    pub tokens: Vec<String>,
}

impl PreparedText {
    pub fn new(text: &str, normalizer: &Normalizer) -> Self {
        let cleaned = normalizer.clean(text);
        let tokens = normalizer.normalize_cleaned(&cleaned).tokens;
        Self { cleaned, tokens }
    }
}

// ============================================================================
// Tests
// ============================================================================
