//! 변형 질문 매처
//!
//! 레코드에 저장된 질문 변형들과 질의를 비교합니다.
//! 토큰 겹침만으로는 "доставка" / "что такое доставка" / "как работает доставка"를
//! 구분하기 어려워 bigram / trigram 겹침을 보너스로 더합니다.

use super::overlap::{ngram_overlap, token_overlap};

/// bigram 겹침 가중치
pub const BIGRAM_WEIGHT: f32 = 0.5;

/// trigram 겹침 가중치
pub const TRIGRAM_WEIGHT: f32 = 1.0;

/// 변형 하나에 대한 점수
pub fn score_variation(query_tokens: &[String], variation_tokens: &[String]) -> f32 {
    let base = token_overlap(query_tokens, variation_tokens);
    let bigrams = ngram_overlap(query_tokens, variation_tokens, 2) as f32 * BIGRAM_WEIGHT;
    let trigrams = if query_tokens.len() >= 3 && variation_tokens.len() >= 3 {
        ngram_overlap(query_tokens, variation_tokens, 3) as f32 * TRIGRAM_WEIGHT
    } else {
        0.0
    };

    base + bigrams + trigrams
}

/// 레코드 변형 점수 (모든 변형의 합)
///
/// # Arguments
/// * `query_tokens` - 정규화된 질의 토큰
/// * `variations` - 정규화된 변형 토큰 목록
pub fn score_variations(query_tokens: &[String], variations: &[Vec<String>]) -> f32 {
    variations
        .iter()
        .map(|v| score_variation(query_tokens, v))
        .sum()
}

// ============================================================================
// Tests
// ============================================================================
