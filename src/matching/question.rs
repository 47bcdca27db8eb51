//! 대표 질문 매처
//!
//! 기본 토큰 겹침(×2)에 의문사, 어순, 도메인 중요 단어 보너스를 더합니다.

use super::normalizer::Normalizer;
use super::overlap::token_overlap;
use super::{PreparedText, QueryContext};

/// 기본 겹침 가중치
pub const BASE_WEIGHT: f32 = 2.0;

/// 의문사 보너스 (질의와 질문 모두에 있을 때)
pub const MARKER_BONUS: f32 = 0.5;

/// 도메인 중요 단어 보너스
pub const IMPORTANT_BONUS: f32 = 1.0;

/// 어순 보너스 하한
const MIN_POSITION_BONUS: f32 = 0.1;

/// 의문사 (불용어 제거 전 텍스트 기준)
const QUESTION_MARKERS: &[&str] = &[
    "как", "что", "где", "когда", "почему", "зачем", "можно", "нужно", "есть", "работает",
    "делать",
];

/// 도메인 중요 단어 (스템 기준 비교)
const IMPORTANT_WORDS: &[&str] = &[
    "доставка", "цена", "стоимость", "тариф", "карта", "баланс", "водитель", "заказ",
];

/// 질문 점수 세부 항목
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QuestionScore {
    pub overlap: f32,
    pub markers: f32,
    pub position: f32,
    pub important: f32,
}

impl QuestionScore {
    pub fn total(&self) -> f32 {
        self.overlap + self.markers + self.position + self.important
    }
}

/// 질문 점수 세부 계산
pub fn score_question_parts(
    query: &QueryContext,
    question: &PreparedText,
    normalizer: &Normalizer,
) -> QuestionScore {
    let overlap = token_overlap(&query.tokens, &question.tokens) * BASE_WEIGHT;

    let markers = QUESTION_MARKERS
        .iter()
        .filter(|m| has_word(&query.cleaned_text, m) && has_word(&question.cleaned, m))
        .count() as f32
        * MARKER_BONUS;

    let position = query
        .tokens
        .iter()
        .enumerate()
        .filter_map(|(i, token)| {
            question
                .tokens
                .iter()
                .position(|t| t == token)
                .map(|j| position_bonus(i, j))
        })
        .sum();

    let important = IMPORTANT_WORDS
        .iter()
        .map(|w| normalizer.stem(w))
        .filter(|stem| query.tokens.contains(stem) && question.tokens.contains(stem))
        .count() as f32
        * IMPORTANT_BONUS;

    QuestionScore {
        overlap,
        markers,
        position,
        important,
    }
}

/// 질문 점수
pub fn score_question(query: &QueryContext, question: &PreparedText, normalizer: &Normalizer) -> f32 {
    score_question_parts(query, question, normalizer).total()
}

/// `max(0.1, 1 − 0.1 × |i − j|)`
fn position_bonus(i: usize, j: usize) -> f32 {
    let distance = i.abs_diff(j) as f32;
    (1.0 - 0.1 * distance).max(MIN_POSITION_BONUS)
}

fn has_word(cleaned: &str, word: &str) -> bool {
    cleaned.split_whitespace().any(|w| w == word)
}

// ============================================================================
// Tests
// ============================================================================
