//! 검색 결과 타입

use serde::Serialize;

use crate::knowledge::Category;

/// 요청 처리 상태
///
/// `Received → Normalized → Scored → {Answered | ClarificationNeeded}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalState {
    Received,
    Normalized,
    Scored,
    Answered,
    ClarificationNeeded,
}

impl RetrievalState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RetrievalState::Answered | RetrievalState::ClarificationNeeded
        )
    }
}

/// 되묻기 사유
///
/// 모두 정상적인 결과이며 에러가 아닙니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClarificationReason {
    /// 지식베이스가 비어 있음 (로드 실패)
    EmptyKnowledgeBase,
    /// 정규화 후 토큰이 없음
    EmptyQuery,
    /// 최고 후보가 임계값 미만
    BelowThreshold,
}

impl ClarificationReason {
    /// 다른 전략이 답할 여지가 있는 사유인지
    ///
    /// 빈 질의와 빈 지식베이스는 어떤 전략으로도 답하지 않습니다.
    pub fn allows_fallback(&self) -> bool {
        matches!(self, ClarificationReason::BelowThreshold)
    }
}

/// 최종 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Answered,
    ClarificationNeeded(ClarificationReason),
}

/// 검색 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalResult {
    /// 답변 또는 되묻기 문구
    pub answer: String,
    /// 0.0 ~ 1.0
    pub confidence: f32,
    /// 채택된 레코드의 대표 질문
    pub matched_question: Option<String>,
    /// 질의 카테고리 라벨
    pub category: Category,
    pub outcome: Outcome,
    /// 임계값 미만일 때의 근접 후보 질문
    pub suggestions: Vec<String>,
    /// 결과를 만든 전략 이름
    pub source: String,
}

impl RetrievalResult {
    /// 답변 채택 결과
    pub fn answered(
        answer: impl Into<String>,
        confidence: f32,
        matched_question: Option<String>,
        category: Category,
        source: &str,
    ) -> Self {
        Self {
            answer: answer.into(),
            confidence: confidence.clamp(0.0, 1.0),
            matched_question,
            category,
            outcome: Outcome::Answered,
            suggestions: Vec::new(),
            source: source.to_string(),
        }
    }

    /// 되묻기 결과
    pub fn clarification(
        message: impl Into<String>,
        reason: ClarificationReason,
        confidence: f32,
        category: Category,
        source: &str,
    ) -> Self {
        Self {
            answer: message.into(),
            confidence: confidence.clamp(0.0, 1.0),
            matched_question: None,
            category,
            outcome: Outcome::ClarificationNeeded(reason),
            suggestions: Vec::new(),
            source: source.to_string(),
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn is_answered(&self) -> bool {
        self.outcome == Outcome::Answered
    }

    pub fn clarification_reason(&self) -> Option<ClarificationReason> {
        match self.outcome {
            Outcome::Answered => None,
            Outcome::ClarificationNeeded(reason) => Some(reason),
        }
    }

    /// 종료 상태
    pub fn state(&self) -> RetrievalState {
        match self.outcome {
            Outcome::Answered => RetrievalState::Answered,
            Outcome::ClarificationNeeded(_) => RetrievalState::ClarificationNeeded,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
