//! 검색 퍼사드
//!
//! 불변 레코드 목록을 한 번 인덱싱한 뒤 질의마다 순수 함수처럼 동작합니다.
//! `Arc`로 공유하며 잠금이 필요 없습니다.

use tracing::debug;

use crate::config::{CategoryMode, RetrievalConfig};
use crate::knowledge::{Category, KnowledgeRecord, KnowledgeStats};
use crate::matching::QueryContext;

use super::category::CategoryClassifier;
use super::result::{ClarificationReason, RetrievalResult, RetrievalState};
use super::scorer::{IndexedRecord, ScoredCandidate, Scorer};

/// 로컬 결과의 `source` 값
pub const LOCAL_SOURCE: &str = "local";

/// FAQ 검색 서비스
#[derive(Debug, Clone)]
pub struct RetrievalService {
    index: Vec<IndexedRecord>,
    scorer: Scorer,
    classifier: CategoryClassifier,
}

impl RetrievalService {
    /// 레코드 목록으로 서비스 생성
    ///
    /// # Arguments
    /// * `records` - 지식베이스 레코드 (순서가 동점 처리 순서)
    /// * `config` - 검색 설정
    pub fn new(records: Vec<KnowledgeRecord>, config: RetrievalConfig) -> Self {
        let scorer = Scorer::new(config);
        let index = records
            .into_iter()
            .map(|record| IndexedRecord::new(record, scorer.normalizer()))
            .collect::<Vec<_>>();

        debug!("Indexed {} knowledge records", index.len());

        Self {
            index,
            scorer,
            classifier: CategoryClassifier::new(),
        }
    }

    /// 빈 지식베이스 서비스 (로드 실패 시)
    pub fn empty(config: RetrievalConfig) -> Self {
        Self::new(Vec::new(), config)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn config(&self) -> &RetrievalConfig {
        self.scorer.config()
    }

    pub fn records(&self) -> impl Iterator<Item = &KnowledgeRecord> {
        self.index.iter().map(|entry| &entry.record)
    }

    pub fn stats(&self) -> KnowledgeStats {
        KnowledgeStats::from_records(self.records())
    }

    /// 질의 정규화
    pub fn query_context(&self, query: &str) -> QueryContext {
        QueryContext::new(query, self.scorer.normalizer())
    }

    /// 질의 카테고리
    pub fn classify(&self, query: &str) -> Category {
        self.classifier.classify(&self.query_context(query))
    }

    /// 전체 후보 랭킹 (진단용)
    pub fn rank(&self, query: &str) -> Vec<ScoredCandidate<'_>> {
        let context = self.query_context(query);
        let category = self.classifier.classify(&context);
        self.rank_context(&context, category)
    }

    fn rank_context(&self, context: &QueryContext, category: Category) -> Vec<ScoredCandidate<'_>> {
        match self.config().category_mode {
            CategoryMode::Label => self.scorer.rank(context, &self.index, None),
            CategoryMode::Boost => self.scorer.rank(context, &self.index, Some(category)),
            CategoryMode::Filter => {
                let has_category = category != Category::General
                    && self.index.iter().any(|e| e.record.category == category);

                if has_category {
                    self.scorer.rank(
                        context,
                        self.index.iter().filter(|e| e.record.category == category),
                        None,
                    )
                } else {
                    debug!("Category filter fallback to all records ({})", category);
                    self.scorer.rank(context, &self.index, None)
                }
            }
        }
    }

    /// 질의 하나 처리
    ///
    /// 빈 지식베이스, 빈 질의, 임계값 미만은 모두 되묻기 결과로 반환합니다.
    pub fn retrieve(&self, query: &str) -> RetrievalResult {
        let config = self.config();
        debug!(state = ?RetrievalState::Received, query = %query);

        if self.index.is_empty() {
            debug!(state = ?RetrievalState::ClarificationNeeded, "Knowledge base is empty");
            return RetrievalResult::clarification(
                config.unavailable_message.clone(),
                ClarificationReason::EmptyKnowledgeBase,
                0.0,
                Category::General,
                LOCAL_SOURCE,
            );
        }

        let context = self.query_context(query);
        let category = self.classifier.classify(&context);
        debug!(
            state = ?RetrievalState::Normalized,
            tokens = ?context.tokens,
            category = %category
        );

        if context.is_empty() {
            debug!(state = ?RetrievalState::ClarificationNeeded, "Query has no tokens");
            return RetrievalResult::clarification(
                config.clarification_message.clone(),
                ClarificationReason::EmptyQuery,
                0.0,
                category,
                LOCAL_SOURCE,
            );
        }

        let ranked = self.rank_context(&context, category);
        let best = match ranked.first() {
            Some(best) => best,
            None => {
                return RetrievalResult::clarification(
                    config.clarification_message.clone(),
                    ClarificationReason::BelowThreshold,
                    0.0,
                    category,
                    LOCAL_SOURCE,
                )
            }
        };

        debug!(
            state = ?RetrievalState::Scored,
            record = best.record.id,
            score = best.combined_score,
            confidence = best.confidence
        );

        if config.accepts(best.combined_score) {
            debug!(state = ?RetrievalState::Answered, record = best.record.id);
            return RetrievalResult::answered(
                best.record.answer.clone(),
                best.confidence,
                Some(best.record.question.clone()),
                category,
                LOCAL_SOURCE,
            );
        }

        let suggestions = ranked
            .iter()
            .filter(|c| c.combined_score > 0.0)
            .take(config.suggestion_count)
            .map(|c| c.record.question.clone())
            .collect();

        debug!(
            state = ?RetrievalState::ClarificationNeeded,
            "Best score {:.3} below threshold {:.3}",
            best.combined_score,
            config.min_score
        );

        RetrievalResult::clarification(
            config.clarification_message.clone(),
            ClarificationReason::BelowThreshold,
            best.confidence,
            category,
            LOCAL_SOURCE,
        )
        .with_suggestions(suggestions)
    }
}

// ============================================================================
// Tests
// ============================================================================
