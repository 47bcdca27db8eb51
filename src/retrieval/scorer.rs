//! 스코어러/랭커
//!
//! 세 부분 점수를 고정 가중치로 결합하고, 신뢰도로 정규화한 뒤 안정 정렬합니다.
//!
//! ```text
//! keyword_norm = keyword_score / (len(keywords) × 6.0)
//! combined     = keyword_norm × W_k + variation × W_v + question × W_q
//! combined    ×= 1.2   (세 부분 점수 모두 > 0)
//! confidence   = combined / (combined + midpoint)
//! ```

use std::cmp::Ordering;

use crate::config::RetrievalConfig;
use crate::knowledge::{Category, KnowledgeRecord};
use crate::matching::{
    score_keywords, score_question, score_variations, token_overlap, Normalizer, PreparedKeyword,
    PreparedText, QueryContext, MAX_TIER_SCORE,
};

// ============================================================================
// Types
// ============================================================================

/// 매칭용으로 사전 정규화된 레코드
///
/// 레코드 자체는 그대로 두고 정규화 결과만 캐시합니다.
#[derive(Debug, Clone)]
pub struct IndexedRecord {
    pub record: KnowledgeRecord,
    pub question: PreparedText,
    pub answer: PreparedText,
    pub variations: Vec<Vec<String>>,
    pub keywords: Vec<PreparedKeyword>,
}

impl IndexedRecord {
    pub fn new(record: KnowledgeRecord, normalizer: &Normalizer) -> Self {
        let question = PreparedText::new(&record.question, normalizer);
        let answer = PreparedText::new(&record.answer, normalizer);
        let variations = record
            .variations
            .iter()
            .map(|v| normalizer.normalize(v).tokens)
            .collect();
        let keywords = record
            .keywords
            .iter()
            .map(|k| PreparedKeyword::new(k, normalizer))
            .collect();

        Self {
            record,
            question,
            answer,
            variations,
            keywords,
        }
    }
}

/// 레코드 하나에 대한 점수
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub record: &'a KnowledgeRecord,
    pub keyword_score: f32,
    pub variation_score: f32,
    pub question_score: f32,
    pub combined_score: f32,
    /// 0.0 ~ 1.0
    pub confidence: f32,
}

// ============================================================================
// Scorer
// ============================================================================

/// 결합 스코어러
#[derive(Debug, Clone)]
pub struct Scorer {
    config: RetrievalConfig,
    normalizer: Normalizer,
}

impl Scorer {
    pub fn new(config: RetrievalConfig) -> Self {
        let normalizer = Normalizer::new(config.stemming);
        Self { config, normalizer }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// 부분 점수 결합
    ///
    /// # Arguments
    /// * `keyword_score` - 키워드 단계 점수 합 (정규화 전)
    /// * `keyword_count` - 레코드 키워드 수
    /// * `variation_score` - 변형 점수
    /// * `question_score` - 질문 점수
    pub fn combine(
        &self,
        keyword_score: f32,
        keyword_count: usize,
        variation_score: f32,
        question_score: f32,
    ) -> f32 {
        let weights = &self.config.weights;

        let keyword_norm = if keyword_count == 0 {
            0.0
        } else {
            keyword_score / (keyword_count as f32 * MAX_TIER_SCORE)
        };

        let mut combined = keyword_norm * weights.keyword
            + variation_score * weights.variation
            + question_score * weights.question;

        if keyword_score > 0.0 && variation_score > 0.0 && question_score > 0.0 {
            combined *= weights.convergence_bonus;
        }

        combined
    }

    /// 결합 점수 → 신뢰도 (0.0 ~ 1.0, 단조 증가)
    pub fn confidence(&self, combined_score: f32) -> f32 {
        if combined_score <= 0.0 {
            return 0.0;
        }
        let midpoint = self.config.confidence_midpoint.max(f32::EPSILON);
        (combined_score / (combined_score + midpoint)).clamp(0.0, 1.0)
    }

    /// 레코드 하나 점수 계산
    ///
    /// `boost`가 레코드 카테고리와 같으면 `category_boost`를 곱합니다.
    pub fn score<'a>(
        &self,
        query: &QueryContext,
        entry: &'a IndexedRecord,
        boost: Option<Category>,
    ) -> ScoredCandidate<'a> {
        let keyword_score = score_keywords(query, &entry.keywords);
        let variation_score = score_variations(&query.tokens, &entry.variations);
        let mut question_score = score_question(query, &entry.question, &self.normalizer);

        if self.config.match_answer {
            question_score +=
                token_overlap(&query.tokens, &entry.answer.tokens) * self.config.weights.answer;
        }

        let mut combined_score = self.combine(
            keyword_score,
            entry.keywords.len(),
            variation_score,
            question_score,
        );

        if boost == Some(entry.record.category) {
            combined_score *= self.config.weights.category_boost;
        }

        ScoredCandidate {
            record: &entry.record,
            keyword_score,
            variation_score,
            question_score,
            combined_score,
            confidence: self.confidence(combined_score),
        }
    }

    /// 전체 랭킹 (결합 점수 내림차순, 동점은 지식베이스 순서)
    pub fn rank<'a, I>(
        &self,
        query: &QueryContext,
        entries: I,
        boost: Option<Category>,
    ) -> Vec<ScoredCandidate<'a>>
    where
        I: IntoIterator<Item = &'a IndexedRecord>,
    {
        let mut candidates: Vec<ScoredCandidate<'a>> = entries
            .into_iter()
            .map(|entry| self.score(query, entry, boost))
            .collect();

        // sort_by는 안정 정렬
        candidates.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(Ordering::Equal)
        });

        candidates
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(
        id: usize,
        question: &str,
        variations: &[&str],
        keywords: &[&str],
        category: Category,
    ) -> IndexedRecord {
        let record = KnowledgeRecord::new(
            id,
            question,
            format!("answer {}", id),
            variations.iter().map(|s| s.to_string()).collect(),
            keywords.iter().map(|s| s.to_string()).collect(),
            category,
        );
        IndexedRecord::new(record, &Normalizer::default())
    }

    fn scorer() -> Scorer {
        Scorer::new(RetrievalConfig::default())
    }

    #[test]
    fn test_combine_normalizes_keyword_score() {
        let scorer = scorer();
        // 6 / (2 × 6) × 6 = 3.0
        assert!((scorer.combine(6.0, 2, 0.0, 0.0) - 3.0).abs() < 1e-6);
        assert_eq!(scorer.combine(6.0, 0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_convergence_bonus() {
        let scorer = scorer();
        let without = 0.5 * 6.0 + 1.0 * 1.5 + 1.0 * 3.0;
        assert!((scorer.combine(6.0, 2, 1.0, 1.0) - without * 1.2).abs() < 1e-5);
        assert!((scorer.combine(6.0, 2, 0.0, 1.0) - (3.0 + 3.0)).abs() < 1e-5);
    }

    #[test]
    fn test_confidence_range() {
        let scorer = scorer();
        assert_eq!(scorer.confidence(0.0), 0.0);
        assert!((scorer.confidence(5.0) - 0.5).abs() < 1e-6);
        assert!(scorer.confidence(1000.0) < 1.0);
        assert!(scorer.confidence(10.0) > scorer.confidence(5.0));
    }

    #[test]
    fn test_delivery_scenario_scores() {
        let scorer = scorer();
        let e = entry(
            0,
            "Как заказать доставку?",
            &[],
            &["доставка", "курьер"],
            Category::Delivery,
        );
        let query = QueryContext::new("доставка", scorer.normalizer());
        let candidate = scorer.score(&query, &e, None);

        assert_eq!(candidate.keyword_score, 6.0);
        assert_eq!(candidate.variation_score, 0.0);
        assert!((candidate.question_score - 3.9).abs() < 1e-5);
        // 3.0 + 3.9 × 3
        assert!((candidate.combined_score - 14.7).abs() < 1e-4);
    }

    #[test]
    fn test_exact_keyword_match_increases_score() {
        let scorer = scorer();
        let query = QueryContext::new("доставка", scorer.normalizer());
        let without = entry(0, "Как заказать доставку?", &[], &["курьер"], Category::Delivery);
        let with = entry(
            0,
            "Как заказать доставку?",
            &[],
            &["курьер", "доставка"],
            Category::Delivery,
        );

        let a = scorer.score(&query, &without, None).combined_score;
        let b = scorer.score(&query, &with, None).combined_score;
        assert!(b > a);
    }

    #[test]
    fn test_bigram_variation_ranks_first() {
        let scorer = scorer();
        let entries = vec![
            entry(
                0,
                "Какие тарифы есть?",
                &["тариф комфорт"],
                &["тариф"],
                Category::Pricing,
            ),
            entry(
                1,
                "Какие тарифы есть?",
                &["тариф эконом"],
                &["тариф"],
                Category::Pricing,
            ),
        ];
        let query = QueryContext::new("тариф эконом", scorer.normalizer());
        let ranked = scorer.rank(&query, &entries, None);

        assert_eq!(ranked[0].record.id, 1);
        assert!(ranked[0].combined_score > ranked[1].combined_score);
    }

    #[test]
    fn test_ties_keep_knowledge_base_order() {
        let scorer = scorer();
        let entries = vec![
            entry(0, "Что такое бонусы?", &[], &["бонус"], Category::General),
            entry(1, "Что такое бонусы?", &[], &["бонус"], Category::General),
            entry(2, "Что такое бонусы?", &[], &["бонус"], Category::General),
        ];
        let query = QueryContext::new("бонусы", scorer.normalizer());
        let ranked = scorer.rank(&query, &entries, None);

        let ids: Vec<usize> = ranked.iter().map(|c| c.record.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_category_boost() {
        let scorer = scorer();
        let e = entry(0, "Как заказать доставку?", &[], &["доставка"], Category::Delivery);
        let query = QueryContext::new("доставка", scorer.normalizer());

        let plain = scorer.score(&query, &e, None).combined_score;
        let boosted = scorer.score(&query, &e, Some(Category::Delivery)).combined_score;
        let other = scorer.score(&query, &e, Some(Category::Pricing)).combined_score;

        assert!((boosted - plain * 1.1).abs() < 1e-4);
        assert_eq!(other, plain);
    }

    #[test]
    fn test_match_answer() {
        let config = RetrievalConfig {
            match_answer: true,
            ..Default::default()
        };
        let answer_scorer = Scorer::new(config);
        let record = KnowledgeRecord::new(
            0,
            "Что делать?",
            "Обратитесь в поддержку через приложение",
            vec![],
            vec![],
            Category::Technical,
        );
        let e = IndexedRecord::new(record, answer_scorer.normalizer());
        let query = QueryContext::new("поддержка", answer_scorer.normalizer());

        assert!(answer_scorer.score(&query, &e, None).question_score > 0.0);
        // 기본 설정은 답변 텍스트를 보지 않음
        assert_eq!(scorer().score(&query, &e, None).question_score, 0.0);
    }
}
