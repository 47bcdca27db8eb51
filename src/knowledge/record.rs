//! Knowledge Record - FAQ 엔트리 타입
//!
//! 로드 이후에는 변경되지 않는 읽기 전용 레코드입니다.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Category
// ============================================================================

/// FAQ 토픽 카테고리 (닫힌 집합)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Pricing,
    Booking,
    Payment,
    Technical,
    Delivery,
    Driver,
    Cancellation,
    Complaint,
    #[default]
    General,
}

impl Category {
    /// 분류기 우선순위 순서
    pub const PRIORITY: [Category; 9] = [
        Category::Pricing,
        Category::Booking,
        Category::Payment,
        Category::Technical,
        Category::Delivery,
        Category::Driver,
        Category::Cancellation,
        Category::Complaint,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Pricing => "pricing",
            Category::Booking => "booking",
            Category::Payment => "payment",
            Category::Technical => "technical",
            Category::Delivery => "delivery",
            Category::Driver => "driver",
            Category::Cancellation => "cancellation",
            Category::Complaint => "complaint",
            Category::General => "general",
        }
    }

    /// 라벨 파싱 (영문 라벨 + 러시아어 별칭)
    ///
    /// 알 수 없는 라벨이면 `None`을 반환합니다.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        let category = match label.as_str() {
            "pricing" | "price" | "цены" | "цена" | "тарифы" => Category::Pricing,
            "booking" | "order" | "заказ" | "бронирование" => Category::Booking,
            "payment" | "оплата" => Category::Payment,
            "technical" | "tech" | "техническое" | "техподдержка" => Category::Technical,
            "delivery" | "доставка" => Category::Delivery,
            "driver" | "водитель" | "водители" => Category::Driver,
            "cancellation" | "cancel" | "отмена" => Category::Cancellation,
            "complaint" | "жалоба" | "жалобы" => Category::Complaint,
            "general" | "общее" | "" => Category::General,
            _ => return None,
        };
        Some(category)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// KnowledgeRecord
// ============================================================================

/// FAQ 레코드
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeRecord {
    /// 로드 순서 기반 ID (0부터)
    pub id: usize,
    /// 대표 질문
    pub question: String,
    /// 그대로 반환되는 고정 답변
    pub answer: String,
    /// 질문의 다른 표현들
    pub variations: Vec<String>,
    /// 핵심 키워드 (소문자)
    pub keywords: Vec<String>,
    pub category: Category,
}

impl KnowledgeRecord {
    /// 레코드 생성
    ///
    /// 키워드는 소문자로 정규화되고 빈 항목은 제거됩니다.
    pub fn new(
        id: usize,
        question: impl Into<String>,
        answer: impl Into<String>,
        variations: Vec<String>,
        keywords: Vec<String>,
        category: Category,
    ) -> Self {
        let keywords = keywords
            .into_iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        let variations = variations
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();

        Self {
            id,
            question: question.into().trim().to_string(),
            answer: answer.into().trim().to_string(),
            variations,
            keywords,
            category,
        }
    }
}

/// 지식베이스 통계
#[derive(Debug, Clone, Default, Serialize)]
pub struct KnowledgeStats {
    pub record_count: usize,
    pub variation_count: usize,
    pub keyword_count: usize,
    pub by_category: BTreeMap<Category, usize>,
}

impl KnowledgeStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a KnowledgeRecord>) -> Self {
        let mut stats = Self::default();

        for record in records {
            stats.record_count += 1;
            stats.variation_count += record.variations.len();
            stats.keyword_count += record.keywords.len();
            *stats.by_category.entry(record.category).or_insert(0) += 1;
        }

        stats
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::parse("pricing"), Some(Category::Pricing));
        assert_eq!(Category::parse(" Delivery "), Some(Category::Delivery));
        assert_eq!(Category::parse("отмена"), Some(Category::Cancellation));
        assert_eq!(Category::parse(""), Some(Category::General));
        assert_eq!(Category::parse("weather"), None);
    }

    #[test]
    fn test_category_priority_ends_with_general() {
        assert_eq!(Category::PRIORITY[0], Category::Pricing);
        assert_eq!(Category::PRIORITY[8], Category::General);
    }

    #[test]
    fn test_record_new_normalizes_keywords() {
        let record = KnowledgeRecord::new(
            0,
            " Как заказать такси? ",
            "Через приложение.",
            vec!["".to_string(), "Заказ такси".to_string()],
            vec!["Такси".to_string(), "  ".to_string()],
            Category::Booking,
        );

        assert_eq!(record.question, "Как заказать такси?");
        assert_eq!(record.keywords, vec!["такси".to_string()]);
        assert_eq!(record.variations, vec!["Заказ такси".to_string()]);
    }

    #[test]
    fn test_stats() {
        let records = vec![
            KnowledgeRecord::new(0, "q1", "a1", vec![], vec!["a".into()], Category::Pricing),
            KnowledgeRecord::new(1, "q2", "a2", vec!["v".into()], vec![], Category::Pricing),
            KnowledgeRecord::new(2, "q3", "a3", vec![], vec![], Category::Driver),
        ];

        let stats = KnowledgeStats::from_records(&records);
        assert_eq!(stats.record_count, 3);
        assert_eq!(stats.variation_count, 1);
        assert_eq!(stats.keyword_count, 1);
        assert_eq!(stats.by_category.get(&Category::Pricing), Some(&2));
    }

    #[test]
    fn test_stats_from_iterator() {
        let records = vec![
            KnowledgeRecord::new(0, "q1", "a1", vec![], vec!["a".into()], Category::Pricing),
            KnowledgeRecord::new(1, "q2", "a2", vec![], vec![], Category::Driver),
        ];

        let stats = KnowledgeStats::from_records(records.iter().filter(|r| r.id > 0));
        assert_eq!(stats.record_count, 1);
        assert_eq!(stats.keyword_count, 0);
        assert_eq!(stats.by_category.get(&Category::Pricing), None);
        assert_eq!(KnowledgeStats::from_records(std::iter::empty()).record_count, 0);
    }

    #[test]
    fn test_category_default_is_general() {
        assert_eq!(Category::default(), Category::General);
    }
}
