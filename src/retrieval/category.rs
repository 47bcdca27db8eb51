//! 카테고리 분류기
//!
//! 고정 키워드 표를 우선순위 순서로 확인하고 처음 일치한 카테고리를 반환합니다.
//! 표의 항목은 단어 접두사로 비교하며, 공백이 있는 항목은 부분 문자열로 비교합니다.

use crate::knowledge::Category;
use crate::matching::QueryContext;

/// 카테고리별 키워드 표 (우선순위 순서)
const CATEGORY_TABLE: &[(Category, &[&str])] = &[
    (
        Category::Pricing,
        &[
            "цена", "цены", "цену", "стоимост", "стоит", "сколько", "тариф", "прайс", "расценк",
            "скидк", "промокод", "дешев", "дорого",
        ],
    ),
    (
        Category::Booking,
        &[
            "заказать", "закажу", "вызвать", "вызов", "забронир", "бронь", "подать машину",
            "подача", "предварительн",
        ],
    ),
    (
        Category::Payment,
        &[
            "оплат", "платеж", "платёж", "заплатить", "карт", "наличн", "баланс", "списа", "чек",
            "возврат", "деньги",
        ],
    ),
    (
        Category::Technical,
        &[
            "приложени", "ошибк", "не работает", "сбой", "обновлени", "вылета", "баг", "зависа",
            "не грузит", "логин", "пароль", "аккаунт", "войти", "регистрац",
        ],
    ),
    (
        Category::Delivery,
        &["доставк", "доставить", "курьер", "посылк", "груз", "отправить"],
    ),
    (
        Category::Driver,
        &["водител", "шофер", "шофёр", "таксист", "машин", "автомобил"],
    ),
    (Category::Cancellation, &["отмен", "отказ", "передумал"]),
    (
        Category::Complaint,
        &[
            "жалоб", "пожаловаться", "грубо", "хамств", "недовол", "плохо", "ужасн", "претензи",
        ],
    ),
    (
        Category::General,
        &["привет", "здравствуй", "помощь", "помоги", "спасибо", "вопрос", "информаци"],
    ),
];

/// 카테고리 분류기
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryClassifier;

impl CategoryClassifier {
    pub fn new() -> Self {
        Self
    }

    /// 질의 카테고리 분류 (일치 없으면 `General`)
    pub fn classify(&self, query: &QueryContext) -> Category {
        CATEGORY_TABLE
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| matches_query(query, k)))
            .map(|(category, _)| *category)
            .unwrap_or(Category::General)
    }

    /// 카테고리의 키워드 목록
    pub fn keywords(&self, category: Category) -> &'static [&'static str] {
        CATEGORY_TABLE
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, keywords)| *keywords)
            .unwrap_or(&[])
    }
}

fn matches_query(query: &QueryContext, keyword: &str) -> bool {
    if keyword.contains(' ') {
        query.cleaned_text.contains(keyword)
    } else {
        query
            .cleaned_text
            .split_whitespace()
            .any(|w| w.starts_with(keyword))
    }
}

// ============================================================================
// Tests
// ============================================================================
