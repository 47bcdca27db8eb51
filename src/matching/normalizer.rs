//! 텍스트 정규화
//!
//! 소문자 변환 → 구두점/이모지 제거 → 공백 정리 → 불용어/짧은 토큰 제거 → (선택) 스테밍
//!
//! 스테밍 후에도 불용어를 한 번 더 거르므로 `normalize`는 멱등입니다.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::stemmer;

/// 최소 토큰 길이 (문자 수)
pub const MIN_TOKEN_CHARS: usize = 3;

/// 단어 문자/공백이 아닌 모든 문자
static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("non-word regex is valid"));

/// 러시아어 불용어
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "и", "в", "во", "не", "что", "он", "на", "я", "с", "со", "как", "а", "то", "все", "она",
        "так", "его", "но", "да", "ты", "к", "у", "же", "вы", "за", "бы", "по", "только", "ее",
        "мне", "было", "вот", "от", "меня", "еще", "нет", "о", "из", "ему", "теперь", "когда",
        "даже", "ну", "вдруг", "ли", "если", "уже", "или", "ни", "быть", "был", "него", "до",
        "вас", "нибудь", "опять", "уж", "вам", "ведь", "там", "потом", "себя", "ничего", "ей",
        "может", "они", "тут", "где", "есть", "надо", "ней", "для", "мы", "тебя", "их", "чем",
        "была", "сам", "чтоб", "без", "будто", "чего", "раз", "тоже", "себе", "под", "будет",
        "ж", "тогда", "кто", "этот", "того", "потому", "этого", "какой", "какая", "какое",
        "какие", "совсем", "ним", "здесь", "этом", "один", "почти", "мой", "тем", "чтобы", "нее",
        "сейчас", "были", "куда", "зачем", "всех", "никогда", "можно", "при", "наконец", "два",
        "об", "другой", "хоть", "после", "над", "больше", "тот", "через", "эти", "нас", "про",
        "всего", "них", "много", "разве", "три", "эту", "моя", "впрочем", "хорошо", "свою",
        "этой", "перед", "иногда", "лучше", "чуть", "том", "нельзя", "такой", "им", "более",
        "всегда", "конечно", "всю", "между", "это", "ваш", "ваша", "ваше", "ваши", "мои", "мое",
        "наш", "наша", "свой", "меня", "мной", "вами", "нам", "ими", "оно", "этих", "тех",
        "весь", "вся", "всё", "ещё", "также", "либо", "очень", "пожалуйста", "подскажите",
        "скажите", "хочу", "хотел", "хотела", "могу", "мочь", "ли", "же", "бы",
    ]
    .into_iter()
    .collect()
});

/// 불용어 여부
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

/// 정규화 결과
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedText {
    /// 토큰을 공백으로 이은 텍스트
    pub text: String,
    /// 순서가 유지된 정규화 토큰
    pub tokens: Vec<String>,
}

impl NormalizedText {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// 텍스트 정규화기
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    stemming: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Normalizer {
    /// # Arguments
    /// * `stemming` - 토큰 스테밍 여부
    pub fn new(stemming: bool) -> Self {
        Self { stemming }
    }

    pub fn stemming(&self) -> bool {
        self.stemming
    }

    /// 소문자 변환, 비단어 문자 제거, 공백 정리
    ///
    /// 불용어는 남겨둡니다 (부분 문자열 / 의문사 매칭용).
    pub fn clean(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let stripped = NON_WORD_RE.replace_all(&lowered, "");
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// 정리된 텍스트에서 불용어와 짧은 토큰 제거 (스테밍 없음)
    pub fn words(&self, cleaned: &str) -> Vec<String> {
        cleaned
            .split_whitespace()
            .filter(|w| keep_token(w))
            .map(str::to_string)
            .collect()
    }

    /// 단어 하나 스테밍 (스테밍 비활성 시 그대로)
    pub fn stem(&self, word: &str) -> String {
        if self.stemming {
            stemmer::stem(word)
        } else {
            word.to_string()
        }
    }

    /// 전체 정규화
    pub fn normalize(&self, text: &str) -> NormalizedText {
        let cleaned = self.clean(text);
        self.normalize_cleaned(&cleaned)
    }

    /// 이미 `clean`을 거친 텍스트 정규화
    pub fn normalize_cleaned(&self, cleaned: &str) -> NormalizedText {
        let tokens: Vec<String> = self
            .words(cleaned)
            .iter()
            .map(|w| self.stem(w))
            .filter(|t| keep_token(t))
            .collect();

        NormalizedText {
            text: tokens.join(" "),
            tokens,
        }
    }
}

/// 기본 설정(스테밍 사용)으로 정규화
pub fn normalize(text: &str) -> NormalizedText {
    Normalizer::default().normalize(text)
}

fn keep_token(token: &str) -> bool {
    token.chars().count() >= MIN_TOKEN_CHARS && !is_stop_word(token)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clean_strips_punctuation_and_emoji() {
        let normalizer = Normalizer::default();
        assert_eq!(
            normalizer.clean("  Как   заказать ДОСТАВКУ?!! 🚕 "),
            "как заказать доставку"
        );
    }

    #[test]
    fn test_normalize_removes_stop_words_and_short_tokens() {
        let normalized = Normalizer::new(false).normalize("Как мне оплатить по карте?");
        assert_eq!(normalized.tokens, vec!["оплатить", "карте"]);
        assert_eq!(normalized.text, "оплатить карте");
    }

    #[test]
    fn test_normalize_with_stemming() {
        let normalized = normalize("Как заказать доставку?");
        assert_eq!(normalized.tokens, vec!["заказ", "достав"]);
    }

    #[test]
    fn test_normalize_keeps_digits() {
        assert_eq!(normalize("12345").tokens, vec!["12345"]);
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize("").is_empty());
        assert!(normalize("?? !! 🙂").is_empty());
        assert!(normalize("и в на").is_empty());
    }

    #[test]
    fn test_token_order_preserved() {
        let tokens = normalize("тариф эконом комфорт").tokens;
        assert_eq!(tokens[0], "тариф");
        assert_eq!(tokens.len(), 3);
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(text in "[а-яА-ЯёЁa-zA-Z0-9 ,.!?-]{0,60}") {
            let once = normalize(&text);
            let twice = normalize(&once.text);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_normalize_without_stemming_is_idempotent(text in "[а-яА-Яa-z0-9 ,.!?]{0,60}") {
            let normalizer = Normalizer::new(false);
            let once = normalizer.normalize(&text);
            let twice = normalizer.normalize(&once.text);
            prop_assert_eq!(once, twice);
        }
    }
}
