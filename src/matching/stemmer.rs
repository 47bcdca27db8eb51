//! 러시아어 경량 스테머
//!
//! 외부 형태소 분석기 없이 어미/접두사를 잘라 어근을 근사합니다.
//!
//! 1. 도메인 고빈도 단어의 고정 어근 (`доставка` → `достав`)
//! 2. 남은 길이 ≥ 3을 지키는 가장 긴 굴절 어미 제거
//! 3. 남은 길이 ≥ 4를 지키는 가장 긴 접두사 제거
//!
//! 위 단계를 더 이상 변화가 없을 때까지 반복하므로 `stem(stem(w)) == stem(w)`가 성립합니다.

/// 스템 최소 길이 (문자 수)
pub const MIN_STEM_CHARS: usize = 3;

/// 접두사 제거 후 최소 남은 길이
const MIN_PREFIX_REMAINDER: usize = 4;

/// 고정 어근 - 이 어근으로 시작하는 단어는 어근 그대로 반환
///
/// 각 어근은 자기 자신으로 시작하므로 반복 적용해도 변하지 않습니다.
const FIXED_ROOTS: &[&str] = &[
    "достав", "води", "заказ", "оплат", "тариф", "карт", "отмен", "стои", "поезд", "такси",
    "баланс", "курьер", "возврат", "промокод", "жалоб", "приложен", "маршрут", "адрес",
];

/// 굴절 어미 (가장 긴 일치 우선)
const ENDINGS: &[&str] = &[
    "ившись", "ывшись", "ющими", "ость", "ости", "ение", "ения", "ании", "ание", "ами", "ями",
    "ого", "его", "ому", "ему", "ыми", "ими", "ать", "ять", "ить", "еть", "ает", "яет", "ует",
    "ают", "яют", "ешь", "ишь", "ая", "яя", "ое", "ее", "ые", "ие", "ый", "ий", "ой", "ей", "ом",
    "ем", "ам", "ям", "ах", "ях", "ов", "ев", "ую", "юю", "ит", "ет", "ут", "ют", "а", "я", "о",
    "е", "и", "ы", "у", "ю", "ь", "й",
];

/// 접두사 (가장 긴 일치 우선)
const PREFIXES: &[&str] = &[
    "пере", "пред", "при", "под", "про", "раз", "рас", "без", "бес", "воз", "вос", "над", "пре",
    "вы", "до", "за", "из", "ис", "на", "об", "от", "по", "со",
];

/// 단어 스테밍 (고정점까지 반복)
///
/// 입력은 이미 소문자라고 가정합니다.
pub fn stem(word: &str) -> String {
    let mut current = word.to_string();
    loop {
        let next = stem_step(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// 한 단계 스테밍
///
/// 결과는 입력과 같거나 더 짧고, 최소 길이 아래로는 줄어들지 않습니다.
fn stem_step(word: &str) -> String {
    if word.chars().count() < MIN_STEM_CHARS {
        return word.to_string();
    }

    if let Some(root) = FIXED_ROOTS.iter().find(|root| word.starts_with(*root)) {
        return (*root).to_string();
    }

    let mut result = word;

    let chars = result.chars().count();
    if let Some(ending) = longest_match(ENDINGS, |e| {
        result.ends_with(e) && chars - e.chars().count() >= MIN_STEM_CHARS
    }) {
        result = &result[..result.len() - ending.len()];
    }

    let chars = result.chars().count();
    if let Some(prefix) = longest_match(PREFIXES, |p| {
        result.starts_with(p) && chars - p.chars().count() >= MIN_PREFIX_REMAINDER
    }) {
        result = &result[prefix.len()..];
    }

    if result.chars().count() < MIN_STEM_CHARS {
        return word.to_string();
    }

    result.to_string()
}

fn longest_match<'a>(candidates: &[&'a str], matches: impl Fn(&str) -> bool) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .filter(|c| matches(c))
        .max_by_key(|c| c.chars().count())
}

/// 두 문자열의 공통 접두사 길이 (문자 수)
pub fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_roots() {
        assert_eq!(stem("доставка"), "достав");
        assert_eq!(stem("доставки"), "достав");
        assert_eq!(stem("доставку"), "достав");
        assert_eq!(stem("водитель"), "води");
        assert_eq!(stem("заказать"), "заказ");
    }

    #[test]
    fn test_suffix_stripping() {
        assert_eq!(stem("цена"), "цен");
        assert_eq!(stem("цены"), "цен");
        assert_eq!(stem("работает"), "работ");
    }

    #[test]
    fn test_short_words_untouched() {
        assert_eq!(stem("да"), "да");
        assert_eq!(stem("кот"), "кот");
    }

    #[test]
    fn test_shorter_ending_when_longest_too_greedy() {
        // "ими"를 떼면 한 글자만 남으므로 "и"만 제거
        assert_eq!(stem("сими"), "сим");
    }

    #[test]
    fn test_stem_is_idempotent() {
        for word in [
            "доставками", "приложение", "поездками", "отменить", "новыми", "переоформление",
            "стоимость", "экономом",
        ] {
            let once = stem(word);
            assert_eq!(stem(&once), once, "word: {}", word);
        }
    }

    #[test]
    fn test_common_prefix_len() {
        assert_eq!(common_prefix_len("достав", "доставщ"), 6);
        assert_eq!(common_prefix_len("тариф", "такси"), 2);
        assert_eq!(common_prefix_len("", "abc"), 0);
    }
}
