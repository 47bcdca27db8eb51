//! 토큰 겹침 스코어 (TF-IDF 유사 비대칭 겹침 + n-gram)

use std::collections::HashSet;

/// 비대칭 토큰 겹침
///
/// `|common| / |target| × (1 + |common| / |query|)`
///
/// 짧고 밀도 높은 대상 문장이 유리합니다. 중복 토큰은 한 번만 셉니다.
pub fn token_overlap(query: &[String], target: &[String]) -> f32 {
    let query_set: HashSet<&str> = query.iter().map(String::as_str).collect();
    let target_set: HashSet<&str> = target.iter().map(String::as_str).collect();

    if query_set.is_empty() || target_set.is_empty() {
        return 0.0;
    }

    let common = query_set.intersection(&target_set).count() as f32;
    if common == 0.0 {
        return 0.0;
    }

    common / target_set.len() as f32 * (1.0 + common / query_set.len() as f32)
}

/// 공유 n-gram 개수 (서로 다른 n-gram 기준)
pub fn ngram_overlap(a: &[String], b: &[String], n: usize) -> usize {
    if n == 0 || a.len() < n || b.len() < n {
        return 0;
    }

    let grams_a: HashSet<&[String]> = a.windows(n).collect();
    let grams_b: HashSet<&[String]> = b.windows(n).collect();

    grams_a.intersection(&grams_b).count()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_token_overlap_full_match() {
        let q = tokens("тариф экон");
        // 2/2 × (1 + 2/2) = 2.0
        assert!((token_overlap(&q, &q) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_token_overlap_partial() {
        let q = tokens("тариф экон");
        let v = tokens("тариф комфорт");
        // 1/2 × (1 + 1/2) = 0.75
        assert!((token_overlap(&q, &v) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_token_overlap_favors_short_targets() {
        let q = tokens("достав");
        let short = tokens("достав");
        let long = tokens("заказ достав город");
        assert!(token_overlap(&q, &short) > token_overlap(&q, &long));
    }

    #[test]
    fn test_token_overlap_empty() {
        assert_eq!(token_overlap(&[], &tokens("a b")), 0.0);
        assert_eq!(token_overlap(&tokens("a b"), &[]), 0.0);
    }

    #[test]
    fn test_ngram_overlap() {
        let a = tokens("как работ достав");
        let b = tokens("что работ достав город");
        assert_eq!(ngram_overlap(&a, &b, 2), 1);
        assert_eq!(ngram_overlap(&a, &b, 3), 0);
        assert_eq!(ngram_overlap(&a, &a, 3), 1);
        assert_eq!(ngram_overlap(&a, &b, 0), 0);
    }
}
