//! 키워드/어근 매처
//!
//! 키워드마다 아래 단계를 순서대로 시도하고 처음 일치한 단계의 점수만 더합니다.
//! 같은 키워드에 대해 약한 단계가 강한 단계보다 먼저 잡히는 일은 없습니다.
//!
//! | 단계 | 조건 | 점수 |
//! |------|------|------|
//! | Exact | 정리된 질의에 키워드가 부분 문자열로 존재 | 6.0 |
//! | Stem | 키워드 스템이 모두 질의 토큰에 존재 | 5.0 |
//! | StemPrefix | 스템 앞 4글자 이상 공유 | 4.0 |
//! | Inflected | 키워드 + 격어미 형태가 질의 단어와 일치 | 3.0 |
//! | Substring | 질의 단어와 양방향 포함 관계 | 2.0 |
//! | Phonetic | 혼동 자음 표 기반 유사도 ≥ 70% | 1.5 |

use super::normalizer::Normalizer;
use super::stemmer::common_prefix_len;
use super::QueryContext;

/// 가장 높은 단계 점수 (키워드 점수 정규화용)
pub const MAX_TIER_SCORE: f32 = MatchTier::Exact.score();

/// 스템 접두사 일치에 필요한 최소 공유 길이
const STEM_PREFIX_CHARS: usize = 4;

/// 음성 유사도 임계값 (짧은 스템 길이 대비)
const PHONETIC_THRESHOLD: f32 = 0.7;

/// 굴절형 생성용 격어미
const CASE_ENDINGS: &[&str] = &[
    "а", "я", "у", "ю", "ы", "и", "е", "ой", "ей", "ом", "ем", "ам", "ям", "ами", "ями", "ах",
    "ях", "ов", "ев",
];

const VOWELS: &[char] = &['а', 'я', 'о', 'е', 'ё', 'и', 'ы', 'у', 'ю', 'ь', 'й'];

/// 혼동 가능한 자음 그룹
const CONFUSABLE_GROUPS: &[&[char]] = &[
    &['к', 'г', 'х'],
    &['п', 'б'],
    &['т', 'д'],
    &['с', 'з', 'ц'],
    &['ф', 'в'],
    &['ш', 'щ', 'ж'],
    &['ч', 'щ'],
];

// ============================================================================
// Types
// ============================================================================

/// 키워드 매칭 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Exact,
    Stem,
    StemPrefix,
    Inflected,
    Substring,
    Phonetic,
}

impl MatchTier {
    pub const fn score(&self) -> f32 {
        match self {
            MatchTier::Exact => 6.0,
            MatchTier::Stem => 5.0,
            MatchTier::StemPrefix => 4.0,
            MatchTier::Inflected => 3.0,
            MatchTier::Substring => 2.0,
            MatchTier::Phonetic => 1.5,
        }
    }
}

/// 매칭 준비가 끝난 키워드
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedKeyword {
    /// 정리된 키워드 텍스트
    pub text: String,
    /// 키워드 스템 (불용어/짧은 단어 제외)
    pub stems: Vec<String>,
}

impl PreparedKeyword {
    pub fn new(keyword: &str, normalizer: &Normalizer) -> Self {
        let text = normalizer.clean(keyword);
        let stems = normalizer.normalize_cleaned(&text).tokens;
        Self { text, stems }
    }

    fn is_single_word(&self) -> bool {
        !self.text.contains(' ')
    }
}

// ============================================================================
// Matching
// ============================================================================

/// 키워드 하나에 대해 가장 강한 단계 찾기
pub fn match_keyword(query: &QueryContext, keyword: &PreparedKeyword) -> Option<MatchTier> {
    if keyword.text.is_empty() {
        return None;
    }

    if query.cleaned_text.contains(&keyword.text) {
        return Some(MatchTier::Exact);
    }

    if !keyword.stems.is_empty() {
        if keyword.stems.iter().all(|s| query.tokens.contains(s)) {
            return Some(MatchTier::Stem);
        }

        let prefix_match = keyword
            .stems
            .iter()
            .all(|s| query.tokens.iter().any(|t| shares_stem_prefix(s, t)));
        if prefix_match {
            return Some(MatchTier::StemPrefix);
        }
    }

    if keyword.is_single_word()
        && inflected_forms(&keyword.text)
            .iter()
            .any(|f| query.words.contains(f))
    {
        return Some(MatchTier::Inflected);
    }

    if keyword.text.chars().count() >= 3 {
        let contained = query
            .words
            .iter()
            .any(|w| w.contains(&keyword.text) || keyword.text.contains(w.as_str()));
        if contained {
            return Some(MatchTier::Substring);
        }
    }

    if let [stem] = keyword.stems.as_slice() {
        if query.tokens.iter().any(|t| phonetically_similar(stem, t)) {
            return Some(MatchTier::Phonetic);
        }
    }

    None
}

/// 레코드 키워드 점수 (단계 점수 합)
pub fn score_keywords(query: &QueryContext, keywords: &[PreparedKeyword]) -> f32 {
    keywords
        .iter()
        .filter_map(|k| match_keyword(query, k))
        .map(|tier| tier.score())
        .sum()
}

// ============================================================================
// Helper Functions
// ============================================================================

fn shares_stem_prefix(a: &str, b: &str) -> bool {
    a.chars().count() >= STEM_PREFIX_CHARS
        && b.chars().count() >= STEM_PREFIX_CHARS
        && common_prefix_len(a, b) >= STEM_PREFIX_CHARS
}

/// 키워드 굴절형 생성
///
/// 키워드 자체와, 모음으로 끝나면 마지막 모음을 뗀 형태에 격어미를 붙입니다.
fn inflected_forms(keyword: &str) -> Vec<String> {
    let mut bases = vec![keyword.to_string()];
    if let Some(last) = keyword.chars().last() {
        if VOWELS.contains(&last) {
            let trimmed: String = keyword.chars().take(keyword.chars().count() - 1).collect();
            if trimmed.chars().count() >= 2 {
                bases.push(trimmed);
            }
        }
    }

    bases
        .iter()
        .flat_map(|base| CASE_ENDINGS.iter().map(move |ending| format!("{}{}", base, ending)))
        .filter(|form| form != keyword)
        .collect()
}

fn confusable(a: char, b: char) -> bool {
    CONFUSABLE_GROUPS
        .iter()
        .any(|group| group.contains(&a) && group.contains(&b))
}

/// 음성 유사도 (일치 1.0, 혼동 자음 0.5)
pub fn phonetic_similarity(a: &str, b: &str) -> f32 {
    a.chars()
        .zip(b.chars())
        .map(|(x, y)| {
            if x == y {
                1.0
            } else if confusable(x, y) {
                0.5
            } else {
                0.0
            }
        })
        .sum()
}

fn phonetically_similar(a: &str, b: &str) -> bool {
    let shorter = a.chars().count().min(b.chars().count());
    if shorter < 3 {
        return false;
    }
    phonetic_similarity(a, b) >= PHONETIC_THRESHOLD * shorter as f32
}

// ============================================================================
// Tests
// ============================================================================
