//! Knowledge Loader - 지식베이스 파일 파서
//!
//! 두 가지 형식을 지원합니다:
//! - JSON: 레코드 배열 또는 `{"faq": [...]}` / `{"records": [...]}` 객체
//! - 텍스트 블록: 빈 줄로 구분된 `Вопрос:` / `Ответ:` ... 라벨 블록
//!
//! 질문이나 답변이 비어 있는 레코드는 경고 후 건너뜁니다.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use super::record::{Category, KnowledgeRecord};

// ============================================================================
// Errors
// ============================================================================

/// 지식베이스 로드 에러
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read knowledge base {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid knowledge base JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Raw Types
// ============================================================================

/// 파일에서 읽은 검증 전 레코드
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub variations: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonKnowledge {
    List(Vec<RawRecord>),
    Faq { faq: Vec<RawRecord> },
    Records { records: Vec<RawRecord> },
}

// ============================================================================
// Loading
// ============================================================================

/// 파일에서 지식베이스 로드
///
/// 확장자가 `.json`이면 JSON으로, 그 외에는 텍스트 블록으로 파싱합니다.
///
/// # Arguments
/// * `path` - 지식베이스 파일 경로
pub fn load_knowledge_base(path: &Path) -> Result<Vec<KnowledgeRecord>, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let raw = if is_json {
        parse_json(&content)?
    } else {
        parse_text_blocks(&content)
    };

    let records = build_records(raw);
    tracing::info!(
        "Loaded knowledge base: {} ({} records)",
        path.display(),
        records.len()
    );

    Ok(records)
}

/// JSON 지식베이스 파싱
pub fn parse_json(content: &str) -> Result<Vec<RawRecord>, LoadError> {
    let parsed: JsonKnowledge = serde_json::from_str(content)?;
    let raw = match parsed {
        JsonKnowledge::List(list) => list,
        JsonKnowledge::Faq { faq } => faq,
        JsonKnowledge::Records { records } => records,
    };
    Ok(raw)
}

/// 필드 라벨 정규식 (러시아어 / 영문 약어)
static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(вопрос|ответ|вариации|варианты|ключевые слова|ключи|категория|q|a|v|k|c)\s*:\s*(.*)$",
    )
    .expect("label regex is valid")
});

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Question,
    Answer,
    Variations,
    Keywords,
    Category,
}

impl Field {
    fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "вопрос" | "q" => Some(Field::Question),
            "ответ" | "a" => Some(Field::Answer),
            "вариации" | "варианты" | "v" => Some(Field::Variations),
            "ключевые слова" | "ключи" | "k" => Some(Field::Keywords),
            "категория" | "c" => Some(Field::Category),
            _ => None,
        }
    }
}

/// 텍스트 블록 지식베이스 파싱
///
/// 블록은 빈 줄로 구분되며, 라벨 없는 줄은 직전 필드에 이어 붙습니다.
/// 답변은 줄바꿈을 유지하고 나머지 필드는 공백으로 잇습니다.
pub fn parse_text_blocks(content: &str) -> Vec<RawRecord> {
    let mut records = Vec::new();
    let mut current = RawRecord::default();
    let mut category = String::new();
    let mut variations = String::new();
    let mut keywords = String::new();
    let mut last_field: Option<Field> = None;

    let mut flush = |current: &mut RawRecord,
                     category: &mut String,
                     variations: &mut String,
                     keywords: &mut String| {
        let touched = !current.question.is_empty()
            || !current.answer.is_empty()
            || !variations.is_empty()
            || !keywords.is_empty();
        if touched {
            let mut record = std::mem::take(current);
            record.variations = split_list(variations, &['|', ';']);
            record.keywords = split_list(keywords, &[',', ';']);
            record.category = (!category.trim().is_empty()).then(|| category.trim().to_string());
            records.push(record);
        }
        category.clear();
        variations.clear();
        keywords.clear();
    };

    for line in content.lines() {
        if line.trim().is_empty() {
            flush(&mut current, &mut category, &mut variations, &mut keywords);
            last_field = None;
            continue;
        }

        let (field, value) = match LABEL_RE
            .captures(line)
            .and_then(|caps| Field::from_label(&caps[1]).map(|f| (f, caps[2].to_string())))
        {
            Some((field, value)) => (Some(field), value),
            None => (None, line.trim().to_string()),
        };

        let target = match field.or(last_field) {
            Some(target) => target,
            None => {
                tracing::debug!("Ignoring unlabelled line: {}", line.trim());
                continue;
            }
        };

        let continuation = field.is_none();
        match target {
            Field::Question => append(&mut current.question, &value, " "),
            Field::Answer => {
                let sep = if continuation { "\n" } else { " " };
                append(&mut current.answer, &value, sep);
            }
            Field::Variations => append(&mut variations, &value, "|"),
            Field::Keywords => append(&mut keywords, &value, ","),
            Field::Category => append(&mut category, &value, " "),
        }
        last_field = Some(target);
    }

    flush(&mut current, &mut category, &mut variations, &mut keywords);
    records
}

/// 검증 후 `KnowledgeRecord`로 변환
///
/// ID는 건너뛴 레코드를 제외한 순서대로 부여됩니다.
pub fn build_records(raw: Vec<RawRecord>) -> Vec<KnowledgeRecord> {
    let mut records = Vec::with_capacity(raw.len());

    for (index, item) in raw.into_iter().enumerate() {
        if item.question.trim().is_empty() || item.answer.trim().is_empty() {
            tracing::warn!(
                "Skipping malformed record #{}: question or answer is empty",
                index
            );
            continue;
        }

        let category = match item.category.as_deref() {
            None => Category::General,
            Some(label) => Category::parse(label).unwrap_or_else(|| {
                tracing::warn!(
                    "Unknown category '{}' in record #{}, using general",
                    label,
                    index
                );
                Category::General
            }),
        };

        records.push(KnowledgeRecord::new(
            records.len(),
            item.question,
            item.answer,
            item.variations,
            item.keywords,
            category,
        ));
    }

    records
}

// ============================================================================
// Helper Functions
// ============================================================================

fn append(target: &mut String, value: &str, sep: &str) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push_str(sep);
    }
    target.push_str(value);
}

fn split_list(text: &str, separators: &[char]) -> Vec<String> {
    text.split(|c| separators.contains(&c))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_json_array() {
        let json = r#"[
            {"question": "Как заказать доставку?", "answer": "В приложении.",
             "keywords": ["доставка", "курьер"], "category": "delivery"},
            {"question": "Сколько стоит?", "answer": "От 100 рублей."}
        ]"#;

        let records = build_records(parse_json(json).unwrap());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category, Category::Delivery);
        assert_eq!(records[0].keywords, vec!["доставка", "курьер"]);
        assert_eq!(records[1].category, Category::General);
        assert!(records[1].variations.is_empty());
    }

    #[test]
    fn test_parse_json_faq_object() {
        let json = r#"{"faq": [{"question": "q", "answer": "a"}]}"#;
        let raw = parse_json(json).unwrap();
        assert_eq!(raw.len(), 1);
    }

    #[test]
    fn test_parse_json_invalid() {
        let result = parse_json("{not json");
        assert!(matches!(result, Err(LoadError::Json(_))));
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let raw = vec![
            RawRecord {
                question: "Где водитель?".into(),
                answer: "".into(),
                ..Default::default()
            },
            RawRecord {
                question: "Как оплатить картой?".into(),
                answer: "Привяжите карту в профиле.".into(),
                category: Some("unknown-topic".into()),
                ..Default::default()
            },
        ];

        let records = build_records(raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 0);
        assert_eq!(records[0].category, Category::General);
    }

    #[test]
    fn test_parse_text_blocks() {
        let text = "\
Вопрос: Как отменить заказ?
Ответ: Нажмите «Отменить» на экране поездки.
Бесплатно в течение 2 минут.
Вариации: отмена заказа | как отменить поездку
Ключевые слова: отмена, отменить
Категория: cancellation

Q: Какие тарифы есть?
A: Эконом, Комфорт и Бизнес.
K: тариф, эконом
";

        let raw = parse_text_blocks(text);
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0].question, "Как отменить заказ?");
        assert_eq!(
            raw[0].answer,
            "Нажмите «Отменить» на экране поездки.\nБесплатно в течение 2 минут."
        );
        assert_eq!(raw[0].variations, vec!["отмена заказа", "как отменить поездку"]);
        assert_eq!(raw[0].keywords, vec!["отмена", "отменить"]);
        assert_eq!(raw[0].category.as_deref(), Some("cancellation"));
        assert_eq!(raw[1].keywords, vec!["тариф", "эконом"]);
        assert_eq!(raw[1].category, None);
    }

    #[test]
    fn test_load_knowledge_base_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(
            &path,
            r#"[{"question": "Как оплатить?", "answer": "Картой или наличными.", "category": "payment"}]"#,
        )
        .unwrap();

        let records = load_knowledge_base(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, Category::Payment);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_knowledge_base(Path::new("/nonexistent/kb.json"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }
}
