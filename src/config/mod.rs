//! 설정 모듈
//!
//! `<로컬 데이터 디렉토리>/.taxi-faq/config.toml` (없으면 기본값) + 환경변수 오버라이드.
//!
//! ```toml
//! knowledge_base = "/srv/bot/knowledge.json"
//! strategies = ["local", "llm"]
//!
//! [retrieval]
//! min_score = 3.5
//! category_mode = "filter"
//!
//! [retrieval.weights]
//! keyword = 6.0
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// 지식베이스 경로 오버라이드 환경변수
pub const ENV_KNOWLEDGE_BASE: &str = "TAXI_FAQ_KB";

/// 최소 점수 오버라이드 환경변수
pub const ENV_MIN_SCORE: &str = "TAXI_FAQ_MIN_SCORE";

// ============================================================================
// Data Directory
// ============================================================================

/// 데이터 디렉토리 경로
///
/// OS 로컬 데이터 디렉토리 아래 `.taxi-faq/` (Linux: `~/.local/share/.taxi-faq/`).
/// 로컬 데이터 디렉토리를 알 수 없으면 홈 디렉토리를 사용합니다.
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".taxi-faq")
}

/// 기본 설정 파일 경로
pub fn default_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

// ============================================================================
// Retrieval Config
// ============================================================================

/// 부분 점수 가중치
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// 정규화된 키워드 점수 가중치 (지배적 신호)
    pub keyword: f32,
    pub variation: f32,
    pub question: f32,
    /// 답변 텍스트 겹침 가중치 (`match_answer` 사용 시)
    pub answer: f32,
    /// 세 부분 점수가 모두 0이 아닐 때 곱하는 보너스
    pub convergence_bonus: f32,
    /// `boost` 모드에서 같은 카테고리 레코드에 곱하는 값
    pub category_boost: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            keyword: 6.0,
            variation: 1.5,
            question: 3.0,
            answer: 0.5,
            convergence_bonus: 1.2,
            category_boost: 1.1,
        }
    }
}

/// 카테고리 분류 결과 사용 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryMode {
    /// 결과 라벨로만 사용
    #[default]
    Label,
    /// 같은 카테고리 레코드 점수 가산
    Boost,
    /// 같은 카테고리 레코드만 후보로 사용
    Filter,
}

/// 검색 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub weights: ScoringWeights,
    /// 답변 채택 최소 결합 점수 (이상이면 채택)
    pub min_score: f32,
    /// `confidence = score / (score + midpoint)`
    pub confidence_midpoint: f32,
    /// 토큰 스테밍 사용 여부
    pub stemming: bool,
    /// 답변 텍스트도 매칭에 사용
    pub match_answer: bool,
    pub category_mode: CategoryMode,
    /// 낮은 신뢰도일 때 함께 반환할 후보 질문 수
    pub suggestion_count: usize,
    /// 지식베이스가 비었을 때 응답
    pub unavailable_message: String,
    /// 되묻기 응답
    pub clarification_message: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            min_score: 3.5,
            confidence_midpoint: 5.0,
            stemming: true,
            match_answer: false,
            category_mode: CategoryMode::Label,
            suggestion_count: 3,
            unavailable_message: "Сервис временно недоступен. Пожалуйста, попробуйте позже."
                .to_string(),
            clarification_message:
                "Не совсем понял ваш вопрос. Пожалуйста, уточните, что именно вас интересует."
                    .to_string(),
        }
    }
}

impl RetrievalConfig {
    /// 결합 점수가 채택 임계값을 넘는지 (경계값 포함)
    pub fn accepts(&self, combined_score: f32) -> bool {
        combined_score >= self.min_score
    }
}

// ============================================================================
// LLM Config
// ============================================================================

/// 외부 LLM 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Gemini 모델 이름
    pub model: String,
    /// HTTP 요청 타임아웃 (초)
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// LLM 답변에 부여하는 고정 신뢰도
    pub confidence: f32,
    /// 프롬프트에 넣을 FAQ 후보 수
    pub context_size: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            timeout_secs: 15,
            temperature: 0.2,
            max_output_tokens: 512,
            confidence: 0.5,
            context_size: 3,
        }
    }
}

// ============================================================================
// App Config
// ============================================================================

/// 검색 전략 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// 로컬 FAQ 스코어러
    Local,
    /// 외부 LLM
    Llm,
}

/// 전체 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 지식베이스 파일 (없으면 데이터 디렉토리의 knowledge.json)
    pub knowledge_base: Option<PathBuf>,
    /// 시도 순서대로 나열한 검색 전략
    pub strategies: Vec<StrategyKind>,
    /// 전략 하나의 최대 실행 시간 (초)
    pub strategy_timeout_secs: u64,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            knowledge_base: None,
            strategies: vec![StrategyKind::Local],
            strategy_timeout_secs: 10,
            retrieval: RetrievalConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl AppConfig {
    /// 설정 로드
    ///
    /// 경로를 지정하지 않으면 기본 경로를 사용하고, 파일이 없으면 기본값을 씁니다.
    /// 지정한 파일이 없으면 에러입니다.
    ///
    /// # Arguments
    /// * `path` - 설정 파일 경로 (선택)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = default_config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    tracing::debug!("No config file at {:?}, using defaults", default_path);
                    Self::default()
                }
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// TOML 파일에서 로드
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config file: {:?}", path))
    }

    /// TOML 문자열 파싱
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse config TOML")?;
        Ok(config)
    }

    /// 환경변수 오버라이드 적용
    ///
    /// `lookup`은 변수 이름으로 값을 찾는 함수입니다 (테스트에서 주입).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(ENV_KNOWLEDGE_BASE).filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Knowledge base path from {}: {}", ENV_KNOWLEDGE_BASE, path);
            self.knowledge_base = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup(ENV_MIN_SCORE) {
            match raw.trim().parse::<f32>() {
                Ok(value) => self.retrieval.min_score = value,
                Err(e) => tracing::warn!("Ignoring invalid {}='{}': {}", ENV_MIN_SCORE, raw, e),
            }
        }
    }

    /// 실제로 사용할 지식베이스 경로
    pub fn knowledge_base_path(&self) -> PathBuf {
        self.knowledge_base
            .clone()
            .unwrap_or_else(|| get_data_dir().join("knowledge.json"))
    }

    pub fn strategy_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.strategy_timeout_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_data_dir_under_local_data_dir() {
        let data_dir = get_data_dir();
        assert!(data_dir.ends_with(".taxi-faq"));
        if let Some(local) = dirs::data_local_dir() {
            assert_eq!(data_dir, local.join(".taxi-faq"));
        }
        assert_eq!(default_config_path(), data_dir.join("config.toml"));
    }

    #[test]
    fn test_defaults_keep_keyword_dominant() {
        let weights = ScoringWeights::default();
        assert!(weights.keyword > weights.question);
        assert!(weights.keyword > weights.variation);

        let config = AppConfig::default();
        assert_eq!(config.strategies, vec![StrategyKind::Local]);
        assert_eq!(config.retrieval.category_mode, CategoryMode::Label);
    }

    #[test]
    fn test_accepts_boundary() {
        let config = RetrievalConfig::default();
        assert!(config.accepts(config.min_score));
        assert!(!config.accepts(config.min_score - 0.001));
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            strategies = ["local", "llm"]

            [retrieval]
            min_score = 2.0
            category_mode = "filter"

            [retrieval.weights]
            variation = 2.0
            "#,
        )
        .unwrap();

        assert_eq!(config.strategies, vec![StrategyKind::Local, StrategyKind::Llm]);
        assert_eq!(config.retrieval.min_score, 2.0);
        assert_eq!(config.retrieval.category_mode, CategoryMode::Filter);
        assert_eq!(config.retrieval.weights.variation, 2.0);
        // 지정하지 않은 값은 기본값
        assert_eq!(config.retrieval.weights.keyword, 6.0);
        assert_eq!(config.llm.timeout_secs, 15);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(AppConfig::from_toml_str("strategies = [\"nope\"]").is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_KNOWLEDGE_BASE, "/tmp/kb.json"),
            (ENV_MIN_SCORE, "4.25"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.knowledge_base_path(), PathBuf::from("/tmp/kb.json"));
        assert_eq!(config.retrieval.min_score, 4.25);
    }

    #[test]
    fn test_invalid_min_score_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| (key == ENV_MIN_SCORE).then(|| "high".to_string()));
        assert_eq!(config.retrieval.min_score, 3.5);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "strategy_timeout_secs = 3\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.strategy_timeout_secs, 3);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        assert!(AppConfig::load(Some(Path::new("/nonexistent/config.toml"))).is_err());
    }
}
