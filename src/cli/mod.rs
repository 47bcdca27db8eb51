//! CLI 모듈
//!
//! taxi-faq CLI 명령어 정의 및 구현

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{default_config_path, get_data_dir, AppConfig, StrategyKind};
use crate::knowledge::load_knowledge_base;
use crate::llm::has_api_key;
use crate::matching::Normalizer;
use crate::retrieval::{RetrievalResult, RetrievalService, StrategyChain};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "taxi-faq")]
#[command(version, about = "택시 고객지원 FAQ 검색", long_about = None)]
pub struct Cli {
    /// 설정 파일 경로 (기본: <로컬 데이터 디렉토리>/.taxi-faq/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 질문에 답변
    Ask {
        /// 사용자 질문
        query: String,

        /// 지식베이스 파일 (설정보다 우선)
        #[arg(long)]
        kb: Option<PathBuf>,

        /// LLM 전략 추가 (API 키 필요)
        #[arg(long)]
        llm: bool,

        /// JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 후보 랭킹과 부분 점수 출력
    Rank {
        /// 사용자 질문
        query: String,

        /// 결과 개수 제한
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// 지식베이스 파일 (설정보다 우선)
        #[arg(long)]
        kb: Option<PathBuf>,
    },

    /// 질문 카테고리 분류
    Classify {
        /// 사용자 질문
        query: String,
    },

    /// 정규화 결과 출력
    Normalize {
        /// 입력 텍스트
        text: String,

        /// 스테밍 끄기
        #[arg(long)]
        no_stem: bool,
    },

    /// 상태 확인
    Status,
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Ask {
            query,
            kb,
            llm,
            json,
        } => cmd_ask(config, &query, kb, llm, json).await,
        Commands::Rank { query, limit, kb } => cmd_rank(config, &query, limit, kb),
        Commands::Classify { query } => cmd_classify(config, &query),
        Commands::Normalize { text, no_stem } => cmd_normalize(&text, no_stem),
        Commands::Status => cmd_status(config, cli.config.as_deref()),
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

/// 답변 명령어 (ask)
///
/// 설정된 전략 체인으로 질문에 답합니다.
async fn cmd_ask(
    mut config: AppConfig,
    query: &str,
    kb: Option<PathBuf>,
    llm: bool,
    json: bool,
) -> Result<()> {
    if kb.is_some() {
        config.knowledge_base = kb;
    }
    if llm && !config.strategies.contains(&StrategyKind::Llm) {
        config.strategies.push(StrategyKind::Llm);
    }

    let service = build_service(&config);
    let chain =
        StrategyChain::from_config(&config, service).context("StrategyChain 초기화 실패")?;
    tracing::debug!("Strategies: {:?}", chain.names());

    let result = chain.retrieve(query).await;

    if json {
        let output = serde_json::to_string_pretty(&result).context("결과 직렬화 실패")?;
        println!("{}", output);
    } else {
        print_result(&result);
    }

    Ok(())
}

/// 랭킹 명령어 (rank)
fn cmd_rank(mut config: AppConfig, query: &str, limit: usize, kb: Option<PathBuf>) -> Result<()> {
    if kb.is_some() {
        config.knowledge_base = kb;
    }

    let service = build_service(&config);
    let ranked = service.rank(query);

    if ranked.is_empty() {
        println!("[!] 지식베이스가 비어 있습니다.");
        return Ok(());
    }

    let context = service.query_context(query);
    println!("[*] 토큰: {}", context.normalized_text);
    println!("[*] 카테고리: {}", service.classify(query));
    println!("[*] 임계값: {:.2}\n", service.config().min_score);

    for (i, candidate) in ranked.iter().take(limit).enumerate() {
        let marker = if service.config().accepts(candidate.combined_score) {
            "OK"
        } else {
            "--"
        };

        println!(
            "{}. [{}] [점수: {:.3}] [신뢰도: {:.3}] #{} ({})",
            i + 1,
            marker,
            candidate.combined_score,
            candidate.confidence,
            candidate.record.id,
            candidate.record.category
        );
        println!("   질문: {}", truncate_text(&candidate.record.question, 80));
        println!(
            "   키워드 {:.2} | 변형 {:.2} | 질문 {:.2}",
            candidate.keyword_score, candidate.variation_score, candidate.question_score
        );
        println!();
    }

    Ok(())
}

/// 분류 명령어 (classify)
fn cmd_classify(config: AppConfig, query: &str) -> Result<()> {
    let service = RetrievalService::empty(config.retrieval);
    println!("{}", service.classify(query));
    Ok(())
}

/// 정규화 명령어 (normalize)
fn cmd_normalize(text: &str, no_stem: bool) -> Result<()> {
    let normalized = Normalizer::new(!no_stem).normalize(text);

    if normalized.is_empty() {
        println!("[!] 남은 토큰이 없습니다.");
    } else {
        println!("{}", normalized.text);
    }

    Ok(())
}

/// 상태 명령어 (status)
fn cmd_status(config: AppConfig, config_path: Option<&Path>) -> Result<()> {
    println!("taxi-faq v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("[*] 데이터 디렉토리: {}", get_data_dir().display());

    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);
    if config_path.exists() {
        println!("[OK] 설정 파일: {}", config_path.display());
    } else {
        println!("[!] 설정 파일 없음 (기본값 사용): {}", config_path.display());
    }

    let strategies: Vec<String> = config
        .strategies
        .iter()
        .map(|s| format!("{:?}", s).to_lowercase())
        .collect();
    println!("[*] 전략: {}", strategies.join(" → "));

    if has_api_key() {
        println!("[OK] API 키: 설정됨");
    } else {
        println!("[!] API 키: 미설정");
        println!("    설정: export GEMINI_API_KEY=your-key");
    }

    let kb_path = config.knowledge_base_path();
    match load_knowledge_base(&kb_path) {
        Ok(records) => {
            let service = RetrievalService::new(records, config.retrieval);
            let stats = service.stats();
            println!(
                "[OK] 지식베이스: {} 건 ({})",
                stats.record_count,
                kb_path.display()
            );
            println!(
                "     변형 {} | 키워드 {}",
                stats.variation_count, stats.keyword_count
            );
            for (category, count) in &stats.by_category {
                println!("     {:<14} {}", category.as_str(), count);
            }
        }
        Err(e) => {
            println!("[!] 지식베이스 로드 실패: {}", e);
        }
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 검색 서비스 생성
///
/// 지식베이스 로드에 실패하면 에러를 기록하고 빈 서비스로 계속합니다.
fn build_service(config: &AppConfig) -> Arc<RetrievalService> {
    let path = config.knowledge_base_path();

    let records = match load_knowledge_base(&path) {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("Knowledge base unavailable: {}", e);
            Vec::new()
        }
    };

    Arc::new(RetrievalService::new(records, config.retrieval.clone()))
}

/// 결과 출력
fn print_result(result: &RetrievalResult) {
    if result.is_answered() {
        println!("[OK] {}", result.answer);
    } else {
        println!("[?] {}", result.answer);
    }

    println!();
    println!(
        "     신뢰도: {:.3} | 카테고리: {} | 출처: {}",
        result.confidence, result.category, result.source
    );

    if let Some(ref question) = result.matched_question {
        println!("     매칭 질문: {}", question);
    }

    if let Some(reason) = result.clarification_reason() {
        tracing::debug!("Clarification reason: {:?}", reason);
    }

    if !result.suggestions.is_empty() {
        println!("     혹시 이런 질문인가요?");
        for suggestion in &result.suggestions {
            println!("       - {}", truncate_text(suggestion, 80));
        }
    }
}

/// 텍스트 자르기 (UTF-8 안전)
fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        cleaned.to_string()
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("привет", 10), "привет");
        assert_eq!(truncate_text("привет мир", 6), "привет...");
        assert_eq!(truncate_text("привет\nмир", 20), "привет мир");
    }

    #[test]
    fn test_build_service_with_missing_file_is_empty() {
        let config = AppConfig {
            knowledge_base: Some(PathBuf::from("/nonexistent/knowledge.json")),
            ..Default::default()
        };
        assert!(build_service(&config).is_empty());
    }

    #[test]
    fn test_build_service_loads_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("knowledge.json");
        std::fs::write(
            &path,
            r#"[{"question": "Как заказать такси?", "answer": "Через приложение."}]"#,
        )
        .unwrap();

        let config = AppConfig {
            knowledge_base: Some(path),
            ..Default::default()
        };
        assert_eq!(build_service(&config).len(), 1);
    }

    #[test]
    fn test_cli_parses_global_config() {
        let cli = Cli::parse_from([
            "taxi-faq",
            "rank",
            "доставка",
            "--limit",
            "3",
            "--config",
            "/tmp/config.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.toml")));
        assert!(matches!(cli.command, Commands::Rank { limit: 3, .. }));
    }
}
