//! Knowledge 모듈 - FAQ 지식베이스
//!
//! - Record: 읽기 전용 FAQ 레코드와 카테고리
//! - Loader: JSON / 텍스트 블록 파일 파서

mod loader;
mod record;

// Re-exports
pub use loader::{
    build_records, load_knowledge_base, parse_json, parse_text_blocks, LoadError, RawRecord,
};
pub use record::{Category, KnowledgeRecord, KnowledgeStats};
