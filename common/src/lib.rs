//! Sample Scan Common Library
//!
//! QR取込セッションとCLIで共有される型・パーサー・マージ処理

pub mod types;
pub mod alias;
pub mod error;
pub mod parser;
pub mod merge;

pub use types::{CandidateRecord, DirectoryRecord, LineItem, Resolution, ResolvedRecord, SourceFormat};
pub use alias::{expand_sample_type, merchant_code, merchant_matches_code};
pub use error::ParseFailure;
pub use parser::parse_payload;
pub use merge::{merge_record, renumber, sort_and_renumber, MergeOutcome, MergeResult};
