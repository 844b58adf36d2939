//! パース失敗の型定義

use thiserror::Error;

/// QRペイロードが既知の形式に一致しない
///
/// 取込中のセッション状態や明細リストには一切影響しない。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("QRコードを読み取れません: {reason}")]
pub struct ParseFailure {
    pub reason: String,
}

impl ParseFailure {
    pub const UNRECOGNIZED_FORMAT: &'static str = "unrecognized format";

    pub fn unrecognized() -> Self {
        Self {
            reason: Self::UNRECOGNIZED_FORMAT.to_string(),
        }
    }
}
