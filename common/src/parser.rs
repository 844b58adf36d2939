//! QRペイロードパーサー
//!
//! カメラのデコーダから得た文字列を取込候補に変換する。
//!
//! 受け付ける形式（この順に試す）:
//! 1. JSONオブジェクト `{"designNo": ..., "qrCodeId": ..., "merchant"?: ..., "productionSampleType"?: ...}`
//! 2. 区切り形式 `TYPECODE|DESIGNNO|MERCHANTCODE`

use crate::alias::expand_sample_type;
use crate::error::ParseFailure;
use crate::types::{CandidateRecord, SourceFormat};
use serde_json::{Map, Value};

/// 区切り形式の区切り文字
pub const FIELD_DELIMITER: char = '|';

/// 区切り形式のフィールド数
const DELIMITED_FIELD_COUNT: usize = 3;

/// QRペイロードをパース
///
/// どちらの形式にも一致しない場合は `ParseFailure` を返す。
/// デコーダが付ける前後の空白・改行は無視する。
///
/// # Examples
/// ```
/// use sample_scan_common::{parse_payload, SourceFormat};
///
/// let record = parse_payload("HG|A1001|ACMECO").unwrap();
/// assert_eq!(record.external_id, "ACMECO_A1001_HG");
/// assert_eq!(record.source_format, SourceFormat::Delimited);
/// ```
pub fn parse_payload(raw: &str) -> Result<CandidateRecord, ParseFailure> {
    let text = raw.trim();

    if let Some(record) = parse_structured(text) {
        return Ok(record);
    }

    if let Some(record) = parse_delimited(text) {
        return Ok(record);
    }

    Err(ParseFailure::unrecognized())
}

/// JSON形式をパース
///
/// `designNo` と `qrCodeId` が空でなければ成功。
fn parse_structured(text: &str) -> Option<CandidateRecord> {
    let value: Value = serde_json::from_str(text).ok()?;
    let object = value.as_object()?;

    let design_number = field_text(object, "designNo").filter(|s| !s.is_empty())?;
    let external_id = field_text(object, "qrCodeId").filter(|s| !s.is_empty())?;

    Some(CandidateRecord {
        merchant: field_text(object, "merchant").unwrap_or_default(),
        sample_type: field_text(object, "productionSampleType").unwrap_or_default(),
        design_number,
        external_id,
        source_format: SourceFormat::Json,
    })
}

/// 文字列・数値のフィールドを文字列で取り出す
fn field_text(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 区切り形式をパース
///
/// 外部IDは `MERCHANTCODE_DESIGNNO_TYPECODE` で、同じタグからは常に同じIDになる。
fn parse_delimited(text: &str) -> Option<CandidateRecord> {
    let fields: Vec<&str> = text.split(FIELD_DELIMITER).collect();
    if fields.len() != DELIMITED_FIELD_COUNT {
        return None;
    }

    let (type_code, design_number, merchant_code) = (fields[0], fields[1], fields[2]);

    Some(CandidateRecord {
        merchant: merchant_code.to_string(),
        sample_type: expand_sample_type(type_code),
        design_number: design_number.to_string(),
        external_id: format!("{}_{}_{}", merchant_code, design_number, type_code),
        source_format: SourceFormat::Delimited,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================
    // JSON形式
    // =============================================

    #[test]
    fn test_parse_structured_minimal() {
        let record = parse_payload(r#"{"designNo":"A1001","qrCodeId":"X1"}"#).unwrap();
        assert_eq!(record.design_number, "A1001");
        assert_eq!(record.external_id, "X1");
        assert_eq!(record.merchant, "");
        assert_eq!(record.sample_type, "");
        assert_eq!(record.source_format, SourceFormat::Json);
    }

    #[test]
    fn test_parse_structured_full() {
        let raw = r#"{
            "merchant": "Acme Corp",
            "productionSampleType": "Swatch Card",
            "designNo": "D-77",
            "qrCodeId": "65f0c1"
        }"#;

        let record = parse_payload(raw).unwrap();
        assert_eq!(record.merchant, "Acme Corp");
        assert_eq!(record.sample_type, "Swatch Card");
        assert_eq!(record.design_number, "D-77");
        assert_eq!(record.external_id, "65f0c1");
    }

    #[test]
    fn test_parse_structured_numeric_fields() {
        let record = parse_payload(r#"{"designNo":1001,"qrCodeId":42}"#).unwrap();
        assert_eq!(record.design_number, "1001");
        assert_eq!(record.external_id, "42");
    }

    #[test]
    fn test_parse_structured_missing_required() {
        assert!(parse_payload(r#"{"designNo":"A1001"}"#).is_err());
        assert!(parse_payload(r#"{"qrCodeId":"X1"}"#).is_err());
        assert!(parse_payload(r#"{"designNo":"","qrCodeId":"X1"}"#).is_err());
        assert!(parse_payload(r#"{"designNo":null,"qrCodeId":"X1"}"#).is_err());
    }

    #[test]
    fn test_parse_structured_ignores_unknown_keys() {
        let raw = r#"{"designNo":"A1","qrCodeId":"Q","_id":"abc","color":"red"}"#;
        let record = parse_payload(raw).unwrap();
        assert_eq!(record.design_number, "A1");
    }

    // =============================================
    // 区切り形式
    // =============================================

    #[test]
    fn test_parse_delimited() {
        let record = parse_payload("HG|A1001|ACMECO").unwrap();
        assert_eq!(record.sample_type, "Hanger");
        assert_eq!(record.design_number, "A1001");
        assert_eq!(record.merchant, "ACMECO");
        assert_eq!(record.external_id, "ACMECO_A1001_HG");
        assert_eq!(record.source_format, SourceFormat::Delimited);
    }

    #[test]
    fn test_parse_delimited_all_type_codes() {
        for (code, name) in crate::alias::SAMPLE_TYPE_CODES {
            let raw = format!("{}|D9|MILLCO", code);
            let record = parse_payload(&raw).unwrap();
            assert_eq!(record.sample_type, *name);
            assert_eq!(record.external_id, format!("MILLCO_D9_{}", code));
        }
    }

    #[test]
    fn test_parse_delimited_unknown_type_code() {
        let record = parse_payload("QQ|A1|ACMECO").unwrap();
        assert_eq!(record.sample_type, "QQ");
        assert_eq!(record.external_id, "ACMECO_A1_QQ");
    }

    #[test]
    fn test_parse_delimited_is_deterministic() {
        let first = parse_payload("EB|Z-500|ZENITH").unwrap();
        let second = parse_payload("EB|Z-500|ZENITH").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_delimited_trailing_newline() {
        let record = parse_payload("SC|A1|ACMECO\r\n").unwrap();
        assert_eq!(record.merchant, "ACMECO");
        assert_eq!(record.external_id, "ACMECO_A1_SC");
    }

    #[test]
    fn test_parse_delimited_wrong_field_count() {
        assert!(parse_payload("XX|A1").is_err());
        assert!(parse_payload("HG|A1|ACMECO|EXTRA").is_err());
        assert!(parse_payload("HGA1ACMECO").is_err());
    }

    // =============================================
    // 失敗ケース
    // =============================================

    #[test]
    fn test_parse_failure_reason() {
        let err = parse_payload("https://example.com/not-a-tag").unwrap_err();
        assert_eq!(err.reason, "unrecognized format");
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_payload("").is_err());
        assert!(parse_payload("   ").is_err());
    }

    #[test]
    fn test_json_without_required_fields_falls_back_to_delimited() {
        // JSONとしては不完全でも、区切り形式として3フィールドなら成功
        let record = parse_payload(r#"{"a":1}|B|C"#).unwrap();
        assert_eq!(record.source_format, SourceFormat::Delimited);
    }
}
