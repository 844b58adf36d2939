//! 取込レコードの型定義
//!
//! CLIとセッションで共有される型:
//! - CandidateRecord: QRペイロードのパース結果（未照合）
//! - ResolvedRecord: サンプル台帳との照合結果
//! - LineItem: 納品書の明細行
//! - DirectoryRecord: サンプル台帳の1件

use serde::{Deserialize, Serialize};

/// ペイロード形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// JSONオブジェクト形式
    Json,
    /// `TYPE|DESIGN|MERCHANT` 区切り形式
    Delimited,
}

/// パース直後の取込候補
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    /// 取引先（略号または空の場合あり）
    pub merchant: String,
    pub sample_type: String,
    pub design_number: String,
    /// 物理QRを識別する安定ID
    pub external_id: String,
    pub source_format: SourceFormat,
}

impl CandidateRecord {
    /// 区切り形式で取引先略号を持っているか
    pub fn has_merchant_code(&self) -> bool {
        self.source_format == SourceFormat::Delimited && !self.merchant.is_empty()
    }
}

/// 照合の結果種別（診断用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resolution {
    /// 台帳の正式名称で補完した
    Enriched,
    /// 一致なし
    Unmatched,
    /// 正式名称付きのため照会しなかった
    Trusted,
    /// 台帳に接続できなかった
    DirectoryUnavailable,
}

/// 照合済みレコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRecord {
    pub merchant: String,
    pub sample_type: String,
    pub design_number: String,
    pub external_id: String,
    pub source_format: SourceFormat,
    pub resolution: Resolution,
}

impl ResolvedRecord {
    /// 候補をそのまま照合済みとして扱う
    pub fn unchanged(candidate: &CandidateRecord, resolution: Resolution) -> Self {
        Self {
            merchant: candidate.merchant.clone(),
            sample_type: candidate.sample_type.clone(),
            design_number: candidate.design_number.clone(),
            external_id: candidate.external_id.clone(),
            source_format: candidate.source_format,
            resolution,
        }
    }

    /// 台帳レコードの正式名称で補完
    ///
    /// 台帳側が空の項目は候補の値を残す。デザイン番号と外部IDは書き換えない。
    pub fn enriched(candidate: &CandidateRecord, canonical: &DirectoryRecord) -> Self {
        let pick = |canonical: &str, own: &str| {
            if canonical.trim().is_empty() {
                own.to_string()
            } else {
                canonical.to_string()
            }
        };

        Self {
            merchant: pick(&canonical.merchant, &candidate.merchant),
            sample_type: pick(&canonical.sample_type, &candidate.sample_type),
            design_number: candidate.design_number.clone(),
            external_id: candidate.external_id.clone(),
            source_format: candidate.source_format,
            resolution: Resolution::Enriched,
        }
    }
}

/// 納品書の明細行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// 1始まりの連番（欠番なし）
    pub serial_number: u32,

    #[serde(default)]
    pub merchant: String,

    #[serde(default)]
    pub sample_type: String,

    pub design_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    pub quantity: u32,
}

/// サンプル台帳の1件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DirectoryRecord {
    pub merchant: String,

    #[serde(rename = "productionSampleType", alias = "sampleType")]
    pub sample_type: String,

    #[serde(rename = "designNo", alias = "designNumber")]
    pub design_number: String,

    #[serde(rename = "qrCodeId", alias = "externalId")]
    pub external_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delimited_candidate() -> CandidateRecord {
        CandidateRecord {
            merchant: "ACMECO".to_string(),
            sample_type: "Hanger".to_string(),
            design_number: "A1001".to_string(),
            external_id: "ACMECO_A1001_HG".to_string(),
            source_format: SourceFormat::Delimited,
        }
    }

    #[test]
    fn test_line_item_serialize() {
        let item = LineItem {
            serial_number: 1,
            design_number: "A1001".to_string(),
            external_id: Some("X1".to_string()),
            quantity: 1,
            ..Default::default()
        };

        let json = serde_json::to_string(&item).expect("シリアライズ失敗");
        assert!(json.contains("\"serialNumber\":1"));
        assert!(json.contains("\"designNumber\":\"A1001\""));
        assert!(json.contains("\"externalId\":\"X1\""));
    }

    #[test]
    fn test_line_item_without_external_id() {
        let json = r#"{"serialNumber": 2, "designNumber": "B7", "quantity": 3}"#;
        let item: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.external_id, None);
        assert_eq!(item.merchant, "");
        assert_eq!(item.quantity, 3);

        let back = serde_json::to_string(&item).unwrap();
        assert!(!back.contains("externalId"));
    }

    #[test]
    fn test_directory_record_wire_keys() {
        let json = r#"{
            "merchant": "Acme Corp",
            "productionSampleType": "Hanger",
            "designNo": "A1001",
            "qrCodeId": "Q-1"
        }"#;
        let record: DirectoryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.merchant, "Acme Corp");
        assert_eq!(record.sample_type, "Hanger");
        assert_eq!(record.design_number, "A1001");
        assert_eq!(record.external_id, "Q-1");
    }

    #[test]
    fn test_enriched_keeps_identifiers() {
        let candidate = delimited_candidate();
        let canonical = DirectoryRecord {
            merchant: "Acme Corp".to_string(),
            sample_type: String::new(),
            design_number: "a1001".to_string(),
            external_id: "OTHER".to_string(),
        };

        let resolved = ResolvedRecord::enriched(&candidate, &canonical);
        assert_eq!(resolved.merchant, "Acme Corp");
        assert_eq!(resolved.sample_type, "Hanger"); // 台帳が空なら候補の値
        assert_eq!(resolved.design_number, "A1001");
        assert_eq!(resolved.external_id, "ACMECO_A1001_HG");
        assert_eq!(resolved.resolution, Resolution::Enriched);
    }

    #[test]
    fn test_has_merchant_code() {
        let mut candidate = delimited_candidate();
        assert!(candidate.has_merchant_code());

        candidate.source_format = SourceFormat::Json;
        assert!(!candidate.has_merchant_code());
    }
}
