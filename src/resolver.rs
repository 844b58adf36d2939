//! サンプル台帳との照合
//!
//! パース済みの候補を台帳の正式レコードで補完する。
//! 照合は補完のためのもので検証ではない。台帳に接続できない・一致しない場合も
//! 候補をそのまま返し、エラーにはしない。

use crate::directory::SampleDirectory;
use sample_scan_common::{
    merchant_matches_code, CandidateRecord, DirectoryRecord, Resolution, ResolvedRecord,
    SourceFormat,
};
use tracing::{debug, warn};

pub struct Resolver<D> {
    directory: D,
}

impl<D: SampleDirectory> Resolver<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    /// 候補を照合する
    ///
    /// - 区切り形式（取引先コード付き）: デザイン番号が一致し、かつ
    ///   台帳の取引先名がコードに縮約されるレコード
    /// - JSON形式で取引先名あり: 正式名称とみなし台帳を照会しない
    /// - 取引先なし: デザイン番号が一致するレコード
    ///
    /// いずれも台帳の並び順で最初に一致したものを使う。
    pub async fn resolve(&self, candidate: &CandidateRecord) -> ResolvedRecord {
        if candidate.source_format == SourceFormat::Json && !candidate.merchant.is_empty() {
            debug!(design = %candidate.design_number, "取引先名付きのため照会をスキップ");
            return ResolvedRecord::unchanged(candidate, Resolution::Trusted);
        }

        let records = match self.directory.find_by_design(&candidate.design_number).await {
            Ok(records) => records,
            Err(e) => {
                warn!(design = %candidate.design_number, error = %e, "サンプル台帳に接続できません。読取値をそのまま使用します");
                return ResolvedRecord::unchanged(candidate, Resolution::DirectoryUnavailable);
            }
        };

        match find_match(candidate, &records) {
            Some(canonical) => {
                debug!(
                    design = %candidate.design_number,
                    merchant = %canonical.merchant,
                    candidates = records.len(),
                    "台帳レコードで補完"
                );
                ResolvedRecord::enriched(candidate, canonical)
            }
            None => {
                debug!(design = %candidate.design_number, "台帳に一致するレコードがありません");
                ResolvedRecord::unchanged(candidate, Resolution::Unmatched)
            }
        }
    }
}

/// 照合条件に合う最初のレコード
pub fn find_match<'a>(
    candidate: &CandidateRecord,
    records: &'a [DirectoryRecord],
) -> Option<&'a DirectoryRecord> {
    let design = candidate.design_number.to_lowercase();

    records.iter().find(|record| {
        if record.design_number.to_lowercase() != design {
            return false;
        }
        if candidate.has_merchant_code() {
            merchant_matches_code(&record.merchant, &candidate.merchant)
        } else {
            true
        }
    })
}
