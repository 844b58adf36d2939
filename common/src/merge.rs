//! 明細マージ処理
//!
//! 照合済みレコードを納品書明細に反映する。
//! 既存の明細と一致すれば数量を加算し、なければ末尾に追加する。

use crate::types::{LineItem, ResolvedRecord};

/// マージ結果の種別
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// 既存明細の数量を加算
    Incremented {
        serial_number: u32,
        design_number: String,
        quantity: u32,
    },
    /// 新しい明細を追加
    Appended {
        serial_number: u32,
        design_number: String,
    },
}

impl MergeOutcome {
    /// 通知用メッセージ
    pub fn message(&self) -> String {
        match self {
            MergeOutcome::Incremented {
                design_number,
                quantity,
                ..
            } => format!("{} の数量を {} に更新しました", design_number, quantity),
            MergeOutcome::Appended { design_number, .. } => {
                format!("{} を追加しました", design_number)
            }
        }
    }
}

/// マージ後の明細と結果
#[derive(Debug, Clone)]
pub struct MergeResult {
    pub items: Vec<LineItem>,
    pub outcome: MergeOutcome,
}

/// 明細がレコードと同一サンプルか
///
/// 外部IDが一致するか、(デザイン番号, 取引先) が大文字小文字を無視して一致すれば同一。
pub fn is_same_sample(item: &LineItem, record: &ResolvedRecord) -> bool {
    let same_external_id = !record.external_id.is_empty()
        && item.external_id.as_deref() == Some(record.external_id.as_str());

    let same_design = item.design_number.to_lowercase() == record.design_number.to_lowercase()
        && item.merchant.to_lowercase() == record.merchant.to_lowercase();

    same_external_id || same_design
}

/// 照合済みレコードを明細リストにマージ
///
/// 入力の明細は変更せず、新しいリストを返す。並べ替えは行わない。
pub fn merge_record(record: &ResolvedRecord, items: &[LineItem]) -> MergeResult {
    let mut merged = items.to_vec();

    if let Some(existing) = merged.iter_mut().find(|item| is_same_sample(item, record)) {
        existing.quantity = existing.quantity.saturating_add(1);
        let outcome = MergeOutcome::Incremented {
            serial_number: existing.serial_number,
            design_number: existing.design_number.clone(),
            quantity: existing.quantity,
        };
        return MergeResult {
            items: merged,
            outcome,
        };
    }

    let serial_number = next_serial(merged.len());
    merged.push(LineItem {
        serial_number,
        merchant: record.merchant.clone(),
        sample_type: record.sample_type.clone(),
        design_number: record.design_number.clone(),
        external_id: if record.external_id.is_empty() {
            None
        } else {
            Some(record.external_id.clone())
        },
        quantity: 1,
    });

    MergeResult {
        items: merged,
        outcome: MergeOutcome::Appended {
            serial_number,
            design_number: record.design_number.clone(),
        },
    }
}

/// 連番を1から振り直す
pub fn renumber(items: &mut [LineItem]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.serial_number = next_serial(index);
    }
}

/// `count` 件の後ろに付く連番（u32 の上限で頭打ち）
fn next_serial(count: usize) -> u32 {
    u32::try_from(count).map_or(u32::MAX, |n| n.saturating_add(1))
}

/// デザイン番号・取引先の順に並べ替えて連番を振り直す
pub fn sort_and_renumber(items: &mut [LineItem]) {
    items.sort_by(|a, b| {
        a.design_number
            .to_lowercase()
            .cmp(&b.design_number.to_lowercase())
            .then_with(|| a.merchant.to_lowercase().cmp(&b.merchant.to_lowercase()))
    });
    renumber(items);
}
