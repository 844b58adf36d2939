//! 納品書明細リスト
//!
//! 明細の所有者はセッションの外側（納品書フォーム）。セッションは
//! `ItemListPort` を通じて読み書きするだけで、保存や並べ替えは所有者が行う。

use crate::error::Result;
use chrono::{DateTime, Utc};
use sample_scan_common::{sort_and_renumber, LineItem};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

pub trait ItemListPort {
    /// 現在の明細
    fn items(&self) -> &[LineItem];
    /// 明細を置き換える
    fn replace(&mut self, items: Vec<LineItem>);
}

impl ItemListPort for Vec<LineItem> {
    fn items(&self) -> &[LineItem] {
        self
    }

    fn replace(&mut self, items: Vec<LineItem>) {
        *self = items;
    }
}

/// 納品書へ引き渡す明細ファイル
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackingSlipItems {
    /// 最終更新日時
    pub updated_at: DateTime<Utc>,
    items: Vec<LineItem>,
}

impl Default for PackingSlipItems {
    fn default() -> Self {
        Self {
            updated_at: Utc::now(),
            items: Vec::new(),
        }
    }
}

impl PackingSlipItems {
    pub fn new(items: Vec<LineItem>) -> Self {
        Self {
            updated_at: Utc::now(),
            items,
        }
    }

    /// 明細ファイルを読み込み（ファイルがなければ空）
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let reader = BufReader::new(File::open(path)?);
        let list: Self = serde_json::from_reader(reader)?;
        Ok(list)
    }

    /// 明細ファイルを保存
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// デザイン番号順に並べ替え、連番を振り直す
    pub fn sort_alphabetically(&mut self) {
        sort_and_renumber(&mut self.items);
        self.updated_at = Utc::now();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 全明細の数量合計
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

impl ItemListPort for PackingSlipItems {
    fn items(&self) -> &[LineItem] {
        &self.items
    }

    fn replace(&mut self, items: Vec<LineItem>) {
        self.items = items;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(serial: u32, design: &str, quantity: u32) -> LineItem {
        LineItem {
            serial_number: serial,
            design_number: design.to_string(),
            quantity,
            ..Default::default()
        }
    }

    #[test]
    fn test_total_quantity() {
        let list = PackingSlipItems::new(vec![item(1, "A", 2), item(2, "B", 3)]);
        assert_eq!(list.len(), 2);
        assert_eq!(list.total_quantity(), 5);
    }

    #[test]
    fn test_sort_alphabetically_renumbers() {
        let mut list = PackingSlipItems::new(vec![item(1, "C", 1), item(2, "A", 1), item(3, "B", 1)]);
        list.sort_alphabetically();

        let items = list.items();
        assert_eq!(items[0].design_number, "A");
        assert_eq!(items[0].serial_number, 1);
        assert_eq!(items[2].design_number, "C");
        assert_eq!(items[2].serial_number, 3);
    }

    #[test]
    fn test_serialized_shape() {
        let list = PackingSlipItems::new(vec![item(1, "A1001", 1)]);
        let json = serde_json::to_string(&list).unwrap();
        assert!(json.contains("\"updatedAt\""));
        assert!(json.contains("\"items\":["));
    }
}
