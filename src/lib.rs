//! QRコードによるサンプル取込
//!
//! カメラのQRデコーダから届くテキストを納品書の明細に変換する。
//! 2種類のペイロード形式のパース、サンプル台帳との照合、明細へのマージを
//! 単一実行ロック付きの確認操作の後ろで行う。

pub mod capture;
pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod feedback;
pub mod item_list;
pub mod logging;
pub mod resolver;
pub mod scanner;
pub mod session;
