use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sample-scan")]
#[command(about = "QRコードによるサンプル取込・納品書明細照合ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力（-v, -vv, -vvv）
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// デコード済みQRテキストを取り込んで明細を作成
    Scan {
        /// 1行1フレームのテキストファイル（`-` で標準入力、--auto-confirm 必須）
        #[arg(required = true)]
        input: PathBuf,

        /// サンプル台帳JSONファイル
        #[arg(short, long)]
        directory: Option<PathBuf>,

        /// 既存の明細ファイル（続きから取り込む）
        #[arg(short, long)]
        items: Option<PathBuf>,

        /// 出力明細ファイル（省略時は --items に上書き、なければ items.json）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 確認なしで明細に反映
        #[arg(long)]
        auto_confirm: bool,

        /// 保存前にデザイン番号順に並べ替え
        #[arg(long)]
        sort: bool,
    },

    /// QRテキストをパースして結果を表示
    Parse {
        /// デコード済みテキスト
        #[arg(required = true)]
        text: String,
    },

    /// 設定を表示/編集
    Config {
        /// サンプル台帳のパスを設定
        #[arg(long)]
        set_directory: Option<PathBuf>,

        /// 確認なし取込を既定にする
        #[arg(long)]
        set_auto_confirm: Option<bool>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
