use anyhow::{bail, Context};
use clap::Parser;
use sample_scan::capture::{self, CaptureOptions};
use sample_scan::cli::{Cli, Commands};
use sample_scan::config::Config;
use sample_scan::directory::{JsonDirectory, MemoryDirectory, SampleDirectory};
use sample_scan::feedback::ConsoleFeedback;
use sample_scan::item_list::PackingSlipItems;
use sample_scan::logging::{init_logging, LogConfig};
use sample_scan::resolver::Resolver;
use sample_scan::scanner;
use sample_scan::session::driver::SessionSummary;
use sample_scan::session::ScanSession;
use sample_scan_common::parse_payload;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_verbosity(cli.verbose));
    let config = Config::load().context("設定ファイルの読み込みに失敗しました")?;

    match cli.command {
        Commands::Scan { input, directory, items, output, auto_confirm, sort } => {
            println!("📷 sample-scan - QR取込\n");

            let auto_confirm = auto_confirm || config.auto_confirm;
            let from_stdin = input == Path::new("-");
            if from_stdin && !auto_confirm {
                bail!("標準入力から取り込む場合は --auto-confirm を指定してください");
            }

            // 1. フレーム読み込み
            println!("[1/3] フレームを読み込み中...");
            let frames = if from_stdin {
                scanner::read_frames_from(std::io::stdin().lock())?
            } else {
                scanner::read_frames(&input)?
            };
            println!("✔ {}件のフレーム\n", frames.len());

            let output = output
                .or_else(|| items.clone())
                .unwrap_or_else(|| PathBuf::from("items.json"));
            let mut list = match &items {
                Some(path) => PackingSlipItems::load(path)
                    .with_context(|| format!("明細ファイルを読み込めません: {}", path.display()))?,
                None => PackingSlipItems::default(),
            };
            if !list.is_empty() {
                println!("  既存の明細: {}行", list.len());
            }

            // 2. 取込
            println!("[2/3] 取込中...");
            let options = CaptureOptions {
                auto_confirm,
                show_progress: !from_stdin,
            };
            let feedback = ConsoleFeedback::new(config.audio_cue);
            let summary = match config.resolve_directory_path(directory) {
                Some(path) => {
                    info!(directory = %path.display(), "サンプル台帳");
                    capture_with(JsonDirectory::new(path), frames, feedback, &mut list, &options).await?
                }
                None => {
                    warn!("サンプル台帳が未設定のため、読取値をそのまま使用します");
                    capture_with(MemoryDirectory::default(), frames, feedback, &mut list, &options).await?
                }
            };
            println!(
                "✔ 検出 {}件 / 追加・加算 {}件 / スキップ {}件 / 読取エラー {}件\n",
                summary.detected, summary.merged, summary.skipped, summary.rejected
            );

            // 3. 保存
            println!("[3/3] 明細を保存中...");
            if sort {
                list.sort_alphabetically();
            }
            list.save(&output)?;
            println!("✔ {}行（数量合計 {}）を保存: {}", list.len(), list.total_quantity(), output.display());

            println!("\n✅ 取込完了");
        }

        Commands::Parse { text } => match parse_payload(&text) {
            Ok(record) => {
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
            Err(failure) => bail!(failure),
        },

        Commands::Config { set_directory, set_auto_confirm, show } => {
            let mut config = config;

            if let Some(path) = set_directory {
                config.set_directory_path(path)?;
                println!("✔ サンプル台帳を設定しました");
            }

            if let Some(value) = set_auto_confirm {
                config.auto_confirm = value;
                config.save()?;
                println!("✔ 確認なし取込を{}にしました", if value { "有効" } else { "無効" });
            }

            if show {
                println!("設定:");
                match &config.directory_path {
                    Some(path) => println!("  サンプル台帳: {}", path.display()),
                    None => println!("  サンプル台帳: 未設定"),
                }
                println!("  確認なし取込: {}", if config.auto_confirm { "有効" } else { "無効" });
                println!("  効果音: {}", if config.audio_cue { "有効" } else { "無効" });
                println!("  設定ファイル: {}", Config::config_path()?.display());
            }
        }
    }

    Ok(())
}

async fn capture_with<D: SampleDirectory>(
    directory: D,
    frames: Vec<String>,
    feedback: ConsoleFeedback,
    list: &mut PackingSlipItems,
    options: &CaptureOptions,
) -> anyhow::Result<SessionSummary> {
    let resolver = Resolver::new(directory);
    let mut session = ScanSession::new(feedback);
    let summary = capture::run_capture(frames, &mut session, &resolver, list, options).await?;
    Ok(summary)
}
