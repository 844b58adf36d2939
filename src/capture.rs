//! 取込の実行（CLI）
//!
//! 読み込んだフレームをセッションのイベントループに1件ずつ流し、
//! 検出のたびに利用者に確定・スキップを尋ねる。
//! 照会中はスピナーを表示する。

use crate::directory::SampleDirectory;
use crate::error::{Result, ScanError};
use crate::feedback::FeedbackPort;
use crate::item_list::ItemListPort;
use crate::resolver::Resolver;
use crate::session::driver::{self, ScanEvent, SessionStatus, SessionSummary};
use crate::session::{ScanSession, SessionPhase};
use dialoguer::Select;
use indicatif::{ProgressBar, ProgressStyle};
use sample_scan_common::ResolvedRecord;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// 検出したレコードへの操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Skip,
    /// 残りを取り込まずに終了
    Quit,
}

/// 取込オプション
#[derive(Debug, Clone, Default)]
pub struct CaptureOptions {
    /// 確認なしで明細に反映
    pub auto_confirm: bool,
    /// スピナーを表示
    pub show_progress: bool,
}

/// フレームを順に取り込む
pub async fn run_capture<D, F, L>(
    frames: Vec<String>,
    session: &mut ScanSession<F>,
    resolver: &Resolver<D>,
    items: &mut L,
    options: &CaptureOptions,
) -> Result<SessionSummary>
where
    D: SampleDirectory,
    F: FeedbackPort,
    L: ItemListPort + ?Sized,
{
    let (event_tx, event_rx) = mpsc::channel(16);
    let (status_tx, status_rx) = watch::channel(SessionStatus::default());

    let session_loop = driver::run(session, resolver, items, event_rx, &status_tx);
    let feeder = feed_frames(frames, event_tx, status_rx, options);

    let (summary, fed) = tokio::join!(session_loop, feeder);
    fed?;
    Ok(summary)
}

/// フレームを送り、検出ごとに確定・スキップを送る
async fn feed_frames(
    frames: Vec<String>,
    events: mpsc::Sender<ScanEvent>,
    mut status: watch::Receiver<SessionStatus>,
    options: &CaptureOptions,
) -> Result<()> {
    let total = frames.len();

    for (index, frame) in frames.into_iter().enumerate() {
        let spinner = options.show_progress.then(|| lookup_spinner(index + 1, total));

        let settled = send_and_settle(&events, &mut status, ScanEvent::Frame(frame)).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        let Some(settled) = settled else {
            break;
        };

        let SessionPhase::AwaitingConfirmation(record) = settled.phase else {
            continue;
        };

        let event = if options.auto_confirm {
            ScanEvent::AutoConfirm
        } else {
            match prompt_decision(&record).await? {
                Decision::Confirm => ScanEvent::Confirm,
                Decision::Skip => ScanEvent::Skip,
                Decision::Quit => break,
            }
        };
        if send_and_settle(&events, &mut status, event).await.is_none() {
            break;
        }
    }

    events.send(ScanEvent::Close).await.ok();
    Ok(())
}

/// イベントを送り、照合が終わるまで待つ
///
/// セッションが終了していれば `None`。
async fn send_and_settle(
    events: &mpsc::Sender<ScanEvent>,
    status: &mut watch::Receiver<SessionStatus>,
    event: ScanEvent,
) -> Option<SessionStatus> {
    let target = status.borrow().events_handled + 1;
    events.send(event).await.ok()?;

    let settled = status
        .wait_for(|s| {
            s.phase == SessionPhase::Closed
                || (s.events_handled >= target && s.phase != SessionPhase::Resolving)
        })
        .await
        .ok()?
        .clone();

    if settled.phase == SessionPhase::Closed {
        None
    } else {
        Some(settled)
    }
}

fn lookup_spinner(current: usize, total: usize) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("[{}/{}] サンプル台帳を照会中...", current, total));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// 検出内容の表示文字列
pub fn describe_record(record: &ResolvedRecord) -> String {
    let merchant = if record.merchant.is_empty() {
        "（取引先なし）"
    } else {
        record.merchant.as_str()
    };
    let sample_type = if record.sample_type.is_empty() {
        "-"
    } else {
        record.sample_type.as_str()
    };
    format!(
        "{} / {} / {} [{}]",
        record.design_number, merchant, sample_type, record.external_id
    )
}

/// 確定・スキップ・終了を尋ねる
async fn prompt_decision(record: &ResolvedRecord) -> Result<Decision> {
    let prompt = format!("検出: {}", describe_record(record));

    let selection = tokio::task::spawn_blocking(move || {
        Select::new()
            .with_prompt(prompt)
            .items(&["明細に追加", "スキップ", "終了"])
            .default(0)
            .interact()
    })
    .await
    .map_err(|e| ScanError::Prompt(e.to_string()))?
    .map_err(|e| ScanError::Prompt(e.to_string()))?;

    Ok(match selection {
        0 => Decision::Confirm,
        1 => Decision::Skip,
        _ => Decision::Quit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sample_scan_common::{Resolution, SourceFormat};

    #[test]
    fn test_describe_record() {
        let record = ResolvedRecord {
            merchant: "Acme Corp".to_string(),
            sample_type: "Hanger".to_string(),
            design_number: "A1001".to_string(),
            external_id: "ACMECO_A1001_HG".to_string(),
            source_format: SourceFormat::Delimited,
            resolution: Resolution::Enriched,
        };
        assert_eq!(
            describe_record(&record),
            "A1001 / Acme Corp / Hanger [ACMECO_A1001_HG]"
        );
    }

    #[test]
    fn test_describe_record_without_merchant() {
        let record = ResolvedRecord {
            merchant: String::new(),
            sample_type: String::new(),
            design_number: "A1001".to_string(),
            external_id: "X1".to_string(),
            source_format: SourceFormat::Json,
            resolution: Resolution::Unmatched,
        };
        assert!(describe_record(&record).contains("取引先なし"));
    }
}
