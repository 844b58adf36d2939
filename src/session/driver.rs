//! 取込セッションのイベントループ
//!
//! フレームデコーダと利用者操作を1本のチャネルで受け取り、
//! 照会中の照合と `tokio::select!` で多重化する。
//! シングルスレッドで動かす前提で、照合の待ち合わせ以外に中断点はない。

use super::{Completion, ConfirmOutcome, FrameOutcome, ScanSession, ScanTicket, SessionPhase};
use crate::directory::SampleDirectory;
use crate::feedback::FeedbackPort;
use crate::item_list::ItemListPort;
use crate::resolver::Resolver;
use sample_scan_common::ResolvedRecord;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::{mpsc, watch};
use tracing::debug;

/// セッションへの入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// デコード済みテキスト（1フレーム）
    Frame(String),
    Confirm,
    /// 利用者の操作なしで確定（重複抑止は解除しない）
    AutoConfirm,
    Skip,
    /// 重複抑止を解除
    Rearm,
    /// カメラ画面を閉じる
    Close,
}

/// 外部に公開する状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStatus {
    pub phase: SessionPhase,
    /// 処理済みイベント数
    pub events_handled: u64,
}

/// セッション終了時の集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames: u64,
    pub detected: u64,
    pub rejected: u64,
    pub dropped: u64,
    pub merged: u64,
    pub skipped: u64,
    /// 終了後に届いて破棄した照合結果
    pub discarded: u64,
}

type Inflight<'a> = Pin<Box<dyn Future<Output = (ScanTicket, ResolvedRecord)> + 'a>>;

async fn wait_inflight(inflight: &mut Option<Inflight<'_>>) -> Option<(ScanTicket, ResolvedRecord)> {
    match inflight {
        Some(future) => Some(future.as_mut().await),
        None => None,
    }
}

fn publish<F: FeedbackPort>(
    status: &watch::Sender<SessionStatus>,
    session: &ScanSession<F>,
    events_handled: u64,
) {
    status.send_replace(SessionStatus {
        phase: session.phase(),
        events_handled,
    });
}

/// イベントが尽きるか `Close` を受けるまでセッションを回す
///
/// 閉じた時点で照会中の照合は中断する。
pub async fn run<'a, D, F, L>(
    session: &mut ScanSession<F>,
    resolver: &'a Resolver<D>,
    items: &mut L,
    mut events: mpsc::Receiver<ScanEvent>,
    status: &watch::Sender<SessionStatus>,
) -> SessionSummary
where
    D: SampleDirectory + 'a,
    F: FeedbackPort,
    L: ItemListPort + ?Sized,
{
    let mut summary = SessionSummary::default();
    let mut events_handled = 0u64;
    let mut inflight: Option<Inflight<'a>> = None;

    publish(status, session, events_handled);

    loop {
        tokio::select! {
            biased;

            Some((ticket, resolved)) = wait_inflight(&mut inflight), if inflight.is_some() => {
                inflight = None;
                match session.complete(ticket, resolved) {
                    Completion::Detected => summary.detected += 1,
                    Completion::Discarded => summary.discarded += 1,
                }
                publish(status, session, events_handled);
            }

            event = events.recv() => {
                let Some(event) = event else {
                    debug!("イベント送信元が終了");
                    break;
                };
                events_handled += 1;

                match event {
                    ScanEvent::Frame(text) => {
                        summary.frames += 1;
                        match session.on_frame(&text) {
                            FrameOutcome::Resolve(ticket) => {
                                inflight = Some(Box::pin(async move {
                                    let resolved = resolver.resolve(ticket.candidate()).await;
                                    (ticket, resolved)
                                }));
                            }
                            FrameOutcome::Rejected(_) => summary.rejected += 1,
                            FrameOutcome::Dropped(_) => summary.dropped += 1,
                        }
                    }
                    ScanEvent::Confirm => {
                        if let ConfirmOutcome::Merged(_) = session.confirm(items) {
                            summary.merged += 1;
                        }
                    }
                    ScanEvent::AutoConfirm => {
                        if let ConfirmOutcome::Merged(_) = session.auto_confirm(items) {
                            summary.merged += 1;
                        }
                    }
                    ScanEvent::Skip => {
                        if session.skip().is_some() {
                            summary.skipped += 1;
                        }
                    }
                    ScanEvent::Rearm => session.rearm(),
                    ScanEvent::Close => {
                        session.close();
                        publish(status, session, events_handled);
                        break;
                    }
                }
                publish(status, session, events_handled);
            }
        }
    }

    if inflight.take().is_some() {
        debug!("照会中の照合を中断");
    }
    if !session.is_closed() {
        session.close();
        publish(status, session, events_handled);
    }

    summary
}
