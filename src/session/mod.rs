//! QR取込セッション
//!
//! カメラ画面を開いてから閉じるまでの1回分の取込を管理する状態機械。
//!
//! ## 状態遷移
//! - `Idle` + フレーム: パース → 照合 → `AwaitingConfirmation`
//! - `AwaitingConfirmation` + 確定: 明細にマージして `Idle`
//! - `AwaitingConfirmation` + 自動確定: マージして `Idle`（重複抑止は残す）
//! - `AwaitingConfirmation` + スキップ: 破棄して `Idle`
//! - 任意の状態 + 閉じる: 保留中のレコードを破棄して終了
//!
//! 照合中（`scan_lock`）は次のフレームをすべて捨てる。照合は非同期で、
//! 呼び出し側が `on_frame` で受け取った `ScanTicket` を照合し、
//! `complete` に渡す。

pub mod driver;

use crate::directory::SampleDirectory;
use crate::feedback::FeedbackPort;
use crate::item_list::ItemListPort;
use crate::resolver::Resolver;
use sample_scan_common::{merge_record, parse_payload, CandidateRecord, MergeOutcome, ParseFailure, ResolvedRecord};
use tracing::{debug, info};

/// セッションの状態
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    /// 検出済み・利用者の確定待ち
    AwaitingConfirmation(ResolvedRecord),
}

/// 外部から見たセッションの段階
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    /// 台帳照会中（読込中表示を出す）
    Resolving,
    AwaitingConfirmation(ResolvedRecord),
    Closed,
}

/// 照合待ちの取込
///
/// `on_frame` がロックを取ったときだけ発行される。
#[derive(Debug)]
pub struct ScanTicket {
    generation: u64,
    raw: String,
    candidate: CandidateRecord,
}

impl ScanTicket {
    pub fn candidate(&self) -> &CandidateRecord {
        &self.candidate
    }
}

/// フレームを捨てた理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// 直前に処理したQRと同じ
    Duplicate,
    /// 照合中
    InFlight,
    /// 確定待ち
    AwaitingConfirmation,
    /// セッション終了後
    Closed,
}

/// フレーム受信の結果
#[derive(Debug)]
pub enum FrameOutcome {
    /// ロックを取得した。照合して `complete` に渡す
    Resolve(ScanTicket),
    /// 読み取れない形式
    Rejected(ParseFailure),
    Dropped(DropReason),
}

/// 照合完了の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// 確定待ちに遷移
    Detected,
    /// セッション終了後の照合結果のため破棄
    Discarded,
}

/// 確定操作の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Merged(MergeOutcome),
    /// 確定待ちのレコードがない
    NothingPending,
    /// セッション終了後の操作
    Stale,
}

pub struct ScanSession<F> {
    feedback: F,
    state: SessionState,
    /// 照合中フラグ（単一実行ロック）
    scan_lock: bool,
    /// 直前に処理したQRテキスト（連続フレームの重複抑止）
    last_scanned: Option<String>,
    /// close のたびに進む世代番号
    generation: u64,
    closed: bool,
}

impl<F: FeedbackPort> ScanSession<F> {
    /// カメラ画面を開いたときに作成
    pub fn new(feedback: F) -> Self {
        Self {
            feedback,
            state: SessionState::Idle,
            scan_lock: false,
            last_scanned: None,
            generation: 0,
            closed: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// 照合中か（呼び出し側は読込中表示を出す）
    pub fn is_busy(&self) -> bool {
        self.scan_lock
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn last_scanned(&self) -> Option<&str> {
        self.last_scanned.as_deref()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.closed {
            return SessionPhase::Closed;
        }
        match &self.state {
            SessionState::AwaitingConfirmation(record) => {
                SessionPhase::AwaitingConfirmation(record.clone())
            }
            SessionState::Idle if self.scan_lock => SessionPhase::Resolving,
            SessionState::Idle => SessionPhase::Idle,
        }
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    /// デコード済みテキストを1フレーム分受け取る
    ///
    /// パースは同期的に行い、成功した場合だけロックを取って `ScanTicket` を返す。
    pub fn on_frame(&mut self, text: &str) -> FrameOutcome {
        if self.closed {
            return FrameOutcome::Dropped(DropReason::Closed);
        }
        if matches!(self.state, SessionState::AwaitingConfirmation(_)) {
            return FrameOutcome::Dropped(DropReason::AwaitingConfirmation);
        }
        if self.scan_lock {
            debug!("照合中のためフレームを破棄");
            return FrameOutcome::Dropped(DropReason::InFlight);
        }
        if self.last_scanned.as_deref() == Some(text) {
            debug!("直前と同じQRのためフレームを破棄");
            return FrameOutcome::Dropped(DropReason::Duplicate);
        }

        match parse_payload(text) {
            Ok(candidate) => {
                self.scan_lock = true;
                debug!(
                    design = %candidate.design_number,
                    format = ?candidate.source_format,
                    "QRを検出、照合を開始"
                );
                FrameOutcome::Resolve(ScanTicket {
                    generation: self.generation,
                    raw: text.to_string(),
                    candidate,
                })
            }
            Err(failure) => {
                self.last_scanned = Some(text.to_string());
                self.feedback.error(&failure.to_string());
                FrameOutcome::Rejected(failure)
            }
        }
    }

    /// 照合結果を反映して確定待ちにする
    pub fn complete(&mut self, ticket: ScanTicket, resolved: ResolvedRecord) -> Completion {
        if self.closed || ticket.generation != self.generation {
            debug!(design = %resolved.design_number, "セッション終了後の照合結果を破棄");
            return Completion::Discarded;
        }

        info!(
            design = %resolved.design_number,
            merchant = %resolved.merchant,
            resolution = ?resolved.resolution,
            "検出"
        );
        self.last_scanned = Some(ticket.raw);
        self.state = SessionState::AwaitingConfirmation(resolved);
        self.scan_lock = false;
        self.feedback.scan_accepted();
        Completion::Detected
    }

    /// フレームを受け取り、照合まで続けて行う
    pub async fn process_frame<D: SampleDirectory>(
        &mut self,
        text: &str,
        resolver: &Resolver<D>,
    ) -> Option<Completion> {
        match self.on_frame(text) {
            FrameOutcome::Resolve(ticket) => {
                let resolved = resolver.resolve(ticket.candidate()).await;
                Some(self.complete(ticket, resolved))
            }
            FrameOutcome::Rejected(_) | FrameOutcome::Dropped(_) => None,
        }
    }

    /// 確定: 検出したレコードを明細にマージ
    ///
    /// 利用者の操作による確定なので、同じQRをすぐ読み直せるよう重複抑止も解除する。
    pub fn confirm<L: ItemListPort + ?Sized>(&mut self, items: &mut L) -> ConfirmOutcome {
        let outcome = self.merge_pending(items);
        if matches!(outcome, ConfirmOutcome::Merged(_)) {
            self.rearm();
        }
        outcome
    }

    /// 自動確定: マージするが重複抑止は残す
    ///
    /// カメラ前に置いたままのタグを何度も数えないよう、
    /// 別のQRか `rearm` が来るまで同じテキストは捨てる。
    pub fn auto_confirm<L: ItemListPort + ?Sized>(&mut self, items: &mut L) -> ConfirmOutcome {
        self.merge_pending(items)
    }

    fn merge_pending<L: ItemListPort + ?Sized>(&mut self, items: &mut L) -> ConfirmOutcome {
        if self.closed {
            return ConfirmOutcome::Stale;
        }

        let record = match std::mem::take(&mut self.state) {
            SessionState::AwaitingConfirmation(record) => record,
            SessionState::Idle => return ConfirmOutcome::NothingPending,
        };

        let merged = merge_record(&record, items.items());
        items.replace(merged.items);
        self.feedback.success(&merged.outcome.message());
        info!(outcome = ?merged.outcome, "明細に反映");

        ConfirmOutcome::Merged(merged.outcome)
    }

    /// スキップ: 検出したレコードを破棄
    pub fn skip(&mut self) -> Option<ResolvedRecord> {
        if self.closed {
            return None;
        }

        match std::mem::take(&mut self.state) {
            SessionState::AwaitingConfirmation(record) => {
                debug!(design = %record.design_number, "スキップ");
                self.rearm();
                Some(record)
            }
            SessionState::Idle => None,
        }
    }

    /// 重複抑止を解除して同じQRを再び読めるようにする
    pub fn rearm(&mut self) {
        self.last_scanned = None;
    }

    /// カメラ画面を閉じる
    ///
    /// 保留中のレコードと照合中の結果はすべて破棄する。
    pub fn close(&mut self) {
        self.state = SessionState::Idle;
        self.scan_lock = false;
        self.last_scanned = None;
        self.generation += 1;
        self.closed = true;
        debug!("取込セッションを終了");
    }
}
