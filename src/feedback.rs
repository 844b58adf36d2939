//! 利用者への通知（トースト・効果音）
//!
//! セッションは画面を直接描画しない。通知はすべてこのポート経由で出す。

use std::io::Write;

pub trait FeedbackPort {
    /// 成功通知
    fn success(&mut self, message: &str);
    /// エラー通知
    fn error(&mut self, message: &str);
    /// 読取成功の効果音
    fn scan_accepted(&mut self);
}

/// 端末に出力する通知
#[derive(Debug, Clone)]
pub struct ConsoleFeedback {
    audio_cue: bool,
}

impl ConsoleFeedback {
    pub fn new(audio_cue: bool) -> Self {
        Self { audio_cue }
    }
}

impl FeedbackPort for ConsoleFeedback {
    fn success(&mut self, message: &str) {
        println!("✔ {}", message);
    }

    fn error(&mut self, message: &str) {
        eprintln!("✖ {}", message);
    }

    fn scan_accepted(&mut self) {
        if self.audio_cue {
            // 端末ベル
            print!("\x07");
            std::io::stdout().flush().ok();
        }
    }
}

/// 通知の記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cue {
    Success(String),
    Error(String),
    ScanAccepted,
}

/// 通知を記録するだけのポート
#[derive(Debug, Clone, Default)]
pub struct MemoryFeedback {
    pub cues: Vec<Cue>,
}

impl MemoryFeedback {
    pub fn errors(&self) -> Vec<&str> {
        self.cues
            .iter()
            .filter_map(|c| match c {
                Cue::Error(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn successes(&self) -> Vec<&str> {
        self.cues
            .iter()
            .filter_map(|c| match c {
                Cue::Success(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn accepted_count(&self) -> usize {
        self.cues.iter().filter(|c| **c == Cue::ScanAccepted).count()
    }
}

impl FeedbackPort for MemoryFeedback {
    fn success(&mut self, message: &str) {
        self.cues.push(Cue::Success(message.to_string()));
    }

    fn error(&mut self, message: &str) {
        self.cues.push(Cue::Error(message.to_string()));
    }

    fn scan_accepted(&mut self) {
        self.cues.push(Cue::ScanAccepted);
    }
}
