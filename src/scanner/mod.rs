//! デコード済みフレームの読み込み
//!
//! カメラのQRデコーダの代わりに、1行1フレームのテキストを読み込む。

use crate::error::{Result, ScanError};
use std::io::BufRead;
use std::path::Path;

/// ファイルからフレームを読み込む
pub fn read_frames(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(ScanError::FileNotFound(path.display().to_string()));
    }

    let file = std::fs::File::open(path)?;
    read_frames_from(std::io::BufReader::new(file))
}

/// 任意の入力からフレームを読み込む
///
/// 空行は「QRなし」のフレームとして読み飛ばす。
pub fn read_frames_from<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut frames = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let text = line.trim_end_matches(['\r', '\n']);
        if text.trim().is_empty() {
            continue;
        }
        frames.push(text.to_string());
    }

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_frames_skips_blank_lines() {
        let input = "HG|A1001|ACMECO\n\n   \n{\"designNo\":\"A1\",\"qrCodeId\":\"X\"}\r\n";
        let frames = read_frames_from(Cursor::new(input)).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], "HG|A1001|ACMECO");
        assert_eq!(frames[1], r#"{"designNo":"A1","qrCodeId":"X"}"#);
    }

    #[test]
    fn test_read_frames_keeps_repeats() {
        let input = "PB|B2|ZENITH\nPB|B2|ZENITH\n";
        let frames = read_frames_from(Cursor::new(input)).unwrap();
        assert_eq!(frames, vec!["PB|B2|ZENITH", "PB|B2|ZENITH"]);
    }

    #[test]
    fn test_read_frames_not_found() {
        let result = read_frames(Path::new("/nonexistent/frames.txt"));
        assert!(matches!(result, Err(ScanError::FileNotFound(_))));
    }
}
