use crate::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// サンプル台帳パスを上書きする環境変数
pub const DIRECTORY_ENV: &str = "SAMPLE_SCAN_DIRECTORY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// サンプル台帳JSONのパス
    pub directory_path: Option<PathBuf>,
    /// 検出したら確認なしで明細に反映する
    pub auto_confirm: bool,
    /// 読取成功時に端末ベルを鳴らす
    pub audio_cue: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ScanError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("sample-scan").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            directory_path: None,
            auto_confirm: false,
            audio_cue: true,
        }
    }

    /// 使用するサンプル台帳のパス
    ///
    /// コマンドライン指定 > 環境変数 > 設定ファイルの順で優先する。
    pub fn resolve_directory_path(&self, cli_path: Option<PathBuf>) -> Option<PathBuf> {
        cli_path
            .or_else(|| std::env::var_os(DIRECTORY_ENV).map(PathBuf::from))
            .or_else(|| self.directory_path.clone())
    }

    pub fn set_directory_path(&mut self, path: PathBuf) -> Result<()> {
        self.directory_path = Some(path);
        self.save()
    }
}
