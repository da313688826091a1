//! 設定
//!
//! ファイル操作の文字コードや作業ディレクトリを値として保持する。
//! 呼び出し側のフレームワークが所有し、`FileOps` 構築時に渡す。

use crate::encoding::TextEncoding;
use crate::error::{Result, TxtError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// ファイル操作の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileOpsConfig {
    /// テキストの読み書きに使う文字コード
    pub encoding: TextEncoding,
    /// 作業用パスを組み立てる一時ディレクトリ
    pub temp_dir: PathBuf,
    /// 相対パスの基準ディレクトリ（未指定時はプロセスのカレントディレクトリ）
    pub base_dir: Option<PathBuf>,
    /// `~` と `$VAR` を展開するかどうか
    pub expand_paths: bool,
}

impl Default for FileOpsConfig {
    fn default() -> Self {
        Self {
            encoding: TextEncoding::Utf8,
            temp_dir: std::env::temp_dir(),
            base_dir: None,
            expand_paths: false,
        }
    }
}

impl FileOpsConfig {
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_temp_dir<P: Into<PathBuf>>(mut self, temp_dir: P) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    pub fn with_base_dir<P: Into<PathBuf>>(mut self, base_dir: P) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn with_path_expansion(mut self, enabled: bool) -> Self {
        self.expand_paths = enabled;
        self
    }

    /// JSON 文字列から読み込み（省略した項目は既定値）
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TxtError::Config {
            message: e.to_string(),
        })
    }

    /// JSON 設定ファイルから読み込み
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| TxtError::Config {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_json_str(&json)
    }
}
