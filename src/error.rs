//! エラーハンドリングシステム
//!
//! txtops 全体で使用される統一されたエラー型とユーティリティを定義
//! 失敗は必ず型付きエラーとして呼び出し元へ伝播する（空文字列などの番兵値は使わない）

use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

/// ライブラリ全体のエラー型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TxtError {
    /// 対象パスが存在しない、または通常ファイルではない
    #[error("{operation}: file not found: {path}")]
    NotFound { operation: String, path: String },

    /// 読み書き時の I/O エラー
    #[error("{operation}: I/O error on {path}: {message}")]
    Io {
        operation: String,
        path: String,
        kind: ErrorKind,
        message: String,
    },

    /// 文字コード変換エラー
    #[error("{operation}: encoding error ({encoding}) on {path}: {message}")]
    Encoding {
        operation: String,
        path: String,
        encoding: String,
        message: String,
    },

    /// 不正な引数
    #[error("{operation}: invalid argument `{argument}`: {reason}")]
    InvalidArgument {
        operation: String,
        argument: String,
        reason: String,
    },

    /// 設定エラー
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// 呼び出し元へ公開するエラー分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Io,
    InvalidArgument,
}

impl TxtError {
    pub fn not_found(operation: &str, path: impl AsRef<Path>) -> Self {
        TxtError::NotFound {
            operation: operation.to_string(),
            path: path.as_ref().display().to_string(),
        }
    }

    pub fn io(operation: &str, path: impl AsRef<Path>, error: &std::io::Error) -> Self {
        TxtError::Io {
            operation: operation.to_string(),
            path: path.as_ref().display().to_string(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    pub fn invalid_argument(operation: &str, argument: &str, reason: impl Into<String>) -> Self {
        TxtError::InvalidArgument {
            operation: operation.to_string(),
            argument: argument.to_string(),
            reason: reason.into(),
        }
    }

    /// エラーを3分類へ写像
    pub fn category(&self) -> ErrorCategory {
        match self {
            TxtError::NotFound { .. } => ErrorCategory::NotFound,
            TxtError::Io { .. } | TxtError::Encoding { .. } => ErrorCategory::Io,
            TxtError::InvalidArgument { .. } | TxtError::Config { .. } => {
                ErrorCategory::InvalidArgument
            }
        }
    }

    /// 文字コード変換エラーに操作名と対象パスを付与
    pub fn at(self, operation: &str, path: impl AsRef<Path>) -> Self {
        match self {
            TxtError::Encoding {
                encoding, message, ..
            } => TxtError::Encoding {
                operation: operation.to_string(),
                path: path.as_ref().display().to_string(),
                encoding,
                message,
            },
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }
}

/// I/O エラーに操作名とパスを付与するためのトレイト
pub trait IoContext<T> {
    /// 操作名とパスを付けて `TxtError::Io` に変換
    fn io_context(self, operation: &str, path: &Path) -> Result<T>;

    /// 存在を前提とする操作向け：`NotFound` は `TxtError::NotFound` に変換
    fn existing_context(self, operation: &str, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context(self, operation: &str, path: &Path) -> Result<T> {
        self.map_err(|e| TxtError::io(operation, path, &e))
    }

    fn existing_context(self, operation: &str, path: &Path) -> Result<T> {
        self.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                TxtError::not_found(operation, path)
            } else {
                TxtError::io(operation, path, &e)
            }
        })
    }
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, TxtError>;
