//! パス処理ユーティリティ
//!
//! パス引数の検証・展開・基準ディレクトリ解決と、
//! 区切り文字に依存しないファイル名・親ディレクトリの抽出

use crate::config::FileOpsConfig;
use crate::error::{Result, TxtError};
use std::path::PathBuf;

/// `/` と `\` のどちらも区切り文字として扱う
const SEPARATORS: [char; 2] = ['/', '\\'];

/// 設定に従ってパス文字列を解決する
#[derive(Debug, Clone)]
pub struct PathResolver {
    base_dir: Option<PathBuf>,
    expand_paths: bool,
}

impl PathResolver {
    pub fn new(config: &FileOpsConfig) -> Self {
        Self {
            base_dir: config.base_dir.clone(),
            expand_paths: config.expand_paths,
        }
    }

    /// パス引数を実際のファイルシステムパスへ解決
    pub fn resolve(&self, operation: &str, argument: &str, raw: &str) -> Result<PathBuf> {
        require_path(operation, argument, raw)?;

        let expanded = if self.expand_paths {
            expand(operation, argument, raw)?
        } else {
            raw.to_string()
        };

        let path = PathBuf::from(expanded);
        match &self.base_dir {
            Some(base) if path.is_relative() => Ok(base.join(path)),
            _ => Ok(path),
        }
    }
}

/// 空・空白のみのパスを拒否
pub fn require_path(operation: &str, argument: &str, raw: &str) -> Result<()> {
    if raw.trim().is_empty() {
        return Err(TxtError::invalid_argument(
            operation,
            argument,
            "path must not be empty",
        ));
    }
    if raw.contains('\0') {
        return Err(TxtError::invalid_argument(
            operation,
            argument,
            "path must not contain NUL",
        ));
    }
    Ok(())
}

/// ホームディレクトリと環境変数を展開（~ → /home/user, $VAR → 値）
fn expand(operation: &str, argument: &str, raw: &str) -> Result<String> {
    let home_dir = || dirs::home_dir().map(|home| home.to_string_lossy().into_owned());
    let context = |var: &str| std::env::var(var).map(Some);

    shellexpand::full_with_context(raw, home_dir, context)
        .map(|expanded| expanded.into_owned())
        .map_err(|e| {
            TxtError::invalid_argument(operation, argument, format!("環境変数展開エラー: {}", e))
        })
}

/// 末尾の区切り文字を除去（ルートそのものは残す）
fn trim_trailing_separators(raw: &str) -> &str {
    let trimmed = raw.trim_end_matches(SEPARATORS);
    if trimmed.is_empty() && !raw.is_empty() {
        &raw[..1]
    } else {
        trimmed
    }
}

/// 最後のパス要素（拡張子付きファイル名）
pub fn file_name(raw: &str) -> String {
    let trimmed = trim_trailing_separators(raw);
    if trimmed.len() == 1 && trimmed.starts_with(SEPARATORS) {
        return String::new();
    }
    match trimmed.rfind(SEPARATORS) {
        Some(index) => trimmed[index + 1..].to_string(),
        None => trimmed.to_string(),
    }
}

/// 親ディレクトリ部分（末尾の区切り文字なし）
pub fn parent_dir(raw: &str) -> String {
    let trimmed = trim_trailing_separators(raw);
    let Some(index) = trimmed.rfind(SEPARATORS) else {
        return String::new();
    };

    let parent = trimmed[..index].trim_end_matches(SEPARATORS);
    if parent.is_empty() {
        // ルート直下のファイル
        trimmed[..1].to_string()
    } else {
        parent.to_string()
    }
}
