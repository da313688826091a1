//! ファイルメタデータと論理行の処理
//!
//! 1回の呼び出しの中でだけ有効なメタデータのスナップショットと、
//! `\n` / `\r\n` による論理行の分割

use crate::error::{IoContext, Result, TxtError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// ファイル情報
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: PathBuf,
    pub exists: bool,
    pub is_file: bool,
    pub size: u64,
    pub modified: SystemTime,
}

impl FileInfo {
    /// ファイル情報を取得（存在しないパスも成功として扱う）
    pub fn analyze(operation: &str, path: &Path) -> Result<Self> {
        let metadata = match std::fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(FileInfo {
                    path: path.to_path_buf(),
                    exists: false,
                    is_file: false,
                    size: 0,
                    modified: UNIX_EPOCH,
                });
            }
            Err(e) => return Err(TxtError::io(operation, path, &e)),
        };

        Ok(FileInfo {
            path: path.to_path_buf(),
            exists: true,
            is_file: metadata.is_file(),
            size: metadata.len(),
            modified: metadata.modified().io_context(operation, path)?,
        })
    }

    /// 通常ファイルであることを要求
    pub fn require_file(operation: &str, path: &Path) -> Result<Self> {
        let info = Self::analyze(operation, path)?;
        if !info.exists || !info.is_file {
            return Err(TxtError::not_found(operation, path));
        }
        Ok(info)
    }

    /// 最終更新時刻（エポックミリ秒）
    pub fn modified_millis(&self) -> Result<u128> {
        self.modified
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .map_err(|e| TxtError::Io {
                operation: "lastmod".to_string(),
                path: self.path.display().to_string(),
                kind: ErrorKind::InvalidData,
                message: format!("modification time before epoch: {}", e),
            })
    }
}

/// 改行コードスタイル
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum LineEndingStyle {
    Lf,    // \n (Unix)
    Crlf,  // \r\n (Windows)
    Mixed, // 混在
    None,  // 改行なし
}

/// 改行コード処理
pub struct LineEndingProcessor;

impl LineEndingProcessor {
    /// `\n` または `\r\n` で論理行に分割
    ///
    /// 末尾の改行の後ろに空行は作らない。単独の `\r` は通常の文字として残る。
    pub fn split_logical_lines(content: &str) -> Vec<&str> {
        content.lines().collect()
    }

    /// 論理行をカンマで連結（CSV エスケープはしない）
    pub fn join_lines(lines: &[&str]) -> String {
        lines.join(",")
    }

    /// 改行コード検出
    pub fn detect_line_endings(content: &str) -> LineEndingStyle {
        let crlf = content.matches("\r\n").count();
        let lf = content.matches('\n').count();

        match (crlf, lf) {
            (0, 0) => LineEndingStyle::None,
            (0, _) => LineEndingStyle::Lf,
            (c, l) if c == l => LineEndingStyle::Crlf,
            _ => LineEndingStyle::Mixed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_split_mixed_line_endings() {
        assert_eq!(
            LineEndingProcessor::split_logical_lines("A\nB\r\nC"),
            vec!["A", "B", "C"]
        );
        assert_eq!(
            LineEndingProcessor::split_logical_lines("A\nB\n"),
            vec!["A", "B"]
        );
        assert_eq!(
            LineEndingProcessor::split_logical_lines("A\rB"),
            vec!["A\rB"]
        );
        assert!(LineEndingProcessor::split_logical_lines("").is_empty());
    }

    #[test]
    fn test_blank_lines_are_kept() {
        let lines = LineEndingProcessor::split_logical_lines("A\n\nB");
        assert_eq!(LineEndingProcessor::join_lines(&lines), "A,,B");
    }

    #[test]
    fn test_line_ending_detection() {
        assert_eq!(
            LineEndingProcessor::detect_line_endings("hello\r\nworld"),
            LineEndingStyle::Crlf
        );
        assert_eq!(
            LineEndingProcessor::detect_line_endings("hello\nworld"),
            LineEndingStyle::Lf
        );
        assert_eq!(
            LineEndingProcessor::detect_line_endings("a\nb\r\nc"),
            LineEndingStyle::Mixed
        );
        assert_eq!(
            LineEndingProcessor::detect_line_endings("hello world"),
            LineEndingStyle::None
        );
    }

    #[test]
    fn test_file_info_analyze() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("test.txt");

        // 新規ファイル
        let file_info = FileInfo::analyze("size", &test_file).unwrap();
        assert!(!file_info.exists);
        assert!(!file_info.is_file);
        assert!(FileInfo::require_file("size", &test_file)
            .unwrap_err()
            .is_not_found());

        // ファイル作成後
        fs::write(&test_file, "test content").unwrap();
        let file_info = FileInfo::require_file("size", &test_file).unwrap();
        assert!(file_info.is_file);
        assert_eq!(file_info.size, 12);
        assert!(file_info.modified_millis().unwrap() > 0);
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let error = FileInfo::require_file("content", temp_dir.path()).unwrap_err();
        assert!(error.is_not_found());
    }
}
