//! ファイル操作コア機能
//!
//! パスを受け取り、内容またはパスを返すステートレスな操作群。
//! 各呼び出しは独立しており、呼び出し間で状態を共有しない。

use crate::config::FileOpsConfig;
use crate::error::{IoContext, Result};
use crate::file::io::{
    append_bytes, atomic_write, copy_then_remove, ensure_parent_dirs, remove_if_present,
    verified_copy,
};
use crate::file::metadata::{FileInfo, LineEndingProcessor};
use crate::file::path::{self, PathResolver};
use std::fs;
use std::path::{Path, PathBuf};

/// テキストファイル操作
#[derive(Debug, Clone)]
pub struct FileOps {
    config: FileOpsConfig,
    resolver: PathResolver,
}

impl Default for FileOps {
    fn default() -> Self {
        Self::new(FileOpsConfig::default())
    }
}

impl FileOps {
    pub fn new(config: FileOpsConfig) -> Self {
        let resolver = PathResolver::new(&config);
        Self { config, resolver }
    }

    pub fn config(&self) -> &FileOpsConfig {
        &self.config
    }

    /// 一時ディレクトリ配下の作業用パス
    pub fn working_path<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        self.config.temp_dir.join(name)
    }

    /// ファイル全体をテキストとして読み込み（改行・BOM はそのまま）
    pub fn content(&self, path: &str) -> Result<String> {
        let resolved = self.resolver.resolve("content", "path", path)?;
        self.read_text("content", &resolved)
    }

    /// 論理行をカンマで連結した文字列
    ///
    /// 行の中のカンマはエスケープしないため、結果を再分割すると行数が変わりうる。
    pub fn as_list(&self, path: &str) -> Result<String> {
        let resolved = self.resolver.resolve("asList", "path", path)?;
        let content = self.read_text("asList", &resolved)?;

        let lines = LineEndingProcessor::split_logical_lines(&content);
        log::debug!(
            "asList: {} lines ({:?}) from {}",
            lines.len(),
            LineEndingProcessor::detect_line_endings(&content),
            resolved.display()
        );
        Ok(LineEndingProcessor::join_lines(&lines))
    }

    /// 最終更新時刻（エポックミリ秒の10進文字列）
    pub fn lastmod(&self, path: &str) -> Result<String> {
        let resolved = self.resolver.resolve("lastmod", "path", path)?;
        let info = FileInfo::require_file("lastmod", &resolved)?;
        Ok(info.modified_millis()?.to_string())
    }

    /// ファイルサイズ（バイト数の10進文字列）
    pub fn size(&self, path: &str) -> Result<String> {
        let resolved = self.resolver.resolve("size", "path", path)?;
        let info = FileInfo::require_file("size", &resolved)?;
        Ok(info.size.to_string())
    }

    /// コピー（コピー先の親ディレクトリは自動作成、既存ファイルは上書き）
    pub fn copy(&self, source: &str, destination: &str) -> Result<String> {
        let from = self.resolver.resolve("copy", "source", source)?;
        let to = self.resolver.resolve("copy", "destination", destination)?;
        FileInfo::require_file("copy", &from)?;

        log::debug!("copy: {} -> {}", from.display(), to.display());
        verified_copy("copy", &from, &to)?;
        Ok(destination.to_string())
    }

    /// 移動
    ///
    /// まずリネームを試み、失敗した場合はコピーの長さを検証してから元ファイルを削除する。
    /// 移動元はコピー先が完全に書き込まれるまで削除されない。
    pub fn move_file(&self, source: &str, destination: &str) -> Result<String> {
        let from = self.resolver.resolve("move", "source", source)?;
        let to = self.resolver.resolve("move", "destination", destination)?;
        FileInfo::require_file("move", &from)?;

        if same_file(&from, &to) {
            log::debug!("move: {} is already at destination", from.display());
            return Ok(destination.to_string());
        }

        ensure_parent_dirs("move", &to)?;
        log::debug!("move: {} -> {}", from.display(), to.display());

        if let Err(rename_error) = fs::rename(&from, &to) {
            log::warn!(
                "move: rename {} -> {} failed ({}), falling back to copy and delete",
                from.display(),
                to.display(),
                rename_error
            );
            copy_then_remove("move", &from, &to)?;
        }

        Ok(destination.to_string())
    }

    /// 削除（存在しないパスでもエラーにしない）
    pub fn delete(&self, path: &str) -> Result<String> {
        let resolved = self.resolver.resolve("delete", "path", path)?;
        if remove_if_present("delete", &resolved)? {
            log::debug!("delete: removed {}", resolved.display());
        } else {
            log::debug!("delete: {} was already absent", resolved.display());
        }
        Ok(path.to_string())
    }

    /// 内容を丸ごと置き換え
    pub fn overwrite(&self, path: &str, content: &str) -> Result<String> {
        let resolved = self.resolver.resolve("overwrite", "path", path)?;
        let bytes = self.encode("overwrite", &resolved, content)?;

        log::debug!("overwrite: {} bytes to {}", bytes.len(), resolved.display());
        atomic_write("overwrite", &resolved, &bytes)?;
        Ok(path.to_string())
    }

    /// 末尾に追記（新規ファイルは overwrite と同じ）
    pub fn append(&self, path: &str, content: &str) -> Result<String> {
        let resolved = self.resolver.resolve("append", "path", path)?;
        let bytes = self.encode("append", &resolved, content)?;

        let info = FileInfo::analyze("append", &resolved)?;
        if !info.exists {
            log::debug!("append: creating {}", resolved.display());
            atomic_write("append", &resolved, &bytes)?;
        } else {
            log::debug!("append: {} bytes to {}", bytes.len(), resolved.display());
            append_bytes("append", &resolved, &bytes)?;
        }
        Ok(path.to_string())
    }

    /// 先頭に挿入（overwrite(path, content + 既存の内容) と同等）
    pub fn prepend(&self, path: &str, content: &str) -> Result<String> {
        let resolved = self.resolver.resolve("prepend", "path", path)?;
        let mut bytes = self.encode("prepend", &resolved, content)?;

        let info = FileInfo::analyze("prepend", &resolved)?;
        if info.exists {
            let existing = fs::read(&resolved).existing_context("prepend", &resolved)?;
            bytes.extend_from_slice(&existing);
        }

        log::debug!("prepend: {} bytes to {}", bytes.len(), resolved.display());
        atomic_write("prepend", &resolved, &bytes)?;
        Ok(path.to_string())
    }

    /// 最後のパス要素
    pub fn name(&self, path: &str) -> Result<String> {
        path::require_path("name", "path", path)?;
        Ok(path::file_name(path))
    }

    /// 親ディレクトリ
    pub fn dir(&self, path: &str) -> Result<String> {
        path::require_path("dir", "path", path)?;
        Ok(path::parent_dir(path))
    }

    fn read_text(&self, operation: &str, path: &Path) -> Result<String> {
        FileInfo::require_file(operation, path)?;
        let bytes = fs::read(path).existing_context(operation, path)?;
        self.config
            .encoding
            .decode(&bytes)
            .map_err(|e| e.at(operation, path))
    }

    fn encode(&self, operation: &str, path: &Path, content: &str) -> Result<Vec<u8>> {
        self.config
            .encoding
            .encode(content)
            .map_err(|e| e.at(operation, path))
    }
}

/// 同一ファイルかどうか（移動先が存在しない場合は別ファイル）
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::TextEncoding;
    use crate::error::{ErrorCategory, TxtError};
    use tempfile::tempdir;

    fn path_str(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_content_is_verbatim() {
        let temp_dir = tempdir().unwrap();
        let target = temp_dir.path().join("verbatim.txt");
        let text = "\u{FEFF}  line1\r\nline2\n  ";
        fs::write(&target, text).unwrap();

        let ops = FileOps::default();
        assert_eq!(ops.content(&path_str(&target)).unwrap(), text);
    }

    #[test]
    fn test_as_list_known_comma_limitation() {
        let temp_dir = tempdir().unwrap();
        let target = temp_dir.path().join("commas.txt");
        fs::write(&target, "a,b\nc").unwrap();

        // 行内のカンマはエスケープされない
        let ops = FileOps::default();
        let joined = ops.as_list(&path_str(&target)).unwrap();
        assert_eq!(joined, "a,b,c");
        assert_eq!(joined.split(',').count(), 3);
    }

    #[test]
    fn test_as_list_empty_file() {
        let temp_dir = tempdir().unwrap();
        let target = temp_dir.path().join("empty.txt");
        fs::write(&target, "").unwrap();

        assert_eq!(FileOps::default().as_list(&path_str(&target)).unwrap(), "");
    }

    #[test]
    fn test_read_operations_on_directory() {
        let temp_dir = tempdir().unwrap();
        let dir = path_str(temp_dir.path());
        let ops = FileOps::default();

        assert!(ops.content(&dir).unwrap_err().is_not_found());
        assert!(ops.size(&dir).unwrap_err().is_not_found());
        assert!(ops.lastmod(&dir).unwrap_err().is_not_found());
    }

    #[test]
    fn test_decode_failure_is_io_category() {
        let temp_dir = tempdir().unwrap();
        let target = temp_dir.path().join("latin1.txt");
        fs::write(&target, [0x63, 0x61, 0x66, 0xE9]).unwrap();

        let utf8 = FileOps::default();
        let error = utf8.content(&path_str(&target)).unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Io);

        let latin1 =
            FileOps::new(FileOpsConfig::default().with_encoding(TextEncoding::Iso8859_1));
        assert_eq!(latin1.content(&path_str(&target)).unwrap(), "café");
    }

    #[test]
    fn test_encode_failure_leaves_target_untouched() {
        let temp_dir = tempdir().unwrap();
        let target = temp_dir.path().join("ascii.txt");
        fs::write(&target, "original").unwrap();

        let ascii = FileOps::new(FileOpsConfig::default().with_encoding(TextEncoding::UsAscii));
        let error = ascii.overwrite(&path_str(&target), "café").unwrap_err();
        assert!(matches!(error, TxtError::Encoding { .. }));
        assert_eq!(fs::read_to_string(&target).unwrap(), "original");
    }

    #[test]
    fn test_encoding_errors_carry_operation_and_path() {
        let temp_dir = tempdir().unwrap();
        let target = temp_dir.path().join("ascii.txt");
        let target_str = path_str(&target);
        let ascii = FileOps::new(FileOpsConfig::default().with_encoding(TextEncoding::UsAscii));

        for (operation, result) in [
            ("overwrite", ascii.overwrite(&target_str, "café")),
            ("append", ascii.append(&target_str, "café")),
            ("prepend", ascii.prepend(&target_str, "café")),
        ] {
            match result {
                Err(TxtError::Encoding { operation: op, path, encoding, .. }) => {
                    assert_eq!(op, operation);
                    assert_eq!(path, target_str);
                    assert_eq!(encoding, "US-ASCII");
                }
                other => panic!("Expected Encoding error, got {:?}", other),
            }
        }
        assert!(!target.exists());

        fs::write(&target, [0x63, 0xE9]).unwrap();
        for (operation, result) in [
            ("content", ascii.content(&target_str)),
            ("asList", ascii.as_list(&target_str)),
        ] {
            match result {
                Err(TxtError::Encoding { operation: op, path, message, .. }) => {
                    assert_eq!(op, operation);
                    assert_eq!(path, target_str);
                    assert!(message.contains("offset 1"));
                }
                other => panic!("Expected Encoding error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_utf16_round_trip_through_prepend() {
        let temp_dir = tempdir().unwrap();
        let target = path_str(&temp_dir.path().join("utf16.txt"));
        let ops = FileOps::new(FileOpsConfig::default().with_encoding(TextEncoding::Utf16Le));

        ops.overwrite(&target, "world").unwrap();
        ops.prepend(&target, "hello ").unwrap();
        assert_eq!(ops.size(&target).unwrap(), "22");
        assert_eq!(ops.content(&target).unwrap(), "hello world");
    }

    #[test]
    fn test_move_onto_itself_keeps_file() {
        let temp_dir = tempdir().unwrap();
        let target = path_str(&temp_dir.path().join("stay.txt"));
        let ops = FileOps::default();
        ops.overwrite(&target, "stay").unwrap();

        assert_eq!(ops.move_file(&target, &target).unwrap(), target);
        assert_eq!(ops.content(&target).unwrap(), "stay");
    }

    #[test]
    fn test_delete_directory_is_io_error() {
        let temp_dir = tempdir().unwrap();
        let error = FileOps::default()
            .delete(&path_str(temp_dir.path()))
            .unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Io);
        assert!(temp_dir.path().exists());
    }

    #[test]
    fn test_empty_path_is_invalid_argument() {
        let ops = FileOps::default();
        for result in [
            ops.content(""),
            ops.as_list(" "),
            ops.delete(""),
            ops.overwrite("", "x"),
            ops.copy("", "b.txt"),
            ops.move_file("a.txt", ""),
            ops.name(""),
            ops.dir(""),
        ] {
            assert_eq!(result.unwrap_err().category(), ErrorCategory::InvalidArgument);
        }
    }

    #[test]
    fn test_base_dir_resolution() {
        let temp_dir = tempdir().unwrap();
        let ops = FileOps::new(FileOpsConfig::default().with_base_dir(temp_dir.path()));

        assert_eq!(ops.overwrite("nested/rel.txt", "relative").unwrap(), "nested/rel.txt");
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("nested").join("rel.txt")).unwrap(),
            "relative"
        );
        assert_eq!(ops.content("nested/rel.txt").unwrap(), "relative");
    }

    #[test]
    fn test_working_path_uses_temp_dir() {
        let ops = FileOps::new(FileOpsConfig::default().with_temp_dir("/scratch"));
        assert_eq!(ops.config().temp_dir, PathBuf::from("/scratch"));
        assert_eq!(
            ops.working_path("FileTest_content"),
            PathBuf::from("/scratch/FileTest_content")
        );
    }
}
