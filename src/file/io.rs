//! ファイルI/O操作
//!
//! 親ディレクトリの自動作成、一時ファイル経由のアトミックな置き換え、
//! 長さ検証付きのコピー

use crate::error::{IoContext, Result, TxtError};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// 親ディレクトリを作成
pub fn ensure_parent_dirs(operation: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).io_context(operation, parent)?;
        }
    }
    Ok(())
}

/// 同じディレクトリに一時ファイルを作成
fn sibling_temp_file(operation: &str, path: &Path) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".txtops").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // 新規ファイルは umask に従う
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir).io_context(operation, path)
}

/// 一時ファイルを対象パスへリネーム
fn persist(operation: &str, temp: NamedTempFile, path: &Path) -> Result<()> {
    temp.persist(path)
        .map(|_| ())
        .map_err(|e| TxtError::io(operation, path, &e.error))
}

/// 一時ファイルに書き込んでからアトミックに置き換え
///
/// 書き込み途中で失敗しても対象ファイルは元のまま残る。
pub fn atomic_write(operation: &str, path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent_dirs(operation, path)?;

    let mut temp = sibling_temp_file(operation, path)?;
    temp.write_all(bytes).io_context(operation, path)?;
    temp.as_file().sync_all().io_context(operation, path)?;

    // 既存ファイルの権限を引き継ぐ
    if let Ok(metadata) = fs::metadata(path) {
        if metadata.is_file() {
            temp.as_file()
                .set_permissions(metadata.permissions())
                .io_context(operation, path)?;
        }
    }

    persist(operation, temp, path)
}

/// 既存の内容の後ろに追記（ファイルがなければ作成）
pub fn append_bytes(operation: &str, path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent_dirs(operation, path)?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .io_context(operation, path)?;
    file.write_all(bytes).io_context(operation, path)?;
    file.sync_all().io_context(operation, path)
}

/// 長さを検証しながらコピー
///
/// 書き込んだバイト数が元ファイルの長さと一致した場合のみ配置する。
pub fn verified_copy(operation: &str, source: &Path, destination: &Path) -> Result<u64> {
    let mut reader = File::open(source).existing_context(operation, source)?;
    let source_metadata = reader.metadata().io_context(operation, source)?;
    let expected = source_metadata.len();

    ensure_parent_dirs(operation, destination)?;
    let mut temp = sibling_temp_file(operation, destination)?;

    let written = io::copy(&mut reader, temp.as_file_mut()).io_context(operation, destination)?;
    temp.as_file().sync_all().io_context(operation, destination)?;

    if written != expected {
        return Err(TxtError::Io {
            operation: operation.to_string(),
            path: destination.display().to_string(),
            kind: ErrorKind::WriteZero,
            message: format!("partial copy: wrote {} of {} bytes", written, expected),
        });
    }

    temp.as_file()
        .set_permissions(source_metadata.permissions())
        .io_context(operation, destination)?;

    persist(operation, temp, destination)?;
    Ok(written)
}

/// コピーしてから元ファイルを削除（リネームできない場合の移動）
///
/// 元ファイルはコピー先の配置が完了するまで削除しない。
pub fn copy_then_remove(operation: &str, source: &Path, destination: &Path) -> Result<u64> {
    let written = verified_copy(operation, source, destination)?;
    fs::remove_file(source).io_context(operation, source)?;
    Ok(written)
}

/// ファイル削除（存在しない場合は何もしない）
pub fn remove_if_present(operation: &str, path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(TxtError::io(operation, path, &e)),
    }
}
