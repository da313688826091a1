//! txtops - パス指定のテキストファイル操作ライブラリ
//!
//! 自動化ハーネスから呼び出される、状態を持たない読み書き操作群

// コアモジュール
pub mod config;
pub mod encoding;
pub mod error;
pub mod logging;

// ファイル操作
pub mod file;

// 公開API
pub use config::FileOpsConfig;
pub use encoding::TextEncoding;
pub use error::{ErrorCategory, Result, TxtError};
pub use file::FileOps;
