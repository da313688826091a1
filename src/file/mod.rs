//! ファイル操作モジュール
//!
//! パス解決、低レベルI/O、メタデータ、ファイル操作本体

pub mod io;
pub mod metadata;
pub mod operations;
pub mod path;

pub use metadata::{FileInfo, LineEndingProcessor, LineEndingStyle};
pub use operations::FileOps;
pub use path::PathResolver;
