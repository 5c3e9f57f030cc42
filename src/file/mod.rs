//! ファイル操作モジュール
//!
//! - 読み書きは非同期（tokio）で、しきい値以上のファイルはチャンク単位で扱う
//! - チャンク単位の読み書きはキャンセルと進捗通知に対応
//! - 改行コードの変換はサービス側で行い、ここではバイト列とテキストの変換のみ

pub mod io;
pub mod memory;
pub mod metadata;

pub use io::{FileSystem, LocalFileSystem, ProgressReporter};
pub use memory::MemoryFileSystem;
pub use metadata::{EncodingProcessor, LineEndingProcessor};
