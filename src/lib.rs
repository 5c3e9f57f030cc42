//! altre-document - テキストエディタのドキュメント編集コア
//!
//! ドキュメント・編集履歴・検索置換・ファイル入出力をUIから独立して提供する

// コアモジュール
pub mod config;
pub mod error;
pub mod logging;

// データ層
pub mod document;
pub mod file;
pub mod history;

// ロジック層
pub mod search;
pub mod service;

// ホスト連携
pub mod command;

// 公開API
pub use command::{CommandRegistry, EditorCommand};
pub use config::EngineOptions;
pub use document::{
    Document, DocumentId, DocumentStore, LineEnding, Tab, TabId, TabList, TextEncoding,
};
pub use error::{DocumentError, ErrorLevel, FileError, Result};
pub use file::{FileSystem, LocalFileSystem, MemoryFileSystem, ProgressReporter};
pub use history::{UndoRedo, UndoRedoEngine};
pub use search::{
    CaseFolding, FindEngine, FindMatch, FindQuery, FindResult, ReplaceEngine, ReplaceOperation,
};
pub use service::{DocumentEvent, DocumentListener, DocumentService, ListenerId};
pub use tokio_util::sync::CancellationToken;
