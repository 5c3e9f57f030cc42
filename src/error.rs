//! エラーハンドリングシステム
//!
//! ドキュメントエンジン全体で使用される統一されたエラー型を定義
//! 外部変更の検出（競合）はエラーではなくログとイベントで扱う

use crate::document::DocumentId;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

/// エンジン全体のエラー型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// ファイル操作エラー
    #[error("File operation failed: {0}")]
    File(#[from] FileError),

    /// 読み取り専用ドキュメントへの変更
    #[error("Cannot modify read-only document {id}")]
    ReadOnly { id: DocumentId },

    /// 呼び出し側の誤用（保存先パスなし等）
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// キャンセルトークンによる中断
    #[error("Operation cancelled")]
    Cancelled,
}

/// ファイル操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FileError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    #[error("Encoding error: {message}")]
    Encoding { message: String },

    #[error("IO error: {message}")]
    Io { message: String },
}

impl FileError {
    /// I/Oエラーをパス情報付きで分類
    pub fn from_io(error: std::io::Error, path: &Path) -> Self {
        let path = path.display().to_string();
        match error.kind() {
            ErrorKind::NotFound => FileError::NotFound { path },
            ErrorKind::PermissionDenied => FileError::PermissionDenied { path },
            ErrorKind::InvalidInput => FileError::InvalidPath { path },
            ErrorKind::InvalidData => FileError::Encoding {
                message: error.to_string(),
            },
            _ => FileError::Io {
                message: format!("{}: {}", path, error),
            },
        }
    }
}

/// エラーレベル分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    /// 利用者の操作で回復可能（別名保存など）
    Recoverable,
    /// プログラム側の誤用
    Usage,
    /// 利用者による中断
    Cancelled,
}

impl DocumentError {
    /// ホスト側で表示方法を決めるための分類
    pub fn level(&self) -> ErrorLevel {
        match self {
            DocumentError::File(_) => ErrorLevel::Recoverable,
            DocumentError::ReadOnly { .. } | DocumentError::InvalidOperation(_) => {
                ErrorLevel::Usage
            }
            DocumentError::Cancelled => ErrorLevel::Cancelled,
        }
    }

    /// ファイルが存在しないことによる失敗か
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocumentError::File(FileError::NotFound { .. }))
    }
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, DocumentError>;

/// 各モジュール固有のResult型
pub mod file {
    pub type Result<T> = std::result::Result<T, super::FileError>;
}

// std::io::Error から DocumentError への変換（パス不明時）
impl From<std::io::Error> for DocumentError {
    fn from(error: std::io::Error) -> Self {
        DocumentError::File(FileError::Io {
            message: error.to_string(),
        })
    }
}

// UTF-8エラーの変換
impl From<std::string::FromUtf8Error> for FileError {
    fn from(error: std::string::FromUtf8Error) -> Self {
        FileError::Encoding {
            message: format!(
                "invalid UTF-8 at byte {}",
                error.utf8_error().valid_up_to()
            ),
        }
    }
}
