//! ドキュメント管理モジュール
//!
//! テキスト本体とメタデータ、ドキュメントの格納（ID→実体）とタブ順序を提供

pub mod store;
pub mod tabs;

pub use store::DocumentStore;
pub use tabs::{Tab, TabId, TabList};

use crate::error::{DocumentError, Result};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use uuid::Uuid;

/// ドキュメントの一意識別子（ドキュメントの生存期間中は不変）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 保存時に使用する改行コード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// \n (Unix)
    #[default]
    Lf,
    /// \r\n (Windows)
    Crlf,
    /// \r (Classic Mac)
    Cr,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
            LineEnding::Cr => "\r",
        }
    }
}

/// 読み書き時の文字エンコーディング
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// BOMなしUTF-8
    #[default]
    Utf8,
    /// BOM付きUTF-8（保存時にBOMを書き出す）
    Utf8Bom,
}

/// 編集中のテキストドキュメント
///
/// 内容はメモリ上では常に `\n` 改行に正規化されている。
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    file_path: Option<PathBuf>,
    content: String,
    dirty: bool,
    read_only: bool,
    external_modification: bool,
    created_at: SystemTime,
    updated_at: SystemTime,
    saved_hash: u64,
    /// 読み書き時のエンコーディング
    pub encoding: TextEncoding,
    /// 保存時の改行コード
    pub eol: LineEnding,
}

impl Document {
    /// 空のドキュメントを作成
    pub fn new() -> Self {
        let now = SystemTime::now();
        Self {
            id: DocumentId::new(),
            file_path: None,
            content: String::new(),
            dirty: false,
            read_only: false,
            external_modification: false,
            created_at: now,
            updated_at: now,
            saved_hash: content_hash(""),
            encoding: TextEncoding::default(),
            eol: LineEnding::default(),
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// 表示名（ファイル名、未保存なら "Untitled"）
    pub fn name(&self) -> String {
        self.file_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string())
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn has_external_modification(&self) -> bool {
        self.external_modification
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    pub fn updated_at(&self) -> SystemTime {
        self.updated_at
    }

    /// 最後に保存（または読み込み）した内容と一致するか
    pub fn matches_saved(&self, content: &str) -> bool {
        content_hash(content) == self.saved_hash
    }

    /// 内容を置き換える（編集経路）
    ///
    /// 読み取り専用ドキュメントでは [`DocumentError::ReadOnly`] を返す。
    pub fn set_content(&mut self, content: impl Into<String>) -> Result<()> {
        if self.read_only {
            return Err(DocumentError::ReadOnly { id: self.id });
        }
        self.content = content.into();
        self.dirty = !self.matches_saved(&self.content);
        self.touch();
        Ok(())
    }

    /// 読み取り専用チェックを行わずに内容を置き換える（読み込み・復元専用）
    ///
    /// 変更フラグには触れない。
    pub fn set_content_privileged(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.touch();
    }

    /// 内容を変えずに変更フラグを立てる（セッション復元用）
    pub fn mark_dirty_internal(&mut self) {
        self.dirty = true;
    }

    pub fn mark_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// 保存済みとしてマーク（空白のみのパスは無視）
    pub fn mark_saved(&mut self, path: Option<&Path>) {
        if let Some(path) = path.filter(|p| !is_blank_path(p)) {
            self.file_path = Some(path.to_path_buf());
        }
        self.dirty = false;
        self.external_modification = false;
        self.saved_hash = content_hash(&self.content);
        self.touch();
    }

    /// 外部変更フラグを設定（内容は変更しない）
    pub fn mark_external_modification(&mut self, value: bool) {
        self.external_modification = value;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = SystemTime::now();
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// 空文字列または空白のみのパスか
pub(crate) fn is_blank_path(path: &Path) -> bool {
    path.to_string_lossy().trim().is_empty()
}

fn content_hash(content: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}
