//! ドキュメントの格納
//!
//! ID→ドキュメントの唯一の所有者。タブなど他の構造はIDのみを保持する。

use super::{Document, DocumentId};
use std::collections::HashMap;

/// 開いているドキュメントの集合
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<DocumentId, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// ドキュメントを登録し、IDを返す
    pub fn insert(&mut self, document: Document) -> DocumentId {
        let id = document.id();
        self.documents.insert(id, document);
        id
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.get_mut(&id)
    }

    /// 作業集合から取り除く（論理的な破棄）
    pub fn remove(&mut self, id: DocumentId) -> Option<Document> {
        self.documents.remove(&id)
    }

    pub fn contains(&self, id: DocumentId) -> bool {
        self.documents.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    /// 未保存の変更を持つドキュメント
    pub fn dirty_documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values().filter(|doc| doc.is_dirty())
    }
}
