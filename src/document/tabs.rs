//! タブ順序管理
//!
//! 表示順とドキュメントIDの対応のみを持つ。ドキュメント本体は
//! [`DocumentStore`] が所有し、タブはアクセスのたびにIDで引き直す。

use super::{Document, DocumentId, DocumentStore};
use uuid::Uuid;

/// タブの一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(Uuid);

impl TabId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// タブ1件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: TabId,
    /// 参照先ドキュメント（所有しない）
    pub document_id: DocumentId,
    pub is_active: bool,
    pub title: String,
}

/// 順序付きタブ一覧
///
/// 空でない限り、操作後にアクティブなタブはちょうど1つ。
#[derive(Debug, Default)]
pub struct TabList {
    tabs: Vec<Tab>,
}

impl TabList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// ドキュメントのタブを末尾に追加してアクティブにする
    pub fn add(&mut self, document: &Document) -> TabId {
        let tab = Tab {
            id: TabId::new(),
            document_id: document.id(),
            is_active: false,
            title: document.name(),
        };
        let id = tab.id;
        self.tabs.push(tab);
        self.activate(id);
        id
    }

    /// 指定タブをアクティブにする（存在しなければ何もしない）
    pub fn activate(&mut self, tab_id: TabId) -> bool {
        if !self.tabs.iter().any(|tab| tab.id == tab_id) {
            return false;
        }
        for tab in &mut self.tabs {
            tab.is_active = tab.id == tab_id;
        }
        true
    }

    /// タブを閉じる。アクティブだった場合は最も近いタブをアクティブにする
    pub fn close(&mut self, tab_id: TabId) -> Option<Tab> {
        let index = self.position(tab_id)?;
        let removed = self.tabs.remove(index);
        if removed.is_active && !self.tabs.is_empty() {
            let next = index.min(self.tabs.len() - 1);
            self.tabs[next].is_active = true;
        }
        Some(removed)
    }

    /// 指定タブ以外をすべて閉じ、閉じたタブを右から順に返す
    pub fn close_others(&mut self, keep: TabId) -> Vec<Tab> {
        if self.position(keep).is_none() {
            return Vec::new();
        }
        let to_close: Vec<TabId> = self
            .tabs
            .iter()
            .rev()
            .filter(|tab| tab.id != keep)
            .map(|tab| tab.id)
            .collect();
        to_close.into_iter().filter_map(|id| self.close(id)).collect()
    }

    /// 指定タブより右のタブを閉じ、閉じたタブを右から順に返す
    pub fn close_right(&mut self, from: TabId) -> Vec<Tab> {
        let Some(index) = self.position(from) else {
            return Vec::new();
        };
        let to_close: Vec<TabId> = self.tabs[index + 1..]
            .iter()
            .rev()
            .map(|tab| tab.id)
            .collect();
        to_close.into_iter().filter_map(|id| self.close(id)).collect()
    }

    /// 次のタブをアクティブにする（末尾から先頭へ折り返し）
    pub fn activate_next(&mut self) -> Option<TabId> {
        self.activate_offset(1)
    }

    /// 前のタブをアクティブにする（先頭から末尾へ折り返し）
    pub fn activate_previous(&mut self) -> Option<TabId> {
        self.activate_offset(-1)
    }

    pub fn active(&self) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.is_active)
    }

    /// アクティブタブのドキュメントを格納から引く
    pub fn active_document<'a>(&self, store: &'a DocumentStore) -> Option<&'a Document> {
        self.active().and_then(|tab| store.get(tab.document_id))
    }

    /// ドキュメントIDからタブを探す
    pub fn find_by_document(&self, document_id: DocumentId) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.document_id == document_id)
    }

    /// タイトルをドキュメント名に合わせて更新（格納にないものはそのまま）
    pub fn refresh_titles(&mut self, store: &DocumentStore) {
        for tab in &mut self.tabs {
            if let Some(doc) = store.get(tab.document_id) {
                tab.title = doc.name();
            }
        }
    }

    fn position(&self, tab_id: TabId) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.id == tab_id)
    }

    fn activate_offset(&mut self, offset: isize) -> Option<TabId> {
        if self.tabs.is_empty() {
            return None;
        }
        let len = self.tabs.len() as isize;
        let current = self.tabs.iter().position(|tab| tab.is_active).unwrap_or(0) as isize;
        let next = (current + offset).rem_euclid(len) as usize;
        let id = self.tabs[next].id;
        self.activate(id);
        Some(id)
    }
}
