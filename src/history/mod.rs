//! 編集履歴（Undo/Redo）
//!
//! ドキュメントごとに全文スナップショットの列とカーソルを保持する。
//! 先頭のスナップショットはベースライン（attach時点の内容）で、それより前には戻れない。

use crate::document::DocumentId;
use std::collections::HashMap;

/// ドキュメントID単位のUndo/Redo操作
pub trait UndoRedo {
    /// 履歴を `[baseline]` で初期化（既存の履歴は破棄）
    fn attach(&mut self, id: DocumentId, baseline: &str);

    /// スナップショットを追加し、カーソル以降（Redo分岐）を破棄
    fn push(&mut self, id: DocumentId, text: &str);

    /// 一つ前のスナップショットを返す。ベースラインにいる場合は `None`
    fn undo(&mut self, id: DocumentId) -> Option<&str>;

    /// 一つ後のスナップショットを返す。末尾にいる場合は `None`
    fn redo(&mut self, id: DocumentId) -> Option<&str>;

    fn can_undo(&self, id: DocumentId) -> bool;

    fn can_redo(&self, id: DocumentId) -> bool;

    /// 履歴を破棄（未登録なら何もしない）
    fn clear(&mut self, id: DocumentId);
}

/// 1ドキュメント分の履歴
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHistory {
    snapshots: Vec<String>,
    cursor: usize,
}

impl DocumentHistory {
    pub fn new(baseline: &str) -> Self {
        Self {
            snapshots: vec![baseline.to_string()],
            cursor: 0,
        }
    }

    pub fn push(&mut self, text: &str) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(text.to_string());
        self.cursor = self.snapshots.len() - 1;
    }

    pub fn undo(&mut self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.current()
    }

    pub fn redo(&mut self) -> Option<&str> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.current()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// カーソル位置のスナップショット
    pub fn current(&self) -> Option<&str> {
        self.snapshots.get(self.cursor).map(String::as_str)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// 保持しているスナップショット数（ベースライン含む）
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// 全ドキュメントの履歴を管理するエンジン
#[derive(Debug, Default)]
pub struct UndoRedoEngine {
    histories: HashMap<DocumentId, DocumentHistory>,
}

impl UndoRedoEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracked(&self, id: DocumentId) -> bool {
        self.histories.contains_key(&id)
    }

    /// 保持しているスナップショット数（未登録なら0）
    pub fn depth(&self, id: DocumentId) -> usize {
        self.histories.get(&id).map_or(0, DocumentHistory::len)
    }

    pub fn history(&self, id: DocumentId) -> Option<&DocumentHistory> {
        self.histories.get(&id)
    }
}

impl UndoRedo for UndoRedoEngine {
    fn attach(&mut self, id: DocumentId, baseline: &str) {
        self.histories.insert(id, DocumentHistory::new(baseline));
    }

    fn push(&mut self, id: DocumentId, text: &str) {
        self.histories
            .entry(id)
            .or_insert_with(|| DocumentHistory::new(text))
            .push(text);
    }

    fn undo(&mut self, id: DocumentId) -> Option<&str> {
        self.histories.get_mut(&id)?.undo()
    }

    fn redo(&mut self, id: DocumentId) -> Option<&str> {
        self.histories.get_mut(&id)?.redo()
    }

    fn can_undo(&self, id: DocumentId) -> bool {
        self.histories.get(&id).is_some_and(DocumentHistory::can_undo)
    }

    fn can_redo(&self, id: DocumentId) -> bool {
        self.histories.get(&id).is_some_and(DocumentHistory::can_redo)
    }

    fn clear(&mut self, id: DocumentId) {
        self.histories.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cannot_undo_past_baseline() {
        let mut engine = UndoRedoEngine::new();
        let id = DocumentId::new();
        engine.attach(id, "X");
        assert!(!engine.can_undo(id));
        assert_eq!(engine.undo(id), None);
        assert!(!engine.can_redo(id));
    }

    #[test]
    fn undo_then_redo_walks_history() {
        let mut engine = UndoRedoEngine::new();
        let id = DocumentId::new();
        engine.attach(id, "X");
        engine.push(id, "A");
        engine.push(id, "B");

        assert_eq!(engine.undo(id), Some("A"));
        assert_eq!(engine.undo(id), Some("X"));
        assert_eq!(engine.undo(id), None);
        assert_eq!(engine.redo(id), Some("A"));
        assert_eq!(engine.redo(id), Some("B"));
        assert_eq!(engine.redo(id), None);
    }

    #[test]
    fn push_after_undo_discards_redo_branch() {
        let mut engine = UndoRedoEngine::new();
        let id = DocumentId::new();
        engine.attach(id, "X");
        engine.push(id, "A");
        engine.push(id, "B");
        engine.undo(id);
        engine.undo(id);
        engine.push(id, "C");

        assert!(!engine.can_redo(id));
        assert_eq!(engine.redo(id), None);
        assert_eq!(engine.depth(id), 2);
        assert_eq!(engine.undo(id), Some("X"));
    }

    #[test]
    fn push_without_attach_uses_degenerate_baseline() {
        let mut engine = UndoRedoEngine::new();
        let id = DocumentId::new();
        engine.push(id, "first");

        assert!(engine.is_tracked(id));
        assert_eq!(engine.depth(id), 2);
        assert!(engine.can_undo(id));
        assert_eq!(engine.undo(id), Some("first"));
        assert!(!engine.can_undo(id));
    }

    #[test]
    fn attach_hard_resets() {
        let mut engine = UndoRedoEngine::new();
        let id = DocumentId::new();
        engine.attach(id, "X");
        engine.push(id, "A");
        engine.attach(id, "Y");

        assert_eq!(engine.depth(id), 1);
        assert!(!engine.can_undo(id));
        assert_eq!(engine.history(id).unwrap().current(), Some("Y"));
    }

    #[test]
    fn clear_drops_history_and_ignores_unknown() {
        let mut engine = UndoRedoEngine::new();
        let id = DocumentId::new();
        engine.attach(id, "X");
        engine.push(id, "A");
        engine.clear(id);
        engine.clear(DocumentId::new());

        assert!(!engine.is_tracked(id));
        assert!(!engine.can_undo(id));
        assert_eq!(engine.undo(id), None);
    }

    #[test]
    fn histories_are_independent() {
        let mut engine = UndoRedoEngine::new();
        let first = DocumentId::new();
        let second = DocumentId::new();
        engine.attach(first, "1");
        engine.attach(second, "2");
        engine.push(first, "1a");

        assert!(engine.can_undo(first));
        assert!(!engine.can_undo(second));
        engine.clear(first);
        assert_eq!(engine.history(second).unwrap().current(), Some("2"));
    }
}
