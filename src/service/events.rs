//! 変更通知
//!
//! ドキュメントサービスの操作結果をホスト側のリスナーへ配信する

use crate::document::DocumentId;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// リスナーの一意識別子
pub type ListenerId = usize;

/// ドキュメントに関するイベント
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    /// 新規作成
    Created { id: DocumentId },

    /// ファイルから読み込み
    Opened {
        id: DocumentId,
        path: PathBuf,
        size: u64,
        read_only: bool,
    },

    /// 編集による内容変更
    ContentChanged { id: DocumentId },

    UndoApplied { id: DocumentId },

    RedoApplied { id: DocumentId },

    /// 置換の適用（件数）
    Replaced { id: DocumentId, count: usize },

    /// 保存完了
    Saved { id: DocumentId, path: PathBuf },

    /// ディスクから再読み込み
    Reloaded { id: DocumentId },

    /// 最後の保存以降にディスク上の内容が変わっていた
    ExternalModificationDetected { id: DocumentId, path: PathBuf },

    /// 履歴の破棄
    Closed { id: DocumentId },
}

impl DocumentEvent {
    /// 対象ドキュメント
    pub fn document_id(&self) -> DocumentId {
        match self {
            DocumentEvent::Created { id }
            | DocumentEvent::Opened { id, .. }
            | DocumentEvent::ContentChanged { id }
            | DocumentEvent::UndoApplied { id }
            | DocumentEvent::RedoApplied { id }
            | DocumentEvent::Replaced { id, .. }
            | DocumentEvent::Saved { id, .. }
            | DocumentEvent::Reloaded { id }
            | DocumentEvent::ExternalModificationDetected { id, .. }
            | DocumentEvent::Closed { id } => *id,
        }
    }
}

/// イベントリスナー
pub trait DocumentListener: Send + Sync {
    fn on_event(&self, event: &DocumentEvent);
}

impl<F> DocumentListener for F
where
    F: Fn(&DocumentEvent) + Send + Sync,
{
    fn on_event(&self, event: &DocumentEvent) {
        self(event)
    }
}

/// リスナーの登録と配信（登録順に通知）
#[derive(Default)]
pub(crate) struct EventNotifier {
    listeners: BTreeMap<ListenerId, Box<dyn DocumentListener>>,
    next_listener_id: ListenerId,
}

impl EventNotifier {
    pub(crate) fn add_listener(&mut self, listener: Box<dyn DocumentListener>) -> ListenerId {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners.insert(id, listener);
        id
    }

    pub(crate) fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn notify(&self, event: DocumentEvent) {
        log::trace!("Dispatching {:?}", event);
        for listener in self.listeners.values() {
            listener.on_event(&event);
        }
    }
}
