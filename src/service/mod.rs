//! ドキュメントサービス
//!
//! ファイルの読み書き・編集・Undo/Redo・置換をドキュメント単位でまとめる。
//! 編集はすべて [`DocumentService::update_content`] を通り、1回の編集につき履歴を1件追加する。

pub mod events;

pub use events::{DocumentEvent, DocumentListener, ListenerId};

use crate::config::EngineOptions;
use crate::document::{is_blank_path, Document, DocumentId, LineEnding, TextEncoding};
use crate::error::{DocumentError, FileError, Result};
use crate::file::{EncodingProcessor, FileSystem, LineEndingProcessor, ProgressReporter};
use crate::history::{UndoRedo, UndoRedoEngine};
use crate::search::{FindEngine, FindMatch, FindQuery, FindResult, ReplaceEngine, ReplaceOperation};
use events::EventNotifier;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// ディスクから読み込んだテキスト
struct LoadedText {
    content: String,
    size: u64,
    large: bool,
    encoding: TextEncoding,
}

/// ドキュメント操作の統合ポイント
pub struct DocumentService<U: UndoRedo = UndoRedoEngine> {
    fs: Arc<dyn FileSystem>,
    undo: U,
    options: EngineOptions,
    replace: ReplaceEngine,
    notifier: EventNotifier,
}

impl DocumentService<UndoRedoEngine> {
    pub fn new(fs: Arc<dyn FileSystem>, options: EngineOptions) -> Self {
        Self::with_undo(fs, UndoRedoEngine::new(), options)
    }
}

impl<U: UndoRedo> DocumentService<U> {
    /// 履歴エンジンを指定して作成
    pub fn with_undo(fs: Arc<dyn FileSystem>, undo: U, options: EngineOptions) -> Self {
        let find = FindEngine::with_case_folding(options.case_folding);
        Self {
            fs,
            undo,
            options,
            replace: ReplaceEngine::new(find),
            notifier: EventNotifier::default(),
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn undo_engine(&self) -> &U {
        &self.undo
    }

    pub fn find_engine(&self) -> &FindEngine {
        self.replace.find_engine()
    }

    pub fn replace_engine(&self) -> &ReplaceEngine {
        &self.replace
    }

    pub fn subscribe(&mut self, listener: impl DocumentListener + 'static) -> ListenerId {
        self.notifier.add_listener(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.notifier.remove_listener(id)
    }

    /// 空のドキュメントを作成し、空文字列をベースラインとして履歴を登録
    pub fn new_document(&mut self) -> Document {
        let doc = Document::new();
        self.undo.attach(doc.id(), doc.content());
        self.notifier.notify(DocumentEvent::Created { id: doc.id() });
        doc
    }

    /// ファイルを開く
    ///
    /// しきい値以上のファイルはチャンク単位で読み込み、読み取り専用にする。
    /// `encoding` が `None` のときはBOMの有無で判定する。
    pub async fn open(
        &mut self,
        path: &Path,
        encoding: Option<TextEncoding>,
        progress: Option<&dyn ProgressReporter>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Document> {
        let loaded = self.load_text(path, encoding, progress, cancel).await?;

        let mut doc = Document::new();
        doc.encoding = loaded.encoding;
        doc.set_content_privileged(loaded.content);
        if loaded.large {
            doc.mark_read_only(true);
            log::info!(
                "Opened {} as read-only ({} bytes >= {} bytes)",
                path.display(),
                loaded.size,
                self.options.large_file_threshold
            );
        }

        self.undo.attach(doc.id(), doc.content());
        doc.mark_saved(Some(path));

        self.notifier.notify(DocumentEvent::Opened {
            id: doc.id(),
            path: path.to_path_buf(),
            size: loaded.size,
            read_only: doc.is_read_only(),
        });
        Ok(doc)
    }

    /// 編集による内容変更（同じ内容なら何もしない）
    pub fn update_content(&mut self, doc: &mut Document, text: &str) -> Result<()> {
        if self.commit_edit(doc, text)? {
            self.notifier
                .notify(DocumentEvent::ContentChanged { id: doc.id() });
        }
        Ok(())
    }

    /// 保存し、保存先のパスを返す
    ///
    /// `path` が `None`（または空白のみ）のときは既存のパスへ保存する。
    /// 失敗・キャンセル時はドキュメントを変更しない。
    pub async fn save(
        &self,
        doc: &mut Document,
        path: Option<&Path>,
        progress: Option<&dyn ProgressReporter>,
        cancel: Option<&CancellationToken>,
    ) -> Result<PathBuf> {
        let target = path
            .filter(|p| !is_blank_path(p))
            .or_else(|| doc.file_path())
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                DocumentError::InvalidOperation("document has no file path to save to".into())
            })?;

        self.detect_conflict(doc).await;

        let text = match doc.eol {
            LineEnding::Lf => None,
            eol => Some(LineEndingProcessor::apply(doc.content(), eol)),
        };
        let text = text.as_deref().unwrap_or(doc.content());

        let size = EncodingProcessor::encoded_len(text, doc.encoding);
        if self.options.is_large(size) {
            log::debug!("Streaming save of {} bytes to {}", size, target.display());
            self.fs
                .write_large_file(&target, text, doc.encoding, progress, cancel)
                .await?;
        } else {
            log::debug!("Buffered save of {} bytes to {}", size, target.display());
            self.fs.write_all_text(&target, text, doc.encoding).await?;
        }

        doc.mark_saved(Some(&target));
        self.notifier.notify(DocumentEvent::Saved {
            id: doc.id(),
            path: target.clone(),
        });
        Ok(target)
    }

    /// 一つ前の内容に戻す。戻せる履歴がなければ `Ok(false)`
    pub fn undo(&mut self, doc: &mut Document) -> Result<bool> {
        if !self.undo.can_undo(doc.id()) {
            return Ok(false);
        }
        if doc.is_read_only() {
            return Err(DocumentError::ReadOnly { id: doc.id() });
        }
        let Some(text) = self.undo.undo(doc.id()).map(str::to_owned) else {
            return Ok(false);
        };
        doc.set_content(text)?;
        self.notifier.notify(DocumentEvent::UndoApplied { id: doc.id() });
        Ok(true)
    }

    /// 取り消した変更をやり直す。やり直せる履歴がなければ `Ok(false)`
    pub fn redo(&mut self, doc: &mut Document) -> Result<bool> {
        if !self.undo.can_redo(doc.id()) {
            return Ok(false);
        }
        if doc.is_read_only() {
            return Err(DocumentError::ReadOnly { id: doc.id() });
        }
        let Some(text) = self.undo.redo(doc.id()).map(str::to_owned) else {
            return Ok(false);
        };
        doc.set_content(text)?;
        self.notifier.notify(DocumentEvent::RedoApplied { id: doc.id() });
        Ok(true)
    }

    pub fn can_undo(&self, id: DocumentId) -> bool {
        self.undo.can_undo(id)
    }

    pub fn can_redo(&self, id: DocumentId) -> bool {
        self.undo.can_redo(id)
    }

    /// ドキュメント内を検索
    pub fn find(&self, doc: &Document, query: &FindQuery) -> FindResult {
        self.find_engine().find_all(doc.content(), query)
    }

    /// すべて置換し、置換件数を返す（履歴は1件）
    pub fn replace_all(&mut self, doc: &mut Document, op: &ReplaceOperation) -> Result<usize> {
        if doc.is_read_only() {
            return Err(DocumentError::ReadOnly { id: doc.id() });
        }
        let (text, count) = self.replace.replace_all(doc.content(), op);
        if count == 0 {
            return Ok(0);
        }
        self.commit_edit(doc, &text)?;
        self.notifier.notify(DocumentEvent::Replaced {
            id: doc.id(),
            count,
        });
        Ok(count)
    }

    /// キャレット以降（なければ先頭へ折り返し）のマッチを1件置換
    pub fn replace_next(
        &mut self,
        doc: &mut Document,
        op: &ReplaceOperation,
        caret: usize,
    ) -> Result<Option<FindMatch>> {
        if doc.is_read_only() {
            return Err(DocumentError::ReadOnly { id: doc.id() });
        }
        let (text, replaced) = self
            .replace
            .replace_next_at_or_after(doc.content(), op, caret);
        if replaced.is_some() {
            self.commit_edit(doc, &text)?;
            self.notifier.notify(DocumentEvent::Replaced {
                id: doc.id(),
                count: 1,
            });
        }
        Ok(replaced)
    }

    /// ディスクの内容で置き換え、履歴と変更フラグをリセット
    pub async fn reload(
        &mut self,
        doc: &mut Document,
        progress: Option<&dyn ProgressReporter>,
        cancel: Option<&CancellationToken>,
    ) -> Result<()> {
        let path = doc.file_path().map(Path::to_path_buf).ok_or_else(|| {
            DocumentError::InvalidOperation("document has no file path to reload from".into())
        })?;
        let loaded = self.load_text(&path, None, progress, cancel).await?;

        doc.encoding = loaded.encoding;
        doc.set_content_privileged(loaded.content);
        doc.mark_read_only(loaded.large);
        self.undo.attach(doc.id(), doc.content());
        doc.mark_saved(None);

        log::debug!("Reloaded {}", path.display());
        self.notifier.notify(DocumentEvent::Reloaded { id: doc.id() });
        Ok(())
    }

    /// ディスク上の内容が最後の保存時点から変わっているかを調べ、フラグに反映
    ///
    /// パス未設定・ファイルなしの場合は `Ok(false)`。
    pub async fn check_external_modification(&self, doc: &mut Document) -> Result<bool> {
        let Some(path) = doc.file_path().map(Path::to_path_buf) else {
            return Ok(false);
        };
        if !self.fs.file_exists(&path).await {
            return Ok(false);
        }

        let disk = self.fs.read_all_text(&path, doc.encoding).await?;
        let changed = !doc.matches_saved(&LineEndingProcessor::normalize_to_lf(&disk));
        doc.mark_external_modification(changed);
        if changed {
            log::warn!("{} was modified outside the editor", path.display());
            self.notifier
                .notify(DocumentEvent::ExternalModificationDetected { id: doc.id(), path });
        }
        Ok(changed)
    }

    /// セッション情報からドキュメントを復元
    pub fn restore(&mut self, content: &str, path: Option<&Path>, dirty: bool) -> Document {
        let mut doc = Document::new();
        doc.set_content_privileged(content);
        doc.mark_saved(path);
        if dirty {
            doc.mark_dirty_internal();
        }
        self.undo.attach(doc.id(), doc.content());
        self.notifier.notify(DocumentEvent::Created { id: doc.id() });
        doc
    }

    /// 履歴を破棄
    pub fn close(&mut self, id: DocumentId) {
        self.undo.clear(id);
        self.notifier.notify(DocumentEvent::Closed { id });
    }

    /// 内容を変更して履歴に1件追加。変更がなければ `Ok(false)`
    fn commit_edit(&mut self, doc: &mut Document, text: &str) -> Result<bool> {
        if doc.content() == text {
            return Ok(false);
        }
        doc.set_content(text)?;
        self.undo.push(doc.id(), doc.content());
        Ok(true)
    }

    async fn load_text(
        &self,
        path: &Path,
        encoding: Option<TextEncoding>,
        progress: Option<&dyn ProgressReporter>,
        cancel: Option<&CancellationToken>,
    ) -> Result<LoadedText> {
        if is_blank_path(path) {
            return Err(FileError::InvalidPath {
                path: path.display().to_string(),
            }
            .into());
        }
        if !self.fs.file_exists(path).await {
            return Err(FileError::NotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let size = self.fs.file_size(path).await?;
        let encoding = match encoding {
            Some(encoding) => encoding,
            None => self.fs.detect_encoding(path).await?,
        };

        let large = self.options.is_large(size);
        let raw = if large {
            log::debug!("Streaming read of {} ({} bytes)", path.display(), size);
            self.fs
                .read_large_file(path, encoding, progress, cancel)
                .await?
        } else {
            log::debug!("Buffered read of {} ({} bytes)", path.display(), size);
            self.fs.read_all_text(path, encoding).await?
        };

        Ok(LoadedText {
            content: LineEndingProcessor::normalize_to_lf(&raw),
            size,
            large,
            encoding,
        })
    }

    /// 保存前の競合検出（失敗しても保存は続行）
    async fn detect_conflict(&self, doc: &Document) {
        let Some(path) = doc.file_path() else {
            return;
        };
        if !self.fs.file_exists(path).await {
            return;
        }

        match self.fs.read_all_text(path, doc.encoding).await {
            Ok(disk) => {
                let disk = LineEndingProcessor::normalize_to_lf(&disk);
                if !doc.is_dirty() && disk != doc.content() {
                    log::warn!(
                        "{} changed on disk since it was loaded; overwriting",
                        path.display()
                    );
                    self.notifier
                        .notify(DocumentEvent::ExternalModificationDetected {
                            id: doc.id(),
                            path: path.to_path_buf(),
                        });
                }
            }
            Err(err) => {
                log::debug!("Skipped conflict check for {}: {}", path.display(), err);
            }
        }
    }
}
