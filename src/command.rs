//! コマンドシステム
//!
//! ホスト側が所有するコマンド登録表。UIのメニューやキーバインドから名前で呼び出す。

use crate::error::Result;
use std::collections::HashMap;
use std::fmt;

/// エディタコマンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorCommand {
    New,
    Open,
    Save,
    SaveAs,
    Undo,
    Redo,
    Find,
    Replace,
}

impl EditorCommand {
    /// 全コマンド
    pub const ALL: [EditorCommand; 8] = [
        EditorCommand::New,
        EditorCommand::Open,
        EditorCommand::Save,
        EditorCommand::SaveAs,
        EditorCommand::Undo,
        EditorCommand::Redo,
        EditorCommand::Find,
        EditorCommand::Replace,
    ];

    /// 文字列からコマンドを作成（未知の名前は `None`）
    pub fn from_string(cmd: &str) -> Option<Self> {
        match cmd {
            "new" => Some(EditorCommand::New),
            "open" => Some(EditorCommand::Open),
            "save" => Some(EditorCommand::Save),
            "save-as" => Some(EditorCommand::SaveAs),
            "undo" => Some(EditorCommand::Undo),
            "redo" => Some(EditorCommand::Redo),
            "find" => Some(EditorCommand::Find),
            "replace" => Some(EditorCommand::Replace),
            _ => None,
        }
    }

    /// コマンド名
    pub fn name(&self) -> &'static str {
        match self {
            EditorCommand::New => "new",
            EditorCommand::Open => "open",
            EditorCommand::Save => "save",
            EditorCommand::SaveAs => "save-as",
            EditorCommand::Undo => "undo",
            EditorCommand::Redo => "redo",
            EditorCommand::Find => "find",
            EditorCommand::Replace => "replace",
        }
    }

    /// コマンドの説明を取得
    pub fn description(&self) -> &'static str {
        match self {
            EditorCommand::New => "新しいドキュメントを作成",
            EditorCommand::Open => "ファイルを開く",
            EditorCommand::Save => "ドキュメントを保存",
            EditorCommand::SaveAs => "別名でファイルを保存",
            EditorCommand::Undo => "直前の操作を取り消し",
            EditorCommand::Redo => "取り消した操作をやり直し",
            EditorCommand::Find => "検索",
            EditorCommand::Replace => "置換",
        }
    }
}

impl fmt::Display for EditorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type Handler = Box<dyn FnMut() -> Result<()> + Send>;

/// コマンド登録表
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<EditorCommand, Handler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// ハンドラを登録（既存の登録は置き換え）
    pub fn register<F>(&mut self, command: EditorCommand, handler: F)
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        if self.handlers.insert(command, Box::new(handler)).is_some() {
            log::debug!("Replaced handler for command '{}'", command);
        }
    }

    pub fn unregister(&mut self, command: EditorCommand) -> bool {
        self.handlers.remove(&command).is_some()
    }

    pub fn is_registered(&self, command: EditorCommand) -> bool {
        self.handlers.contains_key(&command)
    }

    /// コマンドを実行
    ///
    /// ハンドラ未登録なら `Ok(false)`。ハンドラのエラーはそのまま返す。
    pub fn invoke(&mut self, command: EditorCommand) -> Result<bool> {
        let Some(handler) = self.handlers.get_mut(&command) else {
            log::debug!("No handler registered for command '{}'", command);
            return Ok(false);
        };
        handler()?;
        Ok(true)
    }

    /// 名前でコマンドを実行（未知の名前は `Ok(false)`）
    pub fn invoke_by_name(&mut self, name: &str) -> Result<bool> {
        match EditorCommand::from_string(name) {
            Some(command) => self.invoke(command),
            None => Ok(false),
        }
    }
}
