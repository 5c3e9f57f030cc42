//! 検索関連の共通型

use serde::{Deserialize, Serialize};

/// 大文字小文字を区別しない比較の方法
///
/// ロケールに依存しないため、どの環境でも同じ結果になる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseFolding {
    /// 文字単位のUnicode小文字化で比較
    #[default]
    Ordinal,
    /// ASCII英字のみを同一視
    Ascii,
}

impl CaseFolding {
    /// 設定値の名前から解釈
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ordinal" => Some(CaseFolding::Ordinal),
            "ascii" => Some(CaseFolding::Ascii),
            _ => None,
        }
    }

    /// 2文字が同一とみなせるか
    pub fn chars_equal(self, a: char, b: char) -> bool {
        if a == b {
            return true;
        }
        match self {
            CaseFolding::Ordinal => a.to_lowercase().eq(b.to_lowercase()),
            CaseFolding::Ascii => a.eq_ignore_ascii_case(&b),
        }
    }
}

/// 検索条件
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FindQuery {
    term: String,
    match_case: bool,
    whole_word: bool,
}

impl FindQuery {
    pub fn new(term: impl Into<String>, match_case: bool, whole_word: bool) -> Self {
        Self {
            term: term.into(),
            match_case,
            whole_word,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn match_case(&self) -> bool {
        self.match_case
    }

    pub fn whole_word(&self) -> bool {
        self.whole_word
    }
}

/// 1件のマッチ（文字単位のオフセット）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindMatch {
    pub start: usize,
    pub length: usize,
}

impl FindMatch {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// 終了位置（排他的）
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// 検索結果：昇順かつ重なりのないマッチ列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindResult {
    query: FindQuery,
    matches: Vec<FindMatch>,
}

impl FindResult {
    pub(crate) fn new(query: FindQuery, matches: Vec<FindMatch>) -> Self {
        Self { query, matches }
    }

    pub fn query(&self) -> &FindQuery {
        &self.query
    }

    pub fn matches(&self) -> &[FindMatch] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// 置換操作：検索条件と置換文字列
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReplaceOperation {
    query: FindQuery,
    replacement: String,
}

impl ReplaceOperation {
    pub fn new(query: FindQuery, replacement: impl Into<String>) -> Self {
        Self {
            query,
            replacement: replacement.into(),
        }
    }

    pub fn query(&self) -> &FindQuery {
        &self.query
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }
}
