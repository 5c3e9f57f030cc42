//! 検索エンジン
//!
//! リテラル文字列の全件検索と、結果上の循環ナビゲーション

use super::types::{CaseFolding, FindMatch, FindQuery, FindResult};

/// 状態を持たない検索エンジン
#[derive(Debug, Default, Clone, Copy)]
pub struct FindEngine {
    case_folding: CaseFolding,
}

impl FindEngine {
    /// 既定（Ordinal）の比較方法で作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 大文字小文字を区別しない比較の方法を指定して作成
    pub fn with_case_folding(case_folding: CaseFolding) -> Self {
        Self { case_folding }
    }

    pub fn case_folding(&self) -> CaseFolding {
        self.case_folding
    }

    /// 全マッチを左から順に求める
    ///
    /// 生のヒットごとに（単語境界で棄却されたものも含め）検索語の長さだけ進むため、
    /// マッチは昇順かつ重ならない。
    pub fn find_all(&self, text: &str, query: &FindQuery) -> FindResult {
        let pattern: Vec<char> = query.term().chars().collect();
        if pattern.is_empty() {
            return FindResult::new(query.clone(), Vec::new());
        }

        let chars: Vec<char> = text.chars().collect();
        let step = pattern.len().max(1);
        let mut matches = Vec::new();
        let mut index = 0usize;

        while index + pattern.len() <= chars.len() {
            let Some(found) = self.index_of(&chars, &pattern, index, query.match_case()) else {
                break;
            };

            if !query.whole_word() || is_whole_word(&chars, found, pattern.len()) {
                matches.push(FindMatch::new(found, pattern.len()));
            }
            index = found + step;
        }

        FindResult::new(query.clone(), matches)
    }

    /// 次のマッチ番号（末尾から先頭へ折り返し）
    ///
    /// `current` が `None` のときは先頭より前とみなす。マッチがなければ `None`。
    pub fn find_next_index(&self, result: &FindResult, current: Option<usize>) -> Option<usize> {
        let count = result.len();
        if count == 0 {
            return None;
        }
        match current {
            None => Some(0),
            Some(index) => Some((index % count + 1) % count),
        }
    }

    /// 前のマッチ番号（先頭から末尾へ折り返し）
    pub fn find_previous_index(
        &self,
        result: &FindResult,
        current: Option<usize>,
    ) -> Option<usize> {
        let count = result.len();
        if count == 0 {
            return None;
        }
        match current {
            None => Some(count - 1),
            Some(index) => Some((index % count + count - 1) % count),
        }
    }

    fn index_of(
        &self,
        chars: &[char],
        pattern: &[char],
        from: usize,
        match_case: bool,
    ) -> Option<usize> {
        let last_start = chars.len().checked_sub(pattern.len())?;
        (from..=last_start).find(|&start| {
            chars[start..start + pattern.len()]
                .iter()
                .zip(pattern)
                .all(|(&a, &b)| self.chars_equal(a, b, match_case))
        })
    }

    fn chars_equal(&self, a: char, b: char, match_case: bool) -> bool {
        if match_case {
            a == b
        } else {
            self.case_folding.chars_equal(a, b)
        }
    }
}

fn is_whole_word(chars: &[char], start: usize, length: usize) -> bool {
    let left_ok = start == 0 || !chars[start - 1].is_alphanumeric();
    let end = start + length;
    let right_ok = end >= chars.len() || !chars[end].is_alphanumeric();
    left_ok && right_ok
}
