//! 置換エンジン
//!
//! 検索エンジンの結果（昇順・重なりなし）を一度の走査で置換する純粋関数群

use super::matcher::FindEngine;
use super::types::{FindMatch, ReplaceOperation};

/// 検索エンジン上に構築した置換エンジン
#[derive(Debug, Default, Clone, Copy)]
pub struct ReplaceEngine {
    find: FindEngine,
}

impl ReplaceEngine {
    pub fn new(find: FindEngine) -> Self {
        Self { find }
    }

    pub fn find_engine(&self) -> &FindEngine {
        &self.find
    }

    /// すべてのマッチを置換し、新しいテキストと置換件数を返す
    pub fn replace_all(&self, text: &str, op: &ReplaceOperation) -> (String, usize) {
        let result = self.find.find_all(text, op.query());
        if result.is_empty() {
            return (text.to_string(), 0);
        }

        let offsets = CharOffsets::new(text);
        let mut output = String::with_capacity(text.len());
        let mut last = 0usize;

        for m in result.matches() {
            let start = offsets.byte(m.start);
            output.push_str(&text[last..start]);
            output.push_str(op.replacement());
            last = offsets.byte(m.end());
        }
        output.push_str(&text[last..]);

        (output, result.len())
    }

    /// キャレット位置以降の最初のマッチを1件だけ置換する
    ///
    /// キャレット以降にマッチがなければ先頭のマッチへ折り返す。
    /// マッチが一件もなければ元のテキストと `None` を返す。
    pub fn replace_next_at_or_after(
        &self,
        text: &str,
        op: &ReplaceOperation,
        caret: usize,
    ) -> (String, Option<FindMatch>) {
        let result = self.find.find_all(text, op.query());
        let target = result
            .matches()
            .iter()
            .find(|m| m.start >= caret)
            .or_else(|| result.matches().first())
            .copied();

        let Some(target) = target else {
            return (text.to_string(), None);
        };

        let offsets = CharOffsets::new(text);
        let start = offsets.byte(target.start);
        let end = offsets.byte(target.end());

        let mut output =
            String::with_capacity(text.len() - (end - start) + op.replacement().len());
        output.push_str(&text[..start]);
        output.push_str(op.replacement());
        output.push_str(&text[end..]);

        (output, Some(target))
    }
}

/// 文字インデックス→バイト位置の対応表
struct CharOffsets {
    bytes: Vec<usize>,
}

impl CharOffsets {
    fn new(text: &str) -> Self {
        let mut bytes: Vec<usize> = text.char_indices().map(|(idx, _)| idx).collect();
        bytes.push(text.len());
        Self { bytes }
    }

    fn byte(&self, char_index: usize) -> usize {
        self.bytes
            .get(char_index)
            .copied()
            .unwrap_or_else(|| self.bytes[self.bytes.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::FindQuery;

    fn op(term: &str, match_case: bool, whole_word: bool, replacement: &str) -> ReplaceOperation {
        ReplaceOperation::new(FindQuery::new(term, match_case, whole_word), replacement)
    }

    #[test]
    fn replace_all_case_insensitive() {
        let engine = ReplaceEngine::default();
        let (text, count) = engine.replace_all("Foo foo FOO bar", &op("foo", false, false, "baz"));
        assert_eq!(text, "baz baz baz bar");
        assert_eq!(count, 3);
    }

    #[test]
    fn replace_all_without_matches_returns_original() {
        let engine = ReplaceEngine::default();
        let (text, count) = engine.replace_all("hello", &op("xyz", false, false, "abc"));
        assert_eq!(text, "hello");
        assert_eq!(count, 0);

        let (text, count) = engine.replace_all("hello", &op("", false, false, "abc"));
        assert_eq!(text, "hello");
        assert_eq!(count, 0);
    }

    #[test]
    fn replace_all_with_empty_replacement_deletes() {
        let engine = ReplaceEngine::default();
        let (text, count) = engine.replace_all("a-b-c", &op("-", true, false, ""));
        assert_eq!(text, "abc");
        assert_eq!(count, 2);
    }

    #[test]
    fn replace_all_handles_multibyte_text() {
        let engine = ReplaceEngine::default();
        let (text, count) = engine.replace_all("猫と犬と猫", &op("猫", true, false, "ねこ"));
        assert_eq!(text, "ねこと犬とねこ");
        assert_eq!(count, 2);
    }

    #[test]
    fn replace_all_keeps_embedded_words_with_whole_word() {
        let engine = ReplaceEngine::default();
        let (text, count) = engine.replace_all("cat concat cat", &op("cat", true, true, "dog"));
        assert_eq!(text, "dog concat dog");
        assert_eq!(count, 2);
    }

    #[test]
    fn replace_next_at_or_after_caret() {
        let engine = ReplaceEngine::default();
        let operation = op("one", false, true, "1");
        let (text, replaced) = engine.replace_next_at_or_after("one two one two", &operation, 4);
        assert_eq!(text, "one two 1 two");
        assert_eq!(replaced, Some(FindMatch::new(8, 3)));
    }

    #[test]
    fn replace_next_wraps_to_first_match() {
        let engine = ReplaceEngine::default();
        let operation = op("one", false, true, "1");
        let (text, replaced) = engine.replace_next_at_or_after("one two one two", &operation, 12);
        assert_eq!(text, "1 two one two");
        assert_eq!(replaced, Some(FindMatch::new(0, 3)));
    }

    #[test]
    fn replace_next_caret_on_match_start_replaces_it() {
        let engine = ReplaceEngine::default();
        let operation = op("one", false, false, "1");
        let (_, replaced) = engine.replace_next_at_or_after("one two one", &operation, 8);
        assert_eq!(replaced, Some(FindMatch::new(8, 3)));
    }

    #[test]
    fn replace_next_without_matches() {
        let engine = ReplaceEngine::default();
        let (text, replaced) =
            engine.replace_next_at_or_after("one two", &op("three", false, false, "3"), 0);
        assert_eq!(text, "one two");
        assert_eq!(replaced, None);
    }
}
