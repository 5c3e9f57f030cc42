//! Undo/Redo and find/replace property tests
//!
//! Exercise the public engines against simple models so hosts can rely on the
//! history and match invariants without going through the service.

use altre_document::{
    DocumentId, FindEngine, FindQuery, ReplaceEngine, ReplaceOperation, UndoRedo, UndoRedoEngine,
};
use proptest::test_runner::Config as ProptestConfig;
use proptest::{prelude::*, prop_oneof};

#[derive(Debug, Clone)]
enum Operation {
    Push(String),
    Undo,
    Redo,
}

fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        "[a-c]{0,4}".prop_map(Operation::Push),
        Just(Operation::Undo),
        Just(Operation::Redo),
    ]
}

/// スナップショット列とカーソルだけのモデル
struct HistoryModel {
    snapshots: Vec<String>,
    cursor: usize,
}

impl HistoryModel {
    fn new(baseline: &str) -> Self {
        Self {
            snapshots: vec![baseline.to_string()],
            cursor: 0,
        }
    }

    fn push(&mut self, text: &str) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(text.to_string());
        self.cursor = self.snapshots.len() - 1;
    }

    fn undo(&mut self) -> Option<String> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.snapshots[self.cursor].clone())
    }

    fn redo(&mut self) -> Option<String> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.snapshots[self.cursor].clone())
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn history_matches_model(
        baseline in "[a-c]{0,4}",
        ops in proptest::collection::vec(operation_strategy(), 0..40),
    ) {
        let id = DocumentId::new();
        let mut engine = UndoRedoEngine::new();
        let mut model = HistoryModel::new(&baseline);
        engine.attach(id, &baseline);

        for op in ops {
            match op {
                Operation::Push(text) => {
                    engine.push(id, &text);
                    model.push(&text);
                }
                Operation::Undo => {
                    let actual = engine.undo(id).map(str::to_owned);
                    prop_assert_eq!(actual, model.undo());
                }
                Operation::Redo => {
                    let actual = engine.redo(id).map(str::to_owned);
                    prop_assert_eq!(actual, model.redo());
                }
            }
            prop_assert_eq!(engine.can_undo(id), model.cursor > 0);
            prop_assert_eq!(engine.can_redo(id), model.cursor + 1 < model.snapshots.len());
            prop_assert_eq!(engine.depth(id), model.snapshots.len());
        }
    }

    #[test]
    fn undo_then_redo_restores_every_snapshot(
        texts in proptest::collection::vec("[a-z]{1,6}", 1..12),
    ) {
        let id = DocumentId::new();
        let mut engine = UndoRedoEngine::new();
        engine.attach(id, "");
        for text in &texts {
            engine.push(id, text);
        }

        let mut undone = Vec::new();
        while let Some(text) = engine.undo(id) {
            undone.push(text.to_string());
        }
        prop_assert_eq!(undone.last().map(String::as_str), Some(""));

        let mut redone = Vec::new();
        while let Some(text) = engine.redo(id) {
            redone.push(text.to_string());
        }
        prop_assert_eq!(redone, texts);
    }

    #[test]
    fn matches_are_ordered_and_disjoint(
        text in "[abAB ]{0,40}",
        term in "[abAB]{1,3}",
        match_case in any::<bool>(),
        whole_word in any::<bool>(),
    ) {
        let engine = FindEngine::new();
        let result = engine.find_all(&text, &FindQuery::new(term.clone(), match_case, whole_word));
        let chars: Vec<char> = text.chars().collect();
        let term_len = term.chars().count();

        for m in result.matches() {
            prop_assert_eq!(m.length, term_len);
            prop_assert!(m.end() <= chars.len());
            let found: String = chars[m.start..m.end()].iter().collect();
            if match_case {
                prop_assert_eq!(&found, &term);
            } else {
                prop_assert_eq!(found.to_lowercase(), term.to_lowercase());
            }
        }
        for pair in result.matches().windows(2) {
            prop_assert!(pair[0].end() <= pair[1].start);
        }
    }

    #[test]
    fn replace_all_count_equals_match_count(
        text in "[ab ]{0,40}",
        term in "[ab]{1,2}",
        replacement in "[xy]{0,3}",
    ) {
        let query = FindQuery::new(term, false, false);
        let expected = FindEngine::new().find_all(&text, &query).len();
        let (output, count) =
            ReplaceEngine::default().replace_all(&text, &ReplaceOperation::new(query, replacement));
        prop_assert_eq!(count, expected);
        if count == 0 {
            prop_assert_eq!(output, text);
        }
    }
}
