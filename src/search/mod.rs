//! 検索・置換モジュール
//!
//! 状態を持たない検索エンジンと、その上に構築した置換エンジンを提供

mod matcher;
mod replace;
pub mod types;

pub use matcher::FindEngine;
pub use replace::ReplaceEngine;
pub use types::{CaseFolding, FindMatch, FindQuery, FindResult, ReplaceOperation};
