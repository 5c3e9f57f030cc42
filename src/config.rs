//! エンジン設定
//!
//! 大容量ファイル閾値やストリーミング単位など、I/O方針と検索方針の設定値

use crate::search::CaseFolding;
use serde::{Deserialize, Serialize};

/// 大容量ファイル閾値の既定値（10MiB）
pub const DEFAULT_LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024;

/// ストリーミングI/Oのチャンクサイズ既定値（64KiB）
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

const ENV_LARGE_FILE_THRESHOLD: &str = "ALTRE_LARGE_FILE_THRESHOLD";
const ENV_CHUNK_SIZE: &str = "ALTRE_CHUNK_SIZE";
const ENV_CASE_FOLDING: &str = "ALTRE_CASE_FOLDING";

/// ドキュメントエンジンの設定
///
/// ホストの設定ファイルに埋め込めるよう、欠けた項目は既定値で補う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// この値以上のファイルはストリーミングで読み書きし、読み取り専用で開く
    pub large_file_threshold: u64,
    /// ストリーミングI/Oのチャンクサイズ（バイト）
    pub chunk_size: usize,
    /// 大文字小文字を区別しない検索での比較方法
    pub case_folding: CaseFolding,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            large_file_threshold: DEFAULT_LARGE_FILE_THRESHOLD,
            chunk_size: DEFAULT_CHUNK_SIZE,
            case_folding: CaseFolding::default(),
        }
    }
}

impl EngineOptions {
    /// 既定値に環境変数の上書きを適用
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// 上書き値の取得元を差し替えて適用（解釈できない値は無視）
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_LARGE_FILE_THRESHOLD) {
            match value.trim().parse::<u64>() {
                Ok(threshold) => self.large_file_threshold = threshold,
                Err(_) => log::warn!("Ignoring invalid {}: {}", ENV_LARGE_FILE_THRESHOLD, value),
            }
        }

        if let Some(value) = lookup(ENV_CHUNK_SIZE) {
            match value.trim().parse::<usize>() {
                Ok(size) if size > 0 => self.chunk_size = size,
                _ => log::warn!("Ignoring invalid {}: {}", ENV_CHUNK_SIZE, value),
            }
        }

        if let Some(value) = lookup(ENV_CASE_FOLDING) {
            match CaseFolding::from_name(&value) {
                Some(folding) => self.case_folding = folding,
                None => log::warn!("Ignoring invalid {}: {}", ENV_CASE_FOLDING, value),
            }
        }

        self
    }

    /// 既定値と異なる項目だけを `overrides` から取り込む
    pub fn merged_with(&self, overrides: &EngineOptions) -> EngineOptions {
        let defaults = EngineOptions::default();
        EngineOptions {
            large_file_threshold: if overrides.large_file_threshold != defaults.large_file_threshold {
                overrides.large_file_threshold
            } else {
                self.large_file_threshold
            },
            chunk_size: if overrides.chunk_size != defaults.chunk_size {
                overrides.chunk_size
            } else {
                self.chunk_size
            },
            case_folding: if overrides.case_folding != defaults.case_folding {
                overrides.case_folding
            } else {
                self.case_folding
            },
        }
    }

    /// 指定サイズがストリーミング対象か
    pub fn is_large(&self, size: u64) -> bool {
        size >= self.large_file_threshold
    }
}
