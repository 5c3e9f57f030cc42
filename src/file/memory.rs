//! メモリ上のファイルシステム
//!
//! ディスクを持たないホストやテストで [`FileSystem`] の代わりに使う。

use super::io::{ensure_not_cancelled, percent, report, FileSystem, ProgressReporter};
use super::metadata::EncodingProcessor;
use crate::config::DEFAULT_CHUNK_SIZE;
use crate::document::TextEncoding;
use crate::error::{FileError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

/// パス→バイト列のマップで表現したファイルシステム
#[derive(Debug)]
pub struct MemoryFileSystem {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    denied: Mutex<HashSet<PathBuf>>,
    chunk_size: usize,
    streamed_reads: AtomicUsize,
    streamed_writes: AtomicUsize,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            denied: Mutex::new(HashSet::new()),
            chunk_size: chunk_size.max(1),
            streamed_reads: AtomicUsize::new(0),
            streamed_writes: AtomicUsize::new(0),
        }
    }

    /// ファイルを配置（既存なら上書き）
    pub fn insert(&self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        lock(&self.files).insert(path.into(), bytes.into());
    }

    pub fn remove(&self, path: &Path) -> Option<Vec<u8>> {
        lock(&self.files).remove(path)
    }

    /// 格納されている生のバイト列
    pub fn read_bytes(&self, path: &Path) -> Option<Vec<u8>> {
        lock(&self.files).get(path).cloned()
    }

    /// 以降のアクセスを権限エラーにする
    pub fn deny(&self, path: impl Into<PathBuf>) {
        lock(&self.denied).insert(path.into());
    }

    pub fn allow(&self, path: &Path) {
        lock(&self.denied).remove(path);
    }

    /// チャンク読み込みが行われた回数
    pub fn streamed_reads(&self) -> usize {
        self.streamed_reads.load(Ordering::Relaxed)
    }

    /// チャンク書き込みが行われた回数
    pub fn streamed_writes(&self) -> usize {
        self.streamed_writes.load(Ordering::Relaxed)
    }

    fn check_access(&self, path: &Path) -> Result<()> {
        if lock(&self.denied).contains(path) {
            return Err(FileError::PermissionDenied {
                path: path.display().to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Vec<u8>> {
        self.check_access(path)?;
        lock(&self.files).get(path).cloned().ok_or_else(|| {
            FileError::NotFound {
                path: path.display().to_string(),
            }
            .into()
        })
    }
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn file_exists(&self, path: &Path) -> bool {
        lock(&self.files).contains_key(path)
    }

    async fn file_size(&self, path: &Path) -> Result<u64> {
        Ok(self.load(path)?.len() as u64)
    }

    async fn detect_encoding(&self, path: &Path) -> Result<TextEncoding> {
        Ok(EncodingProcessor::detect(&self.load(path)?))
    }

    async fn read_all_text(&self, path: &Path, encoding: TextEncoding) -> Result<String> {
        Ok(EncodingProcessor::decode(self.load(path)?, encoding)?)
    }

    async fn read_large_file(
        &self,
        path: &Path,
        encoding: TextEncoding,
        progress: Option<&dyn ProgressReporter>,
        cancel: Option<&CancellationToken>,
    ) -> Result<String> {
        self.streamed_reads.fetch_add(1, Ordering::Relaxed);
        let source = self.load(path)?;
        let total = source.len() as u64;
        let mut bytes = Vec::with_capacity(source.len());

        for chunk in source.chunks(self.chunk_size) {
            ensure_not_cancelled(cancel)?;
            bytes.extend_from_slice(chunk);
            report(progress, percent(bytes.len() as u64, total));
        }
        ensure_not_cancelled(cancel)?;

        report(progress, 100);
        Ok(EncodingProcessor::decode(bytes, encoding)?)
    }

    async fn write_all_text(&self, path: &Path, text: &str, encoding: TextEncoding) -> Result<()> {
        self.check_access(path)?;
        self.insert(path, EncodingProcessor::encode(text, encoding));
        Ok(())
    }

    async fn write_large_file(
        &self,
        path: &Path,
        text: &str,
        encoding: TextEncoding,
        progress: Option<&dyn ProgressReporter>,
        cancel: Option<&CancellationToken>,
    ) -> Result<()> {
        self.streamed_writes.fetch_add(1, Ordering::Relaxed);
        self.check_access(path)?;
        ensure_not_cancelled(cancel)?;

        let mut bytes = EncodingProcessor::preamble(encoding).to_vec();
        let data = text.as_bytes();
        let total = data.len() as u64;
        let mut done = 0u64;

        for chunk in data.chunks(self.chunk_size) {
            if let Err(err) = ensure_not_cancelled(cancel) {
                // 途中まで書いた状態を残す
                self.insert(path, bytes);
                return Err(err);
            }
            bytes.extend_from_slice(chunk);
            done += chunk.len() as u64;
            report(progress, percent(done, total));
        }

        self.insert(path, bytes);
        report(progress, 100);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
