//! ファイルI/O操作
//!
//! ドキュメントサービスが利用するファイルシステム抽象と、tokioによるローカル実装。
//! ここでは生のI/Oとバイト列⇔テキストの変換のみを行い、改行コードには触れない。

use super::metadata::EncodingProcessor;
use crate::config::DEFAULT_CHUNK_SIZE;
use crate::document::TextEncoding;
use crate::error::{DocumentError, FileError, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

/// 進捗通知（0〜100のパーセント）。呼び出し側は無視してもよい
pub trait ProgressReporter: Send + Sync {
    fn report(&self, percent: u8);
}

impl<F> ProgressReporter for F
where
    F: Fn(u8) + Send + Sync,
{
    fn report(&self, percent: u8) {
        self(percent)
    }
}

/// ファイルシステム抽象
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// 通常ファイルが存在するか
    async fn file_exists(&self, path: &Path) -> bool;

    /// ファイルサイズ（バイト）
    async fn file_size(&self, path: &Path) -> Result<u64>;

    /// 先頭のBOMからエンコーディングを推定
    async fn detect_encoding(&self, path: &Path) -> Result<TextEncoding>;

    /// 一括読み込み
    async fn read_all_text(&self, path: &Path, encoding: TextEncoding) -> Result<String>;

    /// チャンク単位の読み込み（キャンセル・進捗通知対応）
    async fn read_large_file(
        &self,
        path: &Path,
        encoding: TextEncoding,
        progress: Option<&dyn ProgressReporter>,
        cancel: Option<&CancellationToken>,
    ) -> Result<String>;

    /// 一括書き込み
    async fn write_all_text(&self, path: &Path, text: &str, encoding: TextEncoding) -> Result<()>;

    /// チャンク単位の書き込み（キャンセル・進捗通知対応）
    ///
    /// 途中でキャンセルされた場合、書き込み先は部分的に書かれた状態で残る。
    async fn write_large_file(
        &self,
        path: &Path,
        text: &str,
        encoding: TextEncoding,
        progress: Option<&dyn ProgressReporter>,
        cancel: Option<&CancellationToken>,
    ) -> Result<()>;
}

/// ローカルディスク上のファイルシステム
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    chunk_size: usize,
}

impl LocalFileSystem {
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl Default for LocalFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn file_exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    async fn file_size(&self, path: &Path) -> Result<u64> {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| FileError::from_io(e, path))?;
        Ok(meta.len())
    }

    async fn detect_encoding(&self, path: &Path) -> Result<TextEncoding> {
        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|e| FileError::from_io(e, path))?;
        let mut prefix = [0u8; 3];
        let mut filled = 0usize;
        while filled < prefix.len() {
            let n = file
                .read(&mut prefix[filled..])
                .await
                .map_err(|e| FileError::from_io(e, path))?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(EncodingProcessor::detect(&prefix[..filled]))
    }

    async fn read_all_text(&self, path: &Path, encoding: TextEncoding) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| FileError::from_io(e, path))?;
        Ok(EncodingProcessor::decode(bytes, encoding)?)
    }

    async fn read_large_file(
        &self,
        path: &Path,
        encoding: TextEncoding,
        progress: Option<&dyn ProgressReporter>,
        cancel: Option<&CancellationToken>,
    ) -> Result<String> {
        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|e| FileError::from_io(e, path))?;
        let total = file
            .metadata()
            .await
            .map_err(|e| FileError::from_io(e, path))?
            .len();

        let mut bytes = Vec::with_capacity(total as usize);
        let mut chunk = vec![0u8; self.chunk_size];
        let mut done = 0u64;

        loop {
            ensure_not_cancelled(cancel)?;
            let n = file
                .read(&mut chunk)
                .await
                .map_err(|e| FileError::from_io(e, path))?;
            if n == 0 {
                break;
            }
            bytes.extend_from_slice(&chunk[..n]);
            done += n as u64;
            report(progress, percent(done, total));
        }

        report(progress, 100);
        log::debug!("Streamed {} bytes from {}", done, path.display());
        Ok(EncodingProcessor::decode(bytes, encoding)?)
    }

    async fn write_all_text(&self, path: &Path, text: &str, encoding: TextEncoding) -> Result<()> {
        tokio::fs::write(path, EncodingProcessor::encode(text, encoding))
            .await
            .map_err(|e| FileError::from_io(e, path))?;
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
        ensure_not_cancelled(cancel)?;
        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| FileError::from_io(e, path))?;

        file.write_all(EncodingProcessor::preamble(encoding))
            .await
            .map_err(|e| FileError::from_io(e, path))?;

        let data = text.as_bytes();
        let total = data.len() as u64;
        let mut done = 0u64;

        for chunk in data.chunks(self.chunk_size) {
            ensure_not_cancelled(cancel)?;
            file.write_all(chunk)
                .await
                .map_err(|e| FileError::from_io(e, path))?;
            done += chunk.len() as u64;
            report(progress, percent(done, total));
        }

        file.flush().await.map_err(|e| FileError::from_io(e, path))?;
        report(progress, 100);
        log::debug!("Streamed {} bytes to {}", done, path.display());
        Ok(())
    }
}

/// キャンセル済みなら [`DocumentError::Cancelled`]
pub(crate) fn ensure_not_cancelled(cancel: Option<&CancellationToken>) -> Result<()> {
    if cancel.is_some_and(CancellationToken::is_cancelled) {
        return Err(DocumentError::Cancelled);
    }
    Ok(())
}

pub(crate) fn report(progress: Option<&dyn ProgressReporter>, percent: u8) {
    if let Some(progress) = progress {
        progress.report(percent);
    }
}

pub(crate) fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    (done.saturating_mul(100) / total).min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_and_read_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        let fs = LocalFileSystem::new();
        let content = "Hello, World!\nこんにちは！";

        fs.write_all_text(&file_path, content, TextEncoding::Utf8)
            .await
            .unwrap();
        assert!(fs.file_exists(&file_path).await);
        assert_eq!(
            fs.file_size(&file_path).await.unwrap(),
            content.len() as u64
        );
        assert_eq!(
            fs.read_all_text(&file_path, TextEncoding::Utf8).await.unwrap(),
            content
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("missing.txt");
        let fs = LocalFileSystem::new();

        assert!(!fs.file_exists(&file_path).await);
        assert!(!fs.file_exists(temp_dir.path()).await);
        let err = fs
            .read_all_text(&file_path, TextEncoding::Utf8)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_bom_round_trip() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("bom.txt");
        let fs = LocalFileSystem::new();

        fs.write_all_text(&file_path, "text", TextEncoding::Utf8Bom)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&file_path).unwrap()[..3], [0xEF, 0xBB, 0xBF]);
        assert_eq!(
            fs.detect_encoding(&file_path).await.unwrap(),
            TextEncoding::Utf8Bom
        );
        assert_eq!(
            fs.read_all_text(&file_path, TextEncoding::Utf8Bom)
                .await
                .unwrap(),
            "text"
        );
    }

    #[tokio::test]
    async fn test_streaming_reports_progress() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("large.txt");
        let fs = LocalFileSystem::with_chunk_size(16);
        let content = "0123456789abcdef".repeat(8);

        let seen = Mutex::new(Vec::new());
        let progress = |p: u8| seen.lock().unwrap().push(p);
        fs.write_large_file(&file_path, &content, TextEncoding::Utf8, Some(&progress), None)
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&file_path).unwrap(), content);
        assert_eq!(seen.lock().unwrap().last(), Some(&100));

        seen.lock().unwrap().clear();
        let text = fs
            .read_large_file(&file_path, TextEncoding::Utf8, Some(&progress), None)
            .await
            .unwrap();
        assert_eq!(text, content);

        let seen = seen.lock().unwrap();
        assert!(seen.len() >= 8);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_streaming_respects_cancellation() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("cancel.txt");
        std::fs::write(&file_path, "content").unwrap();
        let fs = LocalFileSystem::new();

        let token = CancellationToken::new();
        token.cancel();
        let err = fs
            .read_large_file(&file_path, TextEncoding::Utf8, None, Some(&token))
            .await
            .unwrap_err();
        assert_eq!(err, DocumentError::Cancelled);

        let err = fs
            .write_large_file(&file_path, "new", TextEncoding::Utf8, None, Some(&token))
            .await
            .unwrap_err();
        assert_eq!(err, DocumentError::Cancelled);
        assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "content");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), 100);
        assert_eq!(percent(5, 10), 50);
        assert_eq!(percent(20, 10), 100);
    }
}
