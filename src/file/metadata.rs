//! テキスト変換処理
//!
//! 改行コードの正規化・適用と、UTF-8/BOMの変換

use crate::document::{LineEnding, TextEncoding};
use crate::error::file::Result;
use crate::error::FileError;

/// 改行コード処理
pub struct LineEndingProcessor;

impl LineEndingProcessor {
    /// 改行コードをLFに統一
    pub fn normalize_to_lf(content: &str) -> String {
        if !content.contains('\r') {
            return content.to_string();
        }
        // CRLF (\r\n) を先に変換し、残りの CR (\r) を変換
        content.replace("\r\n", "\n").replace('\r', "\n")
    }

    /// LF改行の内容を指定の改行コードへ変換（保存時）
    pub fn apply(content: &str, eol: LineEnding) -> String {
        match eol {
            LineEnding::Lf => content.to_string(),
            other => content.replace('\n', other.as_str()),
        }
    }
}

/// エンコーディング処理
pub struct EncodingProcessor;

impl EncodingProcessor {
    /// UTF-8 BOM (EF BB BF)
    pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

    /// 先頭バイト列からエンコーディングを推定
    pub fn detect(prefix: &[u8]) -> TextEncoding {
        if prefix.starts_with(&Self::UTF8_BOM) {
            TextEncoding::Utf8Bom
        } else {
            TextEncoding::Utf8
        }
    }

    /// 読み込んだバイト列をテキストへ変換（BOMは常に除去）
    pub fn decode(mut bytes: Vec<u8>, _encoding: TextEncoding) -> Result<String> {
        if bytes.starts_with(&Self::UTF8_BOM) {
            bytes.drain(..Self::UTF8_BOM.len());
        }
        String::from_utf8(bytes).map_err(FileError::from)
    }

    /// 保存時に本文の前へ書き出すバイト列
    pub fn preamble(encoding: TextEncoding) -> &'static [u8] {
        match encoding {
            TextEncoding::Utf8 => &[],
            TextEncoding::Utf8Bom => &Self::UTF8_BOM,
        }
    }

    /// テキストを保存用バイト列へ変換
    pub fn encode(content: &str, encoding: TextEncoding) -> Vec<u8> {
        let preamble = Self::preamble(encoding);
        let mut bytes = Vec::with_capacity(preamble.len() + content.len());
        bytes.extend_from_slice(preamble);
        bytes.extend_from_slice(content.as_bytes());
        bytes
    }

    /// 保存時のバイト数
    pub fn encoded_len(content: &str, encoding: TextEncoding) -> u64 {
        (Self::preamble(encoding).len() + content.len()) as u64
    }
}
