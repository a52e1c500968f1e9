use super::EncodingConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// 依 BOM 判斷編碼，回傳編碼與 BOM 長度
fn detect_encoding(bytes: &[u8]) -> Option<(&'static encoding_rs::Encoding, usize)> {
    if bytes.len() >= 3 && bytes[0..3] == [0xEF, 0xBB, 0xBF] {
        // UTF-8 BOM
        Some((encoding_rs::UTF_8, 3))
    } else if bytes.len() >= 2 && bytes[0..2] == [0xFF, 0xFE] {
        // UTF-16LE BOM
        Some((encoding_rs::UTF_16LE, 2))
    } else if bytes.len() >= 2 && bytes[0..2] == [0xFE, 0xFF] {
        // UTF-16BE BOM
        Some((encoding_rs::UTF_16BE, 2))
    } else {
        None
    }
}

/// 解碼位元組：有 BOM 時以 BOM 為準，否則用 `fallback`（預設 UTF-8）
///
/// 第二個回傳值表示解碼時是否遇到無效序列（已以替代字元取代）。
pub fn decode_bytes(
    bytes: &[u8],
    fallback: Option<&'static encoding_rs::Encoding>,
) -> (String, bool) {
    let (encoding, bom_length) = detect_encoding(bytes)
        .unwrap_or_else(|| (fallback.unwrap_or(encoding_rs::UTF_8), 0));

    let (decoded, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
    (decoded.into_owned(), had_errors)
}

pub fn read_text_file(path: &Path, config: &EncodingConfig) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;

    let (text, had_errors) = decode_bytes(&bytes, config.read_encoding);
    if had_errors {
        log::warn!("Encoding errors detected in file: {}", path.display());
    }
    Ok(text)
}

pub fn write_text_file(path: &Path, text: &str, config: &EncodingConfig) -> Result<()> {
    let encoding = config.save_encoding.unwrap_or(encoding_rs::UTF_8);
    // 使用指定編碼編碼內容
    let (encoded, _, had_errors) = encoding.encode(text);
    if had_errors {
        log::warn!(
            "Encoding errors occurred while saving file: {}",
            path.display()
        );
    }
    fs::write(path, encoded).with_context(|| format!("Failed to write file: {}", path.display()))
}
