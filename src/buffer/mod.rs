mod text_file;

pub use text_file::{decode_bytes, read_text_file, write_text_file};

/// 讀寫文字檔時使用的編碼
#[derive(Debug, Clone, Copy)]
pub struct EncodingConfig {
    /// 沒有 BOM 時的讀取編碼（預設 UTF-8）
    pub read_encoding: Option<&'static encoding_rs::Encoding>,
    /// 寫出編碼（預設 UTF-8）
    pub save_encoding: Option<&'static encoding_rs::Encoding>,
}

impl EncodingConfig {
    pub fn utf8() -> Self {
        Self {
            read_encoding: None,
            save_encoding: None,
        }
    }

    /// 依標籤（如 `big5`、`windows-1252`）建立；讀寫同一編碼
    pub fn from_label(label: &str) -> Option<Self> {
        let encoding = encoding_rs::Encoding::for_label(label.trim().as_bytes())?;
        Some(Self {
            read_encoding: Some(encoding),
            save_encoding: Some(encoding),
        })
    }
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self::utf8()
    }
}
