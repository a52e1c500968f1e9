//! UTF-8 位元組位置與 UTF-16 位置的互相轉換
//!
//! 比對在 Rust 字串（位元組位置）上進行，而範圍與選取位置以 UTF-16
//! code unit 表示，所以每次計算都需要一份對照表。

/// 每個字元起點的位元組位置與 UTF-16 位置對照表
///
/// 兩個陣列等長，最後一項為文字結尾。
#[derive(Debug, Clone)]
pub struct Utf16Index {
    bytes: Vec<usize>,
    units: Vec<usize>,
}

impl Utf16Index {
    pub fn new(text: &str) -> Self {
        let mut bytes = Vec::with_capacity(text.len() + 1);
        let mut units = Vec::with_capacity(text.len() + 1);
        let mut unit = 0;

        for (byte, ch) in text.char_indices() {
            bytes.push(byte);
            units.push(unit);
            unit += ch.len_utf16();
        }
        bytes.push(text.len());
        units.push(unit);

        Self { bytes, units }
    }

    /// 文字的 UTF-16 總長度
    pub fn len_utf16(&self) -> usize {
        self.units.last().copied().unwrap_or(0)
    }

    /// 位元組位置 -> UTF-16 位置（非字元邊界時向前取整）
    pub fn to_utf16(&self, byte: usize) -> usize {
        match self.bytes.binary_search(&byte) {
            Ok(i) => self.units[i],
            Err(0) => 0,
            Err(i) => self.units[i - 1],
        }
    }

    /// UTF-16 位置 -> 位元組位置（落在代理對中間時向前取整，超出時取文字結尾）
    pub fn to_byte(&self, unit: usize) -> usize {
        match self.units.binary_search(&unit) {
            Ok(i) => self.bytes[i],
            Err(0) => 0,
            Err(i) => self.bytes[i - 1],
        }
    }
}
