mod logger;
mod offsets;

pub use logger::init_logger;
pub use offsets::Utf16Index;

/// 計算字串的 UTF-16 長度（與瀏覽器端的選取位置一致）
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16_len() {
        assert_eq!(utf16_len(""), 0);
        assert_eq!(utf16_len("abc"), 3);
        assert_eq!(utf16_len("tiếng Việt"), 10);
        // 表情符號在 UTF-16 佔兩個單位
        assert_eq!(utf16_len("a😀b"), 4);
    }
}
