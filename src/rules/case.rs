//! 大小寫保留
//!
//! 不區分大小寫取代時，取代文字沿用被比對文字的大小寫樣式：
//! 全大寫、首字大寫，或原樣。

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasePattern {
    /// 至少兩個有大小寫的字母且全部大寫（"HELLO"）
    Upper,
    /// 第一個字母大寫（"Hello"、"I"）
    Capitalized,
    /// 其他情況，取代文字原樣使用
    AsIs,
}

pub fn case_pattern(text: &str) -> CasePattern {
    let mut cased = text.chars().filter(|c| c.is_uppercase() || c.is_lowercase());

    let Some(first) = cased.next() else {
        return CasePattern::AsIs;
    };
    if !first.is_uppercase() {
        return CasePattern::AsIs;
    }

    let mut rest = cased.peekable();
    if rest.peek().is_none() {
        return CasePattern::Capitalized;
    }
    if rest.all(char::is_uppercase) {
        CasePattern::Upper
    } else {
        CasePattern::Capitalized
    }
}

/// 依 `matched` 的大小寫樣式調整 `replacement`
pub fn apply_case(matched: &str, replacement: &str) -> String {
    match case_pattern(matched) {
        CasePattern::Upper => replacement.to_uppercase(),
        CasePattern::Capitalized => capitalize_first(replacement),
        CasePattern::AsIs => replacement.to_string(),
    }
}

/// 將第一個字母轉為大寫（跳過開頭的引號等非字母字元）
pub(crate) fn capitalize_first(text: &str) -> String {
    match text.char_indices().find(|(_, c)| c.is_lowercase()) {
        Some((i, c)) if text[..i].chars().all(|p| !p.is_alphanumeric()) => {
            let mut out = String::with_capacity(text.len() + 2);
            out.push_str(&text[..i]);
            out.extend(c.to_uppercase());
            out.push_str(&text[i + c.len_utf8()..]);
            out
        }
        _ => text.to_string(),
    }
}
