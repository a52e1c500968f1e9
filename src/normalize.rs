//! 標點正規化
//!
//! 比對前把各種引號變體統一成 ASCII，並把不換行空白換成一般空白，
//! 避免文字與規則之間只差在引號樣式就比對不到。
//!
//! 所有被替換的字元在 UTF-16 都只佔一個單位，因此正規化前後的
//! UTF-16 位置完全一致，範圍可以直接套回原文。

use once_cell::sync::Lazy;
use std::borrow::Cow;

/// 雙引號變體（彎引號、低引號、書名號、CJK 括號、雙撇號、全形）
pub const DOUBLE_QUOTES: &[char] = &[
    '\u{201C}', '\u{201D}', '\u{201E}', '\u{201F}', '\u{00AB}', '\u{00BB}', '\u{2033}',
    '\u{2036}', '\u{301D}', '\u{301E}', '\u{301F}', '\u{FF02}', '\u{300C}', '\u{300D}',
    '\u{300E}', '\u{300F}',
];

/// 單引號與撇號變體
pub const SINGLE_QUOTES: &[char] = &[
    '\u{2018}', '\u{2019}', '\u{201A}', '\u{201B}', '\u{2039}', '\u{203A}', '\u{2032}',
    '\u{2035}', '\u{FF07}',
];

/// 不換行空白
pub const SPACES: &[char] = &['\u{00A0}', '\u{202F}'];

/// 單一字元的正規形式
pub fn canonical_char(ch: char) -> char {
    if DOUBLE_QUOTES.contains(&ch) {
        '"'
    } else if SINGLE_QUOTES.contains(&ch) {
        '\''
    } else if SPACES.contains(&ch) {
        ' '
    } else {
        ch
    }
}

/// 正規化整段文字；沒有需要替換的字元時不配置新字串
pub fn normalize(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|ch| canonical_char(ch) != ch) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.chars().map(canonical_char).collect())
}

static DOUBLE_CLASS: Lazy<String> = Lazy::new(|| quote_class('"', DOUBLE_QUOTES));
static SINGLE_CLASS: Lazy<String> = Lazy::new(|| quote_class('\'', SINGLE_QUOTES));
static SPACE_CLASS: Lazy<String> = Lazy::new(|| quote_class(' ', SPACES));

fn quote_class(canonical: char, variants: &[char]) -> String {
    let mut class = String::from("[");
    class.push(canonical);
    class.extend(variants.iter());
    class.push(']');
    class
}

/// 關鍵字比對用：若字元有等價變體，回傳涵蓋全部變體的字元類別
pub(crate) fn tolerant_class(ch: char) -> Option<&'static str> {
    match canonical_char(ch) {
        '"' => Some(DOUBLE_CLASS.as_str()),
        '\'' => Some(SINGLE_CLASS.as_str()),
        ' ' => Some(SPACE_CLASS.as_str()),
        _ => None,
    }
}
