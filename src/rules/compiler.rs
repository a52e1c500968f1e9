//! 規則編譯器
//!
//! 把一組字詞編譯成單一的交替式正規表達式：
//! - 依字元數由長到短排序，同一位置較長的字詞優先
//! - 每個字詞一個捕獲組，第一個有值的組即為命中的字詞
//! - 全字比對以前後各一個 look-around 斷言實作，較長字詞不符邊界時
//!   仍可退回較短的字詞
//! - 空字詞在編譯前濾除

use crate::normalize::{normalize, tolerant_class};
use fancy_regex::{Regex, RegexBuilder};

/// 單字字元：Unicode 字母、數字、底線
const WORD_CLASS: &str = r"[\p{L}\p{N}_]";

/// 回溯上限；超過時比對回傳錯誤而不是卡住
const BACKTRACK_LIMIT: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchOptions {
    pub match_case: bool,
    pub whole_word: bool,
    /// 字詞中的引號與空白可對應到任何等價變體（關鍵字用）
    pub quote_tolerant: bool,
}

/// 一次命中（位元組位置）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermMatch {
    pub start: usize,
    pub end: usize,
    /// 命中字詞在原始清單中的索引
    pub term: usize,
}

#[derive(Debug)]
pub struct TermMatcher {
    regex: Regex,
    /// 捕獲組順序 -> 原始索引
    order: Vec<usize>,
}

impl TermMatcher {
    /// 編譯字詞清單；沒有任何有效字詞時回傳 `Ok(None)`
    pub fn compile<S: AsRef<str>>(
        terms: &[S],
        options: MatchOptions,
    ) -> Result<Option<Self>, fancy_regex::Error> {
        let mut entries: Vec<(usize, String)> = terms
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.as_ref().is_empty())
            .map(|(i, t)| (i, normalize(t.as_ref()).into_owned()))
            .collect();

        if entries.is_empty() {
            return Ok(None);
        }

        // 穩定排序：同長度時保留原始順序
        entries.sort_by_key(|(_, t)| std::cmp::Reverse(t.chars().count()));

        let alternation = entries
            .iter()
            .map(|(_, t)| format!("({})", term_pattern(t, options.quote_tolerant)))
            .collect::<Vec<_>>()
            .join("|");

        let mut pattern = String::with_capacity(alternation.len() + 64);
        if !options.match_case {
            pattern.push_str("(?i)");
        }
        if options.whole_word {
            pattern.push_str(&format!("(?<!{WORD_CLASS})(?:{alternation})(?!{WORD_CLASS})"));
        } else {
            pattern.push_str(&format!("(?:{alternation})"));
        }

        log::debug!("compiled {} terms: {}", entries.len(), pattern);

        let regex = RegexBuilder::new(&pattern)
            .backtrack_limit(BACKTRACK_LIMIT)
            .build()?;

        Ok(Some(Self {
            regex,
            order: entries.into_iter().map(|(i, _)| i).collect(),
        }))
    }

    /// 由左至右掃描全部命中（互不重疊）
    pub fn find_all(&self, text: &str) -> Result<Vec<TermMatch>, fancy_regex::Error> {
        let mut matches = Vec::new();

        for caps in self.regex.captures_iter(text) {
            let caps = caps?;
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let Some(group) = (1..caps.len()).find(|&g| caps.get(g).is_some()) else {
                continue;
            };

            matches.push(TermMatch {
                start: whole.start(),
                end: whole.end(),
                term: self.order[group - 1],
            });
        }

        Ok(matches)
    }

    pub fn term_count(&self) -> usize {
        self.order.len()
    }
}

/// 單一字詞的樣式：逐字跳脫，必要時換成等價字元類別
fn term_pattern(term: &str, quote_tolerant: bool) -> String {
    let mut out = String::with_capacity(term.len() * 2);
    for ch in term.chars() {
        if quote_tolerant {
            if let Some(class) = tolerant_class(ch) {
                out.push_str(class);
                continue;
            }
        }
        let mut buf = [0u8; 4];
        out.push_str(&fancy_regex::escape(ch.encode_utf8(&mut buf)));
    }
    out
}
