// 關鍵字清單與命中跳轉

use crate::highlight::Range;
use serde::{Deserialize, Serialize};

/// 關鍵字比對選項（與模式無關）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeywordSettings {
    pub match_case: bool,
    pub whole_word: bool,
}

/// 依加入順序保存、不重複的關鍵字清單
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeywordSet {
    pub keywords: Vec<String>,
    #[serde(rename = "keywordSettings")]
    pub settings: KeywordSettings,
}

impl KeywordSet {
    /// 加入一段以逗號、分號或換行分隔的關鍵字，回傳實際新增的數量
    pub fn add(&mut self, raw: &str) -> usize {
        let mut added = 0;
        for word in split_keywords(raw) {
            if !self.keywords.iter().any(|k| k == word) {
                self.keywords.push(word.to_string());
                added += 1;
            }
        }
        added
    }

    pub fn remove(&mut self, word: &str) -> bool {
        let before = self.keywords.len();
        self.keywords.retain(|k| k != word);
        self.keywords.len() != before
    }

    pub fn clear(&mut self) {
        self.keywords.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// 匯出為一行一個關鍵字
    pub fn export(&self) -> String {
        self.keywords.join("\n")
    }
}

/// 切分關鍵字輸入：`,` `;` 換行皆為分隔符，去除前後空白與空項
pub fn split_keywords(raw: &str) -> impl Iterator<Item = &str> {
    raw.split([',', ';', '\n'])
        .map(str::trim)
        .filter(|w| !w.is_empty())
}

/// 在最近一次關鍵字標示的命中之間循環跳轉
pub struct KeywordSearch {
    matches: Vec<Range>,
    current_match: usize,
}

impl KeywordSearch {
    pub fn new() -> Self {
        Self {
            matches: Vec::new(),
            current_match: 0,
        }
    }

    pub fn set_matches(&mut self, matches: Vec<Range>) {
        self.matches = matches;
        self.current_match = 0;
    }

    pub fn clear(&mut self) {
        self.set_matches(Vec::new());
    }

    pub fn next_match(&mut self) -> Option<Range> {
        if self.matches.is_empty() {
            return None;
        }

        let result = self.matches[self.current_match];
        self.current_match = (self.current_match + 1) % self.matches.len();
        Some(result)
    }

    pub fn prev_match(&mut self) -> Option<Range> {
        if self.matches.is_empty() {
            return None;
        }

        if self.current_match == 0 {
            self.current_match = self.matches.len() - 1;
        } else {
            self.current_match -= 1;
        }

        Some(self.matches[self.current_match])
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }
}

impl Default for KeywordSearch {
    fn default() -> Self {
        Self::new()
    }
}
