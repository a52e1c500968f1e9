// 取代規則與模式

mod case;
mod compiler;

pub use case::{apply_case, case_pattern, CasePattern};
pub use compiler::{MatchOptions, TermMatch, TermMatcher};

use serde::{Deserialize, Serialize};

/// 預設模式名稱（不可刪除、不可改名）
pub const DEFAULT_MODE: &str = "default";

/// 一組「尋找 → 取代」
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rule {
    pub find: String,
    pub replace: String,
}

impl Rule {
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
        }
    }
}

/// 取代模式：規則清單加上比對選項
///
/// 模式名稱是 `AppState::modes` 的鍵，不重複存放在這裡。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Mode {
    pub pairs: Vec<Rule>,
    /// 舊版設定檔使用 `case`
    #[serde(alias = "case")]
    pub match_case: bool,
    pub whole_word: bool,
    pub auto_caps: bool,
}

impl Mode {
    /// 比對選項（取代不需要引號容錯，文字已先正規化）
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            match_case: self.match_case,
            whole_word: self.whole_word,
            quote_tolerant: false,
        }
    }

    /// 有效規則數（`find` 非空）
    pub fn rule_count(&self) -> usize {
        self.pairs.iter().filter(|r| !r.find.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_case_field() {
        let mode: Mode =
            serde_json::from_str(r#"{"pairs":[{"find":"a","replace":"b"}],"case":true}"#).unwrap();
        assert!(mode.match_case);
        assert!(!mode.whole_word);
        assert!(!mode.auto_caps);
        assert_eq!(mode.pairs, vec![Rule::new("a", "b")]);
    }

    #[test]
    fn test_rule_count_ignores_empty_find() {
        let mode = Mode {
            pairs: vec![Rule::new("", "x"), Rule::new("a", "")],
            ..Mode::default()
        };
        assert_eq!(mode.rule_count(), 1);
    }
}
