// 標註引擎主模組
//
// 取代（Pass A）與關鍵字標示（Pass B）各自產生範圍，
// 最後合併成一份依起點排序、互不重疊的範圍清單。

mod engine;
mod replace;

pub use engine::{highlight_keywords, merge_ranges, HighlightOutcome};
pub use replace::{replace_all, ReplaceOutcome};

use crate::utils::Utf16Index;
use thiserror::Error;

/// 範圍類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeKind {
    Replace,
    ReplaceAndCaps,
    AutoCaps,
    /// `color` 為關鍵字在原始清單中的索引
    Keyword { color: usize },
}

impl RangeKind {
    /// 數字越小優先權越高；同起點時依此排序
    pub fn priority(self) -> u8 {
        match self {
            RangeKind::Replace => 0,
            RangeKind::ReplaceAndCaps => 1,
            RangeKind::AutoCaps => 2,
            RangeKind::Keyword { .. } => 3,
        }
    }

    pub fn is_keyword(self) -> bool {
        matches!(self, RangeKind::Keyword { .. })
    }
}

/// 一段標註範圍（UTF-16 位置，end 不含）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: usize,
    pub end: usize,
    pub kind: RangeKind,
}

impl Range {
    pub fn new(start: usize, end: usize, kind: RangeKind) -> Self {
        Self { start, end, kind }
    }

    pub fn keyword(start: usize, end: usize, color: usize) -> Self {
        Self::new(start, end, RangeKind::Keyword { color })
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, other: &Range) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// 位元組位置 -> UTF-16 位置
    pub(crate) fn to_utf16(self, index: &Utf16Index) -> Self {
        Self {
            start: index.to_utf16(self.start),
            end: index.to_utf16(self.end),
            kind: self.kind,
        }
    }
}

/// 標註錯誤
#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("no replacement rules in this mode")]
    NoRules,
    #[error("the text is empty")]
    EmptyBuffer,
    #[error("pattern failed: {0}")]
    Pattern(#[from] fancy_regex::Error),
}

/// 依起點排序，同起點時高優先權在前
pub(crate) fn sort_ranges(ranges: &mut [Range]) {
    ranges.sort_by_key(|r| (r.start, r.kind.priority(), r.end));
}
