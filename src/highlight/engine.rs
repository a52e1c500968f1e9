//! Pass B：關鍵字標示與範圍合併
//!
//! 關鍵字範圍永遠從頭重算：輸入中舊的關鍵字範圍一律捨棄，
//! 因此同樣的輸入重跑多少次都得到相同結果。

use super::{sort_ranges, AnnotateError, Range};
use crate::rules::{MatchOptions, TermMatcher};
use crate::search::KeywordSet;
use crate::utils::Utf16Index;

/// 關鍵字標示結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightOutcome {
    /// 合併後的範圍：依起點排序、互不重疊
    pub ranges: Vec<Range>,
    /// 本次辨識到的全部關鍵字（裁切前），用於計數與跳轉
    pub matches: Vec<Range>,
}

impl HighlightOutcome {
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }
}

pub fn highlight_keywords(
    set: &KeywordSet,
    text: &str,
    existing: &[Range],
) -> Result<HighlightOutcome, AnnotateError> {
    let primary: Vec<Range> = existing
        .iter()
        .copied()
        .filter(|r| !r.kind.is_keyword() && !r.is_empty())
        .collect();
    let primary = resolve_primary(primary);

    let options = MatchOptions {
        match_case: set.settings.match_case,
        whole_word: set.settings.whole_word,
        quote_tolerant: true,
    };
    let Some(matcher) = TermMatcher::compile(set.keywords.as_slice(), options)? else {
        return Ok(HighlightOutcome {
            ranges: primary,
            matches: Vec::new(),
        });
    };

    // 單一交替式由左至右掃描，命中互不重疊，
    // 因此不會有關鍵字被同一輪已接受的關鍵字包住
    let index = Utf16Index::new(text);
    let matches: Vec<Range> = matcher
        .find_all(text)?
        .into_iter()
        .map(|m| Range::keyword(index.to_utf16(m.start), index.to_utf16(m.end), m.term))
        .collect();

    let ranges = merge_ranges(&primary, &matches);

    log::debug!(
        "keyword pass: {} matches, {} ranges after merge",
        matches.len(),
        ranges.len()
    );

    Ok(HighlightOutcome { ranges, matches })
}

/// 將低優先權範圍裁切進高優先權範圍之間的空隙
///
/// `primary` 需已排序且互不重疊。每個低優先權範圍：
/// - 起點若落在高優先權範圍內，往後移到該範圍結尾
/// - 若有高優先權範圍從它的中間開始，終點截到那個起點
/// - 裁切後為空則捨棄
pub fn merge_ranges(primary: &[Range], secondary: &[Range]) -> Vec<Range> {
    let mut merged: Vec<Range> = primary.to_vec();

    for range in secondary {
        let mut start = range.start;
        let mut end = range.end;
        let mut i = primary.partition_point(|p| p.end <= start);

        while start < end {
            let Some(p) = primary.get(i) else {
                break;
            };
            if p.start >= end {
                break;
            }
            if p.start <= start {
                start = p.end;
                i += 1;
            } else {
                end = p.start;
            }
        }

        if start < end {
            merged.push(Range::new(start, end, range.kind));
        }
    }

    sort_ranges(&mut merged);
    merged
}

/// 整理 Pass A 的範圍：排序，並讓同起點或重疊時優先權高者勝出
fn resolve_primary(mut ranges: Vec<Range>) -> Vec<Range> {
    sort_ranges(&mut ranges);

    let mut resolved: Vec<Range> = Vec::with_capacity(ranges.len());
    for mut range in ranges {
        if let Some(prev) = resolved.last() {
            range.start = range.start.max(prev.end);
        }
        if !range.is_empty() {
            resolved.push(range);
        }
    }
    resolved
}
