//! Pass A：取代與句首大寫
//!
//! 1. 以單一交替式樣式掃描正規化後的文字，逐一產生取代文字
//! 2. 邊組裝輸出邊記錄取代範圍（位置以輸出文字為準）
//! 3. 啟用 auto caps 時再掃描輸出：文字開頭或 `.?!` 後（可隔空白、換行）
//!    的小寫字母改為大寫；落在取代範圍內時升級該範圍，不另建巢狀範圍
//!
//! 整個計算是純函式，失敗時呼叫端的文字不受影響。

use super::{sort_ranges, AnnotateError, Range, RangeKind};
use crate::normalize::normalize;
use crate::rules::{apply_case, Mode, TermMatcher};
use crate::utils::Utf16Index;
use fancy_regex::Regex;
use once_cell::sync::Lazy;

/// 句首：文字開頭或句末標點之後的第一個小寫字母
static SENTENCE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[.?!])\s*(\p{Ll})").expect("static sentence pattern"));

/// 取代結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceOutcome {
    /// 取代後的文字
    pub text: String,
    /// 依起點排序的 Replace / ReplaceAndCaps / AutoCaps 範圍（UTF-16）
    pub ranges: Vec<Range>,
    /// 取代次數
    pub replaced: usize,
    /// 改為大寫的字母數
    pub capitalized: usize,
}

pub fn replace_all(mode: &Mode, buffer: &str) -> Result<ReplaceOutcome, AnnotateError> {
    let finds: Vec<&str> = mode.pairs.iter().map(|r| r.find.as_str()).collect();
    let matcher = TermMatcher::compile(finds.as_slice(), mode.match_options())?
        .ok_or(AnnotateError::NoRules)?;

    if buffer.trim().is_empty() {
        return Err(AnnotateError::EmptyBuffer);
    }

    let text = normalize(buffer);
    let matches = matcher.find_all(&text)?;

    let mut output = String::with_capacity(text.len());
    let mut spans = Vec::with_capacity(matches.len());
    let mut last = 0;

    for m in &matches {
        output.push_str(&text[last..m.start]);

        let replacement = normalize(&mode.pairs[m.term].replace);
        let start = output.len();
        if mode.match_case {
            output.push_str(&replacement);
        } else {
            output.push_str(&apply_case(&text[m.start..m.end], &replacement));
        }

        // 取代成空字串時沒有可顯示的範圍，但仍計入次數
        if output.len() > start {
            spans.push(Range::new(start, output.len(), RangeKind::Replace));
        }
        last = m.end;
    }
    output.push_str(&text[last..]);

    let capitalized = if mode.auto_caps {
        capitalize_sentences(&mut output, &mut spans)?
    } else {
        0
    };

    let index = Utf16Index::new(&output);
    let mut ranges: Vec<Range> = spans.into_iter().map(|r| r.to_utf16(&index)).collect();
    sort_ranges(&mut ranges);

    log::debug!(
        "replace pass: {} replacements, {} capitalized, {} ranges",
        matches.len(),
        capitalized,
        ranges.len()
    );

    Ok(ReplaceOutcome {
        text: output,
        ranges,
        replaced: matches.len(),
        capitalized,
    })
}

/// 句首大寫（位元組位置）
///
/// `spans` 為依起點排序、互不重疊的取代範圍；大寫化可能改變字串長度，
/// 所有範圍依累計位移重新定位。
fn capitalize_sentences(
    text: &mut String,
    spans: &mut Vec<Range>,
) -> Result<usize, fancy_regex::Error> {
    let mut targets: Vec<(usize, char)> = Vec::new();
    for caps in SENTENCE_START.captures_iter(text) {
        let caps = caps?;
        if let Some(letter) = caps.get(1) {
            if let Some(ch) = letter.as_str().chars().next() {
                targets.push((letter.start(), ch));
            }
        }
    }

    if targets.is_empty() {
        return Ok(0);
    }

    let mut out = String::with_capacity(text.len() + targets.len());
    // shifts[k]：前 k 個目標造成的累計長度差
    let mut shifts: Vec<isize> = Vec::with_capacity(targets.len() + 1);
    shifts.push(0);
    let mut caps_spans = Vec::new();
    let mut last = 0;

    for &(pos, ch) in &targets {
        out.push_str(&text[last..pos]);
        let start = out.len();
        out.extend(ch.to_uppercase());

        let delta = (out.len() - start) as isize - ch.len_utf8() as isize;
        let total = shifts.last().copied().unwrap_or(0) + delta;
        shifts.push(total);
        last = pos + ch.len_utf8();

        let idx = spans.partition_point(|r| r.end <= pos);
        match spans.get_mut(idx).filter(|r| r.start <= pos) {
            Some(span) => span.kind = RangeKind::ReplaceAndCaps,
            None => caps_spans.push(Range::new(start, out.len(), RangeKind::AutoCaps)),
        }
    }
    out.push_str(&text[last..]);

    let shift = |x: usize| {
        let k = targets.partition_point(|&(p, _)| p < x);
        (x as isize + shifts[k]) as usize
    };
    for span in spans.iter_mut() {
        span.start = shift(span.start);
        span.end = shift(span.end);
    }
    spans.extend(caps_spans);

    *text = out;
    Ok(targets.len())
}
