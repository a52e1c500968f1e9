//! 章節切分
//!
//! 標題列的形式為 `Chương 3`、`Chapter 12: Tên`、`CHAPTER IV - Title`、`Hồi 5`：
//! 關鍵詞加上阿拉伯或羅馬數字，後面可接 `:` `.` `-` 與標題文字，
//! 整列獨立成行（大小寫不拘，換行可為 `\n` 或 `\r\n`）。

use crate::highlight::AnnotateError;
use crate::utils::Utf16Index;
use fancy_regex::Regex;
use once_cell::sync::Lazy;

static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^[ \t]*(?:chương|chapter|hồi)[ \t]+(?:\d+|[ivxlcdm]+)[ \t]*(?:[:.\-][^\r\n]*)?\r?$",
    )
    .expect("static heading pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// 標題列（已去除前後空白）；前言沒有標題
    pub heading: Option<String>,
    pub body: String,
    /// 章節在全文中的起點（UTF-16）
    pub start: usize,
}

pub fn split_chapters(text: &str) -> Result<Vec<Chapter>, AnnotateError> {
    let mut headings = Vec::new();
    for m in HEADING.find_iter(text) {
        let m = m?;
        headings.push((m.start(), m.end()));
    }

    if headings.is_empty() {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        return Ok(vec![Chapter {
            heading: None,
            body: text.to_string(),
            start: 0,
        }]);
    }

    let index = Utf16Index::new(text);
    let mut chapters = Vec::with_capacity(headings.len() + 1);

    let preamble = &text[..headings[0].0];
    if !preamble.trim().is_empty() {
        chapters.push(Chapter {
            heading: None,
            body: preamble.trim_end().to_string(),
            start: 0,
        });
    }

    for (i, &(start, end)) in headings.iter().enumerate() {
        let body_end = headings.get(i + 1).map_or(text.len(), |&(next, _)| next);
        let body = text[end..body_end].trim_matches(|c| c == '\r' || c == '\n');

        chapters.push(Chapter {
            heading: Some(text[start..end].trim().to_string()),
            body: body.trim_end().to_string(),
            start: index.to_utf16(start),
        });
    }

    log::debug!("split into {} chapters", chapters.len());
    Ok(chapters)
}
