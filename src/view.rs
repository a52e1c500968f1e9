// 將文字與標註範圍輸出為 HTML

use crate::highlight::{Range, RangeKind};
use crate::utils::Utf16Index;

/// 關鍵字顏色，依關鍵字索引循環使用
pub const KEYWORD_PALETTE: [&str; 6] = [
    "hl-pink",
    "hl-blue",
    "hl-green",
    "hl-orange",
    "hl-purple",
    "hl-red",
];

/// 選取範圍（UTF-16 位置；start == end 時為游標）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn caret(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    /// 限制在 `[0, len]` 之內
    pub fn clamped(self, len: usize) -> Self {
        Self::new(self.start.min(len), self.end.min(len))
    }
}

pub fn style_class(kind: RangeKind) -> String {
    match kind {
        RangeKind::Replace => "replaced".to_string(),
        RangeKind::AutoCaps => "auto-caps".to_string(),
        RangeKind::ReplaceAndCaps => "replaced auto-caps".to_string(),
        RangeKind::Keyword { color } => {
            format!("keyword {}", KEYWORD_PALETTE[color % KEYWORD_PALETTE.len()])
        }
    }
}

/// HTML 跳脫 `& < > " '`
pub fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

/// 輸出 HTML：範圍之間的文字直接跳脫，每個範圍包成一個 `<span>`
///
/// 範圍需依起點排序；與前一個範圍重疊或超出文字的部分會被略過。
pub fn render(text: &str, ranges: &[Range]) -> String {
    let index = Utf16Index::new(text);
    let mut out = String::with_capacity(text.len() + ranges.len() * 32);
    let mut last = 0;

    for range in ranges {
        let start = index.to_byte(range.start).max(last);
        let end = index.to_byte(range.end);
        if start >= end {
            continue;
        }

        escape_into(&mut out, &text[last..start]);
        out.push_str("<span class=\"");
        out.push_str(&style_class(range.kind));
        out.push_str("\">");
        escape_into(&mut out, &text[start..end]);
        out.push_str("</span>");
        last = end;
    }
    escape_into(&mut out, &text[last..]);
    out
}
