// 文件狀態：文字、範圍、輸出 HTML 與選取位置

use crate::highlight::Range;
use crate::utils::utf16_len;
use crate::view::{render, Selection};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    text: String,
    ranges: Vec<Range>,
    html: String,
    selection: Selection,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn len_utf16(&self) -> usize {
        utf16_len(&self.text)
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// 就地重新輸出：先記下選取位置，輸出後還原（限制在文字長度內）
    pub fn rerender(&mut self, ranges: Vec<Range>) {
        let selection = self.selection;
        self.ranges = ranges;
        self.html = render(&self.text, &self.ranges);
        self.selection = selection.clamped(self.len_utf16());
    }

    /// 整份文字被取代（例如全部取代）：游標移到結尾
    pub fn replace_contents(&mut self, text: String, ranges: Vec<Range>) {
        self.text = text;
        self.ranges = ranges;
        self.html = render(&self.text, &self.ranges);
        self.selection = Selection::caret(self.len_utf16());
    }

    /// 使用者編輯後的新文字
    ///
    /// 以共同前綴與後綴找出被改動的區段：與它相交的取代範圍移除，
    /// 之後的範圍依長度差位移。關鍵字範圍全部丟棄，由呼叫端重算。
    /// 回傳保留下來的範圍，尚未輸出。
    pub fn edit(&mut self, text: String, selection: Selection) -> Vec<Range> {
        let (prefix, old_suffix) = changed_span(&self.text, &text);
        let new_len = utf16_len(&text);
        let old_len = self.len_utf16();
        let old_end = old_len - old_suffix;
        let new_end = new_len - old_suffix;

        let kept: Vec<Range> = self
            .ranges
            .iter()
            .filter(|r| !r.kind.is_keyword())
            .filter_map(|r| {
                if r.end <= prefix {
                    Some(*r)
                } else if r.start >= old_end {
                    Some(Range::new(
                        r.start - old_end + new_end,
                        r.end - old_end + new_end,
                        r.kind,
                    ))
                } else {
                    None
                }
            })
            .collect();

        self.text = text;
        self.selection = selection.clamped(new_len);
        kept
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamped(self.len_utf16());
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// 共同前綴與後綴的長度（UTF-16），兩者不重疊
fn changed_span(old: &str, new: &str) -> (usize, usize) {
    let mut prefix = 0;
    let mut prefix_chars = 0;
    for (a, b) in old.chars().zip(new.chars()) {
        if a != b {
            break;
        }
        prefix += a.len_utf16();
        prefix_chars += 1;
    }

    let old_rest = old.chars().count() - prefix_chars;
    let new_rest = new.chars().count() - prefix_chars;
    let mut suffix = 0;
    for (a, b) in old
        .chars()
        .rev()
        .zip(new.chars().rev())
        .take(old_rest.min(new_rest))
    {
        if a != b {
            break;
        }
        suffix += a.len_utf16();
    }

    (prefix, suffix)
}
