use crate::chapter::{split_chapters, Chapter};
use crate::config::{AppState, ModeError};
use crate::cursor::Document;
use crate::exchange;
use crate::highlight::{
    highlight_keywords, replace_all, AnnotateError, HighlightOutcome, Range, ReplaceOutcome,
};
use crate::rules::Rule;
use crate::search::KeywordSearch;
use crate::store::{load_or_default, ConfigStore};
use crate::view::Selection;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// 給使用者的提示訊息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Success => write!(f, "✓ {}", self.message),
            NoticeLevel::Error => write!(f, "⚠️ {}", self.message),
        }
    }
}

/// 編輯工作階段：設定、儲存後端與目前的文件
pub struct Editor {
    state: AppState,
    store: Box<dyn ConfigStore>,
    document: Document,
    search: KeywordSearch,
}

impl Editor {
    pub fn new(store: Box<dyn ConfigStore>) -> Self {
        let state = load_or_default(store.as_ref());
        log::debug!(
            "editor loaded {} modes, active \"{}\", {} keywords",
            state.modes.len(),
            state.active_mode,
            state.keywords.len()
        );

        Self {
            state,
            store,
            document: Document::new(),
            search: KeywordSearch::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn match_count(&self) -> usize {
        self.search.match_count()
    }

    // ---- 文件 ----

    /// 使用者修改文字後呼叫：重算關鍵字並就地重新輸出
    ///
    /// 成功時不產生提示；比對失敗時文字仍保留，只少了關鍵字標示。
    pub fn edit(&mut self, text: String, selection: Selection) -> Option<Notice> {
        let kept = self.document.edit(text, selection);
        match self.run_keywords(&kept) {
            Ok(_) => None,
            Err(e) => {
                log::warn!("keyword pass failed: {}", e);
                self.search.clear();
                self.document.rerender(kept);
                Some(Notice::error(format!("Highlight failed: {}", e)))
            }
        }
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.document.set_selection(selection);
    }

    /// 標示關鍵字並回報命中數
    pub fn search(&mut self) -> Notice {
        if self.state.keywords.is_empty() {
            return Notice::error("No keywords entered");
        }
        if self.document.is_blank() {
            return Notice::error("Nothing to search");
        }

        let existing = self.document.ranges().to_vec();
        match self.run_keywords(&existing) {
            Ok(count) => Notice::success(format!("Highlighted {} keywords", count)),
            Err(e) => Notice::error(format!("Search failed: {}", e)),
        }
    }

    /// 以使用中的模式全部取代，再重算關鍵字；任何一步失敗時文件不變
    pub fn replace_all(&mut self) -> Notice {
        let keywords = &self.state.keywords;
        let result = replace_all(self.state.active(), self.document.text()).and_then(|outcome| {
            let highlighted = highlight_keywords(keywords, &outcome.text, &outcome.ranges)?;
            Ok((outcome, highlighted))
        });
        self.commit_replace(result)
    }

    /// 清空文件與關鍵字
    pub fn clear(&mut self) -> Notice {
        self.document.clear();
        self.search.clear();
        self.state.keywords.clear();
        self.persist(Notice::success("Cleared everything"))
    }

    /// 取出全部文字並清空文件
    pub fn take_text(&mut self) -> Result<String, Notice> {
        if self.document.is_blank() {
            return Err(Notice::error("No content"));
        }
        let text = self.document.text().to_string();
        self.document.clear();
        self.search.clear();
        Ok(text)
    }

    pub fn chapters(&self) -> Result<Vec<Chapter>, AnnotateError> {
        split_chapters(self.document.text())
    }

    /// 跳到下一個關鍵字命中並選取它
    pub fn next_match(&mut self) -> Option<Range> {
        let hit = self.search.next_match()?;
        self.document.set_selection(Selection::new(hit.start, hit.end));
        Some(hit)
    }

    pub fn prev_match(&mut self) -> Option<Range> {
        let hit = self.search.prev_match()?;
        self.document.set_selection(Selection::new(hit.start, hit.end));
        Some(hit)
    }

    // ---- 關鍵字 ----

    pub fn add_keywords(&mut self, raw: &str) -> Notice {
        let added = self.state.keywords.add(raw);
        if added == 0 {
            return Notice::error("No new keywords");
        }
        self.refresh_keywords();
        self.persist(Notice::success(format!("Added {} keywords", added)))
    }

    pub fn remove_keyword(&mut self, word: &str) -> Notice {
        if !self.state.keywords.remove(word) {
            return Notice::error(format!("Keyword \"{}\" not found", word));
        }
        self.refresh_keywords();
        self.persist(Notice::success(format!("Removed \"{}\"", word)))
    }

    pub fn clear_keywords(&mut self) -> Notice {
        self.state.keywords.clear();
        self.refresh_keywords();
        self.persist(Notice::success("Keywords cleared"))
    }

    pub fn toggle_keyword_match_case(&mut self) -> Notice {
        let settings = &mut self.state.keywords.settings;
        settings.match_case = !settings.match_case;
        let on = settings.match_case;
        self.refresh_keywords();
        self.persist(Notice::success(format!("Keyword match case {}", on_off(on))))
    }

    pub fn toggle_keyword_whole_word(&mut self) -> Notice {
        let settings = &mut self.state.keywords.settings;
        settings.whole_word = !settings.whole_word;
        let on = settings.whole_word;
        self.refresh_keywords();
        self.persist(Notice::success(format!("Keyword whole word {}", on_off(on))))
    }

    pub fn import_keywords(&mut self, text: &str) -> Notice {
        let added = exchange::import_keywords(&mut self.state, text);
        self.refresh_keywords();
        self.persist(Notice::success(format!("Imported {} keywords", added)))
    }

    pub fn export_keywords(&self) -> String {
        exchange::export_keywords(&self.state)
    }

    // ---- 模式 ----

    pub fn add_mode(&mut self, name: &str) -> Notice {
        let result = self.state.add_mode(name);
        self.mode_result(result, || format!("Created mode \"{}\"", name.trim()))
    }

    pub fn delete_mode(&mut self) -> Notice {
        match self.state.delete_mode() {
            Ok(name) => self.persist(Notice::success(format!("Deleted mode \"{}\"", name))),
            Err(e) => Notice::error(e.to_string()),
        }
    }

    pub fn rename_mode(&mut self, new_name: &str) -> Notice {
        let result = self.state.rename_mode(new_name);
        self.mode_result(result, || format!("Renamed to \"{}\"", new_name.trim()))
    }

    pub fn set_active_mode(&mut self, name: &str) -> Notice {
        let result = self.state.set_active(name);
        self.mode_result(result, || format!("Switched to \"{}\"", name))
    }

    pub fn set_pairs(&mut self, pairs: Vec<Rule>) -> Notice {
        self.state.set_pairs(pairs);
        let message = format!("Saved \"{}\"", self.state.active_mode);
        self.persist(Notice::success(message))
    }

    pub fn toggle_match_case(&mut self) -> Notice {
        let on = self.state.toggle_match_case();
        self.persist(Notice::success(format!("Match case {}", on_off(on))))
    }

    pub fn toggle_whole_word(&mut self) -> Notice {
        let on = self.state.toggle_whole_word();
        self.persist(Notice::success(format!("Whole word {}", on_off(on))))
    }

    pub fn toggle_auto_caps(&mut self) -> Notice {
        let on = self.state.toggle_auto_caps();
        self.persist(Notice::success(format!("Auto caps {}", on_off(on))))
    }

    // ---- 匯出匯入 ----

    pub fn export_csv(&self) -> String {
        exchange::export_csv(&self.state)
    }

    pub fn import_csv(&mut self, text: &str) -> Notice {
        match exchange::import_csv(&mut self.state, text) {
            Ok(count) => self.persist(Notice::success(format!("Imported {} rows", count))),
            Err(e) => Notice::error(format!("Invalid CSV file: {}", e)),
        }
    }

    // ---- 內部 ----

    /// 只有兩個階段都成功時才寫回文件
    fn commit_replace(
        &mut self,
        result: Result<(ReplaceOutcome, HighlightOutcome), AnnotateError>,
    ) -> Notice {
        let (outcome, highlighted) = match result {
            Ok(pair) => pair,
            Err(AnnotateError::NoRules) => {
                return Notice::error(format!(
                    "No replacement rules in mode \"{}\"",
                    self.state.active_mode
                ))
            }
            Err(AnnotateError::EmptyBuffer) => return Notice::error("Nothing to replace"),
            Err(e) => {
                log::warn!("replace pass failed: {}", e);
                return Notice::error(format!("Replace failed: {}", e));
            }
        };

        if outcome.replaced == 0 && outcome.capitalized == 0 {
            return Notice::error("No matches found to replace");
        }

        self.document.replace_contents(outcome.text, highlighted.ranges);
        self.search.set_matches(highlighted.matches);

        let mut message = format!("Replaced {} words", outcome.replaced);
        if outcome.capitalized > 0 {
            message.push_str(&format!(", capitalized {} letters", outcome.capitalized));
        }
        Notice::success(message)
    }

    fn run_keywords(&mut self, existing: &[Range]) -> Result<usize, AnnotateError> {
        let outcome = highlight_keywords(&self.state.keywords, self.document.text(), existing)?;
        let count = outcome.match_count();
        self.search.set_matches(outcome.matches);
        self.document.rerender(outcome.ranges);
        Ok(count)
    }

    /// 關鍵字或其設定改變後重新標示目前的文件
    fn refresh_keywords(&mut self) {
        let existing = self.document.ranges().to_vec();
        if let Err(e) = self.run_keywords(&existing) {
            log::warn!("keyword pass failed: {}", e);
            self.search.clear();
        }
    }

    fn mode_result(
        &mut self,
        result: Result<(), ModeError>,
        message: impl FnOnce() -> String,
    ) -> Notice {
        match result {
            Ok(()) => self.persist(Notice::success(message())),
            Err(e) => Notice::error(e.to_string()),
        }
    }

    /// 每次設定變更後立即寫入；寫入失敗時改回報錯誤
    fn persist(&mut self, notice: Notice) -> Notice {
        match self.store.save(&self.state) {
            Ok(()) => notice,
            Err(e) => {
                log::warn!("Failed to save state: {:#}", e);
                Notice::error(format!("Failed to save settings: {}", e))
            }
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::RangeKind;
    use crate::rules::DEFAULT_MODE;
    use crate::store::MemoryStore;
    use anyhow::Result;

    struct FailingStore;

    impl ConfigStore for FailingStore {
        fn load(&self) -> Result<Option<AppState>> {
            Ok(None)
        }

        fn save(&mut self, _state: &AppState) -> Result<()> {
            anyhow::bail!("disk full")
        }
    }

    fn editor() -> Editor {
        Editor::new(Box::new(MemoryStore::new()))
    }

    fn editor_with_text(text: &str) -> Editor {
        let mut ed = editor();
        ed.edit(text.to_string(), Selection::caret(0));
        ed
    }

    #[test]
    fn test_edit_highlights_keywords() {
        let mut ed = editor();
        ed.add_keywords("fox");
        assert!(ed
            .edit("the fox".to_string(), Selection::caret(7))
            .is_none());

        assert_eq!(ed.document().ranges(), &[Range::keyword(4, 7, 0)]);
        assert_eq!(
            ed.document().html(),
            "the <span class=\"keyword hl-pink\">fox</span>"
        );
        assert_eq!(ed.document().selection(), Selection::caret(7));
        assert_eq!(ed.match_count(), 1);
    }

    #[test]
    fn test_search_notices() {
        let mut ed = editor_with_text("a b a");
        let notice = ed.search();
        assert!(notice.is_error());
        assert_eq!(notice.to_string(), "⚠️ No keywords entered");

        ed.add_keywords("a");
        let notice = ed.search();
        assert_eq!(notice, Notice::success("Highlighted 2 keywords"));
        assert_eq!(notice.to_string(), "✓ Highlighted 2 keywords");
    }

    #[test]
    fn test_replace_all_commits_and_moves_caret() {
        let mut ed = editor_with_text("hello world. bye");
        ed.set_pairs(vec![Rule::new("hello", "hi")]);
        ed.toggle_auto_caps();

        let notice = ed.replace_all();
        assert_eq!(
            notice,
            Notice::success("Replaced 1 words, capitalized 2 letters")
        );
        assert_eq!(ed.document().text(), "Hi world. Bye");
        assert_eq!(ed.document().selection(), Selection::caret(13));
        assert_eq!(
            ed.document().ranges(),
            &[
                Range::new(0, 2, RangeKind::ReplaceAndCaps),
                Range::new(10, 11, RangeKind::AutoCaps),
            ]
        );
    }

    #[test]
    fn test_replace_all_error_leaves_document() {
        let mut ed = editor_with_text("some text");
        assert_eq!(
            ed.replace_all(),
            Notice::error("No replacement rules in mode \"default\"")
        );

        ed.set_pairs(vec![Rule::new("absent", "x")]);
        assert_eq!(ed.replace_all(), Notice::error("No matches found to replace"));
        assert_eq!(ed.document().text(), "some text");

        let mut empty = editor();
        empty.set_pairs(vec![Rule::new("a", "b")]);
        assert_eq!(empty.replace_all(), Notice::error("Nothing to replace"));
    }

    #[test]
    fn test_failed_pattern_leaves_document_untouched() {
        let mut ed = editor();
        ed.add_keywords("bar");
        ed.edit("foo bar".to_string(), Selection::new(1, 3));
        let before = ed.document().clone();
        let count = ed.match_count();

        let err = fancy_regex::Regex::new("(").unwrap_err();
        let notice = ed.commit_replace(Err(AnnotateError::Pattern(err)));

        assert!(notice.is_error());
        assert!(notice.message.starts_with("Replace failed: "));
        assert_eq!(ed.document(), &before);
        assert_eq!(ed.document().text(), "foo bar");
        assert_eq!(ed.document().ranges(), &[Range::keyword(4, 7, 0)]);
        assert_eq!(ed.document().selection(), Selection::new(1, 3));
        assert_eq!(ed.match_count(), count);
    }

    #[test]
    fn test_replace_keeps_keyword_count_inside_replacement() {
        let mut ed = editor_with_text("a foo b");
        ed.set_pairs(vec![Rule::new("foo", "bar")]);
        ed.add_keywords("bar");

        ed.replace_all();
        assert_eq!(ed.match_count(), 1);
        assert_eq!(
            ed.document().ranges(),
            &[Range::new(2, 5, RangeKind::Replace)]
        );
    }

    #[test]
    fn test_edit_keeps_replace_ranges_outside_change() {
        let mut ed = editor_with_text("foo x");
        ed.set_pairs(vec![Rule::new("foo", "bar")]);
        ed.replace_all();
        assert_eq!(ed.document().text(), "bar x");

        ed.edit("bar xy".to_string(), Selection::caret(6));
        assert_eq!(
            ed.document().ranges(),
            &[Range::new(0, 3, RangeKind::Replace)]
        );
    }

    #[test]
    fn test_match_navigation_selects_hit() {
        let mut ed = editor();
        ed.add_keywords("ab");
        ed.edit("ab cd ab".to_string(), Selection::caret(0));

        assert_eq!(ed.next_match(), Some(Range::keyword(0, 2, 0)));
        assert_eq!(ed.next_match(), Some(Range::keyword(6, 8, 0)));
        assert_eq!(ed.document().selection(), Selection::new(6, 8));
        assert_eq!(ed.prev_match(), Some(Range::keyword(6, 8, 0)));
    }

    #[test]
    fn test_take_text_and_clear() {
        let mut ed = editor();
        assert_eq!(ed.take_text(), Err(Notice::error("No content")));

        ed.edit("keep me".to_string(), Selection::caret(0));
        assert_eq!(ed.take_text().unwrap(), "keep me");
        assert!(ed.document().text().is_empty());

        ed.add_keywords("x");
        ed.edit("x".to_string(), Selection::caret(1));
        assert!(!ed.clear().is_error());
        assert!(ed.state().keywords.is_empty());
        assert!(ed.document().html().is_empty());
    }

    #[test]
    fn test_mode_management_notices() {
        let mut ed = editor();
        assert_eq!(ed.add_mode("vi"), Notice::success("Created mode \"vi\""));
        assert!(ed.add_mode("vi").is_error());
        assert_eq!(ed.rename_mode("vn"), Notice::success("Renamed to \"vn\""));
        assert_eq!(ed.delete_mode(), Notice::success("Deleted mode \"vn\""));
        assert!(ed.delete_mode().is_error());
        assert_eq!(ed.state().active_mode, DEFAULT_MODE);
        assert!(ed.set_active_mode("missing").is_error());
    }

    #[test]
    fn test_keyword_settings_rehighlight() {
        let mut ed = editor();
        ed.add_keywords("cat");
        ed.edit("concatenate cat".to_string(), Selection::caret(0));
        assert_eq!(ed.match_count(), 2);

        ed.toggle_keyword_whole_word();
        assert_eq!(ed.match_count(), 1);

        ed.remove_keyword("cat");
        assert_eq!(ed.match_count(), 0);
        assert!(ed.document().ranges().is_empty());
    }

    #[test]
    fn test_csv_import_through_editor() {
        let mut ed = editor();
        assert!(ed.import_csv("no header here").is_error());
        assert_eq!(ed.state().modes.len(), 1);

        let notice = ed.import_csv("find,replace,mode\n\"a\",\"b\",\"vi\"\n");
        assert_eq!(notice, Notice::success("Imported 1 rows"));
        assert!(ed.export_csv().contains("\"a\",\"b\",\"vi\""));
    }

    #[test]
    fn test_settings_persist_to_store() {
        let mut ed = editor();
        ed.add_keywords("alpha, beta");
        ed.add_mode("vi");

        let saved = ed.store.load().unwrap().unwrap();
        assert_eq!(saved.keywords.keywords, vec!["alpha", "beta"]);
        assert_eq!(saved.active_mode, "vi");
    }

    #[test]
    fn test_save_failure_reported() {
        let mut ed = Editor::new(Box::new(FailingStore));
        let notice = ed.toggle_auto_caps();
        assert!(notice.is_error());
        assert!(notice.message.contains("disk full"));
        // 記憶體中的狀態仍已更新
        assert!(ed.state().active().auto_caps);
    }

    #[test]
    fn test_chapters_of_document() {
        let ed = editor_with_text("Chapter 1\none\nChapter 2\ntwo");
        let chapters = ed.chapters().unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[1].body, "two");
    }
}
