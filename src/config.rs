// 設定紀錄：模式、關鍵字與介面偏好

use crate::rules::{Mode, Rule, DEFAULT_MODE};
use crate::search::KeywordSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 介面偏好（只保存，不解讀）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiPrefs {
    pub font_family: String,
    pub font_size: String,
    pub keywords_sidebar_open: bool,
}

impl UiPrefs {
    pub fn new() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size: "16px".to_string(),
            keywords_sidebar_open: true,
        }
    }
}

impl Default for UiPrefs {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModeError {
    #[error("mode name is empty")]
    EmptyName,
    #[error("mode \"{0}\" already exists")]
    AlreadyExists(String),
    #[error("mode \"{0}\" not found")]
    NotFound(String),
    #[error("the default mode cannot be deleted or renamed")]
    Protected,
}

/// 持久化的整份設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    /// 依建立順序排列的模式
    pub modes: IndexMap<String, Mode>,
    #[serde(alias = "active")]
    pub active_mode: String,
    #[serde(flatten)]
    pub keywords: KeywordSet,
    pub ui: UiPrefs,
}

impl AppState {
    pub fn new() -> Self {
        let mut modes = IndexMap::new();
        modes.insert(DEFAULT_MODE.to_string(), Mode::default());
        Self {
            modes,
            active_mode: DEFAULT_MODE.to_string(),
            keywords: KeywordSet::default(),
            ui: UiPrefs::default(),
        }
    }

    /// 修復載入的紀錄：補上預設模式，無效的使用中模式退回預設
    pub fn repair(&mut self) {
        if !self.modes.contains_key(DEFAULT_MODE) {
            log::warn!("state has no default mode, recreating it");
            self.modes.shift_insert(0, DEFAULT_MODE.to_string(), Mode::default());
        }
        if !self.modes.contains_key(&self.active_mode) {
            log::warn!(
                "active mode \"{}\" not found, falling back to default",
                self.active_mode
            );
            self.active_mode = DEFAULT_MODE.to_string();
        }
    }

    pub fn active(&self) -> &Mode {
        // repair() 之後使用中的模式一定存在
        self.modes
            .get(&self.active_mode)
            .or_else(|| self.modes.get(DEFAULT_MODE))
            .unwrap_or(&EMPTY_MODE)
    }

    pub fn active_mut(&mut self) -> &mut Mode {
        self.repair();
        let name = self.active_mode.clone();
        self.modes.entry(name).or_default()
    }

    pub fn mode_names(&self) -> impl Iterator<Item = &str> {
        self.modes.keys().map(String::as_str)
    }

    /// 新增空白模式並設為使用中
    pub fn add_mode(&mut self, name: &str) -> Result<(), ModeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ModeError::EmptyName);
        }
        if self.modes.contains_key(name) {
            return Err(ModeError::AlreadyExists(name.to_string()));
        }
        self.modes.insert(name.to_string(), Mode::default());
        self.active_mode = name.to_string();
        Ok(())
    }

    /// 刪除使用中的模式，改用預設模式
    pub fn delete_mode(&mut self) -> Result<String, ModeError> {
        if self.active_mode == DEFAULT_MODE {
            return Err(ModeError::Protected);
        }
        let name = std::mem::replace(&mut self.active_mode, DEFAULT_MODE.to_string());
        self.modes
            .shift_remove(&name)
            .ok_or_else(|| ModeError::NotFound(name.clone()))?;
        Ok(name)
    }

    /// 重新命名使用中的模式，保留它在清單中的位置
    pub fn rename_mode(&mut self, new_name: &str) -> Result<(), ModeError> {
        let new_name = new_name.trim();
        if self.active_mode == DEFAULT_MODE {
            return Err(ModeError::Protected);
        }
        if new_name.is_empty() {
            return Err(ModeError::EmptyName);
        }
        if new_name == self.active_mode {
            return Ok(());
        }
        if self.modes.contains_key(new_name) {
            return Err(ModeError::AlreadyExists(new_name.to_string()));
        }

        let (index, _, mode) = self
            .modes
            .shift_remove_full(&self.active_mode)
            .ok_or_else(|| ModeError::NotFound(self.active_mode.clone()))?;
        self.modes.shift_insert(index, new_name.to_string(), mode);
        self.active_mode = new_name.to_string();
        Ok(())
    }

    pub fn set_active(&mut self, name: &str) -> Result<(), ModeError> {
        if !self.modes.contains_key(name) {
            return Err(ModeError::NotFound(name.to_string()));
        }
        self.active_mode = name.to_string();
        Ok(())
    }

    /// 取代使用中模式的規則；`find` 為空的列會被丟棄
    pub fn set_pairs(&mut self, pairs: Vec<Rule>) -> usize {
        let mode = self.active_mut();
        mode.pairs = pairs.into_iter().filter(|r| !r.find.is_empty()).collect();
        mode.pairs.len()
    }

    pub fn toggle_match_case(&mut self) -> bool {
        let mode = self.active_mut();
        mode.match_case = !mode.match_case;
        mode.match_case
    }

    pub fn toggle_whole_word(&mut self) -> bool {
        let mode = self.active_mut();
        mode.whole_word = !mode.whole_word;
        mode.whole_word
    }

    pub fn toggle_auto_caps(&mut self) -> bool {
        let mode = self.active_mut();
        mode.auto_caps = !mode.auto_caps;
        mode.auto_caps
    }

    /// 解析 JSON 紀錄並修復
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut state: AppState = serde_json::from_str(json)?;
        state.repair();
        Ok(state)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

static EMPTY_MODE: Mode = Mode {
    pairs: Vec::new(),
    match_case: false,
    whole_word: false,
    auto_caps: false,
};
