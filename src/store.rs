// 設定紀錄的儲存後端

use crate::config::AppState;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// 可替換的設定儲存
pub trait ConfigStore {
    /// 讀取紀錄；尚未儲存過時回傳 `Ok(None)`
    fn load(&self) -> Result<Option<AppState>>;
    fn save(&mut self, state: &AppState) -> Result<()>;
}

/// 以 JSON 檔保存
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config_dir>/markpen/state.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("markpen").join("state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonFileStore {
    fn load(&self) -> Result<Option<AppState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state file: {}", self.path.display()))?;

        // 損壞的紀錄不是致命錯誤，退回預設值
        match AppState::from_json(&json) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                log::warn!(
                    "Ignoring corrupt state file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    fn save(&mut self, state: &AppState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }
        }

        let json = state.to_json().context("Failed to serialize state")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))?;
        log::debug!("state saved to {}", self.path.display());
        Ok(())
    }
}

/// 記憶體內的儲存（測試與一次性執行用）
#[derive(Debug, Default)]
pub struct MemoryStore {
    json: Option<String>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: &AppState) -> Result<Self> {
        Ok(Self {
            json: Some(state.to_json()?),
            saves: 0,
        })
    }

    /// 呼叫 `save` 的次數
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self) -> Result<Option<AppState>> {
        match &self.json {
            Some(json) => Ok(Some(AppState::from_json(json)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, state: &AppState) -> Result<()> {
        self.json = Some(state.to_json()?);
        self.saves += 1;
        Ok(())
    }
}

/// 讀取紀錄，沒有或讀取失敗時使用預設值
pub fn load_or_default(store: &dyn ConfigStore) -> AppState {
    match store.load() {
        Ok(Some(state)) => state,
        Ok(None) => AppState::new(),
        Err(e) => {
            log::warn!("Failed to load state, using defaults: {:#}", e);
            AppState::new()
        }
    }
}
