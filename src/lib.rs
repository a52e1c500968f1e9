//! markpen - 文字標註引擎：關鍵字標示、依模式取代與句首大寫
//!
//! 流程：原始文字 → 正規化 → 編譯規則 → 取代（Pass A）→ 關鍵字標示（Pass B）→ HTML

pub mod buffer;
pub mod chapter;
pub mod config;
pub mod cursor;
pub mod editor;
pub mod exchange;
pub mod highlight;
pub mod normalize;
pub mod rules;
pub mod search;
pub mod store;
pub mod utils;
pub mod view;

// 重新導出常用類型
pub use config::AppState;
pub use cursor::Document;
pub use editor::{Editor, Notice, NoticeLevel};
pub use highlight::{AnnotateError, Range, RangeKind};
pub use rules::{Mode, Rule};
pub use search::KeywordSet;
pub use view::{render, Selection};
