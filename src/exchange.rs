//! 規則與關鍵字的匯出匯入
//!
//! CSV 格式：第一列為標頭 `find,replace,mode[,case_sensitive,whole_word,auto_caps]`，
//! 文字欄位以雙引號包住，欄位內的雙引號寫成兩個。旗標欄為 `TRUE` / `FALSE`。
//!
//! 匯入分兩階段：先完整解析，標頭正確才套用到設定，
//! 因此格式錯誤的檔案不會留下任何變更。

use crate::config::AppState;
use crate::rules::{Mode, Rule};
use crate::search::split_keywords;
use thiserror::Error;

pub const CSV_HEADER: &str = "find,replace,mode,case_sensitive,whole_word,auto_caps";

const BOM: char = '\u{FEFF}';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("missing find,replace,mode header")]
    MissingHeader,
}

/// 解析後的一列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub find: String,
    pub replace: String,
    pub mode: String,
    pub match_case: bool,
    pub whole_word: bool,
    pub auto_caps: bool,
}

/// 匯出全部模式的規則（含 BOM）
pub fn export_csv(state: &AppState) -> String {
    let mut out = String::new();
    out.push(BOM);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for (name, mode) in &state.modes {
        for rule in &mode.pairs {
            push_quoted(&mut out, &rule.find);
            out.push(',');
            push_quoted(&mut out, &rule.replace);
            out.push(',');
            push_quoted(&mut out, name);
            for flag in [mode.match_case, mode.whole_word, mode.auto_caps] {
                out.push(',');
                out.push_str(if flag { "TRUE" } else { "FALSE" });
            }
            out.push('\n');
        }
    }
    out
}

fn push_quoted(out: &mut String, field: &str) {
    out.push('"');
    out.push_str(&field.replace('"', "\"\""));
    out.push('"');
}

/// 解析 CSV 文字；空白列與無法解析的列略過
pub fn parse_csv(text: &str) -> Result<Vec<CsvRow>, ImportError> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut lines = text.lines();

    let header = lines.next().unwrap_or_default();
    if !header.to_lowercase().contains("find,replace,mode") {
        return Err(ImportError::MissingHeader);
    }

    let mut rows = Vec::new();
    for (number, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_row(line) {
            Some(row) => rows.push(row),
            None => log::warn!("skipping malformed csv row {}: {}", number + 2, line),
        }
    }
    Ok(rows)
}

fn parse_row(line: &str) -> Option<CsvRow> {
    let fields = split_fields(line)?;
    if fields.len() < 3 {
        return None;
    }
    let flag = |i: usize| {
        fields
            .get(i)
            .is_some_and(|f| f.trim().eq_ignore_ascii_case("true"))
    };

    Some(CsvRow {
        find: fields[0].clone(),
        replace: fields[1].clone(),
        mode: fields[2].clone(),
        match_case: flag(3),
        whole_word: flag(4),
        auto_caps: flag(5),
    })
}

/// 切分一列欄位；引號未閉合或引號後接其他字元時回傳 `None`
fn split_fields(line: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        let mut field = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            loop {
                match chars.next()? {
                    '"' if chars.peek() == Some(&'"') => {
                        chars.next();
                        field.push('"');
                    }
                    '"' => break,
                    c => field.push(c),
                }
            }
            match chars.next() {
                None => {
                    fields.push(field);
                    return Some(fields);
                }
                Some(',') => fields.push(field),
                Some(_) => return None,
            }
        } else {
            loop {
                match chars.next() {
                    None => {
                        fields.push(field);
                        return Some(fields);
                    }
                    Some(',') => break,
                    Some(c) => field.push(c),
                }
            }
            fields.push(field);
        }
    }
}

/// 套用解析後的列，回傳匯入的規則數
///
/// 不存在的模式會被建立；模式還沒有規則時，以它的第一列決定旗標。
pub fn apply_rows(state: &mut AppState, rows: Vec<CsvRow>) -> usize {
    let count = rows.len();
    for row in rows {
        let mode = state.modes.entry(row.mode).or_insert_with(Mode::default);
        if mode.pairs.is_empty() {
            mode.match_case = row.match_case;
            mode.whole_word = row.whole_word;
            mode.auto_caps = row.auto_caps;
        }
        mode.pairs.push(Rule::new(row.find, row.replace));
    }
    count
}

pub fn import_csv(state: &mut AppState, text: &str) -> Result<usize, ImportError> {
    let rows = parse_csv(text)?;
    let count = apply_rows(state, rows);
    log::debug!("imported {} csv rows", count);
    Ok(count)
}

/// 關鍵字清單匯出：一行一個
pub fn export_keywords(state: &AppState) -> String {
    state.keywords.export()
}

/// 匯入純文字關鍵字清單，回傳新增數量
pub fn import_keywords(state: &mut AppState, text: &str) -> usize {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut added = 0;
    for word in split_keywords(text) {
        added += state.keywords.add(word);
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::DEFAULT_MODE;

    fn sample_state() -> AppState {
        let mut state = AppState::new();
        state.set_pairs(vec![
            Rule::new("say \"hi\"", "nói \"chào\""),
            Rule::new("a,b", "c"),
        ]);
        state.add_mode("strict").unwrap();
        state.set_pairs(vec![Rule::new("tp", "thành phố")]);
        state.toggle_match_case();
        state.toggle_auto_caps();
        state
    }

    #[test]
    fn test_export_format() {
        let csv = export_csv(&sample_state());
        let mut lines = csv.lines();

        assert_eq!(lines.next(), Some("\u{FEFF}find,replace,mode,case_sensitive,whole_word,auto_caps"));
        assert_eq!(
            lines.next(),
            Some(r#""say ""hi""","nói ""chào""","default",FALSE,FALSE,FALSE"#)
        );
        assert_eq!(lines.next(), Some(r#""a,b","c","default",FALSE,FALSE,FALSE"#));
        assert_eq!(lines.next(), Some(r#""tp","thành phố","strict",TRUE,FALSE,TRUE"#));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_round_trip_with_embedded_quotes() {
        let original = sample_state();
        let csv = export_csv(&original);

        let mut imported = AppState::new();
        let count = import_csv(&mut imported, &csv).unwrap();
        assert_eq!(count, 3);
        assert_eq!(imported.modes[DEFAULT_MODE].pairs, original.modes[DEFAULT_MODE].pairs);
        assert_eq!(imported.modes["strict"], original.modes["strict"]);
    }

    #[test]
    fn test_missing_header_changes_nothing() {
        let mut state = sample_state();
        let before = state.clone();

        let result = import_csv(&mut state, "\"x\",\"y\",\"new\"\n\"p\",\"q\",\"new\"");
        assert_eq!(result, Err(ImportError::MissingHeader));
        assert_eq!(state, before);

        assert_eq!(import_csv(&mut state, ""), Err(ImportError::MissingHeader));
        assert_eq!(state, before);
    }

    #[test]
    fn test_header_is_case_insensitive_and_short_form_accepted() {
        let mut state = AppState::new();
        let csv = "FIND,REPLACE,MODE\r\n\"x\",\"y\",\"vi\"\r\n";
        assert_eq!(import_csv(&mut state, csv).unwrap(), 1);

        let vi = &state.modes["vi"];
        assert_eq!(vi.pairs, vec![Rule::new("x", "y")]);
        assert!(!vi.match_case && !vi.whole_word && !vi.auto_caps);
    }

    #[test]
    fn test_skips_blank_and_malformed_rows() {
        let mut state = AppState::new();
        let csv = "find,replace,mode\n\n\"only two\",\"fields\"\n\"open,\"x\",\"vi\"\n\"ok\",\"fine\",\"vi\"\n";
        assert_eq!(import_csv(&mut state, csv).unwrap(), 1);
        assert_eq!(state.modes["vi"].pairs, vec![Rule::new("ok", "fine")]);
    }

    #[test]
    fn test_flags_come_from_first_row_of_new_mode() {
        let mut state = AppState::new();
        let csv = "find,replace,mode,case_sensitive,whole_word,auto_caps\n\
                   \"a\",\"b\",\"m\",true,TRUE,FALSE\n\
                   \"c\",\"d\",\"m\",FALSE,FALSE,TRUE\n";
        import_csv(&mut state, csv).unwrap();

        let m = &state.modes["m"];
        assert_eq!(m.pairs.len(), 2);
        assert!(m.match_case);
        assert!(m.whole_word);
        assert!(!m.auto_caps);
    }

    #[test]
    fn test_existing_mode_keeps_flags() {
        let mut state = AppState::new();
        state.set_pairs(vec![Rule::new("x", "y")]);
        import_csv(&mut state, "find,replace,mode\n\"a\",\"b\",\"default\",TRUE\n").unwrap();

        let mode = &state.modes[DEFAULT_MODE];
        assert!(!mode.match_case);
        assert_eq!(mode.pairs.len(), 2);
    }

    #[test]
    fn test_split_fields() {
        assert_eq!(
            split_fields(r#""a ""q""",b,"",TRUE"#),
            Some(vec!["a \"q\"".into(), "b".into(), "".into(), "TRUE".into()])
        );
        assert_eq!(split_fields(r#""unterminated"#), None);
        assert_eq!(split_fields(r#""a"x,b"#), None);
        assert_eq!(split_fields("a,"), Some(vec!["a".into(), "".into()]));
    }

    #[test]
    fn test_keyword_export_and_import() {
        let mut state = AppState::new();
        state.keywords.add("Anna, Bob");
        assert_eq!(export_keywords(&state), "Anna\nBob");

        let added = import_keywords(&mut state, "\u{FEFF}Bob\nCara\n\n  Dan  \n");
        assert_eq!(added, 2);
        assert_eq!(state.keywords.keywords, vec!["Anna", "Bob", "Cara", "Dan"]);
    }
}
