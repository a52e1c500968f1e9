use anyhow::{bail, Context, Result};
use markpen::buffer::{decode_bytes, read_text_file, write_text_file, EncodingConfig};
use markpen::store::{ConfigStore, JsonFileStore, MemoryStore};
use markpen::{utils, Editor, Selection};
use std::io::{self, Read, Write};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP: &str = "\
markpen - keyword highlighting and rule-based replacement for plain text

USAGE:
  markpen [OPTIONS] [FILE]

  Reads FILE (or stdin), applies the active mode and keyword list and prints
  the annotated HTML.

OPTIONS:
  Document:
    --replace               Run Replace-All with the active mode
    --mode <NAME>           Switch the active mode before replacing
    --keywords <LIST>       Add keywords (separated by , ; or newlines)
    --plain                 Print plain text instead of HTML
    --chapters              List chapter headings instead of rendering
    -o, --output <PATH>     Write the result to PATH
    --encoding <LABEL>      Encoding for files without BOM (e.g. big5, windows-1252)

  Rules and keywords:
    --export-csv <PATH>       Export every mode's rules as CSV
    --import-csv <PATH>       Import rules from CSV
    --export-keywords <PATH>  Export the keyword list, one per line
    --import-keywords <PATH>  Import a keyword list

  General:
    --config <PATH>         State file (default: <config dir>/markpen/state.json)
    --debug                 Enable debug logging
    -h, --help              Print help
    -V, --version           Print version

CSV FORMAT:
  find,replace,mode,case_sensitive,whole_word,auto_caps
  \"find\",\"replace\",\"mode\",TRUE,FALSE,FALSE
";

struct Args {
    file: Option<PathBuf>,
    replace: bool,
    mode: Option<String>,
    keywords: Option<String>,
    plain: bool,
    chapters: bool,
    output: Option<PathBuf>,
    encoding: Option<String>,
    export_csv: Option<PathBuf>,
    import_csv: Option<PathBuf>,
    export_keywords: Option<PathBuf>,
    import_keywords: Option<PathBuf>,
    config: Option<PathBuf>,
    debug: bool,
}

impl Args {
    fn parse(mut pargs: pico_args::Arguments) -> Result<Self> {
        let args = Self {
            replace: pargs.contains("--replace"),
            mode: pargs.opt_value_from_str("--mode")?,
            keywords: pargs.opt_value_from_str("--keywords")?,
            plain: pargs.contains("--plain"),
            chapters: pargs.contains("--chapters"),
            output: pargs.opt_value_from_os_str(["-o", "--output"], parse_path)?,
            encoding: pargs.opt_value_from_str("--encoding")?,
            export_csv: pargs.opt_value_from_os_str("--export-csv", parse_path)?,
            import_csv: pargs.opt_value_from_os_str("--import-csv", parse_path)?,
            export_keywords: pargs.opt_value_from_os_str("--export-keywords", parse_path)?,
            import_keywords: pargs.opt_value_from_os_str("--import-keywords", parse_path)?,
            config: pargs.opt_value_from_os_str("--config", parse_path)?,
            debug: pargs.contains("--debug"),
            file: pargs.opt_free_from_os_str(parse_path)?,
        };

        let rest = pargs.finish();
        if !rest.is_empty() {
            bail!("Unexpected arguments: {:?}", rest);
        }
        Ok(args)
    }

    /// 是否需要讀取文件（只做匯出匯入時不需要）
    fn wants_document(&self) -> bool {
        let exchange_only = self.export_csv.is_some()
            || self.import_csv.is_some()
            || self.export_keywords.is_some()
            || self.import_keywords.is_some();
        self.file.is_some() || self.replace || self.chapters || !exchange_only
    }
}

fn parse_path(s: &std::ffi::OsStr) -> Result<PathBuf, &'static str> {
    Ok(s.into())
}

fn main() -> Result<()> {
    let mut pargs = pico_args::Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{}", HELP);
        return Ok(());
    }
    if pargs.contains(["-V", "--version"]) {
        println!("markpen {}", VERSION);
        return Ok(());
    }

    let args = Args::parse(pargs)?;

    // 初始化日誌
    utils::init_logger(args.debug);

    let encoding = match &args.encoding {
        Some(label) => EncodingConfig::from_label(label)
            .with_context(|| format!("Unknown encoding: {}", label))?,
        None => EncodingConfig::utf8(),
    };

    let mut editor = Editor::new(open_store(args.config.clone()));

    if let Some(path) = &args.import_csv {
        let text = read_text_file(path, &encoding)?;
        let notice = editor.import_csv(&text);
        if notice.is_error() {
            bail!("{}: {}", path.display(), notice.message);
        }
        eprintln!("{}", notice);
    }
    if let Some(path) = &args.import_keywords {
        let text = read_text_file(path, &encoding)?;
        eprintln!("{}", editor.import_keywords(&text));
    }
    if let Some(raw) = &args.keywords {
        let notice = editor.add_keywords(raw);
        log::debug!("{}", notice);
    }
    if let Some(name) = &args.mode {
        let notice = editor.set_active_mode(name);
        if notice.is_error() {
            bail!("{}", notice.message);
        }
    }

    if let Some(path) = &args.export_csv {
        write_text_file(path, &editor.export_csv(), &EncodingConfig::utf8())?;
        eprintln!("✓ Exported rules to {}", path.display());
    }
    if let Some(path) = &args.export_keywords {
        write_text_file(path, &editor.export_keywords(), &encoding)?;
        eprintln!("✓ Exported keywords to {}", path.display());
    }

    if !args.wants_document() {
        return Ok(());
    }

    let text = match &args.file {
        Some(path) => read_text_file(path, &encoding)?,
        None => {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .context("Failed to read stdin")?;
            decode_bytes(&bytes, encoding.read_encoding).0
        }
    };

    if let Some(notice) = editor.edit(text, Selection::default()) {
        eprintln!("{}", notice);
    }
    if args.replace {
        eprintln!("{}", editor.replace_all());
    }

    let output = if args.chapters {
        let mut out = String::new();
        for (i, chapter) in editor.chapters()?.iter().enumerate() {
            let heading = chapter.heading.as_deref().unwrap_or("(preamble)");
            out.push_str(&format!("{}\t{}\t{}\n", i + 1, chapter.start, heading));
        }
        out
    } else if args.plain {
        editor.document().text().to_string()
    } else {
        editor.document().html().to_string()
    };

    match &args.output {
        Some(path) => write_text_file(path, &output, &encoding)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(output.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

fn open_store(path: Option<PathBuf>) -> Box<dyn ConfigStore> {
    match path.or_else(JsonFileStore::default_path) {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => {
            log::warn!("No config directory available, settings will not be saved");
            Box::new(MemoryStore::new())
        }
    }
}
