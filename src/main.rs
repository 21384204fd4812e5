//! main.rs
//! Entry point for quickfiler

use quickfiler::app::{Keymap, Session, SessionOptions, TerminalEditor, TomlStore};
use quickfiler::config::Config;
use quickfiler::core::oracle::IgnoreOracle;
use quickfiler::core::terminal;
use quickfiler::core::{GitignoreOracle, LocalFs, ResultCache, Resolver, Workspace};
use quickfiler::utils::cli::{CliAction, handle_args};
use quickfiler::utils::resolve_path;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = crossterm::execute!(
            stdout,
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show
        );

        log::error!("Panic: {}", info);
        eprintln!("\n[quickfiler] Error occurred: {}", info);

        #[cfg(debug_assertions)]
        {
            let bt = std::backtrace::Backtrace::force_capture();
            eprintln!("\nStack Backtrace:\n{}", bt);
        }
    }));

    init_logging()?;

    let (path, here) = match handle_args() {
        CliAction::Exit => return Ok(()),
        CliAction::RunApp { path, here } => (path, here),
    };

    let config = Config::load();

    let folder = match path {
        Some(arg) => resolve_path(&arg),
        None => std::env::current_dir(),
    };
    let folder = match folder {
        Ok(folder) if folder.is_dir() => folder,
        Ok(folder) => {
            eprintln!(
                "\n[quickfiler] Error: '{}' is not a directory.",
                folder.display()
            );
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("\n[quickfiler] Error: {}", e);
            std::process::exit(1);
        }
    };

    let active = match here.as_deref().map(resolve_path).transpose() {
        Ok(active) => active.filter(|p| p.is_file()),
        Err(e) => {
            log::warn!("Ignoring --here: {}", e);
            None
        }
    };
    let start = active
        .as_ref()
        .and_then(|p| p.parent())
        .map(PathBuf::from);

    let workspace = Arc::new(Workspace::single(folder));
    let general = config.general();

    let oracle = general
        .exclude_gitignore()
        .then(|| GitignoreOracle::from_workspace(&workspace))
        .filter(|oracle| !oracle.is_empty())
        .map(|oracle| Arc::new(oracle) as Arc<dyn IgnoreOracle>);
    let resolver = Resolver::new(Arc::new(LocalFs), Arc::clone(&workspace))
        .with_oracle(oracle)
        .with_exclude(general.exclude().map(str::to_string))
        .with_max_results(general.max_results());
    let cache = ResultCache::new(config.cache().ttl(), config.cache().capacity());

    let options = SessionOptions {
        query_options: general.query_options(),
        debounce: general.debounce(),
        use_trash: general.move_to_trash(),
    };
    let editor = TerminalEditor::new(config.editor().clone(), active);
    let store = TomlStore::open(&workspace);

    let mut session = Session::new(
        Arc::new(resolver),
        Arc::new(cache),
        Box::new(editor),
        Box::new(store),
        options,
        start,
    );
    let keymap = Keymap::from_keys(config.keys());

    terminal::run_terminal(&mut session, &keymap)
}

/// Logs to the file named by `QF_LOG` when it is set. `QF_LOG_LEVEL` picks the level.
fn init_logging() -> io::Result<()> {
    let Ok(log_file) = std::env::var("QF_LOG") else {
        return Ok(());
    };
    let level = std::env::var("QF_LOG_LEVEL")
        .ok()
        .and_then(|l| l.parse().ok())
        .unwrap_or(log::LevelFilter::Debug);

    env_logger::Builder::new()
        .target(env_logger::Target::Pipe(Box::new(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_file)?,
        )))
        .filter_level(level)
        .init();

    log::info!("quickfiler {} starting up", env!("CARGO_PKG_VERSION"));
    Ok(())
}
