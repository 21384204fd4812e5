//! Command-line argument parsing and help for quickfiler.
//!
//! When invoked with no args/flags (qf), the picker opens on the current directory.

use crate::config::Config;

#[derive(Debug, PartialEq, Eq)]
pub enum CliAction {
    /// Run the picker. `path` is the workspace folder, `here` an active file whose directory
    /// the session starts in.
    RunApp {
        path: Option<String>,
        here: Option<String>,
    },
    Exit,
}

pub fn handle_args() -> CliAction {
    parse_args(std::env::args().skip(1))
}

pub fn parse_args<I>(args: I) -> CliAction
where
    I: IntoIterator<Item = String>,
{
    let mut path = None;
    let mut here = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-v" => {
                print_version();
                return CliAction::Exit;
            }
            "-h" | "--help" => {
                print_help();
                return CliAction::Exit;
            }
            "--config-help" => {
                print_config_help();
                return CliAction::Exit;
            }
            "--init" => {
                if let Err(e) = Config::generate_default(&Config::default_path()) {
                    eprintln!("Error: {}", e);
                }
                return CliAction::Exit;
            }
            "--here" => match args.next() {
                Some(file) if !file.trim().is_empty() => here = Some(file),
                _ => {
                    eprintln!("Error: --here expects a file path");
                    return CliAction::Exit;
                }
            },
            arg if !arg.starts_with('-') && !arg.trim().is_empty() => {
                if path.is_some() {
                    eprintln!("Error: quickfiler accepts only one PATH.");
                    eprintln!("Usage: qf [PATH] [--here FILE]");
                    return CliAction::Exit;
                }
                path = Some(arg.to_string());
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                eprintln!("Try --help for available options");
                return CliAction::Exit;
            }
        }
    }
    CliAction::RunApp { path, here }
}

fn print_version() {
    println!("quickfiler {}", env!("CARGO_PKG_VERSION"));
}

fn print_help() {
    println!(
        r#"quickfiler - A keyboard-focused fuzzy file navigator

USAGE:
  qf [PATH] [--here FILE]

PATH:
  Workspace folder to open (defaults to current directory)

OPTIONS:
      --here FILE         Start in the directory of FILE and list it under OPEN EDITORS
      --init              Generate a default configuration
      --config-help       Display all the configuration options
  -h, --help              Print help information
  -v, --version           Display the current installed version of quickfiler

ENVIRONMENT:
  QF_CONFIG               Override the default config path
  QF_LOG                  Write logs to this file
  QF_LOG_LEVEL            Log level (error, warn, info, debug, trace) [default: debug]
"#
    );
}

fn print_config_help() {
    let help_text = r##"
quickfiler - Configuration Guide (qf.toml)

=========================
 General Settings
=========================
[general]
  exclude_gitignore          Hide entries matched by each folder's .gitignore [default: true]
  exclude                    Glob of paths never searched [default: "**/.git"]
  case_sensitive             Match queries case-sensitively [default: false]
  move_to_trash              Delete moves to the trash bin [default: true]
  max_results                Results per search (default: 10000, min: 100, max: 1_000_000)
  debounce_ms                Quiet time after typing before searching [default: 300]

=========================
 Cache
=========================
[cache]
  ttl_secs                   Seconds a listing stays cached [default: 600]
  capacity                   Number of cached listings [default: 1000]

=========================
 Editor
=========================
[editor]
  cmd                        Command to open files (e.g., "nvim", "vim")
  diff_args                  Arguments to compare two files [default: ["-d"]]
  split_args                 Arguments to open a file beside another [default: ["-O"]]

=========================
 Key Bindings
=========================
[keys]
  accept                     ["Enter"]
  descend                    ["Tab"]     (enter a directory even while selecting a target)
  up                         ["Up", "Ctrl+p"]
  down                       ["Down", "Ctrl+n"]
  page_up                    ["PageUp"]
  page_down                  ["PageDown"]
  toggle_case                ["Alt+c"]
  quit                       ["Esc", "Ctrl+c"]

  Syntax Reference:
    Modifiers: <c-x> (Ctrl), <m-x>/<a-x> (Alt/Meta), <s-x> (Shift)
    Standard:  ctrl+x, alt+x, shift+x, meta+x
    Special:   "enter", "esc", "tab", "pageup", "pagedown"
"##;

    println!("{}", help_text);
}
