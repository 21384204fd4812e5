//! Input configuration options for quickfiler
//!
//! This module defines the key and editor options which are read from the qf.toml
//! configuration file.

use serde::Deserialize;

/// Input configuration options of all picker actions
#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Keys {
    accept: Vec<String>,
    descend: Vec<String>,
    up: Vec<String>,
    down: Vec<String>,
    page_up: Vec<String>,
    page_down: Vec<String>,
    toggle_case: Vec<String>,
    quit: Vec<String>,
}

/// Editor configuration options
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Editor {
    cmd: String,
    diff_args: Vec<String>,
    split_args: Vec<String>,
}

macro_rules! accessor {
    ($($name:ident),+ $(,)?) => {
        impl Keys {
            $(
                #[inline]
                pub fn $name(&self) -> &[String] {
                    &self.$name
                }
            )+
        }
    };
}

accessor!(
    accept,
    descend,
    up,
    down,
    page_up,
    page_down,
    toggle_case,
    quit,
);

/// Default input configuration options
impl Default for Keys {
    fn default() -> Self {
        Keys {
            accept: vec!["Enter".into()],
            descend: vec!["Tab".into()],
            up: vec!["Up".into(), "Ctrl+p".into()],
            down: vec!["Down".into(), "Ctrl+n".into()],
            page_up: vec!["PageUp".into()],
            page_down: vec!["PageDown".into()],
            toggle_case: vec!["Alt+c".into()],
            quit: vec!["Esc".into(), "Ctrl+c".into()],
        }
    }
}

/// Public methods for accessing editor configuration options
impl Editor {
    #[inline]
    pub fn cmd(&self) -> &str {
        let trimmed = self.cmd.trim();
        if trimmed.is_empty() { "vim" } else { trimmed }
    }

    #[inline]
    pub fn diff_args(&self) -> &[String] {
        &self.diff_args
    }

    /// Arguments placed before two files to show them side by side.
    #[inline]
    pub fn split_args(&self) -> &[String] {
        &self.split_args
    }

    pub fn exists(&self) -> bool {
        which::which(self.cmd()).is_ok()
    }
}

/// Default editor configuration options
impl Default for Editor {
    fn default() -> Self {
        Editor {
            cmd: "nvim".into(),
            diff_args: vec!["-d".into()],
            split_args: vec!["-O".into()],
        }
    }
}
