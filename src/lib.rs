//! Internal library crate for quickfiler.
//!
//! The shipped application is the `qf` binary (`src/main.rs`).
//!
//! This library exists to share code between targets (binary, tests) and to keep modules organized.
//! This API is only used to build the `qf` binary and is not considered a library for external use.

pub mod app;
pub mod config;
pub mod core;
pub mod error;
pub mod ui;
pub mod utils;
