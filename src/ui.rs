//! Terminal UI for quickfiler.
//!
//! - [render]: the frame layout and the `render` entry point.
//! - [widgets]: the header, query line, prompt, rows and status line.

pub mod render;
pub mod widgets;

pub use render::{page_size, render};
