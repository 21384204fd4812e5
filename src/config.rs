//! Configuration for quickfiler.
//!
//! - [load]: the [Config] struct, `qf.toml` lookup and default file generation.
//! - [general]: search, delete and cache settings.
//! - [input]: key bindings and the editor command.

pub mod general;
pub mod input;
pub mod load;

pub use general::{Cache, General, InternalGeneral};
pub use input::{Editor, Keys};
pub use load::{Config, RawConfig};
