//! Application layer for quickfiler.
//!
//! - [nav]: the navigation state machine (root, action, selected targets).
//! - [session]: the driver tying navigation, workers, prompts and the rows together.
//! - [search_state]: request ids, cancellation and debounce for listing requests.
//! - [prompt]: name and confirmation prompts.
//! - [keymap] and [handlers]: key bindings and key press dispatch.
//! - [editor] and [store]: the editor host and persisted state collaborators.

pub mod editor;
pub mod handlers;
pub mod keymap;
pub mod nav;
pub mod prompt;
pub mod search_state;
pub mod session;
pub mod store;

pub use editor::{EditorHost, TerminalEditor};
pub use handlers::KeypressResult;
pub use keymap::{Keymap, PickerAction};
pub use nav::{Action, Effect, Event, NavState, PromptRequest};
pub use session::{Session, SessionOptions};
pub use store::{MemoryStore, StateStore, TomlStore};
