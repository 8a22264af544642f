//! The signed-in user's notes.
//!
//! `NotesStore` keeps the list the dashboard shows and mirrors each
//! create/update/delete into it once the backend confirms.

pub mod store;

pub use store::{NotesError, NotesState, NotesStore};
