pub mod stats;
pub mod store;
pub mod types;

pub use store::NoteStore;
pub use types::{parse_note_id, NewNote, Note, Sentiment};
