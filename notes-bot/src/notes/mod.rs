//! Note-files and the rules around them

mod error;
mod file;
mod store;
pub mod validate;

pub use error::NoteError;
pub use file::NoteFile;
pub use store::NoteStore;
