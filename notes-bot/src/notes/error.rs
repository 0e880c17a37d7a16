use crate::storage::StorageError;
use std::fmt;

/// Why a command could not complete. Every variant is reported back to the
/// user; none of them end the process.
#[derive(Debug, Clone)]
pub enum NoteError {
    /// Missing, insufficient or surplus arguments
    UserInput(String),
    /// Bad URL, bad entry name, reserved or unsafe name
    Validation(String),
    /// The entry or file already exists
    Conflict(String),
    /// The note-file does not exist
    NotFound(String),
    /// Reading, writing, listing or parsing a note-file failed
    Storage(StorageError),
}

impl NoteError {
    pub fn user_input(message: impl Into<String>) -> Self {
        NoteError::UserInput(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        NoteError::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        NoteError::Conflict(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        NoteError::NotFound(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            NoteError::UserInput(_) => "user_input",
            NoteError::Validation(_) => "validation",
            NoteError::Conflict(_) => "conflict",
            NoteError::NotFound(_) => "not_found",
            NoteError::Storage(_) => "storage",
        }
    }
}

impl fmt::Display for NoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteError::UserInput(m)
            | NoteError::Validation(m)
            | NoteError::Conflict(m)
            | NoteError::NotFound(m) => write!(f, "{}", m),
            NoteError::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for NoteError {}

impl From<StorageError> for NoteError {
    fn from(e: StorageError) -> Self {
        NoteError::Storage(e)
    }
}
