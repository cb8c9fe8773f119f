//! Note text.

use serde::{Deserialize, Serialize};

/// The plain text of a note, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteContent(String);

impl NoteContent {
    /// Wrap some text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The raw text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when there is nothing worth exporting (empty or only whitespace).
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Number of characters, as shown in the editor footer.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    /// Append a sticker at the end of the text.
    pub fn push_sticker(&mut self, sticker: &str) {
        self.0.push_str(sticker);
    }
}

impl From<&str> for NoteContent {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for NoteContent {
    fn from(text: String) -> Self {
        Self(text)
    }
}
