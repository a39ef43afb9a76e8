//! Editor text buffer
//!
//! Growable byte handle holding an owner's editable script text.

use std::borrow::Cow;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    bytes: Vec<u8>,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &[u8] {
        &self.bytes
    }

    /// Replace the contents, reusing the existing allocation.
    pub fn set_text(&mut self, text: &[u8]) {
        self.bytes.clear();
        self.bytes.extend_from_slice(text);
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Buffer contents as source text, without trailing NUL terminators.
    pub fn to_source(&self) -> Cow<'_, str> {
        let end = self
            .bytes
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |last| last + 1);
        String::from_utf8_lossy(&self.bytes[..end])
    }
}
