//! IMAP command tag generator.

use crate::types::Tag;

/// Generates sequential command tags: `A0000`, `A0001`, ...
#[derive(Debug, Clone)]
pub struct TagGenerator {
    counter: u32,
    prefix: char,
}

impl TagGenerator {
    /// Creates a generator with the given prefix.
    #[must_use]
    pub const fn new(prefix: char) -> Self {
        Self { counter: 0, prefix }
    }

    /// Returns the next tag.
    pub fn next_tag(&mut self) -> Tag {
        let n = self.counter;
        self.counter = self.counter.wrapping_add(1);
        Tag(format!("{}{n:04}", self.prefix))
    }

    /// Number of tags handed out so far.
    #[must_use]
    pub const fn issued(&self) -> u32 {
        self.counter
    }
}

impl Default for TagGenerator {
    fn default() -> Self {
        Self::new('A')
    }
}
