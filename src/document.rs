//! The editable text surface the operator pastes job lists into.
//!
//! The pipeline only ever talks to the narrow [`Document`] trait; a GUI
//! would implement it over its text widget. [`TextBuffer`] is the
//! in-memory implementation used by the CLI and the tests.

use std::collections::BTreeSet;

/// Line-addressed view of a live text buffer. Indices are 0-based.
pub trait Document {
    fn line_count(&self) -> usize;

    fn line(&self, index: usize) -> Option<String>;

    /// Replace the whole text of one line (terminator excluded).
    fn replace_line(&mut self, index: usize, text: &str);

    /// Whether the line currently carries the "error" highlight tag.
    fn is_tagged(&self, index: usize) -> bool;

    fn set_tagged(&mut self, index: usize, tagged: bool);

    /// Scroll the line into view. Surfaces without a viewport ignore it.
    fn reveal_line(&mut self, _index: usize) {}

    /// Drop all text and tags.
    fn clear_all(&mut self);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
    tagged: BTreeSet<usize>,
    revealed: Option<usize>,
}

impl TextBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: crate::parser::split_lines(text),
            ..Self::default()
        }
    }

    /// Buffer contents joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn tagged_lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.tagged.iter().copied()
    }

    /// Last line handed to `reveal_line`.
    pub fn revealed(&self) -> Option<usize> {
        self.revealed
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Document for TextBuffer {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, index: usize) -> Option<String> {
        self.lines.get(index).cloned()
    }

    fn replace_line(&mut self, index: usize, text: &str) {
        if let Some(line) = self.lines.get_mut(index) {
            text.clone_into(line);
        }
    }

    fn is_tagged(&self, index: usize) -> bool {
        self.tagged.contains(&index)
    }

    fn set_tagged(&mut self, index: usize, tagged: bool) {
        if index >= self.lines.len() {
            return;
        }
        if tagged {
            self.tagged.insert(index);
        } else {
            self.tagged.remove(&index);
        }
    }

    fn reveal_line(&mut self, index: usize) {
        self.revealed = Some(index);
    }

    fn clear_all(&mut self) {
        self.lines.clear();
        self.tagged.clear();
        self.revealed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_text_and_tags() {
        let mut buf = TextBuffer::from_text("a\nb\r\nc");
        assert_eq!(buf.line_count(), 3);
        assert_eq!(buf.line(1).as_deref(), Some("b"));

        buf.replace_line(1, "bee");
        buf.set_tagged(1, true);
        buf.set_tagged(7, true); // out of range, ignored

        assert_eq!(buf.text(), "a\nbee\nc");
        assert_eq!(buf.tagged_lines().collect::<Vec<_>>(), vec![1]);

        buf.clear_all();
        assert!(buf.is_empty());
        assert_eq!(buf.tagged_lines().count(), 0);
    }
}
