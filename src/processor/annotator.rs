//! Keeps the inline "Incorrect Format" marker in sync with line validity.

use crate::document::Document;
use crate::model::ValidationOutcome;
use crate::parser;

/// Suffix appended to a malformed line.
pub const MARKER: &str = " <-- Incorrect Format";

/// Mark a malformed line: append [`MARKER`] once, tag the line and bring it
/// into view. Calling it again on a marked line changes nothing.
pub fn annotate(doc: &mut dyn Document, index: usize) {
    let Some(text) = doc.line(index) else {
        return;
    };
    // a bare line terminator has nothing to mark
    if text.is_empty() {
        return;
    }

    if !text.contains(MARKER) {
        doc.replace_line(index, &format!("{text}{MARKER}"));
    }
    if !doc.is_tagged(index) {
        doc.set_tagged(index, true);
    }
    doc.reveal_line(index);
}

/// Remove the marker from a line that is no longer malformed.
///
/// Untagged lines are never touched. A tagged valid line is rewritten to
/// its canonical text, which drops the marker and any stray trailing text.
pub fn clear(doc: &mut dyn Document, index: usize) {
    if !doc.is_tagged(index) {
        return;
    }
    let Some(text) = doc.line(index) else {
        return;
    };

    match parser::classify(&text) {
        ValidationOutcome::Malformed => return,
        ValidationOutcome::Valid(_) => {
            if let Some(canonical) = parser::canonical_text(&text) {
                if canonical != text {
                    doc.replace_line(index, canonical);
                }
            }
        }
        ValidationOutcome::Blank => {}
    }
    doc.set_tagged(index, false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextBuffer;

    #[test]
    fn annotate_is_idempotent() {
        let mut buf = TextBuffer::from_text("12_3_456  7890\nbadline");

        annotate(&mut buf, 1);
        let once = buf.clone();
        annotate(&mut buf, 1);

        assert_eq!(buf, once);
        assert_eq!(buf.line(1).as_deref(), Some("badline <-- Incorrect Format"));
        assert_eq!(buf.text().matches(MARKER).count(), 1);
        assert!(buf.is_tagged(1));
        assert_eq!(buf.revealed(), Some(1));
    }

    #[test]
    fn annotate_skips_empty_line() {
        let mut buf = TextBuffer::from_text("\nbadline");
        annotate(&mut buf, 0);
        assert_eq!(buf.line(0).as_deref(), Some(""));
        assert!(!buf.is_tagged(0));
    }

    #[test]
    fn clear_leaves_untagged_lines_alone() {
        let mut buf = TextBuffer::from_text("12_3_456  7890 trailing notes");
        clear(&mut buf, 0);
        assert_eq!(buf.line(0).as_deref(), Some("12_3_456  7890 trailing notes"));
    }

    #[test]
    fn clear_restores_canonical_text_once_fixed() {
        let mut buf = TextBuffer::from_text("12_3_456  789");
        annotate(&mut buf, 0);
        assert_eq!(buf.line(0).as_deref(), Some("12_3_456  789 <-- Incorrect Format"));

        // operator fixes the id in place, marker still trailing
        buf.replace_line(0, "12_3_456  7890 <-- Incorrect Format");
        clear(&mut buf, 0);

        assert_eq!(buf.line(0).as_deref(), Some("12_3_456  7890"));
        assert!(!buf.is_tagged(0));
    }

    #[test]
    fn clear_keeps_marker_on_still_malformed_line() {
        let mut buf = TextBuffer::from_text("badline");
        annotate(&mut buf, 0);
        clear(&mut buf, 0);
        assert!(buf.is_tagged(0));
        assert_eq!(buf.line(0).as_deref(), Some("badline <-- Incorrect Format"));
    }

    #[test]
    fn clear_untags_blanked_line() {
        let mut buf = TextBuffer::from_text("badline");
        annotate(&mut buf, 0);
        buf.replace_line(0, "   ");
        clear(&mut buf, 0);
        assert!(!buf.is_tagged(0));
        assert_eq!(buf.line(0).as_deref(), Some("   "));
    }
}
