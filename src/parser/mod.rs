//! Line validator for pasted job lists.
//!
//! Every job reference line has the shape
//!
//! ```text
//! DD_D_DDD<ws>PPPP
//! ```
//!
//! anchored at the first byte of the line, where `DD` is the machine code
//! and `PPPP` the program id. The program id must be exactly four digits:
//! the character right after it may not be a letter or another digit.
//! Anything may follow that boundary (operators paste whole report rows).

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{ProgramEntry, ValidationOutcome};

static JOB_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<machine>[0-9]{2})_[0-9]_[0-9]{3}\s+(?P<program>[0-9]{4})")
        .expect("job line pattern is valid")
});

/// Classify one line of input. Pure, no side effects.
///
/// A line containing nothing but whitespace is `Blank`. Leading whitespace
/// followed by anything else is `Malformed`.
pub fn classify(line: &str) -> ValidationOutcome {
    if line.trim().is_empty() {
        return ValidationOutcome::Blank;
    }

    match match_job(line) {
        Some(caps) => ValidationOutcome::Valid(ProgramEntry {
            machine_code: caps.name("machine").map_or("", |m| m.as_str()).to_string(),
            program_id: caps.name("program").map_or("", |m| m.as_str()).to_string(),
        }),
        None => ValidationOutcome::Malformed,
    }
}

/// The part of a valid line that the format actually describes, i.e.
/// everything up to and including the fourth program-id digit.
///
/// Returns `None` for lines that do not match.
pub fn canonical_text(line: &str) -> Option<&str> {
    match_job(line).and_then(|caps| caps.get(0)).map(|m| m.as_str())
}

/// Split pasted text into lines, accepting both `\n` and `\r\n`.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

fn match_job(line: &str) -> Option<regex::Captures<'_>> {
    let caps = JOB_LINE.captures(line)?;
    let end = caps.get(0)?.end();

    // four digits exactly, nothing alphanumeric glued on
    match line[end..].chars().next() {
        Some(c) if c.is_alphanumeric() => None,
        _ => Some(caps),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(machine: &str, program: &str) -> ValidationOutcome {
        ValidationOutcome::Valid(ProgramEntry {
            machine_code: machine.into(),
            program_id: program.into(),
        })
    }

    #[test]
    fn test_valid_lines() {
        let test_cases = vec![
            ("12_3_456  7890", entry("12", "7890")),
            ("34_1_002\t0001", entry("34", "0001")),
            ("07_0_000 1234", entry("07", "1234")),
            ("12_3_456  7890 <-- Incorrect Format", entry("12", "7890")),
            ("12_3_456  7890;qty 4", entry("12", "7890")),
            ("12_3_456 \t \t7890", entry("12", "7890")),
        ];

        for (line, expected) in test_cases {
            assert_eq!(classify(line), expected, "line {line:?}");
        }
    }

    #[test]
    fn test_blank_lines() {
        for line in ["", " ", "\t", "   \t  "] {
            assert_eq!(classify(line), ValidationOutcome::Blank, "line {line:?}");
        }
    }

    #[test]
    fn test_malformed_lines() {
        let test_cases = [
            "badline",
            "12_3_456 789",     // three-digit id
            "12_3_456  78901",  // five-digit id
            "12_3_456  7890A",  // letter glued on
            "12_3_4567 7890",   // no whitespace before id
            "1_3_456  7890",    // one-digit machine
            "12-3-456  7890",   // wrong separators
            "12_3_456",         // id missing
            "x12_3_456  7890",  // not anchored at column 0
            " 12_3_456  7890",  // leading whitespace before a valid job
        ];

        for line in test_cases {
            assert_eq!(classify(line), ValidationOutcome::Malformed, "line {line:?}");
        }
    }

    /// Leading whitespace followed by garbage is flagged, never dropped as
    /// blank, so bad rows cannot disappear silently.
    #[test]
    fn test_whitespace_then_content_is_malformed() {
        assert_eq!(classify("  xx"), ValidationOutcome::Malformed);
        assert_eq!(classify("\t0001"), ValidationOutcome::Malformed);
    }

    #[test]
    fn test_canonical_text_strips_trailing_content() {
        assert_eq!(
            canonical_text("12_3_456  7890 <-- Incorrect Format"),
            Some("12_3_456  7890")
        );
        assert_eq!(canonical_text("12_3_456  7890"), Some("12_3_456  7890"));
        assert_eq!(canonical_text("badline"), None);
        assert_eq!(canonical_text("12_3_456  78901"), None);
    }

    #[test]
    fn test_split_lines_handles_crlf() {
        assert_eq!(
            split_lines("12_3_456  7890\r\n\r\n34_1_002  0001"),
            vec!["12_3_456  7890", "", "34_1_002  0001"]
        );
    }
}
