//! Line-oriented access to the free-text reports tools write to stdout.
//!
//! Reports are log-like text, not structured data. A [`Report`] splits the
//! output once and answers "which lines start with this label" without
//! modelling the rest of the tool's grammar.

use regex::Regex;
use std::sync::OnceLock;

/// Width and height as printed by an info tool, e.g. `50 x 50`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} x {}", self.width, self.height)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Report {
    lines: Vec<String>,
}

impl Report {
    #[must_use]
    pub fn parse(stdout: &str) -> Self {
        Self {
            lines: stdout.lines().map(str::to_string).collect(),
        }
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Every line that begins with `label`, in output order.
    ///
    /// Leading whitespace is significant: `"  preview"` only matches indented lines.
    pub fn lines_with_prefix<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.lines
            .iter()
            .map(String::as_str)
            .filter(move |line| line.starts_with(label))
    }

    /// Text following `label` on the first line that starts with it.
    #[must_use]
    pub fn field(&self, label: &str) -> Option<&str> {
        self.lines
            .iter()
            .find(|line| line.starts_with(label))
            .and_then(|line| line.get(label.len()..))
    }

    /// First `<width> x <height>` pair on the first line starting with `label`.
    #[must_use]
    pub fn dimensions(&self, label: &str) -> Option<Dimensions> {
        let value = self.field(label)?;
        let captures = dimensions_pattern()?.captures(value)?;
        Some(Dimensions {
            width: captures.get(1)?.as_str().parse().ok()?,
            height: captures.get(2)?.as_str().parse().ok()?,
        })
    }
}

fn dimensions_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(\d+)\s*x\s*(\d+)").ok())
        .as_ref()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    const INFO_OUTPUT: &str = concat!(
        "File /tmp/out.exr:\n",
        "  version 2: flags 0x0\n",
        "  preview 50 x 50\n",
        "  dataWindow (0 0) - (799 799)\n",
    );

    #[test]
    fn lines_with_prefix_respects_indentation() {
        let report = Report::parse(INFO_OUTPUT);
        assert_eq!(report.lines_with_prefix("  preview").count(), 1);
        assert_eq!(report.lines_with_prefix("preview").count(), 0);
    }

    #[test]
    fn field_returns_text_after_label() {
        let report = Report::parse(INFO_OUTPUT);
        assert_eq!(report.field("  preview"), Some(" 50 x 50"));
        assert_eq!(report.field("  missing"), None);
    }

    #[test]
    fn field_outlives_the_label_it_was_found_by() {
        let report = Report::parse(INFO_OUTPUT);
        let found = {
            let label = String::from("  version");
            report.field(&label)
        };
        assert_eq!(found, Some(" 2: flags 0x0"));
    }

    #[test]
    fn dimensions_are_extracted_from_labeled_line() {
        let report = Report::parse(INFO_OUTPUT);
        assert_eq!(
            report.dimensions("  preview"),
            Some(Dimensions {
                width: 50,
                height: 50
            })
        );
    }

    #[test]
    fn dimensions_absent_when_line_has_none() {
        let report = Report::parse("  preview none\n");
        assert_eq!(report.dimensions("  preview"), None);
    }

    #[test]
    fn crlf_output_is_split_into_lines() {
        let report = Report::parse("a\r\n  preview 8 x 4\r\n");
        assert_eq!(report.lines().len(), 2);
        assert_eq!(
            report.dimensions("  preview").map(|d| d.to_string()),
            Some("8 x 4".to_string())
        );
    }
}
