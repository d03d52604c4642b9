use std::fmt;

use serde::Serialize;

/// Console text of one operation, plus what it touched.
///
/// Per-resource problems land here as failure lines instead of aborting the
/// batch; the CLI prints the report and the web service returns it as the
/// response message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    lines: Vec<String>,
    apis: Vec<String>,
    failures: usize,
    skipped: bool,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// An operation that did nothing because required configuration is missing.
    pub fn skipped(message: impl Into<String>) -> Self {
        Self {
            lines: vec![message.into()],
            skipped: true,
            ..Self::default()
        }
    }

    pub fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Record an API that was handled successfully.
    pub fn api(&mut self, name: impl Into<String>) {
        self.apis.push(name.into());
    }

    /// Record a per-resource failure; the batch carries on.
    pub fn failure(&mut self, line: impl Into<String>) {
        self.failures += 1;
        self.lines.push(format!("  >> {}", line.into()));
    }

    /// Append another report, e.g. the onramp after an offramp.
    pub fn merge(&mut self, other: Report) {
        self.lines.extend(other.lines);
        self.apis.extend(other.apis);
        self.failures += other.failures;
        self.skipped |= other.skipped;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn apis(&self) -> &[String] {
        &self.apis
    }

    pub fn into_apis(self) -> Vec<String> {
        self.apis
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn was_skipped(&self) -> bool {
        self.skipped
    }

    /// Ran with the configuration it needed and nothing failed.
    pub fn is_success(&self) -> bool {
        !self.skipped && self.failures == 0
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_report_is_not_success() {
        let report = Report::skipped("No project given, cannot export Apigee APIs.");
        assert!(report.was_skipped());
        assert!(!report.is_success());
        assert_eq!(report.to_string(), "No project given, cannot export Apigee APIs.");
    }

    #[test]
    fn test_failures_are_counted_and_marked() {
        let mut report = Report::new();
        report.line("Importing orders...");
        report.api("orders");
        report.failure("Error creating deployment orders: 500");

        assert_eq!(report.failures(), 1);
        assert!(!report.is_success());
        assert_eq!(
            report.to_string(),
            "Importing orders...\n  >> Error creating deployment orders: 500"
        );
    }

    #[test]
    fn test_merge_keeps_order() {
        let mut first = Report::new();
        first.line("a");
        first.api("x");
        let mut second = Report::new();
        second.line("b");
        second.api("y");

        first.merge(second);
        assert_eq!(first.lines(), ["a", "b"]);
        assert_eq!(first.apis(), ["x", "y"]);
        assert!(first.is_success());
    }
}
