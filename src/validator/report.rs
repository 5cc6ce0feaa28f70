use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CheckStatus {
    /// Nothing to report
    Ok,
    /// Suspicious cells; the balance still runs
    Warning(String),
    /// Cells the balance cannot use
    Failed(String),
}

impl CheckStatus {
    fn severity(&self) -> Severity {
        match self {
            CheckStatus::Ok => Severity::Ok,
            CheckStatus::Warning(_) => Severity::Warning,
            CheckStatus::Failed(_) => Severity::Failed,
        }
    }

    fn message(&self) -> Option<&str> {
        match self {
            CheckStatus::Ok => None,
            CheckStatus::Warning(msg) | CheckStatus::Failed(msg) => Some(msg),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Severity {
    Failed,
    Warning,
    Ok,
}

impl Severity {
    fn tag(self) -> &'static str {
        match self {
            Severity::Failed => "FAIL",
            Severity::Warning => "WARN",
            Severity::Ok => " ok ",
        }
    }
}

/// One named check and the cells it flagged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationCheck {
    /// Check name
    pub name: String,
    /// Outcome
    pub status: CheckStatus,
    /// Columns the offending cells are in
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    /// Offending rows, already shifted to sheet rows
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<usize>,
}

impl ValidationCheck {
    fn with_status(name: impl Into<String>, status: CheckStatus) -> Self {
        Self {
            name: name.into(),
            status,
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub(crate) fn ok(name: impl Into<String>) -> Self {
        Self::with_status(name, CheckStatus::Ok)
    }

    pub(crate) fn warning(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(name, CheckStatus::Warning(message.into()))
    }

    pub(crate) fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(name, CheckStatus::Failed(message.into()))
    }

    /// Attach the offending cells
    pub(crate) fn at(mut self, columns: &[&str], rows: Vec<usize>) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self.rows = rows;
        self
    }

    fn severity(&self) -> Severity {
        self.status.severity()
    }
}

/// Number of checks per outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckTally {
    /// Checks with nothing to report
    pub passed: usize,
    /// Checks that raised a warning
    pub warned: usize,
    /// Checks that failed
    pub failed: usize,
}

/// Every check run over one sample table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Check results in the order they ran
    pub checks: Vec<ValidationCheck>,
    /// File or sheet that was validated
    pub source: String,
}

impl ValidationReport {
    /// Empty report for `source`
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            checks: Vec::new(),
            source: source.into(),
        }
    }

    /// Record one check
    pub fn add_check(&mut self, check: ValidationCheck) {
        self.checks.push(check);
    }

    /// Record several checks
    pub fn extend(&mut self, checks: impl IntoIterator<Item = ValidationCheck>) {
        self.checks.extend(checks);
    }

    /// Whether any check failed
    pub fn has_failures(&self) -> bool {
        self.checks.iter().any(|c| c.severity() == Severity::Failed)
    }

    /// Whether any check warned
    pub fn has_warnings(&self) -> bool {
        self.checks.iter().any(|c| c.severity() == Severity::Warning)
    }

    /// Count checks per outcome
    pub fn tally(&self) -> CheckTally {
        self.checks.iter().fold(CheckTally::default(), |mut t, c| {
            match c.severity() {
                Severity::Ok => t.passed += 1,
                Severity::Warning => t.warned += 1,
                Severity::Failed => t.failed += 1,
            }
            t
        })
    }

    /// Offending sheet rows per column over every non-passing check,
    /// sorted and deduplicated, for cell highlighting
    pub fn invalid_rows(&self) -> BTreeMap<String, Vec<usize>> {
        self.rows_by_column(|s| s != Severity::Ok)
    }

    /// Like [`invalid_rows`](Self::invalid_rows), restricted to warnings
    pub fn warning_rows(&self) -> BTreeMap<String, Vec<usize>> {
        self.rows_by_column(|s| s == Severity::Warning)
    }

    fn rows_by_column(&self, keep: impl Fn(Severity) -> bool) -> BTreeMap<String, Vec<usize>> {
        let mut map: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for check in self.checks.iter().filter(|c| keep(c.severity())) {
            for column in &check.columns {
                map.entry(column.clone()).or_default().extend(&check.rows);
            }
        }
        for rows in map.values_mut() {
            rows.sort_unstable();
            rows.dedup();
        }
        map.retain(|_, rows| !rows.is_empty());
        map
    }

    /// Render with terminal colors when the `colorized_output` feature is on
    pub fn format_colored(&self) -> String {
        self.render(cfg!(feature = "colorized_output"))
    }

    /// Failures first, then warnings, then passes; the cell listing groups
    /// failed and warned rows by column.
    fn render(&self, colored: bool) -> String {
        let tally = self.tally();
        let mut out = String::new();

        let verdict = if tally.failed > 0 {
            paint("input rejected", Severity::Failed, colored)
        } else if tally.warned > 0 {
            paint("input usable, with warnings", Severity::Warning, colored)
        } else {
            paint("input clean", Severity::Ok, colored)
        };
        out.push_str(&format!("Input check of {}: {}\n", self.source, verdict));
        out.push_str(&format!(
            "{} passed, {} warned, {} failed\n\n",
            tally.passed, tally.warned, tally.failed
        ));

        let mut ordered: Vec<&ValidationCheck> = self.checks.iter().collect();
        ordered.sort_by_key(|c| c.severity());
        for check in ordered {
            let severity = check.severity();
            out.push_str(&format!("[{}] {}", paint(severity.tag(), severity, colored), check.name));
            if let Some(msg) = check.status.message() {
                out.push_str(&format!(": {}", msg));
            }
            out.push('\n');
        }

        let failed = self.rows_by_column(|s| s == Severity::Failed);
        let warned = self.warning_rows();
        if !failed.is_empty() || !warned.is_empty() {
            out.push_str("\nCells to highlight:\n");
            for (rows, severity) in [(&failed, Severity::Failed), (&warned, Severity::Warning)] {
                for (column, rows) in rows {
                    let list: Vec<String> = rows.iter().map(usize::to_string).collect();
                    out.push_str(&format!(
                        "  {} {}: rows {}\n",
                        paint(severity.tag(), severity, colored),
                        column,
                        list.join(", ")
                    ));
                }
            }
        }

        out
    }
}

#[cfg(feature = "colorized_output")]
fn paint(text: &str, severity: Severity, colored: bool) -> String {
    if !colored {
        return text.to_string();
    }
    let styled = console::style(text).bold();
    match severity {
        Severity::Failed => styled.red().to_string(),
        Severity::Warning => styled.yellow().to_string(),
        Severity::Ok => styled.green().to_string(),
    }
}

#[cfg(not(feature = "colorized_output"))]
fn paint(text: &str, _severity: Severity, _colored: bool) -> String {
    text.to_string()
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}
