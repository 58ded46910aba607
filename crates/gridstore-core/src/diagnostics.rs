//! Issue collection for ingestion runs.
//!
//! Importers skip rows they cannot place (a branch whose bus is unknown, a
//! solar unit of an unsupported kind) and keep going. Each skip is recorded
//! here so the caller can report it after the run.
//!
//! # Example
//!
//! ```
//! use gridstore_core::diagnostics::{DiagnosticIssue, Diagnostics, Severity};
//!
//! let mut diag = Diagnostics::new();
//! diag.add_warning_with_entity("reference", "bus not found, branch skipped", "A1");
//! diag.add(DiagnosticIssue::new(Severity::Error, "parse", "bad period value"));
//!
//! assert_eq!(diag.warning_count(), 1);
//! assert_eq!(diag.error_count(), 1);
//! assert_eq!(diag.issues[0].severity, Severity::Warning);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Severity level for diagnostic issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Row skipped or value defaulted, ingestion continued
    Warning,
    /// Something could not be written
    Error,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A single issue raised while ingesting a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Grouping label such as `reference`, `parse` or `unsupported`
    pub category: String,
    pub message: String,
    /// Source row (1-based, header excluded) when the issue came from a table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Business key of the record involved, e.g. a GEN UID or bus id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            row: None,
            entity: None,
        }
    }

    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}] {}", self.severity.label(), self.category, self.message)?;
        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }
        if let Some(row) = self.row {
            write!(f, " at row {}", row)?;
        }
        Ok(())
    }
}

/// Issues collected over one ingestion run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: DiagnosticIssue) {
        self.issues.push(issue);
    }

    pub fn add_warning(&mut self, category: &str, message: &str) {
        self.add(DiagnosticIssue::new(Severity::Warning, category, message));
    }

    pub fn add_warning_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.add(DiagnosticIssue::new(Severity::Warning, category, message).with_entity(entity));
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn issues_by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a DiagnosticIssue> {
        self.issues.iter().filter(move |i| i.category == category)
    }

    /// One-line summary, e.g. `2 warnings, 1 error`.
    pub fn summary(&self) -> String {
        fn plural(n: usize, word: &str) -> String {
            format!("{} {}{}", n, word, if n == 1 { "" } else { "s" })
        }

        match (self.warning_count(), self.error_count()) {
            (0, 0) => "No issues".to_string(),
            (w, 0) => plural(w, "warning"),
            (0, e) => plural(e, "error"),
            (w, e) => format!("{}, {}", plural(w, "warning"), plural(e, "error")),
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Diagnostics: {}", self.summary())?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}

/// Rows written per ingestion phase, in the order the phases ran.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PhaseCounts {
    order: Vec<String>,
    counts: BTreeMap<String, usize>,
}

impl PhaseCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `n` rows to `phase`, registering the phase on first use.
    pub fn record(&mut self, phase: &str, n: usize) {
        if !self.counts.contains_key(phase) {
            self.order.push(phase.to_string());
        }
        *self.counts.entry(phase.to_string()).or_insert(0) += n;
    }

    pub fn get(&self, phase: &str) -> usize {
        self.counts.get(phase).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.order
            .iter()
            .map(move |p| (p.as_str(), self.counts.get(p).copied().unwrap_or(0)))
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}
