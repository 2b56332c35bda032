//! Preflight check types and report.

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Usable as is.
    Pass,
    /// `modules`/`firmware` will abort.
    Fail,
    /// Works, but output may be incomplete or slow.
    Warn,
}

impl CheckStatus {
    fn label(self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Warn => "WARN",
        }
    }
}

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub details: String,
}

impl CheckResult {
    fn with_status(name: &str, status: CheckStatus, details: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            details: details.into(),
        }
    }

    pub fn pass(name: &str, details: impl Into<String>) -> Self {
        Self::with_status(name, CheckStatus::Pass, details)
    }

    pub fn fail(name: &str, details: impl Into<String>) -> Self {
        Self::with_status(name, CheckStatus::Fail, details)
    }

    pub fn warn(name: &str, details: impl Into<String>) -> Self {
        Self::with_status(name, CheckStatus::Warn, details)
    }
}

/// Results of all preflight checks.
pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    /// Returns true if nothing failed.
    pub fn all_passed(&self) -> bool {
        self.fail_count() == 0
    }

    pub fn fail_count(&self) -> usize {
        self.count(CheckStatus::Fail)
    }

    pub fn warn_count(&self) -> usize {
        self.count(CheckStatus::Warn)
    }

    fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }

    /// Print the report to stdout.
    pub fn print(&self) {
        println!("=== Preflight Check Results ===\n");
        for check in &self.checks {
            println!("  [{}] {}: {}", check.status.label(), check.name, check.details);
        }

        println!();
        println!(
            "Summary: {}/{} passed",
            self.count(CheckStatus::Pass),
            self.checks.len()
        );
        if self.fail_count() > 0 {
            println!("         {} FAILED", self.fail_count());
        }
        if self.warn_count() > 0 {
            println!("         {} warnings", self.warn_count());
        }
    }
}
