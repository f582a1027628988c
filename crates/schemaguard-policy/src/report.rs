use std::fmt;

use crate::hint::Hint;

/// One failed rule instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyViolation {
    /// Stable identifier of the failed check (e.g. `table_fk_name`).
    pub code: String,
    /// Display identifier of the owning entity.
    pub target: String,
    /// Human-readable description.
    pub message: String,
}

impl PolicyViolation {
    pub fn new(
        code: impl Into<String>,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            target: target.into(),
            message: message.into(),
        }
    }

    /// Violation for an attribute that does not satisfy the expected hint.
    pub(crate) fn mismatch(
        code: &str,
        property: &str,
        expected: &Hint,
        actual: Option<&str>,
        target: String,
    ) -> Self {
        let message = format!(
            "The {property} should be {expected} but {}: {target}",
            actual.unwrap_or("null")
        );
        Self::new(code, target, message)
    }
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Ordered sequence of violations found during a check run.
///
/// Violations are never deduplicated; order follows evaluation order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PolicyReport {
    pub violations: Vec<PolicyViolation>,
}

impl PolicyReport {
    /// Returns true when no violation was found.
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn extend(&mut self, violations: impl IntoIterator<Item = PolicyViolation>) {
        self.violations.extend(violations);
    }

    /// Append another report, keeping both orders.
    pub fn merge(&mut self, other: PolicyReport) {
        self.violations.extend(other.violations);
    }

    pub fn messages(&self) -> Vec<&str> {
        self.violations
            .iter()
            .map(|violation| violation.message.as_str())
            .collect()
    }
}
