//! Assertions for scenario validation.
//!
//! Each helper yields an [`AssertionResult`]; [`AssertionResult::check`]
//! turns a failure into [`ProbeError::AssertionFailed`] so scenarios can use
//! `?` and stop at the first broken expectation.

use crate::result::{ProbeError, ProbeResult};
use std::fmt::Debug;

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Prefix the failure message with what was being checked
    #[must_use]
    pub fn context(mut self, what: &str) -> Self {
        if !self.passed {
            self.message = format!("{what}: {}", self.message);
        }
        self
    }

    /// Convert into a result, failing with `AssertionFailed`
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` carrying the message if the assertion failed.
    pub fn check(self) -> ProbeResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(ProbeError::assertion(self.message))
        }
    }
}

/// Assertion helpers for scenarios
#[derive(Debug)]
pub struct Assertion;

impl Assertion {
    /// Assert two values are equal
    #[must_use]
    pub fn equals<T: PartialEq + Debug + ?Sized>(expected: &T, actual: &T) -> AssertionResult {
        if expected == actual {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected {expected:?}, got {actual:?}"))
        }
    }

    /// Assert a condition is true
    #[must_use]
    pub fn is_true(condition: bool, message: &str) -> AssertionResult {
        if condition {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(message)
        }
    }

    /// Assert a condition is false
    #[must_use]
    pub fn is_false(condition: bool, message: &str) -> AssertionResult {
        if condition {
            AssertionResult::fail(message)
        } else {
            AssertionResult::pass()
        }
    }

    /// Assert a collection has expected length
    #[must_use]
    pub fn has_length<T>(collection: &[T], expected: usize) -> AssertionResult {
        if collection.len() == expected {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!(
                "expected length {expected}, got {}",
                collection.len()
            ))
        }
    }

    /// Assert a lookup failed because the element never appeared
    #[must_use]
    pub fn is_not_found<T: Debug>(result: &ProbeResult<T>) -> AssertionResult {
        match result {
            Err(err) if err.is_not_found() => AssertionResult::pass(),
            Err(err) => AssertionResult::fail(format!("expected element not found, got error: {err}")),
            Ok(value) => AssertionResult::fail(format!("expected element not found, got {value:?}")),
        }
    }
}
