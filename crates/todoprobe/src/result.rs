//! Result and error types for todoprobe.

use thiserror::Error;

/// Result type for todoprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving the application under test
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Browser name is not one of the supported browsers
    #[error("Unsupported browser '{name}': tests are implemented for chrome and firefox")]
    UnsupportedBrowser {
        /// Name that was requested
        name: String,
    },

    /// Browser or driver service could not be started
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// An expected element did not appear within the implicit wait
    #[error("Element '{selector}' not found within {timeout_ms}ms")]
    ElementNotFound {
        /// Selector that was looked up
        selector: String,
        /// Implicit wait that elapsed
        timeout_ms: u64,
    },

    /// Element handle no longer attached to the page
    #[error("Stale element: {message}")]
    StaleElement {
        /// Error message
        message: String,
    },

    /// Element is present but cannot receive a direct user action
    #[error("Element not interactable: {message}")]
    NotInteractable {
        /// Error message
        message: String,
    },

    /// Click or keystroke failed
    #[error("Action '{action}' failed: {message}")]
    ActionFailed {
        /// Action that was dispatched
        action: String,
        /// Error message
        message: String,
    },

    /// Injected script failed
    #[error("Script execution failed: {message}")]
    ScriptError {
        /// Error message
        message: String,
    },

    /// Page content could not be interpreted
    #[error("Unexpected content: {message}")]
    UnexpectedContent {
        /// Error message
        message: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Session already released
    #[error("Session is closed")]
    SessionClosed,

    /// Fixture error (setup/teardown failed)
    #[error("Fixture error: {message}")]
    FixtureError {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProbeError {
    /// Create an action failure for a named action
    #[must_use]
    pub fn action(action: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::ActionFailed {
            action: action.into(),
            message: message.to_string(),
        }
    }

    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Whether this error is a lookup timeout
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_browser_message_names_browser() {
        let err = ProbeError::UnsupportedBrowser {
            name: "safari".to_string(),
        };
        assert!(err.to_string().contains("safari"));
    }

    #[test]
    fn test_not_found_detection() {
        let err = ProbeError::ElementNotFound {
            selector: ".todo-list".to_string(),
            timeout_ms: 3000,
        };
        assert!(err.is_not_found());
        assert!(err.to_string().contains("3000ms"));
        assert!(!ProbeError::SessionClosed.is_not_found());
    }

    #[test]
    fn test_action_helper() {
        let err = ProbeError::action("click", "boom");
        assert_eq!(err.to_string(), "Action 'click' failed: boom");
    }
}
