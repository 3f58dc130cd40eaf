//! Driver: abstract browser automation boundary.
//!
//! Everything the suite does to the application under test goes through
//! [`Driver`]. Two implementations exist:
//!
//! - `WebDriverBackend` (feature `webdriver`): chromedriver / geckodriver
//!   over the W3C WebDriver protocol
//! - [`FakeTodoApp`](crate::fake::FakeTodoApp): an in-memory TodoMVC page
//!   used by the test suite
//!
//! Lookups on this trait never wait. The implicit wait lives one level up,
//! in [`Session`](crate::session::Session).

use crate::locator::Selector;
use crate::result::ProbeResult;
use async_trait::async_trait;
use std::fmt;

/// Special keys sent to an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Commit the current input
    Enter,
    /// Delete the character before the caret
    Backspace,
    /// Abandon the current edit
    Escape,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Enter => "Enter",
            Self::Backspace => "Backspace",
            Self::Escape => "Escape",
        };
        f.write_str(name)
    }
}

/// Browser automation commands used by the suite
#[async_trait]
pub trait Driver: Send + Sync {
    /// Handle to an element of the current page
    type Element: Clone + fmt::Debug + Send + Sync;

    /// Navigate to URL
    async fn navigate(&mut self, url: &str) -> ProbeResult<()>;

    /// Reload the current page
    async fn refresh(&mut self) -> ProbeResult<()>;

    /// Title of the current page
    async fn title(&self) -> ProbeResult<String>;

    /// URL of the current page
    async fn current_url(&self) -> ProbeResult<String>;

    /// All elements matching `selector`, in document order, searched below
    /// `scope` or in the whole document
    async fn find_all(
        &self,
        scope: Option<&Self::Element>,
        selector: &Selector,
    ) -> ProbeResult<Vec<Self::Element>>;

    /// Rendered text of an element
    async fn text(&self, element: &Self::Element) -> ProbeResult<String>;

    /// Attribute value of an element
    async fn attribute(&self, element: &Self::Element, name: &str) -> ProbeResult<Option<String>>;

    /// Type text into an element
    async fn send_keys(&mut self, element: &Self::Element, text: &str) -> ProbeResult<()>;

    /// Press a special key on an element
    async fn press_key(&mut self, element: &Self::Element, key: Key) -> ProbeResult<()>;

    /// Click an element the way a user would
    async fn click(&mut self, element: &Self::Element) -> ProbeResult<()>;

    /// Double-click an element through an action sequence
    async fn double_click(&mut self, element: &Self::Element) -> ProbeResult<()>;

    /// Invoke the element's click handler from injected script, bypassing
    /// visibility and hover preconditions
    async fn script_click(&mut self, element: &Self::Element) -> ProbeResult<()>;

    /// Clear the page's `localStorage`
    async fn clear_local_storage(&mut self) -> ProbeResult<()>;

    /// Close the page and shut the browser down
    async fn quit(&mut self) -> ProbeResult<()>;

    /// Check whether an element carries a CSS class
    async fn has_class(&self, element: &Self::Element, class: &str) -> ProbeResult<bool> {
        let classes = self.attribute(element, "class").await?.unwrap_or_default();
        Ok(classes.split_whitespace().any(|c| c == class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        assert_eq!(Key::Enter.to_string(), "Enter");
        assert_eq!(Key::Backspace.to_string(), "Backspace");
        assert_eq!(Key::Escape.to_string(), "Escape");
    }
}
