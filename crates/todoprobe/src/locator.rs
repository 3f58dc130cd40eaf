//! Selectors for locating elements.

use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Single CSS class name (e.g., "todo-list")
    ClassName(String),
    /// Tag name (e.g., "li")
    Tag(String),
    /// CSS selector (e.g., "li.completed")
    Css(String),
}

impl Selector {
    /// Create a class name selector
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self::ClassName(name.into())
    }

    /// Create a tag name selector
    #[must_use]
    pub fn tag(name: impl Into<String>) -> Self {
        Self::Tag(name.into())
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Check an element described by its tag and class list against this
    /// selector.
    ///
    /// CSS support is limited to compound selectors of the form
    /// `tag.class1.class2` (tag optional); anything else never matches.
    #[must_use]
    pub fn matches(&self, tag: &str, classes: &[&str]) -> bool {
        match self {
            Self::ClassName(name) => classes.contains(&name.as_str()),
            Self::Tag(name) => tag.eq_ignore_ascii_case(name),
            Self::Css(css) => Self::matches_compound(css, tag, classes),
        }
    }

    fn matches_compound(css: &str, tag: &str, classes: &[&str]) -> bool {
        let css = css.trim();
        if css.is_empty() || css.contains(|c: char| c.is_whitespace() || "#[]>+~:*,".contains(c)) {
            return false;
        }
        let mut parts = css.split('.');
        let tag_part = parts.next().unwrap_or_default();
        if !tag_part.is_empty() && !tag.eq_ignore_ascii_case(tag_part) {
            return false;
        }
        parts.all(|class| !class.is_empty() && classes.contains(&class))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClassName(name) => write!(f, ".{name}"),
            Self::Tag(name) => write!(f, "{name}"),
            Self::Css(css) => write!(f, "{css}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Selector::class("todo-list").to_string(), ".todo-list");
        assert_eq!(Selector::tag("li").to_string(), "li");
        assert_eq!(Selector::css("li.completed").to_string(), "li.completed");
    }

    #[test]
    fn test_class_matches() {
        let sel = Selector::class("completed");
        assert!(sel.matches("li", &["completed", "editing"]));
        assert!(!sel.matches("li", &["editing"]));
    }

    #[test]
    fn test_tag_matches_case_insensitive() {
        assert!(Selector::tag("LI").matches("li", &[]));
        assert!(!Selector::tag("ul").matches("li", &[]));
    }

    #[test]
    fn test_compound_css() {
        let sel = Selector::css("li.completed");
        assert!(sel.matches("li", &["completed"]));
        assert!(!sel.matches("div", &["completed"]));
        assert!(Selector::css(".view").matches("div", &["view"]));
        assert!(Selector::css("button.destroy").matches("button", &["destroy"]));
    }

    #[test]
    fn test_unsupported_css_never_matches() {
        assert!(!Selector::css(".todo-count strong").matches("strong", &[]));
        assert!(!Selector::css("#app").matches("div", &[]));
        assert!(!Selector::css("").matches("div", &[]));
    }
}
