//! Selectors and strict element resolution.
//!
//! Locators are strict by default: an action on a selector that matches
//! more than one element fails with `AmbiguousSelector` instead of picking
//! one. Text selectors match the deepest elements whose rendered or raw text
//! contains the needle, so `Text("DASHBOARD")` finds the heading rather than
//! `<body>`.

use crate::driver::ElementHandle;
use serde::{Deserialize, Serialize};

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector (e.g., `input[name="username"]`)
    Css(String),
    /// Text content selector
    Text(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// JavaScript expression evaluating to the array of matching elements
    #[must_use]
    pub fn to_query_all(&self) -> String {
        match self {
            Self::Css(css) => format!(
                "Array.from(document.querySelectorAll({}))",
                js_string(css)
            ),
            Self::Text(text) => {
                let needle = js_string(text);
                format!(
                    "(() => {{ \
                       const has = (el) => (el.textContent || '').includes({needle}) \
                         || (el.innerText || '').includes({needle}); \
                       return Array.from(document.querySelectorAll('body, body *')) \
                         .filter((el) => has(el) && !Array.from(el.children).some(has)); \
                     }})()"
                )
            }
        }
    }

    /// Script describing every match as `{index, tag_name, text, visible}`
    #[must_use]
    pub fn describe_script(&self) -> String {
        format!(
            "{query}.map((el, index) => {{ \
               const rect = el.getBoundingClientRect(); \
               const style = window.getComputedStyle(el); \
               const visible = rect.width > 0 && rect.height > 0 \
                 && style.visibility !== 'hidden' && style.display !== 'none' \
                 && parseFloat(style.opacity || '1') > 0; \
               return {{ index, tag_name: el.tagName.toLowerCase(), \
                 text: (el.innerText || el.textContent || '').trim().slice(0, 200), visible }}; \
             }})",
            query = self.to_query_all()
        )
    }

    /// Script replacing the value of the `index`-th match.
    ///
    /// Uses the native value setter so framework-controlled inputs observe
    /// the change, then fires `input` and `change`.
    #[must_use]
    pub fn fill_script(&self, index: usize, value: &str) -> String {
        format!(
            "(() => {{ \
               const el = {query}[{index}]; \
               if (!el) return false; \
               el.focus(); \
               const proto = el instanceof HTMLTextAreaElement \
                 ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
               const setter = Object.getOwnPropertyDescriptor(proto, 'value'); \
               if (setter && setter.set) {{ setter.set.call(el, {value}); }} else {{ el.value = {value}; }} \
               el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
               el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
               return true; \
             }})()",
            query = self.to_query_all(),
            value = js_string(value)
        )
    }

    /// Script dispatching a synthetic click on the `index`-th match
    #[must_use]
    pub fn click_script(&self, index: usize) -> String {
        format!(
            "(() => {{ \
               const el = {query}[{index}]; \
               if (!el) return false; \
               el.scrollIntoView({{ block: 'center' }}); \
               el.click(); \
               return true; \
             }})()",
            query = self.to_query_all()
        )
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Css(css) => write!(f, "{css}"),
            Self::Text(text) => write!(f, "text={text:?}"),
        }
    }
}

/// Quote a string as a JavaScript literal
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Outcome of resolving a locator against the current matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly the element to act on
    Found(ElementHandle),
    /// Nothing matched
    Missing,
    /// Strict locator matched this many elements
    Ambiguous(usize),
}

/// A selector plus its resolution strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
    strict: bool,
}

impl Locator {
    /// Create a strict locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a strict locator from a selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            strict: true,
        }
    }

    /// Disable strict mode (act on the first visible match)
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Whether exactly one match is required
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    /// Pick the element to act on from the current matches
    #[must_use]
    pub fn resolve(&self, mut matches: Vec<ElementHandle>) -> Resolution {
        match matches.len() {
            0 => Resolution::Missing,
            1 => Resolution::Found(matches.remove(0)),
            n if self.strict => Resolution::Ambiguous(n),
            _ => {
                let pick = matches.iter().position(|e| e.visible).unwrap_or(0);
                Resolution::Found(matches.swap_remove(pick))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn handle(index: usize) -> ElementHandle {
        ElementHandle::new(index, "input").with_visible(true)
    }

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_query_quotes_attribute_selector() {
            let query = Selector::css(r#"input[name="username"]"#).to_query_all();
            assert_eq!(
                query,
                r#"Array.from(document.querySelectorAll("input[name=\"username\"]"))"#
            );
        }

        #[test]
        fn test_text_query_contains_needle_once_escaped() {
            let query = Selector::text("APPLIKASI BIZ").to_query_all();
            assert!(query.contains(r#""APPLIKASI BIZ""#));
            assert!(query.contains("el.children"));
        }

        #[test]
        fn test_fill_script_escapes_value() {
            let script = Selector::css("input").fill_script(0, "it's \"quoted\"");
            assert!(script.contains(r#""it's \"quoted\"""#));
            assert!(script.contains("[0]"));
            assert!(script.contains("'input'"));
        }

        #[test]
        fn test_click_script_targets_index() {
            let script = Selector::css("button").click_script(2);
            assert!(script.contains("[2]"));
            assert!(script.contains("el.click()"));
        }

        #[test]
        fn test_describe_script_reports_visibility() {
            let script = Selector::text("DASHBOARD").describe_script();
            assert!(script.contains("visible"));
            assert!(script.contains("tag_name"));
        }

        #[test]
        fn test_display() {
            assert_eq!(Selector::css("#login").to_string(), "#login");
            assert_eq!(Selector::text("Hi").to_string(), "text=\"Hi\"");
        }
    }

    mod resolution_tests {
        use super::*;

        #[test]
        fn test_missing() {
            let locator = Locator::new("input");
            assert_eq!(locator.resolve(vec![]), Resolution::Missing);
        }

        #[test]
        fn test_unique() {
            let locator = Locator::new("input");
            assert_eq!(locator.resolve(vec![handle(0)]), Resolution::Found(handle(0)));
        }

        #[test]
        fn test_strict_rejects_multiple() {
            let locator = Locator::new("input");
            assert!(locator.is_strict());
            assert_eq!(
                locator.resolve(vec![handle(0), handle(1)]),
                Resolution::Ambiguous(2)
            );
        }

        #[test]
        fn test_non_strict_takes_first() {
            let locator = Locator::new("input").with_strict(false);
            assert_eq!(
                locator.resolve(vec![handle(0), handle(1), handle(2)]),
                Resolution::Found(handle(0))
            );
        }

        #[test]
        fn test_non_strict_prefers_visible() {
            let locator = Locator::new("input").with_strict(false);
            let hidden = ElementHandle::new(0, "input");
            assert_eq!(
                locator.resolve(vec![hidden, handle(1)]),
                Resolution::Found(handle(1))
            );
        }
    }
}
