//! Typed element queries rendered into Playwright locator expressions

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::E2eResult;
use crate::script::js_string;

/// A regular expression matched against text, accessible names or attributes.
///
/// The source must stay within the syntax shared by Rust's `regex` crate and
/// JavaScript's `RegExp` (no lookaround, no backreferences) so that the same
/// pattern can be checked offline and shipped to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPattern {
    pub source: String,
    #[serde(default = "default_case_insensitive")]
    pub case_insensitive: bool,
}

fn default_case_insensitive() -> bool {
    true
}

impl TextPattern {
    /// Case-insensitive pattern from raw regex source
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            case_insensitive: true,
        }
    }

    pub fn case_sensitive(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            case_insensitive: false,
        }
    }

    /// Pattern matching `text` anywhere, with metacharacters escaped
    pub fn literal(text: &str) -> Self {
        Self::new(regex::escape(text))
    }

    /// Pattern matching exactly `text`
    pub fn exact(text: &str) -> Self {
        Self::new(format!("^{}$", regex::escape(text)))
    }

    pub fn to_regex(&self) -> E2eResult<Regex> {
        Ok(RegexBuilder::new(&self.source)
            .case_insensitive(self.case_insensitive)
            .build()?)
    }

    pub fn is_match(&self, text: &str) -> E2eResult<bool> {
        Ok(self.to_regex()?.is_match(text))
    }

    /// JavaScript `RegExp` construction for this pattern
    pub fn to_js(&self) -> String {
        let flags = if self.case_insensitive { "i" } else { "" };
        format!("new RegExp({}, {})", js_string(&self.source), js_string(flags))
    }
}

impl fmt::Display for TextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)?;
        if self.case_insensitive {
            write!(f, "i")?;
        }
        Ok(())
    }
}

/// ARIA roles the suite queries by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AriaRole {
    Banner,
    Button,
    Complementary,
    Contentinfo,
    Heading,
    Img,
    Link,
    Main,
    Navigation,
}

impl AriaRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AriaRole::Banner => "banner",
            AriaRole::Button => "button",
            AriaRole::Complementary => "complementary",
            AriaRole::Contentinfo => "contentinfo",
            AriaRole::Heading => "heading",
            AriaRole::Img => "img",
            AriaRole::Link => "link",
            AriaRole::Main => "main",
            AriaRole::Navigation => "navigation",
        }
    }
}

/// How to find an element on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Locator {
    /// CSS (or Playwright selector engine) query
    Css { selector: String },

    /// Accessibility-tree query by role and optional accessible name
    Role {
        role: AriaRole,
        #[serde(default)]
        name: Option<TextPattern>,
    },

    /// Element whose `alt` text equals `text`
    AltText { text: String },

    /// Element whose text content matches
    Text { pattern: TextPattern },

    /// First match of the inner locator
    First { of: Box<Locator> },
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css { selector: selector.into() }
    }

    pub fn role(role: AriaRole) -> Self {
        Locator::Role { role, name: None }
    }

    pub fn role_named(role: AriaRole, name: TextPattern) -> Self {
        Locator::Role { role, name: Some(name) }
    }

    pub fn alt_text(text: impl Into<String>) -> Self {
        Locator::AltText { text: text.into() }
    }

    pub fn text(pattern: TextPattern) -> Self {
        Locator::Text { pattern }
    }

    pub fn first(self) -> Self {
        match self {
            first @ Locator::First { .. } => first,
            other => Locator::First { of: Box::new(other) },
        }
    }

    /// Accessible-name pattern this locator filters on, if any
    pub fn name_pattern(&self) -> Option<&TextPattern> {
        match self {
            Locator::Role { name, .. } => name.as_ref(),
            Locator::First { of } => of.name_pattern(),
            _ => None,
        }
    }

    /// Playwright expression evaluating to a `Locator` rooted at `page`
    pub fn to_js(&self) -> String {
        match self {
            Locator::Css { selector } => format!("page.locator({})", js_string(selector)),
            Locator::Role { role, name: None } => {
                format!("page.getByRole({})", js_string(role.as_str()))
            }
            Locator::Role { role, name: Some(name) } => format!(
                "page.getByRole({}, {{ name: {} }})",
                js_string(role.as_str()),
                name.to_js()
            ),
            Locator::AltText { text } => format!("page.getByAltText({})", js_string(text)),
            Locator::Text { pattern } => format!("page.getByText({})", pattern.to_js()),
            Locator::First { of } => format!("{}.first()", of.to_js()),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css { selector } => write!(f, "{}", selector),
            Locator::Role { role, name: None } => write!(f, "role={}", role.as_str()),
            Locator::Role { role, name: Some(name) } => {
                write!(f, "role={}[name={}]", role.as_str(), name)
            }
            Locator::AltText { text } => write!(f, "alt={:?}", text),
            Locator::Text { pattern } => write!(f, "text={}", pattern),
            Locator::First { of } => write!(f, "{} >> first", of),
        }
    }
}
