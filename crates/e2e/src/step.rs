//! Step vocabulary a scenario is built from

use serde::{Deserialize, Serialize};

use crate::locator::{Locator, TextPattern};

/// A single step of a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Navigate to a path relative to the base URL
    Goto {
        #[serde(default = "default_path")]
        path: String,
    },

    /// Wait for a page lifecycle state
    WaitForLoad {
        #[serde(default)]
        state: LoadState,
        #[serde(default = "default_long_timeout")]
        timeout_ms: u64,
    },

    /// Wait for an element to reach a state
    WaitFor {
        locator: Locator,
        #[serde(default)]
        state: WaitState,
        #[serde(default = "default_long_timeout")]
        timeout_ms: u64,
    },

    /// Try each candidate in order until one becomes visible.
    /// When `required` is false, exhausting the candidates is not an error.
    WaitForAny {
        candidates: Vec<WaitCandidate>,
        #[serde(default)]
        required: bool,
    },

    /// Wait until every `<img>` fired load or error, each capped at `per_image_timeout_ms`
    WaitForImages {
        #[serde(default = "default_image_timeout")]
        per_image_timeout_ms: u64,
    },

    Click {
        locator: Locator,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Click a control whose accessible name alternates between two labels
    /// and wait until it shows the label it did not show before
    ClickToggle {
        locator: Locator,
        labels: [String; 2],
    },

    /// Click the first match if any element matches
    ClickIfPresent {
        locator: Locator,
    },

    /// Press a key on the page keyboard
    Press {
        key: String,
    },

    /// Fixed delay (use sparingly)
    Sleep {
        ms: u64,
    },

    ExpectTitle {
        pattern: TextPattern,
    },

    ExpectVisible {
        locator: Locator,
    },

    ExpectEnabled {
        locator: Locator,
    },

    ExpectDisabled {
        locator: Locator,
    },

    /// Text content of the element contains `contains`
    ExpectText {
        locator: Locator,
        contains: String,
    },

    /// Text content of the element matches `pattern`
    ExpectTextMatches {
        locator: Locator,
        pattern: TextPattern,
    },

    /// Attribute exists and matches `pattern`
    ExpectAttribute {
        locator: Locator,
        name: String,
        pattern: TextPattern,
    },

    ExpectCount {
        locator: Locator,
        count: usize,
    },

    ExpectMinCount {
        locator: Locator,
        min: usize,
    },

    /// Every match (or the first `limit`) has a non-empty `aria-label` or text content
    ExpectAccessibleNames {
        locator: Locator,
        #[serde(default)]
        limit: Option<usize>,
    },

    /// Every match (or the first `limit`) carries `attribute`, possibly empty
    ExpectAttributePresent {
        locator: Locator,
        attribute: String,
        #[serde(default)]
        limit: Option<usize>,
    },

    /// Some element has focus and is visible
    ExpectFocusVisible,

    /// No console message of type `error` so far, except those containing an allowed fragment
    ExpectNoConsoleErrors {
        #[serde(default)]
        allow: Vec<String>,
    },

    StartTimer {
        label: String,
    },

    /// Milliseconds since `StartTimer { label }` are strictly below `max_ms`
    ExpectElapsedBelow {
        label: String,
        max_ms: u64,
    },

    /// Click `trigger`, await the new page it opens, check its URL, then close it
    ExpectPopup {
        trigger: Locator,
        url_pattern: TextPattern,
        #[serde(default = "default_popup_timeout")]
        timeout_ms: u64,
    },

    /// Capture a screenshot into the actual-screenshot directory
    Screenshot {
        name: String,
        #[serde(default)]
        full_page: bool,
    },

    Log {
        message: String,
    },
}

fn default_path() -> String {
    "/".to_string()
}

fn default_long_timeout() -> u64 {
    30_000
}

fn default_image_timeout() -> u64 {
    5_000
}

fn default_popup_timeout() -> u64 {
    10_000
}

/// Page lifecycle states
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    Load,
    DomContentLoaded,
    NetworkIdle,
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::Load => "load",
            LoadState::DomContentLoaded => "domcontentloaded",
            LoadState::NetworkIdle => "networkidle",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl WaitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitState::Visible => "visible",
            WaitState::Hidden => "hidden",
            WaitState::Attached => "attached",
            WaitState::Detached => "detached",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitCandidate {
    pub locator: Locator,
    pub timeout_ms: u64,
}

impl Step {
    /// Short human-readable label used in logs and reports
    pub fn name(&self) -> String {
        match self {
            Step::Goto { path } => format!("goto:{}", path),
            Step::WaitForLoad { state, .. } => format!("wait-for-load:{}", state.as_str()),
            Step::WaitFor { locator, state, .. } => format!("wait-for:{}:{}", locator, state.as_str()),
            Step::WaitForAny { candidates, .. } => {
                let names: Vec<String> = candidates.iter().map(|c| c.locator.to_string()).collect();
                format!("wait-for-any:{}", names.join(" | "))
            }
            Step::WaitForImages { .. } => "wait-for-images".to_string(),
            Step::Click { locator, .. } => format!("click:{}", locator),
            Step::ClickToggle { locator, .. } => format!("click-toggle:{}", locator),
            Step::ClickIfPresent { locator } => format!("click-if-present:{}", locator),
            Step::Press { key } => format!("press:{}", key),
            Step::Sleep { ms } => format!("sleep:{}ms", ms),
            Step::ExpectTitle { pattern } => format!("expect-title:{}", pattern),
            Step::ExpectVisible { locator } => format!("expect-visible:{}", locator),
            Step::ExpectEnabled { locator } => format!("expect-enabled:{}", locator),
            Step::ExpectDisabled { locator } => format!("expect-disabled:{}", locator),
            Step::ExpectText { locator, contains } => format!("expect-text:{}:{:?}", locator, contains),
            Step::ExpectTextMatches { locator, pattern } => {
                format!("expect-text-matches:{}:{}", locator, pattern)
            }
            Step::ExpectAttribute { locator, name, pattern } => {
                format!("expect-attribute:{}[{}]:{}", locator, name, pattern)
            }
            Step::ExpectCount { locator, count } => format!("expect-count:{}:{}", locator, count),
            Step::ExpectMinCount { locator, min } => format!("expect-min-count:{}:{}", locator, min),
            Step::ExpectAccessibleNames { locator, .. } => format!("expect-accessible-names:{}", locator),
            Step::ExpectAttributePresent { locator, attribute, .. } => {
                format!("expect-attribute-present:{}[{}]", locator, attribute)
            }
            Step::ExpectFocusVisible => "expect-focus-visible".to_string(),
            Step::ExpectNoConsoleErrors { .. } => "expect-no-console-errors".to_string(),
            Step::StartTimer { label } => format!("start-timer:{}", label),
            Step::ExpectElapsedBelow { label, max_ms } => format!("expect-elapsed:{}<{}ms", label, max_ms),
            Step::ExpectPopup { trigger, .. } => format!("expect-popup:{}", trigger),
            Step::Screenshot { name, .. } => format!("screenshot:{}", name),
            Step::Log { message } => {
                let short: String = message.chars().take(30).collect();
                format!("log:{}", short)
            }
        }
    }

    /// Whether this step asserts on page state rather than acting on it
    pub fn is_expectation(&self) -> bool {
        matches!(
            self,
            Step::ExpectTitle { .. }
                | Step::ExpectVisible { .. }
                | Step::ExpectEnabled { .. }
                | Step::ExpectDisabled { .. }
                | Step::ExpectText { .. }
                | Step::ExpectTextMatches { .. }
                | Step::ExpectAttribute { .. }
                | Step::ExpectCount { .. }
                | Step::ExpectMinCount { .. }
                | Step::ExpectAccessibleNames { .. }
                | Step::ExpectAttributePresent { .. }
                | Step::ExpectFocusVisible
                | Step::ExpectNoConsoleErrors { .. }
                | Step::ExpectElapsedBelow { .. }
                | Step::ExpectPopup { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps_with_defaults() {
        let yaml = r#"
- action: goto
- action: wait_for
  locator: { by: css, selector: main }
- action: sleep
  ms: 500
- action: expect_focus_visible
"#;
        let steps: Vec<Step> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(steps[0], Step::Goto { path: "/".to_string() });
        match &steps[1] {
            Step::WaitFor { state, timeout_ms, .. } => {
                assert_eq!(*state, WaitState::Visible);
                assert_eq!(*timeout_ms, 30_000);
            }
            other => panic!("unexpected step {:?}", other),
        }
        assert!(steps[3].is_expectation());
        assert!(!steps[2].is_expectation());
    }

    #[test]
    fn test_step_names() {
        let step = Step::ExpectText {
            locator: Locator::css("#progress"),
            contains: "2 / 14".to_string(),
        };
        assert_eq!(step.name(), "expect-text:#progress:\"2 / 14\"");

        let log = Step::Log { message: "x".repeat(100) };
        assert_eq!(log.name().len(), "log:".len() + 30);
    }
}
