//! Page helpers for the slide deck: readiness, stability and landmark locators

use crate::catalog::{self, Section};
use crate::locator::{AriaRole, Locator, TextPattern};
use crate::step::{LoadState, Step, WaitCandidate, WaitState};

/// Default budget for the load event and the main landmark
pub const READY_TIMEOUT_MS: u64 = 30_000;

/// Budget for the labeled section navigation before falling back
pub const NAV_TIMEOUT_MS: u64 = 10_000;

/// Budget for the fallback `nav` landmark
pub const NAV_FALLBACK_TIMEOUT_MS: u64 = 5_000;

/// Per-image cap while waiting for images to settle
pub const IMAGE_TIMEOUT_MS: u64 = 5_000;

/// Hold for CSS transitions before a screenshot
pub const TRANSITION_SETTLE_MS: u64 = 1_000;

/// Hold for layout shifts after transitions
pub const LAYOUT_SETTLE_MS: u64 = 500;

/// Console errors containing this text are not treated as failures
pub const ALLOWED_CONSOLE_WARNING: &str = "React Router Future Flag Warning";

/// Document title of the deployed deck
pub const TITLE_PATTERN: &str = "Thomas Adika|Lovable App";

pub const HEADER_TITLE: &str = "Thomas Adika QA Mentor Hour";

pub const PROFILE_IMAGE_ALT: &str = "Thomas Adika";

pub const THEME_TO_LIGHT: &str = "Switch to Light Mode";

pub const THEME_TO_DARK: &str = "Switch to Dark Mode";

/// Steps that block until a freshly navigated page is safe to assert against.
///
/// The load event and a visible `main` are required. The section navigation is
/// advisory: the labeled nav is tried first, then any `nav`, then nothing.
pub fn wait_for_page_ready(timeout_ms: u64) -> Vec<Step> {
    vec![
        Step::WaitForLoad {
            state: LoadState::Load,
            timeout_ms,
        },
        Step::WaitFor {
            locator: Locator::css("main"),
            state: WaitState::Visible,
            timeout_ms,
        },
        Step::WaitForAny {
            candidates: vec![
                WaitCandidate {
                    locator: sections_nav_css(),
                    timeout_ms: NAV_TIMEOUT_MS,
                },
                WaitCandidate {
                    locator: Locator::css("nav"),
                    timeout_ms: NAV_FALLBACK_TIMEOUT_MS,
                },
            ],
            required: false,
        },
    ]
}

/// Readiness plus settled images and a fixed hold, for screenshots only
pub fn wait_for_page_stable() -> Vec<Step> {
    vec![
        Step::WaitForLoad {
            state: LoadState::Load,
            timeout_ms: READY_TIMEOUT_MS,
        },
        Step::WaitFor {
            locator: Locator::css("main"),
            state: WaitState::Visible,
            timeout_ms: READY_TIMEOUT_MS,
        },
        Step::WaitForImages {
            per_image_timeout_ms: IMAGE_TIMEOUT_MS,
        },
        Step::Sleep { ms: TRANSITION_SETTLE_MS },
        Step::Sleep { ms: LAYOUT_SETTLE_MS },
    ]
}

/// Navigate to the deck root and wait until it is ready
pub fn open_home() -> Vec<Step> {
    let mut steps = vec![Step::Goto { path: "/".to_string() }];
    steps.extend(wait_for_page_ready(READY_TIMEOUT_MS));
    steps
}

/// Sidebar control for a section.
///
/// The name pattern is anchored on both ends so section 1 never resolves the
/// control of section 11.
pub fn section_button(number: u32, name: &str) -> Locator {
    Locator::role_named(AriaRole::Button, section_button_pattern(number, name))
}

pub fn section_button_pattern(number: u32, name: &str) -> TextPattern {
    TextPattern::new(format!(r"^{}\s+{}$", number, regex::escape(name)))
}

pub fn section_button_for(section: &Section) -> Locator {
    section_button(section.number, section.name)
}

/// Labeled section navigation, matched on its accessible name
pub fn sections_nav() -> Locator {
    Locator::role_named(AriaRole::Navigation, TextPattern::new("Presentation sections"))
}

/// Same landmark as a CSS query on the `aria-label` attribute
pub fn sections_nav_css() -> Locator {
    Locator::css(r#"nav[aria-label*="presentation sections" i]"#)
}

/// Controls inside the section navigation
pub fn sections_nav_buttons() -> Locator {
    Locator::css(r#"nav[aria-label*="presentation sections" i] button"#)
}

pub fn progress_indicator() -> Locator {
    Locator::text(TextPattern::new(r"\d+ / \d+")).first()
}

pub fn next_button() -> Locator {
    Locator::role_named(AriaRole::Button, TextPattern::new("Next"))
}

pub fn previous_button() -> Locator {
    Locator::role_named(AriaRole::Button, TextPattern::new("Previous"))
}

pub fn theme_toggle() -> Locator {
    Locator::role_named(
        AriaRole::Button,
        TextPattern::new(r"Switch to (Light|Dark) Mode"),
    )
}

pub fn linkedin_link() -> Locator {
    Locator::role_named(AriaRole::Link, TextPattern::new("LinkedIn"))
}

pub fn email_link() -> Locator {
    Locator::role_named(AriaRole::Link, TextPattern::new("Email"))
}

pub fn main_heading() -> Locator {
    Locator::css("main h1").first()
}

/// Progress text for `position`, not matching inside a longer number (`4 / 14` vs `14 / 14`)
pub fn progress_pattern(position: u32) -> TextPattern {
    TextPattern::new(format!(
        r"(^|\D){}(\D|$)",
        regex::escape(&catalog::progress_label(position))
    ))
}

/// Progress indicator shows exactly `position / 14`
pub fn expect_progress(position: u32) -> Step {
    Step::ExpectTextMatches {
        locator: progress_indicator(),
        pattern: progress_pattern(position),
    }
}

/// Click Next and wait for the indicator to reach `expected`
pub fn go_next(expected: u32) -> Vec<Step> {
    vec![
        Step::Click {
            locator: next_button(),
            timeout_ms: None,
        },
        expect_progress(expected),
    ]
}

/// Click Previous and wait for the indicator to reach `expected`
pub fn go_previous(expected: u32) -> Vec<Step> {
    vec![
        Step::Click {
            locator: previous_button(),
            timeout_ms: None,
        },
        expect_progress(expected),
    ]
}

/// Jump through the sidebar and wait for the indicator to follow
pub fn jump_to(section: &Section) -> Vec<Step> {
    vec![
        Step::Click {
            locator: section_button_for(section),
            timeout_ms: None,
        },
        expect_progress(section.number),
    ]
}
