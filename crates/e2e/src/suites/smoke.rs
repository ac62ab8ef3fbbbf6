//! Smoke scenarios: critical path validation

use crate::catalog::SECTIONS;
use crate::locator::{Locator, TextPattern};
use crate::page;
use crate::scenario::{Group, Scenario};
use crate::step::Step;

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(Group::Smoke, "loads-homepage")
            .describe("Homepage loads with the deck title and a visible main region")
            .steps(page::open_home())
            .step(Step::ExpectTitle {
                pattern: TextPattern::case_sensitive(page::TITLE_PATTERN),
            })
            .step(Step::ExpectVisible {
                locator: Locator::css("main"),
            }),
        Scenario::new(Group::Smoke, "displays-all-sections")
            .describe("Section navigation lists all fourteen sections")
            .steps(page::open_home())
            .step(Step::ExpectVisible {
                locator: page::sections_nav(),
            })
            .steps(SECTIONS.iter().map(|section| Step::ExpectVisible {
                locator: page::section_button_for(section),
            })),
        Scenario::new(Group::Smoke, "no-console-errors")
            .describe("Initial load logs no console errors")
            .steps(page::open_home())
            .step(Step::ExpectNoConsoleErrors {
                allow: vec![page::ALLOWED_CONSOLE_WARNING.to_string()],
            }),
        Scenario::new(Group::Smoke, "displays-progress-indicator")
            .describe("Progress indicator starts at the first section")
            .steps(page::open_home())
            .step(Step::ExpectVisible {
                locator: page::progress_indicator(),
            })
            .step(page::expect_progress(1)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_section_controls_checked() {
        let scenario = scenarios()
            .into_iter()
            .find(|s| s.name == "displays-all-sections")
            .unwrap();
        let checked = scenario
            .steps
            .iter()
            .filter(|s| matches!(s, Step::ExpectVisible { locator: Locator::Role { .. } }))
            .count();
        // the labeled nav plus one control per section
        assert_eq!(checked, SECTIONS.len() + 1);
    }
}
