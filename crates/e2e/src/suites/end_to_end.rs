//! End-to-end scenarios: complete user workflows

use crate::catalog::{self, SECTIONS, TOTAL_SECTIONS};
use crate::locator::{Locator, TextPattern};
use crate::page;
use crate::scenario::{Group, Scenario};
use crate::step::Step;

/// Answer buttons of the quiz on the Methods slide
const QUIZ_OPTIONS: &str = r#"button:has-text("Unit Tests"), button:has-text("End-to-End Tests"), button:has-text("Manual Testing"), button:has-text("Performance Tests")"#;

fn full_forward_flow() -> Scenario {
    let mut scenario = Scenario::new(Group::EndToEnd, "full-presentation-flow")
        .describe("Walk all fourteen sections with Next")
        .steps(page::open_home());

    for position in 1..=TOTAL_SECTIONS {
        scenario = scenario
            .step(page::expect_progress(position))
            .step(Step::ExpectVisible { locator: Locator::css("main") })
            .step(Step::ExpectVisible { locator: page::main_heading() });

        if position < TOTAL_SECTIONS {
            scenario = scenario
                .step(Step::ExpectEnabled { locator: page::next_button() })
                .step(Step::Click {
                    locator: page::next_button(),
                    timeout_ms: None,
                });
        }
    }

    scenario
        .step(page::expect_progress(TOTAL_SECTIONS))
        .step(Step::ExpectDisabled { locator: page::next_button() })
}

fn backward_flow(from: &catalog::Section) -> Scenario {
    let mut scenario = Scenario::new(Group::EndToEnd, "backward-presentation-flow")
        .describe("Jump to a middle section, then walk back to the start with Previous")
        .steps(page::open_home())
        .steps(page::jump_to(from));

    for position in (1..from.number).rev() {
        scenario = scenario.steps(page::go_previous(position));
    }

    scenario.step(page::expect_progress(1))
}

fn every_section_loads() -> Scenario {
    let mut scenario = Scenario::new(Group::EndToEnd, "all-sections-load")
        .describe("Every section is reachable from the sidebar and renders exactly one heading")
        .steps(page::open_home());

    for section in &SECTIONS {
        scenario = scenario
            .steps(page::jump_to(section))
            .step(Step::ExpectVisible { locator: page::main_heading() })
            .step(Step::ExpectCount {
                locator: Locator::css("main h1"),
                count: 1,
            })
            .step(Step::ExpectVisible { locator: Locator::css("main") });
    }

    scenario
}

pub fn scenarios() -> Vec<Scenario> {
    let mut scenarios = vec![full_forward_flow()];

    if let Some(methods) = catalog::section(6) {
        scenarios.push(
            Scenario::new(Group::EndToEnd, "sidebar-jump-then-continue")
                .describe("Jump to Methods, then continue with Next")
                .steps(page::open_home())
                .steps(page::jump_to(methods))
                .steps(page::go_next(7)),
        );
    }

    if let Some(modern_dev) = catalog::section(7) {
        scenarios.push(backward_flow(modern_dev));
    }

    if let Some(methods) = catalog::section(6) {
        scenarios.push(
            Scenario::new(Group::EndToEnd, "methods-quiz-interaction")
                .describe("Answer the Methods quiz when it is rendered")
                .steps(page::open_home())
                .steps(page::jump_to(methods))
                .step(Step::ClickIfPresent {
                    locator: Locator::css(QUIZ_OPTIONS),
                })
                .step(Step::ExpectVisible { locator: Locator::css("main") }),
        );
    }

    scenarios.push(
        Scenario::new(Group::EndToEnd, "footer-external-link")
            .describe("LinkedIn link opens a LinkedIn page in a new tab")
            .steps(page::open_home())
            .step(Step::ExpectVisible { locator: page::linkedin_link() })
            .step(Step::ExpectPopup {
                trigger: page::linkedin_link(),
                url_pattern: TextPattern::new(r"linkedin\.com"),
                timeout_ms: 10_000,
            }),
    );

    scenarios.push(
        Scenario::new(Group::EndToEnd, "theme-toggle-keeps-navigation")
            .describe("Switching theme flips the toggle label and leaves navigation intact")
            .steps(page::open_home())
            .step(Step::ExpectVisible { locator: page::theme_toggle() })
            .step(Step::ClickToggle {
                locator: page::theme_toggle(),
                labels: [page::THEME_TO_LIGHT.to_string(), page::THEME_TO_DARK.to_string()],
            })
            .step(Step::ExpectVisible { locator: Locator::css("main") })
            .steps(page::go_next(2)),
    );

    scenarios.push(every_section_loads());

    scenarios
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backward_flow_visits_each_position() {
        let scenario = backward_flow(catalog::section(7).unwrap());
        let progress: Vec<&Step> = scenario
            .steps
            .iter()
            .filter(|s| matches!(s, Step::ExpectTextMatches { .. }))
            .collect();
        let expected: Vec<Step> = [7, 6, 5, 4, 3, 2, 1, 1]
            .into_iter()
            .map(page::expect_progress)
            .collect();
        assert_eq!(progress, expected.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_every_section_reached_by_sidebar() {
        let scenario = every_section_loads();
        for section in &SECTIONS {
            let progress = page::expect_progress(section.number);
            assert!(scenario.steps.contains(&progress));
        }
    }

    #[test]
    fn test_one_heading_checked_per_section() {
        let scenario = every_section_loads();
        let single_heading = Step::ExpectCount {
            locator: Locator::css("main h1"),
            count: 1,
        };

        for section in &SECTIONS {
            let jump = scenario
                .steps
                .iter()
                .position(|s| *s == page::expect_progress(section.number))
                .unwrap();
            let next_jump = scenario.steps[jump + 1..]
                .iter()
                .position(|s| matches!(s, Step::Click { .. }))
                .map(|i| jump + 1 + i)
                .unwrap_or(scenario.steps.len());
            assert!(
                scenario.steps[jump..next_jump].contains(&single_heading),
                "section {} does not check for a single heading",
                section.number
            );
        }
    }
}
