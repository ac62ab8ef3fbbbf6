//! Integration scenarios: navigation controls working together

use crate::catalog::{self, TOTAL_SECTIONS};
use crate::locator::{AriaRole, Locator, TextPattern};
use crate::page;
use crate::scenario::{Group, Scenario};
use crate::step::Step;

/// Previous disabled iff at the first section, Next disabled iff at the last
fn expect_boundaries(position: u32) -> Vec<Step> {
    let previous = page::previous_button();
    let next = page::next_button();
    vec![
        if position == 1 {
            Step::ExpectDisabled { locator: previous }
        } else {
            Step::ExpectEnabled { locator: previous }
        },
        if position == TOTAL_SECTIONS {
            Step::ExpectDisabled { locator: next }
        } else {
            Step::ExpectEnabled { locator: next }
        },
    ]
}

pub fn scenarios() -> Vec<Scenario> {
    let mut scenarios = vec![
        Scenario::new(Group::Integration, "next-button-navigation")
            .steps(page::open_home())
            .step(page::expect_progress(1))
            .steps(page::go_next(2))
            .steps(page::go_next(3)),
        Scenario::new(Group::Integration, "previous-button-navigation")
            .steps(page::open_home())
            .steps(page::go_next(2))
            .steps(page::go_next(3))
            .step(Step::ExpectEnabled { locator: page::previous_button() })
            .steps(page::go_previous(2))
            .steps(page::go_previous(1)),
    ];

    if let Some(fundamentals) = catalog::section(3) {
        scenarios.push(
            Scenario::new(Group::Integration, "sidebar-updates-content")
                .describe("Jumping through the sidebar swaps the slide content")
                .steps(page::open_home())
                .steps(page::jump_to(fundamentals))
                .step(Step::ExpectVisible {
                    locator: Locator::role_named(AriaRole::Heading, TextPattern::new("QA Fundamentals")),
                }),
        );
    }

    scenarios.push(
        Scenario::new(Group::Integration, "previous-disabled-on-first-section")
            .steps(page::open_home())
            .step(Step::ExpectDisabled { locator: page::previous_button() }),
    );

    scenarios.push(
        Scenario::new(Group::Integration, "next-disabled-on-last-section")
            .describe("Thirteen clicks on Next reach the last section and disable Next")
            .steps(page::open_home())
            .steps((2..=TOTAL_SECTIONS).flat_map(page::go_next))
            .step(page::expect_progress(TOTAL_SECTIONS))
            .step(Step::ExpectDisabled { locator: page::next_button() }),
    );

    scenarios.push(
        Scenario::new(Group::Integration, "progress-updates-during-navigation")
            .steps(page::open_home())
            .step(page::expect_progress(1))
            .steps((2..=5).flat_map(page::go_next)),
    );

    if let Some(agenda) = catalog::section(2) {
        scenarios.push(
            Scenario::new(Group::Integration, "keeps-state-when-switching-sections")
                .describe("Sidebar jump after Next clicks lands on the chosen section")
                .steps(page::open_home())
                .steps((2..=5).flat_map(page::go_next))
                .steps(page::jump_to(agenda))
                .step(Step::ExpectEnabled { locator: page::previous_button() }),
        );
    }

    let mut round_trip = Scenario::new(Group::Integration, "next-previous-round-trip")
        .describe("Next then Previous returns to the same section, with boundary controls correct at every position")
        .steps(page::open_home())
        .steps(expect_boundaries(1));
    for position in 1..TOTAL_SECTIONS {
        round_trip = round_trip
            .steps(page::go_next(position + 1))
            .steps(page::go_previous(position))
            .steps(page::go_next(position + 1))
            .steps(expect_boundaries(position + 1));
    }
    scenarios.push(round_trip);

    scenarios
}
