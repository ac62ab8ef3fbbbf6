//! Performance scenarios: load and transition budgets

use crate::page;
use crate::scenario::{Group, Scenario};
use crate::step::Step;

/// Budget from navigation start to a ready page
pub const LOAD_BUDGET_MS: u64 = 5_000;

/// Budget for one section transition, settle wait included
pub const TRANSITION_BUDGET_MS: u64 = 1_000;

/// Settle wait measured as part of a transition
pub const TRANSITION_SETTLE_MS: u64 = 500;

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(Group::Performance, "page-load-time")
            .describe("Page is ready within the load budget")
            .step(Step::StartTimer { label: "load".to_string() })
            .steps(page::open_home())
            .step(Step::ExpectElapsedBelow {
                label: "load".to_string(),
                max_ms: LOAD_BUDGET_MS,
            }),
        Scenario::new(Group::Performance, "section-transition-time")
            .describe("One Next transition, settle wait included, stays within budget")
            .steps(page::open_home())
            .step(Step::StartTimer { label: "transition".to_string() })
            .step(Step::Click {
                locator: page::next_button(),
                timeout_ms: None,
            })
            .step(Step::Sleep { ms: TRANSITION_SETTLE_MS })
            .step(Step::ExpectElapsedBelow {
                label: "transition".to_string(),
                max_ms: TRANSITION_BUDGET_MS,
            })
            .step(page::expect_progress(2)),
    ]
}
