//! The seven scenario groups run against the deck

pub mod accessibility;
pub mod end_to_end;
pub mod integration;
pub mod performance;
pub mod smoke;
pub mod unit;
pub mod visual_regression;

use crate::scenario::{Group, Scenario};

/// Scenarios of one group, in declaration order
pub fn for_group(group: Group) -> Vec<Scenario> {
    match group {
        Group::Smoke => smoke::scenarios(),
        Group::Unit => unit::scenarios(),
        Group::Integration => integration::scenarios(),
        Group::EndToEnd => end_to_end::scenarios(),
        Group::VisualRegression => visual_regression::scenarios(),
        Group::Accessibility => accessibility::scenarios(),
        Group::Performance => performance::scenarios(),
    }
}

/// Every built-in scenario, grouped in suite order
pub fn all() -> Vec<Scenario> {
    Group::ALL.into_iter().flat_map(for_group).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Step;
    use std::collections::HashSet;

    #[test]
    fn test_every_group_has_scenarios() {
        for group in Group::ALL {
            let scenarios = for_group(group);
            assert!(!scenarios.is_empty(), "group {} is empty", group);
            assert!(scenarios.iter().all(|s| s.group == group));
        }
    }

    #[test]
    fn test_names_are_unique() {
        let all = all();
        let names: HashSet<_> = all.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names.len(), all.len());
    }

    #[test]
    fn test_every_scenario_navigates_first() {
        for scenario in all() {
            let first_goto = scenario
                .steps
                .iter()
                .position(|s| matches!(s, Step::Goto { .. }))
                .unwrap_or_else(|| panic!("{} never navigates", scenario.name));
            let first_expectation = scenario.steps.iter().position(Step::is_expectation);
            if let Some(e) = first_expectation {
                assert!(first_goto < e, "{} asserts before navigating", scenario.name);
            }
        }
    }

    #[test]
    fn test_patterns_compile() {
        for scenario in all() {
            for step in &scenario.steps {
                let pattern = match step {
                    Step::ExpectTitle { pattern } => Some(pattern),
                    Step::ExpectAttribute { pattern, .. } => Some(pattern),
                    Step::ExpectTextMatches { pattern, .. } => Some(pattern),
                    Step::ExpectPopup { url_pattern, .. } => Some(url_pattern),
                    Step::Click { locator, .. } | Step::ExpectVisible { locator } => {
                        locator.name_pattern()
                    }
                    _ => None,
                };
                if let Some(p) = pattern {
                    p.to_regex()
                        .unwrap_or_else(|e| panic!("{}: bad pattern {}: {}", scenario.name, p, e));
                }
            }
        }
    }
}
