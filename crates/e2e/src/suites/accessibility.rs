//! Accessibility scenarios

use crate::locator::Locator;
use crate::page;
use crate::scenario::{Group, Scenario};
use crate::step::Step;

/// Controls inside any navigation landmark
const NAVIGATION_CONTROLS: &str = r#"nav button, [role="navigation"] button"#;

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(Group::Accessibility, "navigation-controls-have-names")
            .describe("Every navigation control exposes an accessible name")
            .steps(page::open_home())
            .step(Step::ExpectVisible { locator: page::sections_nav() })
            .step(Step::ExpectMinCount {
                locator: Locator::css(NAVIGATION_CONTROLS),
                min: 1,
            })
            .step(Step::ExpectAccessibleNames {
                locator: Locator::css(NAVIGATION_CONTROLS),
                limit: None,
            }),
        Scenario::new(Group::Accessibility, "heading-hierarchy")
            .steps(page::open_home())
            .step(Step::ExpectVisible { locator: page::main_heading() })
            .step(Step::ExpectMinCount {
                locator: Locator::css("main h1"),
                min: 1,
            }),
        Scenario::new(Group::Accessibility, "images-have-alt-text")
            .describe("Images in the main region carry an alt attribute, empty for decorative ones")
            .steps(page::open_home())
            .step(Step::ExpectAttributePresent {
                locator: Locator::css("main img"),
                attribute: "alt".to_string(),
                limit: None,
            }),
        Scenario::new(Group::Accessibility, "keyboard-navigable")
            .steps(page::open_home())
            .step(Step::Press { key: "Tab".to_string() })
            .step(Step::ExpectFocusVisible),
    ]
}
