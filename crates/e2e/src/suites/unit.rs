//! Unit scenarios: one page component at a time

use crate::catalog;
use crate::locator::{AriaRole, Locator, TextPattern};
use crate::page;
use crate::scenario::{Group, Scenario};
use crate::step::Step;

pub fn scenarios() -> Vec<Scenario> {
    let intro = catalog::section(1).map(|s| s.title).unwrap_or_default();

    vec![
        Scenario::new(Group::Unit, "renders-header")
            .describe("Header shows the deck title and the profile image")
            .steps(page::open_home())
            .step(Step::ExpectVisible {
                locator: Locator::css(r#"header, [role="banner"]"#).first(),
            })
            .step(Step::ExpectVisible {
                locator: Locator::role_named(AriaRole::Heading, TextPattern::literal(page::HEADER_TITLE)),
            })
            .step(Step::ExpectVisible {
                locator: Locator::alt_text(page::PROFILE_IMAGE_ALT),
            }),
        Scenario::new(Group::Unit, "renders-theme-toggle")
            .steps(page::open_home())
            .step(Step::ExpectVisible { locator: page::theme_toggle() })
            .step(Step::ExpectEnabled { locator: page::theme_toggle() }),
        Scenario::new(Group::Unit, "renders-navigation-sidebar")
            .describe("Complementary landmark holds the labeled section navigation")
            .steps(page::open_home())
            .step(Step::ExpectVisible {
                locator: Locator::role(AriaRole::Complementary),
            })
            .step(Step::ExpectVisible { locator: page::sections_nav() })
            .step(Step::ExpectCount {
                locator: page::sections_nav_buttons(),
                count: catalog::TOTAL_SECTIONS as usize,
            }),
        Scenario::new(Group::Unit, "previous-disabled-on-first-page")
            .steps(page::open_home())
            .step(Step::ExpectVisible { locator: page::previous_button() })
            .step(Step::ExpectDisabled { locator: page::previous_button() }),
        Scenario::new(Group::Unit, "next-enabled-on-first-page")
            .steps(page::open_home())
            .step(Step::ExpectVisible { locator: page::next_button() })
            .step(Step::ExpectEnabled { locator: page::next_button() }),
        Scenario::new(Group::Unit, "renders-footer-contact-links")
            .describe("Footer carries a LinkedIn profile link and a mailto link")
            .steps(page::open_home())
            .step(Step::ExpectVisible {
                locator: Locator::role(AriaRole::Contentinfo),
            })
            .step(Step::ExpectVisible { locator: page::linkedin_link() })
            .step(Step::ExpectAttribute {
                locator: page::linkedin_link(),
                name: "href".to_string(),
                pattern: TextPattern::new(r"linkedin\.com"),
            })
            .step(Step::ExpectVisible { locator: page::email_link() })
            .step(Step::ExpectAttribute {
                locator: page::email_link(),
                name: "href".to_string(),
                pattern: TextPattern::new("mailto:"),
            }),
        Scenario::new(Group::Unit, "displays-intro-heading")
            .steps(page::open_home())
            .step(Step::ExpectVisible {
                locator: Locator::role_named(AriaRole::Heading, TextPattern::literal(intro)),
            }),
        Scenario::new(Group::Unit, "renders-section-content-area")
            .steps(page::open_home())
            .step(Step::ExpectVisible {
                locator: Locator::role(AriaRole::Main),
            })
            .step(Step::ExpectVisible {
                locator: Locator::css("main h1, main h2, main h3").first(),
            }),
    ]
}
