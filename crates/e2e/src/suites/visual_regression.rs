//! Visual regression scenarios: full-page screenshots against baselines

use crate::catalog;
use crate::page;
use crate::scenario::{Group, Scenario, DEFAULT_MAX_DIFF_PIXELS};
use crate::step::Step;

pub const VIEWPORT_WIDTH: u32 = 1280;
pub const VIEWPORT_HEIGHT: u32 = 720;

pub const HOMEPAGE_SNAPSHOT: &str = "homepage-intro";

fn visual(name: &str) -> Scenario {
    Scenario::new(Group::VisualRegression, name)
        .viewport(VIEWPORT_WIDTH, VIEWPORT_HEIGHT)
        .visual(DEFAULT_MAX_DIFF_PIXELS)
        .step(Step::Goto { path: "/".to_string() })
        .steps(page::wait_for_page_stable())
}

pub fn scenarios() -> Vec<Scenario> {
    let homepage = visual("homepage-snapshot")
        .describe("Intro slide renders like its baseline")
        .step(Step::Screenshot {
            name: HOMEPAGE_SNAPSHOT.to_string(),
            full_page: true,
        });

    let mut sections = visual("key-section-snapshots")
        .describe("Intro, Methods, Tools and End render like their baselines");
    for section in catalog::key_sections() {
        if section.number > 1 {
            sections = sections
                .step(Step::Click {
                    locator: page::section_button_for(section),
                    timeout_ms: None,
                })
                .steps(page::wait_for_page_stable());
        }
        sections = sections.step(Step::Screenshot {
            name: section.snapshot_name(),
            full_page: true,
        });
    }

    vec![homepage, sections]
}
