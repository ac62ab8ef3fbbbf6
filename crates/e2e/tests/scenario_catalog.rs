//! Suite composition checks that need no browser
//!
//! These check the built-in scenarios and the generated scripts against the
//! deck's section catalog.

use std::collections::HashSet;

use slidedeck_e2e::catalog::{self, SECTIONS, TOTAL_SECTIONS};
use slidedeck_e2e::driver::{PlaywrightConfig, ScriptEvent, ScriptRun};
use slidedeck_e2e::script::{ScriptBuilder, ScriptOptions};
use slidedeck_e2e::{suites, Group, Scenario, ScenarioFilter, Step};

fn options() -> ScriptOptions {
    let config = PlaywrightConfig::default();
    ScriptOptions {
        base_url: "http://localhost:8080".to_string(),
        browser: config.browser,
        headless: true,
        viewport: config.viewport,
        expect_timeout_ms: config.expect_timeout_ms,
        screenshot_dir: "/tmp/e2e-shots".into(),
    }
}

#[test]
fn visual_suite_captures_homepage_and_key_sections() {
    let names: HashSet<String> = suites::for_group(Group::VisualRegression)
        .iter()
        .flat_map(|s| s.screenshot_names())
        .map(str::to_string)
        .collect();

    assert!(names.contains("homepage-intro"));
    for section in catalog::key_sections() {
        assert!(names.contains(&section.snapshot_name()), "missing {}", section.snapshot_name());
    }

    for scenario in suites::for_group(Group::VisualRegression) {
        let visual = scenario.visual.expect("visual scenarios carry a pixel budget");
        assert_eq!(visual.max_diff_pixels, 500);
    }
}

#[test]
fn last_section_is_reached_by_thirteen_next_clicks() {
    let scenario = suites::for_group(Group::Integration)
        .into_iter()
        .find(|s| s.name == "next-disabled-on-last-section")
        .unwrap();

    let clicks = scenario
        .steps
        .iter()
        .filter(|s| matches!(s, Step::Click { .. }))
        .count();
    assert_eq!(clicks as u32, TOTAL_SECTIONS - 1);
}

#[test]
fn every_builtin_scenario_compiles_to_a_script() {
    let opts = options();
    let builder = ScriptBuilder::new(&opts);

    for scenario in suites::all() {
        let script = builder.build(&scenario);
        assert!(script.contains("require('playwright')"), "{}", scenario.name);
        assert!(script.contains("http://localhost:8080"), "{}", scenario.name);
        assert_eq!(
            script.matches("await runStep(").count(),
            scenario.steps.len(),
            "{} should emit one runStep per step",
            scenario.name
        );
    }
}

#[test]
fn sidebar_jump_targets_match_catalog() {
    let script = ScriptBuilder::new(&options()).build(
        &Scenario::new(Group::Integration, "jump-everywhere").steps(
            std::iter::once(Step::Goto { path: "/".into() })
                .chain(SECTIONS.iter().flat_map(slidedeck_e2e::page::jump_to)),
        ),
    );

    for section in SECTIONS.iter() {
        let pattern = slidedeck_e2e::page::progress_pattern(section.number);
        assert!(script.contains(&pattern.to_js()), "no progress check for {}", section.number);
        assert!(pattern.is_match(&section.progress_label()).unwrap());
    }
}

#[test]
fn yaml_scenarios_join_the_builtin_suite() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("extra.yaml"),
        r#"
name: custom-title-check
group: smoke
steps:
  - action: goto
  - action: expect_title
    pattern: { source: "Lovable App" }
"#,
    )
    .unwrap();

    let mut scenarios = suites::all();
    scenarios.extend(Scenario::load_all(dir.path()).unwrap());

    let filter = ScenarioFilter {
        groups: vec![Group::Smoke],
        name: Some("custom-title-check".to_string()),
    };
    let selected = filter.apply(scenarios).unwrap();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].steps.len(), 2);
}

#[test]
fn fatal_event_fails_the_run() {
    let run = ScriptRun::from_events(vec![
        ScriptEvent::Fatal {
            error: "browserType.launch: Executable doesn't exist".to_string(),
        },
    ]);
    assert!(!run.success());
    assert!(run.error.unwrap().contains("launch"));
}
