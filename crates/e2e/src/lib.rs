//! Slide deck E2E test suite
//!
//! This crate drives a real browser against a running instance of the slide
//! presentation app and asserts on structure, navigation state, accessibility,
//! appearance and load performance:
//! - Declares scenarios as typed step lists (or YAML files)
//! - Compiles each scenario into a Playwright script and runs it under Node
//! - Reads step results back through a JSON line protocol
//! - Compares full-page screenshots against baselines
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Suite Runner (Rust)                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SuiteRunner                                                │
//! │    ├── TargetApp::probe(base_url)                           │
//! │    ├── PlaywrightDriver::run(scenario) -> ScriptRun         │
//! │    │     └── ScriptBuilder::build(scenario) -> node script  │
//! │    └── VisualTester::compare(actual, baseline) -> Diff      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario                                                   │
//! │    ├── name, group, viewport, visual budget                 │
//! │    └── steps: [Step]                                        │
//! │          ├── goto / wait_for / wait_for_any                 │
//! │          ├── click / click_toggle / press / sleep           │
//! │          ├── expect_* (polled until they hold)              │
//! │          ├── start_timer / expect_elapsed_below             │
//! │          └── screenshot                                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  suites: smoke, unit, integration, end-to-end,              │
//! │          visual-regression, accessibility, performance      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod cli;
pub mod driver;
pub mod error;
pub mod locator;
pub mod page;
pub mod runner;
pub mod scenario;
pub mod script;
pub mod step;
pub mod suites;
pub mod target;
pub mod visual;

pub use error::{E2eError, E2eResult};
pub use runner::{RunnerConfig, ScenarioFilter, SuiteReport, SuiteRunner};
pub use scenario::{Group, Scenario};
pub use step::Step;
