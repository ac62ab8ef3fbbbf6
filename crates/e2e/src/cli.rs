//! Command-line arguments of the harness binary and their mapping onto the runner

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::{E2eError, E2eResult};
use crate::runner::{RunnerConfig, ScenarioFilter, UPDATE_SNAPSHOTS_ENV};
use crate::scenario::Group;
use crate::script::Browser;
use crate::target::{BASE_URL_ENV, DEFAULT_BASE_URL};

#[derive(Parser, Debug, Clone)]
#[command(name = "slidedeck-e2e")]
#[command(about = "Browser E2E suite for the slide presentation app")]
pub struct CliArgs {
    /// Base URL of the running deck
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Run only these groups (repeatable): smoke, unit, integration, end-to-end,
    /// visual-regression, accessibility, performance
    #[arg(short, long)]
    pub group: Vec<String>,

    /// Run only the scenario with this name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Directory with extra YAML scenarios
    #[arg(short, long)]
    pub scenarios: Option<PathBuf>,

    /// Overwrite visual baselines with the new screenshots
    #[arg(long, env = UPDATE_SNAPSHOTS_ENV)]
    pub update_snapshots: bool,

    /// Directory holding the visual baselines
    #[arg(long, default_value = "tests/baselines")]
    pub baseline_dir: PathBuf,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    pub browser: String,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Scenarios running at once
    #[arg(short, long, default_value = "1")]
    pub workers: usize,

    /// Default differing-pixel budget for visual comparisons
    #[arg(long, default_value = "500")]
    pub max_diff_pixels: u64,

    /// Per-scenario timeout in seconds
    #[arg(long, default_value = "120")]
    pub scenario_timeout: u64,

    /// `node_modules` directory providing the playwright package
    #[arg(long, default_value = "node_modules")]
    pub node_modules: PathBuf,

    /// Output directory for results
    #[arg(short, long, default_value = "test-results")]
    pub output: PathBuf,

    /// Do not check that the deck answers before launching browsers
    #[arg(long)]
    pub skip_probe: bool,

    /// List the selected scenarios and exit
    #[arg(long)]
    pub list: bool,
}

impl CliArgs {
    /// Scenario selection from `--group` and `--name`
    pub fn filter(&self) -> E2eResult<ScenarioFilter> {
        let groups = self
            .group
            .iter()
            .map(|g| g.parse::<Group>())
            .collect::<E2eResult<Vec<_>>>()?;

        Ok(ScenarioFilter {
            groups,
            name: self.name.clone(),
        })
    }

    pub fn runner_config(&self) -> E2eResult<RunnerConfig> {
        let browser = Browser::from_name(&self.browser)
            .ok_or_else(|| E2eError::Playwright(format!("unsupported browser: {}", self.browser)))?;

        let mut config = RunnerConfig::default();
        config.set_base_url(&self.base_url);

        config.playwright.browser = browser;
        config.playwright.headless = !self.headed;
        config.playwright.scenario_timeout = Duration::from_secs(self.scenario_timeout);
        config.playwright.node_modules = self.node_modules.clone();

        config.visual.baseline_dir = self.baseline_dir.clone();
        config.visual.actual_dir = self.output.join("screenshots");
        config.visual.diff_dir = self.output.join("diffs");
        config.visual.max_diff_pixels = self.max_diff_pixels;
        config.visual.update_baselines = self.update_snapshots;

        config.scenarios_dir = self.scenarios.clone();
        config.output_dir = self.output.clone();
        config.workers = self.workers.max(1);
        config.probe_target = !self.skip_probe;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_map_onto_runner_config() {
        let args = CliArgs::parse_from([
            "slidedeck-e2e",
            "--base-url",
            "http://localhost:5173/",
            "--group",
            "smoke",
            "--group",
            "a11y",
            "--headed",
            "--workers",
            "3",
            "--max-diff-pixels",
            "50",
            "--output",
            "out",
            "--skip-probe",
        ]);

        let filter = args.filter().unwrap();
        assert_eq!(filter.groups, vec![Group::Smoke, Group::Accessibility]);
        assert!(filter.name.is_none());

        let config = args.runner_config().unwrap();
        assert_eq!(config.playwright.base_url, "http://localhost:5173");
        assert_eq!(config.target.base_url, "http://localhost:5173");
        assert!(!config.playwright.headless);
        assert!(!config.probe_target);
        assert_eq!(config.workers, 3);
        assert_eq!(config.visual.max_diff_pixels, 50);
        assert_eq!(config.visual.actual_dir, PathBuf::from("out/screenshots"));
        assert_eq!(config.visual.diff_dir, PathBuf::from("out/diffs"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_zero_workers_runs_one_at_a_time() {
        let args = CliArgs::parse_from(["slidedeck-e2e", "--workers", "0", "--browser", "webkit"]);
        let config = args.runner_config().unwrap();
        assert_eq!(config.workers, 1);
        assert_eq!(config.playwright.browser, Browser::Webkit);
    }

    #[test]
    fn test_unknown_group_is_rejected() {
        let args = CliArgs::parse_from(["slidedeck-e2e", "--group", "load"]);
        assert!(matches!(args.filter(), Err(E2eError::UnknownGroup(_))));
    }

    #[test]
    fn test_unknown_browser_is_rejected() {
        let args = CliArgs::parse_from(["slidedeck-e2e", "--browser", "lynx"]);
        assert!(matches!(args.runner_config(), Err(E2eError::Playwright(_))));
    }
}
