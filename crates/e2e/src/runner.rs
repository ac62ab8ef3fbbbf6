//! Suite runner: filters scenarios, runs them in isolated browsers and aggregates results

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::driver::{PlaywrightConfig, PlaywrightDriver, StepResult};
use crate::error::{E2eError, E2eResult};
use crate::scenario::{Group, Scenario};
use crate::suites;
use crate::target::{TargetApp, TargetConfig};
use crate::visual::{VisualConfig, VisualTester};

/// Environment variable switching visual scenarios to baseline update mode
pub const UPDATE_SNAPSHOTS_ENV: &str = "UPDATE_SNAPSHOTS";

/// Environment variable setting the number of parallel scenarios
pub const WORKERS_ENV: &str = "E2E_WORKERS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    Passed,
    Failed,
    Skipped,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub group: Group,
    pub status: ScenarioStatus,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    pub visual_diffs: Vec<VisualDiffResult>,
    pub error: Option<String>,
}

impl ScenarioResult {
    fn errored(scenario: &Scenario, error: String) -> Self {
        Self {
            name: scenario.name.clone(),
            group: scenario.group,
            status: ScenarioStatus::Failed,
            duration_ms: 0,
            steps: vec![],
            visual_diffs: vec![],
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualDiffResult {
    pub name: String,
    pub matches: bool,
    pub diff_pixels: u64,
    pub max_diff_pixels: u64,
    pub baseline_written: bool,
    pub diff_image_path: Option<String>,
}

/// Result of running a set of scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

impl SuiteReport {
    pub fn from_results(
        base_url: &str,
        started_at: DateTime<Utc>,
        duration: Duration,
        results: Vec<ScenarioResult>,
    ) -> Self {
        let count = |status: ScenarioStatus| results.iter().filter(|r| r.status == status).count();
        Self {
            base_url: base_url.to_string(),
            started_at,
            total: results.len(),
            passed: count(ScenarioStatus::Passed),
            failed: count(ScenarioStatus::Failed),
            skipped: count(ScenarioStatus::Skipped),
            duration_ms: duration.as_millis() as u64,
            results,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Which scenarios to run
#[derive(Debug, Clone, Default)]
pub struct ScenarioFilter {
    pub groups: Vec<Group>,
    pub name: Option<String>,
}

impl ScenarioFilter {
    pub fn matches(&self, scenario: &Scenario) -> bool {
        let group_ok = self.groups.is_empty() || self.groups.contains(&scenario.group);
        let name_ok = self
            .name
            .as_deref()
            .map(|n| scenario.name == n)
            .unwrap_or(true);
        group_ok && name_ok
    }

    /// Apply the filter; naming a scenario that does not exist is an error
    pub fn apply(&self, scenarios: Vec<Scenario>) -> E2eResult<Vec<Scenario>> {
        let selected: Vec<Scenario> = scenarios.into_iter().filter(|s| self.matches(s)).collect();
        match &self.name {
            Some(name) if selected.is_empty() => Err(E2eError::ScenarioNotFound(name.clone())),
            _ => Ok(selected),
        }
    }
}

/// Configuration for the runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub target: TargetConfig,
    pub playwright: PlaywrightConfig,
    pub visual: VisualConfig,

    /// Directory with extra YAML scenarios, appended to the built-in suites
    pub scenarios_dir: Option<PathBuf>,

    pub output_dir: PathBuf,

    /// Scenarios running at once, each in its own browser
    pub workers: usize,

    /// Check that the deck answers before launching browsers
    pub probe_target: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            playwright: PlaywrightConfig::default(),
            visual: VisualConfig::default(),
            scenarios_dir: None,
            output_dir: PathBuf::from("test-results"),
            workers: 1,
            probe_target: true,
        }
    }
}

impl RunnerConfig {
    /// Defaults with `BASE_URL`, `UPDATE_SNAPSHOTS` and `E2E_WORKERS` applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.set_base_url(&crate::target::base_url_from_env());

        if let Ok(v) = std::env::var(UPDATE_SNAPSHOTS_ENV) {
            config.visual.update_baselines = matches!(v.trim(), "1" | "true" | "yes");
        }

        if let Some(workers) = std::env::var(WORKERS_ENV).ok().and_then(|v| v.trim().parse().ok()) {
            config.workers = workers;
        }

        config
    }

    /// Point both the probe and the browser at `base_url`
    pub fn set_base_url(&mut self, base_url: &str) {
        let base_url = base_url.trim_end_matches('/').to_string();
        self.target.base_url = base_url.clone();
        self.playwright.base_url = base_url;
    }
}

/// Main E2E runner
pub struct SuiteRunner {
    config: RunnerConfig,
}

impl SuiteRunner {
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::from_env())
    }

    pub fn with_config(mut config: RunnerConfig) -> Self {
        // screenshots land where the visual tester looks for them
        config.playwright.screenshot_dir = config.visual.actual_dir.clone();
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Built-in suites plus any YAML scenarios
    pub fn load_scenarios(&self) -> E2eResult<Vec<Scenario>> {
        let mut scenarios = suites::all();
        if let Some(dir) = &self.config.scenarios_dir {
            let extra = Scenario::load_all(dir)?;
            info!("Loaded {} scenario(s) from {}", extra.len(), dir.display());
            scenarios.extend(extra);
        }
        Ok(scenarios)
    }

    /// Run every scenario selected by `filter`
    pub async fn run(&self, filter: &ScenarioFilter) -> E2eResult<SuiteReport> {
        let scenarios = filter.apply(self.load_scenarios()?)?;
        self.run_scenarios(scenarios).await
    }

    pub async fn run_scenarios(&self, scenarios: Vec<Scenario>) -> E2eResult<SuiteReport> {
        let started_at = Utc::now();
        let start = Instant::now();

        if self.config.probe_target {
            TargetApp::probe(&self.config.target).await?;
        }

        let driver = Arc::new(PlaywrightDriver::new(self.config.playwright.clone())?);
        let visual = Arc::new(VisualTester::new(self.config.visual.clone())?);
        let workers = self.config.workers.max(1);
        let permits = Arc::new(Semaphore::new(workers));

        info!("Running {} scenario(s) with {} worker(s)...", scenarios.len(), workers);

        let mut tasks = JoinSet::new();
        for (index, scenario) in scenarios.iter().cloned().enumerate() {
            let driver = Arc::clone(&driver);
            let visual = Arc::clone(&visual);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        let result = ScenarioResult::errored(&scenario, "worker pool closed".to_string());
                        return (index, result);
                    }
                };
                let result = match run_scenario(&driver, &visual, &scenario).await {
                    Ok(result) => result,
                    Err(e) => ScenarioResult::errored(&scenario, e.to_string()),
                };
                (index, result)
            });
        }

        let mut slots: Vec<Option<ScenarioResult>> = vec![None; scenarios.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => {
                    log_result(&result);
                    slots[index] = Some(result);
                }
                Err(e) => error!("Scenario task panicked: {}", e),
            }
        }

        let results: Vec<ScenarioResult> = slots
            .into_iter()
            .zip(&scenarios)
            .map(|(slot, scenario)| {
                slot.unwrap_or_else(|| {
                    ScenarioResult::errored(scenario, "scenario task did not complete".to_string())
                })
            })
            .collect();

        let report = SuiteReport::from_results(
            &self.config.playwright.base_url,
            started_at,
            start.elapsed(),
            results,
        );

        info!(
            "Results: {} passed, {} failed, {} skipped ({} ms)",
            report.passed, report.failed, report.skipped, report.duration_ms
        );

        Ok(report)
    }

    /// Write the report to `<output_dir>/test-results.json`
    pub fn write_results(&self, report: &SuiteReport) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

impl Default for SuiteRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one scenario and compare its screenshots when it is a visual one
async fn run_scenario(
    driver: &PlaywrightDriver,
    visual: &VisualTester,
    scenario: &Scenario,
) -> E2eResult<ScenarioResult> {
    let start = Instant::now();
    debug!("Running scenario: {}", scenario.name);

    let run = driver.run(scenario).await?;
    let mut failures: Vec<String> = run.error.iter().cloned().collect();
    if failures.is_empty() && !run.success() {
        failures.push("script did not finish".to_string());
    }

    let mut missing_baselines = Vec::new();
    let mut visual_diffs = Vec::new();
    if let Some(expectation) = scenario.visual.filter(|_| failures.is_empty()) {
        for shot in &run.screenshots {
            match visual.compare(&shot.name, Some(expectation.max_diff_pixels)) {
                Ok(diff) => {
                    if !diff.matches {
                        failures.push(
                            E2eError::ScreenshotMismatch {
                                name: shot.name.clone(),
                                diff_pixels: diff.diff_pixels,
                                max_diff_pixels: expectation.max_diff_pixels,
                            }
                            .to_string(),
                        );
                    }
                    visual_diffs.push(VisualDiffResult {
                        name: shot.name.clone(),
                        matches: diff.matches,
                        diff_pixels: diff.diff_pixels,
                        max_diff_pixels: expectation.max_diff_pixels,
                        baseline_written: diff.baseline_written,
                        diff_image_path: diff
                            .diff_image_path
                            .map(|p| p.to_string_lossy().to_string()),
                    });
                }
                Err(E2eError::BaselineNotFound(path)) => {
                    warn!(
                        "No baseline for '{}' at {} - run with --update-snapshots to create it",
                        shot.name, path
                    );
                    missing_baselines.push(shot.name.clone());
                }
                Err(e) => failures.push(format!("Visual comparison error: {}", e)),
            }
        }
    }

    // A failure anywhere wins over missing baselines
    let (status, error) = if !failures.is_empty() {
        (ScenarioStatus::Failed, Some(failures.join("; ")))
    } else if !missing_baselines.is_empty() {
        (
            ScenarioStatus::Skipped,
            Some(format!("baseline missing for '{}'", missing_baselines.join("', '"))),
        )
    } else {
        (ScenarioStatus::Passed, None)
    };

    Ok(ScenarioResult {
        name: scenario.name.clone(),
        group: scenario.group,
        status,
        duration_ms: start.elapsed().as_millis() as u64,
        steps: run.steps,
        visual_diffs,
        error,
    })
}

fn log_result(result: &ScenarioResult) {
    match result.status {
        ScenarioStatus::Passed => info!("✓ [{}] {} ({} ms)", result.group, result.name, result.duration_ms),
        ScenarioStatus::Skipped => warn!(
            "- [{}] {} skipped: {}",
            result.group,
            result.name,
            result.error.as_deref().unwrap_or("no reason given")
        ),
        ScenarioStatus::Failed => error!(
            "✗ [{}] {} - {}",
            result.group,
            result.name,
            result.error.as_deref().unwrap_or("unknown error")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Step;

    fn result(name: &str, status: ScenarioStatus) -> ScenarioResult {
        ScenarioResult {
            name: name.to_string(),
            group: Group::Smoke,
            status,
            duration_ms: 1,
            steps: vec![],
            visual_diffs: vec![],
            error: None,
        }
    }

    #[test]
    fn test_report_counts() {
        let report = SuiteReport::from_results(
            "http://localhost:8080",
            Utc::now(),
            Duration::from_millis(42),
            vec![
                result("a", ScenarioStatus::Passed),
                result("b", ScenarioStatus::Failed),
                result("c", ScenarioStatus::Skipped),
                result("d", ScenarioStatus::Passed),
            ],
        );
        assert_eq!((report.total, report.passed, report.failed, report.skipped), (4, 2, 1, 1));
        assert!(!report.success());
        assert_eq!(report.duration_ms, 42);
    }

    #[test]
    fn test_filter_by_group() {
        let filter = ScenarioFilter {
            groups: vec![Group::Performance],
            name: None,
        };
        let selected = filter.apply(suites::all()).unwrap();
        assert!(!selected.is_empty());
        assert!(selected.iter().all(|s| s.group == Group::Performance));
    }

    #[test]
    fn test_filter_unknown_name() {
        let filter = ScenarioFilter {
            groups: vec![],
            name: Some("does-not-exist".to_string()),
        };
        assert!(matches!(
            filter.apply(suites::all()),
            Err(E2eError::ScenarioNotFound(_))
        ));
    }

    #[test]
    fn test_screenshots_follow_visual_actual_dir() {
        let mut config = RunnerConfig::default();
        config.visual.actual_dir = PathBuf::from("/tmp/actual");
        config.set_base_url("http://localhost:5173/");
        let runner = SuiteRunner::with_config(config);
        assert_eq!(runner.config().playwright.screenshot_dir, PathBuf::from("/tmp/actual"));
        assert_eq!(runner.config().playwright.base_url, "http://localhost:5173");
        assert_eq!(runner.config().target.base_url, "http://localhost:5173");
    }

    #[test]
    fn test_report_serializes_group_names() {
        let report = SuiteReport::from_results(
            "http://localhost:8080",
            Utc::now(),
            Duration::ZERO,
            vec![result("a", ScenarioStatus::Passed)],
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["results"][0]["group"], "smoke");
        assert_eq!(json["results"][0]["status"], "passed");
    }

    /// Stand-in for `node` that answers the Playwright check and replays `events`
    #[cfg(unix)]
    fn fake_node(dir: &std::path::Path, events: &[&str]) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let mut body = String::from("#!/bin/sh\nif [ \"$1\" = \"-e\" ]; then exit 0; fi\n");
        for event in events {
            body.push_str(&format!("echo '@@e2e {}'\n", event));
        }
        let path = dir.join("fake-node");
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    async fn run_visual(
        dir: &std::path::Path,
        shots: &[(&str, Option<bool>)],
    ) -> ScenarioResult {
        use image::{Rgba, RgbaImage};

        let visual = VisualTester::new(VisualConfig {
            baseline_dir: dir.join("baselines"),
            actual_dir: dir.join("actual"),
            diff_dir: dir.join("diffs"),
            ..Default::default()
        })
        .unwrap();

        // Some(true): baseline identical, Some(false): every pixel differs, None: no baseline
        let mut events = Vec::new();
        let mut scenario = Scenario::new(Group::VisualRegression, "key-section-snapshots").visual(500);
        for (name, baseline) in shots {
            let actual = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
            actual.save(visual.actual_path(name)).unwrap();
            match baseline {
                Some(true) => actual.save(visual.baseline_path(name)).unwrap(),
                Some(false) => RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]))
                    .save(visual.baseline_path(name))
                    .unwrap(),
                None => {}
            }
            scenario = scenario.step(Step::Screenshot {
                name: name.to_string(),
                full_page: true,
            });
            events.push(format!(
                r#"{{"event":"screenshot","name":"{}","path":"{}"}}"#,
                name,
                visual.actual_path(name).display()
            ));
        }
        events.push(r#"{"event":"done"}"#.to_string());

        let event_refs: Vec<&str> = events.iter().map(String::as_str).collect();
        let driver = PlaywrightDriver::new(PlaywrightConfig {
            node_binary: fake_node(dir, &event_refs),
            node_modules: dir.join("no-node-modules"),
            screenshot_dir: dir.join("actual"),
            ..Default::default()
        })
        .unwrap();

        run_scenario(&driver, &visual, &scenario).await.unwrap()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_mismatch_after_missing_baseline_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_visual(
            dir.path(),
            &[("section-1-intro", None), ("section-6-methods", Some(false))],
        )
        .await;

        assert_eq!(result.status, ScenarioStatus::Failed);
        let error = result.error.unwrap();
        assert!(error.contains("section-6-methods"), "{}", error);
        assert!(error.contains("10000"), "{}", error);
        assert_eq!(result.visual_diffs.len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_baseline_alone_skips() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_visual(
            dir.path(),
            &[("section-1-intro", None), ("section-6-methods", Some(true))],
        )
        .await;

        assert_eq!(result.status, ScenarioStatus::Skipped);
        assert_eq!(
            result.error.as_deref(),
            Some("baseline missing for 'section-1-intro'")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_matching_shots_pass() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_visual(
            dir.path(),
            &[("homepage-intro", Some(true)), ("section-14-end", Some(true))],
        )
        .await;

        assert_eq!(result.status, ScenarioStatus::Passed);
        assert!(result.error.is_none());
        assert!(result.visual_diffs.iter().all(|d| d.matches));
    }
}
