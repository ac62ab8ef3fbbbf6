//! Playwright browser automation through generated Node.js scripts

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::process::Command as TokioCommand;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::scenario::{Scenario, Viewport};
use crate::script::{Browser, ScriptBuilder, ScriptOptions, EVENT_PREFIX};

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub base_url: String,
    pub screenshot_dir: PathBuf,
    pub viewport: Viewport,
    pub browser: Browser,
    pub headless: bool,

    /// Polling budget of a single expectation
    pub expect_timeout_ms: u64,

    /// Hard cap on one scenario's script, including browser startup
    pub scenario_timeout: Duration,

    /// Node executable
    pub node_binary: PathBuf,

    /// `node_modules` directory that provides the `playwright` package
    pub node_modules: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: crate::target::DEFAULT_BASE_URL.to_string(),
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            viewport: Viewport::default(),
            browser: Browser::Chromium,
            headless: true,
            expect_timeout_ms: 5_000,
            scenario_timeout: Duration::from_secs(120),
            node_binary: PathBuf::from("node"),
            node_modules: PathBuf::from("node_modules"),
        }
    }
}

/// Outcome of a step as reported by the script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Passed,
    Failed,
}

/// One protocol line emitted by a generated script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    Step {
        index: usize,
        name: String,
        status: StepStatus,
        duration_ms: u64,
        #[serde(default)]
        error: Option<String>,
    },
    Screenshot {
        name: String,
        path: PathBuf,
    },
    Log {
        message: String,
    },
    Done,
    Fatal {
        error: String,
    },
}

/// Result of executing a test step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    pub step_name: String,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub screenshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedScreenshot {
    pub name: String,
    pub path: PathBuf,
}

/// Everything observed while running one scenario's script
#[derive(Debug, Clone, Default)]
pub struct ScriptRun {
    pub steps: Vec<StepResult>,
    pub screenshots: Vec<CapturedScreenshot>,
    pub logs: Vec<String>,

    /// The script reached its final `done` event
    pub completed: bool,

    /// First failure, if any
    pub error: Option<String>,
}

impl ScriptRun {
    /// Fold protocol events into a run summary
    pub fn from_events(events: Vec<ScriptEvent>) -> Self {
        let mut run = ScriptRun::default();

        for event in events {
            match event {
                ScriptEvent::Step { name, status, duration_ms, error, .. } => {
                    let success = status == StepStatus::Passed;
                    if !success && run.error.is_none() {
                        let reason = error.clone().unwrap_or_else(|| "unknown error".to_string());
                        run.error = Some(
                            E2eError::StepFailed {
                                step: name.clone(),
                                reason,
                            }
                            .to_string(),
                        );
                    }
                    run.steps.push(StepResult {
                        success,
                        step_name: name,
                        duration_ms,
                        error,
                        screenshot_path: None,
                    });
                }
                ScriptEvent::Screenshot { name, path } => {
                    if let Some(last) = run.steps.last_mut() {
                        last.screenshot_path = Some(path.clone());
                    }
                    run.screenshots.push(CapturedScreenshot { name, path });
                }
                ScriptEvent::Log { message } => run.logs.push(message),
                ScriptEvent::Done => run.completed = true,
                ScriptEvent::Fatal { error } => {
                    if run.error.is_none() {
                        run.error = Some(E2eError::Playwright(error).to_string());
                    }
                }
            }
        }

        run
    }

    pub fn success(&self) -> bool {
        self.completed && self.error.is_none()
    }
}

/// Extract protocol events from a script's stdout, ignoring unrelated output
pub fn parse_events(stdout: &str) -> Vec<ScriptEvent> {
    stdout
        .lines()
        .filter_map(|line| line.strip_prefix(EVENT_PREFIX))
        .filter_map(|payload| match serde_json::from_str(payload) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!("Ignoring malformed script event {:?}: {}", payload, e);
                None
            }
        })
        .collect()
}

/// Playwright browser handle
pub struct PlaywrightDriver {
    config: PlaywrightConfig,
}

impl PlaywrightDriver {
    /// Create a new driver after checking that Node can load Playwright
    pub fn new(config: PlaywrightConfig) -> E2eResult<Self> {
        Self::check_playwright_installed(&config)?;
        std::fs::create_dir_all(&config.screenshot_dir)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlaywrightConfig {
        &self.config
    }

    fn check_playwright_installed(config: &PlaywrightConfig) -> E2eResult<()> {
        let mut cmd = Command::new(&config.node_binary);
        cmd.args(["-e", "require.resolve('playwright')"])
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(node_path) = node_path(&config.node_modules) {
            cmd.env("NODE_PATH", node_path);
        }

        match cmd.status() {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    pub fn script_options(&self, scenario: &Scenario) -> ScriptOptions {
        ScriptOptions {
            base_url: self.config.base_url.clone(),
            browser: self.config.browser,
            headless: self.config.headless,
            viewport: scenario.viewport.unwrap_or(self.config.viewport),
            expect_timeout_ms: self.config.expect_timeout_ms,
            screenshot_dir: absolute(&self.config.screenshot_dir),
        }
    }

    /// Generate the Playwright script for a scenario
    pub fn build_script(&self, scenario: &Scenario) -> String {
        let options = self.script_options(scenario);
        ScriptBuilder::new(&options).build(scenario)
    }

    /// Run a scenario in its own browser and collect what the script reported
    pub async fn run(&self, scenario: &Scenario) -> E2eResult<ScriptRun> {
        let script = self.build_script(scenario);

        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("scenario.js");
        std::fs::write(&script_path, &script)?;

        debug!("Running Playwright script for '{}': {}", scenario.name, script_path.display());

        let mut cmd = TokioCommand::new(&self.config.node_binary);
        cmd.arg(&script_path)
            .current_dir(temp_dir.path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(node_path) = node_path(&self.config.node_modules) {
            cmd.env("NODE_PATH", node_path);
        }

        let child = cmd.spawn()?;
        let output = tokio::time::timeout(self.config.scenario_timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                E2eError::Timeout(format!(
                    "scenario '{}' after {:?}",
                    scenario.name, self.config.scenario_timeout
                ))
            })??;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let events = parse_events(&stdout);

        if events.is_empty() && !output.status.success() {
            return Err(E2eError::ScriptFailed {
                scenario: scenario.name.clone(),
                status: output.status.code().unwrap_or(-1),
                stderr: stderr.trim().to_string(),
            });
        }

        let mut run = ScriptRun::from_events(events);
        for message in &run.logs {
            info!("[{}] {}", scenario.name, message);
        }

        if !run.completed && run.error.is_none() {
            run.error = Some(format!(
                "script exited with status {:?} before finishing: {}",
                output.status.code(),
                stderr.trim()
            ));
        }

        Ok(run)
    }
}

fn node_path(node_modules: &Path) -> Option<PathBuf> {
    if node_modules.is_dir() {
        Some(absolute(node_modules))
    } else {
        None
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_STDOUT: &str = r#"
@@e2e {"event":"step","index":0,"name":"goto:/","status":"passed","duration_ms":120}
some unrelated playwright chatter
@@e2e {"event":"log","message":"timer load: 830ms"}
@@e2e {"event":"step","index":1,"name":"screenshot:homepage-intro","status":"passed","duration_ms":40}
@@e2e {"event":"screenshot","name":"homepage-intro","path":"/tmp/shots/homepage-intro.png"}
@@e2e not json at all
@@e2e {"event":"done"}
"#;

    #[test]
    fn test_parse_events_skips_noise() {
        let events = parse_events(SAMPLE_STDOUT);
        assert_eq!(events.len(), 5);
        assert_eq!(events.last(), Some(&ScriptEvent::Done));
    }

    #[test]
    fn test_successful_run() {
        let run = ScriptRun::from_events(parse_events(SAMPLE_STDOUT));
        assert!(run.success());
        assert_eq!(run.steps.len(), 2);
        assert_eq!(run.logs, vec!["timer load: 830ms".to_string()]);
        assert_eq!(run.screenshots[0].name, "homepage-intro");
        assert_eq!(
            run.steps[1].screenshot_path.as_deref(),
            Some(Path::new("/tmp/shots/homepage-intro.png"))
        );
    }

    #[test]
    fn test_failed_step_stops_run() {
        let stdout = r#"@@e2e {"event":"step","index":0,"name":"goto:/","status":"passed","duration_ms":5}
@@e2e {"event":"step","index":1,"name":"expect-disabled:Next","status":"failed","duration_ms":5000,"error":"expected Next to be disabled within 5000ms"}
"#;
        let run = ScriptRun::from_events(parse_events(stdout));
        assert!(!run.success());
        assert!(!run.completed);
        let error = run.error.unwrap();
        assert!(error.contains("expect-disabled:Next"));
        assert!(error.contains("within 5000ms"));
    }

    #[test]
    fn test_fatal_event() {
        let stdout = "@@e2e {\"event\":\"fatal\",\"error\":\"browserType.launch: Executable doesn't exist\"}\n";
        let run = ScriptRun::from_events(parse_events(stdout));
        assert!(run.error.unwrap().starts_with("Playwright error:"));
    }

    #[test]
    fn test_script_options_prefer_scenario_viewport() {
        let driver = PlaywrightDriver {
            config: PlaywrightConfig::default(),
        };
        let scenario = Scenario::new(crate::scenario::Group::VisualRegression, "v").viewport(1280, 720);
        let options = driver.script_options(&scenario);
        assert_eq!(options.viewport, Viewport { width: 1280, height: 720 });
        assert!(options.screenshot_dir.is_absolute());
    }
}
