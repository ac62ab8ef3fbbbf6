//! Scenarios: named, grouped step sequences, optionally loaded from YAML

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};
use crate::step::Step;

/// Differing pixels tolerated by a visual scenario unless it says otherwise
pub const DEFAULT_MAX_DIFF_PIXELS: u64 = 500;

/// Suite a scenario belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Group {
    Smoke,
    Unit,
    Integration,
    EndToEnd,
    VisualRegression,
    Accessibility,
    Performance,
}

impl Group {
    pub const ALL: [Group; 7] = [
        Group::Smoke,
        Group::Unit,
        Group::Integration,
        Group::EndToEnd,
        Group::VisualRegression,
        Group::Accessibility,
        Group::Performance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Group::Smoke => "smoke",
            Group::Unit => "unit",
            Group::Integration => "integration",
            Group::EndToEnd => "end-to-end",
            Group::VisualRegression => "visual-regression",
            Group::Accessibility => "accessibility",
            Group::Performance => "performance",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Group {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        match wanted.as_str() {
            "e2e" => Ok(Group::EndToEnd),
            "visual" => Ok(Group::VisualRegression),
            "a11y" => Ok(Group::Accessibility),
            other => Group::ALL
                .into_iter()
                .find(|g| g.as_str() == other)
                .ok_or_else(|| E2eError::UnknownGroup(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport { width: 1280, height: 720 }
    }
}

/// Screenshot comparison settings for a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualExpectation {
    #[serde(default = "default_max_diff_pixels")]
    pub max_diff_pixels: u64,
}

fn default_max_diff_pixels() -> u64 {
    DEFAULT_MAX_DIFF_PIXELS
}

impl Default for VisualExpectation {
    fn default() -> Self {
        Self { max_diff_pixels: DEFAULT_MAX_DIFF_PIXELS }
    }
}

/// A complete scenario: one isolated browser page running `steps` in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique name within the suite
    pub name: String,

    pub group: Group,

    #[serde(default)]
    pub description: String,

    /// Overrides the runner's viewport when set
    #[serde(default)]
    pub viewport: Option<Viewport>,

    pub steps: Vec<Step>,

    /// Present when screenshots taken by this scenario are compared to baselines
    #[serde(default)]
    pub visual: Option<VisualExpectation>,
}

impl Scenario {
    pub fn new(group: Group, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group,
            description: String::new(),
            viewport: None,
            steps: Vec::new(),
            visual: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Some(Viewport { width, height });
        self
    }

    pub fn visual(mut self, max_diff_pixels: u64) -> Self {
        self.visual = Some(VisualExpectation { max_diff_pixels });
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Names of the screenshots this scenario captures, in order
    pub fn screenshot_names(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                Step::Screenshot { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Parse a scenario from YAML
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        serde_yaml::from_str(yaml).map_err(E2eError::from)
    }

    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| {
            E2eError::ScenarioParse(format!("{}: {}", path.display(), e))
        })
    }

    /// Load every `*.yaml` / `*.yml` scenario below `dir`, sorted by path
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut paths: Vec<_> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .map(|e| e.into_path())
            .collect();
        paths.sort();

        paths.iter().map(|p| Self::from_file(p)).collect()
    }
}
