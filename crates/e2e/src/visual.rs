//! Visual regression testing with screenshot comparison

use std::path::{Path, PathBuf};

use image::{Pixel, RgbaImage};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};

/// Result of a visual comparison
#[derive(Debug, Clone)]
pub struct VisualDiff {
    /// Whether the images match (within the pixel budget)
    pub matches: bool,

    /// Number of different pixels
    pub diff_pixels: u64,

    /// Pixels in the larger of the two images
    pub total_pixels: u64,

    /// Path to the diff image (if generated)
    pub diff_image_path: Option<PathBuf>,

    /// Baseline was written from the actual screenshot during this comparison
    pub baseline_written: bool,

    pub actual_hash: String,
    pub baseline_hash: String,
}

impl VisualDiff {
    pub fn diff_percent(&self) -> f64 {
        if self.total_pixels == 0 {
            0.0
        } else {
            self.diff_pixels as f64 / self.total_pixels as f64 * 100.0
        }
    }
}

/// Configuration for visual testing
#[derive(Debug, Clone)]
pub struct VisualConfig {
    pub baseline_dir: PathBuf,
    pub actual_dir: PathBuf,
    pub diff_dir: PathBuf,

    /// Differing pixels tolerated when a scenario does not set its own budget
    pub max_diff_pixels: u64,

    /// Per-channel difference below which two pixels count as equal
    pub channel_tolerance: u8,

    /// Overwrite baselines with the actual screenshots instead of comparing
    pub update_baselines: bool,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            baseline_dir: PathBuf::from("tests/baselines"),
            actual_dir: PathBuf::from("test-results/screenshots"),
            diff_dir: PathBuf::from("test-results/diffs"),
            max_diff_pixels: crate::scenario::DEFAULT_MAX_DIFF_PIXELS,
            channel_tolerance: 5,
            update_baselines: false,
        }
    }
}

/// Visual regression testing utilities
pub struct VisualTester {
    config: VisualConfig,
}

impl VisualTester {
    pub fn new(config: VisualConfig) -> E2eResult<Self> {
        std::fs::create_dir_all(&config.baseline_dir)?;
        std::fs::create_dir_all(&config.actual_dir)?;
        std::fs::create_dir_all(&config.diff_dir)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &VisualConfig {
        &self.config
    }

    pub fn baseline_path(&self, name: &str) -> PathBuf {
        self.config.baseline_dir.join(format!("{}.png", name))
    }

    pub fn actual_path(&self, name: &str) -> PathBuf {
        self.config.actual_dir.join(format!("{}.png", name))
    }

    /// Compare the actual screenshot `name` against its baseline.
    ///
    /// In update mode the baseline is replaced and the comparison passes.
    /// Without a baseline and outside update mode this returns
    /// [`E2eError::BaselineNotFound`].
    pub fn compare(&self, name: &str, max_diff_pixels: Option<u64>) -> E2eResult<VisualDiff> {
        let max_diff_pixels = max_diff_pixels.unwrap_or(self.config.max_diff_pixels);
        let actual_path = self.actual_path(name);
        let baseline_path = self.baseline_path(name);

        if !actual_path.exists() {
            return Err(E2eError::VisualRegression(format!(
                "Actual screenshot not found: {}",
                actual_path.display()
            )));
        }

        if self.config.update_baselines {
            self.update_baseline(name)?;
            let hash = hash_file(&baseline_path)?;
            return Ok(VisualDiff {
                matches: true,
                diff_pixels: 0,
                total_pixels: 0,
                diff_image_path: None,
                baseline_written: true,
                actual_hash: hash.clone(),
                baseline_hash: hash,
            });
        }

        if !baseline_path.exists() {
            return Err(E2eError::BaselineNotFound(baseline_path.to_string_lossy().to_string()));
        }

        let actual_hash = hash_file(&actual_path)?;
        let baseline_hash = hash_file(&baseline_path)?;

        if actual_hash == baseline_hash {
            debug!("Screenshots match exactly (same hash)");
            // header only, the pixels are never decoded
            let total_pixels = image::image_dimensions(&actual_path)
                .map(|(w, h)| u64::from(w) * u64::from(h))
                .unwrap_or(0);
            return Ok(VisualDiff {
                matches: true,
                diff_pixels: 0,
                total_pixels,
                diff_image_path: None,
                baseline_written: false,
                actual_hash,
                baseline_hash,
            });
        }

        let actual = image::open(&actual_path)?.to_rgba8();
        let baseline = image::open(&baseline_path)?.to_rgba8();

        if actual.dimensions() != baseline.dimensions() {
            warn!(
                "Screenshot dimensions differ for '{}': actual {:?} vs baseline {:?}",
                name,
                actual.dimensions(),
                baseline.dimensions()
            );
        }

        let (diff_img, diff_pixels) = diff_images(&actual, &baseline, self.config.channel_tolerance);
        let total_pixels = u64::from(diff_img.width()) * u64::from(diff_img.height());
        let matches = diff_pixels <= max_diff_pixels;

        let diff_image_path = if diff_pixels > 0 {
            let path = self.config.diff_dir.join(format!("{}-diff.png", name));
            diff_img.save(&path)?;
            Some(path)
        } else {
            None
        };

        if !matches {
            warn!(
                "Visual regression detected in '{}': {} pixels differ (max: {})",
                name, diff_pixels, max_diff_pixels
            );
        }

        Ok(VisualDiff {
            matches,
            diff_pixels,
            total_pixels,
            diff_image_path,
            baseline_written: false,
            actual_hash,
            baseline_hash,
        })
    }

    /// Update the baseline with the actual screenshot
    pub fn update_baseline(&self, name: &str) -> E2eResult<()> {
        let actual_path = self.actual_path(name);
        if !actual_path.exists() {
            return Err(E2eError::VisualRegression(format!(
                "Cannot update baseline: actual screenshot not found: {}",
                actual_path.display()
            )));
        }

        std::fs::copy(&actual_path, self.baseline_path(name))?;
        info!("Updated baseline for '{}'", name);
        Ok(())
    }

    /// List all baselines
    pub fn list_baselines(&self) -> E2eResult<Vec<String>> {
        let mut baselines = Vec::new();

        for entry in std::fs::read_dir(&self.config.baseline_dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "png").unwrap_or(false) {
                if let Some(name) = path.file_stem() {
                    baselines.push(name.to_string_lossy().to_string());
                }
            }
        }

        baselines.sort();
        Ok(baselines)
    }

    /// Remove diff images left by a previous run
    pub fn clean_diffs(&self) -> E2eResult<()> {
        for entry in std::fs::read_dir(&self.config.diff_dir)? {
            let path = entry?.path();
            if path.is_file() {
                std::fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

/// Pixel-by-pixel comparison over the union of both canvases.
///
/// Pixels outside the overlap always count as different. Differences are
/// painted red on a dimmed copy of the actual image.
pub fn diff_images(actual: &RgbaImage, baseline: &RgbaImage, tolerance: u8) -> (RgbaImage, u64) {
    let width = actual.width().max(baseline.width());
    let height = actual.height().max(baseline.height());
    let mut diff_img = RgbaImage::new(width, height);
    let mut diff_pixels = 0u64;

    for y in 0..height {
        for x in 0..width {
            let a = actual.get_pixel_checked(x, y);
            let b = baseline.get_pixel_checked(x, y);

            match (a, b) {
                (Some(a), Some(b)) if !pixels_differ(a, b, tolerance) => {
                    let c = a.channels();
                    diff_img.put_pixel(x, y, image::Rgba([c[0] / 2, c[1] / 2, c[2] / 2, 128]));
                }
                _ => {
                    diff_pixels += 1;
                    diff_img.put_pixel(x, y, image::Rgba([255, 0, 0, 255]));
                }
            }
        }
    }

    (diff_img, diff_pixels)
}

fn pixels_differ(a: &image::Rgba<u8>, b: &image::Rgba<u8>, tolerance: u8) -> bool {
    a.channels()
        .iter()
        .zip(b.channels())
        .any(|(x, y)| x.abs_diff(*y) > tolerance)
}

fn hash_file(path: &Path) -> E2eResult<String> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, image::Rgba(rgba))
    }

    fn tester(dir: &Path, update: bool) -> VisualTester {
        VisualTester::new(VisualConfig {
            baseline_dir: dir.join("baselines"),
            actual_dir: dir.join("actual"),
            diff_dir: dir.join("diffs"),
            update_baselines: update,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_visual_config_default() {
        let config = VisualConfig::default();
        assert_eq!(config.max_diff_pixels, 500);
        assert!(!config.update_baselines);
    }

    #[test]
    fn test_small_color_noise_is_tolerated() {
        let a = solid(4, 4, [100, 100, 100, 255]);
        let b = solid(4, 4, [104, 97, 100, 255]);
        let (_, diff) = diff_images(&a, &b, 5);
        assert_eq!(diff, 0);
    }

    #[test]
    fn test_size_mismatch_counts_uncovered_pixels() {
        let a = solid(10, 10, [0, 0, 0, 255]);
        let b = solid(10, 8, [0, 0, 0, 255]);
        let (img, diff) = diff_images(&a, &b, 5);
        assert_eq!(diff, 20);
        assert_eq!(img.dimensions(), (10, 10));
    }

    #[test]
    fn test_compare_within_budget() {
        let dir = tempfile::tempdir().unwrap();
        let t = tester(dir.path(), false);

        let baseline = solid(40, 40, [255, 255, 255, 255]);
        let mut actual = baseline.clone();
        for x in 0..20 {
            actual.put_pixel(x, 0, image::Rgba([0, 0, 0, 255]));
        }
        baseline.save(t.baseline_path("homepage-intro")).unwrap();
        actual.save(t.actual_path("homepage-intro")).unwrap();

        let diff = t.compare("homepage-intro", Some(500)).unwrap();
        assert!(diff.matches);
        assert_eq!(diff.diff_pixels, 20);
        assert!(diff.diff_image_path.unwrap().exists());

        let strict = t.compare("homepage-intro", Some(10)).unwrap();
        assert!(!strict.matches);
    }

    #[test]
    fn test_missing_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let t = tester(dir.path(), false);
        solid(2, 2, [0, 0, 0, 255]).save(t.actual_path("section-6-methods")).unwrap();

        let err = t.compare("section-6-methods", None).unwrap_err();
        assert!(matches!(err, E2eError::BaselineNotFound(_)));
    }

    #[test]
    fn test_update_mode_writes_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let t = tester(dir.path(), true);
        solid(2, 2, [9, 9, 9, 255]).save(t.actual_path("section-14-end")).unwrap();

        let diff = t.compare("section-14-end", None).unwrap();
        assert!(diff.matches && diff.baseline_written);
        assert_eq!(t.list_baselines().unwrap(), vec!["section-14-end".to_string()]);
    }

    #[test]
    fn test_identical_files_skip_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let t = tester(dir.path(), false);
        // not a decodable PNG, so only the hash path can accept it
        std::fs::write(t.actual_path("section-10-tools"), b"same bytes").unwrap();
        std::fs::write(t.baseline_path("section-10-tools"), b"same bytes").unwrap();

        let diff = t.compare("section-10-tools", None).unwrap();
        assert!(diff.matches);
        assert_eq!(diff.diff_pixels, 0);
        assert_eq!(diff.total_pixels, 0);
        assert!(diff.diff_image_path.is_none());
    }

    #[test]
    fn test_missing_actual_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let t = tester(dir.path(), false);
        assert!(matches!(
            t.compare("nothing", None),
            Err(E2eError::VisualRegression(_))
        ));
    }
}
