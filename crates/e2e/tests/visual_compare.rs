//! Baseline comparison through the public visual API

use image::{Rgba, RgbaImage};

use slidedeck_e2e::visual::{VisualConfig, VisualTester};
use slidedeck_e2e::E2eError;

fn tester(root: &std::path::Path, update: bool) -> VisualTester {
    VisualTester::new(VisualConfig {
        baseline_dir: root.join("baselines"),
        actual_dir: root.join("screenshots"),
        diff_dir: root.join("diffs"),
        update_baselines: update,
        ..Default::default()
    })
    .unwrap()
}

fn screenshot(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            Rgba([20, 20, 30, 255])
        } else {
            Rgba([240, 240, 245, 255])
        }
    })
}

#[test]
fn first_run_then_update_then_compare() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let name = "section-10-tools";

    let compare = tester(dir.path(), false);
    screenshot(128, 72).save(compare.actual_path(name))?;
    assert!(matches!(
        compare.compare(name, None),
        Err(E2eError::BaselineNotFound(_))
    ));

    let update = tester(dir.path(), true);
    let written = update.compare(name, None)?;
    assert!(written.baseline_written);

    let diff = compare.compare(name, None)?;
    assert!(diff.matches);
    assert_eq!(diff.diff_pixels, 0);
    assert_eq!(diff.actual_hash, diff.baseline_hash);
    Ok(())
}

#[test]
fn layout_shift_beyond_budget_is_reported() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let t = tester(dir.path(), false);
    let name = "homepage-intro";

    screenshot(128, 72).save(t.baseline_path(name))?;

    let mut shifted = screenshot(128, 72);
    for y in 0..72 {
        for x in 0..16 {
            shifted.put_pixel(x, y, Rgba([255, 0, 255, 255]));
        }
    }
    shifted.save(t.actual_path(name))?;

    let diff = t.compare(name, Some(500))?;
    assert!(!diff.matches);
    assert!(diff.diff_pixels > 500);
    assert!(diff.diff_percent() > 0.0);
    assert!(diff.diff_image_path.as_ref().map(|p| p.exists()).unwrap_or(false));

    t.clean_diffs()?;
    assert!(!diff.diff_image_path.unwrap().exists());
    Ok(())
}
