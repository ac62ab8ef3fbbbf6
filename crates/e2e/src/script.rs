//! Compiles a scenario into a standalone Playwright script.
//!
//! The generated script launches its own browser, runs every step inside a
//! `runStep` wrapper and reports progress on stdout as one JSON object per
//! line, prefixed with [`EVENT_PREFIX`]. Expectations poll until they hold or
//! the expectation timeout elapses.

use std::fmt::Write as _;
use std::path::PathBuf;

use crate::locator::Locator;
use crate::scenario::{Scenario, Viewport};
use crate::step::Step;

/// Prefix marking protocol lines on the script's stdout
pub const EVENT_PREFIX: &str = "@@e2e ";

/// Interval between polls of a pending expectation
const POLL_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Some(Browser::Chromium),
            "firefox" => Some(Browser::Firefox),
            "webkit" | "safari" => Some(Browser::Webkit),
            _ => None,
        }
    }
}

/// Everything the generated script needs besides the steps
#[derive(Debug, Clone)]
pub struct ScriptOptions {
    pub base_url: String,
    pub browser: Browser,
    pub headless: bool,
    pub viewport: Viewport,
    pub expect_timeout_ms: u64,
    pub screenshot_dir: PathBuf,
}

/// Encode a string as a JavaScript string literal
pub fn js_string(s: &str) -> String {
    // JSON strings are valid JS literals once the two JS line terminators are escaped
    serde_json::to_string(s)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

pub struct ScriptBuilder<'a> {
    options: &'a ScriptOptions,
}

impl<'a> ScriptBuilder<'a> {
    pub fn new(options: &'a ScriptOptions) -> Self {
        Self { options }
    }

    /// Full script source for `scenario`
    pub fn build(&self, scenario: &Scenario) -> String {
        let viewport = scenario.viewport.unwrap_or(self.options.viewport);
        let mut script = String::new();

        script.push_str(&self.prelude());

        let _ = write!(
            script,
            r#"
(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();
  const baseUrl = {base_url};
  const baseHref = baseUrl.endsWith('/') ? baseUrl : baseUrl + '/';
  const consoleMessages = [];
  page.on('console', (msg) => consoleMessages.push({{ type: msg.type(), text: msg.text() }}));
  const timers = {{}};
  let failed = false;

  try {{
"#,
            browser = self.options.browser.as_str(),
            headless = self.options.headless,
            width = viewport.width,
            height = viewport.height,
            base_url = js_string(&self.options.base_url),
        );

        for (i, step) in scenario.steps.iter().enumerate() {
            let _ = write!(
                script,
                "    await runStep({}, {}, async () => {{\n{}\n    }});\n",
                i,
                js_string(&step.name()),
                self.step_to_js(step)
            );
        }

        script.push_str(
            r#"    emit({ event: 'done' });
  } catch (error) {
    failed = true;
  } finally {
    await browser.close();
  }
  process.exit(failed ? 1 : 0);
})().catch((error) => {
  emit({ event: 'fatal', error: String((error && error.message) || error) });
  process.exit(2);
});
"#,
        );

        script
    }

    fn prelude(&self) -> String {
        format!(
            r#"const {{ chromium, firefox, webkit }} = require('playwright');

const EVENT_PREFIX = {prefix};
const EXPECT_TIMEOUT = {expect_timeout};

function emit(event) {{
  process.stdout.write(EVENT_PREFIX + JSON.stringify(event) + '\n');
}}

async function retry(description, check, timeout = EXPECT_TIMEOUT) {{
  const deadline = Date.now() + timeout;
  let lastError;
  for (;;) {{
    try {{
      if (await check()) return;
      lastError = undefined;
    }} catch (error) {{
      lastError = error;
    }}
    if (Date.now() >= deadline) {{
      const cause = lastError ? ': ' + lastError.message : '';
      throw new Error('expected ' + description + ' within ' + timeout + 'ms' + cause);
    }}
    await new Promise((resolve) => setTimeout(resolve, {poll}));
  }}
}}

async function runStep(index, name, body) {{
  const started = Date.now();
  try {{
    await body();
    emit({{ event: 'step', index, name, status: 'passed', duration_ms: Date.now() - started }});
  }} catch (error) {{
    emit({{
      event: 'step', index, name, status: 'failed',
      duration_ms: Date.now() - started,
      error: String((error && error.message) || error),
    }});
    throw error;
  }}
}}
"#,
            prefix = js_string(EVENT_PREFIX),
            expect_timeout = self.options.expect_timeout_ms,
            poll = POLL_INTERVAL_MS,
        )
    }

    /// Body of the `runStep` callback for one step
    pub fn step_to_js(&self, step: &Step) -> String {
        match step {
            // Paths resolve under the base URL's own path, `/` included
            Step::Goto { path } => format!(
                "      await page.goto(new URL({}, baseHref).toString());",
                js_string(path.trim_start_matches('/'))
            ),
            Step::WaitForLoad { state, timeout_ms } => format!(
                "      await page.waitForLoadState({}, {{ timeout: {} }});",
                js_string(state.as_str()),
                timeout_ms
            ),
            Step::WaitFor { locator, state, timeout_ms } => format!(
                "      await {}.first().waitFor({{ state: {}, timeout: {} }});",
                locator.to_js(),
                js_string(state.as_str()),
                timeout_ms
            ),
            Step::WaitForAny { candidates, required } => {
                let list: Vec<String> = candidates
                    .iter()
                    .map(|c| format!("[{}, {}]", c.locator.to_js(), c.timeout_ms))
                    .collect();
                let description: Vec<String> = candidates.iter().map(|c| c.locator.to_string()).collect();
                format!(
                    r#"      let settled = false;
      for (const [candidate, timeout] of [{list}]) {{
        try {{
          await candidate.first().waitFor({{ state: 'visible', timeout }});
          settled = true;
          break;
        }} catch (_) {{}}
      }}
      if (!settled && {required}) {{
        throw new Error('none of ' + {description} + ' became visible');
      }}"#,
                    list = list.join(", "),
                    required = required,
                    description = js_string(&description.join(" | ")),
                )
            }
            Step::WaitForImages { per_image_timeout_ms } => format!(
                r#"      await page.evaluate(async (cap) => {{
        const images = Array.from(document.querySelectorAll('img'));
        await Promise.all(images.map((img) => {{
          if (img.complete) return Promise.resolve();
          return new Promise((resolve) => {{
            img.addEventListener('load', resolve, {{ once: true }});
            img.addEventListener('error', resolve, {{ once: true }});
            setTimeout(resolve, cap);
          }});
        }}));
      }}, {});"#,
                per_image_timeout_ms
            ),
            Step::Click { locator, timeout_ms } => match timeout_ms {
                Some(t) => format!("      await {}.click({{ timeout: {} }});", locator.to_js(), t),
                None => format!("      await {}.click({{ timeout: EXPECT_TIMEOUT }});", locator.to_js()),
            },
            Step::ClickToggle { locator, labels } => format!(
                r#"      const target = {loc};
      const labels = [{first}, {second}];
      const readName = async () => ((await target.getAttribute('aria-label'))
        || (await target.getAttribute('title'))
        || (await target.textContent())
        || '').trim();
      const before = await readName();
      const index = labels.indexOf(before);
      if (index === -1) {{
        throw new Error('unexpected toggle name ' + JSON.stringify(before));
      }}
      const expected = labels[1 - index];
      await target.click({{ timeout: EXPECT_TIMEOUT }});
      await retry('toggle name to become ' + JSON.stringify(expected), async () => (await readName()) === expected);"#,
                loc = locator.to_js(),
                first = js_string(&labels[0]),
                second = js_string(&labels[1]),
            ),
            Step::ClickIfPresent { locator } => format!(
                r#"      const candidates = {};
      if (await candidates.count() > 0) {{
        await candidates.first().click({{ timeout: EXPECT_TIMEOUT }});
      }}"#,
                locator.to_js()
            ),
            Step::Press { key } => format!("      await page.keyboard.press({});", js_string(key)),
            Step::Sleep { ms } => format!("      await page.waitForTimeout({});", ms),
            Step::ExpectTitle { pattern } => format!(
                "      const re = {};\n      await retry({}, async () => re.test(await page.title()));",
                pattern.to_js(),
                js_string(&format!("title to match {}", pattern))
            ),
            Step::ExpectVisible { locator } => self.retry_on(
                locator,
                &format!("{} to be visible", locator),
                "await target.isVisible()",
            ),
            Step::ExpectEnabled { locator } => self.retry_on(
                locator,
                &format!("{} to be enabled", locator),
                "await target.isEnabled()",
            ),
            Step::ExpectDisabled { locator } => self.retry_on(
                locator,
                &format!("{} to be disabled", locator),
                "await target.isDisabled()",
            ),
            Step::ExpectText { locator, contains } => self.retry_on(
                locator,
                &format!("{} to contain {:?}", locator, contains),
                &format!("((await target.textContent()) || '').includes({})", js_string(contains)),
            ),
            Step::ExpectTextMatches { locator, pattern } => format!(
                "      const re = {};\n{}",
                pattern.to_js(),
                self.retry_on(
                    locator,
                    &format!("{} text to match {}", locator, pattern),
                    "re.test((await target.textContent()) || '')",
                )
            ),
            Step::ExpectAttribute { locator, name, pattern } => format!(
                "      const re = {};\n{}",
                pattern.to_js(),
                self.retry_on(
                    locator,
                    &format!("{} attribute {} to match {}", locator, name, pattern),
                    &format!("re.test((await target.getAttribute({})) || '')", js_string(name)),
                )
            ),
            Step::ExpectCount { locator, count } => self.retry_on(
                locator,
                &format!("{} to match exactly {} elements", locator, count),
                &format!("(await target.count()) === {}", count),
            ),
            Step::ExpectMinCount { locator, min } => self.retry_on(
                locator,
                &format!("{} to match at least {} elements", locator, min),
                &format!("(await target.count()) >= {}", min),
            ),
            Step::ExpectAccessibleNames { locator, limit } => format!(
                r#"      const all = {loc};
      const total = await all.count();
      const upto = {limit} === null ? total : Math.min(total, {limit});
      for (let i = 0; i < upto; i++) {{
        const el = all.nth(i);
        const name = (await el.getAttribute('aria-label')) || (await el.textContent()) || '';
        if (!name.trim()) {{
          throw new Error('element ' + i + ' of ' + {desc} + ' has no accessible name');
        }}
      }}"#,
                loc = locator.to_js(),
                limit = js_limit(*limit),
                desc = js_string(&locator.to_string()),
            ),
            Step::ExpectAttributePresent { locator, attribute, limit } => format!(
                r#"      const all = {loc};
      const total = await all.count();
      const upto = {limit} === null ? total : Math.min(total, {limit});
      for (let i = 0; i < upto; i++) {{
        if ((await all.nth(i).getAttribute({attr})) === null) {{
          throw new Error('element ' + i + ' of ' + {desc} + ' lacks attribute ' + {attr});
        }}
      }}"#,
                loc = locator.to_js(),
                limit = js_limit(*limit),
                attr = js_string(attribute),
                desc = js_string(&locator.to_string()),
            ),
            Step::ExpectFocusVisible => {
                "      await retry('focused element to be visible', async () => page.locator(':focus').first().isVisible());"
                    .to_string()
            }
            Step::ExpectNoConsoleErrors { allow } => {
                let allowed: Vec<String> = allow.iter().map(|a| js_string(a)).collect();
                format!(
                    r#"      const allowed = [{}];
      const errors = consoleMessages
        .filter((m) => m.type === 'error')
        .filter((m) => !allowed.some((fragment) => m.text.includes(fragment)));
      if (errors.length > 0) {{
        throw new Error('console errors: ' + JSON.stringify(errors.map((m) => m.text)));
      }}"#,
                    allowed.join(", ")
                )
            }
            Step::StartTimer { label } => {
                format!("      timers[{}] = Date.now();", js_string(label))
            }
            Step::ExpectElapsedBelow { label, max_ms } => format!(
                r#"      const started = timers[{label}];
      if (started === undefined) {{
        throw new Error('timer ' + {label} + ' was never started');
      }}
      const elapsed = Date.now() - started;
      emit({{ event: 'log', message: 'timer ' + {label} + ': ' + elapsed + 'ms' }});
      if (!(elapsed < {max})) {{
        throw new Error('timer ' + {label} + ' took ' + elapsed + 'ms, budget {max}ms');
      }}"#,
                label = js_string(label),
                max = max_ms,
            ),
            Step::ExpectPopup { trigger, url_pattern, timeout_ms } => format!(
                r#"      const re = {re};
      const [popup] = await Promise.all([
        context.waitForEvent('page', {{ timeout: {timeout} }}),
        {trigger}.click({{ timeout: {timeout} }}),
      ]);
      try {{
        await retry({desc}, async () => re.test(popup.url()), {timeout});
      }} finally {{
        await popup.close();
      }}"#,
                re = url_pattern.to_js(),
                trigger = trigger.to_js(),
                timeout = timeout_ms,
                desc = js_string(&format!("popup URL to match {}", url_pattern)),
            ),
            Step::Screenshot { name, full_page } => {
                let path = self.options.screenshot_dir.join(format!("{}.png", name));
                let path = path.to_string_lossy();
                format!(
                    r#"      await page.screenshot({{ path: {path}, fullPage: {full_page} }});
      emit({{ event: 'screenshot', name: {name}, path: {path} }});"#,
                    path = js_string(&path),
                    full_page = full_page,
                    name = js_string(name),
                )
            }
            Step::Log { message } => {
                format!("      emit({{ event: 'log', message: {} }});", js_string(message))
            }
        }
    }

    /// Bind `target` to the locator and poll `check` until it is truthy
    fn retry_on(&self, locator: &Locator, description: &str, check: &str) -> String {
        format!(
            "      const target = {};\n      await retry({}, async () => {});",
            locator.to_js(),
            js_string(description),
            check
        )
    }
}

fn js_limit(limit: Option<usize>) -> String {
    limit.map(|l| l.to_string()).unwrap_or_else(|| "null".to_string())
}
