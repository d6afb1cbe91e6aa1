//! Main test runner: probes the site and runs cases on isolated sessions

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::playwright::{PlaywrightConfig, PlaywrightLauncher};
use crate::scenarios::run_scenario;
use crate::session::SessionLauncher;
use crate::site::{self, SiteConfig};
use crate::spec::{CaseSpec, Suite};

/// Result of running a single case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    /// Seed of the case's randomness source; replays the same test data
    pub seed: u64,
    pub started_at: String,
    pub error: Option<String>,
    /// Account the failed case may have left registered on the site
    pub orphaned_email: Option<String>,
    pub screenshot_path: Option<PathBuf>,
}

/// Result of running all cases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub seed: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Configuration for the test runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub site: SiteConfig,
    pub playwright: PlaywrightConfig,

    /// Suite file or directory; the built-in suite when unset
    pub suite_path: Option<PathBuf>,

    pub output_dir: PathBuf,

    /// Base seed; drawn at random and logged when unset
    pub seed: Option<u64>,

    /// Maximum concurrent browser sessions
    pub parallelism: usize,

    pub probe_site: bool,
    pub screenshot_on_failure: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            playwright: PlaywrightConfig::default(),
            suite_path: None,
            output_dir: PathBuf::from("test-results"),
            seed: None,
            parallelism: 1,
            probe_site: true,
            screenshot_on_failure: true,
        }
    }
}

/// Main E2E test runner
pub struct TestRunner {
    config: RunnerConfig,
    launcher: Arc<dyn SessionLauncher>,
}

impl TestRunner {
    /// Create a new test runner with default configuration
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    /// Create a test runner that drives Playwright
    pub fn with_config(mut config: RunnerConfig) -> Self {
        config.playwright.base_url = config.site.base_url.clone();
        let launcher = Arc::new(PlaywrightLauncher::new(config.playwright.clone()));
        Self { config, launcher }
    }

    /// Create a test runner with a custom session source
    pub fn with_launcher(config: RunnerConfig, launcher: Arc<dyn SessionLauncher>) -> Self {
        Self { config, launcher }
    }

    /// The configured suite, or the built-in one
    pub fn load_suite(&self) -> E2eResult<Suite> {
        match &self.config.suite_path {
            Some(path) if path.is_dir() => Suite::load_all(path),
            Some(path) => Suite::from_file(path),
            None => Suite::builtin(),
        }
    }

    /// Run every case
    pub async fn run_all(&self) -> E2eResult<TestSuiteResult> {
        let suite = self.load_suite()?;
        self.run_suite(&suite).await
    }

    /// Run cases matching a tag
    pub async fn run_tagged(&self, tag: &str) -> E2eResult<TestSuiteResult> {
        let suite = self.load_suite()?.filter_by_tag(tag);
        self.run_suite(&suite).await
    }

    /// Run a specific case by name
    pub async fn run_named(&self, name: &str) -> E2eResult<TestSuiteResult> {
        let suite = self.load_suite()?;
        let case = suite
            .find(name)
            .cloned()
            .ok_or_else(|| E2eError::SpecParse(format!("Test not found: {}", name)))?;
        self.run_suite(&Suite { cases: vec![case] }).await
    }

    /// Run a suite, at most `parallelism` cases at a time
    pub async fn run_suite(&self, suite: &Suite) -> E2eResult<TestSuiteResult> {
        let start = Instant::now();
        let seed = self.config.seed.unwrap_or_else(rand::random);

        if self.config.probe_site {
            site::probe(&self.config.site).await?;
        }

        info!("Running {} case(s) with seed {}...", suite.cases.len(), seed);

        let permits = Arc::new(Semaphore::new(self.config.parallelism.max(1)));
        let mut tasks = JoinSet::new();

        for (index, case) in suite.cases.iter().cloned().enumerate() {
            let permits = Arc::clone(&permits);
            let launcher = Arc::clone(&self.launcher);
            let screenshot_dir = self
                .config
                .screenshot_on_failure
                .then(|| self.config.output_dir.join("screenshots"));
            let case_seed = seed.wrapping_add(index as u64);

            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                let result =
                    run_case(&case, launcher.as_ref(), case_seed, screenshot_dir).await;
                (index, result)
            });
        }

        let mut results: Vec<(usize, TestResult)> = Vec::with_capacity(suite.cases.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => results.push(entry),
                Err(e) => error!("Case task aborted: {}", e),
            }
        }
        results.sort_by_key(|(index, _)| *index);
        let results: Vec<TestResult> = results.into_iter().map(|(_, r)| r).collect();

        let passed = results.iter().filter(|r| r.success).count();
        let failed = suite.cases.len() - passed;
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            passed, failed, 0, duration_ms
        );

        Ok(TestSuiteResult {
            total: suite.cases.len(),
            passed,
            failed,
            skipped: 0,
            duration_ms,
            seed,
            results,
        })
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one case on its own session. Never fails: failures land in the result.
async fn run_case(
    case: &CaseSpec,
    launcher: &dyn SessionLauncher,
    seed: u64,
    screenshot_dir: Option<PathBuf>,
) -> TestResult {
    let start = Instant::now();
    let started_at = chrono::Utc::now().to_rfc3339();
    debug!("Running case: {} (seed {})", case.name, seed);

    let mut result = TestResult {
        name: case.name.clone(),
        success: false,
        duration_ms: 0,
        seed,
        started_at,
        error: None,
        orphaned_email: None,
        screenshot_path: None,
    };

    let mut session = match launcher.launch().await {
        Ok(session) => session,
        Err(e) => {
            error!("✗ {} - {}", case.name, e);
            result.error = Some(e.to_string());
            return result;
        }
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let outcome = run_scenario(&case.scenario, session.as_mut(), &mut rng).await;

    if let Err(e) = &outcome {
        if let Some(dir) = &screenshot_dir {
            let path = dir.join(screenshot_file_name(&case.name));
            match session.screenshot(&path, true).await {
                Ok(()) => result.screenshot_path = Some(path),
                Err(shot) => warn!("Failure screenshot for {} failed: {}", case.name, shot),
            }
        }
        result.orphaned_email = e.credentials().map(|c| c.email.clone());
    }

    if let Err(e) = session.close().await {
        warn!("Closing session for {} failed: {}", case.name, e);
    }

    result.duration_ms = start.elapsed().as_millis() as u64;
    match outcome {
        Ok(()) => {
            result.success = true;
            info!("✓ {} ({} ms)", case.name, result.duration_ms);
        }
        Err(e) => {
            error!("✗ {} - {}", case.name, e);
            result.error = Some(e.to_string());
        }
    }
    result
}

/// File name for a case's failure screenshot; keeps it inside the screenshot dir
fn screenshot_file_name(case_name: &str) -> String {
    let stem: String = case_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}.png", stem)
}
