//! Playwright browser automation
//!
//! A [`PlaywrightSession`] owns one `node` process running the embedded
//! driver script. Steps travel as JSON lines on the driver's stdin, each
//! tagged with an id; the driver answers every step with one JSON line on
//! stdout carrying the same id. The browser page lives as long as the
//! process, so a scenario keeps its cookies and navigation state.

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::session::{Session, SessionLauncher};
use crate::site;
use crate::spec::TestStep;

const DRIVER_SCRIPT: &str = include_str!("../driver/driver.js");

/// Extra host-side wait on top of the browser's own timeout
const REPLY_SLACK: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl FromStr for Browser {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" | "safari" => Ok(Browser::Webkit),
            other => Err(format!("unknown browser: {}", other)),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub base_url: String,
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Implicit wait applied to every action and assertion
    pub timeout: Duration,

    /// How long the browser may take to come up
    pub launch_timeout: Duration,

    /// `node_modules` directory holding `playwright` and `@playwright/test`
    pub node_path: Option<PathBuf>,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: site::BASE_URL.to_string(),
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            timeout: Duration::from_secs(10),
            launch_timeout: Duration::from_secs(60),
            node_path: None,
        }
    }
}

/// What the driver script receives on its command line
#[derive(Debug, Serialize)]
struct DriverConfig<'a> {
    base_url: &'a str,
    browser: &'static str,
    headless: bool,
    viewport_width: u32,
    viewport_height: u32,
    timeout_ms: u64,
}

impl<'a> From<&'a PlaywrightConfig> for DriverConfig<'a> {
    fn from(config: &'a PlaywrightConfig) -> Self {
        Self {
            base_url: &config.base_url,
            browser: config.browser.as_str(),
            headless: config.headless,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            timeout_ms: config.timeout.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum FailureKind {
    Timeout,
    Assertion,
    Error,
}

/// One line of driver output
#[derive(Debug, Deserialize)]
struct Reply {
    id: u64,
    ok: bool,
    #[serde(default)]
    kind: Option<FailureKind>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    texts: Option<Vec<String>>,
}

impl Reply {
    fn into_result(self, step: &str) -> E2eResult<Vec<String>> {
        if self.ok {
            return Ok(self.texts.unwrap_or_default());
        }

        let reason = self.error.unwrap_or_else(|| "unknown driver error".to_string());
        let kind = self.kind.unwrap_or_else(|| classify_message(&reason));
        Err(match kind {
            FailureKind::Timeout => E2eError::Timeout(format!("{} ({})", step, first_line(&reason))),
            FailureKind::Assertion => {
                E2eError::AssertionFailed(format!("{}: {}", step, first_line(&reason)))
            }
            FailureKind::Error => E2eError::StepFailed {
                step: step.to_string(),
                reason,
            },
        })
    }
}

/// Fallback for replies that carry no failure kind
fn classify_message(message: &str) -> FailureKind {
    static TIMEOUT: OnceLock<Option<Regex>> = OnceLock::new();
    let timed_out = TIMEOUT
        .get_or_init(|| Regex::new(r"Timeout \d+ms exceeded|Timed out \d+ms waiting").ok())
        .as_ref()
        .map(|re| re.is_match(message))
        .unwrap_or(false);

    if timed_out {
        FailureKind::Timeout
    } else if message.contains("expect(") {
        FailureKind::Assertion
    } else {
        FailureKind::Error
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or(message)
}

/// Serialize a step as one protocol line
fn request_line(id: u64, step: &TestStep) -> E2eResult<String> {
    let mut value = serde_json::to_value(step)?;
    if let serde_json::Value::Object(map) = &mut value {
        map.insert("id".to_string(), id.into());
    }
    let mut line = serde_json::to_string(&value)?;
    line.push('\n');
    Ok(line)
}

/// An `assert` step; the driver maps each field onto a waiting matcher
fn assertion(
    selector: &str,
    visible: Option<bool>,
    text: Option<&str>,
    text_contains: Option<&str>,
    count: Option<usize>,
) -> TestStep {
    TestStep::Assert {
        selector: selector.to_string(),
        visible,
        text: text.map(str::to_string),
        text_contains: text_contains.map(str::to_string),
        count,
    }
}

fn absolute(path: &Path) -> E2eResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Check if Playwright is installed
async fn check_playwright_installed() -> E2eResult<()> {
    let status = TokioCommand::new("npx")
        .args(["playwright", "--version"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) if status.success() => Ok(()),
        _ => Err(E2eError::PlaywrightNotFound),
    }
}

async fn forward_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        warn!("[driver] {}", line);
    }
}

/// Live browser session backed by a Playwright driver process
pub struct PlaywrightSession {
    child: Child,
    stdin: Option<ChildStdin>,
    replies: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    reply_timeout: Duration,
    _driver_dir: tempfile::TempDir,
}

impl PlaywrightSession {
    /// Start a browser and wait until the driver reports ready
    pub async fn launch(config: &PlaywrightConfig) -> E2eResult<Self> {
        check_playwright_installed().await?;

        let driver_dir = tempfile::tempdir()?;
        let script_path = driver_dir.path().join("driver.js");
        tokio::fs::write(&script_path, DRIVER_SCRIPT).await?;

        let driver_config = serde_json::to_string(&DriverConfig::from(config))?;

        let mut cmd = TokioCommand::new("node");
        cmd.arg(&script_path)
            .arg(driver_config)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let node_path = match &config.node_path {
            Some(path) => Some(absolute(path)?),
            None => Some(std::env::current_dir()?.join("node_modules")).filter(|p| p.is_dir()),
        };
        if let Some(node_path) = node_path {
            debug!("Resolving Playwright from {}", node_path.display());
            cmd.env("NODE_PATH", node_path);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| E2eError::Playwright(format!("Failed to spawn node: {}", e)))?;

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Playwright("driver stdout unavailable".to_string()))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_stderr(stderr));
        }

        let mut session = Self {
            child,
            stdin,
            replies: BufReader::new(stdout).lines(),
            next_id: 0,
            reply_timeout: config.timeout + REPLY_SLACK,
            _driver_dir: driver_dir,
        };

        session
            .read_reply(0, config.launch_timeout)
            .await?
            .into_result("launch")?;

        info!(
            "Launched {} ({}x{}, headless: {})",
            config.browser.as_str(),
            config.viewport_width,
            config.viewport_height,
            config.headless
        );
        Ok(session)
    }

    async fn read_reply(&mut self, id: u64, wait: Duration) -> E2eResult<Reply> {
        let deadline = Instant::now() + wait;

        loop {
            let line = timeout_at(deadline, self.replies.next_line())
                .await
                .map_err(|_| E2eError::Timeout(format!("driver reply to request {}", id)))??;

            let Some(line) = line else {
                return Err(E2eError::Playwright("driver exited".to_string()));
            };

            match serde_json::from_str::<Reply>(&line) {
                Ok(reply) if reply.id == id => return Ok(reply),
                Ok(reply) => warn!("Discarding stale driver reply {}", reply.id),
                Err(_) => debug!("[driver] {}", line),
            }
        }
    }

    /// Send one step and wait for its reply
    async fn send(&mut self, step: TestStep) -> E2eResult<Vec<String>> {
        let name = step.describe();
        debug!("Executing step: {}", name);

        self.next_id += 1;
        let id = self.next_id;
        let line = request_line(id, &step)?;

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| E2eError::Playwright("session closed".to_string()))?;
        stdin.write_all(line.as_bytes()).await?;
        stdin.flush().await?;

        let wait = self.reply_timeout;
        self.read_reply(id, wait).await?.into_result(&name)
    }
}

#[async_trait]
impl Session for PlaywrightSession {
    async fn goto(&mut self, url: &str) -> E2eResult<()> {
        self.send(TestStep::Navigate {
            url: url.to_string(),
        })
        .await?;
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> E2eResult<()> {
        self.send(TestStep::Click {
            selector: selector.to_string(),
        })
        .await?;
        Ok(())
    }

    async fn fill(&mut self, selector: &str, value: &str) -> E2eResult<()> {
        self.send(TestStep::Fill {
            selector: selector.to_string(),
            value: value.to_string(),
        })
        .await?;
        Ok(())
    }

    async fn check(&mut self, selector: &str) -> E2eResult<()> {
        self.send(TestStep::Check {
            selector: selector.to_string(),
        })
        .await?;
        Ok(())
    }

    async fn select_option(&mut self, selector: &str, value: &str) -> E2eResult<()> {
        self.send(TestStep::Select {
            selector: selector.to_string(),
            value: value.to_string(),
        })
        .await?;
        Ok(())
    }

    async fn set_input_files(&mut self, selector: &str, path: &Path) -> E2eResult<()> {
        let path = absolute(path)?;
        tokio::fs::metadata(&path).await?;
        self.send(TestStep::Upload {
            selector: selector.to_string(),
            path,
        })
        .await?;
        Ok(())
    }

    async fn accept_next_dialog(&mut self) -> E2eResult<()> {
        self.send(TestStep::AcceptDialog).await?;
        Ok(())
    }

    async fn expect_title(&mut self, title: &str) -> E2eResult<()> {
        self.send(TestStep::AssertTitle {
            title: title.to_string(),
        })
        .await?;
        Ok(())
    }

    async fn expect_visible(&mut self, selector: &str) -> E2eResult<()> {
        self.send(assertion(selector, Some(true), None, None, None)).await?;
        Ok(())
    }

    async fn expect_text(&mut self, selector: &str, text: &str) -> E2eResult<()> {
        self.send(assertion(selector, Some(true), None, Some(text), None)).await?;
        Ok(())
    }

    async fn expect_exact_text(&mut self, selector: &str, text: &str) -> E2eResult<()> {
        self.send(assertion(selector, Some(true), Some(text), None, None)).await?;
        Ok(())
    }

    async fn expect_hidden(&mut self, selector: &str) -> E2eResult<()> {
        self.send(assertion(selector, Some(false), None, None, None)).await?;
        Ok(())
    }

    async fn expect_count(&mut self, selector: &str, count: usize) -> E2eResult<()> {
        self.send(assertion(selector, None, None, None, Some(count))).await?;
        Ok(())
    }

    async fn text_contents(&mut self, selector: &str) -> E2eResult<Vec<String>> {
        self.send(TestStep::TextContents {
            selector: selector.to_string(),
        })
        .await
    }

    async fn screenshot(&mut self, path: &Path, full_page: bool) -> E2eResult<()> {
        let path = absolute(path)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        self.send(TestStep::Screenshot { path, full_page })
        .await?;
        Ok(())
    }

    async fn close(&mut self) -> E2eResult<()> {
        // EOF on stdin makes the driver close the browser and exit
        let Some(mut stdin) = self.stdin.take() else {
            return Ok(());
        };
        let _ = stdin.shutdown().await;
        drop(stdin);

        match timeout(Duration::from_secs(10), self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                if !status.success() {
                    warn!("Driver exited with {}", status);
                }
            }
            Err(_) => {
                warn!("Driver did not exit, killing it");
                self.child.kill().await?;
            }
        }
        Ok(())
    }
}

/// Starts a fresh [`PlaywrightSession`] per scenario
#[derive(Debug, Clone)]
pub struct PlaywrightLauncher {
    config: PlaywrightConfig,
}

impl PlaywrightLauncher {
    pub fn new(config: PlaywrightConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionLauncher for PlaywrightLauncher {
    async fn launch(&self) -> E2eResult<Box<dyn Session>> {
        let session = PlaywrightSession::launch(&self.config).await?;
        Ok(Box::new(session))
    }
}
