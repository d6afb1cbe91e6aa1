//! E2E test harness entry point
//!
//! This file is the test binary that runs the scenario suite against the live site.
//! Run with: AUTOEX_LIVE=1 cargo test --package autoex-e2e --test e2e

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use autoex_e2e::playwright::{Browser, PlaywrightConfig};
use autoex_e2e::runner::{RunnerConfig, TestRunner};
use autoex_e2e::site::{SiteConfig, BASE_URL};
use autoex_e2e::E2eResult;

#[derive(Parser, Debug)]
#[command(name = "autoex-e2e")]
#[command(about = "E2E scenarios for Automation Exercise")]
struct Args {
    /// Suite file or directory of suites (built-in suite when omitted)
    #[arg(short, long, env = "AUTOEX_SUITE")]
    suite: Option<PathBuf>,

    /// Run only cases matching this tag
    #[arg(short, long, env = "AUTOEX_TAG")]
    tag: Option<String>,

    /// Run only a specific case by name
    #[arg(short, long, env = "AUTOEX_CASE")]
    name: Option<String>,

    /// Base URL of the site under test
    #[arg(long, env = "AUTOEX_BASE_URL", default_value = BASE_URL)]
    base_url: String,

    /// Seed for generated test data (random when omitted)
    #[arg(long, env = "AUTOEX_SEED")]
    seed: Option<u64>,

    /// Concurrent browser sessions
    #[arg(short = 'j', long, env = "AUTOEX_PARALLELISM", default_value = "1")]
    parallelism: usize,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, env = "AUTOEX_BROWSER", default_value = "chromium")]
    browser: Browser,

    /// Show the browser window
    #[arg(long, env = "AUTOEX_HEADED")]
    headed: bool,

    /// Implicit wait for every action and assertion, in milliseconds
    #[arg(long, env = "AUTOEX_TIMEOUT_MS", default_value = "10000")]
    timeout_ms: u64,

    /// Viewport width
    #[arg(long, default_value = "1280")]
    viewport_width: u32,

    /// Viewport height
    #[arg(long, default_value = "720")]
    viewport_height: u32,

    /// node_modules directory providing playwright
    #[arg(long, env = "AUTOEX_NODE_PATH")]
    node_path: Option<PathBuf>,

    /// Skip the reachability probe
    #[arg(long)]
    no_probe: bool,

    /// Output directory for results
    #[arg(short, long, env = "AUTOEX_OUTPUT", default_value = "test-results")]
    output: PathBuf,
}

fn main() {
    if std::env::var_os("AUTOEX_LIVE").is_none() {
        eprintln!("autoex-e2e: AUTOEX_LIVE not set, skipping live scenarios");
        return;
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let result = rt.block_on(async_main(args));

    match result {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> E2eResult<bool> {
    let config = RunnerConfig {
        site: SiteConfig {
            base_url: args.base_url,
            ..Default::default()
        },
        playwright: PlaywrightConfig {
            browser: args.browser,
            headless: !args.headed,
            viewport_width: args.viewport_width,
            viewport_height: args.viewport_height,
            timeout: Duration::from_millis(args.timeout_ms),
            node_path: args.node_path,
            ..Default::default()
        },
        suite_path: args.suite,
        output_dir: args.output,
        seed: args.seed,
        parallelism: args.parallelism,
        probe_site: !args.no_probe,
        ..Default::default()
    };

    let runner = TestRunner::with_config(config);

    let results = if let Some(name) = args.name {
        runner.run_named(&name).await?
    } else if let Some(tag) = args.tag {
        runner.run_tagged(&tag).await?
    } else {
        runner.run_all().await?
    };

    runner.write_results(&results)?;

    if !results.success() {
        eprintln!("Replay with --seed {}", results.seed);
    }
    Ok(results.success())
}
