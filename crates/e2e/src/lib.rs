//! Autoex E2E Test Framework
//!
//! End-to-end scenarios against the Automation Exercise demo store, driven
//! from Rust through a long-lived Playwright process:
//! - A [`Session`] trait is the only browser surface flows depend on
//! - [`PlaywrightSession`] speaks a JSON-lines protocol with a Node driver
//! - Scenarios are a YAML table of parameterised cases
//! - Test data comes from a seeded randomness source so runs replay
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── site::probe() -> reachable?                          │
//! │    ├── SessionLauncher::launch() -> Box<dyn Session>        │
//! │    ├── run_scenario(case, session, rng) -> E2eResult<()>    │
//! │    └── write_results() -> test-results.json                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Suite (YAML)                                               │
//! │    └── cases: [CaseSpec]                                    │
//! │          ├── name, description, tags                        │
//! │          └── scenario                                       │
//! │                ├── register_user | login_valid | logout     │
//! │                ├── login_invalid { email_prefix, ... }      │
//! │                ├── register_existing_email { ... }          │
//! │                ├── contact_us { subject, message, ... }     │
//! │                ├── search_product { query }                 │
//! │                └── steps { steps: [TestStep] }              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod flows;
pub mod playwright;
pub mod runner;
pub mod scenarios;
pub mod selectors;
pub mod session;
pub mod site;
pub mod spec;

pub use error::{E2eError, E2eResult};
pub use flows::register_user;
pub use playwright::{PlaywrightConfig, PlaywrightLauncher, PlaywrightSession};
pub use runner::{RunnerConfig, TestRunner};
pub use session::{Session, SessionLauncher};
pub use spec::{CaseSpec, Scenario, Suite, TestStep};
