//! Error types for E2E testing

use autoex_common::Credentials;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Site {url} unreachable after {attempts} attempts")]
    SiteUnreachable { url: String, attempts: usize },

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Suite parse error: {0}")]
    SpecParse(String),

    #[error("Step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    /// Registration submitted but a confirmation never appeared. The account
    /// may or may not exist; the credentials are kept for cleanup.
    #[error("Registration of {} not confirmed: {waiting_for}", .credentials.email)]
    VerificationTimeout {
        credentials: Credentials,
        waiting_for: String,
    },

    /// A step failed after registration succeeded; the account still exists
    #[error("{source} (account {} left registered)", .credentials.email)]
    AccountLeftBehind {
        credentials: Credentials,
        source: Box<E2eError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl E2eError {
    /// Element-not-found and visibility timeouts
    pub fn is_timeout(&self) -> bool {
        match self {
            E2eError::Timeout(_) | E2eError::VerificationTimeout { .. } => true,
            E2eError::AccountLeftBehind { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// Credentials of an account the failure may have left on the site
    pub fn credentials(&self) -> Option<&Credentials> {
        match self {
            E2eError::VerificationTimeout { credentials, .. }
            | E2eError::AccountLeftBehind { credentials, .. } => Some(credentials),
            _ => None,
        }
    }

    /// Attach the account a failed scenario registered, unless already carried
    pub fn with_account(self, credentials: &Credentials) -> Self {
        if self.credentials().is_some() {
            return self;
        }
        E2eError::AccountLeftBehind {
            credentials: credentials.clone(),
            source: Box::new(self),
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
