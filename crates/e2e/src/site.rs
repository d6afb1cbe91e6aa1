//! The target site: fixed URLs, the text contract, and a reachability probe

use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

pub const BASE_URL: &str = "http://automationexercise.com";
pub const PAGE_TITLE: &str = "Automation Exercise";

pub const SIGNUP_LOGIN_LINK: &str = "Signup / Login";
pub const NEW_USER_SIGNUP: &str = "New User Signup!";
pub const ENTER_ACCOUNT_INFORMATION: &str = "Enter Account Information";
pub const ACCOUNT_CREATED: &str = "Account Created!";
pub const ACCOUNT_DELETED: &str = "Account Deleted!";
pub const DELETE_ACCOUNT_LINK: &str = "Delete Account";
pub const LOGOUT_LINK: &str = "Logout";
pub const LOGIN_TO_YOUR_ACCOUNT: &str = "Login to your account";
pub const LOGIN_ERROR: &str = "Your email or password is incorrect!";
pub const EMAIL_EXISTS: &str = "Email Address already exist!";
pub const CONTACT_US_LINK: &str = "Contact us";
pub const GET_IN_TOUCH: &str = "Get In Touch";
pub const CONTACT_SUCCESS: &str = "Success! Your details have been submitted successfully.";
pub const ALL_PRODUCTS: &str = "All Products";
pub const SEARCHED_PRODUCTS: &str = "Searched Products";

/// Where the site lives and how long to wait for it
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub base_url: String,

    /// Give up probing after this long
    pub probe_timeout: Duration,

    /// Pause between probe attempts
    pub probe_interval: Duration,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            probe_timeout: Duration::from_secs(30),
            probe_interval: Duration::from_millis(500),
        }
    }
}

/// Wait until the site answers its base URL with a non-error status
pub async fn probe(config: &SiteConfig) -> E2eResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let start = std::time::Instant::now();
    let mut attempts = 0;

    loop {
        attempts += 1;

        match client.get(&config.base_url).send().await {
            Ok(resp) if resp.status().is_success() || resp.status().is_redirection() => {
                info!("Site reachable at {} ({} attempt(s))", config.base_url, attempts);
                return Ok(());
            }
            Ok(resp) => {
                warn!("Probe of {} returned {}", config.base_url, resp.status());
            }
            Err(e) => {
                warn!("Probe of {} failed: {}", config.base_url, e);
            }
        }

        if start.elapsed() + config.probe_interval >= config.probe_timeout {
            break;
        }
        sleep(config.probe_interval).await;
    }

    Err(E2eError::SiteUnreachable {
        url: config.base_url.clone(),
        attempts,
    })
}
