//! Multi-step flows shared by scenarios: registration, login, logout, deletion

use autoex_common::{
    format_date_of_birth, generate_random_email, generate_random_string, AccountProfile,
    Credentials,
};
use rand::Rng;
use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};
use crate::selectors::{attr, data_qa, logged_in_as, text};
use crate::session::Session;
use crate::site;

/// Prefix of the emails registered by [`register_user`]
pub const SIGNUP_EMAIL_PREFIX: &str = "john.doe";

/// Length of the passwords registered by [`register_user`]
pub const SIGNUP_PASSWORD_LENGTH: usize = 10;

/// Turn a confirmation timeout into a verification timeout carrying the
/// credentials that were submitted.
fn confirmed(result: E2eResult<()>, credentials: &Credentials) -> E2eResult<()> {
    result.map_err(|e| {
        if e.is_timeout() {
            E2eError::VerificationTimeout {
                credentials: credentials.clone(),
                waiting_for: e.to_string(),
            }
        } else {
            e
        }
    })
}

/// Create a fresh account and leave the session logged in as it.
///
/// Every step runs once. The first failure aborts the rest; a missing
/// confirmation becomes [`E2eError::VerificationTimeout`], after which the
/// account may or may not exist on the site. Cleanup is up to the caller.
pub async fn register_user<R>(session: &mut dyn Session, rng: &mut R) -> E2eResult<Credentials>
where
    R: Rng + Send + ?Sized,
{
    let profile = AccountProfile::default();
    let credentials = Credentials {
        email: generate_random_email(rng, SIGNUP_EMAIL_PREFIX),
        password: generate_random_string(rng, SIGNUP_PASSWORD_LENGTH),
        username: profile.display_name.clone(),
    };
    let dob = format_date_of_birth(profile.date_of_birth);

    info!("Registering {}", credentials.email);

    session.goto("/").await?;
    confirmed(session.expect_title(site::PAGE_TITLE).await, &credentials)?;

    session.click(&text(site::SIGNUP_LOGIN_LINK)).await?;
    confirmed(session.expect_visible(&text(site::NEW_USER_SIGNUP)).await, &credentials)?;

    session
        .fill(&attr("input", "name", "name"), &credentials.username)
        .await?;
    session
        .fill(&data_qa("input", "signup-email"), &credentials.email)
        .await?;
    session.click(&data_qa("button", "signup-button")).await?;
    confirmed(
        session.expect_visible(&text(site::ENTER_ACCOUNT_INFORMATION)).await,
        &credentials,
    )?;

    debug!("Filling account information for {}", credentials.email);
    session.click(&attr("input", "value", &profile.title)).await?;
    session
        .fill(&data_qa("input", "password"), &credentials.password)
        .await?;
    session
        .select_option(&data_qa("select", "days"), &dob.day)
        .await?;
    session
        .select_option(&data_qa("select", "months"), &dob.month)
        .await?;
    session
        .select_option(&data_qa("select", "years"), &dob.year)
        .await?;

    session.check("input#newsletter").await?;
    session.check("input#optin").await?;

    let address = [
        ("first_name", &profile.first_name),
        ("last_name", &profile.last_name),
        ("company", &profile.company),
        ("address", &profile.address1),
        ("address2", &profile.address2),
    ];
    for (field, value) in address {
        session.fill(&data_qa("input", field), value).await?;
    }
    session
        .select_option(&data_qa("select", "country"), &profile.country)
        .await?;
    let locality = [
        ("state", &profile.state),
        ("city", &profile.city),
        ("zipcode", &profile.zipcode),
        ("mobile_number", &profile.mobile_number),
    ];
    for (field, value) in locality {
        session.fill(&data_qa("input", field), value).await?;
    }

    session.click(&data_qa("button", "create-account")).await?;
    confirmed(session.expect_visible(&text(site::ACCOUNT_CREATED)).await, &credentials)?;

    session.click(&data_qa("a", "continue-button")).await?;
    confirmed(
        session.expect_visible(&logged_in_as(&credentials.username)).await,
        &credentials,
    )?;

    info!("Registered {} as {}", credentials.email, credentials.username);
    Ok(credentials)
}

/// Load the home page and check its title
pub async fn open_home(session: &mut dyn Session) -> E2eResult<()> {
    session.goto("/").await?;
    session.expect_title(site::PAGE_TITLE).await
}

/// Follow "Signup / Login" to the login form
pub async fn open_login_page(session: &mut dyn Session) -> E2eResult<()> {
    session.click(&text(site::SIGNUP_LOGIN_LINK)).await?;
    session.expect_visible(&text(site::LOGIN_TO_YOUR_ACCOUNT)).await
}

/// Submit the login form. Does not check the outcome.
pub async fn login(session: &mut dyn Session, email: &str, password: &str) -> E2eResult<()> {
    session.fill(&data_qa("input", "login-email"), email).await?;
    session
        .fill(&data_qa("input", "login-password"), password)
        .await?;
    session.click(&data_qa("button", "login-button")).await
}

/// The header names the account the credentials belong to
pub async fn expect_logged_in(session: &mut dyn Session, credentials: &Credentials) -> E2eResult<()> {
    session
        .expect_visible(&logged_in_as(&credentials.username))
        .await
}

pub async fn logout(session: &mut dyn Session) -> E2eResult<()> {
    session.click(&text(site::LOGOUT_LINK)).await
}

/// Delete the logged-in account and dismiss the confirmation
pub async fn delete_account(session: &mut dyn Session) -> E2eResult<()> {
    session.click(&text(site::DELETE_ACCOUNT_LINK)).await?;
    session.expect_visible(&text(site::ACCOUNT_DELETED)).await?;
    session.click(&data_qa("a", "continue-button")).await
}
