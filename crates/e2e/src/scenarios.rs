//! Scenario functions, one per [`Scenario`] variant
//!
//! Once `register_user` succeeds, any later failure is returned with the
//! registered account attached (see [`E2eError::with_account`]).

use autoex_common::{generate_random_email, generate_random_string, AccountProfile, ContactMessage};
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};
use crate::flows::{
    delete_account, expect_logged_in, login, logout, open_home, open_login_page, register_user,
};
use crate::selectors::{attr, data_qa, has_text, text};
use crate::session::Session;
use crate::site;
use crate::spec::Scenario;

/// Product names on the search results page
const PRODUCT_NAMES: &str = ".features_items .productinfo p";

/// Run one scenario to completion on a fresh session
pub async fn run_scenario<R>(
    scenario: &Scenario,
    session: &mut dyn Session,
    rng: &mut R,
) -> E2eResult<()>
where
    R: Rng + Send + ?Sized,
{
    match scenario {
        Scenario::RegisterUser => register_and_delete(session, rng).await,
        Scenario::LoginValid => login_with_valid_credentials(session, rng).await,
        Scenario::LoginInvalid {
            email_prefix,
            password_length,
            expected_error,
        } => {
            login_with_invalid_credentials(
                session,
                rng,
                email_prefix,
                *password_length,
                expected_error,
            )
            .await
        }
        Scenario::Logout => logout_user(session, rng).await,
        Scenario::RegisterExistingEmail { expected_error } => {
            register_existing_email(session, rng, expected_error).await
        }
        Scenario::ContactUs {
            subject,
            message,
            attachment,
        } => {
            let profile = AccountProfile::default();
            let contact = ContactMessage {
                name: profile.display_name,
                email: generate_random_email(rng, "contact"),
                subject: subject.clone(),
                message: message.clone(),
                attachment: attachment.as_deref().map(resolve_fixture),
            };
            contact_us(session, &contact).await
        }
        Scenario::SearchProduct { query } => search_product(session, query).await,
        Scenario::Steps { steps } => {
            for step in steps {
                session.perform(step).await?;
            }
            Ok(())
        }
    }
}

pub async fn register_and_delete<R>(session: &mut dyn Session, rng: &mut R) -> E2eResult<()>
where
    R: Rng + Send + ?Sized,
{
    let credentials = register_user(session, rng).await?;
    let account = &credentials;
    async move {
        expect_logged_in(session, account).await?;
        delete_account(session).await
    }
    .await
    .map_err(|e| e.with_account(account))
}

pub async fn login_with_valid_credentials<R>(session: &mut dyn Session, rng: &mut R) -> E2eResult<()>
where
    R: Rng + Send + ?Sized,
{
    let credentials = register_user(session, rng).await?;
    let account = &credentials;
    async move {
        logout(session).await?;
        open_home(session).await?;
        open_login_page(session).await?;
        login(session, &account.email, &account.password).await?;
        expect_logged_in(session, account).await?;
        delete_account(session).await
    }
    .await
    .map_err(|e| e.with_account(account))
}

pub async fn login_with_invalid_credentials<R>(
    session: &mut dyn Session,
    rng: &mut R,
    email_prefix: &str,
    password_length: usize,
    expected_error: &str,
) -> E2eResult<()>
where
    R: Rng + Send + ?Sized,
{
    let email = generate_random_email(rng, email_prefix);
    let password = generate_random_string(rng, password_length);
    debug!("Attempting login as unknown {}", email);

    open_home(session).await?;
    open_login_page(session).await?;
    login(session, &email, &password).await?;
    session.expect_visible(&text(expected_error)).await
}

/// Logging out returns to the login form. The account is deleted afterwards.
pub async fn logout_user<R>(session: &mut dyn Session, rng: &mut R) -> E2eResult<()>
where
    R: Rng + Send + ?Sized,
{
    let credentials = register_user(session, rng).await?;
    let account = &credentials;
    async move {
        logout(session).await?;
        session.click(&has_text("a", "Home")).await?;
        open_login_page(session).await?;
        login(session, &account.email, &account.password).await?;
        expect_logged_in(session, account).await?;
        logout(session).await?;
        session
            .expect_visible(&text(site::LOGIN_TO_YOUR_ACCOUNT))
            .await?;

        login(session, &account.email, &account.password).await?;
        delete_account(session).await
    }
    .await
    .map_err(|e| e.with_account(account))
}

/// Signing up again with a registered email is rejected
pub async fn register_existing_email<R>(
    session: &mut dyn Session,
    rng: &mut R,
    expected_error: &str,
) -> E2eResult<()>
where
    R: Rng + Send + ?Sized,
{
    let credentials = register_user(session, rng).await?;
    let account = &credentials;
    async move {
        logout(session).await?;
        session.expect_visible(&text(site::NEW_USER_SIGNUP)).await?;

        session
            .fill(&attr("input", "name", "name"), &account.username)
            .await?;
        session
            .fill(&data_qa("input", "signup-email"), &account.email)
            .await?;
        session.click(&data_qa("button", "signup-button")).await?;
        session.expect_visible(&text(expected_error)).await?;

        login(session, &account.email, &account.password).await?;
        expect_logged_in(session, account).await?;
        delete_account(session).await
    }
    .await
    .map_err(|e| e.with_account(account))
}

/// Submit the contact form and wait for the success banner
pub async fn contact_us(session: &mut dyn Session, contact: &ContactMessage) -> E2eResult<()> {
    open_home(session).await?;
    session.click(&attr("a", "href", "/contact_us")).await?;
    session.expect_visible(&text(site::GET_IN_TOUCH)).await?;

    session.fill(&data_qa("input", "name"), &contact.name).await?;
    session.fill(&data_qa("input", "email"), &contact.email).await?;
    session
        .fill(&data_qa("input", "subject"), &contact.subject)
        .await?;
    session
        .fill(&data_qa("textarea", "message"), &contact.message)
        .await?;
    if let Some(path) = &contact.attachment {
        session
            .set_input_files(&attr("input", "name", "upload_file"), path)
            .await?;
    }

    // Submitting opens a confirm() dialog
    session.accept_next_dialog().await?;
    session.click(&data_qa("input", "submit-button")).await?;
    session
        .expect_text("div.status.alert-success", site::CONTACT_SUCCESS)
        .await?;

    info!("Contact form submitted as {}", contact.email);
    Ok(())
}

/// Search the catalogue; every hit must name the query
pub async fn search_product(session: &mut dyn Session, query: &str) -> E2eResult<()> {
    open_home(session).await?;
    session.click(&attr("a", "href", "/products")).await?;
    session.expect_visible(&text(site::ALL_PRODUCTS)).await?;

    session.fill("input#search_product", query).await?;
    session.click("button#submit_search").await?;
    session.expect_visible(&text(site::SEARCHED_PRODUCTS)).await?;

    let names = session.text_contents(PRODUCT_NAMES).await?;
    check_search_results(query, &names)?;

    info!("Search for {:?} returned {} product(s)", query, names.len());
    Ok(())
}

/// At least one result, and each contains the query case-insensitively
pub fn check_search_results(query: &str, names: &[String]) -> E2eResult<()> {
    if names.is_empty() {
        return Err(E2eError::AssertionFailed(format!(
            "search for {:?} returned no products",
            query
        )));
    }

    let needle = query.to_lowercase();
    let strays: Vec<&String> = names
        .iter()
        .filter(|name| !name.to_lowercase().contains(&needle))
        .collect();
    if !strays.is_empty() {
        return Err(E2eError::AssertionFailed(format!(
            "search for {:?} returned unrelated products: {:?}",
            query, strays
        )));
    }
    Ok(())
}

/// Relative fixture paths resolve against the working directory first, then the crate
fn resolve_fixture(path: &Path) -> PathBuf {
    if path.is_absolute() || path.exists() {
        return path.to_path_buf();
    }
    Path::new(env!("CARGO_MANIFEST_DIR")).join(path)
}
