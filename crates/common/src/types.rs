//! Value records shared by the flows

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Credentials of an account created during a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    /// Display name shown as "Logged in as {username}"
    pub username: String,
}

/// Date of birth split into the three signup dropdown values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOfBirth {
    pub day: String,
    pub month: String,
    pub year: String,
}

/// Everything the account information form asks for, apart from credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountProfile {
    /// Value of the title radio button ("Mr" / "Mrs")
    pub title: String,
    pub display_name: String,
    pub date_of_birth: NaiveDate,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address1: String,
    pub address2: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub zipcode: String,
    pub mobile_number: String,
}

const DEFAULT_DATE_OF_BIRTH: NaiveDate = match NaiveDate::from_ymd_opt(1990, 1, 1) {
    Some(date) => date,
    None => panic!("1990-01-01 is a valid date"),
};

impl Default for AccountProfile {
    fn default() -> Self {
        Self {
            title: "Mr".to_string(),
            display_name: "John Doe".to_string(),
            date_of_birth: DEFAULT_DATE_OF_BIRTH,
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            company: "ABC Inc".to_string(),
            address1: "123 Main St".to_string(),
            address2: "Apt 4B".to_string(),
            country: "United States".to_string(),
            state: "New York".to_string(),
            city: "New York".to_string(),
            zipcode: "10001".to_string(),
            mobile_number: "1234567890".to_string(),
        }
    }
}

/// Contents of the "Contact Us" form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub attachment: Option<PathBuf>,
}
